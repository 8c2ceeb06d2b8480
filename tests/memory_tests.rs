//! Invariant checks for memory and its windowing.

use pretty_assertions::assert_eq;

use curia::memory::{slide_window_compression, HandoffOptions, Memory, TRUNCATION_MARKER};
use curia::types::{Message, Role};

/// Alternating user/assistant turns with numbered contents.
fn conversation(turns: usize) -> Vec<Message> {
    (0..turns)
        .map(|i| {
            if i % 2 == 0 {
                Message::user(format!("q{i}"))
            } else {
                Message::assistant(format!("a{i}"))
            }
        })
        .collect()
}

#[test]
fn system_message_stays_unique_and_first() {
    let mut memory = Memory::new("agent", "v0");
    for round in 1..20 {
        memory.add(conversation(3));
        memory.replace_system_message(format!("v{round}"));

        assert!(memory.messages()[0].is_system());
        assert_eq!(memory.messages().iter().filter(|m| m.is_system()).count(), 1);
        assert_eq!(memory.system_message(), format!("v{round}"));
    }
}

#[test]
fn arrange_is_identity_within_bound() {
    for len in 0..10 {
        let mut memory = Memory::new("agent", "sys").with_max_history(10);
        memory.add(conversation(len));
        let before = memory.messages().to_vec();

        assert_eq!(memory.arrange(None), 0);
        assert_eq!(memory.messages(), before.as_slice());
    }
}

#[test]
fn arrange_respects_the_bound_for_every_size() {
    for max_history in 3..16 {
        for len in max_history..max_history + 40 {
            let mut memory = Memory::new("agent", "sys").with_max_history(max_history);
            memory.add(conversation(len));
            let newest = memory.messages().last().cloned().unwrap();

            memory.arrange(None);

            let messages = memory.messages();
            assert!(
                messages.len() <= max_history + 1,
                "max_history {max_history}, len {len}: got {}",
                messages.len()
            );
            assert_eq!(messages[0], Message::system("sys"));
            assert_eq!(messages.last(), Some(&newest));
            assert_eq!(messages.iter().filter(|m| m.is_system()).count(), 1);
        }
    }
}

#[test]
fn windowing_never_leaves_same_role_neighbours_at_the_seam() {
    for window in 2..12 {
        let mut messages = vec![Message::system("sys")];
        messages.extend((0..30).map(|i| {
            if i % 3 == 2 {
                Message::assistant(format!("a{i}"))
            } else {
                Message::user(format!("q{i}"))
            }
        }));

        let compressed = slide_window_compression(&messages, window);

        let markers: Vec<&Message> = compressed
            .iter()
            .filter(|m| m.content == TRUNCATION_MARKER)
            .collect();
        assert!(markers.len() <= 1);
        let front = (window - 1) / 3;
        if front > 0 {
            let seam = &compressed[front..front + 2];
            assert_ne!(seam[0].role, seam[1].role, "window {window}");
        }
    }
}

#[test]
fn marker_role_opposes_the_front_segment() {
    let mut messages = vec![Message::system("sys")];
    messages.extend((0..10).map(|i| Message::user(format!("q{i}"))));

    let compressed = slide_window_compression(&messages, 7);

    assert_eq!(compressed[3].content, TRUNCATION_MARKER);
    assert_eq!(compressed[3].role, Role::Assistant);
    assert_eq!(compressed.len(), 8);
}

#[test]
fn handoff_keeps_own_history_without_inherit() {
    let mut from = Memory::new("Researcher", "Find facts.");
    from.add(conversation(4));
    let mut to = Memory::new("Writer", "Write prose.");
    to.add([Message::user("draft please")]);

    to.handoff(&from, HandoffOptions::default());

    let messages = to.messages();
    assert_eq!(messages.len(), 2);
    assert!(messages[0].content.contains("Find facts."));
    assert!(messages[0].content.contains("Write prose."));
    assert_eq!(messages[1], Message::user("draft please"));
}

#[test]
fn handoff_with_inherit_puts_source_history_first() {
    let mut from = Memory::new("Researcher", "Find facts.");
    from.add(conversation(2));
    let mut to = Memory::new("Writer", "Write prose.");
    to.add([Message::user("draft please")]);

    to.handoff(&from, HandoffOptions::inherit());

    let contents: Vec<&str> = to.messages()[1..].iter().map(|m| m.content.as_str()).collect();
    assert_eq!(contents, vec!["q0", "a1", "draft please"]);
}
