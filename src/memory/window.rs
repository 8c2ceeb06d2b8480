//! Default sliding-window compression.

use crate::types::{Message, Role};

/// Content of the synthetic message inserted where history was cut.
pub const TRUNCATION_MARKER: &str = "[CONTEXT_TRUNCATED]";

/// Bound `messages` to roughly `window_size` non-system entries.
///
/// Keeps the first system message, the oldest third of the window and the
/// newest two thirds. A truncation marker is inserted between the two
/// segments only when joining them would put two same-role turns side by
/// side (or, with no front segment, when the kept tail would not open with a
/// user turn). Tool results are never kept without the assistant turn that
/// requested them.
pub fn slide_window_compression(messages: &[Message], window_size: usize) -> Vec<Message> {
    let window = window_size.max(2);
    let system = messages.iter().find(|m| m.is_system());
    let rest: Vec<&Message> = messages.iter().filter(|m| !m.is_system()).collect();

    let mut out: Vec<Message> = Vec::with_capacity(window + 2);
    if let Some(system) = system {
        out.push(system.clone());
    }

    if rest.len() <= window {
        out.extend(rest.into_iter().cloned());
        return out;
    }

    let front_count = (window - 1) / 3;
    let back_count = (window - 1).div_ceil(3) * 2;
    let (front_end, back_start) = align_tool_turns(&rest, front_count, rest.len() - back_count);
    let front = &rest[..front_end];
    let back = &rest[back_start..];

    out.extend(front.iter().map(|m| (*m).clone()));
    if let Some(role) = marker_role(front.last().map(|m| m.role), back.first().map(|m| m.role)) {
        out.push(marker(role));
    }
    out.extend(back.iter().map(|m| (*m).clone()));
    out
}

/// Keep tool results next to the assistant turn that requested them.
///
/// A back segment opening on tool results is widened to take in the owning
/// assistant turn, paid for by shrinking the front segment; when the front
/// cannot pay, the orphaned results are dropped instead. A front segment
/// ending on a tool-calling turn loses that turn, since its results were cut.
fn align_tool_turns(rest: &[&Message], front_end: usize, back_start: usize) -> (usize, usize) {
    let mut front_end = front_end;
    let mut back_start = back_start;

    let orphans = rest[back_start..]
        .iter()
        .take_while(|m| m.role == Role::Tool)
        .count();
    if orphans > 0 {
        let owner = rest[..back_start]
            .iter()
            .rposition(|m| m.role != Role::Tool)
            .filter(|&i| rest[i].has_tool_calls());
        match owner {
            Some(owner) if back_start - owner <= front_end => {
                front_end -= back_start - owner;
                back_start = owner;
            }
            _ => back_start += orphans,
        }
    }

    while front_end > 0 && rest[front_end - 1].has_tool_calls() {
        front_end -= 1;
    }
    (front_end, back_start)
}

fn marker_role(last_front: Option<Role>, first_back: Option<Role>) -> Option<Role> {
    match (last_front, first_back) {
        (Some(front), Some(back)) if front == back => Some(opposite(front)),
        (Some(_), _) => None,
        (None, Some(Role::User)) => None,
        (None, _) => Some(Role::User),
    }
}

fn opposite(role: Role) -> Role {
    match role {
        Role::User => Role::Assistant,
        _ => Role::User,
    }
}

fn marker(role: Role) -> Message {
    match role {
        Role::Assistant => Message::assistant(TRUNCATION_MARKER),
        _ => Message::user(TRUNCATION_MARKER),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ToolCall;
    use pretty_assertions::assert_eq;

    fn users(n: usize) -> Vec<Message> {
        (1..=n).map(|i| Message::user(format!("u{i}"))).collect()
    }

    #[test]
    fn short_history_is_returned_unchanged() {
        let mut messages = vec![Message::system("sys")];
        messages.extend(users(3));

        assert_eq!(slide_window_compression(&messages, 4), messages);
    }

    #[test]
    fn same_role_seam_gets_opposite_marker() {
        let mut messages = vec![Message::system("sys")];
        messages.extend(users(10));

        let compressed = slide_window_compression(&messages, 4);

        assert_eq!(
            compressed,
            vec![
                Message::system("sys"),
                Message::user("u1"),
                Message::assistant(TRUNCATION_MARKER),
                Message::user("u9"),
                Message::user("u10"),
            ]
        );
    }

    #[test]
    fn alternating_seam_needs_no_marker() {
        let mut messages = vec![Message::system("sys")];
        for i in 0..11 {
            if i % 2 == 0 {
                messages.push(Message::user(format!("q{i}")));
            } else {
                messages.push(Message::assistant(format!("a{i}")));
            }
        }

        let compressed = slide_window_compression(&messages, 6);

        let contents: Vec<&str> = compressed.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["sys", "q0", "a7", "q8", "a9", "q10"]);
    }

    #[test]
    fn empty_front_inserts_user_marker_before_assistant_tail() {
        let messages = vec![
            Message::system("sys"),
            Message::user("q1"),
            Message::assistant("a1"),
            Message::user("q2"),
            Message::assistant("a2"),
            Message::user("q3"),
        ];

        let compressed = slide_window_compression(&messages, 2);

        assert_eq!(
            compressed,
            vec![
                Message::system("sys"),
                Message::user(TRUNCATION_MARKER),
                Message::assistant("a2"),
                Message::user("q3"),
            ]
        );
    }

    #[test]
    fn keeps_system_and_newest_message() {
        let mut messages = vec![Message::system("sys")];
        messages.extend(users(40));

        let compressed = slide_window_compression(&messages, 9);

        assert_eq!(compressed[0], Message::system("sys"));
        assert_eq!(compressed.last(), messages.last());
        assert!(compressed.len() <= 9 + 2);
    }

    fn two_calls() -> Message {
        Message::assistant_tool_calls(
            "",
            vec![ToolCall::new("c1", "add", "{}"), ToolCall::new("c2", "add", "{}")],
        )
    }

    #[test]
    fn back_segment_widens_to_the_owning_tool_call() {
        let mut messages = vec![Message::system("sys")];
        messages.extend(users(4));
        messages.push(two_calls());
        messages.push(Message::tool_result("c1", "add", "1"));
        messages.push(Message::tool_result("c2", "add", "2"));
        messages.push(Message::assistant("a"));
        messages.push(Message::user("next"));

        let compressed = slide_window_compression(&messages, 7);

        assert_eq!(
            compressed,
            vec![
                Message::system("sys"),
                Message::user("u1"),
                two_calls(),
                Message::tool_result("c1", "add", "1"),
                Message::tool_result("c2", "add", "2"),
                Message::assistant("a"),
                Message::user("next"),
            ]
        );
    }

    #[test]
    fn orphaned_results_are_dropped_when_front_cannot_pay() {
        let mut messages = vec![Message::system("sys")];
        messages.extend(users(6));
        messages.push(Message::assistant_tool_calls(
            "",
            vec![
                ToolCall::new("c1", "add", "{}"),
                ToolCall::new("c2", "add", "{}"),
                ToolCall::new("c3", "add", "{}"),
            ],
        ));
        messages.push(Message::tool_result("c1", "add", "1"));
        messages.push(Message::tool_result("c2", "add", "2"));
        messages.push(Message::tool_result("c3", "add", "3"));
        messages.push(Message::assistant("sum is 6"));

        let compressed = slide_window_compression(&messages, 4);

        assert_eq!(
            compressed,
            vec![
                Message::system("sys"),
                Message::user("u1"),
                Message::assistant("sum is 6"),
            ]
        );
    }

    #[test]
    fn front_segment_drops_a_dangling_tool_call() {
        let mut messages = vec![Message::system("sys"), Message::user("u0"), two_calls()];
        messages.push(Message::tool_result("c1", "add", "1"));
        messages.extend(users(7));

        let compressed = slide_window_compression(&messages, 7);

        assert_eq!(
            compressed,
            vec![
                Message::system("sys"),
                Message::user("u0"),
                Message::assistant(TRUNCATION_MARKER),
                Message::user("u4"),
                Message::user("u5"),
                Message::user("u6"),
                Message::user("u7"),
            ]
        );
    }
}
