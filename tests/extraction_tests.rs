//! Structured output extraction through the public API.

use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use curia::output::extract_json_object;

fn samples() -> Vec<Value> {
    vec![
        json!({}),
        json!({ "summary": "s", "final_answer": "a" }),
        json!({ "list": [1, 2.5, -3], "flag": false, "none": null }),
        json!({ "nested": { "deeper": { "text": "braces } inside { strings" } } }),
        json!({ "unicode": "naïve café", "escaped": "line\nbreak \"quoted\"" }),
    ]
}

#[test]
fn fenced_objects_come_back_unchanged() {
    for value in samples() {
        for tag in ["json", "js", "javascript", "text"] {
            let pretty = serde_json::to_string_pretty(&value).unwrap();
            let text = format!("Result:\n```{tag}\n{pretty}\n```\nThanks.");
            assert_eq!(extract_json_object(&text), Some(value.clone()), "tag {tag}");
        }
    }
}

#[test]
fn bare_objects_come_back_unchanged() {
    for value in samples() {
        assert_eq!(extract_json_object(&value.to_string()), Some(value));
    }
}

#[test]
fn sloppy_variants_are_repaired() {
    let canonical = json!({ "name": "curia", "tags": ["a", "b"] });
    let variants = [
        r#"{"name": "curia", "tags": ["a", "b",],}"#,
        "{'name': 'curia', 'tags': ['a', 'b']}",
        "```json\n{'name': 'curia', 'tags': ['a', 'b',]}\n```",
    ];
    for variant in variants {
        assert_eq!(extract_json_object(variant), Some(canonical.clone()), "{variant}");
    }
}

#[test]
fn prose_yields_nothing() {
    for text in ["The answer is yes.", "```\nno json here\n```", "{ unbalanced"] {
        assert_eq!(extract_json_object(text), None, "{text}");
    }
}
