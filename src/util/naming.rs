//! Participant and tool name normalization.

/// Lower-case a name and collapse whitespace runs into `_`.
///
/// Leading and trailing whitespace is dropped.
pub fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_joins_words() {
        assert_eq!(normalize_name("My Tool"), "my_tool");
        assert_eq!(normalize_name("  Tax   Expert\tBot "), "tax_expert_bot");
    }

    #[test]
    fn keeps_existing_underscores() {
        assert_eq!(normalize_name("already_normal"), "already_normal");
    }

    #[test]
    fn blank_name_stays_empty() {
        assert_eq!(normalize_name("   "), "");
    }
}
