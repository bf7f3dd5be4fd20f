//! Stopwatch keyboard shortcuts.

/// What a key press asks the stopwatch to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    /// Space: start when stopped, pause when running.
    Toggle,
    /// L
    Lap,
    /// R
    Reset,
}

/// Map a `KeyboardEvent`'s `code` and `key` to a shortcut. Keys typed into a
/// text field never count.
pub fn stopwatch_shortcut(code: &str, key: &str, typing_in_field: bool) -> Option<Shortcut> {
    if typing_in_field {
        return None;
    }
    if code == "Space" {
        return Some(Shortcut::Toggle);
    }
    match key.to_ascii_lowercase().as_str() {
        "l" => Some(Shortcut::Lap),
        "r" => Some(Shortcut::Reset),
        _ => None,
    }
}

/// Whether a focused element's tag name is a text-entry field.
pub fn is_text_field(tag_name: &str) -> bool {
    matches!(tag_name.to_ascii_uppercase().as_str(), "INPUT" | "TEXTAREA")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_keys() {
        assert_eq!(stopwatch_shortcut("Space", " ", false), Some(Shortcut::Toggle));
        assert_eq!(stopwatch_shortcut("KeyL", "L", false), Some(Shortcut::Lap));
        assert_eq!(stopwatch_shortcut("KeyR", "r", false), Some(Shortcut::Reset));
        assert_eq!(stopwatch_shortcut("KeyX", "x", false), None);
    }

    #[test]
    fn ignores_keys_typed_into_fields() {
        assert_eq!(stopwatch_shortcut("Space", " ", true), None);
        assert!(is_text_field("input"));
        assert!(is_text_field("TEXTAREA"));
        assert!(!is_text_field("BUTTON"));
    }
}
