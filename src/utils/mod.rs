// Shared helpers

/// Maximum length of a derived file name stem
const MAX_FILENAME_LEN: usize = 180;

/// Derive a safe file name stem from a free-form title.
///
/// Characters outside `[A-Za-z0-9_.-]` become underscores; the result is
/// capped at 180 characters and never empty.
pub fn safe_filename(name: &str) -> String {
    let mut out: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-') {
                c
            } else {
                '_'
            }
        })
        .take(MAX_FILENAME_LEN)
        .collect();
    if out.is_empty() {
        out.push_str("clip");
    }
    out
}

/// Truncate a message for user display, appending an ellipsis when cut
pub fn truncate_for_display(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    format!("{}…", cut)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_filename_replaces_specials() {
        assert_eq!(safe_filename("My Video: part 1"), "My_Video__part_1");
        assert_eq!(safe_filename("clip.mp4"), "clip.mp4");
    }

    #[test]
    fn test_safe_filename_caps_length() {
        let long = "a".repeat(400);
        assert_eq!(safe_filename(&long).len(), 180);
    }

    #[test]
    fn test_safe_filename_never_empty() {
        assert_eq!(safe_filename(""), "clip");
    }

    #[test]
    fn test_truncate_for_display() {
        assert_eq!(truncate_for_display("short", 10), "short");
        assert_eq!(truncate_for_display("0123456789abc", 10), "0123456789…");
    }
}
