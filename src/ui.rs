use colored::Colorize;
use similar::{ChangeTag, TextDiff};

/// Print an info message
pub fn info(msg: &str) {
    println!("{} {}", "ℹ".blue(), msg);
}

/// Print a success message
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print a warning message
pub fn warn(msg: &str) {
    println!("{} {}", "⚠".yellow(), msg);
}

/// Print a dim/muted message
pub fn dim(msg: &str) {
    println!("  {}", msg.dimmed());
}

/// Print a header/title
pub fn header(title: &str) {
    println!();
    println!("{}", title.bold());
    println!("{}", "─".repeat(title.chars().count()).dimmed());
}

/// Print a key-value pair
pub fn kv(key: &str, value: &str) {
    println!("  {}: {}", key.dimmed(), value);
}

// ============================================================================
// Diffs
// ============================================================================

/// Inserted and deleted lines between two texts
pub fn changed_lines(before: &str, after: &str) -> Vec<(ChangeTag, String)> {
    TextDiff::from_lines(before, after)
        .iter_all_changes()
        .filter(|change| change.tag() != ChangeTag::Equal)
        .map(|change| (change.tag(), change.value().trim_end().to_string()))
        .collect()
}

/// Print a line diff, or a note when nothing changes
pub fn diff(before: &str, after: &str) {
    let changes = changed_lines(before, after);
    if changes.is_empty() {
        println!("    {}", "(no changes)".dimmed());
        return;
    }
    for (tag, line) in changes {
        match tag {
            ChangeTag::Delete => println!("    {}", format!("- {line}").red()),
            ChangeTag::Insert => println!("    {}", format!("+ {line}").green()),
            ChangeTag::Equal => {}
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_changed_lines_only_reports_changes() {
        let before = "<a>\n    <b/>\n</a>\n";
        let after = "<a>\n    <b/>\n    <c/>\n</a>\n";
        let changes = changed_lines(before, after);
        assert_eq!(changes, vec![(ChangeTag::Insert, "    <c/>".to_string())]);
    }

    #[test]
    fn test_changed_lines_identical() {
        assert!(changed_lines("same\n", "same\n").is_empty());
    }

    #[test]
    fn test_changed_lines_replacement() {
        let changes = changed_lines("x=\"1\"\n", "x=\"2\"\n");
        assert_eq!(
            changes,
            vec![
                (ChangeTag::Delete, "x=\"1\"".to_string()),
                (ChangeTag::Insert, "x=\"2\"".to_string()),
            ]
        );
    }
}
