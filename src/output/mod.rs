// Output formatting — terminal display and JSON reports.
//
// The engine hands back unordered sets. Everything here imposes a sorted
// order so output is stable from run to run.

pub mod json;
pub mod terminal;

use std::collections::HashSet;

/// Items of a set in sorted order.
pub fn sorted(items: &HashSet<String>) -> Vec<&str> {
    let mut out: Vec<&str> = items.iter().map(String::as_str).collect();
    out.sort_unstable();
    out
}

/// The first `max_items` of a set in sorted order, comma-separated, with
/// "..." appended when items were left out.
pub fn preview(items: &HashSet<String>, max_items: usize) -> String {
    let all = sorted(items);
    let shown = all[..all.len().min(max_items)].join(", ");
    if all.len() > max_items {
        format!("{shown}...")
    } else {
        shown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> HashSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_preview_sorted_and_complete() {
        assert_eq!(preview(&set(&["b", "a", "c"]), 5), "a, b, c");
    }

    #[test]
    fn test_preview_truncates_with_ellipsis() {
        let items = set(&["f", "e", "d", "c", "b", "a"]);
        assert_eq!(preview(&items, 5), "a, b, c, d, e...");
    }

    #[test]
    fn test_preview_exact_fit_has_no_ellipsis() {
        assert_eq!(preview(&set(&["a", "b"]), 2), "a, b");
    }

    #[test]
    fn test_preview_empty() {
        assert_eq!(preview(&HashSet::new(), 5), "");
    }
}
