//! Plain-text rendering helpers for command output.

use jikan::Resource;
use std::fmt::Display;

/// Shortens `text` to at most `max` characters, marking the cut with "...".
pub fn truncate(text: &str, max: usize) -> String {
    let text = text.trim();
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", kept.trim_end())
}

/// Renders a missing value as "-".
pub fn or_dash<T: Display>(value: Option<T>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

/// Comma-separated resource names, or "-" for an empty list.
pub fn names(resources: &[Resource]) -> String {
    if resources.is_empty() {
        return "-".to_string();
    }
    resources
        .iter()
        .map(|r| r.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// One labelled line of a detail view.
pub fn field(label: &str, value: impl Display) {
    println!("  {:<14} {}", format!("{}:", label), value);
}

pub fn heading(title: &str) {
    println!();
    println!("{}", title);
    println!("{}", "-".repeat(title.chars().count()));
}

/// Marker printed in place of a section whose request failed.
pub fn unavailable(section: &str, err: &jikan::JikanError) {
    heading(section);
    println!("  (unavailable: {})", err);
}

/// Footer for paged listings.
pub fn page_footer(page: u32, pagination: &jikan::Pagination) {
    let last = pagination.last_visible_page.max(page);
    if pagination.has_more_after(page) {
        println!("\nPage {} of {} (use --page {} for more)", page, last, page + 1);
    } else {
        println!("\nPage {} of {}", page, last);
    }
}
