//! Common types and utilities shared across CLI commands.

use clap::ValueEnum;
use clicrepo::catalog::{SortKey, SortOrder};
use clicrepo::ProjectSummary;

/// Catalog sort field for CLI arguments.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
pub enum SortArg {
    /// Publication date
    #[default]
    Date,
    /// Project title
    Title,
    /// Author name
    Author,
}

impl From<SortArg> for SortKey {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Date => SortKey::Date,
            SortArg::Title => SortKey::Title,
            SortArg::Author => SortKey::Author,
        }
    }
}

/// Sort direction from the `--desc` flag.
pub fn sort_order(descending: bool) -> SortOrder {
    if descending {
        SortOrder::Descending
    } else {
        SortOrder::Ascending
    }
}

/// Human-readable byte count.
pub fn format_size(bytes: usize) -> String {
    const KB: usize = 1024;
    const MB: usize = KB * 1024;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Truncate `s` to `max` characters, marking the cut with an ellipsis.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

/// One catalog line: path, title, author, date and languages.
pub fn summary_line(project: &ProjectSummary) -> String {
    format!(
        "{:<32} {:<40} {:<24} {:<10} {}",
        truncate(&project.path, 32),
        truncate(&project.title, 40),
        truncate(&project.author, 24),
        project.date.as_deref().unwrap_or("-"),
        project.lang_codes.join(",")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(3 * 1024 * 1024 + 512 * 1024), "3.5 MB");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("Matemàtiques bàsiques", 8), "Matemàt…");
    }

    #[test]
    fn test_sort_arg_maps_to_key() {
        assert_eq!(SortKey::from(SortArg::Author), SortKey::Author);
        assert_eq!(sort_order(true), SortOrder::Descending);
        assert_eq!(sort_order(false), SortOrder::Ascending);
    }
}
