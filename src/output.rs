//! CLI output formatting for all pipeline stages.
//!
//! Each stage has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure — no I/O, no side effects.
//!
//! ## Index
//!
//! ```text
//! Assets
//! background (2 types, 3 items)
//!     blue: 1 item
//!     red: 2 items
//! character (1 type, 1 item)
//!     robot: 1 item
//! ```
//!
//! ## Generate
//!
//! ```text
//! 001 background: a red, character: bolt robot
//! 002 background: c blue, character: bolt robot, overlay: gold frame
//! Generated 2 images starting at #1 (3 duplicates retried)
//! ```

use crate::convert::ConvertSummary;
use crate::generate::RunSummary;
use crate::index::AssetIndex;
use crate::manifest::Manifest;

/// Format a 1-based id as 3-digit zero-padded.
fn format_id(id: u32) -> String {
    format!("{:0>3}", id)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{} {}", n, word)
    } else {
        format!("{} {}s", n, word)
    }
}

/// One-line rendering of a manifest: `category: value, category: value`.
fn manifest_line(manifest: &Manifest) -> String {
    manifest
        .iter()
        .map(|(category, value)| format!("{}: {}", category, value))
        .collect::<Vec<_>>()
        .join(", ")
}

// ============================================================================
// Index
// ============================================================================

pub fn format_index_output(index: &AssetIndex) -> Vec<String> {
    let mut lines = vec!["Assets".to_string()];

    for category in index.categories() {
        let types = index.types(category).unwrap_or_default();
        let item_total: usize = types
            .iter()
            .map(|t| index.items(category, t).map(|i| i.len()).unwrap_or(0))
            .sum();
        lines.push(format!(
            "{} ({}, {})",
            category,
            plural(types.len(), "type"),
            plural(item_total, "item")
        ));
        for type_name in types {
            let count = index.items(category, type_name).map(|i| i.len()).unwrap_or(0);
            lines.push(format!(
                "{}{}: {}",
                indent(1),
                type_name,
                plural(count, "item")
            ));
        }
    }

    lines
}

pub fn print_index_output(index: &AssetIndex) {
    for line in format_index_output(index) {
        println!("{}", line);
    }
}

// ============================================================================
// Generate
// ============================================================================

pub fn format_generated_line(id: u32, manifest: &Manifest) -> String {
    format!("{} {}", format_id(id), manifest_line(manifest))
}

pub fn format_run_summary(summary: &RunSummary) -> Vec<String> {
    let mut lines: Vec<String> = summary
        .images
        .iter()
        .map(|image| format_generated_line(image.id, &image.manifest))
        .collect();

    let mut tail = format!(
        "Generated {} starting at #{}",
        plural(summary.produced(), "image"),
        summary.start
    );
    if summary.retries > 0 {
        tail.push_str(&format!(
            " ({} retried)",
            plural(summary.retries as usize, "duplicate")
        ));
    }
    lines.push(tail);
    lines
}

pub fn print_run_summary(summary: &RunSummary) {
    for line in format_run_summary(summary) {
        println!("{}", line);
    }
}

// ============================================================================
// Convert
// ============================================================================

pub fn format_convert_summary(summary: &ConvertSummary) -> Vec<String> {
    let mut lines: Vec<String> = summary
        .ids
        .iter()
        .map(|id| format!("{} -> {}.json", id, id))
        .collect();
    lines.push(format!("Converted {}", plural(summary.converted(), "record")));
    lines
}

pub fn print_convert_summary(summary: &ConvertSummary) {
    for line in format_convert_summary(summary) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::GeneratedImage;

    fn manifest(bg: &str, ch: &str) -> Manifest {
        let mut m = Manifest::new();
        m.insert("background", bg);
        m.insert("character", ch);
        m
    }

    #[test]
    fn id_is_zero_padded() {
        assert_eq!(format_id(7), "007");
        assert_eq!(format_id(123), "123");
        assert_eq!(format_id(1234), "1234");
    }

    #[test]
    fn generated_line_lists_layers_in_order() {
        let line = format_generated_line(7, &manifest("a red", "b x"));
        assert_eq!(line, "007 background: a red, character: b x");
    }

    #[test]
    fn run_summary_without_retries() {
        let summary = RunSummary {
            start: 1,
            retries: 0,
            images: vec![GeneratedImage {
                id: 1,
                manifest: manifest("a red", "b x"),
            }],
        };

        let lines = format_run_summary(&summary);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], "Generated 1 image starting at #1");
    }

    #[test]
    fn run_summary_mentions_retries() {
        let summary = RunSummary {
            start: 5,
            retries: 3,
            images: vec![
                GeneratedImage {
                    id: 5,
                    manifest: manifest("a red", "b x"),
                },
                GeneratedImage {
                    id: 6,
                    manifest: manifest("c blue", "b x"),
                },
            ],
        };

        let lines = format_run_summary(&summary);
        assert_eq!(
            lines.last().unwrap(),
            "Generated 2 images starting at #5 (3 duplicates retried)"
        );
    }

    #[test]
    fn convert_summary_counts_records() {
        let summary = ConvertSummary {
            ids: vec!["1".to_string(), "2".to_string()],
        };
        let lines = format_convert_summary(&summary);
        assert_eq!(lines.last().unwrap(), "Converted 2 records");
    }

    #[test]
    fn index_output_lists_categories_and_types() {
        let tmp = tempfile::TempDir::new().unwrap();
        for (category, type_name, item) in [
            ("background", "red", "a.png"),
            ("background", "red", "b.png"),
            ("background", "blue", "c.png"),
            ("character", "robot", "bolt.png"),
        ] {
            let dir = tmp.path().join(category).join(type_name);
            std::fs::create_dir_all(&dir).unwrap();
            std::fs::write(dir.join(item), "fake image").unwrap();
        }
        let index = AssetIndex::scan(tmp.path()).unwrap();

        let lines = format_index_output(&index);
        assert_eq!(lines[0], "Assets");
        assert!(lines.contains(&"background (2 types, 3 items)".to_string()));
        assert!(lines.contains(&"    red: 2 items".to_string()));
        assert!(lines.contains(&"character (1 type, 1 item)".to_string()));
    }
}
