//! HTML and plain-text output for a built table.
//!
//! Rows follow the inspection page's markup: the source cell carries a
//! tooltip with the previous row, the hypothesis cell a tooltip listing the
//! references with their WER.

use std::fmt::Write;

use crate::table::{PreviousRow, RenderedReference, Row, Table};

/// Escape text for use inside a single- or double-quoted HTML attribute
pub fn escape_attr(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '>' => escaped.push_str("&gt;"),
            '<' => escaped.push_str("&lt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn format_wer(wer: Option<f64>) -> String {
    wer.map_or_else(|| "n/a".to_string(), |w| w.to_string())
}

/// Tooltip content describing the previous row
pub fn previous_tooltip(previous: Option<&PreviousRow>) -> String {
    match previous {
        Some(previous) => format!(
            "<b>Previous (source):</b> {}<br><b>Previous (reference):</b> {}<br><b>Previous (translation):</b> {}",
            previous.source, previous.reference, previous.translation
        ),
        None => "(None)".to_string(),
    }
}

/// Tooltip content listing the references
pub fn references_tooltip(references: &[RenderedReference]) -> String {
    references.iter().fold(String::new(), |mut list, reference| {
        let _ = write!(
            list,
            "<li>{} <b>(WER: {}&#37;)</b></li>",
            reference.text,
            format_wer(reference.wer)
        );
        list
    })
}

/// One `<tr>` for the output table
pub fn render_row(row: &Row) -> String {
    format!(
        "<tr><td>{index}</td>\
         <td><a href='#' tooltip-title='Contextual factors' tooltip-content='{context}'>{source}</a></td>\
         <td><a href='#' tooltip-title='Reference translations' tooltip-content='{refs}'>{translation}</a></td></tr>",
        index = row.index,
        context = escape_attr(&previous_tooltip(row.previous.as_ref())),
        source = row.source,
        refs = escape_attr(&references_tooltip(&row.references)),
        translation = row.translation_highlighted,
    )
}

/// All rows, one per line
pub fn render_rows(table: &Table) -> String {
    table
        .rows
        .iter()
        .map(render_row)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Lowercased words with punctuation removed
fn normalise(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect::<String>()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Whether the hypothesis equals some reference up to case and punctuation
fn matches_reference(row: &Row) -> bool {
    let translation = normalise(&row.translation);
    row.references
        .iter()
        .any(|reference| normalise(&reference.plain) == translation)
}

/// Console report with one block per erroneous row.
///
/// Rows whose hypothesis matches a reference once case and punctuation are
/// ignored are left out of the blocks but still counted in the total.
pub fn render_text(table: &Table) -> String {
    let mut report = String::new();
    for row in table.rows.iter().filter(|row| !matches_reference(row)) {
        if let Some(previous) = &row.previous {
            let _ = writeln!(report, "Previous line (reference):\t{}", previous.reference);
        }
        let _ = writeln!(report, "Source line:\t\t\t{}", row.source);
        for reference in &row.references {
            let _ = writeln!(
                report,
                "Current line (reference):\t{} (WER: {}%)",
                reference.plain,
                format_wer(reference.wer)
            );
        }
        let _ = writeln!(report, "Current line (actual):\t\t{}", row.translation);
        let _ = writeln!(report, "----------------------");
    }
    let _ = writeln!(report, "{} outputs", table.total);
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterStats;

    fn row(index: usize, previous: Option<PreviousRow>) -> Row {
        Row {
            index,
            source: "Hei, verden".to_string(),
            translation: "Hi, world".to_string(),
            translation_highlighted: "<span class='s-colour'>Hi</span>, world".to_string(),
            references: vec![RenderedReference {
                text: "<span class='s-colour'>Hello</span>, world".to_string(),
                plain: "Hello, world".to_string(),
                wer: Some(50.0),
                scored: true,
            }],
            previous,
        }
    }

    #[test]
    fn test_escape_attr() {
        assert_eq!(
            escape_attr(r#"<a href='x'>"&"</a>"#),
            "&lt;a href=&apos;x&apos;&gt;&quot;&amp;&quot;&lt;/a&gt;"
        );
        assert_eq!(escape_attr("plain"), "plain");
    }

    #[test]
    fn test_previous_tooltip() {
        assert_eq!(previous_tooltip(None), "(None)");

        let previous = PreviousRow {
            source: "s".to_string(),
            reference: "r".to_string(),
            translation: "t".to_string(),
        };
        assert_eq!(
            previous_tooltip(Some(&previous)),
            "<b>Previous (source):</b> s<br><b>Previous (reference):</b> r<br><b>Previous (translation):</b> t"
        );
    }

    #[test]
    fn test_references_tooltip() {
        let mut references = row(1, None).references;
        references.push(RenderedReference {
            text: "Hi there".to_string(),
            plain: "Hi there".to_string(),
            wer: None,
            scored: false,
        });

        assert_eq!(
            references_tooltip(&references),
            "<li><span class='s-colour'>Hello</span>, world <b>(WER: 50&#37;)</b></li>\
             <li>Hi there <b>(WER: n/a&#37;)</b></li>"
        );
    }

    #[test]
    fn test_render_row() {
        let html = render_row(&row(1, None));

        assert!(html.starts_with("<tr><td>1</td>"));
        assert!(html.contains("tooltip-content='(None)'>Hei, verden</a>"));
        // markup inside the tooltip attribute is escaped, the cell itself is not
        assert!(html.contains("&lt;span class=&apos;s-colour&apos;&gt;Hello&lt;/span&gt;"));
        assert!(html.ends_with("<span class='s-colour'>Hi</span>, world</a></td></tr>"));
    }

    #[test]
    fn test_render_text_report() {
        let table = Table {
            rows: vec![
                row(1, None),
                row(
                    2,
                    Some(PreviousRow {
                        source: "Hei, verden".to_string(),
                        reference: "Hello, world".to_string(),
                        translation: "Hi, world".to_string(),
                    }),
                ),
            ],
            total: 2,
            stats: FilterStats::default(),
        };

        let report = render_text(&table);
        assert_eq!(report.matches("Source line:").count(), 2);
        assert_eq!(report.matches("Previous line (reference):").count(), 1);
        assert!(report.contains("Current line (reference):\tHello, world (WER: 50%)"));
        assert!(report.ends_with("2 outputs\n"));

        assert_eq!(render_rows(&table).lines().count(), 2);
    }

    #[test]
    fn test_render_text_skips_matching_rows() {
        let mut exact = row(1, None);
        exact.translation = "hello world!".to_string();
        let table = Table {
            rows: vec![exact, row(2, None)],
            total: 2,
            stats: FilterStats::default(),
        };

        let report = render_text(&table);
        assert_eq!(report.matches("Source line:").count(), 1);
        assert!(!report.contains("hello world!"));
        assert!(report.contains("Current line (actual):\t\tHi, world"));
        assert!(report.ends_with("2 outputs\n"));
        // the HTML keeps every row
        assert_eq!(render_rows(&table).lines().count(), 2);
    }

    #[test]
    fn test_normalise_ignores_case_and_punctuation() {
        assert_eq!(normalise("Hello , World!"), "hello world");
        assert_eq!(normalise("Hello, world"), normalise("hello world ."));
    }
}
