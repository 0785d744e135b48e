//! Coverage table
//!
//! Renders a [`CoverageSnapshot`] as a boxed terminal table:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │ OpenAPI coverage                                             │
//! ├──────────────────────────────────────────────────────────────┤
//! │ products.yaml                                                │
//! ├─────────────┬────────────────────────────────────────────────┤
//! │ Path        │                    Coverage                    │
//! ├───┬─────────┼────────────┬────────────────────┬──────────────┤
//! │   │ Method  │ Percentage │ Covered Responses  │ Uncovered ...│
//! ```

use crate::config::TableStyle;
use apicov::{CoverageSnapshot, ResponseStatus};
use console::{style, Color};
use tabled::builder::Builder;
use tabled::settings::object::Cell;
use tabled::settings::{Alignment, Span, Style};
use tabled::Table;

/// How a row's cells are laid out across the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RowLayout {
    /// One cell across the whole table
    Full,
    /// Two columns, then one cell across the rest
    Split,
    /// One cell per column
    Plain,
}

/// Renders coverage snapshots as tables
#[derive(Debug, Clone, Copy)]
pub struct CoverageTable {
    style: TableStyle,
    use_color: bool,
}

impl CoverageTable {
    /// Create a renderer
    #[must_use]
    pub const fn new(style: TableStyle, use_color: bool) -> Self {
        Self { style, use_color }
    }

    const fn columns(&self) -> usize {
        match self.style {
            TableStyle::Wide => 5,
            TableStyle::Compact => 3,
        }
    }

    fn paint(&self, text: &str, color: Color) -> String {
        if self.use_color {
            style(text).fg(color).force_styling(true).to_string()
        } else {
            text.to_string()
        }
    }

    /// Percentage with `%`, green at 100 and red at 0
    #[must_use]
    pub fn percentage(&self, value: u32) -> String {
        let text = format!("{value}%");
        if value >= 100 {
            self.paint(&text, Color::Green)
        } else if value == 0 {
            self.paint(&text, Color::Red)
        } else {
            text
        }
    }

    fn rows(&self, snapshot: &CoverageSnapshot, spec_name: &str) -> Vec<(RowLayout, Vec<String>)> {
        let wide = self.style == TableStyle::Wide;
        let mut rows = vec![
            (RowLayout::Full, vec!["OpenAPI coverage".to_string()]),
            (RowLayout::Full, vec![spec_name.to_string()]),
        ];
        if !snapshot.title.is_empty() {
            rows.push((RowLayout::Full, vec![snapshot.title.clone()]));
        }
        rows.push((
            RowLayout::Split,
            vec!["Path".to_string(), "Coverage".to_string()],
        ));

        let mut header: Vec<String> = ["", "Method", "Percentage"].map(String::from).to_vec();
        if wide {
            header.push("Covered Responses".to_string());
            header.push("Uncovered Responses".to_string());
        }
        rows.push((RowLayout::Plain, header));

        for (template, path) in &snapshot.paths {
            rows.push((
                RowLayout::Split,
                vec![template.clone(), self.percentage(path.call_percentage)],
            ));

            for (method, coverage) in &path.methods {
                let mut row = vec![
                    String::new(),
                    method.clone(),
                    self.percentage(coverage.call_percentage),
                ];
                if wide {
                    let covered = coverage
                        .responses_with(ResponseStatus::Covered)
                        .map(|code| self.paint(&format!("+{code}"), Color::Green))
                        .chain(
                            coverage
                                .responses_with(ResponseStatus::Unexpected)
                                .map(|code| self.paint(&format!("!{code}"), Color::Yellow)),
                        );
                    let uncovered = coverage
                        .responses_with(ResponseStatus::Uncovered)
                        .map(|code| self.paint(&format!("-{code}"), Color::Red));
                    row.push(covered.collect::<Vec<_>>().join(" "));
                    row.push(uncovered.collect::<Vec<_>>().join(" "));
                }
                rows.push((RowLayout::Plain, row));
            }
        }

        rows.push((
            RowLayout::Split,
            vec![
                "Total API Coverage".to_string(),
                self.percentage(snapshot.call_percentage),
            ],
        ));
        rows
    }

    /// Build the table for a snapshot
    #[must_use]
    pub fn table(&self, snapshot: &CoverageSnapshot, spec_name: &str) -> Table {
        let columns = self.columns();
        let rows = self.rows(snapshot, spec_name);

        // Spanned-over cells still exist in the grid, left empty
        let mut builder = Builder::default();
        for (layout, cells) in &rows {
            let mut record = vec![String::new(); columns];
            match layout {
                RowLayout::Full | RowLayout::Plain => {
                    for (slot, cell) in record.iter_mut().zip(cells) {
                        slot.clone_from(cell);
                    }
                }
                RowLayout::Split => {
                    let mut cells = cells.iter();
                    if let Some(left) = cells.next() {
                        record[0].clone_from(left);
                    }
                    if let Some(right) = cells.next() {
                        record[2].clone_from(right);
                    }
                }
            }
            builder.push_record(record);
        }

        let mut table = builder.build();
        table.with(Style::modern());
        for (row, (layout, _)) in rows.iter().enumerate() {
            match layout {
                RowLayout::Full => {
                    table.modify(Cell::new(row, 0), Span::column(columns as _));
                }
                RowLayout::Split => {
                    table.modify(Cell::new(row, 0), Span::column(2));
                    table.modify(Cell::new(row, 2), Span::column((columns - 2) as _));
                }
                RowLayout::Plain => {}
            }
        }
        // "Coverage" heading
        let heading = rows
            .iter()
            .position(|(layout, _)| *layout == RowLayout::Split)
            .unwrap_or_default();
        table.modify(Cell::new(heading, 2), Alignment::center());
        table
    }

    /// Render a snapshot
    #[must_use]
    pub fn render(&self, snapshot: &CoverageSnapshot, spec_name: &str) -> String {
        self.table(snapshot, spec_name).to_string()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use apicov::{CoverageSession, Document, Operation, PathItem, RecordOptions};
    use console::measure_text_width;

    fn snapshot() -> CoverageSnapshot {
        let mut session = CoverageSession::new(
            Document::new()
                .with_title("Pets")
                .with_server("http://h")
                .with_path(
                    PathItem::new("/pets")
                        .with_operation(Operation::new("get").with_responses(["200", "401"]))
                        .with_operation(Operation::new("post").with_responses(["201"])),
                ),
        );
        let options = RecordOptions::new();
        let _ = session.record_exchange("http://h/pets", "GET", "200", &options);
        let _ = session.record_exchange("http://h/pets", "GET", "500", &options);
        session.snapshot()
    }

    fn widths(rendered: &str) -> Vec<usize> {
        rendered.lines().map(measure_text_width).collect()
    }

    mod layout_tests {
        use super::*;

        #[test]
        fn test_all_lines_have_equal_width() {
            let rendered = CoverageTable::new(TableStyle::Wide, false).render(&snapshot(), "pets.yaml");
            let widths = widths(&rendered);
            assert!(widths.windows(2).all(|w| w[0] == w[1]), "{rendered}");
        }

        #[test]
        fn test_colored_lines_have_equal_width() {
            let rendered = CoverageTable::new(TableStyle::Wide, true).render(&snapshot(), "pets.yaml");
            let widths = widths(&rendered);
            assert!(widths.windows(2).all(|w| w[0] == w[1]), "{rendered}");
        }

        #[test]
        fn test_box_drawing_borders() {
            let rendered = CoverageTable::new(TableStyle::Compact, false).render(&snapshot(), "pets.yaml");
            let lines: Vec<&str> = rendered.lines().collect();
            assert!(lines[0].starts_with('┌'));
            assert!(lines[lines.len() - 1].starts_with('└'));
            assert!(rendered.contains('┼'));
        }

        #[test]
        fn test_long_title_widens_table() {
            let snap = snapshot().with_title("A title much longer than any column in the grid");
            let rendered = CoverageTable::new(TableStyle::Compact, false).render(&snap, "pets.yaml");
            assert!(rendered.contains("A title much longer than any column in the grid"));
            let widths = widths(&rendered);
            assert!(widths.windows(2).all(|w| w[0] == w[1]), "{rendered}");
        }

        #[test]
        fn test_untitled_snapshot_skips_title_row() {
            let table = CoverageTable::new(TableStyle::Wide, false);
            let titled = table.table(&snapshot(), "x.yaml");
            let untitled = table.table(&snapshot().with_title(""), "x.yaml");
            // header rows, path, two methods, total
            assert_eq!(titled.count_rows(), 5 + 1 + 2 + 1);
            assert_eq!(untitled.count_rows(), 4 + 1 + 2 + 1);
        }
    }

    mod coverage_tests {
        use super::*;

        #[test]
        fn test_wide_report_rows() {
            let rendered = CoverageTable::new(TableStyle::Wide, false).render(&snapshot(), "pets.yaml");
            assert!(rendered.contains("OpenAPI coverage"));
            assert!(rendered.contains("pets.yaml"));
            assert!(rendered.contains("Pets"));
            assert!(rendered.contains("Covered Responses"));
            assert!(rendered.contains("Uncovered Responses"));
            assert!(rendered.contains("/pets"));
            assert!(rendered.contains("+200 !500"));
            assert!(rendered.contains("-401"));
            assert!(rendered.contains("-201"));
            assert!(rendered.contains("Total API Coverage"));
            assert!(rendered.contains("33%"));
        }

        #[test]
        fn test_compact_report_has_no_response_columns() {
            let rendered = CoverageTable::new(TableStyle::Compact, false).render(&snapshot(), "pets.yaml");
            assert!(!rendered.contains("Covered Responses"));
            assert!(!rendered.contains("+200"));
            assert!(rendered.contains("50%"));
            assert!(rendered.contains("Total API Coverage"));
        }

        #[test]
        fn test_percentage_colors() {
            let table = CoverageTable::new(TableStyle::Wide, true);
            assert!(table.percentage(100).contains("\u{1b}["));
            assert!(table.percentage(0).contains("\u{1b}["));
            assert_eq!(table.percentage(50), "50%");
        }

        #[test]
        fn test_no_color_is_plain() {
            let table = CoverageTable::new(TableStyle::Wide, false);
            assert_eq!(table.percentage(100), "100%");
            assert_eq!(table.percentage(0), "0%");
        }
    }
}
