//! Startup summary table.
//!
//! One row per endpoint, aligned as plain text. Styling is left to the caller.

use crate::endpoint::Rule;

pub const COLUMNS: [&str; 9] = [
    "name",
    "port",
    "path",
    "methods",
    "input",
    "code",
    "output",
    "errorCode",
    "errorMessage",
];

/// Placeholder for unset fields
const UNSET: &str = "-";

/// The printable cells of one rule, in `COLUMNS` order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRow {
    pub cells: [String; 9],
}

impl Rule {
    pub fn summary_row(&self) -> SummaryRow {
        let or_unset = |value: Option<String>| value.unwrap_or_else(|| UNSET.to_string());
        SummaryRow {
            cells: [
                self.display_name().to_string(),
                self.port.to_string(),
                self.path.clone(),
                self.methods_label(),
                or_unset(self.expected_input.as_ref().map(|input| input.to_string())),
                or_unset(self.success_code.map(|code| code.to_string())),
                or_unset(self.success_output.clone()),
                or_unset(self.error_code.map(|code| code.to_string())),
                or_unset(self.error_message.clone()),
            ],
        }
    }
}

/// Lay rows out as a table.
///
/// The first line is the header, the second a separator, then one line per
/// row. Columns are padded to their widest cell.
pub fn render_table(rows: &[SummaryRow]) -> Vec<String> {
    let mut widths = COLUMNS.map(str::len);
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(&row.cells) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(pad_line(COLUMNS.into_iter(), &widths));
    lines.push(
        widths
            .iter()
            .map(|width| "-".repeat(*width))
            .collect::<Vec<_>>()
            .join("-+-"),
    );
    for row in rows {
        lines.push(pad_line(row.cells.iter().map(String::as_str), &widths));
    }
    lines
}

fn pad_line<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    cells
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
        .collect::<Vec<_>>()
        .join(" | ")
        .trim_end()
        .to_string()
}
