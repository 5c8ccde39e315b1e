//! Table formatting for CLI output.

use console::style;

/// Column alignment
#[derive(Debug, Clone, Copy, Default)]
pub enum Alignment {
    #[default]
    Left,
    Right,
}

/// Table column definition
#[derive(Debug, Clone)]
pub struct Column {
    pub header: String,
    pub alignment: Alignment,
    pub max_width: Option<usize>,
}

impl Column {
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            alignment: Alignment::Left,
            max_width: None,
        }
    }

    pub fn align(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    pub fn max_width(mut self, width: usize) -> Self {
        self.max_width = Some(width);
        self
    }
}

/// Plain table: bold header, dashed separator, three-space gutters.
#[derive(Debug, Clone)]
pub struct Table {
    columns: Vec<Column>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(columns: Vec<Column>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn add_row(&mut self, row: Vec<impl Into<String>>) {
        self.rows.push(row.into_iter().map(Into::into).collect());
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn calculate_widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self
            .columns
            .iter()
            .map(|c| c.header.chars().count())
            .collect();

        for row in &self.rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        for (width, col) in widths.iter_mut().zip(&self.columns) {
            if let Some(max) = col.max_width {
                *width = (*width).min(max);
            }
        }

        widths
    }

    /// Render the table to a string
    pub fn render(&self) -> String {
        let widths = self.calculate_widths();
        let mut output = String::new();

        let header: Vec<_> = self
            .columns
            .iter()
            .zip(&widths)
            .map(|(col, &w)| format_cell(&col.header, w, col.alignment))
            .collect();
        output.push_str(&style(header.join("   ").trim_end()).bold().to_string());
        output.push('\n');

        let sep: Vec<_> = widths.iter().map(|&w| "-".repeat(w)).collect();
        output.push_str(&sep.join("   "));
        output.push('\n');

        for row in &self.rows {
            let cells: Vec<_> = row
                .iter()
                .zip(&self.columns)
                .zip(&widths)
                .map(|((cell, col), &w)| format_cell(cell, w, col.alignment))
                .collect();
            output.push_str(cells.join("   ").trim_end());
            output.push('\n');
        }

        output
    }
}

fn format_cell(content: &str, width: usize, alignment: Alignment) -> String {
    let content = if content.chars().count() > width {
        let kept: String = content.chars().take(width.saturating_sub(3)).collect();
        format!("{kept}...")
    } else {
        content.to_string()
    };

    match alignment {
        Alignment::Left => format!("{content:<width$}"),
        Alignment::Right => format!("{content:>width$}"),
    }
}
