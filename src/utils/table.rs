//! Table rendering utilities for CLI outputs.

use unicode_width::UnicodeWidthChar;

pub struct Column {
    pub header: String,
    pub width: usize,
}

impl Column {
    pub fn new(header: &str, width: usize) -> Self {
        Self {
            header: header.to_string(),
            width,
        }
    }
}

pub struct Table {
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<String>>,
}

/// Pad (or cut) `s` to exactly `width` terminal columns.
pub fn fit(s: &str, width: usize) -> String {
    let mut out = String::new();
    let mut used = 0;

    for ch in s.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > width {
            break;
        }
        out.push(ch);
        used += w;
    }

    out.push_str(&" ".repeat(width - used));
    out
}

impl Table {
    pub fn new(columns: Vec<Column>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn add_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn render_header(&self) -> String {
        let mut out = String::new();
        for col in &self.columns {
            out.push_str(&fit(&col.header, col.width));
            out.push(' ');
        }
        out.trim_end().to_string()
    }

    pub fn render_row(&self, row: &[String]) -> String {
        let mut out = String::new();
        for (i, col) in self.columns.iter().enumerate() {
            let cell = row.get(i).map(String::as_str).unwrap_or("");
            out.push_str(&fit(cell, col.width));
            out.push(' ');
        }
        out.trim_end().to_string()
    }
}
