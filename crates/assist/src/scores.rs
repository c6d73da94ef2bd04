//! Score sheet rendering
//!
//! The input is a trusted grade export: a header line, then one row per
//! student. Grade columns hold a single letter that is swapped for a medal
//! image. Ragged rows are rendered as they come.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use thiserror::Error;

/// Zero-based columns holding grade codes
pub const GRADE_COLUMNS: [usize; 2] = [2, 4];

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to parse score sheet: {0}")]
    Csv(#[from] csv::Error),
}

/// Grade code → image location
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GradeIcons {
    icons: BTreeMap<char, String>,
}

impl GradeIcons {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, code: char, location: impl Into<String>) {
        self.icons.insert(code, location.into());
    }

    /// Location for a cell; only single-character cells can be grades
    pub fn lookup(&self, cell: &str) -> Option<&str> {
        let mut chars = cell.chars();
        match (chars.next(), chars.next()) {
            (Some(code), None) => self.icons.get(&code).map(String::as_str),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.icons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.icons.is_empty()
    }
}

impl FromIterator<(char, String)> for GradeIcons {
    fn from_iter<I: IntoIterator<Item = (char, String)>>(iter: I) -> Self {
        Self {
            icons: iter.into_iter().collect(),
        }
    }
}

/// Render the sheet as an HTML `<table>`
pub fn render_table(csv_text: &str, icons: &GradeIcons) -> Result<String, RenderError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(csv_text.as_bytes());

    let mut html = String::from("<table>\n");
    for (row, record) in reader.records().enumerate() {
        let record = record?;
        html.push_str("<tr>");
        for (column, cell) in record.iter().enumerate() {
            if row == 0 {
                let _ = write!(html, "<th>{}</th>", escape_html(cell));
            } else if GRADE_COLUMNS.contains(&column) {
                let src = icons.lookup(cell).unwrap_or("");
                let _ = write!(html, "<td><img src=\"{}\"></td>", escape_html(src));
            } else {
                let _ = write!(html, "<td>{}</td>", escape_html(cell));
            }
        }
        html.push_str("</tr>\n");
    }
    html.push_str("</table>\n");

    Ok(html)
}

/// Standalone document around a rendered table
pub fn render_page(title: &str, table: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n</head>\n<body>\n{}</body>\n</html>\n",
        escape_html(title),
        table
    )
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
