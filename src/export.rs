use crate::config::ExportConfig;
use anyhow::{Context, Result};
use std::io::{self, Write};
use std::path::Path;

/// Renders URL columns, optionally as spreadsheet hyperlink formulas.
#[derive(Debug, Clone)]
pub struct LinkFormatter {
    excel_ready: bool,
    formula: String,
}

impl LinkFormatter {
    pub fn new(config: &ExportConfig) -> Self {
        Self {
            excel_ready: config.excel_ready,
            formula: config.hyperlink_format.clone(),
        }
    }

    pub fn plain() -> Self {
        Self {
            excel_ready: false,
            formula: String::new(),
        }
    }

    /// `=[BATCH_DELETE_THIS]HYPERLINK("<url>";"<label>")` when enabled; the
    /// marker is removed by a find-and-replace once the CSV is opened. Empty
    /// URLs stay empty.
    pub fn format(&self, url: &str, label: &str) -> String {
        if !self.excel_ready || url.is_empty() {
            return url.to_string();
        }
        format!(
            "=[BATCH_DELETE_THIS]{}(\"{}\";\"{}\")",
            self.formula,
            url.replace('"', "\"\""),
            label.replace('"', "\"\"")
        )
    }
}

fn needs_quotes(field: &str) -> bool {
    field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r')
}

pub fn write_row<W: Write>(mut w: W, row: &[String]) -> io::Result<()> {
    let mut first = true;
    for cell in row {
        if !first {
            write!(w, ",")?;
        } else {
            first = false;
        }
        if needs_quotes(cell) {
            write!(w, "\"{}\"", cell.replace('"', "\"\""))?;
        } else {
            write!(w, "{cell}")?;
        }
    }
    writeln!(w)
}

pub fn to_csv_string(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut buf: Vec<u8> = Vec::new();
    let header: Vec<String> = headers.iter().map(ToString::to_string).collect();
    // Writing into a Vec cannot fail.
    let _ = write_row(&mut buf, &header);
    for row in rows {
        let _ = write_row(&mut buf, row);
    }
    String::from_utf8_lossy(&buf).into_owned()
}

pub fn write_csv(path: &Path, headers: &[&str], rows: &[Vec<String>]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output dir {}", parent.display()))?;
    }

    std::fs::write(path, to_csv_string(headers, rows))
        .with_context(|| format!("failed to write csv {}", path.display()))?;
    Ok(())
}
