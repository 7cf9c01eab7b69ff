//! CSV reader for bulk import uploads.
//!
//! The first record is the header. Completely empty lines are dropped
//! before rows are numbered, so row positions in operator messages match
//! what a spreadsheet shows once blank lines are ignored.

use csv::{ReaderBuilder, StringRecord, Trim};

/// Line number of the header record. The first data row is line 2.
pub const HEADER_LINE: usize = 1;

/// One data row: an ordered mapping from column name to raw cell text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRow {
    line: usize,
    cells: Vec<(String, String)>,
}

impl ImportRow {
    /// Build a row from its 1-based line number and ordered cells.
    pub fn new(line: usize, cells: Vec<(String, String)>) -> Self {
        Self { line, cells }
    }

    /// 1-based line number, counting the header as line 1.
    pub fn line(&self) -> usize {
        self.line
    }

    /// Raw value for `column`, or `None` if the row has no such cell.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }

    /// Iterate cells in column order.
    pub fn cells(&self) -> impl Iterator<Item = (&str, &str)> {
        self.cells.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// A parsed upload: header columns plus data rows in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TabularInput {
    columns: Vec<String>,
    rows: Vec<ImportRow>,
}

impl TabularInput {
    pub fn new(columns: Vec<String>, rows: Vec<ImportRow>) -> Self {
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[ImportRow] {
        &self.rows
    }

    /// Number of data rows (header excluded).
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// The upload could not be decoded as CSV at all.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TabularError {
    #[error("Error al procesar el archivo: {0}")]
    Malformed(String),
}

/// Parse raw CSV bytes into a [`TabularInput`].
///
/// Records shorter than the header leave the trailing columns absent;
/// extra cells beyond the header are ignored. Any record that is not
/// valid UTF-8 or breaks quoting rules fails the whole file.
pub fn parse_tabular(data: &[u8]) -> Result<TabularInput, TabularError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::Headers)
        .from_reader(data);

    let columns: Vec<String> = reader
        .headers()
        .map_err(|e| TabularError::Malformed(e.to_string()))?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| TabularError::Malformed(e.to_string()))?;
        if is_blank_record(&record) {
            continue;
        }
        let line = HEADER_LINE + rows.len() + 1;
        let cells = columns
            .iter()
            .zip(record.iter())
            .map(|(column, value)| (column.clone(), value.to_string()))
            .collect();
        rows.push(ImportRow::new(line, cells));
    }

    Ok(TabularInput::new(columns, rows))
}

/// A line with nothing on it parses as a single empty field.
fn is_blank_record(record: &StringRecord) -> bool {
    record.is_empty() || (record.len() == 1 && record[0].is_empty())
}
