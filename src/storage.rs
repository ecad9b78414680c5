// 🗄️ Row storage - one CSV file per concern, header row first
// Cells are read by position; missing trailing cells read as empty strings

use crate::error::Result;
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use log::debug;
use std::fs;
use std::path::Path;

/// A whole storage file held in memory for one read-modify-write cycle
#[derive(Debug, Clone, Default)]
pub struct Table {
    pub header: StringRecord,
    pub rows: Vec<StringRecord>,
}

impl Table {
    pub fn with_header(columns: &[&str]) -> Self {
        Table {
            header: StringRecord::from(columns.to_vec()),
            rows: Vec::new(),
        }
    }

    /// Spreadsheet-style row number of a data row (header is row 1)
    pub fn row_number(index: usize) -> usize {
        index + 2
    }

    /// Inverse of `row_number`; None for the header or anything out of range
    pub fn index_of_row(&self, row_number: usize) -> Option<usize> {
        if row_number < 2 {
            return None;
        }
        let index = row_number - 2;
        (index < self.rows.len()).then_some(index)
    }
}

/// Cell by position, "" when the row is shorter
pub fn cell(record: &StringRecord, index: usize) -> &str {
    record.get(index).unwrap_or("").trim()
}

/// Read a table. Ok(None) when the file does not exist.
pub fn read_table(path: &Path) -> Result<Option<Table>> {
    if !path.exists() {
        debug!("Storage file not found: {:?}", path);
        return Ok(None);
    }

    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;

    let header = rdr.headers()?.clone();
    let mut rows = Vec::new();
    for result in rdr.records() {
        rows.push(result?);
    }

    debug!("Read {} rows from {:?}", rows.len(), path);
    Ok(Some(Table { header, rows }))
}

/// Replace the file with the table contents (written beside it, then renamed)
pub fn write_table(path: &Path, table: &Table) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let tmp_path = path.with_extension("csv.tmp");
    {
        let mut wtr = WriterBuilder::new().flexible(true).from_path(&tmp_path)?;
        wtr.write_record(&table.header)?;
        for row in &table.rows {
            wtr.write_record(row)?;
        }
        wtr.flush()?;
    }
    fs::rename(&tmp_path, path)?;

    debug!("Wrote {} rows to {:?}", table.rows.len(), path);
    Ok(())
}
