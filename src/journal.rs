// 📓 Journal Store - dated double-entry rows in jurnal.csv
// Columns: Tanggal, Keterangan, Akun, Debit, Kredit
//
// Rows are identified by their spreadsheet row number (header = row 1).
// Appends are duplicate-suppressed; rows are never edited in place.

use crate::amount::parse_cell;
use crate::chart::split_account;
use crate::error::{BookError, Result};
use crate::inventory::{InventoryStore, StockChange};
use crate::period::{Month, Period};
use crate::storage::{cell, read_table, write_table, Table};
use chrono::{Datelike, NaiveDate};
use csv::StringRecord;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const JOURNAL_COLUMNS: [&str; 5] = ["Tanggal", "Keterangan", "Akun", "Debit", "Kredit"];

/// Memo marker of a sale; deleting such a row gives the stock back
pub const SALE_MARKER: &str = "penjualan";

/// Amount tolerance for duplicate detection
const DUPLICATE_TOLERANCE: f64 = 0.01;

// ============================================================================
// RECORD TYPES
// ============================================================================

/// A stored journal row, as read back from the file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Spreadsheet row number (header = 1, first entry = 2)
    pub row: usize,
    /// None when the date cell could not be parsed
    pub date: Option<NaiveDate>,
    pub raw_date: String,
    pub memo: String,
    /// Account cell as stored ("1-1100 - Kas")
    pub account: String,
    pub account_code: String,
    pub account_name: String,
    pub debit: f64,
    pub credit: f64,
}

impl JournalEntry {
    /// Both sides zero: malformed input, ignored by aggregation
    pub fn is_empty(&self) -> bool {
        self.debit == 0.0 && self.credit == 0.0
    }
}

/// A row about to be appended
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalRow {
    pub date: NaiveDate,
    pub memo: String,
    pub account: String,
    pub debit: f64,
    pub credit: f64,
}

impl JournalRow {
    pub fn debit(date: NaiveDate, memo: &str, account: &str, amount: f64) -> Self {
        JournalRow {
            date,
            memo: memo.to_string(),
            account: account.to_string(),
            debit: amount,
            credit: 0.0,
        }
    }

    pub fn credit(date: NaiveDate, memo: &str, account: &str, amount: f64) -> Self {
        JournalRow {
            date,
            memo: memo.to_string(),
            account: account.to_string(),
            debit: 0.0,
            credit: amount,
        }
    }

    fn to_record(&self) -> StringRecord {
        StringRecord::from(vec![
            self.date.format("%Y-%m-%d").to_string(),
            self.memo.trim().to_string(),
            self.account.trim().to_string(),
            self.debit.to_string(),
            self.credit.to_string(),
        ])
    }

    /// Same normalized date, memo and account, amounts within 0.01
    fn matches_record(&self, record: &StringRecord) -> bool {
        if record.len() < 5 {
            return false;
        }
        if normalize_date_cell(cell(record, 0)) != self.date.format("%Y-%m-%d").to_string() {
            return false;
        }
        if cell(record, 1) != self.memo.trim() || cell(record, 2) != self.account.trim() {
            return false;
        }
        let debit = parse_cell(cell(record, 3)).unwrap_or(0.0);
        let credit = parse_cell(cell(record, 4)).unwrap_or(0.0);
        (debit - self.debit).abs() < DUPLICATE_TOLERANCE
            && (credit - self.credit).abs() < DUPLICATE_TOLERANCE
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AppendOutcome {
    pub appended: usize,
    pub duplicates: usize,
}

/// Result of deleting one journal row
#[derive(Debug, Clone, Serialize)]
pub struct DeletedEntry {
    pub entry: JournalEntry,
    /// Stock given back when the row was a recognized sale
    pub restored: Option<StockChange>,
}

// ============================================================================
// DATE HANDLING
// ============================================================================

/// Accepts "YYYY-MM-DD", "YYYY-MM-DD HH:MM:SS", "YYYY-MM-DDTHH:MM:SS" and "DD/MM/YYYY"
pub fn parse_journal_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    let head = s.split([' ', 'T']).next().unwrap_or(s);
    NaiveDate::parse_from_str(head, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(head, "%d/%m/%Y"))
        .ok()
}

fn normalize_date_cell(raw: &str) -> String {
    match parse_journal_date(raw) {
        Some(date) => date.format("%Y-%m-%d").to_string(),
        None => raw.split(' ').next().unwrap_or("").to_string(),
    }
}

fn entry_from_record(row: usize, record: &StringRecord) -> Option<JournalEntry> {
    let account = cell(record, 2);
    if record.len() < 3 || account.is_empty() {
        return None;
    }

    let raw_date = cell(record, 0).to_string();
    let date = parse_journal_date(&raw_date);
    if date.is_none() {
        warn!("Unable to parse date in journal row {}: {:?}", row, raw_date);
    }

    let (account_code, account_name) = split_account(account);
    Some(JournalEntry {
        row,
        date,
        raw_date,
        memo: cell(record, 1).to_string(),
        account: account.to_string(),
        account_code,
        account_name,
        debit: parse_cell(cell(record, 3)).unwrap_or(0.0),
        credit: parse_cell(cell(record, 4)).unwrap_or(0.0),
    })
}

// ============================================================================
// JOURNAL STORE
// ============================================================================

/// Handle on the journal file; every call reads or rewrites the whole file
#[derive(Debug, Clone)]
pub struct JournalStore {
    path: PathBuf,
}

impl JournalStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JournalStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_table(&self) -> Result<Table> {
        Ok(read_table(&self.path)?.unwrap_or_else(|| Table::with_header(&JOURNAL_COLUMNS)))
    }

    /// Entries in file order. With a year and/or month filter, rows whose date
    /// cannot be parsed are left out.
    pub fn list_entries(&self, year: Option<i32>, month: Option<Month>) -> Result<Vec<JournalEntry>> {
        let table = match read_table(&self.path)? {
            Some(t) => t,
            None => {
                warn!("Journal file not found: {:?}", self.path);
                return Ok(Vec::new());
            }
        };

        let filtered = year.is_some() || month.is_some();
        let entries = table
            .rows
            .iter()
            .enumerate()
            .filter_map(|(i, record)| entry_from_record(Table::row_number(i), record))
            .filter(|entry| {
                if !filtered {
                    return true;
                }
                match entry.date {
                    Some(d) => {
                        year.map_or(true, |y| d.year() == y)
                            && month.map_or(true, |m| d.month() == m.number())
                    }
                    None => false,
                }
            })
            .collect::<Vec<_>>();

        debug!("Loaded {} journal entries (year={:?}, month={:?})", entries.len(), year, month);
        Ok(entries)
    }

    pub fn entries_in(&self, period: Period) -> Result<Vec<JournalEntry>> {
        self.list_entries(Some(period.year), Some(period.month))
    }

    pub fn all_entries(&self) -> Result<Vec<JournalEntry>> {
        self.list_entries(None, None)
    }

    /// Last `n` entries in file order
    pub fn recent(&self, n: usize) -> Result<Vec<JournalEntry>> {
        let entries = self.all_entries()?;
        let skip = entries.len().saturating_sub(n);
        Ok(entries.into_iter().skip(skip).collect())
    }

    /// Month of the earliest dated entry
    pub fn earliest_period(&self) -> Result<Option<Period>> {
        Ok(self
            .all_entries()?
            .iter()
            .filter_map(|e| e.date)
            .min()
            .map(Period::of_date))
    }

    /// Open the file for a batch of appends
    pub fn batch(&self) -> Result<JournalBatch<'_>> {
        Ok(JournalBatch {
            store: self,
            table: self.load_table()?,
            outcome: AppendOutcome::default(),
        })
    }

    /// Append a single row; Ok(false) when an identical row already exists
    pub fn append(&self, row: &JournalRow) -> Result<bool> {
        let mut batch = self.batch()?;
        let written = batch.push(row);
        batch.commit()?;
        Ok(written)
    }

    pub fn append_rows(&self, rows: &[JournalRow]) -> Result<AppendOutcome> {
        let mut batch = self.batch()?;
        for row in rows {
            batch.push(row);
        }
        batch.commit()
    }

    /// Delete a row by its row number. A deleted sale gives its stock back,
    /// estimated as amount / current selling price (truncated).
    pub fn delete_entry(&self, row: usize, inventory: &InventoryStore) -> Result<DeletedEntry> {
        let mut table = read_table(&self.path)?.ok_or(BookError::RowNotFound(row))?;
        let index = table.index_of_row(row).ok_or(BookError::RowNotFound(row))?;

        let record = table.rows[index].clone();
        let entry = entry_from_record(row, &record).unwrap_or_else(|| JournalEntry {
            row,
            date: parse_journal_date(cell(&record, 0)),
            raw_date: cell(&record, 0).to_string(),
            memo: cell(&record, 1).to_string(),
            account: String::new(),
            account_code: String::new(),
            account_name: String::new(),
            debit: parse_cell(cell(&record, 3)).unwrap_or(0.0),
            credit: parse_cell(cell(&record, 4)).unwrap_or(0.0),
        });

        table.rows.remove(index);
        write_table(&self.path, &table)?;
        info!("Deleted journal entry at row {}", row);

        let restored = restore_sale_stock(&entry, inventory)?;

        Ok(DeletedEntry { entry, restored })
    }
}

fn restore_sale_stock(entry: &JournalEntry, inventory: &InventoryStore) -> Result<Option<StockChange>> {
    let memo = entry.memo.to_lowercase();
    if !memo.contains(SALE_MARKER) {
        return Ok(None);
    }

    let account = entry.account.to_lowercase();
    let items = inventory.load()?;
    let item = match items.iter().find(|item| {
        let name = item.name.to_lowercase();
        !name.is_empty() && (memo.contains(&name) || account.contains(&name))
    }) {
        Some(item) => item,
        None => return Ok(None),
    };

    let amount = if entry.credit > 0.0 { entry.credit } else { entry.debit };
    if amount <= 0.0 || item.selling_price <= 0.0 {
        debug!("No stock to restore for row {} ({})", entry.row, item.name);
        return Ok(None);
    }

    let quantity = (amount / item.selling_price).trunc() as i64;
    if quantity <= 0 {
        return Ok(None);
    }

    Ok(inventory.adjust_stock(&item.name, quantity)?)
}

// ============================================================================
// BATCH APPEND
// ============================================================================

/// One read-modify-write cycle over the journal file
pub struct JournalBatch<'a> {
    store: &'a JournalStore,
    table: Table,
    outcome: AppendOutcome,
}

impl JournalBatch<'_> {
    /// True when the file (including rows pushed in this batch) already holds the row
    pub fn contains(&self, row: &JournalRow) -> bool {
        self.table.rows.iter().any(|record| row.matches_record(record))
    }

    /// Queue a row; returns false and skips it when it is a duplicate
    pub fn push(&mut self, row: &JournalRow) -> bool {
        if self.contains(row) {
            info!("Skipping duplicate journal row: {:?}", row);
            self.outcome.duplicates += 1;
            return false;
        }
        self.table.rows.push(row.to_record());
        self.outcome.appended += 1;
        true
    }

    /// Write the file back. Nothing is written when no row was appended.
    pub fn commit(self) -> Result<AppendOutcome> {
        if self.outcome.appended > 0 {
            write_table(&self.store.path, &self.table)?;
            info!(
                "Saved {} journal rows to {:?} ({} duplicates skipped)",
                self.outcome.appended, self.store.path, self.outcome.duplicates
            );
        }
        Ok(self.outcome)
    }
}
