// 🧾 Opening Balance Loader - daftarsaldo.csv
// Columns: No Akun, Nama Akun, Saldo (side), Debit, Kredit

use crate::amount::parse_cell;
use crate::error::Result;
use crate::storage::{cell, read_table, write_table, Table};
use csv::StringRecord;
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub const OPENING_COLUMNS: [&str; 5] = ["No Akun", "Nama Akun", "Saldo", "Debit", "Kredit"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpeningBalance {
    pub code: String,
    pub name: String,
    /// Side written in the file ("Debit"/"Kredit"), if any
    pub side: Option<String>,
    pub debit: f64,
    pub credit: f64,
}

impl OpeningBalance {
    /// Debit minus credit
    pub fn net(&self) -> f64 {
        self.debit - self.credit
    }

    /// Declared side, or derived from the amounts (tie → Debit)
    pub fn display_side(&self) -> String {
        match &self.side {
            Some(side) => side.clone(),
            None if self.debit > 0.0 => "Debit".to_string(),
            None if self.credit > 0.0 => "Kredit".to_string(),
            None => "Debit".to_string(),
        }
    }
}

/// Opening balances keyed by account code, in file order
#[derive(Debug, Clone, Default)]
pub struct OpeningBalances {
    balances: Vec<OpeningBalance>,
    index: HashMap<String, usize>,
}

impl OpeningBalances {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a balance; an existing code accumulates instead of being replaced
    pub fn add(&mut self, balance: OpeningBalance) {
        match self.index.get(&balance.code) {
            Some(&i) => {
                let existing = &mut self.balances[i];
                existing.debit += balance.debit;
                existing.credit += balance.credit;
            }
            None => {
                self.index.insert(balance.code.clone(), self.balances.len());
                self.balances.push(balance);
            }
        }
    }

    pub fn get(&self, code: &str) -> Option<&OpeningBalance> {
        self.index.get(code).map(|&i| &self.balances[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &OpeningBalance> {
        self.balances.iter()
    }

    pub fn len(&self) -> usize {
        self.balances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.balances.is_empty()
    }
}

impl FromIterator<OpeningBalance> for OpeningBalances {
    fn from_iter<I: IntoIterator<Item = OpeningBalance>>(iter: I) -> Self {
        let mut balances = OpeningBalances::new();
        for b in iter {
            balances.add(b);
        }
        balances
    }
}

/// Spreadsheet totals and formulas in the code column; names are not checked
/// ("Beban Konsumsi" is a real account)
fn is_summary_row(code: &str) -> bool {
    let code_lower = code.to_lowercase();
    code.starts_with('=') || code_lower.contains("total") || code_lower.contains("sum")
}

fn amount_cell(record: &StringRecord, index: usize, row: usize, label: &str) -> f64 {
    let raw = cell(record, index);
    if raw.is_empty() {
        return 0.0;
    }
    match parse_cell(raw) {
        Some(v) => v,
        None => {
            error!("Row {} {} conversion error, value: {:?}", row, label, raw);
            0.0
        }
    }
}

// ============================================================================
// STORE
// ============================================================================

#[derive(Debug, Clone)]
pub struct OpeningBalanceStore {
    path: PathBuf,
}

impl OpeningBalanceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        OpeningBalanceStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the opening balances; a missing file gives an empty map
    pub fn load(&self) -> Result<OpeningBalances> {
        let table = match read_table(&self.path)? {
            Some(t) => t,
            None => {
                warn!("Opening balance file not found: {:?}", self.path);
                return Ok(OpeningBalances::new());
            }
        };

        let mut balances = OpeningBalances::new();
        for (i, record) in table.rows.iter().enumerate() {
            let row = Table::row_number(i);
            let code = cell(record, 0);
            let name = cell(record, 1);

            if code.is_empty() || name.is_empty() {
                debug!("Row {} skipped due to missing account code or name", row);
                continue;
            }
            if is_summary_row(code) {
                debug!("Skipping summary row {}: {}", row, code);
                continue;
            }

            let side = match cell(record, 2) {
                "" => None,
                s => Some(s.to_string()),
            };

            balances.add(OpeningBalance {
                code: code.to_string(),
                name: name.to_string(),
                side,
                debit: amount_cell(record, 3, row, "debit"),
                credit: amount_cell(record, 4, row, "kredit"),
            });
        }

        debug!("Loaded {} opening balances from {:?}", balances.len(), self.path);
        Ok(balances)
    }

    /// Write the demo opening balances. Returns false when the file already exists.
    pub fn seed_demo(&self) -> Result<bool> {
        if self.path.exists() {
            return Ok(false);
        }

        let mut table = Table::with_header(&OPENING_COLUMNS);
        for balance in demo_opening_balances() {
            table.rows.push(StringRecord::from(vec![
                balance.code,
                balance.name,
                balance.side.unwrap_or_default(),
                balance.debit.to_string(),
                balance.credit.to_string(),
            ]));
        }
        write_table(&self.path, &table)?;
        info!("Demo opening balances created at {:?}", self.path);
        Ok(true)
    }
}

/// Sample chart with balances (assets 50 jt = liabilities 8 jt + modal 42 jt)
pub fn demo_opening_balances() -> Vec<OpeningBalance> {
    let rows: [(&str, &str, f64, f64); 11] = [
        ("101", "Kas", 10_000_000.0, 0.0),
        ("102", "Piutang Usaha", 5_000_000.0, 0.0),
        ("103", "Persediaan", 15_000_000.0, 0.0),
        ("104", "Peralatan", 20_000_000.0, 0.0),
        ("201", "Utang Usaha", 0.0, 8_000_000.0),
        ("301", "Modal", 0.0, 42_000_000.0),
        ("401", "Pendapatan Penjualan", 0.0, 0.0),
        ("501", "Beban Pokok Penjualan", 0.0, 0.0),
        ("502", "Beban Operasional", 0.0, 0.0),
        ("503", "Beban Depresiasi Aktiva Tetap", 0.0, 0.0),
        ("504", "Beban Lain-lain", 0.0, 0.0),
    ];

    rows.iter()
        .map(|(code, name, debit, credit)| OpeningBalance {
            code: code.to_string(),
            name: name.to_string(),
            side: Some(if *credit > 0.0 { "Kredit" } else { "Debit" }.to_string()),
            debit: *debit,
            credit: *credit,
        })
        .collect()
}

// ============================================================================
// OPENING BALANCE VIEW (saldo awal page)
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct OpeningBalanceLine {
    pub code: String,
    pub name: String,
    pub side: String,
    pub debit: f64,
    pub credit: f64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct OpeningBalanceView {
    pub lines: Vec<OpeningBalanceLine>,
    pub total_debit: f64,
    pub total_credit: f64,
}

impl OpeningBalanceView {
    pub fn from_balances(balances: &OpeningBalances) -> Self {
        let lines: Vec<OpeningBalanceLine> = balances
            .iter()
            .map(|b| OpeningBalanceLine {
                code: b.code.clone(),
                name: b.name.clone(),
                side: b.display_side(),
                debit: b.debit,
                credit: b.credit,
            })
            .collect();

        OpeningBalanceView {
            total_debit: lines.iter().map(|l| l.debit).sum(),
            total_credit: lines.iter().map(|l| l.credit).sum(),
            lines,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn store_with(dir: &tempfile::TempDir, contents: &str) -> OpeningBalanceStore {
        let store = OpeningBalanceStore::new(dir.path().join("daftarsaldo.csv"));
        fs::write(store.path(), contents).unwrap();
        store
    }

    #[test]
    fn test_skips_summary_and_incomplete_rows() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_with(
            &dir,
            "No Akun,Nama Akun,Saldo,Debit,Kredit\n\
             101,Kas,Debit,10000000,\n\
             ,Tanpa kode,Debit,5,0\n\
             102,,Debit,5,0\n\
             =SUM(D2:D3),x,,1,1\n\
             Total,Semua,,100,100\n\
             Subtotal,Aset,,7,0\n\
             201,Utang Usaha,Kredit,,8000000\n",
        );

        let balances = store.load().unwrap();
        let codes: Vec<_> = balances.iter().map(|b| b.code.as_str()).collect();
        assert_eq!(codes, vec!["101", "201"]);
    }

    #[test]
    fn test_account_names_with_sum_or_total_are_kept() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_with(
            &dir,
            "No Akun,Nama Akun,Saldo,Debit,Kredit\n\
             101,Kas,Debit,1000,\n\
             605,Beban Konsumsi,Debit,300,\n\
             606,Beban Sumbangan,Debit,200,\n\
             607,Beban Total Servis,Debit,100,\n\
             301,Modal,Kredit,,1600\n",
        );

        let balances = store.load().unwrap();
        let codes: Vec<_> = balances.iter().map(|b| b.code.as_str()).collect();
        assert_eq!(codes, vec!["101", "605", "606", "607", "301"]);
        let debit: f64 = balances.iter().map(|b| b.debit).sum();
        let credit: f64 = balances.iter().map(|b| b.credit).sum();
        assert_eq!(debit, credit);
        assert_eq!(balances.get("201").unwrap().credit, 8_000_000.0);
    }

    #[test]
    fn test_duplicate_codes_accumulate() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_with(
            &dir,
            "No Akun,Nama Akun,Saldo,Debit,Kredit\n\
             101,Kas,,1000,0\n\
             102,Piutang,,50,0\n\
             101,Kas kecil,,250,10\n",
        );

        let balances = store.load().unwrap();
        assert_eq!(balances.len(), 2);
        let kas = balances.get("101").unwrap();
        assert_eq!(kas.name, "Kas");
        assert_eq!(kas.debit, 1250.0);
        assert_eq!(kas.credit, 10.0);
        assert_eq!(kas.net(), 1240.0);
    }

    #[test]
    fn test_bad_amount_cells_default_to_zero() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_with(
            &dir,
            "No Akun,Nama Akun,Saldo,Debit,Kredit\n101,Kas,,abc,12\n102,Piutang\n",
        );

        let balances = store.load().unwrap();
        assert_eq!(balances.get("101").unwrap().debit, 0.0);
        assert_eq!(balances.get("101").unwrap().credit, 12.0);
        assert_eq!(balances.get("102").unwrap().debit, 0.0);
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = OpeningBalanceStore::new(dir.path().join("none.csv"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_seed_demo_once_and_view_totals() {
        let dir = tempfile::tempdir().unwrap();
        let store = OpeningBalanceStore::new(dir.path().join("daftarsaldo.csv"));
        assert!(store.seed_demo().unwrap());
        assert!(!store.seed_demo().unwrap());

        let balances = store.load().unwrap();
        assert_eq!(balances.len(), 11);

        let view = OpeningBalanceView::from_balances(&balances);
        assert_eq!(view.total_debit, 50_000_000.0);
        assert_eq!(view.total_credit, 50_000_000.0);
        assert_eq!(view.lines[4].side, "Kredit");
    }

    #[test]
    fn test_display_side_derivation() {
        let mut b = OpeningBalance {
            code: "401".to_string(),
            name: "Pendapatan".to_string(),
            side: None,
            debit: 0.0,
            credit: 0.0,
        };
        assert_eq!(b.display_side(), "Debit");
        b.credit = 5.0;
        assert_eq!(b.display_side(), "Kredit");
        b.side = Some("Debit".to_string());
        assert_eq!(b.display_side(), "Debit");
    }
}
