// 📚 Books - one handle over the three stores
//
// Every call re-reads the files it needs. Mutations take the write lock so
// that two requests never interleave a read-modify-write of the same file.

use crate::chart::account_options;
use crate::closing::{closing_rows, plan_closing_entries, ClosingPair};
use crate::config::AppConfig;
use crate::entry::{PostingSummary, TransactionForm};
use crate::error::{BookError, Result};
use crate::inventory::{InventoryItem, InventoryStore, InventorySummary};
use crate::journal::{DeletedEntry, JournalEntry, JournalStore};
use crate::ledger::{build_general_ledger, build_trial_balance, LedgerAccount, LedgerFilter, TrialBalance};
use crate::opening::{OpeningBalanceStore, OpeningBalanceView};
use crate::period::{is_period_visible, Period};
use crate::reports::{BalanceSheet, EquityChange, IncomeStatement};
use crate::stock_card::{build_stock_card, StockCard};
use chrono::NaiveDate;
use log::{debug, info};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

const RECENT_ENTRIES: usize = 5;

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub summary: InventorySummary,
    pub recent_entries: Vec<JournalEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClosingOutcome {
    pub date: NaiveDate,
    pub pairs: Vec<ClosingPair>,
    pub appended: usize,
    pub duplicates: usize,
}

pub struct Books {
    config: AppConfig,
    journal: JournalStore,
    inventory: InventoryStore,
    opening: OpeningBalanceStore,
    write_lock: Mutex<()>,
}

impl Books {
    pub fn new(config: AppConfig) -> Self {
        Books {
            journal: JournalStore::new(config.journal_path()),
            inventory: InventoryStore::new(config.inventory_path()),
            opening: OpeningBalanceStore::new(config.opening_path()),
            config,
            write_lock: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn journal(&self) -> &JournalStore {
        &self.journal
    }

    pub fn inventory(&self) -> &InventoryStore {
        &self.inventory
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        // The guard protects no data, so a poisoned lock is still usable
        self.write_lock.lock().unwrap_or_else(|e| e.into_inner())
    }

    // ========================================================================
    // READS
    // ========================================================================

    pub fn accounts(&self) -> Vec<String> {
        account_options()
    }

    pub fn inventory_items(&self) -> Result<Vec<InventoryItem>> {
        self.inventory.load()
    }

    pub fn journal_entries(&self) -> Result<Vec<JournalEntry>> {
        self.journal.all_entries()
    }

    pub fn is_visible(&self, period: Period, today: NaiveDate) -> Result<bool> {
        let earliest = self.journal.earliest_period()?;
        Ok(is_period_visible(period, today, earliest))
    }

    /// Trial balance of a period; empty when the period is hidden
    pub fn trial_balance(&self, period: Period, today: NaiveDate) -> Result<TrialBalance> {
        let entries = self.journal.all_entries()?;
        let earliest = entries.iter().filter_map(|e| e.date).min().map(Period::of_date);
        if !is_period_visible(period, today, earliest) {
            debug!("Period {} hidden (today {}, earliest {:?})", period, today, earliest);
            return Ok(TrialBalance::default());
        }

        let opening = self.opening.load()?;
        Ok(build_trial_balance(&opening, &entries, period))
    }

    pub fn general_ledger(&self, filter: &LedgerFilter) -> Result<Vec<LedgerAccount>> {
        let opening = self.opening.load()?;
        let entries = self.journal.all_entries()?;
        Ok(build_general_ledger(&opening, &entries, filter))
    }

    pub fn income_statement(&self, period: Period, today: NaiveDate) -> Result<IncomeStatement> {
        Ok(IncomeStatement::from_trial_balance(&self.trial_balance(period, today)?))
    }

    pub fn balance_sheet(&self, period: Period, today: NaiveDate) -> Result<BalanceSheet> {
        Ok(BalanceSheet::from_trial_balance(&self.trial_balance(period, today)?))
    }

    pub fn equity_change(&self, period: Period, today: NaiveDate) -> Result<EquityChange> {
        Ok(EquityChange::from_trial_balance(&self.trial_balance(period, today)?))
    }

    pub fn opening_balance_view(&self, period: Period, today: NaiveDate) -> Result<OpeningBalanceView> {
        if !self.is_visible(period, today)? {
            return Ok(OpeningBalanceView::default());
        }
        Ok(OpeningBalanceView::from_balances(&self.opening.load()?))
    }

    /// Stock card of the product with this exact name; None when unknown
    pub fn stock_card(&self, product: &str, period: Period) -> Result<Option<StockCard>> {
        let item = match self.inventory.load()?.into_iter().find(|i| i.name == product.trim()) {
            Some(item) => item,
            None => return Ok(None),
        };
        let entries = self.journal.entries_in(period)?;
        Ok(Some(build_stock_card(&item, &entries)))
    }

    pub fn dashboard(&self) -> Result<Dashboard> {
        let items = self.inventory.load()?;
        Ok(Dashboard {
            summary: InventorySummary::from_items(&items, self.config.low_stock_threshold),
            recent_entries: self.journal.recent(RECENT_ENTRIES)?,
        })
    }

    // ========================================================================
    // MUTATIONS
    // ========================================================================

    pub fn record_transaction(&self, fields: &HashMap<String, String>) -> Result<PostingSummary> {
        let form = TransactionForm::from_fields(fields);
        let _guard = self.lock();
        let validated = form.validate(&self.inventory.load()?)?;
        validated.post(&self.journal, &self.inventory)
    }

    pub fn delete_journal_entry(&self, row: usize) -> Result<DeletedEntry> {
        let _guard = self.lock();
        self.journal.delete_entry(row, &self.inventory)
    }

    /// Post closing entries for `period`, dated on its last day (or today,
    /// when the period is still running)
    pub fn close_period(&self, period: Period, today: NaiveDate) -> Result<ClosingOutcome> {
        let _guard = self.lock();

        let tb = self.trial_balance(period, today)?;
        if tb.is_empty() {
            return Err(BookError::validation(format!(
                "Tidak ada saldo untuk periode {}.",
                period
            )));
        }

        let date = period.last_day().map_or(today, |last| last.min(today));
        let pairs = plan_closing_entries(&tb, date);
        if pairs.is_empty() {
            return Err(BookError::validation("Tidak ada akun nominal yang perlu ditutup."));
        }

        let outcome = self.journal.append_rows(&closing_rows(&pairs))?;
        info!(
            "Closed period {}: {} accounts, {} rows appended",
            period,
            pairs.len(),
            outcome.appended
        );

        Ok(ClosingOutcome {
            date,
            pairs,
            appended: outcome.appended,
            duplicates: outcome.duplicates,
        })
    }

    /// Write the demo opening balances when none exist yet
    pub fn seed_demo(&self) -> Result<bool> {
        let _guard = self.lock();
        self.opening.seed_demo()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journal::JournalRow;
    use crate::period::Month;
    use std::fs;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn books_in(dir: &tempfile::TempDir) -> Books {
        Books::new(AppConfig::default().with_data_dir(dir.path()))
    }

    const TODAY: (i32, u32, u32) = (2025, 11, 20);

    fn today() -> NaiveDate {
        date(TODAY.0, TODAY.1, TODAY.2)
    }

    fn seeded(dir: &tempfile::TempDir) -> Books {
        let books = books_in(dir);
        books.seed_demo().unwrap();
        let day = date(2025, 11, 3);
        books
            .journal()
            .append_rows(&[
                JournalRow::debit(day, "Penjualan tunai", "101 - Kas", 1_000_000.0),
                JournalRow::credit(day, "Penjualan tunai", "4-4000 - Penjualan barang dagang", 1_000_000.0),
                JournalRow::debit(day, "Bayar listrik", "6-6100 - Beban telepon, air, dan listrik", 200_000.0),
                JournalRow::credit(day, "Bayar listrik", "101 - Kas", 200_000.0),
            ])
            .unwrap();
        books
    }

    #[test]
    fn test_reports_for_visible_period() {
        let dir = tempfile::tempdir().unwrap();
        let books = seeded(&dir);
        let nov = Period::new(2025, Month::November);

        let tb = books.trial_balance(nov, today()).unwrap();
        assert!(tb.is_balanced());
        let kas = tb.lines.iter().find(|l| l.code == "101").unwrap();
        assert_eq!(kas.debit, 11_000_000.0);
        assert_eq!(kas.credit, 200_000.0);

        let is = books.income_statement(nov, today()).unwrap();
        assert_eq!(is.net_profit, 800_000.0);

        let ec = books.equity_change(nov, today()).unwrap();
        assert_eq!(ec.opening_capital, 42_000_000.0);
        assert_eq!(ec.closing_capital, 42_800_000.0);

        let bs = books.balance_sheet(nov, today()).unwrap();
        assert_eq!(bs.total_assets, 50_800_000.0);
        assert!(bs.is_balanced());
    }

    #[test]
    fn test_hidden_periods_are_empty() {
        let dir = tempfile::tempdir().unwrap();
        let books = seeded(&dir);

        let before = Period::new(2025, Month::Oktober);
        assert!(books.trial_balance(before, today()).unwrap().is_empty());
        assert!(books.income_statement(before, today()).unwrap().is_empty());
        assert!(books.opening_balance_view(before, today()).unwrap().is_empty());

        let future = Period::new(2025, Month::Desember);
        assert!(books.trial_balance(future, today()).unwrap().is_empty());
        assert_eq!(books.balance_sheet(future, today()).unwrap().total_assets, 0.0);

        let nov = Period::new(2025, Month::November);
        assert_eq!(books.opening_balance_view(nov, today()).unwrap().lines.len(), 11);
    }

    #[test]
    fn test_record_and_delete_transaction() {
        let dir = tempfile::tempdir().unwrap();
        let books = books_in(&dir);
        fs::write(
            books.inventory().path(),
            "Item Code,Name,Stock Remaining,Price,Harga Jual\nITEM-001,Madu Multiflora,34,84000,105000\n",
        )
        .unwrap();

        let fields: HashMap<String, String> = [
            ("jenis_transaksi", "Penjualan"),
            ("tanggal", "2025-11-10"),
            ("keterangan", "Penjualan Madu Multiflora"),
            ("akun_debit_1", "1-1100 - Kas"),
            ("debit_1", "315.000"),
            ("akun_kredit_1", "4-4000 - Penjualan barang dagang"),
            ("kredit_1", "315.000"),
            ("product_1", "ITEM-001"),
            ("quantity_1", "3"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let summary = books.record_transaction(&fields).unwrap();
        assert_eq!(summary.appended, 4);
        assert_eq!(books.inventory_items().unwrap()[0].stock, 31);

        let deleted = books.delete_journal_entry(3).unwrap();
        assert_eq!(deleted.restored.unwrap().new_stock, 34);
        assert_eq!(books.journal_entries().unwrap().len(), 3);

        let dashboard = books.dashboard().unwrap();
        assert_eq!(dashboard.summary.total_products, 1);
        assert_eq!(dashboard.recent_entries.len(), 3);
    }

    #[test]
    fn test_close_period_zeroes_nominal_accounts() {
        let dir = tempfile::tempdir().unwrap();
        let books = seeded(&dir);
        let nov = Period::new(2025, Month::November);

        let outcome = books.close_period(nov, today()).unwrap();
        assert_eq!(outcome.date, today());
        assert_eq!(outcome.pairs.len(), 2);
        assert_eq!(outcome.appended, 4);

        let is = books.income_statement(nov, today()).unwrap();
        assert_eq!(is.net_profit, 0.0);

        let again = books.close_period(nov, today()).unwrap_err();
        assert!(again.is_user_error());
    }

    #[test]
    fn test_stock_card_lookup() {
        let dir = tempfile::tempdir().unwrap();
        let books = books_in(&dir);
        let nov = Period::new(2025, Month::November);

        let card = books.stock_card("Madu Klengkeng", nov).unwrap().unwrap();
        assert_eq!(card.item_code, "ITEM-002");
        assert_eq!(card.lines.len(), 1);
        assert!(books.stock_card("Madu Palsu", nov).unwrap().is_none());
    }
}
