// ⚖️ Ledger Aggregator - opening balances + journal → trial balance / general ledger
//
// Both builders are pure: they take already-loaded rows and never touch storage.

use crate::chart::AccountClass;
use crate::journal::JournalEntry;
use crate::opening::OpeningBalances;
use crate::period::{Month, Period};
use chrono::{Datelike, NaiveDate};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ============================================================================
// TRIAL BALANCE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Debit,
    Kredit,
}

impl Side {
    /// Larger total wins; a tie counts as Debit
    pub fn of(debit: f64, credit: f64) -> Side {
        if credit > debit {
            Side::Kredit
        } else {
            Side::Debit
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Debit => "Debit",
            Side::Kredit => "Kredit",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialBalanceLine {
    pub code: String,
    pub name: String,
    pub side: Side,
    pub debit: f64,
    pub credit: f64,
}

impl TrialBalanceLine {
    pub fn class(&self) -> AccountClass {
        AccountClass::of_code(&self.code)
    }

    /// Debit minus credit
    pub fn net_debit(&self) -> f64 {
        self.debit - self.credit
    }

    /// Credit minus debit
    pub fn net_credit(&self) -> f64 {
        self.credit - self.debit
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct TrialBalance {
    pub lines: Vec<TrialBalanceLine>,
}

impl TrialBalance {
    pub fn total_debit(&self) -> f64 {
        self.lines.iter().map(|l| l.debit).sum()
    }

    pub fn total_credit(&self) -> f64 {
        self.lines.iter().map(|l| l.credit).sum()
    }

    pub fn is_balanced(&self) -> bool {
        (self.total_debit() - self.total_credit()).abs() < 0.01
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Lines re-sorted by account code (the builder keeps insertion order)
    pub fn sorted_by_code(&self) -> Vec<TrialBalanceLine> {
        let mut lines = self.lines.clone();
        lines.sort_by(|a, b| a.code.cmp(&b.code));
        lines
    }
}

/// Opening balances plus every entry dated inside `period`.
/// Order: opening accounts as loaded, then accounts seen only in the journal.
pub fn build_trial_balance(
    opening: &OpeningBalances,
    entries: &[JournalEntry],
    period: Period,
) -> TrialBalance {
    let mut buckets: Vec<TrialBalanceLine> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for balance in opening.iter() {
        index.insert(balance.code.clone(), buckets.len());
        buckets.push(TrialBalanceLine {
            code: balance.code.clone(),
            name: balance.name.clone(),
            side: Side::Debit,
            debit: balance.debit,
            credit: balance.credit,
        });
    }

    for entry in entries.iter().filter(|e| !e.is_empty()) {
        match entry.date {
            Some(d) if period.contains(d) => {}
            _ => continue,
        }

        let i = *index.entry(entry.account_code.clone()).or_insert_with(|| {
            buckets.push(TrialBalanceLine {
                code: entry.account_code.clone(),
                name: entry.account_name.clone(),
                side: Side::Debit,
                debit: 0.0,
                credit: 0.0,
            });
            buckets.len() - 1
        });
        buckets[i].debit += entry.debit;
        buckets[i].credit += entry.credit;
    }

    let lines: Vec<TrialBalanceLine> = buckets
        .into_iter()
        .filter(|l| !(l.debit == 0.0 && l.credit == 0.0))
        .map(|mut l| {
            l.side = Side::of(l.debit, l.credit);
            l
        })
        .collect();

    let tb = TrialBalance { lines };
    debug!(
        "Trial balance for {}: {} accounts, debit {}, kredit {}",
        period,
        tb.lines.len(),
        tb.total_debit(),
        tb.total_credit()
    );
    tb
}

// ============================================================================
// GENERAL LEDGER
// ============================================================================

pub const OPENING_MEMO: &str = "Saldo Awal";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerPosting {
    /// 1-based position within the account
    pub number: usize,
    /// None for the opening line
    pub date: Option<NaiveDate>,
    pub memo: String,
    pub debit: f64,
    pub credit: f64,
    /// Running balance after this posting (debit − credit)
    pub balance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerAccount {
    pub code: String,
    pub name: String,
    pub balance: f64,
    pub postings: Vec<LedgerPosting>,
}

impl LedgerAccount {
    fn new(code: &str, name: &str, balance: f64) -> Self {
        LedgerAccount {
            code: code.to_string(),
            name: name.to_string(),
            balance,
            postings: Vec::new(),
        }
    }

    fn post(&mut self, date: Option<NaiveDate>, memo: &str, debit: f64, credit: f64) {
        self.balance += debit - credit;
        self.postings.push(LedgerPosting {
            number: self.postings.len() + 1,
            date,
            memo: memo.to_string(),
            debit,
            credit,
            balance: self.balance,
        });
    }
}

/// Optional filters for the general ledger
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LedgerFilter {
    /// Case-insensitive substring of account code or name
    pub search: Option<String>,
    pub year: Option<i32>,
    pub month: Option<Month>,
}

impl LedgerFilter {
    pub fn for_period(period: Period) -> Self {
        LedgerFilter {
            search: None,
            year: Some(period.year),
            month: Some(period.month),
        }
    }

    pub fn with_search(mut self, search: &str) -> Self {
        let s = search.trim().to_lowercase();
        self.search = if s.is_empty() { None } else { Some(s) };
        self
    }

    fn matches_account(&self, code: &str, name: &str) -> bool {
        match &self.search {
            Some(q) => {
                let q = q.to_lowercase();
                code.to_lowercase().contains(&q) || name.to_lowercase().contains(&q)
            }
            None => true,
        }
    }

    fn matches_date(&self, date: Option<NaiveDate>) -> bool {
        if self.year.is_none() && self.month.is_none() {
            return true;
        }
        match date {
            Some(d) => {
                self.year.map_or(true, |y| d.year() == y)
                    && self.month.map_or(true, |m| d.month() == m.number())
            }
            None => false,
        }
    }
}

fn shows_opening_line(code: &str, net: f64) -> bool {
    net != 0.0 || AccountClass::of_code(code).is_nominal()
}

/// Per-account postings with running balances, sorted by account code
pub fn build_general_ledger(
    opening: &OpeningBalances,
    entries: &[JournalEntry],
    filter: &LedgerFilter,
) -> Vec<LedgerAccount> {
    let mut ledgers: HashMap<String, LedgerAccount> = HashMap::new();

    for balance in opening.iter() {
        if !filter.matches_account(&balance.code, &balance.name) {
            continue;
        }
        let net = balance.net();
        let mut account = LedgerAccount::new(&balance.code, &balance.name, 0.0);
        if shows_opening_line(&balance.code, net) {
            account.post(None, OPENING_MEMO, balance.debit, balance.credit);
        } else {
            account.balance = net;
        }
        ledgers.insert(balance.code.clone(), account);
    }

    let mut sorted: Vec<&JournalEntry> = entries
        .iter()
        .filter(|e| !e.is_empty())
        .filter(|e| filter.matches_date(e.date))
        .filter(|e| filter.matches_account(&e.account_code, &e.account_name))
        .collect();
    // Undated rows sort first, as the earliest possible date
    sorted.sort_by_key(|e| (e.date.unwrap_or(NaiveDate::MIN), e.row));

    for entry in sorted {
        ledgers
            .entry(entry.account_code.clone())
            .or_insert_with(|| LedgerAccount::new(&entry.account_code, &entry.account_name, 0.0))
            .post(entry.date, &entry.memo, entry.debit, entry.credit);
    }

    let mut result: Vec<LedgerAccount> = ledgers.into_values().collect();
    result.sort_by(|a, b| a.code.cmp(&b.code));
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opening::OpeningBalance;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn opening(rows: &[(&str, &str, f64, f64)]) -> OpeningBalances {
        rows.iter()
            .map(|(code, name, debit, credit)| OpeningBalance {
                code: code.to_string(),
                name: name.to_string(),
                side: None,
                debit: *debit,
                credit: *credit,
            })
            .collect()
    }

    fn entry(row: usize, d: Option<NaiveDate>, code: &str, name: &str, debit: f64, credit: f64) -> JournalEntry {
        JournalEntry {
            row,
            date: d,
            raw_date: d.map(|d| d.to_string()).unwrap_or_default(),
            memo: format!("row {}", row),
            account: format!("{} - {}", code, name),
            account_code: code.to_string(),
            account_name: name.to_string(),
            debit,
            credit,
        }
    }

    const NOV: Period = Period { year: 2025, month: Month::November };

    #[test]
    fn test_trial_balance_adds_period_entries() {
        let ob = opening(&[("101", "Kas", 10_000_000.0, 0.0)]);
        let entries = vec![entry(2, Some(date(2025, 11, 10)), "101", "Kas", 500_000.0, 0.0)];

        let tb = build_trial_balance(&ob, &entries, NOV);
        assert_eq!(tb.lines.len(), 1);
        let line = &tb.lines[0];
        assert_eq!(line.code, "101");
        assert_eq!(line.debit, 10_500_000.0);
        assert_eq!(line.credit, 0.0);
        assert_eq!(line.side, Side::Debit);
    }

    #[test]
    fn test_trial_balance_excludes_other_periods_and_undated() {
        let ob = opening(&[("101", "Kas", 1000.0, 0.0)]);
        let entries = vec![
            entry(2, Some(date(2025, 10, 31)), "101", "Kas", 50.0, 0.0),
            entry(3, None, "101", "Kas", 70.0, 0.0),
            entry(4, Some(date(2025, 11, 1)), "101", "Kas", 0.0, 300.0),
        ];

        let tb = build_trial_balance(&ob, &entries, NOV);
        assert_eq!(tb.lines[0].debit, 1000.0);
        assert_eq!(tb.lines[0].credit, 300.0);
    }

    #[test]
    fn test_trial_balance_order_drop_zero_and_sides() {
        let ob = opening(&[
            ("301", "Modal", 0.0, 5000.0),
            ("401", "Pendapatan", 0.0, 0.0),
            ("101", "Kas", 5000.0, 0.0),
        ]);
        let entries = vec![
            entry(2, Some(date(2025, 11, 2)), "6-6100", "Beban listrik", 200.0, 0.0),
            entry(3, Some(date(2025, 11, 2)), "101", "Kas", 0.0, 200.0),
            entry(4, Some(date(2025, 11, 3)), "1-1700", "Peralatan", 100.0, 100.0),
        ];

        let tb = build_trial_balance(&ob, &entries, NOV);
        let codes: Vec<_> = tb.lines.iter().map(|l| l.code.as_str()).collect();
        assert_eq!(codes, vec!["301", "101", "6-6100", "1-1700"]);
        assert_eq!(tb.lines[0].side, Side::Kredit);
        assert_eq!(tb.lines[3].side, Side::Debit, "tie is Debit");
        assert!(tb.is_balanced());

        let sorted: Vec<_> = tb.sorted_by_code().into_iter().map(|l| l.code).collect();
        assert_eq!(sorted, vec!["1-1700", "101", "301", "6-6100"]);
    }

    #[test]
    fn test_general_ledger_running_balance() {
        let ob = opening(&[]);
        let entries = vec![
            entry(3, Some(date(2025, 11, 5)), "101", "Kas", 0.0, 40.0),
            entry(2, Some(date(2025, 11, 5)), "101", "Kas", 100.0, 0.0),
        ];

        let gl = build_general_ledger(&ob, &entries, &LedgerFilter::default());
        assert_eq!(gl.len(), 1);
        let kas = &gl[0];
        assert_eq!(kas.postings.len(), 2);
        assert_eq!(kas.postings[0].balance, 100.0);
        assert_eq!(kas.postings[1].balance, 60.0);
        assert_eq!(kas.postings[1].number, 2);
        assert_eq!(kas.balance, 60.0);
    }

    #[test]
    fn test_general_ledger_opening_lines() {
        let ob = opening(&[
            ("101", "Kas", 1000.0, 0.0),
            ("102", "Piutang", 0.0, 0.0),
            ("401", "Pendapatan", 0.0, 0.0),
            ("6-6100", "Beban listrik", 0.0, 0.0),
        ]);

        let gl = build_general_ledger(&ob, &[], &LedgerFilter::default());
        let by_code: HashMap<_, _> = gl.iter().map(|a| (a.code.as_str(), a)).collect();

        assert_eq!(gl.len(), 4, "every opening account gets a ledger");
        assert_eq!(by_code["101"].postings[0].memo, OPENING_MEMO);
        assert_eq!(by_code["101"].postings[0].balance, 1000.0);
        assert!(by_code["102"].postings.is_empty());
        assert_eq!(by_code["401"].postings.len(), 1);
        assert_eq!(by_code["6-6100"].postings[0].balance, 0.0);
    }

    #[test]
    fn test_general_ledger_sorted_by_date_then_row() {
        let ob = opening(&[("101", "Kas", 10.0, 0.0)]);
        let entries = vec![
            entry(5, Some(date(2025, 11, 9)), "101", "Kas", 1.0, 0.0),
            entry(4, Some(date(2025, 11, 2)), "101", "Kas", 2.0, 0.0),
            entry(2, Some(date(2025, 11, 9)), "101", "Kas", 3.0, 0.0),
        ];

        let gl = build_general_ledger(&ob, &entries, &LedgerFilter::default());
        let memos: Vec<_> = gl[0].postings.iter().map(|p| p.memo.as_str()).collect();
        assert_eq!(memos, vec![OPENING_MEMO, "row 4", "row 2", "row 5"]);
        assert_eq!(gl[0].balance, 16.0);
    }

    #[test]
    fn test_zero_rows_are_ignored() {
        let ob = opening(&[("101", "Kas", 100.0, 0.0)]);
        let entries = vec![
            entry(2, Some(date(2025, 11, 2)), "9-9", "Salah ketik", 0.0, 0.0),
            entry(3, Some(date(2025, 11, 3)), "101", "Kas", 0.0, 0.0),
            entry(4, Some(date(2025, 11, 4)), "101", "Kas", 40.0, 0.0),
        ];

        let tb = build_trial_balance(&ob, &entries, NOV);
        assert_eq!(tb.lines.len(), 1);
        assert_eq!(tb.lines[0].debit, 140.0);

        let ledgers = build_general_ledger(&ob, &entries, &LedgerFilter::for_period(NOV));
        assert_eq!(ledgers.len(), 1);
        assert_eq!(ledgers[0].code, "101");
        let memos: Vec<_> = ledgers[0].postings.iter().map(|p| p.memo.as_str()).collect();
        assert_eq!(memos, vec![OPENING_MEMO, "row 4"]);
        assert_eq!(ledgers[0].balance, 140.0);
    }

    #[test]
    fn test_general_ledger_filters() {
        let ob = opening(&[("101", "Kas", 10.0, 0.0), ("201", "Utang Usaha", 0.0, 10.0)]);
        let entries = vec![
            entry(2, Some(date(2025, 10, 1)), "101", "Kas", 1.0, 0.0),
            entry(3, Some(date(2025, 11, 1)), "101", "Kas", 2.0, 0.0),
            entry(4, None, "101", "Kas", 4.0, 0.0),
            entry(5, Some(date(2025, 11, 1)), "4-4000", "Penjualan barang dagang", 0.0, 9.0),
        ];

        let filter = LedgerFilter::for_period(NOV).with_search("KAS");
        let gl = build_general_ledger(&ob, &entries, &filter);
        assert_eq!(gl.len(), 1);
        assert_eq!(gl[0].code, "101");
        assert_eq!(gl[0].postings.len(), 2);
        assert_eq!(gl[0].balance, 12.0);

        let gl = build_general_ledger(&ob, &entries, &LedgerFilter::default().with_search("penjualan"));
        assert_eq!(gl.len(), 1);
        assert_eq!(gl[0].code, "4-4000");
        assert_eq!(gl[0].balance, -9.0);
    }
}
