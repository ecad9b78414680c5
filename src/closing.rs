// 🔒 Period closing - zero the nominal accounts into the income summary

use crate::chart::{account_label, CLOSING_ACCOUNT};
use crate::journal::JournalRow;
use crate::ledger::TrialBalance;
use chrono::NaiveDate;
use serde::Serialize;

pub const CLOSING_SUMMARY_MEMO: &str = "Penutupan ke akun penutup";

/// Summary-row memo; carries the closed code so equal amounts from two
/// accounts are not taken for duplicates
fn summary_memo(code: &str) -> String {
    format!("{} ({})", CLOSING_SUMMARY_MEMO, code)
}

/// One closed account: the row on the account and its counterpart on 3101
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClosingPair {
    pub code: String,
    pub name: String,
    /// Debit − credit before closing
    pub balance: f64,
    pub account_row: JournalRow,
    pub summary_row: JournalRow,
}

/// Closing pairs for every revenue, COGS and expense line with a nonzero
/// balance. After posting, each of those accounts nets to zero.
pub fn plan_closing_entries(tb: &TrialBalance, date: NaiveDate) -> Vec<ClosingPair> {
    tb.lines
        .iter()
        .filter(|line| line.class().is_nominal())
        .filter_map(|line| {
            let balance = line.net_debit();
            if balance == 0.0 {
                return None;
            }

            let account = account_label(&line.code, &line.name);
            let memo = format!("Penutupan akun {} {}", line.code, line.name);
            let summary = summary_memo(&line.code);
            let amount = balance.abs();

            let (account_row, summary_row) = if balance > 0.0 {
                (
                    JournalRow::credit(date, &memo, &account, amount),
                    JournalRow::debit(date, &summary, CLOSING_ACCOUNT, amount),
                )
            } else {
                (
                    JournalRow::debit(date, &memo, &account, amount),
                    JournalRow::credit(date, &summary, CLOSING_ACCOUNT, amount),
                )
            };

            Some(ClosingPair {
                code: line.code.clone(),
                name: line.name.clone(),
                balance,
                account_row,
                summary_row,
            })
        })
        .collect()
}

/// Rows in posting order (account row, then its summary row)
pub fn closing_rows(pairs: &[ClosingPair]) -> Vec<JournalRow> {
    pairs
        .iter()
        .flat_map(|p| [p.account_row.clone(), p.summary_row.clone()])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{Side, TrialBalanceLine};

    fn line(code: &str, name: &str, debit: f64, credit: f64) -> TrialBalanceLine {
        TrialBalanceLine {
            code: code.to_string(),
            name: name.to_string(),
            side: Side::of(debit, credit),
            debit,
            credit,
        }
    }

    #[test]
    fn test_closing_zeroes_nominal_accounts() {
        let tb = TrialBalance {
            lines: vec![
                line("101", "Kas", 5000.0, 0.0),
                line("4-4000", "Penjualan barang dagang", 0.0, 1000.0),
                line("5-5000", "Harga pokok penjualan", 600.0, 0.0),
                line("6-6100", "Beban telepon, air, dan listrik", 100.0, 100.0),
            ],
        };
        let day = NaiveDate::from_ymd_opt(2025, 11, 30).unwrap();

        let pairs = plan_closing_entries(&tb, day);
        assert_eq!(pairs.len(), 2, "balance sheet and zero-balance accounts are left alone");

        let revenue = &pairs[0];
        assert_eq!(revenue.account_row.account, "4-4000 - Penjualan barang dagang");
        assert_eq!(revenue.account_row.debit, 1000.0);
        assert_eq!(revenue.account_row.memo, "Penutupan akun 4-4000 Penjualan barang dagang");
        assert_eq!(revenue.summary_row.account, CLOSING_ACCOUNT);
        assert_eq!(revenue.summary_row.credit, 1000.0);
        assert_eq!(revenue.summary_row.memo, "Penutupan ke akun penutup (4-4000)");

        let cogs = &pairs[1];
        assert_eq!(cogs.account_row.credit, 600.0);
        assert_eq!(cogs.summary_row.debit, 600.0);

        for pair in &pairs {
            let original = tb.lines.iter().find(|l| l.code == pair.code).unwrap();
            let after = original.net_debit() + pair.account_row.debit - pair.account_row.credit;
            assert_eq!(after, 0.0);
        }

        let rows = closing_rows(&pairs);
        assert_eq!(rows.len(), 4);
        let debit: f64 = rows.iter().map(|r| r.debit).sum();
        let credit: f64 = rows.iter().map(|r| r.credit).sum();
        assert_eq!(debit, credit);
    }
}
