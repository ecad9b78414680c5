// 📊 Report Classifiers - income statement, balance sheet, equity change
//
// All three reports read the same trial balance and share one net-profit
// computation, so their bottom lines always agree.

use crate::chart::{AccountClass, SALES_RETURN_PREFIX};
use crate::ledger::{TrialBalance, TrialBalanceLine};
use log::warn;
use serde::Serialize;

// ============================================================================
// NET PROFIT (shared)
// ============================================================================

/// Sales returns: name mentions "retur" or the code is under 4-4100
pub fn is_sales_return(code: &str, name: &str) -> bool {
    name.to_lowercase().contains("retur") || code.starts_with(SALES_RETURN_PREFIX)
}

/// Period totals of the nominal accounts
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ProfitBreakdown {
    pub revenue: f64,
    pub sales_returns: f64,
    pub cogs: f64,
    pub expenses: f64,
}

impl ProfitBreakdown {
    pub fn from_lines<'a>(lines: impl IntoIterator<Item = &'a TrialBalanceLine>) -> Self {
        let mut p = ProfitBreakdown::default();
        for line in lines {
            match line.class() {
                AccountClass::Revenue if is_sales_return(&line.code, &line.name) => {
                    p.sales_returns += line.net_credit().abs();
                }
                AccountClass::Revenue => p.revenue += line.net_credit().max(0.0),
                AccountClass::CostOfGoodsSold => p.cogs += line.net_debit().max(0.0),
                AccountClass::Expense => p.expenses += line.net_debit().max(0.0),
                _ => {}
            }
        }
        p
    }

    pub fn net_sales(&self) -> f64 {
        self.revenue - self.sales_returns
    }

    pub fn gross_profit(&self) -> f64 {
        self.net_sales() - self.cogs
    }

    pub fn net_profit(&self) -> f64 {
        self.gross_profit() - self.expenses
    }
}

pub fn net_profit(tb: &TrialBalance) -> f64 {
    ProfitBreakdown::from_lines(&tb.lines).net_profit()
}

/// Σ (credit − debit) over equity accounts (prefix 3)
pub fn opening_capital(tb: &TrialBalance) -> f64 {
    tb.lines
        .iter()
        .filter(|l| l.class() == AccountClass::Equity)
        .map(|l| l.net_credit())
        .sum()
}

// ============================================================================
// INCOME STATEMENT (laba rugi)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportLine {
    pub name: String,
    pub amount: f64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct IncomeStatement {
    pub revenues: Vec<ReportLine>,
    pub sales_returns: Vec<ReportLine>,
    pub cogs: Vec<ReportLine>,
    pub expenses: Vec<ReportLine>,
    pub totals: ProfitBreakdown,
    pub net_sales: f64,
    pub gross_profit: f64,
    pub net_profit: f64,
}

impl IncomeStatement {
    pub fn from_trial_balance(tb: &TrialBalance) -> Self {
        let mut report = IncomeStatement::default();

        for line in &tb.lines {
            let name = line.name.clone();
            match line.class() {
                AccountClass::Revenue if is_sales_return(&line.code, &line.name) => {
                    report.sales_returns.push(ReportLine { name, amount: line.net_credit().abs() });
                }
                AccountClass::Revenue => {
                    report.revenues.push(ReportLine { name, amount: line.net_credit().max(0.0) });
                }
                AccountClass::CostOfGoodsSold => {
                    report.cogs.push(ReportLine { name, amount: line.net_debit().max(0.0) });
                }
                AccountClass::Expense => {
                    report.expenses.push(ReportLine { name, amount: line.net_debit().max(0.0) });
                }
                _ => {}
            }
        }

        let totals = ProfitBreakdown::from_lines(&tb.lines);
        report.net_sales = totals.net_sales();
        report.gross_profit = totals.gross_profit();
        report.net_profit = totals.net_profit();
        report.totals = totals;
        report
    }

    pub fn is_empty(&self) -> bool {
        self.revenues.is_empty()
            && self.sales_returns.is_empty()
            && self.cogs.is_empty()
            && self.expenses.is_empty()
    }
}

// ============================================================================
// BALANCE SHEET (posisi keuangan)
// ============================================================================

pub const CURRENT_ASSETS: &str = "Aset Lancar";
pub const FIXED_ASSETS: &str = "Aset Tetap";
pub const LIABILITIES: &str = "Kewajiban";
pub const OPENING_CAPITAL: &str = "Modal Awal";
pub const NET_PROFIT: &str = "Laba Bersih";

const CURRENT_ASSET_CODES: &[&str] = &["101", "102", "103", "1310", "1400"];
const CURRENT_ASSET_NAMES: &[&str] = &[
    "kas",
    "piutang usaha",
    "persediaan barang dagang",
    "persediaan stok madu gudang",
    "perlengkapan toko",
];
const FIXED_ASSET_CODES: &[&str] = &["104", "1500", "1510", "1511", "1600", "1610", "1700", "1710"];
const FIXED_ASSET_NAMES: &[&str] = &[
    "tanah",
    "bangunan",
    "akumulasi penyusutan bangunan",
    "kendaraan",
    "akumulasi penyusutan kendaraan",
    "peralatan",
    "akumulasi penyusutan peralatan",
];
const LIABILITY_CODES: &[&str] = &["201"];
const CAPITAL_CODES: &[&str] = &["301"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Category {
    Aktiva,
    Kewajiban,
    Ekuitas,
}

fn classify(code: &str, name: &str) -> Option<(Category, &'static str)> {
    let lower = name.to_lowercase();
    let lower = lower.as_str();

    if CURRENT_ASSET_CODES.contains(&code) || CURRENT_ASSET_NAMES.contains(&lower) {
        Some((Category::Aktiva, CURRENT_ASSETS))
    } else if FIXED_ASSET_CODES.contains(&code) || FIXED_ASSET_NAMES.contains(&lower) {
        Some((Category::Aktiva, FIXED_ASSETS))
    } else if LIABILITY_CODES.contains(&code) || lower == "hutang dagang" {
        Some((Category::Kewajiban, LIABILITIES))
    } else if CAPITAL_CODES.contains(&code) || lower == "modal awal" {
        Some((Category::Ekuitas, OPENING_CAPITAL))
    } else if lower.contains("laba bersih") {
        Some((Category::Ekuitas, NET_PROFIT))
    } else {
        None
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Subcategory {
    pub name: String,
    pub items: Vec<ReportLine>,
    pub total: f64,
}

impl Subcategory {
    fn new(name: &str, items: Vec<ReportLine>) -> Self {
        let total = items.iter().map(|i| i.amount).sum();
        Subcategory { name: name.to_string(), items, total }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BalanceCategory {
    pub name: String,
    pub subcategories: Vec<Subcategory>,
    pub total: f64,
}

impl BalanceCategory {
    fn new(name: &str, subcategories: Vec<Subcategory>) -> Self {
        let total = subcategories.iter().map(|s| s.total).sum();
        BalanceCategory { name: name.to_string(), subcategories, total }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BalanceGroup {
    pub name: String,
    pub categories: Vec<BalanceCategory>,
    pub total: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct BalanceSheet {
    /// AKTIVA, then KEWAJIBAN DAN EKUITAS
    pub groups: Vec<BalanceGroup>,
    pub total_assets: f64,
    pub total_liabilities_and_equity: f64,
}

/// Nominal accounts reach the balance sheet only through Laba Bersih
fn expects_classification(line: &TrialBalanceLine) -> bool {
    !line.class().is_nominal()
}

impl BalanceSheet {
    pub fn from_trial_balance(tb: &TrialBalance) -> Self {
        let mut current = Vec::new();
        let mut fixed = Vec::new();
        let mut liabilities = Vec::new();

        for line in &tb.lines {
            let (category, sub) = match classify(&line.code, &line.name) {
                Some(c) => c,
                None => {
                    if expects_classification(line) {
                        warn!(
                            "Unclassified account in balance sheet: code={}, name={}",
                            line.code, line.name
                        );
                    }
                    continue;
                }
            };

            let mut amount = match category {
                Category::Kewajiban | Category::Ekuitas => line.net_credit(),
                Category::Aktiva => line.net_debit(),
            };
            if sub == FIXED_ASSETS && line.name.to_lowercase().contains("akumulasi penyusutan") {
                amount = -amount.abs();
            }

            let item = ReportLine { name: line.name.clone(), amount };
            match sub {
                CURRENT_ASSETS => current.push(item),
                FIXED_ASSETS => fixed.push(item),
                LIABILITIES => liabilities.push(item),
                // Equity is replaced by the computed lines below
                _ => {}
            }
        }

        let capital = opening_capital(tb);
        let profit = net_profit(tb);

        let aktiva = BalanceCategory::new(
            "AKTIVA",
            vec![Subcategory::new(CURRENT_ASSETS, current), Subcategory::new(FIXED_ASSETS, fixed)],
        );
        let kewajiban = BalanceCategory::new("KEWAJIBAN", vec![Subcategory::new(LIABILITIES, liabilities)]);
        let ekuitas = BalanceCategory::new(
            "EKUITAS",
            vec![
                Subcategory::new(
                    OPENING_CAPITAL,
                    vec![ReportLine { name: OPENING_CAPITAL.to_string(), amount: capital }],
                ),
                Subcategory::new(
                    NET_PROFIT,
                    vec![ReportLine { name: NET_PROFIT.to_string(), amount: profit }],
                ),
            ],
        );

        let total_assets = aktiva.total;
        let total_liabilities_and_equity = kewajiban.total + ekuitas.total;

        BalanceSheet {
            groups: vec![
                BalanceGroup {
                    name: "AKTIVA".to_string(),
                    categories: vec![aktiva],
                    total: total_assets,
                },
                BalanceGroup {
                    name: "KEWAJIBAN DAN EKUITAS".to_string(),
                    categories: vec![kewajiban, ekuitas],
                    total: total_liabilities_and_equity,
                },
            ],
            total_assets,
            total_liabilities_and_equity,
        }
    }

    pub fn is_balanced(&self) -> bool {
        (self.total_assets - self.total_liabilities_and_equity).abs() < 0.5
    }
}

// ============================================================================
// EQUITY CHANGE (perubahan ekuitas)
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EquityChange {
    pub opening_capital: f64,
    pub net_profit: f64,
    pub closing_capital: f64,
}

impl EquityChange {
    pub fn from_trial_balance(tb: &TrialBalance) -> Self {
        let opening_capital = opening_capital(tb);
        let net_profit = net_profit(tb);
        EquityChange {
            opening_capital,
            net_profit,
            closing_capital: opening_capital + net_profit,
        }
    }

    /// (label, amount) rows in display order
    pub fn rows(&self) -> [(&'static str, f64); 2] {
        [
            ("Modal Awal", self.opening_capital),
            ("Laba Bersih Tahun Berjalan", self.net_profit),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::Side;

    fn line(code: &str, name: &str, debit: f64, credit: f64) -> TrialBalanceLine {
        TrialBalanceLine {
            code: code.to_string(),
            name: name.to_string(),
            side: Side::of(debit, credit),
            debit,
            credit,
        }
    }

    fn tb(lines: Vec<TrialBalanceLine>) -> TrialBalance {
        TrialBalance { lines }
    }

    #[test]
    fn test_net_profit_revenue_minus_expense() {
        let t = tb(vec![
            line("4-4000", "Penjualan barang dagang", 0.0, 1_000_000.0),
            line("6-6100", "Beban telepon, air, dan listrik", 200_000.0, 0.0),
        ]);
        assert_eq!(net_profit(&t), 800_000.0);

        let is = IncomeStatement::from_trial_balance(&t);
        assert_eq!(is.net_profit, 800_000.0);
        assert_eq!(is.revenues[0].amount, 1_000_000.0);
        assert_eq!(is.expenses[0].amount, 200_000.0);
    }

    #[test]
    fn test_returns_cogs_and_clamping() {
        let t = tb(vec![
            line("4-4000", "Penjualan barang dagang", 0.0, 1_000_000.0),
            line("4-4100", "Retur penjualan", 50_000.0, 0.0),
            line("4-4200", "Pendapatan lain", 10.0, 0.0),
            line("5-5000", "Harga pokok penjualan", 600_000.0, 0.0),
            line("6-6200", "Beban perlengkapan", 0.0, 5.0),
        ]);

        let is = IncomeStatement::from_trial_balance(&t);
        assert_eq!(is.totals.revenue, 1_000_000.0, "negative revenue clamps to 0");
        assert_eq!(is.totals.sales_returns, 50_000.0);
        assert_eq!(is.net_sales, 950_000.0);
        assert_eq!(is.gross_profit, 350_000.0);
        assert_eq!(is.totals.expenses, 0.0);
        assert_eq!(is.net_profit, 350_000.0);
        assert_eq!(is.sales_returns.len(), 1);
    }

    #[test]
    fn test_return_detected_by_name() {
        assert!(is_sales_return("4-4900", "Retur Penjualan Madu"));
        assert!(is_sales_return("4-4100", "Potongan"));
        assert!(!is_sales_return("4-4000", "Penjualan"));
    }

    #[test]
    fn test_balance_sheet_classification() {
        let t = tb(vec![
            line("101", "Kas", 10_000_000.0, 0.0),
            line("1-1300", "Persediaan barang dagang", 3_000_000.0, 500_000.0),
            line("1-1700", "Peralatan", 4_000_000.0, 0.0),
            line("1-1710", "Akumulasi penyusutan peralatan", 0.0, 1_000_000.0),
            line("201", "Utang Usaha", 0.0, 2_000_000.0),
            line("301", "Modal", 0.0, 12_000_000.0),
            line("4-4000", "Penjualan barang dagang", 0.0, 1_500_000.0),
        ]);

        let bs = BalanceSheet::from_trial_balance(&t);
        assert_eq!(bs.groups.len(), 2);
        assert_eq!(bs.groups[0].name, "AKTIVA");
        assert_eq!(bs.groups[1].name, "KEWAJIBAN DAN EKUITAS");

        let aktiva = &bs.groups[0].categories[0];
        assert_eq!(aktiva.subcategories[0].total, 12_500_000.0);
        let fixed = &aktiva.subcategories[1];
        assert_eq!(fixed.items[1].amount, -1_000_000.0);
        assert_eq!(fixed.total, 3_000_000.0);
        assert_eq!(bs.total_assets, 15_500_000.0);

        let ekuitas = &bs.groups[1].categories[1];
        assert_eq!(ekuitas.subcategories[0].items[0].amount, 12_000_000.0);
        assert_eq!(ekuitas.subcategories[1].items[0].amount, 1_500_000.0);
        assert_eq!(bs.total_liabilities_and_equity, 15_500_000.0);
        assert!(bs.is_balanced());
    }

    #[test]
    fn test_only_real_accounts_warn_when_unclassified() {
        assert!(!expects_classification(&line("4-4000", "Penjualan barang dagang", 0.0, 1.0)));
        assert!(!expects_classification(&line("503", "Beban Depresiasi Aktiva Tetap", 1.0, 0.0)));
        assert!(!expects_classification(&line("6-6100", "Beban listrik", 1.0, 0.0)));
        assert!(expects_classification(&line("2-2200", "Utang gaji", 0.0, 1.0)));
        assert!(expects_classification(&line("3101", "Ikhtisar Laba Rugi", 0.0, 1.0)));
    }

    #[test]
    fn test_equity_change() {
        let t = tb(vec![
            line("301", "Modal", 0.0, 42_000_000.0),
            line("3-3100", "Prive", 2_000_000.0, 0.0),
            line("4-4000", "Penjualan barang dagang", 0.0, 900_000.0),
            line("5-5000", "Harga pokok penjualan", 400_000.0, 0.0),
        ]);

        let ec = EquityChange::from_trial_balance(&t);
        assert_eq!(ec.opening_capital, 40_000_000.0);
        assert_eq!(ec.net_profit, 500_000.0);
        assert_eq!(ec.closing_capital, 40_500_000.0);
        assert_eq!(ec.rows()[1].0, "Laba Bersih Tahun Berjalan");
    }

    #[test]
    fn test_empty_trial_balance() {
        let t = TrialBalance::default();
        assert!(IncomeStatement::from_trial_balance(&t).is_empty());
        let bs = BalanceSheet::from_trial_balance(&t);
        assert_eq!(bs.total_assets, 0.0);
        assert_eq!(EquityChange::from_trial_balance(&t), EquityChange::default());
    }
}
