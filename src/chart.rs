// 📒 Chart of accounts - static code → name table
// Account classes follow the first digit of the code (1 aset ... 6 beban)

use serde::{Deserialize, Serialize};

/// Accounts offered on the transaction-entry form
pub const ACCOUNTS: &[(&str, &str)] = &[
    ("1-1100", "Kas"),
    ("1-1200", "Piutang usaha"),
    ("1-1300", "Persediaan barang dagang"),
    ("1-1310", "Persediaan stok madu gudang"),
    ("1-1400", "Perlengkapan toko"),
    ("1-1500", "Tanah"),
    ("1-1510", "Bangunan"),
    ("1-1511", "Akumulasi penyusutan bangunan"),
    ("1-1600", "Kendaraan"),
    ("1-1610", "Akumulasi penyusutan kendaraan"),
    ("1-1700", "Peralatan"),
    ("1-1710", "Akumulasi penyusutan peralatan"),
    ("2-2100", "Hutang dagang"),
    ("3-3000", "Modal"),
    ("4-4000", "Penjualan barang dagang"),
    ("4-4100", "Retur penjualan"),
    ("5-5000", "Harga pokok penjualan"),
    ("6-6100", "Beban telepon, air, dan listrik"),
    ("6-6200", "Beban perlengkapan"),
    ("6-6300", "Beban pemeliharaan"),
    ("6-6400", "Beban gaji produksi"),
    ("6-6500", "Beban gaji pemeliharaan lebah"),
    ("6-6600", "Beban transportasi pemeliharaan lebah"),
    ("6-6700", "Beban transportasi penjualan lebah"),
    ("6-6800", "Beban depresiasi aktiva tetap"),
];

/// Code prefix that marks the sales-return account
pub const SALES_RETURN_PREFIX: &str = "4-4100";

/// Account labels used by the automatic COGS entries of a sale
pub const COGS_ACCOUNT: &str = "5-5000 - Harga pokok penjualan";
pub const INVENTORY_ACCOUNT: &str = "1-1300 - Persediaan barang dagang";

/// Income-summary account that revenue and expense accounts are closed into
pub const CLOSING_ACCOUNT: &str = "3101 - Ikhtisar Laba Rugi";

// ============================================================================
// ACCOUNT CLASS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountClass {
    Asset,
    Liability,
    Equity,
    Revenue,
    CostOfGoodsSold,
    Expense,
    Other,
}

impl AccountClass {
    /// Classify by the first character of the account code
    pub fn of_code(code: &str) -> AccountClass {
        match code.trim().chars().next() {
            Some('1') => AccountClass::Asset,
            Some('2') => AccountClass::Liability,
            Some('3') => AccountClass::Equity,
            Some('4') => AccountClass::Revenue,
            Some('5') => AccountClass::CostOfGoodsSold,
            Some('6') => AccountClass::Expense,
            _ => AccountClass::Other,
        }
    }

    /// Revenue, COGS and expense accounts (closed at period end)
    pub fn is_nominal(&self) -> bool {
        matches!(
            self,
            AccountClass::Revenue | AccountClass::CostOfGoodsSold | AccountClass::Expense
        )
    }
}

/// "<code> - <name>" labels for the entry form
pub fn account_options() -> Vec<String> {
    ACCOUNTS
        .iter()
        .map(|(code, name)| account_label(code, name))
        .collect()
}

pub fn account_label(code: &str, name: &str) -> String {
    format!("{} - {}", code, name)
}

/// Split a stored account cell. "1-1100 - Kas" → ("1-1100", "Kas");
/// a bare value is used as both code and name.
pub fn split_account(raw: &str) -> (String, String) {
    let s = raw.trim();
    match s.split_once(" - ") {
        Some((code, name)) => (code.trim().to_string(), name.trim().to_string()),
        None => (s.to_string(), s.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_account() {
        assert_eq!(
            split_account("1-1100 - Kas"),
            ("1-1100".to_string(), "Kas".to_string())
        );
        assert_eq!(
            split_account(" 6-6100 - Beban telepon, air, dan listrik "),
            ("6-6100".to_string(), "Beban telepon, air, dan listrik".to_string())
        );
        // Only the first separator splits
        assert_eq!(
            split_account("9-9000 - A - B"),
            ("9-9000".to_string(), "A - B".to_string())
        );
        assert_eq!(split_account("Kas"), ("Kas".to_string(), "Kas".to_string()));
    }

    #[test]
    fn test_classify_by_prefix() {
        assert_eq!(AccountClass::of_code("1-1100"), AccountClass::Asset);
        assert_eq!(AccountClass::of_code("201"), AccountClass::Liability);
        assert_eq!(AccountClass::of_code("3101"), AccountClass::Equity);
        assert_eq!(AccountClass::of_code("4-4100"), AccountClass::Revenue);
        assert_eq!(AccountClass::of_code("5-5000"), AccountClass::CostOfGoodsSold);
        assert_eq!(AccountClass::of_code("6-6800"), AccountClass::Expense);
        assert_eq!(AccountClass::of_code("Kas"), AccountClass::Other);
        assert!(AccountClass::of_code("6-6100").is_nominal());
        assert!(!AccountClass::of_code("1-1100").is_nominal());
    }

    #[test]
    fn test_account_options_match_chart() {
        let options = account_options();
        assert_eq!(options.len(), ACCOUNTS.len());
        assert_eq!(options[0], "1-1100 - Kas");
        assert!(options.contains(&COGS_ACCOUNT.to_string()));
        assert!(options.contains(&INVENTORY_ACCOUNT.to_string()));
    }
}
