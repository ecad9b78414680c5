// Honey Books - Core Library
// Bookkeeping for a honey shop: journal, inventory, ledger and reports.
// Exposes all modules for use in the CLI, the API server, and tests.

pub mod amount;
pub mod books;
pub mod chart;
pub mod closing;
pub mod config;
pub mod entry;
pub mod error;
pub mod inventory;
pub mod journal;
pub mod ledger;
pub mod opening;
pub mod period;
pub mod reports;
pub mod stock_card;
pub mod storage;

// Re-export commonly used types
pub use amount::{format_rupiah, format_rupiah_for_report, format_signed_for_report, parse_amount};
pub use books::{Books, ClosingOutcome, Dashboard};
pub use chart::{account_options, AccountClass, ACCOUNTS};
pub use closing::{plan_closing_entries, ClosingPair};
pub use config::AppConfig;
pub use entry::{PostingSummary, TransactionForm, TransactionKind};
pub use error::{BookError, Result};
pub use inventory::{InventoryItem, InventoryStore, InventorySummary, StockChange};
pub use journal::{DeletedEntry, JournalEntry, JournalRow, JournalStore};
pub use ledger::{
    build_general_ledger, build_trial_balance, LedgerAccount, LedgerFilter, LedgerPosting, Side,
    TrialBalance, TrialBalanceLine,
};
pub use opening::{OpeningBalance, OpeningBalanceStore, OpeningBalanceView, OpeningBalances};
pub use period::{is_period_visible, Month, Period};
pub use reports::{net_profit, BalanceSheet, EquityChange, IncomeStatement, ProfitBreakdown};
pub use stock_card::{build_stock_card, StockCard};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
