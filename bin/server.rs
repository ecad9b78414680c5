// Honey Books - Web Server
// JSON API over the journal, inventory and reports, with Axum

use axum::{
    extract::{Form, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{delete, get, post},
    Router,
};
use chrono::{Local, NaiveDate};
use honey_books::{
    format_rupiah, format_signed_for_report, AppConfig, BalanceSheet, BookError, Books, DeletedEntry,
    EquityChange, IncomeStatement, InventoryItem, JournalEntry, LedgerAccount, LedgerFilter, Month,
    OpeningBalanceView, Period, PostingSummary, StockCard, StockChange, TrialBalance,
};
use honey_books::reports::ReportLine;
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Shared application state
#[derive(Clone)]
struct AppState {
    books: Arc<Books>,
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            error: None,
        }
    }

    fn failed(data: T, message: String) -> Self {
        Self {
            success: false,
            data,
            error: Some(message),
        }
    }
}

/// Ok → 200 with data. User errors → 400, storage errors → 500 (logged);
/// both carry the empty fallback as data.
fn respond<T: Serialize>(result: Result<T, BookError>, empty: T, what: &str) -> Response {
    match result {
        Ok(data) => (StatusCode::OK, Json(ApiResponse::ok(data))).into_response(),
        Err(e) if e.is_user_error() => {
            warn!("Rejected {}: {}", what, e);
            (StatusCode::BAD_REQUEST, Json(ApiResponse::failed(empty, e.to_string()))).into_response()
        }
        Err(e) => {
            error!("Error getting {}: {}", what, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::failed(empty, format!("Terjadi kesalahan: {}", e))),
            )
                .into_response()
        }
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

// ============================================================================
// Query parameters
// ============================================================================

#[derive(Debug, Default, Deserialize)]
struct PeriodQuery {
    tahun: Option<String>,
    bulan: Option<String>,
}

impl PeriodQuery {
    /// Missing parameters fall back to the configured period
    fn resolve(&self, config: &AppConfig) -> Result<Period, BookError> {
        let default = config.default_period;
        let tahun = self.tahun.clone().unwrap_or_else(|| default.year.to_string());
        let bulan = self.bulan.clone().unwrap_or_else(|| default.month.to_string());
        Period::parse(&tahun, &bulan)
    }
}

#[derive(Debug, Default, Deserialize)]
struct LedgerQuery {
    search: Option<String>,
    tahun: Option<String>,
    bulan: Option<String>,
}

impl LedgerQuery {
    /// Year and month filter independently; absent means unfiltered
    fn filter(&self) -> Result<LedgerFilter, BookError> {
        let year = match self.tahun.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(t) => Some(t.parse::<i32>().map_err(|_| BookError::InvalidYear(t.to_string()))?),
            None => None,
        };
        let month = match self.bulan.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(b) => Some(Month::from_name(b).ok_or_else(|| BookError::UnknownMonth(b.to_string()))?),
            None => None,
        };
        Ok(LedgerFilter { search: None, year, month }.with_search(self.search.as_deref().unwrap_or("")))
    }
}

#[derive(Debug, Default, Deserialize)]
struct StockCardQuery {
    product: Option<String>,
    tahun: Option<String>,
    bulan: Option<String>,
}

// ============================================================================
// Response views (numbers plus their display form)
// ============================================================================

#[derive(Serialize, Default)]
struct Money {
    value: f64,
    formatted: String,
}

impl Money {
    fn rupiah(value: f64) -> Self {
        Money { value, formatted: format_rupiah(value) }
    }

    fn report(value: f64) -> Self {
        Money { value, formatted: format_signed_for_report(value) }
    }
}

#[derive(Serialize)]
struct JournalEntryResponse {
    row_id: usize,
    tanggal: String,
    keterangan: String,
    akun: String,
    debit: Money,
    kredit: Money,
}

impl From<JournalEntry> for JournalEntryResponse {
    fn from(e: JournalEntry) -> Self {
        Self {
            row_id: e.row,
            tanggal: e.date.map(|d| d.to_string()).unwrap_or(e.raw_date),
            keterangan: e.memo,
            akun: e.account,
            debit: Money::rupiah(e.debit),
            kredit: Money::rupiah(e.credit),
        }
    }
}

#[derive(Serialize)]
struct InventoryItemResponse {
    item_code: String,
    name: String,
    stock: i64,
    cost_price: Money,
    selling_price: Money,
    total_cost: Money,
    gross_profit: Money,
}

impl From<InventoryItem> for InventoryItemResponse {
    fn from(item: InventoryItem) -> Self {
        Self {
            cost_price: Money::rupiah(item.cost_price),
            selling_price: Money::rupiah(item.selling_price),
            total_cost: Money::rupiah(item.total_cost()),
            gross_profit: Money::rupiah(item.gross_profit()),
            stock: item.stock,
            item_code: item.item_code,
            name: item.name,
        }
    }
}

#[derive(Serialize, Default)]
struct InventoryResponse {
    items: Vec<InventoryItemResponse>,
    total_cost_price_stock: Money,
}

#[derive(Serialize, Default)]
struct DashboardResponse {
    total_products: usize,
    total_inventory_value: Money,
    total_gross_profit: Money,
    low_stock_count: usize,
    low_stock_items: Vec<InventoryItemResponse>,
    journal_entries: Vec<JournalEntryResponse>,
}

#[derive(Serialize)]
struct AccountLineResponse {
    no_akun: String,
    nama_akun: String,
    side: String,
    debit: Money,
    kredit: Money,
}

#[derive(Serialize, Default)]
struct AccountListResponse {
    periode: String,
    lines: Vec<AccountLineResponse>,
    total_debit: Money,
    total_kredit: Money,
}

impl AccountListResponse {
    fn from_trial_balance(period: Period, tb: TrialBalance) -> Self {
        Self {
            periode: period.to_string(),
            total_debit: Money::rupiah(tb.total_debit()),
            total_kredit: Money::rupiah(tb.total_credit()),
            lines: tb
                .lines
                .into_iter()
                .map(|l| AccountLineResponse {
                    side: l.side.as_str().to_string(),
                    debit: Money::rupiah(l.debit),
                    kredit: Money::rupiah(l.credit),
                    no_akun: l.code,
                    nama_akun: l.name,
                })
                .collect(),
        }
    }

    fn from_opening(period: Period, view: OpeningBalanceView) -> Self {
        Self {
            periode: period.to_string(),
            total_debit: Money::rupiah(view.total_debit),
            total_kredit: Money::rupiah(view.total_credit),
            lines: view
                .lines
                .into_iter()
                .map(|l| AccountLineResponse {
                    debit: Money::rupiah(l.debit),
                    kredit: Money::rupiah(l.credit),
                    no_akun: l.code,
                    nama_akun: l.name,
                    side: l.side,
                })
                .collect(),
        }
    }
}

#[derive(Serialize)]
struct NamedAmount {
    name: String,
    amount: Money,
}

#[derive(Serialize, Default)]
struct IncomeStatementResponse {
    periode: String,
    revenues: Vec<NamedAmount>,
    total_revenue: Money,
    sales_returns: Vec<NamedAmount>,
    total_sales_returns: Money,
    net_sales: Money,
    cogs: Vec<NamedAmount>,
    total_cogs: Money,
    gross_profit: Money,
    expenses: Vec<NamedAmount>,
    total_expenses: Money,
    net_profit: Money,
}

impl IncomeStatementResponse {
    fn new(period: Period, is: IncomeStatement) -> Self {
        let named = |lines: Vec<ReportLine>| -> Vec<NamedAmount> {
            lines
                .into_iter()
                .map(|l| NamedAmount { name: l.name, amount: Money::rupiah(l.amount) })
                .collect()
        };
        Self {
            periode: period.to_string(),
            total_revenue: Money::rupiah(is.totals.revenue),
            total_sales_returns: Money::rupiah(is.totals.sales_returns),
            net_sales: Money::rupiah(is.net_sales),
            total_cogs: Money::rupiah(is.totals.cogs),
            gross_profit: Money::rupiah(is.gross_profit),
            total_expenses: Money::rupiah(is.totals.expenses),
            net_profit: Money::rupiah(is.net_profit),
            revenues: named(is.revenues),
            sales_returns: named(is.sales_returns),
            cogs: named(is.cogs),
            expenses: named(is.expenses),
        }
    }
}

#[derive(Serialize)]
struct SubcategoryResponse {
    name: String,
    item_list: Vec<NamedAmount>,
    total: Money,
}

#[derive(Serialize)]
struct CategoryResponse {
    name: String,
    subcategories: Vec<SubcategoryResponse>,
    total: Money,
}

#[derive(Serialize)]
struct GroupResponse {
    name: String,
    categories: Vec<CategoryResponse>,
    total: Money,
}

#[derive(Serialize, Default)]
struct BalanceSheetResponse {
    periode: String,
    groups: Vec<GroupResponse>,
    total_aktiva: Money,
    total_kewajiban_dan_ekuitas: Money,
}

impl BalanceSheetResponse {
    fn new(period: Period, bs: BalanceSheet) -> Self {
        Self {
            periode: period.to_string(),
            total_aktiva: Money::report(bs.total_assets),
            total_kewajiban_dan_ekuitas: Money::report(bs.total_liabilities_and_equity),
            groups: bs
                .groups
                .into_iter()
                .map(|g| GroupResponse {
                    name: g.name,
                    total: Money::report(g.total),
                    categories: g
                        .categories
                        .into_iter()
                        .map(|c| CategoryResponse {
                            name: c.name,
                            total: Money::report(c.total),
                            subcategories: c
                                .subcategories
                                .into_iter()
                                .map(|s| SubcategoryResponse {
                                    name: s.name,
                                    total: Money::report(s.total),
                                    item_list: s
                                        .items
                                        .into_iter()
                                        .map(|i| NamedAmount { name: i.name, amount: Money::report(i.amount) })
                                        .collect(),
                                })
                                .collect(),
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}

#[derive(Serialize, Default)]
struct EquityChangeResponse {
    periode: String,
    report_data: Vec<NamedAmount>,
    modal_akhir: Money,
}

impl EquityChangeResponse {
    fn new(period: Period, ec: EquityChange) -> Self {
        Self {
            periode: period.to_string(),
            report_data: ec
                .rows()
                .iter()
                .map(|(label, amount)| NamedAmount { name: label.to_string(), amount: Money::rupiah(*amount) })
                .collect(),
            modal_akhir: Money::rupiah(ec.closing_capital),
        }
    }
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/accounts - Account options for the entry form
async fn get_accounts(State(state): State<AppState>) -> impl IntoResponse {
    Json(ApiResponse::ok(state.books.accounts()))
}

/// GET /api/inventory - Items with stock value
async fn get_inventory(State(state): State<AppState>) -> Response {
    let result = state.books.inventory_items().map(|items| InventoryResponse {
        total_cost_price_stock: Money::rupiah(items.iter().map(|i| i.total_cost()).sum()),
        items: items.into_iter().map(Into::into).collect(),
    });
    respond(result, InventoryResponse::default(), "inventory")
}

/// GET /api/dashboard - Inventory summary and latest journal rows
async fn get_dashboard(State(state): State<AppState>) -> Response {
    let result = state.books.dashboard().map(|d| DashboardResponse {
        total_products: d.summary.total_products,
        total_inventory_value: Money::rupiah(d.summary.total_inventory_value),
        total_gross_profit: Money::rupiah(d.summary.total_gross_profit),
        low_stock_count: d.summary.low_stock_items.len(),
        low_stock_items: d.summary.low_stock_items.into_iter().map(Into::into).collect(),
        journal_entries: d.recent_entries.into_iter().map(Into::into).collect(),
    });
    respond(result, DashboardResponse::default(), "dashboard")
}

/// GET /api/journal - All journal rows
async fn get_journal(State(state): State<AppState>) -> Response {
    let result = state
        .books
        .journal_entries()
        .map(|entries| entries.into_iter().map(JournalEntryResponse::from).collect::<Vec<_>>());
    respond(result, Vec::new(), "journal entries")
}

/// POST /api/journal - Record a transaction from the entry form
async fn create_transaction(
    State(state): State<AppState>,
    Form(fields): Form<HashMap<String, String>>,
) -> Response {
    let result = state.books.record_transaction(&fields);
    if let Ok(summary) = &result {
        info!("Transaksi berhasil disimpan: {} rows", summary.appended);
    }
    respond(result, PostingSummary::default(), "transaction")
}

#[derive(Serialize, Default)]
struct DeleteResponse {
    row_id: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    restored_stock: Option<StockChange>,
}

/// DELETE /api/journal/:row - Delete one journal row
async fn delete_journal(State(state): State<AppState>, Path(row): Path<usize>) -> Response {
    let result = state
        .books
        .delete_journal_entry(row)
        .map(|DeletedEntry { entry, restored }| DeleteResponse { row_id: entry.row, restored_stock: restored });
    respond(result, DeleteResponse { row_id: row, restored_stock: None }, "journal delete")
}

/// GET /api/saldo-awal - Opening balances
async fn get_opening_balances(State(state): State<AppState>, Query(q): Query<PeriodQuery>) -> Response {
    let books = &state.books;
    let result = q.resolve(books.config()).and_then(|period| {
        let view = books.opening_balance_view(period, today())?;
        Ok(AccountListResponse::from_opening(period, view))
    });
    respond(result, AccountListResponse::default(), "opening balances")
}

/// GET /api/neraca-saldo - Trial balance
async fn get_trial_balance(State(state): State<AppState>, Query(q): Query<PeriodQuery>) -> Response {
    let books = &state.books;
    let result = q.resolve(books.config()).and_then(|period| {
        let tb = books.trial_balance(period, today())?;
        Ok(AccountListResponse::from_trial_balance(period, tb))
    });
    respond(result, AccountListResponse::default(), "trial balance")
}

/// GET /api/buku-besar - General ledger
async fn get_general_ledger(State(state): State<AppState>, Query(q): Query<LedgerQuery>) -> Response {
    let books = &state.books;
    let result = q.filter().and_then(|filter| books.general_ledger(&filter));
    respond(result, Vec::<LedgerAccount>::new(), "general ledger")
}

/// GET /api/laba-rugi - Income statement
async fn get_income_statement(State(state): State<AppState>, Query(q): Query<PeriodQuery>) -> Response {
    let books = &state.books;
    let result = q.resolve(books.config()).and_then(|period| {
        let is = books.income_statement(period, today())?;
        Ok(IncomeStatementResponse::new(period, is))
    });
    respond(result, IncomeStatementResponse::default(), "income statement")
}

/// GET /api/posisi-keuangan - Balance sheet
async fn get_balance_sheet(State(state): State<AppState>, Query(q): Query<PeriodQuery>) -> Response {
    let books = &state.books;
    let result = q.resolve(books.config()).and_then(|period| {
        let bs = books.balance_sheet(period, today())?;
        Ok(BalanceSheetResponse::new(period, bs))
    });
    respond(result, BalanceSheetResponse::default(), "balance sheet")
}

/// GET /api/perubahan-ekuitas - Equity change
async fn get_equity_change(State(state): State<AppState>, Query(q): Query<PeriodQuery>) -> Response {
    let books = &state.books;
    let result = q.resolve(books.config()).and_then(|period| {
        let ec = books.equity_change(period, today())?;
        Ok(EquityChangeResponse::new(period, ec))
    });
    respond(result, EquityChangeResponse::default(), "equity change")
}

/// GET /api/kartu-stok - Stock card for one product
async fn get_stock_card(State(state): State<AppState>, Query(q): Query<StockCardQuery>) -> Response {
    let books = &state.books;
    let period_query = PeriodQuery { tahun: q.tahun.clone(), bulan: q.bulan.clone() };
    let result = period_query.resolve(books.config()).and_then(|period| match q.product.as_deref() {
        Some(product) if !product.trim().is_empty() => books.stock_card(product, period),
        _ => Ok(None),
    });
    respond(result, None::<StockCard>, "stock card")
}

/// POST /api/jurnal-penutup - Post closing entries for a period
async fn close_period(State(state): State<AppState>, Query(q): Query<PeriodQuery>) -> Response {
    let books = &state.books;
    let result = q
        .resolve(books.config())
        .and_then(|period| books.close_period(period, today()))
        .map(Some);
    respond(result, None, "closing entries")
}

// ============================================================================
// Main Server
// ============================================================================

fn app(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/accounts", get(get_accounts))
        .route("/inventory", get(get_inventory))
        .route("/dashboard", get(get_dashboard))
        .route("/journal", get(get_journal).post(create_transaction))
        .route("/journal/:row", delete(delete_journal))
        .route("/saldo-awal", get(get_opening_balances))
        .route("/neraca-saldo", get(get_trial_balance))
        .route("/buku-besar", get(get_general_ledger))
        .route("/laba-rugi", get(get_income_statement))
        .route("/posisi-keuangan", get(get_balance_sheet))
        .route("/perubahan-ekuitas", get(get_equity_change))
        .route("/kartu-stok", get(get_stock_card))
        .route("/jurnal-penutup", post(close_period))
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!("🍯 Honey Books - Web Server");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let config = AppConfig::from_env();
    println!("✓ Data directory: {:?}", config.data_dir);
    println!("✓ Default period: {}", config.default_period);

    let addr = config.bind_addr.clone();
    let state = AppState {
        books: Arc::new(Books::new(config)),
    };

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {}", addr, e))?;

    println!("\n🚀 Server running on http://{}", addr);
    println!("   API: http://{}/api/neraca-saldo?tahun=2025&bulan=November", addr);
    println!("\n   Press Ctrl+C to stop\n");

    axum::serve(listener, app(state)).await?;
    Ok(())
}
