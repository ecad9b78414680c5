// ✍️ Transaction Entry - form decoding, validation, posting
//
// The entry form sends indexed repeating groups (akun_debit_1/debit_1, ...).
// Each group ends at the first index whose key is missing.

use crate::amount::{parse_amount, parse_int_cell};
use crate::chart::{COGS_ACCOUNT, INVENTORY_ACCOUNT};
use crate::error::{BookError, Result};
use crate::inventory::{InventoryItem, InventoryStore, StockChange};
use crate::journal::{parse_journal_date, JournalRow, JournalStore};
use chrono::NaiveDate;
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const BALANCE_TOLERANCE: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionKind {
    Umum,
    Penjualan,
    Pembelian,
}

impl TransactionKind {
    /// Anything other than Penjualan/Pembelian is a plain journal entry
    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "Penjualan" => TransactionKind::Penjualan,
            "Pembelian" => TransactionKind::Pembelian,
            _ => TransactionKind::Umum,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmountLine {
    pub account: String,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductLine {
    pub product_code: String,
    pub quantity: i64,
}

/// Decoded transaction-entry form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionForm {
    pub kind: TransactionKind,
    pub date: String,
    pub memo: String,
    pub debits: Vec<AmountLine>,
    pub credits: Vec<AmountLine>,
    pub sales: Vec<ProductLine>,
    pub purchases: Vec<ProductLine>,
}

fn field<'a>(fields: &'a HashMap<String, String>, key: &str) -> &'a str {
    fields.get(key).map(|s| s.trim()).unwrap_or("")
}

fn amount_lines(fields: &HashMap<String, String>, account_prefix: &str, amount_prefix: &str) -> Vec<AmountLine> {
    let mut lines = Vec::new();
    for index in 1.. {
        let account_key = format!("{}{}", account_prefix, index);
        if !fields.contains_key(&account_key) {
            break;
        }
        let account = field(fields, &account_key);
        let raw = field(fields, &format!("{}{}", amount_prefix, index));
        if account.is_empty() || raw.is_empty() {
            continue;
        }
        let amount = parse_amount(raw);
        if amount > 0.0 {
            lines.push(AmountLine { account: account.to_string(), amount });
        }
    }
    lines
}

fn product_lines(fields: &HashMap<String, String>, product_prefix: &str, quantity_prefix: &str) -> Vec<ProductLine> {
    let mut lines = Vec::new();
    for index in 1.. {
        let product_key = format!("{}{}", product_prefix, index);
        if !fields.contains_key(&product_key) {
            break;
        }
        let code = field(fields, &product_key);
        let quantity_key = format!("{}{}", quantity_prefix, index);
        let raw = field(fields, &quantity_key);
        if code.is_empty() || raw.is_empty() {
            continue;
        }
        match parse_int_cell(raw) {
            Some(quantity) if quantity > 0 => lines.push(ProductLine {
                product_code: code.to_string(),
                quantity,
            }),
            Some(_) => {}
            None => warn!("Invalid quantity value for {}: {:?}", quantity_key, raw),
        }
    }
    lines
}

impl TransactionForm {
    pub fn from_fields(fields: &HashMap<String, String>) -> Self {
        TransactionForm {
            kind: TransactionKind::parse(field(fields, "jenis_transaksi")),
            date: field(fields, "tanggal").to_string(),
            memo: field(fields, "keterangan").to_string(),
            debits: amount_lines(fields, "akun_debit_", "debit_"),
            credits: amount_lines(fields, "akun_kredit_", "kredit_"),
            sales: product_lines(fields, "product_", "quantity_"),
            purchases: product_lines(fields, "purchase_product_", "purchase_quantity_"),
        }
    }

    pub fn total_debit(&self) -> f64 {
        self.debits.iter().map(|l| l.amount).sum()
    }

    pub fn total_credit(&self) -> f64 {
        self.credits.iter().map(|l| l.amount).sum()
    }

    /// Check business rules against the current inventory. Nothing is written.
    pub fn validate(&self, inventory: &[InventoryItem]) -> Result<ValidatedTransaction> {
        let date = parse_journal_date(&self.date)
            .ok_or_else(|| BookError::validation(format!("Tanggal transaksi tidak valid: {:?}", self.date)))?;

        if self.debits.is_empty() || self.credits.is_empty() {
            return Err(BookError::validation(
                "Transaksi harus memiliki minimal satu akun debit dan satu akun kredit dengan jumlah > 0.",
            ));
        }

        let (total_debit, total_credit) = (self.total_debit(), self.total_credit());
        if (total_debit - total_credit).abs() > BALANCE_TOLERANCE {
            return Err(BookError::validation(format!(
                "Total debit ({}) dan total kredit ({}) harus sama.",
                total_debit, total_credit
            )));
        }

        let mut sales = Vec::new();
        let mut purchases = Vec::new();

        match self.kind {
            TransactionKind::Penjualan => {
                // Lines naming the same product draw on the same stock
                let mut requested: HashMap<&str, i64> = HashMap::new();
                for line in &self.sales {
                    let item = match find_item(inventory, &line.product_code) {
                        Some(item) => item,
                        None => {
                            warn!("Product code {} not found in inventory for sale", line.product_code);
                            continue;
                        }
                    };
                    let total = requested.entry(item.item_code.as_str()).or_insert(0);
                    *total += line.quantity;
                    if *total > item.stock {
                        return Err(BookError::validation(format!(
                            "Stok untuk {} tidak mencukupi. Stok tersedia: {}",
                            item.name, item.stock
                        )));
                    }
                    sales.push(ItemQuantity { item: item.clone(), quantity: line.quantity });
                }
                if sales.is_empty() {
                    return Err(BookError::validation("Penjualan harus memiliki minimal satu produk."));
                }
            }
            TransactionKind::Pembelian => {
                for line in &self.purchases {
                    match find_item(inventory, &line.product_code) {
                        Some(item) => purchases.push(ItemQuantity { item: item.clone(), quantity: line.quantity }),
                        None => warn!("Product code {} not found in inventory for purchase", line.product_code),
                    }
                }
            }
            TransactionKind::Umum => {}
        }

        let mut rows: Vec<JournalRow> = self
            .debits
            .iter()
            .map(|l| JournalRow::debit(date, &self.memo, &l.account, l.amount))
            .collect();
        rows.extend(
            self.credits
                .iter()
                .map(|l| JournalRow::credit(date, &self.memo, &l.account, l.amount)),
        );

        Ok(ValidatedTransaction {
            kind: self.kind,
            date,
            memo: self.memo.clone(),
            rows,
            sales,
            purchases,
        })
    }
}

fn find_item<'a>(inventory: &'a [InventoryItem], code: &str) -> Option<&'a InventoryItem> {
    let wanted = code.trim().to_uppercase();
    inventory.iter().find(|item| item.item_code == wanted)
}

// ============================================================================
// POSTING
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemQuantity {
    pub item: InventoryItem,
    pub quantity: i64,
}

impl ItemQuantity {
    pub fn cogs(&self) -> f64 {
        self.quantity as f64 * self.item.cost_price
    }
}

/// A form that passed validation, ready to post
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidatedTransaction {
    pub kind: TransactionKind,
    pub date: NaiveDate,
    pub memo: String,
    /// Debit rows first, then credit rows
    pub rows: Vec<JournalRow>,
    pub sales: Vec<ItemQuantity>,
    pub purchases: Vec<ItemQuantity>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PostingSummary {
    pub appended: usize,
    pub duplicates: usize,
    pub stock_changes: Vec<StockChange>,
}

pub fn cogs_memo(memo: &str, item_name: &str) -> String {
    format!("{} - {} [AUTO]", memo, item_name)
}

impl ValidatedTransaction {
    /// Append the journal rows (plus COGS rows for a sale), then move stock.
    /// A sale item whose COGS rows already exist is skipped entirely.
    pub fn post(&self, journal: &JournalStore, inventory: &InventoryStore) -> Result<PostingSummary> {
        let mut batch = journal.batch()?;
        for row in &self.rows {
            batch.push(row);
        }

        let mut stock_moves: Vec<(&InventoryItem, i64)> = Vec::new();
        for sale in &self.sales {
            let memo = cogs_memo(&self.memo, &sale.item.name);
            let amount = sale.cogs();
            let debit_row = JournalRow::debit(self.date, &memo, COGS_ACCOUNT, amount);
            let credit_row = JournalRow::credit(self.date, &memo, INVENTORY_ACCOUNT, amount);

            if batch.contains(&debit_row) || batch.contains(&credit_row) {
                info!("Auto journal entries already exist for {:?}, skipping stock update", memo);
                continue;
            }
            batch.push(&debit_row);
            batch.push(&credit_row);
            stock_moves.push((&sale.item, -sale.quantity));
        }
        for purchase in &self.purchases {
            stock_moves.push((&purchase.item, purchase.quantity));
        }

        let outcome = batch.commit()?;

        let mut stock_changes = Vec::new();
        for (item, delta) in stock_moves {
            match inventory.adjust_stock(&item.name, delta)? {
                Some(change) => {
                    debug!("Stock {:?}: {} → {}", change.item_name, change.old_stock, change.new_stock);
                    stock_changes.push(change);
                }
                None => error!("Failed to update stock for {:?}", item.name),
            }
        }

        info!(
            "Posted {:?} transaction {:?}: {} rows appended, {} duplicates, {} stock changes",
            self.kind,
            self.memo,
            outcome.appended,
            outcome.duplicates,
            stock_changes.len()
        );

        Ok(PostingSummary {
            appended: outcome.appended,
            duplicates: outcome.duplicates,
            stock_changes,
        })
    }
}
