// 📦 Stock card (kartu stok) - per-product movements through the inventory account
//
// The opening line is the current stock at unit cost. Quantities of later
// movements are estimated as amount / unit cost.

use crate::inventory::InventoryItem;
use crate::journal::JournalEntry;
use chrono::NaiveDate;
use serde::Serialize;

/// Substrings of an account cell that mark an inventory account
pub const INVENTORY_ACCOUNT_MARKERS: [&str; 3] = ["1-1300", "Persediaan Barang Dagang", "Persediaan Madu"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Movement {
    pub quantity: f64,
    pub price: f64,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StockCardLine {
    /// None for the opening line
    pub date: Option<NaiveDate>,
    pub description: String,
    pub incoming: Option<Movement>,
    pub outgoing: Option<Movement>,
    pub balance: Movement,
}

#[derive(Debug, Clone, Serialize)]
pub struct StockCard {
    pub item_code: String,
    pub product: String,
    pub lines: Vec<StockCardLine>,
}

fn is_inventory_account(account: &str) -> bool {
    let account = account.to_lowercase();
    INVENTORY_ACCOUNT_MARKERS
        .iter()
        .any(|marker| account.contains(&marker.to_lowercase()))
}

fn average(total: f64, quantity: f64) -> f64 {
    if quantity > 0.0 {
        total / quantity
    } else {
        0.0
    }
}

/// Build the card for `item` from entries already restricted to one period
pub fn build_stock_card(item: &InventoryItem, entries: &[JournalEntry]) -> StockCard {
    let cost = item.cost_price;
    let opening_qty = item.stock as f64;

    let mut balance = Movement {
        quantity: opening_qty,
        price: cost,
        total: opening_qty * cost,
    };

    let mut lines = vec![StockCardLine {
        date: None,
        description: "Saldo awal persediaan".to_string(),
        incoming: Some(balance),
        outgoing: None,
        balance,
    }];

    let product = item.name.to_lowercase();
    for entry in entries {
        if !is_inventory_account(&entry.account) || !entry.memo.to_lowercase().contains(&product) {
            continue;
        }

        let quantity_of = |amount: f64| if cost > 0.0 { amount / cost } else { 0.0 };
        let (incoming, outgoing) = if entry.debit > 0.0 {
            let m = Movement { quantity: quantity_of(entry.debit), price: cost, total: entry.debit };
            balance.quantity += m.quantity;
            balance.total += m.total;
            (Some(m), None)
        } else if entry.credit > 0.0 {
            let m = Movement { quantity: quantity_of(entry.credit), price: cost, total: entry.credit };
            balance.quantity -= m.quantity;
            balance.total -= m.total;
            (None, Some(m))
        } else {
            (None, None)
        };
        balance.price = average(balance.total, balance.quantity);

        lines.push(StockCardLine {
            date: entry.date,
            description: entry.memo.clone(),
            incoming,
            outgoing,
            balance,
        });
    }

    StockCard {
        item_code: item.item_code.clone(),
        product: item.name.clone(),
        lines,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::split_account;

    fn entry(row: usize, memo: &str, account: &str, debit: f64, credit: f64) -> JournalEntry {
        let (account_code, account_name) = split_account(account);
        JournalEntry {
            row,
            date: NaiveDate::from_ymd_opt(2025, 11, row as u32),
            raw_date: String::new(),
            memo: memo.to_string(),
            account: account.to_string(),
            account_code,
            account_name,
            debit,
            credit,
        }
    }

    fn multiflora() -> InventoryItem {
        InventoryItem {
            item_code: "ITEM-001".to_string(),
            name: "Madu Multiflora".to_string(),
            stock: 10,
            cost_price: 80000.0,
            selling_price: 105000.0,
        }
    }

    #[test]
    fn test_movements_and_running_balance() {
        let entries = vec![
            entry(2, "Restock Madu Multiflora", "1-1300 - Persediaan barang dagang", 400000.0, 0.0),
            entry(3, "Jual - Madu Multiflora [AUTO]", "1-1300 - Persediaan barang dagang", 0.0, 240000.0),
            entry(4, "Jual - Madu Multiflora [AUTO]", "5-5000 - Harga pokok penjualan", 240000.0, 0.0),
            entry(5, "Restock Madu Klengkeng", "1-1300 - Persediaan barang dagang", 500000.0, 0.0),
        ];

        let card = build_stock_card(&multiflora(), &entries);
        assert_eq!(card.lines.len(), 3, "opening + two matching inventory rows");

        let opening = &card.lines[0];
        assert_eq!(opening.balance.quantity, 10.0);
        assert_eq!(opening.balance.total, 800000.0);

        let purchase = &card.lines[1];
        assert_eq!(purchase.incoming.unwrap().quantity, 5.0);
        assert_eq!(purchase.balance.quantity, 15.0);

        let sale = &card.lines[2];
        assert_eq!(sale.outgoing.unwrap().quantity, 3.0);
        assert_eq!(sale.balance.quantity, 12.0);
        assert_eq!(sale.balance.total, 960000.0);
        assert_eq!(sale.balance.price, 80000.0);
    }

    #[test]
    fn test_zero_cost_gives_zero_quantities() {
        let mut item = multiflora();
        item.cost_price = 0.0;
        let entries = vec![entry(2, "Madu Multiflora masuk", "Persediaan Madu", 1000.0, 0.0)];

        let card = build_stock_card(&item, &entries);
        assert_eq!(card.lines[1].incoming.unwrap().quantity, 0.0);
        assert_eq!(card.lines[1].balance.price, 100.0);
    }
}
