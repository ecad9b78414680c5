// 🍯 Inventory Store - stock levels, cost and selling price per item
// Columns: Item Code, Name, Stock Remaining, Price, Harga Jual

use crate::amount::{parse_cell, parse_int_cell};
use crate::error::Result;
use crate::storage::{cell, read_table, write_table};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

const COL_CODE: usize = 0;
const COL_NAME: usize = 1;
const COL_STOCK: usize = 2;
const COL_COST: usize = 3;
const COL_PRICE: usize = 4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    /// Trimmed, upper-cased; generated as ITEM-NNN when missing
    pub item_code: String,
    pub name: String,
    pub stock: i64,
    /// Unit cost (harga modal)
    pub cost_price: f64,
    /// Unit selling price (harga jual)
    pub selling_price: f64,
}

impl InventoryItem {
    pub fn total_cost(&self) -> f64 {
        self.cost_price * self.stock as f64
    }

    pub fn total_selling(&self) -> f64 {
        self.selling_price * self.stock as f64
    }

    pub fn gross_profit(&self) -> f64 {
        self.total_selling() - self.total_cost()
    }
}

/// A stock mutation that was written to the inventory file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockChange {
    pub item_name: String,
    pub old_stock: i64,
    pub new_stock: i64,
    pub delta: i64,
}

/// Demo catalog used when the inventory file is missing
pub fn fallback_catalog() -> Vec<InventoryItem> {
    vec![
        InventoryItem {
            item_code: "ITEM-001".to_string(),
            name: "Madu Multiflora".to_string(),
            stock: 34,
            cost_price: 84000.0,
            selling_price: 105000.0,
        },
        InventoryItem {
            item_code: "ITEM-002".to_string(),
            name: "Madu Klengkeng".to_string(),
            stock: 19,
            cost_price: 100000.0,
            selling_price: 125000.0,
        },
        InventoryItem {
            item_code: "ITEM-003".to_string(),
            name: "Kapuk Randu".to_string(),
            stock: 22,
            cost_price: 96000.0,
            selling_price: 120000.0,
        },
    ]
}

fn is_placeholder_code(code: &str) -> bool {
    code.is_empty() || code.eq_ignore_ascii_case("no item")
}

// ============================================================================
// INVENTORY STORE
// ============================================================================

#[derive(Debug, Clone)]
pub struct InventoryStore {
    path: PathBuf,
}

impl InventoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        InventoryStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All items in file order. A missing file yields the fallback catalog.
    pub fn load(&self) -> Result<Vec<InventoryItem>> {
        let table = match read_table(&self.path)? {
            Some(t) => t,
            None => {
                warn!("Inventory file {:?} not found, using fallback catalog", self.path);
                return Ok(fallback_catalog());
            }
        };

        // Generated codes must not collide with any code written in the file
        let explicit: HashSet<String> = table
            .rows
            .iter()
            .map(|r| cell(r, COL_CODE).to_uppercase())
            .filter(|c| !is_placeholder_code(c))
            .collect();

        let mut next_default = 1;
        let mut assigned: HashSet<String> = HashSet::new();
        let mut items = Vec::with_capacity(table.rows.len());

        for (index, record) in table.rows.iter().enumerate() {
            let raw_code = cell(record, COL_CODE);
            let item_code = if is_placeholder_code(raw_code) {
                let code = loop {
                    let candidate = format!("ITEM-{:03}", next_default);
                    next_default += 1;
                    if !explicit.contains(&candidate) && !assigned.contains(&candidate) {
                        break candidate;
                    }
                };
                warn!(
                    "Row {}: invalid or missing item code {:?}, assigned {}",
                    index + 2,
                    raw_code,
                    code
                );
                code
            } else {
                raw_code.to_uppercase()
            };
            assigned.insert(item_code.clone());

            let name = match cell(record, COL_NAME) {
                "" => "Unknown Product".to_string(),
                n => n.to_string(),
            };

            items.push(InventoryItem {
                item_code,
                name,
                stock: parse_int_cell(cell(record, COL_STOCK)).unwrap_or(0),
                cost_price: parse_cell(cell(record, COL_COST)).unwrap_or(0.0),
                selling_price: parse_cell(cell(record, COL_PRICE)).unwrap_or(0.0),
            });
        }

        debug!("Loaded {} inventory items from {:?}", items.len(), self.path);
        Ok(items)
    }

    /// Add `delta` to the stock of the item named `item_name` (trimmed,
    /// case-insensitive). The result is clamped at zero, so an oversized
    /// decrement loses its shortfall. Ok(None) when no item matches.
    pub fn adjust_stock(&self, item_name: &str, delta: i64) -> Result<Option<StockChange>> {
        let mut table = match read_table(&self.path)? {
            Some(t) => t,
            None => {
                warn!("Inventory file {:?} not found, cannot update stock", self.path);
                return Ok(None);
            }
        };

        let wanted = item_name.trim().to_lowercase();
        let position = table
            .rows
            .iter()
            .position(|r| !wanted.is_empty() && cell(r, COL_NAME).to_lowercase() == wanted);

        let index = match position {
            Some(i) => i,
            None => {
                warn!("Item {:?} not found in inventory to update stock", item_name);
                return Ok(None);
            }
        };

        let record = &table.rows[index];
        let old_stock = parse_int_cell(cell(record, COL_STOCK)).unwrap_or(0);
        let new_stock = (old_stock + delta).max(0);
        if old_stock + delta < 0 {
            warn!(
                "Stock for {:?} would go negative ({} + {}), clamped to 0",
                item_name, old_stock, delta
            );
        }

        let mut cells: Vec<String> = record.iter().map(|c| c.to_string()).collect();
        if cells.len() <= COL_STOCK {
            cells.resize(COL_STOCK + 1, String::new());
        }
        cells[COL_STOCK] = new_stock.to_string();
        table.rows[index] = cells.into();

        write_table(&self.path, &table)?;
        info!("Updated stock for {:?}: from {} to {}", item_name, old_stock, new_stock);

        Ok(Some(StockChange {
            item_name: cell(&table.rows[index], COL_NAME).to_string(),
            old_stock,
            new_stock,
            delta,
        }))
    }
}

// ============================================================================
// DASHBOARD SUMMARY
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct InventorySummary {
    pub total_products: usize,
    /// Σ cost × stock
    pub total_inventory_value: f64,
    /// Σ (selling − cost) × stock
    pub total_gross_profit: f64,
    pub low_stock_items: Vec<InventoryItem>,
}

impl InventorySummary {
    pub fn from_items(items: &[InventoryItem], low_stock_threshold: i64) -> Self {
        InventorySummary {
            total_products: items.len(),
            total_inventory_value: items.iter().map(|i| i.total_cost()).sum(),
            total_gross_profit: items.iter().map(|i| i.gross_profit()).sum(),
            low_stock_items: items
                .iter()
                .filter(|i| i.stock < low_stock_threshold)
                .cloned()
                .collect(),
        }
    }
}
