// ⚙️ Configuration - data directory, bind address and the default period
//
// HONEY_DATA_DIR   directory holding the three CSV files (default ./data)
// HONEY_BIND       server listen address (default 0.0.0.0:3000)
// HONEY_TAHUN      default report year (default 2025)
// HONEY_BULAN      default report month name (default November)

use crate::period::{Month, Period};
use log::warn;
use std::env;
use std::path::PathBuf;

pub const JOURNAL_FILE: &str = "jurnal.csv";
pub const INVENTORY_FILE: &str = "databasesia.csv";
pub const OPENING_FILE: &str = "daftarsaldo.csv";

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub bind_addr: String,
    pub default_period: Period,
    /// Items below this stock level are flagged on the dashboard
    pub low_stock_threshold: i64,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            data_dir: PathBuf::from("data"),
            bind_addr: "0.0.0.0:3000".to_string(),
            default_period: Period::new(2025, Month::November),
            low_stock_threshold: 10,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key → value source; unparsable values keep the default
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = AppConfig::default();

        if let Some(dir) = lookup("HONEY_DATA_DIR").filter(|s| !s.trim().is_empty()) {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(bind) = lookup("HONEY_BIND").filter(|s| !s.trim().is_empty()) {
            config.bind_addr = bind;
        }
        if let Some(year) = lookup("HONEY_TAHUN") {
            match year.trim().parse::<i32>() {
                Ok(y) => config.default_period.year = y,
                Err(_) => warn!("Ignoring invalid HONEY_TAHUN={:?}", year),
            }
        }
        if let Some(month) = lookup("HONEY_BULAN") {
            match Month::from_name(&month) {
                Some(m) => config.default_period.month = m,
                None => warn!("Ignoring invalid HONEY_BULAN={:?}", month),
            }
        }

        config
    }

    /// Keep everything but point at another data directory
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    pub fn journal_path(&self) -> PathBuf {
        self.data_dir.join(JOURNAL_FILE)
    }

    pub fn inventory_path(&self) -> PathBuf {
        self.data_dir.join(INVENTORY_FILE)
    }

    pub fn opening_path(&self) -> PathBuf {
        self.data_dir.join(OPENING_FILE)
    }
}
