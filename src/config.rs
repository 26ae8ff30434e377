use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

pub const DATA_DIR_ENV: &str = "HOTEL_RESERVATIONS_DATA_DIR";

pub const DEFAULT_HOTELS_RESOURCE: &str = "hotels.json";
pub const DEFAULT_CUSTOMERS_RESOURCE: &str = "customers.json";
pub const DEFAULT_RESERVATIONS_RESOURCE: &str = "reservations.json";

// Where the three store documents live
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default = "default_hotels")]
    pub hotels: String,
    #[serde(default = "default_customers")]
    pub customers: String,
    #[serde(default = "default_reservations")]
    pub reservations: String,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(".")
}
fn default_hotels() -> String {
    DEFAULT_HOTELS_RESOURCE.to_string()
}
fn default_customers() -> String {
    DEFAULT_CUSTOMERS_RESOURCE.to_string()
}
fn default_reservations() -> String {
    DEFAULT_RESERVATIONS_RESOURCE.to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            hotels: default_hotels(),
            customers: default_customers(),
            reservations: default_reservations(),
        }
    }
}

impl StorageConfig {
    /// Defaults, with the data directory taken from `HOTEL_RESERVATIONS_DATA_DIR`
    /// when it is set and non-empty.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        cfg.normalize_from_env();
        cfg
    }

    /// Read a JSON config document. Missing fields fall back to defaults.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let mut cfg: StorageConfig = serde_json::from_str(&content)
            .with_context(|| format!("parsing config {}", path.display()))?;
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_from_env(&mut self) {
        if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
            if !dir.trim().is_empty() {
                self.data_dir = PathBuf::from(dir);
            }
        }
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        if self.hotels.trim().is_empty() {
            self.hotels = default_hotels();
        }
        if self.customers.trim().is_empty() {
            self.customers = default_customers();
        }
        if self.reservations.trim().is_empty() {
            self.reservations = default_reservations();
        }
        self.validate()
    }

    pub fn validate(&self) -> Result<()> {
        if self.hotels == self.customers
            || self.hotels == self.reservations
            || self.customers == self.reservations
        {
            return Err(anyhow!(
                "store resources must be distinct: hotels={}, customers={}, reservations={}",
                self.hotels,
                self.customers,
                self.reservations
            ));
        }
        Ok(())
    }
}
