//! Runtime configuration.
//!
//! Build-time defaults come from `option_env!`; a developer can override the
//! contract address and log filter from the console via localStorage
//! (`localStorage.setItem("at_log", '"debug"')`, values are JSON as gloo-storage
//! writes them).

use at_api_types::ChainSpec;
use at_contract::{Address, ReceiptPolicy};
use gloo_storage::{LocalStorage, Storage};

pub const CONTRACT_KEY: &str = "at_contract_address";
pub const LOG_KEY: &str = "at_log";

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// `None` leaves the gateway unavailable: the list is empty and writes fail.
    pub contract: Option<Address>,
    pub log_filter: String,
    pub chain: ChainSpec,
    pub receipts: ReceiptPolicy,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            contract: option_env!("AIRTRAFFIC_CONTRACT_ADDRESS").and_then(parse_address),
            log_filter: "info".to_owned(),
            chain: ChainSpec::sepolia(),
            receipts: ReceiptPolicy::default(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Self {
        let mut config = Self::default();

        if let Ok(stored) = LocalStorage::get::<String>(CONTRACT_KEY) {
            match parse_address(&stored) {
                Some(address) => config.contract = Some(address),
                None => gloo_console::warn!(format!("ignoring invalid {CONTRACT_KEY}: {stored}")),
            }
        }
        if let Ok(filter) = LocalStorage::get::<String>(LOG_KEY) {
            if !filter.trim().is_empty() {
                config.log_filter = filter;
            }
        }
        config
    }
}

fn parse_address(raw: &str) -> Option<Address> {
    raw.trim().parse().ok()
}
