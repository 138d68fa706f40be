use serde::{Deserialize, Serialize};
use std::fmt;

pub const RECORD_INDEX_KEY: &str = "traffic_record_keys";
pub const RECORD_KEY_PREFIX: &str = "traffic_record_";

pub fn record_key(id: &str) -> String {
    format!("{RECORD_KEY_PREFIX}{id}")
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RecordStatus {
    #[default]
    Pending,
    Analyzed,
    Rejected,
}

impl RecordStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordStatus::Pending => "pending",
            RecordStatus::Analyzed => "analyzed",
            RecordStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stored form of a record under `traffic_record_{id}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RecordEntry {
    pub data: String,
    pub timestamp: u64,
    pub origin: String,
    pub destination: String,
    pub flight_count: u64,
    #[serde(default)]
    pub status: RecordStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub id: String,
    pub payload: String,
    pub created_at: u64,
    pub origin: String,
    pub destination: String,
    pub flight_count: u64,
    pub status: RecordStatus,
}

impl Record {
    pub fn from_entry(id: impl Into<String>, entry: RecordEntry) -> Self {
        Self {
            id: id.into(),
            payload: entry.data,
            created_at: entry.timestamp,
            origin: entry.origin,
            destination: entry.destination,
            flight_count: entry.flight_count,
            status: entry.status,
        }
    }

    pub fn to_entry(&self) -> RecordEntry {
        RecordEntry {
            data: self.payload.clone(),
            timestamp: self.created_at,
            origin: self.origin.clone(),
            destination: self.destination.clone(),
            flight_count: self.flight_count,
            status: self.status,
        }
    }

    /// First six characters of the id, as shown on record cards.
    pub fn short_id(&self) -> &str {
        match self.id.char_indices().nth(6) {
            Some((idx, _)) => &self.id[..idx],
            None => &self.id,
        }
    }
}

/// The submission form, field values as typed.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RecordInput {
    pub origin: String,
    pub destination: String,
    pub flight_count: String,
    pub additional_info: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordField {
    Origin,
    Destination,
    FlightCount,
    AdditionalInfo,
}

impl RecordInput {
    pub fn set(&mut self, field: RecordField, value: String) {
        match field {
            RecordField::Origin => self.origin = value,
            RecordField::Destination => self.destination = value,
            RecordField::FlightCount => self.flight_count = value,
            RecordField::AdditionalInfo => self.additional_info = value,
        }
    }

    pub fn has_required_fields(&self) -> bool {
        !self.origin.trim().is_empty()
            && !self.destination.trim().is_empty()
            && !self.flight_count.trim().is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecordStats {
    pub total: usize,
    pub analyzed: usize,
    pub pending: usize,
    pub rejected: usize,
    pub total_flights: u64,
}

impl RecordStats {
    pub fn from_records(records: &[Record]) -> Self {
        records.iter().fold(Self::default(), |mut stats, record| {
            stats.total += 1;
            stats.total_flights = stats.total_flights.saturating_add(record.flight_count);
            match record.status {
                RecordStatus::Pending => stats.pending += 1,
                RecordStatus::Analyzed => stats.analyzed += 1,
                RecordStatus::Rejected => stats.rejected += 1,
            }
            stats
        })
    }
}

// ── Wallets ──

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WalletKind {
    MetaMask,
    Okx,
    Binance,
}

impl WalletKind {
    pub const ALL: [WalletKind; 3] = [WalletKind::MetaMask, WalletKind::Okx, WalletKind::Binance];

    pub fn display_name(&self) -> &'static str {
        match self {
            WalletKind::MetaMask => "MetaMask",
            WalletKind::Okx => "OKX Wallet",
            WalletKind::Binance => "Binance Wallet",
        }
    }

    /// Name of the global the wallet extension injects into the page.
    pub fn binding(&self) -> &'static str {
        match self {
            WalletKind::MetaMask => "ethereum",
            WalletKind::Okx => "okxwallet",
            WalletKind::Binance => "BinanceChain",
        }
    }

    /// Flag that must be truthy on the binding; `ethereum` is shared by many wallets.
    pub fn marker(&self) -> Option<&'static str> {
        match self {
            WalletKind::MetaMask => Some("isMetaMask"),
            WalletKind::Okx | WalletKind::Binance => None,
        }
    }

    pub fn install_url(&self) -> &'static str {
        match self {
            WalletKind::MetaMask => "https://metamask.io/",
            WalletKind::Okx => "https://www.okx.com/web3",
            WalletKind::Binance => "https://www.bnbchain.org/en/binance-wallet",
        }
    }

    pub fn icon_url(&self) -> &'static str {
        match self {
            WalletKind::MetaMask => {
                "https://upload.wikimedia.org/wikipedia/commons/thumb/3/36/MetaMask_Fox.svg/1200px-MetaMask_Fox.svg.png"
            }
            WalletKind::Okx => "https://www.okx.com/favicon.ico",
            WalletKind::Binance => {
                "https://upload.wikimedia.org/wikipedia/commons/thumb/5/57/Binance_Logo.png/600px-Binance_Logo.png"
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WalletChoice {
    Injected(WalletKind),
    Catalog,
}

impl WalletChoice {
    pub const CATALOG_ICON: &'static str = "https://cdn-icons-png.flaticon.com/512/126/126472.png";

    pub fn name(&self) -> &'static str {
        match self {
            WalletChoice::Injected(kind) => kind.display_name(),
            WalletChoice::Catalog => "Other Wallets",
        }
    }

    pub fn icon_url(&self) -> &'static str {
        match self {
            WalletChoice::Injected(kind) => kind.icon_url(),
            WalletChoice::Catalog => Self::CATALOG_ICON,
        }
    }
}

pub const POPULAR_WALLETS: [&str; 5] = [
    "Coinbase Wallet",
    "Trust Wallet",
    "WalletConnect",
    "Ledger",
    "Trezor",
];

pub const MOBILE_WALLETS: [&str; 5] = ["TokenPocket", "MathWallet", "SafePal", "BitKeep", "ImToken"];

/// `0x1234...abcd` form of an account address.
pub fn shorten_account(account: &str) -> String {
    if account.len() <= 10 || !account.is_ascii() {
        return account.to_owned();
    }
    format!("{}...{}", &account[..6], &account[account.len() - 4..])
}

// ── Chain ──

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NativeCurrency {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainSpec {
    pub chain_id: u64,
    pub name: String,
    pub native_currency: NativeCurrency,
    pub rpc_endpoints: Vec<String>,
    pub explorer_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AddChainParams {
    pub chain_id: String,
    pub chain_name: String,
    pub native_currency: NativeCurrency,
    pub rpc_urls: Vec<String>,
    pub block_explorer_urls: Vec<String>,
}

impl ChainSpec {
    pub fn sepolia() -> Self {
        Self {
            chain_id: 11_155_111,
            name: "Sepolia".to_owned(),
            native_currency: NativeCurrency {
                name: "Sepolia Ether".to_owned(),
                symbol: "SEP".to_owned(),
                decimals: 18,
            },
            rpc_endpoints: vec![
                "https://rpc.sepolia.org".to_owned(),
                "https://eth-sepolia.public.blastapi.io".to_owned(),
            ],
            explorer_url: "https://sepolia.etherscan.io/".to_owned(),
        }
    }

    pub fn chain_id_hex(&self) -> String {
        format!("{:#x}", self.chain_id)
    }

    pub fn add_chain_params(&self) -> AddChainParams {
        AddChainParams {
            chain_id: self.chain_id_hex(),
            chain_name: self.name.clone(),
            native_currency: self.native_currency.clone(),
            rpc_urls: self.rpc_endpoints.clone(),
            block_explorer_urls: vec![self.explorer_url.clone()],
        }
    }
}
