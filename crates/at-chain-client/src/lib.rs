//! Wallet provider capability, discovery and network negotiation.
//!
//! Browser wallets are reached only through [`WalletProvider`]; the host page is
//! reached only through [`ProviderHost`]. Both are injected so the flows below run
//! the same against a real extension or a test double.

use async_trait::async_trait;
use at_api_types::{ChainSpec, WalletChoice, WalletKind};
use serde_json::{Value, json};
use std::fmt;
use std::rc::Rc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("provider error {code}: {message}")]
pub struct ProviderError {
    pub code: i64,
    pub message: String,
    pub data: Option<Value>,
}

impl ProviderError {
    pub const USER_REJECTED: i64 = 4001;
    pub const UNRECOGNIZED_CHAIN: i64 = 4902;
    pub const INTERNAL: i64 = -32603;

    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(Self::INTERNAL, message)
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn is_user_rejected(&self) -> bool {
        self.code == Self::USER_REJECTED
            || self.message.to_ascii_lowercase().contains("user rejected")
    }

    /// Some wallets wrap 4902 inside an internal error.
    pub fn is_unrecognized_chain(&self) -> bool {
        if self.code == Self::UNRECOGNIZED_CHAIN {
            return true;
        }
        self.data
            .as_ref()
            .and_then(|data| data.pointer("/originalError/code"))
            .and_then(Value::as_i64)
            == Some(Self::UNRECOGNIZED_CHAIN)
    }
}

pub type AccountsListener = Box<dyn Fn(Vec<String>)>;

/// EIP-1193 style request surface of an injected wallet or RPC endpoint.
#[async_trait(?Send)]
pub trait WalletProvider {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError>;

    /// Register for `accountsChanged`. Providers without events accept and ignore.
    fn subscribe_accounts(&self, listener: AccountsListener) -> Result<(), ProviderError>;
}

/// Resolves the global binding of a known wallet to a provider handle.
pub trait ProviderHost {
    fn lookup(&self, kind: WalletKind) -> Option<Rc<dyn WalletProvider>>;
}

#[derive(Clone)]
pub struct WalletDescriptor {
    pub choice: WalletChoice,
    pub provider: Option<Rc<dyn WalletProvider>>,
    pub installed: bool,
}

impl WalletDescriptor {
    pub fn name(&self) -> &'static str {
        self.choice.name()
    }
}

impl fmt::Debug for WalletDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletDescriptor")
            .field("choice", &self.choice)
            .field("provider", &self.provider.as_ref().map(|_| "<handle>"))
            .field("installed", &self.installed)
            .finish()
    }
}

pub struct WalletRegistry<H> {
    host: H,
}

impl<H: ProviderHost> WalletRegistry<H> {
    pub fn new(host: H) -> Self {
        Self { host }
    }

    /// Probe every known wallet, then append the catalog entry.
    pub fn discover(&self) -> Vec<WalletDescriptor> {
        let mut wallets: Vec<WalletDescriptor> = WalletKind::ALL
            .iter()
            .map(|kind| {
                let provider = self.host.lookup(*kind);
                WalletDescriptor {
                    choice: WalletChoice::Injected(*kind),
                    installed: provider.is_some(),
                    provider,
                }
            })
            .collect();

        wallets.push(WalletDescriptor {
            choice: WalletChoice::Catalog,
            provider: None,
            installed: true,
        });

        debug!(
            installed = wallets.iter().filter(|w| w.provider.is_some()).count(),
            "wallet discovery finished"
        );
        wallets
    }
}

#[derive(Debug)]
pub enum Selection {
    ShowCatalog,
    OpenInstallPage(&'static str),
    Connect(WalletDescriptor),
}

/// Resolve what picking `descriptor` in the selector should do.
pub async fn select(descriptor: WalletDescriptor, chain: &ChainSpec) -> Selection {
    let kind = match descriptor.choice {
        WalletChoice::Catalog => return Selection::ShowCatalog,
        WalletChoice::Injected(kind) => kind,
    };

    let provider = match (&descriptor.provider, descriptor.installed) {
        (Some(provider), true) => provider.clone(),
        _ => return Selection::OpenInstallPage(kind.install_url()),
    };

    let outcome = ensure_chain(provider.as_ref(), chain).await;
    debug!(wallet = kind.display_name(), ?outcome, "network negotiation done");
    Selection::Connect(descriptor)
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChainOutcome {
    Switched,
    Added,
    AddFailed(ProviderError),
    SwitchFailed(ProviderError),
}

/// Best-effort switch to `chain`, adding it once if the wallet does not know it.
pub async fn ensure_chain(provider: &dyn WalletProvider, chain: &ChainSpec) -> ChainOutcome {
    let switch = provider
        .request(
            "wallet_switchEthereumChain",
            json!([{ "chainId": chain.chain_id_hex() }]),
        )
        .await;

    let err = match switch {
        Ok(_) => return ChainOutcome::Switched,
        Err(err) => err,
    };

    if !err.is_unrecognized_chain() {
        warn!("error switching network to {}: {}", chain.name, err);
        return ChainOutcome::SwitchFailed(err);
    }

    let params = match serde_json::to_value(chain.add_chain_params()) {
        Ok(params) => params,
        Err(err) => return ChainOutcome::AddFailed(ProviderError::internal(err.to_string())),
    };

    match provider
        .request("wallet_addEthereumChain", Value::Array(vec![params]))
        .await
    {
        Ok(_) => {
            info!("added {} network to wallet", chain.name);
            ChainOutcome::Added
        }
        Err(err) => {
            warn!("error adding {} network: {}", chain.name, err);
            ChainOutcome::AddFailed(err)
        }
    }
}

/// `eth_requestAccounts`, returning the first account or an empty string.
pub async fn request_accounts(provider: &dyn WalletProvider) -> Result<String, ProviderError> {
    let result = provider.request("eth_requestAccounts", json!([])).await?;
    Ok(first_account(&result))
}

pub fn first_account(accounts: &Value) -> String {
    accounts
        .as_array()
        .and_then(|list| list.first())
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_owned()
}
