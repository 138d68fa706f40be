//! Global shell state.
//!
//! Uses `RefCell`-wrapped `thread_local!` storage (WASM is single-threaded).
//! The dispatcher state lives in `app`; everything else is browser-only
//! handles the pure core must not see.

use crate::config::AppConfig;
use crate::dom::Elements;
use at_app_core::AppState;
use at_chain_client::{WalletDescriptor, WalletProvider};
use at_theme::ThemeMemo;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Default)]
pub struct Shell {
    pub app: AppState,
    pub config: AppConfig,
    pub elements: Option<Elements>,
    /// Result of the last discovery, in selector order.
    pub wallets: Vec<WalletDescriptor>,
    /// Provider of the connected wallet; signs contract writes.
    pub provider: Option<Rc<dyn WalletProvider>>,
    pub theme: ThemeMemo,
}

thread_local! {
    static STATE: RefCell<Shell> = RefCell::new(Shell::default());
}

/// Run a closure with shared read access to the state.
pub fn with<F, R>(f: F) -> R
where
    F: FnOnce(&Shell) -> R,
{
    STATE.with(|s| f(&s.borrow()))
}

/// Run a closure with mutable access to the state.
pub fn with_mut<F, R>(f: F) -> R
where
    F: FnOnce(&mut Shell) -> R,
{
    STATE.with(|s| f(&mut s.borrow_mut()))
}

pub fn config() -> AppConfig {
    with(|s| s.config.clone())
}

pub fn elements() -> Option<Elements> {
    with(|s| s.elements.clone())
}

pub fn wallet_descriptors() -> Vec<WalletDescriptor> {
    with(|s| s.wallets.clone())
}

pub fn set_wallet_descriptors(wallets: Vec<WalletDescriptor>) {
    with_mut(|s| s.wallets = wallets);
}

/// Connected provider together with its account, when both are present.
pub fn signer() -> Option<(Rc<dyn WalletProvider>, String)> {
    with(|s| {
        let provider = s.provider.clone()?;
        s.app.is_connected().then(|| (provider, s.app.account.clone()))
    })
}

pub fn set_provider(provider: Option<Rc<dyn WalletProvider>>) {
    with_mut(|s| s.provider = provider);
}
