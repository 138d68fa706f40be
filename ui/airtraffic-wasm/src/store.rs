//! Record store wiring: contract gateway, wall clock, and poll timer.

use crate::rpc::HttpRpcProvider;
use crate::state;
use async_trait::async_trait;
use at_contract::{ProviderGateway, Timer};
use at_storage::{Clock, GatewayError, RecordStore};
use gloo_timers::future::TimeoutFuture;
use std::rc::Rc;

pub type Store = RecordStore<ProviderGateway, JsClock>;

pub struct JsClock;

impl Clock for JsClock {
    fn now_ms(&self) -> u64 {
        js_sys::Date::now() as u64
    }
}

pub struct GlooTimer;

#[async_trait(?Send)]
impl Timer for GlooTimer {
    async fn sleep(&self, millis: u32) {
        TimeoutFuture::new(millis).await;
    }
}

/// Gateway for the configured contract, signing with the connected wallet if any.
pub fn gateway() -> Result<ProviderGateway, GatewayError> {
    let config = state::config();
    let contract = config.contract.ok_or(GatewayError::NotConfigured)?;

    let reader = Rc::new(HttpRpcProvider::new(config.chain.rpc_endpoints.clone()));
    let mut gateway = ProviderGateway::new(reader, contract, Rc::new(GlooTimer))
        .with_receipt_policy(config.receipts);
    if let Some((provider, account)) = state::signer() {
        gateway = gateway.with_signer(provider, account);
    }
    Ok(gateway)
}

pub fn record_store() -> Result<Store, GatewayError> {
    Ok(RecordStore::new(gateway()?, JsClock))
}
