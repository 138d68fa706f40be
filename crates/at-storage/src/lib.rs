//! Contract gateway abstraction and the record store built on top of it.
//!
//! The gateway is an opaque key/value store with an availability flag; every
//! record lives under its own key and a single index key lists all record ids.

mod records;

pub use records::{
    PAYLOAD_PREFIX, RecordStore, encode_payload, new_record_id, validate_input,
};

use async_trait::async_trait;
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("contract gateway is not configured")]
    NotConfigured,
    #[error("no signer connected")]
    NoSigner,
    #[error("transaction rejected by user")]
    UserRejected,
    #[error("transaction {0} reverted")]
    Reverted(String),
    #[error("transaction {0} was not confirmed in time")]
    Unconfirmed(String),
    #[error("gateway transport: {0}")]
    Transport(String),
    #[error("gateway response decode: {0}")]
    Decode(String),
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{0}")]
    Validation(String),
    #[error("Record not found")]
    NotFound(String),
    #[error("record {id} is corrupt: {reason}")]
    Corrupt { id: String, reason: String },
    #[error("record {id} was written but the index update failed: {source}")]
    Orphaned {
        id: String,
        #[source]
        source: GatewayError,
    },
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error("encode: {0}")]
    Encode(#[from] serde_json::Error),
}

impl StoreError {
    pub fn is_user_rejected(&self) -> bool {
        matches!(
            self,
            StoreError::Gateway(GatewayError::UserRejected)
                | StoreError::Orphaned {
                    source: GatewayError::UserRejected,
                    ..
                }
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteOutcome {
    pub tx_hash: Option<String>,
}

#[async_trait(?Send)]
pub trait ContractGateway {
    async fn is_available(&self) -> Result<bool, GatewayError>;
    /// Empty bytes mean "no value stored under `key`".
    async fn get_data(&self, key: &str) -> Result<Vec<u8>, GatewayError>;
    async fn set_data(&self, key: &str, value: &[u8]) -> Result<WriteOutcome, GatewayError>;
}

#[async_trait(?Send)]
impl<G: ContractGateway + ?Sized> ContractGateway for Rc<G> {
    async fn is_available(&self) -> Result<bool, GatewayError> {
        (**self).is_available().await
    }

    async fn get_data(&self, key: &str) -> Result<Vec<u8>, GatewayError> {
        (**self).get_data(key).await
    }

    async fn set_data(&self, key: &str, value: &[u8]) -> Result<WriteOutcome, GatewayError> {
        (**self).set_data(key, value).await
    }
}

pub trait Clock {
    fn now_ms(&self) -> u64;
}

#[derive(Default)]
pub struct InMemoryGateway {
    entries: RefCell<HashMap<String, Vec<u8>>>,
    unavailable: Cell<bool>,
    failing_keys: RefCell<HashSet<String>>,
    calls: Cell<usize>,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_available(&self, available: bool) {
        self.unavailable.set(!available);
    }

    /// Make every later `set_data` on `key` fail with a transport error.
    pub fn fail_writes_to(&self, key: &str) {
        self.failing_keys.borrow_mut().insert(key.to_owned());
    }

    pub fn insert_raw(&self, key: &str, value: impl Into<Vec<u8>>) {
        self.entries
            .borrow_mut()
            .insert(key.to_owned(), value.into());
    }

    pub fn raw(&self, key: &str) -> Option<Vec<u8>> {
        self.entries.borrow().get(key).cloned()
    }

    /// Number of gateway operations served so far.
    pub fn calls(&self) -> usize {
        self.calls.get()
    }

    fn record_call(&self) {
        self.calls.set(self.calls.get() + 1);
    }
}

#[async_trait(?Send)]
impl ContractGateway for InMemoryGateway {
    async fn is_available(&self) -> Result<bool, GatewayError> {
        self.record_call();
        Ok(!self.unavailable.get())
    }

    async fn get_data(&self, key: &str) -> Result<Vec<u8>, GatewayError> {
        self.record_call();
        Ok(self.entries.borrow().get(key).cloned().unwrap_or_default())
    }

    async fn set_data(&self, key: &str, value: &[u8]) -> Result<WriteOutcome, GatewayError> {
        self.record_call();
        if self.failing_keys.borrow().contains(key) {
            return Err(GatewayError::Transport(format!("write to {key} failed")));
        }
        self.entries
            .borrow_mut()
            .insert(key.to_owned(), value.to_vec());
        Ok(WriteOutcome::default())
    }
}
