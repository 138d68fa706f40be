use alloy::primitives::{Bytes, hex};
use alloy::sol;
use alloy::sol_types::SolCall;
use async_trait::async_trait;
use at_chain_client::{ProviderError, WalletProvider};
use at_storage::{ContractGateway, GatewayError, WriteOutcome};
use serde_json::{Value, json};
use std::rc::Rc;
use tracing::{debug, info};

pub use alloy::primitives::Address;

sol! {
    interface ITrafficStore {
        function isAvailable() external view returns (bool available);
        function getData(string key) external view returns (bytes value);
        function setData(string key, bytes value) external;
    }
}

/// Async pause between receipt polls; the browser and tests supply their own.
#[async_trait(?Send)]
pub trait Timer {
    async fn sleep(&self, millis: u32);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceiptPolicy {
    pub attempts: u32,
    pub interval_ms: u32,
}

impl Default for ReceiptPolicy {
    fn default() -> Self {
        Self {
            attempts: 90,
            interval_ms: 2_000,
        }
    }
}

struct Signer {
    provider: Rc<dyn WalletProvider>,
    account: String,
}

/// Gateway backed by the traffic-store contract.
///
/// Reads go through `eth_call` on the reader (usually a public RPC endpoint);
/// writes are sent from the connected wallet and wait for a receipt.
pub struct ProviderGateway {
    reader: Rc<dyn WalletProvider>,
    signer: Option<Signer>,
    contract: Address,
    timer: Rc<dyn Timer>,
    policy: ReceiptPolicy,
}

impl ProviderGateway {
    pub fn new(reader: Rc<dyn WalletProvider>, contract: Address, timer: Rc<dyn Timer>) -> Self {
        Self {
            reader,
            signer: None,
            contract,
            timer,
            policy: ReceiptPolicy::default(),
        }
    }

    pub fn with_signer(mut self, provider: Rc<dyn WalletProvider>, account: impl Into<String>) -> Self {
        self.signer = Some(Signer {
            provider,
            account: account.into(),
        });
        self
    }

    pub fn with_receipt_policy(mut self, policy: ReceiptPolicy) -> Self {
        self.policy = policy;
        self
    }

    async fn call(&self, data: Vec<u8>) -> Result<Vec<u8>, GatewayError> {
        let params = json!([
            { "to": self.contract.to_string(), "data": hex::encode_prefixed(data) },
            "latest"
        ]);
        let result = self
            .reader
            .request("eth_call", params)
            .await
            .map_err(provider_error)?;
        decode_hex(&result)
    }

    async fn wait_for_receipt(&self, provider: &dyn WalletProvider, hash: &str) -> Result<(), GatewayError> {
        for attempt in 0..self.policy.attempts {
            let receipt = provider
                .request("eth_getTransactionReceipt", json!([hash]))
                .await
                .map_err(provider_error)?;

            if !receipt.is_null() {
                return match receipt.get("status").and_then(Value::as_str) {
                    Some("0x0") => Err(GatewayError::Reverted(hash.to_owned())),
                    _ => Ok(()),
                };
            }

            debug!(%hash, attempt, "transaction not mined yet");
            self.timer.sleep(self.policy.interval_ms).await;
        }
        Err(GatewayError::Unconfirmed(hash.to_owned()))
    }
}

#[async_trait(?Send)]
impl ContractGateway for ProviderGateway {
    async fn is_available(&self) -> Result<bool, GatewayError> {
        let raw = self.call(ITrafficStore::isAvailableCall {}.abi_encode()).await?;
        let decoded = ITrafficStore::isAvailableCall::abi_decode_returns(&raw, true)
            .map_err(|err| GatewayError::Decode(err.to_string()))?;
        Ok(decoded.available)
    }

    async fn get_data(&self, key: &str) -> Result<Vec<u8>, GatewayError> {
        let call = ITrafficStore::getDataCall { key: key.to_owned() };
        let raw = self.call(call.abi_encode()).await?;
        let decoded = ITrafficStore::getDataCall::abi_decode_returns(&raw, true)
            .map_err(|err| GatewayError::Decode(err.to_string()))?;
        Ok(decoded.value.to_vec())
    }

    async fn set_data(&self, key: &str, value: &[u8]) -> Result<WriteOutcome, GatewayError> {
        let Some(signer) = &self.signer else {
            return Err(GatewayError::NoSigner);
        };

        let call = ITrafficStore::setDataCall {
            key: key.to_owned(),
            value: Bytes::copy_from_slice(value),
        };
        let params = json!([{
            "from": signer.account,
            "to": self.contract.to_string(),
            "data": hex::encode_prefixed(call.abi_encode()),
        }]);

        let sent = signer
            .provider
            .request("eth_sendTransaction", params)
            .await
            .map_err(provider_error)?;
        let hash = sent
            .as_str()
            .ok_or_else(|| GatewayError::Decode("transaction hash is not a string".to_owned()))?
            .to_owned();

        info!(%key, %hash, "setData transaction sent");
        self.wait_for_receipt(signer.provider.as_ref(), &hash).await?;
        Ok(WriteOutcome {
            tx_hash: Some(hash),
        })
    }
}

fn provider_error(err: ProviderError) -> GatewayError {
    if err.is_user_rejected() {
        GatewayError::UserRejected
    } else {
        GatewayError::Transport(err.to_string())
    }
}

fn decode_hex(value: &Value) -> Result<Vec<u8>, GatewayError> {
    let text = value
        .as_str()
        .ok_or_else(|| GatewayError::Decode("eth_call result is not a string".to_owned()))?;
    let digits = text.strip_prefix("0x").unwrap_or(text);
    hex::decode(digits).map_err(|err| GatewayError::Decode(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::sol_types::SolInterface;
    use at_api_types::{RecordInput, RecordStatus};
    use at_chain_client::AccountsListener;
    use at_storage::{Clock, RecordStore, StoreError};
    use std::cell::{Cell, RefCell};
    use std::collections::HashMap;

    /// Minimal node + wallet: executes the contract against a map.
    #[derive(Default)]
    struct FakeChain {
        storage: RefCell<HashMap<String, Vec<u8>>>,
        pending_polls: Cell<u32>,
        reject_sends: Cell<bool>,
        revert: Cell<bool>,
        sent: RefCell<Vec<Value>>,
    }

    impl FakeChain {
        fn execute(&self, data: &str) -> Result<Value, ProviderError> {
            let bytes = hex::decode(data.trim_start_matches("0x"))
                .map_err(|e| ProviderError::internal(e.to_string()))?;
            let call = ITrafficStore::ITrafficStoreCalls::abi_decode(&bytes, true)
                .map_err(|e| ProviderError::internal(e.to_string()))?;
            let out = match call {
                ITrafficStore::ITrafficStoreCalls::isAvailable(_) => {
                    ITrafficStore::isAvailableCall::abi_encode_returns(&(true,))
                }
                ITrafficStore::ITrafficStoreCalls::getData(c) => {
                    let value = self.storage.borrow().get(&c.key).cloned().unwrap_or_default();
                    ITrafficStore::getDataCall::abi_encode_returns(&(Bytes::from(value),))
                }
                ITrafficStore::ITrafficStoreCalls::setData(c) => {
                    self.storage.borrow_mut().insert(c.key, c.value.to_vec());
                    Vec::new()
                }
            };
            Ok(Value::String(hex::encode_prefixed(out)))
        }
    }

    #[async_trait(?Send)]
    impl WalletProvider for FakeChain {
        async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
            let data = params[0]["data"].as_str().unwrap_or_default().to_owned();
            match method {
                "eth_call" => self.execute(&data),
                "eth_sendTransaction" => {
                    if self.reject_sends.get() {
                        return Err(ProviderError::new(
                            ProviderError::USER_REJECTED,
                            "user rejected transaction",
                        ));
                    }
                    self.sent.borrow_mut().push(params[0].clone());
                    if !self.revert.get() {
                        self.execute(&data)?;
                    }
                    Ok(json!("0xfeed"))
                }
                "eth_getTransactionReceipt" => {
                    let left = self.pending_polls.get();
                    if left > 0 {
                        self.pending_polls.set(left - 1);
                        return Ok(Value::Null);
                    }
                    let status = if self.revert.get() { "0x0" } else { "0x1" };
                    Ok(json!({ "transactionHash": params[0], "status": status }))
                }
                other => Err(ProviderError::new(-32601, format!("method {other} not found"))),
            }
        }

        fn subscribe_accounts(&self, _listener: AccountsListener) -> Result<(), ProviderError> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct CountingTimer(Cell<u32>);

    #[async_trait(?Send)]
    impl Timer for CountingTimer {
        async fn sleep(&self, _millis: u32) {
            self.0.set(self.0.get() + 1);
        }
    }

    struct FixedClock;

    impl Clock for FixedClock {
        fn now_ms(&self) -> u64 {
            1_700_000_000_000
        }
    }

    const ACCOUNT: &str = "0x52908400098527886E0F7030069857D2E4169EE7";

    fn gateway(chain: &Rc<FakeChain>, timer: &Rc<CountingTimer>) -> ProviderGateway {
        ProviderGateway::new(chain.clone(), Address::repeat_byte(0x11), timer.clone())
            .with_signer(chain.clone(), ACCOUNT)
            .with_receipt_policy(ReceiptPolicy {
                attempts: 5,
                interval_ms: 1,
            })
    }

    #[tokio::test]
    async fn reads_and_writes_round_trip_through_the_abi() -> anyhow::Result<()> {
        let chain = Rc::new(FakeChain::default());
        let timer = Rc::new(CountingTimer::default());
        chain.pending_polls.set(2);
        let gateway = gateway(&chain, &timer);

        assert!(gateway.is_available().await?);
        assert!(gateway.get_data("traffic_record_keys").await?.is_empty());

        let outcome = gateway.set_data("traffic_record_keys", br#"["a"]"#).await?;

        assert_eq!(outcome.tx_hash.as_deref(), Some("0xfeed"));
        assert_eq!(gateway.get_data("traffic_record_keys").await?, br#"["a"]"#.to_vec());
        assert_eq!(timer.0.get(), 2);
        assert_eq!(chain.sent.borrow()[0]["from"], ACCOUNT);
        Ok(())
    }

    #[tokio::test]
    async fn writes_without_signer_are_refused() -> anyhow::Result<()> {
        let chain = Rc::new(FakeChain::default());
        let timer = Rc::new(CountingTimer::default());
        let read_only = ProviderGateway::new(chain.clone(), Address::ZERO, timer);

        let err = read_only.set_data("k", b"v").await.unwrap_err();
        assert!(matches!(err, GatewayError::NoSigner));
        assert!(chain.sent.borrow().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn user_rejection_and_revert_are_distinguished() -> anyhow::Result<()> {
        let chain = Rc::new(FakeChain::default());
        let timer = Rc::new(CountingTimer::default());
        let gateway = gateway(&chain, &timer);

        chain.reject_sends.set(true);
        assert!(matches!(
            gateway.set_data("k", b"v").await.unwrap_err(),
            GatewayError::UserRejected
        ));

        chain.reject_sends.set(false);
        chain.revert.set(true);
        assert!(matches!(
            gateway.set_data("k", b"v").await.unwrap_err(),
            GatewayError::Reverted(ref hash) if hash == "0xfeed"
        ));
        Ok(())
    }

    #[tokio::test]
    async fn unmined_transaction_gives_up_after_policy_attempts() -> anyhow::Result<()> {
        let chain = Rc::new(FakeChain::default());
        let timer = Rc::new(CountingTimer::default());
        chain.pending_polls.set(100);
        let gateway = gateway(&chain, &timer);

        let err = gateway.set_data("k", b"v").await.unwrap_err();
        assert!(matches!(err, GatewayError::Unconfirmed(_)));
        assert_eq!(timer.0.get(), 5);
        Ok(())
    }

    #[tokio::test]
    async fn record_store_runs_on_the_contract_gateway() -> anyhow::Result<()> {
        let chain = Rc::new(FakeChain::default());
        let timer = Rc::new(CountingTimer::default());
        let store = RecordStore::new(gateway(&chain, &timer), FixedClock);

        let form = RecordInput {
            origin: "SG".into(),
            destination: "AU".into(),
            flight_count: "31".into(),
            additional_info: String::new(),
        };
        let created = store.create(&form).await?;
        store.set_status(&created.id, RecordStatus::Rejected).await?;

        let records = store.list().await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, RecordStatus::Rejected);
        assert_eq!(records[0].flight_count, 31);

        chain.reject_sends.set(true);
        let err = store.create(&form).await.unwrap_err();
        assert!(err.is_user_rejected());
        assert!(matches!(err, StoreError::Gateway(GatewayError::UserRejected)));
        Ok(())
    }
}
