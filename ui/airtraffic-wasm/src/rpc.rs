//! Read-only JSON-RPC provider over `fetch`.
//!
//! Contract reads do not need a wallet, so they go to the chain's public
//! endpoints directly. Endpoints are tried in order; the first one that
//! answers (even with a JSON-RPC error) wins.

use async_trait::async_trait;
use at_chain_client::{AccountsListener, ProviderError, WalletProvider};
use gloo_net::http::Request;
use serde_json::{Value, json};
use std::cell::Cell;
use tracing::warn;

pub struct HttpRpcProvider {
    endpoints: Vec<String>,
    next_id: Cell<u64>,
}

impl HttpRpcProvider {
    pub fn new(endpoints: Vec<String>) -> Self {
        Self {
            endpoints,
            next_id: Cell::new(1),
        }
    }

    async fn post(&self, url: &str, body: &Value) -> Result<Value, String> {
        let response = Request::post(url)
            .json(body)
            .map_err(|e| e.to_string())?
            .send()
            .await
            .map_err(|e| e.to_string())?;
        if !response.ok() {
            return Err(format!("HTTP {}", response.status()));
        }
        response.json::<Value>().await.map_err(|e| e.to_string())
    }
}

#[async_trait(?Send)]
impl WalletProvider for HttpRpcProvider {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        let body = json!({ "jsonrpc": "2.0", "id": id, "method": method, "params": params });

        let mut last_error = String::from("no RPC endpoints configured");
        for url in &self.endpoints {
            match self.post(url, &body).await {
                Ok(reply) => return parse_reply(reply),
                Err(err) => {
                    warn!(%url, %method, "RPC endpoint failed: {err}");
                    last_error = err;
                }
            }
        }
        Err(ProviderError::internal(last_error))
    }

    fn subscribe_accounts(&self, _listener: AccountsListener) -> Result<(), ProviderError> {
        Ok(())
    }
}

fn parse_reply(mut reply: Value) -> Result<Value, ProviderError> {
    if let Some(error) = reply.get("error").filter(|e| !e.is_null()) {
        let code = error
            .get("code")
            .and_then(Value::as_i64)
            .unwrap_or(ProviderError::INTERNAL);
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("unknown RPC error");
        let mut err = ProviderError::new(code, message);
        if let Some(data) = error.get("data") {
            err = err.with_data(data.clone());
        }
        return Err(err);
    }
    Ok(reply.get_mut("result").map(Value::take).unwrap_or(Value::Null))
}
