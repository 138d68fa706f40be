//! Injected browser wallets (`window.ethereum` and friends).
//!
//! [`WindowHost`] resolves a wallet's global binding once per discovery;
//! [`InjectedProvider`] forwards EIP-1193 `request` calls to it.

use async_trait::async_trait;
use at_api_types::WalletKind;
use at_chain_client::{AccountsListener, ProviderError, ProviderHost, WalletProvider};
use js_sys::{Function, Object, Promise, Reflect};
use serde::Serialize;
use serde_json::Value;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

pub struct WindowHost;

impl ProviderHost for WindowHost {
    fn lookup(&self, kind: WalletKind) -> Option<Rc<dyn WalletProvider>> {
        let window = gloo_utils::window();
        let object = Reflect::get(&window, &JsValue::from_str(kind.binding())).ok()?;
        if object.is_undefined() || object.is_null() {
            return None;
        }
        if let Some(marker) = kind.marker() {
            let flagged = Reflect::get(&object, &JsValue::from_str(marker)).ok()?;
            if !flagged.is_truthy() {
                return None;
            }
        }
        Some(Rc::new(InjectedProvider { kind, object }))
    }
}

pub struct InjectedProvider {
    kind: WalletKind,
    object: JsValue,
}

impl InjectedProvider {
    fn method(&self, name: &str) -> Result<Function, ProviderError> {
        let method = Reflect::get(&self.object, &JsValue::from_str(name))
            .map_err(|e| ProviderError::internal(format!("{name} not found: {e:?}")))?;
        method.dyn_into::<Function>().map_err(|_| {
            ProviderError::internal(format!(
                "{}.{name} is not a function",
                self.kind.binding()
            ))
        })
    }
}

#[async_trait(?Send)]
impl WalletProvider for InjectedProvider {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
        let params = params
            .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
            .map_err(|e| ProviderError::internal(e.to_string()))?;

        let args = Object::new();
        Reflect::set(&args, &"method".into(), &JsValue::from_str(method)).map_err(js_error)?;
        Reflect::set(&args, &"params".into(), &params).map_err(js_error)?;

        let pending = self
            .method("request")?
            .call1(&self.object, &args)
            .map_err(js_error)?;
        let result = JsFuture::from(Promise::resolve(&pending))
            .await
            .map_err(js_error)?;

        serde_wasm_bindgen::from_value(result).map_err(|e| ProviderError::internal(e.to_string()))
    }

    fn subscribe_accounts(&self, listener: AccountsListener) -> Result<(), ProviderError> {
        let Ok(on) = self.method("on") else {
            return Ok(());
        };

        let cb = Closure::wrap(Box::new(move |accounts: JsValue| {
            let accounts: Vec<String> = serde_wasm_bindgen::from_value(accounts).unwrap_or_default();
            listener(accounts);
        }) as Box<dyn Fn(JsValue)>);
        on.call2(&self.object, &"accountsChanged".into(), cb.as_ref().unchecked_ref())
            .map_err(js_error)?;
        cb.forget();
        Ok(())
    }
}

/// Convert a rejected provider promise (`{code, message, data}`) into a [`ProviderError`].
fn js_error(err: JsValue) -> ProviderError {
    let field = |name: &str| Reflect::get(&err, &JsValue::from_str(name)).unwrap_or(JsValue::UNDEFINED);

    let code = field("code").as_f64().map(|c| c as i64).unwrap_or(ProviderError::INTERNAL);
    let message = field("message")
        .as_string()
        .unwrap_or_else(|| format!("{err:?}"));
    let mut error = ProviderError::new(code, message);

    let data = field("data");
    if !data.is_undefined() && !data.is_null() {
        if let Ok(data) = serde_wasm_bindgen::from_value::<Value>(data) {
            error = error.with_data(data);
        }
    }
    error
}
