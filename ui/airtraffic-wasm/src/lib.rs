//! AirTraffic WASM frontend
//!
//! Browser shell around `at-app-core`: binds the page, turns DOM events into
//! dispatcher events, and runs the effects against the injected wallet and
//! the traffic-store contract. Each concern lives in its own module.

pub mod config;
pub mod dom;
pub mod events;
pub mod injected;
pub mod logging;
pub mod render;
pub mod rpc;
pub mod runtime;
pub mod state;
pub mod store;
pub mod theme;

use at_app_core::Event;
use tracing::info;
use wasm_bindgen::prelude::*;

/// WASM entry point – called automatically when the module is instantiated.
#[wasm_bindgen(start)]
pub async fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();

    init().await
}

async fn init() -> Result<(), JsValue> {
    let config = config::AppConfig::load();
    logging::init(&config.log_filter);
    info!(
        chain = %config.chain.name,
        contract = ?config.contract,
        "starting AirTraffic frontend"
    );

    let els = dom::Elements::bind()?;
    state::with_mut(|s| {
        s.config = config;
        s.elements = Some(els.clone());
    });

    events::bind_events(&els)?;
    theme::watch_background(&els)?;

    runtime::dispatch(Event::Init);
    Ok(())
}
