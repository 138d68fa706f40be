//! Event binding.
//!
//! Every listener translates a DOM event into an `at_app_core::Event` and
//! hands it to `runtime::dispatch`. Lists re-rendered from state use one
//! delegated listener on their container.

use crate::dom::{self, Elements};
use crate::runtime::dispatch;
use crate::state;
use at_api_types::RecordField;
use at_app_core::{Event, StatusAction};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{HtmlInputElement, HtmlTextAreaElement};

/// Helper: attach a listener for `$kind` and leak the closure for the page lifetime.
macro_rules! on {
    ($el:expr, $kind:literal, $cb:expr) => {{
        let cb = Closure::wrap(Box::new($cb) as Box<dyn FnMut(web_sys::Event)>);
        $el.add_event_listener_with_callback($kind, cb.as_ref().unchecked_ref())?;
        cb.forget();
    }};
}

/// Helper: dispatch a fixed event on click.
macro_rules! on_click {
    ($el:expr, $event:expr) => {
        on!($el, "click", move |_: web_sys::Event| dispatch($event))
    };
}

/// Bind all UI event listeners. Call once after init.
pub fn bind_events(els: &Elements) -> Result<(), JsValue> {
    // ── Header ──
    on_click!(els.check_status_btn, Event::CheckAvailability);
    on_click!(els.add_record_btn, Event::OpenCreateForm);
    on_click!(els.tutorial_btn, Event::ToggleTutorial);

    // ── Wallet manager ──
    on_click!(els.connect_btn, Event::OpenWalletSelector);
    on_click!(els.reconnect_btn, Event::OpenWalletSelector);
    on_click!(els.disconnect_btn, Event::Disconnect);

    // ── Controls ──
    on_click!(els.stats_btn, Event::ToggleStats);
    on_click!(els.refresh_btn, Event::Refresh);

    // ── Record cards ──
    on!(els.records_list, "click", move |ev: web_sys::Event| {
        let Some(target) = ev.target() else { return };
        let Some(button) = dom::closest_with(&target, "data-action") else {
            return;
        };
        let id = button.get_attribute("data-id").unwrap_or_default();
        match button.get_attribute("data-action").as_deref() {
            Some("add-first") => dispatch(Event::OpenCreateForm),
            Some("analyze") => dispatch(Event::ChangeStatus {
                id,
                action: StatusAction::Analyze,
            }),
            Some("reject") => dispatch(Event::ChangeStatus {
                id,
                action: StatusAction::Reject,
            }),
            _ => {}
        }
    });

    // ── Create modal ──
    bind_input(&els.origin_input, RecordField::Origin)?;
    bind_input(&els.destination_input, RecordField::Destination)?;
    bind_input(&els.flight_count_input, RecordField::FlightCount)?;
    bind_textarea(&els.additional_info, RecordField::AdditionalInfo)?;
    on_click!(els.submit_record_btn, Event::Submit);
    on_click!(els.cancel_create_btn, Event::CloseCreateForm);
    on_click!(els.close_create_btn, Event::CloseCreateForm);

    // ── Wallet selector ──
    on!(els.wallet_options, "click", move |ev: web_sys::Event| {
        let Some(target) = ev.target() else { return };
        let Some(item) = dom::closest_with(&target, "data-wallet") else {
            return;
        };
        let index = item
            .get_attribute("data-wallet")
            .and_then(|i| i.parse::<usize>().ok());
        let choice = index.and_then(|i| state::with(|s| s.app.wallets.get(i).map(|w| w.choice)));
        if let Some(choice) = choice {
            dispatch(Event::WalletPicked(choice));
        }
    });
    on_click!(els.close_selector_btn, Event::CloseWalletSelector);
    on_click!(els.close_catalog_btn, Event::CatalogClosed);

    Ok(())
}

fn bind_input(el: &HtmlInputElement, field: RecordField) -> Result<(), JsValue> {
    let input = el.clone();
    on!(el, "input", move |_: web_sys::Event| {
        dispatch(Event::FormChanged(field, input.value()))
    });
    Ok(())
}

fn bind_textarea(el: &HtmlTextAreaElement, field: RecordField) -> Result<(), JsValue> {
    let input = el.clone();
    on!(el, "input", move |_: web_sys::Event| {
        dispatch(Event::FormChanged(field, input.value()))
    });
    Ok(())
}
