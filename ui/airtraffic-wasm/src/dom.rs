//! DOM element bindings.
//!
//! All fields are resolved once at startup against `index.html`.
//! To add new UI elements, add a field here and bind it in `Elements::bind()`.

use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlElement, HtmlInputElement, HtmlTextAreaElement};

// ── Helpers ──

pub fn document() -> Document {
    gloo_utils::document()
}

pub fn by_id(id: &str) -> Option<Element> {
    document().get_element_by_id(id)
}

pub fn by_id_typed<T: JsCast>(id: &str) -> Option<T> {
    by_id(id).and_then(|e| e.dyn_into::<T>().ok())
}

pub fn set_text(el: &Element, text: &str) {
    el.set_text_content(Some(text));
}

pub fn set_inner_html(el: &Element, html: &str) {
    el.set_inner_html(html);
}

pub fn toggle_class(el: &Element, cls: &str, force: bool) {
    let _ = el.class_list().toggle_with_force(cls, force);
}

pub fn set_visible(el: &Element, visible: bool) {
    toggle_class(el, "hidden", !visible);
}

pub fn set_disabled(el: &Element, disabled: bool) {
    let _ = if disabled {
        el.set_attribute("disabled", "")
    } else {
        el.remove_attribute("disabled")
    };
}

/// Only touch the input when the value differs, so the caret stays put while typing.
pub fn sync_input(el: &HtmlInputElement, value: &str) {
    if el.value() != value {
        el.set_value(value);
    }
}

pub fn sync_textarea(el: &HtmlTextAreaElement, value: &str) {
    if el.value() != value {
        el.set_value(value);
    }
}

/// Walk up from `target` to the nearest element carrying `attr`.
pub fn closest_with(target: &JsValue, attr: &str) -> Option<Element> {
    let el = target.dyn_ref::<Element>()?;
    el.closest(&format!("[{attr}]")).ok()?
}

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

// ── Elements struct ──

/// All DOM element references used by the app.
/// Clone-friendly (all inner types are reference-counted via JS GC).
#[derive(Clone)]
pub struct Elements {
    // Layout
    pub loading_screen: Element,
    pub app: Element,

    // Header
    pub check_status_btn: HtmlElement,
    pub add_record_btn: HtmlElement,
    pub tutorial_btn: HtmlElement,

    // Wallet manager
    pub wallet_area: HtmlElement,
    pub connect_btn: HtmlElement,
    pub account_box: Element,
    pub account_label: Element,
    pub reconnect_btn: HtmlElement,
    pub disconnect_btn: HtmlElement,

    // Tutorial / stats
    pub tutorial_section: Element,
    pub stats_btn: HtmlElement,
    pub refresh_btn: HtmlElement,
    pub stats_section: Element,
    pub stat_total: Element,
    pub stat_analyzed: Element,
    pub stat_pending: Element,
    pub stat_flights: Element,

    // Records
    pub result_count: Element,
    pub records_list: Element,

    // Create modal
    pub create_modal: Element,
    pub origin_input: HtmlInputElement,
    pub destination_input: HtmlInputElement,
    pub flight_count_input: HtmlInputElement,
    pub additional_info: HtmlTextAreaElement,
    pub submit_record_btn: HtmlElement,
    pub cancel_create_btn: HtmlElement,
    pub close_create_btn: HtmlElement,

    // Wallet selector
    pub wallet_selector: Element,
    pub wallet_options: Element,
    pub close_selector_btn: HtmlElement,
    pub wallet_catalog: Element,
    pub catalog_list: Element,
    pub close_catalog_btn: HtmlElement,

    // Transaction banner
    pub tx_banner: Element,
    pub tx_icon: Element,
    pub tx_message: Element,
}

macro_rules! get_el {
    ($id:expr) => {
        by_id($id).ok_or_else(|| JsValue::from_str(&format!("missing element #{}", $id)))?
    };
}

macro_rules! get_typed {
    ($ty:ty, $id:expr) => {
        by_id_typed::<$ty>($id)
            .ok_or_else(|| JsValue::from_str(&format!("missing {} #{}", stringify!($ty), $id)))?
    };
}

impl Elements {
    pub fn bind() -> Result<Self, JsValue> {
        Ok(Self {
            loading_screen: get_el!("loadingScreen"),
            app: get_el!("app"),

            check_status_btn: get_typed!(HtmlElement, "checkStatusBtn"),
            add_record_btn: get_typed!(HtmlElement, "addRecordBtn"),
            tutorial_btn: get_typed!(HtmlElement, "tutorialBtn"),

            wallet_area: get_typed!(HtmlElement, "walletArea"),
            connect_btn: get_typed!(HtmlElement, "connectBtn"),
            account_box: get_el!("accountBox"),
            account_label: get_el!("accountLabel"),
            reconnect_btn: get_typed!(HtmlElement, "reconnectBtn"),
            disconnect_btn: get_typed!(HtmlElement, "disconnectBtn"),

            tutorial_section: get_el!("tutorialSection"),
            stats_btn: get_typed!(HtmlElement, "statsBtn"),
            refresh_btn: get_typed!(HtmlElement, "refreshBtn"),
            stats_section: get_el!("statsSection"),
            stat_total: get_el!("statTotal"),
            stat_analyzed: get_el!("statAnalyzed"),
            stat_pending: get_el!("statPending"),
            stat_flights: get_el!("statFlights"),

            result_count: get_el!("resultCount"),
            records_list: get_el!("recordsList"),

            create_modal: get_el!("createModal"),
            origin_input: get_typed!(HtmlInputElement, "originInput"),
            destination_input: get_typed!(HtmlInputElement, "destinationInput"),
            flight_count_input: get_typed!(HtmlInputElement, "flightCountInput"),
            additional_info: get_typed!(HtmlTextAreaElement, "additionalInfo"),
            submit_record_btn: get_typed!(HtmlElement, "submitRecordBtn"),
            cancel_create_btn: get_typed!(HtmlElement, "cancelCreateBtn"),
            close_create_btn: get_typed!(HtmlElement, "closeCreateBtn"),

            wallet_selector: get_el!("walletSelector"),
            wallet_options: get_el!("walletOptions"),
            close_selector_btn: get_typed!(HtmlElement, "closeSelectorBtn"),
            wallet_catalog: get_el!("walletCatalog"),
            catalog_list: get_el!("catalogList"),
            close_catalog_btn: get_typed!(HtmlElement, "closeCatalogBtn"),

            tx_banner: get_el!("txBanner"),
            tx_icon: get_el!("txIcon"),
            tx_message: get_el!("txMessage"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_neutralises_markup() {
        assert_eq!(
            escape(r#"<b a="1">Tom & 'Jerry'</b>"#),
            "&lt;b a=&quot;1&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
        assert_eq!(escape("JFK"), "JFK");
    }
}
