//! Wallet theme that follows the page background.
//!
//! Samples the first opaque computed `background-color` above the wallet
//! area and writes the derived `--wallet-*` variables onto it.
//! CSS vars are set on `#walletArea`, not on `:root`.

use crate::dom::{self, Elements};
use crate::state;
use tracing::debug;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Element, MutationObserver, MutationObserverInit, Window};

const TRANSPARENT: [&str; 2] = ["rgba(0, 0, 0, 0)", "transparent"];

/// Apply the theme now and again whenever classes, inline styles, or the
/// viewport change.
pub fn watch_background(els: &Elements) -> Result<(), JsValue> {
    refresh_theme();

    let on_mutation = Closure::wrap(
        Box::new(move |_: JsValue, _: JsValue| refresh_theme()) as Box<dyn FnMut(JsValue, JsValue)>,
    );
    let observer = MutationObserver::new(on_mutation.as_ref().unchecked_ref())?;
    let init = MutationObserverInit::new();
    init.set_attributes(true);
    init.set_subtree(true);
    init.set_attribute_filter(&js_sys::Array::of2(&"style".into(), &"class".into()));
    let root = dom::document()
        .document_element()
        .ok_or_else(|| JsValue::from_str("missing document element"))?;
    observer.observe_with_options(&root, &init)?;
    on_mutation.forget();

    let on_resize =
        Closure::wrap(Box::new(move |_: web_sys::Event| refresh_theme()) as Box<dyn FnMut(_)>);
    gloo_utils::window()
        .add_event_listener_with_callback("resize", on_resize.as_ref().unchecked_ref())?;
    on_resize.forget();

    debug!(area = %els.wallet_area.id(), "watching background for theme changes");
    Ok(())
}

fn refresh_theme() {
    let Some(els) = state::elements() else {
        return;
    };
    let sample = sample_background(&els.wallet_area);
    let Some(palette) = state::with_mut(|s| s.theme.observe(&sample)) else {
        return;
    };

    let style = els.wallet_area.style();
    for (name, value) in palette.iter() {
        let _ = style.set_property(name, value);
    }
}

/// Walk up to (not including) `<body>`; fall back to body's own colour.
fn sample_background(start: &Element) -> String {
    let window = gloo_utils::window();
    let body: Option<Element> = dom::document().body().map(Into::into);

    let mut current = Some(start.clone());
    while let Some(el) = current {
        if body.as_ref() == Some(&el) {
            break;
        }
        if let Some(color) = computed_background(&window, &el) {
            if !TRANSPARENT.contains(&color.as_str()) {
                return color;
            }
        }
        current = el.parent_element();
    }

    body.and_then(|b| computed_background(&window, &b))
        .unwrap_or_default()
}

fn computed_background(window: &Window, el: &Element) -> Option<String> {
    window
        .get_computed_style(el)
        .ok()??
        .get_property_value("background-color")
        .ok()
}
