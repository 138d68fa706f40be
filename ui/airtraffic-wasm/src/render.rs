//! Projects `AppState` onto the bound elements.
//!
//! Lists are rebuilt as HTML strings; their buttons carry `data-*` attributes
//! that the delegated listeners in `events` read back.

use crate::dom::{self, Elements, escape};
use crate::state;
use at_api_types::{MOBILE_WALLETS, POPULAR_WALLETS, Record, shorten_account};
use at_app_core::{AppState, WalletOption};

pub fn render() {
    let Some(els) = state::elements() else {
        return;
    };
    state::with(|s| draw(&els, &s.app));
}

fn draw(els: &Elements, app: &AppState) {
    dom::set_visible(&els.loading_screen, app.loading);
    dom::set_visible(&els.app, !app.loading);

    draw_wallet(els, app);
    draw_controls(els, app);
    draw_records(els, &app.records);
    draw_create_modal(els, app);
    draw_selector(els, app);
    draw_banner(els, app);
}

fn draw_wallet(els: &Elements, app: &AppState) {
    let connected = !app.account.is_empty();
    dom::set_visible(&els.connect_btn, !connected);
    dom::set_visible(&els.account_box, connected);
    if connected {
        dom::set_text(&els.account_label, &shorten_account(&app.account));
    }
}

fn draw_controls(els: &Elements, app: &AppState) {
    dom::set_visible(&els.tutorial_section, app.show_tutorial);
    dom::set_text(
        &els.tutorial_btn,
        if app.show_tutorial { "Hide Guide" } else { "Show Guide" },
    );

    dom::set_visible(&els.stats_section, app.show_stats);
    dom::set_text(
        &els.stats_btn,
        if app.show_stats { "Hide Stats" } else { "Show Stats" },
    );
    let stats = app.stats();
    dom::set_text(&els.stat_total, &stats.total.to_string());
    dom::set_text(&els.stat_analyzed, &stats.analyzed.to_string());
    dom::set_text(&els.stat_pending, &stats.pending.to_string());
    dom::set_text(&els.stat_flights, &stats.total_flights.to_string());

    dom::set_disabled(&els.refresh_btn, app.refreshing);
    dom::set_text(
        &els.refresh_btn,
        if app.refreshing { "Refreshing..." } else { "Refresh Data" },
    );
}

fn draw_records(els: &Elements, records: &[Record]) {
    dom::set_text(&els.result_count, &format!("{} records found", records.len()));

    if records.is_empty() {
        dom::set_inner_html(
            &els.records_list,
            r#"<div class="no-records">
              <div class="no-records-icon">✈️</div>
              <p>No air traffic records found</p>
              <button class="primary-btn" data-action="add-first">Add First Record</button>
            </div>"#,
        );
        return;
    }

    let cards: String = records.iter().map(record_card).collect();
    dom::set_inner_html(&els.records_list, &format!(r#"<div class="records-grid">{cards}</div>"#));
}

fn record_card(record: &Record) -> String {
    let id = escape(&record.id);
    format!(
        r#"<div class="record-card">
          <div class="card-header">
            <div class="route">{origin} → {destination}</div>
            <div class="status-badge {status}">{status}</div>
          </div>
          <div class="card-details">
            <div class="detail-item"><span>Flights:</span><span>{flights}</span></div>
            <div class="detail-item"><span>Submitted:</span><span>{submitted}</span></div>
            <div class="detail-item"><span>ID:</span><span class="record-id">#{short}</span></div>
          </div>
          <div class="card-actions">
            <button class="action-btn success" data-action="analyze" data-id="{id}">Analyze</button>
            <button class="action-btn danger" data-action="reject" data-id="{id}">Reject</button>
          </div>
        </div>"#,
        origin = escape(&record.origin),
        destination = escape(&record.destination),
        status = record.status.as_str(),
        flights = record.flight_count,
        submitted = local_date(record.created_at),
        short = escape(record.short_id()),
    )
}

fn local_date(unix_seconds: u64) -> String {
    let date = js_sys::Date::new(&((unix_seconds as f64) * 1000.0).into());
    date.to_locale_date_string("default", &wasm_bindgen::JsValue::UNDEFINED)
        .as_string()
        .unwrap_or_default()
}

fn draw_create_modal(els: &Elements, app: &AppState) {
    dom::set_visible(&els.create_modal, app.show_create);
    dom::sync_input(&els.origin_input, &app.form.origin);
    dom::sync_input(&els.destination_input, &app.form.destination);
    dom::sync_input(&els.flight_count_input, &app.form.flight_count);
    dom::sync_textarea(&els.additional_info, &app.form.additional_info);

    dom::set_disabled(&els.submit_record_btn, app.creating);
    dom::set_text(
        &els.submit_record_btn,
        if app.creating { "Encrypting with FHE..." } else { "Submit Securely" },
    );
}

fn draw_selector(els: &Elements, app: &AppState) {
    dom::set_visible(&els.wallet_selector, app.selector_open);
    if app.selector_open {
        let items: String = app.wallets.iter().enumerate().map(wallet_item).collect();
        dom::set_inner_html(&els.wallet_options, &items);
    }

    dom::set_visible(&els.wallet_catalog, app.catalog_open);
    if app.catalog_open {
        let list = |names: &[&str]| -> String {
            names
                .iter()
                .map(|n| format!(r#"<div class="catalog-item">{}</div>"#, escape(n)))
                .collect()
        };
        dom::set_inner_html(
            &els.catalog_list,
            &format!(
                r#"<div class="catalog-group"><div class="catalog-title">Popular Wallets</div>{}</div>
                <div class="catalog-group"><div class="catalog-title">Mobile Wallets</div>{}</div>"#,
                list(&POPULAR_WALLETS),
                list(&MOBILE_WALLETS),
            ),
        );
    }
}

fn wallet_item((index, wallet): (usize, &WalletOption)) -> String {
    let (class, hint, badge) = if wallet.installed {
        ("wallet-item", "Ready to connect", "Installed")
    } else {
        ("wallet-item wallet-item--missing", "Click to install", "Not Installed")
    };
    format!(
        r#"<div class="{class}" data-wallet="{index}">
          <img class="wallet-icon" src="{icon}" alt="{name}">
          <div class="wallet-info"><div class="wallet-name">{name}</div><div class="wallet-hint">{hint}</div></div>
          <span class="wallet-status">{badge}</span>
        </div>"#,
        icon = wallet.choice.icon_url(),
        name = wallet.choice.name(),
    )
}

fn draw_banner(els: &Elements, app: &AppState) {
    let Some(banner) = &app.banner else {
        dom::set_visible(&els.tx_banner, false);
        return;
    };
    dom::set_visible(&els.tx_banner, true);
    let _ = els
        .tx_icon
        .set_attribute("class", &format!("transaction-icon {}", banner.kind.as_str()));
    let icon = match banner.kind {
        at_app_core::BannerKind::Pending => r#"<div class="spinner"></div>"#,
        at_app_core::BannerKind::Success => r#"<div class="success-icon">✓</div>"#,
        at_app_core::BannerKind::Error => r#"<div class="error-icon">✗</div>"#,
    };
    dom::set_inner_html(&els.tx_icon, icon);
    dom::set_text(&els.tx_message, &banner.message);
}
