//! Event loop glue: feeds events through the dispatcher, re-renders, and
//! runs the resulting effects. Async effects are spawned with
//! `wasm_bindgen_futures::spawn_local` and report back with another event.

use crate::injected::WindowHost;
use crate::render;
use crate::state;
use crate::store;
use at_app_core::{Effect, Event, Failure, StatusAction, WalletOption, update};
use at_api_types::{RecordInput, WalletChoice};
use at_chain_client::{Selection, WalletDescriptor, WalletRegistry, request_accounts, select};
use at_storage::ContractGateway;
use gloo_timers::future::TimeoutFuture;
use std::rc::Rc;
use tracing::{error, info, warn};
use wasm_bindgen_futures::spawn_local;

pub fn dispatch(event: Event) {
    let effects = state::with_mut(|s| {
        let app = std::mem::take(&mut s.app);
        let (next, effects) = update(app, event);
        s.app = next;
        effects
    });
    render::render();

    for effect in effects {
        run(effect);
    }
}

fn run(effect: Effect) {
    match effect {
        Effect::LoadRecords => spawn_local(load_records()),
        Effect::CheckAvailability => spawn_local(check_availability()),
        Effect::DiscoverWallets => discover_wallets(),
        Effect::SelectWallet(choice) => spawn_local(select_wallet(choice)),
        Effect::CreateRecord(input) => spawn_local(create_record(input)),
        Effect::SetStatus { id, action } => spawn_local(set_status(id, action)),
        Effect::OpenUrl(url) => {
            if let Err(e) = gloo_utils::window().open_with_url_and_target(url, "_blank") {
                warn!(%url, "could not open window: {e:?}");
            }
        }
        Effect::ForgetProvider => state::set_provider(None),
        Effect::DismissBanner { banner, after_ms } => spawn_local(async move {
            TimeoutFuture::new(after_ms).await;
            dispatch(Event::BannerExpired(banner));
        }),
    }
}

async fn load_records() {
    let records = match store::record_store() {
        Ok(store) => store.list().await,
        Err(err) => {
            warn!("records unavailable: {err}");
            Vec::new()
        }
    };
    dispatch(Event::RecordsLoaded(records));
}

async fn check_availability() {
    let available = match store::gateway() {
        Ok(gateway) => gateway.is_available().await,
        Err(err) => Err(err),
    };
    match available {
        Ok(true) => dispatch(Event::AvailabilityChecked(true)),
        Ok(false) => {
            error!("FHE System is not available");
            dispatch(Event::AvailabilityChecked(false));
        }
        Err(err) => error!("error checking availability: {err}"),
    }
}

fn discover_wallets() {
    let wallets = WalletRegistry::new(WindowHost).discover();
    let options = wallets
        .iter()
        .map(|w| WalletOption {
            choice: w.choice,
            installed: w.installed,
        })
        .collect();
    state::set_wallet_descriptors(wallets);
    dispatch(Event::WalletsDiscovered(options));
}

async fn select_wallet(choice: WalletChoice) {
    let descriptor = state::wallet_descriptors()
        .into_iter()
        .find(|w| w.choice == choice)
        .unwrap_or(WalletDescriptor {
            choice,
            provider: None,
            installed: false,
        });

    let chain = state::config().chain;
    match select(descriptor, &chain).await {
        Selection::ShowCatalog => dispatch(Event::CatalogOpened),
        Selection::OpenInstallPage(url) => dispatch(Event::InstallRequested(url)),
        Selection::Connect(descriptor) => connect(descriptor).await,
    }
}

async fn connect(descriptor: WalletDescriptor) {
    let Some(provider) = descriptor.provider.clone() else {
        dispatch(Event::ConnectFailed);
        return;
    };

    let account = match request_accounts(provider.as_ref()).await {
        Ok(account) => account,
        Err(err) => {
            error!(wallet = descriptor.name(), "failed to connect wallet: {err}");
            dispatch(Event::ConnectFailed);
            return;
        }
    };

    let wallet = descriptor.choice;
    let subscribed = provider.subscribe_accounts(Box::new(move |accounts| {
        if state::with(|s| s.app.wallet == Some(wallet)) {
            dispatch(Event::AccountsChanged(accounts));
        }
    }));
    if let Err(err) = subscribed {
        warn!(wallet = descriptor.name(), "accountsChanged not available: {err}");
    }

    info!(wallet = descriptor.name(), "wallet connected");
    state::set_provider(Some(Rc::clone(&provider)));
    dispatch(Event::WalletConnected { wallet, account });
}

async fn create_record(input: RecordInput) {
    let created = match store::record_store() {
        Ok(store) => store.create(&input).await,
        Err(err) => Err(err.into()),
    };
    match created {
        Ok(record) => dispatch(Event::RecordCreated(record)),
        Err(err) => {
            error!("submission failed: {err}");
            dispatch(Event::CreateFailed(Failure::from(&err)));
        }
    }
}

async fn set_status(id: String, action: StatusAction) {
    let updated = match store::record_store() {
        Ok(store) => store.set_status(&id, action.status()).await,
        Err(err) => Err(err.into()),
    };
    match updated {
        Ok(()) => dispatch(Event::StatusChanged(action)),
        Err(err) => {
            error!(%id, ?action, "status change failed: {err}");
            dispatch(Event::StatusChangeFailed {
                action,
                failure: Failure::from(&err),
            });
        }
    }
}
