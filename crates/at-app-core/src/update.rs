use crate::{AppState, BannerKind, Effect, Event, NOTICE_DISMISS_MS, SUCCESS_DISMISS_MS};
use at_api_types::RecordInput;
use at_storage::validate_input;
use tracing::debug;

const CONNECT_FIRST: &str = "Please connect wallet first";

/// Apply one event. Returns the next state and the effects the shell must run.
pub fn update(mut state: AppState, event: Event) -> (AppState, Vec<Effect>) {
    let mut effects = Vec::new();

    match event {
        Event::Init => {
            state.loading = true;
            state.refreshing = true;
            effects.push(Effect::LoadRecords);
        }
        Event::RecordsLoaded(records) => {
            debug!(count = records.len(), "records loaded");
            state.records = records;
            state.loading = false;
            state.refreshing = false;
        }
        Event::Refresh => {
            if !state.refreshing {
                state.refreshing = true;
                effects.push(Effect::LoadRecords);
            }
        }

        Event::CheckAvailability => effects.push(Effect::CheckAvailability),
        Event::AvailabilityChecked(available) => {
            if available {
                let id = state.show_banner(
                    BannerKind::Success,
                    "FHE System Available - Secure Processing Enabled",
                );
                effects.push(dismiss(id, NOTICE_DISMISS_MS));
            }
        }

        Event::OpenWalletSelector => {
            state.selector_open = true;
            effects.push(Effect::DiscoverWallets);
        }
        Event::CloseWalletSelector => state.selector_open = false,
        Event::WalletsDiscovered(wallets) => state.wallets = wallets,
        Event::WalletPicked(choice) => {
            state.selector_open = false;
            effects.push(Effect::SelectWallet(choice));
        }
        Event::CatalogOpened => state.catalog_open = true,
        Event::CatalogClosed => state.catalog_open = false,
        Event::InstallRequested(url) => effects.push(Effect::OpenUrl(url)),
        Event::WalletConnected { wallet, account } => {
            state.wallet = Some(wallet);
            state.account = account;
        }
        Event::ConnectFailed => {
            error_banner(&mut state, &mut effects, "Failed to connect wallet");
        }
        Event::AccountsChanged(accounts) => {
            state.account = accounts.into_iter().next().unwrap_or_default();
        }
        Event::Disconnect => {
            state.account.clear();
            state.wallet = None;
            effects.push(Effect::ForgetProvider);
        }

        Event::OpenCreateForm => state.show_create = true,
        Event::CloseCreateForm => state.show_create = false,
        Event::FormChanged(field, value) => state.form.set(field, value),
        Event::Submit => {
            if state.creating {
                return (state, effects);
            }
            if let Err(err) = validate_input(&state.form) {
                error_banner(&mut state, &mut effects, err.to_string());
                return (state, effects);
            }
            if !state.is_connected() {
                error_banner(&mut state, &mut effects, CONNECT_FIRST);
                return (state, effects);
            }
            state.creating = true;
            state.show_banner(
                BannerKind::Pending,
                "Encrypting air traffic data with Zama FHE...",
            );
            effects.push(Effect::CreateRecord(state.form.clone()));
        }
        Event::RecordCreated(record) => {
            debug!(id = %record.id, "record created");
            state.creating = false;
            let id = state.show_banner(
                BannerKind::Success,
                "Encrypted air traffic data submitted securely!",
            );
            state.form_reset_on = Some(id);
            state.refreshing = true;
            effects.push(Effect::LoadRecords);
            effects.push(dismiss(id, SUCCESS_DISMISS_MS));
        }
        Event::CreateFailed(failure) => {
            state.creating = false;
            error_banner(&mut state, &mut effects, failure.describe("Submission failed"));
        }

        Event::ChangeStatus { id, action } => {
            if !state.is_connected() {
                error_banner(&mut state, &mut effects, CONNECT_FIRST);
                return (state, effects);
            }
            state.show_banner(BannerKind::Pending, action.pending_message());
            effects.push(Effect::SetStatus { id, action });
        }
        Event::StatusChanged(action) => {
            let id = state.show_banner(BannerKind::Success, action.success_message());
            state.refreshing = true;
            effects.push(Effect::LoadRecords);
            effects.push(dismiss(id, SUCCESS_DISMISS_MS));
        }
        Event::StatusChangeFailed { action, failure } => {
            error_banner(&mut state, &mut effects, failure.describe(action.failure_prefix()));
        }

        Event::BannerExpired(id) => {
            if state.banner.as_ref().is_some_and(|b| b.id == id) {
                state.banner = None;
            }
            if state.form_reset_on == Some(id) {
                state.form_reset_on = None;
                state.show_create = false;
                state.form = RecordInput::default();
            }
        }
        Event::ToggleTutorial => state.show_tutorial = !state.show_tutorial,
        Event::ToggleStats => state.show_stats = !state.show_stats,
    }

    (state, effects)
}

fn error_banner(state: &mut AppState, effects: &mut Vec<Effect>, message: impl Into<String>) {
    let id = state.show_banner(BannerKind::Error, message);
    effects.push(dismiss(id, NOTICE_DISMISS_MS));
}

fn dismiss(banner: u64, after_ms: u32) -> Effect {
    Effect::DismissBanner { banner, after_ms }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Failure, StatusAction};
    use at_api_types::{Record, RecordField, RecordStatus, WalletChoice, WalletKind};
    use at_storage::{GatewayError, StoreError};

    fn run(state: AppState, events: Vec<Event>) -> (AppState, Vec<Effect>) {
        events.into_iter().fold((state, Vec::new()), |(state, _), event| update(state, event))
    }

    fn connected() -> AppState {
        let (state, _) = update(
            AppState::new(),
            Event::WalletConnected {
                wallet: WalletChoice::Injected(WalletKind::MetaMask),
                account: "0x52908400098527886E0F7030069857D2E4169EE7".to_owned(),
            },
        );
        state
    }

    fn filled(state: AppState) -> AppState {
        run(
            state,
            vec![
                Event::FormChanged(RecordField::Origin, "JFK".into()),
                Event::FormChanged(RecordField::Destination, "LHR".into()),
                Event::FormChanged(RecordField::FlightCount, "12".into()),
            ],
        )
        .0
    }

    fn record(id: &str) -> Record {
        Record {
            id: id.to_owned(),
            payload: "FHE-AIR-e30=".to_owned(),
            created_at: 100,
            origin: "JFK".to_owned(),
            destination: "LHR".to_owned(),
            flight_count: 12,
            status: RecordStatus::Pending,
        }
    }

    #[test]
    fn init_loads_records_once() -> anyhow::Result<()> {
        let (state, effects) = update(AppState::new(), Event::Init);
        assert_eq!(effects, vec![Effect::LoadRecords]);
        assert!(state.loading);

        let (state, effects) = update(state, Event::Refresh);
        assert!(effects.is_empty(), "refresh while refreshing is ignored");

        let (state, _) = update(state, Event::RecordsLoaded(vec![record("a")]));
        assert!(!state.loading && !state.refreshing);
        assert_eq!(state.stats().total_flights, 12);

        let (_, effects) = update(state, Event::Refresh);
        assert_eq!(effects, vec![Effect::LoadRecords]);
        Ok(())
    }

    #[test]
    fn submit_without_wallet_only_shows_a_banner() -> anyhow::Result<()> {
        let (state, effects) = update(filled(AppState::new()), Event::Submit);

        let banner = state.banner.clone().ok_or_else(|| anyhow::anyhow!("no banner"))?;
        assert_eq!(banner.kind, BannerKind::Error);
        assert_eq!(banner.message, "Please connect wallet first");
        assert_eq!(
            effects,
            vec![Effect::DismissBanner { banner: banner.id, after_ms: 3_000 }]
        );
        assert!(!state.creating);
        Ok(())
    }

    #[test]
    fn submit_with_missing_fields_never_reaches_the_store() -> anyhow::Result<()> {
        let (state, effects) = update(connected(), Event::Submit);

        assert_eq!(state.banner.map(|b| b.message).as_deref(), Some("Please fill required fields"));
        assert!(!effects.iter().any(|e| matches!(e, Effect::CreateRecord(_))));
        Ok(())
    }

    #[test]
    fn successful_create_resets_form_when_its_banner_expires() -> anyhow::Result<()> {
        let (state, effects) = update(filled(connected()), Event::OpenCreateForm);
        assert!(effects.is_empty());

        let (state, effects) = update(state, Event::Submit);
        assert!(state.creating);
        assert!(matches!(&effects[..], [Effect::CreateRecord(form)] if form.origin == "JFK"));

        let (state, effects) = update(state, Event::RecordCreated(record("a")));
        let banner = state.banner.clone().ok_or_else(|| anyhow::anyhow!("no banner"))?;
        assert_eq!(banner.message, "Encrypted air traffic data submitted securely!");
        assert_eq!(
            effects,
            vec![
                Effect::LoadRecords,
                Effect::DismissBanner { banner: banner.id, after_ms: 2_000 }
            ]
        );

        let (state, _) = update(state, Event::BannerExpired(banner.id));
        assert!(state.banner.is_none());
        assert!(!state.show_create);
        assert_eq!(state.form, RecordInput::default());
        Ok(())
    }

    #[test]
    fn stale_dismissal_keeps_newer_banner() -> anyhow::Result<()> {
        let (state, _) = update(connected(), Event::AvailabilityChecked(true));
        let first = state.banner.as_ref().map(|b| b.id).unwrap_or_default();

        let (state, _) = update(
            state,
            Event::ChangeStatus { id: "a".into(), action: StatusAction::Analyze },
        );
        let (state, _) = update(state, Event::BannerExpired(first));

        let banner = state.banner.ok_or_else(|| anyhow::anyhow!("banner hidden"))?;
        assert_eq!(banner.message, "Analyzing encrypted air traffic data with FHE...");
        assert_eq!(banner.kind, BannerKind::Pending);
        Ok(())
    }

    #[test]
    fn failures_are_described_per_action() -> anyhow::Result<()> {
        let rejected = Failure::from(&StoreError::Gateway(GatewayError::UserRejected));
        let (state, _) = update(connected(), Event::CreateFailed(rejected));
        assert_eq!(
            state.banner.as_ref().map(|b| b.message.as_str()),
            Some("Transaction rejected by user")
        );

        let missing = Failure::from(&StoreError::NotFound("x".into()));
        let (state, _) = update(
            state,
            Event::StatusChangeFailed { action: StatusAction::Reject, failure: missing },
        );
        assert_eq!(
            state.banner.as_ref().map(|b| b.message.as_str()),
            Some("Rejection failed: Record not found")
        );

        let (state, _) = update(
            state,
            Event::StatusChangeFailed { action: StatusAction::Analyze, failure: Failure::new("") },
        );
        assert_eq!(
            state.banner.map(|b| b.message),
            Some("Analysis failed: Unknown error".to_owned())
        );
        Ok(())
    }

    #[test]
    fn wallet_lifecycle() -> anyhow::Result<()> {
        let (state, effects) = update(AppState::new(), Event::OpenWalletSelector);
        assert!(state.selector_open);
        assert_eq!(effects, vec![Effect::DiscoverWallets]);

        let (state, effects) = update(state, Event::WalletPicked(WalletChoice::Catalog));
        assert!(!state.selector_open);
        assert_eq!(effects, vec![Effect::SelectWallet(WalletChoice::Catalog)]);

        let (state, effects) = update(state, Event::InstallRequested(WalletKind::Okx.install_url()));
        assert_eq!(effects, vec![Effect::OpenUrl(WalletKind::Okx.install_url())]);

        let state = update(
            state,
            Event::WalletConnected {
                wallet: WalletChoice::Injected(WalletKind::Binance),
                account: "0xabc".into(),
            },
        )
        .0;
        assert!(state.is_connected());

        let (state, _) = update(state, Event::AccountsChanged(vec![]));
        assert!(!state.is_connected());

        let (state, _) = update(state, Event::AccountsChanged(vec!["0xdef".into(), "0x123".into()]));
        assert_eq!(state.account, "0xdef");

        let (state, effects) = update(state, Event::Disconnect);
        assert!(state.wallet.is_none() && state.account.is_empty());
        assert_eq!(effects, vec![Effect::ForgetProvider]);
        Ok(())
    }

    #[test]
    fn status_change_reloads_and_uses_short_dismissal() -> anyhow::Result<()> {
        let (state, effects) = update(
            connected(),
            Event::ChangeStatus { id: "a".into(), action: StatusAction::Reject },
        );
        assert_eq!(
            effects,
            vec![Effect::SetStatus { id: "a".into(), action: StatusAction::Reject }]
        );
        assert_eq!(StatusAction::Reject.status(), RecordStatus::Rejected);

        let (state, effects) = update(state, Event::StatusChanged(StatusAction::Reject));
        let banner = state.banner.ok_or_else(|| anyhow::anyhow!("no banner"))?;
        assert_eq!(banner.message, "FHE rejection completed successfully!");
        assert!(effects.contains(&Effect::DismissBanner { banner: banner.id, after_ms: 2_000 }));
        assert!(effects.contains(&Effect::LoadRecords));
        Ok(())
    }
}
