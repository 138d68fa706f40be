//! Application state and the event dispatcher that drives it.
//!
//! The browser shell owns one [`AppState`], feeds every user action or async
//! completion through [`update`], and executes the returned [`Effect`]s.
//! Nothing in here touches the DOM, a wallet, or the contract.
//! Extend by adding an [`Event`] variant and its arm in `update`.

mod update;

pub use update::update;

use at_api_types::{Record, RecordInput, RecordStats, RecordStatus, WalletChoice};
use at_storage::StoreError;

pub const SUCCESS_DISMISS_MS: u32 = 2_000;
pub const NOTICE_DISMISS_MS: u32 = 3_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerKind {
    Pending,
    Success,
    Error,
}

impl BannerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BannerKind::Pending => "pending",
            BannerKind::Success => "success",
            BannerKind::Error => "error",
        }
    }
}

/// Transaction status overlay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    pub id: u64,
    pub kind: BannerKind,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalletOption {
    pub choice: WalletChoice,
    pub installed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusAction {
    Analyze,
    Reject,
}

impl StatusAction {
    pub fn status(&self) -> RecordStatus {
        match self {
            StatusAction::Analyze => RecordStatus::Analyzed,
            StatusAction::Reject => RecordStatus::Rejected,
        }
    }

    fn pending_message(&self) -> &'static str {
        match self {
            StatusAction::Analyze => "Analyzing encrypted air traffic data with FHE...",
            StatusAction::Reject => "Processing encrypted air traffic data with FHE...",
        }
    }

    fn success_message(&self) -> &'static str {
        match self {
            StatusAction::Analyze => "FHE analysis completed successfully!",
            StatusAction::Reject => "FHE rejection completed successfully!",
        }
    }

    fn failure_prefix(&self) -> &'static str {
        match self {
            StatusAction::Analyze => "Analysis failed",
            StatusAction::Reject => "Rejection failed",
        }
    }
}

/// What the shell needs to know about a failed store operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub user_rejected: bool,
    pub message: String,
}

impl Failure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            user_rejected: false,
            message: message.into(),
        }
    }

    pub fn user_rejected() -> Self {
        Self {
            user_rejected: true,
            message: String::new(),
        }
    }

    fn describe(&self, prefix: &str) -> String {
        if self.user_rejected {
            return "Transaction rejected by user".to_owned();
        }
        let detail = if self.message.is_empty() {
            "Unknown error"
        } else {
            self.message.as_str()
        };
        format!("{prefix}: {detail}")
    }
}

impl From<&StoreError> for Failure {
    fn from(err: &StoreError) -> Self {
        Self {
            user_rejected: err.is_user_rejected(),
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    pub account: String,
    pub wallet: Option<WalletChoice>,
    pub wallets: Vec<WalletOption>,
    pub records: Vec<Record>,
    pub loading: bool,
    pub refreshing: bool,
    pub creating: bool,
    pub form: RecordInput,
    pub show_create: bool,
    pub selector_open: bool,
    pub catalog_open: bool,
    pub banner: Option<Banner>,
    pub show_tutorial: bool,
    pub show_stats: bool,
    next_banner: u64,
    form_reset_on: Option<u64>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            account: String::new(),
            wallet: None,
            wallets: Vec::new(),
            records: Vec::new(),
            loading: true,
            refreshing: false,
            creating: false,
            form: RecordInput::default(),
            show_create: false,
            selector_open: false,
            catalog_open: false,
            banner: None,
            show_tutorial: false,
            show_stats: true,
            next_banner: 1,
            form_reset_on: None,
        }
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// A wallet was picked and it handed out an account.
    pub fn is_connected(&self) -> bool {
        self.wallet.is_some() && !self.account.is_empty()
    }

    pub fn stats(&self) -> RecordStats {
        RecordStats::from_records(&self.records)
    }

    fn show_banner(&mut self, kind: BannerKind, message: impl Into<String>) -> u64 {
        let id = self.next_banner;
        self.next_banner += 1;
        self.banner = Some(Banner {
            id,
            kind,
            message: message.into(),
        });
        id
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Init,
    RecordsLoaded(Vec<Record>),
    Refresh,
    CheckAvailability,
    AvailabilityChecked(bool),
    OpenWalletSelector,
    CloseWalletSelector,
    WalletsDiscovered(Vec<WalletOption>),
    WalletPicked(WalletChoice),
    CatalogOpened,
    CatalogClosed,
    InstallRequested(&'static str),
    WalletConnected { wallet: WalletChoice, account: String },
    ConnectFailed,
    AccountsChanged(Vec<String>),
    Disconnect,
    OpenCreateForm,
    CloseCreateForm,
    FormChanged(at_api_types::RecordField, String),
    Submit,
    RecordCreated(Record),
    CreateFailed(Failure),
    ChangeStatus { id: String, action: StatusAction },
    StatusChanged(StatusAction),
    StatusChangeFailed { action: StatusAction, failure: Failure },
    BannerExpired(u64),
    ToggleTutorial,
    ToggleStats,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    LoadRecords,
    CheckAvailability,
    DiscoverWallets,
    SelectWallet(WalletChoice),
    CreateRecord(RecordInput),
    SetStatus { id: String, action: StatusAction },
    OpenUrl(&'static str),
    ForgetProvider,
    DismissBanner { banner: u64, after_ms: u32 },
}
