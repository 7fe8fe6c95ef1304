//! Shell core: navigation guard and the pure update/window state machine.
mod effect;
mod failure;
pub mod guard;
mod msg;
mod state;
mod update;
mod view_model;

pub use effect::{ConfirmPrompt, Effect, Notification, UserMessage};
pub use failure::{FailureKind, UpdateFailure};
pub use guard::{
    AllowlistError, Allowlist, MatchMode, NavigationAction, NavigationDecision, NavigationGuard,
    NavigationKind, NavigationRequest,
};
pub use msg::Msg;
pub use state::{
    AppState, CheckId, DownloadAttempt, Phase, ReleaseInfo, ShutdownIntent, UpdateState,
    WindowState,
};
pub use update::update;
pub use view_model::{UpdateView, WindowView};
