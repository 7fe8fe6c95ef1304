use crate::{CheckId, DownloadAttempt};

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    StartCheck { check_id: CheckId },
    StartDownload { attempt: DownloadAttempt, version: String },
    Notify(Notification),
    ShowMessage(UserMessage),
    Confirm(ConfirmPrompt),
    /// Fraction in `[0, 1]`; `None` clears the indicator.
    SetTaskProgress(Option<f64>),
    HideWindow,
    ShowWindow,
    /// Let the close proceed to teardown.
    DestroyWindow,
    RelayoutView,
    ReloadView,
    /// Close path of the install sequence; interception is already disarmed.
    CloseWindow,
    QuitAndInstall { version: String },
    InstallOnExit { version: String },
    Quit,
}

/// Outbound messages addressed to the shell renderer.
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    UpdateAvailable {
        version: String,
        release_notes: Option<String>,
    },
    UpdateNotAvailable,
    DownloadProgress { percent: f64 },
    UpdateDownloaded { version: String },
    UpdateError { message: String },
    MaximizeChanged { maximized: bool },
}

impl Notification {
    /// Renderer channel this notification is delivered on.
    pub fn channel(&self) -> &'static str {
        match self {
            Notification::UpdateAvailable { .. } => "update-available",
            Notification::UpdateNotAvailable => "update-not-available",
            Notification::DownloadProgress { .. } => "update-download-progress",
            Notification::UpdateDownloaded { .. } => "update-downloaded",
            Notification::UpdateError { .. } => "update-error",
            Notification::MaximizeChanged { .. } => "maximize-change",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserMessage {
    UpToDate { current_version: String },
    AlreadyDownloading,
    Failed { text: String },
}

impl UserMessage {
    pub fn text(&self) -> String {
        match self {
            UserMessage::UpToDate { current_version } => {
                format!("You are running the latest version (v{current_version}).")
            }
            UserMessage::AlreadyDownloading => "An update is already downloading.".to_string(),
            UserMessage::Failed { text } => text.clone(),
        }
    }
}

/// A non-blocking question; the answer comes back as a separate [`crate::Msg`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmPrompt {
    /// Accept -> `DownloadRequested`, dismiss -> `DownloadDeclined`.
    Download {
        version: String,
        release_notes: Option<String>,
    },
    /// Accept -> `InstallConfirmed`, dismiss -> `InstallDeferred`. Defaults to dismiss.
    Install { version: String },
    /// Accept -> `ReloadConfirmed`, dismiss -> `ReloadDeclined`.
    Reload,
}
