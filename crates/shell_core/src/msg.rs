use crate::{CheckId, DownloadAttempt, ReleaseInfo, UpdateFailure};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// Startup timer fired (`manual: false`) or the user asked for a check.
    CheckRequested { manual: bool },
    /// Feed answered a check. `Ok(None)` means the running version is current.
    CheckFinished {
        check_id: CheckId,
        result: Result<Option<ReleaseInfo>, UpdateFailure>,
    },
    /// User accepted the download prompt or clicked the renderer's download button.
    DownloadRequested,
    /// User dismissed the download prompt.
    DownloadDeclined,
    DownloadProgress {
        attempt: DownloadAttempt,
        percent: f64,
    },
    DownloadFinished {
        attempt: DownloadAttempt,
        result: Result<(), UpdateFailure>,
    },
    /// User clicked install in the renderer or tray.
    InstallRequested,
    InstallConfirmed,
    /// User chose "later"; install happens on the next natural exit.
    InstallDeferred,
    /// Reload shortcut swallowed from the embedded content.
    ReloadRequested,
    ReloadConfirmed,
    ReloadDeclined,
    WindowCloseRequested,
    WindowClosed,
    WindowResized { width: u32, height: u32 },
    MaximizeChanged(bool),
    /// Tray double-click or a second instance asked for the window.
    ShowWindowRequested,
    /// Tray "quit".
    QuitRequested,
    /// Host is about to quit for its own reasons.
    BeforeQuit,
}
