use crate::view_model::{UpdateView, WindowView};
use crate::UpdateFailure;

pub type CheckId = u64;
pub type DownloadAttempt = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Checking,
    Available,
    Downloading,
    Downloaded,
    Installing,
    Error,
}

/// What the feed reported for a newer release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseInfo {
    pub version: String,
    pub release_notes: Option<String>,
}

impl ReleaseInfo {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            release_notes: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct UpdateState {
    phase: Phase,
    release: Option<ReleaseInfo>,
    progress_percent: Option<f64>,
    last_error: Option<UpdateFailure>,
    triggered_manually: bool,
    in_flight_check: Option<CheckId>,
    next_check_id: CheckId,
    download_attempt: DownloadAttempt,
    pending_install: Option<String>,
    exit_install_scheduled: bool,
}

impl UpdateState {
    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn version(&self) -> Option<&str> {
        self.release.as_ref().map(|release| release.version.as_str())
    }

    pub fn release(&self) -> Option<&ReleaseInfo> {
        self.release.as_ref()
    }

    pub fn progress_percent(&self) -> Option<f64> {
        self.progress_percent
    }

    pub fn last_error(&self) -> Option<&UpdateFailure> {
        self.last_error.as_ref()
    }

    pub fn triggered_manually(&self) -> bool {
        self.triggered_manually
    }

    pub fn in_flight_check(&self) -> Option<CheckId> {
        self.in_flight_check
    }

    pub fn download_attempt(&self) -> DownloadAttempt {
        self.download_attempt
    }

    pub fn pending_install(&self) -> Option<&str> {
        self.pending_install.as_deref()
    }

    pub(crate) fn begin_check(&mut self, manual: bool) -> CheckId {
        self.next_check_id += 1;
        let check_id = self.next_check_id;
        self.phase = Phase::Checking;
        self.triggered_manually = manual;
        self.in_flight_check = Some(check_id);
        self.last_error = None;
        check_id
    }

    /// A manual request joining an automatic check makes its result visible.
    pub(crate) fn escalate_to_manual(&mut self) {
        self.triggered_manually = true;
    }

    pub(crate) fn finish_check(&mut self) {
        self.in_flight_check = None;
    }

    pub(crate) fn set_available(&mut self, release: ReleaseInfo) {
        self.phase = Phase::Available;
        self.release = Some(release);
        self.progress_percent = None;
    }

    pub(crate) fn begin_download(&mut self) -> DownloadAttempt {
        self.download_attempt += 1;
        self.phase = Phase::Downloading;
        self.progress_percent = Some(0.0);
        self.download_attempt
    }

    /// Returns the stored value when it moved forward.
    pub(crate) fn advance_progress(&mut self, percent: f64) -> Option<f64> {
        if !percent.is_finite() {
            return None;
        }
        let percent = percent.clamp(0.0, 100.0);
        match self.progress_percent {
            Some(current) if percent <= current => None,
            _ => {
                self.progress_percent = Some(percent);
                Some(percent)
            }
        }
    }

    /// A fresh download supersedes any install deferred earlier.
    pub(crate) fn set_downloaded(&mut self) {
        self.phase = Phase::Downloaded;
        self.progress_percent = None;
        self.pending_install = None;
    }

    /// Returns to `Downloaded` when the feed offers the release already on disk.
    pub(crate) fn resume_deferred(&mut self, release: &ReleaseInfo) -> bool {
        if self.pending_install.as_deref() != Some(release.version.as_str()) {
            return false;
        }
        self.phase = Phase::Downloaded;
        self.release = Some(release.clone());
        self.progress_percent = None;
        true
    }

    pub(crate) fn set_installing(&mut self) {
        self.phase = Phase::Installing;
        self.pending_install = None;
    }

    pub(crate) fn defer_install(&mut self) {
        self.pending_install = self.release.take().map(|release| release.version);
        self.reset_idle();
    }

    /// Hands out the version to install on exit at most once per run.
    pub(crate) fn take_install_on_exit(&mut self) -> Option<String> {
        if self.exit_install_scheduled {
            return None;
        }
        let version = match self.pending_install.take() {
            Some(version) => Some(version),
            None if self.phase == Phase::Downloaded => self.version().map(ToOwned::to_owned),
            None => None,
        };
        self.exit_install_scheduled = version.is_some();
        version
    }

    pub(crate) fn reset_idle(&mut self) {
        self.phase = Phase::Idle;
        self.release = None;
        self.progress_percent = None;
    }

    pub(crate) fn set_error(&mut self, failure: UpdateFailure) {
        self.phase = Phase::Error;
        self.release = None;
        self.progress_percent = None;
        self.last_error = Some(failure);
    }
}

/// Set-once quit flag; once set, window closes are never turned into hides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ShutdownIntent(bool);

impl ShutdownIntent {
    pub fn is_set(self) -> bool {
        self.0
    }

    pub(crate) fn set(&mut self) {
        self.0 = true;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowState {
    close_interception_armed: bool,
    maximized: bool,
    visible: bool,
    open: bool,
}

impl Default for WindowState {
    fn default() -> Self {
        Self {
            close_interception_armed: true,
            maximized: false,
            visible: true,
            open: true,
        }
    }
}

impl WindowState {
    pub fn close_interception_armed(&self) -> bool {
        self.close_interception_armed
    }

    pub fn maximized(&self) -> bool {
        self.maximized
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn open(&self) -> bool {
        self.open
    }

    pub(crate) fn disarm_close_interception(&mut self) {
        self.close_interception_armed = false;
    }

    pub(crate) fn set_maximized(&mut self, maximized: bool) {
        self.maximized = maximized;
    }

    pub(crate) fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub(crate) fn mark_closed(&mut self) {
        self.open = false;
        self.visible = false;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    current_version: String,
    update: UpdateState,
    shutdown: ShutdownIntent,
    window: WindowState,
    dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new("0.0.0")
    }
}

impl AppState {
    pub fn new(current_version: impl Into<String>) -> Self {
        Self {
            current_version: current_version.into(),
            update: UpdateState::default(),
            shutdown: ShutdownIntent::default(),
            window: WindowState::default(),
            dirty: false,
        }
    }

    pub fn current_version(&self) -> &str {
        &self.current_version
    }

    pub fn update_state(&self) -> &UpdateState {
        &self.update
    }

    pub fn shutdown_intent(&self) -> ShutdownIntent {
        self.shutdown
    }

    pub fn window(&self) -> &WindowState {
        &self.window
    }

    pub fn view(&self) -> UpdateView {
        UpdateView {
            phase: self.update.phase,
            version: self.update.version().map(ToOwned::to_owned),
            progress_percent: self.update.progress_percent,
            last_error: self.update.last_error.as_ref().map(UpdateFailure::user_message),
            triggered_manually: self.update.triggered_manually,
            pending_install: self.update.pending_install.clone(),
            window: WindowView {
                maximized: self.window.maximized,
                visible: self.window.visible,
                quitting: self.shutdown.is_set(),
            },
            dirty: self.dirty,
        }
    }

    /// Returns whether anything visible changed since the last call.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn update_mut(&mut self) -> &mut UpdateState {
        &mut self.update
    }

    pub(crate) fn window_mut(&mut self) -> &mut WindowState {
        &mut self.window
    }

    pub(crate) fn set_quitting(&mut self) {
        self.shutdown.set();
    }
}
