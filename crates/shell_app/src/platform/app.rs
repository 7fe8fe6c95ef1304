use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use shell_core::guard::{is_reload_shortcut, window_title, KeyChord};
use shell_core::{
    update, AppState, ConfirmPrompt, Effect, Msg, NavigationAction, NavigationGuard,
    NavigationRequest,
};
use shell_logging::{shell_debug, shell_info, NAVIGATION_TARGET};

use super::config::{ConfigError, ShellConfig};
use super::effects::EffectRunner;
use super::host::{CloseDecision, Host, HostEvent};

/// Owns the application state and routes host events through the core.
pub struct Shell<H: Host> {
    host: H,
    state: AppState,
    guard: NavigationGuard,
    title: String,
    home_url: String,
    suppress_reload_shortcuts: bool,
    startup_check: Option<Duration>,
    runner: EffectRunner,
    msg_rx: mpsc::Receiver<Msg>,
    msg_tx: mpsc::Sender<Msg>,
}

impl<H: Host> Shell<H> {
    /// `runner` must have been built around the sender returned by [`Shell::channel`].
    pub fn new(
        host: H,
        config: &ShellConfig,
        current_version: &str,
        runner: EffectRunner,
        channel: (mpsc::Sender<Msg>, mpsc::Receiver<Msg>),
    ) -> Result<Self, ConfigError> {
        let guard = NavigationGuard::new(config.allowlist()?);
        let home_url = config.home_url()?.to_string();
        let startup_check = (config.auto_check_on_startup && runner.updates_available())
            .then(|| Duration::from_millis(config.startup_check_delay_ms));
        let (msg_tx, msg_rx) = channel;
        Ok(Self {
            host,
            state: AppState::new(current_version),
            guard,
            title: window_title(&config.app_name, current_version),
            home_url,
            suppress_reload_shortcuts: config.suppress_reload_shortcuts,
            startup_check,
            runner,
            msg_rx,
            msg_tx,
        })
    }

    pub fn channel() -> (mpsc::Sender<Msg>, mpsc::Receiver<Msg>) {
        mpsc::channel()
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    #[cfg(test)]
    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// True once the shell has asked the host to quit.
    pub fn is_finished(&self) -> bool {
        self.runner.quit_issued()
    }

    /// Fixes the title, loads the home page and arms the delayed update check.
    pub fn start(&mut self) {
        self.host.set_title(&self.title);
        self.host.load_url(&self.home_url);
        if let Some(delay) = self.startup_check {
            let msg_tx = self.msg_tx.clone();
            thread::spawn(move || {
                thread::sleep(delay);
                let _ = msg_tx.send(Msg::CheckRequested { manual: false });
            });
        }
    }

    pub fn handle_event(&mut self, event: HostEvent) {
        let msg = match event {
            HostEvent::CheckForUpdates => Msg::CheckRequested { manual: true },
            HostEvent::DownloadUpdate => Msg::DownloadRequested,
            HostEvent::InstallUpdate => Msg::InstallRequested,
            HostEvent::PromptAnswered { prompt, accepted } => prompt_answer(&prompt, accepted),
            HostEvent::ReloadShortcut => Msg::ReloadRequested,
            HostEvent::WindowResized { width, height } => Msg::WindowResized { width, height },
            HostEvent::MaximizeChanged(maximized) => Msg::MaximizeChanged(maximized),
            HostEvent::WindowClosed => Msg::WindowClosed,
            HostEvent::TrayShow | HostEvent::SecondInstance => Msg::ShowWindowRequested,
            HostEvent::TrayQuit => Msg::QuitRequested,
            HostEvent::BeforeQuit => Msg::BeforeQuit,
        };
        self.dispatch_msg(msg);
        self.process_pending_messages();
    }

    /// Decides a navigation synchronously. For `LoadInPlace` and `OpenExternal`
    /// the host has already been told what to do and must cancel its default.
    pub fn handle_navigation(&mut self, request: &NavigationRequest) -> NavigationAction {
        let action = self.guard.decide(request);
        match &action {
            NavigationAction::Proceed => {}
            NavigationAction::LoadInPlace(url) => self.host.load_url(url),
            NavigationAction::OpenExternal(url) => {
                shell_info!(target: NAVIGATION_TARGET, "Opening {} externally", url);
                self.host.open_external(url);
            }
        }
        action
    }

    /// Runs the close interception synchronously so the host can veto the close.
    pub fn handle_close_request(&mut self) -> CloseDecision {
        let effects = self.apply(Msg::WindowCloseRequested);
        let decision = if effects.contains(&Effect::HideWindow) {
            CloseDecision::HideToTray
        } else if effects.contains(&Effect::DestroyWindow) {
            CloseDecision::Proceed
        } else {
            CloseDecision::Ignore
        };
        // The host is already closing; it only needs to be told to hide.
        let rest = effects
            .into_iter()
            .filter(|effect| *effect != Effect::DestroyWindow)
            .collect();
        self.runner.run(&mut self.host, rest);
        decision
    }

    /// Page-supplied titles never stick. Returns false to suppress the update.
    pub fn handle_title_update(&mut self, proposed: &str) -> bool {
        if proposed != self.title {
            shell_debug!("Suppressing page title {:?}", proposed);
        }
        self.host.set_title(&self.title);
        false
    }

    /// Returns true when the key press was consumed and must not reach the page.
    pub fn handle_key(&mut self, chord: &KeyChord<'_>) -> bool {
        if !self.suppress_reload_shortcuts || !is_reload_shortcut(chord) {
            return false;
        }
        self.handle_event(HostEvent::ReloadShortcut);
        true
    }

    pub fn process_pending_messages(&mut self) {
        let inbox: Vec<Msg> = self.msg_rx.try_iter().collect();
        for msg in inbox {
            self.dispatch_msg(msg);
        }
    }

    fn dispatch_msg(&mut self, msg: Msg) {
        let effects = self.apply(msg);
        self.runner.run(&mut self.host, effects);
    }

    fn apply(&mut self, msg: Msg) -> Vec<Effect> {
        shell_debug!("Dispatching {:?}", msg);
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        if state.consume_dirty() {
            let view = state.view();
            shell_debug!("State changed: {:?}", view);
        }
        self.state = state;
        effects
    }
}

fn prompt_answer(prompt: &ConfirmPrompt, accepted: bool) -> Msg {
    match (prompt, accepted) {
        (ConfirmPrompt::Download { .. }, true) => Msg::DownloadRequested,
        (ConfirmPrompt::Download { .. }, false) => Msg::DownloadDeclined,
        (ConfirmPrompt::Install { .. }, true) => Msg::InstallConfirmed,
        (ConfirmPrompt::Install { .. }, false) => Msg::InstallDeferred,
        (ConfirmPrompt::Reload, true) => Msg::ReloadConfirmed,
        (ConfirmPrompt::Reload, false) => Msg::ReloadDeclined,
    }
}
