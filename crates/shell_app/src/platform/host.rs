//! Native collaborators the shell drives but does not implement: the main
//! window, the embedded surface, dialogs, the taskbar and the renderer channel.

use serde_json::Value;
use shell_core::ConfirmPrompt;

pub trait Host {
    fn set_title(&mut self, title: &str);
    fn show_window(&mut self);
    fn hide_window(&mut self);
    /// Closes the main window for good; no close interception applies.
    fn close_window(&mut self);
    fn relayout_view(&mut self);
    /// Loads `url` into the existing embedded surface.
    fn load_url(&mut self, url: &str);
    fn reload_view(&mut self);
    /// Hands `url` to the operating system's default handler.
    fn open_external(&mut self, url: &str);
    /// Non-blocking; the answer is reported later as a [`HostEvent::PromptAnswered`].
    fn ask(&mut self, prompt: &ConfirmPrompt);
    fn show_message(&mut self, text: &str);
    /// Fraction in `[0, 1]`, or `None` to clear the indicator.
    fn set_task_progress(&mut self, progress: Option<f64>);
    fn send_to_renderer(&mut self, channel: &str, payload: Value);
    fn quit(&mut self);
}

/// Inbound events the host reports to the shell.
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    CheckForUpdates,
    DownloadUpdate,
    InstallUpdate,
    PromptAnswered { prompt: ConfirmPrompt, accepted: bool },
    ReloadShortcut,
    WindowResized { width: u32, height: u32 },
    MaximizeChanged(bool),
    WindowClosed,
    TrayShow,
    TrayQuit,
    SecondInstance,
    BeforeQuit,
}

/// How the host must treat a close request on the main window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseDecision {
    HideToTray,
    Proceed,
    /// Window is already gone.
    Ignore,
}
