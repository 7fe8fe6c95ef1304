//! Host double that records every call in order.

use serde_json::Value;
use shell_core::ConfirmPrompt;

use super::host::Host;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Title(String),
    Show,
    Hide,
    Close,
    Relayout,
    Load(String),
    Reload,
    External(String),
    Ask(ConfirmPrompt),
    Message(String),
    Progress(Option<f64>),
    Renderer(String, Value),
    Quit,
}

#[derive(Default)]
pub struct RecordingHost {
    pub calls: Vec<Call>,
}

impl Host for RecordingHost {
    fn set_title(&mut self, title: &str) {
        self.calls.push(Call::Title(title.to_string()));
    }
    fn show_window(&mut self) {
        self.calls.push(Call::Show);
    }
    fn hide_window(&mut self) {
        self.calls.push(Call::Hide);
    }
    fn close_window(&mut self) {
        self.calls.push(Call::Close);
    }
    fn relayout_view(&mut self) {
        self.calls.push(Call::Relayout);
    }
    fn load_url(&mut self, url: &str) {
        self.calls.push(Call::Load(url.to_string()));
    }
    fn reload_view(&mut self) {
        self.calls.push(Call::Reload);
    }
    fn open_external(&mut self, url: &str) {
        self.calls.push(Call::External(url.to_string()));
    }
    fn ask(&mut self, prompt: &ConfirmPrompt) {
        self.calls.push(Call::Ask(prompt.clone()));
    }
    fn show_message(&mut self, text: &str) {
        self.calls.push(Call::Message(text.to_string()));
    }
    fn set_task_progress(&mut self, progress: Option<f64>) {
        self.calls.push(Call::Progress(progress));
    }
    fn send_to_renderer(&mut self, channel: &str, payload: Value) {
        self.calls.push(Call::Renderer(channel.to_string(), payload));
    }
    fn quit(&mut self) {
        self.calls.push(Call::Quit);
    }
}
