//! Line-oriented host used when no native window toolkit is linked in.
//!
//! Every host call is printed to stdout; stdin lines are parsed into host
//! events, navigations and key presses.

use std::io::{self, BufRead, Write};
use std::sync::mpsc;
use std::thread;

use serde_json::Value;
use shell_core::{ConfirmPrompt, NavigationKind, NavigationRequest};

use super::host::{Host, HostEvent};

#[derive(Default)]
pub struct ConsoleHost {
    pending_prompt: Option<ConfirmPrompt>,
    title: String,
}

impl ConsoleHost {
    pub fn take_prompt(&mut self) -> Option<ConfirmPrompt> {
        self.pending_prompt.take()
    }

    fn print(&self, line: &str) {
        let mut out = io::stdout().lock();
        let _ = writeln!(out, "[{}] {}", self.title, line);
    }
}

impl Host for ConsoleHost {
    fn set_title(&mut self, title: &str) {
        self.title = title.to_string();
    }

    fn show_window(&mut self) {
        self.print("window shown");
    }

    fn hide_window(&mut self) {
        self.print("window hidden to tray");
    }

    fn close_window(&mut self) {
        self.print("window closed");
    }

    fn relayout_view(&mut self) {
        self.print("view resized to window bounds");
    }

    fn load_url(&mut self, url: &str) {
        self.print(&format!("loading {url}"));
    }

    fn reload_view(&mut self) {
        self.print("reloading page");
    }

    fn open_external(&mut self, url: &str) {
        self.print(&format!("opening {url} in the system browser"));
    }

    fn ask(&mut self, prompt: &ConfirmPrompt) {
        let question = match prompt {
            ConfirmPrompt::Download {
                version,
                release_notes,
            } => match release_notes {
                Some(notes) => format!("Version {version} is available.\n{notes}\nDownload now?"),
                None => format!("Version {version} is available. Download now?"),
            },
            ConfirmPrompt::Install { version } => {
                format!("Version {version} is ready. Restart and install now?")
            }
            ConfirmPrompt::Reload => "Reload the page?".to_string(),
        };
        self.print(&format!("{question} [yes/no]"));
        self.pending_prompt = Some(prompt.clone());
    }

    fn show_message(&mut self, text: &str) {
        self.print(text);
    }

    fn set_task_progress(&mut self, progress: Option<f64>) {
        match progress {
            Some(fraction) => self.print(&format!("progress {:.0}%", fraction * 100.0)),
            None => self.print("progress cleared"),
        }
    }

    fn send_to_renderer(&mut self, channel: &str, payload: Value) {
        self.print(&format!("-> {channel} {payload}"));
    }

    fn quit(&mut self) {
        self.print("quitting");
    }
}

/// A parsed stdin command.
#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleInput {
    Event(HostEvent),
    Answer(bool),
    Navigate(NavigationRequest),
    Title(String),
    Key {
        key: String,
        ctrl: bool,
        meta: bool,
        shift: bool,
    },
    Close,
    Unknown(String),
}

pub fn parse_line(line: &str) -> Option<ConsoleInput> {
    let mut parts = line.split_whitespace();
    let command = parts.next()?;
    let rest: Vec<&str> = parts.collect();
    let input = match (command, rest.as_slice()) {
        ("check", []) => ConsoleInput::Event(HostEvent::CheckForUpdates),
        ("download", []) => ConsoleInput::Event(HostEvent::DownloadUpdate),
        ("install", []) => ConsoleInput::Event(HostEvent::InstallUpdate),
        ("yes" | "y", []) => ConsoleInput::Answer(true),
        ("no" | "n", []) => ConsoleInput::Answer(false),
        ("open", [url]) => navigate(NavigationKind::WindowOpen, url),
        ("nav", [url]) => navigate(NavigationKind::WillNavigate, url),
        ("redirect", [url]) => navigate(NavigationKind::Redirect, url),
        ("title", words) if !words.is_empty() => ConsoleInput::Title(words.join(" ")),
        ("key", [chord]) => parse_chord(chord),
        ("resize", [width, height]) => match (width.parse(), height.parse()) {
            (Ok(width), Ok(height)) => {
                ConsoleInput::Event(HostEvent::WindowResized { width, height })
            }
            _ => ConsoleInput::Unknown(line.to_string()),
        },
        ("maximize", []) => ConsoleInput::Event(HostEvent::MaximizeChanged(true)),
        ("restore", []) => ConsoleInput::Event(HostEvent::MaximizeChanged(false)),
        ("close", []) => ConsoleInput::Close,
        ("show", []) => ConsoleInput::Event(HostEvent::TrayShow),
        ("focus", []) => ConsoleInput::Event(HostEvent::SecondInstance),
        ("quit", []) => ConsoleInput::Event(HostEvent::TrayQuit),
        _ => ConsoleInput::Unknown(line.to_string()),
    };
    Some(input)
}

fn navigate(kind: NavigationKind, url: &str) -> ConsoleInput {
    ConsoleInput::Navigate(NavigationRequest::new(kind, url))
}

fn parse_chord(chord: &str) -> ConsoleInput {
    let mut ctrl = false;
    let mut meta = false;
    let mut shift = false;
    let mut key = "";
    for part in chord.split('+') {
        match part.to_ascii_lowercase().as_str() {
            "ctrl" => ctrl = true,
            "cmd" | "meta" => meta = true,
            "shift" => shift = true,
            _ => key = part,
        }
    }
    ConsoleInput::Key {
        key: key.to_string(),
        ctrl,
        meta,
        shift,
    }
}

/// Reads stdin on a background thread; the channel closes at end of input.
pub fn spawn_stdin_reader() -> mpsc::Receiver<ConsoleInput> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if let Some(input) = parse_line(&line) {
                if tx.send(input).is_err() {
                    break;
                }
            }
        }
    });
    rx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands() {
        assert_eq!(
            parse_line("check"),
            Some(ConsoleInput::Event(HostEvent::CheckForUpdates))
        );
        assert_eq!(parse_line("  "), None);
        assert_eq!(
            parse_line("open https://sso.ecnu.edu.cn/login"),
            Some(ConsoleInput::Navigate(NavigationRequest::new(
                NavigationKind::WindowOpen,
                "https://sso.ecnu.edu.cn/login"
            )))
        );
        assert_eq!(
            parse_line("resize 800 600"),
            Some(ConsoleInput::Event(HostEvent::WindowResized {
                width: 800,
                height: 600
            }))
        );
        assert_eq!(
            parse_line("title Hello world"),
            Some(ConsoleInput::Title("Hello world".to_string()))
        );
        assert!(matches!(
            parse_line("resize wide tall"),
            Some(ConsoleInput::Unknown(_))
        ));
    }

    #[test]
    fn parses_key_chords() {
        assert_eq!(
            parse_line("key Ctrl+Shift+R"),
            Some(ConsoleInput::Key {
                key: "R".to_string(),
                ctrl: true,
                meta: false,
                shift: true,
            })
        );
        assert_eq!(
            parse_line("key F5"),
            Some(ConsoleInput::Key {
                key: "F5".to_string(),
                ctrl: false,
                meta: false,
                shift: false,
            })
        );
    }

    #[test]
    fn prompt_is_remembered_until_answered() {
        let mut host = ConsoleHost::default();
        host.ask(&ConfirmPrompt::Reload);
        assert_eq!(host.take_prompt(), Some(ConfirmPrompt::Reload));
        assert_eq!(host.take_prompt(), None);
    }
}
