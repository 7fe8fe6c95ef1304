mod app;
mod config;
mod console;
mod effects;
mod host;
mod logging;
#[cfg(test)]
mod recording_host;

use std::sync::{mpsc, Arc};
use std::time::Duration;

use anyhow::Context;
use shell_core::guard::KeyChord;
use shell_core::Msg;
use shell_logging::{shell_error, shell_info, shell_warn};
use shell_updater::{
    ensure_download_dir, was_just_updated, FeedSettings, Installer, ReqwestFeed, UpdaterHandle,
};

use app::Shell;
use config::{config_path, load_config, ShellConfig};
use console::{ConsoleHost, ConsoleInput};
use effects::EffectRunner;
use host::{CloseDecision, HostEvent};

const CURRENT_VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn run_app() -> anyhow::Result<()> {
    logging::initialize(logging::LogDestination::from_env());
    shell_info!("Starting shell v{}", CURRENT_VERSION);

    let config = load_config(&config_path());

    let installer = match Installer::for_current_exe() {
        Ok(installer) => {
            if was_just_updated(std::env::args()) {
                shell_info!("Relaunched after an update");
            }
            installer.cleanup_previous();
            Some(installer)
        }
        Err(err) => {
            shell_warn!("Self-install disabled: {}", err);
            None
        }
    };

    let (msg_tx, msg_rx) = Shell::<ConsoleHost>::channel();
    let runner = build_runner(&config, installer, msg_tx.clone());
    let mut shell = Shell::new(
        ConsoleHost::default(),
        &config,
        CURRENT_VERSION,
        runner,
        (msg_tx, msg_rx),
    )
    .context("invalid shell configuration")?;
    shell.start();

    let input_rx = console::spawn_stdin_reader();
    let tick = Duration::from_millis(50);
    while !shell.is_finished() {
        match input_rx.recv_timeout(tick) {
            Ok(input) => handle_console_input(&mut shell, input),
            Err(mpsc::RecvTimeoutError::Timeout) => {}
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                shell.handle_event(HostEvent::BeforeQuit);
                break;
            }
        }
        shell.process_pending_messages();
    }

    shell_info!(
        "Shell exiting (update phase {:?})",
        shell.state().update_state().phase()
    );
    Ok(())
}

/// Wires the feed, the updater runtime and the event forwarder. Any failure
/// leaves the shell running without updates.
fn build_runner(
    config: &ShellConfig,
    installer: Option<Installer>,
    msg_tx: mpsc::Sender<Msg>,
) -> EffectRunner {
    let updater = match spawn_updater(config) {
        Ok(parts) => Some(parts),
        Err(err) => {
            shell_error!("Updater unavailable: {:#}", err);
            None
        }
    };
    match updater {
        Some((handle, event_rx)) => {
            let runner = EffectRunner::new(Some(handle), installer, msg_tx);
            runner.spawn_event_loop(event_rx);
            runner
        }
        None => EffectRunner::new(None, installer, msg_tx),
    }
}

fn spawn_updater(
    config: &ShellConfig,
) -> anyhow::Result<(UpdaterHandle, mpsc::Receiver<shell_updater::UpdaterEvent>)> {
    let feed_url = config.feed_url()?;
    let download_dir = config.download_dir();
    ensure_download_dir(&download_dir)?;
    let mut settings = FeedSettings::new(feed_url, CURRENT_VERSION, download_dir);
    settings.allow_prerelease = config.allow_prerelease;
    let feed = ReqwestFeed::new(settings)?;
    let (event_tx, event_rx) = mpsc::channel();
    let handle = UpdaterHandle::spawn(Arc::new(feed), event_tx)
        .context("failed to start the updater runtime")?;
    Ok((handle, event_rx))
}

fn handle_console_input(shell: &mut Shell<ConsoleHost>, input: ConsoleInput) {
    match input {
        ConsoleInput::Event(event) => shell.handle_event(event),
        ConsoleInput::Answer(accepted) => match shell.host_mut().take_prompt() {
            Some(prompt) => shell.handle_event(HostEvent::PromptAnswered { prompt, accepted }),
            None => println!("nothing to answer"),
        },
        ConsoleInput::Navigate(request) => {
            let action = shell.handle_navigation(&request);
            println!("{:?}", action);
        }
        ConsoleInput::Title(title) => {
            shell.handle_title_update(&title);
        }
        ConsoleInput::Key {
            key,
            ctrl,
            meta,
            shift,
        } => {
            let chord = KeyChord {
                key: &key,
                ctrl,
                meta,
                shift,
            };
            if !shell.handle_key(&chord) {
                println!("key passed to page");
            }
        }
        ConsoleInput::Close => match shell.handle_close_request() {
            CloseDecision::Proceed => shell.handle_event(HostEvent::WindowClosed),
            CloseDecision::HideToTray | CloseDecision::Ignore => {}
        },
        ConsoleInput::Unknown(line) => println!("unknown command: {line}"),
    }
}
