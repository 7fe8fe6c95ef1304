use std::sync::{mpsc, Arc, Mutex};
use std::thread;

use serde_json::json;
use shell_core::{Effect, FailureKind, Msg, Notification, ReleaseInfo, UpdateFailure};
use shell_logging::{shell_error, shell_info, shell_warn};
use shell_updater::{
    DownloadedArtifact, FeedError, FeedFailureKind, Installer, UpdaterEvent, UpdaterHandle,
};

use super::host::Host;

/// Executes core effects against the host and the updater.
pub struct EffectRunner {
    updater: Option<UpdaterHandle>,
    installer: Option<Installer>,
    downloaded: Arc<Mutex<Option<DownloadedArtifact>>>,
    msg_tx: mpsc::Sender<Msg>,
    quit_issued: bool,
}

impl EffectRunner {
    pub fn new(
        updater: Option<UpdaterHandle>,
        installer: Option<Installer>,
        msg_tx: mpsc::Sender<Msg>,
    ) -> Self {
        Self {
            updater,
            installer,
            downloaded: Arc::new(Mutex::new(None)),
            msg_tx,
            quit_issued: false,
        }
    }

    pub fn updates_available(&self) -> bool {
        self.updater.is_some()
    }

    pub fn quit_issued(&self) -> bool {
        self.quit_issued
    }

    /// Forwards updater completions into the shell inbox, remembering the last
    /// downloaded artifact for the install step.
    pub fn spawn_event_loop(&self, event_rx: mpsc::Receiver<UpdaterEvent>) {
        let msg_tx = self.msg_tx.clone();
        let downloaded = self.downloaded.clone();
        thread::spawn(move || {
            while let Ok(event) = event_rx.recv() {
                let msg = match event {
                    UpdaterEvent::CheckCompleted { check_id, result } => Msg::CheckFinished {
                        check_id,
                        result: result
                            .map(|manifest| {
                                manifest.map(|manifest| ReleaseInfo {
                                    version: manifest.version,
                                    release_notes: manifest.release_notes,
                                })
                            })
                            .map_err(|err| map_feed_error(&err)),
                    },
                    UpdaterEvent::Progress { attempt, percent } => {
                        Msg::DownloadProgress { attempt, percent }
                    }
                    UpdaterEvent::DownloadCompleted { attempt, result } => {
                        let result = match result {
                            Ok(artifact) => {
                                if let Ok(mut slot) = downloaded.lock() {
                                    *slot = Some(artifact);
                                }
                                Ok(())
                            }
                            Err(err) => Err(map_feed_error(&err)),
                        };
                        Msg::DownloadFinished { attempt, result }
                    }
                };
                if msg_tx.send(msg).is_err() {
                    break;
                }
            }
        });
    }

    pub fn run(&mut self, host: &mut dyn Host, effects: Vec<Effect>) {
        for effect in effects {
            self.run_one(host, effect);
        }
    }

    fn run_one(&mut self, host: &mut dyn Host, effect: Effect) {
        match effect {
            Effect::StartCheck { check_id } => match &self.updater {
                Some(updater) => updater.check(check_id),
                None => {
                    let _ = self.msg_tx.send(Msg::CheckFinished {
                        check_id,
                        result: Err(updates_unavailable()),
                    });
                }
            },
            // The previous artifact stays until a new download succeeds; a
            // deferred install may still need it.
            Effect::StartDownload { attempt, version } => match &self.updater {
                Some(updater) => updater.download(attempt, version),
                None => {
                    let _ = self.msg_tx.send(Msg::DownloadFinished {
                        attempt,
                        result: Err(updates_unavailable()),
                    });
                }
            },
            Effect::Notify(notification) => {
                host.send_to_renderer(notification.channel(), renderer_payload(&notification));
            }
            Effect::ShowMessage(message) => host.show_message(&message.text()),
            Effect::Confirm(prompt) => host.ask(&prompt),
            Effect::SetTaskProgress(progress) => host.set_task_progress(progress),
            Effect::HideWindow => host.hide_window(),
            Effect::ShowWindow => host.show_window(),
            Effect::DestroyWindow | Effect::CloseWindow => host.close_window(),
            Effect::RelayoutView => host.relayout_view(),
            Effect::ReloadView => host.reload_view(),
            Effect::QuitAndInstall { version } => {
                if let Some((installer, artifact)) = self.artifact_for(&version) {
                    shell_info!("Installing {} from {:?} and relaunching", version, artifact.path);
                    if let Err(err) = installer.replace_and_relaunch(&artifact.path) {
                        shell_error!("Install of {} failed: {}", version, err);
                    }
                }
                self.quit(host);
            }
            Effect::InstallOnExit { version } => {
                if let Some((installer, artifact)) = self.artifact_for(&version) {
                    shell_info!("Installing {} on exit from {:?}", version, artifact.path);
                    if let Err(err) = installer.replace(&artifact.path) {
                        shell_error!("Install on exit of {} failed: {}", version, err);
                    }
                }
            }
            Effect::Quit => self.quit(host),
        }
    }

    fn artifact_for(&self, version: &str) -> Option<(Installer, DownloadedArtifact)> {
        let artifact = self
            .downloaded
            .lock()
            .ok()
            .and_then(|slot| slot.clone())
            .filter(|artifact| artifact.version == version);
        match (self.installer.clone(), artifact) {
            (Some(installer), Some(artifact)) => Some((installer, artifact)),
            (None, _) => {
                shell_warn!("No installer available; {} not installed", version);
                None
            }
            (_, None) => {
                shell_warn!("No downloaded artifact for {}; nothing to install", version);
                None
            }
        }
    }

    fn quit(&mut self, host: &mut dyn Host) {
        if !self.quit_issued {
            self.quit_issued = true;
            host.quit();
        }
    }
}

pub fn renderer_payload(notification: &Notification) -> serde_json::Value {
    match notification {
        Notification::UpdateAvailable {
            version,
            release_notes,
        } => json!({ "version": version, "releaseNotes": release_notes }),
        Notification::UpdateNotAvailable => serde_json::Value::Null,
        Notification::DownloadProgress { percent } => json!({ "percent": percent }),
        Notification::UpdateDownloaded { version } => json!({ "version": version }),
        Notification::UpdateError { message } => json!({ "message": message }),
        Notification::MaximizeChanged { maximized } => json!({ "maximized": maximized }),
    }
}

fn map_feed_error(err: &FeedError) -> UpdateFailure {
    let kind = match err.kind {
        FeedFailureKind::FeedUnreachable => FailureKind::FeedUnreachable,
        FeedFailureKind::NetworkDisconnected => FailureKind::NetworkDisconnected,
        FeedFailureKind::DownloadFailed => FailureKind::DownloadFailed,
        FeedFailureKind::InvalidManifest => FailureKind::Generic,
    };
    UpdateFailure::new(kind, err.message.clone())
}

fn updates_unavailable() -> UpdateFailure {
    UpdateFailure::new(FailureKind::Generic, "the update service is not available")
}
