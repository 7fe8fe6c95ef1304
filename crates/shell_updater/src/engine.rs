use std::sync::{mpsc, Arc, Mutex};
use std::thread;

use shell_logging::{shell_debug, shell_warn, UPDATE_TARGET};

use crate::feed::{ChannelProgressSink, UpdateFeed};
use crate::{CheckId, DownloadAttempt, FeedError, FeedFailureKind, Manifest, UpdaterEvent};

enum UpdaterCommand {
    Check { check_id: CheckId },
    Download { attempt: DownloadAttempt, version: String },
}

/// Runs feed requests on a private tokio runtime and reports completions on
/// the event channel handed to [`UpdaterHandle::spawn`].
pub struct UpdaterHandle {
    cmd_tx: mpsc::Sender<UpdaterCommand>,
}

impl UpdaterHandle {
    pub fn spawn(
        feed: Arc<dyn UpdateFeed>,
        event_tx: mpsc::Sender<UpdaterEvent>,
    ) -> std::io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("shell-updater")
            .enable_all()
            .build()?;
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let latest: Arc<Mutex<Option<Manifest>>> = Arc::new(Mutex::new(None));

        thread::Builder::new()
            .name("shell-updater-commands".to_string())
            .spawn(move || {
                while let Ok(command) = cmd_rx.recv() {
                    let feed = feed.clone();
                    let event_tx = event_tx.clone();
                    let latest = latest.clone();
                    runtime.spawn(async move {
                        handle_command(feed.as_ref(), command, &latest, event_tx).await;
                    });
                }
                shell_debug!(target: UPDATE_TARGET, "updater command channel closed");
            })?;

        Ok(Self { cmd_tx })
    }

    pub fn check(&self, check_id: CheckId) {
        let _ = self.cmd_tx.send(UpdaterCommand::Check { check_id });
    }

    pub fn download(&self, attempt: DownloadAttempt, version: impl Into<String>) {
        let _ = self.cmd_tx.send(UpdaterCommand::Download {
            attempt,
            version: version.into(),
        });
    }
}

async fn handle_command(
    feed: &dyn UpdateFeed,
    command: UpdaterCommand,
    latest: &Mutex<Option<Manifest>>,
    event_tx: mpsc::Sender<UpdaterEvent>,
) {
    match command {
        UpdaterCommand::Check { check_id } => {
            let result = feed.check().await;
            if let Ok(Some(manifest)) = &result {
                if let Ok(mut guard) = latest.lock() {
                    *guard = Some(manifest.clone());
                }
            }
            let _ = event_tx.send(UpdaterEvent::CheckCompleted { check_id, result });
        }
        UpdaterCommand::Download { attempt, version } => {
            let manifest = latest
                .lock()
                .ok()
                .and_then(|guard| guard.clone())
                .filter(|manifest| manifest.version == version);
            let result = match manifest {
                Some(manifest) => {
                    let sink = ChannelProgressSink::new(event_tx.clone());
                    feed.download(attempt, &manifest, &sink).await
                }
                None => {
                    shell_warn!(target: UPDATE_TARGET, "no manifest known for version {}", version);
                    Err(FeedError::new(
                        FeedFailureKind::DownloadFailed,
                        format!("no release information for version {version}"),
                    ))
                }
            };
            let _ = event_tx.send(UpdaterEvent::DownloadCompleted { attempt, result });
        }
    }
}
