use std::error::Error as _;
use std::path::PathBuf;
use std::time::Duration;

use futures_util::StreamExt;
use sha2::{Digest, Sha256};
use shell_logging::{shell_debug, shell_info, UPDATE_TARGET};
use url::Url;

use crate::persist::ArtifactWriter;
use crate::{
    DownloadAttempt, DownloadedArtifact, FeedError, FeedFailureKind, Manifest, UpdaterEvent,
};

#[derive(Debug, Clone)]
pub struct FeedSettings {
    pub feed_url: Url,
    pub current_version: String,
    pub allow_prerelease: bool,
    pub download_dir: PathBuf,
    pub connect_timeout: Duration,
    /// Applies to the manifest request only; downloads run until done or failed.
    pub check_timeout: Duration,
    pub user_agent: String,
}

impl FeedSettings {
    pub fn new(feed_url: Url, current_version: impl Into<String>, download_dir: PathBuf) -> Self {
        Self {
            feed_url,
            current_version: current_version.into(),
            allow_prerelease: true,
            download_dir,
            connect_timeout: Duration::from_secs(10),
            check_timeout: Duration::from_secs(30),
            user_agent: "kiosk-shell-updater".to_string(),
        }
    }
}

pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: UpdaterEvent);
}

pub struct ChannelProgressSink {
    tx: std::sync::mpsc::Sender<UpdaterEvent>,
}

impl ChannelProgressSink {
    pub fn new(tx: std::sync::mpsc::Sender<UpdaterEvent>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelProgressSink {
    fn emit(&self, event: UpdaterEvent) {
        let _ = self.tx.send(event);
    }
}

#[async_trait::async_trait]
pub trait UpdateFeed: Send + Sync {
    /// `Ok(None)` when the feed's version is not newer than the running one.
    async fn check(&self) -> Result<Option<Manifest>, FeedError>;

    async fn download(
        &self,
        attempt: DownloadAttempt,
        manifest: &Manifest,
        sink: &dyn ProgressSink,
    ) -> Result<DownloadedArtifact, FeedError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestFeed {
    settings: FeedSettings,
    client: reqwest::Client,
}

impl ReqwestFeed {
    pub fn new(settings: FeedSettings) -> Result<Self, FeedError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .user_agent(settings.user_agent.clone())
            .build()
            .map_err(|err| FeedError::new(FeedFailureKind::FeedUnreachable, err.to_string()))?;
        Ok(Self { settings, client })
    }

    pub fn settings(&self) -> &FeedSettings {
        &self.settings
    }
}

#[async_trait::async_trait]
impl UpdateFeed for ReqwestFeed {
    async fn check(&self) -> Result<Option<Manifest>, FeedError> {
        let response = self
            .client
            .get(self.settings.feed_url.clone())
            .timeout(self.settings.check_timeout)
            .send()
            .await
            .map_err(|err| map_reqwest_error(&err, FeedFailureKind::FeedUnreachable))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::new(
                FeedFailureKind::FeedUnreachable,
                format!("feed answered {status}"),
            ));
        }

        let body = response
            .bytes()
            .await
            .map_err(|err| map_reqwest_error(&err, FeedFailureKind::FeedUnreachable))?;
        let manifest = Manifest::parse(&body)?;

        if manifest.is_newer_than(&self.settings.current_version, self.settings.allow_prerelease)? {
            shell_info!(
                target: UPDATE_TARGET,
                "feed offers {} (running {})",
                manifest.version,
                self.settings.current_version
            );
            Ok(Some(manifest))
        } else {
            shell_debug!(
                target: UPDATE_TARGET,
                "feed version {} is not newer than {}",
                manifest.version,
                self.settings.current_version
            );
            Ok(None)
        }
    }

    async fn download(
        &self,
        attempt: DownloadAttempt,
        manifest: &Manifest,
        sink: &dyn ProgressSink,
    ) -> Result<DownloadedArtifact, FeedError> {
        let url = manifest.artifact_url(&self.settings.feed_url)?;
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|err| map_reqwest_error(&err, FeedFailureKind::DownloadFailed))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::new(
                FeedFailureKind::DownloadFailed,
                format!("artifact request answered {status}"),
            ));
        }

        let total = response.content_length().or(manifest.size).filter(|len| *len > 0);
        let mut writer = ArtifactWriter::create(&self.settings.download_dir).map_err(download_io)?;
        let mut hasher = Sha256::new();
        let mut received: u64 = 0;
        let mut last_percent = 0.0;

        sink.emit(UpdaterEvent::Progress {
            attempt,
            percent: 0.0,
        });

        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk =
                chunk.map_err(|err| map_reqwest_error(&err, FeedFailureKind::DownloadFailed))?;
            hasher.update(&chunk);
            writer.write_chunk(&chunk).map_err(download_io)?;
            received += chunk.len() as u64;

            if let Some(total) = total {
                let percent = ((received as f64 / total as f64) * 100.0).min(100.0);
                // Whole-percent steps keep the renderer channel quiet.
                if percent.floor() > last_percent {
                    last_percent = percent.floor();
                    sink.emit(UpdaterEvent::Progress {
                        attempt,
                        percent: last_percent,
                    });
                }
            }
        }

        if let Some(expected) = manifest.size {
            if expected != received {
                return Err(FeedError::new(
                    FeedFailureKind::DownloadFailed,
                    format!("size mismatch: expected {expected} bytes, got {received}"),
                ));
            }
        }

        let digest = to_hex(&hasher.finalize());
        if let Some(expected) = manifest.sha256.as_deref() {
            if !expected.trim().eq_ignore_ascii_case(&digest) {
                return Err(FeedError::new(
                    FeedFailureKind::DownloadFailed,
                    "checksum mismatch",
                ));
            }
        }

        let path = writer
            .finish(&manifest.file_name(&self.settings.feed_url))
            .map_err(download_io)?;
        if last_percent < 100.0 {
            sink.emit(UpdaterEvent::Progress {
                attempt,
                percent: 100.0,
            });
        }
        shell_info!(
            target: UPDATE_TARGET,
            "downloaded {} ({} bytes) to {:?}",
            manifest.version,
            received,
            path
        );

        Ok(DownloadedArtifact {
            version: manifest.version.clone(),
            path,
            sha256: digest,
            byte_len: received,
        })
    }
}

fn download_io(err: crate::PersistError) -> FeedError {
    FeedError::new(FeedFailureKind::DownloadFailed, err.to_string())
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|byte| format!("{byte:02x}")).collect()
}

/// Connection-level failures are split by whether the name could be resolved
/// at all; everything else keeps the stage's own kind.
fn map_reqwest_error(err: &reqwest::Error, stage_kind: FeedFailureKind) -> FeedError {
    let message = error_chain(err);
    if err.is_connect() {
        return FeedError::new(classify_connect_failure(&message), message);
    }
    if err.is_timeout() {
        return FeedError::new(FeedFailureKind::FeedUnreachable, message);
    }
    FeedError::new(stage_kind, message)
}

pub(crate) fn classify_connect_failure(message: &str) -> FeedFailureKind {
    let lower = message.to_ascii_lowercase();
    let offline_markers = [
        "dns error",
        "failed to lookup address",
        "name or service not known",
        "no such host",
        "temporary failure in name resolution",
        "network is unreachable",
        "nodename nor servname",
    ];
    if offline_markers.iter().any(|marker| lower.contains(marker)) {
        FeedFailureKind::NetworkDisconnected
    } else {
        FeedFailureKind::FeedUnreachable
    }
}

fn error_chain(err: &reqwest::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
