use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::Manifest;

pub type CheckId = u64;
pub type DownloadAttempt = u64;

#[derive(Debug, Clone, PartialEq)]
pub enum UpdaterEvent {
    CheckCompleted {
        check_id: CheckId,
        result: Result<Option<Manifest>, FeedError>,
    },
    Progress {
        attempt: DownloadAttempt,
        percent: f64,
    },
    DownloadCompleted {
        attempt: DownloadAttempt,
        result: Result<DownloadedArtifact, FeedError>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedArtifact {
    pub version: String,
    pub path: PathBuf,
    pub sha256: String,
    pub byte_len: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct FeedError {
    pub kind: FeedFailureKind,
    pub message: String,
}

impl FeedError {
    /// Public so feeds implemented outside this crate can report failures.
    pub fn new(kind: FeedFailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedFailureKind {
    FeedUnreachable,
    NetworkDisconnected,
    DownloadFailed,
    InvalidManifest,
}

impl fmt::Display for FeedFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedFailureKind::FeedUnreachable => write!(f, "update server unreachable"),
            FeedFailureKind::NetworkDisconnected => write!(f, "network disconnected"),
            FeedFailureKind::DownloadFailed => write!(f, "download failed"),
            FeedFailureKind::InvalidManifest => write!(f, "invalid manifest"),
        }
    }
}
