//! Shell updater: feed checks, artifact downloads and binary replacement.
mod engine;
mod feed;
mod install;
mod manifest;
mod persist;
mod types;

pub use engine::UpdaterHandle;
pub use feed::{ChannelProgressSink, FeedSettings, ProgressSink, ReqwestFeed, UpdateFeed};
pub use install::{was_just_updated, InstallError, Installer, UPDATED_FLAG};
pub use manifest::{Manifest, Version};
pub use persist::{ensure_download_dir, ArtifactWriter, PersistError};
pub use types::{
    CheckId, DownloadAttempt, DownloadedArtifact, FeedError, FeedFailureKind, UpdaterEvent,
};
