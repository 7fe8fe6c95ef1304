use std::cmp::Ordering;

use serde::Deserialize;
use url::Url;

use crate::{FeedError, FeedFailureKind};

/// Latest-release document served by the update feed.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub version: String,
    #[serde(default)]
    pub release_notes: Option<String>,
    /// Artifact location, absolute or relative to the feed URL.
    pub url: String,
    #[serde(default)]
    pub sha256: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
}

impl Manifest {
    pub fn parse(bytes: &[u8]) -> Result<Self, FeedError> {
        let manifest: Manifest = serde_json::from_slice(bytes)
            .map_err(|err| FeedError::new(FeedFailureKind::InvalidManifest, err.to_string()))?;
        Version::parse(&manifest.version)?;
        if manifest.url.trim().is_empty() {
            return Err(FeedError::new(
                FeedFailureKind::InvalidManifest,
                "manifest has no artifact url",
            ));
        }
        Ok(manifest)
    }

    pub fn artifact_url(&self, feed_url: &Url) -> Result<Url, FeedError> {
        feed_url
            .join(&self.url)
            .map_err(|err| FeedError::new(FeedFailureKind::InvalidManifest, err.to_string()))
    }

    /// Last path segment of the artifact URL, falling back to a versioned name.
    pub fn file_name(&self, feed_url: &Url) -> String {
        self.artifact_url(feed_url)
            .ok()
            .and_then(|url| {
                url.path_segments()
                    .and_then(|mut segments| segments.next_back().map(ToOwned::to_owned))
            })
            .filter(|name| !name.is_empty() && name != "." && name != "..")
            .unwrap_or_else(|| format!("update-{}.bin", self.version))
    }

    pub fn is_newer_than(&self, current: &str, allow_prerelease: bool) -> Result<bool, FeedError> {
        let candidate = Version::parse(&self.version)?;
        let current = Version::parse(current)?;
        if candidate.is_prerelease() && !allow_prerelease {
            return Ok(false);
        }
        Ok(candidate > current)
    }
}

/// Dotted numeric version with an optional `-pre.release` suffix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Version {
    core: Vec<u64>,
    pre: Vec<String>,
}

impl Version {
    pub fn parse(raw: &str) -> Result<Self, FeedError> {
        let invalid = || {
            FeedError::new(
                FeedFailureKind::InvalidManifest,
                format!("invalid version {raw:?}"),
            )
        };
        let trimmed = raw.trim().trim_start_matches('v');
        let trimmed = trimmed.split('+').next().unwrap_or(trimmed);
        let (core, pre) = match trimmed.split_once('-') {
            Some((core, pre)) => (core, Some(pre)),
            None => (trimmed, None),
        };
        if core.is_empty() {
            return Err(invalid());
        }
        let core = core
            .split('.')
            .map(|part| part.parse::<u64>().map_err(|_| invalid()))
            .collect::<Result<Vec<_>, _>>()?;
        let pre = match pre {
            Some(pre) if pre.is_empty() => return Err(invalid()),
            Some(pre) => pre.split('.').map(ToOwned::to_owned).collect(),
            None => Vec::new(),
        };
        Ok(Self { core, pre })
    }

    pub fn is_prerelease(&self) -> bool {
        !self.pre.is_empty()
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.core.len().max(other.core.len());
        for i in 0..len {
            let a = self.core.get(i).copied().unwrap_or(0);
            let b = other.core.get(i).copied().unwrap_or(0);
            match a.cmp(&b) {
                Ordering::Equal => {}
                ordering => return ordering,
            }
        }
        // A release outranks any pre-release of the same core.
        match (self.pre.is_empty(), other.pre.is_empty()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => compare_pre(&self.pre, &other.pre),
        }
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn compare_pre(a: &[String], b: &[String]) -> Ordering {
    for (left, right) in a.iter().zip(b) {
        let ordering = match (left.parse::<u64>(), right.parse::<u64>()) {
            (Ok(l), Ok(r)) => l.cmp(&r),
            (Ok(_), Err(_)) => Ordering::Less,
            (Err(_), Ok(_)) => Ordering::Greater,
            (Err(_), Err(_)) => left.cmp(right),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    a.len().cmp(&b.len())
}
