//! Navigation trust boundary for the embedded surface.
//!
//! Classification is pure: the guard never touches the surface itself. The
//! platform layer asks [`NavigationGuard::decide`] for every new-window
//! request, top-level navigation and redirect, then performs the returned
//! [`NavigationAction`].

use shell_logging::{shell_debug, NAVIGATION_TARGET};
use thiserror::Error;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AllowlistError {
    #[error("allowlist must contain at least one origin")]
    Empty,
    #[error("allowlist entry {entry:?} is not an absolute url: {reason}")]
    NotAbsolute { entry: String, reason: String },
    #[error("allowlist entry {entry:?} has no host")]
    MissingHost { entry: String },
    #[error("allowlist entry {entry:?} must start with its scheme followed by \"://\"")]
    SchemeNotLiteral { entry: String },
}

/// How a target URL is compared against the allowlist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchMode {
    /// Literal, case-sensitive string prefix.
    #[default]
    Prefix,
    /// Parsed scheme, host and port must equal an entry's.
    Origin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationDecision {
    Allow,
    DenyExternal,
}

/// Where a navigation attempt came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationKind {
    /// `window.open`, `target=_blank` and friends.
    WindowOpen,
    /// Top-level navigation inside the embedded surface (link click, script).
    WillNavigate,
    /// Server-side redirect of a top-level load.
    Redirect,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationRequest {
    pub kind: NavigationKind,
    pub url: String,
}

impl NavigationRequest {
    pub fn new(kind: NavigationKind, url: impl Into<String>) -> Self {
        Self {
            kind,
            url: url.into(),
        }
    }
}

/// What the host must do with a navigation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationAction {
    /// Let the in-surface navigation continue.
    Proceed,
    /// Cancel the new-window request and load the URL in the existing surface.
    LoadInPlace(String),
    /// Cancel and hand the URL to the operating system's default handler.
    OpenExternal(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allowlist {
    entries: Vec<String>,
    mode: MatchMode,
}

impl Allowlist {
    pub fn new<I, S>(entries: I, mode: MatchMode) -> Result<Self, AllowlistError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entries: Vec<String> = entries.into_iter().map(Into::into).collect();
        if entries.is_empty() {
            return Err(AllowlistError::Empty);
        }
        for entry in &entries {
            validate_entry(entry)?;
        }
        Ok(Self { entries, mode })
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    pub fn classify(&self, url: &str) -> NavigationDecision {
        let allowed = match self.mode {
            MatchMode::Prefix => self.entries.iter().any(|entry| url.starts_with(entry.as_str())),
            MatchMode::Origin => self.matches_origin(url),
        };
        if allowed {
            NavigationDecision::Allow
        } else {
            NavigationDecision::DenyExternal
        }
    }

    fn matches_origin(&self, url: &str) -> bool {
        let Ok(target) = Url::parse(url) else {
            return false;
        };
        if target.host_str().is_none() {
            return false;
        }
        self.entries
            .iter()
            .filter_map(|entry| Url::parse(entry).ok())
            .any(|entry| {
                entry.scheme() == target.scheme()
                    && entry.host_str() == target.host_str()
                    && entry.port_or_known_default() == target.port_or_known_default()
            })
    }
}

fn validate_entry(entry: &str) -> Result<(), AllowlistError> {
    let parsed = Url::parse(entry).map_err(|err| AllowlistError::NotAbsolute {
        entry: entry.to_string(),
        reason: err.to_string(),
    })?;
    if parsed.host_str().is_none() {
        return Err(AllowlistError::MissingHost {
            entry: entry.to_string(),
        });
    }
    // The parser lowercases schemes; the literal text must already carry it.
    if !entry.starts_with(&format!("{}://", parsed.scheme())) {
        return Err(AllowlistError::SchemeNotLiteral {
            entry: entry.to_string(),
        });
    }
    Ok(())
}

/// Guard wired into every navigation path of the embedded surface.
#[derive(Debug, Clone)]
pub struct NavigationGuard {
    allowlist: Allowlist,
}

impl NavigationGuard {
    pub fn new(allowlist: Allowlist) -> Self {
        Self { allowlist }
    }

    pub fn allowlist(&self) -> &Allowlist {
        &self.allowlist
    }

    pub fn classify(&self, url: &str) -> NavigationDecision {
        self.allowlist.classify(url)
    }

    /// Never yields a new top-level window: window-open requests become either
    /// an in-place load or an external dispatch.
    pub fn decide(&self, request: &NavigationRequest) -> NavigationAction {
        let decision = self.classify(&request.url);
        let action = match (request.kind, decision) {
            (NavigationKind::WindowOpen, NavigationDecision::Allow) => {
                NavigationAction::LoadInPlace(request.url.clone())
            }
            (
                NavigationKind::WillNavigate | NavigationKind::Redirect,
                NavigationDecision::Allow,
            ) => NavigationAction::Proceed,
            (_, NavigationDecision::DenyExternal) => {
                NavigationAction::OpenExternal(request.url.clone())
            }
        };
        shell_debug!(
            target: NAVIGATION_TARGET,
            "{:?} url_len={} -> {:?}",
            request.kind,
            request.url.len(),
            decision
        );
        action
    }
}

/// Keys the embedded content could use to force a reload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyChord<'a> {
    pub key: &'a str,
    pub ctrl: bool,
    pub meta: bool,
    pub shift: bool,
}

/// True for F5, Ctrl+R, Ctrl+Shift+R and their Cmd variants.
pub fn is_reload_shortcut(chord: &KeyChord<'_>) -> bool {
    if chord.key.eq_ignore_ascii_case("f5") {
        return true;
    }
    (chord.ctrl || chord.meta) && chord.key.eq_ignore_ascii_case("r")
}

/// The only title the main window ever shows.
pub fn window_title(app_name: &str, version: &str) -> String {
    format!("{app_name} v{version}")
}
