use std::fmt;

/// Why a check or download failed. Only selects the user-facing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    FeedUnreachable,
    NetworkDisconnected,
    DownloadFailed,
    Generic,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl UpdateFailure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn user_message(&self) -> String {
        match self.kind {
            FailureKind::FeedUnreachable => {
                "The update server could not be reached. Please try again later.".to_string()
            }
            FailureKind::NetworkDisconnected => {
                "No network connection. Check your connection and try again.".to_string()
            }
            FailureKind::DownloadFailed => {
                format!("The update could not be downloaded: {}", self.message)
            }
            FailureKind::Generic => format!("Update failed: {}", self.message),
        }
    }
}

impl fmt::Display for UpdateFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}
