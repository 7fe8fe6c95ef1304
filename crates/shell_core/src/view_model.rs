use crate::Phase;

/// Read-only projection handed to the renderer and to logging.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UpdateView {
    pub phase: Phase,
    pub version: Option<String>,
    pub progress_percent: Option<f64>,
    pub last_error: Option<String>,
    pub triggered_manually: bool,
    pub pending_install: Option<String>,
    pub window: WindowView,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WindowView {
    pub maximized: bool,
    pub visible: bool,
    pub quitting: bool,
}
