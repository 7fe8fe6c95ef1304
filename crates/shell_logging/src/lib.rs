#![deny(missing_docs)]
//! Shared logging utilities for the shell workspace.
//!
//! This crate provides the `shell_*` logging macros used across the codebase
//! and a minimal test initializer for the global logger. Every macro logs under
//! the caller's module path, so the target tells which layer decided something.

/// Log target prefix used for navigation decisions.
pub const NAVIGATION_TARGET: &str = "shell::navigation";

/// Log target prefix used for update lifecycle transitions.
pub const UPDATE_TARGET: &str = "shell::update";

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! shell_trace {
    (target: $target:expr, $($arg:tt)*) => {{
        log::trace!(target: $target, $($arg)*);
    }};
    ($($arg:tt)*) => {{
        log::trace!($($arg)*);
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! shell_debug {
    (target: $target:expr, $($arg:tt)*) => {{
        log::debug!(target: $target, $($arg)*);
    }};
    ($($arg:tt)*) => {{
        log::debug!($($arg)*);
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! shell_info {
    (target: $target:expr, $($arg:tt)*) => {{
        log::info!(target: $target, $($arg)*);
    }};
    ($($arg:tt)*) => {{
        log::info!($($arg)*);
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! shell_warn {
    (target: $target:expr, $($arg:tt)*) => {{
        log::warn!(target: $target, $($arg)*);
    }};
    ($($arg:tt)*) => {{
        log::warn!($($arg)*);
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! shell_error {
    (target: $target:expr, $($arg:tt)*) => {{
        log::error!(target: $target, $($arg)*);
    }};
    ($($arg:tt)*) => {{
        log::error!($($arg)*);
    }};
}

/// Initializes a simple terminal logger for use in unit tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    // Use debug level in debug builds, info in release builds.
    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    // Ignore the error if a logger was already set by another test.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}
