//! Logger setup for the shell binary.
//!
//! `SHELL_LOG` picks the sink: `file` (the default) truncates `./shell.log`,
//! `terminal` writes to stderr, `both` does both. Only records from the
//! `shell*` crates pass the filter.

use std::fs::File;
use std::path::PathBuf;

use log::LevelFilter;
use simplelog::{
    ColorChoice, CombinedLogger, Config, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};

const LOG_ENV: &str = "SHELL_LOG";
const LOG_FILE: &str = "./shell.log";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogDestination {
    File,
    Terminal,
    Both,
}

impl LogDestination {
    pub fn from_env() -> Self {
        Self::from_setting(std::env::var(LOG_ENV).ok().as_deref())
    }

    /// Unknown or missing values fall back to the log file.
    fn from_setting(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("terminal") => LogDestination::Terminal,
            Some(v) if v.eq_ignore_ascii_case("both") => LogDestination::Both,
            _ => LogDestination::File,
        }
    }
}

/// Installs the global logger. Debug builds log at debug level, release
/// builds at info. A log file that cannot be created is reported on stderr
/// and skipped.
pub fn initialize(destination: LogDestination) {
    let level = if cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let config = build_config();

    let mut loggers: Vec<Box<dyn SharedLogger>> = Vec::new();
    if matches!(destination, LogDestination::Terminal | LogDestination::Both) {
        loggers.push(TermLogger::new(
            level,
            config.clone(),
            TerminalMode::Stderr,
            ColorChoice::Auto,
        ));
    }
    if matches!(destination, LogDestination::File | LogDestination::Both) {
        if let Some(file_logger) = open_log_file(level, config) {
            loggers.push(file_logger);
        }
    }
    if !loggers.is_empty() {
        let _ = CombinedLogger::init(loggers);
    }
}

fn build_config() -> Config {
    ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_target_level(LevelFilter::Error)
        .add_filter_allow_str("shell")
        .build()
}

fn open_log_file(level: LevelFilter, config: Config) -> Option<Box<WriteLogger<File>>> {
    let path = PathBuf::from(LOG_FILE);
    match File::create(&path) {
        Ok(file) => Some(WriteLogger::new(level, config, file)),
        Err(err) => {
            eprintln!("shell: cannot create {}: {}", path.display(), err);
            None
        }
    }
}
