//! Terminal (and optional file) logging for the binary

use crate::io::error::{MosaicError, Result};
use simplelog::{
    ColorChoice, CombinedLogger, Config, LevelFilter, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};
use std::fs::File;
use std::path::Path;

/// Level for the `-q` flag and the number of `-v` flags
pub const fn level_for(quiet: bool, verbosity: u8) -> LevelFilter {
    if quiet {
        return LevelFilter::Error;
    }
    match verbosity {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Install the global logger
///
/// Logs go to stderr at `level`, and additionally to `log_file` at debug
/// level or finer when given. A logger installed earlier is kept.
///
/// # Errors
///
/// Returns `FileSystem` if the log file cannot be created
pub fn init(level: LevelFilter, log_file: Option<&Path>) -> Result<()> {
    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )];

    if let Some(path) = log_file {
        let file = File::create(path).map_err(|source| MosaicError::FileSystem {
            path: path.to_path_buf(),
            operation: "create log file",
            source,
        })?;
        loggers.push(WriteLogger::new(
            level.max(LevelFilter::Debug),
            Config::default(),
            file,
        ));
    }

    if CombinedLogger::init(loggers).is_err() {
        log::debug!("logger already installed");
    }
    Ok(())
}
