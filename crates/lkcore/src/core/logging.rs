//! Logging initialization
//!
//! Console + file output through `simplelog`. Library code only uses the
//! `log` facade; the binary decides where records go.

use anyhow::Result;
use simplelog::*;
use std::fs::File;

/// Initialize logger for both console and file output
///
/// # Arguments
/// * `log_file_path` - Path to the log file
/// * `verbose` - Log at `Debug` instead of `Info`
///
/// # Returns
/// * `Ok(())` - Logger initialized successfully
/// * `Err(anyhow::Error)` - Failed to create the file or a logger is already set
pub fn init_logger(log_file_path: &str, verbose: bool) -> Result<()> {
    let log_file = File::create(log_file_path).map_err(|e| anyhow::anyhow!("Failed to create log file: {}", e))?;
    let level = if verbose { LevelFilter::Debug } else { LevelFilter::Info };

    CombinedLogger::init(vec![
        TermLogger::new(level, Config::default(), TerminalMode::Stderr, ColorChoice::Auto),
        WriteLogger::new(level, Config::default(), log_file),
    ])
    .map_err(|e| anyhow::anyhow!("Failed to initialize logger: {}", e))?;

    Ok(())
}
