use chrono::Utc;
use log::{error as log_error, info as log_info, warn as log_warn};
use once_cell::sync::OnceCell;
use std::sync::Arc;

/// Match-level narration port: who moved, who was disqualified, who won.
/// Kept non-fallible so the turn loop never has to care about log output.
pub trait DomainLogger: Send + Sync + 'static {
    fn info(&self, msg: &str);
    fn warn(&self, msg: &str);
    fn error(&self, msg: &str);
}

pub type DynLogger = Arc<dyn DomainLogger>;

static FILE_LOGGER: OnceCell<()> = OnceCell::new();

/// A file-based adapter using `fast_log` for file writing.
pub struct FileLogger;

impl FileLogger {
    /// Initialize the fast_log file logger. Only the first call configures
    /// the global logger; later calls are no-ops.
    pub fn init(path: &str) -> Result<(), Box<dyn std::error::Error>> {
        FILE_LOGGER.get_or_try_init(|| {
            fast_log::init(
                fast_log::config::Config::new()
                    .file(path)
                    .level(log::LevelFilter::Info),
            )
            .map(|_| ())
        })?;
        Ok(())
    }
}

impl DomainLogger for FileLogger {
    fn info(&self, msg: &str) {
        log_info!("{} - {}", Utc::now().to_rfc3339(), msg);
    }

    fn warn(&self, msg: &str) {
        log_warn!("{} - {}", Utc::now().to_rfc3339(), msg);
    }

    fn error(&self, msg: &str) {
        log_error!("{} - {}", Utc::now().to_rfc3339(), msg);
    }
}
