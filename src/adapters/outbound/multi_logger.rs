use crate::domains::logger::DomainLogger;
use std::sync::Arc;

/// Forwards to a primary logger and, optionally, a secondary one.
pub struct MultiLogger {
    primary: Arc<dyn DomainLogger>,
    secondary: Option<Arc<dyn DomainLogger>>,
}

impl MultiLogger {
    pub fn new(primary: Arc<dyn DomainLogger>, secondary: Option<Arc<dyn DomainLogger>>) -> Self {
        Self { primary, secondary }
    }
}

impl DomainLogger for MultiLogger {
    fn info(&self, msg: &str) {
        self.primary.info(msg);
        if let Some(sec) = &self.secondary {
            sec.info(msg);
        }
    }

    fn warn(&self, msg: &str) {
        self.primary.warn(msg);
        if let Some(sec) = &self.secondary {
            sec.warn(msg);
        }
    }

    fn error(&self, msg: &str) {
        self.primary.error(msg);
        if let Some(sec) = &self.secondary {
            sec.error(msg);
        }
    }
}

/// File logger with console as secondary; console only when the file cannot be set up.
pub fn init_combined_logger(path: &str) -> Arc<dyn DomainLogger> {
    let console = super::init_console_logger();
    match super::init_file_logger(path) {
        Ok(file_logger) => Arc::new(MultiLogger::new(file_logger, Some(console))),
        Err(e) => {
            console.warn(&e);
            console
        }
    }
}
