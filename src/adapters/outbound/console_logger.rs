use crate::domains::logger::DomainLogger;
use std::sync::Arc;

/// Forwards match narration to the tracing subscriber.
struct ConsoleBridge;

impl DomainLogger for ConsoleBridge {
    fn info(&self, msg: &str) {
        tracing::info!(target: "arena", "{}", msg);
    }
    fn warn(&self, msg: &str) {
        tracing::warn!(target: "arena", "{}", msg);
    }
    fn error(&self, msg: &str) {
        tracing::error!(target: "arena", "{}", msg);
    }
}

/// Initialize a console-backed DomainLogger (useful as a fallback)
pub fn init_console_logger() -> Arc<dyn DomainLogger> {
    Arc::new(ConsoleBridge {})
}
