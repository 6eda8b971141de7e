//! Reporter trait for dependency injection
//!
//! Lets the engine report progress without depending on how the CLI draws it.

/// Sink for user-facing progress messages.
pub trait Reporter: Send + Sync {
    /// Indicates a new phase has started (e.g. "Installing tools").
    fn section(&self, title: &str);

    /// Updates the progress of a download.
    fn downloading(&self, label: &str, current: u64, total: Option<u64>);

    /// Signals that an archive is being unpacked.
    fn extracting(&self, label: &str);

    /// Log an informational message.
    fn info(&self, msg: &str);

    /// Log a success message.
    fn success(&self, msg: &str);

    /// Log a warning message.
    fn warning(&self, msg: &str);
}

/// A no-op reporter for silent operations (e.g. testing).
#[derive(Debug, Clone, Copy)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn section(&self, _: &str) {}
    fn downloading(&self, _: &str, _: u64, _: Option<u64>) {}
    fn extracting(&self, _: &str) {}
    fn info(&self, _: &str) {}
    fn success(&self, _: &str) {}
    fn warning(&self, _: &str) {}
}
