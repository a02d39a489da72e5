//! Per-plugin logger contract.

/// Logger handed to each plugin through its context.
///
/// All methods are side-effecting and non-blocking from the runtime's
/// perspective.
pub trait GhostLogger: Send + Sync + std::fmt::Debug {
    /// Log at debug level.
    fn debug(&self, message: &str);
    /// Log at info level.
    fn info(&self, message: &str);
    /// Log at warn level.
    fn warn(&self, message: &str);
    /// Log at error level.
    fn error(&self, message: &str);
}
