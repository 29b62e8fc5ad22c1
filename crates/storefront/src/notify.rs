//! User-visible notifications.
//!
//! The cart reports failed operations to a [`Notifier`] with a short,
//! human-readable message. How the message is shown (toast, status bar,
//! log line) is up to the host.

use tracing::warn;

/// Receiver for user-visible error messages. Fire-and-forget.
pub trait Notifier: Send + Sync {
    /// Show an error message to the user.
    fn error(&self, message: &str);
}

/// Notifier that writes messages to the `tracing` log at WARN level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn error(&self, message: &str) {
        warn!(target: "rocketshoes::notify", "{message}");
    }
}
