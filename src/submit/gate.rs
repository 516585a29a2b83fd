//! Polling wait until the generation step has published a token.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;

use crate::context::WebhookContext;
use crate::shutdown::sleep_unless_shutdown;

/// How a token wait ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// A non-blank token is available.
    Ready,
    /// The timeout elapsed first. Callers proceed anyway.
    TimedOut,
    /// A shutdown signal arrived while waiting.
    Cancelled,
}

/// Polls a [`WebhookContext`] until it holds a token.
///
/// An optional shutdown receiver makes every sleep a cancellation point:
/// once it observes `true`, the wait returns [`WaitOutcome::Cancelled`].
#[derive(Debug, Clone)]
pub struct TokenGate {
    context: Arc<WebhookContext>,
    shutdown: Option<watch::Receiver<bool>>,
}

impl TokenGate {
    /// Poll intervals below this are raised to it.
    pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(50);

    /// Creates a gate over `context` with no shutdown signal.
    #[must_use]
    pub const fn new(context: Arc<WebhookContext>) -> Self {
        Self {
            context,
            shutdown: None,
        }
    }

    /// Attaches a shutdown signal that aborts the wait.
    #[must_use]
    pub fn with_shutdown(mut self, shutdown: watch::Receiver<bool>) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    /// Waits for a token, checking every `poll_interval` until `timeout` elapses.
    ///
    /// Blocks only the calling task. A timeout is logged and reported but is
    /// not an error.
    pub async fn wait_for_token(&self, timeout: Duration, poll_interval: Duration) -> WaitOutcome {
        let poll_interval = poll_interval.max(Self::MIN_POLL_INTERVAL);
        let mut shutdown = self.shutdown.clone();
        let start = Instant::now();

        loop {
            if self.context.has_token() {
                tracing::debug!("Token available after {} ms", start.elapsed().as_millis());
                return WaitOutcome::Ready;
            }

            if start.elapsed() >= timeout {
                tracing::warn!(
                    "Token not available after waiting {} ms; proceeding (may fail)",
                    timeout.as_millis()
                );
                return WaitOutcome::TimedOut;
            }

            if sleep_unless_shutdown(poll_interval, shutdown.as_mut()).await {
                tracing::info!("Token wait interrupted by shutdown");
                return WaitOutcome::Cancelled;
            }
        }
    }
}
