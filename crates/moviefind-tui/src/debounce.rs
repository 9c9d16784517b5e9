//! Cancellable scheduled delivery of values.

use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::AbortHandle;

/// Handle to one scheduled delivery.
#[derive(Debug, Clone)]
pub struct DebounceHandle {
    task: AbortHandle,
}

impl DebounceHandle {
    /// Aborts the delivery if it has not happened yet.
    pub fn cancel(&self) {
        self.task.abort();
    }

    /// Whether the delivery already happened or was cancelled.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// Delivers only the last value scheduled within a quiet period.
///
/// Each [`Debouncer::schedule`] call cancels the pending delivery before
/// spawning a timer task that sends `value` on the output channel once
/// `delay` has elapsed. At most one delivery is pending at a time.
/// Dropping the debouncer cancels the pending delivery.
#[derive(Debug)]
pub struct Debouncer<T> {
    output: UnboundedSender<T>,
    pending: Option<DebounceHandle>,
}

impl<T: Send + 'static> Debouncer<T> {
    /// Creates a debouncer that delivers on `output`.
    #[must_use]
    pub const fn new(output: UnboundedSender<T>) -> Self {
        Self {
            output,
            pending: None,
        }
    }

    /// Schedules `value` for delivery after `delay`, replacing any pending one.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn schedule(&mut self, value: T, delay: Duration) -> DebounceHandle {
        self.cancel();

        let output = self.output.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if output.send(value).is_err() {
                tracing::debug!("debounce receiver closed, value dropped");
            }
        });

        let handle = DebounceHandle {
            task: task.abort_handle(),
        };
        self.pending = Some(handle.clone());
        handle
    }

    /// Whether a delivery is still pending.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl<T> Debouncer<T> {
    /// Cancels the pending delivery (if any).
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.cancel();
        }
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use tokio::sync::mpsc;
    use tokio::time::Instant;

    use super::*;

    const QUIET: Duration = Duration::from_millis(600);

    #[tokio::test(start_paused = true)]
    async fn test_delivers_after_quiet_period() {
        // Arrange
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut debouncer = Debouncer::new(tx);
        let start = Instant::now();

        // Act
        debouncer.schedule("dune", QUIET);
        let value = rx.recv().await.unwrap();

        // Assert
        assert_eq!(value, "dune");
        assert!(start.elapsed() >= QUIET);
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_delivers_only_last_value() {
        // Arrange
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut debouncer = Debouncer::new(tx);

        // Act
        for term in ["d", "du", "dun", "dune"] {
            debouncer.schedule(term, QUIET);
            tokio::time::advance(Duration::from_millis(100)).await;
        }
        let value = rx.recv().await.unwrap();
        tokio::time::advance(Duration::from_secs(5)).await;

        // Assert
        assert_eq!(value, "dune");
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_separated_values_are_all_delivered() {
        // Arrange
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut debouncer = Debouncer::new(tx);

        // Act
        debouncer.schedule("alien", QUIET);
        let first = rx.recv().await.unwrap();
        debouncer.schedule("aliens", QUIET);
        let second = rx.recv().await.unwrap();

        // Assert
        assert_eq!(first, "alien");
        assert_eq!(second, "aliens");
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_handle_suppresses_delivery() {
        // Arrange
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut debouncer = Debouncer::new(tx);
        let handle = debouncer.schedule("dune", QUIET);

        // Act
        handle.cancel();
        tokio::time::advance(Duration::from_secs(5)).await;

        // Assert
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_debouncer_cancel_clears_pending() {
        // Arrange
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut debouncer = Debouncer::new(tx);
        debouncer.schedule("dune", QUIET);
        let was_pending = debouncer.is_pending();

        // Act
        debouncer.cancel();
        tokio::time::advance(Duration::from_secs(5)).await;

        // Assert
        assert!(was_pending);
        assert!(!debouncer.is_pending());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_pending_delivery() {
        // Arrange
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut debouncer = Debouncer::new(tx);
        debouncer.schedule("dune", QUIET);

        // Act
        drop(debouncer);
        let value = rx.recv().await;

        // Assert
        assert!(value.is_none());
    }
}
