//! Request pacing for the TMDB API.

use std::time::Duration;

use tokio::time::Instant;

/// Default minimum spacing between requests (~40 req/s).
const DEFAULT_MIN_INTERVAL: Duration = Duration::from_millis(25);

/// Single-tier request pacer.
///
/// TMDB allows roughly 40 requests per second. Each call to
/// [`RequestPacer::acquire`] reserves the next free slot and sleeps
/// until it is reached. Failed requests are never retried here.
#[derive(Debug)]
pub struct RequestPacer {
    /// Minimum spacing between two request slots.
    min_interval: Duration,
    /// Earliest instant the next request may start.
    next_slot: Option<Instant>,
}

impl RequestPacer {
    /// Creates a pacer with the given minimum interval.
    pub(crate) const fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            next_slot: None,
        }
    }

    /// Creates a pacer with the default interval (25ms).
    pub(crate) const fn with_default_interval() -> Self {
        Self::new(DEFAULT_MIN_INTERVAL)
    }

    /// Waits for the next request slot and reserves the one after it.
    pub async fn acquire(&mut self) {
        if let Some(slot) = self.next_slot
            && slot > Instant::now()
        {
            tokio::time::sleep_until(slot).await;
        }

        let now = Instant::now();
        self.next_slot = now.checked_add(self.min_interval).or(Some(now));
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_first_acquire_does_not_wait() {
        // Arrange
        let mut pacer = RequestPacer::new(Duration::from_secs(1));
        let start = Instant::now();

        // Act
        pacer.acquire().await;

        // Assert
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_acquire_waits_for_interval() {
        // Arrange
        let mut pacer = RequestPacer::new(Duration::from_millis(50));
        let start = Instant::now();

        // Act
        pacer.acquire().await;
        pacer.acquire().await;

        // Assert
        assert!(start.elapsed() >= Duration::from_millis(50));
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_wait_after_idle_period() {
        // Arrange
        let mut pacer = RequestPacer::new(Duration::from_millis(50));
        pacer.acquire().await;
        tokio::time::advance(Duration::from_millis(200)).await;
        let start = Instant::now();

        // Act
        pacer.acquire().await;

        // Assert
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[test]
    fn test_default_interval() {
        // Arrange & Act
        let pacer = RequestPacer::with_default_interval();

        // Assert
        assert_eq!(pacer.min_interval, Duration::from_millis(25));
        assert!(pacer.next_slot.is_none());
    }
}
