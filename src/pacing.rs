//! Minimum-interval gate for outgoing requests.
//!
//! A [`Pacer`] hands out request start slots at least `min_interval` apart,
//! plus an optional random jitter. It is shared by every concurrent fetch
//! task, so the spacing holds across all harvesters rather than per task.

use rand::{Rng, rng};
use std::fmt;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{Instant, sleep_until};

pub struct Pacer {
    min_interval: Duration,
    jitter: Duration,
    next_slot: Mutex<Option<Instant>>,
}

impl Pacer {
    pub fn new(min_interval: Duration, jitter: Duration) -> Self {
        Self {
            min_interval,
            jitter,
            next_slot: Mutex::new(None),
        }
    }

    /// A pacer that never waits.
    pub fn unpaced() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO)
    }

    /// Wait until this caller's slot comes up.
    ///
    /// Slots are reserved under the lock and slept on outside it, so callers
    /// queue in arrival order without holding each other up.
    pub async fn wait(&self) {
        if self.min_interval.is_zero() && self.jitter.is_zero() {
            return;
        }
        let spacing = self.min_interval + self.sample_jitter();
        let slot = {
            let mut next = self.next_slot.lock().await;
            let now = Instant::now();
            let slot = match *next {
                Some(reserved) if reserved > now => reserved,
                _ => now,
            };
            *next = Some(slot + spacing);
            slot
        };
        sleep_until(slot).await;
    }

    fn sample_jitter(&self) -> Duration {
        if self.jitter.is_zero() {
            return Duration::ZERO;
        }
        let max_ms = self.jitter.as_millis() as u64;
        Duration::from_millis(rng().random_range(0..=max_ms))
    }
}

impl fmt::Debug for Pacer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pacer")
            .field("min_interval", &self.min_interval)
            .field("jitter", &self.jitter)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_unpaced_never_waits() {
        let pacer = Pacer::unpaced();
        let t0 = Instant::now();
        for _ in 0..100 {
            pacer.wait().await;
        }
        assert!(t0.elapsed() < Duration::from_millis(50));
    }

    #[tokio::test]
    async fn test_first_slot_is_immediate() {
        let pacer = Pacer::new(Duration::from_millis(200), Duration::ZERO);
        let t0 = Instant::now();
        pacer.wait().await;
        assert!(t0.elapsed() < Duration::from_millis(100));
    }

    #[tokio::test]
    async fn test_spacing_holds_across_tasks() {
        let pacer = Arc::new(Pacer::new(Duration::from_millis(40), Duration::ZERO));
        let t0 = Instant::now();
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let pacer = Arc::clone(&pacer);
                tokio::spawn(async move { pacer.wait().await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }
        // four slots: 0, 40, 80, 120 ms
        assert!(t0.elapsed() >= Duration::from_millis(120));
    }
}
