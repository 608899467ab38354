//
// Copyright 2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Counters describing how often sends had to wait for the peer.
///
/// # Examples
///
/// ```rust
/// use wamprpc::backpressure::RetryMetrics;
/// use std::time::Duration;
///
/// let metrics = RetryMetrics::new();
/// metrics.record_retry(Duration::from_millis(4));
/// metrics.record_retry(Duration::from_millis(8));
/// assert_eq!(metrics.retries(), 2);
/// assert_eq!(metrics.wait_time_ms(), 12);
/// assert_eq!(metrics.exhausted(), 0);
/// ```
#[derive(Debug, Default)]
pub struct RetryMetrics {
    /// Number of retries scheduled
    retries: AtomicU64,

    /// Total time spent waiting between retries (milliseconds)
    wait_time_ms: AtomicU64,

    /// Number of sends abandoned because the retry budget ran out
    exhausted: AtomicU64,
}

impl RetryMetrics {
    /// Create new metrics with zero values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a retry scheduled after `delay`.
    pub fn record_retry(&self, delay: Duration) {
        let ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self.retries.fetch_add(1, Ordering::Relaxed);
        self.wait_time_ms.fetch_add(ms, Ordering::Relaxed);
        #[cfg(feature = "observability")]
        {
            metrics::counter!("wamprpc.backpressure.retries").increment(1);
            metrics::counter!("wamprpc.backpressure.wait_time_ms").increment(ms);
        }
    }

    /// Records a send abandoned after the retry budget ran out.
    pub fn record_exhausted(&self) {
        self.exhausted.fetch_add(1, Ordering::Relaxed);
        #[cfg(feature = "observability")]
        metrics::counter!("wamprpc.backpressure.exhausted").increment(1);
    }

    /// Number of retries scheduled.
    pub fn retries(&self) -> u64 {
        self.retries.load(Ordering::Relaxed)
    }

    /// Total time spent waiting between retries, in milliseconds.
    pub fn wait_time_ms(&self) -> u64 {
        self.wait_time_ms.load(Ordering::Relaxed)
    }

    /// Number of sends abandoned because the retry budget ran out.
    pub fn exhausted(&self) -> u64 {
        self.exhausted.load(Ordering::Relaxed)
    }
}

/// Schedule for retrying a send that found the peer's buffer full.
///
/// A policy is consulted after every transient failure. It returns how long
/// to wait before the next attempt, or `None` once it gives up. Giving up is
/// a terminal outcome: the runtime then treats the consumer as gone.
///
/// # Examples
///
/// ```rust
/// use wamprpc::backpressure::{ExponentialRetry, RetryPolicy};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// let policy: Arc<dyn RetryPolicy> = Arc::new(ExponentialRetry::default());
/// assert!(policy.next_delay(0, Duration::ZERO).is_some());
/// assert!(policy.next_delay(0, Duration::from_secs(60)).is_none());
/// ```
pub trait RetryPolicy: Send + Sync + fmt::Debug {
    /// Returns the wait before retry number `attempt` (zero based), given
    /// the time already spent retrying this send.
    ///
    /// `None` means the retry budget is exhausted.
    fn next_delay(&self, attempt: u32, elapsed: Duration) -> Option<Duration>;

    /// Get a human-readable name for this policy.
    ///
    /// Used for logging and debugging.
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_new() {
        let metrics = RetryMetrics::new();
        assert_eq!(metrics.retries(), 0);
        assert_eq!(metrics.wait_time_ms(), 0);
        assert_eq!(metrics.exhausted(), 0);
    }

    #[test]
    fn test_metrics_exhausted() {
        let metrics = RetryMetrics::new();
        metrics.record_exhausted();
        assert_eq!(metrics.exhausted(), 1);
        assert_eq!(metrics.retries(), 0);
    }
}
