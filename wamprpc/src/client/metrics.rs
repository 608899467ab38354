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

//! Session metrics.
//!
//! Counters are kept in atomics so they can be read in tests and by
//! embedders, and are exported to the `metrics` crate when the
//! `observability` feature is enabled.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for one client session.
///
/// # Examples
///
/// ```rust
/// use wamprpc::client::ClientMetrics;
///
/// let metrics = ClientMetrics::new();
/// metrics.record_call_issued();
/// metrics.record_call_succeeded();
/// metrics.record_handler_started();
///
/// assert_eq!(metrics.calls_issued(), 1);
/// assert_eq!(metrics.active_calls(), 0);
/// assert_eq!(metrics.active_handlers(), 1);
/// ```
#[derive(Debug, Default)]
pub struct ClientMetrics {
    /// Calls sent
    calls_issued: AtomicU64,
    /// Calls resolved with a result
    calls_succeeded: AtomicU64,
    /// Calls resolved with an error, including cancellation
    calls_failed: AtomicU64,
    /// Progressive results handed to progress handlers
    progress_received: AtomicU64,
    /// Progressive results accepted by the transport
    progress_sent: AtomicU64,
    /// Progress sends refused with the sticky error
    progress_rejected: AtomicU64,
    /// INTERRUPTs that cancelled a running invocation
    interrupts_applied: AtomicU64,
    /// INTERRUPTs for unknown or finished invocations
    interrupts_ignored: AtomicU64,
    /// Handler tasks started
    handlers_started: AtomicU64,
    /// Handler tasks finished
    handlers_finished: AtomicU64,
}

impl ClientMetrics {
    /// Creates a new metrics tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a CALL being sent.
    pub fn record_call_issued(&self) {
        self.calls_issued.fetch_add(1, Ordering::Relaxed);
        #[cfg(feature = "observability")]
        {
            metrics::counter!("wamprpc.client.calls.issued").increment(1);
            metrics::gauge!("wamprpc.client.calls.active").increment(1.0);
        }
    }

    /// Records a call resolving with a result.
    pub fn record_call_succeeded(&self) {
        self.calls_succeeded.fetch_add(1, Ordering::Relaxed);
        #[cfg(feature = "observability")]
        {
            metrics::counter!("wamprpc.client.calls.succeeded").increment(1);
            metrics::gauge!("wamprpc.client.calls.active").decrement(1.0);
        }
    }

    /// Records a call resolving with an error.
    pub fn record_call_failed(&self) {
        self.calls_failed.fetch_add(1, Ordering::Relaxed);
        #[cfg(feature = "observability")]
        {
            metrics::counter!("wamprpc.client.calls.failed").increment(1);
            metrics::gauge!("wamprpc.client.calls.active").decrement(1.0);
        }
    }

    /// Records a progressive result delivered to a progress handler.
    pub fn record_progress_received(&self) {
        self.progress_received.fetch_add(1, Ordering::Relaxed);
        #[cfg(feature = "observability")]
        metrics::counter!("wamprpc.client.progress.received").increment(1);
    }

    /// Records a progressive result accepted by the transport.
    pub fn record_progress_sent(&self) {
        self.progress_sent.fetch_add(1, Ordering::Relaxed);
        #[cfg(feature = "observability")]
        metrics::counter!("wamprpc.client.progress.sent").increment(1);
    }

    /// Records a progress send refused with the sticky error.
    pub fn record_progress_rejected(&self) {
        self.progress_rejected.fetch_add(1, Ordering::Relaxed);
        #[cfg(feature = "observability")]
        metrics::counter!("wamprpc.client.progress.rejected").increment(1);
    }

    /// Records an INTERRUPT that cancelled a running invocation.
    pub fn record_interrupt_applied(&self) {
        self.interrupts_applied.fetch_add(1, Ordering::Relaxed);
        #[cfg(feature = "observability")]
        metrics::counter!("wamprpc.client.interrupts.applied").increment(1);
    }

    /// Records an INTERRUPT that matched no running invocation.
    pub fn record_interrupt_ignored(&self) {
        self.interrupts_ignored.fetch_add(1, Ordering::Relaxed);
        #[cfg(feature = "observability")]
        metrics::counter!("wamprpc.client.interrupts.ignored").increment(1);
    }

    /// Records a handler task starting.
    pub fn record_handler_started(&self) {
        self.handlers_started.fetch_add(1, Ordering::Relaxed);
        #[cfg(feature = "observability")]
        metrics::gauge!("wamprpc.client.handlers.active").increment(1.0);
    }

    /// Records a handler task finishing.
    pub fn record_handler_finished(&self) {
        self.handlers_finished.fetch_add(1, Ordering::Relaxed);
        #[cfg(feature = "observability")]
        metrics::gauge!("wamprpc.client.handlers.active").decrement(1.0);
    }

    /// Calls sent.
    pub fn calls_issued(&self) -> u64 {
        self.calls_issued.load(Ordering::Relaxed)
    }

    /// Calls resolved with a result.
    pub fn calls_succeeded(&self) -> u64 {
        self.calls_succeeded.load(Ordering::Relaxed)
    }

    /// Calls resolved with an error.
    pub fn calls_failed(&self) -> u64 {
        self.calls_failed.load(Ordering::Relaxed)
    }

    /// Calls issued but not yet resolved.
    pub fn active_calls(&self) -> u64 {
        self.calls_issued()
            .saturating_sub(self.calls_succeeded() + self.calls_failed())
    }

    /// Progressive results handed to progress handlers.
    pub fn progress_received(&self) -> u64 {
        self.progress_received.load(Ordering::Relaxed)
    }

    /// Progressive results accepted by the transport.
    pub fn progress_sent(&self) -> u64 {
        self.progress_sent.load(Ordering::Relaxed)
    }

    /// Progress sends refused with the sticky error.
    pub fn progress_rejected(&self) -> u64 {
        self.progress_rejected.load(Ordering::Relaxed)
    }

    /// INTERRUPTs that cancelled a running invocation.
    pub fn interrupts_applied(&self) -> u64 {
        self.interrupts_applied.load(Ordering::Relaxed)
    }

    /// INTERRUPTs that matched no running invocation.
    pub fn interrupts_ignored(&self) -> u64 {
        self.interrupts_ignored.load(Ordering::Relaxed)
    }

    /// Handler tasks currently running.
    pub fn active_handlers(&self) -> u64 {
        self.handlers_started
            .load(Ordering::Relaxed)
            .saturating_sub(self.handlers_finished.load(Ordering::Relaxed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_call_accounting() {
        let metrics = ClientMetrics::new();
        metrics.record_call_issued();
        metrics.record_call_issued();
        assert_eq!(metrics.active_calls(), 2);

        metrics.record_call_succeeded();
        metrics.record_call_failed();
        assert_eq!(metrics.active_calls(), 0);
        assert_eq!(metrics.calls_succeeded(), 1);
        assert_eq!(metrics.calls_failed(), 1);
    }

    #[test]
    fn test_handler_accounting() {
        let metrics = ClientMetrics::new();
        metrics.record_handler_started();
        metrics.record_handler_started();
        metrics.record_handler_finished();
        assert_eq!(metrics.active_handlers(), 1);
    }

    #[test]
    fn test_interrupt_accounting() {
        let metrics = ClientMetrics::new();
        metrics.record_interrupt_applied();
        metrics.record_interrupt_ignored();
        metrics.record_interrupt_ignored();
        assert_eq!(metrics.interrupts_applied(), 1);
        assert_eq!(metrics.interrupts_ignored(), 2);
    }
}
