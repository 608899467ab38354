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

//! Backpressure handling for progressive results.
//!
//! A callee can produce progressive results faster than the caller consumes
//! them. When that happens the transport reports a full buffer, and the send
//! is retried on a [`RetryPolicy`] schedule instead of failing. Two classes
//! of failure are kept apart:
//!
//! - **Transient**: the buffer is momentarily full. The send waits and
//!   retries; the handler only sees added latency.
//! - **Terminal**: the link is closed, or the policy's budget ran out. The
//!   consumer is treated as gone and the send reports failure.
//!
//! # Available Policies
//!
//! - [`ExponentialRetry`]: 1 ms doubling to a 100 ms cap, 30 s budget (default)
//! - [`FixedRetry`]: constant interval, optional attempt ceiling
//!
//! # Examples
//!
//! ```rust
//! use wamprpc::backpressure::{ExponentialRetry, RetryPolicy};
//! use std::time::Duration;
//!
//! let policy = ExponentialRetry::builder()
//!     .budget(Duration::from_secs(5))
//!     .jitter(false)
//!     .build();
//!
//! let mut total = Duration::ZERO;
//! let mut attempt = 0;
//! while let Some(delay) = policy.next_delay(attempt, total) {
//!     total += delay;
//!     attempt += 1;
//! }
//! assert_eq!(total, Duration::from_secs(5));
//! ```

mod exponential;
mod fixed;
mod retry;
mod traits;

pub use exponential::{ExponentialRetry, ExponentialRetryBuilder};
pub use fixed::FixedRetry;
pub use retry::{RetryOutcome, send_with_retry};
pub use traits::{RetryMetrics, RetryPolicy};
