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

use super::RetryPolicy;
use std::time::Duration;

/// Retry at a constant interval, optionally a bounded number of times.
///
/// Mostly useful in tests, where a predictable schedule matters more than
/// adapting to the peer.
///
/// # Examples
///
/// ```rust
/// use wamprpc::backpressure::{FixedRetry, RetryPolicy};
/// use std::time::Duration;
///
/// let policy = FixedRetry::new(Duration::from_millis(5)).with_max_attempts(2);
/// assert_eq!(policy.next_delay(0, Duration::ZERO), Some(Duration::from_millis(5)));
/// assert_eq!(policy.next_delay(2, Duration::ZERO), None);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct FixedRetry {
    delay: Duration,
    max_attempts: Option<u32>,
}

impl FixedRetry {
    /// Retry every `delay`, without limit.
    pub const fn new(delay: Duration) -> Self {
        Self {
            delay,
            max_attempts: None,
        }
    }

    /// Never retry. The first full buffer exhausts the policy.
    pub const fn never() -> Self {
        Self {
            delay: Duration::ZERO,
            max_attempts: Some(0),
        }
    }

    /// Give up after `max` retries.
    pub const fn with_max_attempts(mut self, max: u32) -> Self {
        self.max_attempts = Some(max);
        self
    }
}

impl RetryPolicy for FixedRetry {
    fn next_delay(&self, attempt: u32, _elapsed: Duration) -> Option<Duration> {
        match self.max_attempts {
            Some(max) if attempt >= max => None,
            _ => Some(self.delay),
        }
    }

    fn name(&self) -> &str {
        "FixedRetry"
    }
}
