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

/// Exponential retry with a per-wait cap and an overall time budget.
///
/// Delays start at `initial_delay` and grow by `multiplier` per attempt up
/// to `max_delay`. Once `budget` has been spent retrying one send the policy
/// gives up.
///
/// Defaults: 1 ms initial delay, doubling, 100 ms cap, 30 s budget, jitter
/// on, no attempt ceiling.
///
/// # Examples
///
/// ```
/// use wamprpc::backpressure::ExponentialRetry;
/// use std::time::Duration;
///
/// // Default configuration
/// let policy = ExponentialRetry::default();
///
/// // Custom configuration
/// let policy = ExponentialRetry::builder()
///     .initial_delay(Duration::from_millis(5))
///     .max_delay(Duration::from_millis(250))
///     .multiplier(2.0)
///     .budget(Duration::from_secs(10))
///     .jitter(false)
///     .max_attempts(Some(100))
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct ExponentialRetry {
    /// Delay before the first retry
    initial_delay: Duration,
    /// Maximum delay between retries
    max_delay: Duration,
    /// Multiplier for exponential growth
    multiplier: f64,
    /// Total time one send may spend retrying
    budget: Duration,
    /// Whether to add jitter to delays
    jitter: bool,
    /// Maximum number of retries (None = bounded by budget only)
    max_attempts: Option<u32>,
}

impl Default for ExponentialRetry {
    fn default() -> Self {
        ExponentialRetryBuilder::default().build()
    }
}

impl ExponentialRetry {
    /// Create a new builder for configuring exponential retry.
    pub fn builder() -> ExponentialRetryBuilder {
        ExponentialRetryBuilder::default()
    }

    /// Returns the overall time budget.
    pub fn budget(&self) -> Duration {
        self.budget
    }

    /// Calculate delay with optional jitter.
    fn calculate_delay(&self, attempt: u32) -> Duration {
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let base_delay_ms = self.initial_delay.as_millis() as f64 * self.multiplier.powi(exponent);
        let capped_ms = base_delay_ms.min(self.max_delay.as_millis() as f64).max(0.0);
        let capped_delay = Duration::from_millis(capped_ms as u64);

        if self.jitter {
            // Equal jitter: never less than half the capped delay.
            let half = capped_delay / 2;
            let jitter_ms = (rand::random::<f64>() * half.as_millis() as f64) as u64;
            half + Duration::from_millis(jitter_ms)
        } else {
            capped_delay
        }
    }
}

impl RetryPolicy for ExponentialRetry {
    fn next_delay(&self, attempt: u32, elapsed: Duration) -> Option<Duration> {
        if elapsed >= self.budget {
            return None;
        }
        if let Some(max) = self.max_attempts {
            if attempt >= max {
                return None;
            }
        }
        let remaining = self.budget - elapsed;
        Some(self.calculate_delay(attempt).min(remaining))
    }

    fn name(&self) -> &str {
        "ExponentialRetry"
    }
}

/// Builder for configuring exponential retry.
#[derive(Debug)]
pub struct ExponentialRetryBuilder {
    initial_delay: Duration,
    max_delay: Duration,
    multiplier: f64,
    budget: Duration,
    jitter: bool,
    max_attempts: Option<u32>,
}

impl Default for ExponentialRetryBuilder {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(100),
            multiplier: 2.0,
            budget: Duration::from_secs(30),
            jitter: true,
            max_attempts: None,
        }
    }
}

impl ExponentialRetryBuilder {
    /// Set the delay before the first retry.
    pub fn initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Set the maximum delay between retries.
    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Set the multiplier for exponential growth.
    pub fn multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }

    /// Set the total time one send may spend retrying.
    pub fn budget(mut self, budget: Duration) -> Self {
        self.budget = budget;
        self
    }

    /// Enable or disable jitter.
    pub fn jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    /// Set the maximum number of retries.
    pub fn max_attempts(mut self, max: Option<u32>) -> Self {
        self.max_attempts = max;
        self
    }

    /// Build the exponential retry policy.
    pub fn build(self) -> ExponentialRetry {
        ExponentialRetry {
            initial_delay: self.initial_delay,
            max_delay: self.max_delay,
            multiplier: self.multiplier,
            budget: self.budget,
            jitter: self.jitter,
            max_attempts: self.max_attempts,
        }
    }
}
