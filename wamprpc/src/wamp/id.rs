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

//! Session scoped identifiers.
//!
//! Request ids correlate every message that belongs to one call or one
//! invocation. The protocol restricts ids to the range `1..=2^53` so they
//! survive a round trip through serializers that only have doubles.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Largest id the protocol allows (2^53).
pub const MAX_ID: u64 = 1 << 53;

/// Identifies one request within a session.
///
/// # Example
///
/// ```rust
/// use wamprpc::wamp::RequestId;
///
/// let id = RequestId::from(42);
/// assert_eq!(id.as_u64(), 42);
/// assert_eq!(id.to_string(), "42");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(u64);

impl RequestId {
    /// Returns the raw id.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl From<u64> for RequestId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<RequestId> for u64 {
    fn from(id: RequestId) -> Self {
        id.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifies a procedure registration, assigned by the router.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegistrationId(u64);

impl RegistrationId {
    /// Returns the raw id.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl From<u64> for RegistrationId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for RegistrationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Generates session scoped request ids.
///
/// IDs start at 1 and increment by one. After [`MAX_ID`] the sequence wraps
/// back to 1; ID 0 is never produced. Generation is lock-free and the
/// generator can be shared between tasks.
///
/// # Example
///
/// ```rust
/// use wamprpc::wamp::RequestIdGenerator;
///
/// let generator = RequestIdGenerator::new();
/// let id1 = generator.next();
/// let id2 = generator.next();
/// assert_ne!(id1, id2);
/// assert_eq!(id1.as_u64(), 1);
/// ```
#[derive(Debug)]
pub struct RequestIdGenerator {
    next_id: AtomicU64,
}

impl RequestIdGenerator {
    /// Creates a generator that starts at 1.
    #[must_use]
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    /// Creates a generator whose first id is `first`.
    ///
    /// Values outside `1..=MAX_ID` start the sequence at 1.
    #[must_use]
    pub fn starting_at(first: u64) -> Self {
        let first = if first == 0 || first > MAX_ID { 1 } else { first };
        Self {
            next_id: AtomicU64::new(first),
        }
    }

    /// Returns the next id.
    #[must_use]
    pub fn next(&self) -> RequestId {
        let mut current = self.next_id.load(Ordering::Relaxed);
        loop {
            let following = if current >= MAX_ID { 1 } else { current + 1 };
            match self.next_id.compare_exchange_weak(
                current,
                following,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => return RequestId(current),
                Err(observed) => current = observed,
            }
        }
    }

    /// Returns the id the next call to [`next`](Self::next) will produce.
    #[must_use]
    pub fn current(&self) -> RequestId {
        RequestId(self.next_id.load(Ordering::Relaxed))
    }
}

impl Default for RequestIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}
