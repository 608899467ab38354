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

//! Tracking of requests awaiting a single acknowledgement.
//!
//! REGISTER and UNREGISTER are answered by exactly one message. Those
//! replies are routed back to the waiting task through this table.

use crate::wamp::RequestId;
use std::collections::HashMap;
use parking_lot::Mutex;
use tokio::sync::oneshot;

/// Tracks requests awaiting one reply.
///
/// Once [`close`](Self::close) has run, every waiting receiver observes a
/// closed channel and later registrations are refused.
///
/// The table is only touched under a short synchronous lock, so a waiter
/// can withdraw its entry from `Drop`.
///
/// # Example
///
/// ```rust,ignore
/// let pending = PendingRequests::<String>::new();
/// let rx = pending.register(RequestId::from(42)).unwrap();
/// pending.complete(RequestId::from(42), "ack".to_string());
/// assert_eq!(rx.await.unwrap(), "ack");
/// ```
#[derive(Debug)]
pub(crate) struct PendingRequests<T> {
    requests: Mutex<Table<T>>,
}

#[derive(Debug)]
struct Table<T> {
    closed: bool,
    waiting: HashMap<RequestId, oneshot::Sender<T>>,
}

impl<T> PendingRequests<T> {
    pub(crate) fn new() -> Self {
        Self {
            requests: Mutex::new(Table {
                closed: false,
                waiting: HashMap::new(),
            }),
        }
    }

    /// Register a request. Returns `None` once the table is closed.
    pub(crate) fn register(&self, request: RequestId) -> Option<oneshot::Receiver<T>> {
        let mut table = self.requests.lock();
        if table.closed {
            return None;
        }
        let (tx, rx) = oneshot::channel();
        table.waiting.insert(request, tx);
        Some(rx)
    }

    /// Complete a request with its reply.
    ///
    /// Returns `false` if nobody is waiting for `request`.
    pub(crate) fn complete(&self, request: RequestId, response: T) -> bool {
        let tx = self.requests.lock().waiting.remove(&request);
        match tx {
            Some(tx) => tx.send(response).is_ok(),
            None => false,
        }
    }

    /// Forget a request without completing it.
    pub(crate) fn cancel(&self, request: RequestId) -> bool {
        self.requests.lock().waiting.remove(&request).is_some()
    }

    /// Fail every waiting request and refuse new ones.
    pub(crate) fn close(&self) -> usize {
        let mut table = self.requests.lock();
        table.closed = true;
        let failed = table.waiting.len();
        table.waiting.clear();
        failed
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.requests.lock().waiting.len()
    }
}
