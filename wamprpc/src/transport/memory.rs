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

//! In-memory transport implementation.
//!
//! This module provides a message link built on bounded Tokio channels. It
//! is used by tests and by embedders that host the router in the same
//! process. The bound makes backpressure observable: once `capacity`
//! messages are queued, [`MessageSink::try_send`] reports
//! [`SendError::Full`] until the peer drains the queue.

use super::{MessageSink, MessageSource, SendError};
use crate::wamp::Message;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;

#[cfg(feature = "observability")]
use tracing::debug;

/// Global counter for generating unique link ids.
static NEXT_MEMORY_LINK_ID: AtomicU64 = AtomicU64::new(1);

/// Default buffer size for memory transport channels.
pub const DEFAULT_BUFFER_SIZE: usize = 1024;

/// One end of an in-memory link.
///
/// # Examples
///
/// ```rust
/// use wamprpc::transport::{MemoryTransport, MessageSink, SendError};
/// use wamprpc::wamp::{Dict, Message, Uri};
///
/// let goodbye = || Message::Goodbye { details: Dict::new(), reason: Uri::CLOSE_NORMAL };
///
/// // A link that holds a single message exposes backpressure immediately.
/// let (client, _router) = MemoryTransport::pair(1);
/// client.sink().try_send(goodbye()).unwrap();
/// assert!(matches!(client.sink().try_send(goodbye()), Err(SendError::Full(_))));
/// ```
#[derive(Debug)]
pub struct MemoryTransport {
    sink: MemorySink,
    source: MemorySource,
}

impl MemoryTransport {
    /// Creates two connected ends, each buffering up to `capacity` inbound
    /// messages.
    pub fn pair(capacity: usize) -> (Self, Self) {
        let capacity = capacity.max(1);
        let (a_tx, a_rx) = mpsc::channel(capacity);
        let (b_tx, b_rx) = mpsc::channel(capacity);
        let a_id = NEXT_MEMORY_LINK_ID.fetch_add(1, Ordering::Relaxed);
        let b_id = NEXT_MEMORY_LINK_ID.fetch_add(1, Ordering::Relaxed);

        #[cfg(feature = "observability")]
        debug!(a = a_id, b = b_id, capacity, "Memory link created");

        let a = Self {
            sink: MemorySink::new(a_id, b_tx),
            source: MemorySource { id: a_id, rx: a_rx },
        };
        let b = Self {
            sink: MemorySink::new(b_id, a_tx),
            source: MemorySource { id: b_id, rx: b_rx },
        };
        (a, b)
    }

    /// Creates two connected ends with [`DEFAULT_BUFFER_SIZE`].
    pub fn default_pair() -> (Self, Self) {
        Self::pair(DEFAULT_BUFFER_SIZE)
    }

    /// Returns the id of this end, for logging.
    pub fn id(&self) -> u64 {
        self.sink.id
    }

    /// Returns the outbound half.
    pub fn sink(&self) -> &MemorySink {
        &self.sink
    }

    /// Splits this end into its outbound and inbound halves.
    pub fn into_split(self) -> (MemorySink, MemorySource) {
        (self.sink, self.source)
    }
}

#[async_trait]
impl MessageSource for MemoryTransport {
    async fn recv(&mut self) -> Option<Message> {
        self.source.recv().await
    }
}

/// Outbound half of a [`MemoryTransport`].
#[derive(Debug)]
pub struct MemorySink {
    id: u64,
    tx: Mutex<Option<mpsc::Sender<Message>>>,
}

impl MemorySink {
    fn new(id: u64, tx: mpsc::Sender<Message>) -> Self {
        Self {
            id,
            tx: Mutex::new(Some(tx)),
        }
    }

    fn sender(&self) -> Option<mpsc::Sender<Message>> {
        self.tx.lock().clone()
    }
}

#[async_trait]
impl MessageSink for MemorySink {
    fn try_send(&self, message: Message) -> Result<(), SendError> {
        let guard = self.tx.lock();
        let Some(tx) = guard.as_ref() else {
            return Err(SendError::Closed(message));
        };
        tx.try_send(message).map_err(|e| match e {
            mpsc::error::TrySendError::Full(message) => SendError::Full(message),
            mpsc::error::TrySendError::Closed(message) => SendError::Closed(message),
        })
    }

    async fn send(&self, message: Message) -> Result<(), SendError> {
        let Some(tx) = self.sender() else {
            return Err(SendError::Closed(message));
        };
        tx.send(message)
            .await
            .map_err(|mpsc::error::SendError(message)| SendError::Closed(message))
    }

    async fn close(&self) {
        if self.tx.lock().take().is_some() {
            #[cfg(feature = "observability")]
            debug!(link = self.id, "Memory link closed");
        }
    }

    fn is_closed(&self) -> bool {
        self.tx.lock().as_ref().is_none_or(mpsc::Sender::is_closed)
    }
}

/// Inbound half of a [`MemoryTransport`].
#[derive(Debug)]
pub struct MemorySource {
    #[cfg_attr(not(feature = "observability"), allow(dead_code))]
    id: u64,
    rx: mpsc::Receiver<Message>,
}

#[async_trait]
impl MessageSource for MemorySource {
    async fn recv(&mut self) -> Option<Message> {
        let message = self.rx.recv().await;

        #[cfg(feature = "observability")]
        if message.is_none() {
            debug!(link = self.id, "Memory link drained");
        }

        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wamp::{Dict, RequestId, Uri};

    fn goodbye() -> Message {
        Message::Goodbye {
            details: Dict::new(),
            reason: Uri::CLOSE_NORMAL,
        }
    }

    #[tokio::test]
    async fn test_pair_delivers_in_order() {
        let (a, mut b) = MemoryTransport::pair(16);
        for n in 1..=5u64 {
            a.sink()
                .send(Message::Unregistered {
                    request: RequestId::from(n),
                })
                .await
                .unwrap();
        }
        for n in 1..=5u64 {
            let message = b.recv().await.unwrap();
            assert_eq!(message.request(), Some(RequestId::from(n)));
        }
    }

    #[tokio::test]
    async fn test_full_then_drained() {
        let (a, mut b) = MemoryTransport::pair(1);
        a.sink().try_send(goodbye()).unwrap();
        let err = a.sink().try_send(goodbye()).unwrap_err();
        assert!(err.is_transient());

        b.recv().await.unwrap();
        a.sink().try_send(err.into_message()).unwrap();
    }

    #[tokio::test]
    async fn test_close_ends_peer_stream() {
        let (a, mut b) = MemoryTransport::pair(4);
        a.sink().send(goodbye()).await.unwrap();
        a.sink().close().await;

        assert!(a.sink().is_closed());
        assert!(matches!(
            a.sink().try_send(goodbye()),
            Err(SendError::Closed(_))
        ));
        assert!(b.recv().await.is_some());
        assert!(b.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_dropped_peer_is_closed() {
        let (a, b) = MemoryTransport::pair(4);
        drop(b);
        assert!(a.sink().is_closed());
        assert!(matches!(
            a.sink().send(goodbye()).await,
            Err(SendError::Closed(_))
        ));
    }
}
