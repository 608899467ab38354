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

use super::SendError;
use crate::wamp::Message;
use async_trait::async_trait;

/// Outbound half of an ordered, reliable link to the router.
///
/// Implementations must preserve the order in which messages are accepted.
/// Serialization and framing are the implementation's business; the client
/// only ever deals in [`Message`] values.
///
/// # Failure classes
///
/// A send fails in one of two ways, and the client runtime treats them very
/// differently:
///
/// - [`SendError::Full`]: the peer is consuming slower than we produce. The
///   message is handed back and may be retried.
/// - [`SendError::Closed`]: the link is gone. Retrying cannot succeed.
///
/// # Examples
///
/// ```rust
/// use wamprpc::transport::{MemoryTransport, MessageSink, MessageSource};
/// use wamprpc::wamp::{Dict, Message, Uri};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let (client, mut router) = MemoryTransport::pair(8);
/// client
///     .sink()
///     .send(Message::Goodbye { details: Dict::new(), reason: Uri::CLOSE_NORMAL })
///     .await
///     .unwrap();
/// assert!(matches!(router.recv().await, Some(Message::Goodbye { .. })));
/// # }
/// ```
#[async_trait]
pub trait MessageSink: Send + Sync + 'static {
    /// Hands `message` to the link without waiting.
    ///
    /// # Errors
    ///
    /// [`SendError::Full`] if the link has no capacity right now,
    /// [`SendError::Closed`] if the link is gone.
    fn try_send(&self, message: Message) -> Result<(), SendError>;

    /// Hands `message` to the link, waiting for capacity if necessary.
    ///
    /// # Errors
    ///
    /// [`SendError::Closed`] if the link is gone.
    async fn send(&self, message: Message) -> Result<(), SendError>;

    /// Severs the link. Later sends fail with [`SendError::Closed`] and the
    /// peer's receive side observes the end of the stream once in-flight
    /// messages are drained.
    async fn close(&self);

    /// Returns `true` once the link can no longer carry messages.
    fn is_closed(&self) -> bool;
}

/// Inbound half of a link to the router.
#[async_trait]
pub trait MessageSource: Send + 'static {
    /// Waits for the next message.
    ///
    /// Returns `None` once the peer is gone and every buffered message has
    /// been delivered.
    async fn recv(&mut self) -> Option<Message>;
}
