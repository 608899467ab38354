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

//! Retrying sends under transient backpressure.

use super::{RetryMetrics, RetryPolicy};
use crate::transport::{MessageSink, SendError};
use crate::wamp::Message;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

#[cfg(feature = "observability")]
use tracing::{debug, warn};

/// How a retried send ended.
#[derive(Debug)]
pub enum RetryOutcome {
    /// The transport accepted the message after `retries` retries.
    Sent {
        /// Number of retries that were needed.
        retries: u32,
    },
    /// The link is gone. Terminal.
    Closed(Message),
    /// The policy gave up while the buffer was still full. Terminal.
    Exhausted(Message),
    /// The cancellation token fired while waiting to retry.
    Cancelled(Message),
}

impl RetryOutcome {
    /// Returns `true` if the message was handed to the transport.
    pub fn is_sent(&self) -> bool {
        matches!(self, RetryOutcome::Sent { .. })
    }
}

/// Sends `message`, retrying according to `policy` while the transport
/// reports a full buffer.
///
/// Returns as soon as the message is accepted, the link closes, the policy
/// gives up or `cancel` fires. Only the transient class of failure is
/// retried; a closed link ends the loop at once.
///
/// # Examples
///
/// ```rust
/// use wamprpc::backpressure::{send_with_retry, FixedRetry, RetryMetrics};
/// use wamprpc::transport::{MemoryTransport, MessageSink, MessageSource};
/// use wamprpc::wamp::{Dict, Message, Uri};
/// use tokio_util::sync::CancellationToken;
/// use std::time::Duration;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let goodbye = || Message::Goodbye { details: Dict::new(), reason: Uri::CLOSE_NORMAL };
/// let (client, mut router) = MemoryTransport::pair(1);
/// client.sink().try_send(goodbye()).unwrap();
///
/// // Frees the slot after a while and stays connected for the retried send.
/// let drain = tokio::spawn(async move {
///     tokio::time::sleep(Duration::from_millis(10)).await;
///     let first = router.recv().await;
///     let second = router.recv().await;
///     (first, second)
/// });
///
/// let outcome = send_with_retry(
///     client.sink(),
///     goodbye(),
///     &FixedRetry::new(Duration::from_millis(2)),
///     &RetryMetrics::new(),
///     &CancellationToken::new(),
/// )
/// .await;
/// assert!(outcome.is_sent());
/// let (first, second) = drain.await.unwrap();
/// assert!(first.is_some() && second.is_some());
/// # }
/// ```
pub async fn send_with_retry<S>(
    sink: &S,
    message: Message,
    policy: &dyn RetryPolicy,
    metrics: &RetryMetrics,
    cancel: &CancellationToken,
) -> RetryOutcome
where
    S: MessageSink + ?Sized,
{
    let started = Instant::now();
    let mut attempt: u32 = 0;
    let mut message = message;

    loop {
        match sink.try_send(message) {
            Ok(()) => {
                #[cfg(feature = "observability")]
                if attempt > 0 {
                    debug!(
                        retries = attempt,
                        policy = policy.name(),
                        "Send accepted after backpressure"
                    );
                }
                return RetryOutcome::Sent { retries: attempt };
            }
            Err(SendError::Closed(returned)) => return RetryOutcome::Closed(returned),
            Err(SendError::Full(returned)) => {
                let Some(delay) = policy.next_delay(attempt, started.elapsed()) else {
                    metrics.record_exhausted();

                    #[cfg(feature = "observability")]
                    warn!(
                        retries = attempt,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        policy = policy.name(),
                        "Retry budget exhausted, peer treated as gone"
                    );
                    return RetryOutcome::Exhausted(returned);
                };
                metrics.record_retry(delay);
                attempt = attempt.saturating_add(1);
                message = returned;

                tokio::select! {
                    biased;
                    () = cancel.cancelled() => return RetryOutcome::Cancelled(message),
                    () = tokio::time::sleep(delay) => {}
                }
            }
        }
    }
}
