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

//! Transport layer error types.
//!
//! Transport errors are the lowest level of the error hierarchy. They describe
//! the state of the link to the router, never the outcome of a call.

use crate::wamp::Message;
use thiserror::Error;

/// Errors describing the state of the link to the router.
///
/// # Examples
///
/// ```rust
/// use wamprpc::transport::TransportError;
///
/// let error = TransportError::ConnectionLost {
///     reason: "router went away".to_string(),
/// };
/// assert!(error.is_recoverable());
/// assert!(!TransportError::Closed.is_recoverable());
/// ```
#[derive(Debug, Error)]
pub enum TransportError {
    /// The link was lost without an orderly close.
    #[error("connection lost: {reason}")]
    ConnectionLost {
        /// Description of why the link was lost
        reason: String,
    },

    /// The link was closed locally.
    #[error("transport is closed")]
    Closed,

    /// No link has been established.
    #[error("transport is not connected")]
    NotConnected,

    /// An operation on the link exceeded its time limit.
    #[error("operation timed out after {duration:?}")]
    Timeout {
        /// The duration that was exceeded
        duration: std::time::Duration,
    },
}

impl TransportError {
    /// Returns `true` if a new link could succeed where this one failed.
    pub fn is_recoverable(&self) -> bool {
        match self {
            TransportError::ConnectionLost { .. }
            | TransportError::NotConnected
            | TransportError::Timeout { .. } => true,
            TransportError::Closed => false,
        }
    }
}

/// Failure to hand a message to the transport.
///
/// Both variants return the message so the caller can retry or report it.
#[derive(Debug, Error)]
pub enum SendError {
    /// The peer's inbound buffer is momentarily full. Transient.
    #[error("transport buffer full, {} not sent", .0.message_type())]
    Full(Message),

    /// The link is gone. Terminal.
    #[error("transport closed, {} not sent", .0.message_type())]
    Closed(Message),
}

impl SendError {
    /// Returns `true` for the transient class of failure.
    pub fn is_transient(&self) -> bool {
        matches!(self, SendError::Full(_))
    }

    /// Recovers the message that could not be sent.
    pub fn into_message(self) -> Message {
        match self {
            SendError::Full(message) | SendError::Closed(message) => message,
        }
    }
}

impl From<SendError> for TransportError {
    fn from(error: SendError) -> Self {
        match error {
            SendError::Full(_) => TransportError::ConnectionLost {
                reason: "transport buffer full".to_string(),
            },
            SendError::Closed(_) => TransportError::Closed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wamp::{Dict, Uri};

    fn goodbye() -> Message {
        Message::Goodbye {
            details: Dict::new(),
            reason: Uri::CLOSE_NORMAL,
        }
    }

    #[test]
    fn test_send_error_classes() {
        let full = SendError::Full(goodbye());
        assert!(full.is_transient());
        assert_eq!(full.to_string(), "transport buffer full, GOODBYE not sent");

        let closed = SendError::Closed(goodbye());
        assert!(!closed.is_transient());
        assert_eq!(closed.into_message(), goodbye());
    }

    #[test]
    fn test_send_error_into_transport_error() {
        let error: TransportError = SendError::Closed(goodbye()).into();
        assert!(matches!(error, TransportError::Closed));
        assert!(!error.is_recoverable());
    }
}
