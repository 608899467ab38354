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

//! Top-level error types for the client runtime.
//!
//! Errors are layered:
//!
//! 1. **Transport**: the link to the router ([`TransportError`])
//! 2. **Protocol**: remote failures reported by ERROR ([`RpcError`]) and
//!    messages that break the protocol contract
//! 3. **Client**: what a call or registration resolves to ([`ClientError`])
//!
//! Callee handlers see one more error, [`ProgressError`], which is never sent
//! to the router.
//!
//! # Error Handling Strategy
//!
//! - **Not connected** → the session is gone; every pending call fails with it
//! - **Remote application error** → returned to the caller, never retried
//! - **Remote cancellation** → returned as an [`RpcError`] whose URI is
//!   `wamp.error.canceled`, distinguishable with [`ClientError::is_remote_cancel`]
//! - **Local cancellation** → [`ClientError::Canceled`], nothing remote attached
//!
//! # Examples
//!
//! ```rust
//! use wamprpc::{ClientError, RpcError};
//! use wamprpc::wamp::{RequestId, Uri};
//!
//! let error: ClientError = RpcError::new(RequestId::from(1), Uri::CANCELED).into();
//! assert!(error.is_canceled());
//! assert!(error.is_remote_cancel());
//!
//! let error = ClientError::NotConnected;
//! assert!(!error.is_canceled());
//! assert!(error.is_recoverable());
//! ```

use crate::codec::ArgsError;
use crate::transport::TransportError;
use crate::wamp::{Dict, List, RequestId, Uri};
use std::fmt;
use thiserror::Error;

/// A failure reported by the router or the remote peer through ERROR.
#[derive(Debug, Clone, PartialEq)]
pub struct RpcError {
    /// Request the error answers.
    pub request: RequestId,
    /// Error URI.
    pub error: Uri,
    /// Positional error payload.
    pub args: List,
    /// Keyword error payload.
    pub kwargs: Dict,
    /// Error details.
    pub details: Dict,
}

impl RpcError {
    /// Creates an error with an empty payload.
    #[must_use]
    pub fn new(request: RequestId, error: Uri) -> Self {
        Self {
            request,
            error,
            args: List::new(),
            kwargs: Dict::new(),
            details: Dict::new(),
        }
    }

    /// Returns `true` if the remote side reported a cancellation.
    #[must_use]
    pub fn is_canceled(&self) -> bool {
        self.error == Uri::CANCELED
    }

    /// Returns the human readable message, if the first positional argument
    /// carries one.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.args.first().and_then(|v| v.as_str())
    }
}

impl fmt::Display for RpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.message() {
            Some(message) => write!(f, "{}: {}", self.error, message),
            None => write!(f, "{}", self.error),
        }
    }
}

impl std::error::Error for RpcError {}

/// Errors returned by [`Client`](crate::client::Client) operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The session closed, or was never open, while the operation was
    /// outstanding.
    #[error("not connected")]
    NotConnected,

    /// The caller abandoned the operation locally. Nothing remote is
    /// attached; any later reply for it is discarded.
    #[error("canceled by caller")]
    Canceled,

    /// The router or the remote peer answered with ERROR.
    #[error("rpc error: {0}")]
    Rpc(#[from] RpcError),

    /// A procedure with this name is already registered by this client.
    ///
    /// Mirrors `wamp.error.procedure_already_exists`.
    #[error("procedure already registered: {procedure}")]
    AlreadyRegistered {
        /// The procedure in question
        procedure: Uri,
    },

    /// The procedure is not registered by this client.
    ///
    /// Mirrors `wamp.error.no_such_registration`.
    #[error("procedure not registered: {procedure}")]
    NotRegistered {
        /// The procedure in question
        procedure: Uri,
    },

    /// The router sent a message that breaks the protocol contract.
    #[error("protocol violation: {reason}")]
    Protocol {
        /// What was wrong
        reason: String,
    },

    /// Arguments could not be packed or unpacked.
    #[error(transparent)]
    Args(#[from] ArgsError),

    /// The transport failed.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl ClientError {
    /// Returns `true` for local or remote cancellation.
    #[must_use]
    pub fn is_canceled(&self) -> bool {
        match self {
            Self::Canceled => true,
            Self::Rpc(e) => e.is_canceled(),
            _ => false,
        }
    }

    /// Returns `true` only for a cancellation reported by the router.
    #[must_use]
    pub fn is_remote_cancel(&self) -> bool {
        matches!(self, Self::Rpc(e) if e.is_canceled())
    }

    /// Returns `true` if retrying on a new session could succeed.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::NotConnected => true,
            Self::Transport(e) => e.is_recoverable(),
            _ => false,
        }
    }

    /// Returns the remote error, if this is one.
    #[must_use]
    pub fn as_rpc(&self) -> Option<&RpcError> {
        match self {
            Self::Rpc(e) => Some(e),
            _ => None,
        }
    }
}

/// The sticky error a callee sees once its caller stops accepting
/// progressive results.
///
/// Once returned for an invocation it is returned, unchanged, by every later
/// progress send for the same invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ProgressError {
    /// The caller is gone, the call was cancelled, or the caller never asked
    /// for progressive results.
    #[error("caller not accepting progressive results")]
    CallerNotAccepting,
}
