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

//! Messages exchanged between a client session and the router.

use super::{
    CallOptions, CancelOptions, Dict, InterruptOptions, InvocationDetails, List,
    RegistrationId, RequestId, ResultDetails, Uri, YieldOptions,
};
use std::fmt;

/// Message type codes, as assigned by the protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MessageType {
    /// Orderly session close.
    Goodbye = 6,
    /// Error reply to a request.
    Error = 8,
    /// Caller starts a call.
    Call = 48,
    /// Caller cancels a call.
    Cancel = 49,
    /// Router delivers a call result.
    Result = 50,
    /// Callee registers a procedure.
    Register = 64,
    /// Router acknowledges a registration.
    Registered = 65,
    /// Callee withdraws a registration.
    Unregister = 66,
    /// Router acknowledges an unregistration.
    Unregistered = 67,
    /// Router delivers a call to a callee.
    Invocation = 68,
    /// Router asks a callee to stop an invocation.
    Interrupt = 69,
    /// Callee answers an invocation.
    Yield = 70,
}

impl MessageType {
    /// Returns the protocol name of the message type.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Goodbye => "GOODBYE",
            Self::Error => "ERROR",
            Self::Call => "CALL",
            Self::Cancel => "CANCEL",
            Self::Result => "RESULT",
            Self::Register => "REGISTER",
            Self::Registered => "REGISTERED",
            Self::Unregister => "UNREGISTER",
            Self::Unregistered => "UNREGISTERED",
            Self::Invocation => "INVOCATION",
            Self::Interrupt => "INTERRUPT",
            Self::Yield => "YIELD",
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A protocol message.
///
/// Field names follow the protocol semantics, not a particular wire layout;
/// encoding is the transport's business.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// Callee → router: register `procedure`.
    Register {
        /// Correlates the REGISTERED or ERROR reply.
        request: RequestId,
        /// Registration options.
        options: Dict,
        /// Procedure to register.
        procedure: Uri,
    },
    /// Router → callee: registration accepted.
    Registered {
        /// Request id of the REGISTER.
        request: RequestId,
        /// Router assigned registration id.
        registration: RegistrationId,
    },
    /// Callee → router: withdraw a registration.
    Unregister {
        /// Correlates the UNREGISTERED or ERROR reply.
        request: RequestId,
        /// Registration to withdraw.
        registration: RegistrationId,
    },
    /// Router → callee: unregistration accepted.
    Unregistered {
        /// Request id of the UNREGISTER.
        request: RequestId,
    },
    /// Caller → router: initiate a remote call.
    Call {
        /// Correlates every reply for this call.
        request: RequestId,
        /// Call options.
        options: CallOptions,
        /// Procedure to call.
        procedure: Uri,
        /// Positional arguments.
        args: List,
        /// Keyword arguments.
        kwargs: Dict,
    },
    /// Caller → router: cancel an outstanding call.
    Cancel {
        /// Request id of the CALL.
        request: RequestId,
        /// Cancel options.
        options: CancelOptions,
    },
    /// Router → callee: deliver a call to the registered handler.
    Invocation {
        /// Correlates the YIELD, ERROR and INTERRUPT for this invocation.
        request: RequestId,
        /// Registration the call was matched to.
        registration: RegistrationId,
        /// Invocation details.
        details: InvocationDetails,
        /// Positional arguments.
        args: List,
        /// Keyword arguments.
        kwargs: Dict,
    },
    /// Router → callee: request cancellation of a running invocation.
    Interrupt {
        /// Request id of the INVOCATION.
        request: RequestId,
        /// Interrupt options.
        options: InterruptOptions,
    },
    /// Callee → router: progressive or final result.
    Yield {
        /// Request id of the INVOCATION.
        request: RequestId,
        /// Yield options.
        options: YieldOptions,
        /// Positional result.
        args: List,
        /// Keyword result.
        kwargs: Dict,
    },
    /// Router → caller: progressive or final result.
    Result {
        /// Request id of the CALL.
        request: RequestId,
        /// Result details.
        details: ResultDetails,
        /// Positional result.
        args: List,
        /// Keyword result.
        kwargs: Dict,
    },
    /// Either direction: terminal failure of a request.
    Error {
        /// Type of the request this error answers.
        request_type: MessageType,
        /// Request id of that request.
        request: RequestId,
        /// Error details.
        details: Dict,
        /// Error URI.
        error: Uri,
        /// Positional error payload.
        args: List,
        /// Keyword error payload.
        kwargs: Dict,
    },
    /// Either direction: close the session.
    Goodbye {
        /// Close details.
        details: Dict,
        /// Close reason.
        reason: Uri,
    },
}

impl Message {
    /// Returns the type code of this message.
    #[must_use]
    pub const fn message_type(&self) -> MessageType {
        match self {
            Self::Register { .. } => MessageType::Register,
            Self::Registered { .. } => MessageType::Registered,
            Self::Unregister { .. } => MessageType::Unregister,
            Self::Unregistered { .. } => MessageType::Unregistered,
            Self::Call { .. } => MessageType::Call,
            Self::Cancel { .. } => MessageType::Cancel,
            Self::Invocation { .. } => MessageType::Invocation,
            Self::Interrupt { .. } => MessageType::Interrupt,
            Self::Yield { .. } => MessageType::Yield,
            Self::Result { .. } => MessageType::Result,
            Self::Error { .. } => MessageType::Error,
            Self::Goodbye { .. } => MessageType::Goodbye,
        }
    }

    /// Returns the request id the message belongs to, if it has one.
    #[must_use]
    pub const fn request(&self) -> Option<RequestId> {
        match self {
            Self::Register { request, .. }
            | Self::Registered { request, .. }
            | Self::Unregister { request, .. }
            | Self::Unregistered { request }
            | Self::Call { request, .. }
            | Self::Cancel { request, .. }
            | Self::Invocation { request, .. }
            | Self::Interrupt { request, .. }
            | Self::Yield { request, .. }
            | Self::Result { request, .. }
            | Self::Error { request, .. } => Some(*request),
            Self::Goodbye { .. } => None,
        }
    }

    /// Returns true for a YIELD or RESULT flagged as progressive.
    #[must_use]
    pub const fn is_progress(&self) -> bool {
        match self {
            Self::Yield { options, .. } => options.progress,
            Self::Result { details, .. } => details.progress,
            _ => false,
        }
    }
}
