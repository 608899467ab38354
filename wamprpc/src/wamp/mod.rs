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

//! Protocol data model.
//!
//! This module holds the message contract shared by the client runtime and
//! the router: request and registration ids, URIs, the typed options of the
//! RPC messages and the [`Message`] enum itself.
//!
//! # Message flow
//!
//! ```text
//! caller            router             callee
//!   | CALL ------------> |                  |
//!   |                    | INVOCATION -----> |
//!   |                    | <----- YIELD(progress)
//!   | <--- RESULT(progress)                 |
//!   |                    | <-------- YIELD   |
//!   | <---------- RESULT |                  |
//! ```
//!
//! Arguments travel as loosely-typed [`List`] and [`Dict`] containers; see
//! [`crate::codec`] for typed conversion.

mod id;
mod message;
mod options;
mod roles;
mod uri;

pub use id::{MAX_ID, RegistrationId, RequestId, RequestIdGenerator};
pub use message::{Message, MessageType};
pub use options::{
    CallOptions, CancelMode, CancelOptions, InterruptOptions, InvocationDetails, ResultDetails,
    YieldOptions,
};
pub use roles::{
    FEATURE_CALL_CANCELING, FEATURE_CALL_TIMEOUT, FEATURE_PROGRESSIVE_CALL_RESULTS, ROLE_DEALER,
    RouterRoles,
};
pub use uri::Uri;

/// A single loosely-typed protocol value.
pub type Value = serde_json::Value;

/// Positional arguments.
pub type List = Vec<Value>;

/// Keyword arguments and option dictionaries.
pub type Dict = serde_json::Map<String, Value>;
