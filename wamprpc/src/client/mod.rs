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

//! The client session: caller and callee sides of the RPC lifecycle.
//!
//! A [`Client`] plays both roles over one link to the router:
//!
//! - **Caller**: [`Client::call`] issues a CALL and resolves exactly once
//!   with the final RESULT or an error. Progressive results are handed to
//!   the request's progress handler in arrival order through a per-call
//!   queue. A slow handler delays only its own call; nothing is lost and
//!   other calls on the session are not held up.
//! - **Callee**: [`Client::register`] attaches a handler to a procedure.
//!   Each INVOCATION runs the handler on its own task with an
//!   [`Invocation`] carrying the arguments, a cancellation signal and a
//!   progress sender. Once the caller is gone, the invocation was
//!   interrupted or the handler returned, progress sends fail with the
//!   sticky [`ProgressError`](crate::ProgressError).
//!
//! INTERRUPTs are applied at most once per invocation; duplicates and late
//! arrivals are counted and dropped. Closing the session resolves every
//! outstanding call with [`ClientError::NotConnected`](crate::ClientError)
//! and cancels every running invocation.

mod call;
mod cancel;
#[allow(clippy::module_inception)]
mod client;
mod config;
mod invocation;
mod metrics;
mod pending;
mod registry;
mod result;

pub use call::{CallRequest, ProgressHandler};
pub use client::Client;
pub use config::ClientConfig;
pub use invocation::{Handler, Invocation, ProgressSender};
pub use metrics::ClientMetrics;
pub use result::{CallResult, InvokeResult};
