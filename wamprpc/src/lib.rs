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

#![allow(clippy::module_inception)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

//! # wamprpc - Client-side RPC runtime for routed messaging
//!
//! wamprpc implements the caller and callee halves of a routed RPC protocol
//! in the style of WAMP. A router relays correlated messages between peers;
//! this crate owns the state machines that must agree with it:
//!
//! - **Calls** that resolve exactly once, after zero or more progressive
//!   results delivered in order
//! - **Invocations** that run a registered handler on their own task and
//!   stream progressive results back
//! - **Cancellation** through router timeouts, INTERRUPT and local
//!   cancellation, applied idempotently
//! - **Backpressure** that retries a full link instead of dropping data, and
//!   a sticky error once the caller is definitively gone
//! - **Leak-free shutdown**: closing a session resolves every call and
//!   cancels every handler
//!
//! ## Architecture
//!
//! - **[`wamp`]**: ids, URIs, typed options and the [`Message`](wamp::Message) enum
//! - **[`codec`]**: typed argument packing and unpacking
//! - **[`transport`]**: the sink/source seam to the router and an in-memory link
//! - **[`backpressure`]**: retry policies for full links
//! - **[`client`]**: the session, call tracking and invocation tracking
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use wamprpc::client::{CallRequest, Client, ClientConfig};
//! use wamprpc::transport::MemoryTransport;
//!
//! # async fn example(link: MemoryTransport) -> Result<(), wamprpc::ClientError> {
//! let client = Client::from_memory(ClientConfig::default(), link);
//!
//! let result = client
//!     .call(
//!         CallRequest::new("com.example.count")
//!             .arg(10)
//!             .on_progress(|progress| println!("progress: {:?}", progress.args)),
//!     )
//!     .await?;
//! println!("final: {:?}", result.args);
//!
//! client.close().await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Feature Flags
//!
//! - `observability` (default): structured logging through `tracing` and
//!   counters through `metrics`

pub mod backpressure;
pub mod client;
pub mod codec;
pub mod error;
pub mod transport;
pub mod wamp;

pub use client::{CallRequest, CallResult, Client, ClientConfig, Invocation, InvokeResult};
pub use codec::ArgsError;
pub use error::{ClientError, ProgressError, RpcError};
