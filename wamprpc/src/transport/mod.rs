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

//! Transport seam between the client runtime and the router.
//!
//! The client speaks to the router through a pair of traits:
//!
//! - [`MessageSink`]: ordered outbound delivery with a non-blocking
//!   [`try_send`](MessageSink::try_send) that distinguishes a full buffer
//!   from a closed link
//! - [`MessageSource`]: ordered inbound delivery ending in `None`
//!
//! Wire encodings, framing and connection setup live behind these traits.
//! [`MemoryTransport`] is the in-process implementation.

mod error;
mod memory;
mod traits;

pub use error::{SendError, TransportError};
pub use memory::{DEFAULT_BUFFER_SIZE, MemorySink, MemorySource, MemoryTransport};
pub use traits::{MessageSink, MessageSource};
