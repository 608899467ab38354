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

//! Argument codec.
//!
//! Calls and invocations carry their arguments as a positional [`List`] and
//! a keyword [`Dict`] of loosely-typed values. This module converts those
//! containers to and from statically typed Rust values using serde derived
//! implementations, so every decode step is generated at compile time.
//!
//! - [`unpack`] decodes a positional list into a tuple or `Vec<T>`
//! - [`unpack_dict`] decodes keyword arguments into a struct
//! - [`pack`] and [`pack_dict`] go the other way
//!
//! Field names map to keys through `#[serde(rename = "...")]`, optional keys
//! through `Option<_>` or `#[serde(default)]`, and ignored fields through
//! `#[serde(skip)]`.
//!
//! [`List`]: crate::wamp::List
//! [`Dict`]: crate::wamp::Dict

mod args;
mod error;

pub use args::{FromArgs, as_i64, as_str, pack, pack_dict, unpack, unpack_dict};
pub use error::ArgsError;
