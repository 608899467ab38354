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

//! Error types for argument conversion.

use thiserror::Error;

/// Errors raised while converting between protocol arguments and typed values.
#[derive(Debug, Error)]
pub enum ArgsError {
    /// The argument list has the wrong number of elements.
    #[error("unexpected number of arguments: expected {expected}, got {actual}")]
    Arity {
        /// Number of arguments the target type takes.
        expected: usize,
        /// Number of arguments supplied.
        actual: usize,
    },

    /// One positional argument could not be decoded.
    #[error("cannot unpack argument {index}: {source}")]
    Argument {
        /// Zero based position of the argument.
        index: usize,
        /// The decode failure.
        #[source]
        source: serde_json::Error,
    },

    /// The positional list as a whole could not be decoded.
    #[error("cannot unpack argument list: {source}")]
    List {
        /// The decode failure.
        #[source]
        source: serde_json::Error,
    },

    /// The keyword dictionary could not be decoded.
    #[error("cannot unpack keyword arguments: {source}")]
    Keywords {
        /// The decode failure.
        #[source]
        source: serde_json::Error,
    },

    /// A value could not be encoded.
    #[error("cannot pack value: {source}")]
    Encode {
        /// The encode failure.
        #[source]
        source: serde_json::Error,
    },

    /// A value packed as positional arguments did not encode to a list.
    #[error("value does not pack to an argument list")]
    NotAList,

    /// A value packed as keyword arguments did not encode to a dictionary.
    #[error("value does not pack to a keyword dictionary")]
    NotADict,
}

impl ArgsError {
    /// Returns the position of the failing argument, if the error names one.
    #[must_use]
    pub const fn index(&self) -> Option<usize> {
        match self {
            Self::Argument { index, .. } => Some(*index),
            _ => None,
        }
    }
}
