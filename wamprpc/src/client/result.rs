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

//! Values produced by calls and by invocation handlers.

use crate::codec::{ArgsError, FromArgs, unpack};
use crate::wamp::{Dict, List, RequestId, ResultDetails, Uri, Value};

/// A progressive or final result delivered to a caller.
#[derive(Debug, Clone, PartialEq)]
pub struct CallResult {
    /// Request id of the call.
    pub request: RequestId,
    /// Result details.
    pub details: ResultDetails,
    /// Positional result.
    pub args: List,
    /// Keyword result.
    pub kwargs: Dict,
}

impl CallResult {
    /// Returns `true` if more results follow this one.
    pub fn is_progress(&self) -> bool {
        self.details.progress
    }

    /// Decodes the positional result.
    ///
    /// # Errors
    ///
    /// See [`unpack`].
    pub fn unpack<T: FromArgs>(&self) -> Result<T, ArgsError> {
        unpack(&self.args)
    }
}

/// What an invocation handler returns.
///
/// A result with an error URI is sent as ERROR, anything else as the final
/// YIELD.
///
/// # Examples
///
/// ```rust
/// use wamprpc::client::InvokeResult;
/// use wamprpc::wamp::Uri;
/// use serde_json::json;
///
/// let ok = InvokeResult::ok(vec![json!(55)]);
/// assert!(ok.error.is_none());
///
/// let failed = InvokeResult::err_with_message(Uri::INVALID_ARGUMENT, "expected a number");
/// assert_eq!(failed.error, Some(Uri::INVALID_ARGUMENT));
///
/// assert!(InvokeResult::canceled().is_canceled());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InvokeResult {
    /// Positional result or error payload.
    pub args: List,
    /// Keyword result or error payload.
    pub kwargs: Dict,
    /// Error URI. `None` for a successful result.
    pub error: Option<Uri>,
}

impl InvokeResult {
    /// A successful result.
    pub fn ok(args: List) -> Self {
        Self {
            args,
            ..Self::default()
        }
    }

    /// A failed result.
    pub fn error(error: Uri, args: List) -> Self {
        Self {
            args,
            kwargs: Dict::new(),
            error: Some(error),
        }
    }

    /// A failed result carrying a human readable message as its only
    /// argument.
    pub fn err_with_message(error: Uri, message: impl Into<String>) -> Self {
        Self::error(error, vec![Value::String(message.into())])
    }

    /// The sentinel a handler returns to report its invocation as canceled,
    /// typically after a progress send was rejected.
    pub fn canceled() -> Self {
        Self::error(Uri::CANCELED, List::new())
    }

    /// Attaches keyword arguments.
    pub fn with_kwargs(mut self, kwargs: Dict) -> Self {
        self.kwargs = kwargs;
        self
    }

    /// Returns `true` for the canceled sentinel.
    pub fn is_canceled(&self) -> bool {
        self.error.as_ref().is_some_and(|e| *e == Uri::CANCELED)
    }
}
