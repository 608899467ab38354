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

//! Procedure and error URIs.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// A procedure name or an error identifier.
///
/// Well-known protocol URIs are available as associated constants.
///
/// # Example
///
/// ```rust
/// use wamprpc::wamp::Uri;
///
/// let uri = Uri::from("com.example.add");
/// assert_eq!(uri.as_str(), "com.example.add");
/// assert_eq!(Uri::CANCELED, "wamp.error.canceled");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Uri(Cow<'static, str>);

impl Uri {
    /// The call was canceled, by the caller or by a call timeout.
    pub const CANCELED: Uri = Uri::from_static("wamp.error.canceled");
    /// The arguments did not match what the procedure expects.
    pub const INVALID_ARGUMENT: Uri = Uri::from_static("wamp.error.invalid_argument");
    /// No procedure is registered under the called name.
    pub const NO_SUCH_PROCEDURE: Uri = Uri::from_static("wamp.error.no_such_procedure");
    /// The registration an invocation or unregister refers to does not exist.
    pub const NO_SUCH_REGISTRATION: Uri = Uri::from_static("wamp.error.no_such_registration");
    /// A procedure with the same name is already registered.
    pub const PROCEDURE_ALREADY_EXISTS: Uri =
        Uri::from_static("wamp.error.procedure_already_exists");
    /// Reason sent with GOODBYE on an orderly close.
    pub const CLOSE_NORMAL: Uri = Uri::from_static("wamp.close.normal");
    /// Reason sent with the GOODBYE answering the router's GOODBYE.
    pub const GOODBYE_AND_OUT: Uri = Uri::from_static("wamp.close.goodbye_and_out");

    /// Creates a URI from a static string without allocating.
    #[must_use]
    pub const fn from_static(uri: &'static str) -> Self {
        Self(Cow::Borrowed(uri))
    }

    /// Returns the URI text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&'static str> for Uri {
    fn from(uri: &'static str) -> Self {
        Self::from_static(uri)
    }
}

impl From<String> for Uri {
    fn from(uri: String) -> Self {
        Self(Cow::Owned(uri))
    }
}

impl PartialEq<&str> for Uri {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl PartialEq<str> for Uri {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl fmt::Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_and_owned_compare_equal() {
        let owned = Uri::from(String::from("wamp.error.canceled"));
        assert_eq!(owned, Uri::CANCELED);
        assert_eq!(owned, "wamp.error.canceled");
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let json = serde_json::to_string(&Uri::NO_SUCH_PROCEDURE).unwrap();
        assert_eq!(json, "\"wamp.error.no_such_procedure\"");
        let back: Uri = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Uri::NO_SUCH_PROCEDURE);
    }
}
