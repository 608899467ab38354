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

//! Typed option and detail records carried by RPC messages.
//!
//! Only the options this runtime acts on are modelled. They serialize with
//! the protocol's key names so a wire codec can embed them directly.

use super::Uri;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How a cancellation should be carried out by the router and the callee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CancelMode {
    /// Stop waiting for the result; the callee is not interrupted.
    Skip,
    /// Interrupt the callee and wait for it to acknowledge with an ERROR.
    Kill,
    /// Interrupt the callee without waiting for an acknowledgement.
    KillNoWait,
}

impl CancelMode {
    /// Returns the protocol spelling of the mode.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Skip => "skip",
            Self::Kill => "kill",
            Self::KillNoWait => "killnowait",
        }
    }
}

/// Options of a CALL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallOptions {
    /// Router-enforced call timeout in milliseconds. Zero or absent means none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,

    /// The caller accepts progressive results before the final one.
    #[serde(default, skip_serializing_if = "is_false")]
    pub receive_progress: bool,
}

impl CallOptions {
    /// Returns the timeout as a [`Duration`], treating zero as no timeout.
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
    }
}

/// Details of an INVOCATION.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationDetails {
    /// The caller asked for progressive results.
    #[serde(default, skip_serializing_if = "is_false")]
    pub receive_progress: bool,

    /// Procedure the caller named, when the router discloses it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub procedure: Option<Uri>,
}

/// Options of a YIELD.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct YieldOptions {
    /// This yield is a progressive result; more will follow.
    #[serde(default, skip_serializing_if = "is_false")]
    pub progress: bool,
}

/// Details of a RESULT.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultDetails {
    /// This result is a progressive result; more will follow.
    #[serde(default, skip_serializing_if = "is_false")]
    pub progress: bool,
}

/// Options of an INTERRUPT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterruptOptions {
    /// How the callee should wind the invocation down.
    pub mode: CancelMode,
}

/// Options of a CANCEL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelOptions {
    /// How the router should cancel the call.
    pub mode: CancelMode,
}

fn is_false(value: &bool) -> bool {
    !*value
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cancel_mode_spelling() {
        assert_eq!(
            serde_json::to_value(CancelMode::KillNoWait).unwrap(),
            json!("killnowait")
        );
        assert_eq!(CancelMode::Kill.as_str(), "kill");
    }

    #[test]
    fn test_call_options_omit_defaults() {
        let options = CallOptions::default();
        assert_eq!(serde_json::to_value(&options).unwrap(), json!({}));

        let options = CallOptions {
            timeout: Some(1000),
            receive_progress: true,
        };
        assert_eq!(
            serde_json::to_value(&options).unwrap(),
            json!({"timeout": 1000, "receive_progress": true})
        );
    }

    #[test]
    fn test_zero_timeout_means_none() {
        let options = CallOptions {
            timeout: Some(0),
            receive_progress: false,
        };
        assert_eq!(options.timeout(), None);
    }
}
