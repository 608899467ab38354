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

//! Router role and feature announcements.

use super::{Dict, Value};
use serde_json::json;

/// Role name of the router's RPC half.
pub const ROLE_DEALER: &str = "dealer";

/// Dealer feature: progressive call results.
pub const FEATURE_PROGRESSIVE_CALL_RESULTS: &str = "progressive_call_results";
/// Dealer feature: router-enforced call timeouts.
pub const FEATURE_CALL_TIMEOUT: &str = "call_timeout";
/// Dealer feature: call cancellation.
pub const FEATURE_CALL_CANCELING: &str = "call_canceling";

/// The roles and features a router announced when the session was opened.
///
/// The layout mirrors the `roles` entry of the router's welcome details:
/// `{"dealer": {"features": {"progressive_call_results": true}}}`.
///
/// # Example
///
/// ```rust
/// use wamprpc::wamp::{RouterRoles, ROLE_DEALER, FEATURE_PROGRESSIVE_CALL_RESULTS};
///
/// let roles = RouterRoles::dealer_with_rpc_features();
/// assert!(roles.has_feature(ROLE_DEALER, FEATURE_PROGRESSIVE_CALL_RESULTS));
/// assert!(!roles.has_feature("broker", "pattern_based_subscription"));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouterRoles {
    roles: Dict,
}

impl RouterRoles {
    /// Wraps an announced roles dictionary.
    #[must_use]
    pub fn new(roles: Dict) -> Self {
        Self { roles }
    }

    /// A dealer announcing every RPC feature this runtime uses.
    #[must_use]
    pub fn dealer_with_rpc_features() -> Self {
        let mut roles = Dict::new();
        roles.insert(
            ROLE_DEALER.to_string(),
            json!({
                "features": {
                    FEATURE_PROGRESSIVE_CALL_RESULTS: true,
                    FEATURE_CALL_TIMEOUT: true,
                    FEATURE_CALL_CANCELING: true,
                }
            }),
        );
        Self { roles }
    }

    /// Returns true if `role` is announced.
    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains_key(role)
    }

    /// Returns true if `role` announces `feature` as enabled.
    #[must_use]
    pub fn has_feature(&self, role: &str, feature: &str) -> bool {
        self.roles
            .get(role)
            .and_then(|r| r.get("features"))
            .and_then(|f| f.get(feature))
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Returns the raw roles dictionary.
    #[must_use]
    pub fn as_dict(&self) -> &Dict {
        &self.roles
    }
}
