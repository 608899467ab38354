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

//! Configuration types for client sessions.

use crate::backpressure::{ExponentialRetry, RetryPolicy};
use crate::wamp::RouterRoles;
use std::sync::Arc;

/// Configuration for a client session.
///
/// # Examples
///
/// ```rust
/// use wamprpc::client::ClientConfig;
///
/// // Use default configuration
/// let config = ClientConfig::default();
///
/// // Customize configuration
/// let config = ClientConfig {
///     client_name: "caller".to_string(),
///     ..Default::default()
/// };
/// ```
#[derive(Clone)]
pub struct ClientConfig {
    /// Retry policy for progressive results that find the link full.
    ///
    /// Default: [`ExponentialRetry`] with default settings
    pub retry_policy: Arc<dyn RetryPolicy>,

    /// Name of this client, used in logging.
    ///
    /// Default: "wamprpc"
    pub client_name: String,

    /// Roles and features the router announced when the session opened.
    ///
    /// Default: none announced
    pub router_roles: RouterRoles,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            retry_policy: Arc::new(ExponentialRetry::default()),
            client_name: "wamprpc".to_string(),
            router_roles: RouterRoles::default(),
        }
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("retry_policy", &self.retry_policy.name())
            .field("client_name", &self.client_name)
            .field("router_roles", &self.router_roles)
            .finish()
    }
}

impl ClientConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the retry policy for progressive results.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use wamprpc::client::ClientConfig;
    /// use wamprpc::backpressure::{FixedRetry, RetryPolicy};
    /// use std::sync::Arc;
    /// use std::time::Duration;
    ///
    /// let config = ClientConfig::new()
    ///     .with_retry_policy(Arc::new(FixedRetry::new(Duration::from_millis(5))));
    /// assert_eq!(config.retry_policy.name(), "FixedRetry");
    /// ```
    pub fn with_retry_policy(mut self, policy: Arc<dyn RetryPolicy>) -> Self {
        self.retry_policy = policy;
        self
    }

    /// Sets the client name used in logging.
    pub fn with_client_name(mut self, name: impl Into<String>) -> Self {
        self.client_name = name.into();
        self
    }

    /// Sets the router's announced roles.
    pub fn with_router_roles(mut self, roles: RouterRoles) -> Self {
        self.router_roles = roles;
        self
    }
}
