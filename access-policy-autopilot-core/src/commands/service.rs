//! Access Policy Autopilot Service Layer
//!
//! This module provides the main service interface that encapsulates the business logic
//! for converging Access policies. The service holds the API client and provides
//! high-level operations (plan, apply) used by the CLI.

use crate::access::AccessClient;
use crate::config::AccessConfig;
use crate::error::AccessResult;

/// Main service struct that holds the Access API client and provides business logic operations
pub struct AccessPolicyAutopilotService {
    pub(crate) client: AccessClient,
}

impl AccessPolicyAutopilotService {
    /// Create a new service instance for the configured account.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &AccessConfig) -> AccessResult<Self> {
        Ok(Self {
            client: AccessClient::new(config)?,
        })
    }

    pub fn client(&self) -> &AccessClient {
        &self.client
    }

    // plan_*() method implementations are in plan.rs
    // apply() method implementation is in apply.rs
}
