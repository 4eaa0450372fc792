//! Shared types: Access API resources, request payloads, and plan/apply results.

use serde::{Deserialize, Serialize};
use std::fmt;

pub const PUBLIC_ACCESS_POLICY_NAME: &str = "Public Access";
pub const ADMIN_POLICY_NAME: &str = "Allow Admins";
pub const SERVICE_POLICY_NAME: &str = "Allow Service";
pub const STALE_BYPASS_POLICY_NAME: &str = "Macbook dual-stack Bypass";
pub const SELF_HOSTED_APP_TYPE: &str = "self_hosted";
pub const DEFAULT_SESSION_DURATION: &str = "24h";

/// An Access application as returned by `GET /apps`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Absent for application types that are not bound to a hostname.
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(rename = "type", default)]
    pub app_type: Option<String>,
    #[serde(default)]
    pub session_duration: Option<String>,
}

impl Application {
    pub fn has_domain(&self, domain: &str) -> bool {
        self.domain.as_deref() == Some(domain)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Allow,
    Deny,
    NonIdentity,
    Bypass,
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Decision::Allow => "allow",
            Decision::Deny => "deny",
            Decision::NonIdentity => "non_identity",
            Decision::Bypass => "bypass",
        };
        f.write_str(s)
    }
}

/// One entry of a policy's `include` list.
///
/// The rule kinds this tool writes are modelled explicitly; anything else the API
/// returns is kept as raw JSON so it survives a read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessRule {
    Everyone {},
    Group {
        id: String,
    },
    ServiceToken {
        token_id: String,
    },
    Email {
        email: String,
    },
    Ip {
        ip: String,
    },
    #[serde(untagged)]
    Other(serde_json::Value),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Policy {
    pub id: String,
    pub name: String,
    pub decision: Decision,
    #[serde(default)]
    pub include: Vec<AccessRule>,
}

/// Body of `POST`/`PUT .../policies`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyRequest {
    pub name: String,
    pub decision: Decision,
    pub include: Vec<AccessRule>,
}

/// Body of `POST /apps`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationRequest {
    pub name: String,
    pub domain: String,
    #[serde(rename = "type")]
    pub app_type: String,
    pub session_duration: String,
}

/// Entry of the envelope's `errors`/`messages` arrays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiMessage {
    pub code: i64,
    pub message: String,
}

impl fmt::Display for ApiMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// The application a planned policy change targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppTarget {
    Existing { id: String, name: String },
    /// Created by an earlier change of the same plan; resolved at apply time.
    Pending { name: String },
}

impl AppTarget {
    pub fn existing(application: &Application) -> Self {
        Self::Existing {
            id: application.id.clone(),
            name: application.name.clone(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Existing { name, .. } | Self::Pending { name } => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlannedChange {
    CreateApplication {
        request: ApplicationRequest,
    },
    CreatePolicy {
        app: AppTarget,
        request: PolicyRequest,
    },
    UpdatePolicy {
        app: AppTarget,
        policy_id: String,
        request: PolicyRequest,
    },
    DeletePolicy {
        app: AppTarget,
        policy_id: String,
        policy_name: String,
    },
}

impl fmt::Display for PlannedChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CreateApplication { request } => write!(
                f,
                "create application '{}' for {} ({}, session {})",
                request.name, request.domain, request.app_type, request.session_duration
            ),
            Self::CreatePolicy { app, request } => write!(
                f,
                "create policy '{}' ({}) on '{}'",
                request.name,
                request.decision,
                app.name()
            ),
            Self::UpdatePolicy {
                app,
                policy_id,
                request,
            } => write!(
                f,
                "update policy '{}' [{}] to {} on '{}'",
                request.name,
                policy_id,
                request.decision,
                app.name()
            ),
            Self::DeletePolicy {
                app,
                policy_id,
                policy_name,
            } => write!(
                f,
                "delete policy '{}' [{}] from '{}'",
                policy_name,
                policy_id,
                app.name()
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicAccessOptions {
    pub domain: String,
    pub policy_name: String,
}

impl PublicAccessOptions {
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            policy_name: PUBLIC_ACCESS_POLICY_NAME.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZeroTrustOptions {
    pub app_name: String,
    pub app_domain: String,
    pub session_duration: String,
    pub admin_group_id: String,
    pub service_token_id: String,
    pub admin_policy_name: String,
    pub service_policy_name: String,
    pub stale_policy_name: String,
    /// Also remove policies whose name mentions both "ip" and "bypass".
    pub include_ip_bypass_names: bool,
}

impl ZeroTrustOptions {
    pub fn new(
        app_name: impl Into<String>,
        app_domain: impl Into<String>,
        admin_group_id: impl Into<String>,
        service_token_id: impl Into<String>,
    ) -> Self {
        Self {
            app_name: app_name.into(),
            app_domain: app_domain.into(),
            session_duration: DEFAULT_SESSION_DURATION.to_string(),
            admin_group_id: admin_group_id.into(),
            service_token_id: service_token_id.into(),
            admin_policy_name: ADMIN_POLICY_NAME.to_string(),
            service_policy_name: SERVICE_POLICY_NAME.to_string(),
            stale_policy_name: STALE_BYPASS_POLICY_NAME.to_string(),
            include_ip_bypass_names: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PublicAccessPlan {
    pub application: Application,
    pub current_policy_names: Vec<String>,
    pub changes: Vec<PlannedChange>,
}

/// Application creation and allow policies for the admin application.
#[derive(Debug, Clone, PartialEq)]
pub struct ProvisioningPlan {
    pub target: AppTarget,
    pub changes: Vec<PlannedChange>,
}

/// Stale bypass policy deletions across every application.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanupPlan {
    pub scanned_applications: Vec<Application>,
    pub changes: Vec<PlannedChange>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApplyReport {
    pub created_applications: Vec<Application>,
    pub created_policies: Vec<Policy>,
    pub updated_policies: Vec<Policy>,
    pub deleted_policy_ids: Vec<String>,
}

impl ApplyReport {
    pub fn total(&self) -> usize {
        self.created_applications.len()
            + self.created_policies.len()
            + self.updated_policies.len()
            + self.deleted_policy_ids.len()
    }

    pub fn merge(&mut self, other: ApplyReport) {
        self.created_applications.extend(other.created_applications);
        self.created_policies.extend(other.created_policies);
        self.updated_policies.extend(other.updated_policies);
        self.deleted_policy_ids.extend(other.deleted_policy_ids);
    }
}
