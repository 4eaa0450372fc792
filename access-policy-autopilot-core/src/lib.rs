//! This crate provides the core business logic for Access Policy Autopilot:
//! - Cloudflare Access API client (applications and policies)
//! - Name-keyed policy reconciliation
//! - Plan/apply service for the public-access and zero-trust procedures
//!

mod access;
pub mod commands;
mod config;
mod error;
pub mod reconcile;
mod synthesis;
mod types;

// Re-exports for a small, focused public API
pub use access::AccessClient;
pub use commands::AccessPolicyAutopilotService;
pub use config::{AccessConfig, DEFAULT_API_BASE_URL};
pub use error::{AccessError, AccessResult};
pub use synthesis::{
    build_group_allow, build_public_access, build_self_hosted_application,
    build_service_token_allow,
};
pub use types::{
    AccessRule, ApiMessage, AppTarget, Application, ApplicationRequest, ApplyReport, CleanupPlan,
    Decision, PlannedChange, Policy, PolicyRequest, ProvisioningPlan, PublicAccessOptions,
    PublicAccessPlan, ZeroTrustOptions, ADMIN_POLICY_NAME, DEFAULT_SESSION_DURATION,
    PUBLIC_ACCESS_POLICY_NAME, SELF_HOSTED_APP_TYPE, SERVICE_POLICY_NAME,
    STALE_BYPASS_POLICY_NAME,
};
