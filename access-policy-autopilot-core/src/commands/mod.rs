//! Commands module - service layer for Access Policy Autopilot operations

mod apply;
mod plan;
pub(crate) mod service;

pub use service::AccessPolicyAutopilotService;
