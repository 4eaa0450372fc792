//! Request synthesis (deterministic policy and application payloads)

pub mod policy_builder;

pub use policy_builder::{
    build_group_allow, build_public_access, build_self_hosted_application,
    build_service_token_allow,
};
