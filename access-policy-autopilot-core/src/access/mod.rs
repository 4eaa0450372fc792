//! Cloudflare Access API integration: HTTP client wrapper and response envelope.

pub(crate) mod client;
mod envelope;

pub use client::AccessClient;
