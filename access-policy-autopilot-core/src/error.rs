//! Error types for Access Policy Autopilot

use crate::types::ApiMessage;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AccessError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-2xx response. The body is kept verbatim for diagnosis.
    #[error("{method} {url} returned HTTP {status}: {body}")]
    Status {
        method: String,
        url: String,
        status: u16,
        body: String,
    },

    /// 2xx response whose envelope reports `success: false`.
    #[error("{method} {url} was rejected by the API: {}", join_messages(.errors))]
    Api {
        method: String,
        url: String,
        errors: Vec<ApiMessage>,
    },

    #[error("Failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{method} {url} returned no result")]
    MissingResult { method: String, url: String },

    #[error("No Access application found for domain '{domain}'")]
    ApplicationNotFound { domain: String },

    #[error("Application '{name}' has not been created yet")]
    UnresolvedApplication { name: String },
}

impl AccessError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ApplicationNotFound { .. })
    }
}

fn join_messages(errors: &[ApiMessage]) -> String {
    if errors.is_empty() {
        return "no error details".to_string();
    }
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

pub type AccessResult<T> = Result<T, AccessError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_lists_every_message() {
        let err = AccessError::Api {
            method: "POST".into(),
            url: "https://example.test/apps".into(),
            errors: vec![
                ApiMessage {
                    code: 12130,
                    message: "access.api.error.invalid_request".into(),
                },
                ApiMessage {
                    code: 10000,
                    message: "Authentication error".into(),
                },
            ],
        };
        let text = err.to_string();
        assert!(text.contains("12130: access.api.error.invalid_request"));
        assert!(text.contains("10000: Authentication error"));
    }

    #[test]
    fn test_api_error_without_messages() {
        let err = AccessError::Api {
            method: "GET".into(),
            url: "https://example.test/apps".into(),
            errors: vec![],
        };
        assert!(err.to_string().ends_with("no error details"));
    }

    #[test]
    fn test_not_found_classification() {
        let err = AccessError::ApplicationNotFound {
            domain: "api.example.com".into(),
        };
        assert!(err.is_not_found());
        assert!(!AccessError::config("missing token").is_not_found());
    }
}
