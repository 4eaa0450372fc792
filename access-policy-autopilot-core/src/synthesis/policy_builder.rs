use crate::types::{AccessRule, ApplicationRequest, Decision, PolicyRequest, SELF_HOSTED_APP_TYPE};

/// Bypass policy that lets everyone through without an authentication challenge.
pub fn build_public_access(name: &str) -> PolicyRequest {
    PolicyRequest {
        name: name.to_string(),
        decision: Decision::Bypass,
        include: vec![AccessRule::Everyone {}],
    }
}

/// Allow policy scoped to members of one Access group.
pub fn build_group_allow(name: &str, group_id: &str) -> PolicyRequest {
    PolicyRequest {
        name: name.to_string(),
        decision: Decision::Allow,
        include: vec![AccessRule::Group {
            id: group_id.to_string(),
        }],
    }
}

/// Allow policy scoped to a single service token.
pub fn build_service_token_allow(name: &str, token_id: &str) -> PolicyRequest {
    PolicyRequest {
        name: name.to_string(),
        decision: Decision::Allow,
        include: vec![AccessRule::ServiceToken {
            token_id: token_id.to_string(),
        }],
    }
}

pub fn build_self_hosted_application(
    name: &str,
    domain: &str,
    session_duration: &str,
) -> ApplicationRequest {
    ApplicationRequest {
        name: name.to_string(),
        domain: domain.to_string(),
        app_type: SELF_HOSTED_APP_TYPE.to_string(),
        session_duration: session_duration.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_group_allow_payload() {
        let request = build_group_allow("Allow Admins", "9e16bff0");
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "name": "Allow Admins",
                "decision": "allow",
                "include": [{"group": {"id": "9e16bff0"}}]
            })
        );
    }

    #[test]
    fn test_service_token_allow_payload() {
        let request = build_service_token_allow("Allow Service", "15a661a2");
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "name": "Allow Service",
                "decision": "allow",
                "include": [{"service_token": {"token_id": "15a661a2"}}]
            })
        );
    }

    #[test]
    fn test_self_hosted_application_payload() {
        let request = build_self_hosted_application("Studio", "studio.example.com", "24h");
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "name": "Studio",
                "domain": "studio.example.com",
                "type": "self_hosted",
                "session_duration": "24h"
            })
        );
    }
}
