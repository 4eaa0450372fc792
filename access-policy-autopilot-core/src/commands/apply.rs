//! Apply logic for Access Policy Autopilot service

use log::info;

use crate::error::{AccessError, AccessResult};
use crate::types::{AppTarget, ApplyReport, PlannedChange};

impl super::service::AccessPolicyAutopilotService {
    /// Apply planned changes in order.
    ///
    /// A policy change aimed at a pending application uses the id returned by the
    /// `CreateApplication` change that precedes it. The first failure stops the run;
    /// changes already applied are not rolled back.
    pub async fn apply(&self, changes: &[PlannedChange]) -> AccessResult<ApplyReport> {
        let mut report = ApplyReport::default();
        let mut created_app_id: Option<String> = None;

        for change in changes {
            match change {
                PlannedChange::CreateApplication { request } => {
                    let application = self.client.create_application(request).await?;
                    info!("Created application {} ({})", application.name, application.id);
                    created_app_id = Some(application.id.clone());
                    report.created_applications.push(application);
                }
                PlannedChange::CreatePolicy { app, request } => {
                    let app_id = resolve_app_id(app, created_app_id.as_deref())?;
                    let policy = self.client.create_policy(app_id, request).await?;
                    info!("Created policy '{}' ({}) on {}", policy.name, policy.id, app_id);
                    report.created_policies.push(policy);
                }
                PlannedChange::UpdatePolicy {
                    app,
                    policy_id,
                    request,
                } => {
                    let app_id = resolve_app_id(app, created_app_id.as_deref())?;
                    let policy = self
                        .client
                        .update_policy(app_id, policy_id, request)
                        .await?;
                    info!("Updated policy '{}' ({}) on {}", policy.name, policy.id, app_id);
                    report.updated_policies.push(policy);
                }
                PlannedChange::DeletePolicy {
                    app,
                    policy_id,
                    policy_name,
                } => {
                    let app_id = resolve_app_id(app, created_app_id.as_deref())?;
                    self.client.delete_policy(app_id, policy_id).await?;
                    info!("Deleted policy '{}' ({}) from {}", policy_name, policy_id, app_id);
                    report.deleted_policy_ids.push(policy_id.clone());
                }
            }
        }

        Ok(report)
    }
}

fn resolve_app_id<'a>(target: &'a AppTarget, created: Option<&'a str>) -> AccessResult<&'a str> {
    match target {
        AppTarget::Existing { id, .. } => Ok(id.as_str()),
        AppTarget::Pending { name } => created.ok_or_else(|| AccessError::UnresolvedApplication {
            name: name.clone(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::service::AccessPolicyAutopilotService;
    use crate::config::AccessConfig;
    use crate::synthesis::build_group_allow;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_resolve_existing_target() {
        let target = AppTarget::Existing {
            id: "a1".into(),
            name: "API".into(),
        };
        assert_eq!(resolve_app_id(&target, Some("other")).unwrap(), "a1");
    }

    #[test]
    fn test_resolve_pending_target() {
        let target = AppTarget::Pending {
            name: "Studio".into(),
        };
        assert_eq!(resolve_app_id(&target, Some("new-id")).unwrap(), "new-id");
        assert!(matches!(
            resolve_app_id(&target, None),
            Err(AccessError::UnresolvedApplication { name }) if name == "Studio"
        ));
    }

    #[tokio::test]
    async fn test_pending_policy_lands_on_created_application() {
        let mock_server = MockServer::start().await;
        let config = AccessConfig::new("acc123", "test-token")
            .unwrap()
            .with_api_base_url(mock_server.uri());
        let service = AccessPolicyAutopilotService::new(&config).unwrap();

        Mock::given(method("POST"))
            .and(path("/accounts/acc123/access/apps"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "errors": [],
                "result": {"id": "new-app", "name": "Studio", "domain": "studio.example.com"}
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("POST"))
            .and(path("/accounts/acc123/access/apps/new-app/policies"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "errors": [],
                "result": {"id": "p1", "name": "Allow Admins", "decision": "allow", "include": [{"group": {"id": "g1"}}]}
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let changes = vec![
            PlannedChange::CreateApplication {
                request: crate::synthesis::build_self_hosted_application(
                    "Studio",
                    "studio.example.com",
                    "24h",
                ),
            },
            PlannedChange::CreatePolicy {
                app: AppTarget::Pending {
                    name: "Studio".into(),
                },
                request: build_group_allow("Allow Admins", "g1"),
            },
        ];

        let report = service.apply(&changes).await.unwrap();
        assert_eq!(report.created_applications[0].id, "new-app");
        assert_eq!(report.created_policies[0].id, "p1");
        assert_eq!(report.total(), 2);
    }

    #[tokio::test]
    async fn test_apply_stops_at_first_failure() {
        let mock_server = MockServer::start().await;
        let config = AccessConfig::new("acc123", "test-token")
            .unwrap()
            .with_api_base_url(mock_server.uri());
        let service = AccessPolicyAutopilotService::new(&config).unwrap();

        Mock::given(method("DELETE"))
            .and(path("/accounts/acc123/access/apps/a1/policies/p1"))
            .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
            .expect(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("DELETE"))
            .and(path("/accounts/acc123/access/apps/a2/policies/p2"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;

        let delete = |app_id: &str, policy_id: &str| PlannedChange::DeletePolicy {
            app: AppTarget::Existing {
                id: app_id.into(),
                name: app_id.into(),
            },
            policy_id: policy_id.into(),
            policy_name: "Macbook dual-stack Bypass".into(),
        };

        let err = service
            .apply(&[delete("a1", "p1"), delete("a2", "p2")])
            .await
            .unwrap_err();
        assert!(matches!(err, AccessError::Status { status: 403, .. }));
    }
}
