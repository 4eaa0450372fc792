//! Plan creation logic for Access Policy Autopilot service
//!
//! Planning only issues read calls. Every write happens in `apply`.

use log::info;

use crate::error::{AccessError, AccessResult};
use crate::reconcile::{
    find_application_by_domain, reconcile_policies, stale_policy_deletions, DesiredPolicy,
    StalePolicyMatcher,
};
use crate::synthesis::{
    build_group_allow, build_public_access, build_self_hosted_application,
    build_service_token_allow,
};
use crate::types::{
    AppTarget, CleanupPlan, PlannedChange, ProvisioningPlan, PublicAccessOptions,
    PublicAccessPlan, ZeroTrustOptions,
};

impl super::service::AccessPolicyAutopilotService {
    /// Plan making one application public through a bypass-everyone policy.
    ///
    /// The policy is upserted by name: updated in place when present, created otherwise.
    /// Fails with [`AccessError::ApplicationNotFound`] when no application is bound to
    /// `options.domain`.
    pub async fn plan_public_access(
        &self,
        options: &PublicAccessOptions,
    ) -> AccessResult<PublicAccessPlan> {
        let applications = self.client.list_applications().await?;
        let application = find_application_by_domain(&applications, &options.domain)
            .cloned()
            .ok_or_else(|| AccessError::ApplicationNotFound {
                domain: options.domain.clone(),
            })?;
        info!(
            "Found application {} ({}) for {}",
            application.name, application.id, options.domain
        );

        let policies = self.client.list_policies(&application.id).await?;
        let desired = [DesiredPolicy::upsert(build_public_access(
            &options.policy_name,
        ))];
        let changes = reconcile_policies(&AppTarget::existing(&application), &policies, &desired);

        Ok(PublicAccessPlan {
            current_policy_names: policies.into_iter().map(|p| p.name).collect(),
            application,
            changes,
        })
    }

    /// Plan the first zero-trust phase: create the admin application when missing and
    /// add the admin-group and service-token allow policies if absent (never updated).
    ///
    /// Only the target application is read, so an unrelated application cannot block
    /// provisioning.
    pub async fn plan_zero_trust_provisioning(
        &self,
        options: &ZeroTrustOptions,
    ) -> AccessResult<ProvisioningPlan> {
        let applications = self.client.list_applications().await?;
        let mut changes = Vec::new();

        let target = match find_application_by_domain(&applications, &options.app_domain) {
            Some(existing) => {
                info!(
                    "Application {} already exists: {}",
                    options.app_domain, existing.id
                );
                AppTarget::existing(existing)
            }
            None => {
                info!("Application {} is missing", options.app_domain);
                changes.push(PlannedChange::CreateApplication {
                    request: build_self_hosted_application(
                        &options.app_name,
                        &options.app_domain,
                        &options.session_duration,
                    ),
                });
                AppTarget::Pending {
                    name: options.app_name.clone(),
                }
            }
        };

        let current = match &target {
            AppTarget::Existing { id, .. } => self.client.list_policies(id).await?,
            AppTarget::Pending { .. } => Vec::new(),
        };
        let desired = [
            DesiredPolicy::create_only(build_group_allow(
                &options.admin_policy_name,
                &options.admin_group_id,
            )),
            DesiredPolicy::create_only(build_service_token_allow(
                &options.service_policy_name,
                &options.service_token_id,
            )),
        ];
        changes.extend(reconcile_policies(&target, &current, &desired));

        Ok(ProvisioningPlan { target, changes })
    }

    /// Plan the second zero-trust phase: delete stale bypass policies from every
    /// application.
    ///
    /// Applications are listed afresh, so one created by provisioning is scanned too.
    /// The first failing policy listing aborts the scan.
    pub async fn plan_stale_cleanup(
        &self,
        options: &ZeroTrustOptions,
    ) -> AccessResult<CleanupPlan> {
        let applications = self.client.list_applications().await?;
        let matcher = StalePolicyMatcher::exact(&options.stale_policy_name)
            .with_ip_bypass_names(options.include_ip_bypass_names);

        let mut changes = Vec::new();
        for application in &applications {
            let policies = self.client.list_policies(&application.id).await?;
            changes.extend(stale_policy_deletions(application, &policies, &matcher));
        }

        Ok(CleanupPlan {
            scanned_applications: applications,
            changes,
        })
    }
}
