//! Subcommand arguments and handlers.

use std::time::Duration;

use access_policy_autopilot_core::{
    AccessConfig, AccessPolicyAutopilotService, ApplyReport, PublicAccessOptions, ZeroTrustOptions,
    ADMIN_POLICY_NAME, DEFAULT_API_BASE_URL, DEFAULT_SESSION_DURATION,
    PUBLIC_ACCESS_POLICY_NAME, SERVICE_POLICY_NAME, STALE_BYPASS_POLICY_NAME,
};
use anyhow::{Context, Result};
use clap::Args;

use crate::output;

/// Account and credential settings shared by every subcommand
#[derive(Args, Debug)]
pub struct ConnectionArgs {
    /// Cloudflare account id that owns the Access applications
    #[arg(long, env = "CLOUDFLARE_ACCOUNT_ID")]
    pub account_id: String,

    /// API token with Access: Apps and Policies edit permission
    #[arg(long, env = "CLOUDFLARE_API_TOKEN", hide_env_values = true)]
    pub api_token: String,

    /// API root, without the account path
    #[arg(long, env = "CLOUDFLARE_API_BASE_URL", default_value = DEFAULT_API_BASE_URL)]
    pub api_base_url: String,

    /// Per-request timeout in seconds (transport default when unset)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout_secs: Option<u64>,
}

impl ConnectionArgs {
    fn connect(&self) -> Result<AccessPolicyAutopilotService> {
        let mut config = AccessConfig::new(&self.account_id, &self.api_token)?
            .with_api_base_url(&self.api_base_url);
        if let Some(secs) = self.timeout_secs {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        log::debug!("Using {config:?}");
        AccessPolicyAutopilotService::new(&config).context("Failed to initialize Access client")
    }
}

#[derive(Args, Debug)]
pub struct EnablePublicArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Domain of the application to make public, e.g. api.example.com
    #[arg(long)]
    pub domain: String,

    /// Name of the bypass policy
    #[arg(long, default_value = PUBLIC_ACCESS_POLICY_NAME)]
    pub policy_name: String,

    /// Print the planned changes without applying them
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args, Debug)]
pub struct FixZeroTrustArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Domain of the admin application to ensure
    #[arg(long)]
    pub app_domain: String,

    /// Display name used when the admin application has to be created
    #[arg(long)]
    pub app_name: String,

    /// Session duration for a newly created application
    #[arg(long, default_value = DEFAULT_SESSION_DURATION)]
    pub session_duration: String,

    /// Access group allowed into the admin application
    #[arg(long, env = "ACCESS_ADMIN_GROUP_ID")]
    pub admin_group_id: String,

    /// Service token allowed into the admin application
    #[arg(long, env = "ACCESS_SERVICE_TOKEN_ID")]
    pub service_token_id: String,

    #[arg(long, default_value = ADMIN_POLICY_NAME)]
    pub admin_policy_name: String,

    #[arg(long, default_value = SERVICE_POLICY_NAME)]
    pub service_policy_name: String,

    /// Policy name removed from every application
    #[arg(long, default_value = STALE_BYPASS_POLICY_NAME)]
    pub stale_policy_name: String,

    /// Also remove policies whose name contains both "ip" and "bypass" (case-insensitive)
    #[arg(long)]
    pub include_ip_bypass_names: bool,

    /// Print the planned changes without applying them
    #[arg(long)]
    pub dry_run: bool,
}

pub async fn enable_public(args: EnablePublicArgs) -> Result<()> {
    let service = args.connection.connect()?;
    output::heading(&format!("Enabling public access for {}", args.domain));

    let options = PublicAccessOptions {
        domain: args.domain.clone(),
        policy_name: args.policy_name,
    };
    let plan = service
        .plan_public_access(&options)
        .await
        .context("Failed to plan public access")?;
    output::public_access_plan(&plan);

    if args.dry_run {
        output::dry_run_notice();
        return Ok(());
    }

    let report = service
        .apply(&plan.changes)
        .await
        .context("Failed to apply public access policy")?;
    output::report(&report);
    output::success(&format!(
        "{} is now public (bypass everyone)",
        args.domain
    ));
    Ok(())
}

pub async fn fix_zero_trust(args: FixZeroTrustArgs) -> Result<()> {
    let service = args.connection.connect()?;

    let options = ZeroTrustOptions {
        app_name: args.app_name,
        app_domain: args.app_domain,
        session_duration: args.session_duration,
        admin_group_id: args.admin_group_id,
        service_token_id: args.service_token_id,
        admin_policy_name: args.admin_policy_name,
        service_policy_name: args.service_policy_name,
        stale_policy_name: args.stale_policy_name,
        include_ip_bypass_names: args.include_ip_bypass_names,
    };
    output::heading(&format!(
        "1. Ensuring '{}' ({})",
        options.app_name, options.app_domain
    ));
    let provisioning = service
        .plan_zero_trust_provisioning(&options)
        .await
        .context("Failed to plan admin application provisioning")?;
    output::target(&provisioning.target);
    output::changes(&provisioning.changes);

    let mut report = ApplyReport::default();
    if !args.dry_run {
        report = service
            .apply(&provisioning.changes)
            .await
            .context("Failed to provision admin application")?;
        output::created_applications(&report.created_applications);
    }

    output::heading(&format!(
        "2. Removing '{}' from all applications",
        options.stale_policy_name
    ));
    let cleanup = service
        .plan_stale_cleanup(&options)
        .await
        .context("Failed to scan applications for stale bypass policies")?;
    output::scanned_applications(&cleanup.scanned_applications);
    output::changes(&cleanup.changes);

    if args.dry_run {
        output::dry_run_notice();
        return Ok(());
    }

    let removed = service
        .apply(&cleanup.changes)
        .await
        .context("Failed to remove stale bypass policies")?;
    report.merge(removed);

    output::report(&report);
    output::success("Done");
    Ok(())
}
