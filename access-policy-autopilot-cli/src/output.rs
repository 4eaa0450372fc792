//! Human-readable progress, written to stderr.

use access_policy_autopilot_core::{
    AppTarget, Application, ApplyReport, PlannedChange, PublicAccessPlan,
};

pub fn heading(title: &str) {
    eprintln!("\n--- {title} ---");
}

pub fn public_access_plan(plan: &PublicAccessPlan) {
    eprintln!(
        "Found application: {} ({})",
        plan.application.name, plan.application.id
    );
    eprintln!("Current policies: {:?}", plan.current_policy_names);
    changes(&plan.changes);
}

pub fn target(target: &AppTarget) {
    match target {
        AppTarget::Existing { id, name } => eprintln!("Application already exists: {name} ({id})"),
        AppTarget::Pending { name } => eprintln!("Application missing, will create: {name}"),
    }
}

pub fn created_applications(applications: &[Application]) {
    for app in applications {
        eprintln!("Created application: {} ({})", app.name, app.id);
    }
}

pub fn scanned_applications(applications: &[Application]) {
    for app in applications {
        eprintln!(
            "Checking application: {} ({})",
            app.name,
            app.domain.as_deref().unwrap_or("no domain")
        );
    }
}

pub fn changes(changes: &[PlannedChange]) {
    if changes.is_empty() {
        eprintln!("  No changes needed");
        return;
    }
    for change in changes {
        let tag = match change {
            PlannedChange::CreateApplication { .. } | PlannedChange::CreatePolicy { .. } => {
                "CREATE"
            }
            PlannedChange::UpdatePolicy { .. } => "UPDATE",
            PlannedChange::DeletePolicy { .. } => "DELETE",
        };
        eprintln!("  [{tag}] {change}");
    }
}

pub fn report(report: &ApplyReport) {
    eprintln!(
        "Applied {} change(s): {} application(s) created, {} policies created, {} updated, {} deleted",
        report.total(),
        report.created_applications.len(),
        report.created_policies.len(),
        report.updated_policies.len(),
        report.deleted_policy_ids.len()
    );
}

pub fn dry_run_notice() {
    eprintln!("\nDry run: no changes were applied.");
}

pub fn success(message: &str) {
    eprintln!("\n✅ {message}");
}
