//! Name-keyed policy reconciliation (pure Rust, no I/O)
//!
//! Policy names act as the unique key within an application. The Access API does not
//! enforce this, so lookups take the first match and warn about the rest.

use log::{debug, warn};

use crate::types::{AppTarget, Application, PlannedChange, Policy, PolicyRequest};

/// What to do when a desired policy already exists under the same name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExistingPolicyMode {
    /// Overwrite it in place with the desired fields.
    Upsert,
    /// Leave it alone.
    CreateOnly,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DesiredPolicy {
    pub request: PolicyRequest,
    pub mode: ExistingPolicyMode,
}

impl DesiredPolicy {
    pub fn upsert(request: PolicyRequest) -> Self {
        Self {
            request,
            mode: ExistingPolicyMode::Upsert,
        }
    }

    pub fn create_only(request: PolicyRequest) -> Self {
        Self {
            request,
            mode: ExistingPolicyMode::CreateOnly,
        }
    }
}

/// Find the application bound to `domain` (exact match).
pub fn find_application_by_domain<'a>(
    applications: &'a [Application],
    domain: &str,
) -> Option<&'a Application> {
    applications.iter().find(|app| app.has_domain(domain))
}

/// Find a policy by name. The first match wins; duplicates are logged.
pub fn find_policy_by_name<'a>(policies: &'a [Policy], name: &str) -> Option<&'a Policy> {
    let mut matches = policies.iter().filter(|p| p.name == name);
    let first = matches.next()?;
    let duplicates = matches.count();
    if duplicates > 0 {
        warn!(
            "{} policies are named '{}'; using the first one ({})",
            duplicates + 1,
            name,
            first.id
        );
    }
    Some(first)
}

/// Compare the current policies of one application against the desired set.
pub fn reconcile_policies(
    target: &AppTarget,
    current: &[Policy],
    desired: &[DesiredPolicy],
) -> Vec<PlannedChange> {
    let mut changes = Vec::new();

    for wanted in desired {
        match (find_policy_by_name(current, &wanted.request.name), wanted.mode) {
            (Some(existing), ExistingPolicyMode::Upsert) => {
                changes.push(PlannedChange::UpdatePolicy {
                    app: target.clone(),
                    policy_id: existing.id.clone(),
                    request: wanted.request.clone(),
                });
            }
            (Some(existing), ExistingPolicyMode::CreateOnly) => {
                debug!(
                    "Policy '{}' already exists on '{}' ({}), leaving it unchanged",
                    existing.name,
                    target.name(),
                    existing.id
                );
            }
            (None, _) => {
                changes.push(PlannedChange::CreatePolicy {
                    app: target.clone(),
                    request: wanted.request.clone(),
                });
            }
        }
    }

    changes
}

/// Decides which existing policies count as stale bypass rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StalePolicyMatcher {
    name: String,
    include_ip_bypass_names: bool,
}

impl StalePolicyMatcher {
    pub fn exact(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            include_ip_bypass_names: false,
        }
    }

    /// Also match any name containing both "ip" and "bypass", case-insensitively.
    #[must_use]
    pub fn with_ip_bypass_names(mut self, enabled: bool) -> Self {
        self.include_ip_bypass_names = enabled;
        self
    }

    pub fn matches(&self, policy_name: &str) -> bool {
        if policy_name == self.name {
            return true;
        }
        self.include_ip_bypass_names && is_ip_bypass_name(policy_name)
    }
}

fn is_ip_bypass_name(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    lower.contains("bypass") && lower.contains("ip")
}

/// Deletions for every policy of `application` the matcher flags.
pub fn stale_policy_deletions(
    application: &Application,
    policies: &[Policy],
    matcher: &StalePolicyMatcher,
) -> Vec<PlannedChange> {
    policies
        .iter()
        .filter(|p| matcher.matches(&p.name))
        .map(|p| PlannedChange::DeletePolicy {
            app: AppTarget::existing(application),
            policy_id: p.id.clone(),
            policy_name: p.name.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthesis::{build_group_allow, build_public_access};
    use crate::types::{AccessRule, Decision, STALE_BYPASS_POLICY_NAME};
    use rstest::rstest;

    fn policy(id: &str, name: &str, decision: Decision) -> Policy {
        Policy {
            id: id.into(),
            name: name.into(),
            decision,
            include: vec![AccessRule::Everyone {}],
        }
    }

    fn app(id: &str, name: &str, domain: Option<&str>) -> Application {
        Application {
            id: id.into(),
            name: name.into(),
            domain: domain.map(str::to_string),
            app_type: Some("self_hosted".into()),
            session_duration: Some("24h".into()),
        }
    }

    fn target() -> AppTarget {
        AppTarget::Existing {
            id: "a1".into(),
            name: "API".into(),
        }
    }

    #[test]
    fn test_find_application_by_domain_exact() {
        let apps = vec![
            app("a0", "Launcher", None),
            app("a1", "API", Some("api.example.com")),
            app("a2", "Docs", Some("docs.api.example.com")),
        ];
        assert_eq!(
            find_application_by_domain(&apps, "api.example.com").map(|a| a.id.as_str()),
            Some("a1")
        );
        assert!(find_application_by_domain(&apps, "example.com").is_none());
    }

    #[test]
    fn test_find_policy_by_name_takes_first_duplicate() {
        let policies = vec![
            policy("p1", "Public Access", Decision::Allow),
            policy("p2", "Public Access", Decision::Bypass),
        ];
        let found = find_policy_by_name(&policies, "Public Access").unwrap();
        assert_eq!(found.id, "p1");
        assert!(find_policy_by_name(&policies, "public access").is_none());
    }

    #[test]
    fn test_upsert_updates_existing_in_place() {
        let current = vec![policy("p7", "Public Access", Decision::Allow)];
        let desired = vec![DesiredPolicy::upsert(build_public_access("Public Access"))];

        let changes = reconcile_policies(&target(), &current, &desired);
        assert_eq!(changes.len(), 1);
        match &changes[0] {
            PlannedChange::UpdatePolicy {
                policy_id, request, ..
            } => {
                assert_eq!(policy_id, "p7");
                assert_eq!(request.decision, Decision::Bypass);
            }
            other => panic!("Expected UpdatePolicy, got {other:?}"),
        }
    }

    #[test]
    fn test_upsert_creates_when_absent() {
        let current = vec![policy("p1", "Allow Admins", Decision::Allow)];
        let desired = vec![DesiredPolicy::upsert(build_public_access("Public Access"))];

        let changes = reconcile_policies(&target(), &current, &desired);
        assert!(matches!(
            &changes[..],
            [PlannedChange::CreatePolicy { request, .. }] if request.name == "Public Access"
        ));
    }

    #[test]
    fn test_create_only_never_updates() {
        let current = vec![policy("p1", "Allow Admins", Decision::Bypass)];
        let desired = vec![
            DesiredPolicy::create_only(build_group_allow("Allow Admins", "g1")),
            DesiredPolicy::create_only(build_group_allow("Allow Ops", "g2")),
        ];

        let changes = reconcile_policies(&target(), &current, &desired);
        assert_eq!(changes.len(), 1);
        assert!(matches!(
            &changes[0],
            PlannedChange::CreatePolicy { request, .. } if request.name == "Allow Ops"
        ));
    }

    #[rstest]
    #[case("Macbook dual-stack Bypass", false, true)]
    #[case("macbook dual-stack bypass", false, false)]
    #[case("Office IP Bypass", false, false)]
    #[case("Office IP Bypass", true, true)]
    #[case("Bypass for ipv6 range", true, true)]
    #[case("Public Access", true, false)]
    #[case("Allow Admins", true, false)]
    fn test_stale_policy_matcher(
        #[case] name: &str,
        #[case] include_ip_bypass_names: bool,
        #[case] expected: bool,
    ) {
        let matcher = StalePolicyMatcher::exact(STALE_BYPASS_POLICY_NAME)
            .with_ip_bypass_names(include_ip_bypass_names);
        assert_eq!(matcher.matches(name), expected);
    }

    #[test]
    fn test_stale_policy_deletions_leave_other_policies() {
        let application = app("a3", "Grafana", Some("grafana.example.com"));
        let policies = vec![
            policy("p1", "Allow Admins", Decision::Allow),
            policy("p2", STALE_BYPASS_POLICY_NAME, Decision::Bypass),
            policy("p3", "Public Access", Decision::Bypass),
        ];

        let changes = stale_policy_deletions(
            &application,
            &policies,
            &StalePolicyMatcher::exact(STALE_BYPASS_POLICY_NAME),
        );
        assert_eq!(
            changes,
            vec![PlannedChange::DeletePolicy {
                app: AppTarget::Existing {
                    id: "a3".into(),
                    name: "Grafana".into(),
                },
                policy_id: "p2".into(),
                policy_name: STALE_BYPASS_POLICY_NAME.into(),
            }]
        );
    }
}
