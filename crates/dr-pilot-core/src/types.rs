//! Core domain types
//!
//! Read-only projections of the cluster's DR resources, shaped for the
//! console. The projections are built once from materialized resource lists
//! and never written back; all mutation happens through the unassign command
//! in the client crate.

use crate::indicators::{classify_sync_health, parse_scheduling_interval, ReplicationHealth};
use chrono::{DateTime, Utc};
use ramen_rs::{DRPlacementControl, DRPolicy};
use serde::{Deserialize, Serialize};

/// Reference to a single DRPlacementControl, the unit an unassign request
/// acts on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementControlRef {
    /// DRPC name
    pub name: String,
    /// Namespace the DRPC (and its Placement) live in
    pub namespace: String,
    /// Name of the Placement whose scheduling the DRPC took over
    pub placement: String,
}

/// A disaster-recovery policy as the console sees it: the policy itself plus
/// the placement controls currently bound to it
///
/// Built fresh each time the resource lists are loaded; immutable afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPolicy {
    /// Policy name, unique within a session
    pub name: String,
    /// Replication cadence as declared on the policy, e.g. "5m"
    pub scheduling_interval: String,
    /// Managed clusters participating in the policy
    pub dr_clusters: Vec<String>,
    /// Placement controls bound to this policy, in cluster list order
    pub placement_controls: Vec<PlacementControlRef>,
    /// Worst replication health across the bound placement controls
    pub sync_health: ReplicationHealth,
    /// Ongoing DR activity (failover/relocate), if any
    pub activity: Option<String>,
}

impl DataPolicy {
    /// Project raw resource lists into the policies assigned to the
    /// application scope
    ///
    /// A policy appears iff at least one DRPC references it. Policies keep
    /// their list order; each policy's placement controls keep the DRPC list
    /// order. `now` anchors the sync-age computation so callers (and tests)
    /// control the clock.
    pub fn project(
        policies: &[DRPolicy],
        controls: &[DRPlacementControl],
        now: DateTime<Utc>,
    ) -> Vec<DataPolicy> {
        policies
            .iter()
            .filter_map(|policy| {
                let name = policy.metadata.name.clone()?;
                let bound: Vec<&DRPlacementControl> = controls
                    .iter()
                    .filter(|c| c.spec.dr_policy_ref.name == name)
                    .collect();
                if bound.is_empty() {
                    return None;
                }

                let interval = parse_scheduling_interval(&policy.spec.scheduling_interval);
                let mut sync_health = ReplicationHealth::Unknown;
                let mut activity = None;
                let mut refs = Vec::with_capacity(bound.len());

                for control in &bound {
                    let age = control
                        .status
                        .as_ref()
                        .and_then(|s| s.last_group_sync_time.as_deref())
                        .and_then(|t| DateTime::parse_from_rfc3339(t).ok())
                        .map(|t| (now - t.with_timezone(&Utc)).to_std().unwrap_or_default());
                    sync_health = sync_health.worst(classify_sync_health(age, interval));

                    if activity.is_none() {
                        activity = current_activity(control);
                    }

                    refs.push(PlacementControlRef {
                        name: control.metadata.name.clone().unwrap_or_default(),
                        namespace: control.metadata.namespace.clone().unwrap_or_default(),
                        placement: control.spec.placement_ref.name.clone(),
                    });
                }

                Some(DataPolicy {
                    name,
                    scheduling_interval: policy.spec.scheduling_interval.clone(),
                    dr_clusters: policy.spec.dr_clusters.clone(),
                    placement_controls: refs,
                    sync_health,
                    activity,
                })
            })
            .collect()
    }
}

/// Describe an in-flight DR action on a placement control, if any
fn current_activity(control: &DRPlacementControl) -> Option<String> {
    let phase = control.status.as_ref()?.phase.as_deref()?;
    match phase {
        "FailingOver" => Some(match &control.spec.failover_cluster {
            Some(cluster) => format!("Failing over to {}", cluster),
            None => "Failing over".to_string(),
        }),
        "Relocating" => Some(match &control.spec.preferred_cluster {
            Some(cluster) => format!("Relocating to {}", cluster),
            None => "Relocating".to_string(),
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use ramen_rs::{DRPlacementControlSpec, DRPlacementControlStatus, DRPolicySpec, ResourceRef};

    fn policy(name: &str, interval: &str) -> DRPolicy {
        DRPolicy::new(
            name,
            DRPolicySpec {
                dr_clusters: vec!["east-1".into(), "west-1".into()],
                scheduling_interval: interval.into(),
            },
        )
    }

    fn drpc(name: &str, policy: &str, placement: &str) -> DRPlacementControl {
        let mut control = DRPlacementControl::new(
            name,
            DRPlacementControlSpec {
                dr_policy_ref: ResourceRef::named(policy),
                placement_ref: ResourceRef::named(placement),
                preferred_cluster: Some("east-1".into()),
                failover_cluster: Some("west-1".into()),
                action: None,
            },
        );
        control.metadata.namespace = Some("busybox".into());
        control
    }

    #[test]
    fn test_project_groups_by_policy_in_order() {
        let policies = vec![policy("gold", "5m"), policy("silver", "1h"), policy("unused", "5m")];
        let controls = vec![
            drpc("app-a", "gold", "place-a"),
            drpc("app-b", "silver", "place-b"),
            drpc("app-c", "gold", "place-c"),
        ];

        let projected = DataPolicy::project(&policies, &controls, Utc::now());

        // "unused" has no DRPC and is not assigned
        assert_eq!(projected.len(), 2);
        assert_eq!(projected[0].name, "gold");
        assert_eq!(
            projected[0]
                .placement_controls
                .iter()
                .map(|r| r.name.as_str())
                .collect::<Vec<_>>(),
            vec!["app-a", "app-c"]
        );
        assert_eq!(projected[1].name, "silver");
        assert_eq!(projected[0].placement_controls[0].placement, "place-a");
        assert_eq!(projected[0].placement_controls[0].namespace, "busybox");
    }

    #[test]
    fn test_project_sync_health_from_last_sync() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let mut fresh = drpc("fresh", "gold", "place-a");
        fresh.status = Some(DRPlacementControlStatus {
            phase: Some("Deployed".into()),
            last_group_sync_time: Some("2024-06-01T11:56:00Z".into()),
        });
        let mut stale = drpc("stale", "gold", "place-b");
        stale.status = Some(DRPlacementControlStatus {
            phase: Some("Deployed".into()),
            last_group_sync_time: Some("2024-06-01T11:00:00Z".into()),
        });

        let healthy = DataPolicy::project(&[policy("gold", "5m")], &[fresh.clone()], now);
        assert_eq!(healthy[0].sync_health, ReplicationHealth::Healthy);

        // Worst health wins across the policy's controls
        let mixed = DataPolicy::project(&[policy("gold", "5m")], &[fresh, stale], now);
        assert_eq!(mixed[0].sync_health, ReplicationHealth::Critical);
    }

    #[test]
    fn test_project_reports_failover_activity() {
        let mut control = drpc("app-a", "gold", "place-a");
        control.status = Some(DRPlacementControlStatus {
            phase: Some("FailingOver".into()),
            last_group_sync_time: None,
        });

        let projected = DataPolicy::project(&[policy("gold", "5m")], &[control], Utc::now());
        assert_eq!(projected[0].activity.as_deref(), Some("Failing over to west-1"));
    }
}
