//! Typed Ramen custom resources
//!
//! Partial schemas for the `ramendr.openshift.io` CRDs, covering the fields
//! the console consumes. Unknown fields are ignored on deserialization.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Reference to another cluster resource by name
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResourceRef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl ResourceRef {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: None,
            kind: None,
        }
    }
}

/// DRPolicy: a cluster-scoped disaster-recovery policy
///
/// Pairs two managed clusters and defines the replication cadence for
/// applications protected by the policy.
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema)]
#[kube(group = "ramendr.openshift.io", version = "v1alpha1", kind = "DRPolicy")]
#[serde(rename_all = "camelCase")]
pub struct DRPolicySpec {
    /// Names of the managed clusters participating in the policy
    #[serde(default)]
    pub dr_clusters: Vec<String>,
    /// Replication cadence, e.g. "5m" or "1h"
    #[serde(default)]
    pub scheduling_interval: String,
}

/// DRPlacementControl: the namespaced resource binding an application's
/// placement to a DRPolicy
///
/// One DRPC exists per protected placement; it is the unit an unassign
/// operation acts on.
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "ramendr.openshift.io",
    version = "v1alpha1",
    kind = "DRPlacementControl",
    namespaced,
    status = "DRPlacementControlStatus"
)]
#[serde(rename_all = "camelCase")]
pub struct DRPlacementControlSpec {
    /// The DRPolicy this placement is protected by
    pub dr_policy_ref: ResourceRef,
    /// The Placement whose scheduling the DRPC has taken over
    pub placement_ref: ResourceRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_cluster: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failover_cluster: Option<String>,
    /// Requested DR action ("Failover" or "Relocate"), absent when idle
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DRPlacementControlStatus {
    /// Current phase, e.g. "Deployed", "FailingOver", "Relocating"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,
    /// RFC 3339 timestamp of the last completed volume group sync
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_group_sync_time: Option<String>,
}
