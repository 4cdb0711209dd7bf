//! Selection set for batch policy operations
//!
//! Tracks the policies the user has checked for a pending action. Members
//! are kept in the order they were selected, which also fixes the order the
//! unassign fan-out issues its requests in.

use crate::types::DataPolicy;
use serde::{Deserialize, Serialize};

/// The user-chosen subset of policies targeted by a pending action
///
/// Invariant: every member also exists in the unfiltered policy collection.
/// The set only changes through explicit calls here; after a reload,
/// [`SelectionSet::retain_known`] re-establishes the invariant.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SelectionSet {
    policies: Vec<DataPolicy>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// The selected policies, in selection order
    pub fn policies(&self) -> &[DataPolicy] {
        &self.policies
    }

    pub fn len(&self) -> usize {
        self.policies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.policies.iter().any(|p| p.name == name)
    }

    /// Replace the whole selection
    pub fn replace(&mut self, policies: Vec<DataPolicy>) {
        self.policies = policies;
    }

    pub fn clear(&mut self) {
        self.policies.clear();
    }

    /// Add the policy if absent, remove it if present
    pub fn toggle(&mut self, policy: &DataPolicy) {
        if let Some(pos) = self.policies.iter().position(|p| p.name == policy.name) {
            self.policies.remove(pos);
        } else {
            self.policies.push(policy.clone());
        }
    }

    /// Drop members that no longer exist in the loaded collection
    ///
    /// Also refreshes surviving members so their placement-control lists
    /// match the reloaded resources.
    pub fn retain_known(&mut self, known: &[DataPolicy]) {
        self.policies = self
            .policies
            .iter()
            .filter_map(|selected| known.iter().find(|k| k.name == selected.name).cloned())
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::ReplicationHealth;
    use crate::types::PlacementControlRef;

    fn policy(name: &str, controls: usize) -> DataPolicy {
        DataPolicy {
            name: name.to_string(),
            scheduling_interval: "5m".to_string(),
            dr_clusters: Vec::new(),
            placement_controls: (0..controls)
                .map(|i| PlacementControlRef {
                    name: format!("{}-drpc-{}", name, i),
                    namespace: "apps".to_string(),
                    placement: format!("{}-placement-{}", name, i),
                })
                .collect(),
            sync_health: ReplicationHealth::Healthy,
            activity: None,
        }
    }

    #[test]
    fn test_toggle_and_contains() {
        let mut selection = SelectionSet::new();
        let gold = policy("gold", 1);

        selection.toggle(&gold);
        assert!(selection.contains("gold"));
        assert_eq!(selection.len(), 1);

        selection.toggle(&gold);
        assert!(!selection.contains("gold"));
        assert!(selection.is_empty());
    }

    #[test]
    fn test_selection_order_is_insertion_order() {
        let mut selection = SelectionSet::new();
        selection.toggle(&policy("silver", 1));
        selection.toggle(&policy("gold", 1));

        let names: Vec<&str> = selection.policies().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["silver", "gold"]);
    }

    #[test]
    fn test_retain_known_drops_vanished_members() {
        let mut selection = SelectionSet::new();
        selection.toggle(&policy("gold", 1));
        selection.toggle(&policy("silver", 1));

        let reloaded = vec![policy("gold", 2)];
        selection.retain_known(&reloaded);

        assert_eq!(selection.len(), 1);
        assert!(selection.contains("gold"));
        // Surviving members are refreshed from the reloaded collection
        assert_eq!(selection.policies()[0].placement_controls.len(), 2);
    }
}
