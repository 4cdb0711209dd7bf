//! Batch unassign operation
//!
//! Flattens the selected policies into their placement controls, issues one
//! unassign request per control concurrently, waits for every request to
//! settle, and reports the aggregate all-or-nothing: total success, or the
//! first error in issue order. Partial successes are neither rolled back nor
//! individually reported; retry is a manual user action after a failure.

use crate::errors::describe_ramen_error;
use crate::reducer::{reduce, ActionContext, Message, ModalAction, ModalState};
use crate::types::{DataPolicy, PlacementControlRef};
use futures::future::join_all;
use ramen_rs::RamenError;
use std::future::Future;

/// Aggregate result of one unassign run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnassignOutcome {
    /// Every request succeeded; `count` is the number of policies unassigned
    Success { count: usize },
    /// At least one request failed; `reason` is the first error's message
    Failure { reason: String },
}

/// Flatten the selection into placement-control references
///
/// Order is policy order, then each policy's internal control order.
/// Duplicate references are kept; each one gets its own request.
pub fn placement_refs(policies: &[DataPolicy]) -> Vec<PlacementControlRef> {
    policies
        .iter()
        .flat_map(|p| p.placement_controls.iter().cloned())
        .collect()
}

/// Run the unassign fan-out over the selected policies
///
/// `request` issues a single unassign call; the requests run concurrently
/// with no ordering dependency between them. An empty selection settles as
/// `Success { count: 0 }` without issuing anything.
pub async fn unassign_policies<F, Fut>(selected: &[DataPolicy], mut request: F) -> UnassignOutcome
where
    F: FnMut(PlacementControlRef) -> Fut,
    Fut: Future<Output = Result<(), RamenError>>,
{
    let targets = placement_refs(selected);
    let results = join_all(targets.into_iter().map(|target| request(target))).await;

    match results.into_iter().find_map(|r| r.err()) {
        None => UnassignOutcome::Success {
            count: selected.len(),
        },
        Some(error) => UnassignOutcome::Failure {
            reason: describe_ramen_error(&error),
        },
    }
}

/// Arm the pending guard before starting a run
///
/// Returns false (and changes nothing) if a run is already outstanding.
pub fn begin_unassign(state: &mut ModalState) -> bool {
    if state.unassign_pending {
        return false;
    }
    reduce(state, ModalAction::SetUnassignPending(true));
    true
}

/// Fold a settled outcome back into the modal state
///
/// On success: message, cleared selection, `UnassignSucceeded`. On failure:
/// message, selection untouched so the user can retry or adjust,
/// `UnassignFailed`. The message is always set before the context
/// transition, and the pending guard is always released.
pub fn apply_unassign_outcome(state: &mut ModalState, outcome: &UnassignOutcome) {
    reduce(state, ModalAction::SetUnassignPending(false));
    match outcome {
        UnassignOutcome::Success { count } => {
            reduce(state, ModalAction::SetMessage(success_message(*count)));
            reduce(state, ModalAction::SelectPolicies(Vec::new()));
            reduce(
                state,
                ModalAction::SetActionContext(Some(ActionContext::UnassignSucceeded)),
            );
        }
        UnassignOutcome::Failure { reason } => {
            reduce(state, ModalAction::SetMessage(failure_message(reason)));
            reduce(
                state,
                ModalAction::SetActionContext(Some(ActionContext::UnassignFailed)),
            );
        }
    }
}

/// Pending-action message shown when entering the confirm phase
pub fn confirm_message(count: usize) -> Message {
    Message::info(format!(
        "Selected policies ({count}) will be removed for your application. \
         This may affect other applications sharing the placement."
    ))
}

fn success_message(count: usize) -> Message {
    Message::success(format!(
        "Selected policies ({count}) unassigned for the application."
    ))
}

fn failure_message(reason: &str) -> Message {
    Message::danger(
        "Unable to unassign all selected policies for the application.",
        reason,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::ReplicationHealth;
    use kube::core::ErrorResponse;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn policy(name: &str, controls: &[&str]) -> DataPolicy {
        DataPolicy {
            name: name.to_string(),
            scheduling_interval: "5m".to_string(),
            dr_clusters: Vec::new(),
            placement_controls: controls
                .iter()
                .map(|c| PlacementControlRef {
                    name: c.to_string(),
                    namespace: "apps".to_string(),
                    placement: format!("{c}-placement"),
                })
                .collect(),
            sync_health: ReplicationHealth::Healthy,
            activity: None,
        }
    }

    fn api_error(message: &str) -> RamenError {
        RamenError::Api(kube::Error::Api(ErrorResponse {
            status: "Failure".to_string(),
            message: message.to_string(),
            reason: "InternalError".to_string(),
            code: 500,
        }))
    }

    #[test]
    fn test_placement_refs_flattens_without_dedup() {
        let selected = vec![
            policy("gold", &["drpc-a"]),
            policy("silver", &["drpc-b", "drpc-a"]),
        ];
        let refs = placement_refs(&selected);
        let names: Vec<&str> = refs.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["drpc-a", "drpc-b", "drpc-a"]);
    }

    #[tokio::test]
    async fn test_unassign_issues_one_request_per_control() {
        // Two policies, one and two controls: exactly three requests
        let selected = vec![policy("gold", &["drpc-a"]), policy("silver", &["drpc-b", "drpc-c"])];
        let calls = AtomicUsize::new(0);

        let outcome = unassign_policies(&selected, |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok(()) }
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(outcome, UnassignOutcome::Success { count: 2 });
    }

    #[tokio::test]
    async fn test_unassign_reports_first_error_after_all_settle() {
        let selected = vec![policy("gold", &["drpc-a", "drpc-b", "drpc-c"])];
        let settled = AtomicUsize::new(0);

        let outcome = unassign_policies(&selected, |target| {
            let fail = target.name == "drpc-b";
            let settled = &settled;
            async move {
                settled.fetch_add(1, Ordering::SeqCst);
                if fail {
                    Err(api_error("boom"))
                } else {
                    Ok(())
                }
            }
        })
        .await;

        // Every request settled even though one failed
        assert_eq!(settled.load(Ordering::SeqCst), 3);
        assert_eq!(
            outcome,
            UnassignOutcome::Failure {
                reason: "boom".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_empty_selection_is_noop_success() {
        let calls = AtomicUsize::new(0);
        let outcome = unassign_policies(&[], |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok(()) }
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(outcome, UnassignOutcome::Success { count: 0 });
    }

    #[test]
    fn test_apply_success_clears_selection() {
        let mut state = ModalState::new();
        reduce(
            &mut state,
            ModalAction::SelectPolicies(vec![policy("gold", &["drpc-a"])]),
        );
        state.unassign_pending = true;

        apply_unassign_outcome(&mut state, &UnassignOutcome::Success { count: 1 });

        assert!(state.selection.is_empty());
        assert_eq!(state.action_context, Some(ActionContext::UnassignSucceeded));
        assert!(!state.unassign_pending);
        let message = state.message.expect("success message set");
        assert!(message.title.contains("(1)"));
    }

    #[test]
    fn test_apply_failure_keeps_selection_for_retry() {
        let mut state = ModalState::new();
        reduce(
            &mut state,
            ModalAction::SelectPolicies(vec![policy("gold", &["drpc-a"])]),
        );
        state.unassign_pending = true;

        apply_unassign_outcome(
            &mut state,
            &UnassignOutcome::Failure {
                reason: "boom".to_string(),
            },
        );

        assert_eq!(state.selection.len(), 1);
        assert_eq!(state.action_context, Some(ActionContext::UnassignFailed));
        assert!(!state.unassign_pending);
        let message = state.message.expect("failure message set");
        assert_eq!(message.description.as_deref(), Some("boom"));
    }

    #[test]
    fn test_begin_unassign_blocks_concurrent_runs() {
        let mut state = ModalState::new();
        assert!(begin_unassign(&mut state));
        // Second invocation while outstanding is refused
        assert!(!begin_unassign(&mut state));

        reduce(&mut state, ModalAction::SetUnassignPending(false));
        assert!(begin_unassign(&mut state));
    }
}
