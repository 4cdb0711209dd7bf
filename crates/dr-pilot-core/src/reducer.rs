//! Modal state machine for the manage-policies flow
//!
//! All view state for the flow lives in one owned [`ModalState`] value,
//! threaded explicitly through the component that owns it. Mutation happens
//! only through [`reduce`], which is synchronous and total: every
//! `(state, action)` pair maps to exactly one new state, and no transition
//! fails. Failure handling belongs to the unassign operation, not here.

use crate::selection::SelectionSet;
use crate::types::DataPolicy;
use serde::{Deserialize, Serialize};

/// Phase of the confirm/result overlay
///
/// Absent means no overlay is showing. The flow is
/// `None -> ConfirmingUnassign -> {UnassignSucceeded, UnassignFailed}`,
/// with any phase able to drop back to `None` via [`ModalAction::Cancel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionContext {
    ConfirmingUnassign,
    UnassignSucceeded,
    UnassignFailed,
}

/// Severity of a surfaced message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum MessageVariant {
    #[default]
    Info,
    Success,
    Danger,
}

/// A message surfaced to the user alongside a context transition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub title: String,
    pub description: Option<String>,
    pub variant: MessageVariant,
}

impl Message {
    pub fn info(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            variant: MessageVariant::Info,
        }
    }

    pub fn success(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            variant: MessageVariant::Success,
        }
    }

    pub fn danger(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: Some(description.into()),
            variant: MessageVariant::Danger,
        }
    }
}

/// State of the manage-policies modal
///
/// Created fresh when the view opens and discarded on close; nothing here
/// persists across sessions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModalState {
    /// Policies checked for a pending action
    pub selection: SelectionSet,
    /// Current overlay phase; `None` is the idle list view
    pub action_context: Option<ActionContext>,
    /// Message shown with the current phase
    pub message: Option<Message>,
    /// True while an unassign run is outstanding; blocks re-invocation
    pub unassign_pending: bool,
}

impl ModalState {
    pub fn new() -> Self {
        Self::default()
    }
}

/// User and operation intents consumed by [`reduce`]
#[derive(Debug, Clone)]
pub enum ModalAction {
    /// Replace the selection; the action context is untouched
    SelectPolicies(Vec<DataPolicy>),
    /// Set the overlay phase. When entering `ConfirmingUnassign` the caller
    /// must already have set the pending-action message; the reducer does
    /// not synthesize one.
    SetActionContext(Option<ActionContext>),
    /// Replace the current message, independent of the context
    SetMessage(Message),
    /// Drop the current message
    ClearMessage,
    /// Return the context to idle; the message is left untouched so the
    /// caller decides whether to clear it
    Cancel,
    /// Set or clear the concurrent-invocation guard
    SetUnassignPending(bool),
}

/// Apply one action to the modal state
pub fn reduce(state: &mut ModalState, action: ModalAction) {
    match action {
        ModalAction::SelectPolicies(policies) => {
            state.selection.replace(policies);
        }
        ModalAction::SetActionContext(context) => {
            state.action_context = context;
        }
        ModalAction::SetMessage(message) => {
            state.message = Some(message);
        }
        ModalAction::ClearMessage => {
            state.message = None;
        }
        ModalAction::Cancel => {
            state.action_context = None;
        }
        ModalAction::SetUnassignPending(pending) => {
            state.unassign_pending = pending;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::ReplicationHealth;

    fn policy(name: &str) -> DataPolicy {
        DataPolicy {
            name: name.to_string(),
            scheduling_interval: "5m".to_string(),
            dr_clusters: Vec::new(),
            placement_controls: Vec::new(),
            sync_health: ReplicationHealth::Unknown,
            activity: None,
        }
    }

    #[test]
    fn test_select_policies_replaces_selection_only() {
        let mut state = ModalState::new();
        reduce(
            &mut state,
            ModalAction::SetActionContext(Some(ActionContext::ConfirmingUnassign)),
        );
        reduce(&mut state, ModalAction::SelectPolicies(vec![policy("gold")]));

        assert_eq!(state.selection.len(), 1);
        assert_eq!(state.action_context, Some(ActionContext::ConfirmingUnassign));

        reduce(&mut state, ModalAction::SelectPolicies(vec![policy("silver")]));
        assert!(state.selection.contains("silver"));
        assert!(!state.selection.contains("gold"));
    }

    #[test]
    fn test_cancel_resets_context_and_preserves_selection() {
        let mut state = ModalState::new();
        reduce(&mut state, ModalAction::SelectPolicies(vec![policy("gold")]));
        reduce(
            &mut state,
            ModalAction::SetActionContext(Some(ActionContext::ConfirmingUnassign)),
        );
        reduce(&mut state, ModalAction::Cancel);

        assert_eq!(state.action_context, None);
        assert_eq!(state.selection.len(), 1);
    }

    #[test]
    fn test_cancel_leaves_message_untouched() {
        let mut state = ModalState::new();
        reduce(&mut state, ModalAction::SetMessage(Message::info("pending")));
        reduce(&mut state, ModalAction::Cancel);
        assert!(state.message.is_some());

        reduce(&mut state, ModalAction::ClearMessage);
        assert!(state.message.is_none());
    }

    #[test]
    fn test_set_message_is_independent_of_context() {
        let mut state = ModalState::new();
        reduce(&mut state, ModalAction::SetMessage(Message::success("done")));
        assert_eq!(state.action_context, None);
        assert_eq!(state.message.as_ref().map(|m| m.variant), Some(MessageVariant::Success));

        reduce(
            &mut state,
            ModalAction::SetMessage(Message::danger("failed", "boom")),
        );
        let message = state.message.expect("message set");
        assert_eq!(message.variant, MessageVariant::Danger);
        assert_eq!(message.description.as_deref(), Some("boom"));
    }

    #[test]
    fn test_pending_guard_flag() {
        let mut state = ModalState::new();
        reduce(&mut state, ModalAction::SetUnassignPending(true));
        assert!(state.unassign_pending);
        reduce(&mut state, ModalAction::SetUnassignPending(false));
        assert!(!state.unassign_pending);
    }
}
