//! App-loop actions
//!
//! Components hand these back to the loop instead of touching the app
//! directly.

#[derive(Debug, Clone)]
pub enum Action {
    Quit,

    /// Reload the policy collection from the cluster
    Refresh,

    /// Periodic heartbeat; drives overlay polling and auto-refresh
    Tick,

    Resize(u16, u16),
}
