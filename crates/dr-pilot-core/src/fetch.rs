//! Fetch lifecycle for cluster-backed views
//!
//! A view renders from its last good snapshot: a refresh that fails keeps the
//! previous data on screen and surfaces the error alongside it. Only the very
//! first fetch can leave the view with nothing to show.

use std::time::{Duration, Instant};

/// Lifecycle of the data behind an async-loading view
#[derive(Debug, Clone)]
pub enum FetchState<T> {
    /// The first fetch has not settled yet
    Priming,
    /// The first fetch failed and there is nothing to render
    Unavailable { error: String, failed_at: Instant },
    /// A snapshot is on screen; refreshes replace it in place
    Ready {
        data: T,
        /// A refresh is in flight
        refreshing: bool,
        /// The most recent refresh failed; the snapshot is stale
        stale_error: Option<String>,
        fetched_at: Instant,
    },
}

impl<T> Default for FetchState<T> {
    fn default() -> Self {
        FetchState::Priming
    }
}

impl<T> FetchState<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// The current snapshot, if one has ever been loaded
    pub fn data(&self) -> Option<&T> {
        match self {
            FetchState::Ready { data, .. } => Some(data),
            _ => None,
        }
    }

    /// The error to surface, from either a failed first fetch or a failed
    /// refresh of an existing snapshot
    pub fn error(&self) -> Option<&str> {
        match self {
            FetchState::Unavailable { error, .. } => Some(error),
            FetchState::Ready { stale_error, .. } => stale_error.as_deref(),
            FetchState::Priming => None,
        }
    }

    /// Note that a fetch has been issued
    ///
    /// An existing snapshot stays on screen while the refresh runs; a prior
    /// failure keeps showing its error until the retry settles.
    pub fn begin_fetch(&mut self) {
        if let FetchState::Ready { refreshing, .. } = self {
            *refreshing = true;
        }
    }

    /// Install a freshly fetched snapshot
    pub fn complete(&mut self, data: T) {
        *self = FetchState::Ready {
            data,
            refreshing: false,
            stale_error: None,
            fetched_at: Instant::now(),
        };
    }

    /// Record a failed fetch
    ///
    /// With a snapshot on screen the data is kept and marked stale; without
    /// one the view becomes unavailable.
    pub fn fail(&mut self, error: impl Into<String>) {
        match self {
            FetchState::Ready {
                refreshing,
                stale_error,
                ..
            } => {
                *refreshing = false;
                *stale_error = Some(error.into());
            }
            _ => {
                *self = FetchState::Unavailable {
                    error: error.into(),
                    failed_at: Instant::now(),
                };
            }
        }
    }

    /// Whether the refresh cadence calls for a new fetch
    ///
    /// Failed first fetches retry at the same cadence; a fetch already in
    /// flight is never doubled up.
    pub fn due_for_refresh(&self, interval: Duration) -> bool {
        match self {
            FetchState::Priming => false,
            FetchState::Unavailable { failed_at, .. } => failed_at.elapsed() >= interval,
            FetchState::Ready {
                refreshing,
                fetched_at,
                ..
            } => !refreshing && fetched_at.elapsed() >= interval,
        }
    }

    /// One-word status for the footer
    pub fn status_label(&self) -> &'static str {
        match self {
            FetchState::Priming => "Loading",
            FetchState::Unavailable { .. } => "Error",
            FetchState::Ready {
                refreshing: true, ..
            } => "Refreshing",
            FetchState::Ready {
                stale_error: Some(_),
                ..
            } => "Stale",
            FetchState::Ready { .. } => "Ready",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priming_never_refreshes() {
        let state: FetchState<u32> = FetchState::new();
        assert!(state.data().is_none());
        assert!(state.error().is_none());
        assert!(!state.due_for_refresh(Duration::ZERO));
        assert_eq!(state.status_label(), "Loading");
    }

    #[test]
    fn test_complete_installs_snapshot() {
        let mut state = FetchState::new();
        state.complete(7);

        assert_eq!(state.data(), Some(&7));
        assert!(state.due_for_refresh(Duration::ZERO));
        assert!(!state.due_for_refresh(Duration::from_secs(300)));
        assert_eq!(state.status_label(), "Ready");
    }

    #[test]
    fn test_failed_refresh_keeps_snapshot() {
        let mut state = FetchState::new();
        state.complete(7);
        state.begin_fetch();
        state.fail("fetch failed");

        assert_eq!(state.data(), Some(&7));
        assert_eq!(state.error(), Some("fetch failed"));
        assert_eq!(state.status_label(), "Stale");
    }

    #[test]
    fn test_first_failure_is_unavailable_and_retries() {
        let mut state: FetchState<u32> = FetchState::new();
        state.fail("no route to host");

        assert!(state.data().is_none());
        assert_eq!(state.error(), Some("no route to host"));
        assert_eq!(state.status_label(), "Error");
        // Retries at the refresh cadence, not in a tight loop
        assert!(state.due_for_refresh(Duration::ZERO));
        assert!(!state.due_for_refresh(Duration::from_secs(300)));
    }

    #[test]
    fn test_refresh_in_flight_is_not_doubled() {
        let mut state = FetchState::new();
        state.complete(7);
        state.begin_fetch();

        assert!(!state.due_for_refresh(Duration::ZERO));
        assert_eq!(state.status_label(), "Refreshing");

        state.complete(8);
        assert_eq!(state.data(), Some(&8));
        assert!(state.error().is_none());
    }
}
