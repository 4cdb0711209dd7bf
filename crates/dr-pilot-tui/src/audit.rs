//! Audit trail for unassign runs
//!
//! Every run appends a start line and a settle line to
//! `~/.dr-pilot/audit.log`, so an operator can reconstruct who removed which
//! policies and when. Auditing is best-effort: a trail that cannot be opened
//! disables itself instead of failing the operation.

use chrono::Local;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::OnceLock;

/// One audited moment in an unassign run
#[derive(Debug, Clone)]
pub enum AuditEvent {
    RunStarted {
        policies: String,
        controls: usize,
    },
    RunSucceeded {
        policies: String,
        count: usize,
    },
    RunFailed {
        policies: String,
        reason: String,
    },
}

impl AuditEvent {
    fn fields(&self) -> String {
        match self {
            AuditEvent::RunStarted { policies, controls } => {
                format!("event=unassign-started policies={policies} controls={controls}")
            }
            AuditEvent::RunSucceeded { policies, count } => {
                format!("event=unassign-succeeded policies={policies} count={count}")
            }
            AuditEvent::RunFailed { policies, reason } => {
                // Keep the line parseable; reasons may contain anything
                let reason = reason.replace('"', "'");
                format!("event=unassign-failed policies={policies} reason=\"{reason}\"")
            }
        }
    }
}

/// Append-only log of unassign runs
pub struct AuditTrail {
    path: PathBuf,
    context: String,
    user: String,
}

impl AuditTrail {
    /// Open the trail under `~/.dr-pilot`, creating the directory if needed
    ///
    /// Returns `None` when the directory cannot be created, which disables
    /// auditing for the session.
    fn open(context: &str) -> Option<Self> {
        let home = dirs_next::home_dir().unwrap_or_else(|| PathBuf::from("."));
        let dir = home.join(".dr-pilot");
        fs::create_dir_all(&dir).ok()?;

        let user = std::env::var("USER")
            .or_else(|_| std::env::var("USERNAME"))
            .unwrap_or_else(|_| "unknown".to_string());

        Some(Self {
            path: dir.join("audit.log"),
            context: context.to_string(),
            user,
        })
    }

    fn line(&self, timestamp: &str, event: &AuditEvent) -> String {
        format!(
            "{timestamp} context={} user={} {}\n",
            self.context,
            self.user,
            event.fields()
        )
    }

    fn append(&self, event: &AuditEvent) -> io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        let timestamp = Local::now().format("%Y-%m-%dT%H:%M:%S%z").to_string();
        file.write_all(self.line(&timestamp, event).as_bytes())
    }
}

static TRAIL: OnceLock<Option<AuditTrail>> = OnceLock::new();

/// Open the session-wide audit trail
pub fn init_audit(context: &str) {
    let _ = TRAIL.set(AuditTrail::open(context));
}

/// Record an event on the session trail, if auditing is enabled
pub fn record(event: AuditEvent) {
    if let Some(Some(trail)) = TRAIL.get() {
        if let Err(e) = trail.append(&event) {
            tracing::warn!("audit append failed: {}", e);
        }
    }
}
