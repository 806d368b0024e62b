//! Progress reporting for migration runs

use std::fmt;

/// Something worth telling the operator about during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrationEvent {
    /// A migration's statements completed
    Applied { version: u64, name: Option<String> },
    /// The run selected nothing to apply
    NoChange,
}

impl fmt::Display for MigrationEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MigrationEvent::Applied {
                version,
                name: Some(name),
            } => write!(f, "{version}/up {name}"),
            MigrationEvent::Applied { version, name: None } => write!(f, "{version}/up"),
            MigrationEvent::NoChange => f.write_str("no change"),
        }
    }
}

/// Receives [`MigrationEvent`]s as a run proceeds.
pub trait ProgressSink: Send + Sync {
    fn notify(&self, event: &MigrationEvent);
}

/// Default sink: forwards events to the `log` facade at info level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgress;

impl ProgressSink for LogProgress {
    fn notify(&self, event: &MigrationEvent) {
        log::info!("{event}");
    }
}
