//! Event reporting through `tracing`

use crate::events::{MigrationEvent, MigrationObserver};
use tracing::{debug, error, info, warn};

/// Writes every migration event to the `tracing` subscriber.
///
/// Successes log at `info`, overrides and collisions at `warn`, failures at
/// `error`, everything else at `debug`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl TracingReporter {
    /// Create a reporter
    pub fn new() -> Self {
        Self
    }
}

impl MigrationObserver for TracingReporter {
    fn on_event(&self, event: &MigrationEvent<'_>) {
        let name = event.name();
        let title = &event.task().title;
        let path = event
            .path()
            .map(|path| path.display().to_string())
            .unwrap_or_default();

        match event {
            MigrationEvent::TaskStart { task } => {
                info!(event = name, pattern = task.pattern(), "Task '{}'", title);
            }
            MigrationEvent::Success { .. } => info!(event = name, task = %title, "{}", path),
            MigrationEvent::Override { .. } => {
                warn!(event = name, task = %title, "Overriding existing file {}", path);
            }
            MigrationEvent::RenameCollision { target, .. } => {
                warn!(
                    event = name,
                    task = %title,
                    "Rename of {} collides with {}",
                    path,
                    target.display()
                );
            }
            MigrationEvent::Fail { error, .. } => {
                error!(event = name, task = %title, "{}: {}", path, error);
            }
            MigrationEvent::Start { .. } | MigrationEvent::Cancel { .. } => {
                debug!(event = name, task = %title, "{}", path);
            }
        }
    }
}
