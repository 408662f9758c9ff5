//! Synchronous event bus and observers
//!
//! Executors publish one event per lifecycle moment of a file; observers
//! subscribed to the [`EventBus`] see every event in emission order, on the
//! caller's thread, before the executor moves on.

use crate::action::FileAction;
use crate::task::TaskInfo;
use codemigrate_types::{MigrationStats, TaskKind};
use codemigrate_vfs::File;
use std::cell::RefCell;
use std::fmt;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Error carried by fail events
pub type EventError = dyn std::error::Error + Send + Sync + 'static;

/// One lifecycle moment of a migration
#[derive(Clone, Copy)]
pub enum MigrationEvent<'e> {
    /// A task is about to run
    TaskStart {
        /// Task
        task: &'e TaskInfo,
    },
    /// A file is about to be handed to the task's callback. Standalone
    /// creates have no file.
    Start {
        /// Task
        task: &'e TaskInfo,
        /// Matched file
        file: Option<&'e File>,
    },
    /// A file action was produced
    Success {
        /// Task
        task: &'e TaskInfo,
        /// Recorded action
        action: &'e FileAction,
    },
    /// The callback failed for one file; the task carries on
    Fail {
        /// Task
        task: &'e TaskInfo,
        /// Matched file
        file: Option<&'e File>,
        /// Failure
        error: &'e EventError,
    },
    /// The callback declined to act on a file
    Cancel {
        /// Task
        task: &'e TaskInfo,
        /// Matched file
        file: Option<&'e File>,
    },
    /// A create is about to replace an existing file
    Override {
        /// Task
        task: &'e TaskInfo,
        /// Create action carrying the replaced file
        action: &'e FileAction,
    },
    /// A rename target already exists
    RenameCollision {
        /// Task
        task: &'e TaskInfo,
        /// File being renamed
        file: &'e File,
        /// Existing target path
        target: &'e Path,
    },
}

impl<'e> MigrationEvent<'e> {
    /// Event name, such as `transform-start` or `create-success-override`
    pub fn name(&self) -> &'static str {
        let kind = self.task().kind;
        match self {
            Self::TaskStart { .. } => "task-start",
            Self::RenameCollision { .. } => "rename-collision",
            Self::Start { .. } => match kind {
                TaskKind::Transform => "transform-start",
                TaskKind::Rename => "rename-start",
                TaskKind::Remove => "remove-start",
                TaskKind::Create => "create-start",
            },
            Self::Success { .. } => match kind {
                TaskKind::Transform => "transform-success",
                TaskKind::Rename => "rename-success",
                TaskKind::Remove => "remove-success",
                TaskKind::Create => "create-success",
            },
            Self::Fail { .. } => match kind {
                TaskKind::Transform => "transform-fail",
                TaskKind::Rename => "rename-fail",
                TaskKind::Remove => "remove-fail",
                TaskKind::Create => "create-fail",
            },
            Self::Cancel { .. } => match kind {
                TaskKind::Transform => "transform-success-cancel",
                TaskKind::Rename => "rename-success-cancel",
                TaskKind::Remove => "remove-success-cancel",
                TaskKind::Create => "create-success-cancel",
            },
            Self::Override { .. } => "create-success-override",
        }
    }

    /// Originating task
    pub fn task(&self) -> &'e TaskInfo {
        match *self {
            Self::TaskStart { task }
            | Self::Start { task, .. }
            | Self::Success { task, .. }
            | Self::Fail { task, .. }
            | Self::Cancel { task, .. }
            | Self::Override { task, .. }
            | Self::RenameCollision { task, .. } => task,
        }
    }

    /// Path the event is about, if any
    pub fn path(&self) -> Option<&'e Path> {
        match *self {
            Self::TaskStart { .. } => None,
            Self::Start { file, .. } | Self::Fail { file, .. } | Self::Cancel { file, .. } => {
                file.map(File::path)
            }
            Self::Success { action, .. } | Self::Override { action, .. } => Some(action.path()),
            Self::RenameCollision { file, .. } => Some(file.path()),
        }
    }
}

impl fmt::Debug for MigrationEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MigrationEvent")
            .field("name", &self.name())
            .field("task", &self.task().title)
            .field("path", &self.path())
            .finish()
    }
}

/// Receives every event published on an [`EventBus`]
pub trait MigrationObserver {
    /// Handle one event
    fn on_event(&self, event: &MigrationEvent<'_>);
}

/// Synchronous publish/subscribe hub that also tallies [`MigrationStats`]
#[derive(Default)]
pub struct EventBus {
    observers: Vec<Box<dyn MigrationObserver>>,
    stats: MigrationStats,
}

impl EventBus {
    /// Create a bus without observers
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an observer; observers are notified in subscription order
    pub fn subscribe<O: MigrationObserver + 'static>(&mut self, observer: O) {
        self.observers.push(Box::new(observer));
    }

    /// Number of subscribed observers
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Publish an event
    pub fn emit(&mut self, event: &MigrationEvent<'_>) {
        match event {
            MigrationEvent::TaskStart { .. } => self.stats.tasks += 1,
            MigrationEvent::Success { task, .. } => self.stats.record_success(task.kind),
            MigrationEvent::Fail { .. } => self.stats.failed += 1,
            MigrationEvent::Cancel { .. } => self.stats.cancelled += 1,
            MigrationEvent::Override { .. } => self.stats.overridden += 1,
            MigrationEvent::Start { .. } | MigrationEvent::RenameCollision { .. } => {}
        }

        for observer in &self.observers {
            observer.on_event(event);
        }
    }

    /// Counters tallied from the events seen so far
    pub fn stats(&self) -> &MigrationStats {
        &self.stats
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("observers", &self.observers.len())
            .field("stats", &self.stats)
            .finish()
    }
}

/// Event as kept by an [`EventRecorder`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedEvent {
    /// Event name
    pub name: &'static str,
    /// Title of the originating task
    pub task: String,
    /// Path the event is about
    pub path: Option<PathBuf>,
    /// Rendered error of fail events
    pub error: Option<String>,
}

/// Observer that keeps every event in memory.
///
/// Clones share the same buffer, so one clone can be subscribed while
/// another is kept for inspection.
#[derive(Debug, Clone, Default)]
pub struct EventRecorder {
    events: Rc<RefCell<Vec<RecordedEvent>>>,
}

impl EventRecorder {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Every event recorded so far
    pub fn events(&self) -> Vec<RecordedEvent> {
        self.events.borrow().clone()
    }

    /// Names of the recorded events, in emission order
    pub fn names(&self) -> Vec<&'static str> {
        self.events.borrow().iter().map(|event| event.name).collect()
    }

    /// How many events named `name` were recorded
    pub fn count(&self, name: &str) -> usize {
        self.events
            .borrow()
            .iter()
            .filter(|event| event.name == name)
            .count()
    }

    /// Forget every recorded event
    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}

impl MigrationObserver for EventRecorder {
    fn on_event(&self, event: &MigrationEvent<'_>) {
        let error = match event {
            MigrationEvent::Fail { error, .. } => Some(error.to_string()),
            _ => None,
        };
        self.events.borrow_mut().push(RecordedEvent {
            name: event.name(),
            task: event.task().title.clone(),
            path: event.path().map(Path::to_path_buf),
            error,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{CreateTask, TransformTask};
    use codemigrate_types::Error;

    fn transform_info() -> TaskInfo {
        TransformTask::new("upper", "*.txt", |_: &File| Ok(None)).info
    }

    #[test]
    fn test_event_names() {
        let task = transform_info();
        let error = Error::other("boom");

        assert_eq!(MigrationEvent::TaskStart { task: &task }.name(), "task-start");
        assert_eq!(
            MigrationEvent::Start { task: &task, file: None }.name(),
            "transform-start"
        );
        assert_eq!(
            MigrationEvent::Cancel { task: &task, file: None }.name(),
            "transform-success-cancel"
        );
        assert_eq!(
            MigrationEvent::Fail {
                task: &task,
                file: None,
                error: &error
            }
            .name(),
            "transform-fail"
        );
    }

    #[test]
    fn test_standalone_create_events_have_no_path() {
        let task = CreateTask::standalone("readme", || Ok(None)).info;
        let start = MigrationEvent::Start { task: &task, file: None };
        let cancel = MigrationEvent::Cancel { task: &task, file: None };

        assert_eq!(start.name(), "create-start");
        assert_eq!(cancel.name(), "create-success-cancel");
        assert_eq!(cancel.path(), None);
    }

    #[test]
    fn test_bus_notifies_observers_and_tallies() {
        let task = transform_info();
        let recorder = EventRecorder::new();
        let mut bus = EventBus::new();
        bus.subscribe(recorder.clone());

        let error = Error::other("boom");
        bus.emit(&MigrationEvent::TaskStart { task: &task });
        bus.emit(&MigrationEvent::Cancel { task: &task, file: None });
        bus.emit(&MigrationEvent::Fail {
            task: &task,
            file: None,
            error: &error,
        });

        assert_eq!(
            recorder.names(),
            vec!["task-start", "transform-success-cancel", "transform-fail"]
        );
        assert_eq!(recorder.events()[2].error.as_deref(), Some("boom"));
        assert_eq!(bus.stats().tasks, 1);
        assert_eq!(bus.stats().cancelled, 1);
        assert_eq!(bus.stats().failed, 1);

        recorder.clear();
        assert!(recorder.events().is_empty());
    }
}
