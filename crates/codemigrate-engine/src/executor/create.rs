//! Create executor
//!
//! Creation runs in three passes. Callbacks run first for every input and
//! their outputs are validated as a batch, so a malformed output aborts the
//! task with [`Error::Config`](codemigrate_types::Error::Config) before the
//! overlay has been touched. The second pass resolves what currently lives at
//! every target, which is the last step that can fail. Only the third pass
//! stages files, and it cannot fail.

use super::TaskContext;
use crate::action::FileAction;
use crate::events::MigrationEvent;
use crate::task::{CreateFn, CreateInput, CreateOutput, CreateTask, TaskInfo};
use codemigrate_types::{Error, Result};
use codemigrate_vfs::File;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use tracing::debug;

/// A validated output whose target has been resolved
struct Planned {
    new_file: File,
    /// What the target held before this task, `None` when a previous output
    /// of the same task writes it first
    original: Option<File>,
}

/// Produces new files from the task's callback
pub fn run(task: &mut CreateTask<'_>, ctx: &mut TaskContext<'_>) -> Result<Vec<FileAction>> {
    let info = &task.info;
    let mut outputs = Vec::new();

    match &mut task.callback {
        CreateFn::Standalone(callback) => {
            ctx.emit(&MigrationEvent::Start {
                task: info,
                file: None,
            });
            let outcome = callback();
            outputs.extend(settle(info, ctx, None, outcome)?);
        }
        CreateFn::Matched(callback) => {
            for relative in ctx.matched_paths(info.pattern())? {
                let Some(file) = ctx.open(info, &relative) else {
                    continue;
                };
                ctx.emit(&MigrationEvent::Start {
                    task: info,
                    file: Some(&file),
                });
                let input = match CreateInput::try_from(&file) {
                    Ok(input) => input,
                    Err(error) => {
                        ctx.fail(info, &file, &error);
                        continue;
                    }
                };
                let outcome = callback(input);
                outputs.extend(settle(info, ctx, Some(&file), outcome)?);
            }
        }
    }

    let planned = plan(info, ctx, outputs);
    Ok(stage(info, ctx, planned))
}

/// Turns one callback outcome into a validated output, reporting failures
/// and cancellations
fn settle(
    info: &TaskInfo,
    ctx: &mut TaskContext<'_>,
    file: Option<&File>,
    outcome: anyhow::Result<Option<CreateOutput>>,
) -> Result<Option<(PathBuf, String)>> {
    match outcome {
        Ok(Some(output)) => output.validate().map(Some),
        Ok(None) => {
            ctx.emit(&MigrationEvent::Cancel { task: info, file });
            Ok(None)
        }
        Err(error) => {
            ctx.emit(&MigrationEvent::Fail {
                task: info,
                file,
                error: &*error,
            });
            Ok(None)
        }
    }
}

/// Resolves every target against the overlay without staging anything.
/// Targets that cannot be written are reported and dropped.
fn plan(
    info: &TaskInfo,
    ctx: &mut TaskContext<'_>,
    outputs: Vec<(PathBuf, String)>,
) -> Vec<Planned> {
    let mut planned = Vec::with_capacity(outputs.len());
    let mut targets: HashSet<PathBuf> = HashSet::new();

    for (file_name, source) in outputs {
        let new_file = File::with_source(&*ctx.fs, &file_name, source);

        if ctx.fs.is_dir(new_file.path()) {
            let error = Error::Io {
                path: new_file.path().to_path_buf(),
                message: "target is a directory".to_string(),
            };
            ctx.fail(info, &new_file, &error);
            continue;
        }

        let original = if targets.contains(new_file.path()) {
            None
        } else {
            match File::open(&*ctx.fs, new_file.path()) {
                Ok(original) => Some(original),
                Err(error) => {
                    ctx.fail(info, &new_file, &error);
                    continue;
                }
            }
        };

        targets.insert(new_file.path().to_path_buf());
        planned.push(Planned { new_file, original });
    }

    planned
}

fn stage(info: &TaskInfo, ctx: &mut TaskContext<'_>, planned: Vec<Planned>) -> Vec<FileAction> {
    let mut written: HashMap<PathBuf, File> = HashMap::new();
    let mut actions = Vec::with_capacity(planned.len());

    for Planned { new_file, original } in planned {
        let original = match original {
            Some(original) => original.exists().then_some(original),
            None => written.get(new_file.path()).map(|previous| {
                File::with_source(&*ctx.fs, previous.path(), previous.contents())
            }),
        };

        ctx.fs.write_file(new_file.path(), new_file.contents());
        debug!("Created {}", new_file.file_name().display());
        written.insert(new_file.path().to_path_buf(), new_file.clone());

        let action = FileAction::Create {
            task: info.clone(),
            original_file: original,
            new_file,
        };
        if action.is_override() {
            ctx.emit(&MigrationEvent::Override {
                task: info,
                action: &action,
            });
        }
        ctx.emit(&MigrationEvent::Success {
            task: info,
            action: &action,
        });
        actions.push(action);
    }

    actions
}
