//! Rename executor

use super::TaskContext;
use crate::action::FileAction;
use crate::events::MigrationEvent;
use crate::task::RenameTask;
use codemigrate_types::{CollisionPolicy, Error, Result};
use std::path::Path;
use tracing::{debug, warn};

/// Moves every matched file to the path its callback returns
pub fn run(task: &mut RenameTask<'_>, ctx: &mut TaskContext<'_>) -> Result<Vec<FileAction>> {
    let paths = ctx.matched_paths(task.info.pattern())?;
    Ok(paths
        .iter()
        .filter_map(|relative| rename_file(task, ctx, relative))
        .collect())
}

fn rename_file(
    task: &mut RenameTask<'_>,
    ctx: &mut TaskContext<'_>,
    relative: &Path,
) -> Option<FileAction> {
    let file = ctx.open(&task.info, relative)?;
    ctx.emit(&MigrationEvent::Start {
        task: &task.info,
        file: Some(&file),
    });

    let target = match (task.callback)(&file) {
        Ok(Some(target)) => ctx.fs.resolve(target),
        Ok(None) => {
            ctx.emit(&MigrationEvent::Cancel {
                task: &task.info,
                file: Some(&file),
            });
            return None;
        }
        Err(error) => {
            ctx.emit(&MigrationEvent::Fail {
                task: &task.info,
                file: Some(&file),
                error: &*error,
            });
            return None;
        }
    };

    if target.as_path() == file.path() {
        ctx.emit(&MigrationEvent::Cancel {
            task: &task.info,
            file: Some(&file),
        });
        return None;
    }

    // a directory can never be overwritten by a file
    let target_is_dir = ctx.fs.is_dir(&target);
    if target_is_dir || ctx.fs.exists(&target) {
        warn!(
            "Rename target {} already exists ({:?})",
            target.display(),
            ctx.options.rename_collision
        );
        ctx.emit(&MigrationEvent::RenameCollision {
            task: &task.info,
            file: &file,
            target: &target,
        });

        if target_is_dir || ctx.options.rename_collision == CollisionPolicy::Fail {
            let error = Error::RenameCollision {
                from: file.path().to_path_buf(),
                to: target,
            };
            ctx.fail(&task.info, &file, &error);
            return None;
        }
    }

    if let Err(error) = ctx.fs.rename(file.path(), &target) {
        ctx.fail(&task.info, &file, &error);
        return None;
    }
    debug!("Renamed {} -> {}", file.path().display(), target.display());

    let action = FileAction::Rename {
        task: task.info.clone(),
        original_file_path: file.path().to_path_buf(),
        new_file_path: target,
    };
    ctx.emit(&MigrationEvent::Success {
        task: &task.info,
        action: &action,
    });
    Some(action)
}
