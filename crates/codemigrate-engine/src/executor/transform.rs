//! Transform executor

use super::TaskContext;
use crate::action::FileAction;
use crate::events::MigrationEvent;
use crate::task::TransformTask;
use codemigrate_types::Result;
use std::path::Path;
use tracing::debug;

/// Rewrites every matched file whose callback returns new content
pub fn run(task: &mut TransformTask<'_>, ctx: &mut TaskContext<'_>) -> Result<Vec<FileAction>> {
    let paths = ctx.matched_paths(task.info.pattern())?;
    Ok(paths
        .iter()
        .filter_map(|relative| transform_file(task, ctx, relative))
        .collect())
}

fn transform_file(
    task: &mut TransformTask<'_>,
    ctx: &mut TaskContext<'_>,
    relative: &Path,
) -> Option<FileAction> {
    let file = ctx.open(&task.info, relative)?;
    ctx.emit(&MigrationEvent::Start {
        task: &task.info,
        file: Some(&file),
    });

    let source = match (task.callback)(&file) {
        Ok(Some(source)) if source.as_bytes() != file.contents() => source,
        Ok(_) => {
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

    let new_file = file.replace_source(source);
    ctx.fs.write_file(new_file.path(), new_file.contents());
    debug!("Transformed {}", new_file.file_name().display());

    let action = FileAction::Transform {
        task: task.info.clone(),
        original_file: file,
        new_file,
    };
    ctx.emit(&MigrationEvent::Success {
        task: &task.info,
        action: &action,
    });
    Some(action)
}
