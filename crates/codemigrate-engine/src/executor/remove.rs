//! Remove executor

use super::TaskContext;
use crate::action::FileAction;
use crate::events::MigrationEvent;
use crate::task::RemoveTask;
use codemigrate_types::Result;
use std::path::Path;
use tracing::debug;

/// Deletes every matched file the callback confirms
pub fn run(task: &mut RemoveTask<'_>, ctx: &mut TaskContext<'_>) -> Result<Vec<FileAction>> {
    let paths = ctx.matched_paths(task.info.pattern())?;
    Ok(paths
        .iter()
        .filter_map(|relative| remove_file(task, ctx, relative))
        .collect())
}

fn remove_file(
    task: &mut RemoveTask<'_>,
    ctx: &mut TaskContext<'_>,
    relative: &Path,
) -> Option<FileAction> {
    let file = ctx.open(&task.info, relative)?;
    ctx.emit(&MigrationEvent::Start {
        task: &task.info,
        file: Some(&file),
    });

    let confirmed = match task.callback.as_mut() {
        None => Ok(true),
        Some(callback) => callback(&file),
    };

    match confirmed {
        Ok(true) => {}
        Ok(false) => {
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
    }

    if let Err(error) = ctx.fs.remove_file(file.path()) {
        ctx.fail(&task.info, &file, &error);
        return None;
    }
    debug!("Removed {}", file.file_name().display());

    let action = FileAction::Remove {
        task: task.info.clone(),
        file_path: file.path().to_path_buf(),
    };
    ctx.emit(&MigrationEvent::Success {
        task: &task.info,
        action: &action,
    });
    Some(action)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::fixture::Fixture;
    use codemigrate_vfs::File;

    #[test]
    fn test_remove_in_resolution_order() {
        let mut fixture = Fixture::new(&[("b.tmp", "b"), ("a.tmp", "a"), ("keep.txt", "k")]);
        let mut task = RemoveTask::new("clean", "*.tmp", |_: &File| Ok(true));

        let actions = run(&mut task, &mut fixture.context()).unwrap();

        let removed: Vec<_> = actions.iter().map(|action| action.path().to_path_buf()).collect();
        assert_eq!(
            removed,
            vec![fixture.fs.resolve("a.tmp"), fixture.fs.resolve("b.tmp")]
        );
        assert!(!fixture.fs.exists("a.tmp"));
        assert!(!fixture.fs.exists("b.tmp"));
        assert!(fixture.fs.exists("keep.txt"));
    }

    #[test]
    fn test_remove_cancel_and_fail() {
        let mut fixture = Fixture::new(&[("a.tmp", "a"), ("b.tmp", "b"), ("c.tmp", "c")]);
        let mut task = RemoveTask::new("selective", "*.tmp", |file: &File| match file.source()? {
            "a" => Ok(true),
            "b" => Ok(false),
            _ => Err(anyhow::anyhow!("locked")),
        });

        let actions = run(&mut task, &mut fixture.context()).unwrap();

        assert_eq!(actions.len(), 1);
        assert!(!fixture.fs.exists("a.tmp"));
        assert!(fixture.fs.exists("b.tmp"));
        assert!(fixture.fs.exists("c.tmp"));
        assert_eq!(fixture.recorder.count("remove-success"), 1);
        assert_eq!(fixture.recorder.count("remove-success-cancel"), 1);
        assert_eq!(fixture.recorder.count("remove-fail"), 1);
    }

    #[test]
    fn test_remove_matching_confirms_everything() {
        let mut fixture = Fixture::new(&[("a.log", ""), ("logs/b.log", "")]);
        let mut task = RemoveTask::matching("logs", "**/*.log");

        let actions = run(&mut task, &mut fixture.context()).unwrap();

        assert_eq!(actions.len(), 2);
        assert_eq!(fixture.events.stats().removed, 2);
    }

    #[test]
    fn test_remove_binary_files() {
        let mut fixture = Fixture::with_bytes(&[
            ("logo.png", &[0x89u8, 0x50, 0xff, 0xfe][..]),
            ("icon.png", &[0x00u8, 0xc3, 0x28][..]),
        ]);
        let mut task = RemoveTask::new("drop images", "*.png", |_: &File| Ok(true));

        let actions = run(&mut task, &mut fixture.context()).unwrap();

        assert_eq!(actions.len(), 2);
        assert!(!fixture.fs.exists("logo.png"));
        assert!(!fixture.fs.exists("icon.png"));
        assert_eq!(fixture.recorder.count("remove-fail"), 0);
    }
}
