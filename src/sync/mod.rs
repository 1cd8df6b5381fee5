//! Two-way reconciliation between the local todo store and the remote task
//! service.
//!
//! Todos are paired by their stored remote id. For pairs where both sides
//! are open, the field set recorded at the last successful sync acts as the
//! merge base: the side that moved away from it wins. Per-item failures are
//! collected into the report and never abort the run.

mod guard;
mod remote;
mod report;

pub use guard::{SyncGuard, SyncPermit};
pub use remote::{RemoteTask, RemoteTasks};
pub use report::{SyncReport, SyncStatus};

use crate::store::TodoStore;
use crate::todo::{attachment, Todo, TodoFields};
use crate::todoist::TodoistError;
use log::*;
use std::collections::{HashMap, HashSet};

/// Errors that abort a sync run before any item is touched.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// No remote credentials
    #[error("Todoist API token is not configured")]
    NotConfigured,

    /// Projects or tasks could not be loaded
    #[error("Could not load remote tasks: {0}")]
    Remote(TodoistError),
}

impl From<TodoistError> for SyncError {
    fn from(err: TodoistError) -> Self {
        match err {
            TodoistError::NotConfigured => SyncError::NotConfigured,
            err => SyncError::Remote(err),
        }
    }
}

/// Which side of a linked pair is authoritative.
///
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    InSync,
    PullRemote,
    PushLocal,
}

/// Decide a linked pair. Equal sides are in sync; otherwise a remote that
/// moved away from the base wins, and local wins in every other case
/// including a missing base.
///
pub fn decide(base: Option<&TodoFields>, local: &TodoFields, remote: &TodoFields) -> Direction {
    if local == remote {
        return Direction::InSync;
    }
    match base {
        Some(base) if remote != base => Direction::PullRemote,
        _ => Direction::PushLocal,
    }
}

/// Run one reconciliation pass over `store` against `remote`.
///
pub async fn reconcile<R>(store: &mut TodoStore, remote: &mut R) -> Result<SyncReport, SyncError>
where
    R: RemoteTasks + ?Sized,
{
    info!("Starting sync...");
    remote.prepare().await?;
    let remote_tasks = remote.active_tasks().await?;
    let remote_by_id: HashMap<&str, &RemoteTask> =
        remote_tasks.iter().map(|t| (t.id.as_str(), t)).collect();

    // Decisions are made against the list as it was before this pass.
    let snapshot: Vec<Todo> = store.list().to_vec();
    let mut report = SyncReport::default();
    let mut linked: HashSet<&str> = HashSet::new();

    for local in &snapshot {
        if let Some(tid) = local.todoist_id.as_deref() {
            linked.insert(tid);
            let counterpart = remote_by_id.get(tid).copied();
            sync_linked(store, remote, local, tid, counterpart, &mut report).await;
        }
    }

    for task in remote_tasks.iter().filter(|t| !linked.contains(t.id.as_str())) {
        let fields = match task.fields.validated() {
            Ok(fields) => fields,
            Err(e) => {
                report
                    .errors
                    .push(format!("Pull remote task {}: {}", task.id, e));
                continue;
            }
        };
        match store.add_linked(fields, task.id.clone()) {
            Ok(todo) => {
                debug!("Pulled remote task {} as todo {}", task.id, todo.id);
                report.pulled += 1;
            }
            Err(e) => report.errors.push(format!("Pull remote task {}: {}", task.id, e)),
        }
    }

    for local in snapshot
        .iter()
        .filter(|t| t.todoist_id.is_none() && !t.done)
    {
        let fields = local.fields();
        match remote
            .create_task(&fields, local.attachment.as_deref())
            .await
        {
            Ok(tid) => match store.link(local.id, tid, fields) {
                Ok(_) => report.pushed += 1,
                Err(e) => report.errors.push(format!("Link todo #{}: {}", local.id, e)),
            },
            Err(e) => report.errors.push(item_error("Push todo", local.id, None, &e)),
        }
    }

    report.success = report.errors.is_empty();
    if report.success {
        info!("Sync finished: {}", report.summary());
    } else {
        warn!(
            "Sync finished with {} errors: {}",
            report.errors.len(),
            report.summary()
        );
    }
    Ok(report)
}

async fn sync_linked<R>(
    store: &mut TodoStore,
    remote: &mut R,
    local: &Todo,
    tid: &str,
    counterpart: Option<&RemoteTask>,
    report: &mut SyncReport,
) where
    R: RemoteTasks + ?Sized,
{
    match (local.done, counterpart) {
        (true, Some(_)) => match remote.close_task(tid).await {
            Ok(()) => match store.unlink(local.id) {
                Ok(_) => report.completed += 1,
                Err(e) => report.errors.push(format!("Unlink todo #{}: {}", local.id, e)),
            },
            Err(e) => report
                .errors
                .push(item_error("Close remote task", local.id, Some(tid), &e)),
        },
        (true, None) => {
            if let Err(e) = store.unlink(local.id) {
                report.errors.push(format!("Unlink todo #{}: {}", local.id, e));
            }
        }
        (false, None) => match store.complete_and_unlink(local.id) {
            Ok(_) => {
                debug!("Remote task {} is gone, completing todo {}", tid, local.id);
                report.updated += 1;
            }
            Err(e) => report
                .errors
                .push(format!("Complete todo #{}: {}", local.id, e)),
        },
        (false, Some(task)) => merge(store, remote, local, task, report).await,
    }
}

async fn merge<R>(
    store: &mut TodoStore,
    remote: &mut R,
    local: &Todo,
    task: &RemoteTask,
    report: &mut SyncReport,
) where
    R: RemoteTasks + ?Sized,
{
    let fields = local.fields();
    let local_note = local.attachment.as_deref().map(attachment::display_name);
    let note_stale = task.note.as_deref() != local_note;
    match decide(local.sync_base.as_ref(), &fields, &task.fields) {
        Direction::InSync if !note_stale => {
            if local.sync_base.as_ref() != Some(&fields) {
                if let Err(e) = store.set_base(local.id, fields) {
                    report.errors.push(format!("Update todo #{}: {}", local.id, e));
                }
            }
        }
        Direction::PullRemote => match store.apply_remote(local.id, task.fields.clone()) {
            Ok(_) => report.updated += 1,
            Err(e) => report.errors.push(format!("Update todo #{}: {}", local.id, e)),
        },
        Direction::InSync | Direction::PushLocal => {
            match remote
                .update_task(&task.id, &fields, local.attachment.as_deref())
                .await
            {
                // Base on what the remote holds; an ignored change stays local.
                Ok(held) => match store.set_base(local.id, held) {
                    Ok(_) => report.updated += 1,
                    Err(e) => report.errors.push(format!("Update todo #{}: {}", local.id, e)),
                },
                Err(e) => report
                    .errors
                    .push(item_error("Update todo", local.id, Some(&task.id), &e)),
            }
        }
    }
}

fn item_error(action: &str, id: u64, tid: Option<&str>, err: &TodoistError) -> String {
    match (err, tid) {
        (TodoistError::NotFound, Some(tid)) => format!("task {} not found remotely", tid),
        _ => format!("{} #{}: {}", action, id, err),
    }
}
