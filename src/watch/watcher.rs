// src/watch/watcher.rs

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::engine::{RuntimeEvent, TriggerReason};
use crate::fs::FileSystem;
use crate::watch::event_handler::ChangeFilter;
use crate::watch::patterns::TaskWatchProfile;

/// Keeps the underlying `RecommendedWatcher` alive. Dropping the handle
/// stops file watching.
pub struct WatcherHandle {
    _inner: RecommendedWatcher,
}

impl std::fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherHandle").finish()
    }
}

/// Watch `root` recursively and send `RuntimeEvent::TaskTriggered` for every
/// task whose watch globs match a changed file.
///
/// Raw events are coalesced: after the first event, more are collected until
/// none arrives for `settle`; the whole burst then triggers each affected
/// task once.
pub fn spawn_watcher(
    root: impl Into<PathBuf>,
    output_root: impl Into<PathBuf>,
    profiles: Vec<TaskWatchProfile>,
    settle: Duration,
    fs: Arc<dyn FileSystem>,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
) -> Result<WatcherHandle> {
    let root = root.into();
    let root = root.canonicalize().unwrap_or(root);

    let (event_tx, event_rx) = mpsc::unbounded_channel::<Event>();

    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) => {
                // The receiver only goes away on shutdown.
                let _ = event_tx.send(event);
            }
            Err(err) => eprintln!("assetflow: file watch error: {err}"),
        },
        Config::default(),
    )?;
    watcher.watch(&root, RecursiveMode::Recursive)?;
    info!(root = ?root, "file watcher started");

    let mut filter = ChangeFilter::new(&root, output_root, profiles);
    if let Err(err) = filter.prime(fs.as_ref()) {
        warn!(error = %err, "could not prime watch cache; first edits may retrigger");
    }

    tokio::spawn(watch_loop(event_rx, filter, settle, fs, runtime_tx));

    Ok(WatcherHandle { _inner: watcher })
}

async fn watch_loop(
    mut event_rx: mpsc::UnboundedReceiver<Event>,
    mut filter: ChangeFilter,
    settle: Duration,
    fs: Arc<dyn FileSystem>,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
) {
    while let Some(paths) = next_burst(&mut event_rx, settle, |p| filter.is_watched(p)).await {
        debug!(count = paths.len(), "settled change burst");

        let tasks = filter.tasks_for(fs.as_ref(), &paths);
        for task in tasks {
            let event = RuntimeEvent::TaskTriggered {
                task,
                reason: TriggerReason::FileWatch,
            };
            if runtime_tx.send(event).await.is_err() {
                debug!("runtime gone; stopping watch loop");
                return;
            }
        }
    }
    debug!("watcher event loop finished");
}

/// Wait for one watched change, then keep collecting until `settle` passes
/// without another one.
///
/// Only events carrying a path for which `watched` holds count: they start
/// the burst and restart the settle timer. Anything else (output writes,
/// unrelated files, access-only events) is dropped on arrival. Returns the
/// de-duplicated watched paths of the burst, or `None` once the channel is
/// closed.
pub async fn next_burst<F>(
    event_rx: &mut mpsc::UnboundedReceiver<Event>,
    settle: Duration,
    watched: F,
) -> Option<Vec<PathBuf>>
where
    F: Fn(&Path) -> bool,
{
    let mut paths = Vec::new();
    while paths.is_empty() {
        let event = event_rx.recv().await?;
        push_relevant(&mut paths, event, &watched);
    }

    let mut deadline = Instant::now() + settle;
    loop {
        match tokio::time::timeout_at(deadline, event_rx.recv()).await {
            Ok(Some(event)) => {
                if push_relevant(&mut paths, event, &watched) {
                    deadline = Instant::now() + settle;
                }
            }
            Ok(None) | Err(_) => break,
        }
    }
    Some(paths)
}

/// Add the event's watched paths; `true` if it carried any.
fn push_relevant<F>(paths: &mut Vec<PathBuf>, event: Event, watched: &F) -> bool
where
    F: Fn(&Path) -> bool,
{
    if matches!(event.kind, EventKind::Access(_)) {
        return false;
    }
    let mut any = false;
    for path in event.paths {
        if !watched(&path) {
            continue;
        }
        any = true;
        if !paths.contains(&path) {
            paths.push(path);
        }
    }
    any
}
