//! Live-reload dispatch.
//!
//! Every file change evicts its cache entry immediately. Reload broadcasts
//! are rate limited: the first change after a quiet period is dispatched at
//! once, later changes inside the window collapse into a single trailing
//! dispatch carrying the most recent file.

use crate::dev::state::SharedState;
use crate::dev::watcher::FileChange;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::debug;

/// What to do with a change reported to the [`ReloadDebouncer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DebounceAction {
    /// Broadcast now
    Dispatch(String),
    /// A trailing dispatch is now due at this instant
    Schedule(Instant),
    /// Folded into the already scheduled dispatch
    Coalesced,
}

/// Leading-edge plus trailing-edge debouncer. Time is passed in so the
/// decisions are deterministic.
#[derive(Debug)]
pub struct ReloadDebouncer {
    window: Duration,
    last_dispatch: Option<Instant>,
    pending: Option<(String, Instant)>,
}

impl ReloadDebouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_dispatch: None,
            pending: None,
        }
    }

    /// Record a change to `file` observed at `now`.
    pub fn on_change(&mut self, now: Instant, file: String) -> DebounceAction {
        if let Some((pending, _)) = self.pending.as_mut() {
            *pending = file;
            return DebounceAction::Coalesced;
        }

        match self.last_dispatch {
            Some(last) if now.duration_since(last) < self.window => {
                let deadline = last + self.window;
                self.pending = Some((file, deadline));
                DebounceAction::Schedule(deadline)
            }
            _ => {
                self.last_dispatch = Some(now);
                DebounceAction::Dispatch(file)
            }
        }
    }

    /// Take the pending file if its deadline has passed.
    pub fn on_deadline(&mut self, now: Instant) -> Option<String> {
        match &self.pending {
            Some((_, deadline)) if *deadline <= now => {
                let (file, _) = self.pending.take()?;
                self.last_dispatch = Some(now);
                Some(file)
            }
            _ => None,
        }
    }

    /// When the pending dispatch is due, if there is one.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, deadline)| *deadline)
    }
}

/// Consume file changes until the watcher goes away.
///
/// Each change is applied to `state` right away; reloads are broadcast
/// through a [`ReloadDebouncer`] with the given window.
pub async fn run_reload_loop(
    state: SharedState,
    mut changes: mpsc::Receiver<FileChange>,
    window: Duration,
) {
    let mut debouncer = ReloadDebouncer::new(window);

    loop {
        let deadline = debouncer.deadline();
        tokio::select! {
            change = changes.recv() => {
                let Some(change) = change else { break };
                let file = state.apply_change(&change).await;
                match debouncer.on_change(Instant::now(), file) {
                    DebounceAction::Dispatch(file) => {
                        state.dispatch_reload(&file);
                    }
                    DebounceAction::Schedule(at) => debug!(?at, "reload scheduled"),
                    DebounceAction::Coalesced => debug!("reload coalesced"),
                }
            }
            _ = sleep_until(deadline) => {
                if let Some(file) = debouncer.on_deadline(Instant::now()) {
                    state.dispatch_reload(&file);
                }
            }
        }
    }

    debug!("file watcher closed, reload loop stopped");
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
