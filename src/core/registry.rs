//! # Watch registry and reconciliation diff.
//!
//! The registry is the arena of active watches keyed by source name. It is owned
//! by the [`LogManager`](crate::LogManager) and only mutated from its `&mut self`
//! methods; streaming tasks never touch it.
//!
//! ## Diff
//! ```text
//! diff(ctx, snapshot)
//!   ├─ watching disabled ───────────────► (setup=[], teardown=[])  map untouched
//!   ├─ for source in snapshot.desired(backend):
//!   │     ├─ entry live ──────────────────► skip
//!   │     ├─ entry stopped/cancelled ────► resume_from = entry.stopped_at().await
//!   │     ├─ no entry ───────────────────► resume_from = UNIX_EPOCH
//!   │     └─ insert fresh entry (ctx.child_token()) ─► setup
//!   └─ for name in map, not desired ─────► remove ─► teardown
//! ```
//!
//! ## Rules
//! - At most one entry per name.
//! - A source is set up at most once per call.
//! - An exited watch is replaced in place, never removed and re-added later.

use std::collections::{HashMap, HashSet};
use std::time::UNIX_EPOCH;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::watch::{self, Watch, WatchEntry};
use crate::sources::{Backend, Snapshot, SourceName};

/// A watch removed from the registry whose task must be cancelled.
pub struct Teardown {
    pub name: SourceName,
    pub entry: WatchEntry,
}

/// Output of one reconciliation pass.
#[derive(Default)]
pub struct Diff {
    /// New watches to launch, in source-name order.
    pub setup: Vec<Watch>,
    /// Removed watches to cancel, in source-name order.
    pub teardown: Vec<Teardown>,
}

impl Diff {
    pub fn is_empty(&self) -> bool {
        self.setup.is_empty() && self.teardown.is_empty()
    }
}

/// Arena of active watches.
pub struct Registry {
    backend: Backend,
    watches: HashMap<SourceName, WatchEntry>,
}

impl Registry {
    /// Creates an empty registry reconciling sources of `backend`.
    pub fn new(backend: Backend) -> Self {
        Self {
            backend,
            watches: HashMap::new(),
        }
    }

    /// Compares `snapshot` against the active watches and updates the map.
    ///
    /// New watches get a child token of `ctx`. May wait for a cancelled task to
    /// report its stop time before replacing it.
    pub async fn diff(&mut self, ctx: &CancellationToken, snapshot: &Snapshot) -> Diff {
        let mut diff = Diff::default();

        // Disabling watching leaves running watches alone.
        if !snapshot.watching_enabled {
            return diff;
        }

        for source in snapshot.desired(&self.backend) {
            if let Some(existing) = self.watches.get_mut(&source.name) {
                if existing.is_live() {
                    continue;
                }
            }

            let resume_from = match self.watches.remove(&source.name) {
                Some(previous) => previous.stopped_at().await,
                None => UNIX_EPOCH,
            };

            let (watch, entry) = watch::pair(source, ctx.child_token(), resume_from);
            self.watches.insert(source.name.clone(), entry);
            diff.setup.push(watch);
        }

        let desired: HashSet<&str> = snapshot
            .desired(&self.backend)
            .map(|s| s.name.as_ref())
            .collect();
        let mut stale: Vec<SourceName> = self
            .watches
            .keys()
            .filter(|name| {
                let name: &str = name;
                !desired.contains(name)
            })
            .cloned()
            .collect();
        stale.sort_unstable();

        for name in stale {
            if let Some(entry) = self.watches.remove(&name) {
                diff.teardown.push(Teardown { name, entry });
            }
        }

        diff
    }

    /// Stores the task handle of a freshly launched watch.
    pub fn attach(&mut self, name: &str, join: JoinHandle<()>) {
        if let Some(entry) = self.watches.get_mut(name) {
            entry.attach(join);
        }
    }

    /// Returns sorted list of watched source names.
    pub fn list(&self) -> Vec<String> {
        let mut names: Vec<String> = self.watches.keys().map(|n| n.to_string()).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.watches.len()
    }

    /// Removes every entry.
    pub fn drain(&mut self) -> Vec<(SourceName, WatchEntry)> {
        self.watches.drain().collect()
    }
}
