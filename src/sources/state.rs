//! # Desired state.
//!
//! A [`Snapshot`] lists every known [`Source`] and whether watching is enabled at all.
//! The manager reads it through [`StateReader::snapshot`]; [`StateStore`] is the
//! shared, lock-protected implementation that the rest of an application mutates.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

/// Unique, cheaply cloned source identity.
pub type SourceName = Arc<str>;

/// Kind of backend a source belongs to.
///
/// Only one backend is reconciled by a given manager (see [`Config::backend`](crate::Config)).
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backend {
    /// A docker-compose service.
    Compose,
    /// A container orchestrated elsewhere; its logs come from another watcher.
    Kubernetes,
}

/// Opaque value handed to the log-source client to open a stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator(PathBuf);

impl Locator {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    /// Path of the compose config file.
    pub fn as_path(&self) -> &Path {
        &self.0
    }
}

/// One named source that may be streamed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    pub name: SourceName,
    pub backend: Backend,
    pub locator: Locator,
}

impl Source {
    pub fn new(name: impl Into<SourceName>, backend: Backend, locator: Locator) -> Self {
        Self {
            name: name.into(),
            backend,
            locator,
        }
    }

    /// Shorthand for a compose service defined in `config_path`.
    pub fn compose(name: impl Into<SourceName>, config_path: impl Into<PathBuf>) -> Self {
        Self::new(name, Backend::Compose, Locator::new(config_path))
    }
}

/// Point-in-time view of the desired state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    /// Global enable flag. While `false` reconciliation does nothing.
    pub watching_enabled: bool,
    /// All known sources keyed by name.
    pub sources: BTreeMap<SourceName, Source>,
}

impl Snapshot {
    /// Creates an enabled snapshot from a list of sources.
    pub fn enabled(sources: impl IntoIterator<Item = Source>) -> Self {
        Self {
            watching_enabled: true,
            sources: sources.into_iter().map(|s| (s.name.clone(), s)).collect(),
        }
    }

    /// Sources of the given backend, in name order.
    pub fn desired<'a>(&'a self, backend: &'a Backend) -> impl Iterator<Item = &'a Source> + 'a {
        self.sources.values().filter(move |s| &s.backend == backend)
    }
}

/// Provider of the desired state.
///
/// Implementations must hold any lock only for the duration of the read.
#[async_trait]
pub trait StateReader: Send + Sync + 'static {
    /// Returns the current snapshot.
    async fn snapshot(&self) -> Snapshot;
}

/// Shared desired-state store guarded by a read/write lock.
#[derive(Debug, Default)]
pub struct StateStore {
    state: RwLock<Snapshot>,
}

impl StateStore {
    /// Creates a store from an initial snapshot.
    pub fn new(initial: Snapshot) -> Arc<Self> {
        Arc::new(Self {
            state: RwLock::new(initial),
        })
    }

    /// Toggles the global watching flag.
    pub async fn set_watching(&self, enabled: bool) {
        self.state.write().await.watching_enabled = enabled;
    }

    /// Inserts or replaces a source.
    pub async fn upsert(&self, source: Source) {
        let mut state = self.state.write().await;
        state.sources.insert(source.name.clone(), source);
    }

    /// Removes a source by name. Returns `true` if it was present.
    pub async fn remove(&self, name: &str) -> bool {
        self.state.write().await.sources.remove(name).is_some()
    }
}

#[async_trait]
impl StateReader for StateStore {
    async fn snapshot(&self) -> Snapshot {
        self.state.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_desired_filters_backend() {
        let snap = Snapshot::enabled([
            Source::compose("web", "compose.yml"),
            Source::new("api", Backend::Kubernetes, Locator::new("k8s.yaml")),
            Source::compose("db", "compose.yml"),
        ]);
        let names: Vec<&str> = snap.desired(&Backend::Compose).map(|s| &*s.name).collect();
        assert_eq!(names, vec!["db", "web"]);
    }

    #[tokio::test]
    async fn test_store_mutations_visible_in_snapshot() {
        let store = StateStore::new(Snapshot::default());
        store.set_watching(true).await;
        store.upsert(Source::compose("web", "compose.yml")).await;

        let snap = store.snapshot().await;
        assert!(snap.watching_enabled);
        assert!(snap.sources.contains_key("web"));

        assert!(store.remove("web").await);
        assert!(!store.remove("web").await);
        assert!(store.snapshot().await.sources.is_empty());
    }
}
