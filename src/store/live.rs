/// Realtime snapshot subscriptions
///
/// A `LiveQuery` holds the latest snapshot of a query and is refreshed by a
/// background task every time the change feed reports a write to the watched
/// collection. The task lives exactly as long as the handle: dropping the
/// `LiveQuery` (or calling `unsubscribe`) aborts it.

use crate::store::{
    changes::ChangeFeed,
    projects::ProjectStore,
    profile::ProfileStore,
    types::{Profile, Project, PROJECTS_COLLECTION, PROFILE_KEY, SETTINGS_COLLECTION},
};
use anyhow::Result;
use arc_swap::ArcSwapOption;
use std::{future::Future, sync::Arc};
use tokio::{
    sync::{broadcast::error::RecvError, watch},
    task::JoinHandle,
};

/// Owned realtime subscription handle
#[derive(Debug)]
pub struct LiveQuery<T> {
    rx: watch::Receiver<T>,
    error: Arc<ArcSwapOption<String>>,
    task: JoinHandle<()>,
}

impl<T: Clone> LiveQuery<T> {
    /// Latest snapshot
    pub fn current(&self) -> T {
        self.rx.borrow().clone()
    }

    /// Wait for the next snapshot
    ///
    /// Returns `None` once the refresh task has stopped.
    pub async fn changed(&mut self) -> Option<T> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }

    /// Message of the last failed refresh, cleared by the next successful one
    pub fn error(&self) -> Option<String> {
        self.error.load_full().map(|e| (*e).clone())
    }

    /// Stop listening for changes
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl<T> Drop for LiveQuery<T> {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Subscribe to the full project list, newest first
///
/// Pushes the ordered set on every change to the project collection.
pub async fn watch_projects(store: &ProjectStore) -> LiveQuery<Vec<Project>> {
    let loader_store = store.clone();
    spawn_live(
        store.changes(),
        PROJECTS_COLLECTION,
        None,
        Vec::new(),
        move || {
            let store = loader_store.clone();
            async move { store.list_projects().await.map(Some) }
        },
    )
    .await
}

/// Subscribe to the profile document
///
/// Starts from the default profile and switches to the stored document
/// whenever it exists.
pub async fn watch_profile(store: &ProfileStore) -> LiveQuery<Profile> {
    let loader_store = store.clone();
    spawn_live(
        store.changes(),
        SETTINGS_COLLECTION,
        Some(PROFILE_KEY),
        Profile::default(),
        move || {
            let store = loader_store.clone();
            async move { store.get_profile().await }
        },
    )
    .await
}

/// Shared subscription machinery
///
/// `load` returns `Ok(None)` when there is nothing to publish, leaving the
/// current snapshot in place.
async fn spawn_live<T, F, Fut>(
    feed: &ChangeFeed,
    collection: &'static str,
    key: Option<&'static str>,
    initial: T,
    load: F,
) -> LiveQuery<T>
where
    T: Clone + Send + Sync + 'static,
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Option<T>>> + Send,
{
    // Subscribe before the first read so no write slips between the two
    let mut changes = feed.subscribe();
    let error = Arc::new(ArcSwapOption::empty());

    let (tx, mut rx) = watch::channel(initial);
    refresh(&tx, &error, collection, &load).await;
    // The first snapshot is read through `current()`, not reported by `changed()`
    rx.borrow_and_update();

    let task_error = Arc::clone(&error);
    let task = tokio::spawn(async move {
        loop {
            match changes.recv().await {
                Ok(change) => {
                    if change.collection != collection {
                        continue;
                    }
                    if key.is_some_and(|k| k != change.key) {
                        continue;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("⚠️ Live query on '{}' lagged by {} changes, reloading", collection, skipped);
                }
                Err(RecvError::Closed) => break,
            }
            refresh(&tx, &task_error, collection, &load).await;
        }
        tracing::debug!("🔌 Live query on '{}' stopped", collection);
    });

    LiveQuery { rx, error, task }
}

async fn refresh<T, F, Fut>(
    tx: &watch::Sender<T>,
    error: &ArcSwapOption<String>,
    collection: &str,
    load: &F,
) where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<Option<T>>>,
{
    match load().await {
        Ok(Some(snapshot)) => {
            tx.send_replace(snapshot);
            error.store(None);
        }
        Ok(None) => {
            error.store(None);
        }
        Err(e) => {
            tracing::error!("❌ Live query on '{}' failed to refresh: {}", collection, e);
            error.store(Some(Arc::new(e.to_string())));
        }
    }
}
