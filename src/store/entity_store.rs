//! Generic reactive entity store.
//!
//! One [`EntityStore`] per entity type holds the in-memory collection as an immutable
//! `Arc<Vec<E>>` snapshot inside a `tokio::sync::watch` channel. Every mutation clones
//! the current snapshot, applies a fallible closure, re-sorts, and publishes a new
//! `Arc` - subscribers never observe a half-applied state, and same-task mutations
//! coalesce into whatever snapshot is current when a receiver next polls.
//!
//! Persistence is best-effort: after a snapshot is published it is mirrored as a JSON
//! array under the entity's fixed key. A write failure is logged and flips the shared
//! degraded flag, but in-memory state remains authoritative for the rest of the
//! process lifetime.

use std::sync::{
    Arc, Mutex, PoisonError,
    atomic::{AtomicBool, Ordering},
};

use sea_orm::DatabaseConnection;
use serde::{Serialize, de::DeserializeOwned};
use tokio::sync::{OnceCell, watch};
use tracing::warn;
use uuid::Uuid;

use crate::{
    errors::{Error, Result},
    store::kv,
};

/// An immutable view of a store's full collection.
pub type Snapshot<E> = Arc<Vec<E>>;

/// Behavior an entity type must provide to live in an [`EntityStore`].
pub trait StoreEntity:
    Clone + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Fixed namespaced durable-storage key for this collection.
    const STORAGE_KEY: &'static str;

    /// The entity's opaque identifier.
    fn id(&self) -> &str;

    /// Replaces the entity's identifier; called by the store when adding an entity
    /// whose id is empty.
    fn assign_id(&mut self, id: String);

    /// The error to return when a lookup for `id` finds nothing.
    fn not_found(id: &str) -> Error;

    /// Restores the collection's canonical ordering after a mutation. The default
    /// keeps insertion order, for entities with no inherent sort.
    fn sort(_items: &mut [Self]) {}
}

struct Inner<E> {
    db: DatabaseConnection,
    state: watch::Sender<Snapshot<E>>,
    hydrated: OnceCell<()>,
    write_guard: Mutex<()>,
    degraded: Arc<AtomicBool>,
}

/// A reactive, persistent container for one entity collection.
///
/// Cheap to clone; all clones share the same underlying state and subscribers, so
/// every handle observes the same sequence of snapshots regardless of which handle
/// performed a mutation.
pub struct EntityStore<E: StoreEntity> {
    inner: Arc<Inner<E>>,
}

impl<E: StoreEntity> Clone for EntityStore<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<E: StoreEntity> EntityStore<E> {
    /// Creates an empty, not-yet-hydrated store over `db`.
    pub(crate) fn new(db: DatabaseConnection, degraded: Arc<AtomicBool>) -> Self {
        let (state, _) = watch::channel(Arc::new(Vec::new()));
        Self {
            inner: Arc::new(Inner {
                db,
                state,
                hydrated: OnceCell::new(),
                write_guard: Mutex::new(()),
                degraded,
            }),
        }
    }

    /// Hydrates the in-memory collection from durable storage.
    ///
    /// Runs exactly once per store; later calls are no-ops. A missing key yields an
    /// empty collection. An unreadable payload or a failing read is logged and also
    /// yields an empty collection - hydration never fails the caller.
    pub async fn load(&self) {
        self.inner
            .hydrated
            .get_or_init(|| async {
                let initial = match kv::read_value(&self.inner.db, E::STORAGE_KEY).await {
                    Ok(Some(raw)) => match serde_json::from_str::<Vec<E>>(&raw) {
                        Ok(mut items) => {
                            E::sort(&mut items);
                            items
                        }
                        Err(e) => {
                            warn!(
                                key = E::STORAGE_KEY,
                                error = %e,
                                "stored snapshot is unreadable, starting empty"
                            );
                            Vec::new()
                        }
                    },
                    Ok(None) => Vec::new(),
                    Err(e) => {
                        warn!(
                            key = E::STORAGE_KEY,
                            error = %e,
                            "failed to read stored snapshot, starting empty"
                        );
                        Vec::new()
                    }
                };
                self.inner.state.send_replace(Arc::new(initial));
            })
            .await;
    }

    /// The current collection snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot<E> {
        self.inner.state.borrow().clone()
    }

    /// Registers an observer. The receiver yields the snapshot current at each poll;
    /// dropping it unsubscribes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Snapshot<E>> {
        self.inner.state.subscribe()
    }

    /// Applies a fallible mutation to a copy of the collection and publishes the
    /// result. `Err` from the closure leaves the published state untouched.
    pub(crate) fn apply<R>(&self, f: impl FnOnce(&mut Vec<E>) -> Result<R>) -> Result<R> {
        let _guard = self
            .inner
            .write_guard
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let current = self.inner.state.borrow().clone();
        let mut next = current.as_ref().clone();
        let value = f(&mut next)?;
        E::sort(&mut next);
        self.inner.state.send_replace(Arc::new(next));
        Ok(value)
    }

    /// [`Self::apply`] followed by a best-effort persistence of the new snapshot.
    pub(crate) async fn commit<R>(&self, f: impl FnOnce(&mut Vec<E>) -> Result<R>) -> Result<R> {
        let value = self.apply(f)?;
        self.persist().await;
        Ok(value)
    }

    /// Mirrors the current snapshot to durable storage, logging instead of failing.
    async fn persist(&self) {
        let snapshot = self.snapshot();
        let payload = match serde_json::to_string(snapshot.as_ref()) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(key = E::STORAGE_KEY, error = %e, "failed to serialize snapshot");
                self.mark_degraded();
                return;
            }
        };

        if let Err(e) = kv::write_value(&self.inner.db, E::STORAGE_KEY, payload).await {
            warn!(
                key = E::STORAGE_KEY,
                error = %e,
                "failed to persist snapshot, in-memory state remains authoritative"
            );
            self.mark_degraded();
        }
    }

    fn mark_degraded(&self) {
        self.inner.degraded.store(true, Ordering::Relaxed);
    }

    /// Adds an entity, assigning a fresh UUID when its id is empty. Returns the
    /// entity as stored.
    pub async fn add(&self, mut entity: E) -> Result<E> {
        if entity.id().is_empty() {
            entity.assign_id(Uuid::new_v4().to_string());
        }
        let stored = entity.clone();
        self.commit(move |items| {
            items.push(entity);
            Ok(())
        })
        .await?;
        Ok(stored)
    }

    /// Applies a fallible patch to the entity with `id` and returns the updated
    /// entity. An unknown id yields the entity's not-found error; an `Err` from the
    /// patch leaves the collection untouched.
    pub async fn edit(&self, id: &str, patch: impl FnOnce(&mut E) -> Result<()>) -> Result<E> {
        let id = id.to_string();
        self.commit(move |items| match items.iter_mut().find(|e| e.id() == id) {
            Some(entity) => {
                patch(entity)?;
                Ok(entity.clone())
            }
            None => Err(E::not_found(&id)),
        })
        .await
    }

    /// Removes the entity with `id`. An absent id is a no-op returning `false`.
    pub async fn remove(&self, id: &str) -> bool {
        if !self.snapshot().iter().any(|e| e.id() == id) {
            return false;
        }
        let id = id.to_string();
        self.commit(move |items| {
            items.retain(|e| e.id() != id);
            Ok(())
        })
        .await
        .is_ok()
    }

    /// Empties the collection and deletes its durable-storage key entirely. Used by
    /// full application reset; distinct from persisting an empty array.
    pub async fn clear(&self) {
        let _ = self.apply(|items| {
            items.clear();
            Ok(())
        });

        if let Err(e) = kv::remove_value(&self.inner.db, E::STORAGE_KEY).await {
            warn!(key = E::STORAGE_KEY, error = %e, "failed to delete storage key");
            self.mark_degraded();
        }
    }

    /// Wholesale-replaces the collection, in memory and in durable storage.
    pub async fn replace_all(&self, items: Vec<E>) -> Result<()> {
        self.commit(move |current| {
            *current = items;
            Ok(())
        })
        .await
    }
}
