// ── Generic ordered entity collection ──
//
// Insertion-ordered storage keyed by `EntityId`. Lists come back in the
// order records were seeded or created; updates keep a record's position.

use std::sync::{Arc, RwLock};

use indexmap::IndexMap;

use crate::model::EntityId;

/// An insertion-ordered collection for a single entity type.
///
/// Values are stored behind `Arc` so snapshots are cheap. The lock is only
/// held for the duration of a single map operation and never across an
/// `.await`.
pub(crate) struct EntityCollection<T> {
    by_id: RwLock<IndexMap<EntityId, Arc<T>>>,
}

impl<T> EntityCollection<T> {
    pub(crate) fn new() -> Self {
        Self {
            by_id: RwLock::new(IndexMap::new()),
        }
    }

    /// Insert or replace an entity. Returns `true` if the id was new.
    /// Replacing keeps the original position.
    pub(crate) fn upsert(&self, id: EntityId, entity: T) -> bool {
        let mut map = self.by_id.write().expect("entity collection lock poisoned");
        map.insert(id, Arc::new(entity)).is_none()
    }

    pub(crate) fn get(&self, id: &EntityId) -> Option<Arc<T>> {
        let map = self.by_id.read().expect("entity collection lock poisoned");
        map.get(id).map(Arc::clone)
    }

    /// Read-modify-write under the write lock. `f` runs against a clone; the
    /// stored value is replaced only when `f` succeeds. `None` when the id is
    /// absent.
    pub(crate) fn modify<E>(
        &self,
        id: &EntityId,
        f: impl FnOnce(&mut T) -> Result<(), E>,
    ) -> Option<Result<Arc<T>, E>>
    where
        T: Clone,
    {
        let mut map = self.by_id.write().expect("entity collection lock poisoned");
        let slot = map.get_mut(id)?;
        let mut next = T::clone(slot);
        Some(f(&mut next).map(|()| {
            *slot = Arc::new(next);
            Arc::clone(slot)
        }))
    }

    /// All values in insertion order.
    pub(crate) fn snapshot(&self) -> Vec<Arc<T>> {
        let map = self.by_id.read().expect("entity collection lock poisoned");
        map.values().cloned().collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.by_id.read().expect("entity collection lock poisoned").len()
    }
}

impl<T> FromIterator<(EntityId, T)> for EntityCollection<T> {
    fn from_iter<I: IntoIterator<Item = (EntityId, T)>>(iter: I) -> Self {
        let map = iter
            .into_iter()
            .map(|(id, value)| (id, Arc::new(value)))
            .collect();
        Self {
            by_id: RwLock::new(map),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn upsert_returns_true_for_new_id() {
        let col: EntityCollection<String> = EntityCollection::new();
        assert!(col.upsert(EntityId::from("a"), "hello".into()));
        assert!(!col.upsert(EntityId::from("a"), "world".into()));
        assert_eq!(*col.get(&EntityId::from("a")).unwrap(), "world");
    }

    #[test]
    fn snapshot_preserves_insertion_order() {
        let col: EntityCollection<&str> = ["c", "a", "b"]
            .into_iter()
            .map(|s| (EntityId::from(s), s))
            .collect();
        col.upsert(EntityId::from("a"), "a2");
        let values: Vec<&str> = col.snapshot().iter().map(|v| **v).collect();
        assert_eq!(values, vec!["c", "a2", "b"]);
    }

    #[test]
    fn failed_modify_leaves_value_untouched() {
        let col: EntityCollection<u32> = EntityCollection::new();
        col.upsert(EntityId::from("n"), 1);

        let res = col.modify(&EntityId::from("n"), |v| {
            *v = 99;
            Err("rejected")
        });
        assert_eq!(res.unwrap().unwrap_err(), "rejected");
        assert_eq!(*col.get(&EntityId::from("n")).unwrap(), 1);

        let ok = col.modify(&EntityId::from("n"), |v| {
            *v += 1;
            Ok::<(), ()>(())
        });
        assert_eq!(*ok.unwrap().unwrap(), 2);
    }

    #[test]
    fn modify_missing_is_none() {
        let col: EntityCollection<u32> = EntityCollection::new();
        assert!(col.modify(&EntityId::from("x"), |_| Ok::<(), ()>(())).is_none());
        assert_eq!(col.len(), 0);
    }
}
