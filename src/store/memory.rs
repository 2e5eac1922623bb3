//! In-memory repository backed by a `BTreeMap` keyed by record id.

use std::collections::BTreeMap;
use std::sync::RwLock;

use super::{Record, Repository, StoreError};

pub struct MemoryRepository<T: Record> {
    records: RwLock<BTreeMap<u32, T>>,
}

impl<T: Record> MemoryRepository<T> {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(BTreeMap::new()),
        }
    }

    /// Build a repository pre-filled with `records`, keeping their ids.
    pub fn with_records(records: impl IntoIterator<Item = T>) -> Self {
        let map = records.into_iter().map(|r| (r.id(), r)).collect();
        Self {
            records: RwLock::new(map),
        }
    }
}

impl<T: Record> Default for MemoryRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Record> Repository<T> for MemoryRepository<T> {
    fn list(&self) -> Result<Vec<T>, StoreError> {
        let guard = self.records.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(guard.values().cloned().collect())
    }

    fn get(&self, id: u32) -> Result<Option<T>, StoreError> {
        let guard = self.records.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(guard.get(&id).cloned())
    }

    fn insert(&self, mut record: T) -> Result<T, StoreError> {
        let mut guard = self.records.write().map_err(|_| StoreError::LockPoisoned)?;
        let next_id = guard.keys().next_back().map_or(1, |max| max + 1);
        record.set_id(next_id);
        guard.insert(next_id, record.clone());
        tracing::debug!(entity = T::ENTITY, id = next_id, "Record inserted");
        Ok(record)
    }

    fn modify(
        &self,
        id: u32,
        apply: &mut dyn FnMut(&mut T) -> Result<(), StoreError>,
    ) -> Result<T, StoreError> {
        let mut guard = self.records.write().map_err(|_| StoreError::LockPoisoned)?;
        let stored = guard
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found(T::ENTITY, id))?;

        // Work on a copy so a rejected change leaves the record intact
        let mut draft = stored.clone();
        apply(&mut draft)?;
        draft.set_id(id);
        *stored = draft.clone();
        Ok(draft)
    }

    fn delete(&self, id: u32) -> Result<T, StoreError> {
        let mut guard = self.records.write().map_err(|_| StoreError::LockPoisoned)?;
        let removed = guard
            .remove(&id)
            .ok_or_else(|| StoreError::not_found(T::ENTITY, id))?;
        tracing::debug!(entity = T::ENTITY, id, "Record deleted");
        Ok(removed)
    }

    fn count(&self) -> Result<usize, StoreError> {
        let guard = self.records.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(guard.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[derive(Debug, Clone, PartialEq)]
    struct Bed {
        id: u32,
        label: String,
    }

    impl Record for Bed {
        const ENTITY: &'static str = "bed";

        fn id(&self) -> u32 {
            self.id
        }

        fn set_id(&mut self, id: u32) {
            self.id = id;
        }
    }

    fn bed(label: &str) -> Bed {
        Bed { id: 0, label: label.into() }
    }

    #[test]
    fn first_insert_gets_id_one() {
        let repo = MemoryRepository::new();
        let stored = repo.insert(bed("A1")).unwrap();
        assert_eq!(stored.id, 1);
    }

    #[test]
    fn ids_follow_max_plus_one_after_deletes() {
        let repo = MemoryRepository::new();
        repo.insert(bed("A1")).unwrap();
        repo.insert(bed("A2")).unwrap();
        let third = repo.insert(bed("A3")).unwrap();
        repo.delete(1).unwrap();
        assert_eq!(repo.insert(bed("A4")).unwrap().id, third.id + 1);

        repo.delete(4).unwrap();
        // Deleting the maximum frees its id for reuse
        assert_eq!(repo.insert(bed("A5")).unwrap().id, 4);
    }

    #[test]
    fn seeded_records_keep_their_ids() {
        let repo = MemoryRepository::with_records(vec![
            Bed { id: 7, label: "B7".into() },
            Bed { id: 3, label: "B3".into() },
        ]);
        let ids: Vec<u32> = repo.list().unwrap().iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![3, 7]);
        assert_eq!(repo.insert(bed("B8")).unwrap().id, 8);
    }

    #[test]
    fn insert_ignores_client_supplied_id() {
        let repo = MemoryRepository::new();
        let stored = repo.insert(Bed { id: 99, label: "X".into() }).unwrap();
        assert_eq!(stored.id, 1);
        assert!(repo.get(99).unwrap().is_none());
    }

    #[test]
    fn modify_missing_record_is_not_found() {
        let repo: MemoryRepository<Bed> = MemoryRepository::new();
        let err = repo.modify(5, &mut |_| Ok(())).unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[test]
    fn rejected_modify_leaves_record_untouched() {
        let repo = MemoryRepository::new();
        repo.insert(bed("A1")).unwrap();
        let err = repo
            .modify(1, &mut |b| {
                b.label = "changed".into();
                Err(StoreError::Validation("nope".into()))
            })
            .unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
        assert_eq!(repo.get(1).unwrap().unwrap().label, "A1");
    }

    #[test]
    fn modify_cannot_change_id() {
        let repo = MemoryRepository::new();
        repo.insert(bed("A1")).unwrap();
        let updated = repo
            .modify(1, &mut |b| {
                b.id = 50;
                b.label = "A1-east".into();
                Ok(())
            })
            .unwrap();
        assert_eq!(updated.id, 1);
        assert_eq!(repo.get(1).unwrap().unwrap().label, "A1-east");
    }

    #[test]
    fn concurrent_inserts_never_share_an_id() {
        let repo = Arc::new(MemoryRepository::new());
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let repo = repo.clone();
                std::thread::spawn(move || {
                    for i in 0..25 {
                        repo.insert(bed(&format!("{t}-{i}"))).unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        let ids: Vec<u32> = repo.list().unwrap().iter().map(|b| b.id).collect();
        assert_eq!(ids.len(), 200);
        assert_eq!(ids, (1..=200).collect::<Vec<_>>());
    }

    #[test]
    fn filter_is_a_linear_scan() {
        let repo = MemoryRepository::new();
        repo.insert(bed("A1")).unwrap();
        repo.insert(bed("B1")).unwrap();
        repo.insert(bed("A2")).unwrap();
        let a_beds = repo.filter(&|b| b.label.starts_with('A')).unwrap();
        assert_eq!(a_beds.len(), 2);
        assert_eq!(repo.count().unwrap(), 3);
    }
}
