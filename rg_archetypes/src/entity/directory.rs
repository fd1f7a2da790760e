use fxhash::FxHashMap;

use crate::entity::{EntityId, Record};

///
/// Maps entities to their records. Ids come from a monotonic counter and are never reused.
///
pub(crate) struct EntityDirectory {
    entity_seq: u64,
    records: FxHashMap<EntityId, Record>,
}

impl EntityDirectory {
    pub(crate) fn new(capacity: usize) -> Self {
        EntityDirectory {
            entity_seq: 0,
            records: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
        }
    }

    /// Allocates new id with empty record
    pub(crate) fn create(&mut self) -> EntityId {
        self.entity_seq += 1;
        let id = EntityId::new(self.entity_seq);
        self.records.insert(id, Record::default());
        id
    }

    #[inline]
    pub(crate) fn get(&self, entity: EntityId) -> Option<Record> {
        self.records.get(&entity).copied()
    }

    #[inline]
    pub(crate) fn contains(&self, entity: EntityId) -> bool {
        self.records.contains_key(&entity)
    }

    #[inline]
    pub(crate) fn set(&mut self, entity: EntityId, record: Record) {
        self.records.insert(entity, record);
    }

    pub(crate) fn remove(&mut self, entity: EntityId) -> Option<Record> {
        self.records.remove(&entity)
    }

    /// Decrements row of every passed entity after a row removal
    pub(crate) fn shift_down(&mut self, shifted: &[EntityId]) {
        for entity in shifted {
            if let Some(record) = self.records.get_mut(entity) {
                *record = record.shifted_down();
            }
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.records.len()
    }

    /// Forgets all records, id sequence keeps going
    pub(crate) fn clear(&mut self) {
        self.records.clear();
    }
}
