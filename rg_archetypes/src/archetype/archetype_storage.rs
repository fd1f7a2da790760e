use std::{
    ops::{Index, IndexMut},
    slice::{Iter, IterMut},
};

use fxhash::FxHashMap;
use log::debug;

use crate::{
    archetype::{Archetype, ArchetypeId},
    component::ComponentRegistry,
    error::StorageError,
    signature::Signature,
};

///
/// ArchetypeStorage
///
/// Owns every archetype. Archetypes are never dropped before the storage itself,
/// so [`ArchetypeId`] stays valid for the storage's lifetime.
///
pub struct ArchetypeStorage {
    archetypes: Vec<Archetype>,
    index: FxHashMap<Signature, ArchetypeId>,
}

impl ArchetypeStorage {
    pub(crate) fn new(capacity: usize) -> Self {
        ArchetypeStorage {
            archetypes: Vec::with_capacity(capacity),
            index: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
        }
    }

    ///
    /// Returns archetype with passed signature, creating an empty one if there is none yet.
    /// Every component of the signature must be registered.
    ///
    pub(crate) fn get_or_create(
        &mut self,
        signature: &Signature,
        components: &ComponentRegistry,
    ) -> Result<ArchetypeId, StorageError> {
        if let Some(id) = self.index.get(signature) {
            return Ok(*id);
        }
        let descriptors = signature
            .iter()
            .map(|id| {
                components
                    .get(*id)
                    .copied()
                    .ok_or(StorageError::UnknownComponent(*id))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let id = ArchetypeId::new(self.archetypes.len());
        let archetype = Archetype::new(id, signature.clone(), descriptors.into_iter());
        debug!("Created {archetype}");
        self.archetypes.push(archetype);
        self.index.insert(signature.clone(), id);
        Ok(id)
    }

    /// Looks up archetype by signature
    pub fn find(&self, signature: &Signature) -> Option<ArchetypeId> {
        self.index.get(signature).copied()
    }

    #[inline]
    pub fn get(&self, id: ArchetypeId) -> Option<&Archetype> {
        self.archetypes.get(id.index())
    }

    /// Borrows two distinct archetypes at once
    pub(crate) fn pair_mut(
        &mut self,
        a: ArchetypeId,
        b: ArchetypeId,
    ) -> (&mut Archetype, &mut Archetype) {
        let (a, b) = (a.index(), b.index());
        assert_ne!(a, b, "same archetype borrowed twice");
        if a < b {
            let (head, tail) = self.archetypes.split_at_mut(b);
            (&mut head[a], &mut tail[0])
        } else {
            let (head, tail) = self.archetypes.split_at_mut(a);
            (&mut tail[0], &mut head[b])
        }
    }

    /// Archetypes whose signature contains every component of `required`
    pub fn matching<'a>(&'a self, required: &'a Signature) -> Matching<'a> {
        Matching {
            iter: self.archetypes.iter(),
            required,
        }
    }

    pub(crate) fn matching_mut<'a>(
        &'a mut self,
        required: &'a Signature,
    ) -> impl Iterator<Item = &'a mut Archetype> + 'a {
        self.archetypes
            .iter_mut()
            .filter(move |a| a.signature().is_superset_of(required))
    }

    pub fn iter(&self) -> Iter<'_, Archetype> {
        self.archetypes.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> IterMut<'_, Archetype> {
        self.archetypes.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.archetypes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.archetypes.is_empty()
    }

    /// Number of rows across all archetypes
    pub fn row_count(&self) -> usize {
        self.archetypes.iter().map(Archetype::len).sum()
    }

    /// Destroys all rows, archetypes themselves are kept
    pub(crate) fn clear(&mut self) {
        for archetype in self.archetypes.iter_mut() {
            archetype.clear();
        }
    }
}

impl Index<ArchetypeId> for ArchetypeStorage {
    type Output = Archetype;

    fn index(&self, id: ArchetypeId) -> &Self::Output {
        &self.archetypes[id.index()]
    }
}

impl IndexMut<ArchetypeId> for ArchetypeStorage {
    fn index_mut(&mut self, id: ArchetypeId) -> &mut Self::Output {
        &mut self.archetypes[id.index()]
    }
}

///
/// Lazy sequence of archetypes matching required signature. Clone to restart.
///
#[derive(Clone)]
pub struct Matching<'a> {
    iter: Iter<'a, Archetype>,
    required: &'a Signature,
}

impl<'a> Iterator for Matching<'a> {
    type Item = &'a Archetype;

    fn next(&mut self) -> Option<Self::Item> {
        let required = self.required;
        self.iter.find(|a| a.signature().is_superset_of(required))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, self.iter.size_hint().1)
    }
}

#[cfg(test)]
mod test {
    use crate::{
        component::{ComponentId, ComponentRegistry},
        error::StorageError,
        signature,
    };

    use super::ArchetypeStorage;

    #[derive(Default)]
    struct Position(#[allow(dead_code)] f32, #[allow(dead_code)] f32);
    #[derive(Default)]
    struct Velocity(#[allow(dead_code)] f32, #[allow(dead_code)] f32);
    #[derive(Default)]
    struct Health(#[allow(dead_code)] i32);

    fn registry() -> ComponentRegistry {
        let mut registry = ComponentRegistry::new();
        registry.register::<Position>();
        registry.register::<Velocity>();
        registry
    }

    #[test]
    fn get_or_create_deduplicates() {
        let registry = registry();
        let mut storage = ArchetypeStorage::new(4);
        let a = storage
            .get_or_create(&signature![Position, Velocity], &registry)
            .unwrap();
        let b = storage
            .get_or_create(&signature![Velocity, Position], &registry)
            .unwrap();
        let c = storage
            .get_or_create(&signature![Position], &registry)
            .unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(2, storage.len());
        assert_eq!(Some(a), storage.find(&signature![Position, Velocity]));
        assert_eq!(0, storage[a].len());
        assert_eq!(Some(0), storage[a].capacity(ComponentId::of::<Position>()));
    }

    #[test]
    fn unregistered_component() {
        let registry = registry();
        let mut storage = ArchetypeStorage::new(4);
        assert_eq!(
            Err(StorageError::UnknownComponent(ComponentId::of::<Health>())),
            storage.get_or_create(&signature![Position, Health], &registry)
        );
        assert!(storage.is_empty());
    }

    #[test]
    fn matching_is_restartable() {
        let registry = registry();
        let mut storage = ArchetypeStorage::new(4);
        let p = storage
            .get_or_create(&signature![Position], &registry)
            .unwrap();
        let pv = storage
            .get_or_create(&signature![Position, Velocity], &registry)
            .unwrap();
        let v = storage
            .get_or_create(&signature![Velocity], &registry)
            .unwrap();

        let required = signature![Position];
        let matching = storage.matching(&required);
        let first: Vec<_> = matching.clone().map(|a| a.id()).collect();
        let second: Vec<_> = matching.map(|a| a.id()).collect();
        assert_eq!(vec![p, pv], first);
        assert_eq!(first, second);

        let required = signature![Velocity];
        let ids: Vec<_> = storage.matching(&required).map(|a| a.id()).collect();
        assert_eq!(vec![pv, v], ids);

        let all = signature![];
        assert_eq!(3, storage.matching(&all).count());
    }

    #[test]
    fn pair_mut() {
        let registry = registry();
        let mut storage = ArchetypeStorage::new(4);
        let p = storage
            .get_or_create(&signature![Position], &registry)
            .unwrap();
        let v = storage
            .get_or_create(&signature![Velocity], &registry)
            .unwrap();
        let (a, b) = storage.pair_mut(v, p);
        assert_eq!(v, a.id());
        assert_eq!(p, b.id());
    }
}
