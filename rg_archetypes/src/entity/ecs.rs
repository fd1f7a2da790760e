use std::{any::type_name, mem::MaybeUninit, ptr::NonNull};

use log::{debug, error, trace};

use crate::{
    archetype::{ArchetypeId, ArchetypeStorage, Matching},
    component::{Component, ComponentDescriptor, ComponentId, ComponentRegistry},
    config::StorageConfig,
    entity::{EntityDirectory, EntityId, Record},
    error::StorageError,
    query::Query,
    signature::Signature,
    system::System,
};

///
/// Entities
///
/// Archetype based entity storage. Entity's components live in the archetype matching its exact
/// component set, and move to another archetype whenever that set changes.
///
pub struct Entities {
    components: ComponentRegistry,
    archetypes: ArchetypeStorage,
    directory: EntityDirectory,
}

impl Default for Entities {
    fn default() -> Self {
        Self::new()
    }
}

impl Entities {
    /// Creates new instance
    pub fn new() -> Self {
        Self::with_config(StorageConfig::default())
    }

    pub fn with_config(config: StorageConfig) -> Self {
        Entities {
            components: ComponentRegistry::new(),
            archetypes: ArchetypeStorage::new(config.archetype_capacity),
            directory: EntityDirectory::new(config.entity_capacity),
        }
    }

    /// Registers component type. Must be called before `T` is attached to any entity.
    #[inline]
    pub fn register<T: Component>(&mut self) -> ComponentId {
        self.components.register::<T>()
    }

    #[inline]
    pub fn describe<T: Component>(&mut self) -> &ComponentDescriptor {
        self.components.describe::<T>()
    }

    #[inline]
    pub fn components(&self) -> &ComponentRegistry {
        &self.components
    }

    /// Creates entity without components
    pub fn create(&mut self) -> EntityId {
        let entity = self.directory.create();
        trace!("Created {entity}");
        entity
    }

    ///
    /// Attaches `value` to entity. Entity is moved to the archetype matching its new component set.
    /// Fails if `T` is not registered, entity is unknown or already has `T`; nothing changes in that case.
    ///
    pub fn attach<T: Component>(&mut self, entity: EntityId, value: T) -> Result<&mut T, StorageError> {
        let (target, column, record) = self.prepare_attach::<T>(entity)?;
        let ptr = self.migrate_in(entity, record, target, column, value);
        Ok(unsafe { &mut *ptr.as_ptr() })
    }

    /// Same as [`Entities::attach`] but the value is built by the component's descriptor
    pub fn attach_default<T: Component>(&mut self, entity: EntityId) -> Result<&mut T, StorageError> {
        let (target, column, record) = self.prepare_attach::<T>(entity)?;
        let comp_id = ComponentId::of::<T>();
        let descriptor = *self
            .components
            .get(comp_id)
            .ok_or(StorageError::UnknownComponent(comp_id))?;
        // Built before anything moves, a panicking `default()` leaves the entity as it was
        let mut slot = MaybeUninit::<T>::uninit();
        let value = unsafe {
            descriptor.construct_default(NonNull::from(&mut slot).cast());
            slot.assume_init()
        };
        let ptr = self.migrate_in(entity, record, target, column, value);
        Ok(unsafe { &mut *ptr.as_ptr() })
    }

    /// Validates attach and resolves target archetype with column index of `T` in it
    fn prepare_attach<T: Component>(
        &mut self,
        entity: EntityId,
    ) -> Result<(ArchetypeId, usize, Record), StorageError> {
        let comp_id = ComponentId::of::<T>();
        if !self.components.contains(comp_id) {
            error!("Attempt to attach unregistered {} to {entity}", type_name::<T>());
            return Err(StorageError::NotRegistered(type_name::<T>()));
        }
        let record = self
            .directory
            .get(entity)
            .ok_or(StorageError::NotFound(entity))?;
        let signature = match record.archetype() {
            Some(current) => {
                let signature = self.archetypes[current].signature();
                if signature.contains(comp_id) {
                    debug!("{entity} already has {}", type_name::<T>());
                    return Err(StorageError::AlreadyPresent(type_name::<T>()));
                }
                signature.with(comp_id)
            }
            None => Signature::from_slice(&[comp_id]),
        };
        let target = self.archetypes.get_or_create(&signature, &self.components)?;
        let column = self.archetypes[target]
            .column_index(comp_id)
            .ok_or(StorageError::UnknownComponent(comp_id))?;
        Ok((target, column, record))
    }

    ///
    /// Moves entity's row into `target` which has exactly one extra column, `column`,
    /// and puts `value` there. Runs no component code.
    ///
    fn migrate_in<T: Component>(
        &mut self,
        entity: EntityId,
        record: Record,
        target: ArchetypeId,
        column: usize,
        value: T,
    ) -> NonNull<T> {
        let (row, ptr) = match record.location() {
            None => {
                let dest = &mut self.archetypes[target];
                dest.reserve_row();
                let ptr = unsafe { dest.push_component(column, value) };
                (dest.push_entity(entity), ptr)
            }
            Some((source, old_row)) => {
                let (src, dest) = self.archetypes.pair_mut(source, target);
                dest.reserve_row();
                let shifted = src.move_row_to(old_row, dest);
                let ptr = unsafe { dest.push_component(column, value) };
                let row = dest.push_entity(entity);
                self.directory.shift_down(shifted);
                trace!("Moved {entity} from {source} to {target}");
                (row, ptr)
            }
        };
        self.directory.set(entity, Record::new(target, row));
        ptr
    }

    ///
    /// Detaches component `T` from entity, destroying its value. Remaining components are moved
    /// to the matching archetype. Returns `false` if entity is unknown or has no `T`.
    ///
    pub fn detach<T: Component>(&mut self, entity: EntityId) -> bool {
        let comp_id = ComponentId::of::<T>();
        let Some((source, row)) = self.directory.get(entity).and_then(|r| r.location()) else {
            return false;
        };
        let signature = {
            let current = self.archetypes[source].signature();
            if !current.contains(comp_id) {
                return false;
            }
            current.without(comp_id)
        };
        if signature.is_empty() {
            let shifted = self.archetypes[source].remove_row(row);
            self.directory.shift_down(shifted);
            self.directory.set(entity, Record::default());
            trace!("Detached last component from {entity}");
            self.archetypes[source].drop_evicted();
            return true;
        }
        let target = match self.archetypes.get_or_create(&signature, &self.components) {
            Ok(target) => target,
            Err(e) => {
                error!("Unable to detach {} from {entity}: {e}", type_name::<T>());
                return false;
            }
        };
        let (src, dest) = self.archetypes.pair_mut(source, target);
        dest.reserve_row();
        let shifted = src.move_row_to(row, dest);
        let new_row = dest.push_entity(entity);
        self.directory.shift_down(shifted);
        self.directory.set(entity, Record::new(target, new_row));
        trace!("Moved {entity} from {source} to {target}");
        // Only once every record is in place
        self.archetypes[source].drop_evicted();
        true
    }

    /// Gets the value of component of specified entity.
    pub fn get<T: Component>(&self, entity: EntityId) -> Option<&T> {
        let (archetype, row) = self.directory.get(entity)?.location()?;
        self.archetypes[archetype].get::<T>(row)
    }

    pub fn get_mut<T: Component>(&mut self, entity: EntityId) -> Option<&mut T> {
        let (archetype, row) = self.directory.get(entity)?.location()?;
        self.archetypes[archetype].get_mut::<T>(row)
    }

    pub fn has<T: Component>(&self, entity: EntityId) -> bool {
        self.directory
            .get(entity)
            .and_then(|r| r.archetype())
            .is_some_and(|a| self.archetypes[a].has_component(ComponentId::of::<T>()))
    }

    /// Destroys entity with all its components. Returns `false` for unknown entity.
    pub fn destroy(&mut self, entity: EntityId) -> bool {
        let Some(record) = self.directory.remove(entity) else {
            return false;
        };
        trace!("Destroyed {entity}");
        if let Some((archetype, row)) = record.location() {
            let shifted = self.archetypes[archetype].remove_row(row);
            self.directory.shift_down(shifted);
            self.archetypes[archetype].drop_evicted();
        }
        true
    }

    #[inline]
    pub fn contains(&self, entity: EntityId) -> bool {
        self.directory.contains(entity)
    }

    #[inline]
    pub fn record(&self, entity: EntityId) -> Option<Record> {
        self.directory.get(entity)
    }

    /// Number of live entities
    #[inline]
    pub fn len(&self) -> usize {
        self.directory.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn archetypes(&self) -> &ArchetypeStorage {
        &self.archetypes
    }

    /// Archetypes containing every component of `required`. Issue a new query after structural changes.
    pub fn query<'a>(&'a self, required: &'a Signature) -> Matching<'a> {
        self.archetypes.matching(required)
    }

    ///
    /// Borrows columns named by `Q` in every matching archetype.
    /// Yields `(entities, slices)` pairs, index aligned.
    ///
    pub fn query_mut<Q: Query>(
        &mut self,
    ) -> Result<impl Iterator<Item = (&[EntityId], Q::Slices<'_>)>, StorageError> {
        if !Q::is_disjoint() {
            return Err(StorageError::ConflictingAccess);
        }
        let required = Q::signature();
        Ok(self
            .archetypes
            .iter_mut()
            .filter(move |a| a.signature().is_superset_of(&required))
            .filter_map(|a| unsafe { a.fetch_unchecked::<Q>() }))
    }

    /// Runs system over every matching archetype. Returns number of archetypes visited.
    pub fn dispatch<C, S>(&mut self, system: &mut S, context: &C) -> usize
    where
        S: System<C> + ?Sized,
    {
        let required = system.signature();
        let mut count = 0;
        for archetype in self.archetypes.matching_mut(&required) {
            system.run(archetype, context);
            count += 1;
        }
        count
    }

    /// Removes all entities from storage
    pub fn clear(&mut self) {
        self.directory.clear();
        self.archetypes.clear();
    }
}
