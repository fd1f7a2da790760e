use std::{fmt::Display, ptr::NonNull};

use crate::{
    archetype::column::{Column, capacity_overflow},
    component::{Component, ComponentDescriptor, ComponentId},
    entity::EntityId,
    error::StorageError,
    query::Query,
    signature::Signature,
};

///
/// ArchetypeId
///
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Debug)]
#[repr(transparent)]
pub struct ArchetypeId(u32);

impl ArchetypeId {
    pub(crate) fn new(index: usize) -> Self {
        ArchetypeId(u32::try_from(index).unwrap_or_else(|_| capacity_overflow()))
    }

    #[inline(always)]
    pub(crate) fn index(&self) -> usize {
        self.0 as usize
    }
}

impl Display for ArchetypeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ArchetypeId({})", self.0)
    }
}

///
/// Archetype
///
/// Table of all entities sharing the same signature. Column `i` holds component `signature[i]`,
/// and row `r` of every column belongs to `entities[r]`.
///
pub struct Archetype {
    id: ArchetypeId,
    signature: Signature,
    columns: Vec<Column>,
    entities: Vec<EntityId>,
}

impl Archetype {
    /// `descriptors` must follow signature order
    pub(crate) fn new(
        id: ArchetypeId,
        signature: Signature,
        descriptors: impl Iterator<Item = ComponentDescriptor>,
    ) -> Self {
        let columns: Vec<_> = descriptors.map(Column::new).collect();
        debug_assert!(columns.iter().map(Column::id).eq(signature.iter().copied()));
        Archetype {
            id,
            signature,
            columns,
            entities: Vec::new(),
        }
    }

    #[inline]
    pub fn id(&self) -> ArchetypeId {
        self.id
    }

    #[inline]
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Member entities in row order
    #[inline]
    pub fn entities(&self) -> &[EntityId] {
        &self.entities
    }

    /// Number of rows
    #[inline]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    #[inline]
    pub fn has_component(&self, id: ComponentId) -> bool {
        self.signature.contains(id)
    }

    #[inline]
    fn column_by_id(&self, id: ComponentId) -> Option<&Column> {
        self.column_index(id).map(|i| &self.columns[i])
    }

    #[inline]
    fn column_by_id_mut(&mut self, id: ComponentId) -> Option<&mut Column> {
        self.column_index(id).map(|i| &mut self.columns[i])
    }

    /// Values of component `T` in row order
    pub fn column<T: Component>(&self) -> Option<&[T]> {
        self.column_by_id(ComponentId::of::<T>())
            .map(|c| unsafe { c.as_slice::<T>() })
    }

    pub fn column_mut<T: Component>(&mut self) -> Option<&mut [T]> {
        self.column_by_id_mut(ComponentId::of::<T>())
            .map(|c| unsafe { c.as_mut_slice::<T>() })
    }

    pub fn get<T: Component>(&self, row: usize) -> Option<&T> {
        self.column::<T>()?.get(row)
    }

    pub fn get_mut<T: Component>(&mut self, row: usize) -> Option<&mut T> {
        self.column_mut::<T>()?.get_mut(row)
    }

    /// Capacity of component's buffer in bytes
    pub fn capacity(&self, id: ComponentId) -> Option<usize> {
        self.column_by_id(id).map(Column::capacity)
    }

    /// Number of rows stored in component's buffer
    pub fn column_len(&self, id: ComponentId) -> Option<usize> {
        self.column_by_id(id).map(Column::len)
    }

    ///
    /// Borrows columns named by `Q` at once, along with member entities.
    /// Returns `None` if this archetype lacks any of them.
    ///
    pub fn fetch<Q: Query>(&mut self) -> Result<Option<(&[EntityId], Q::Slices<'_>)>, StorageError> {
        if !Q::is_disjoint() {
            return Err(StorageError::ConflictingAccess);
        }
        Ok(unsafe { self.fetch_unchecked::<Q>() })
    }

    /// # Safety
    /// Components of `Q` must be distinct.
    pub(crate) unsafe fn fetch_unchecked<Q: Query>(
        &mut self,
    ) -> Option<(&[EntityId], Q::Slices<'_>)> {
        let this = &*self;
        let slices = unsafe { Q::fetch(this)? };
        Some((&this.entities, slices))
    }

    #[inline]
    pub(crate) fn column_data(&self, id: ComponentId) -> Option<NonNull<u8>> {
        self.column_by_id(id).map(Column::data)
    }

    /// Makes room for one more row in every column
    pub(crate) fn reserve_row(&mut self) {
        for column in self.columns.iter_mut() {
            column.reserve_one();
        }
    }

    /// Column index of component, if present
    #[inline]
    pub(crate) fn column_index(&self, id: ComponentId) -> Option<usize> {
        self.signature.position(id)
    }

    /// Appends `value` to column at `column`. Entity must be pushed once every column got its value.
    /// # Safety
    /// `T` must be the component stored in that column.
    pub(crate) unsafe fn push_component<T: Component>(&mut self, column: usize, value: T) -> NonNull<T> {
        unsafe { self.columns[column].push(value) }
    }

    /// Appends entity to the member list and returns its row
    pub(crate) fn push_entity(&mut self, entity: EntityId) -> usize {
        self.entities.push(entity);
        let row = self.entities.len() - 1;
        debug_assert!(self.columns.iter().all(|c| c.len() == self.entities.len()));
        row
    }

    ///
    /// Moves entity at `row` into `dest`. Components `dest` also has are relocated to its new rows,
    /// the rest are evicted and stay alive until [`Archetype::drop_evicted`].
    /// Returns entities shifted one row down in this archetype.
    ///
    /// `dest` must receive the entity through [`Archetype::push_entity`] once its other columns are filled.
    pub(crate) fn move_row_to(&mut self, row: usize, dest: &mut Archetype) -> &[EntityId] {
        for column in self.columns.iter_mut() {
            match dest.column_by_id_mut(column.id()) {
                Some(target) => unsafe {
                    target.push_relocated(column.row_ptr(row));
                    column.close_gap(row);
                },
                None => column.evict(row),
            }
        }
        self.entities.remove(row);
        &self.entities[row..]
    }

    ///
    /// Removes `row` from every column and the member list. Values are evicted, not dropped:
    /// call [`Archetype::drop_evicted`] once the caller's bookkeeping is done.
    /// Returns entities shifted one row down.
    ///
    pub(crate) fn remove_row(&mut self, row: usize) -> &[EntityId] {
        for column in self.columns.iter_mut() {
            column.evict(row);
        }
        self.entities.remove(row);
        &self.entities[row..]
    }

    /// Drops values evicted by the last row removal
    pub(crate) fn drop_evicted(&mut self) {
        for column in self.columns.iter_mut() {
            column.drop_evicted();
        }
    }

    /// Destroys all rows
    pub(crate) fn clear(&mut self) {
        self.entities.clear();
        for column in self.columns.iter_mut() {
            column.clear();
        }
    }
}

impl Display for Archetype {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Archetype(id={}, signature={}, rows={})",
            self.id,
            self.signature,
            self.entities.len()
        )
    }
}

impl std::fmt::Debug for Archetype {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Archetype")
            .field("id", &self.id)
            .field("signature", &self.signature)
            .field("columns", &self.columns)
            .field("entities", &self.entities.len())
            .finish()
    }
}

///
/// Tests
///
#[cfg(test)]
mod test {
    use crate::{
        component::{Component, ComponentDescriptor, ComponentId},
        entity::EntityId,
        error::StorageError,
        signature::Signature,
    };

    use super::{Archetype, ArchetypeId};

    #[derive(Default, Debug, PartialEq, Clone, Copy)]
    struct Position(f32, f32);

    #[derive(Default, Debug, PartialEq, Clone, Copy)]
    struct Velocity(f32, f32);

    #[derive(Default, Debug, PartialEq)]
    struct Name(String);

    fn archetype(index: usize, descriptors: Vec<ComponentDescriptor>) -> Archetype {
        let mut descriptors = descriptors;
        descriptors.sort_by_key(|d| d.id());
        let signature = Signature::new(descriptors.iter().map(|d| d.id()));
        Archetype::new(ArchetypeId::new(index), signature, descriptors.into_iter())
    }

    fn put<T: Component>(archetype: &mut Archetype, value: T) {
        let column = archetype.column_index(ComponentId::of::<T>()).unwrap();
        unsafe { archetype.push_component(column, value) };
    }

    fn push(archetype: &mut Archetype, entity: u64, name: &str, x: f32) {
        archetype.reserve_row();
        put(archetype, Name(name.to_owned()));
        put(archetype, Position(x, x));
        archetype.push_entity(EntityId::new(entity));
    }

    #[test]
    fn add_remove() {
        let mut a = archetype(
            0,
            vec![
                ComponentDescriptor::of::<Name>(),
                ComponentDescriptor::of::<Position>(),
            ],
        );
        push(&mut a, 1, "one", 1.0);
        push(&mut a, 2, "two", 2.0);
        push(&mut a, 3, "three", 3.0);
        assert_eq!(3, a.len());
        assert_eq!(Some(&Position(2.0, 2.0)), a.get::<Position>(1));

        let shifted = a.remove_row(0).to_vec();
        a.drop_evicted();
        assert_eq!(vec![EntityId::new(2), EntityId::new(3)], shifted);
        assert_eq!(Some(&Name("two".to_owned())), a.get::<Name>(0));
        assert_eq!(Some(2), a.column_len(ComponentId::of::<Name>()));
        assert_eq!(Some(2), a.column_len(ComponentId::of::<Position>()));
        assert!(a.column::<Velocity>().is_none());

        a.clear();
        assert!(a.is_empty());
        assert_eq!(Some(0), a.column_len(ComponentId::of::<Position>()));
    }

    #[test]
    fn move_row() {
        let mut src = archetype(
            0,
            vec![
                ComponentDescriptor::of::<Name>(),
                ComponentDescriptor::of::<Position>(),
            ],
        );
        let mut dest = archetype(1, vec![ComponentDescriptor::of::<Position>()]);
        push(&mut src, 1, "one", 1.0);
        push(&mut src, 2, "two", 2.0);

        dest.reserve_row();
        let shifted = src.move_row_to(0, &mut dest).to_vec();
        src.drop_evicted();
        let row = dest.push_entity(EntityId::new(1));

        assert_eq!(0, row);
        assert_eq!(vec![EntityId::new(2)], shifted);
        assert_eq!(Some(&Position(1.0, 1.0)), dest.get::<Position>(0));
        assert_eq!(Some(&Name("two".to_owned())), src.get::<Name>(0));
        assert_eq!(&[EntityId::new(2)], src.entities());
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    #[should_panic(expected = "capacity overflow")]
    fn archetype_id_overflow() {
        ArchetypeId::new(u32::MAX as usize + 1);
    }

    #[test]
    fn fetch_columns() {
        let mut a = archetype(
            0,
            vec![
                ComponentDescriptor::of::<Name>(),
                ComponentDescriptor::of::<Position>(),
                ComponentDescriptor::of::<Velocity>(),
            ],
        );
        for i in 0..3 {
            a.reserve_row();
            put(&mut a, Name::default());
            put(&mut a, Position(i as f32, 0.0));
            put(&mut a, Velocity(1.0, 2.0));
            a.push_entity(EntityId::new(i + 1));
        }

        let (entities, (positions, velocities)) =
            a.fetch::<(&mut Position, &Velocity)>().unwrap().unwrap();
        assert_eq!(3, entities.len());
        for (p, v) in positions.iter_mut().zip(velocities.iter()) {
            p.0 += v.0;
            p.1 += v.1;
        }
        assert_eq!(Some(&Position(3.0, 2.0)), a.get::<Position>(2));

        assert!(a.fetch::<(&bool,)>().unwrap().is_none());
        assert_eq!(
            Some(StorageError::ConflictingAccess),
            a.fetch::<(&mut Position, &Position)>().err()
        );
    }
}
