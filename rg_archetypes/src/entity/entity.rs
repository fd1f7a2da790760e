use std::fmt::Display;

use crate::archetype::ArchetypeId;

///
/// EntityId
///
/// Zero is reserved as "no entity".
///
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Debug)]
#[repr(transparent)]
pub struct EntityId(u64);

impl EntityId {
    pub const NONE: EntityId = EntityId(0);

    #[inline]
    pub(crate) fn new(value: u64) -> Self {
        EntityId(value)
    }

    #[inline]
    pub fn value(&self) -> u64 {
        self.0
    }

    #[inline]
    pub fn is_none(&self) -> bool {
        *self == Self::NONE
    }
}

impl Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EntityId({})", self.0)
    }
}

///
/// Location of entity's data: owning archetype and row in it.
/// Entity without components has no archetype.
///
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Record {
    archetype: Option<ArchetypeId>,
    row: usize,
}

impl Record {
    #[inline]
    pub(crate) fn new(archetype: ArchetypeId, row: usize) -> Self {
        Record {
            archetype: Some(archetype),
            row,
        }
    }

    #[inline]
    pub fn archetype(&self) -> Option<ArchetypeId> {
        self.archetype
    }

    /// Meaningless if there is no archetype
    #[inline]
    pub fn row(&self) -> usize {
        self.row
    }

    #[inline]
    pub(crate) fn shifted_down(self) -> Self {
        debug_assert!(self.row > 0);
        Record {
            archetype: self.archetype,
            row: self.row - 1,
        }
    }

    #[inline]
    pub(crate) fn location(&self) -> Option<(ArchetypeId, usize)> {
        self.archetype.map(|a| (a, self.row))
    }
}
