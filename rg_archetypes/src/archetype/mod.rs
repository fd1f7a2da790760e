mod archetype;
mod archetype_storage;
mod column;

pub use archetype::Archetype;
pub use archetype::ArchetypeId;
pub use archetype_storage::ArchetypeStorage;
pub use archetype_storage::Matching;
