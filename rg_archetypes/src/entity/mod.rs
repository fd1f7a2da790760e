mod directory;
mod ecs;
mod entity;

pub(crate) use directory::EntityDirectory;
pub use ecs::Entities;
pub use entity::EntityId;
pub use entity::Record;
