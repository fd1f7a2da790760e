use thiserror::Error;

use crate::{component::ComponentId, entity::EntityId};

///
/// StorageError
///
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("Component type {0} is not registered!")]
    NotRegistered(&'static str),
    #[error("Unknown component {0}!")]
    UnknownComponent(ComponentId),
    #[error("Entity already has component {0}!")]
    AlreadyPresent(&'static str),
    #[error("No such entity: {0}!")]
    NotFound(EntityId),
    #[error("Query borrows the same component more than once!")]
    ConflictingAccess,
    #[error("Invalid storage config: {0}")]
    Config(String),
}
