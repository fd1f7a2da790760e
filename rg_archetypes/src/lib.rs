pub mod archetype;
pub mod component;
pub mod config;
pub mod entity;
pub mod error;
pub mod query;
pub mod signature;
pub mod system;

pub use component::{Component, ComponentId};
pub use config::StorageConfig;
pub use entity::{Entities, EntityId};
pub use error::StorageError;
pub use signature::Signature;
pub use system::System;
