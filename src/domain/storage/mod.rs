//! Storage domain - Document store abstraction layer

mod entity;
mod link;
mod repository;
mod validation;

pub use entity::{StorageEntity, StorageKey};
pub use link::{LinkOutcome, LinkStore};
pub use repository::Storage;
pub use validation::{validate_document_id, IdValidationError};

#[cfg(test)]
pub use repository::mock;
