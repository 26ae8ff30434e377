use thiserror::Error;

use crate::identifier::{EntityKind, Identifier};

// Failures of the durable resource itself. Missing or malformed documents are
// not errors; `persistence::load` recovers those to an empty mapping.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error on {resource}: {source}")]
    Io {
        resource: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Encoding error on {resource}: {source}")]
    Encode {
        resource: String,
        #[source]
        source: serde_json::Error,
    },
}

impl StorageError {
    pub(crate) fn io(resource: &str, source: std::io::Error) -> Self {
        StorageError::Io {
            resource: resource.to_owned(),
            source,
        }
    }
}

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("The {entity} ID {id} already exists")]
    DuplicateIdentifier { entity: EntityKind, id: Identifier },

    #[error("The {entity} with ID {id} was not found")]
    NotFound { entity: EntityKind, id: Identifier },

    #[error("No rooms available in hotel {hotel_id}")]
    NoCapacity { hotel_id: Identifier },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl RegistryError {
    pub(crate) fn duplicate(entity: EntityKind, id: &Identifier) -> Self {
        RegistryError::DuplicateIdentifier {
            entity,
            id: id.clone(),
        }
    }

    pub(crate) fn not_found(entity: EntityKind, id: &Identifier) -> Self {
        RegistryError::NotFound {
            entity,
            id: id.clone(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, RegistryError::NotFound { .. })
    }
}

pub type RegistryResult<T> = Result<T, RegistryError>;
