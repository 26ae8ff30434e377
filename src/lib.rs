// Hotel, customer and reservation stores backed by whole-document JSON
// resources, plus the reservation flow that keeps room counts consistent.

pub mod config;
pub mod customer;
pub mod error;
pub mod hotel;
pub mod identifier;
pub mod logging;
pub mod persistence;
pub mod reservation;
pub mod system;

// Re-export key types for convenience
pub use config::StorageConfig;
pub use customer::{Customer, CustomerPatch, CustomerRegistry};
pub use error::{RegistryError, RegistryResult, StorageError};
pub use hotel::{Hotel, HotelPatch, HotelRegistry};
pub use identifier::{EntityKind, Identifier};
pub use persistence::{FileStore, MemoryStore, Records, StorageBackend, Store};
pub use reservation::{Reservation, ReservationCoordinator};
pub use system::ReservationSystem;
