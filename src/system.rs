use std::sync::Arc;

use crate::{
    config::StorageConfig,
    customer::CustomerRegistry,
    hotel::HotelRegistry,
    persistence::{FileStore, StorageBackend, Store},
    reservation::ReservationCoordinator,
};

// The three components wired over one backend. Lives as long as the process.
#[derive(Debug, Clone)]
pub struct ReservationSystem {
    pub hotels: HotelRegistry,
    pub customers: CustomerRegistry,
    pub reservations: ReservationCoordinator,
}

impl ReservationSystem {
    /// JSON files under `config.data_dir`.
    pub fn open(config: &StorageConfig) -> Self {
        Self::with_backend(Arc::new(FileStore::new(&config.data_dir)), config)
    }

    pub fn with_backend(backend: Arc<dyn StorageBackend>, config: &StorageConfig) -> Self {
        let hotels = HotelRegistry::new(Store::new(backend.clone(), config.hotels.as_str()));
        let customers = CustomerRegistry::new(Store::new(backend.clone(), config.customers.as_str()));
        let reservations = ReservationCoordinator::new(
            hotels.clone(),
            customers.clone(),
            Store::new(backend, config.reservations.as_str()),
        );

        Self {
            hotels,
            customers,
            reservations,
        }
    }
}
