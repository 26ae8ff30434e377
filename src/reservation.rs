// Reservation coordinator: the only component that touches more than one
// store. A reservation exists iff exactly one room was taken from its hotel;
// cancelling removes the record and gives the room back.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
    customer::CustomerRegistry,
    error::{RegistryError, RegistryResult},
    hotel::HotelRegistry,
    identifier::{EntityKind, Identifier},
    persistence::Store,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub customer_id: Identifier,
    pub hotel_id: Identifier,
}

/// Creates and cancels reservations against the hotel and customer registries.
///
/// Nothing here is transactional. `create` loads the hotel store once to check
/// the hotel exists and then again inside [`HotelRegistry::reserve_room`]; a
/// writer that changes the hotel store between those two loads is not
/// detected. The backends serialize individual reads and writes per resource
/// but not whole read-modify-write cycles.
///
/// Partial failures are not rolled back. In `create`, if the room is taken but
/// the reservation document then fails to save, the room stays taken. In
/// `cancel`, if the room is released but the reservation document then fails
/// to save, the reservation is kept with its room already returned, and
/// retrying the cancel releases the room a second time.
#[derive(Debug, Clone)]
pub struct ReservationCoordinator {
    hotels: HotelRegistry,
    customers: CustomerRegistry,
    store: Store<Reservation>,
}

impl ReservationCoordinator {
    pub fn new(hotels: HotelRegistry, customers: CustomerRegistry, store: Store<Reservation>) -> Self {
        Self {
            hotels,
            customers,
            store,
        }
    }

    pub fn store(&self) -> &Store<Reservation> {
        &self.store
    }

    pub fn create(
        &self,
        reservation_id: impl Into<Identifier>,
        customer_id: impl Into<Identifier>,
        hotel_id: impl Into<Identifier>,
    ) -> RegistryResult<()> {
        let reservation_id = reservation_id.into();
        let customer_id = customer_id.into();
        let hotel_id = hotel_id.into();

        let customers = self.customers.store().load()?;
        let hotels = self.hotels.store().load()?;
        let mut reservations = self.store.load()?;

        // all existence checks run before any room is consumed
        if reservations.contains_key(&reservation_id) {
            warn!(%reservation_id, "reservation already exists");
            return Err(RegistryError::duplicate(EntityKind::Reservation, &reservation_id));
        }
        if !customers.contains_key(&customer_id) {
            warn!(%reservation_id, %customer_id, "customer does not exist");
            return Err(RegistryError::not_found(EntityKind::Customer, &customer_id));
        }
        if !hotels.contains_key(&hotel_id) {
            warn!(%reservation_id, %hotel_id, "hotel does not exist");
            return Err(RegistryError::not_found(EntityKind::Hotel, &hotel_id));
        }

        self.hotels.reserve_room(&hotel_id)?;

        reservations.insert(
            reservation_id.clone(),
            Reservation {
                customer_id: customer_id.clone(),
                hotel_id: hotel_id.clone(),
            },
        );
        self.store.save(&reservations)?;

        info!(%reservation_id, %customer_id, %hotel_id, "reservation created");
        Ok(())
    }

    pub fn cancel(&self, reservation_id: impl Into<Identifier>) -> RegistryResult<()> {
        let reservation_id = reservation_id.into();
        let mut reservations = self.store.load()?;

        let Some(reservation) = reservations.get(&reservation_id) else {
            warn!(%reservation_id, "reservation not found");
            return Err(RegistryError::not_found(EntityKind::Reservation, &reservation_id));
        };

        // The hotel may have been deleted since; the reservation still goes.
        match self.hotels.cancel_room(&reservation.hotel_id) {
            Ok(()) => {}
            Err(err) if err.is_not_found() => {
                warn!(%reservation_id, hotel_id = %reservation.hotel_id, "hotel gone, room not released");
            }
            Err(err) => return Err(err),
        }

        reservations.remove(&reservation_id);
        self.store.save(&reservations)?;

        info!(%reservation_id, "reservation cancelled");
        Ok(())
    }

    pub fn get(&self, reservation_id: impl Into<Identifier>) -> RegistryResult<Reservation> {
        let reservation_id = reservation_id.into();
        match self.store.load()?.remove(&reservation_id) {
            Some(reservation) => Ok(reservation),
            None => {
                warn!(%reservation_id, "reservation not found");
                Err(RegistryError::not_found(EntityKind::Reservation, &reservation_id))
            }
        }
    }
}
