// Hotel registry: CRUD over the hotel store plus the room inventory counter
// that reservations draw from.

use std::fmt;

use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::{
    error::{RegistryError, RegistryResult},
    identifier::{EntityKind, Identifier},
    persistence::Store,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hotel {
    pub name: String,
    pub location: String,
    // available rooms, never negative
    #[serde(deserialize_with = "deserialize_room_count")]
    pub rooms: u32,
}

// Older documents may hold the count as a string or a whole float ("3", 3.0).
fn deserialize_room_count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    room_count_from_value(&value)
        .ok_or_else(|| de::Error::custom(format!("invalid room count: {value}")))
}

fn room_count_from_value(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .or_else(|| n.as_f64().and_then(whole_room_count)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<u32>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(whole_room_count))
        }
        _ => None,
    }
}

fn whole_room_count(rooms: f64) -> Option<u32> {
    (rooms.fract() == 0.0 && rooms >= 0.0 && rooms <= f64::from(u32::MAX)).then_some(rooms as u32)
}

impl Hotel {
    pub fn new(name: impl Into<String>, location: impl Into<String>, rooms: u32) -> Self {
        Self {
            name: name.into(),
            location: location.into(),
            rooms,
        }
    }
}

impl fmt::Display for Hotel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}), {} rooms", self.name, self.location, self.rooms)
    }
}

/// Partial update for [`HotelRegistry::modify`]. Fields left as `None` keep
/// their stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HotelPatch {
    pub name: Option<String>,
    pub location: Option<String>,
    pub rooms: Option<u32>,
}

impl HotelPatch {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn rooms(mut self, rooms: u32) -> Self {
        self.rooms = Some(rooms);
        self
    }

    fn apply(self, hotel: &mut Hotel) {
        if let Some(name) = self.name {
            hotel.name = name;
        }
        if let Some(location) = self.location {
            hotel.location = location;
        }
        if let Some(rooms) = self.rooms {
            hotel.rooms = rooms;
        }
    }
}

// Every operation is a full load -> mutate -> save against the hotel store.
#[derive(Debug, Clone)]
pub struct HotelRegistry {
    store: Store<Hotel>,
}

impl HotelRegistry {
    pub fn new(store: Store<Hotel>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Store<Hotel> {
        &self.store
    }

    pub fn create(
        &self,
        id: impl Into<Identifier>,
        name: impl Into<String>,
        location: impl Into<String>,
        rooms: u32,
    ) -> RegistryResult<()> {
        let id = id.into();
        let mut hotels = self.store.load()?;
        if hotels.contains_key(&id) {
            warn!(hotel_id = %id, "hotel ID already exists");
            return Err(RegistryError::duplicate(EntityKind::Hotel, &id));
        }

        let hotel = Hotel::new(name, location, rooms);
        hotels.insert(id.clone(), hotel);
        self.store.save(&hotels)?;
        info!(hotel_id = %id, "hotel created");
        Ok(())
    }

    pub fn delete(&self, id: impl Into<Identifier>) -> RegistryResult<()> {
        let id = id.into();
        let mut hotels = self.store.load()?;
        if hotels.remove(&id).is_none() {
            return Err(not_found(&id));
        }

        self.store.save(&hotels)?;
        info!(hotel_id = %id, "hotel deleted");
        Ok(())
    }

    pub fn get(&self, id: impl Into<Identifier>) -> RegistryResult<Hotel> {
        let id = id.into();
        let mut hotels = self.store.load()?;
        match hotels.remove(&id) {
            Some(hotel) => {
                info!(hotel_id = %id, %hotel, "hotel found");
                Ok(hotel)
            }
            None => Err(not_found(&id)),
        }
    }

    pub fn modify(&self, id: impl Into<Identifier>, patch: HotelPatch) -> RegistryResult<()> {
        let id = id.into();
        let mut hotels = self.store.load()?;
        let Some(hotel) = hotels.get_mut(&id) else {
            return Err(not_found(&id));
        };

        patch.apply(hotel);
        self.store.save(&hotels)?;
        info!(hotel_id = %id, "hotel modified");
        Ok(())
    }

    // Take one room out of inventory. Fails without writing when the hotel is
    // unknown or has no rooms left.
    pub fn reserve_room(&self, id: impl Into<Identifier>) -> RegistryResult<()> {
        let id = id.into();
        let mut hotels = self.store.load()?;
        let Some(hotel) = hotels.get_mut(&id) else {
            return Err(not_found(&id));
        };

        if hotel.rooms == 0 {
            warn!(hotel_id = %id, "no rooms available");
            return Err(RegistryError::NoCapacity { hotel_id: id });
        }

        hotel.rooms -= 1;
        let rooms = hotel.rooms;
        self.store.save(&hotels)?;
        info!(hotel_id = %id, rooms, "room reserved");
        Ok(())
    }

    // Put one room back. There is no upper bound: releasing more rooms than
    // were reserved grows the inventory.
    pub fn cancel_room(&self, id: impl Into<Identifier>) -> RegistryResult<()> {
        let id = id.into();
        let mut hotels = self.store.load()?;
        let Some(hotel) = hotels.get_mut(&id) else {
            return Err(not_found(&id));
        };

        hotel.rooms = hotel.rooms.saturating_add(1);
        let rooms = hotel.rooms;
        self.store.save(&hotels)?;
        info!(hotel_id = %id, rooms, "room released");
        Ok(())
    }
}

fn not_found(id: &Identifier) -> RegistryError {
    warn!(hotel_id = %id, "hotel not found");
    RegistryError::not_found(EntityKind::Hotel, id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::{MemoryStore, StorageBackend};
    use std::sync::Arc;

    fn registry() -> (HotelRegistry, Arc<MemoryStore>) {
        let backend = Arc::new(MemoryStore::new());
        let store = Store::new(backend.clone() as Arc<dyn StorageBackend>, "hotels.json");
        (HotelRegistry::new(store), backend)
    }

    #[test]
    fn test_create_and_get_hotel() {
        let (hotels, _) = registry();
        hotels.create(1, "Hilton", "NY", 100).unwrap();

        let hotel = hotels.get("1").unwrap();
        assert_eq!(hotel, Hotel::new("Hilton", "NY", 100));
    }

    #[test]
    fn test_create_duplicate_keeps_first() {
        let (hotels, _) = registry();
        hotels.create(1, "Hilton", "NY", 100).unwrap();

        let err = hotels.create("1", "Marriott", "LA", 50).unwrap_err();
        assert!(matches!(
            err,
            RegistryError::DuplicateIdentifier {
                entity: EntityKind::Hotel,
                ..
            }
        ));
        assert_eq!(hotels.get(1).unwrap().name, "Hilton");
        assert_eq!(hotels.store().load().unwrap().len(), 1);
    }

    #[test]
    fn test_delete_hotel() {
        let (hotels, _) = registry();
        hotels.create(1, "Hilton", "NY", 100).unwrap();
        hotels.delete(1).unwrap();

        assert!(hotels.get(1).unwrap_err().is_not_found());
    }

    #[test]
    fn test_delete_missing_hotel_leaves_store_unchanged() {
        let (hotels, backend) = registry();
        hotels.create(1, "Hilton", "NY", 100).unwrap();
        let before = backend.read("hotels.json").unwrap();

        assert!(hotels.delete(99).unwrap_err().is_not_found());
        assert_eq!(backend.read("hotels.json").unwrap(), before);
    }

    #[test]
    fn test_get_missing_hotel() {
        let (hotels, _) = registry();
        let err = hotels.get(99).unwrap_err();
        assert!(matches!(
            err,
            RegistryError::NotFound {
                entity: EntityKind::Hotel,
                ..
            }
        ));
    }

    #[test]
    fn test_modify_only_supplied_fields() {
        let (hotels, _) = registry();
        hotels.create(1, "Hilton", "NY", 100).unwrap();

        hotels
            .modify(1, HotelPatch::default().name("Hilton Updated").rooms(150))
            .unwrap();

        let hotel = hotels.get(1).unwrap();
        assert_eq!(hotel.name, "Hilton Updated");
        assert_eq!(hotel.location, "NY");
        assert_eq!(hotel.rooms, 150);
    }

    #[test]
    fn test_modify_missing_hotel() {
        let (hotels, backend) = registry();
        let err = hotels
            .modify(99, HotelPatch::default().name("Ghost"))
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(backend.read("hotels.json").unwrap().is_none());
    }

    #[test]
    fn test_reserve_room_until_empty() {
        let (hotels, _) = registry();
        hotels.create(1, "Hilton", "NY", 2).unwrap();

        hotels.reserve_room(1).unwrap();
        hotels.reserve_room(1).unwrap();
        assert_eq!(hotels.get(1).unwrap().rooms, 0);

        let err = hotels.reserve_room(1).unwrap_err();
        assert!(matches!(err, RegistryError::NoCapacity { .. }));
        assert_eq!(hotels.get(1).unwrap().rooms, 0);
    }

    #[test]
    fn test_reserve_room_missing_hotel() {
        let (hotels, _) = registry();
        assert!(hotels.reserve_room(99).unwrap_err().is_not_found());
    }

    #[test]
    fn test_cancel_room_has_no_upper_bound() {
        let (hotels, _) = registry();
        hotels.create(1, "Hilton", "NY", 1).unwrap();

        hotels.cancel_room(1).unwrap();
        hotels.cancel_room(1).unwrap();
        assert_eq!(hotels.get(1).unwrap().rooms, 3);
    }

    // Backend that accepts no writes
    struct ReadOnlyStore(MemoryStore);

    impl StorageBackend for ReadOnlyStore {
        fn read(&self, resource: &str) -> Result<Option<Vec<u8>>, crate::StorageError> {
            self.0.read(resource)
        }

        fn write(&self, resource: &str, _contents: &[u8]) -> Result<(), crate::StorageError> {
            let err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
            Err(crate::StorageError::io(resource, err))
        }
    }

    #[test]
    fn test_failed_save_is_not_reported_as_success() {
        let seeded = MemoryStore::new();
        seeded
            .write(
                "hotels.json",
                br#"{"1": {"name": "Hilton", "location": "NY", "rooms": 1}}"#,
            )
            .unwrap();
        let backend: Arc<dyn StorageBackend> = Arc::new(ReadOnlyStore(seeded));
        let hotels = HotelRegistry::new(Store::new(backend, "hotels.json"));

        assert!(matches!(
            hotels.create(2, "Marriott", "LA", 5).unwrap_err(),
            RegistryError::Storage(_)
        ));
        assert!(matches!(
            hotels.modify(1, HotelPatch::default().rooms(9)).unwrap_err(),
            RegistryError::Storage(_)
        ));
        assert!(matches!(
            hotels.reserve_room(1).unwrap_err(),
            RegistryError::Storage(_)
        ));

        assert!(hotels.get(2).unwrap_err().is_not_found());
        assert_eq!(hotels.get(1).unwrap().rooms, 1);
    }

    #[test]
    fn test_loose_room_counts_survive_rewrite() {
        let (hotels, backend) = registry();
        backend
            .write(
                "hotels.json",
                br#"{
                    "1": {"name": "Hilton", "location": "NY", "rooms": 5},
                    "2": {"name": "Marriott", "location": "LA", "rooms": "3"},
                    "4": {"name": "Ritz", "location": "SF", "rooms": 2.0},
                    "5": {"name": "Motel", "location": "TX"}
                }"#,
            )
            .unwrap();

        assert_eq!(hotels.get(1).unwrap().rooms, 5);
        assert_eq!(hotels.get(2).unwrap().rooms, 3);
        assert_eq!(hotels.get(4).unwrap().rooms, 2);
        assert!(hotels.get(5).unwrap_err().is_not_found());

        hotels.create(3, "Hyatt", "Chicago", 7).unwrap();
        hotels.reserve_room(2).unwrap();

        let stored = hotels.store().load().unwrap();
        assert_eq!(stored.len(), 4);
        assert_eq!(stored.get("1").map(|h| h.rooms), Some(5));
        assert_eq!(stored.get("2").map(|h| h.rooms), Some(2));
        assert_eq!(stored.get("3").map(|h| h.rooms), Some(7));
    }

    #[test]
    fn test_room_count_coercion() {
        assert_eq!(room_count_from_value(&serde_json::json!(4)), Some(4));
        assert_eq!(room_count_from_value(&serde_json::json!(" 12 ")), Some(12));
        assert_eq!(room_count_from_value(&serde_json::json!("6.0")), Some(6));
        assert_eq!(room_count_from_value(&serde_json::json!(1.5)), None);
        assert_eq!(room_count_from_value(&serde_json::json!(-1)), None);
        assert_eq!(room_count_from_value(&serde_json::json!("many")), None);
        assert_eq!(room_count_from_value(&serde_json::json!(null)), None);
    }

    #[test]
    fn test_cancel_room_missing_hotel() {
        let (hotels, _) = registry();
        assert!(hotels.cancel_room(99).unwrap_err().is_not_found());
    }
}
