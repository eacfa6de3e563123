//! In-process store used for dry runs and tests.

use crate::models::{City, NewCity, NewOffer, NewUser, Offer, User};
use crate::store::{OfferStore, StoreError, StoreResult};
use chrono::Utc;
use parking_lot::Mutex;

#[derive(Default)]
struct MemoryState {
    connected: bool,
    connects: usize,
    disconnects: usize,
    cities: Vec<City>,
    users: Vec<User>,
    offers: Vec<Offer>,
}

/// [`OfferStore`] keeping entities in insertion order behind a mutex.
///
/// Identifiers are assigned sequentially from 1 per entity kind, like a
/// `SERIAL` column.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
    unreachable: Option<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose `connect` always fails with [`StoreError::Unavailable`].
    pub fn unreachable(reason: impl Into<String>) -> Self {
        Self {
            state: Mutex::default(),
            unreachable: Some(reason.into()),
        }
    }

    pub fn cities(&self) -> Vec<City> {
        self.state.lock().cities.clone()
    }

    pub fn users(&self) -> Vec<User> {
        self.state.lock().users.clone()
    }

    pub fn offers(&self) -> Vec<Offer> {
        self.state.lock().offers.clone()
    }

    pub fn is_connected(&self) -> bool {
        self.state.lock().connected
    }

    /// Number of successful `connect` calls that opened the store.
    pub fn connect_count(&self) -> usize {
        self.state.lock().connects
    }

    /// Number of `disconnect` calls that closed an open store.
    pub fn disconnect_count(&self) -> usize {
        self.state.lock().disconnects
    }

    fn ensure_connected(state: &MemoryState) -> StoreResult<()> {
        if state.connected {
            Ok(())
        } else {
            Err(StoreError::NotConnected)
        }
    }
}

#[rocket::async_trait]
impl OfferStore for MemoryStore {
    async fn connect(&mut self) -> StoreResult<()> {
        if let Some(reason) = &self.unreachable {
            return Err(StoreError::Unavailable(reason.clone()));
        }

        let state = self.state.get_mut();
        if !state.connected {
            state.connected = true;
            state.connects += 1;
        }
        Ok(())
    }

    async fn disconnect(&mut self) -> StoreResult<()> {
        let state = self.state.get_mut();
        if state.connected {
            state.connected = false;
            state.disconnects += 1;
        }
        Ok(())
    }

    async fn find_city_by_name(&self, name: &str) -> StoreResult<Option<City>> {
        let state = self.state.lock();
        Self::ensure_connected(&state)?;
        Ok(state.cities.iter().find(|city| city.name == name).cloned())
    }

    async fn create_city(&self, city: NewCity) -> StoreResult<City> {
        let mut state = self.state.lock();
        Self::ensure_connected(&state)?;

        if state.cities.iter().any(|existing| existing.name == city.name) {
            return Err(StoreError::Duplicate {
                entity: "city",
                key: "name",
                value: city.name,
            });
        }

        let now = Utc::now();
        let created = City {
            id: state.cities.len() as i32 + 1,
            name: city.name,
            coordinates: city.coordinates,
            created_at: now,
            updated_at: now,
        };
        state.cities.push(created.clone());
        Ok(created)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let state = self.state.lock();
        Self::ensure_connected(&state)?;
        Ok(state.users.iter().find(|user| user.email == email).cloned())
    }

    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        let mut state = self.state.lock();
        Self::ensure_connected(&state)?;

        if state.users.iter().any(|existing| existing.email == user.email) {
            return Err(StoreError::Duplicate {
                entity: "user",
                key: "email",
                value: user.email,
            });
        }

        let now = Utc::now();
        let created = User {
            id: state.users.len() as i32 + 1,
            name: user.name,
            email: user.email,
            avatar: user.avatar,
            user_type: user.user_type,
            created_at: now,
            updated_at: now,
        };
        state.users.push(created.clone());
        Ok(created)
    }

    async fn create_offer(&self, offer: NewOffer) -> StoreResult<Offer> {
        let mut state = self.state.lock();
        Self::ensure_connected(&state)?;

        if !state.users.iter().any(|user| user.id == offer.author_id) {
            return Err(StoreError::validation(
                "offer",
                format!("author {} does not exist", offer.author_id),
            ));
        }

        let now = Utc::now();
        let created = Offer {
            id: state.offers.len() as i32 + 1,
            title: offer.title,
            description: offer.description,
            date: offer.date,
            city: offer.city,
            preview: offer.preview,
            images: offer.images,
            is_premium: offer.is_premium,
            is_favorite: offer.is_favorite,
            rating: offer.rating,
            housing_type: offer.housing_type,
            bedrooms: offer.bedrooms,
            guests: offer.guests,
            price: offer.price,
            amenities: offer.amenities,
            author_id: offer.author_id,
            coordinates: offer.coordinates,
            comment_count: offer.comment_count,
            created_at: now,
            updated_at: now,
        };
        state.offers.push(created.clone());
        Ok(created)
    }
}
