//! Find-or-create for the city and author an offer row refers to.

use crate::import::error::RowError;
use crate::import::parser::OfferRecord;
use crate::models::{City, NewCity, NewUser, User};
use crate::store::{OfferStore, StoreError};

/// City and author guaranteed to exist in the store.
#[derive(Debug, Clone)]
pub struct ResolvedEntities {
    pub city: City,
    pub city_created: bool,
    pub user: User,
    pub user_created: bool,
}

/// Resolves cities by name and users by email.
///
/// Lookups and inserts are separate calls with no transaction around them;
/// the store's unique indexes decide if two importers race on the same key,
/// and the loser surfaces as [`RowError::EntityCreate`].
pub struct EntityResolver<'a, S: OfferStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: OfferStore + ?Sized> EntityResolver<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    pub async fn resolve(&self, record: &OfferRecord) -> Result<ResolvedEntities, RowError> {
        let (city, city_created) = self.resolve_city(record).await?;
        let (user, user_created) = self.resolve_user(record).await?;

        Ok(ResolvedEntities {
            city,
            city_created,
            user,
            user_created,
        })
    }

    async fn resolve_city(&self, record: &OfferRecord) -> Result<(City, bool), RowError> {
        if let Some(city) = self
            .store
            .find_city_by_name(&record.city)
            .await
            .map_err(RowError::entity("city"))?
        {
            return Ok((city, false));
        }

        let city = self
            .store
            .create_city(NewCity {
                name: record.city.clone(),
                coordinates: record.coordinates,
            })
            .await
            .map_err(RowError::entity("city"))?;

        log::debug!("created city {}", city.name);
        Ok((city, true))
    }

    async fn resolve_user(&self, record: &OfferRecord) -> Result<(User, bool), RowError> {
        if record.author_email.trim().is_empty() {
            return Err(RowError::EntityCreate {
                entity: "user",
                source: StoreError::validation("user", "authorEmail is required"),
            });
        }

        if let Some(user) = self
            .store
            .find_user_by_email(&record.author_email)
            .await
            .map_err(RowError::entity("user"))?
        {
            return Ok((user, false));
        }

        if record.author_name.trim().is_empty() {
            return Err(RowError::EntityCreate {
                entity: "user",
                source: StoreError::validation("user", "authorName is required"),
            });
        }

        let user = self
            .store
            .create_user(NewUser {
                name: record.author_name.clone(),
                email: record.author_email.clone(),
                avatar: record.author_avatar.clone(),
                user_type: record.author_type,
            })
            .await
            .map_err(RowError::entity("user"))?;

        log::debug!("created user {}", user.email);
        Ok((user, true))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::parser::find_supported_city;
    use crate::models::{Coordinates, HousingType, UserType};
    use crate::store::MemoryStore;
    use chrono::Utc;

    fn record(email: &str, name: &str) -> OfferRecord {
        OfferRecord {
            title: "Room with a view".into(),
            description: "Top floor.".into(),
            date: Utc::now(),
            city: "Hamburg".into(),
            preview: "p.jpg".into(),
            images: vec![],
            is_premium: false,
            is_favorite: false,
            rating: 3.9,
            housing_type: HousingType::Room,
            bedrooms: 1,
            guests: 2,
            price: 70,
            amenities: vec![],
            author_name: name.into(),
            author_email: email.into(),
            author_avatar: None,
            author_type: UserType::Normal,
            coordinates: find_supported_city("Hamburg").unwrap().coordinates,
            comment_count: 0,
        }
    }

    async fn connected_store() -> MemoryStore {
        let mut store = MemoryStore::new();
        store.connect().await.expect("connect");
        store
    }

    #[tokio::test]
    async fn creates_then_reuses_city_and_user() {
        let store = connected_store().await;
        let resolver = EntityResolver::new(&store);

        let first = resolver.resolve(&record("kai@example.com", "Kai")).await.expect("resolve");
        assert!(first.city_created);
        assert!(first.user_created);

        let second = resolver
            .resolve(&record("kai@example.com", "Someone Else"))
            .await
            .expect("resolve");
        assert!(!second.city_created);
        assert!(!second.user_created);
        assert_eq!(second.city.id, first.city.id);
        assert_eq!(second.user.id, first.user.id);
        assert_eq!(second.user.name, "Kai");

        assert_eq!(store.cities().len(), 1);
        assert_eq!(store.users().len(), 1);
    }

    #[tokio::test]
    async fn new_city_takes_record_coordinates() {
        let store = connected_store().await;
        let mut input = record("lea@example.com", "Lea");
        input.coordinates = Coordinates {
            latitude: 53.5,
            longitude: 10.0,
        };

        let resolved = EntityResolver::new(&store).resolve(&input).await.expect("resolve");
        assert_eq!(resolved.city.coordinates, input.coordinates);
    }

    #[tokio::test]
    async fn missing_author_email_fails_the_row() {
        let store = connected_store().await;
        let err = EntityResolver::new(&store)
            .resolve(&record("", "Nobody"))
            .await
            .unwrap_err();

        assert!(matches!(err, RowError::EntityCreate { entity: "user", .. }));
        assert!(store.users().is_empty());
    }

    #[tokio::test]
    async fn store_failures_surface_as_entity_errors() {
        let store = MemoryStore::new();
        let err = EntityResolver::new(&store)
            .resolve(&record("kai@example.com", "Kai"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            RowError::EntityCreate {
                entity: "city",
                source: StoreError::NotConnected
            }
        ));
    }
}
