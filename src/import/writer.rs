//! Offer creation.

use crate::import::error::RowError;
use crate::import::parser::OfferRecord;
use crate::models::{City, NewOffer, Offer, User};
use crate::store::{OfferStore, StoreError};

/// Build the offer to insert. Coordinates come from `city`, not from the
/// record, so every offer of a city shares the coordinates stored with it.
pub fn build_offer(record: &OfferRecord, city: &City, user: &User) -> NewOffer {
    NewOffer {
        title: record.title.clone(),
        description: record.description.clone(),
        date: record.date,
        city: city.name.clone(),
        preview: record.preview.clone(),
        images: record.images.clone(),
        is_premium: record.is_premium,
        is_favorite: record.is_favorite,
        rating: record.rating,
        housing_type: record.housing_type,
        bedrooms: record.bedrooms,
        guests: record.guests,
        price: record.price,
        amenities: record.amenities.clone(),
        author_id: user.id,
        coordinates: city.coordinates,
        comment_count: record.comment_count,
    }
}

/// Required-field checks the schema enforces on offers.
pub fn validate_offer(offer: &NewOffer) -> Result<(), StoreError> {
    for (field, value) in [
        ("title", &offer.title),
        ("description", &offer.description),
        ("preview", &offer.preview),
        ("city", &offer.city),
    ] {
        if value.trim().is_empty() {
            return Err(StoreError::validation("offer", format!("{field} is required")));
        }
    }

    if offer.price <= 0 {
        return Err(StoreError::validation(
            "offer",
            format!("price must be positive, got {}", offer.price),
        ));
    }

    Ok(())
}

/// Always inserts; there is no update path for offers.
pub struct OfferWriter<'a, S: OfferStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: OfferStore + ?Sized> OfferWriter<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    pub async fn write(
        &self,
        record: &OfferRecord,
        city: &City,
        user: &User,
    ) -> Result<Offer, RowError> {
        let offer = build_offer(record, city, user);
        validate_offer(&offer).map_err(RowError::entity("offer"))?;

        self.store
            .create_offer(offer)
            .await
            .map_err(RowError::entity("offer"))
    }
}
