//! Random offer data in the import TSV format.

use crate::import::parser::{SUPPORTED_CITIES, SupportedCity, TSV_COLUMNS};
use crate::models::{HousingType, UserType};
use chrono::{Duration, NaiveDate, Utc};
use rand::Rng;
use rand::seq::SliceRandom;
use std::fs;
use std::io;
use std::path::Path;

const AMENITIES: [&str; 7] = [
    "Breakfast",
    "Air conditioning",
    "Laptop friendly workspace",
    "Baby seat",
    "Washer",
    "Towels",
    "Fridge",
];

const IMAGES_PER_OFFER: usize = 6;

/// One generated row, already rendered as TSV field strings.
#[derive(Debug, Clone)]
pub struct GeneratedOffer {
    pub city: &'static SupportedCity,
    pub housing_type: HousingType,
    pub is_premium: bool,
    pub price: i32,
    fields: Vec<String>,
}

impl GeneratedOffer {
    pub fn fields(&self) -> &[String] {
        &self.fields
    }
}

/// Produces mock offers; `avatar_base_url` prefixes generated avatar paths.
pub struct OfferGenerator<R: Rng> {
    rng: R,
    avatar_base_url: String,
}

impl<R: Rng> OfferGenerator<R> {
    pub fn new(rng: R, avatar_base_url: &str) -> Self {
        Self {
            rng,
            avatar_base_url: avatar_base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn generate(&mut self, count: usize) -> Vec<GeneratedOffer> {
        (0..count).map(|_| self.generate_one()).collect()
    }

    fn generate_one(&mut self) -> GeneratedOffer {
        let city = SUPPORTED_CITIES
            .choose(&mut self.rng)
            .unwrap_or(&SUPPORTED_CITIES[0]);
        let title_type = self.pick_housing_type();
        let housing_type = self.pick_housing_type();

        let images: Vec<String> = (0..IMAGES_PER_OFFER)
            .map(|_| {
                format!(
                    "https://images.unsplash.com/photo-{}",
                    self.rng.gen_range(1_000_000_000u64..=9_999_999_999)
                )
            })
            .collect();

        let mut amenities: Vec<&str> = Vec::new();
        for _ in 0..self.rng.gen_range(2..=5) {
            let amenity = AMENITIES.choose(&mut self.rng).copied().unwrap_or(AMENITIES[0]);
            if !amenities.contains(&amenity) {
                amenities.push(amenity);
            }
        }

        let is_premium = self.rng.gen_bool(0.5);
        let is_favorite = self.rng.gen_bool(0.5);
        let rating = self.rng.gen_range(3.5..=5.0_f64);
        let price = self.rng.gen_range(50..=300);

        let author_number = self.rng.gen_range(1..=100);
        let author_name = format!("User {author_number}");
        let author_email = format!("user{}@example.com", self.rng.gen_range(1..=100));
        let author_type = if self.rng.gen_bool(0.5) {
            UserType::Pro
        } else {
            UserType::Normal
        };

        let fields = vec![
            format!("Beautiful {} in {}", title_type, city.name),
            format!(
                "Wonderful place to stay in {}. Perfect for travelers looking for authentic experience. Fully equipped with all necessary amenities.",
                city.name
            ),
            self.random_date().format("%Y-%m-%d").to_string(),
            city.name.to_string(),
            images[0].clone(),
            images.join(","),
            is_premium.to_string(),
            is_favorite.to_string(),
            format!("{rating:.1}"),
            housing_type.to_string(),
            self.rng.gen_range(1..=8).to_string(),
            self.rng.gen_range(1..=10).to_string(),
            price.to_string(),
            amenities.join(","),
            author_name,
            author_email,
            format!("{}/avatars/user_{}.jpg", self.avatar_base_url, author_number),
            author_type.to_string(),
            city.coordinates.latitude.to_string(),
            city.coordinates.longitude.to_string(),
            self.rng.gen_range(0..=50).to_string(),
        ];

        GeneratedOffer {
            city,
            housing_type,
            is_premium,
            price,
            fields,
        }
    }

    fn pick_housing_type(&mut self) -> HousingType {
        HousingType::ALL
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(HousingType::Apartment)
    }

    fn random_date(&mut self) -> NaiveDate {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default();
        let today = Utc::now().date_naive();
        let span = (today - start).num_days().max(0);
        start + Duration::days(self.rng.gen_range(0..=span))
    }
}

/// Render offers as a TSV document with the standard header.
pub fn to_tsv(offers: &[GeneratedOffer]) -> String {
    let mut lines = Vec::with_capacity(offers.len() + 1);
    lines.push(TSV_COLUMNS.join("\t"));
    lines.extend(offers.iter().map(|offer| offer.fields.join("\t")));
    lines.join("\n")
}

pub fn write_tsv(path: &Path, offers: &[GeneratedOffer]) -> io::Result<()> {
    fs::write(path, to_tsv(offers))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::{Importer, TsvDocument, parse_row};
    use crate::store::MemoryStore;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn generator() -> OfferGenerator<StdRng> {
        OfferGenerator::new(StdRng::seed_from_u64(7), "http://localhost:3123/")
    }

    #[test]
    fn generated_rows_parse_cleanly() {
        let offers = generator().generate(50);
        let document = TsvDocument::parse(&to_tsv(&offers)).expect("document");
        assert_eq!(document.rows().len(), 50);

        for (row, offer) in document.rows().iter().zip(&offers) {
            let record = parse_row(document.header(), &row.values).expect("generated row parses");
            assert_eq!(record.city, offer.city.name);
            assert_eq!(record.coordinates, offer.city.coordinates);
            assert_eq!(record.images.len(), 6);
            assert!((3.5..=5.0).contains(&record.rating));
            assert!((1..=8).contains(&record.bedrooms));
            assert!((1..=10).contains(&record.guests));
            assert!((50..=300).contains(&record.price));
            assert!((0..=50).contains(&record.comment_count));
            assert!(record.author_email.ends_with("@example.com"));
        }
    }

    #[tokio::test]
    async fn generated_file_imports_without_skips() {
        let offers = generator().generate(40);
        let file = tempfile::NamedTempFile::new().expect("temp file");
        write_tsv(file.path(), &offers).expect("write tsv");

        let mut importer = Importer::new(MemoryStore::new());
        let stats = importer.import_file(file.path()).await.expect("import");

        assert_eq!(stats.skipped, 0);
        assert_eq!(stats.imported, 40);
        assert_eq!(importer.store().offers().len(), 40);
    }

    #[test]
    fn amenities_are_unique_per_offer() {
        for offer in generator().generate(100) {
            let amenities: Vec<&str> = offer.fields()[13].split(',').collect();
            let mut deduped = amenities.clone();
            deduped.sort_unstable();
            deduped.dedup();
            assert_eq!(deduped.len(), amenities.len());
            assert!(!amenities.is_empty());
        }
    }

    #[test]
    fn avatar_urls_use_base_without_double_slash() {
        let offers = generator().generate(1);
        assert!(offers[0].fields()[16].starts_with("http://localhost:3123/avatars/user_"));
    }
}
