//! Row parsing for the offer TSV format.
//!
//! A row is zipped positionally against the header; fields the row does not
//! reach read as empty strings. The parser is a pure transform and never
//! touches the store.
//!
//! # Field rules
//!
//! - `city` must name one of [`SUPPORTED_CITIES`].
//! - `images` and `amenities` are comma-separated; tokens are trimmed and
//!   empty tokens dropped. Only the first [`MAX_IMAGES`] images are kept.
//! - `isPremium` / `isFavorite` are true only for the exact string `"true"`.
//! - `rating`, `bedrooms`, `guests`, `price` and `commentCount` must be
//!   numeric. An empty `commentCount` means 0.
//! - `date` is `YYYY-MM-DD` or an RFC 3339 timestamp.
//! - `latitude` / `longitude` override the city table only when they hold a
//!   non-zero number.

use crate::import::error::RowError;
use crate::models::{Coordinates, HousingType, UserType};
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::HashMap;

pub const MAX_IMAGES: usize = 6;

/// Column names of the offer TSV format, in the order the generator writes them.
pub const TSV_COLUMNS: [&str; 21] = [
    "title",
    "description",
    "date",
    "city",
    "preview",
    "images",
    "isPremium",
    "isFavorite",
    "rating",
    "type",
    "bedrooms",
    "guests",
    "price",
    "amenities",
    "authorName",
    "authorEmail",
    "authorAvatar",
    "authorType",
    "latitude",
    "longitude",
    "commentCount",
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SupportedCity {
    pub name: &'static str,
    pub coordinates: Coordinates,
}

pub static SUPPORTED_CITIES: [SupportedCity; 6] = [
    SupportedCity {
        name: "Paris",
        coordinates: Coordinates {
            latitude: 48.85661,
            longitude: 2.351499,
        },
    },
    SupportedCity {
        name: "Cologne",
        coordinates: Coordinates {
            latitude: 50.938361,
            longitude: 6.959974,
        },
    },
    SupportedCity {
        name: "Brussels",
        coordinates: Coordinates {
            latitude: 50.846557,
            longitude: 4.351697,
        },
    },
    SupportedCity {
        name: "Amsterdam",
        coordinates: Coordinates {
            latitude: 52.370216,
            longitude: 4.895168,
        },
    },
    SupportedCity {
        name: "Hamburg",
        coordinates: Coordinates {
            latitude: 53.550341,
            longitude: 10.000654,
        },
    },
    SupportedCity {
        name: "Dusseldorf",
        coordinates: Coordinates {
            latitude: 51.225402,
            longitude: 6.776314,
        },
    },
];

/// Exact, case-sensitive lookup in the supported city table.
pub fn find_supported_city(name: &str) -> Option<&'static SupportedCity> {
    SUPPORTED_CITIES.iter().find(|city| city.name == name)
}

/// A fully typed offer row, ready for entity resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct OfferRecord {
    pub title: String,
    pub description: String,
    pub date: DateTime<Utc>,
    pub city: String,
    pub preview: String,
    pub images: Vec<String>,
    pub is_premium: bool,
    pub is_favorite: bool,
    pub rating: f64,
    pub housing_type: HousingType,
    pub bedrooms: i32,
    pub guests: i32,
    pub price: i32,
    pub amenities: Vec<String>,
    pub author_name: String,
    pub author_email: String,
    pub author_avatar: Option<String>,
    pub author_type: UserType,
    pub coordinates: Coordinates,
    pub comment_count: i32,
}

/// Parse one data row against the header.
pub fn parse_row(header: &[String], values: &[String]) -> Result<OfferRecord, RowError> {
    let fields: HashMap<&str, &str> = header
        .iter()
        .enumerate()
        .map(|(index, name)| {
            let value = values.get(index).map(String::as_str).unwrap_or("");
            (name.as_str(), value)
        })
        .collect();
    let field = |name: &str| fields.get(name).copied().unwrap_or("");

    let city_name = field("city");
    let city = find_supported_city(city_name)
        .ok_or_else(|| RowError::UnknownCity(city_name.to_string()))?;

    let mut images = split_list(field("images"));
    images.truncate(MAX_IMAGES);

    let housing_type = field("type")
        .parse::<HousingType>()
        .map_err(|_| RowError::parse("type", field("type"), "expected apartment, house, room or hotel"))?;

    let author_type = match field("authorType") {
        "" => UserType::Normal,
        raw => raw
            .parse::<UserType>()
            .map_err(|_| RowError::parse("authorType", raw, "expected pro or normal"))?,
    };

    let comment_count = match field("commentCount") {
        "" => 0,
        raw => parse_int("commentCount", raw)?,
    };

    let author_avatar = match field("authorAvatar") {
        "" => None,
        raw => Some(raw.to_string()),
    };

    Ok(OfferRecord {
        title: field("title").to_string(),
        description: field("description").to_string(),
        date: parse_date(field("date"))?,
        city: city.name.to_string(),
        preview: field("preview").to_string(),
        images,
        is_premium: parse_flag(field("isPremium")),
        is_favorite: parse_flag(field("isFavorite")),
        rating: parse_float("rating", field("rating"))?,
        housing_type,
        bedrooms: parse_int("bedrooms", field("bedrooms"))?,
        guests: parse_int("guests", field("guests"))?,
        price: parse_int("price", field("price"))?,
        amenities: split_list(field("amenities")),
        author_name: field("authorName").to_string(),
        author_email: field("authorEmail").to_string(),
        author_avatar,
        author_type,
        coordinates: Coordinates {
            latitude: coordinate_or(field("latitude"), city.coordinates.latitude),
            longitude: coordinate_or(field("longitude"), city.coordinates.longitude),
        },
        comment_count,
    })
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// Only the exact lowercase string `true` counts; `True` and `1` are false.
fn parse_flag(raw: &str) -> bool {
    raw == "true"
}

fn parse_int(field: &'static str, raw: &str) -> Result<i32, RowError> {
    raw.trim()
        .parse::<i32>()
        .map_err(|err| RowError::parse(field, raw, err.to_string()))
}

fn parse_float(field: &'static str, raw: &str) -> Result<f64, RowError> {
    let value = raw
        .trim()
        .parse::<f64>()
        .map_err(|err| RowError::parse(field, raw, err.to_string()))?;

    if value.is_finite() {
        Ok(value)
    } else {
        Err(RowError::parse(field, raw, "not a finite number"))
    }
}

fn parse_date(raw: &str) -> Result<DateTime<Utc>, RowError> {
    let trimmed = raw.trim();

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc());
        }
    }

    DateTime::parse_from_rfc3339(trimmed)
        .map(|date| date.with_timezone(&Utc))
        .map_err(|_| RowError::parse("date", raw, "expected YYYY-MM-DD or RFC 3339"))
}

fn coordinate_or(raw: &str, fallback: f64) -> f64 {
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() && value != 0.0 => value,
        _ => fallback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header() -> Vec<String> {
        TSV_COLUMNS.iter().map(|column| column.to_string()).collect()
    }

    fn row(overrides: &[(&str, &str)]) -> Vec<String> {
        TSV_COLUMNS
            .iter()
            .map(|column| {
                if let Some((_, value)) = overrides.iter().find(|(name, _)| name == column) {
                    return value.to_string();
                }
                let default = match *column {
                    "title" => "Canal house",
                    "description" => "Quiet street near the canals.",
                    "date" => "2024-05-17",
                    "city" => "Amsterdam",
                    "preview" => "preview.jpg",
                    "images" => "1.jpg,2.jpg",
                    "isPremium" => "false",
                    "isFavorite" => "false",
                    "rating" => "4.1",
                    "type" => "house",
                    "bedrooms" => "3",
                    "guests" => "5",
                    "price" => "180",
                    "amenities" => "Washer, Towels",
                    "authorName" => "Anna",
                    "authorEmail" => "anna@example.com",
                    "authorAvatar" => "",
                    "authorType" => "pro",
                    "latitude" => "",
                    "longitude" => "",
                    "commentCount" => "7",
                    _ => "",
                };
                default.to_string()
            })
            .collect()
    }

    #[test]
    fn parses_paris_row() {
        let values = row(&[
            ("city", "Paris"),
            ("rating", "4.5"),
            ("isPremium", "true"),
            ("images", "a.jpg,b.jpg"),
        ]);

        let record = parse_row(&header(), &values).expect("row parses");

        assert_eq!(record.city, "Paris");
        assert_eq!(
            record.coordinates,
            Coordinates {
                latitude: 48.85661,
                longitude: 2.351499
            }
        );
        assert_eq!(record.rating, 4.5);
        assert!(record.is_premium);
        assert_eq!(record.images, ["a.jpg", "b.jpg"]);
        assert_eq!(record.housing_type, HousingType::House);
        assert_eq!(record.author_type, UserType::Pro);
        assert_eq!(record.author_avatar, None);
        assert_eq!(record.comment_count, 7);
        assert_eq!(record.amenities, ["Washer", "Towels"]);
        assert_eq!(record.date.format("%Y-%m-%d").to_string(), "2024-05-17");
    }

    #[test]
    fn rejects_unsupported_city() {
        let err = parse_row(&header(), &row(&[("city", "Berlin")])).unwrap_err();
        assert!(matches!(err, RowError::UnknownCity(name) if name == "Berlin"));
    }

    #[test]
    fn city_lookup_is_case_sensitive() {
        let err = parse_row(&header(), &row(&[("city", "paris")])).unwrap_err();
        assert!(matches!(err, RowError::UnknownCity(_)));
    }

    #[test]
    fn truncates_images_to_first_six() {
        let values = row(&[("images", "1.jpg, 2.jpg,,3.jpg,4.jpg,5.jpg,6.jpg,7.jpg,8.jpg")]);
        let record = parse_row(&header(), &values).expect("row parses");
        assert_eq!(
            record.images,
            ["1.jpg", "2.jpg", "3.jpg", "4.jpg", "5.jpg", "6.jpg"]
        );
    }

    #[test]
    fn keeps_duplicate_amenities() {
        let values = row(&[("amenities", "Fridge,Fridge, ,Towels")]);
        let record = parse_row(&header(), &values).expect("row parses");
        assert_eq!(record.amenities, ["Fridge", "Fridge", "Towels"]);
    }

    #[test]
    fn flags_require_exact_lowercase_true() {
        for raw in ["True", "TRUE", "1", "yes", ""] {
            let values = row(&[("isPremium", raw), ("isFavorite", raw)]);
            let record = parse_row(&header(), &values).expect("row parses");
            assert!(!record.is_premium, "{raw:?} must not be premium");
            assert!(!record.is_favorite, "{raw:?} must not be favorite");
        }

        let record = parse_row(&header(), &row(&[("isFavorite", "true")])).expect("row parses");
        assert!(record.is_favorite);
    }

    #[test]
    fn non_numeric_fields_fail_the_row() {
        for (field, raw) in [
            ("rating", "great"),
            ("rating", "NaN"),
            ("bedrooms", "two"),
            ("guests", "4.5"),
            ("price", ""),
            ("commentCount", "many"),
        ] {
            let err = parse_row(&header(), &row(&[(field, raw)])).unwrap_err();
            assert!(
                matches!(&err, RowError::Parse { field: failed, .. } if *failed == field),
                "{field}={raw:?} produced {err:?}"
            );
        }
    }

    #[test]
    fn comment_count_defaults_to_zero() {
        let record = parse_row(&header(), &row(&[("commentCount", "")])).expect("row parses");
        assert_eq!(record.comment_count, 0);

        let short_header: Vec<String> = header()
            .into_iter()
            .filter(|column| column != "commentCount")
            .collect();
        let short_row: Vec<String> = row(&[])[..short_header.len()].to_vec();
        let record = parse_row(&short_header, &short_row).expect("row parses");
        assert_eq!(record.comment_count, 0);
    }

    #[test]
    fn missing_trailing_values_read_as_empty() {
        let mut values = row(&[]);
        values.truncate(TSV_COLUMNS.len() - 4);

        let record = parse_row(&header(), &values).expect("row parses");
        assert_eq!(record.author_type, UserType::Normal);
        assert_eq!(record.comment_count, 0);
        assert_eq!(record.coordinates, find_supported_city("Amsterdam").unwrap().coordinates);
    }

    #[test]
    fn explicit_coordinates_override_the_city_table() {
        let values = row(&[("latitude", "52.3"), ("longitude", "0")]);
        let record = parse_row(&header(), &values).expect("row parses");
        assert_eq!(record.coordinates.latitude, 52.3);
        assert_eq!(record.coordinates.longitude, 4.895168);
    }

    #[test]
    fn rejects_unknown_housing_and_author_types() {
        let err = parse_row(&header(), &row(&[("type", "castle")])).unwrap_err();
        assert!(matches!(err, RowError::Parse { field: "type", .. }));

        let err = parse_row(&header(), &row(&[("authorType", "admin")])).unwrap_err();
        assert!(matches!(err, RowError::Parse { field: "authorType", .. }));
    }

    #[test]
    fn accepts_rfc3339_dates_and_rejects_garbage() {
        let record = parse_row(&header(), &row(&[("date", "2024-03-01T10:30:00+02:00")]))
            .expect("row parses");
        assert_eq!(record.date.to_rfc3339(), "2024-03-01T08:30:00+00:00");

        let err = parse_row(&header(), &row(&[("date", "yesterday")])).unwrap_err();
        assert!(matches!(err, RowError::Parse { field: "date", .. }));
    }

    #[test]
    fn empty_avatar_is_absent() {
        let record = parse_row(&header(), &row(&[("authorAvatar", "https://a.example/1.jpg")]))
            .expect("row parses");
        assert_eq!(record.author_avatar.as_deref(), Some("https://a.example/1.jpg"));
    }
}
