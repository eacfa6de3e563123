//! Import statistics tracking.

use crate::models::Offer;
use std::collections::BTreeMap;

/// Outcome counts for one import run.
///
/// `imported + skipped` always equals the number of data rows processed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportStats {
    /// Rows that produced an offer
    pub imported: usize,
    /// Rows dropped because of a row-scoped failure
    pub skipped: usize,
    /// Cities inserted during the run
    pub cities_created: usize,
    /// Users inserted during the run
    pub users_created: usize,
}

impl ImportStats {
    pub fn total(&self) -> usize {
        self.imported + self.skipped
    }
}

/// Aggregate view over a set of offers, printed after dry runs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OfferSummary {
    pub offers: usize,
    pub premium: usize,
    pub average_price: f64,
    pub average_rating: f64,
    pub per_city: BTreeMap<String, usize>,
}

impl OfferSummary {
    pub fn from_offers(offers: &[Offer]) -> Self {
        if offers.is_empty() {
            return Self::default();
        }

        let count = offers.len() as f64;
        let mut per_city = BTreeMap::new();
        for offer in offers {
            *per_city.entry(offer.city.clone()).or_insert(0) += 1;
        }

        Self {
            offers: offers.len(),
            premium: offers.iter().filter(|offer| offer.is_premium).count(),
            average_price: offers.iter().map(|offer| f64::from(offer.price)).sum::<f64>() / count,
            average_rating: offers.iter().map(|offer| offer.rating).sum::<f64>() / count,
            per_city,
        }
    }
}
