//! Query parameter helpers shared by the listing routes.

pub const DEFAULT_OFFER_LIMIT: i64 = 60;
pub const MAX_OFFER_LIMIT: i64 = 100;

/// Clamp a requested page size into `1..=MAX_OFFER_LIMIT`.
pub fn offer_limit(requested: Option<i64>) -> i64 {
    requested
        .unwrap_or(DEFAULT_OFFER_LIMIT)
        .clamp(1, MAX_OFFER_LIMIT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_offer_limit() {
        assert_eq!(offer_limit(None), 60);
        assert_eq!(offer_limit(Some(0)), 1);
        assert_eq!(offer_limit(Some(-5)), 1);
        assert_eq!(offer_limit(Some(25)), 25);
        assert_eq!(offer_limit(Some(1_000)), 100);
    }
}
