//! Product review domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use markethub_core::{ProductId, ReviewId, UserId};

/// A customer review, joined with the reviewer's name for display.
#[derive(Debug, Clone)]
pub struct Review {
    pub id: ReviewId,
    pub product_id: ProductId,
    pub user_id: UserId,
    pub reviewer_name: String,
    /// Star rating, 1-5.
    pub rating: i16,
    pub title: Option<String>,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// Aggregate rating for a product.
#[derive(Debug, Clone, Default)]
pub struct RatingSummary {
    /// Average rating, absent when the product has no reviews.
    pub average: Option<Decimal>,
    pub count: i64,
}

impl RatingSummary {
    /// Average formatted to one decimal place (e.g., "4.3"), or "-".
    #[must_use]
    pub fn average_display(&self) -> String {
        self.average
            .map_or_else(|| "-".to_owned(), |avg| format!("{avg:.1}"))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_average_display() {
        let summary = RatingSummary {
            average: Some(Decimal::new(43, 1)),
            count: 7,
        };
        assert_eq!(summary.average_display(), "4.3");
    }

    #[test]
    fn test_average_display_empty() {
        assert_eq!(RatingSummary::default().average_display(), "-");
    }
}
