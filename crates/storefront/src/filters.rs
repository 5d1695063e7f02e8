//! Custom Askama template filters and formatting helpers.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

use rust_decimal::Decimal;

use markethub_core::{CurrencyCode, Price};

/// Format a decimal amount as a USD price string (e.g., "$19.99").
///
/// The storefront currently sells in a single currency; everything that
/// renders money goes through here.
#[must_use]
pub fn format_usd(amount: Decimal) -> String {
    Price::new(amount, CurrencyCode::USD).display()
}

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_usd() {
        assert_eq!(format_usd(Decimal::new(1999, 2)), "$19.99");
        assert_eq!(format_usd(Decimal::new(5, 0)), "$5.00");
        assert_eq!(format_usd(Decimal::ZERO), "$0.00");
    }
}
