//! Pricing
//!
//! Area-based quoting for customised items. Surface and total are derived
//! values: callers re-quote whenever an input changes instead of patching
//! cached fields.

use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use thiserror::Error;

use crate::customization::Customization;

/// Errors that can occur while quoting a customised item.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PricingError {
    /// Width or height was zero or negative.
    #[error("dimensions must be positive, got {width_cm}cm x {height_cm}cm")]
    InvalidDimension {
        /// Requested width in centimetres.
        width_cm: Decimal,

        /// Requested height in centimetres.
        height_cm: Decimal,
    },

    /// Quantity must be at least 1.
    #[error("quantity must be at least 1")]
    InvalidQuantity,

    /// The per-square-metre rate was zero or negative.
    #[error("price per square metre must be positive, got {0}")]
    InvalidRate(Decimal),
}

/// A priced customization: surface in square metres plus the total price in
/// the currency of the supplied rate.
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    /// Total surface across all units, in square metres.
    pub surface: Decimal,

    /// Total price for the quoted quantity.
    pub total: Money<'static, Currency>,
}

/// Quotes a customization: `surface = (width/100) * (height/100) * quantity`,
/// `total = surface * price_per_sqm`.
///
/// # Errors
///
/// - [`PricingError::InvalidDimension`]: width or height is zero or negative.
/// - [`PricingError::InvalidQuantity`]: quantity is zero.
/// - [`PricingError::InvalidRate`]: the per-square-metre rate is zero or negative.
pub fn quote(
    customization: &Customization,
    quantity: u32,
    price_per_sqm: &Money<'static, Currency>,
) -> Result<Quote, PricingError> {
    let width_cm = customization.width_cm();
    let height_cm = customization.height_cm();

    if width_cm <= Decimal::ZERO || height_cm <= Decimal::ZERO {
        return Err(PricingError::InvalidDimension {
            width_cm,
            height_cm,
        });
    }

    if quantity < 1 {
        return Err(PricingError::InvalidQuantity);
    }

    let rate = *price_per_sqm.amount();

    if rate <= Decimal::ZERO {
        return Err(PricingError::InvalidRate(rate));
    }

    let surface = width_cm / Decimal::ONE_HUNDRED
        * (height_cm / Decimal::ONE_HUNDRED)
        * Decimal::from(quantity);

    Ok(Quote {
        surface,
        total: Money::from_decimal(surface * rate, price_per_sqm.currency()),
    })
}
