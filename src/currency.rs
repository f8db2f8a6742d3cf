//! Currency conversion
//!
//! All stored amounts are held in a single base currency; conversion into a
//! display currency happens at render or invoice time through an
//! admin-maintained rate table.

use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use rusty_money::{Money, iso::Currency};
use thiserror::Error;
use tracing::debug;

/// Errors returned by rate-table mutations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RateError {
    /// A conversion rate must be positive.
    #[error("conversion rate must be positive, got {0}")]
    InvalidRate(Decimal),
}

/// Conversion rates from the base currency, keyed by ISO alpha code.
///
/// Each rate is the number of target units per one unit of the base currency.
/// A missing entry falls back to a rate of 1, so a currency whose rate the
/// admin has not configured yet renders base-currency amounts instead of
/// breaking checkout.
#[derive(Debug)]
pub struct RateTable {
    base: &'static Currency,
    rates: FxHashMap<&'static str, Decimal>,
}

impl RateTable {
    /// Creates an empty rate table over the given base currency.
    #[must_use]
    pub fn new(base: &'static Currency) -> Self {
        Self {
            base,
            rates: FxHashMap::default(),
        }
    }

    /// The base currency all stored amounts are denominated in.
    #[must_use]
    pub fn base(&self) -> &'static Currency {
        self.base
    }

    /// Sets the rate for one currency, replacing any previous value for that
    /// currency and leaving all others untouched.
    ///
    /// # Errors
    ///
    /// Returns [`RateError::InvalidRate`] if the rate is zero or negative.
    pub fn set_rate(
        &mut self,
        currency: &'static Currency,
        rate: Decimal,
    ) -> Result<(), RateError> {
        if rate <= Decimal::ZERO {
            return Err(RateError::InvalidRate(rate));
        }

        self.rates.insert(currency.iso_alpha_code, rate);
        debug!(currency = currency.iso_alpha_code, %rate, "conversion rate updated");

        Ok(())
    }

    /// Removes the configured rate for one currency, restoring the fallback.
    pub fn clear_rate(&mut self, currency: &'static Currency) {
        self.rates.remove(currency.iso_alpha_code);
    }

    /// Units of `currency` per one unit of the base currency. The base itself
    /// and any unconfigured currency both resolve to 1.
    #[must_use]
    pub fn rate_for(&self, currency: &'static Currency) -> Decimal {
        if currency == self.base {
            return Decimal::ONE;
        }

        self.rates
            .get(currency.iso_alpha_code)
            .copied()
            .unwrap_or(Decimal::ONE)
    }

    /// Converts a base-currency amount into the target currency. Formatting
    /// and locale are the caller's concern.
    #[must_use]
    pub fn convert(
        &self,
        amount: &Money<'static, Currency>,
        target: &'static Currency,
    ) -> Money<'static, Currency> {
        Money::from_decimal(*amount.amount() * self.rate_for(target), target)
    }
}
