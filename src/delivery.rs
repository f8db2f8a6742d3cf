//! Delivery zones
//!
//! Countries and cities gating whether checkout is offered and what fee
//! applies. Country names are unique case-insensitively across the store;
//! city names are unique case-insensitively within their country, so two
//! countries may both have a "Victoria".

use rusty_money::{Money, iso::Currency};
use slotmap::{SlotMap, new_key_type};
use thiserror::Error;
use tracing::info;

new_key_type! {
    /// Country key
    pub struct CountryKey;
}

new_key_type! {
    /// City key
    pub struct CityKey;
}

/// Errors returned by delivery-zone mutations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DeliveryError {
    /// Another country already uses this name, compared case-insensitively.
    #[error("a country named {0:?} already exists")]
    DuplicateCountryName(String),

    /// Another city in the same country already uses this name.
    #[error("a city named {city:?} already exists in {country:?}")]
    DuplicateCityName {
        /// The colliding city name.
        city: String,

        /// Name of the owning country.
        country: String,
    },

    /// The country does not exist.
    #[error("country not found")]
    CountryNotFound,

    /// The city does not exist.
    #[error("city not found")]
    CityNotFound,

    /// The country still owns active cities and cannot be deleted.
    #[error("country {country:?} still has {active} active city(ies)")]
    HasActiveCities {
        /// Name of the country that was to be deleted.
        country: String,

        /// Number of active cities still referencing it.
        active: usize,
    },

    /// Delivery fees cannot be negative.
    #[error("delivery fee cannot be negative")]
    NegativeFee,
}

/// A country offered at checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Country {
    /// Display name, unique case-insensitively.
    pub name: String,

    /// Inactive countries are hidden from checkout and fee resolution.
    pub is_active: bool,
}

impl Country {
    /// Creates an active country.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_active: true,
        }
    }
}

/// A deliverable city within a country.
#[derive(Debug, Clone, PartialEq)]
pub struct City {
    /// Owning country.
    pub country: CountryKey,

    /// Display name, unique case-insensitively within the country.
    pub name: String,

    /// Base-currency delivery fee; never negative.
    pub delivery_fee: Money<'static, Currency>,

    /// Free-text delivery estimate shown at checkout.
    pub estimated_time: Option<String>,

    /// Inactive cities are hidden from checkout and fee resolution.
    pub is_active: bool,
}

/// In-memory store of countries and their cities.
#[derive(Debug, Default)]
pub struct DeliveryZones {
    countries: SlotMap<CountryKey, Country>,
    cities: SlotMap<CityKey, City>,
}

impl DeliveryZones {
    /// Creates an empty zone store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a country.
    ///
    /// # Errors
    ///
    /// Returns [`DeliveryError::DuplicateCountryName`] when another country
    /// already uses the name, compared case-insensitively.
    pub fn add_country(&mut self, country: Country) -> Result<CountryKey, DeliveryError> {
        if self
            .countries
            .values()
            .any(|existing| same_name(&existing.name, &country.name))
        {
            return Err(DeliveryError::DuplicateCountryName(country.name));
        }

        info!(name = %country.name, "delivery country added");

        Ok(self.countries.insert(country))
    }

    /// Replaces a country, enforcing name uniqueness against all others.
    ///
    /// # Errors
    ///
    /// - [`DeliveryError::CountryNotFound`]: the key is unknown.
    /// - [`DeliveryError::DuplicateCountryName`]: another country uses the name.
    pub fn update_country(
        &mut self,
        key: CountryKey,
        country: Country,
    ) -> Result<(), DeliveryError> {
        if !self.countries.contains_key(key) {
            return Err(DeliveryError::CountryNotFound);
        }

        if self
            .countries
            .iter()
            .any(|(other, existing)| other != key && same_name(&existing.name, &country.name))
        {
            return Err(DeliveryError::DuplicateCountryName(country.name));
        }

        if let Some(slot) = self.countries.get_mut(key) {
            *slot = country;
        }

        Ok(())
    }

    /// Deletes a country and its remaining (inactive) cities.
    ///
    /// # Errors
    ///
    /// - [`DeliveryError::CountryNotFound`]: the key is unknown.
    /// - [`DeliveryError::HasActiveCities`]: the country still owns at least
    ///   one active city.
    pub fn delete_country(&mut self, key: CountryKey) -> Result<Country, DeliveryError> {
        let name = self
            .countries
            .get(key)
            .map(|country| country.name.clone())
            .ok_or(DeliveryError::CountryNotFound)?;

        let active = self
            .cities
            .values()
            .filter(|city| city.country == key && city.is_active)
            .count();

        if active > 0 {
            return Err(DeliveryError::HasActiveCities {
                country: name,
                active,
            });
        }

        self.cities.retain(|_, city| city.country != key);

        info!(name = %name, "delivery country deleted");

        self.countries
            .remove(key)
            .ok_or(DeliveryError::CountryNotFound)
    }

    /// Adds a city to an existing country.
    ///
    /// # Errors
    ///
    /// - [`DeliveryError::CountryNotFound`]: the owning country is unknown.
    /// - [`DeliveryError::DuplicateCityName`]: another city in the same
    ///   country uses the name, compared case-insensitively.
    /// - [`DeliveryError::NegativeFee`]: the delivery fee is negative.
    pub fn add_city(&mut self, city: City) -> Result<CityKey, DeliveryError> {
        self.validate_city(&city, None)?;

        info!(name = %city.name, "delivery city added");

        Ok(self.cities.insert(city))
    }

    /// Replaces a city.
    ///
    /// # Errors
    ///
    /// - [`DeliveryError::CityNotFound`]: the key is unknown.
    /// - [`DeliveryError::CountryNotFound`] /
    ///   [`DeliveryError::DuplicateCityName`] /
    ///   [`DeliveryError::NegativeFee`]: the replacement fails validation.
    pub fn update_city(&mut self, key: CityKey, city: City) -> Result<(), DeliveryError> {
        if !self.cities.contains_key(key) {
            return Err(DeliveryError::CityNotFound);
        }

        self.validate_city(&city, Some(key))?;

        if let Some(slot) = self.cities.get_mut(key) {
            *slot = city;
        }

        Ok(())
    }

    /// Deletes a city unconditionally.
    ///
    /// # Errors
    ///
    /// Returns [`DeliveryError::CityNotFound`] when the key is unknown.
    pub fn delete_city(&mut self, key: CityKey) -> Result<City, DeliveryError> {
        self.cities.remove(key).ok_or(DeliveryError::CityNotFound)
    }

    /// Resolves the delivery fee for an exact country/city name pair.
    ///
    /// Only active countries and active cities participate; `None` means no
    /// delivery is offered for the selection.
    #[must_use]
    pub fn resolve_fee(&self, country: &str, city: &str) -> Option<Money<'static, Currency>> {
        let (country_key, _) = self
            .countries
            .iter()
            .find(|(_, candidate)| candidate.is_active && candidate.name == country)?;

        self.cities
            .values()
            .find(|candidate| {
                candidate.country == country_key && candidate.is_active && candidate.name == city
            })
            .map(|candidate| candidate.delivery_fee)
    }

    /// Looks up a country.
    #[must_use]
    pub fn country(&self, key: CountryKey) -> Option<&Country> {
        self.countries.get(key)
    }

    /// Iterates over all countries.
    pub fn countries(&self) -> impl Iterator<Item = (CountryKey, &Country)> {
        self.countries.iter()
    }

    /// Iterates over the countries offered at checkout.
    pub fn active_countries(&self) -> impl Iterator<Item = (CountryKey, &Country)> {
        self.countries.iter().filter(|(_, country)| country.is_active)
    }

    /// Looks up a city.
    #[must_use]
    pub fn city(&self, key: CityKey) -> Option<&City> {
        self.cities.get(key)
    }

    /// Iterates over the cities owned by a country.
    pub fn cities_of(&self, country: CountryKey) -> impl Iterator<Item = (CityKey, &City)> {
        self.cities
            .iter()
            .filter(move |(_, city)| city.country == country)
    }

    fn validate_city(&self, city: &City, skip: Option<CityKey>) -> Result<(), DeliveryError> {
        let country = self
            .countries
            .get(city.country)
            .ok_or(DeliveryError::CountryNotFound)?;

        if *city.delivery_fee.amount() < rust_decimal::Decimal::ZERO {
            return Err(DeliveryError::NegativeFee);
        }

        let collision = self.cities.iter().any(|(key, existing)| {
            Some(key) != skip
                && existing.country == city.country
                && same_name(&existing.name, &city.name)
        });

        if collision {
            return Err(DeliveryError::DuplicateCityName {
                city: city.name.clone(),
                country: country.name.clone(),
            });
        }

        Ok(())
    }
}

fn same_name(left: &str, right: &str) -> bool {
    left.to_lowercase() == right.to_lowercase()
}

#[cfg(test)]
mod tests {
    use rusty_money::{Money, iso::MAD};
    use testresult::TestResult;

    use super::*;

    fn city(country: CountryKey, name: &str, fee_minor: i64) -> City {
        City {
            country,
            name: name.into(),
            delivery_fee: Money::from_minor(fee_minor, MAD),
            estimated_time: Some("24-48h".into()),
            is_active: true,
        }
    }

    #[test]
    fn duplicate_country_name_is_rejected_case_insensitively() -> TestResult {
        let mut zones = DeliveryZones::new();
        zones.add_country(Country::named("Maroc"))?;

        let result = zones.add_country(Country::named("MAROC"));

        assert!(matches!(
            result,
            Err(DeliveryError::DuplicateCountryName(_))
        ));

        Ok(())
    }

    #[test]
    fn city_names_are_unique_within_a_country_only() -> TestResult {
        let mut zones = DeliveryZones::new();
        let morocco = zones.add_country(Country::named("Maroc"))?;
        let france = zones.add_country(Country::named("France"))?;

        zones.add_city(city(morocco, "Victoria", 1500))?;

        // Same name in another country is fine.
        zones.add_city(city(france, "Victoria", 2500))?;

        // Same name in the same country is not, regardless of case.
        let result = zones.add_city(city(morocco, "VICTORIA", 1500));
        assert!(matches!(
            result,
            Err(DeliveryError::DuplicateCityName { .. })
        ));

        Ok(())
    }

    #[test]
    fn country_with_active_city_cannot_be_deleted() -> TestResult {
        let mut zones = DeliveryZones::new();
        let morocco = zones.add_country(Country::named("Maroc"))?;
        let casa = zones.add_city(city(morocco, "Casablanca", 1500))?;

        let blocked = zones.delete_country(morocco);
        assert!(matches!(
            blocked,
            Err(DeliveryError::HasActiveCities { active: 1, .. })
        ));

        let mut deactivated = zones.city(casa).ok_or("city missing")?.clone();
        deactivated.is_active = false;
        zones.update_city(casa, deactivated)?;

        zones.delete_country(morocco)?;

        assert!(zones.country(morocco).is_none());
        assert!(zones.city(casa).is_none());

        Ok(())
    }

    #[test]
    fn resolve_fee_finds_active_pairs_only() -> TestResult {
        let mut zones = DeliveryZones::new();
        let morocco = zones.add_country(Country::named("Maroc"))?;
        let casa = zones.add_city(city(morocco, "Casablanca", 1500))?;

        assert_eq!(
            zones.resolve_fee("Maroc", "Casablanca"),
            Some(Money::from_minor(1500, MAD))
        );
        assert_eq!(zones.resolve_fee("Maroc", "Rabat"), None);
        assert_eq!(zones.resolve_fee("Espagne", "Madrid"), None);

        let mut inactive_city = zones.city(casa).ok_or("city missing")?.clone();
        inactive_city.is_active = false;
        zones.update_city(casa, inactive_city)?;
        assert_eq!(zones.resolve_fee("Maroc", "Casablanca"), None);

        let mut reactivated = zones.city(casa).ok_or("city missing")?.clone();
        reactivated.is_active = true;
        zones.update_city(casa, reactivated)?;
        let mut inactive_country = zones.country(morocco).ok_or("country missing")?.clone();
        inactive_country.is_active = false;
        zones.update_country(morocco, inactive_country)?;
        assert_eq!(zones.resolve_fee("Maroc", "Casablanca"), None);

        Ok(())
    }

    #[test]
    fn delete_city_is_unconditional() -> TestResult {
        let mut zones = DeliveryZones::new();
        let morocco = zones.add_country(Country::named("Maroc"))?;
        let casa = zones.add_city(city(morocco, "Casablanca", 1500))?;

        // An active city blocks country deletion, yet deletes freely itself.
        let removed = zones.delete_city(casa)?;

        assert_eq!(removed.name, "Casablanca");
        assert!(zones.city(casa).is_none());
        assert_eq!(zones.resolve_fee("Maroc", "Casablanca"), None);

        let result = zones.delete_city(casa);
        assert!(matches!(result, Err(DeliveryError::CityNotFound)));

        Ok(())
    }

    #[test]
    fn negative_fee_is_rejected() -> TestResult {
        let mut zones = DeliveryZones::new();
        let morocco = zones.add_country(Country::named("Maroc"))?;

        let result = zones.add_city(city(morocco, "Casablanca", -100));

        assert!(matches!(result, Err(DeliveryError::NegativeFee)));

        Ok(())
    }

    #[test]
    fn city_requires_existing_country() {
        let mut zones = DeliveryZones::new();

        let result = zones.add_city(city(CountryKey::default(), "Casablanca", 1500));

        assert!(matches!(result, Err(DeliveryError::CountryNotFound)));
    }
}
