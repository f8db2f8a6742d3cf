//! Fixtures
//!
//! YAML seed data for the storefront: catalog, delivery zones and conversion
//! rates in one document, loaded into ready stores. Used by integration tests
//! and by hosts that want a populated development storefront.

use std::{fs, path::Path};

use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use rusty_money::{Money, iso};
use serde::Deserialize;
use thiserror::Error;

use crate::{
    catalog::{Catalog, CatalogError, Category, CategoryKey, Product, ProductKey},
    currency::{RateError, RateTable},
    delivery::{City, Country, DeliveryError, DeliveryZones},
};

/// Fixture parsing errors.
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading the fixture file.
    #[error("failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error.
    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Unknown ISO currency code.
    #[error("unknown currency code: {0}")]
    UnknownCurrency(String),

    /// A product references a category the document does not declare.
    #[error("product {product:?} references unknown category {category:?}")]
    UnknownCategory {
        /// The product's name.
        product: String,

        /// The missing category name.
        category: String,
    },

    /// Catalog validation error while seeding.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Delivery-zone validation error while seeding.
    #[error(transparent)]
    Delivery(#[from] DeliveryError),

    /// Rate-table validation error while seeding.
    #[error(transparent)]
    Rate(#[from] RateError),
}

#[derive(Debug, Deserialize)]
struct StorefrontFixture {
    base_currency: String,

    #[serde(default)]
    rates: Vec<RateFixture>,

    #[serde(default)]
    categories: Vec<CategoryFixture>,

    #[serde(default)]
    products: Vec<ProductFixture>,

    #[serde(default)]
    countries: Vec<CountryFixture>,
}

#[derive(Debug, Deserialize)]
struct RateFixture {
    currency: String,
    rate: Decimal,
}

#[derive(Debug, Deserialize)]
struct CategoryFixture {
    name: String,
    description: Option<String>,
    image: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProductFixture {
    name: String,
    description: String,
    price_per_sqm: Decimal,
    category: String,

    #[serde(default)]
    tags: Vec<String>,

    #[serde(default)]
    images: Vec<String>,

    #[serde(default)]
    is_new_arrival: bool,

    #[serde(default)]
    is_best_seller: bool,
}

#[derive(Debug, Deserialize)]
struct CountryFixture {
    name: String,

    #[serde(default = "default_true")]
    is_active: bool,

    #[serde(default)]
    cities: Vec<CityFixture>,
}

#[derive(Debug, Deserialize)]
struct CityFixture {
    name: String,
    delivery_fee: Decimal,
    estimated_time: Option<String>,

    #[serde(default = "default_true")]
    is_active: bool,
}

fn default_true() -> bool {
    true
}

/// A fully seeded storefront: catalog, delivery zones and conversion rates,
/// plus name→key maps for fixture lookups.
#[derive(Debug)]
pub struct Storefront {
    /// Seeded product/category store.
    pub catalog: Catalog,

    /// Seeded country/city store.
    pub zones: DeliveryZones,

    /// Seeded conversion rates over the fixture's base currency.
    pub rates: RateTable,

    product_keys: FxHashMap<String, ProductKey>,
    category_keys: FxHashMap<String, CategoryKey>,
}

impl Storefront {
    /// Loads a storefront fixture from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns a [`FixtureError`] when the file cannot be read or parsed, or
    /// when the seeded data fails store validation.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, FixtureError> {
        Self::from_yaml(&fs::read_to_string(path)?)
    }

    /// Loads a storefront fixture from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns a [`FixtureError`] when the document cannot be parsed or the
    /// seeded data fails store validation.
    pub fn from_yaml(contents: &str) -> Result<Self, FixtureError> {
        let fixture: StorefrontFixture = serde_norway::from_str(contents)?;

        let base = iso::find(&fixture.base_currency)
            .ok_or_else(|| FixtureError::UnknownCurrency(fixture.base_currency.clone()))?;

        let mut rates = RateTable::new(base);
        for entry in fixture.rates {
            let currency = iso::find(&entry.currency)
                .ok_or_else(|| FixtureError::UnknownCurrency(entry.currency.clone()))?;
            rates.set_rate(currency, entry.rate)?;
        }

        let mut catalog = Catalog::new();
        let mut category_keys = FxHashMap::default();
        for entry in fixture.categories {
            let name = entry.name.clone();
            let key = catalog.add_category(Category {
                name: entry.name,
                description: entry.description,
                image: entry.image,
            })?;
            category_keys.insert(name, key);
        }

        let mut product_keys = FxHashMap::default();
        for entry in fixture.products {
            let category =
                *category_keys
                    .get(&entry.category)
                    .ok_or_else(|| FixtureError::UnknownCategory {
                        product: entry.name.clone(),
                        category: entry.category.clone(),
                    })?;

            let mut product = Product::new(
                entry.name.clone(),
                entry.description,
                Money::from_decimal(entry.price_per_sqm, base),
                category,
                entry.tags,
            )?;
            product.images = entry.images;
            product.is_new_arrival = entry.is_new_arrival;
            product.is_best_seller = entry.is_best_seller;

            let key = catalog.add_product(product)?;
            product_keys.insert(entry.name, key);
        }

        let mut zones = DeliveryZones::new();
        for entry in fixture.countries {
            let country = zones.add_country(Country {
                name: entry.name,
                is_active: entry.is_active,
            })?;

            for city in entry.cities {
                zones.add_city(City {
                    country,
                    name: city.name,
                    delivery_fee: Money::from_decimal(city.delivery_fee, base),
                    estimated_time: city.estimated_time,
                    is_active: city.is_active,
                })?;
            }
        }

        Ok(Self {
            catalog,
            zones,
            rates,
            product_keys,
            category_keys,
        })
    }

    /// Looks up a seeded product by fixture name.
    #[must_use]
    pub fn product_key(&self, name: &str) -> Option<ProductKey> {
        self.product_keys.get(name).copied()
    }

    /// Looks up a seeded category by fixture name.
    #[must_use]
    pub fn category_key(&self, name: &str) -> Option<CategoryKey> {
        self.category_keys.get(name).copied()
    }
}
