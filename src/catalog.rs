//! Catalog
//!
//! Products and categories managed through the admin console. Category names
//! are unique case-insensitively; products carry at most
//! [`MAX_PRODUCT_TAGS`] tags and a strictly positive per-square-metre price.

use rusty_money::{Money, iso::Currency};
use slotmap::{SlotMap, new_key_type};
use smallvec::SmallVec;
use thiserror::Error;
use tracing::info;

new_key_type! {
    /// Category key
    pub struct CategoryKey;
}

new_key_type! {
    /// Product key
    pub struct ProductKey;
}

/// Maximum number of tags a product may carry.
pub const MAX_PRODUCT_TAGS: usize = 13;

/// Errors returned by catalog mutations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    /// Another category already uses this name, compared case-insensitively.
    #[error("a category named {0:?} already exists")]
    DuplicateCategoryName(String),

    /// The category does not exist.
    #[error("category not found")]
    CategoryNotFound,

    /// The category is still referenced by at least one product.
    #[error("category {name:?} is still used by {products} product(s)")]
    CategoryInUse {
        /// Name of the category that was to be deleted.
        name: String,

        /// Number of products still referencing it.
        products: usize,
    },

    /// The product does not exist.
    #[error("product not found")]
    ProductNotFound,

    /// The per-square-metre price was zero or negative.
    #[error("price per square metre must be positive")]
    InvalidPrice,

    /// The tag list exceeds [`MAX_PRODUCT_TAGS`] entries.
    #[error("a product may carry at most {MAX_PRODUCT_TAGS} tags, got {0}")]
    TooManyTags(usize),
}

/// Product category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    /// Display name, unique case-insensitively across the catalog.
    pub name: String,

    /// Optional blurb shown on listing pages.
    pub description: Option<String>,

    /// Optional image reference.
    pub image: Option<String>,
}

impl Category {
    /// Creates a category with just a name.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            image: None,
        }
    }
}

/// Reference links and guide copy shown on a product page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductGuides {
    /// Promotional video hosted by the retailer.
    pub product_video_url: Option<String>,

    /// Downloadable technical sheet.
    pub technical_sheet_url: Option<String>,

    /// Downloadable installation guide.
    pub installation_guide_url: Option<String>,

    /// Embedded walkthrough video.
    pub youtube_video_url: Option<String>,

    /// Measuring instructions.
    pub how_to_measure: Option<String>,

    /// Installation instructions.
    pub how_to_install: Option<String>,
}

/// A made-to-order product template.
///
/// Orders and cart items hold a clone of this struct, so later catalog edits
/// never change historical pricing.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    /// Display name.
    pub name: String,

    /// Long-form description.
    pub description: String,

    /// Base-currency price per square metre; always positive.
    pub price_per_sqm: Money<'static, Currency>,

    /// Owning category.
    pub category: CategoryKey,

    /// Search tags, at most [`MAX_PRODUCT_TAGS`].
    pub tags: SmallVec<[String; 8]>,

    /// Image references in display order.
    pub images: Vec<String>,

    /// Shown in the new-arrivals rail.
    pub is_new_arrival: bool,

    /// Shown in the best-sellers rail.
    pub is_best_seller: bool,

    /// Optional links and guide copy.
    pub guides: ProductGuides,
}

impl Product {
    /// Creates a product with empty images and guides.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::InvalidPrice`]: the per-square-metre price is zero or negative.
    /// - [`CatalogError::TooManyTags`]: more than [`MAX_PRODUCT_TAGS`] tags were given.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        price_per_sqm: Money<'static, Currency>,
        category: CategoryKey,
        tags: impl IntoIterator<Item = String>,
    ) -> Result<Self, CatalogError> {
        let product = Self {
            name: name.into(),
            description: description.into(),
            price_per_sqm,
            category,
            tags: tags.into_iter().collect(),
            images: Vec::new(),
            is_new_arrival: false,
            is_best_seller: false,
            guides: ProductGuides::default(),
        };

        product.validate()?;

        Ok(product)
    }

    /// Replaces the tag list, re-checking the cap.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::TooManyTags`] when more than
    /// [`MAX_PRODUCT_TAGS`] tags are given.
    pub fn set_tags(&mut self, tags: impl IntoIterator<Item = String>) -> Result<(), CatalogError> {
        let tags: SmallVec<[String; 8]> = tags.into_iter().collect();

        if tags.len() > MAX_PRODUCT_TAGS {
            return Err(CatalogError::TooManyTags(tags.len()));
        }

        self.tags = tags;

        Ok(())
    }

    fn validate(&self) -> Result<(), CatalogError> {
        if *self.price_per_sqm.amount() <= rust_decimal::Decimal::ZERO {
            return Err(CatalogError::InvalidPrice);
        }

        if self.tags.len() > MAX_PRODUCT_TAGS {
            return Err(CatalogError::TooManyTags(self.tags.len()));
        }

        Ok(())
    }
}

/// In-memory product and category store.
#[derive(Debug, Default)]
pub struct Catalog {
    categories: SlotMap<CategoryKey, Category>,
    products: SlotMap<ProductKey, Product>,
}

impl Catalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a category.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DuplicateCategoryName`] when another category
    /// already uses the name, compared case-insensitively.
    pub fn add_category(&mut self, category: Category) -> Result<CategoryKey, CatalogError> {
        if self
            .categories
            .values()
            .any(|existing| same_name(&existing.name, &category.name))
        {
            return Err(CatalogError::DuplicateCategoryName(category.name));
        }

        info!(name = %category.name, "category added");

        Ok(self.categories.insert(category))
    }

    /// Replaces a category, enforcing name uniqueness against all others.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::CategoryNotFound`]: the key is unknown.
    /// - [`CatalogError::DuplicateCategoryName`]: another category uses the name.
    pub fn update_category(
        &mut self,
        key: CategoryKey,
        category: Category,
    ) -> Result<(), CatalogError> {
        if !self.categories.contains_key(key) {
            return Err(CatalogError::CategoryNotFound);
        }

        if self
            .categories
            .iter()
            .any(|(other, existing)| other != key && same_name(&existing.name, &category.name))
        {
            return Err(CatalogError::DuplicateCategoryName(category.name));
        }

        if let Some(slot) = self.categories.get_mut(key) {
            *slot = category;
        }

        Ok(())
    }

    /// Deletes a category that no product references.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::CategoryNotFound`]: the key is unknown.
    /// - [`CatalogError::CategoryInUse`]: at least one product still
    ///   references the category.
    pub fn delete_category(&mut self, key: CategoryKey) -> Result<Category, CatalogError> {
        let name = self
            .categories
            .get(key)
            .map(|category| category.name.clone())
            .ok_or(CatalogError::CategoryNotFound)?;

        let products = self
            .products
            .values()
            .filter(|product| product.category == key)
            .count();

        if products > 0 {
            return Err(CatalogError::CategoryInUse { name, products });
        }

        info!(name = %name, "category deleted");

        self.categories
            .remove(key)
            .ok_or(CatalogError::CategoryNotFound)
    }

    /// Looks up a category.
    #[must_use]
    pub fn category(&self, key: CategoryKey) -> Option<&Category> {
        self.categories.get(key)
    }

    /// Iterates over all categories.
    pub fn categories(&self) -> impl Iterator<Item = (CategoryKey, &Category)> {
        self.categories.iter()
    }

    /// Adds a product.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::CategoryNotFound`]: the product references an
    ///   unknown category.
    /// - [`CatalogError::InvalidPrice`] / [`CatalogError::TooManyTags`]:
    ///   the product fails validation.
    pub fn add_product(&mut self, product: Product) -> Result<ProductKey, CatalogError> {
        product.validate()?;

        if !self.categories.contains_key(product.category) {
            return Err(CatalogError::CategoryNotFound);
        }

        info!(name = %product.name, "product added");

        Ok(self.products.insert(product))
    }

    /// Replaces a product.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::ProductNotFound`]: the key is unknown.
    /// - [`CatalogError::CategoryNotFound`]: the replacement references an
    ///   unknown category.
    /// - [`CatalogError::InvalidPrice`] / [`CatalogError::TooManyTags`]:
    ///   the replacement fails validation.
    pub fn update_product(
        &mut self,
        key: ProductKey,
        product: Product,
    ) -> Result<(), CatalogError> {
        product.validate()?;

        if !self.categories.contains_key(product.category) {
            return Err(CatalogError::CategoryNotFound);
        }

        let slot = self
            .products
            .get_mut(key)
            .ok_or(CatalogError::ProductNotFound)?;
        *slot = product;

        Ok(())
    }

    /// Deletes a product.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::ProductNotFound`] when the key is unknown.
    pub fn delete_product(&mut self, key: ProductKey) -> Result<Product, CatalogError> {
        self.products
            .remove(key)
            .ok_or(CatalogError::ProductNotFound)
    }

    /// Looks up a product.
    #[must_use]
    pub fn product(&self, key: ProductKey) -> Option<&Product> {
        self.products.get(key)
    }

    /// Iterates over all products.
    pub fn products(&self) -> impl Iterator<Item = (ProductKey, &Product)> {
        self.products.iter()
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

    fn product(catalog: &mut Catalog, category: CategoryKey) -> Result<ProductKey, CatalogError> {
        let product = Product::new(
            "Linen Roller Blind",
            "A simple linen roller blind.",
            Money::from_minor(5500, MAD),
            category,
            Vec::new(),
        )?;

        catalog.add_product(product)
    }

    #[test]
    fn duplicate_category_name_is_rejected_case_insensitively() -> TestResult {
        let mut catalog = Catalog::new();
        catalog.add_category(Category::named("Stores"))?;

        let result = catalog.add_category(Category::named("stores"));

        assert!(matches!(
            result,
            Err(CatalogError::DuplicateCategoryName(name)) if name == "stores"
        ));

        Ok(())
    }

    #[test]
    fn update_category_may_keep_its_own_name() -> TestResult {
        let mut catalog = Catalog::new();
        let key = catalog.add_category(Category::named("Stores"))?;

        let mut renamed = Category::named("Stores");
        renamed.description = Some("Roller blinds".into());
        catalog.update_category(key, renamed)?;

        let category = catalog.category(key).ok_or("category missing")?;
        assert_eq!(category.description.as_deref(), Some("Roller blinds"));

        Ok(())
    }

    #[test]
    fn update_category_rejects_collision_with_other() -> TestResult {
        let mut catalog = Catalog::new();
        catalog.add_category(Category::named("Stores"))?;
        let other = catalog.add_category(Category::named("Rideaux"))?;

        let result = catalog.update_category(other, Category::named("STORES"));

        assert!(matches!(
            result,
            Err(CatalogError::DuplicateCategoryName(_))
        ));

        Ok(())
    }

    #[test]
    fn delete_category_blocks_while_referenced() -> TestResult {
        let mut catalog = Catalog::new();
        let category = catalog.add_category(Category::named("Stores"))?;
        let key = product(&mut catalog, category)?;

        let blocked = catalog.delete_category(category);
        assert!(matches!(
            blocked,
            Err(CatalogError::CategoryInUse { products: 1, .. })
        ));

        catalog.delete_product(key)?;
        catalog.delete_category(category)?;

        assert!(catalog.category(category).is_none());

        Ok(())
    }

    #[test]
    fn product_requires_existing_category() -> TestResult {
        let mut catalog = Catalog::new();

        let result = product(&mut catalog, CategoryKey::default());

        assert!(matches!(result, Err(CatalogError::CategoryNotFound)));

        Ok(())
    }

    #[test]
    fn product_price_must_be_positive() {
        let result = Product::new(
            "Blind",
            "",
            Money::from_minor(0, MAD),
            CategoryKey::default(),
            Vec::new(),
        );

        assert!(matches!(result, Err(CatalogError::InvalidPrice)));
    }

    #[test]
    fn tag_cap_is_enforced_at_construction_and_on_set() -> TestResult {
        let too_many: Vec<String> = (0..=MAX_PRODUCT_TAGS).map(|i| format!("tag{i}")).collect();

        let result = Product::new(
            "Blind",
            "",
            Money::from_minor(5500, MAD),
            CategoryKey::default(),
            too_many.clone(),
        );
        assert!(matches!(result, Err(CatalogError::TooManyTags(14))));

        let mut product = Product::new(
            "Blind",
            "",
            Money::from_minor(5500, MAD),
            CategoryKey::default(),
            Vec::new(),
        )?;
        assert!(matches!(
            product.set_tags(too_many),
            Err(CatalogError::TooManyTags(14))
        ));

        Ok(())
    }

    #[test]
    fn unknown_product_key_is_an_error() {
        let mut catalog = Catalog::new();

        let result = catalog.delete_product(ProductKey::default());

        assert!(matches!(result, Err(CatalogError::ProductNotFound)));
    }
}
