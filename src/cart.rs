//! Cart
//!
//! The active shopping session: an insertion-ordered list of priced item
//! snapshots. `surface` and `total_price` on each item are cached derived
//! fields, re-quoted on every mutation so they are never stale.

use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use thiserror::Error;

use crate::{
    catalog::Product,
    customization::Customization,
    pricing::{self, PricingError},
};

/// Identifier of a single add-to-cart event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CartItemId(u64);

/// Errors related to cart mutation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartError {
    /// The product is priced in a different currency than the cart.
    #[error("product is priced in {product}, but the cart uses {cart}")]
    CurrencyMismatch {
        /// ISO code of the product's currency.
        product: &'static str,

        /// ISO code of the cart's currency.
        cart: &'static str,
    },

    /// The cart item does not exist.
    #[error("cart item not found")]
    ItemNotFound,

    /// Quantities below 1 are rejected rather than silently ignored.
    #[error("quantity must be at least 1")]
    InvalidQuantity,

    /// Quote computation failed.
    #[error(transparent)]
    Pricing(#[from] PricingError),
}

/// One configured product in the cart.
///
/// Owns a snapshot copy of the product, so later catalog edits never change
/// what this item costs.
#[derive(Debug, Clone, PartialEq)]
pub struct CartItem {
    id: CartItemId,
    product: Product,
    customization: Customization,
    quantity: u32,
    surface: Decimal,
    total_price: Money<'static, Currency>,
}

impl CartItem {
    /// Identifier of the add-to-cart event that produced this item.
    #[must_use]
    pub fn id(&self) -> CartItemId {
        self.id
    }

    /// The product snapshot taken when the item was added.
    #[must_use]
    pub fn product(&self) -> &Product {
        &self.product
    }

    /// The chosen customization.
    #[must_use]
    pub fn customization(&self) -> &Customization {
        &self.customization
    }

    /// Number of units.
    #[must_use]
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Total surface in square metres across all units.
    #[must_use]
    pub fn surface(&self) -> Decimal {
        self.surface
    }

    /// Total price in the cart's base currency.
    #[must_use]
    pub fn total_price(&self) -> &Money<'static, Currency> {
        &self.total_price
    }
}

/// In-memory cart for one shopping session.
#[derive(Debug)]
pub struct Cart {
    items: Vec<CartItem>,
    currency: &'static Currency,
    next_id: u64,
}

impl Cart {
    /// Creates an empty cart in the given base currency.
    #[must_use]
    pub fn new(currency: &'static Currency) -> Self {
        Self {
            items: Vec::new(),
            currency,
            next_id: 0,
        }
    }

    /// Quotes the customization and appends a new item; insertion order is
    /// display order.
    ///
    /// # Errors
    ///
    /// - [`CartError::CurrencyMismatch`]: the product is priced in a
    ///   different currency than the cart.
    /// - [`CartError::Pricing`]: the quote failed (bad dimensions, quantity
    ///   or rate).
    pub fn add_item(
        &mut self,
        product: &Product,
        customization: Customization,
        quantity: u32,
    ) -> Result<CartItemId, CartError> {
        let product_currency = product.price_per_sqm.currency();

        if product_currency != self.currency {
            return Err(CartError::CurrencyMismatch {
                product: product_currency.iso_alpha_code,
                cart: self.currency.iso_alpha_code,
            });
        }

        let quote = pricing::quote(&customization, quantity, &product.price_per_sqm)?;

        self.next_id += 1;
        let id = CartItemId(self.next_id);

        self.items.push(CartItem {
            id,
            product: product.clone(),
            customization,
            quantity,
            surface: quote.surface,
            total_price: quote.total,
        });

        Ok(id)
    }

    /// Removes an item by id; a no-op when the id is absent, so removal is
    /// idempotent.
    pub fn remove_item(&mut self, id: CartItemId) {
        self.items.retain(|item| item.id != id);
    }

    /// Changes an item's quantity, re-quoting its derived fields.
    ///
    /// # Errors
    ///
    /// - [`CartError::InvalidQuantity`]: the new quantity is below 1.
    /// - [`CartError::ItemNotFound`]: the id is unknown.
    /// - [`CartError::Pricing`]: the re-quote failed.
    pub fn update_quantity(&mut self, id: CartItemId, quantity: u32) -> Result<(), CartError> {
        if quantity < 1 {
            return Err(CartError::InvalidQuantity);
        }

        let item = self
            .items
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or(CartError::ItemNotFound)?;

        let quote = pricing::quote(&item.customization, quantity, &item.product.price_per_sqm)?;

        item.quantity = quantity;
        item.surface = quote.surface;
        item.total_price = quote.total;

        Ok(())
    }

    /// Sum of all item totals, recomputed on every read.
    #[must_use]
    pub fn total(&self) -> Money<'static, Currency> {
        let sum: Decimal = self.items.iter().map(|item| *item.total_price.amount()).sum();

        Money::from_decimal(sum, self.currency)
    }

    /// Empties the cart; called by the host after a successful checkout.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Looks up an item by id.
    #[must_use]
    pub fn get_item(&self, id: CartItemId) -> Option<&CartItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Iterates over the items in display order.
    pub fn iter(&self) -> impl Iterator<Item = &CartItem> {
        self.items.iter()
    }

    /// Number of items (cart lines, not units).
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the cart holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The cart's base currency.
    #[must_use]
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }
}
