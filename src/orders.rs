//! Orders
//!
//! Order creation at checkout plus the staff workflows that follow: phone
//! confirmation, fulfilment transitions and payment tracking. The three axes
//! are independent: an order can be awaiting payment while already confirmed,
//! and a failed contact attempt never forces a status decision.

use std::fmt;

use jiff::{Timestamp, Zoned, civil::Date};
use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use thiserror::Error;
use tracing::info;

use crate::cart::{Cart, CartItem};

/// Sequential human-readable order identifier (`ORD001`, `ORD002`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OrderId(String);

impl OrderId {
    fn from_seq(seq: u64) -> Self {
        Self(format!("ORD{seq:03}"))
    }

    /// The identifier as shown to customers and staff.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fulfilment status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    /// Placed, not yet confirmed by phone.
    Pending,

    /// Confirmed and being prepared.
    Processing,

    /// Handed to the carrier.
    Shipped,

    /// Received by the customer.
    Delivered,

    /// Cancelled before shipment.
    Cancelled,
}

impl OrderStatus {
    /// Whether staff may move an order from `self` to `next`.
    ///
    /// Cancellation is reachable from `Pending` or `Processing` only;
    /// post-shipment cancellation is outside this workflow.
    #[must_use]
    pub fn can_transition(self, next: Self) -> bool {
        use OrderStatus::{Cancelled, Delivered, Pending, Processing, Shipped};

        matches!(
            (self, next),
            (Pending, Processing | Cancelled)
                | (Processing, Shipped | Cancelled)
                | (Shipped, Delivered)
        )
    }
}

/// Payment state, tracked independently of fulfilment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentStatus {
    /// Payment received.
    Paid,

    /// Payment not yet received.
    AwaitingPayment,

    /// Payment returned to the customer; only set by explicit manual
    /// assignment, never by toggling.
    Refunded,
}

/// Outcome category of a phone-confirmation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallStatus {
    /// The customer was reached.
    Called,

    /// The customer asked to be called back.
    CallBack,

    /// The customer could not be reached.
    Unreachable,

    /// The customer is not interested.
    NotInterested,
}

/// How the customer chose to pay, recorded during phone confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentMethod {
    /// Cash on delivery.
    Cash,

    /// Bank transfer.
    BankTransfer,

    /// Card payment.
    Card,
}

/// Decision taken when a call reached the customer.
///
/// A payment method is required exactly when the order is confirmed; the
/// cancel branch records none.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallDecision {
    /// The customer confirmed; the order moves to processing.
    Confirm(PaymentMethod),

    /// The customer cancelled during the call.
    Cancel,
}

/// Result of one contact attempt, as recorded by staff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallOutcome {
    /// The customer was reached and made a decision.
    Called(CallDecision),

    /// Call back later; the order status is left untouched.
    CallBack,

    /// Could not be reached; the order status is left untouched.
    Unreachable,

    /// Not interested; the order status is left untouched.
    NotInterested,
}

impl CallOutcome {
    fn status(self) -> CallStatus {
        match self {
            Self::Called(_) => CallStatus::Called,
            Self::CallBack => CallStatus::CallBack,
            Self::Unreachable => CallStatus::Unreachable,
            Self::NotInterested => CallStatus::NotInterested,
        }
    }
}

/// Customer details captured at checkout.
///
/// Country and city are plain display strings, deliberately decoupled from
/// the live delivery tables: later edits to a city's fee never change
/// historical orders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutDetails {
    /// Customer's full name.
    pub customer_name: String,

    /// Street address.
    pub address: String,

    /// Country name as selected at checkout.
    pub country: String,

    /// City name as selected at checkout.
    pub city: String,

    /// Contact email.
    pub email: String,

    /// Contact phone number, used for the confirmation call.
    pub phone: String,

    /// Display currency chosen by the customer at order time. Stored amounts
    /// remain in the base currency.
    pub currency: &'static Currency,
}

/// Typed partial update over an order's contact fields.
///
/// Only the fields listed here can be patched; derived and lifecycle fields
/// go through their dedicated operations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderUpdate {
    /// New customer name, if any.
    pub customer_name: Option<String>,

    /// New address, if any.
    pub address: Option<String>,

    /// New country display string, if any.
    pub country: Option<String>,

    /// New city display string, if any.
    pub city: Option<String>,

    /// New email, if any.
    pub email: Option<String>,

    /// New phone number, if any.
    pub phone: Option<String>,
}

/// Errors returned by order lifecycle operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OrderError {
    /// Checkout was attempted with an empty cart.
    #[error("cannot place an order from an empty cart")]
    EmptyCart,

    /// The delivery fee is denominated in a different currency than the cart.
    #[error("delivery fee is in {fee}, but the cart uses {cart}")]
    CurrencyMismatch {
        /// ISO code of the fee's currency.
        fee: &'static str,

        /// ISO code of the cart's currency.
        cart: &'static str,
    },

    /// The order id is unknown.
    #[error("order {0} not found")]
    OrderNotFound(OrderId),

    /// The requested fulfilment transition is not allowed.
    #[error("cannot move order from {from:?} to {to:?}")]
    InvalidTransition {
        /// Current status.
        from: OrderStatus,

        /// Requested status.
        to: OrderStatus,
    },

    /// Refunded payments can only be changed by explicit manual assignment.
    #[error("payment was refunded and can no longer be toggled")]
    PaymentRefunded,
}

/// A placed order. Items are a frozen snapshot of the cart at checkout;
/// orders are never deleted.
#[derive(Debug, Clone)]
pub struct Order {
    id: OrderId,
    items: Vec<CartItem>,
    details: CheckoutDetails,
    delivery_fee: Money<'static, Currency>,
    total: Money<'static, Currency>,
    status: OrderStatus,
    payment_status: PaymentStatus,
    placed_at: Timestamp,
    call_date: Option<Date>,
    call_status: Option<CallStatus>,
    payment_method: Option<PaymentMethod>,
}

impl Order {
    /// The order's identifier.
    #[must_use]
    pub fn id(&self) -> &OrderId {
        &self.id
    }

    /// The item snapshots frozen at checkout.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// The customer details captured at checkout.
    #[must_use]
    pub fn details(&self) -> &CheckoutDetails {
        &self.details
    }

    /// The delivery fee frozen at checkout, in base currency.
    #[must_use]
    pub fn delivery_fee(&self) -> &Money<'static, Currency> {
        &self.delivery_fee
    }

    /// Item subtotal without the delivery fee, in base currency.
    #[must_use]
    pub fn subtotal(&self) -> Money<'static, Currency> {
        let sum: Decimal = self
            .items
            .iter()
            .map(|item| *item.total_price().amount())
            .sum();

        Money::from_decimal(sum, self.total.currency())
    }

    /// Grand total including the delivery fee, in base currency.
    #[must_use]
    pub fn total(&self) -> &Money<'static, Currency> {
        &self.total
    }

    /// Current fulfilment status.
    #[must_use]
    pub fn status(&self) -> OrderStatus {
        self.status
    }

    /// Current payment status.
    #[must_use]
    pub fn payment_status(&self) -> PaymentStatus {
        self.payment_status
    }

    /// Creation timestamp; immutable.
    #[must_use]
    pub fn placed_at(&self) -> Timestamp {
        self.placed_at
    }

    /// Date of the most recent contact attempt, if any.
    #[must_use]
    pub fn call_date(&self) -> Option<Date> {
        self.call_date
    }

    /// Outcome of the most recent contact attempt, if any.
    #[must_use]
    pub fn call_status(&self) -> Option<CallStatus> {
        self.call_status
    }

    /// Payment method recorded during confirmation, if any.
    #[must_use]
    pub fn payment_method(&self) -> Option<PaymentMethod> {
        self.payment_method
    }
}

/// In-memory order store with sequential id assignment.
#[derive(Debug, Default)]
pub struct OrderBook {
    orders: Vec<Order>,
    placed: u64,
}

impl OrderBook {
    /// Creates an empty order book.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Places an order from the current cart contents.
    ///
    /// Snapshots the items, freezes the delivery fee, and starts the order at
    /// `Pending` / `AwaitingPayment`. The cart itself is left untouched; the
    /// host clears it once checkout has succeeded.
    ///
    /// # Errors
    ///
    /// - [`OrderError::EmptyCart`]: the cart holds no items.
    /// - [`OrderError::CurrencyMismatch`]: the fee is denominated in a
    ///   different currency than the cart.
    pub fn place(
        &mut self,
        cart: &Cart,
        details: CheckoutDetails,
        delivery_fee: Money<'static, Currency>,
    ) -> Result<OrderId, OrderError> {
        if cart.is_empty() {
            return Err(OrderError::EmptyCart);
        }

        let fee_currency = delivery_fee.currency();

        if fee_currency != cart.currency() {
            return Err(OrderError::CurrencyMismatch {
                fee: fee_currency.iso_alpha_code,
                cart: cart.currency().iso_alpha_code,
            });
        }

        self.placed += 1;
        let id = OrderId::from_seq(self.placed);

        let subtotal = cart.total();
        let total = Money::from_decimal(
            *subtotal.amount() + *delivery_fee.amount(),
            subtotal.currency(),
        );

        info!(%id, total = %total, "order placed");

        self.orders.push(Order {
            id: id.clone(),
            items: cart.iter().cloned().collect(),
            details,
            delivery_fee,
            total,
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::AwaitingPayment,
            placed_at: Timestamp::now(),
            call_date: None,
            call_status: None,
            payment_method: None,
        });

        Ok(id)
    }

    /// Moves an order to a new fulfilment status. Re-asserting the current
    /// status is a no-op.
    ///
    /// # Errors
    ///
    /// - [`OrderError::OrderNotFound`]: the id is unknown.
    /// - [`OrderError::InvalidTransition`]: the move is not allowed by the
    ///   fulfilment graph.
    pub fn update_status(&mut self, id: &OrderId, status: OrderStatus) -> Result<(), OrderError> {
        let order = self.get_mut(id)?;

        if order.status == status {
            return Ok(());
        }

        if !order.status.can_transition(status) {
            return Err(OrderError::InvalidTransition {
                from: order.status,
                to: status,
            });
        }

        info!(%id, from = ?order.status, to = ?status, "order status updated");

        order.status = status;

        Ok(())
    }

    /// Records a phone-confirmation attempt.
    ///
    /// A `Called` outcome carries the staff decision: confirming moves the
    /// order to `Processing` and records the payment method, cancelling moves
    /// it to `Cancelled` without one. The other outcomes only log the call
    /// date and status. `call_date` defaults to today.
    ///
    /// # Errors
    ///
    /// - [`OrderError::OrderNotFound`]: the id is unknown.
    /// - [`OrderError::InvalidTransition`]: the decision implies a status
    ///   move the fulfilment graph forbids (e.g. confirming a shipped order).
    pub fn record_contact(
        &mut self,
        id: &OrderId,
        call_date: Option<Date>,
        outcome: CallOutcome,
    ) -> Result<(), OrderError> {
        let order = self.get_mut(id)?;

        if let CallOutcome::Called(decision) = outcome {
            let next = match decision {
                CallDecision::Confirm(_) => OrderStatus::Processing,
                CallDecision::Cancel => OrderStatus::Cancelled,
            };

            if order.status != next && !order.status.can_transition(next) {
                return Err(OrderError::InvalidTransition {
                    from: order.status,
                    to: next,
                });
            }

            order.status = next;

            if let CallDecision::Confirm(method) = decision {
                order.payment_method = Some(method);
            }
        }

        order.call_date = Some(call_date.unwrap_or_else(today));
        order.call_status = Some(outcome.status());

        info!(
            %id,
            call_status = ?order.call_status,
            status = ?order.status,
            "contact attempt recorded"
        );

        Ok(())
    }

    /// Flips the payment status between `Paid` and `AwaitingPayment`,
    /// returning the new value. The staff yes/no confirmation gate belongs to
    /// the presentation layer.
    ///
    /// # Errors
    ///
    /// - [`OrderError::OrderNotFound`]: the id is unknown.
    /// - [`OrderError::PaymentRefunded`]: refunded payments cannot be toggled.
    pub fn toggle_payment_status(&mut self, id: &OrderId) -> Result<PaymentStatus, OrderError> {
        let order = self.get_mut(id)?;

        order.payment_status = match order.payment_status {
            PaymentStatus::Paid => PaymentStatus::AwaitingPayment,
            PaymentStatus::AwaitingPayment => PaymentStatus::Paid,
            PaymentStatus::Refunded => return Err(OrderError::PaymentRefunded),
        };

        info!(%id, payment_status = ?order.payment_status, "payment status toggled");

        Ok(order.payment_status)
    }

    /// Marks the payment refunded; the distinct manual assignment that
    /// toggling never produces.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::OrderNotFound`] when the id is unknown.
    pub fn mark_refunded(&mut self, id: &OrderId) -> Result<(), OrderError> {
        let order = self.get_mut(id)?;

        order.payment_status = PaymentStatus::Refunded;

        info!(%id, "payment marked refunded");

        Ok(())
    }

    /// Patches the order's contact fields from a typed partial update.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::OrderNotFound`] when the id is unknown.
    pub fn update_details(&mut self, id: &OrderId, update: OrderUpdate) -> Result<(), OrderError> {
        let order = self.get_mut(id)?;

        let OrderUpdate {
            customer_name,
            address,
            country,
            city,
            email,
            phone,
        } = update;

        if let Some(customer_name) = customer_name {
            order.details.customer_name = customer_name;
        }
        if let Some(address) = address {
            order.details.address = address;
        }
        if let Some(country) = country {
            order.details.country = country;
        }
        if let Some(city) = city {
            order.details.city = city;
        }
        if let Some(email) = email {
            order.details.email = email;
        }
        if let Some(phone) = phone {
            order.details.phone = phone;
        }

        Ok(())
    }

    /// Looks up an order by id.
    #[must_use]
    pub fn get(&self, id: &OrderId) -> Option<&Order> {
        self.orders.iter().find(|order| &order.id == id)
    }

    /// Iterates over orders in placement order.
    pub fn iter(&self) -> impl Iterator<Item = &Order> {
        self.orders.iter()
    }

    /// Number of orders placed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    /// Whether no order has been placed yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    fn get_mut(&mut self, id: &OrderId) -> Result<&mut Order, OrderError> {
        self.orders
            .iter_mut()
            .find(|order| &order.id == id)
            .ok_or_else(|| OrderError::OrderNotFound(id.clone()))
    }
}

fn today() -> Date {
    Zoned::now().date()
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use rusty_money::iso::{EUR, MAD};
    use testresult::TestResult;

    use crate::catalog::{CategoryKey, Product};
    use crate::customization::{Customization, MechanismSide, MechanismType, MountingType};

    use super::*;

    fn checkout_details() -> CheckoutDetails {
        CheckoutDetails {
            customer_name: "Amina Berrada".into(),
            address: "12 Rue des Orangers".into(),
            country: "Maroc".into(),
            city: "Casablanca".into(),
            email: "amina@example.com".into(),
            phone: "+212600000000".into(),
            currency: EUR,
        }
    }

    fn cart_with_one_item() -> TestResult<Cart> {
        let mut cart = Cart::new(MAD);
        let product = Product::new(
            "Linen Roller Blind",
            "A simple linen roller blind.",
            Money::from_minor(5500, MAD),
            CategoryKey::default(),
            Vec::new(),
        )?;
        let customization = Customization::new(
            Decimal::from(120),
            Decimal::from(150),
            MechanismType::Manual,
            Some(MechanismSide::Left),
            MountingType::Wall,
            false,
        );
        cart.add_item(&product, customization, 2)?;

        Ok(cart)
    }

    fn placed_order(book: &mut OrderBook) -> TestResult<OrderId> {
        let cart = cart_with_one_item()?;

        Ok(book.place(&cart, checkout_details(), Money::from_minor(1500, MAD))?)
    }

    #[test]
    fn place_freezes_totals_and_initial_state() -> TestResult {
        let mut book = OrderBook::new();
        let id = placed_order(&mut book)?;

        let order = book.get(&id).ok_or("order missing")?;
        assert_eq!(order.subtotal(), Money::from_minor(19800, MAD));
        assert_eq!(order.total(), &Money::from_minor(21300, MAD));
        assert_eq!(order.status(), OrderStatus::Pending);
        assert_eq!(order.payment_status(), PaymentStatus::AwaitingPayment);
        assert_eq!(order.call_status(), None);

        Ok(())
    }

    #[test]
    fn order_ids_are_sequential_and_zero_padded() -> TestResult {
        let mut book = OrderBook::new();

        let first = placed_order(&mut book)?;
        let second = placed_order(&mut book)?;

        assert_eq!(first.as_str(), "ORD001");
        assert_eq!(second.as_str(), "ORD002");

        Ok(())
    }

    #[test]
    fn empty_cart_cannot_be_checked_out() {
        let mut book = OrderBook::new();
        let cart = Cart::new(MAD);

        let result = book.place(&cart, checkout_details(), Money::from_minor(1500, MAD));

        assert!(matches!(result, Err(OrderError::EmptyCart)));
    }

    #[test]
    fn fee_currency_must_match_the_cart() -> TestResult {
        let mut book = OrderBook::new();
        let cart = cart_with_one_item()?;

        let result = book.place(&cart, checkout_details(), Money::from_minor(150, EUR));

        assert!(matches!(
            result,
            Err(OrderError::CurrencyMismatch {
                fee: "EUR",
                cart: "MAD"
            })
        ));
        assert!(book.is_empty());

        Ok(())
    }

    #[test]
    fn fulfilment_follows_the_transition_graph() -> TestResult {
        let mut book = OrderBook::new();
        let id = placed_order(&mut book)?;

        // Pending cannot jump straight to Shipped.
        assert!(matches!(
            book.update_status(&id, OrderStatus::Shipped),
            Err(OrderError::InvalidTransition { .. })
        ));

        book.update_status(&id, OrderStatus::Processing)?;
        book.update_status(&id, OrderStatus::Shipped)?;

        // No cancellation after shipment.
        assert!(matches!(
            book.update_status(&id, OrderStatus::Cancelled),
            Err(OrderError::InvalidTransition { .. })
        ));

        book.update_status(&id, OrderStatus::Delivered)?;
        // Re-asserting the current status is a no-op.
        book.update_status(&id, OrderStatus::Delivered)?;

        Ok(())
    }

    #[test]
    fn confirming_a_call_moves_to_processing_with_payment_method() -> TestResult {
        let mut book = OrderBook::new();
        let id = placed_order(&mut book)?;
        let call_date = Date::constant(2026, 8, 20);

        book.record_contact(
            &id,
            Some(call_date),
            CallOutcome::Called(CallDecision::Confirm(PaymentMethod::Card)),
        )?;

        let order = book.get(&id).ok_or("order missing")?;
        assert_eq!(order.status(), OrderStatus::Processing);
        assert_eq!(order.payment_method(), Some(PaymentMethod::Card));
        assert_eq!(order.call_status(), Some(CallStatus::Called));
        assert_eq!(order.call_date(), Some(call_date));

        Ok(())
    }

    #[test]
    fn cancelling_during_a_call_records_no_payment_method() -> TestResult {
        let mut book = OrderBook::new();
        let id = placed_order(&mut book)?;

        book.record_contact(&id, None, CallOutcome::Called(CallDecision::Cancel))?;

        let order = book.get(&id).ok_or("order missing")?;
        assert_eq!(order.status(), OrderStatus::Cancelled);
        assert_eq!(order.payment_method(), None);
        assert_eq!(order.call_status(), Some(CallStatus::Called));

        Ok(())
    }

    #[test]
    fn unsuccessful_contact_leaves_status_untouched() -> TestResult {
        let mut book = OrderBook::new();
        let id = placed_order(&mut book)?;

        book.record_contact(&id, None, CallOutcome::CallBack)?;

        let order = book.get(&id).ok_or("order missing")?;
        assert_eq!(order.status(), OrderStatus::Pending);
        assert_eq!(order.call_status(), Some(CallStatus::CallBack));
        // The date defaulted to today.
        assert_eq!(order.call_date(), Some(today()));

        Ok(())
    }

    #[test]
    fn payment_toggle_flips_until_refunded() -> TestResult {
        let mut book = OrderBook::new();
        let id = placed_order(&mut book)?;

        assert_eq!(book.toggle_payment_status(&id)?, PaymentStatus::Paid);
        assert_eq!(
            book.toggle_payment_status(&id)?,
            PaymentStatus::AwaitingPayment
        );

        book.mark_refunded(&id)?;

        assert!(matches!(
            book.toggle_payment_status(&id),
            Err(OrderError::PaymentRefunded)
        ));

        Ok(())
    }

    #[test]
    fn update_details_patches_only_given_fields() -> TestResult {
        let mut book = OrderBook::new();
        let id = placed_order(&mut book)?;

        book.update_details(
            &id,
            OrderUpdate {
                phone: Some("+212611111111".into()),
                ..OrderUpdate::default()
            },
        )?;

        let order = book.get(&id).ok_or("order missing")?;
        assert_eq!(order.details().phone, "+212611111111");
        assert_eq!(order.details().customer_name, "Amina Berrada");

        Ok(())
    }

    #[test]
    fn unknown_order_id_is_an_error() {
        let mut book = OrderBook::new();
        let id = OrderId::from_seq(41);

        let result = book.update_status(&id, OrderStatus::Processing);

        assert!(matches!(result, Err(OrderError::OrderNotFound(_))));
    }
}
