//! Invoices
//!
//! Read-only render model handed to the document-generation layer. Every
//! amount is converted into the order's display currency; formatting and
//! locale stay with the renderer.

use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};

use crate::{
    currency::RateTable,
    orders::{Order, OrderId},
};

/// One order item as it appears on the invoice.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceLine {
    /// Product name from the frozen snapshot.
    pub description: String,

    /// Ordered width in centimetres.
    pub width_cm: Decimal,

    /// Ordered height in centimetres.
    pub height_cm: Decimal,

    /// Number of units.
    pub quantity: u32,

    /// Total surface in square metres.
    pub surface: Decimal,

    /// Line total in the display currency.
    pub line_total: Money<'static, Currency>,
}

/// Customer-facing invoice snapshot for one order.
#[derive(Debug, Clone, PartialEq)]
pub struct Invoice {
    /// The invoiced order.
    pub order_id: OrderId,

    /// Customer name as captured at checkout.
    pub customer_name: String,

    /// Delivery destination display strings.
    pub destination: (String, String),

    /// One line per order item, in display order.
    pub lines: Vec<InvoiceLine>,

    /// Item subtotal in the display currency.
    pub subtotal: Money<'static, Currency>,

    /// Delivery fee in the display currency.
    pub delivery_fee: Money<'static, Currency>,

    /// Grand total in the display currency.
    pub total: Money<'static, Currency>,
}

impl Invoice {
    /// Builds the invoice for an order, converting every amount into the
    /// order's display currency. A missing conversion rate falls back to 1,
    /// so the invoice renders base-currency figures rather than failing.
    #[must_use]
    pub fn build(order: &Order, rates: &RateTable) -> Self {
        let display = order.details().currency;

        let lines = order
            .items()
            .iter()
            .map(|item| InvoiceLine {
                description: item.product().name.clone(),
                width_cm: item.customization().width_cm(),
                height_cm: item.customization().height_cm(),
                quantity: item.quantity(),
                surface: item.surface(),
                line_total: rates.convert(item.total_price(), display),
            })
            .collect();

        Self {
            order_id: order.id().clone(),
            customer_name: order.details().customer_name.clone(),
            destination: (order.details().city.clone(), order.details().country.clone()),
            lines,
            subtotal: rates.convert(&order.subtotal(), display),
            delivery_fee: rates.convert(order.delivery_fee(), display),
            total: rates.convert(order.total(), display),
        }
    }
}
