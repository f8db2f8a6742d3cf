//! Oriel
//!
//! Oriel is the order and pricing engine behind a made-to-order
//! window-treatment storefront: area-based quoting for customised blinds and
//! curtains, cart aggregation, catalog and delivery-zone administration,
//! display-currency conversion, and the staff phone-confirmation workflow
//! that gates fulfilment.
//!
//! The crate is a pure in-memory business-logic layer. Persistence,
//! authentication, document rendering and all presentation concerns are
//! external collaborators of the host application.

pub mod cart;
pub mod catalog;
pub mod currency;
pub mod customization;
pub mod delivery;
pub mod fixtures;
pub mod invoice;
pub mod orders;
pub mod pricing;
