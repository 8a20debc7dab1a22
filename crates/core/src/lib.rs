//! Outpost Core - shared domain library.
//!
//! Used by:
//! - `outpost-web` - the HTTP server
//! - `outpost-cli` - migrations and operator commands
//!
//! Nothing in here performs I/O. Database type mappings are behind the
//! `postgres` feature.
//!
//! # Modules
//!
//! - [`types`] - ids, emails, locales, prices and status enums
//! - [`cart`] - cart normalisation
//! - [`coupon`] - coupon eligibility and discount math
//! - [`content`] - bilingual JSON document resolution

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod content;
pub mod coupon;
pub mod types;

pub use cart::{Cart, CartLine, MAX_LINE_QUANTITY};
pub use coupon::{AppliedDiscount, CouponRejection, CouponRules};
pub use types::*;
