//! Core types for Outpost.
//!
//! Type-safe wrappers for the domain concepts shared by the server and CLI.

pub mod email;
pub mod id;
pub mod locale;
pub mod price;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use locale::{Bilingual, Locale};
pub use price::{CurrencyCode, Price, round_cents};
pub use status::*;
