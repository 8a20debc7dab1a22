//! Business logic services.
//!
//! # Services
//!
//! - `auth` - registration and password login
//! - `directory` - stored roles of session users
//! - `content` - bilingual content resolution with caching
//! - `translations` - shipped locale bundles
//! - `maintenance` - maintenance switch with caching
//! - `checkout` - cart pricing, orders and payment capture
//! - `paypal` - PayPal Orders v2 client

pub mod auth;
pub mod checkout;
pub mod content;
pub mod directory;
pub mod maintenance;
pub mod paypal;
pub mod translations;

pub use auth::{AuthError, AuthService};
pub use checkout::{CheckoutError, CheckoutService};
pub use content::ContentService;
pub use directory::UserDirectory;
pub use maintenance::MaintenanceService;
pub use paypal::{PayPalClient, PayPalError};
