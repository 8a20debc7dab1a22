//! Domain models.
//!
//! Most models derive `sqlx::FromRow` directly; bilingual fields and order
//! items live in JSONB columns and decode through `#[sqlx(json)]`. The user
//! model goes through a row type because its email is re-validated on read.

pub mod community;
pub mod content;
pub mod session;
pub mod store;
pub mod user;

pub use community::{Application, Job, Message, Rule};
pub use content::MaintenanceState;
pub use session::{CurrentUser, Flash, FlashLevel, keys as session_keys};
pub use store::{Coupon, Order, OrderItem, Product};
pub use user::User;
