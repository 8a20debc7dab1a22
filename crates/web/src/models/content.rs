//! Maintenance switch state.

use serde::Serialize;
use serde_json::Value;

/// Whether maintenance mode is on, plus the locale-keyed page text
/// (`{"en": {"title", "message"}, "ar": {...}}`).
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct MaintenanceState {
    pub enabled: bool,
    pub content: Value,
}

impl MaintenanceState {
    #[must_use]
    pub fn off() -> Self {
        Self {
            enabled: false,
            content: Value::Object(serde_json::Map::new()),
        }
    }
}
