//! PayPal Orders v2 request and response bodies.

use serde::{Deserialize, Serialize};

/// `POST /v1/oauth2/token` response.
#[derive(Debug, Deserialize)]
pub(super) struct TokenResponse {
    pub access_token: String,
    /// Lifetime in seconds.
    pub expires_in: i64,
}

/// `POST /v2/checkout/orders` body.
#[derive(Debug, Serialize)]
pub(super) struct CreateOrderRequest<'a> {
    pub intent: &'static str,
    pub purchase_units: [PurchaseUnit<'a>; 1],
}

#[derive(Debug, Serialize)]
pub(super) struct PurchaseUnit<'a> {
    pub reference_id: String,
    pub description: &'a str,
    pub amount: Amount,
}

#[derive(Debug, Serialize)]
pub(super) struct Amount {
    pub currency_code: &'static str,
    pub value: String,
}

/// The subset of a PayPal order we read back.
#[derive(Debug, Deserialize)]
pub(super) struct OrderResponse {
    pub id: String,
    pub status: String,
}

/// PayPal error body.
#[derive(Debug, Default, Deserialize)]
pub(super) struct ErrorResponse {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub details: Vec<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ErrorDetail {
    #[serde(default)]
    pub issue: Option<String>,
}

impl ErrorResponse {
    /// A one-line summary: `NAME: message (ISSUE)`.
    pub fn summary(&self) -> String {
        let mut out = self.name.clone().unwrap_or_else(|| "UNKNOWN_ERROR".to_owned());
        if let Some(message) = &self.message {
            out.push_str(": ");
            out.push_str(message);
        }
        if let Some(issue) = self.details.iter().find_map(|d| d.issue.as_deref()) {
            out.push_str(" (");
            out.push_str(issue);
            out.push(')');
        }
        out
    }
}
