//! PayPal REST client for the Orders v2 API.
//!
//! Checkout creates a PayPal order for the store order's total; the browser
//! approves it with the PayPal JS SDK and the server captures it afterwards.
//! OAuth access tokens come from the client-credentials grant and are cached
//! in memory until a minute before they expire.

mod types;

use std::sync::Arc;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::instrument;

use outpost_core::{OrderId, Price};

use crate::config::PayPalConfig;
use types::{Amount, CreateOrderRequest, ErrorResponse, OrderResponse, PurchaseUnit, TokenResponse};

/// PayPal's status for a captured order.
pub const STATUS_COMPLETED: &str = "COMPLETED";

/// Error issue PayPal reports when capturing an order twice.
const ISSUE_ALREADY_CAPTURED: &str = "ORDER_ALREADY_CAPTURED";

/// Errors from the PayPal API.
#[derive(Debug, Error)]
pub enum PayPalError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Token request was rejected.
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// API returned a non-success status.
    #[error("PayPal API error ({status}): {message}")]
    Api { status: u16, message: String },
}

impl PayPalError {
    /// Whether a capture failed because the funds were already captured.
    #[must_use]
    pub fn is_already_captured(&self) -> bool {
        matches!(self, Self::Api { status: 422, message } if message.contains(ISSUE_ALREADY_CAPTURED))
    }
}

#[derive(Debug, Clone)]
struct AccessToken {
    value: SecretString,
    /// Unix timestamp when the token expires.
    expires_at: i64,
}

impl AccessToken {
    fn is_expired(&self) -> bool {
        chrono::Utc::now().timestamp() >= self.expires_at - 60
    }
}

/// PayPal Orders API client.
#[derive(Clone)]
pub struct PayPalClient {
    inner: Arc<PayPalClientInner>,
}

struct PayPalClientInner {
    client: reqwest::Client,
    config: PayPalConfig,
    base_url: String,
    token: RwLock<Option<AccessToken>>,
}

impl PayPalClient {
    /// Create a client for the configured environment.
    ///
    /// # Errors
    ///
    /// Returns `PayPalError::Http` if the HTTP client cannot be built.
    pub fn new(config: PayPalConfig) -> Result<Self, PayPalError> {
        let base_url = config.mode.api_base().to_owned();
        Self::with_base_url(config, base_url)
    }

    /// Create a client talking to `base_url` instead of PayPal.
    pub(crate) fn with_base_url(
        config: PayPalConfig,
        base_url: String,
    ) -> Result<Self, PayPalError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            inner: Arc::new(PayPalClientInner {
                client,
                config,
                base_url,
                token: RwLock::new(None),
            }),
        })
    }

    /// Public settings for the browser SDK.
    #[must_use]
    pub fn config(&self) -> &PayPalConfig {
        &self.inner.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.inner.base_url)
    }

    /// A valid access token, fetching a new one if needed.
    async fn access_token(&self) -> Result<SecretString, PayPalError> {
        if let Some(token) = self.inner.token.read().await.as_ref()
            && !token.is_expired()
        {
            return Ok(token.value.clone());
        }

        let mut guard = self.inner.token.write().await;
        if let Some(token) = guard.as_ref()
            && !token.is_expired()
        {
            return Ok(token.value.clone());
        }

        let token = self.fetch_token().await?;
        let value = token.value.clone();
        *guard = Some(token);
        Ok(value)
    }

    #[instrument(skip(self))]
    async fn fetch_token(&self) -> Result<AccessToken, PayPalError> {
        let now = chrono::Utc::now().timestamp();
        let config = &self.inner.config;

        let response = self
            .inner
            .client
            .post(self.url("/v1/oauth2/token"))
            .basic_auth(&config.client_id, Some(config.client_secret.expose_secret()))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error: ErrorResponse = response.json().await.unwrap_or_default();
            return Err(PayPalError::AuthenticationFailed(format!(
                "HTTP {status}: {}",
                error.summary()
            )));
        }

        let body: TokenResponse = response.json().await?;
        tracing::debug!(expires_in = body.expires_in, "Obtained PayPal access token");

        Ok(AccessToken {
            value: SecretString::from(body.access_token),
            expires_at: now + body.expires_in,
        })
    }

    /// Create a PayPal order for `amount` and return its id.
    ///
    /// # Errors
    ///
    /// Returns `PayPalError` if authentication or the API call fails.
    #[instrument(skip(self), fields(order_id = %reference, amount = %amount))]
    pub async fn create_order(
        &self,
        reference: OrderId,
        amount: Price,
    ) -> Result<String, PayPalError> {
        let token = self.access_token().await?;
        let description = format!("Outpost order #{reference}");
        let body = CreateOrderRequest {
            intent: "CAPTURE",
            purchase_units: [PurchaseUnit {
                reference_id: reference.to_string(),
                description: &description,
                amount: Amount {
                    currency_code: amount.currency_code.as_str(),
                    value: amount.value_string(),
                },
            }],
        };

        let response = self
            .inner
            .client
            .post(self.url("/v2/checkout/orders"))
            .bearer_auth(token.expose_secret())
            .json(&body)
            .send()
            .await?;

        let order: OrderResponse = Self::read(response).await?;
        tracing::info!(paypal_order_id = %order.id, status = %order.status, "PayPal order created");
        Ok(order.id)
    }

    /// Current status of a PayPal order.
    ///
    /// # Errors
    ///
    /// Returns `PayPalError` if authentication or the API call fails.
    #[instrument(skip(self))]
    pub async fn get_order(&self, paypal_order_id: &str) -> Result<String, PayPalError> {
        let token = self.access_token().await?;

        let response = self
            .inner
            .client
            .get(self.url(&format!("/v2/checkout/orders/{paypal_order_id}")))
            .bearer_auth(token.expose_secret())
            .send()
            .await?;

        let order: OrderResponse = Self::read(response).await?;
        tracing::debug!(paypal_order_id = %order.id, status = %order.status, "PayPal order fetched");
        Ok(order.status)
    }

    /// Capture an approved PayPal order and return its resulting status.
    ///
    /// # Errors
    ///
    /// Returns `PayPalError` if authentication or the API call fails.
    #[instrument(skip(self))]
    pub async fn capture_order(&self, paypal_order_id: &str) -> Result<String, PayPalError> {
        let token = self.access_token().await?;

        let response = self
            .inner
            .client
            .post(self.url(&format!("/v2/checkout/orders/{paypal_order_id}/capture")))
            .bearer_auth(token.expose_secret())
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body("{}")
            .send()
            .await?;

        let order: OrderResponse = Self::read(response).await?;
        tracing::info!(paypal_order_id = %order.id, status = %order.status, "PayPal order captured");
        Ok(order.status)
    }

    async fn read(response: reqwest::Response) -> Result<OrderResponse, PayPalError> {
        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            tracing::warn!("PayPal rejected the access token");
        }
        if !status.is_success() {
            let error: ErrorResponse = response.json().await.unwrap_or_default();
            return Err(PayPalError::Api {
                status: status.as_u16(),
                message: error.summary(),
            });
        }
        Ok(response.json().await?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use rust_decimal::Decimal;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use outpost_core::CurrencyCode;

    use super::*;
    use crate::config::PayPalMode;

    fn config(mode: PayPalMode) -> PayPalConfig {
        PayPalConfig {
            client_id: "client-id".to_owned(),
            client_secret: SecretString::from("client-secret"),
            mode,
            currency: CurrencyCode::USD,
        }
    }

    fn client(mode: PayPalMode) -> PayPalClient {
        PayPalClient::new(config(mode)).unwrap()
    }

    /// A client pointed at `server` that hands out the token `test-token`.
    pub(crate) async fn mock_client(server: &MockServer) -> PayPalClient {
        Mock::given(method("POST"))
            .and(path("/v1/oauth2/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "test-token",
                "token_type": "Bearer",
                "expires_in": 32400
            })))
            .mount(server)
            .await;
        PayPalClient::with_base_url(config(PayPalMode::Sandbox), server.uri()).unwrap()
    }

    /// Respond to `GET /v2/checkout/orders/{id}` with `status`.
    pub(crate) async fn mock_order_status(server: &MockServer, id: &str, status: &str) {
        Mock::given(method("GET"))
            .and(path(format!("/v2/checkout/orders/{id}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": id, "status": status })))
            .mount(server)
            .await;
    }

    /// Respond to the capture call for `id` with `template`.
    pub(crate) async fn mock_capture(server: &MockServer, id: &str, template: ResponseTemplate) {
        Mock::given(method("POST"))
            .and(path(format!("/v2/checkout/orders/{id}/capture")))
            .respond_with(template)
            .mount(server)
            .await;
    }

    pub(crate) fn already_captured() -> ResponseTemplate {
        ResponseTemplate::new(422).set_body_json(json!({
            "name": "UNPROCESSABLE_ENTITY",
            "message": "The requested action could not be performed.",
            "details": [{ "issue": "ORDER_ALREADY_CAPTURED" }]
        }))
    }

    #[test]
    fn test_urls_follow_mode() {
        assert_eq!(
            client(PayPalMode::Sandbox).url("/v2/checkout/orders"),
            "https://api-m.sandbox.paypal.com/v2/checkout/orders"
        );
        assert_eq!(
            client(PayPalMode::Live).url("/v1/oauth2/token"),
            "https://api-m.paypal.com/v1/oauth2/token"
        );
    }

    #[test]
    fn test_token_expiry_margin() {
        let now = chrono::Utc::now().timestamp();
        let fresh = AccessToken {
            value: SecretString::from("t"),
            expires_at: now + 3600,
        };
        assert!(!fresh.is_expired());

        let nearly = AccessToken {
            value: SecretString::from("t"),
            expires_at: now + 30,
        };
        assert!(nearly.is_expired());
    }

    #[tokio::test]
    async fn test_cached_token_is_reused() {
        let client = client(PayPalMode::Sandbox);
        *client.inner.token.write().await = Some(AccessToken {
            value: SecretString::from("cached"),
            expires_at: chrono::Utc::now().timestamp() + 3600,
        });
        let token = client.access_token().await.unwrap();
        assert_eq!(token.expose_secret(), "cached");
    }

    #[tokio::test]
    async fn test_create_order_sends_total_with_token() {
        let server = MockServer::start().await;
        let client = mock_client(&server).await;
        Mock::given(method("POST"))
            .and(path("/v2/checkout/orders"))
            .and(header("authorization", "Bearer test-token"))
            .and(body_partial_json(json!({
                "intent": "CAPTURE",
                "purchase_units": [{
                    "reference_id": "42",
                    "amount": { "currency_code": "USD", "value": "19.99" }
                }]
            })))
            .respond_with(
                ResponseTemplate::new(201)
                    .set_body_json(json!({ "id": "5O190127TN364715T", "status": "CREATED" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let amount = Price::new(Decimal::new(1999, 2), CurrencyCode::USD);
        let id = client.create_order(OrderId::new(42), amount).await.unwrap();
        assert_eq!(id, "5O190127TN364715T");
    }

    #[tokio::test]
    async fn test_token_fetched_once_for_several_calls() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/oauth2/token"))
            .and(header("content-type", "application/x-www-form-urlencoded"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "test-token",
                "expires_in": 32400
            })))
            .expect(1)
            .mount(&server)
            .await;
        mock_order_status(&server, "ABC", "APPROVED").await;
        let client = PayPalClient::with_base_url(config(PayPalMode::Sandbox), server.uri()).unwrap();

        assert_eq!(client.get_order("ABC").await.unwrap(), "APPROVED");
        assert_eq!(client.get_order("ABC").await.unwrap(), "APPROVED");
    }

    #[tokio::test]
    async fn test_rejected_credentials() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/oauth2/token"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "name": "invalid_client",
                "message": "Client Authentication failed"
            })))
            .mount(&server)
            .await;
        let client = PayPalClient::with_base_url(config(PayPalMode::Sandbox), server.uri()).unwrap();

        assert!(matches!(
            client.get_order("ABC").await,
            Err(PayPalError::AuthenticationFailed(message)) if message.contains("invalid_client")
        ));
    }

    #[tokio::test]
    async fn test_capture_reports_status() {
        let server = MockServer::start().await;
        let client = mock_client(&server).await;
        mock_capture(
            &server,
            "ABC",
            ResponseTemplate::new(201).set_body_json(json!({ "id": "ABC", "status": "PENDING" })),
        )
        .await;

        assert_eq!(client.capture_order("ABC").await.unwrap(), "PENDING");
    }

    #[tokio::test]
    async fn test_second_capture_is_recognised() {
        let server = MockServer::start().await;
        let client = mock_client(&server).await;
        mock_capture(&server, "ABC", already_captured()).await;

        let err = client.capture_order("ABC").await.unwrap_err();
        assert!(err.is_already_captured(), "{err}");

        let other = PayPalError::Api {
            status: 422,
            message: "UNPROCESSABLE_ENTITY (ORDER_NOT_APPROVED)".to_owned(),
        };
        assert!(!other.is_already_captured());
    }
}
