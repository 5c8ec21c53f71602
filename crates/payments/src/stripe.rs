//! Stripe REST implementation of [`PaymentGateway`].
//!
//! Uses PaymentIntents with `capture_method=manual` for authorize/capture,
//! the Refunds API and Connect transfers. Requests are form-encoded and
//! carry an `Idempotency-Key` header where a retry could double-charge.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::config::StripeConfig;
use crate::error::GatewayError;
use crate::gateway::{
    AuthorizeRequest, GatewayPayment, GatewayRefund, GatewayTransfer, PaymentGateway,
    TransferRequest,
};

/// PaymentIntent status after a successful manual-capture confirmation.
const STATUS_REQUIRES_CAPTURE: &str = "requires_capture";

type Form = Vec<(&'static str, String)>;

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct PaymentIntentResponse {
    id: String,
    status: String,
}

#[derive(Debug, Deserialize)]
struct RefundResponse {
    id: String,
    amount: i64,
}

#[derive(Debug, Deserialize)]
struct TransferResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(rename = "type")]
    kind: Option<String>,
    code: Option<String>,
    decline_code: Option<String>,
    message: Option<String>,
}

// ---------------------------------------------------------------------------
// Request encoding
// ---------------------------------------------------------------------------

fn authorize_form(request: &AuthorizeRequest) -> Form {
    vec![
        ("amount", request.amount.to_string()),
        ("currency", request.currency.clone()),
        ("payment_method", request.payment_method_id.clone()),
        ("capture_method", "manual".to_string()),
        ("confirm", "true".to_string()),
        ("automatic_payment_methods[enabled]", "true".to_string()),
        ("automatic_payment_methods[allow_redirects]", "never".to_string()),
    ]
}

fn refund_form(gateway_payment_id: &str, amount: i64) -> Form {
    vec![
        ("payment_intent", gateway_payment_id.to_string()),
        ("amount", amount.to_string()),
    ]
}

fn transfer_form(request: &TransferRequest) -> Form {
    vec![
        ("amount", request.amount.to_string()),
        ("currency", request.currency.clone()),
        ("destination", request.destination.clone()),
        ("transfer_group", request.transfer_group.clone()),
    ]
}

// ---------------------------------------------------------------------------
// Response decoding
// ---------------------------------------------------------------------------

/// Map a non-2xx response body to a [`GatewayError`].
fn parse_error(status: u16, body: &str) -> GatewayError {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody { error }) => {
            let message = error
                .message
                .unwrap_or_else(|| "Unknown gateway error".to_string());
            if error.kind.as_deref() == Some("card_error") {
                let reason = error.decline_code.or(error.code).unwrap_or(message);
                GatewayError::Declined(reason)
            } else {
                GatewayError::Api {
                    status,
                    code: error.code,
                    message,
                }
            }
        }
        Err(_) => GatewayError::Api {
            status,
            code: None,
            message: body.chars().take(200).collect(),
        },
    }
}

/// Treat an authorization that did not reach `requires_capture` as declined.
fn check_authorized(intent: PaymentIntentResponse) -> Result<GatewayPayment, GatewayError> {
    if intent.status != STATUS_REQUIRES_CAPTURE {
        return Err(GatewayError::Declined(format!(
            "Payment intent {} ended in status '{}'",
            intent.id, intent.status
        )));
    }
    Ok(GatewayPayment {
        id: intent.id,
        status: intent.status,
    })
}

// ---------------------------------------------------------------------------
// StripeGateway
// ---------------------------------------------------------------------------

/// Stripe-backed [`PaymentGateway`].
pub struct StripeGateway {
    client: reqwest::Client,
    config: StripeConfig,
}

impl StripeGateway {
    pub fn new(config: StripeConfig) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        form: &Form,
        idempotency_key: Option<&str>,
    ) -> Result<T, GatewayError> {
        let url = format!("{}{}", self.config.api_base, path);
        let mut request = self
            .client
            .post(&url)
            .bearer_auth(&self.config.secret_key)
            .form(form);
        if let Some(key) = idempotency_key {
            request = request.header("Idempotency-Key", key);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            let err = parse_error(status.as_u16(), &body);
            tracing::warn!(path, status = status.as_u16(), error = %err, "Stripe request failed");
            return Err(err);
        }
        serde_json::from_str(&body).map_err(|e| GatewayError::Decode(e.to_string()))
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn authorize(&self, request: &AuthorizeRequest) -> Result<GatewayPayment, GatewayError> {
        let intent: PaymentIntentResponse = self
            .post(
                "/v1/payment_intents",
                &authorize_form(request),
                Some(&request.idempotency_key),
            )
            .await?;
        check_authorized(intent)
    }

    async fn capture(&self, gateway_payment_id: &str) -> Result<GatewayPayment, GatewayError> {
        let path = format!("/v1/payment_intents/{gateway_payment_id}/capture");
        let intent: PaymentIntentResponse = self.post(&path, &Vec::new(), None).await?;
        Ok(GatewayPayment {
            id: intent.id,
            status: intent.status,
        })
    }

    async fn cancel(&self, gateway_payment_id: &str) -> Result<GatewayPayment, GatewayError> {
        let path = format!("/v1/payment_intents/{gateway_payment_id}/cancel");
        let intent: PaymentIntentResponse = self.post(&path, &Vec::new(), None).await?;
        Ok(GatewayPayment {
            id: intent.id,
            status: intent.status,
        })
    }

    async fn refund(
        &self,
        gateway_payment_id: &str,
        amount: i64,
        idempotency_key: &str,
    ) -> Result<GatewayRefund, GatewayError> {
        let refund: RefundResponse = self
            .post(
                "/v1/refunds",
                &refund_form(gateway_payment_id, amount),
                Some(idempotency_key),
            )
            .await?;
        Ok(GatewayRefund {
            id: refund.id,
            amount: refund.amount,
        })
    }

    async fn transfer(&self, request: &TransferRequest) -> Result<GatewayTransfer, GatewayError> {
        let transfer: TransferResponse = self
            .post(
                "/v1/transfers",
                &transfer_form(request),
                Some(&request.idempotency_key),
            )
            .await?;
        Ok(GatewayTransfer { id: transfer.id })
    }
}
