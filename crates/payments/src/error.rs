//! Gateway error type.

/// Error returned by [`PaymentGateway`](crate::PaymentGateway) operations.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Network, DNS, TLS or timeout failure.
    #[error("Gateway request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider answered with a non-2xx status.
    #[error("Gateway returned HTTP {status}: {message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },

    /// The card or payment method was declined.
    #[error("Payment declined: {0}")]
    Declined(String),

    /// The provider's response could not be understood.
    #[error("Unexpected gateway response: {0}")]
    Decode(String),
}

impl GatewayError {
    /// Whether retrying the same request could succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            GatewayError::Request(_) => true,
            GatewayError::Api { status, .. } => *status == 429 || *status >= 500,
            GatewayError::Declined(_) | GatewayError::Decode(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_display() {
        let err = GatewayError::Api {
            status: 400,
            code: Some("parameter_invalid_integer".into()),
            message: "Invalid integer".into(),
        };
        assert_eq!(err.to_string(), "Gateway returned HTTP 400: Invalid integer");
    }

    #[test]
    fn retryable_classification() {
        let server = GatewayError::Api {
            status: 503,
            code: None,
            message: "unavailable".into(),
        };
        let client = GatewayError::Api {
            status: 400,
            code: None,
            message: "bad".into(),
        };
        assert!(server.is_retryable());
        assert!(!client.is_retryable());
        assert!(!GatewayError::Declined("insufficient_funds".into()).is_retryable());
    }
}
