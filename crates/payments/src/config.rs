//! Stripe connection settings.

const DEFAULT_API_BASE: &str = "https://api.stripe.com";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for [`StripeGateway`](crate::StripeGateway).
#[derive(Debug, Clone)]
pub struct StripeConfig {
    /// Secret API key (`sk_live_...` / `sk_test_...`).
    pub secret_key: String,
    /// API base URL without trailing slash.
    pub api_base: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl StripeConfig {
    /// Load configuration from environment variables.
    ///
    /// Returns `None` if `STRIPE_SECRET_KEY` is not set.
    ///
    /// | Variable              | Required | Default                  |
    /// |-----------------------|----------|--------------------------|
    /// | `STRIPE_SECRET_KEY`   | yes      |                          |
    /// | `STRIPE_API_BASE`     | no       | `https://api.stripe.com` |
    /// | `STRIPE_TIMEOUT_SECS` | no       | `30`                     |
    pub fn from_env() -> Option<Self> {
        let secret_key = std::env::var("STRIPE_SECRET_KEY").ok()?;
        Some(Self {
            secret_key,
            api_base: std::env::var("STRIPE_API_BASE")
                .map(|b| b.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| DEFAULT_API_BASE.to_string()),
            timeout_secs: std::env::var("STRIPE_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
        })
    }
}
