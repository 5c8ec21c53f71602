//! Payment and payout gateway integration.
//!
//! - [`PaymentGateway`] -- the operations the platform needs from a payment
//!   provider: manual-capture authorization, capture, cancel, refund and
//!   connected-account transfers.
//! - [`StripeGateway`] -- the Stripe REST implementation.

pub mod config;
pub mod error;
pub mod gateway;
#[cfg(any(test, feature = "test-util"))]
pub mod memory;
pub mod stripe;

pub use config::StripeConfig;
pub use error::GatewayError;
pub use gateway::{
    AuthorizeRequest, GatewayPayment, GatewayRefund, GatewayTransfer, PaymentGateway,
    TransferRequest,
};
pub use stripe::StripeGateway;
