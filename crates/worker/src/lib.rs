//! Settlement payout processing.
//!
//! - [`transfers`] -- executes a single transfer through the gateway with
//!   the retry policy.
//! - [`processor`] -- finds due transfers and records their outcome.
//! - [`cli`] -- the `kwiki-settlement` command line.

pub mod cli;
pub mod processor;
pub mod transfers;

pub use processor::{ProcessReport, SettlementProcessor, TransferSummary};
