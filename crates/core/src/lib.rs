//! Domain rules for the K-pop wiki platform.
//!
//! Everything in this crate is free of I/O so it can be shared by the
//! repository layer, the HTTP server and the settlement worker.

pub mod account;
pub mod affiliation;
pub mod auth_code;
pub mod error;
pub mod identifiers;
pub mod language;
pub mod money;
pub mod pagination;
pub mod payment;
pub mod policy;
pub mod roles;
pub mod settlement;
pub mod site;
pub mod status;
pub mod types;
pub mod validation;
pub mod wiki;
