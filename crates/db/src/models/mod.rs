//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` input DTO for inserts and replacements

pub mod account;
pub mod affiliation;
pub mod agency;
pub mod announcement;
pub mod auth_code;
pub mod contact;
pub mod draft;
pub mod group;
pub mod identity;
pub mod member;
pub mod payment;
pub mod session;
pub mod settlement;
pub mod song;
