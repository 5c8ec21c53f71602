//! Announcements and contact-form submissions.

use crate::error::CoreError;
use crate::validation::{validate_one_of, validate_required_text};

// ---------------------------------------------------------------------------
// Announcements
// ---------------------------------------------------------------------------

pub const ANNOUNCEMENT_NEWS: &str = "news";
pub const ANNOUNCEMENT_MAINTENANCE: &str = "maintenance";
pub const ANNOUNCEMENT_EVENT: &str = "event";

pub const VALID_ANNOUNCEMENT_CATEGORIES: &[&str] =
    &[ANNOUNCEMENT_NEWS, ANNOUNCEMENT_MAINTENANCE, ANNOUNCEMENT_EVENT];

pub const MAX_ANNOUNCEMENT_TITLE_LEN: usize = 64;
pub const MAX_ANNOUNCEMENT_CONTENT_LEN: usize = 5000;

pub fn validate_announcement(category: &str, title: &str, content: &str) -> Result<(), CoreError> {
    validate_one_of("category", category, VALID_ANNOUNCEMENT_CATEGORIES)?;
    validate_required_text("Title", title, MAX_ANNOUNCEMENT_TITLE_LEN)?;
    validate_required_text("Content", content, MAX_ANNOUNCEMENT_CONTENT_LEN)
}

// ---------------------------------------------------------------------------
// Contacts
// ---------------------------------------------------------------------------

pub const CONTACT_QUESTION: &str = "question";
pub const CONTACT_REQUEST: &str = "request";
pub const CONTACT_BUG_REPORT: &str = "bug_report";
pub const CONTACT_OTHER: &str = "other";

pub const VALID_CONTACT_CATEGORIES: &[&str] = &[
    CONTACT_QUESTION,
    CONTACT_REQUEST,
    CONTACT_BUG_REPORT,
    CONTACT_OTHER,
];

pub const MAX_CONTACT_NAME_LEN: usize = 32;
pub const MAX_CONTACT_CONTENT_LEN: usize = 512;

pub fn validate_contact(category: &str, name: &str, content: &str) -> Result<(), CoreError> {
    validate_one_of("category", category, VALID_CONTACT_CATEGORIES)?;
    validate_required_text("Name", name, MAX_CONTACT_NAME_LEN)?;
    validate_required_text("Content", content, MAX_CONTACT_CONTENT_LEN)
}
