//! Event type names published on the bus.

pub const WIKI_DRAFT_SUBMITTED: &str = "wiki.draft.submitted";
pub const WIKI_DRAFT_APPROVED: &str = "wiki.draft.approved";
pub const WIKI_DRAFT_REJECTED: &str = "wiki.draft.rejected";
pub const WIKI_PUBLISHED: &str = "wiki.published";
pub const WIKI_TRANSLATED: &str = "wiki.translated";

/// A verification code was issued; payload carries `email`, `language`,
/// `code` and `ttl_mins`.
pub const AUTH_CODE_ISSUED: &str = "identity.auth_code.issued";

/// Someone asked for a code for an address that is already registered;
/// payload carries `email` and `language`.
pub const REGISTRATION_CONFLICT: &str = "identity.registration.conflict";

pub const IDENTITY_REGISTERED: &str = "identity.registered";
pub const PRINCIPAL_ROLE_CHANGED: &str = "identity.principal.role_changed";

pub const AFFILIATION_REQUESTED: &str = "account.affiliation.requested";
pub const AFFILIATION_APPROVED: &str = "account.affiliation.approved";
pub const AFFILIATION_REJECTED: &str = "account.affiliation.rejected";
pub const AFFILIATION_TERMINATED: &str = "account.affiliation.terminated";

pub const PAYMENT_AUTHORIZED: &str = "monetization.payment.authorized";
pub const PAYMENT_FAILED: &str = "monetization.payment.failed";
pub const PAYMENT_CAPTURED: &str = "monetization.payment.captured";
pub const PAYMENT_REFUNDED: &str = "monetization.payment.refunded";
pub const SETTLEMENT_BATCH_CLOSED: &str = "monetization.settlement.batch_closed";
