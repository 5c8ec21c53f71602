//! Agency ↔ talent affiliation lifecycle.
//!
//! An affiliation is requested by an owner of one side and answered by an
//! owner of the other side. Either side may end an active affiliation.

use crate::account::{ACCOUNT_TYPE_AGENCY, ACCOUNT_TYPE_TALENT};
use crate::error::CoreError;
use crate::status::AffiliationStatus;

/// Which end of an affiliation an account (or actor) is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Agency,
    Talent,
}

impl Side {
    pub fn as_str(self) -> &'static str {
        match self {
            Side::Agency => "agency",
            Side::Talent => "talent",
        }
    }

    pub fn from_str_opt(s: &str) -> Option<Self> {
        match s {
            "agency" => Some(Side::Agency),
            "talent" => Some(Side::Talent),
            _ => None,
        }
    }
}

fn disallowed(operation: &str, status: AffiliationStatus) -> CoreError {
    CoreError::Conflict(format!(
        "Disallowed affiliation operation: cannot {operation} an affiliation with status '{status}'"
    ))
}

/// Validate that the two accounts have the right types for their sides.
pub fn validate_parties(
    agency_account_type: &str,
    talent_account_type: &str,
) -> Result<(), CoreError> {
    if agency_account_type != ACCOUNT_TYPE_AGENCY {
        return Err(CoreError::Validation(
            "The agency side of an affiliation must be an agency account".into(),
        ));
    }
    if talent_account_type != ACCOUNT_TYPE_TALENT {
        return Err(CoreError::Validation(
            "The talent side of an affiliation must be a talent account".into(),
        ));
    }
    Ok(())
}

/// Refuse a new request while a pending or active affiliation exists.
pub fn ensure_no_open_affiliation(
    existing: impl IntoIterator<Item = AffiliationStatus>,
) -> Result<(), CoreError> {
    let open = existing
        .into_iter()
        .any(|s| matches!(s, AffiliationStatus::Pending | AffiliationStatus::Active));
    if open {
        return Err(CoreError::Conflict(
            "An affiliation between these accounts is already pending or active".into(),
        ));
    }
    Ok(())
}

/// Check that the actor is the counter-party of a pending request.
fn ensure_counter_party(requested_by: Side, actor: Side) -> Result<(), CoreError> {
    if requested_by == actor {
        return Err(CoreError::Forbidden(
            "Disallowed affiliation operation: the requesting side cannot answer its own request"
                .into(),
        ));
    }
    Ok(())
}

/// `Pending → Active`, answered by the counter-party.
pub fn approve(
    status: AffiliationStatus,
    requested_by: Side,
    actor: Side,
) -> Result<AffiliationStatus, CoreError> {
    if status != AffiliationStatus::Pending {
        return Err(disallowed("approve", status));
    }
    ensure_counter_party(requested_by, actor)?;
    Ok(AffiliationStatus::Active)
}

/// `Pending → Rejected`, answered by the counter-party.
pub fn reject(
    status: AffiliationStatus,
    requested_by: Side,
    actor: Side,
) -> Result<AffiliationStatus, CoreError> {
    if status != AffiliationStatus::Pending {
        return Err(disallowed("reject", status));
    }
    ensure_counter_party(requested_by, actor)?;
    Ok(AffiliationStatus::Rejected)
}

/// `Active → Terminated`, by either side.
pub fn terminate(status: AffiliationStatus) -> Result<AffiliationStatus, CoreError> {
    match status {
        AffiliationStatus::Active => Ok(AffiliationStatus::Terminated),
        other => Err(disallowed("terminate", other)),
    }
}
