//! Identifier generation and format validation.
//!
//! Internal ids are UUID v7 (time-ordered, so btree indexes stay compact).
//! External references handed to third parties, such as payment idempotency
//! keys and contact reference numbers, are ULIDs.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::CoreError;
use crate::types::EntityId;

/// Canonical hyphenated UUID with version nibble `7` and RFC 4122 variant.
static UUID_V7_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9a-f]{8}-[0-9a-f]{4}-7[0-9a-f]{3}-[89ab][0-9a-f]{3}-[0-9a-f]{12}$")
        .expect("valid regex")
});

/// 26 Crockford base32 characters; the first must be `0`-`7` so the value
/// fits in 128 bits.
static ULID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-7][0-9A-HJKMNP-TV-Z]{25}$").expect("valid regex"));

/// Crockford base32 alphabet used when encoding ULIDs.
const CROCKFORD: &[u8; 32] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";

/// Generate a new time-ordered entity id.
pub fn new_id() -> EntityId {
    EntityId::now_v7()
}

/// Validate that `value` is a canonical lowercase UUID v7.
pub fn validate_uuid_v7(value: &str) -> Result<(), CoreError> {
    if UUID_V7_RE.is_match(value) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "'{value}' is not a valid UUID v7 identifier"
        )))
    }
}

/// Parse a UUID v7 from a string, validating its format first.
pub fn parse_uuid_v7(value: &str) -> Result<EntityId, CoreError> {
    validate_uuid_v7(value)?;
    EntityId::parse_str(value)
        .map_err(|e| CoreError::Validation(format!("'{value}' is not a valid UUID: {e}")))
}

/// Validate that `value` is an uppercase ULID.
pub fn validate_ulid(value: &str) -> Result<(), CoreError> {
    if ULID_RE.is_match(value) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "'{value}' is not a valid ULID"
        )))
    }
}

/// Encode a UUID's 128 bits as a ULID string.
///
/// A UUID v7 starts with a 48-bit millisecond timestamp, exactly like a ULID,
/// so the encoded value sorts in creation order.
pub fn ulid_from_uuid(id: EntityId) -> String {
    let mut value = id.as_u128();
    let mut out = [b'0'; 26];
    for slot in out.iter_mut().rev() {
        *slot = CROCKFORD[(value & 0x1f) as usize];
        value >>= 5;
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// Generate a fresh ULID.
pub fn new_ulid() -> String {
    ulid_from_uuid(new_id())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_v7() {
        let id = new_id();
        assert!(validate_uuid_v7(&id.to_string()).is_ok());
    }

    #[test]
    fn v4_uuid_rejected() {
        let v4 = uuid::Uuid::new_v4().to_string();
        assert!(validate_uuid_v7(&v4).is_err());
    }

    #[test]
    fn uppercase_uuid_rejected() {
        let id = new_id().to_string().to_uppercase();
        assert!(validate_uuid_v7(&id).is_err());
    }

    #[test]
    fn parse_uuid_v7_round_trips() {
        let id = new_id();
        assert_eq!(parse_uuid_v7(&id.to_string()).unwrap(), id);
    }

    #[test]
    fn valid_ulid_accepted() {
        assert!(validate_ulid("01ARZ3NDEKTSV4RRFFQ69G5FAV").is_ok());
    }

    #[test]
    fn ulid_with_forbidden_letters_rejected() {
        // I, L, O and U are not part of the Crockford alphabet.
        assert!(validate_ulid("01ARZ3NDEKTSV4RRFFQ69G5FAI").is_err());
        assert!(validate_ulid("01ARZ3NDEKTSV4RRFFQ69G5FAU").is_err());
    }

    #[test]
    fn ulid_overflowing_first_char_rejected() {
        assert!(validate_ulid("81ARZ3NDEKTSV4RRFFQ69G5FAV").is_err());
    }

    #[test]
    fn ulid_wrong_length_rejected() {
        assert!(validate_ulid("01ARZ3NDEK").is_err());
        assert!(validate_ulid("").is_err());
    }

    #[test]
    fn encoded_ulid_is_valid() {
        let ulid = new_ulid();
        assert_eq!(ulid.len(), 26);
        assert!(validate_ulid(&ulid).is_ok(), "{ulid} should be a valid ULID");
    }

    #[test]
    fn nil_uuid_encodes_to_zero_ulid() {
        assert_eq!(ulid_from_uuid(uuid::Uuid::nil()), "0".repeat(26));
    }
}
