//! Query parameter types shared by list endpoints.

use kwiki_core::language::Language;
use kwiki_core::pagination::{clamp_limit, clamp_offset, DEFAULT_LIMIT, MAX_LIMIT};
use serde::Deserialize;

/// `(limit, offset)` clamped to the allowed range.
fn clamped(limit: Option<i64>, offset: Option<i64>) -> (i64, i64) {
    (clamp_limit(limit, DEFAULT_LIMIT, MAX_LIMIT), clamp_offset(offset))
}

/// `?limit=&offset=`
#[derive(Debug, Default, Deserialize)]
pub struct PaginationParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl PaginationParams {
    pub fn clamped(&self) -> (i64, i64) {
        clamped(self.limit, self.offset)
    }
}

/// `?language=&q=&limit=&offset=` for published wiki listings.
#[derive(Debug, Deserialize)]
pub struct WikiListParams {
    pub language: Option<Language>,
    pub q: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl WikiListParams {
    pub fn clamped(&self) -> (i64, i64) {
        clamped(self.limit, self.offset)
    }
}

/// `?status=&limit=&offset=` for draft listings. `status` is a status name
/// such as `under_review`.
#[derive(Debug, Deserialize)]
pub struct DraftListParams {
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl DraftListParams {
    pub fn clamped(&self) -> (i64, i64) {
        clamped(self.limit, self.offset)
    }
}

/// `?language=&limit=&offset=` for announcement listings. The language is
/// required.
#[derive(Debug, Deserialize)]
pub struct AnnouncementListParams {
    pub language: Language,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl AnnouncementListParams {
    pub fn clamped(&self) -> (i64, i64) {
        clamped(self.limit, self.offset)
    }
}

/// `?category=&limit=&offset=` for the contact inbox.
#[derive(Debug, Deserialize)]
pub struct ContactListParams {
    pub category: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl ContactListParams {
    pub fn clamped(&self) -> (i64, i64) {
        clamped(self.limit, self.offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_is_clamped() {
        let params = PaginationParams {
            limit: Some(1_000),
            offset: Some(-5),
        };
        assert_eq!(params.clamped(), (MAX_LIMIT, 0));
        assert_eq!(PaginationParams::default().clamped(), (DEFAULT_LIMIT, 0));
    }
}
