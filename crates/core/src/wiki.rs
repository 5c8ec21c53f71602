//! Wiki content rules: resource kinds, field limits, and the draft review
//! workflow shared by agencies, groups, members and songs.
//!
//! A piece of content lives as a published row plus at most one draft per
//! language. Drafts move `Pending → UnderReview → Approved | Rejected`;
//! approved drafts are either published or fanned out into sibling drafts for
//! the languages the translation set is still missing.

use std::collections::HashSet;

use crate::error::CoreError;
use crate::language::Language;
use crate::status::ApprovalStatus;
use crate::types::{Date, EntityId};
use crate::validation::{validate_not_future, validate_optional_text, validate_required_text};

// ---------------------------------------------------------------------------
// Resource kinds
// ---------------------------------------------------------------------------

/// The kinds of wiki content that go through the draft workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Agency,
    Group,
    Member,
    Song,
}

impl ResourceKind {
    /// Human-readable entity name used in error messages.
    pub fn entity_name(self) -> &'static str {
        match self {
            ResourceKind::Agency => "Agency",
            ResourceKind::Group => "Group",
            ResourceKind::Member => "Member",
            ResourceKind::Song => "Song",
        }
    }

    /// Entity name for errors about the draft side.
    pub fn draft_entity_name(self) -> &'static str {
        match self {
            ResourceKind::Agency => "AgencyDraft",
            ResourceKind::Group => "GroupDraft",
            ResourceKind::Member => "MemberDraft",
            ResourceKind::Song => "SongDraft",
        }
    }

    /// Table holding published rows.
    pub fn published_table(self) -> &'static str {
        match self {
            ResourceKind::Agency => "agencies",
            ResourceKind::Group => "groups",
            ResourceKind::Member => "members",
            ResourceKind::Song => "songs",
        }
    }

    /// Table holding drafts.
    pub fn draft_table(self) -> &'static str {
        match self {
            ResourceKind::Agency => "draft_agencies",
            ResourceKind::Group => "draft_groups",
            ResourceKind::Member => "draft_members",
            ResourceKind::Song => "draft_songs",
        }
    }

    /// Path segment under `/api/wiki`.
    pub fn collection(self) -> &'static str {
        match self {
            ResourceKind::Agency => "agencies",
            ResourceKind::Group => "groups",
            ResourceKind::Member => "members",
            ResourceKind::Song => "songs",
        }
    }

    /// Lowercase name used for event sources and log fields.
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceKind::Agency => "agency",
            ResourceKind::Group => "group",
            ResourceKind::Member => "member",
            ResourceKind::Song => "song",
        }
    }
}

// ---------------------------------------------------------------------------
// Field limits
// ---------------------------------------------------------------------------

pub const MAX_NAME_LEN: usize = 32;
pub const MAX_SONG_NAME_LEN: usize = 64;
pub const MAX_PERSON_NAME_LEN: usize = 32;
pub const MAX_LONG_TEXT_LEN: usize = 5000;
pub const MAX_IMAGE_PATH_LEN: usize = 255;
pub const MAX_GROUPS_PER_MEMBER: usize = 20;

/// Validate the fields of an agency draft.
pub fn validate_agency(
    name: &str,
    ceo: Option<&str>,
    founded_in: Option<Date>,
    description: Option<&str>,
    today: Date,
) -> Result<(), CoreError> {
    validate_required_text("Agency name", name, MAX_NAME_LEN)?;
    validate_optional_text("CEO", ceo, MAX_PERSON_NAME_LEN)?;
    validate_not_future("Founding date", founded_in, today)?;
    validate_optional_text("Description", description, MAX_LONG_TEXT_LEN)
}

/// Validate the fields of a group draft.
pub fn validate_group(
    name: &str,
    description: Option<&str>,
    image_path: Option<&str>,
) -> Result<(), CoreError> {
    validate_required_text("Group name", name, MAX_NAME_LEN)?;
    validate_optional_text("Description", description, MAX_LONG_TEXT_LEN)?;
    validate_optional_text("Image path", image_path, MAX_IMAGE_PATH_LEN)
}

/// Validate the fields of a member draft.
pub fn validate_member(
    name: &str,
    real_name: Option<&str>,
    birthday: Option<Date>,
    group_ids: &[EntityId],
    career: Option<&str>,
    image_path: Option<&str>,
    today: Date,
) -> Result<(), CoreError> {
    validate_required_text("Member name", name, MAX_NAME_LEN)?;
    validate_optional_text("Real name", real_name, MAX_PERSON_NAME_LEN)?;
    validate_not_future("Birthday", birthday, today)?;
    validate_reference_ids("group_ids", group_ids, MAX_GROUPS_PER_MEMBER)?;
    validate_optional_text("Career", career, MAX_LONG_TEXT_LEN)?;
    validate_optional_text("Image path", image_path, MAX_IMAGE_PATH_LEN)
}

/// Validate the fields of a song draft.
pub fn validate_song(
    name: &str,
    lyricist: Option<&str>,
    composer: Option<&str>,
    release_date: Option<Date>,
    overview: Option<&str>,
    cover_image_path: Option<&str>,
    today: Date,
) -> Result<(), CoreError> {
    validate_required_text("Song name", name, MAX_SONG_NAME_LEN)?;
    validate_optional_text("Lyricist", lyricist, MAX_PERSON_NAME_LEN)?;
    validate_optional_text("Composer", composer, MAX_PERSON_NAME_LEN)?;
    validate_not_future("Release date", release_date, today)?;
    validate_optional_text("Overview", overview, MAX_LONG_TEXT_LEN)?;
    validate_optional_text("Cover image path", cover_image_path, MAX_IMAGE_PATH_LEN)
}

/// Validate a list of referenced ids: bounded and free of duplicates.
pub fn validate_reference_ids(
    field: &str,
    ids: &[EntityId],
    max: usize,
) -> Result<(), CoreError> {
    if ids.len() > max {
        return Err(CoreError::Validation(format!(
            "{field} may contain at most {max} entries"
        )));
    }
    let mut seen = HashSet::with_capacity(ids.len());
    for id in ids {
        if !seen.insert(id) {
            return Err(CoreError::Validation(format!(
                "{field} contains duplicate id {id}"
            )));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Review workflow
// ---------------------------------------------------------------------------

fn illegal(action: &str, status: ApprovalStatus) -> CoreError {
    CoreError::Conflict(format!("Cannot {action} a draft with status '{status}'"))
}

/// Status a draft takes after its content is edited.
///
/// Pending drafts stay pending; rejected drafts go back to pending so they
/// can be resubmitted. Drafts under review or approved are frozen.
pub fn status_after_edit(status: ApprovalStatus) -> Result<ApprovalStatus, CoreError> {
    match status {
        ApprovalStatus::Pending | ApprovalStatus::Rejected => Ok(ApprovalStatus::Pending),
        other => Err(illegal("edit", other)),
    }
}

/// `Pending → UnderReview`.
pub fn submit(status: ApprovalStatus) -> Result<ApprovalStatus, CoreError> {
    match status {
        ApprovalStatus::Pending => Ok(ApprovalStatus::UnderReview),
        other => Err(illegal("submit", other)),
    }
}

/// `UnderReview → Approved`, unless another draft of the same translation set
/// has been approved and is still waiting to be translated.
pub fn approve(
    status: ApprovalStatus,
    approved_sibling_exists: bool,
) -> Result<ApprovalStatus, CoreError> {
    if status != ApprovalStatus::UnderReview {
        return Err(illegal("approve", status));
    }
    if approved_sibling_exists {
        return Err(CoreError::Conflict(
            "Another draft in this translation set is approved but not yet translated".into(),
        ));
    }
    Ok(ApprovalStatus::Approved)
}

/// `UnderReview → Rejected`.
pub fn reject(status: ApprovalStatus) -> Result<ApprovalStatus, CoreError> {
    match status {
        ApprovalStatus::UnderReview => Ok(ApprovalStatus::Rejected),
        other => Err(illegal("reject", other)),
    }
}

/// Only approved drafts can be published.
pub fn ensure_publishable(status: ApprovalStatus) -> Result<(), CoreError> {
    match status {
        ApprovalStatus::Approved => Ok(()),
        other => Err(illegal("publish", other)),
    }
}

/// Only approved drafts can be translated.
pub fn ensure_translatable(status: ApprovalStatus) -> Result<(), CoreError> {
    match status {
        ApprovalStatus::Approved => Ok(()),
        other => Err(illegal("translate", other)),
    }
}

/// Whether any sibling other than `exclude` is approved.
pub fn has_approved_sibling<I>(siblings: I, exclude: EntityId) -> bool
where
    I: IntoIterator<Item = (EntityId, ApprovalStatus)>,
{
    siblings
        .into_iter()
        .any(|(id, status)| id != exclude && status == ApprovalStatus::Approved)
}

/// Languages in [`Language::ALL`] that are not yet covered by `present`.
pub fn missing_languages<I>(present: I) -> Vec<Language>
where
    I: IntoIterator<Item = Language>,
{
    let present: HashSet<Language> = present.into_iter().collect();
    Language::ALL
        .into_iter()
        .filter(|lang| !present.contains(lang))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identifiers::new_id;

    fn today() -> Date {
        Date::from_ymd_opt(2024, 6, 1).unwrap()
    }

    // -- field validation ----------------------------------------------------

    #[test]
    fn agency_requires_name() {
        assert!(validate_agency("", None, None, None, today()).is_err());
        assert!(validate_agency("JYP", Some("Park Jin-young"), None, None, today()).is_ok());
    }

    #[test]
    fn agency_name_limit_is_32_chars() {
        let name = "가".repeat(32);
        assert!(validate_agency(&name, None, None, None, today()).is_ok());
        let name = "가".repeat(33);
        assert!(validate_agency(&name, None, None, None, today()).is_err());
    }

    #[test]
    fn agency_founding_date_not_in_future() {
        let tomorrow = today().succ_opt();
        assert!(validate_agency("HYBE", None, tomorrow, None, today()).is_err());
    }

    #[test]
    fn member_group_ids_must_be_unique() {
        let id = new_id();
        let err =
            validate_member("Nayeon", None, None, &[id, id], None, None, today()).unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn member_group_ids_bounded() {
        let ids: Vec<EntityId> = (0..=MAX_GROUPS_PER_MEMBER).map(|_| new_id()).collect();
        assert!(validate_member("Nayeon", None, None, &ids, None, None, today()).is_err());
    }

    #[test]
    fn song_name_allows_64_chars() {
        let name = "a".repeat(64);
        assert!(validate_song(&name, None, None, None, None, None, today()).is_ok());
        let name = "a".repeat(65);
        assert!(validate_song(&name, None, None, None, None, None, today()).is_err());
    }

    #[test]
    fn group_image_path_bounded() {
        let path = "x".repeat(MAX_IMAGE_PATH_LEN + 1);
        assert!(validate_group("TWICE", None, Some(&path)).is_err());
    }

    // -- workflow ------------------------------------------------------------

    #[test]
    fn edit_keeps_pending_and_reopens_rejected() {
        assert_eq!(
            status_after_edit(ApprovalStatus::Pending).unwrap(),
            ApprovalStatus::Pending
        );
        assert_eq!(
            status_after_edit(ApprovalStatus::Rejected).unwrap(),
            ApprovalStatus::Pending
        );
        assert!(status_after_edit(ApprovalStatus::UnderReview).is_err());
        assert!(status_after_edit(ApprovalStatus::Approved).is_err());
    }

    #[test]
    fn submit_only_from_pending() {
        assert_eq!(
            submit(ApprovalStatus::Pending).unwrap(),
            ApprovalStatus::UnderReview
        );
        let err = submit(ApprovalStatus::Approved).unwrap_err();
        assert!(matches!(err, CoreError::Conflict(_)));
        assert!(err.to_string().contains("approved"));
    }

    #[test]
    fn approve_requires_under_review() {
        assert!(approve(ApprovalStatus::Pending, false).is_err());
        assert_eq!(
            approve(ApprovalStatus::UnderReview, false).unwrap(),
            ApprovalStatus::Approved
        );
    }

    #[test]
    fn approve_blocked_by_approved_sibling() {
        let err = approve(ApprovalStatus::UnderReview, true).unwrap_err();
        assert!(err.to_string().contains("not yet translated"));
    }

    #[test]
    fn reject_only_under_review() {
        assert_eq!(
            reject(ApprovalStatus::UnderReview).unwrap(),
            ApprovalStatus::Rejected
        );
        assert!(reject(ApprovalStatus::Rejected).is_err());
    }

    #[test]
    fn publish_and_translate_require_approval() {
        assert!(ensure_publishable(ApprovalStatus::Approved).is_ok());
        assert!(ensure_publishable(ApprovalStatus::UnderReview).is_err());
        assert!(ensure_translatable(ApprovalStatus::Approved).is_ok());
        assert!(ensure_translatable(ApprovalStatus::Pending).is_err());
    }

    // -- sibling check -------------------------------------------------------

    #[test]
    fn sibling_check_skips_self() {
        let me = new_id();
        let siblings = vec![(me, ApprovalStatus::Approved)];
        assert!(!has_approved_sibling(siblings, me));
    }

    #[test]
    fn sibling_check_finds_other_approved() {
        let me = new_id();
        let other = new_id();
        let siblings = vec![
            (me, ApprovalStatus::UnderReview),
            (other, ApprovalStatus::Approved),
        ];
        assert!(has_approved_sibling(siblings, me));
    }

    #[test]
    fn sibling_check_ignores_non_approved() {
        let me = new_id();
        let siblings = vec![
            (new_id(), ApprovalStatus::Pending),
            (new_id(), ApprovalStatus::Rejected),
            (new_id(), ApprovalStatus::UnderReview),
        ];
        assert!(!has_approved_sibling(siblings, me));
    }

    #[test]
    fn missing_languages_preserves_order() {
        assert_eq!(
            missing_languages([Language::Ja]),
            vec![Language::Ko, Language::En]
        );
        assert!(missing_languages(Language::ALL).is_empty());
    }

    #[test]
    fn resource_tables() {
        assert_eq!(ResourceKind::Agency.draft_table(), "draft_agencies");
        assert_eq!(ResourceKind::Song.published_table(), "songs");
        assert_eq!(ResourceKind::Member.draft_entity_name(), "MemberDraft");
    }
}
