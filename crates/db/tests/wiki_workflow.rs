//! Integration tests for wiki drafts: creation, review transitions,
//! publication and translation.

use assert_matches::assert_matches;
use sqlx::PgPool;
use kwiki_core::identifiers::new_id;
use kwiki_core::language::Language;
use kwiki_core::roles::ROLE_COLLABORATOR;
use kwiki_core::status::ApprovalStatus;
use kwiki_core::types::EntityId;
use kwiki_core::wiki::ResourceKind;
use kwiki_db::models::agency::AgencyContent;
use kwiki_db::models::identity::CreateIdentity;
use kwiki_db::models::member::MemberContent;
use kwiki_db::repositories::{AgencyRepo, DraftRepo, IdentityRepo, MemberRepo};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn editor(pool: &PgPool) -> EntityId {
    let input = CreateIdentity {
        username: "editor".to_string(),
        email: format!("{}@example.com", new_id()),
        password_hash: "hash".to_string(),
        language: "ko".to_string(),
    };
    let (identity, _) = IdentityRepo::create_with_principal(pool, &input, ROLE_COLLABORATOR)
        .await
        .unwrap();
    identity.id
}

fn agency(name: &str) -> AgencyContent {
    AgencyContent {
        name: name.to_string(),
        ceo: Some("Bang Si-hyuk".to_string()),
        founded_in: chrono::NaiveDate::from_ymd_opt(2005, 2, 1),
        description: None,
    }
}

async fn approved_agency_draft(pool: &PgPool, editor_id: EntityId, language: Language) -> EntityId {
    let draft = AgencyRepo::create_draft(pool, new_id(), language, editor_id, &agency("HYBE"))
        .await
        .unwrap();
    for (from, to) in [
        (ApprovalStatus::Pending, ApprovalStatus::UnderReview),
        (ApprovalStatus::UnderReview, ApprovalStatus::Approved),
    ] {
        DraftRepo::update_status(pool, ResourceKind::Agency, draft.id, from, to)
            .await
            .unwrap()
            .unwrap();
    }
    draft.id
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_draft_starts_pending(pool: PgPool) {
    let editor_id = editor(&pool).await;
    let draft = AgencyRepo::create_draft(&pool, new_id(), Language::Ko, editor_id, &agency("JYP"))
        .await
        .unwrap();

    assert_eq!(draft.status_id, ApprovalStatus::Pending.id());
    assert_eq!(draft.language, "ko");
    assert_eq!(draft.editor_id, editor_id);
    assert!(draft.published_id.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_status_requires_expected_status(pool: PgPool) {
    let editor_id = editor(&pool).await;
    let draft = AgencyRepo::create_draft(&pool, new_id(), Language::Ko, editor_id, &agency("SM"))
        .await
        .unwrap();

    let stale = DraftRepo::update_status(
        &pool,
        ResourceKind::Agency,
        draft.id,
        ApprovalStatus::UnderReview,
        ApprovalStatus::Approved,
    )
    .await
    .unwrap();
    assert!(stale.is_none());

    let submitted = DraftRepo::update_status(
        &pool,
        ResourceKind::Agency,
        draft.id,
        ApprovalStatus::Pending,
        ApprovalStatus::UnderReview,
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(submitted.status().unwrap(), ApprovalStatus::UnderReview);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_publish_new_draft_inserts_and_deletes_draft(pool: PgPool) {
    let editor_id = editor(&pool).await;
    let draft_id = approved_agency_draft(&pool, editor_id, Language::Ko).await;

    let published_id = DraftRepo::publish(&pool, ResourceKind::Agency, draft_id)
        .await
        .unwrap()
        .unwrap();

    let published = AgencyRepo::find_by_id(&pool, published_id).await.unwrap().unwrap();
    assert_eq!(published.name, "HYBE");
    assert_eq!(published.language, "ko");
    assert!(AgencyRepo::find_draft(&pool, draft_id).await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_publish_refuses_unapproved_draft(pool: PgPool) {
    let editor_id = editor(&pool).await;
    let draft = AgencyRepo::create_draft(&pool, new_id(), Language::Ko, editor_id, &agency("YG"))
        .await
        .unwrap();

    let result = DraftRepo::publish(&pool, ResourceKind::Agency, draft.id).await.unwrap();
    assert!(result.is_none());
    assert!(AgencyRepo::find_draft(&pool, draft.id).await.unwrap().is_some());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_edit_published_updates_in_place(pool: PgPool) {
    let editor_id = editor(&pool).await;
    let draft_id = approved_agency_draft(&pool, editor_id, Language::Ko).await;
    let published_id = DraftRepo::publish(&pool, ResourceKind::Agency, draft_id)
        .await
        .unwrap()
        .unwrap();

    let header = DraftRepo::start_from_published(&pool, ResourceKind::Agency, published_id, editor_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(header.published_id, Some(published_id));

    let existing = DraftRepo::find_header_by_published(&pool, ResourceKind::Agency, published_id)
        .await
        .unwrap();
    assert_matches!(existing, Some(h) if h.id == header.id);

    let pending = ApprovalStatus::Pending.id();
    AgencyRepo::update_draft(&pool, header.id, pending, pending, &agency("HYBE Corporation"))
        .await
        .unwrap()
        .unwrap();
    for (from, to) in [
        (ApprovalStatus::Pending, ApprovalStatus::UnderReview),
        (ApprovalStatus::UnderReview, ApprovalStatus::Approved),
    ] {
        DraftRepo::update_status(&pool, ResourceKind::Agency, header.id, from, to)
            .await
            .unwrap()
            .unwrap();
    }

    let republished = DraftRepo::publish(&pool, ResourceKind::Agency, header.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(republished, published_id);
    let row = AgencyRepo::find_by_id(&pool, published_id).await.unwrap().unwrap();
    assert_eq!(row.name, "HYBE Corporation");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_translate_creates_pending_siblings(pool: PgPool) {
    let editor_id = editor(&pool).await;
    let draft_id = approved_agency_draft(&pool, editor_id, Language::Ko).await;
    let source = AgencyRepo::find_draft(&pool, draft_id).await.unwrap().unwrap();

    let created = DraftRepo::translate(
        &pool,
        ResourceKind::Agency,
        draft_id,
        &[Language::Ja, Language::En],
        editor_id,
    )
    .await
    .unwrap();

    assert_eq!(created.len(), 2);
    assert!(created
        .iter()
        .all(|h| h.translation_set_identifier == source.translation_set_identifier
            && h.status_id == ApprovalStatus::Pending.id()));

    let set = DraftRepo::list_translation_set(
        &pool,
        ResourceKind::Agency,
        source.translation_set_identifier,
    )
    .await
    .unwrap();
    assert_eq!(set.len(), 3);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_language_in_set_rejected(pool: PgPool) {
    let editor_id = editor(&pool).await;
    let set = new_id();
    AgencyRepo::create_draft(&pool, set, Language::Ko, editor_id, &agency("A"))
        .await
        .unwrap();
    let err = AgencyRepo::create_draft(&pool, set, Language::Ko, editor_id, &agency("B"))
        .await
        .unwrap_err();

    let db_err = err.as_database_error().unwrap();
    assert_eq!(db_err.constraint(), Some("uq_draft_agencies_translation"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_member_group_ids_round_trip(pool: PgPool) {
    let editor_id = editor(&pool).await;
    let group_ids = vec![new_id(), new_id()];
    let content = MemberContent {
        name: "Jimin".to_string(),
        real_name: Some("Park Jimin".to_string()),
        birthday: chrono::NaiveDate::from_ymd_opt(1995, 10, 13),
        agency_id: None,
        group_ids: group_ids.clone(),
        career: None,
        image_path: None,
    };
    let draft = MemberRepo::create_draft(&pool, new_id(), Language::En, editor_id, &content)
        .await
        .unwrap();
    assert_eq!(draft.group_ids, group_ids);

    let count = DraftRepo::count_published(&pool, ResourceKind::Group, &group_ids)
        .await
        .unwrap();
    assert_eq!(count, 0);
}
