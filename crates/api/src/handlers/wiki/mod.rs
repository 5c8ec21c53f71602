//! Handlers for `/wiki/{kind}s`.
//!
//! Per-kind modules own the content-bearing endpoints (listing, creating and
//! editing drafts). The review workflow is the same for every kind, so it is
//! written once here, generic over [`WikiResource`].

pub mod agency;
pub mod group;
pub mod member;
pub mod song;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use kwiki_core::error::CoreError;
use kwiki_core::identifiers::new_id;
use kwiki_core::language::Language;
use kwiki_core::policy::{authorize, can_edit_others_drafts, WikiAction};
use kwiki_core::status::{ApprovalStatus, StatusId};
use kwiki_core::types::{Date, EntityId};
use kwiki_core::wiki::{self, ResourceKind};
use kwiki_db::models::draft::DraftHeader;
use kwiki_db::repositories::{DraftRepo, WikiResource};
use kwiki_events::{event_types, PlatformEvent};
use serde::Serialize;
use sqlx::PgPool;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct Published {
    pub published_id: EntityId,
}

// ---------------------------------------------------------------------------
// Shared helpers for the per-kind modules
// ---------------------------------------------------------------------------

pub(crate) fn today() -> Date {
    chrono::Utc::now().date_naive()
}

/// Translation set for a new draft: the requested one, or a fresh id.
pub(crate) fn translation_set(requested: Option<EntityId>) -> EntityId {
    requested.unwrap_or_else(new_id)
}

/// Translation set for a new wiki draft.
///
/// A language that is already published in the requested set is edited
/// through `POST /api/wiki/{collection}/{id}/drafts`, not by creating a
/// second entry.
pub(crate) async fn draft_translation_set(
    pool: &PgPool,
    kind: ResourceKind,
    requested: Option<EntityId>,
    language: Language,
) -> AppResult<EntityId> {
    let Some(tsi) = requested else {
        return Ok(new_id());
    };
    if let Some(published_id) = DraftRepo::find_published_in_set(pool, kind, tsi, language).await? {
        return Err(CoreError::Conflict(format!(
            "'{language}' is already published in this translation set as {published_id}; \
             start editing it with POST /api/wiki/{}/{published_id}/drafts",
            kind.collection()
        ))
        .into());
    }
    Ok(tsi)
}

/// Parse a `?status=` filter given by status name.
pub(crate) fn parse_status_filter(status: Option<&str>) -> Result<Option<StatusId>, CoreError> {
    const ALL: [ApprovalStatus; 4] = [
        ApprovalStatus::Pending,
        ApprovalStatus::UnderReview,
        ApprovalStatus::Approved,
        ApprovalStatus::Rejected,
    ];
    let Some(name) = status else {
        return Ok(None);
    };
    ALL.iter()
        .find(|s| s.name() == name)
        .map(|s| Some(s.id()))
        .ok_or_else(|| CoreError::Validation(format!("Unknown draft status '{name}'")))
}

/// Referenced content must already be published.
pub(crate) async fn ensure_published(
    pool: &PgPool,
    kind: ResourceKind,
    id: Option<EntityId>,
) -> AppResult<()> {
    if let Some(id) = id {
        if !DraftRepo::published_exists(pool, kind, id).await? {
            return Err(CoreError::Validation(format!(
                "Referenced {} {id} does not exist",
                kind.entity_name()
            ))
            .into());
        }
    }
    Ok(())
}

/// Every id in `ids` must be published. Duplicates are rejected earlier by
/// field validation, so counting is enough.
pub(crate) async fn ensure_all_published(
    pool: &PgPool,
    kind: ResourceKind,
    ids: &[EntityId],
) -> AppResult<()> {
    if ids.is_empty() {
        return Ok(());
    }
    let found = DraftRepo::count_published(pool, kind, ids).await?;
    if found != ids.len() as i64 {
        return Err(CoreError::Validation(format!(
            "Some referenced {} ids do not exist",
            kind.entity_name()
        ))
        .into());
    }
    Ok(())
}

/// Drafts are edited by their editor, or by a senior collaborator and up.
pub(crate) fn ensure_may_edit(user: &AuthUser, editor_id: EntityId) -> Result<(), CoreError> {
    authorize(&user.role, WikiAction::EditDraft)?;
    if editor_id != user.identity_id && !can_edit_others_drafts(&user.role) {
        return Err(CoreError::Forbidden(
            "Only the editor of this draft may change it".into(),
        ));
    }
    Ok(())
}

/// Error for a conditional update that matched no row because the status
/// changed underneath the request.
pub(crate) fn concurrently_changed(kind: ResourceKind, id: EntityId) -> CoreError {
    CoreError::Conflict(format!(
        "{} {id} was changed by another request; reload and retry",
        kind.draft_entity_name()
    ))
}

async fn load_header(pool: &PgPool, kind: ResourceKind, id: EntityId) -> AppResult<DraftHeader> {
    DraftRepo::find_header(pool, kind, id)
        .await?
        .ok_or_else(|| {
            CoreError::NotFound {
                entity: kind.draft_entity_name(),
                id,
            }
            .into()
        })
}

fn publish_event(
    state: &AppState,
    event_type: &str,
    kind: ResourceKind,
    id: EntityId,
    actor: &AuthUser,
) {
    state.event_bus.publish(
        PlatformEvent::new(event_type)
            .with_source(kind.as_str(), id)
            .with_actor(actor.identity_id),
    );
}

// ---------------------------------------------------------------------------
// Workflow handlers
// ---------------------------------------------------------------------------

/// Apply a status transition computed from the stored status.
async fn transition<R: WikiResource>(
    state: &AppState,
    user: &AuthUser,
    id: EntityId,
    next: impl FnOnce(ApprovalStatus) -> Result<ApprovalStatus, CoreError>,
) -> AppResult<DraftHeader> {
    let header = load_header(&state.pool, R::KIND, id).await?;
    let current = header.status()?;
    let to = next(current)?;
    let updated = DraftRepo::update_status(&state.pool, R::KIND, id, current, to)
        .await?
        .ok_or_else(|| concurrently_changed(R::KIND, id))?;
    tracing::info!(
        kind = R::KIND.as_str(),
        draft_id = %id,
        from = %current,
        to = %to,
        identity_id = %user.identity_id,
        "Draft status changed"
    );
    Ok(updated)
}

/// POST /api/wiki/{kind}s/drafts/{id}/submit
pub async fn submit<R: WikiResource>(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<EntityId>,
) -> AppResult<Json<DataResponse<DraftHeader>>> {
    authorize(&user.role, WikiAction::Submit)?;
    let header = load_header(&state.pool, R::KIND, id).await?;
    ensure_may_edit(&user, header.editor_id)?;

    let updated = transition::<R>(&state, &user, id, wiki::submit).await?;
    publish_event(&state, event_types::WIKI_DRAFT_SUBMITTED, R::KIND, id, &user);
    Ok(Json(DataResponse::new(updated)))
}

/// POST /api/wiki/{kind}s/drafts/{id}/approve
pub async fn approve<R: WikiResource>(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<EntityId>,
) -> AppResult<Json<DataResponse<DraftHeader>>> {
    authorize(&user.role, WikiAction::Approve)?;
    let header = load_header(&state.pool, R::KIND, id).await?;
    let siblings = DraftRepo::list_translation_set(
        &state.pool,
        R::KIND,
        header.translation_set_identifier,
    )
    .await?
    .iter()
    .map(|h| h.status().map(|status| (h.id, status)))
    .collect::<Result<Vec<_>, CoreError>>()?;
    let sibling_approved = wiki::has_approved_sibling(siblings, id);

    let updated =
        transition::<R>(&state, &user, id, |status| wiki::approve(status, sibling_approved))
            .await?;
    publish_event(&state, event_types::WIKI_DRAFT_APPROVED, R::KIND, id, &user);
    Ok(Json(DataResponse::new(updated)))
}

/// POST /api/wiki/{kind}s/drafts/{id}/reject
pub async fn reject<R: WikiResource>(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<EntityId>,
) -> AppResult<Json<DataResponse<DraftHeader>>> {
    authorize(&user.role, WikiAction::Reject)?;
    let updated = transition::<R>(&state, &user, id, wiki::reject).await?;
    publish_event(&state, event_types::WIKI_DRAFT_REJECTED, R::KIND, id, &user);
    Ok(Json(DataResponse::new(updated)))
}

/// POST /api/wiki/{kind}s/drafts/{id}/publish
///
/// Writes the approved draft to the published table and deletes the draft.
pub async fn publish<R: WikiResource>(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<EntityId>,
) -> AppResult<Json<DataResponse<Published>>> {
    authorize(&user.role, WikiAction::Publish)?;
    let header = load_header(&state.pool, R::KIND, id).await?;
    wiki::ensure_publishable(header.status()?)?;

    let published_id = DraftRepo::publish(&state.pool, R::KIND, id)
        .await?
        .ok_or_else(|| concurrently_changed(R::KIND, id))?;

    tracing::info!(
        kind = R::KIND.as_str(),
        draft_id = %id,
        published_id = %published_id,
        identity_id = %user.identity_id,
        "Draft published"
    );
    state.event_bus.publish(
        PlatformEvent::new(event_types::WIKI_PUBLISHED)
            .with_source(R::KIND.as_str(), published_id)
            .with_actor(user.identity_id)
            .with_payload(serde_json::json!({
                "draft_id": id,
                "language": header.language,
            })),
    );
    Ok(Json(DataResponse::new(Published { published_id })))
}

/// POST /api/wiki/{kind}s/drafts/{id}/translate
///
/// Creates pending drafts for every language the translation set lacks.
pub async fn translate<R: WikiResource>(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<EntityId>,
) -> AppResult<(StatusCode, Json<DataResponse<Vec<DraftHeader>>>)> {
    authorize(&user.role, WikiAction::Translate)?;
    let header = load_header(&state.pool, R::KIND, id).await?;
    wiki::ensure_translatable(header.status()?)?;

    let tsi = header.translation_set_identifier;
    let mut present = DraftRepo::list_translation_set(&state.pool, R::KIND, tsi)
        .await?
        .iter()
        .map(DraftHeader::language)
        .collect::<Result<Vec<Language>, CoreError>>()?;
    for language in DraftRepo::published_languages(&state.pool, R::KIND, tsi).await? {
        present.push(language.parse()?);
    }
    let missing = wiki::missing_languages(present);

    let created =
        DraftRepo::translate(&state.pool, R::KIND, id, &missing, user.identity_id).await?;

    tracing::info!(
        kind = R::KIND.as_str(),
        draft_id = %id,
        created = created.len(),
        identity_id = %user.identity_id,
        "Draft translated"
    );
    if !created.is_empty() {
        state.event_bus.publish(
            PlatformEvent::new(event_types::WIKI_TRANSLATED)
                .with_source(R::KIND.as_str(), id)
                .with_actor(user.identity_id)
                .with_payload(serde_json::json!({
                    "languages": missing,
                })),
        );
    }
    Ok((StatusCode::CREATED, Json(DataResponse::new(created))))
}

/// POST /api/wiki/{kind}s/{id}/drafts
///
/// Starts editing published content by copying it into a pending draft.
pub async fn start_editing<R: WikiResource>(
    State(state): State<AppState>,
    user: AuthUser,
    Path(published_id): Path<EntityId>,
) -> AppResult<(StatusCode, Json<DataResponse<DraftHeader>>)> {
    authorize(&user.role, WikiAction::CreateDraft)?;
    if DraftRepo::find_header_by_published(&state.pool, R::KIND, published_id)
        .await?
        .is_some()
    {
        return Err(CoreError::Conflict(format!(
            "{} {published_id} already has a draft in progress",
            R::KIND.entity_name()
        ))
        .into());
    }

    let header =
        DraftRepo::start_from_published(&state.pool, R::KIND, published_id, user.identity_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: R::KIND.entity_name(),
                id: published_id,
            })?;

    tracing::info!(
        kind = R::KIND.as_str(),
        draft_id = %header.id,
        published_id = %published_id,
        identity_id = %user.identity_id,
        "Started editing published content"
    );
    Ok((StatusCode::CREATED, Json(DataResponse::new(header))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_filter_parses_names() {
        assert_eq!(parse_status_filter(None).unwrap(), None);
        assert_eq!(
            parse_status_filter(Some("under_review")).unwrap(),
            Some(ApprovalStatus::UnderReview.id())
        );
        assert!(parse_status_filter(Some("UnderReview")).is_err());
    }

    #[test]
    fn editor_may_edit_own_draft_but_not_others() {
        let me = kwiki_core::identifiers::new_id();
        let collaborator = AuthUser {
            identity_id: me,
            role: "collaborator".into(),
        };
        assert!(ensure_may_edit(&collaborator, me).is_ok());
        assert!(ensure_may_edit(&collaborator, kwiki_core::identifiers::new_id()).is_err());

        let senior = AuthUser {
            identity_id: me,
            role: "senior_collaborator".into(),
        };
        assert!(ensure_may_edit(&senior, kwiki_core::identifiers::new_id()).is_ok());
    }

    #[test]
    fn none_role_may_not_edit() {
        let id = kwiki_core::identifiers::new_id();
        let user = AuthUser {
            identity_id: id,
            role: "none".into(),
        };
        assert!(ensure_may_edit(&user, id).is_err());
    }
}
