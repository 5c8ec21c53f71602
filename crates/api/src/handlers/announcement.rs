//! Handlers for site announcements.
//!
//! Anyone may read published announcements; administrators manage them and
//! also see scheduled ones.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use kwiki_core::error::CoreError;
use kwiki_core::site::validate_announcement;
use kwiki_core::types::EntityId;
use kwiki_db::models::announcement::{Announcement, CreateAnnouncement, UpdateAnnouncement};
use kwiki_db::repositories::announcement_repo::NewAnnouncement;
use kwiki_db::repositories::AnnouncementRepo;

use super::wiki::translation_set;
use crate::error::AppResult;
use crate::middleware::rbac::RequireAdmin;
use crate::query::AnnouncementListParams;
use crate::response::DataResponse;
use crate::state::AppState;

fn not_found(id: EntityId) -> CoreError {
    CoreError::NotFound {
        entity: "Announcement",
        id,
    }
}

/// GET /api/site/announcements?language=
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<AnnouncementListParams>,
) -> AppResult<Json<DataResponse<Vec<Announcement>>>> {
    let (limit, offset) = params.clamped();
    let items = AnnouncementRepo::list(&state.pool, params.language, true, limit, offset).await?;
    Ok(Json(DataResponse::new(items)))
}

/// GET /api/site/announcements/{id}
///
/// Scheduled announcements are hidden until their publish date.
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> AppResult<Json<DataResponse<Announcement>>> {
    let found = AnnouncementRepo::find_by_id(&state.pool, id)
        .await?
        .filter(|a| a.published_date <= chrono::Utc::now())
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse::new(found)))
}

/// GET /api/site/admin/announcements?language=
pub async fn admin_list(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(params): Query<AnnouncementListParams>,
) -> AppResult<Json<DataResponse<Vec<Announcement>>>> {
    let (limit, offset) = params.clamped();
    let items = AnnouncementRepo::list(&state.pool, params.language, false, limit, offset).await?;
    Ok(Json(DataResponse::new(items)))
}

/// POST /api/site/admin/announcements
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(input): Json<CreateAnnouncement>,
) -> AppResult<(StatusCode, Json<DataResponse<Announcement>>)> {
    validate_announcement(&input.category, &input.title, &input.content)?;

    let created = AnnouncementRepo::create(
        &state.pool,
        &NewAnnouncement {
            translation_set_identifier: translation_set(input.translation_set_identifier),
            language: input.language,
            category: &input.category,
            title: &input.title,
            content: &input.content,
            published_date: input.published_date.unwrap_or_else(chrono::Utc::now),
        },
    )
    .await?;

    tracing::info!(
        announcement_id = %created.id,
        language = %created.language,
        identity_id = %admin.identity_id,
        "Announcement created"
    );
    Ok((StatusCode::CREATED, Json(DataResponse::new(created))))
}

/// PUT /api/site/admin/announcements/{id}
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<EntityId>,
    Json(input): Json<UpdateAnnouncement>,
) -> AppResult<Json<DataResponse<Announcement>>> {
    let existing = AnnouncementRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    validate_announcement(
        input.category.as_deref().unwrap_or(&existing.category),
        input.title.as_deref().unwrap_or(&existing.title),
        input.content.as_deref().unwrap_or(&existing.content),
    )?;

    let updated = AnnouncementRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::info!(announcement_id = %id, identity_id = %admin.identity_id, "Announcement updated");
    Ok(Json(DataResponse::new(updated)))
}

/// DELETE /api/site/admin/announcements/{id}
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<EntityId>,
) -> AppResult<StatusCode> {
    if !AnnouncementRepo::delete(&state.pool, id).await? {
        return Err(not_found(id).into());
    }
    tracing::info!(announcement_id = %id, identity_id = %admin.identity_id, "Announcement deleted");
    Ok(StatusCode::NO_CONTENT)
}
