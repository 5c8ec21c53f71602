//! Handlers for the contact form.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use kwiki_core::error::CoreError;
use kwiki_core::identifiers::new_ulid;
use kwiki_core::site::validate_contact;
use kwiki_core::types::EntityId;
use kwiki_db::models::contact::{Contact, CreateContact};
use kwiki_db::repositories::ContactRepo;
use serde::Serialize;
use validator::Validate;

use crate::error::AppResult;
use crate::middleware::rbac::RequireAdmin;
use crate::query::ContactListParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// What the sender gets back: only the reference number.
#[derive(Debug, Serialize)]
pub struct ContactReceipt {
    pub reference: String,
}

/// POST /api/site/contacts
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateContact>,
) -> AppResult<(StatusCode, Json<DataResponse<ContactReceipt>>)> {
    input.validate()?;
    validate_contact(&input.category, &input.name, &input.content)?;

    let created = ContactRepo::create(&state.pool, &new_ulid(), &input).await?;
    tracing::info!(
        contact_id = %created.id,
        reference = %created.reference,
        category = %created.category,
        "Contact received"
    );
    Ok((
        StatusCode::CREATED,
        Json(DataResponse::new(ContactReceipt {
            reference: created.reference,
        })),
    ))
}

/// GET /api/site/admin/contacts?category=
pub async fn list(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(params): Query<ContactListParams>,
) -> AppResult<Json<DataResponse<Vec<Contact>>>> {
    let (limit, offset) = params.clamped();
    let contacts =
        ContactRepo::list(&state.pool, params.category.as_deref(), limit, offset).await?;
    Ok(Json(DataResponse::new(contacts)))
}

/// GET /api/site/admin/contacts/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<EntityId>,
) -> AppResult<Json<DataResponse<Contact>>> {
    let found = ContactRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Contact",
            id,
        })?;
    Ok(Json(DataResponse::new(found)))
}
