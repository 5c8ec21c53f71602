//! Handlers for `/identity`: verification codes, registration, sessions and
//! principal roles.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use kwiki_core::auth_code::{generate_code, hash_code, validate_code_format, MAX_CODE_ATTEMPTS};
use kwiki_core::error::CoreError;
use kwiki_core::language::Language;
use kwiki_core::roles::{validate_role, DEFAULT_ROLE};
use kwiki_core::types::EntityId;
use kwiki_core::validation::validate_required_text;
use kwiki_db::models::auth_code::CreateAuthCode;
use kwiki_db::models::identity::{CreateIdentity, IdentityResponse, Principal, UpdatePrincipalRole};
use kwiki_db::models::session::CreateSession;
use kwiki_db::repositories::{AuthCodeRepo, IdentityRepo, PrincipalRepo, SessionRepo};
use kwiki_events::{event_types, PlatformEvent};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::jwt::{generate_access_token, generate_refresh_token, hash_refresh_token};
use crate::auth::password::{hash_password, validate_password_strength, verify_password};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// Consecutive failed logins before the identity is locked.
const MAX_FAILED_ATTEMPTS: i32 = 5;

const LOCK_DURATION_MINS: i64 = 15;

const MAX_USERNAME_LEN: usize = 32;

#[derive(Debug, Deserialize, Validate)]
pub struct AuthCodeRequest {
    #[validate(email)]
    pub email: String,
    pub language: Language,
}

/// Returned for every auth-code request, whether or not the address is
/// already registered.
#[derive(Debug, Serialize)]
pub struct AuthCodeAccepted {
    pub email: String,
    pub expires_in_mins: i64,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email)]
    pub email: String,
    pub code: String,
    pub username: String,
    pub password: String,
    pub language: Language,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub identity: IdentityResponse,
}

/// POST /api/identity/auth-codes
///
/// Mails a verification code, or a notice that the address is taken. The
/// response is the same in both cases.
pub async fn request_auth_code(
    State(state): State<AppState>,
    Json(input): Json<AuthCodeRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<AuthCodeAccepted>>)> {
    input.validate()?;
    let ttl_mins = state.config.auth_code_ttl_mins;

    if IdentityRepo::email_exists(&state.pool, &input.email).await? {
        tracing::info!("Auth code requested for a registered address");
        state.event_bus.publish(
            PlatformEvent::new(event_types::REGISTRATION_CONFLICT).with_payload(
                serde_json::json!({
                    "email": input.email,
                    "language": input.language,
                }),
            ),
        );
    } else {
        let code = generate_code();
        AuthCodeRepo::create(
            &state.pool,
            &CreateAuthCode {
                email: input.email.clone(),
                language: input.language.as_str().to_string(),
                code_hash: hash_code(&code),
                expires_at: Utc::now() + chrono::Duration::minutes(ttl_mins),
            },
        )
        .await?;
        tracing::info!("Auth code issued");
        state.event_bus.publish(
            PlatformEvent::new(event_types::AUTH_CODE_ISSUED).with_payload(serde_json::json!({
                "email": input.email,
                "language": input.language,
                "code": code,
                "ttl_mins": ttl_mins,
            })),
        );
    }

    Ok((
        StatusCode::ACCEPTED,
        Json(DataResponse::new(AuthCodeAccepted {
            email: input.email,
            expires_in_mins: ttl_mins,
        })),
    ))
}

/// POST /api/identity/register
///
/// Consumes a verification code and creates the identity with a
/// `collaborator` principal.
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<IdentityResponse>>)> {
    input.validate()?;
    validate_code_format(&input.code)?;
    validate_required_text("Username", &input.username, MAX_USERNAME_LEN)?;
    validate_password_strength(&input.password)?;

    let invalid_code = || CoreError::Validation("Invalid or expired verification code".into());

    let auth_code = AuthCodeRepo::find_latest_active(&state.pool, &input.email)
        .await?
        .ok_or_else(invalid_code)?;
    if auth_code.code_hash != hash_code(&input.code) {
        let attempts =
            AuthCodeRepo::record_failed_attempt(&state.pool, auth_code.id, MAX_CODE_ATTEMPTS)
                .await?;
        if attempts.is_some_and(|n| n >= MAX_CODE_ATTEMPTS) {
            tracing::warn!(auth_code_id = %auth_code.id, "Auth code invalidated after too many wrong attempts");
        }
        return Err(invalid_code().into());
    }

    if IdentityRepo::email_exists(&state.pool, &input.email).await? {
        return Err(CoreError::Conflict("Email address is already registered".into()).into());
    }
    if !AuthCodeRepo::consume(&state.pool, auth_code.id).await? {
        return Err(invalid_code().into());
    }

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let (identity, principal) = IdentityRepo::create_with_principal(
        &state.pool,
        &CreateIdentity {
            username: input.username.trim().to_string(),
            email: input.email,
            password_hash,
            language: input.language.as_str().to_string(),
        },
        DEFAULT_ROLE,
    )
    .await?;

    tracing::info!(identity_id = %identity.id, role = %principal.role, "Identity registered");
    state.event_bus.publish(
        PlatformEvent::new(event_types::IDENTITY_REGISTERED)
            .with_source("identity", identity.id)
            .with_actor(identity.id),
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse::new(IdentityResponse::new(&identity, &principal.role))),
    ))
}

/// POST /api/identity/login
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<DataResponse<AuthResponse>>> {
    let bad_credentials = || CoreError::Unauthorized("Invalid email or password".into());

    let identity = IdentityRepo::find_by_email(&state.pool, &input.email)
        .await?
        .ok_or_else(bad_credentials)?;

    if !identity.is_active {
        return Err(CoreError::Forbidden("Identity is deactivated".into()).into());
    }
    if identity.locked_until.is_some_and(|until| until > Utc::now()) {
        return Err(
            CoreError::Forbidden("Identity is temporarily locked. Try again later.".into()).into(),
        );
    }

    let valid = verify_password(&input.password, &identity.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;

    if !valid {
        IdentityRepo::increment_failed_login(&state.pool, identity.id).await?;
        if identity.failed_login_count + 1 >= MAX_FAILED_ATTEMPTS {
            let until = Utc::now() + chrono::Duration::minutes(LOCK_DURATION_MINS);
            IdentityRepo::lock_until(&state.pool, identity.id, until).await?;
            tracing::warn!(identity_id = %identity.id, "Identity locked after failed logins");
        }
        return Err(bad_credentials().into());
    }

    IdentityRepo::record_successful_login(&state.pool, identity.id).await?;
    let principal = principal_of(&state, identity.id).await?;
    let response = issue_tokens(&state, IdentityResponse::new(&identity, &principal.role)).await?;
    Ok(Json(DataResponse::new(response)))
}

/// POST /api/identity/refresh
///
/// Rotates the refresh token: the presented one is revoked.
pub async fn refresh(
    State(state): State<AppState>,
    Json(input): Json<RefreshRequest>,
) -> AppResult<Json<DataResponse<AuthResponse>>> {
    let hash = hash_refresh_token(&input.refresh_token);
    let session = SessionRepo::find_by_refresh_token_hash(&state.pool, &hash)
        .await?
        .ok_or_else(|| CoreError::Unauthorized("Invalid or expired refresh token".into()))?;

    SessionRepo::revoke(&state.pool, session.id).await?;

    let identity = IdentityRepo::find_by_id(&state.pool, session.identity_id)
        .await?
        .ok_or_else(|| CoreError::Unauthorized("Identity no longer exists".into()))?;
    if !identity.is_active {
        return Err(CoreError::Forbidden("Identity is deactivated".into()).into());
    }

    let principal = principal_of(&state, identity.id).await?;
    let response = issue_tokens(&state, IdentityResponse::new(&identity, &principal.role)).await?;
    Ok(Json(DataResponse::new(response)))
}

/// POST /api/identity/logout
///
/// Revokes every session of the caller.
pub async fn logout(State(state): State<AppState>, user: AuthUser) -> AppResult<StatusCode> {
    SessionRepo::revoke_all_for_identity(&state.pool, user.identity_id).await?;
    tracing::info!(identity_id = %user.identity_id, "Logged out");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/identity/me
pub async fn me(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<DataResponse<IdentityResponse>>> {
    let identity = IdentityRepo::find_by_id(&state.pool, user.identity_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Identity",
            id: user.identity_id,
        })?;
    let principal = principal_of(&state, identity.id).await?;
    Ok(Json(DataResponse::new(IdentityResponse::new(
        &identity,
        &principal.role,
    ))))
}

/// PUT /api/identity/principals/{identity_id}/role
pub async fn update_principal_role(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(identity_id): Path<EntityId>,
    Json(input): Json<UpdatePrincipalRole>,
) -> AppResult<Json<DataResponse<Principal>>> {
    validate_role(&input.role)?;
    let principal = PrincipalRepo::update_role(&state.pool, identity_id, &input.role)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Principal",
            id: identity_id,
        })?;

    tracing::info!(
        identity_id = %identity_id,
        role = %principal.role,
        changed_by = %admin.identity_id,
        "Principal role changed"
    );
    state.event_bus.publish(
        PlatformEvent::new(event_types::PRINCIPAL_ROLE_CHANGED)
            .with_source("principal", principal.id)
            .with_actor(admin.identity_id)
            .with_payload(serde_json::json!({ "role": principal.role })),
    );

    Ok(Json(DataResponse::new(principal)))
}

async fn principal_of(state: &AppState, identity_id: EntityId) -> AppResult<Principal> {
    PrincipalRepo::find_by_identity(&state.pool, identity_id)
        .await?
        .ok_or_else(|| {
            AppError::InternalError(format!("Identity {identity_id} has no principal"))
        })
}

/// Sign an access token, persist a refresh session and build the response.
async fn issue_tokens(state: &AppState, identity: IdentityResponse) -> AppResult<AuthResponse> {
    let jwt = &state.config.jwt;
    let access_token = generate_access_token(identity.id, &identity.role, jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    let (refresh_token, refresh_hash) = generate_refresh_token();
    SessionRepo::create(
        &state.pool,
        &CreateSession {
            identity_id: identity.id,
            refresh_token_hash: refresh_hash,
            expires_at: Utc::now() + chrono::Duration::days(jwt.refresh_token_expiry_days),
            user_agent: None,
        },
    )
    .await?;

    Ok(AuthResponse {
        access_token,
        refresh_token,
        expires_in: jwt.access_token_expiry_mins * 60,
        identity,
    })
}
