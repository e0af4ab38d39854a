//! Handlers for the caller's own account (`/users/me`).

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use bokyak_core::types::DbId;
use bokyak_db::models::medical_info::MedicalInfoView;
use bokyak_db::models::prescription::Prescription;
use bokyak_db::models::user::{UpdateUser, UserResponse};
use bokyak_db::repositories::{
    ApiKeyRepo, MedicalInfoRepo, PrescriptionRepo, SessionRepo, UserRepo,
};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::handlers::require_text;
use crate::middleware::auth::AuthUser;
use crate::response::ApiResponse;
use crate::state::AppState;

/// Response of `GET /users/me/medical-summary`.
#[derive(Debug, Serialize)]
pub struct MedicalSummary {
    pub user: UserResponse,
    pub medical_info_count: i64,
    pub medical_info: Vec<MedicalInfoView>,
    pub active_prescriptions: Vec<Prescription>,
}

async fn load_active_user(state: &AppState, user_id: DbId) -> AppResult<UserResponse> {
    let user = UserRepo::find_by_id(&state.pool, user_id)
        .await?
        .filter(|u| u.is_active)
        .ok_or(AppError::not_found("User", user_id))?;
    Ok(UserResponse::from(&user))
}

/// GET /api/v1/users/me
pub async fn me(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<UserResponse>> {
    let user = load_active_user(&state, auth.user_id).await?;
    Ok(ApiResponse::ok(user, "Profile retrieved"))
}

/// PUT /api/v1/users/me
pub async fn update_me(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<UpdateUser>,
) -> AppResult<ApiResponse<UserResponse>> {
    if let Some(name) = &input.display_name {
        require_text(name, "display_name")?;
    }
    let user = UserRepo::update(&state.pool, auth.user_id, &input)
        .await?
        .ok_or(AppError::not_found("User", auth.user_id))?;
    Ok(ApiResponse::ok(UserResponse::from(&user), "Profile updated"))
}

/// DELETE /api/v1/users/me
///
/// Deactivates the account, revokes every session and removes the API key.
pub async fn deactivate_me(auth: AuthUser, State(state): State<AppState>) -> AppResult<StatusCode> {
    if !UserRepo::deactivate(&state.pool, auth.user_id).await? {
        return Err(AppError::not_found("User", auth.user_id));
    }
    let sessions = SessionRepo::revoke_all_for_user(&state.pool, auth.user_id).await?;
    let had_key = ApiKeyRepo::delete_for_user(&state.pool, auth.user_id).await?;
    tracing::info!(user_id = auth.user_id, sessions, had_key, "Account deactivated");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/users/me/medical-summary
pub async fn medical_summary(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<MedicalSummary>> {
    let user = load_active_user(&state, auth.user_id).await?;
    let medical_info = MedicalInfoRepo::list_for_user(&state.pool, auth.user_id).await?;
    let medical_info_count = MedicalInfoRepo::count_for_user(&state.pool, auth.user_id).await?;
    let active_prescriptions = PrescriptionRepo::list_active(&state.pool, auth.user_id).await?;

    Ok(ApiResponse::ok(
        MedicalSummary {
            user,
            medical_info_count,
            medical_info,
            active_prescriptions,
        },
        "Medical summary retrieved",
    ))
}
