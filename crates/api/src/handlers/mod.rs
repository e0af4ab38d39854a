//! Request handlers.
//!
//! Each submodule provides async handler functions for one resource.
//! Handlers validate input with the pure checks in `bokyak_core`, delegate
//! to the repositories in `bokyak_db`, and wrap results in
//! [`ApiResponse`](crate::response::ApiResponse).
//!
//! Reads and writes of the caller's own rows go through the scoped
//! repository methods, so a row owned by someone else looks missing (404).
//! When a request names a *parent* row, [`ensure_owner`] distinguishes a
//! missing parent (404) from a foreign one (403).

pub mod alerts;
pub mod analytics;
pub mod api_key;
pub mod auth;
pub mod cycles;
pub mod details;
pub mod dosage;
pub mod groups;
pub mod hospitals;
pub mod illnesses;
pub mod ingredients;
pub mod medical_info;
pub mod medications;
pub mod prescription_medications;
pub mod prescriptions;
pub mod records;
pub mod users;

use axum::http::StatusCode;
use bokyak_core::error::CoreError;
use bokyak_core::types::DbId;

use crate::error::{AppError, AppResult};

/// Check the result of an `owner_id` lookup against the caller.
pub(crate) fn ensure_owner(
    owner: Option<DbId>,
    user_id: DbId,
    entity: &'static str,
    id: DbId,
) -> AppResult<()> {
    match owner {
        None => Err(AppError::not_found(entity, id)),
        Some(owner) if owner != user_id => Err(AppError::Core(CoreError::Forbidden(format!(
            "{entity} {id} belongs to another user"
        )))),
        Some(_) => Ok(()),
    }
}

/// 204 when a row was deleted, 404 otherwise.
pub(crate) fn deleted(found: bool, entity: &'static str, id: DbId) -> AppResult<StatusCode> {
    if found {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found(entity, id))
    }
}

/// Reject a blank required text field.
pub(crate) fn require_text(value: &str, field: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")));
    }
    Ok(())
}
