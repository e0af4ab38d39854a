use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use bokyak_core::error::CoreError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce the failure envelope
/// `{"success": false, "message": ..., "code": ...}`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `bokyak_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Shorthand for a [`CoreError::NotFound`].
    pub fn not_found(entity: &'static str, id: bokyak_core::types::DbId) -> Self {
        AppError::Core(CoreError::NotFound { entity, id })
    }

    /// Shorthand for a [`CoreError::NotFoundByCode`], for rows keyed by text.
    pub fn not_found_code(entity: &'static str, code: impl Into<String>) -> Self {
        AppError::Core(CoreError::NotFoundByCode {
            entity,
            code: code.into(),
        })
    }

    /// Shorthand for a [`CoreError::Validation`], used to lift the `String`
    /// errors of the pure validators.
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Core(CoreError::Validation(msg.into()))
    }

    /// Status, error code and client-facing message for this error.
    pub fn classify(&self) -> (StatusCode, &'static str, String) {
        match self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::NotFoundByCode { entity, code } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with code {code} not found"),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
                CoreError::Unauthorized(msg) => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
                }
                CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "An internal error occurred".to_string(),
                    )
                }
            },

            // --- Database errors ---
            AppError::Database(err) => classify_sqlx_error(err),

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.classify();
        let body = json!({
            "success": false,
            "message": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Classify a sqlx error into an HTTP status, error code, and message.
///
/// - `RowNotFound` maps to 404.
/// - Unique violations on `uq_*` constraints or primary keys map to 409.
/// - Foreign-key violations (23503) map to 400: the referenced row does not exist.
/// - Check violations (23514) map to 400.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        ),
        sqlx::Error::Database(db_err) => {
            let constraint = db_err.constraint().unwrap_or("unknown");
            match db_err.code().as_deref() {
                Some("23505")
                    if constraint.starts_with("uq_") || constraint.ends_with("_pkey") =>
                {
                    return (StatusCode::CONFLICT, "CONFLICT", conflict_message(constraint));
                }
                Some("23503") => {
                    return (
                        StatusCode::BAD_REQUEST,
                        "INVALID_REFERENCE",
                        format!("Referenced row does not exist: {constraint}"),
                    );
                }
                Some("23514") => {
                    return (
                        StatusCode::BAD_REQUEST,
                        "CONSTRAINT_VIOLATION",
                        format!("Value violates check constraint: {constraint}"),
                    );
                }
                _ => {}
            }
            tracing::error!(error = %db_err, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
        other => {
            tracing::error!(error = %other, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
    }
}

/// Client-facing wording for a unique violation.
fn conflict_message(constraint: &str) -> String {
    let message = match constraint {
        "uq_users_username" => "Username is already taken",
        "medications_pkey" => "A medication with this item_seq already exists",
        "uq_hospitals_user_id_hosp_code" => "A hospital with this code is already registered",
        "uq_illnesses_user_id_name_type" => "This illness is already registered",
        "uq_user_medical_infos_user_hospital_illness" => {
            "Medical info for this hospital and illness already exists"
        }
        "uq_prescription_medications_prescription_medication" => {
            "This medication is already on the prescription"
        }
        "uq_medication_cycles_group_id_cycle_number" => {
            "This cycle number already exists in the group"
        }
        "uq_medication_details_cycle_prescription_medication" => {
            "This prescription line already has a detail in the cycle"
        }
        "main_ingredients_pkey" => "This ingredient is already registered",
        "uq_medication_ingredients_medication_ingredient" => {
            "This ingredient is already part of the medication"
        }
        other => return format!("Duplicate value violates unique constraint: {other}"),
    };
    message.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_constraints_get_domain_wording() {
        assert_eq!(
            conflict_message("uq_hospitals_user_id_hosp_code"),
            "A hospital with this code is already registered"
        );
        assert_eq!(
            conflict_message("medications_pkey"),
            "A medication with this item_seq already exists"
        );
        assert_eq!(
            conflict_message("uq_medication_ingredients_medication_ingredient"),
            "This ingredient is already part of the medication"
        );
    }

    #[test]
    fn unknown_constraint_is_named() {
        assert_eq!(
            conflict_message("uq_api_keys_key_hash"),
            "Duplicate value violates unique constraint: uq_api_keys_key_hash"
        );
    }
}
