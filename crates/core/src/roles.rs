//! Well-known role name constants.
//!
//! These must match the `ck_users_role` check in `20260301000002_create_users_table.sql`.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_PATIENT: &str = "patient";

/// All valid role names.
pub const VALID_ROLES: &[&str] = &[ROLE_ADMIN, ROLE_PATIENT];
