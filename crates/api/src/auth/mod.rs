//! Authentication primitives.
//!
//! - [`password`] -- Argon2id password hashing and the registration rules.
//! - [`jwt`] -- access-token signing and validation, refresh-token material.

pub mod jwt;
pub mod password;
