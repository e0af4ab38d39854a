//! Bokyak API server library.
//!
//! The binary only loads configuration, connects to the database and calls
//! [`app::build_app`]; integration tests build the identical router from a
//! test pool.

pub mod app;
pub mod auth;
pub mod background;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod notifications;
pub mod query;
pub mod response;
pub mod routes;
pub mod state;
