//! Pitch deck API server library.
//!
//! Exposes config, state, error handling, routes and upload storage so
//! integration tests and the binary entrypoint share one router.

pub mod config;
pub mod error;
pub mod handlers;
pub mod router;
pub mod routes;
pub mod state;
pub mod uploads;
