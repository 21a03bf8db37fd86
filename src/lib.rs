//! The `taskoo` library crate.
//!
//! Multi-tenant task-management backend: registration and login with a
//! cookie-borne JWT session, password reset via emailed single-use tokens,
//! admin-gated user management, and per-user task CRUD with pagination.
//! The binary (`main.rs`) wires these modules into the running server.

pub mod auth;
pub mod config;
pub mod error;
pub mod mail;
pub mod models;
pub mod response;
pub mod routes;
