//! HTTP API handlers for ahan-hub

pub mod admin;
pub mod auth;
pub mod catalog;
pub mod health;

pub use admin::editor_routes;
pub use auth::{attach_session, auth_routes, require_admin, SessionToken};
pub use catalog::catalog_routes;
pub use health::health_routes;
