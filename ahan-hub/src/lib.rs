//! ahan-hub library interface
//!
//! Catalog service for Quran recitations, anime media, FM radio stations and
//! live TV channels, with a session-guarded admin panel.

pub mod admin;
pub mod api;
pub mod catalog;
pub mod defaults;
pub mod error;
pub mod seed;
pub mod session;
pub mod summary;

pub use crate::error::{ApiError, ApiResult};

use ahan_common::store::CatalogStores;
use axum::{middleware, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::admin::{ChannelForm, MediaForm, RecitationForm, StationForm};
use crate::catalog::Catalog;
use crate::seed::StartupReport;
use crate::session::{CredentialCheck, SessionStore};
use crate::summary::TextGenerator;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// One record store handle per collection
    pub stores: CatalogStores,
    /// In-memory catalog mirror
    pub catalog: Arc<Catalog>,
    pub sessions: Arc<SessionStore>,
    pub credentials: Arc<dyn CredentialCheck>,
    pub text: Arc<dyn TextGenerator>,
    /// Outcome of startup seeding; drives the connectivity notice
    pub startup: Arc<StartupReport>,
}

/// Build application router
///
/// Catalog reads and health are public. Login/logout and the admin editors
/// run inside a session; the admin editors additionally require the admin flag.
pub fn build_router(state: AppState) -> Router {
    let admin = Router::new()
        .nest("/admin/recitations", api::editor_routes::<RecitationForm>())
        .nest("/admin/media", api::editor_routes::<MediaForm>())
        .nest("/admin/stations", api::editor_routes::<StationForm>())
        .nest("/admin/channels", api::editor_routes::<ChannelForm>())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::require_admin,
        ));

    let sessions = Router::new()
        .merge(admin)
        .merge(api::auth_routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::attach_session,
        ));

    let public = Router::new()
        .merge(api::catalog_routes())
        .merge(api::health_routes())
        .layer(CorsLayer::permissive());

    Router::new()
        .merge(sessions)
        .merge(public)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
