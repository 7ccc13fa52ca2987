//! Public catalog read endpoints
//!
//! Every read is served from the current catalog snapshot; none of these
//! handlers touches the record store.

use ahan_common::models::{Channel, MediaEntry, Recitation, Station};
use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;

use crate::catalog::{CatalogEntity, CatalogSnapshot};
use crate::error::{ApiError, ApiResult};
use crate::seed::CollectionFailure;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct CollectionCounts {
    pub recitations: usize,
    pub media: usize,
    pub stations: usize,
    pub channels: usize,
}

/// Startup outcome and current collection sizes
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub degraded: bool,
    /// Connectivity notice shown to users when startup could not load everything
    pub notice: Option<String>,
    pub failures: Vec<CollectionFailure>,
    pub counts: CollectionCounts,
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub number: u32,
    pub summary: String,
}

#[derive(Debug, Serialize)]
pub struct SynopsisResponse {
    pub id: String,
    pub synopsis: String,
}

/// Look up one record by its path segment
fn find_record<E: CatalogEntity>(snapshot: &CatalogSnapshot, raw_id: &str) -> ApiResult<E> {
    let not_found = || ApiError::NotFound(format!("{} '{}'", E::KIND, raw_id));
    let id = E::parse_id(raw_id).ok_or_else(not_found)?;
    E::records(snapshot)
        .iter()
        .find(|record| record.id() == &id)
        .cloned()
        .ok_or_else(not_found)
}

/// GET /api/status
pub async fn get_status(State(state): State<AppState>) -> Json<StatusResponse> {
    let snapshot = state.catalog.snapshot().await;
    Json(StatusResponse {
        degraded: state.startup.is_degraded(),
        notice: state.startup.notice(),
        failures: state.startup.failures.clone(),
        counts: CollectionCounts {
            recitations: snapshot.recitations.len(),
            media: snapshot.media.len(),
            stations: snapshot.stations.len(),
            channels: snapshot.channels.len(),
        },
    })
}

/// GET /api/recitations
pub async fn list_recitations(State(state): State<AppState>) -> Json<Vec<Recitation>> {
    Json(state.catalog.snapshot().await.recitations.clone())
}

/// GET /api/recitations/:number
pub async fn get_recitation(
    State(state): State<AppState>,
    Path(number): Path<String>,
) -> ApiResult<Json<Recitation>> {
    let snapshot = state.catalog.snapshot().await;
    Ok(Json(find_record(&snapshot, &number)?))
}

/// GET /api/recitations/:number/summary
pub async fn recitation_summary(
    State(state): State<AppState>,
    Path(number): Path<String>,
) -> ApiResult<Json<SummaryResponse>> {
    let snapshot = state.catalog.snapshot().await;
    let recitation: Recitation = find_record(&snapshot, &number)?;
    let summary = state
        .text
        .generate_recitation_summary(&recitation.details.english_name)
        .await;

    Ok(Json(SummaryResponse {
        number: recitation.number,
        summary,
    }))
}

/// GET /api/media
pub async fn list_media(State(state): State<AppState>) -> Json<Vec<MediaEntry>> {
    Json(state.catalog.snapshot().await.media.clone())
}

/// GET /api/media/:id
pub async fn get_media(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<MediaEntry>> {
    let snapshot = state.catalog.snapshot().await;
    Ok(Json(find_record(&snapshot, &id)?))
}

/// GET /api/media/:id/synopsis
pub async fn media_synopsis(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<SynopsisResponse>> {
    let snapshot = state.catalog.snapshot().await;
    let entry: MediaEntry = find_record(&snapshot, &id)?;
    let synopsis = state.text.generate_media_synopsis(&entry.details.title).await;

    Ok(Json(SynopsisResponse {
        id: entry.id,
        synopsis,
    }))
}

/// GET /api/stations
pub async fn list_stations(State(state): State<AppState>) -> Json<Vec<Station>> {
    Json(state.catalog.snapshot().await.stations.clone())
}

/// GET /api/channels
pub async fn list_channels(State(state): State<AppState>) -> Json<Vec<Channel>> {
    Json(state.catalog.snapshot().await.channels.clone())
}

/// Build public catalog routes
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/api/status", get(get_status))
        .route("/api/recitations", get(list_recitations))
        .route("/api/recitations/:number", get(get_recitation))
        .route("/api/recitations/:number/summary", get(recitation_summary))
        .route("/api/media", get(list_media))
        .route("/api/media/:id", get(get_media))
        .route("/api/media/:id/synopsis", get(media_synopsis))
        .route("/api/stations", get(list_stations))
        .route("/api/channels", get(list_channels))
}
