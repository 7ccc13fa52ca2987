//! Admin editor endpoints
//!
//! One router per entity kind, generic over its form type, nested under
//! `/admin/<collection>`. Every handler answers with the editor page: the
//! editor view plus the collection's current records.

use ahan_common::Entity;
use axum::{
    extract::{Path, State},
    routing::{get, post},
    Extension, Json, Router,
};
use serde::Serialize;
use std::time::Instant;
use tracing::{debug, warn};

use super::auth::SessionToken;
use crate::admin::{AdminForm, Editor, EditorView};
use crate::catalog::CatalogEntity;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

type Record<F> = <F as AdminForm>::Entity;

#[derive(Debug, Serialize)]
#[serde(bound = "")]
pub struct AdminPage<F: AdminForm> {
    pub editor: EditorView<F>,
    pub records: Vec<Record<F>>,
}

/// Run `f` on this session's editor for `F`, after settling any elapsed
/// success confirmation
async fn with_editor<F: AdminForm, R>(
    state: &AppState,
    session: &SessionToken,
    f: impl FnOnce(&mut Editor<F>) -> R,
) -> ApiResult<R> {
    state
        .sessions
        .with_session(&session.0, |data| {
            let editor = F::editor_mut(&mut data.workspace);
            editor.settle(Instant::now());
            f(editor)
        })
        .await
        .ok_or_else(|| ApiError::Unauthorized("Session has ended".to_string()))
}

async fn page<F: AdminForm>(
    state: &AppState,
    session: &SessionToken,
) -> ApiResult<Json<AdminPage<F>>> {
    let editor = with_editor::<F, _>(state, session, |editor| editor.view()).await?;
    let snapshot = state.catalog.snapshot().await;

    Ok(Json(AdminPage {
        editor,
        records: <Record<F> as CatalogEntity>::records(&snapshot).to_vec(),
    }))
}

fn parse_id<F: AdminForm>(raw: &str) -> ApiResult<<Record<F> as Entity>::Id> {
    <Record<F> as Entity>::parse_id(raw)
        .ok_or_else(|| ApiError::NotFound(format!("{} '{}'", <Record<F> as Entity>::KIND, raw)))
}

/// GET /admin/:kind
pub async fn show<F: AdminForm>(
    State(state): State<AppState>,
    Extension(session): Extension<SessionToken>,
) -> ApiResult<Json<AdminPage<F>>> {
    page::<F>(&state, &session).await
}

/// POST /admin/:kind/new
pub async fn begin_create<F: AdminForm>(
    State(state): State<AppState>,
    Extension(session): Extension<SessionToken>,
) -> ApiResult<Json<AdminPage<F>>> {
    with_editor::<F, _>(&state, &session, |editor| editor.begin_create()).await??;
    page::<F>(&state, &session).await
}

/// POST /admin/:kind/:id/edit
pub async fn begin_edit<F: AdminForm>(
    State(state): State<AppState>,
    Extension(session): Extension<SessionToken>,
    Path(raw_id): Path<String>,
) -> ApiResult<Json<AdminPage<F>>> {
    let id = parse_id::<F>(&raw_id)?;
    let record = state
        .catalog
        .find::<Record<F>>(&id)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("{} '{}'", <Record<F> as Entity>::KIND, raw_id)))?;

    with_editor::<F, _>(&state, &session, |editor| editor.begin_edit(record)).await??;
    page::<F>(&state, &session).await
}

/// POST /admin/:kind/cancel
pub async fn cancel<F: AdminForm>(
    State(state): State<AppState>,
    Extension(session): Extension<SessionToken>,
) -> ApiResult<Json<AdminPage<F>>> {
    with_editor::<F, _>(&state, &session, |editor| editor.cancel()).await?;
    page::<F>(&state, &session).await
}

/// POST /admin/:kind/submit
///
/// The store call runs without the session lock held. If the session is gone
/// by the time it completes, the catalog still reflects the write.
pub async fn submit<F: AdminForm>(
    State(state): State<AppState>,
    Extension(session): Extension<SessionToken>,
    Json(form): Json<F>,
) -> ApiResult<Json<AdminPage<F>>> {
    let pending = with_editor::<F, _>(&state, &session, |editor| editor.prepare_submit(&form))
        .await??;

    let outcome = pending.execute(&state.stores, &state.catalog).await;

    let reflected = state
        .sessions
        .with_session(&session.0, |data| {
            F::editor_mut(&mut data.workspace).finish_submit(&outcome, Instant::now())
        })
        .await;
    if reflected.is_none() {
        warn!("Session ended during {} submit", <Record<F> as Entity>::KIND);
    }

    outcome?;
    page::<F>(&state, &session).await
}

/// POST /admin/:kind/:id/delete
pub async fn request_delete<F: AdminForm>(
    State(state): State<AppState>,
    Extension(session): Extension<SessionToken>,
    Path(raw_id): Path<String>,
) -> ApiResult<Json<AdminPage<F>>> {
    let id = parse_id::<F>(&raw_id)?;
    with_editor::<F, _>(&state, &session, |editor| editor.request_delete(id)).await??;
    page::<F>(&state, &session).await
}

/// POST /admin/:kind/delete/confirm
pub async fn confirm_delete<F: AdminForm>(
    State(state): State<AppState>,
    Extension(session): Extension<SessionToken>,
) -> ApiResult<Json<AdminPage<F>>> {
    let id = with_editor::<F, _>(&state, &session, |editor| editor.take_confirmed_delete())
        .await??;

    let outcome = state.catalog.delete::<Record<F>>(&state.stores, &id).await;

    let reflected = state
        .sessions
        .with_session(&session.0, |data| {
            F::editor_mut(&mut data.workspace).finish_delete(&id, &outcome)
        })
        .await;
    if reflected.is_none() {
        warn!("Session ended during {} delete", <Record<F> as Entity>::KIND);
    }

    outcome?;
    page::<F>(&state, &session).await
}

/// POST /admin/:kind/delete/cancel
pub async fn cancel_delete<F: AdminForm>(
    State(state): State<AppState>,
    Extension(session): Extension<SessionToken>,
) -> ApiResult<Json<AdminPage<F>>> {
    with_editor::<F, _>(&state, &session, |editor| editor.cancel_delete()).await?;
    debug!("{} delete cancelled", <Record<F> as Entity>::KIND);
    page::<F>(&state, &session).await
}

/// Editor routes for one entity kind, to be nested under `/admin/<collection>`
pub fn editor_routes<F: AdminForm>() -> Router<AppState> {
    Router::new()
        .route("/", get(show::<F>))
        .route("/new", post(begin_create::<F>))
        .route("/cancel", post(cancel::<F>))
        .route("/submit", post(submit::<F>))
        .route("/delete/confirm", post(confirm_delete::<F>))
        .route("/delete/cancel", post(cancel_delete::<F>))
        .route("/:id/edit", post(begin_edit::<F>))
        .route("/:id/delete", post(request_delete::<F>))
}
