use axum::{Json, Router, extract::{Path, State}, http::{StatusCode, header}, response::IntoResponse, routing::{get, post, put}};
use chrono::{DateTime, Utc};
use base64::Engine;
use bytes::Bytes;
use parking_lot::RwLock;
use serde::Serialize;
use std::{collections::HashMap, sync::Arc};
use tower_http::cors::{Any, CorsLayer};
use uuid::Uuid;

use crate::{
    catalog,
    error::ApiError,
    generation::{run_generation, PageGenerator},
    models::{DetailsPatch, PageType, QualityRequest, SelectStyleRequest, StylePreset, WeddingDetails},
    wizard::{WizardError, WizardState},
};

/// One browser session: its wizard and when it was last used.
#[derive(Debug, Clone)]
pub struct Session {
    pub wizard: WizardState,
    pub last_touched: DateTime<Utc>,
}

impl Session {
    fn new() -> Self {
        Self { wizard: WizardState::new(), last_touched: Utc::now() }
    }
}

pub type SessionStore = Arc<RwLock<HashMap<Uuid, Session>>>;

#[derive(Clone)]
pub struct AppState {
    pub store: SessionStore,
    pub generator: Arc<dyn PageGenerator>,
}

impl AppState {
    pub fn new(generator: Arc<dyn PageGenerator>) -> Self {
        Self { store: Arc::default(), generator }
    }
}

#[derive(Debug, Serialize)]
pub struct SessionView {
    pub id: Uuid,
    #[serde(flatten)]
    pub state: WizardState,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/styles", get(list_styles))
        .route("/api/defaults", get(default_details))
        .route("/api/sessions", post(create_session))
        .route("/api/sessions/:id", get(get_session).delete(delete_session))
        .route("/api/sessions/:id/details", put(update_details))
        .route("/api/sessions/:id/style", put(select_style))
        .route("/api/sessions/:id/pages/:page/toggle", post(toggle_page))
        .route("/api/sessions/:id/quality", put(set_quality))
        .route("/api/sessions/:id/next", post(next_step))
        .route("/api/sessions/:id/back", post(previous_step))
        .route("/api/sessions/:id/restart", post(start_over))
        .route("/api/sessions/:id/generate", post(generate))
        .route("/api/sessions/:id/result/:index/download", get(download_page))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        )
        .with_state(state)
}

/// Applies one wizard transition under the write lock and returns the new state.
fn transition(
    state: &AppState,
    id: Uuid,
    f: impl FnOnce(&WizardState) -> Result<WizardState, WizardError>,
) -> Result<Json<SessionView>, ApiError> {
    let mut store = state.store.write();
    let session = store.get_mut(&id).ok_or(ApiError::SessionNotFound(id))?;
    session.wizard = f(&session.wizard)?;
    session.last_touched = Utc::now();
    Ok(Json(SessionView { id, state: session.wizard.clone() }))
}

/// Drops sessions idle for longer than `max_idle`. Sessions with a run in flight are kept.
pub fn prune_idle_sessions(store: &SessionStore, max_idle: chrono::Duration) -> usize {
    let cutoff = Utc::now() - max_idle;
    let mut store = store.write();
    let before = store.len();
    store.retain(|_, s| s.wizard.is_generating || s.last_touched >= cutoff);
    let removed = before - store.len();
    if removed > 0 {
        tracing::info!("🧹 Pruned {} idle session(s), {} remaining", removed, store.len());
    }
    removed
}

pub async fn list_styles() -> Json<&'static [StylePreset]> {
    Json(catalog::style_presets())
}

pub async fn default_details() -> Json<WeddingDetails> {
    Json(catalog::default_details())
}

pub async fn create_session(State(state): State<AppState>) -> impl IntoResponse {
    let id = Uuid::new_v4();
    let session = Session::new();
    let wizard = session.wizard.clone();
    state.store.write().insert(id, session);
    tracing::info!("💍 Created wizard session {}", id);
    (StatusCode::CREATED, Json(SessionView { id, state: wizard }))
}

pub async fn get_session(Path(id): Path<Uuid>, State(state): State<AppState>) -> Result<Json<SessionView>, ApiError> {
    let mut store = state.store.write();
    let session = store.get_mut(&id).ok_or(ApiError::SessionNotFound(id))?;
    session.last_touched = Utc::now();
    Ok(Json(SessionView { id, state: session.wizard.clone() }))
}

/// Discards the session and any generated images it holds.
pub async fn delete_session(Path(id): Path<Uuid>, State(state): State<AppState>) -> Result<StatusCode, ApiError> {
    state.store.write().remove(&id).ok_or(ApiError::SessionNotFound(id))?;
    tracing::info!("🗑️ Deleted wizard session {}", id);
    Ok(StatusCode::NO_CONTENT)
}

pub async fn update_details(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Json(patch): Json<DetailsPatch>,
) -> Result<Json<SessionView>, ApiError> {
    transition(&state, id, |w| w.with_details(patch))
}

pub async fn select_style(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Json(body): Json<SelectStyleRequest>,
) -> Result<Json<SessionView>, ApiError> {
    let style = catalog::find_style(&body.style_id).ok_or_else(|| ApiError::StyleNotFound(body.style_id.clone()))?;
    transition(&state, id, |w| w.with_style(style))
}

pub async fn toggle_page(
    Path((id, page)): Path<(Uuid, String)>,
    State(state): State<AppState>,
) -> Result<Json<SessionView>, ApiError> {
    let page = PageType::from_slug(&page).ok_or(ApiError::UnknownPage(page))?;
    transition(&state, id, |w| w.toggle_page(page))
}

pub async fn set_quality(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Json(body): Json<QualityRequest>,
) -> Result<Json<SessionView>, ApiError> {
    transition(&state, id, |w| w.with_high_quality(body.high_quality))
}

pub async fn next_step(Path(id): Path<Uuid>, State(state): State<AppState>) -> Result<Json<SessionView>, ApiError> {
    transition(&state, id, WizardState::next)
}

pub async fn previous_step(Path(id): Path<Uuid>, State(state): State<AppState>) -> Result<Json<SessionView>, ApiError> {
    transition(&state, id, WizardState::back)
}

pub async fn start_over(Path(id): Path<Uuid>, State(state): State<AppState>) -> Result<Json<SessionView>, ApiError> {
    transition(&state, id, WizardState::start_over)
}

/// Starts a generation run in the background; poll the session for progress.
pub async fn generate(Path(id): Path<Uuid>, State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let (view, snapshot) = {
        let mut store = state.store.write();
        let session = store.get_mut(&id).ok_or(ApiError::SessionNotFound(id))?;
        let (next, snapshot) = session.wizard.begin_generation()?;
        session.wizard = next;
        session.last_touched = Utc::now();
        (SessionView { id, state: session.wizard.clone() }, snapshot)
    };

    tracing::info!("🚀 Session {} generating {} page(s)", id, snapshot.pages.len());

    let store = state.store.clone();
    let generator = state.generator.clone();
    tokio::spawn(async move {
        let progress_store = store.clone();
        let on_progress = move |percent: u8| {
            if let Some(session) = progress_store.write().get_mut(&id) {
                if let Ok(next) = session.wizard.record_progress(percent) {
                    session.wizard = next;
                }
            }
        };

        // A panicking generator must still leave the session out of the generating state.
        let run = tokio::spawn(async move {
            run_generation(generator.as_ref(), &snapshot, on_progress).await
        });
        let outcome = match run.await {
            Ok(outcome) => outcome.map_err(|e| e.to_string()),
            Err(join_error) => Err(format!("generation task aborted: {}", join_error)),
        };

        let mut store = store.write();
        let Some(session) = store.get_mut(&id) else { return };
        let next = match outcome {
            Ok(invitation) => {
                tracing::info!("✅ Session {} invitation {} ready", id, invitation.id);
                session.wizard.complete_generation(invitation)
            }
            Err(e) => {
                tracing::error!("❌ Session {} generation failed: {}", id, e);
                session.wizard.fail_generation()
            }
        };
        match next {
            Ok(next) => {
                session.wizard = next;
                session.last_touched = Utc::now();
            }
            Err(e) => tracing::warn!("⚠️ Session {} left unchanged after run: {}", id, e),
        }
    });

    Ok((StatusCode::ACCEPTED, Json(view)))
}

pub async fn download_page(
    Path((id, index)): Path<(Uuid, usize)>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let page = {
        let store = state.store.read();
        let session = store.get(&id).ok_or(ApiError::SessionNotFound(id))?;
        session
            .wizard
            .result
            .as_ref()
            .and_then(|r| r.pages.get(index))
            .cloned()
            .ok_or(ApiError::PageNotFound(index))?
    };

    let encoded = page.url.split_once("base64,").map(|(_, data)| data).unwrap_or(&page.url);
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(encoded)
        .map_err(|e| ApiError::CorruptImage(e.to_string()))?;

    let filename = page.page_type.download_filename();
    tracing::info!("📦 Session {} downloading {} ({} bytes)", id, filename, bytes.len());
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "image/png".to_string()),
            (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{}\"", filename)),
        ],
        Bytes::from(bytes),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_touched(minutes_ago: i64) -> Session {
        Session { wizard: WizardState::new(), last_touched: Utc::now() - chrono::Duration::minutes(minutes_ago) }
    }

    #[test]
    fn pruning_drops_only_idle_sessions() {
        let store: SessionStore = Arc::default();
        let fresh = Uuid::new_v4();
        let stale = Uuid::new_v4();
        let busy = Uuid::new_v4();

        let mut generating = session_touched(600);
        let (running, _) = generating.wizard.next().unwrap().next().unwrap().begin_generation().unwrap();
        generating.wizard = running;

        {
            let mut map = store.write();
            map.insert(fresh, session_touched(5));
            map.insert(stale, session_touched(120));
            map.insert(busy, generating);
        }

        let removed = prune_idle_sessions(&store, chrono::Duration::minutes(60));

        assert_eq!(removed, 1);
        let map = store.read();
        assert!(map.contains_key(&fresh));
        assert!(map.contains_key(&busy));
        assert!(!map.contains_key(&stale));
    }
}
