use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use crate::error::GameError;
use crate::game::Registry;
use crate::types::*;
use crate::view::GameView;

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<Registry>,
}

#[derive(Debug, Serialize)]
pub struct GameResponse {
    pub game: GameView,
}

#[derive(Debug, Serialize)]
pub struct GamesResponse {
    pub games: Vec<GameView>,
}

#[derive(Debug, Serialize)]
pub struct PlayerResponse {
    pub player: Player,
}

fn game_response(game: &Game, viewer: Option<&str>) -> Json<GameResponse> {
    Json(GameResponse {
        game: GameView::for_viewer(game, viewer),
    })
}

// ─── Routes ───────────────────────────────────────────────────────

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn list_games(
    State(state): State<AppState>,
    Query(viewer): Query<ViewerQuery>,
) -> Json<GamesResponse> {
    let games = state
        .registry
        .list()
        .iter()
        .map(|game| GameView::for_viewer(game, viewer.player_id.as_deref()))
        .collect();
    Json(GamesResponse { games })
}

async fn create_game(
    State(state): State<AppState>,
    Json(request): Json<CreateGameRequest>,
) -> Result<(StatusCode, Json<GameResponse>), GameError> {
    let host_id = request.host.id.clone();
    let game = state.registry.create_game(request)?;
    Ok((StatusCode::CREATED, game_response(&game, Some(&host_id))))
}

async fn get_game(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
    Query(viewer): Query<ViewerQuery>,
) -> Result<Json<GameResponse>, GameError> {
    let game = state.registry.get(&game_id)?;
    Ok(game_response(&game, viewer.player_id.as_deref()))
}

async fn delete_game(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
    Query(viewer): Query<ViewerQuery>,
) -> Result<StatusCode, GameError> {
    state
        .registry
        .delete_game(&game_id, viewer.player_id.as_deref())?;
    Ok(StatusCode::NO_CONTENT)
}

async fn add_player(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
    Json(request): Json<AddPlayerRequest>,
) -> Result<Json<PlayerResponse>, GameError> {
    let player = state.registry.add_player(&game_id, request.player).await?;
    Ok(Json(PlayerResponse { player }))
}

async fn start_preparation(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
    Json(request): Json<StartRequest>,
) -> Result<Json<GameResponse>, GameError> {
    let viewer = request.player_id.clone();
    let game = state
        .registry
        .start_preparation(&game_id, request.player_id, request.words_per_player)
        .await?;
    Ok(game_response(&game, Some(&viewer)))
}

async fn submit_hint(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
    Json(request): Json<HintRequest>,
) -> Result<Json<GameResponse>, GameError> {
    let viewer = request.author_id.clone();
    let game = state
        .registry
        .submit_hint(&game_id, request.author_id, request.hint)
        .await?;
    Ok(game_response(&game, Some(&viewer)))
}

async fn reset_hint(
    State(state): State<AppState>,
    Path((game_id, hint_id)): Path<(String, String)>,
    Query(viewer): Query<ViewerQuery>,
) -> Result<Json<GameResponse>, GameError> {
    let game = state.registry.reset_hint(&game_id, hint_id).await?;
    Ok(game_response(&game, viewer.player_id.as_deref()))
}

async fn end_hint_phase(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
    Json(request): Json<HostActionRequest>,
) -> Result<Json<GameResponse>, GameError> {
    let viewer = request.player_id.clone();
    let game = state
        .registry
        .end_hint_phase(&game_id, request.player_id)
        .await?;
    Ok(game_response(&game, Some(&viewer)))
}

async fn submit_guess(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
    Json(request): Json<GuessRequest>,
) -> Result<Json<GameResponse>, GameError> {
    let viewer = request.player_id.clone();
    let game = state
        .registry
        .submit_guess(&game_id, request.player_id, request.guess)
        .await?;
    Ok(game_response(&game, Some(&viewer)))
}

async fn resolve_round(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
    Json(request): Json<ResolveRequest>,
) -> Result<Json<GameResponse>, GameError> {
    let viewer = request.player_id.clone();
    let game = state
        .registry
        .resolve_round(&game_id, request.player_id, request.correct)
        .await?;
    Ok(game_response(&game, Some(&viewer)))
}

pub fn router(state: AppState, static_dir: PathBuf) -> Router {
    let api = Router::new()
        .route("/health", get(health))
        .route("/games", get(list_games).post(create_game))
        .route("/games/{game_id}", get(get_game).delete(delete_game))
        .route("/games/{game_id}/players", post(add_player))
        .route("/games/{game_id}/start", post(start_preparation))
        .route("/games/{game_id}/hints", post(submit_hint))
        .route("/games/{game_id}/hints/{hint_id}/reset", post(reset_hint))
        .route("/games/{game_id}/end-hint-phase", post(end_hint_phase))
        .route("/games/{game_id}/guess", post(submit_guess))
        .route("/games/{game_id}/resolve", post(resolve_round));

    Router::new()
        .nest("/api", api)
        .fallback_service(ServeDir::new(static_dir))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
