mod config;
mod error;
mod game;
mod phase;
mod players;
mod round;
mod routes;
mod types;
mod view;
mod words;

#[cfg(test)]
mod test_support;

use std::path::PathBuf;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::game::Registry;
use crate::routes::AppState;

// ─── Main ─────────────────────────────────────────────────────────

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config_dir = config::config_dir();
    config::init(&config_dir).expect("Failed to initialize config directory");

    let game_config = config::load_game_config(&config_dir).expect("Failed to load game.json");
    let words = config::load_word_list(&config_dir).expect("Failed to load word lists");
    tracing::info!(
        "Word lists available: {}",
        words
            .languages()
            .map(|l| format!("{} ({} words)", l, words.len(l)))
            .collect::<Vec<_>>()
            .join(", ")
    );

    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| "9000".to_string())
        .parse()
        .expect("Invalid PORT");

    let static_dir = PathBuf::from(std::env::var("STATIC_DIR").unwrap_or_else(|_| "static".to_string()));

    let state = AppState {
        registry: Registry::new(game_config, Arc::new(words)),
    };
    let app = routes::router(state, static_dir);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port))
        .await
        .expect("Failed to bind");

    tracing::info!("oneword server running on port {}", port);

    axum::serve(listener, app).await.expect("Server error");
}
