use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tokio::sync::{mpsc, oneshot, watch};
use uuid::Uuid;

use crate::error::{GameError, NotFoundKind};
use crate::phase;
use crate::players;
use crate::types::*;
use crate::words::WordSource;

type Reply<T> = oneshot::Sender<Result<T, GameError>>;

/// Commands the HTTP handlers send to a game task.
#[derive(Debug)]
pub enum GameCommand {
    AddPlayer {
        player: NewPlayer,
        reply: Reply<Player>,
    },
    StartPreparation {
        player_id: PlayerId,
        words_per_player: Option<usize>,
        reply: Reply<Arc<Game>>,
    },
    SubmitHint {
        author_id: PlayerId,
        hint: String,
        reply: Reply<Arc<Game>>,
    },
    ResetHint {
        hint_id: String,
        reply: Reply<Arc<Game>>,
    },
    EndHintPhase {
        player_id: PlayerId,
        reply: Reply<Arc<Game>>,
    },
    SubmitGuess {
        player_id: PlayerId,
        guess: String,
        reply: Reply<Arc<Game>>,
    },
    ResolveRound {
        player_id: PlayerId,
        correct: bool,
        reply: Reply<Arc<Game>>,
    },
}

pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

#[derive(Clone)]
pub struct GameHandle {
    pub game_id: String,
    pub cmd_tx: mpsc::Sender<GameCommand>,
    pub snapshot_rx: watch::Receiver<Arc<Game>>,
}

impl GameHandle {
    /// Latest committed state. Never observes a half-applied command.
    pub fn snapshot(&self) -> Arc<Game> {
        self.snapshot_rx.borrow().clone()
    }
}

/// Registry holds all active games.
pub struct Registry {
    /// game_id -> handle of the task that owns the game
    pub games: dashmap::DashMap<String, GameHandle>,
    config: GameConfig,
    words: Arc<dyn WordSource>,
}

impl Registry {
    pub fn new(config: GameConfig, words: Arc<dyn WordSource>) -> Arc<Self> {
        Arc::new(Self {
            games: dashmap::DashMap::new(),
            config,
            words,
        })
    }

    fn handle(&self, game_id: &str) -> Result<GameHandle, GameError> {
        self.games
            .get(game_id)
            .map(|h| h.clone())
            .ok_or_else(|| GameError::not_found(NotFoundKind::Game, game_id))
    }

    /// Create a new game and spawn its task.
    pub fn create_game(&self, request: CreateGameRequest) -> Result<Arc<Game>, GameError> {
        let language = request
            .language
            .clone()
            .filter(|l| !l.trim().is_empty())
            .unwrap_or_else(|| self.config.default_language.clone());
        if !self.words.has_language(&language) {
            return Err(GameError::not_found(NotFoundKind::Language, language));
        }

        let game_id = Uuid::new_v4().to_string();
        let game = phase::new_game(
            game_id.clone(),
            CreateGameRequest {
                language: Some(language),
                ..request
            },
            &self.config,
            now_millis(),
            &mut rand::rng(),
        );
        let game = Arc::new(game);

        let (cmd_tx, cmd_rx) = mpsc::channel(64);
        let (snapshot_tx, snapshot_rx) = watch::channel(game.clone());

        let handle = GameHandle {
            game_id: game_id.clone(),
            cmd_tx,
            snapshot_rx,
        };
        self.games.insert(game_id.clone(), handle);

        tokio::spawn(game_task(
            snapshot_tx,
            cmd_rx,
            self.config.clone(),
            self.words.clone(),
        ));

        tracing::info!("Game created: {} host: {}", game_id, game.host_id);
        Ok(game)
    }

    pub fn get(&self, game_id: &str) -> Result<Arc<Game>, GameError> {
        self.handle(game_id).map(|h| h.snapshot())
    }

    /// Every game, oldest first.
    pub fn list(&self) -> Vec<Arc<Game>> {
        let mut games: Vec<Arc<Game>> = self.games.iter().map(|h| h.snapshot()).collect();
        games.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        games
    }

    /// Remove a game. The host may always delete; anyone may clear out a
    /// finished or abandoned one.
    pub fn delete_game(&self, game_id: &str, player_id: Option<&str>) -> Result<(), GameError> {
        let game = self.get(game_id)?;

        let stale_after = Duration::from_secs(self.config.stale_after_hours.saturating_mul(3600));
        let idle = Duration::from_millis(now_millis().saturating_sub(game.updated_at));
        let is_host = player_id == Some(game.host_id.as_str());

        if !is_host && game.phase != Phase::End && idle < stale_after {
            return Err(GameError::not_authorized("only the game host may delete a running game"));
        }

        // Dropping the last sender stops the game task.
        if let Some((_, handle)) = self.games.remove(game_id) {
            tracing::info!("Game deleted: {}", handle.game_id);
        }
        Ok(())
    }

    async fn dispatch<T>(
        &self,
        game_id: &str,
        build: impl FnOnce(Reply<T>) -> GameCommand,
    ) -> Result<T, GameError> {
        let handle = self.handle(game_id)?;
        let (reply_tx, reply_rx) = oneshot::channel();

        handle
            .cmd_tx
            .send(build(reply_tx))
            .await
            .map_err(|_| GameError::Concurrency(game_id.to_string()))?;

        reply_rx
            .await
            .map_err(|_| GameError::Concurrency(game_id.to_string()))?
    }

    pub async fn add_player(&self, game_id: &str, player: NewPlayer) -> Result<Player, GameError> {
        self.dispatch(game_id, |reply| GameCommand::AddPlayer { player, reply })
            .await
    }

    pub async fn start_preparation(
        &self,
        game_id: &str,
        player_id: PlayerId,
        words_per_player: Option<usize>,
    ) -> Result<Arc<Game>, GameError> {
        self.dispatch(game_id, |reply| GameCommand::StartPreparation {
            player_id,
            words_per_player,
            reply,
        })
        .await
    }

    pub async fn submit_hint(
        &self,
        game_id: &str,
        author_id: PlayerId,
        hint: String,
    ) -> Result<Arc<Game>, GameError> {
        self.dispatch(game_id, |reply| GameCommand::SubmitHint {
            author_id,
            hint,
            reply,
        })
        .await
    }

    pub async fn reset_hint(&self, game_id: &str, hint_id: String) -> Result<Arc<Game>, GameError> {
        self.dispatch(game_id, |reply| GameCommand::ResetHint { hint_id, reply })
            .await
    }

    pub async fn end_hint_phase(&self, game_id: &str, player_id: PlayerId) -> Result<Arc<Game>, GameError> {
        self.dispatch(game_id, |reply| GameCommand::EndHintPhase { player_id, reply })
            .await
    }

    pub async fn submit_guess(
        &self,
        game_id: &str,
        player_id: PlayerId,
        guess: String,
    ) -> Result<Arc<Game>, GameError> {
        self.dispatch(game_id, |reply| GameCommand::SubmitGuess {
            player_id,
            guess,
            reply,
        })
        .await
    }

    pub async fn resolve_round(
        &self,
        game_id: &str,
        player_id: PlayerId,
        correct: bool,
    ) -> Result<Arc<Game>, GameError> {
        self.dispatch(game_id, |reply| GameCommand::ResolveRound {
            player_id,
            correct,
            reply,
        })
        .await
    }
}

/// Apply `op` to a private copy of the game and publish it only if it
/// succeeds. Derived fields are recomputed before publishing.
fn commit<T>(
    snapshot_tx: &watch::Sender<Arc<Game>>,
    op: impl FnOnce(&mut Game) -> Result<T, GameError>,
) -> Result<T, GameError> {
    let mut next = Game::clone(&snapshot_tx.borrow());
    let out = op(&mut next)?;

    phase::refresh(&mut next);
    next.updated_at = now_millis();
    snapshot_tx.send_replace(Arc::new(next));
    Ok(out)
}

fn commit_game(
    snapshot_tx: &watch::Sender<Arc<Game>>,
    op: impl FnOnce(&mut Game) -> Result<(), GameError>,
) -> Result<Arc<Game>, GameError> {
    commit(snapshot_tx, op)?;
    Ok(snapshot_tx.borrow().clone())
}

async fn game_task(
    snapshot_tx: watch::Sender<Arc<Game>>,
    mut cmd_rx: mpsc::Receiver<GameCommand>,
    config: GameConfig,
    words: Arc<dyn WordSource>,
) {
    let game_id = snapshot_tx.borrow().id.clone();

    // Process commands one at a time; this loop is the only writer.
    while let Some(cmd) = cmd_rx.recv().await {
        match cmd {
            GameCommand::AddPlayer { player, reply } => {
                let result = commit(&snapshot_tx, |game| {
                    players::add_player(game, player, &config, &mut rand::rng())
                });
                if let Ok(player) = &result {
                    tracing::info!("Player {} joined game {}", player.id, game_id);
                }
                let _ = reply.send(result);
            }
            GameCommand::StartPreparation {
                player_id,
                words_per_player,
                reply,
            } => {
                let words_per_player = words_per_player.unwrap_or(config.default_words_per_player);
                let result = commit_game(&snapshot_tx, |game| {
                    phase::start_preparation(
                        game,
                        &player_id,
                        words_per_player,
                        &config,
                        words.as_ref(),
                        &mut rand::rng(),
                    )
                });
                let _ = reply.send(result);
            }
            GameCommand::SubmitHint {
                author_id,
                hint,
                reply,
            } => {
                let result = commit_game(&snapshot_tx, |game| {
                    phase::submit_hint(game, &author_id, &hint)
                });
                let _ = reply.send(result);
            }
            GameCommand::ResetHint { hint_id, reply } => {
                let result = commit_game(&snapshot_tx, |game| phase::reset_hint(game, &hint_id));
                let _ = reply.send(result);
            }
            GameCommand::EndHintPhase { player_id, reply } => {
                let result = commit_game(&snapshot_tx, |game| {
                    phase::end_hint_phase(game, &player_id)
                });
                let _ = reply.send(result);
            }
            GameCommand::SubmitGuess {
                player_id,
                guess,
                reply,
            } => {
                let result = commit_game(&snapshot_tx, |game| {
                    phase::submit_guess(game, &player_id, &guess)
                });
                let _ = reply.send(result);
            }
            GameCommand::ResolveRound {
                player_id,
                correct,
                reply,
            } => {
                let result = commit_game(&snapshot_tx, |game| {
                    phase::resolve_round(game, &player_id, correct)
                });
                if let Ok(game) = &result {
                    tracing::info!(
                        "Game {} round resolved ({}), phase now {}",
                        game_id,
                        if correct { "correct" } else { "wrong" },
                        game.phase
                    );
                }
                let _ = reply.send(result);
            }
        }
    }

    // Channel closed - the game was deleted
    tracing::info!("Game {} task ended", game_id);
}
