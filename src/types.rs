use std::collections::{BTreeMap, VecDeque};

use serde::{Deserialize, Serialize};

/// Opaque, client-asserted player identity.
pub type PlayerId = String;

/// A player in a game session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub color: String,
}

/// A player as submitted by a client. The color is optional and may be
/// replaced by the server if it collides with another player's.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPlayer {
    pub id: PlayerId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
}

/// A single hint written by a non-guessing player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hint {
    pub id: String,
    pub author_id: PlayerId,
    pub hint: String,
    pub is_duplicate: bool,
}

/// Progress of a single round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoundState {
    CollectingHints,
    AwaitingGuess,
    AwaitingJudgment,
    Resolved,
}

/// One guesser, one hidden word, and everything said about it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Round {
    pub guesser_id: PlayerId,
    pub round_host_id: PlayerId,
    pub word: String,
    pub hints: Vec<Hint>,
    pub guess: Option<String>,
    pub guessed_right: Option<bool>,
    pub state: RoundState,
}

/// All possible game phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    Init,
    HintWriting,
    Guessing,
    Solution,
    End,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Init => write!(f, "INIT"),
            Self::HintWriting => write!(f, "HINT_WRITING"),
            Self::Guessing => write!(f, "GUESSING"),
            Self::Solution => write!(f, "SOLUTION"),
            Self::End => write!(f, "END"),
        }
    }
}

impl From<RoundState> for Phase {
    fn from(state: RoundState) -> Self {
        match state {
            RoundState::CollectingHints => Phase::HintWriting,
            RoundState::AwaitingGuess => Phase::Guessing,
            RoundState::AwaitingJudgment => Phase::Solution,
            RoundState::Resolved => Phase::End,
        }
    }
}

/// The full server-side state of one game.
///
/// Word pools are never sent to clients as-is; see [`crate::view::GameView`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Game {
    pub id: String,
    pub name: String,
    pub host_id: PlayerId,
    pub language: String,
    pub players: Vec<Player>,
    pub phase: Phase,
    pub round: usize,
    pub rounds: Vec<Round>,
    pub word_pools: BTreeMap<PlayerId, VecDeque<String>>,
    pub correct_words: Vec<String>,
    pub wrong_words: Vec<String>,
    pub is_two_player_variant: bool,
    pub action_required_from: Vec<PlayerId>,
    pub created_at: u64,
    pub updated_at: u64,
}

impl Game {
    pub fn player(&self, id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn player_index(&self, id: &str) -> Option<usize> {
        self.players.iter().position(|p| p.id == id)
    }

    pub fn current_round(&self) -> Option<&Round> {
        self.rounds.get(self.round)
    }

    pub fn current_round_mut(&mut self) -> Option<&mut Round> {
        self.rounds.get_mut(self.round)
    }

    /// Number of words drawn for this game at start time.
    pub fn total_words(&self) -> usize {
        self.rounds.len() + self.word_pools.values().map(VecDeque::len).sum::<usize>()
    }

    pub fn score(&self) -> usize {
        self.correct_words.len()
    }
}

/// Tunables loaded from game.json.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GameConfig {
    pub min_players: usize,
    pub max_players: usize,
    pub default_words_per_player: usize,
    pub max_words_per_player: usize,
    pub default_language: String,
    pub stale_after_hours: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            min_players: 3,
            max_players: 10,
            default_words_per_player: 2,
            max_words_per_player: 5,
            default_language: "en".to_string(),
            stale_after_hours: 24,
        }
    }
}

// ─── Requests ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGameRequest {
    #[serde(default)]
    pub name: String,
    pub host: NewPlayer,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub two_player_variant: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AddPlayerRequest {
    pub player: NewPlayer,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartRequest {
    pub player_id: PlayerId,
    #[serde(default)]
    pub words_per_player: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HintRequest {
    pub author_id: PlayerId,
    pub hint: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostActionRequest {
    pub player_id: PlayerId,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuessRequest {
    pub player_id: PlayerId,
    pub guess: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveRequest {
    pub player_id: PlayerId,
    pub correct: bool,
}

/// Optional `?playerId=` used to project a game for one viewer.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewerQuery {
    #[serde(default)]
    pub player_id: Option<PlayerId>,
}
