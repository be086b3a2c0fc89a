use std::collections::{BTreeMap, VecDeque};

use rand::RngCore;

use crate::error::{GameError, NotFoundKind};
use crate::players;
use crate::types::{CreateGameRequest, Game, GameConfig, Phase, PlayerId, Round, RoundState};
use crate::words::{self, WordSource};

/// Build a fresh game in `Init` with the host seated first.
pub fn new_game(
    id: String,
    request: CreateGameRequest,
    config: &GameConfig,
    now: u64,
    rng: &mut dyn RngCore,
) -> Game {
    let name = match request.name.trim() {
        "" => id.clone(),
        name => name.to_string(),
    };
    let language = request
        .language
        .filter(|l| !l.trim().is_empty())
        .unwrap_or_else(|| config.default_language.clone());

    let mut game = Game {
        id,
        name,
        host_id: request.host.id.clone(),
        language,
        players: Vec::new(),
        phase: Phase::Init,
        round: 0,
        rounds: Vec::new(),
        word_pools: BTreeMap::new(),
        correct_words: Vec::new(),
        wrong_words: Vec::new(),
        is_two_player_variant: request.two_player_variant,
        action_required_from: Vec::new(),
        created_at: now,
        updated_at: now,
    };

    let host = players::build_player(&game, request.host, rng);
    game.players.push(host);
    refresh(&mut game);
    game
}

fn ensure_in_play(game: &Game, action: &'static str) -> Result<(), GameError> {
    match game.phase {
        Phase::Init | Phase::End => Err(GameError::invalid_phase(action, game.phase)),
        _ => Ok(()),
    }
}

fn ensure_host(game: &Game, player_id: &str, action: &str) -> Result<(), GameError> {
    if game.host_id == player_id {
        Ok(())
    } else {
        Err(GameError::not_authorized(format!("only the game host may {action}")))
    }
}

fn current_round_mut<'a>(game: &'a mut Game, action: &'static str) -> Result<&'a mut Round, GameError> {
    let phase = game.phase;
    game.current_round_mut()
        .ok_or(GameError::invalid_phase(action, phase))
}

/// Leave the lobby: hand out word pools and open the first round.
pub fn start_preparation(
    game: &mut Game,
    player_id: &str,
    words_per_player: usize,
    config: &GameConfig,
    source: &dyn WordSource,
    rng: &mut dyn RngCore,
) -> Result<(), GameError> {
    if game.phase != Phase::Init {
        return Err(GameError::invalid_phase("start the game", game.phase));
    }
    ensure_host(game, player_id, "start the game")?;

    let required = players::min_players(game, config);
    if game.players.len() < required {
        return Err(GameError::NotEnoughPlayers {
            required,
            joined: game.players.len(),
        });
    }
    if words_per_player == 0 || words_per_player > config.max_words_per_player {
        return Err(GameError::capacity(format!(
            "words per player must be between 1 and {}",
            config.max_words_per_player
        )));
    }

    words::allocate(game, words_per_player, source, rng)?;
    begin_round(game, 0);

    tracing::info!(
        "Game {} started with {} players, {} words each",
        game.id,
        game.players.len(),
        words_per_player
    );
    Ok(())
}

/// Open a round for the player at `guesser_index`, or end the game when
/// their pool is used up.
fn begin_round(game: &mut Game, guesser_index: usize) {
    let guesser_id = game.players[guesser_index].id.clone();
    let word = game
        .word_pools
        .get_mut(&guesser_id)
        .and_then(VecDeque::pop_front);

    let Some(word) = word else {
        game.phase = Phase::End;
        tracing::info!(
            "Game {} ended: {} of {} words guessed",
            game.id,
            game.correct_words.len(),
            game.total_words()
        );
        return;
    };

    let round_host_id = if game.is_two_player_variant {
        guesser_id.clone()
    } else {
        let host_index = (guesser_index + 1) % game.players.len();
        game.players[host_index].id.clone()
    };

    game.rounds.push(Round::new(&guesser_id, &round_host_id, word, &game.players));
    game.round = game.rounds.len() - 1;
    game.phase = Phase::HintWriting;
}

pub fn submit_hint(game: &mut Game, author_id: &str, text: &str) -> Result<(), GameError> {
    ensure_in_play(game, "submit a hint")?;
    let two_player = game.is_two_player_variant;
    let round = current_round_mut(game, "submit a hint")?;
    round.submit_hint(author_id, text)?;

    // The lone hint-giver's submission opens guessing right away.
    if two_player && round.has_all_hints() {
        round.end_hint_phase()?;
    }
    Ok(())
}

pub fn reset_hint(game: &mut Game, hint_id: &str) -> Result<(), GameError> {
    ensure_in_play(game, "reset a hint")?;
    current_round_mut(game, "reset a hint")?.reset_hint(hint_id)?;
    Ok(())
}

pub fn end_hint_phase(game: &mut Game, player_id: &str) -> Result<(), GameError> {
    ensure_in_play(game, "end the hint phase")?;
    if game.is_two_player_variant {
        return Err(GameError::invalid_phase(
            "end the hint phase in a two-player game",
            game.phase,
        ));
    }
    ensure_host(game, player_id, "end the hint phase")?;
    current_round_mut(game, "end the hint phase")?.end_hint_phase()
}

pub fn submit_guess(game: &mut Game, player_id: &str, guess: &str) -> Result<(), GameError> {
    ensure_in_play(game, "submit a guess")?;
    current_round_mut(game, "submit a guess")?.submit_guess(player_id, guess)
}

/// Settle the current round and move on to the next guesser.
pub fn resolve_round(game: &mut Game, player_id: &str, correct: bool) -> Result<(), GameError> {
    ensure_in_play(game, "resolve the round")?;
    let round = current_round_mut(game, "resolve the round")?;
    round.resolve(player_id, correct)?;

    let word = round.word.clone();
    let guesser_id = round.guesser_id.clone();
    if correct {
        game.correct_words.push(word);
    } else {
        game.wrong_words.push(word);
    }

    let guesser_index = game
        .player_index(&guesser_id)
        .ok_or_else(|| GameError::not_found(NotFoundKind::Player, guesser_id.clone()))?;
    begin_round(game, (guesser_index + 1) % game.players.len());
    Ok(())
}

/// Recompute everything derived from the rounds: the visible phase and
/// who the game is waiting on. Run after every mutation.
pub fn refresh(game: &mut Game) {
    if !matches!(game.phase, Phase::Init | Phase::End) {
        if let Some(round) = game.current_round() {
            game.phase = match round.state {
                // A resolved current round only survives at the very end.
                RoundState::Resolved => Phase::End,
                state => Phase::from(state),
            };
        }
    }
    game.action_required_from = action_required_from(game);
}

/// Players the game is currently blocked on.
pub fn action_required_from(game: &Game) -> Vec<PlayerId> {
    let Some(round) = game.current_round() else {
        return Vec::new();
    };
    match game.phase {
        Phase::HintWriting => round.missing_hints().cloned().collect(),
        Phase::Guessing => vec![round.guesser_id.clone()],
        Phase::Solution => vec![round.round_host_id.clone()],
        Phase::Init | Phase::End => Vec::new(),
    }
}
