//! Builders shared by the unit tests.

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::phase;
use crate::players::COLORS;
use crate::types::{CreateGameRequest, Game, GameConfig, NewPlayer, Player};
use crate::words::WordList;

pub fn rng() -> StdRng {
    StdRng::seed_from_u64(7)
}

pub fn new_player(id: &str) -> NewPlayer {
    NewPlayer {
        id: id.to_string(),
        name: String::new(),
        color: None,
    }
}

pub fn players(ids: &[&str]) -> Vec<Player> {
    ids.iter()
        .enumerate()
        .map(|(i, id)| Player {
            id: id.to_string(),
            name: id.to_uppercase(),
            color: COLORS[i % COLORS.len()].to_string(),
        })
        .collect()
}

/// `count` distinct English words: word-0, word-1, ...
pub fn word_list(count: usize) -> WordList {
    WordList::new().with_language("en", (0..count).map(|i| format!("word-{i}")))
}

pub fn create_request(host: &str) -> CreateGameRequest {
    CreateGameRequest {
        name: "Test".into(),
        host: new_player(host),
        language: Some("en".into()),
        two_player_variant: false,
    }
}

/// A game still in the lobby with `host` seated first, then `others`.
pub fn lobby(host: &str, others: &[&str]) -> Game {
    let mut game = phase::new_game("g1".into(), create_request(host), &GameConfig::default(), 0, &mut rng());
    let mut ids = vec![host];
    ids.extend_from_slice(others);
    game.players = players(&ids);
    game
}

/// A game that has just entered its first round.
pub fn started(ids: &[&str], words_per_player: usize) -> Game {
    let mut game = lobby(ids[0], &ids[1..]);
    let words = word_list(ids.len() * words_per_player);
    phase::start_preparation(
        &mut game,
        ids[0],
        words_per_player,
        &GameConfig::default(),
        &words,
        &mut rng(),
    )
    .unwrap();
    phase::refresh(&mut game);
    game
}
