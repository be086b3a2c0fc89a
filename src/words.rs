use std::collections::{BTreeMap, HashSet, VecDeque};

use rand::RngCore;
use rand::seq::{IndexedRandom, SliceRandom};

use crate::error::{GameError, NotFoundKind};
use crate::types::{Game, Phase};

/// A supply of unique words per language.
pub trait WordSource: Send + Sync {
    /// Draw `count` distinct words in random order.
    fn draw(&self, language: &str, count: usize, rng: &mut dyn RngCore) -> Result<Vec<String>, GameError>;

    fn has_language(&self, language: &str) -> bool;
}

/// In-memory word lists keyed by language code.
#[derive(Debug, Clone, Default)]
pub struct WordList {
    languages: BTreeMap<String, Vec<String>>,
}

impl WordList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a language. Blank entries and case-insensitive
    /// repeats are dropped, keeping the first spelling.
    pub fn with_language<I, S>(mut self, language: &str, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let unique = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_string())
            .filter(|w| !w.is_empty() && seen.insert(w.to_lowercase()))
            .collect();
        self.languages.insert(language.to_string(), unique);
        self
    }

    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.languages.keys().map(String::as_str)
    }

    pub fn len(&self, language: &str) -> usize {
        self.languages.get(language).map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.languages.values().all(Vec::is_empty)
    }
}

impl WordSource for WordList {
    fn draw(&self, language: &str, count: usize, rng: &mut dyn RngCore) -> Result<Vec<String>, GameError> {
        let words = self
            .languages
            .get(language)
            .ok_or_else(|| GameError::not_found(NotFoundKind::Language, language))?;

        if words.len() < count {
            return Err(GameError::InsufficientWords {
                language: language.to_string(),
                needed: count,
                available: words.len(),
            });
        }

        let mut picked: Vec<String> = words.choose_multiple(rng, count).cloned().collect();
        picked.shuffle(rng);
        Ok(picked)
    }

    fn has_language(&self, language: &str) -> bool {
        self.languages.contains_key(language)
    }
}

/// Give every player a private pool of `words_per_player` words, drawn
/// without replacement across the whole game.
pub fn allocate(
    game: &mut Game,
    words_per_player: usize,
    source: &dyn WordSource,
    rng: &mut dyn RngCore,
) -> Result<(), GameError> {
    if !game.word_pools.is_empty() {
        return Err(GameError::invalid_phase("allocate words twice", game.phase));
    }
    if game.phase != Phase::Init {
        return Err(GameError::invalid_phase("allocate words", game.phase));
    }

    let needed = game.players.len() * words_per_player;
    let drawn = source.draw(&game.language, needed, rng)?;

    game.word_pools = game
        .players
        .iter()
        .zip(drawn.chunks(words_per_player))
        .map(|(player, words)| (player.id.clone(), words.iter().cloned().collect::<VecDeque<_>>()))
        .collect();

    tracing::debug!(
        "Allocated {} words to {} players in game {}",
        needed,
        game.players.len(),
        game.id
    );
    Ok(())
}
