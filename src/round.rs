use std::collections::HashMap;

use uuid::Uuid;

use crate::error::{GameError, NotFoundKind};
use crate::types::{Hint, Phase, Player, PlayerId, Round, RoundState};

/// Form used to compare hints and guesses: trimmed and case-folded.
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Recompute `is_duplicate` for every hint from scratch.
///
/// Hints whose normalized text is shared by at least one other hint are all
/// marked, never just the later ones. Empty hints never count.
pub fn mark_duplicates(hints: &mut [Hint]) {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for hint in hints.iter() {
        let key = normalize(&hint.hint);
        if !key.is_empty() {
            *counts.entry(key).or_insert(0) += 1;
        }
    }

    for hint in hints.iter_mut() {
        let key = normalize(&hint.hint);
        hint.is_duplicate = !key.is_empty() && counts.get(&key).copied().unwrap_or(0) > 1;
    }
}

impl Round {
    /// Open a round with an empty placeholder hint for every player except
    /// the guesser, in turn order.
    pub fn new(guesser_id: &str, round_host_id: &str, word: String, players: &[Player]) -> Self {
        let hints = players
            .iter()
            .filter(|p| p.id != guesser_id)
            .map(|p| Hint {
                id: Uuid::new_v4().to_string(),
                author_id: p.id.clone(),
                hint: String::new(),
                is_duplicate: false,
            })
            .collect();

        Self {
            guesser_id: guesser_id.to_string(),
            round_host_id: round_host_id.to_string(),
            word,
            hints,
            guess: None,
            guessed_right: None,
            state: RoundState::CollectingHints,
        }
    }

    fn ensure_state(&self, expected: RoundState, action: &'static str) -> Result<(), GameError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(GameError::invalid_phase(action, Phase::from(self.state)))
        }
    }

    /// Write or overwrite the author's hint.
    pub fn submit_hint(&mut self, author_id: &str, text: &str) -> Result<&Hint, GameError> {
        if author_id == self.guesser_id {
            return Err(GameError::not_authorized("the guesser cannot give hints"));
        }
        self.ensure_state(RoundState::CollectingHints, "submit a hint")?;

        let index = self
            .hints
            .iter()
            .position(|h| h.author_id == author_id)
            .ok_or_else(|| GameError::not_authorized(format!("{author_id} is not giving hints this round")))?;

        self.hints[index].hint = text.trim().to_string();
        mark_duplicates(&mut self.hints);
        Ok(&self.hints[index])
    }

    /// Clear a hint so its author can write it again.
    pub fn reset_hint(&mut self, hint_id: &str) -> Result<&Hint, GameError> {
        self.ensure_state(RoundState::CollectingHints, "reset a hint")?;

        let index = self
            .hints
            .iter()
            .position(|h| h.id == hint_id)
            .ok_or_else(|| GameError::not_found(NotFoundKind::Hint, hint_id))?;

        self.hints[index].hint.clear();
        mark_duplicates(&mut self.hints);
        Ok(&self.hints[index])
    }

    /// Stop collecting hints, whether or not everyone has written one.
    pub fn end_hint_phase(&mut self) -> Result<(), GameError> {
        self.ensure_state(RoundState::CollectingHints, "end the hint phase")?;
        self.state = RoundState::AwaitingGuess;
        Ok(())
    }

    /// Record the guesser's raw guess and pre-fill the default judgment.
    pub fn submit_guess(&mut self, player_id: &str, guess: &str) -> Result<(), GameError> {
        if player_id != self.guesser_id {
            return Err(GameError::not_authorized("only the guesser may guess"));
        }
        self.ensure_state(RoundState::AwaitingGuess, "submit a guess")?;

        self.guessed_right = Some(self.is_exact_match(guess));
        self.guess = Some(guess.to_string());
        self.state = RoundState::AwaitingJudgment;
        Ok(())
    }

    /// The round host's final word on the guess.
    pub fn resolve(&mut self, player_id: &str, correct: bool) -> Result<(), GameError> {
        if player_id != self.round_host_id {
            return Err(GameError::not_authorized("only the round host may resolve the round"));
        }
        self.ensure_state(RoundState::AwaitingJudgment, "resolve the round")?;

        self.guessed_right = Some(correct);
        self.state = RoundState::Resolved;
        Ok(())
    }

    pub fn is_exact_match(&self, guess: &str) -> bool {
        let guess = normalize(guess);
        !guess.is_empty() && guess == normalize(&self.word)
    }

    /// Authors who have not written a non-empty hint yet, in turn order.
    pub fn missing_hints(&self) -> impl Iterator<Item = &PlayerId> {
        self.hints
            .iter()
            .filter(|h| h.hint.trim().is_empty())
            .map(|h| &h.author_id)
    }

    pub fn has_all_hints(&self) -> bool {
        self.missing_hints().next().is_none()
    }
}
