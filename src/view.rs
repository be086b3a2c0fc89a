use std::collections::BTreeMap;

use serde::Serialize;

use crate::types::{Game, Hint, Phase, Player, PlayerId, Round, RoundState};

/// A game as one particular viewer is allowed to see it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameView {
    pub id: String,
    pub name: String,
    pub host_id: PlayerId,
    pub language: String,
    pub players: Vec<Player>,
    pub phase: Phase,
    pub round: usize,
    pub rounds: Vec<RoundView>,
    pub words_remaining: BTreeMap<PlayerId, usize>,
    pub total_words: usize,
    pub correct_words: Vec<String>,
    pub wrong_words: Vec<String>,
    pub score: usize,
    pub is_two_player_variant: bool,
    pub action_required_from: Vec<PlayerId>,
    pub created_at: u64,
    pub updated_at: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundView {
    pub guesser_id: PlayerId,
    pub round_host_id: PlayerId,
    pub state: RoundState,
    /// `None` while the word is secret to this viewer.
    pub word: Option<String>,
    pub hints: Vec<HintView>,
    pub guess: Option<String>,
    pub guessed_right: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HintView {
    pub id: String,
    pub author_id: PlayerId,
    /// `None` while the text is hidden from this viewer.
    pub hint: Option<String>,
    pub submitted: bool,
    pub is_duplicate: bool,
}

impl GameView {
    pub fn for_viewer(game: &Game, viewer: Option<&str>) -> Self {
        let viewer = viewer.filter(|id| game.player(id).is_some());

        let rounds = game
            .rounds
            .iter()
            .enumerate()
            .map(|(index, round)| {
                let live = index == game.round
                    && matches!(game.phase, Phase::HintWriting | Phase::Guessing);
                if live {
                    RoundView::masked(round, game.phase, viewer)
                } else {
                    RoundView::revealed(round)
                }
            })
            .collect();

        Self {
            id: game.id.clone(),
            name: game.name.clone(),
            host_id: game.host_id.clone(),
            language: game.language.clone(),
            players: game.players.clone(),
            phase: game.phase,
            round: game.round,
            rounds,
            words_remaining: game
                .word_pools
                .iter()
                .map(|(id, pool)| (id.clone(), pool.len()))
                .collect(),
            total_words: game.total_words(),
            correct_words: game.correct_words.clone(),
            wrong_words: game.wrong_words.clone(),
            score: game.score(),
            is_two_player_variant: game.is_two_player_variant,
            action_required_from: game.action_required_from.clone(),
            created_at: game.created_at,
            updated_at: game.updated_at,
        }
    }
}

impl RoundView {
    fn revealed(round: &Round) -> Self {
        Self {
            guesser_id: round.guesser_id.clone(),
            round_host_id: round.round_host_id.clone(),
            state: round.state,
            word: Some(round.word.clone()),
            hints: round.hints.iter().map(|h| HintView::shown(h, h.is_duplicate)).collect(),
            guess: round.guess.clone(),
            guessed_right: round.guessed_right,
        }
    }

    fn masked(round: &Round, phase: Phase, viewer: Option<&str>) -> Self {
        let is_guesser = viewer == Some(round.guesser_id.as_str());
        let word = match viewer {
            Some(_) if !is_guesser => Some(round.word.clone()),
            _ => None,
        };

        let hints = round
            .hints
            .iter()
            .map(|hint| {
                let own = viewer == Some(hint.author_id.as_str());
                match phase {
                    // Hints stay private to their authors until writing is over.
                    Phase::HintWriting if own => HintView::shown(hint, false),
                    Phase::HintWriting => HintView::hidden(hint, false),
                    // The guesser only ever sees hints that survived.
                    _ if is_guesser && hint.is_duplicate => HintView::hidden(hint, true),
                    _ if viewer.is_none() => HintView::hidden(hint, hint.is_duplicate),
                    _ => HintView::shown(hint, hint.is_duplicate),
                }
            })
            .collect();

        Self {
            guesser_id: round.guesser_id.clone(),
            round_host_id: round.round_host_id.clone(),
            state: round.state,
            word,
            hints,
            guess: round.guess.clone(),
            guessed_right: round.guessed_right,
        }
    }
}

impl HintView {
    fn shown(hint: &Hint, is_duplicate: bool) -> Self {
        Self {
            id: hint.id.clone(),
            author_id: hint.author_id.clone(),
            hint: Some(hint.hint.clone()),
            submitted: !hint.hint.is_empty(),
            is_duplicate,
        }
    }

    fn hidden(hint: &Hint, is_duplicate: bool) -> Self {
        Self {
            hint: None,
            ..Self::shown(hint, is_duplicate)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phase;
    use crate::test_support::started;

    fn hint_for<'a>(view: &'a GameView, author: &str) -> &'a HintView {
        view.rounds[view.round]
            .hints
            .iter()
            .find(|h| h.author_id == author)
            .unwrap()
    }

    #[test]
    fn guesser_never_sees_the_live_word() {
        let game = started(&["h1", "p1", "p2"], 1);

        let guesser = GameView::for_viewer(&game, Some("h1"));
        assert_eq!(guesser.rounds[0].word, None);

        let teammate = GameView::for_viewer(&game, Some("p1"));
        assert_eq!(teammate.rounds[0].word.as_deref(), Some(game.rounds[0].word.as_str()));

        let stranger = GameView::for_viewer(&game, Some("nobody"));
        assert_eq!(stranger.rounds[0].word, None);
    }

    #[test]
    fn hints_are_private_while_writing() {
        let mut game = started(&["h1", "p1", "p2"], 1);
        phase::submit_hint(&mut game, "p1", "Tier").unwrap();
        phase::submit_hint(&mut game, "p2", "tier").unwrap();

        let view = GameView::for_viewer(&game, Some("p1"));
        assert_eq!(hint_for(&view, "p1").hint.as_deref(), Some("Tier"));
        assert_eq!(hint_for(&view, "p2").hint, None);
        assert!(hint_for(&view, "p2").submitted);
        assert!(!hint_for(&view, "p2").is_duplicate);
    }

    #[test]
    fn guesser_sees_duplicates_only_as_markers() {
        let mut game = started(&["h1", "p1", "p2", "p3"], 1);
        phase::submit_hint(&mut game, "p1", "Tier").unwrap();
        phase::submit_hint(&mut game, "p2", "tier ").unwrap();
        phase::submit_hint(&mut game, "p3", "Rüssel").unwrap();
        phase::end_hint_phase(&mut game, "h1").unwrap();
        phase::refresh(&mut game);

        let guesser = GameView::for_viewer(&game, Some("h1"));
        assert_eq!(hint_for(&guesser, "p1").hint, None);
        assert!(hint_for(&guesser, "p1").is_duplicate);
        assert_eq!(hint_for(&guesser, "p2").hint, None);
        assert_eq!(hint_for(&guesser, "p3").hint.as_deref(), Some("Rüssel"));

        let teammate = GameView::for_viewer(&game, Some("p3"));
        assert_eq!(hint_for(&teammate, "p1").hint.as_deref(), Some("Tier"));
        assert!(hint_for(&teammate, "p1").is_duplicate);
    }

    #[test]
    fn solution_reveals_everything() {
        let mut game = started(&["h1", "p1", "p2"], 1);
        phase::submit_hint(&mut game, "p1", "Tier").unwrap();
        phase::end_hint_phase(&mut game, "h1").unwrap();
        phase::submit_guess(&mut game, "h1", "Hund").unwrap();
        phase::refresh(&mut game);

        let view = GameView::for_viewer(&game, Some("h1"));
        assert_eq!(view.phase, Phase::Solution);
        assert!(view.rounds[0].word.is_some());
        assert_eq!(view.rounds[0].guess.as_deref(), Some("Hund"));
        assert_eq!(hint_for(&view, "p1").hint.as_deref(), Some("Tier"));
    }

    #[test]
    fn pools_are_reported_as_counts() {
        let game = started(&["h1", "p1", "p2"], 2);
        let view = GameView::for_viewer(&game, None);

        assert_eq!(view.words_remaining["h1"], 1);
        assert_eq!(view.words_remaining["p1"], 2);
        assert_eq!(view.total_words, 6);

        let json = serde_json::to_value(&view).unwrap();
        assert!(json.get("wordPools").is_none());
        assert_eq!(json["phase"], "HINT_WRITING");
        assert_eq!(json["isTwoPlayerVariant"], false);
    }
}
