use rand::Rng;
use rand::seq::IndexedRandom;

use crate::error::GameError;
use crate::types::{Game, GameConfig, NewPlayer, Phase, Player};

/// Palette handed out to players who did not pick a free color.
pub const COLORS: [&str; 12] = [
    "#e53935", "#8e24aa", "#3949ab", "#039be5", "#00897b", "#7cb342",
    "#fdd835", "#fb8c00", "#6d4c41", "#d81b60", "#5e35b1", "#546e7a",
];

/// Most players a game of this variant may hold.
pub fn max_players(game: &Game, config: &GameConfig) -> usize {
    if game.is_two_player_variant {
        2
    } else {
        config.max_players
    }
}

/// Fewest players needed before the host can start.
pub fn min_players(game: &Game, config: &GameConfig) -> usize {
    if game.is_two_player_variant {
        2
    } else {
        config.min_players
    }
}

/// Join `candidate` to the game, appending to the turn order.
///
/// Joining again with a known id returns the stored player unchanged so
/// clients can retry blindly.
pub fn add_player<R: Rng + ?Sized>(
    game: &mut Game,
    candidate: NewPlayer,
    config: &GameConfig,
    rng: &mut R,
) -> Result<Player, GameError> {
    if let Some(existing) = game.player(&candidate.id) {
        return Ok(existing.clone());
    }

    if game.phase != Phase::Init {
        return Err(GameError::capacity(format!(
            "game {} has already started",
            game.id
        )));
    }

    let limit = max_players(game, config);
    if game.players.len() >= limit {
        return Err(GameError::capacity(format!(
            "game {} is full ({} players)",
            game.id, limit
        )));
    }

    let player = build_player(game, candidate, rng);
    game.players.push(player.clone());
    Ok(player)
}

/// Shape a client-submitted player into one that fits this game, without
/// registering it.
pub fn build_player<R: Rng + ?Sized>(game: &Game, candidate: NewPlayer, rng: &mut R) -> Player {
    let name = match candidate.name.trim() {
        "" => candidate.id.clone(),
        name => name.to_string(),
    };

    let color = match candidate.color.as_deref().map(str::trim) {
        Some(c) if !c.is_empty() && !color_taken(game, c) => c.to_string(),
        _ => pick_color(game, rng),
    };

    Player {
        id: candidate.id,
        name,
        color,
    }
}

fn color_taken(game: &Game, color: &str) -> bool {
    game.players
        .iter()
        .any(|p| p.color.eq_ignore_ascii_case(color))
}

fn pick_color<R: Rng + ?Sized>(game: &Game, rng: &mut R) -> String {
    let free: Vec<&str> = COLORS
        .iter()
        .copied()
        .filter(|c| !color_taken(game, c))
        .collect();

    if let Some(color) = free.choose(rng) {
        return color.to_string();
    }

    // Palette exhausted; fall back to random colors.
    loop {
        let color = format!("#{:06x}", rng.random_range(0..0x100_0000u32));
        if !color_taken(game, &color) {
            return color;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{lobby, new_player, rng};

    #[test]
    fn joining_appends_in_order() {
        let mut game = lobby("h1", &[]);
        let config = GameConfig::default();

        add_player(&mut game, new_player("p1"), &config, &mut rng()).unwrap();
        add_player(&mut game, new_player("p2"), &config, &mut rng()).unwrap();

        let ids: Vec<&str> = game.players.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["h1", "p1", "p2"]);
    }

    #[test]
    fn rejoining_is_idempotent() {
        let mut game = lobby("h1", &[]);
        let config = GameConfig::default();

        let first = add_player(&mut game, new_player("p1"), &config, &mut rng()).unwrap();
        let retry = NewPlayer {
            id: "p1".into(),
            name: "Someone Else".into(),
            color: Some("#000000".into()),
        };
        let second = add_player(&mut game, retry, &config, &mut rng()).unwrap();

        assert_eq!(first, second);
        assert_eq!(game.players.len(), 2);
    }

    #[test]
    fn joining_after_start_is_rejected_but_retry_is_not() {
        let mut game = lobby("h1", &["p1", "p2"]);
        game.phase = Phase::HintWriting;
        let config = GameConfig::default();

        let err = add_player(&mut game, new_player("late"), &config, &mut rng()).unwrap_err();
        assert!(matches!(err, GameError::Capacity(_)));

        let known = add_player(&mut game, new_player("p1"), &config, &mut rng()).unwrap();
        assert_eq!(known.id, "p1");
    }

    #[test]
    fn full_game_rejects_newcomers() {
        let mut game = lobby("h1", &["p1"]);
        let config = GameConfig {
            max_players: 2,
            ..GameConfig::default()
        };

        let err = add_player(&mut game, new_player("p2"), &config, &mut rng()).unwrap_err();
        assert!(matches!(err, GameError::Capacity(_)));
    }

    #[test]
    fn two_player_variant_caps_at_two() {
        let mut game = lobby("h1", &["p1"]);
        game.is_two_player_variant = true;

        let err = add_player(&mut game, new_player("p2"), &GameConfig::default(), &mut rng())
            .unwrap_err();
        assert!(matches!(err, GameError::Capacity(_)));
    }

    #[test]
    fn colliding_color_is_replaced() {
        let mut game = lobby("h1", &[]);
        let taken = game.players[0].color.clone();
        let candidate = NewPlayer {
            id: "p1".into(),
            name: "Pia".into(),
            color: Some(taken.to_uppercase()),
        };

        let player = add_player(&mut game, candidate, &GameConfig::default(), &mut rng()).unwrap();
        assert!(!player.color.eq_ignore_ascii_case(&taken));
    }

    #[test]
    fn free_color_and_name_are_kept() {
        let mut game = lobby("h1", &[]);
        let candidate = NewPlayer {
            id: "p1".into(),
            name: "  Pia ".into(),
            color: Some("#123456".into()),
        };

        let player = add_player(&mut game, candidate, &GameConfig::default(), &mut rng()).unwrap();
        assert_eq!(player.name, "Pia");
        assert_eq!(player.color, "#123456");
    }

    #[test]
    fn assigned_colors_stay_distinct_past_the_palette() {
        let mut game = lobby("h1", &[]);
        let config = GameConfig {
            max_players: 20,
            ..GameConfig::default()
        };
        for i in 0..19 {
            add_player(&mut game, new_player(&format!("p{i}")), &config, &mut rng()).unwrap();
        }

        let mut colors: Vec<String> = game.players.iter().map(|p| p.color.to_lowercase()).collect();
        colors.sort();
        colors.dedup();
        assert_eq!(colors.len(), 20);
    }

    #[test]
    fn blank_name_falls_back_to_id() {
        let game = lobby("h1", &[]);
        let player = build_player(&game, new_player("p9"), &mut rng());
        assert_eq!(player.name, "p9");
    }
}
