//! Domain invariants the storage layer does not enforce
//!
//! These checks only report. Nothing here rejects an insert.

use crate::types::{Game, Prediction, TeamStats};
use serde::Serialize;
use std::fmt;

pub const CONFIDENCE_RANGE: std::ops::RangeInclusive<f64> = 0.0..=100.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum Violation {
    ConfidenceOutOfRange {
        prediction_id: i64,
        confidence: f64,
    },
    NegativeCount {
        team_stats_id: i64,
        field: &'static str,
        value: i64,
    },
    GamesPlayedMismatch {
        team_stats_id: i64,
        games_played: i64,
        recorded: i64,
    },
    SameTeamBothSides {
        game_id: i64,
        team_id: i64,
    },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::ConfidenceOutOfRange {
                prediction_id,
                confidence,
            } => write!(
                f,
                "prediction {prediction_id}: confidence {confidence} outside 0-100"
            ),
            Violation::NegativeCount {
                team_stats_id,
                field,
                value,
            } => write!(f, "team_stats {team_stats_id}: {field} is negative ({value})"),
            Violation::GamesPlayedMismatch {
                team_stats_id,
                games_played,
                recorded,
            } => write!(
                f,
                "team_stats {team_stats_id}: gamesPlayed {games_played} but wins+losses+draws = {recorded}"
            ),
            Violation::SameTeamBothSides { game_id, team_id } => {
                write!(f, "game {game_id}: team {team_id} is both home and away")
            }
        }
    }
}

pub fn check_prediction(prediction: &Prediction) -> Vec<Violation> {
    if CONFIDENCE_RANGE.contains(&prediction.confidence) {
        Vec::new()
    } else {
        vec![Violation::ConfidenceOutOfRange {
            prediction_id: prediction.id,
            confidence: prediction.confidence,
        }]
    }
}

/// NULL counts read as their column default of zero
pub fn check_team_stats(stats: &TeamStats) -> Vec<Violation> {
    let counts = [
        ("gamesPlayed", stats.games_played.unwrap_or(0)),
        ("wins", stats.wins.unwrap_or(0)),
        ("losses", stats.losses.unwrap_or(0)),
        ("draws", stats.draws.unwrap_or(0)),
    ];

    let mut violations: Vec<Violation> = counts
        .iter()
        .filter(|(_, value)| *value < 0)
        .map(|&(field, value)| Violation::NegativeCount {
            team_stats_id: stats.id,
            field,
            value,
        })
        .collect();

    let games_played = counts[0].1;
    let recorded: i64 = counts[1..].iter().map(|(_, v)| v).sum();
    if games_played != recorded {
        violations.push(Violation::GamesPlayedMismatch {
            team_stats_id: stats.id,
            games_played,
            recorded,
        });
    }

    violations
}

pub fn check_game(game: &Game) -> Vec<Violation> {
    if game.home_team_id == game.away_team_id {
        vec![Violation::SameTeamBothSides {
            game_id: game.id,
            team_id: game.home_team_id,
        }]
    } else {
        Vec::new()
    }
}
