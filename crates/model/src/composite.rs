//! Read-model shapes assembled from several rows for API responses

use crate::types::{Game, LiveScore, PlayerStats, Prediction, Sport, Team, TeamStats};
use serde::{Deserialize, Serialize};

/// A game with its sport, both teams and any prediction or live score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameWithDetails {
    #[serde(flatten)]
    pub game: Game,
    pub sport: Sport,
    pub home_team: Team,
    pub away_team: Team,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub prediction: Option<Prediction>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub live_score: Option<LiveScore>,
}

/// A team with its sport and current aggregate stats
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamWithStats {
    #[serde(flatten)]
    pub team: Team,
    pub stats: TeamStats,
    pub sport: Sport,
}

/// Past meetings between the two teams of a game
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeadToHead {
    pub total_games: u32,
    /// Won by the described game's home team, wherever it was played
    pub home_wins: u32,
    /// Won by the described game's away team, wherever it was played
    pub away_wins: u32,
    pub draws: u32,
}

impl HeadToHead {
    /// Tally completed meetings between `home_team_id` and `away_team_id`
    ///
    /// Either orientation counts. Games without both final scores are
    /// skipped, as is `exclude_game_id` (the game being described).
    pub fn from_games<'a>(
        home_team_id: i64,
        away_team_id: i64,
        exclude_game_id: Option<i64>,
        games: impl IntoIterator<Item = &'a Game>,
    ) -> Self {
        let mut h2h = HeadToHead::default();
        for game in games {
            if Some(game.id) == exclude_game_id {
                continue;
            }
            if !(game.involves(home_team_id) && game.involves(away_team_id)) {
                continue;
            }
            if game.final_score().is_none() {
                continue;
            }
            h2h.total_games += 1;
            match game.winner_id() {
                Some(id) if id == home_team_id => h2h.home_wins += 1,
                Some(id) if id == away_team_id => h2h.away_wins += 1,
                _ => h2h.draws += 1,
            }
        }
        h2h
    }
}

/// Everything the game detail view needs in one response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStatsDetails {
    pub game: GameWithDetails,
    pub home_team_stats: TeamStats,
    pub away_team_stats: TeamStats,
    pub home_players: Vec<PlayerStats>,
    pub away_players: Vec<PlayerStats>,
    pub head_to_head: HeadToHead,
}
