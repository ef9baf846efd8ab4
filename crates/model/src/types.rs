//! Selected-row types, one per persisted table
//!
//! Field names follow the storage columns (snake_case) for `sqlx::FromRow`
//! and serialize in camelCase for API consumers.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::types::Json;
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Lifecycle state of a game
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    JsonSchema,
    sqlx::Type,
)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum GameStatus {
    #[default]
    Scheduled,
    Live,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown game status '{0}' (expected scheduled, live, completed or cancelled)")]
pub struct UnknownStatus(pub String);

impl GameStatus {
    pub const ALL: [GameStatus; 4] = [
        GameStatus::Scheduled,
        GameStatus::Live,
        GameStatus::Completed,
        GameStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GameStatus::Scheduled => "scheduled",
            GameStatus::Live => "live",
            GameStatus::Completed => "completed",
            GameStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GameStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GameStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

/// A sport category (e.g. basketball)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Sport {
    pub id: i64,
    pub name: String,
    pub short_name: String,
    pub color: String,
    pub is_active: Option<bool>,
}

/// A competing team, belonging to exactly one sport
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: i64,
    pub name: String,
    pub short_name: String,
    pub sport_id: i64,
    pub logo: Option<String>,
    pub ranking: Option<i64>,
    pub country: Option<String>,
    pub is_active: Option<bool>,
}

/// A scheduled, live or finished match between two teams
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    pub id: i64,
    pub sport_id: i64,
    pub home_team_id: i64,
    pub away_team_id: i64,
    pub game_time: DateTime<Utc>,
    pub venue: Option<String>,
    pub weather: Option<String>,
    pub temperature: Option<String>,
    pub status: Option<GameStatus>,
    pub home_score: Option<i64>,
    pub away_score: Option<i64>,
    pub current_period: Option<String>,
    /// Additional game-specific data
    pub game_data: Option<Json<Value>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Game {
    /// Stored status, falling back to the column default when NULL
    pub fn current_status(&self) -> GameStatus {
        self.status.unwrap_or_default()
    }

    pub fn involves(&self, team_id: i64) -> bool {
        self.home_team_id == team_id || self.away_team_id == team_id
    }

    /// Final scores, only once the game is completed and both are recorded
    pub fn final_score(&self) -> Option<(i64, i64)> {
        if self.current_status() != GameStatus::Completed {
            return None;
        }
        Some((self.home_score?, self.away_score?))
    }

    /// Winning team id of a completed game; `None` for draws and unfinished games
    pub fn winner_id(&self) -> Option<i64> {
        let (home, away) = self.final_score()?;
        match home.cmp(&away) {
            std::cmp::Ordering::Greater => Some(self.home_team_id),
            std::cmp::Ordering::Less => Some(self.away_team_id),
            std::cmp::Ordering::Equal => None,
        }
    }
}

/// A generated forecast for a game's outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    pub id: i64,
    pub game_id: i64,
    pub predicted_winner_id: i64,
    /// Intended 0-100; not enforced by storage
    pub confidence: f64,
    /// Prediction factors and weights
    pub factors: Option<Json<Value>>,
    pub team_form_factor: Option<f64>,
    pub head_to_head_factor: Option<f64>,
    pub injury_factor: Option<f64>,
    pub home_advantage: Option<f64>,
    pub weather_factor: Option<f64>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Rolling performance aggregate for a team within a sport
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TeamStats {
    pub id: i64,
    pub team_id: i64,
    pub sport_id: i64,
    pub games_played: Option<i64>,
    pub wins: Option<i64>,
    pub losses: Option<i64>,
    pub draws: Option<i64>,
    pub win_percentage: Option<f64>,
    pub average_score: Option<f64>,
    /// Result code string, most recent last (e.g. "WWLWD")
    pub recent_form: Option<String>,
    pub home_win_rate: Option<f64>,
    pub away_win_rate: Option<f64>,
    pub last_updated: Option<DateTime<Utc>>,
}

/// A player's current status and performance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStats {
    pub id: i64,
    pub name: String,
    pub team_id: i64,
    pub sport_id: i64,
    pub position: Option<String>,
    pub is_injured: Option<bool>,
    pub injury_details: Option<String>,
    pub performance_rating: Option<f64>,
    /// Sport-specific stats
    pub stats_data: Option<Json<Value>>,
    pub last_updated: Option<DateTime<Utc>>,
}

/// Latest score snapshot for an in-progress game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct LiveScore {
    pub id: i64,
    pub game_id: i64,
    pub home_team_score: Option<i64>,
    pub away_team_score: Option<i64>,
    pub period: Option<String>,
    pub time_remaining: Option<String>,
    pub last_updated: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn make_game(status: Option<GameStatus>, home: Option<i64>, away: Option<i64>) -> Game {
        Game {
            id: 1,
            sport_id: 1,
            home_team_id: 10,
            away_team_id: 20,
            game_time: Utc.with_ymd_and_hms(2026, 3, 1, 19, 30, 0).unwrap(),
            venue: None,
            weather: None,
            temperature: None,
            status,
            home_score: home,
            away_score: away,
            current_period: None,
            game_data: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_status_round_trips_through_str() {
        for status in GameStatus::ALL {
            assert_eq!(status.as_str().parse::<GameStatus>().unwrap(), status);
        }
        assert!("postponed".parse::<GameStatus>().is_err());
    }

    #[test]
    fn test_null_status_reads_as_scheduled() {
        let game = make_game(None, None, None);
        assert_eq!(game.current_status(), GameStatus::Scheduled);
    }

    #[test]
    fn test_winner_requires_completed_game() {
        let live = make_game(Some(GameStatus::Live), Some(3), Some(1));
        assert_eq!(live.winner_id(), None);

        let done = make_game(Some(GameStatus::Completed), Some(3), Some(1));
        assert_eq!(done.winner_id(), Some(10));

        let away_win = make_game(Some(GameStatus::Completed), Some(0), Some(2));
        assert_eq!(away_win.winner_id(), Some(20));

        let draw = make_game(Some(GameStatus::Completed), Some(2), Some(2));
        assert_eq!(draw.winner_id(), None);
        assert_eq!(draw.final_score(), Some((2, 2)));
    }

    #[test]
    fn test_row_serializes_camel_case() {
        let game = make_game(Some(GameStatus::Live), Some(1), None);
        let json = serde_json::to_value(&game).unwrap();
        assert_eq!(json["homeTeamId"], 10);
        assert_eq!(json["status"], "live");
        assert!(json["gameData"].is_null());
        assert!(json.get("home_team_id").is_none());
    }
}
