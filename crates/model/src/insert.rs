//! Insert shapes and their validators
//!
//! Each insert type accepts every column of its table except the
//! server-managed ones (`id`, plus `createdAt`/`updatedAt`/`lastUpdated`
//! where the table has them). A JSON Schema is derived from each type and
//! payloads are validated against it before deserializing.
//!
//! A defaulted column takes its default only when the key is omitted; an
//! explicit `null` is kept and stored as NULL. Validation only checks what
//! the storage type implies. There are no range or reference checks here:
//! `confidence: 150` is accepted.

use crate::types::GameStatus;
use crate::validation::{self, ValidationError};
use chrono::{DateTime, Utc};
use schemars::{schema_for, JsonSchema, Schema};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// A record shape accepted for creation
pub trait InsertSchema: Serialize + DeserializeOwned + JsonSchema {
    /// Singular entity name used in errors and logs
    const ENTITY: &'static str;
}

/// Validate a candidate payload for insertion
pub fn validate<T: InsertSchema>(value: &Value) -> Result<T, ValidationError> {
    let schema = schema_for!(T);
    let result = validation::narrow(T::ENTITY, schema.as_value(), value);
    match &result {
        Ok(_) => debug!(entity = T::ENTITY, "insert payload accepted"),
        Err(e) => debug!(
            entity = T::ENTITY,
            issues = e.issues.len(),
            "insert payload rejected: {}",
            e
        ),
    }
    result
}

fn default_true() -> Option<bool> {
    Some(true)
}

fn default_false() -> Option<bool> {
    Some(false)
}

fn default_count() -> Option<i64> {
    Some(0)
}

fn default_rate() -> Option<f64> {
    Some(0.0)
}

fn default_status() -> Option<GameStatus> {
    Some(GameStatus::Scheduled)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct InsertSport {
    pub name: String,
    pub short_name: String,
    pub color: String,
    #[serde(default = "default_true")]
    pub is_active: Option<bool>,
}

impl InsertSchema for InsertSport {
    const ENTITY: &'static str = "sport";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct InsertTeam {
    pub name: String,
    pub short_name: String,
    pub sport_id: i64,
    pub logo: Option<String>,
    pub ranking: Option<i64>,
    pub country: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: Option<bool>,
}

impl InsertSchema for InsertTeam {
    const ENTITY: &'static str = "team";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct InsertGame {
    pub sport_id: i64,
    pub home_team_id: i64,
    pub away_team_id: i64,
    pub game_time: DateTime<Utc>,
    pub venue: Option<String>,
    pub weather: Option<String>,
    pub temperature: Option<String>,
    #[serde(default = "default_status")]
    pub status: Option<GameStatus>,
    pub home_score: Option<i64>,
    pub away_score: Option<i64>,
    pub current_period: Option<String>,
    /// Sport-specific extras, stored as-is
    pub game_data: Option<Value>,
}

impl InsertSchema for InsertGame {
    const ENTITY: &'static str = "game";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct InsertPrediction {
    pub game_id: i64,
    pub predicted_winner_id: i64,
    pub confidence: f64,
    pub factors: Option<Value>,
    pub team_form_factor: Option<f64>,
    pub head_to_head_factor: Option<f64>,
    pub injury_factor: Option<f64>,
    pub home_advantage: Option<f64>,
    pub weather_factor: Option<f64>,
}

impl InsertSchema for InsertPrediction {
    const ENTITY: &'static str = "prediction";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct InsertTeamStats {
    pub team_id: i64,
    pub sport_id: i64,
    #[serde(default = "default_count")]
    pub games_played: Option<i64>,
    #[serde(default = "default_count")]
    pub wins: Option<i64>,
    #[serde(default = "default_count")]
    pub losses: Option<i64>,
    #[serde(default = "default_count")]
    pub draws: Option<i64>,
    #[serde(default = "default_rate")]
    pub win_percentage: Option<f64>,
    #[serde(default = "default_rate")]
    pub average_score: Option<f64>,
    pub recent_form: Option<String>,
    #[serde(default = "default_rate")]
    pub home_win_rate: Option<f64>,
    #[serde(default = "default_rate")]
    pub away_win_rate: Option<f64>,
}

impl InsertSchema for InsertTeamStats {
    const ENTITY: &'static str = "team_stats";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct InsertPlayerStats {
    pub name: String,
    pub team_id: i64,
    pub sport_id: i64,
    pub position: Option<String>,
    #[serde(default = "default_false")]
    pub is_injured: Option<bool>,
    pub injury_details: Option<String>,
    pub performance_rating: Option<f64>,
    pub stats_data: Option<Value>,
}

impl InsertSchema for InsertPlayerStats {
    const ENTITY: &'static str = "player_stats";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct InsertLiveScore {
    pub game_id: i64,
    #[serde(default = "default_count")]
    pub home_team_score: Option<i64>,
    #[serde(default = "default_count")]
    pub away_team_score: Option<i64>,
    pub period: Option<String>,
    pub time_remaining: Option<String>,
}

impl InsertSchema for InsertLiveScore {
    const ENTITY: &'static str = "live_score";
}

/// The seven persisted record kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Entity {
    Sport,
    Team,
    Game,
    Prediction,
    TeamStats,
    PlayerStats,
    LiveScore,
}

impl Entity {
    pub const ALL: [Entity; 7] = [
        Entity::Sport,
        Entity::Team,
        Entity::Game,
        Entity::Prediction,
        Entity::TeamStats,
        Entity::PlayerStats,
        Entity::LiveScore,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Entity::Sport => InsertSport::ENTITY,
            Entity::Team => InsertTeam::ENTITY,
            Entity::Game => InsertGame::ENTITY,
            Entity::Prediction => InsertPrediction::ENTITY,
            Entity::TeamStats => InsertTeamStats::ENTITY,
            Entity::PlayerStats => InsertPlayerStats::ENTITY,
            Entity::LiveScore => InsertLiveScore::ENTITY,
        }
    }

    /// Storage table name
    pub fn table(&self) -> &'static str {
        match self {
            Entity::Sport => "sports",
            Entity::Team => "teams",
            Entity::Game => "games",
            Entity::Prediction => "predictions",
            Entity::TeamStats => "team_stats",
            Entity::PlayerStats => "player_stats",
            Entity::LiveScore => "live_scores",
        }
    }

    /// JSON Schema of this entity's insert shape
    pub fn insert_schema(&self) -> Schema {
        match self {
            Entity::Sport => schema_for!(InsertSport),
            Entity::Team => schema_for!(InsertTeam),
            Entity::Game => schema_for!(InsertGame),
            Entity::Prediction => schema_for!(InsertPrediction),
            Entity::TeamStats => schema_for!(InsertTeamStats),
            Entity::PlayerStats => schema_for!(InsertPlayerStats),
            Entity::LiveScore => schema_for!(InsertLiveScore),
        }
    }

    /// API field names a caller may supply, sorted
    pub fn insertable_fields(&self) -> Vec<String> {
        let schema = self.insert_schema();
        let mut fields: Vec<String> = schema
            .as_object()
            .and_then(|root| root.get("properties"))
            .and_then(Value::as_object)
            .map(|properties| properties.keys().cloned().collect())
            .unwrap_or_default();
        fields.sort_unstable();
        fields
    }

    /// API field names the schema requires
    pub fn required_fields(&self) -> Vec<String> {
        let schema = self.insert_schema();
        let mut fields: Vec<String> = schema
            .as_object()
            .and_then(|root| root.get("required"))
            .and_then(Value::as_array)
            .map(|required| {
                required
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        fields.sort_unstable();
        fields
    }

    /// Run this entity's insert-validator over an untyped payload
    pub fn validate(&self, value: &Value) -> Result<InsertPayload, ValidationError> {
        Ok(match self {
            Entity::Sport => InsertPayload::Sport(validate(value)?),
            Entity::Team => InsertPayload::Team(validate(value)?),
            Entity::Game => InsertPayload::Game(validate(value)?),
            Entity::Prediction => InsertPayload::Prediction(validate(value)?),
            Entity::TeamStats => InsertPayload::TeamStats(validate(value)?),
            Entity::PlayerStats => InsertPayload::PlayerStats(validate(value)?),
            Entity::LiveScore => InsertPayload::LiveScore(validate(value)?),
        })
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Entity {
    type Err = String;

    /// Accepts singular, plural (table) and camelCase names
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().replace('-', "_").to_lowercase();
        Entity::ALL
            .into_iter()
            .find(|entity| {
                key == entity.name()
                    || key == entity.table()
                    || key == entity.name().replace('_', "")
            })
            .ok_or_else(|| {
                let known: Vec<&str> = Entity::ALL.iter().map(|e| e.name()).collect();
                format!("unknown entity '{s}' (expected one of: {})", known.join(", "))
            })
    }
}

/// A validated insert of any entity
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum InsertPayload {
    Sport(InsertSport),
    Team(InsertTeam),
    Game(InsertGame),
    Prediction(InsertPrediction),
    TeamStats(InsertTeamStats),
    PlayerStats(InsertPlayerStats),
    LiveScore(InsertLiveScore),
}

impl InsertPayload {
    pub fn entity(&self) -> Entity {
        match self {
            InsertPayload::Sport(_) => Entity::Sport,
            InsertPayload::Team(_) => Entity::Team,
            InsertPayload::Game(_) => Entity::Game,
            InsertPayload::Prediction(_) => Entity::Prediction,
            InsertPayload::TeamStats(_) => Entity::TeamStats,
            InsertPayload::PlayerStats(_) => Entity::PlayerStats,
            InsertPayload::LiveScore(_) => Entity::LiveScore,
        }
    }
}
