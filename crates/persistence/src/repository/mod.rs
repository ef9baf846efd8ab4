//! Repository implementations for database operations

pub mod audit;
pub mod games;
pub mod live_scores;
pub mod predictions;
pub mod sports;
pub mod stats;

pub use audit::*;
pub use games::*;
pub use live_scores::*;
pub use predictions::*;
pub use sports::*;
pub use stats::*;

use crate::DbResult;
use model::{
    Entity, Game, InsertPayload, LiveScore, PlayerStats, Prediction, Sport, Team, TeamStats,
};
use serde::Serialize;
use serde_json::Value;
use sqlx::SqlitePool;

/// A stored row of any entity
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StoredRecord {
    Sport(Sport),
    Team(Team),
    Game(Game),
    Prediction(Prediction),
    TeamStats(TeamStats),
    PlayerStats(PlayerStats),
    LiveScore(LiveScore),
}

/// Write a validated payload through its entity's repository
///
/// Live scores go through [`LiveScoreRepository::record`], so a game keeps
/// a single snapshot row.
pub async fn insert_payload(pool: &SqlitePool, payload: &InsertPayload) -> DbResult<StoredRecord> {
    Ok(match payload {
        InsertPayload::Sport(p) => StoredRecord::Sport(SportRepository::new(pool).insert(p).await?),
        InsertPayload::Team(p) => StoredRecord::Team(TeamRepository::new(pool).insert(p).await?),
        InsertPayload::Game(p) => StoredRecord::Game(GameRepository::new(pool).insert(p).await?),
        InsertPayload::Prediction(p) => {
            StoredRecord::Prediction(PredictionRepository::new(pool).insert(p).await?)
        }
        InsertPayload::TeamStats(p) => {
            StoredRecord::TeamStats(TeamStatsRepository::new(pool).insert(p).await?)
        }
        InsertPayload::PlayerStats(p) => {
            StoredRecord::PlayerStats(PlayerStatsRepository::new(pool).insert(p).await?)
        }
        InsertPayload::LiveScore(p) => {
            StoredRecord::LiveScore(LiveScoreRepository::new(pool).record(p).await?)
        }
    })
}

/// Validate an untyped payload for `entity` and store it
pub async fn insert_json(pool: &SqlitePool, entity: Entity, value: &Value) -> DbResult<StoredRecord> {
    let payload = entity.validate(value)?;
    insert_payload(pool, &payload).await
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use model::{
        validate, InsertGame, InsertPrediction, InsertSport, InsertTeam, InsertTeamStats,
    };
    use serde_json::json;

    pub fn insert_sport(name: &str) -> InsertSport {
        validate(&json!({
            "name": name,
            "shortName": name[..3].to_uppercase(),
            "color": "#1d4ed8"
        }))
        .unwrap()
    }

    pub fn insert_team(sport_id: i64, name: &str) -> InsertTeam {
        validate(&json!({
            "name": name,
            "shortName": name[..3].to_uppercase(),
            "sportId": sport_id,
            "country": "USA"
        }))
        .unwrap()
    }

    pub fn insert_game(sport_id: i64, home: i64, away: i64, game_time: &str) -> InsertGame {
        validate(&json!({
            "sportId": sport_id,
            "homeTeamId": home,
            "awayTeamId": away,
            "gameTime": game_time
        }))
        .unwrap()
    }

    pub async fn sport(pool: &SqlitePool, name: &str) -> Sport {
        SportRepository::new(pool)
            .insert(&insert_sport(name))
            .await
            .unwrap()
    }

    pub async fn team(pool: &SqlitePool, sport_id: i64, name: &str) -> Team {
        TeamRepository::new(pool)
            .insert(&insert_team(sport_id, name))
            .await
            .unwrap()
    }

    pub async fn game(pool: &SqlitePool, sport_id: i64, home: i64, away: i64) -> Game {
        GameRepository::new(pool)
            .insert(&insert_game(sport_id, home, away, "2026-11-02T00:30:00Z"))
            .await
            .unwrap()
    }

    pub async fn completed_game(
        pool: &SqlitePool,
        sport_id: i64,
        home: i64,
        away: i64,
        score: (i64, i64),
        game_time: &str,
    ) -> Game {
        let (home_score, away_score) = score;
        let insert: InsertGame = validate(&json!({
            "sportId": sport_id,
            "homeTeamId": home,
            "awayTeamId": away,
            "gameTime": game_time,
            "status": "completed",
            "homeScore": home_score,
            "awayScore": away_score
        }))
        .unwrap();
        GameRepository::new(pool).insert(&insert).await.unwrap()
    }

    pub async fn prediction(
        pool: &SqlitePool,
        game_id: i64,
        winner_id: i64,
        confidence: f64,
    ) -> Prediction {
        let insert: InsertPrediction = validate(&json!({
            "gameId": game_id,
            "predictedWinnerId": winner_id,
            "confidence": confidence
        }))
        .unwrap();
        PredictionRepository::new(pool).insert(&insert).await.unwrap()
    }

    pub async fn team_stats(pool: &SqlitePool, team_id: i64, sport_id: i64, wins: i64) -> TeamStats {
        let insert: InsertTeamStats = validate(&json!({
            "teamId": team_id,
            "sportId": sport_id,
            "gamesPlayed": wins + 2,
            "wins": wins,
            "losses": 2
        }))
        .unwrap();
        TeamStatsRepository::new(pool).insert(&insert).await.unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;
    use serde_json::json;

    #[tokio::test]
    async fn test_insert_payload_dispatches_by_entity() {
        let db = Database::in_memory().await.unwrap();

        let payload = Entity::Sport
            .validate(&json!({ "id": 77, "name": "Soccer", "shortName": "SOC", "color": "green" }))
            .unwrap();
        let stored = insert_payload(db.pool(), &payload).await.unwrap();

        let json = serde_json::to_value(&stored).unwrap();
        assert_eq!(json["id"], 1);
        assert_eq!(json["name"], "Soccer");
        assert_eq!(json["isActive"], true);
    }

    #[tokio::test]
    async fn test_insert_json_rejects_invalid_payload() {
        let db = Database::in_memory().await.unwrap();

        let err = insert_json(db.pool(), Entity::Game, &json!({ "sportId": 1 }))
            .await
            .unwrap_err();
        match err {
            crate::DbError::Validation(e) => {
                let mut fields: Vec<&str> = e.fields().collect();
                fields.sort_unstable();
                assert_eq!(fields, vec!["awayTeamId", "gameTime", "homeTeamId"]);
            }
            other => panic!("expected validation error, got {other}"),
        }

        let (games,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM games")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(games, 0);
    }

    #[tokio::test]
    async fn test_live_score_payload_overwrites() {
        let db = Database::in_memory().await.unwrap();

        for home in [1, 2, 3] {
            let payload = Entity::LiveScore
                .validate(&json!({ "gameId": 5, "homeTeamScore": home }))
                .unwrap();
            insert_payload(db.pool(), &payload).await.unwrap();
        }

        let score = LiveScoreRepository::new(db.pool())
            .for_game(5)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(score.id, 1);
        assert_eq!(score.home_team_score, Some(3));
    }
}
