//! Live score repository
//!
//! A game keeps one live score row that is overwritten as play goes on.

use crate::schema::{LIVE_SCORES, NOW_SQL};
use crate::{DbError, DbResult};
use model::{InsertLiveScore, LiveScore};
use sqlx::SqlitePool;
use tracing::debug;

pub struct LiveScoreRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> LiveScoreRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Plain insert of a new row; prefer [`Self::record`] for score updates
    pub async fn insert(&self, score: &InsertLiveScore) -> DbResult<LiveScore> {
        let result = sqlx::query(
            r#"
            INSERT INTO live_scores (game_id, home_team_score, away_team_score, period, time_remaining)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(score.game_id)
        .bind(score.home_team_score)
        .bind(score.away_team_score)
        .bind(&score.period)
        .bind(&score.time_remaining)
        .execute(self.pool)
        .await?;

        let id = result.last_insert_rowid();
        debug!(id, game_id = score.game_id, "live score inserted");
        self.get(id).await?.ok_or(DbError::NotFound {
            entity: "live_score",
            id,
        })
    }

    /// Overwrite the game's live score snapshot, inserting it the first time
    pub async fn record(&self, score: &InsertLiveScore) -> DbResult<LiveScore> {
        let sql = format!(
            r#"
            UPDATE live_scores
            SET home_team_score = ?, away_team_score = ?, period = ?, time_remaining = ?,
                last_updated = {NOW_SQL}
            WHERE game_id = ?
            "#
        );
        let updated = sqlx::query(&sql)
            .bind(score.home_team_score)
            .bind(score.away_team_score)
            .bind(&score.period)
            .bind(&score.time_remaining)
            .bind(score.game_id)
            .execute(self.pool)
            .await?
            .rows_affected();

        if updated == 0 {
            return self.insert(score).await;
        }

        debug!(
            game_id = score.game_id,
            home = ?score.home_team_score,
            away = ?score.away_team_score,
            "live score updated"
        );
        self.for_game(score.game_id)
            .await?
            .ok_or(DbError::NotFound {
                entity: "live_score",
                id: score.game_id,
            })
    }

    pub async fn get(&self, id: i64) -> DbResult<Option<LiveScore>> {
        let sql = format!("{} WHERE id = ?", LIVE_SCORES.select_sql());
        let score = sqlx::query_as::<_, LiveScore>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(score)
    }

    /// Current snapshot for a game
    pub async fn for_game(&self, game_id: i64) -> DbResult<Option<LiveScore>> {
        let sql = format!(
            "{} WHERE game_id = ? ORDER BY last_updated DESC, id DESC LIMIT 1",
            LIVE_SCORES.select_sql()
        );
        let score = sqlx::query_as::<_, LiveScore>(&sql)
            .bind(game_id)
            .fetch_optional(self.pool)
            .await?;
        Ok(score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;
    use model::validate;
    use serde_json::json;

    #[tokio::test]
    async fn test_record_overwrites_instead_of_appending() {
        let db = Database::in_memory().await.unwrap();
        let repo = LiveScoreRepository::new(db.pool());

        let first: InsertLiveScore = validate(&json!({ "gameId": 4 })).unwrap();
        let created = repo.record(&first).await.unwrap();
        assert_eq!(created.home_team_score, Some(0));
        assert_eq!(created.away_team_score, Some(0));

        let second: InsertLiveScore = validate(&json!({
            "gameId": 4, "homeTeamScore": 21, "awayTeamScore": 17,
            "period": "Q2", "timeRemaining": "03:10"
        }))
        .unwrap();
        let updated = repo.record(&second).await.unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.home_team_score, Some(21));
        assert_eq!(updated.period.as_deref(), Some("Q2"));

        let (rows,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM live_scores WHERE game_id = 4")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(rows, 1);
    }

    #[tokio::test]
    async fn test_for_game_missing() {
        let db = Database::in_memory().await.unwrap();
        let repo = LiveScoreRepository::new(db.pool());
        assert!(repo.for_game(1).await.unwrap().is_none());
    }
}
