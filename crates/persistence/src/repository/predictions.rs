//! Predictions repository

use crate::schema::PREDICTIONS;
use crate::{DbError, DbResult};
use model::{InsertPrediction, Prediction};
use sqlx::types::Json;
use sqlx::SqlitePool;
use tracing::debug;

/// Repository for generated game forecasts
///
/// A game may accumulate several predictions; readers take the newest.
pub struct PredictionRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> PredictionRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, prediction: &InsertPrediction) -> DbResult<Prediction> {
        let result = sqlx::query(
            r#"
            INSERT INTO predictions (
                game_id, predicted_winner_id, confidence, factors,
                team_form_factor, head_to_head_factor, injury_factor,
                home_advantage, weather_factor
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(prediction.game_id)
        .bind(prediction.predicted_winner_id)
        .bind(prediction.confidence)
        .bind(prediction.factors.as_ref().map(Json))
        .bind(prediction.team_form_factor)
        .bind(prediction.head_to_head_factor)
        .bind(prediction.injury_factor)
        .bind(prediction.home_advantage)
        .bind(prediction.weather_factor)
        .execute(self.pool)
        .await?;

        let id = result.last_insert_rowid();
        debug!(
            id,
            game_id = prediction.game_id,
            winner = prediction.predicted_winner_id,
            confidence = prediction.confidence,
            "prediction inserted"
        );
        self.get(id).await?.ok_or(DbError::NotFound {
            entity: "prediction",
            id,
        })
    }

    pub async fn get(&self, id: i64) -> DbResult<Option<Prediction>> {
        let sql = format!("{} WHERE id = ?", PREDICTIONS.select_sql());
        let prediction = sqlx::query_as::<_, Prediction>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(prediction)
    }

    /// Newest prediction for a game (ties broken by insertion order)
    pub async fn latest_for_game(&self, game_id: i64) -> DbResult<Option<Prediction>> {
        let sql = format!(
            "{} WHERE game_id = ? ORDER BY created_at DESC, id DESC LIMIT 1",
            PREDICTIONS.select_sql()
        );
        let prediction = sqlx::query_as::<_, Prediction>(&sql)
            .bind(game_id)
            .fetch_optional(self.pool)
            .await?;
        Ok(prediction)
    }

    /// Prediction history for a game, newest first
    pub async fn list_for_game(&self, game_id: i64) -> DbResult<Vec<Prediction>> {
        let sql = format!(
            "{} WHERE game_id = ? ORDER BY created_at DESC, id DESC",
            PREDICTIONS.select_sql()
        );
        let predictions = sqlx::query_as::<_, Prediction>(&sql)
            .bind(game_id)
            .fetch_all(self.pool)
            .await?;
        Ok(predictions)
    }

    pub async fn list_all(&self) -> DbResult<Vec<Prediction>> {
        let sql = format!("{} ORDER BY id", PREDICTIONS.select_sql());
        let predictions = sqlx::query_as::<_, Prediction>(&sql)
            .fetch_all(self.pool)
            .await?;
        Ok(predictions)
    }
}
