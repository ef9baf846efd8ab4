//! Games repository

use crate::schema::GAMES;
use crate::{DbError, DbResult};
use model::{Game, GameStatus, InsertGame};
use sqlx::types::Json;
use sqlx::SqlitePool;
use tracing::debug;

/// Repository for scheduled, live and finished games
pub struct GameRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> GameRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a game; `created_at`/`updated_at` come from column defaults
    pub async fn insert(&self, game: &InsertGame) -> DbResult<Game> {
        let result = sqlx::query(
            r#"
            INSERT INTO games (
                sport_id, home_team_id, away_team_id, game_time,
                venue, weather, temperature, status,
                home_score, away_score, current_period, game_data
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(game.sport_id)
        .bind(game.home_team_id)
        .bind(game.away_team_id)
        .bind(game.game_time)
        .bind(&game.venue)
        .bind(&game.weather)
        .bind(&game.temperature)
        .bind(game.status)
        .bind(game.home_score)
        .bind(game.away_score)
        .bind(&game.current_period)
        .bind(game.game_data.as_ref().map(Json))
        .execute(self.pool)
        .await?;

        let id = result.last_insert_rowid();
        debug!(
            id,
            home = game.home_team_id,
            away = game.away_team_id,
            status = ?game.status,
            "game inserted"
        );
        self.get(id)
            .await?
            .ok_or(DbError::NotFound { entity: "game", id })
    }

    pub async fn get(&self, id: i64) -> DbResult<Option<Game>> {
        let sql = format!("{} WHERE id = ?", GAMES.select_sql());
        let game = sqlx::query_as::<_, Game>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(game)
    }

    /// Games filtered by sport and/or status, soonest first
    pub async fn list(
        &self,
        sport_id: Option<i64>,
        status: Option<GameStatus>,
        limit: i64,
    ) -> DbResult<Vec<Game>> {
        let mut sql = format!("{} WHERE 1=1", GAMES.select_sql());
        if sport_id.is_some() {
            sql.push_str(" AND sport_id = ?");
        }
        if status.is_some() {
            // NULL status reads as the 'scheduled' default
            sql.push_str(" AND COALESCE(status, 'scheduled') = ?");
        }
        sql.push_str(" ORDER BY game_time, id LIMIT ?");

        let mut query = sqlx::query_as::<_, Game>(&sql);
        if let Some(sport_id) = sport_id {
            query = query.bind(sport_id);
        }
        if let Some(status) = status {
            query = query.bind(status);
        }
        let games = query.bind(limit).fetch_all(self.pool).await?;
        Ok(games)
    }

    /// Every game between two teams, in either home/away orientation
    pub async fn between_teams(&self, team_a: i64, team_b: i64) -> DbResult<Vec<Game>> {
        let sql = format!(
            r#"{}
            WHERE (home_team_id = ?1 AND away_team_id = ?2)
               OR (home_team_id = ?2 AND away_team_id = ?1)
            ORDER BY game_time DESC, id DESC"#,
            GAMES.select_sql()
        );
        let games = sqlx::query_as::<_, Game>(&sql)
            .bind(team_a)
            .bind(team_b)
            .fetch_all(self.pool)
            .await?;
        Ok(games)
    }

    /// Most recent games a team played in, home or away
    pub async fn recent_for_team(&self, team_id: i64, limit: i64) -> DbResult<Vec<Game>> {
        let sql = format!(
            "{} WHERE home_team_id = ?1 OR away_team_id = ?1 ORDER BY game_time DESC, id DESC LIMIT ?2",
            GAMES.select_sql()
        );
        let games = sqlx::query_as::<_, Game>(&sql)
            .bind(team_id)
            .bind(limit)
            .fetch_all(self.pool)
            .await?;
        Ok(games)
    }
}
