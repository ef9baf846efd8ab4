//! Team and player statistics repositories

use crate::schema::{PLAYER_STATS, TEAM_STATS};
use crate::{DbError, DbResult};
use model::{InsertPlayerStats, InsertTeamStats, PlayerStats, TeamStats};
use sqlx::types::Json;
use sqlx::SqlitePool;
use tracing::debug;

/// Repository for rolling team aggregates
pub struct TeamStatsRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> TeamStatsRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, stats: &InsertTeamStats) -> DbResult<TeamStats> {
        let result = sqlx::query(
            r#"
            INSERT INTO team_stats (
                team_id, sport_id, games_played, wins, losses, draws,
                win_percentage, average_score, recent_form,
                home_win_rate, away_win_rate
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(stats.team_id)
        .bind(stats.sport_id)
        .bind(stats.games_played)
        .bind(stats.wins)
        .bind(stats.losses)
        .bind(stats.draws)
        .bind(stats.win_percentage)
        .bind(stats.average_score)
        .bind(&stats.recent_form)
        .bind(stats.home_win_rate)
        .bind(stats.away_win_rate)
        .execute(self.pool)
        .await?;

        let id = result.last_insert_rowid();
        debug!(id, team_id = stats.team_id, "team stats inserted");
        self.get(id).await?.ok_or(DbError::NotFound {
            entity: "team_stats",
            id,
        })
    }

    pub async fn get(&self, id: i64) -> DbResult<Option<TeamStats>> {
        let sql = format!("{} WHERE id = ?", TEAM_STATS.select_sql());
        let stats = sqlx::query_as::<_, TeamStats>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(stats)
    }

    /// Most recently recorded aggregate for a team
    pub async fn latest_for_team(&self, team_id: i64) -> DbResult<Option<TeamStats>> {
        let sql = format!(
            "{} WHERE team_id = ? ORDER BY last_updated DESC, id DESC LIMIT 1",
            TEAM_STATS.select_sql()
        );
        let stats = sqlx::query_as::<_, TeamStats>(&sql)
            .bind(team_id)
            .fetch_optional(self.pool)
            .await?;
        Ok(stats)
    }

    pub async fn list_all(&self) -> DbResult<Vec<TeamStats>> {
        let sql = format!("{} ORDER BY id", TEAM_STATS.select_sql());
        let stats = sqlx::query_as::<_, TeamStats>(&sql)
            .fetch_all(self.pool)
            .await?;
        Ok(stats)
    }
}

/// Repository for player status and performance
pub struct PlayerStatsRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> PlayerStatsRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, player: &InsertPlayerStats) -> DbResult<PlayerStats> {
        let result = sqlx::query(
            r#"
            INSERT INTO player_stats (
                name, team_id, sport_id, position, is_injured,
                injury_details, performance_rating, stats_data
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&player.name)
        .bind(player.team_id)
        .bind(player.sport_id)
        .bind(&player.position)
        .bind(player.is_injured)
        .bind(&player.injury_details)
        .bind(player.performance_rating)
        .bind(player.stats_data.as_ref().map(Json))
        .execute(self.pool)
        .await?;

        let id = result.last_insert_rowid();
        debug!(id, team_id = player.team_id, name = %player.name, "player stats inserted");
        self.get(id).await?.ok_or(DbError::NotFound {
            entity: "player_stats",
            id,
        })
    }

    pub async fn get(&self, id: i64) -> DbResult<Option<PlayerStats>> {
        let sql = format!("{} WHERE id = ?", PLAYER_STATS.select_sql());
        let player = sqlx::query_as::<_, PlayerStats>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(player)
    }

    /// Roster of a team, highest rated first
    pub async fn list_for_team(&self, team_id: i64) -> DbResult<Vec<PlayerStats>> {
        let sql = format!(
            "{} WHERE team_id = ? ORDER BY performance_rating IS NULL, performance_rating DESC, name",
            PLAYER_STATS.select_sql()
        );
        let players = sqlx::query_as::<_, PlayerStats>(&sql)
            .bind(team_id)
            .fetch_all(self.pool)
            .await?;
        Ok(players)
    }

    pub async fn injured_for_team(&self, team_id: i64) -> DbResult<Vec<PlayerStats>> {
        let sql = format!(
            "{} WHERE team_id = ? AND is_injured = 1 ORDER BY name",
            PLAYER_STATS.select_sql()
        );
        let players = sqlx::query_as::<_, PlayerStats>(&sql)
            .bind(team_id)
            .fetch_all(self.pool)
            .await?;
        Ok(players)
    }
}
