//! Joined read models for API responses

use crate::repository::{
    GameRepository, LiveScoreRepository, PlayerStatsRepository, PredictionRepository,
    SportRepository, TeamRepository, TeamStatsRepository,
};
use crate::{DbError, DbResult};
use model::{GameStatsDetails, GameWithDetails, HeadToHead, Sport, Team, TeamStats, TeamWithStats};
use sqlx::SqlitePool;
use tracing::debug;

/// Assembles composite shapes from the base repositories
///
/// A referenced sport, team or team stats row that does not exist yields
/// [`DbError::NotFound`]; prediction and live score are optional.
pub struct ReadModels<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ReadModels<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn game_with_details(&self, game_id: i64) -> DbResult<GameWithDetails> {
        let game = GameRepository::new(self.pool)
            .get(game_id)
            .await?
            .ok_or(DbError::NotFound {
                entity: "game",
                id: game_id,
            })?;

        let sport = self.sport(game.sport_id).await?;
        let home_team = self.team(game.home_team_id).await?;
        let away_team = self.team(game.away_team_id).await?;
        let prediction = PredictionRepository::new(self.pool)
            .latest_for_game(game.id)
            .await?;
        let live_score = LiveScoreRepository::new(self.pool)
            .for_game(game.id)
            .await?;

        Ok(GameWithDetails {
            game,
            sport,
            home_team,
            away_team,
            prediction,
            live_score,
        })
    }

    pub async fn team_with_stats(&self, team_id: i64) -> DbResult<TeamWithStats> {
        let team = self.team(team_id).await?;
        let sport = self.sport(team.sport_id).await?;
        let stats = self.stats(team.id).await?;
        Ok(TeamWithStats { team, stats, sport })
    }

    pub async fn game_stats_details(&self, game_id: i64) -> DbResult<GameStatsDetails> {
        let game = self.game_with_details(game_id).await?;
        let home_id = game.home_team.id;
        let away_id = game.away_team.id;

        let home_team_stats = self.stats(home_id).await?;
        let away_team_stats = self.stats(away_id).await?;

        let players = PlayerStatsRepository::new(self.pool);
        let home_players = players.list_for_team(home_id).await?;
        let away_players = players.list_for_team(away_id).await?;

        let meetings = GameRepository::new(self.pool)
            .between_teams(home_id, away_id)
            .await?;
        let head_to_head = HeadToHead::from_games(home_id, away_id, Some(game_id), &meetings);
        debug!(
            game_id,
            meetings = head_to_head.total_games,
            "head-to-head computed"
        );

        Ok(GameStatsDetails {
            game,
            home_team_stats,
            away_team_stats,
            home_players,
            away_players,
            head_to_head,
        })
    }

    async fn sport(&self, id: i64) -> DbResult<Sport> {
        SportRepository::new(self.pool)
            .get(id)
            .await?
            .ok_or(DbError::NotFound { entity: "sport", id })
    }

    async fn team(&self, id: i64) -> DbResult<Team> {
        TeamRepository::new(self.pool)
            .get(id)
            .await?
            .ok_or(DbError::NotFound { entity: "team", id })
    }

    /// Keyed by team id
    async fn stats(&self, team_id: i64) -> DbResult<TeamStats> {
        TeamStatsRepository::new(self.pool)
            .latest_for_team(team_id)
            .await?
            .ok_or(DbError::NotFound {
                entity: "team_stats for team",
                id: team_id,
            })
    }
}
