//! Sports and teams repositories

use crate::schema::{SPORTS, TEAMS};
use crate::{DbError, DbResult};
use model::{InsertSport, InsertTeam, Sport, Team};
use sqlx::SqlitePool;
use tracing::debug;

/// Repository for sport categories
pub struct SportRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> SportRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, sport: &InsertSport) -> DbResult<Sport> {
        let result = sqlx::query(
            "INSERT INTO sports (name, short_name, color, is_active) VALUES (?, ?, ?, ?)",
        )
        .bind(&sport.name)
        .bind(&sport.short_name)
        .bind(&sport.color)
        .bind(sport.is_active)
        .execute(self.pool)
        .await?;

        let id = result.last_insert_rowid();
        debug!(id, name = %sport.name, "sport inserted");
        self.get(id)
            .await?
            .ok_or(DbError::NotFound { entity: "sport", id })
    }

    pub async fn get(&self, id: i64) -> DbResult<Option<Sport>> {
        let sql = format!("{} WHERE id = ?", SPORTS.select_sql());
        let sport = sqlx::query_as::<_, Sport>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(sport)
    }

    /// All sports by name; NULL `is_active` counts as active
    pub async fn list(&self, active_only: bool) -> DbResult<Vec<Sport>> {
        let filter = if active_only {
            " WHERE COALESCE(is_active, 1) = 1"
        } else {
            ""
        };
        let sql = format!("{}{filter} ORDER BY name", SPORTS.select_sql());
        let sports = sqlx::query_as::<_, Sport>(&sql)
            .fetch_all(self.pool)
            .await?;
        Ok(sports)
    }
}

/// Repository for teams
pub struct TeamRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> TeamRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, team: &InsertTeam) -> DbResult<Team> {
        let result = sqlx::query(
            r#"
            INSERT INTO teams (name, short_name, sport_id, logo, ranking, country, is_active)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&team.name)
        .bind(&team.short_name)
        .bind(team.sport_id)
        .bind(&team.logo)
        .bind(team.ranking)
        .bind(&team.country)
        .bind(team.is_active)
        .execute(self.pool)
        .await?;

        let id = result.last_insert_rowid();
        debug!(id, sport_id = team.sport_id, name = %team.name, "team inserted");
        self.get(id)
            .await?
            .ok_or(DbError::NotFound { entity: "team", id })
    }

    pub async fn get(&self, id: i64) -> DbResult<Option<Team>> {
        let sql = format!("{} WHERE id = ?", TEAMS.select_sql());
        let team = sqlx::query_as::<_, Team>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(team)
    }

    /// Teams of a sport, best ranked first, unranked last
    pub async fn list_by_sport(&self, sport_id: i64) -> DbResult<Vec<Team>> {
        let sql = format!(
            "{} WHERE sport_id = ? ORDER BY ranking IS NULL, ranking, name",
            TEAMS.select_sql()
        );
        let teams = sqlx::query_as::<_, Team>(&sql)
            .bind(sport_id)
            .fetch_all(self.pool)
            .await?;
        Ok(teams)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::fixtures;
    use crate::Database;
    use model::validate;
    use serde_json::json;

    #[tokio::test]
    async fn test_sport_defaults_to_active() {
        let db = Database::in_memory().await.unwrap();
        let repo = SportRepository::new(db.pool());

        let insert: InsertSport =
            validate(&json!({ "name": "Basketball", "shortName": "NBA", "color": "orange" }))
                .unwrap();
        let sport = repo.insert(&insert).await.unwrap();

        assert_eq!(sport.name, "Basketball");
        assert_eq!(sport.is_active, Some(true));
        assert_eq!(repo.get(sport.id).await.unwrap(), Some(sport));
    }

    #[tokio::test]
    async fn test_explicit_null_is_stored_as_null() {
        let db = Database::in_memory().await.unwrap();
        let repo = SportRepository::new(db.pool());

        let insert: InsertSport = validate(&json!({
            "name": "Rugby", "shortName": "RU", "color": "black", "isActive": null
        }))
        .unwrap();
        let sport = repo.insert(&insert).await.unwrap();
        assert_eq!(sport.is_active, None);

        // NULL reads as active in listings
        let active = repo.list(true).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].is_active, None);
    }

    #[tokio::test]
    async fn test_storage_default_applies_when_column_omitted() {
        let db = Database::in_memory().await.unwrap();
        sqlx::query("INSERT INTO sports (name, short_name, color) VALUES ('Tennis', 'ATP', 'green')")
            .execute(db.pool())
            .await
            .unwrap();

        let sports = SportRepository::new(db.pool()).list(true).await.unwrap();
        assert_eq!(sports.len(), 1);
        assert_eq!(sports[0].is_active, Some(true));
    }

    #[tokio::test]
    async fn test_list_active_only() {
        let db = Database::in_memory().await.unwrap();
        let repo = SportRepository::new(db.pool());
        fixtures::sport(db.pool(), "Basketball").await;
        let mut retired = fixtures::insert_sport("Cricket");
        retired.is_active = Some(false);
        repo.insert(&retired).await.unwrap();

        assert_eq!(repo.list(false).await.unwrap().len(), 2);
        let active = repo.list(true).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].name, "Basketball");
    }

    #[tokio::test]
    async fn test_teams_by_sport_ranked_first() {
        let db = Database::in_memory().await.unwrap();
        let sport = fixtures::sport(db.pool(), "Basketball").await;
        let other = fixtures::sport(db.pool(), "Hockey").await;
        let repo = TeamRepository::new(db.pool());

        let mut unranked = fixtures::insert_team(sport.id, "Aces");
        unranked.ranking = None;
        repo.insert(&unranked).await.unwrap();
        let mut second = fixtures::insert_team(sport.id, "Bulls");
        second.ranking = Some(2);
        repo.insert(&second).await.unwrap();
        let mut first = fixtures::insert_team(sport.id, "Celtics");
        first.ranking = Some(1);
        repo.insert(&first).await.unwrap();
        fixtures::team(db.pool(), other.id, "Bruins").await;

        let names: Vec<String> = repo
            .list_by_sport(sport.id)
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(names, vec!["Celtics", "Bulls", "Aces"]);
    }
}
