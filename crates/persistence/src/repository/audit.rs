//! Audit of domain invariants the schema does not enforce
//!
//! Reports id fields pointing at missing rows and rows breaking the
//! model's value invariants. Nothing is rejected or repaired.

use super::{GameRepository, PredictionRepository, TeamStatsRepository};
use crate::schema::{Reference, REFERENCES};
use crate::DbResult;
use model::invariants::{check_game, check_prediction, check_team_stats};
use model::Violation;
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::warn;

/// A row whose id column points at nothing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DanglingReference {
    pub table: &'static str,
    pub row_id: i64,
    pub column: &'static str,
    pub target: &'static str,
    pub missing_id: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AuditReport {
    pub dangling_references: Vec<DanglingReference>,
    pub violations: Vec<Violation>,
}

impl AuditReport {
    pub fn is_clean(&self) -> bool {
        self.dangling_references.is_empty() && self.violations.is_empty()
    }
}

pub struct AuditRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> AuditRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn dangling_references(&self) -> DbResult<Vec<DanglingReference>> {
        let mut dangling = Vec::new();
        for reference in REFERENCES {
            dangling.extend(self.dangling_for(reference).await?);
        }
        Ok(dangling)
    }

    async fn dangling_for(&self, reference: &Reference) -> DbResult<Vec<DanglingReference>> {
        let sql = format!(
            r#"
            SELECT r.id, r.{column}
            FROM {table} r
            LEFT JOIN {target} t ON t.id = r.{column}
            WHERE t.id IS NULL
            ORDER BY r.id
            "#,
            table = reference.table,
            column = reference.column,
            target = reference.target,
        );
        let rows: Vec<(i64, i64)> = sqlx::query_as(&sql).fetch_all(self.pool).await?;

        Ok(rows
            .into_iter()
            .map(|(row_id, missing_id)| DanglingReference {
                table: reference.table,
                row_id,
                column: reference.column,
                target: reference.target,
                missing_id,
            })
            .collect())
    }

    pub async fn violations(&self) -> DbResult<Vec<Violation>> {
        let mut violations = Vec::new();

        let games = GameRepository::new(self.pool).list(None, None, i64::MAX).await?;
        violations.extend(games.iter().flat_map(check_game));

        let predictions = PredictionRepository::new(self.pool).list_all().await?;
        violations.extend(predictions.iter().flat_map(check_prediction));

        let stats = TeamStatsRepository::new(self.pool).list_all().await?;
        violations.extend(stats.iter().flat_map(check_team_stats));

        Ok(violations)
    }

    pub async fn run(&self) -> DbResult<AuditReport> {
        let report = AuditReport {
            dangling_references: self.dangling_references().await?,
            violations: self.violations().await?,
        };

        for d in &report.dangling_references {
            warn!(
                "{}.{} = {} (row {}) has no matching {} row",
                d.table, d.column, d.missing_id, d.row_id, d.target
            );
        }
        for v in &report.violations {
            warn!("{}", v);
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::fixtures;
    use crate::Database;

    #[tokio::test]
    async fn test_clean_database() {
        let db = Database::in_memory().await.unwrap();
        let sport = fixtures::sport(db.pool(), "Basketball").await;
        let home = fixtures::team(db.pool(), sport.id, "Celtics").await;
        let away = fixtures::team(db.pool(), sport.id, "Lakers").await;
        fixtures::game(db.pool(), sport.id, home.id, away.id).await;

        let report = AuditRepository::new(db.pool()).run().await.unwrap();
        assert!(report.is_clean(), "{report:?}");
    }

    #[tokio::test]
    async fn test_reports_dangling_and_invalid_rows() {
        let db = Database::in_memory().await.unwrap();
        let sport = fixtures::sport(db.pool(), "Basketball").await;
        let home = fixtures::team(db.pool(), sport.id, "Celtics").await;
        // away team 999 does not exist
        let game = fixtures::game(db.pool(), sport.id, home.id, 999).await;
        fixtures::prediction(db.pool(), game.id, home.id, 150.0).await;

        let report = AuditRepository::new(db.pool()).run().await.unwrap();
        assert_eq!(
            report.dangling_references,
            vec![DanglingReference {
                table: "games",
                row_id: game.id,
                column: "away_team_id",
                target: "teams",
                missing_id: 999,
            }]
        );
        assert_eq!(
            report.violations,
            vec![Violation::ConfidenceOutOfRange {
                prediction_id: 1,
                confidence: 150.0,
            }]
        );
    }
}
