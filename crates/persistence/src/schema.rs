//! Database schema definitions
//!
//! Tables are declared as column metadata and rendered to SQLite DDL.
//! Id fields that point at other tables are recorded in [`REFERENCES`]
//! and indexed, but no FOREIGN KEY, CHECK or UNIQUE constraint is declared:
//! referential integrity and value ranges are left to application code.

use model::Entity;

/// SQL expression producing the current time as an RFC 3339 UTC string
pub const NOW_SQL: &str = "strftime('%Y-%m-%dT%H:%M:%fZ', 'now')";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    /// Auto-incrementing primary key
    Serial,
    Integer,
    Text,
    Boolean,
    Real,
    Timestamp,
    /// Free-form structured value, stored as JSON text
    Json,
}

impl ColumnType {
    pub fn sql_type(&self) -> &'static str {
        match self {
            ColumnType::Serial => "INTEGER PRIMARY KEY AUTOINCREMENT",
            ColumnType::Integer | ColumnType::Boolean => "INTEGER",
            ColumnType::Real => "REAL",
            ColumnType::Text | ColumnType::Timestamp | ColumnType::Json => "TEXT",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColumnDefault {
    Bool(bool),
    Int(i64),
    Real(f64),
    Text(&'static str),
    /// Row creation time
    Now,
}

impl ColumnDefault {
    pub fn sql(&self) -> String {
        match self {
            ColumnDefault::Bool(b) => (if *b { "1" } else { "0" }).to_string(),
            ColumnDefault::Int(n) => n.to_string(),
            ColumnDefault::Real(r) => format!("{r:?}"),
            ColumnDefault::Text(s) => format!("'{}'", s.replace('\'', "''")),
            ColumnDefault::Now => format!("({NOW_SQL})"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnDef {
    /// Storage column name
    pub name: &'static str,
    /// API field name
    pub field: &'static str,
    pub ty: ColumnType,
    pub not_null: bool,
    pub default: Option<ColumnDefault>,
}

const fn col(name: &'static str, field: &'static str, ty: ColumnType) -> ColumnDef {
    ColumnDef {
        name,
        field,
        ty,
        not_null: false,
        default: None,
    }
}

impl ColumnDef {
    const fn not_null(self) -> Self {
        ColumnDef {
            not_null: true,
            ..self
        }
    }

    const fn default(self, default: ColumnDefault) -> Self {
        ColumnDef {
            default: Some(default),
            ..self
        }
    }

    /// Assigned by storage: the serial id and creation/update timestamps
    pub fn is_server_managed(&self) -> bool {
        matches!(self.ty, ColumnType::Serial)
            || (self.ty == ColumnType::Timestamp && self.default == Some(ColumnDefault::Now))
    }

    /// Must be supplied on insert
    pub fn is_required(&self) -> bool {
        self.not_null && self.default.is_none() && !self.is_server_managed()
    }

    fn ddl(&self) -> String {
        let mut ddl = format!("{} {}", self.name, self.ty.sql_type());
        if self.not_null {
            ddl.push_str(" NOT NULL");
        }
        if let Some(default) = &self.default {
            ddl.push_str(" DEFAULT ");
            ddl.push_str(&default.sql());
        }
        ddl
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TableDef {
    pub name: &'static str,
    pub columns: &'static [ColumnDef],
}

impl TableDef {
    pub fn create_sql(&self) -> String {
        let columns: Vec<String> = self
            .columns
            .iter()
            .map(|c| format!("    {}", c.ddl()))
            .collect();
        format!(
            "CREATE TABLE IF NOT EXISTS {} (\n{}\n)",
            self.name,
            columns.join(",\n")
        )
    }

    /// `SELECT <all columns> FROM <table>`, ready for a WHERE clause
    pub fn select_sql(&self) -> String {
        let names: Vec<&str> = self.columns.iter().map(|c| c.name).collect();
        format!("SELECT {} FROM {}", names.join(", "), self.name)
    }

    pub fn column(&self, field: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.field == field)
    }

    /// API field names accepted on insert
    pub fn insertable_fields(&self) -> Vec<&'static str> {
        self.columns
            .iter()
            .filter(|c| !c.is_server_managed())
            .map(|c| c.field)
            .collect()
    }

    pub fn server_managed_fields(&self) -> Vec<&'static str> {
        self.columns
            .iter()
            .filter(|c| c.is_server_managed())
            .map(|c| c.field)
            .collect()
    }
}

use ColumnDefault::{Bool, Int, Now, Real as RealDefault, Text as TextDefault};
use ColumnType::{Boolean, Integer, Json, Real, Serial, Text, Timestamp};

pub const SPORTS: TableDef = TableDef {
    name: "sports",
    columns: &[
        col("id", "id", Serial),
        col("name", "name", Text).not_null(),
        col("short_name", "shortName", Text).not_null(),
        col("color", "color", Text).not_null(),
        col("is_active", "isActive", Boolean).default(Bool(true)),
    ],
};

pub const TEAMS: TableDef = TableDef {
    name: "teams",
    columns: &[
        col("id", "id", Serial),
        col("name", "name", Text).not_null(),
        col("short_name", "shortName", Text).not_null(),
        col("sport_id", "sportId", Integer).not_null(),
        col("logo", "logo", Text),
        col("ranking", "ranking", Integer),
        col("country", "country", Text),
        col("is_active", "isActive", Boolean).default(Bool(true)),
    ],
};

pub const GAMES: TableDef = TableDef {
    name: "games",
    columns: &[
        col("id", "id", Serial),
        col("sport_id", "sportId", Integer).not_null(),
        col("home_team_id", "homeTeamId", Integer).not_null(),
        col("away_team_id", "awayTeamId", Integer).not_null(),
        col("game_time", "gameTime", Timestamp).not_null(),
        col("venue", "venue", Text),
        col("weather", "weather", Text),
        col("temperature", "temperature", Text),
        // scheduled, live, completed, cancelled
        col("status", "status", Text).default(TextDefault("scheduled")),
        col("home_score", "homeScore", Integer),
        col("away_score", "awayScore", Integer),
        col("current_period", "currentPeriod", Text),
        col("game_data", "gameData", Json),
        col("created_at", "createdAt", Timestamp).default(Now),
        col("updated_at", "updatedAt", Timestamp).default(Now),
    ],
};

pub const PREDICTIONS: TableDef = TableDef {
    name: "predictions",
    columns: &[
        col("id", "id", Serial),
        col("game_id", "gameId", Integer).not_null(),
        col("predicted_winner_id", "predictedWinnerId", Integer).not_null(),
        col("confidence", "confidence", Real).not_null(),
        col("factors", "factors", Json),
        col("team_form_factor", "teamFormFactor", Real),
        col("head_to_head_factor", "headToHeadFactor", Real),
        col("injury_factor", "injuryFactor", Real),
        col("home_advantage", "homeAdvantage", Real),
        col("weather_factor", "weatherFactor", Real),
        col("created_at", "createdAt", Timestamp).default(Now),
        col("updated_at", "updatedAt", Timestamp).default(Now),
    ],
};

pub const TEAM_STATS: TableDef = TableDef {
    name: "team_stats",
    columns: &[
        col("id", "id", Serial),
        col("team_id", "teamId", Integer).not_null(),
        col("sport_id", "sportId", Integer).not_null(),
        col("games_played", "gamesPlayed", Integer).default(Int(0)),
        col("wins", "wins", Integer).default(Int(0)),
        col("losses", "losses", Integer).default(Int(0)),
        col("draws", "draws", Integer).default(Int(0)),
        col("win_percentage", "winPercentage", Real).default(RealDefault(0.0)),
        col("average_score", "averageScore", Real).default(RealDefault(0.0)),
        // e.g. "WWLWD"
        col("recent_form", "recentForm", Text),
        col("home_win_rate", "homeWinRate", Real).default(RealDefault(0.0)),
        col("away_win_rate", "awayWinRate", Real).default(RealDefault(0.0)),
        col("last_updated", "lastUpdated", Timestamp).default(Now),
    ],
};

pub const PLAYER_STATS: TableDef = TableDef {
    name: "player_stats",
    columns: &[
        col("id", "id", Serial),
        col("name", "name", Text).not_null(),
        col("team_id", "teamId", Integer).not_null(),
        col("sport_id", "sportId", Integer).not_null(),
        col("position", "position", Text),
        col("is_injured", "isInjured", Boolean).default(Bool(false)),
        col("injury_details", "injuryDetails", Text),
        col("performance_rating", "performanceRating", Real),
        col("stats_data", "statsData", Json),
        col("last_updated", "lastUpdated", Timestamp).default(Now),
    ],
};

pub const LIVE_SCORES: TableDef = TableDef {
    name: "live_scores",
    columns: &[
        col("id", "id", Serial),
        col("game_id", "gameId", Integer).not_null(),
        col("home_team_score", "homeTeamScore", Integer).default(Int(0)),
        col("away_team_score", "awayTeamScore", Integer).default(Int(0)),
        col("period", "period", Text),
        col("time_remaining", "timeRemaining", Text),
        col("last_updated", "lastUpdated", Timestamp).default(Now),
    ],
};

pub const TABLES: [&TableDef; 7] = [
    &SPORTS,
    &TEAMS,
    &GAMES,
    &PREDICTIONS,
    &TEAM_STATS,
    &PLAYER_STATS,
    &LIVE_SCORES,
];

pub fn table_for(entity: Entity) -> &'static TableDef {
    match entity {
        Entity::Sport => &SPORTS,
        Entity::Team => &TEAMS,
        Entity::Game => &GAMES,
        Entity::Prediction => &PREDICTIONS,
        Entity::TeamStats => &TEAM_STATS,
        Entity::PlayerStats => &PLAYER_STATS,
        Entity::LiveScore => &LIVE_SCORES,
    }
}

/// An id column pointing at another table's `id`; indexed, never enforced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reference {
    pub table: &'static str,
    pub column: &'static str,
    pub target: &'static str,
}

const fn refers(table: &'static str, column: &'static str, target: &'static str) -> Reference {
    Reference {
        table,
        column,
        target,
    }
}

pub const REFERENCES: &[Reference] = &[
    refers("teams", "sport_id", "sports"),
    refers("games", "sport_id", "sports"),
    refers("games", "home_team_id", "teams"),
    refers("games", "away_team_id", "teams"),
    refers("predictions", "game_id", "games"),
    refers("predictions", "predicted_winner_id", "teams"),
    refers("team_stats", "team_id", "teams"),
    refers("team_stats", "sport_id", "sports"),
    refers("player_stats", "team_id", "teams"),
    refers("player_stats", "sport_id", "sports"),
    refers("live_scores", "game_id", "games"),
];

impl Reference {
    pub fn index_sql(&self) -> String {
        format!(
            "CREATE INDEX IF NOT EXISTS idx_{table}_{column} ON {table}({column})",
            table = self.table,
            column = self.column
        )
    }
}

/// Extra lookup indexes beyond the reference columns
pub const INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_games_status ON games(status)",
    "CREATE INDEX IF NOT EXISTS idx_games_time ON games(game_time)",
];

/// Every statement needed to create the schema, in execution order
pub fn schema_statements() -> Vec<String> {
    let mut statements: Vec<String> = TABLES.iter().map(|t| t.create_sql()).collect();
    statements.extend(REFERENCES.iter().map(Reference::index_sql));
    statements.extend(INDEXES.iter().map(|s| s.to_string()));
    statements
}

/// Full DDL script
pub fn create_schema_sql() -> String {
    let mut sql = schema_statements().join(";\n\n");
    sql.push_str(";\n");
    sql
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insertable_fields_match_validators() {
        for entity in Entity::ALL {
            let table = table_for(entity);
            assert_eq!(table.name, entity.table());

            let mut insertable = table.insertable_fields();
            insertable.sort_unstable();
            assert_eq!(insertable, entity.insertable_fields(), "{entity}");

            let mut required: Vec<&str> = table
                .columns
                .iter()
                .filter(|c| c.is_required())
                .map(|c| c.field)
                .collect();
            required.sort_unstable();
            assert_eq!(required, entity.required_fields(), "{entity}");

            let accepted = entity.insertable_fields();
            for field in table.server_managed_fields() {
                assert!(!accepted.iter().any(|f| f == field), "{entity}: {field}");
            }
        }
    }

    #[test]
    fn test_every_table_has_serial_id() {
        for table in TABLES {
            let id = table.column("id").unwrap();
            assert_eq!(id.ty, ColumnType::Serial);
            assert!(id.is_server_managed());
        }
    }

    #[test]
    fn test_game_ddl_defaults() {
        let sql = GAMES.create_sql();
        assert!(sql.starts_with("CREATE TABLE IF NOT EXISTS games ("));
        assert!(sql.contains("id INTEGER PRIMARY KEY AUTOINCREMENT"));
        assert!(sql.contains("game_time TEXT NOT NULL"));
        assert!(sql.contains("status TEXT DEFAULT 'scheduled'"));
        assert!(sql.contains("game_data TEXT,"));
        assert!(sql.contains(&format!("created_at TEXT DEFAULT ({NOW_SQL})")));
    }

    #[test]
    fn test_aggregate_defaults_are_zero() {
        let sql = TEAM_STATS.create_sql();
        assert!(sql.contains("wins INTEGER DEFAULT 0"));
        assert!(sql.contains("win_percentage REAL DEFAULT 0.0"));
        assert!(SPORTS.create_sql().contains("is_active INTEGER DEFAULT 1"));
        assert!(PLAYER_STATS.create_sql().contains("is_injured INTEGER DEFAULT 0"));
    }

    #[test]
    fn test_no_constraints_declared() {
        let sql = create_schema_sql();
        assert!(!sql.contains("FOREIGN KEY"));
        assert!(!sql.contains("REFERENCES"));
        assert!(!sql.contains("CHECK"));
        assert!(!sql.contains("UNIQUE"));
    }

    #[test]
    fn test_required_columns() {
        let required: Vec<&str> = GAMES
            .columns
            .iter()
            .filter(|c| c.is_required())
            .map(|c| c.field)
            .collect();
        assert_eq!(required, vec!["sportId", "homeTeamId", "awayTeamId", "gameTime"]);
    }

    #[test]
    fn test_references_point_at_declared_tables() {
        for reference in REFERENCES {
            let table = TABLES.iter().find(|t| t.name == reference.table).unwrap();
            assert!(table.columns.iter().any(|c| c.name == reference.column));
            assert!(TABLES.iter().any(|t| t.name == reference.target));
        }
    }
}
