//! sports-predict — command line access to the sports prediction data store
//!
//! Usage:
//!   sports-predict init                              — Create the database schema
//!   sports-predict schema                            — Print the DDL
//!   sports-predict schema --entity game              — Print the game insert JSON Schema
//!   sports-predict validate --entity game game.json  — Check an insert payload
//!   sports-predict insert --entity team teams.json   — Validate and store payloads
//!   sports-predict game 12 --stats                   — Show a game with its details

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use model::{Entity, GameStatus};
use persistence::repository::{insert_payload, AuditRepository, GameRepository};
use persistence::{schema, Database, ReadModels};
use serde::Serialize;
use serde_json::Value;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{error, info};

const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
const DEFAULT_DB_PATH: &str = "data/sports.db";

#[derive(Parser)]
#[command(name = "sports-predict", version = APP_VERSION)]
#[command(about = "Sports prediction data store: schema, insert validation and read models", long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Database file (overrides SPORTS_DB_PATH)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database file and apply the schema
    Init,
    /// Print the schema DDL, or an entity's insert JSON Schema
    Schema {
        #[arg(short, long)]
        entity: Option<Entity>,
    },
    /// Validate insert payload(s) without storing them
    Validate {
        /// Entity kind: sport, team, game, prediction, team_stats, player_stats, live_score
        #[arg(short, long)]
        entity: Entity,
        /// JSON file holding one object or an array of objects ("-" for stdin)
        #[arg(default_value = "-")]
        file: String,
    },
    /// Validate and store insert payload(s)
    Insert {
        #[arg(short, long)]
        entity: Entity,
        #[arg(default_value = "-")]
        file: String,
    },
    /// Show a game with sport, teams, prediction and live score
    Game {
        id: i64,
        /// Include team stats, rosters and head-to-head
        #[arg(long)]
        stats: bool,
    },
    /// List games, soonest first
    Games {
        #[arg(long)]
        sport: Option<i64>,
        /// scheduled, live, completed or cancelled
        #[arg(long)]
        status: Option<GameStatus>,
        #[arg(long, default_value_t = 50)]
        limit: i64,
    },
    /// Show a team with its sport and latest stats
    Team { id: i64 },
    /// Report dangling references and broken invariants
    Audit,
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("debug,model=debug,persistence=debug,sports_predict=debug")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn"))
    };

    // stdout carries JSON output; logs go to stderr
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let db_path = cli.db.clone().unwrap_or_else(|| {
        std::env::var("SPORTS_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_DB_PATH))
    });

    match cli.command {
        Commands::Init => {
            open_db(&db_path).await?;
            println!("Schema ready: {}", db_path.display());
        }
        Commands::Schema { entity: None } => {
            print!("{}", schema::create_schema_sql());
        }
        Commands::Schema {
            entity: Some(entity),
        } => {
            print_json(&entity.insert_schema())?;
        }
        Commands::Validate { entity, file } => {
            cmd_validate(entity, &file)?;
        }
        Commands::Insert { entity, file } => {
            let db = open_db(&db_path).await?;
            cmd_insert(&db, entity, &file).await?;
        }
        Commands::Game { id, stats } => {
            let db = open_db(&db_path).await?;
            let read = ReadModels::new(db.pool());
            if stats {
                print_json(&read.game_stats_details(id).await?)?;
            } else {
                print_json(&read.game_with_details(id).await?)?;
            }
        }
        Commands::Games {
            sport,
            status,
            limit,
        } => {
            let db = open_db(&db_path).await?;
            let games = GameRepository::new(db.pool())
                .list(sport, status, limit)
                .await?;
            print_json(&games)?;
        }
        Commands::Team { id } => {
            let db = open_db(&db_path).await?;
            print_json(&ReadModels::new(db.pool()).team_with_stats(id).await?)?;
        }
        Commands::Audit => {
            let db = open_db(&db_path).await?;
            let report = AuditRepository::new(db.pool()).run().await?;
            if report.is_clean() {
                info!("Audit clean");
            }
            print_json(&report)?;
        }
    }

    Ok(())
}

async fn open_db(path: &Path) -> anyhow::Result<Database> {
    Database::new(path).await.map_err(|e| {
        error!("Failed to initialize database: {}", e);
        anyhow::anyhow!("Database initialization failed: {}", e)
    })
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// One object, or each element of a top-level array
fn read_payloads(file: &str) -> anyhow::Result<Vec<Value>> {
    let raw = if file == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("reading payload from stdin")?;
        buf
    } else {
        std::fs::read_to_string(file).with_context(|| format!("reading {file}"))?
    };

    let value: Value =
        serde_json::from_str(&raw).with_context(|| format!("{file} is not valid JSON"))?;
    Ok(match value {
        Value::Array(items) => items,
        other => vec![other],
    })
}

fn cmd_validate(entity: Entity, file: &str) -> anyhow::Result<()> {
    let payloads = read_payloads(file)?;
    let mut rejected = 0usize;

    for (i, payload) in payloads.iter().enumerate() {
        match entity.validate(payload) {
            Ok(accepted) => print_json(&accepted)?,
            Err(e) => {
                rejected += 1;
                error!("payload #{}: {}", i, e);
                print_json(&e)?;
            }
        }
    }

    if rejected > 0 {
        bail!("{rejected} of {} {entity} payload(s) rejected", payloads.len());
    }
    info!("{} {} payload(s) valid", payloads.len(), entity);
    Ok(())
}

/// Payloads are validated up front; nothing is stored if any is rejected
async fn cmd_insert(db: &Database, entity: Entity, file: &str) -> anyhow::Result<()> {
    let payloads = read_payloads(file)?;
    let total = payloads.len();

    let mut accepted = Vec::with_capacity(total);
    let mut invalid = Vec::new();
    for (i, payload) in payloads.iter().enumerate() {
        match entity.validate(payload) {
            Ok(insert) => accepted.push(insert),
            Err(e) => invalid.push(format!("#{i}: {e}")),
        }
    }
    if !invalid.is_empty() {
        for line in &invalid {
            error!("{}", line);
        }
        bail!("{} of {total} {entity} payload(s) rejected", invalid.len());
    }

    for insert in &accepted {
        let stored = insert_payload(db.pool(), insert).await?;
        print_json(&stored)?;
    }
    info!("Stored {} {} row(s)", total, entity);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_entity_and_status() {
        let cli = Cli::try_parse_from(["sports-predict", "validate", "-e", "team-stats", "s.json"])
            .unwrap();
        match cli.command {
            Commands::Validate { entity, file } => {
                assert_eq!(entity, Entity::TeamStats);
                assert_eq!(file, "s.json");
            }
            _ => panic!("expected validate"),
        }

        let cli = Cli::try_parse_from(["sports-predict", "games", "--status", "live"]).unwrap();
        match cli.command {
            Commands::Games { status, limit, .. } => {
                assert_eq!(status, Some(GameStatus::Live));
                assert_eq!(limit, 50);
            }
            _ => panic!("expected games"),
        }
    }

    #[test]
    fn test_schema_entity_is_optional() {
        let cli = Cli::try_parse_from(["sports-predict", "schema"]).unwrap();
        assert!(matches!(cli.command, Commands::Schema { entity: None }));

        let cli = Cli::try_parse_from(["sports-predict", "schema", "-e", "live_score"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Schema {
                entity: Some(Entity::LiveScore)
            }
        ));
    }

    #[test]
    fn test_cli_rejects_unknown_entity() {
        assert!(Cli::try_parse_from(["sports-predict", "insert", "-e", "venue"]).is_err());
    }

    fn write_payload(name: &str, body: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "sports-predict-{}-{}",
            std::process::id(),
            name.trim_end_matches(".json")
        ));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        std::fs::write(&path, body).unwrap();
        path
    }

    #[tokio::test]
    async fn test_insert_stores_nothing_when_any_payload_rejected() {
        let db = Database::in_memory().await.unwrap();
        let sports = persistence::repository::SportRepository::new(db.pool());

        let mixed = write_payload(
            "mixed.json",
            r#"[{"name":"A","shortName":"A","color":"red"},{"name":"B"}]"#,
        );
        assert!(cmd_insert(&db, Entity::Sport, mixed.to_str().unwrap())
            .await
            .is_err());
        assert!(sports.list(false).await.unwrap().is_empty());

        let valid = write_payload(
            "valid.json",
            r#"[{"name":"A","shortName":"A","color":"red"},{"name":"B","shortName":"B","color":"blue","isActive":null}]"#,
        );
        cmd_insert(&db, Entity::Sport, valid.to_str().unwrap())
            .await
            .unwrap();
        let stored = sports.list(false).await.unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored.iter().filter(|s| s.is_active.is_none()).count(), 1);
    }

    #[test]
    fn test_read_payloads_splits_arrays() {
        let dir = std::env::temp_dir().join(format!("sports-predict-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("sports.json");
        std::fs::write(
            &path,
            r#"[{"name":"A","shortName":"A","color":"red"},{"name":"B"}]"#,
        )
        .unwrap();

        let payloads = read_payloads(path.to_str().unwrap()).unwrap();
        assert_eq!(payloads.len(), 2);
        assert!(Entity::Sport.validate(&payloads[0]).is_ok());
        assert!(Entity::Sport.validate(&payloads[1]).is_err());

        std::fs::remove_dir_all(&dir).ok();
    }
}
