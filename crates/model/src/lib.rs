//! Data model for the sports prediction service
//!
//! Provides:
//! - Selected-row types for the seven persisted tables
//! - Insert-validators narrowing untyped payloads to insertable records
//! - Composite read-model shapes (game details, team with stats, head-to-head)
//! - Reporting checks for domain invariants storage does not enforce

pub mod composite;
pub mod insert;
pub mod invariants;
pub mod types;
pub mod validation;

pub use composite::{GameStatsDetails, GameWithDetails, HeadToHead, TeamWithStats};
pub use insert::{
    validate, Entity, InsertGame, InsertLiveScore, InsertPayload, InsertPlayerStats,
    InsertPrediction, InsertSchema, InsertSport, InsertTeam, InsertTeamStats,
};
pub use invariants::Violation;
pub use types::*;
pub use validation::{FieldIssue, IssueKind, ValidationError};
