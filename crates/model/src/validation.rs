//! Schema validation of candidate insert payloads
//!
//! Payloads are checked against a JSON Schema generated from the insert
//! type, then deserialized into it. Every schema error is collected so a
//! rejected payload reports all offending fields at once. Keys the schema
//! does not declare are ignored, which is how server-managed and unknown
//! fields get stripped.

use jsonschema::error::ValidationErrorKind;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Why a single field was rejected
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IssueKind {
    Missing,
    InvalidType { reason: String },
    InvalidValue { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldIssue {
    /// API field name; empty for the payload itself
    pub path: String,
    #[serde(flatten)]
    pub kind: IssueKind,
}

impl FieldIssue {
    fn payload(kind: IssueKind) -> Self {
        Self {
            path: String::new(),
            kind,
        }
    }
}

impl From<jsonschema::ValidationError<'_>> for FieldIssue {
    fn from(error: jsonschema::ValidationError<'_>) -> Self {
        let pointer = error.instance_path.to_string();
        let path = pointer.trim_start_matches('/').to_string();

        match &error.kind {
            ValidationErrorKind::Required { property } => {
                let property = property
                    .as_str()
                    .map(str::to_string)
                    .unwrap_or_else(|| property.to_string());
                FieldIssue {
                    path: if path.is_empty() {
                        property
                    } else {
                        format!("{path}/{property}")
                    },
                    kind: IssueKind::Missing,
                }
            }
            ValidationErrorKind::Type { .. } => FieldIssue {
                path,
                kind: IssueKind::InvalidType {
                    reason: error.to_string(),
                },
            },
            _ => FieldIssue {
                path,
                kind: IssueKind::InvalidValue {
                    reason: error.to_string(),
                },
            },
        }
    }
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path: &str = if self.path.is_empty() {
            "<payload>"
        } else {
            &self.path
        };
        match &self.kind {
            IssueKind::Missing => write!(f, "{path}: required"),
            IssueKind::InvalidType { reason } | IssueKind::InvalidValue { reason } => {
                write!(f, "{path}: {reason}")
            }
        }
    }
}

/// Rejection of an insert payload, listing every offending field
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("invalid {entity} payload: {}", join_issues(.issues))]
pub struct ValidationError {
    pub entity: &'static str,
    pub issues: Vec<FieldIssue>,
}

fn join_issues(issues: &[FieldIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationError {
    fn single(entity: &'static str, issue: FieldIssue) -> Self {
        Self {
            entity,
            issues: vec![issue],
        }
    }

    /// Names of the rejected fields, in the order they were reported
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.issues.iter().map(|issue| issue.path.as_str())
    }

    pub fn issue_for(&self, path: &str) -> Option<&IssueKind> {
        self.issues
            .iter()
            .find(|issue| issue.path == path)
            .map(|issue| &issue.kind)
    }
}

/// Check `instance` against `schema`, collecting every error
///
/// Formats (`date-time`) are asserted, not just annotated.
pub fn check(entity: &'static str, schema: &Value, instance: &Value) -> Result<(), ValidationError> {
    let validator = jsonschema::options()
        .should_validate_formats(true)
        .build(schema)
        .map_err(|e| {
            ValidationError::single(
                entity,
                FieldIssue::payload(IssueKind::InvalidValue {
                    reason: format!("unusable insert schema: {e}"),
                }),
            )
        })?;

    let issues: Vec<FieldIssue> = validator.iter_errors(instance).map(FieldIssue::from).collect();
    if issues.is_empty() {
        Ok(())
    } else {
        Err(ValidationError { entity, issues })
    }
}

/// Check, then deserialize into the accepted shape
pub fn narrow<T: DeserializeOwned>(
    entity: &'static str,
    schema: &Value,
    instance: &Value,
) -> Result<T, ValidationError> {
    check(entity, schema, instance)?;
    serde_json::from_value(instance.clone()).map_err(|e| {
        ValidationError::single(
            entity,
            FieldIssue::payload(IssueKind::InvalidValue {
                reason: e.to_string(),
            }),
        )
    })
}
