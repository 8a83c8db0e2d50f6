//! Pre-commit validation of import batches
//!
//! Errors are collected exhaustively rather than failing fast, so one report
//! covers every problem in the batch.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use regex_lite::Regex;
use serde::{Deserialize, Serialize};

use super::parse::ImportRow;

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email pattern"));

/// Category of an import problem
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImportErrorType {
    InvalidEmail,
    UserNotFound,
    CircularReference,
    Other,
}

impl ImportErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportErrorType::InvalidEmail => "INVALID_EMAIL",
            ImportErrorType::UserNotFound => "USER_NOT_FOUND",
            ImportErrorType::CircularReference => "CIRCULAR_REFERENCE",
            ImportErrorType::Other => "OTHER",
        }
    }
}

/// A problem tied to one CSV row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportError {
    /// 1-based data row number
    pub row: usize,
    pub email: String,
    pub error_type: ImportErrorType,
    pub message: String,
}

impl ImportError {
    pub fn new(
        row: usize,
        email: impl Into<String>,
        error_type: ImportErrorType,
        message: impl Into<String>,
    ) -> Self {
        Self {
            row,
            email: email.into(),
            error_type,
            message: message.into(),
        }
    }
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

/// Validate a batch before any write happens
///
/// Returns every format and cycle error, ordered by row. An empty list means the
/// batch is safe to commit.
pub fn validate_rows(rows: &[ImportRow]) -> Vec<ImportError> {
    let mut errors = Vec::new();

    for row in rows {
        if !is_valid_email(&row.email) {
            errors.push(ImportError::new(
                row.row,
                &row.email,
                ImportErrorType::InvalidEmail,
                format!("Invalid email address: '{}'", row.email),
            ));
        }

        if let Some(manager_email) = &row.manager_email {
            if !is_valid_email(manager_email) {
                errors.push(ImportError::new(
                    row.row,
                    &row.email,
                    ImportErrorType::InvalidEmail,
                    format!("Invalid manager email address: '{}'", manager_email),
                ));
            }
        }
    }

    errors.extend(detect_cycles(rows));
    errors.sort_by_key(|error| error.row);
    errors
}

/// One error per distinct cycle, on the first row whose walk returns to its origin
fn detect_cycles(rows: &[ImportRow]) -> Vec<ImportError> {
    let managers: HashMap<&str, &str> = rows
        .iter()
        .filter_map(|row| {
            row.manager_email
                .as_deref()
                .map(|manager| (row.email.as_str(), manager))
        })
        .collect();

    let mut reported: HashSet<&str> = HashSet::new();
    let mut errors = Vec::new();

    for row in rows {
        let origin = row.email.as_str();
        let Some(first_manager) = row.manager_email.as_deref() else {
            continue;
        };
        if reported.contains(origin) {
            continue;
        }

        let mut visited = HashSet::from([origin]);
        let mut path = vec![origin];
        let mut next = Some(first_manager);

        while let Some(email) = next {
            if email == origin {
                path.push(origin);
                errors.push(ImportError::new(
                    row.row,
                    origin,
                    ImportErrorType::CircularReference,
                    format!("Circular manager reference: {}", path.join(" -> ")),
                ));
                reported.extend(path.iter().copied());
                break;
            }
            if !visited.insert(email) {
                // Leads into a cycle that does not include this row
                break;
            }
            path.push(email);
            next = managers.get(email).copied();
        }
    }

    errors
}
