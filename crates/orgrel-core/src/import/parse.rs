//! CSV org-chart parsing

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::member::{normalize_email, MemberProfile};

/// CSV parsing errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CsvError {
    #[error("CSV input is empty or has no header row")]
    MissingHeader,

    #[error("Required column missing: {0}")]
    MissingColumn(&'static str),

    #[error("Malformed CSV at row {row}: {message}")]
    Malformed { row: usize, message: String },
}

/// One parsed CSV line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportRow {
    /// 1-based data row number (header excluded)
    pub row: usize,
    pub email: String,
    pub manager_email: Option<String>,
    pub name: Option<String>,
    pub title: Option<String>,
    pub role: Option<String>,
}

impl ImportRow {
    pub fn new(row: usize, email: &str, manager_email: Option<&str>) -> Self {
        Self {
            row,
            email: normalize_email(email),
            manager_email: manager_email
                .map(normalize_email)
                .filter(|email| !email.is_empty()),
            name: None,
            title: None,
            role: None,
        }
    }

    pub fn profile(&self) -> MemberProfile {
        MemberProfile {
            name: self.name.clone(),
            title: self.title.clone(),
            role: self.role.clone(),
        }
    }
}

struct Columns {
    email: usize,
    manager_email: usize,
    name: Option<usize>,
    title: Option<usize>,
    role: Option<usize>,
}

impl Columns {
    fn locate(headers: &csv::StringRecord) -> Result<Self, CsvError> {
        let find = |names: &[&str]| {
            headers.iter().position(|header| {
                let header = header.trim().to_lowercase();
                names.iter().any(|name| header == *name)
            })
        };

        Ok(Self {
            email: find(&["email"]).ok_or(CsvError::MissingColumn("email"))?,
            manager_email: find(&["manageremail", "manager_email"])
                .ok_or(CsvError::MissingColumn("managerEmail"))?,
            name: find(&["name"]),
            title: find(&["title"]),
            role: find(&["role"]),
        })
    }
}

fn optional_field(record: &csv::StringRecord, index: Option<usize>) -> Option<String> {
    index
        .and_then(|i| record.get(i))
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Parse org-chart CSV content
///
/// A header row is required and must name `email` and `managerEmail` columns
/// (case-insensitive). `name`, `title` and `role` are optional. Blank lines are
/// skipped and do not consume a row number.
pub fn parse_csv(content: &str) -> Result<Vec<ImportRow>, CsvError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| CsvError::Malformed {
            row: 0,
            message: e.to_string(),
        })?
        .clone();
    if headers.is_empty() || headers.iter().all(|h| h.trim().is_empty()) {
        return Err(CsvError::MissingHeader);
    }
    let columns = Columns::locate(&headers)?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let row = rows.len() + 1;
        let record = record.map_err(|e| CsvError::Malformed {
            row,
            message: e.to_string(),
        })?;

        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }

        let email = record.get(columns.email).unwrap_or_default();
        let manager_email = record.get(columns.manager_email);

        let mut parsed = ImportRow::new(row, email, manager_email);
        parsed.name = optional_field(&record, columns.name);
        parsed.title = optional_field(&record, columns.title);
        parsed.role = optional_field(&record, columns.role);
        rows.push(parsed);
    }

    Ok(rows)
}
