//! Committing a validated import batch to the membership store

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::parse::{parse_csv, CsvError, ImportRow};
use super::validate::{validate_rows, ImportError, ImportErrorType};
use crate::member::{MemberProfile, MembershipState, NewMember, OrgMember};
use crate::store::{ManagerEdge, MembershipStore, StoreError};

/// Import failures that stop the batch before any write
#[derive(Debug, Error)]
pub enum ImportFailure {
    #[error("Import validation failed with {} error(s)", .0.len())]
    Validation(Vec<ImportError>),

    #[error(transparent)]
    Csv(#[from] CsvError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Import behaviour switches
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportOptions {
    /// Create invited placeholders for manager emails that appear neither in the
    /// batch's `email` column nor in the store. When off, such rows are reported
    /// as `USER_NOT_FOUND` and their edge is skipped.
    #[serde(default)]
    pub invite_unknown_managers: bool,
}

/// Outcome of a commit
///
/// Counts only cover rows that did not error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub users_added: usize,
    pub relationships_created: usize,
    pub errors: Vec<ImportError>,
}

/// Validates and commits org-chart imports for a company
pub struct ImportCommitter {
    store: Arc<dyn MembershipStore>,
    options: ImportOptions,
}

impl ImportCommitter {
    pub fn new(store: Arc<dyn MembershipStore>, options: ImportOptions) -> Self {
        Self { store, options }
    }

    /// Parse and validate CSV content without writing anything
    pub fn validate_csv(&self, content: &str) -> Result<Vec<ImportError>, CsvError> {
        let rows = parse_csv(content)?;
        Ok(validate_rows(&rows))
    }

    /// Parse, validate and commit CSV content
    pub async fn import_csv(
        &self,
        company_id: Uuid,
        content: &str,
    ) -> Result<ImportSummary, ImportFailure> {
        let rows = parse_csv(content)?;
        self.commit(company_id, &rows).await
    }

    /// Commit a batch as the company's new reporting structure
    ///
    /// An unknown company fails with [`StoreError::NotFound`] before anything is
    /// validated or written. Validation errors block the whole batch. Past validation, per-row failures
    /// are collected into the summary and do not stop other rows.
    pub async fn commit(
        &self,
        company_id: Uuid,
        rows: &[ImportRow],
    ) -> Result<ImportSummary, ImportFailure> {
        if !self.store.company_exists(company_id).await? {
            return Err(StoreError::NotFound(format!("Company '{}'", company_id)).into());
        }

        let validation_errors = validate_rows(rows);
        if !validation_errors.is_empty() {
            return Err(ImportFailure::Validation(validation_errors));
        }

        info!(
            "Committing org-chart import for company {} ({} rows)",
            company_id,
            rows.len()
        );

        let mut summary = ImportSummary::default();
        let plan = ImportPlan::new(rows, &self.options);
        let mut resolved: HashMap<&str, OrgMember> = HashMap::new();
        let mut created: HashSet<&str> = HashSet::new();
        // Emails the store failed on, with the row that already carries the error
        let mut failed: HashMap<&str, usize> = HashMap::new();

        for &(email, row) in &plan.emails {
            let outcome = match self.store.find_member_by_email(company_id, email).await {
                Ok(Some(member)) => Ok(member),
                Ok(None) if plan.may_create(email) => {
                    let new_member = NewMember {
                        email: email.to_string(),
                        profile: plan.profile(email),
                    };
                    let result = self
                        .store
                        .create_member(company_id, new_member, MembershipState::Invited)
                        .await;
                    if let Ok(member) = &result {
                        debug!("Created invited member {} for {}", member.id, email);
                        summary.users_added += 1;
                        created.insert(email);
                    }
                    result
                }
                Ok(None) => continue,
                Err(e) => Err(e),
            };

            match outcome {
                Ok(member) => {
                    resolved.insert(email, member);
                }
                Err(e) => {
                    warn!("Failed to resolve {} (row {}): {}", email, row, e);
                    summary.errors.push(ImportError::new(
                        row,
                        email,
                        ImportErrorType::Other,
                        format!("Failed to resolve member: {}", e),
                    ));
                    failed.insert(email, row);
                }
            }
        }

        // Placeholders were created with their profile already
        for &(email, first_row) in &plan.emails {
            let Some(member) = resolved.get_mut(email) else {
                continue;
            };
            let (row, profile) = plan
                .profile_entry(email)
                .unwrap_or((first_row, MemberProfile::default()));
            if created.contains(email) || profile.is_empty() {
                continue;
            }
            match self
                .store
                .update_profile(company_id, member.id, profile)
                .await
            {
                Ok(updated) => *member = updated,
                Err(e) => {
                    warn!("Failed to update profile of {} (row {}): {}", email, row, e);
                    summary.errors.push(ImportError::new(
                        row,
                        email,
                        ImportErrorType::Other,
                        format!("Failed to update profile: {}", e),
                    ));
                }
            }
        }

        let mut edges: Vec<ManagerEdge> = Vec::new();
        let mut edge_rows: Vec<&ImportRow> = Vec::new();
        let mut edge_index: HashMap<Uuid, usize> = HashMap::new();

        for row in rows {
            let Some(manager_email) = row.manager_email.as_deref() else {
                continue;
            };
            let unresolved = [row.email.as_str(), manager_email]
                .into_iter()
                .find_map(|email| failed.get(email).map(|&reported| (email, reported)));
            if let Some((email, reported_row)) = unresolved {
                if reported_row != row.row {
                    warn!("Skipping row {}: {} could not be resolved", row.row, email);
                    summary.errors.push(ImportError::new(
                        row.row,
                        &row.email,
                        ImportErrorType::Other,
                        format!("Manager edge skipped: '{}' could not be resolved", email),
                    ));
                }
                continue;
            }

            let member = resolved.get(row.email.as_str());
            let manager = resolved.get(manager_email);
            let (Some(member), Some(manager)) = (member, manager) else {
                let missing = if member.is_none() {
                    row.email.as_str()
                } else {
                    manager_email
                };
                warn!("Skipping row {}: no member for {}", row.row, missing);
                summary.errors.push(ImportError::new(
                    row.row,
                    &row.email,
                    ImportErrorType::UserNotFound,
                    format!("No member found for '{}'", missing),
                ));
                continue;
            };

            let edge = ManagerEdge {
                member_id: member.id,
                manager_id: manager.id,
            };
            match edge_index.get(&member.id) {
                Some(&i) => {
                    edges[i] = edge;
                    edge_rows[i] = row;
                }
                None => {
                    edge_index.insert(member.id, edges.len());
                    edges.push(edge);
                    edge_rows.push(row);
                }
            }
        }

        match self.store.replace_manager_edges(company_id, &edges).await {
            Ok(()) => summary.relationships_created = edges.len(),
            Err(e) => {
                warn!(
                    "Replacing manager edges for company {} failed: {}",
                    company_id, e
                );
                for row in edge_rows {
                    summary.errors.push(ImportError::new(
                        row.row,
                        &row.email,
                        ImportErrorType::Other,
                        format!("Failed to write manager edge: {}", e),
                    ));
                }
            }
        }

        summary.errors.sort_by_key(|error| error.row);

        info!(
            "Import for company {} finished: {} users added, {} relationships, {} errors",
            company_id,
            summary.users_added,
            summary.relationships_created,
            summary.errors.len()
        );

        Ok(summary)
    }
}

/// Distinct emails of a batch and the profile each one should end up with
struct ImportPlan<'a> {
    /// Distinct emails in first-seen order, with the row that introduced them
    emails: Vec<(&'a str, usize)>,
    row_emails: HashSet<&'a str>,
    /// Last row wins for duplicate emails
    profiles: HashMap<&'a str, (usize, MemberProfile)>,
    invite_unknown_managers: bool,
}

impl<'a> ImportPlan<'a> {
    fn new(rows: &'a [ImportRow], options: &ImportOptions) -> Self {
        let mut emails = Vec::new();
        let mut seen = HashSet::new();
        let mut row_emails = HashSet::new();
        let mut profiles = HashMap::new();

        for row in rows {
            row_emails.insert(row.email.as_str());
            profiles.insert(row.email.as_str(), (row.row, row.profile()));

            let endpoints = std::iter::once(row.email.as_str()).chain(row.manager_email.as_deref());
            for email in endpoints {
                if seen.insert(email) {
                    emails.push((email, row.row));
                }
            }
        }

        Self {
            emails,
            row_emails,
            profiles,
            invite_unknown_managers: options.invite_unknown_managers,
        }
    }

    fn may_create(&self, email: &str) -> bool {
        self.invite_unknown_managers || self.row_emails.contains(email)
    }

    fn profile(&self, email: &str) -> MemberProfile {
        self.profile_entry(email)
            .map(|(_, profile)| profile)
            .unwrap_or_default()
    }

    /// Profile of an email with its own row, the last one that names it
    fn profile_entry(&self, email: &str) -> Option<(usize, MemberProfile)> {
        self.profiles
            .get(email)
            .map(|(row, profile)| (*row, profile.clone()))
    }
}
