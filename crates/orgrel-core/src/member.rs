//! Org members and their membership state

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Where a member sits in the onboarding lifecycle
///
/// Only decides which identity a write targets. Graph semantics are identical
/// for all three states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MembershipState {
    /// Signed-up user with an account
    Registered,
    /// Account requested but not yet confirmed
    Pending,
    /// Placeholder created by an import or an invite
    Invited,
}

impl MembershipState {
    pub fn as_str(&self) -> &'static str {
        match self {
            MembershipState::Registered => "registered",
            MembershipState::Pending => "pending",
            MembershipState::Invited => "invited",
        }
    }
}

/// One person known to a company
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrgMember {
    /// Opaque identifier, unique within the company
    pub id: Uuid,

    /// Owning company
    pub company_id: Uuid,

    /// Lowercase email, natural key during import
    pub email: String,

    /// Display name (optional)
    pub name: Option<String>,

    /// Job title (optional)
    pub title: Option<String>,

    /// Free-form role label (optional)
    pub role: Option<String>,

    /// Immediate manager, `None` at the top of the hierarchy
    pub manager_id: Option<Uuid>,

    pub membership_state: MembershipState,

    pub created_at: DateTime<Utc>,
}

impl OrgMember {
    /// Name shown in relationship descriptions
    pub fn display_name(&self) -> String {
        display_name_for(self.name.as_deref(), &self.email)
    }
}

/// Profile name, or the local part of the email when no usable name exists
pub fn display_name_for(name: Option<&str>, email: &str) -> String {
    match name.map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => email.split('@').next().unwrap_or(email).to_string(),
    }
}

/// Input for creating a member record
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewMember {
    pub email: String,
    pub profile: MemberProfile,
}

impl NewMember {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: normalize_email(&email.into()),
            profile: MemberProfile::default(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.profile.name = Some(name.into());
        self
    }
}

/// Profile fields written by the importer
///
/// `None` leaves the stored value untouched.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MemberProfile {
    pub name: Option<String>,
    pub title: Option<String>,
    pub role: Option<String>,
}

impl MemberProfile {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.title.is_none() && self.role.is_none()
    }
}

/// Trim and lowercase an email address
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
