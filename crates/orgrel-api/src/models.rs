use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

/// Membership state of an org member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MembershipState {
    /// Signed-up user
    Registered,
    /// Account awaiting confirmation
    Pending,
    /// Placeholder created by an import or invite
    Invited,
}

impl From<orgrel_core::MembershipState> for MembershipState {
    fn from(state: orgrel_core::MembershipState) -> Self {
        match state {
            orgrel_core::MembershipState::Registered => MembershipState::Registered,
            orgrel_core::MembershipState::Pending => MembershipState::Pending,
            orgrel_core::MembershipState::Invited => MembershipState::Invited,
        }
    }
}

/// Org member
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Member {
    /// Member ID
    pub id: Uuid,
    /// Lowercase email
    pub email: String,
    /// Display name (profile name or email local part)
    pub display_name: String,
    /// Job title
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Role label
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Immediate manager ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manager_id: Option<Uuid>,
    /// Membership state
    pub membership_state: MembershipState,
    /// When the member was created
    pub created_at: DateTime<Utc>,
}

impl From<&orgrel_core::OrgMember> for Member {
    fn from(member: &orgrel_core::OrgMember) -> Self {
        Self {
            id: member.id,
            email: member.email.clone(),
            display_name: member.display_name(),
            title: member.title.clone(),
            role: member.role.clone(),
            manager_id: member.manager_id,
            membership_state: member.membership_state.into(),
            created_at: member.created_at,
        }
    }
}

/// List of members
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MemberList {
    /// Members, sorted by email
    pub members: Vec<Member>,
    /// Total count
    pub total: usize,
}

/// One manager above a member
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChainEntry {
    /// The manager
    pub manager: Member,
    /// Levels above the member (1 = immediate manager)
    pub distance: u32,
}

/// Managers above a member, nearest first
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ManagerChain {
    /// Subject member ID
    pub member_id: Uuid,
    /// Chain entries
    pub chain: Vec<ChainEntry>,
}

/// Relationship type between two members
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum RelationshipType {
    ManagerReport,
    ReportManager,
    SkipLevelManager,
    SkipLevelReport,
    Peer,
    PeerWithBoss,
    Unrelated,
}

impl From<orgrel_core::RelationshipType> for RelationshipType {
    fn from(value: orgrel_core::RelationshipType) -> Self {
        use orgrel_core::RelationshipType as Core;
        match value {
            Core::ManagerReport => RelationshipType::ManagerReport,
            Core::ReportManager => RelationshipType::ReportManager,
            Core::SkipLevelManager => RelationshipType::SkipLevelManager,
            Core::SkipLevelReport => RelationshipType::SkipLevelReport,
            Core::Peer => RelationshipType::Peer,
            Core::PeerWithBoss => RelationshipType::PeerWithBoss,
            Core::Unrelated => RelationshipType::Unrelated,
        }
    }
}

/// Relationship of `from` to `to`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Relationship {
    /// Relationship type
    #[serde(rename = "type")]
    pub relationship_type: RelationshipType,
    /// Human-readable description
    pub description: String,
    /// Hops between the members, -1 when unrelated
    pub distance: i32,
}

impl From<orgrel_core::RelationshipResult> for Relationship {
    fn from(result: orgrel_core::RelationshipResult) -> Self {
        Self {
            relationship_type: result.relationship_type.into(),
            description: result.description,
            distance: result.distance,
        }
    }
}

/// Relationship lookup by member IDs
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RelationshipQuery {
    /// First member ID
    pub from: Uuid,
    /// Second member ID
    pub to: Uuid,
}

/// Relationship lookup by email
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RelationshipByEmailQuery {
    /// First member email
    pub from: String,
    /// Second member email
    pub to: String,
}

/// Import error category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImportErrorType {
    InvalidEmail,
    UserNotFound,
    CircularReference,
    Other,
}

impl From<orgrel_core::ImportErrorType> for ImportErrorType {
    fn from(value: orgrel_core::ImportErrorType) -> Self {
        use orgrel_core::ImportErrorType as Core;
        match value {
            Core::InvalidEmail => ImportErrorType::InvalidEmail,
            Core::UserNotFound => ImportErrorType::UserNotFound,
            Core::CircularReference => ImportErrorType::CircularReference,
            Core::Other => ImportErrorType::Other,
        }
    }
}

/// Problem on one CSV row
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImportIssue {
    /// 1-based data row number
    pub row: usize,
    /// Email of the row
    pub email: String,
    /// Error category
    pub error_type: ImportErrorType,
    /// Details
    pub message: String,
}

impl From<orgrel_core::ImportError> for ImportIssue {
    fn from(error: orgrel_core::ImportError) -> Self {
        Self {
            row: error.row,
            email: error.email,
            error_type: error.error_type.into(),
            message: error.message,
        }
    }
}

/// Result of validating an org-chart CSV
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ValidationReport {
    /// True when the batch can be committed
    pub valid: bool,
    /// Every problem found
    pub errors: Vec<ImportIssue>,
}

/// Result of committing an org-chart CSV
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    /// Invited placeholders created
    pub users_added: usize,
    /// Manager edges written
    pub relationships_created: usize,
    /// Rows that failed during the commit
    pub errors: Vec<ImportIssue>,
}

impl From<orgrel_core::ImportSummary> for ImportReport {
    fn from(summary: orgrel_core::ImportSummary) -> Self {
        Self {
            users_added: summary.users_added,
            relationships_created: summary.relationships_created,
            errors: summary.errors.into_iter().map(Into::into).collect(),
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Per-row problems when an import is rejected
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ImportIssue>,
}
