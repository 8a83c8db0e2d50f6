//! Membership store abstraction
//!
//! The resolver never talks to a database directly. Callers hand it a
//! [`MembershipStore`] so the same code runs against SeaORM in production and
//! against [`InMemoryMembershipStore`](crate::InMemoryMembershipStore) in tests.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::graph::OrgGraph;
use crate::member::{MemberProfile, MembershipState, NewMember, OrgMember};

/// Membership store errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),
}

/// A reporting edge: `member_id` reports to `manager_id`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ManagerEdge {
    pub member_id: Uuid,
    pub manager_id: Uuid,
}

#[async_trait]
pub trait MembershipStore: Send + Sync {
    async fn company_exists(&self, company_id: Uuid) -> Result<bool, StoreError>;

    /// Every member of the company with its current manager
    async fn list_members(&self, company_id: Uuid) -> Result<Vec<OrgMember>, StoreError>;

    async fn find_member(
        &self,
        company_id: Uuid,
        member_id: Uuid,
    ) -> Result<Option<OrgMember>, StoreError>;

    /// Lookup by email, case-insensitive
    async fn find_member_by_email(
        &self,
        company_id: Uuid,
        email: &str,
    ) -> Result<Option<OrgMember>, StoreError>;

    async fn create_member(
        &self,
        company_id: Uuid,
        member: NewMember,
        state: MembershipState,
    ) -> Result<OrgMember, StoreError>;

    /// Overwrite the profile fields that are `Some` in `profile`
    async fn update_profile(
        &self,
        company_id: Uuid,
        member_id: Uuid,
        profile: MemberProfile,
    ) -> Result<OrgMember, StoreError>;

    /// Replace every manager edge of the company with `edges`
    ///
    /// Implementations must apply this atomically: after the call the company has
    /// either its old edge set or exactly `edges`, never a mix or nothing.
    async fn replace_manager_edges(
        &self,
        company_id: Uuid,
        edges: &[ManagerEdge],
    ) -> Result<(), StoreError>;

    /// Snapshot the company's hierarchy
    async fn load_graph(&self, company_id: Uuid) -> Result<OrgGraph, StoreError> {
        Ok(OrgGraph::new(self.list_members(company_id).await?))
    }
}
