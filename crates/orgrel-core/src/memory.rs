//! In-memory membership store
//!
//! Backs tests and embedded use. All companies live behind one
//! `tokio::sync::RwLock`, so edge replacement is trivially atomic.
//!
//! Companies are registered with [`InMemoryMembershipStore::add_company`] or
//! implicitly by the first `create_member` into them.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::member::{normalize_email, MemberProfile, MembershipState, NewMember, OrgMember};
use crate::store::{ManagerEdge, MembershipStore, StoreError};

#[derive(Default)]
pub struct InMemoryMembershipStore {
    companies: RwLock<HashMap<Uuid, HashMap<Uuid, OrgMember>>>,
}

impl InMemoryMembershipStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an empty company
    pub async fn add_company(&self, company_id: Uuid) {
        self.companies.write().await.entry(company_id).or_default();
    }
}

#[async_trait]
impl MembershipStore for InMemoryMembershipStore {
    async fn company_exists(&self, company_id: Uuid) -> Result<bool, StoreError> {
        Ok(self.companies.read().await.contains_key(&company_id))
    }

    async fn list_members(&self, company_id: Uuid) -> Result<Vec<OrgMember>, StoreError> {
        let companies = self.companies.read().await;
        let mut members: Vec<OrgMember> = companies
            .get(&company_id)
            .map(|members| members.values().cloned().collect())
            .unwrap_or_default();
        members.sort_by(|a, b| a.email.cmp(&b.email));
        Ok(members)
    }

    async fn find_member(
        &self,
        company_id: Uuid,
        member_id: Uuid,
    ) -> Result<Option<OrgMember>, StoreError> {
        let companies = self.companies.read().await;
        Ok(companies
            .get(&company_id)
            .and_then(|members| members.get(&member_id))
            .cloned())
    }

    async fn find_member_by_email(
        &self,
        company_id: Uuid,
        email: &str,
    ) -> Result<Option<OrgMember>, StoreError> {
        let email = normalize_email(email);
        let companies = self.companies.read().await;
        Ok(companies
            .get(&company_id)
            .and_then(|members| members.values().find(|m| m.email == email))
            .cloned())
    }

    async fn create_member(
        &self,
        company_id: Uuid,
        member: NewMember,
        state: MembershipState,
    ) -> Result<OrgMember, StoreError> {
        let email = normalize_email(&member.email);
        let mut companies = self.companies.write().await;
        let members = companies.entry(company_id).or_default();

        if members.values().any(|m| m.email == email) {
            return Err(StoreError::Conflict(format!(
                "Member with email '{}' already exists",
                email
            )));
        }

        let created = OrgMember {
            id: Uuid::new_v4(),
            company_id,
            email,
            name: member.profile.name,
            title: member.profile.title,
            role: member.profile.role,
            manager_id: None,
            membership_state: state,
            created_at: Utc::now(),
        };
        members.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update_profile(
        &self,
        company_id: Uuid,
        member_id: Uuid,
        profile: MemberProfile,
    ) -> Result<OrgMember, StoreError> {
        let mut companies = self.companies.write().await;
        let member = companies
            .get_mut(&company_id)
            .and_then(|members| members.get_mut(&member_id))
            .ok_or_else(|| StoreError::NotFound(format!("Member '{}'", member_id)))?;

        if let Some(name) = profile.name {
            member.name = Some(name);
        }
        if let Some(title) = profile.title {
            member.title = Some(title);
        }
        if let Some(role) = profile.role {
            member.role = Some(role);
        }
        Ok(member.clone())
    }

    async fn replace_manager_edges(
        &self,
        company_id: Uuid,
        edges: &[ManagerEdge],
    ) -> Result<(), StoreError> {
        let mut companies = self.companies.write().await;
        let members = companies.entry(company_id).or_default();

        // Validate everything before touching the old edge set
        for edge in edges {
            for id in [edge.member_id, edge.manager_id] {
                if !members.contains_key(&id) {
                    return Err(StoreError::NotFound(format!(
                        "Member '{}' in company '{}'",
                        id, company_id
                    )));
                }
            }
        }

        for member in members.values_mut() {
            member.manager_id = None;
        }
        for edge in edges {
            if let Some(member) = members.get_mut(&edge.member_id) {
                member.manager_id = Some(edge.manager_id);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_and_find_member() {
        let store = InMemoryMembershipStore::new();
        let company = Uuid::new_v4();

        let created = store
            .create_member(
                company,
                NewMember::new("Alice@X.com").with_name("Alice"),
                MembershipState::Registered,
            )
            .await
            .unwrap();
        assert_eq!(created.email, "alice@x.com");

        let found = store
            .find_member_by_email(company, "ALICE@x.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, created.id);

        // Other companies do not see the member
        let other = store
            .find_member_by_email(Uuid::new_v4(), "alice@x.com")
            .await
            .unwrap();
        assert!(other.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let store = InMemoryMembershipStore::new();
        let company = Uuid::new_v4();
        store
            .create_member(company, NewMember::new("a@x.com"), MembershipState::Invited)
            .await
            .unwrap();

        let result = store
            .create_member(company, NewMember::new("A@x.com"), MembershipState::Invited)
            .await;
        assert!(matches!(result, Err(StoreError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_failed_edge_replace_keeps_old_edges() {
        let store = InMemoryMembershipStore::new();
        let company = Uuid::new_v4();
        let boss = store
            .create_member(company, NewMember::new("boss@x.com"), MembershipState::Registered)
            .await
            .unwrap();
        let worker = store
            .create_member(company, NewMember::new("worker@x.com"), MembershipState::Registered)
            .await
            .unwrap();

        let edge = ManagerEdge {
            member_id: worker.id,
            manager_id: boss.id,
        };
        store.replace_manager_edges(company, &[edge]).await.unwrap();

        let bad = ManagerEdge {
            member_id: boss.id,
            manager_id: Uuid::new_v4(),
        };
        let result = store.replace_manager_edges(company, &[bad]).await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));

        let worker = store.find_member(company, worker.id).await.unwrap().unwrap();
        assert_eq!(worker.manager_id, Some(boss.id));
    }
}
