//! SeaORM-backed membership store

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::Utc;
use orgrel_core::{
    normalize_email, ManagerEdge, MemberProfile, MembershipState, MembershipStore, NewMember,
    OrgMember, StoreError,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tracing::{debug, info};
use uuid::Uuid;

use crate::entities::{company, manager_edge, org_member};

/// Edges written per INSERT statement, keeping bind parameters well under
/// the PostgreSQL limit of 65535
pub const EDGE_INSERT_BATCH: usize = 1000;

fn db_err(e: DbErr) -> StoreError {
    StoreError::Database(e.to_string())
}

/// Membership store over a SeaORM connection
#[derive(Clone)]
pub struct SeaOrmMembershipStore {
    db: DatabaseConnection,
}

impl SeaOrmMembershipStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Create a company to scope members under
    pub async fn create_company(&self, name: &str) -> Result<company::Model, StoreError> {
        let now = Utc::now();
        let company = company::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let company = company.insert(&self.db).await.map_err(db_err)?;
        info!("Created company {} ({})", company.name, company.id);
        Ok(company)
    }

    pub async fn find_company(&self, company_id: Uuid) -> Result<Option<company::Model>, StoreError> {
        company::Entity::find_by_id(company_id)
            .one(&self.db)
            .await
            .map_err(db_err)
    }

    pub async fn list_companies(&self) -> Result<Vec<company::Model>, StoreError> {
        company::Entity::find()
            .order_by_asc(company::Column::Name)
            .all(&self.db)
            .await
            .map_err(db_err)
    }

    async fn manager_of(&self, member_id: Uuid) -> Result<Option<Uuid>, StoreError> {
        Ok(manager_edge::Entity::find_by_id(member_id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(|edge| edge.manager_id))
    }

    async fn find_model(
        &self,
        company_id: Uuid,
        member_id: Uuid,
    ) -> Result<Option<org_member::Model>, StoreError> {
        org_member::Entity::find_by_id(member_id)
            .filter(org_member::Column::CompanyId.eq(company_id))
            .one(&self.db)
            .await
            .map_err(db_err)
    }
}

#[async_trait]
impl MembershipStore for SeaOrmMembershipStore {
    async fn company_exists(&self, company_id: Uuid) -> Result<bool, StoreError> {
        Ok(self.find_company(company_id).await?.is_some())
    }

    async fn list_members(&self, company_id: Uuid) -> Result<Vec<OrgMember>, StoreError> {
        let models = org_member::Entity::find()
            .filter(org_member::Column::CompanyId.eq(company_id))
            .order_by_asc(org_member::Column::Email)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        let managers: HashMap<Uuid, Uuid> = manager_edge::Entity::find()
            .filter(manager_edge::Column::CompanyId.eq(company_id))
            .all(&self.db)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(|edge| (edge.member_id, edge.manager_id))
            .collect();

        debug!(
            "Loaded {} members and {} edges for company {}",
            models.len(),
            managers.len(),
            company_id
        );

        Ok(models
            .into_iter()
            .map(|model| {
                let manager_id = managers.get(&model.id).copied();
                model.into_org_member(manager_id)
            })
            .collect())
    }

    async fn find_member(
        &self,
        company_id: Uuid,
        member_id: Uuid,
    ) -> Result<Option<OrgMember>, StoreError> {
        match self.find_model(company_id, member_id).await? {
            Some(model) => {
                let manager_id = self.manager_of(model.id).await?;
                Ok(Some(model.into_org_member(manager_id)))
            }
            None => Ok(None),
        }
    }

    async fn find_member_by_email(
        &self,
        company_id: Uuid,
        email: &str,
    ) -> Result<Option<OrgMember>, StoreError> {
        let model = org_member::Entity::find()
            .filter(org_member::Column::CompanyId.eq(company_id))
            .filter(org_member::Column::Email.eq(normalize_email(email)))
            .one(&self.db)
            .await
            .map_err(db_err)?;

        match model {
            Some(model) => {
                let manager_id = self.manager_of(model.id).await?;
                Ok(Some(model.into_org_member(manager_id)))
            }
            None => Ok(None),
        }
    }

    async fn create_member(
        &self,
        company_id: Uuid,
        member: NewMember,
        state: MembershipState,
    ) -> Result<OrgMember, StoreError> {
        if self.find_company(company_id).await?.is_none() {
            return Err(StoreError::NotFound(format!("Company '{}'", company_id)));
        }

        let email = normalize_email(&member.email);
        if self.find_member_by_email(company_id, &email).await?.is_some() {
            return Err(StoreError::Conflict(format!(
                "Member with email '{}' already exists",
                email
            )));
        }

        let now = Utc::now();
        let model = org_member::ActiveModel {
            id: Set(Uuid::new_v4()),
            company_id: Set(company_id),
            email: Set(email),
            name: Set(member.profile.name),
            title: Set(member.profile.title),
            role: Set(member.profile.role),
            membership_state: Set(state.into()),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = model.insert(&self.db).await.map_err(db_err)?;
        debug!("Created {} member {}", state.as_str(), model.email);
        Ok(model.into_org_member(None))
    }

    async fn update_profile(
        &self,
        company_id: Uuid,
        member_id: Uuid,
        profile: MemberProfile,
    ) -> Result<OrgMember, StoreError> {
        let model = self
            .find_model(company_id, member_id)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("Member '{}'", member_id)))?;

        let mut active: org_member::ActiveModel = model.into();
        if let Some(name) = profile.name {
            active.name = Set(Some(name));
        }
        if let Some(title) = profile.title {
            active.title = Set(Some(title));
        }
        if let Some(role) = profile.role {
            active.role = Set(Some(role));
        }
        active.updated_at = Set(Utc::now());

        let model = active.update(&self.db).await.map_err(db_err)?;
        let manager_id = self.manager_of(model.id).await?;
        Ok(model.into_org_member(manager_id))
    }

    async fn replace_manager_edges(
        &self,
        company_id: Uuid,
        edges: &[ManagerEdge],
    ) -> Result<(), StoreError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let endpoints: HashSet<Uuid> = edges
            .iter()
            .flat_map(|edge| [edge.member_id, edge.manager_id])
            .collect();
        if !endpoints.is_empty() {
            let known = org_member::Entity::find()
                .filter(org_member::Column::CompanyId.eq(company_id))
                .filter(org_member::Column::Id.is_in(endpoints.iter().copied()))
                .count(&txn)
                .await
                .map_err(db_err)?;
            if known as usize != endpoints.len() {
                txn.rollback().await.map_err(db_err)?;
                return Err(StoreError::NotFound(format!(
                    "{} edge endpoint(s) are not members of company '{}'",
                    endpoints.len() - known as usize,
                    company_id
                )));
            }
        }

        let removed = manager_edge::Entity::delete_many()
            .filter(manager_edge::Column::CompanyId.eq(company_id))
            .exec(&txn)
            .await
            .map_err(db_err)?;

        if !edges.is_empty() {
            let now = Utc::now();
            let models: Vec<manager_edge::ActiveModel> = edges
                .iter()
                .map(|edge| manager_edge::ActiveModel {
                    member_id: Set(edge.member_id),
                    company_id: Set(company_id),
                    manager_id: Set(edge.manager_id),
                    created_at: Set(now),
                })
                .collect();
            for chunk in models.chunks(EDGE_INSERT_BATCH) {
                manager_edge::Entity::insert_many(chunk.iter().cloned())
                    .exec(&txn)
                    .await
                    .map_err(db_err)?;
            }
        }

        txn.commit().await.map_err(db_err)?;

        info!(
            "Replaced manager edges for company {}: {} removed, {} written",
            company_id,
            removed.rows_affected,
            edges.len()
        );
        Ok(())
    }
}
