//! OrgMember entity: registered users, pending sign-ups and invited placeholders

use orgrel_core::MembershipState;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Stored membership state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum MemberState {
    /// Signed-up user
    #[sea_orm(string_value = "registered")]
    Registered,

    /// Account awaiting confirmation
    #[sea_orm(string_value = "pending")]
    Pending,

    /// Placeholder created by an import or invite
    #[sea_orm(string_value = "invited")]
    Invited,
}

impl From<MembershipState> for MemberState {
    fn from(state: MembershipState) -> Self {
        match state {
            MembershipState::Registered => MemberState::Registered,
            MembershipState::Pending => MemberState::Pending,
            MembershipState::Invited => MemberState::Invited,
        }
    }
}

impl From<MemberState> for MembershipState {
    fn from(state: MemberState) -> Self {
        match state {
            MemberState::Registered => MembershipState::Registered,
            MemberState::Pending => MembershipState::Pending,
            MemberState::Invited => MembershipState::Invited,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "org_members")]
pub struct Model {
    /// Member UUID (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Owning company
    pub company_id: Uuid,

    /// Lowercase email (unique per company)
    pub email: String,

    /// Display name (optional)
    pub name: Option<String>,

    /// Job title (optional)
    pub title: Option<String>,

    /// Role label (optional)
    pub role: Option<String>,

    /// Registered, pending or invited
    pub membership_state: MemberState,

    /// When the member was created
    pub created_at: ChronoDateTimeUtc,

    /// When the member profile was last updated
    pub updated_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Member belongs to a company
    #[sea_orm(
        belongs_to = "super::company::Entity",
        from = "Column::CompanyId",
        to = "super::company::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Company,
}

impl Related<super::company::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Company.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Convert to the domain type, attaching the manager from the edge table
    pub fn into_org_member(self, manager_id: Option<Uuid>) -> orgrel_core::OrgMember {
        orgrel_core::OrgMember {
            id: self.id,
            company_id: self.company_id,
            email: self.email,
            name: self.name,
            title: self.title,
            role: self.role,
            manager_id,
            membership_state: self.membership_state.into(),
            created_at: self.created_at,
        }
    }
}
