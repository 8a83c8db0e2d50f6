//! ManagerEdge entity: one row per member that has a manager

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "manager_edges")]
pub struct Model {
    /// Reporting member (primary key, a member has at most one manager)
    #[sea_orm(primary_key, auto_increment = false)]
    pub member_id: Uuid,

    /// Company both endpoints belong to
    pub company_id: Uuid,

    /// The member's immediate manager
    pub manager_id: Uuid,

    /// When the edge was written
    pub created_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Edge belongs to a company
    #[sea_orm(
        belongs_to = "super::company::Entity",
        from = "Column::CompanyId",
        to = "super::company::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Company,

    /// Reporting side of the edge
    #[sea_orm(
        belongs_to = "super::org_member::Entity",
        from = "Column::MemberId",
        to = "super::org_member::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Member,

    /// Manager side of the edge
    #[sea_orm(
        belongs_to = "super::org_member::Entity",
        from = "Column::ManagerId",
        to = "super::org_member::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Manager,
}

impl Related<super::company::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Company.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
