//! Company entity, the scope of every org graph

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "companies")]
pub struct Model {
    /// Company UUID (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Company name
    pub name: String,

    /// When the company was created
    pub created_at: ChronoDateTimeUtc,

    /// When the company was last updated
    pub updated_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Company has members
    #[sea_orm(has_many = "super::org_member::Entity")]
    Members,

    /// Company has reporting edges
    #[sea_orm(has_many = "super::manager_edge::Entity")]
    ManagerEdges,
}

impl Related<super::org_member::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Members.def()
    }
}

impl Related<super::manager_edge::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ManagerEdges.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
