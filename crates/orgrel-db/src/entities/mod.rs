//! Database entities

pub mod company;
pub mod manager_edge;
pub mod org_member;

pub use company::Entity as Company;
pub use manager_edge::Entity as ManagerEdge;
pub use org_member::Entity as OrgMember;

pub mod prelude {
    pub use super::company::Entity as Company;
    pub use super::manager_edge::Entity as ManagerEdge;
    pub use super::org_member::Entity as OrgMember;
}
