//! Organizational relationship resolution
//!
//! Classifies how two members of a company relate to each other in the reporting
//! hierarchy, and validates bulk org-chart imports (format errors and circular
//! manager references) before they replace the stored manager edges.
//!
//! All graph operations are scoped to one company and run synchronously over a
//! snapshot loaded from a [`MembershipStore`].

pub mod graph;
pub mod import;
pub mod member;
pub mod memory;
pub mod relationship;
pub mod store;

pub use graph::{ChainLink, ManagerChain, OrgGraph, ResolveError};
pub use import::{
    is_valid_email, parse_csv, validate_rows, CsvError, ImportCommitter, ImportError,
    ImportErrorType, ImportFailure, ImportOptions, ImportRow, ImportSummary,
};
pub use member::{
    display_name_for, normalize_email, MemberProfile, MembershipState, NewMember, OrgMember,
};
pub use memory::InMemoryMembershipStore;
pub use relationship::{RelationshipResult, RelationshipType};
pub use store::{ManagerEdge, MembershipStore, StoreError};

// Re-export useful types
pub use async_trait::async_trait;
pub use uuid::Uuid;
