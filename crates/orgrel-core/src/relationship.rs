//! Pairwise relationship classification

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::graph::{OrgGraph, ResolveError};

/// Relationship of the first subject to the second
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RelationshipType {
    /// First subject is the second's immediate manager
    ManagerReport,
    /// First subject reports directly to the second
    ReportManager,
    /// First subject is above the second, two or more levels up
    SkipLevelManager,
    /// First subject is below the second, two or more levels down
    SkipLevelReport,
    /// Both share the same immediate manager
    Peer,
    /// Second subject is a peer of the first subject's manager
    PeerWithBoss,
    /// No path found
    Unrelated,
}

impl RelationshipType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationshipType::ManagerReport => "manager-report",
            RelationshipType::ReportManager => "report-manager",
            RelationshipType::SkipLevelManager => "skip-level-manager",
            RelationshipType::SkipLevelReport => "skip-level-report",
            RelationshipType::Peer => "peer",
            RelationshipType::PeerWithBoss => "peer-with-boss",
            RelationshipType::Unrelated => "unrelated",
        }
    }
}

impl std::fmt::Display for RelationshipType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Computed relationship between two members
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipResult {
    #[serde(rename = "type")]
    pub relationship_type: RelationshipType,
    pub description: String,
    /// Hops between the two, `-1` for [`RelationshipType::Unrelated`]
    pub distance: i32,
}

impl RelationshipResult {
    pub const UNRELATED_DISTANCE: i32 = -1;
}

impl OrgGraph {
    /// Classify how `a` relates to `b`
    ///
    /// Rules are tried in order and the first match wins:
    /// direct manager, direct report, skip-level manager, skip-level report,
    /// peer, peer of the boss, unrelated.
    pub fn classify(&self, a: Uuid, b: Uuid) -> Result<RelationshipResult, ResolveError> {
        let member_a = self.require(a)?;
        let member_b = self.require(b)?;
        if a == b {
            return Err(ResolveError::SelfRelationship(a));
        }

        let chain_a = self.manager_chain(a)?;
        let chain_b = self.manager_chain(b)?;
        let manager_a = chain_a.immediate_manager();
        let manager_b = chain_b.immediate_manager();

        let name_a = member_a.display_name();
        let name_b = member_b.display_name();

        let (relationship_type, distance, description) = if manager_b == Some(a) {
            (
                RelationshipType::ManagerReport,
                1,
                format!("{} is {}'s manager", name_a, name_b),
            )
        } else if manager_a == Some(b) {
            (
                RelationshipType::ReportManager,
                1,
                format!("{} reports to {}", name_a, name_b),
            )
        } else if let Some(distance) = chain_b.distance_to(a) {
            (
                RelationshipType::SkipLevelManager,
                distance as i32,
                format!(
                    "{} is {}'s skip-level manager ({} levels up)",
                    name_a, name_b, distance
                ),
            )
        } else if let Some(distance) = chain_a.distance_to(b) {
            (
                RelationshipType::SkipLevelReport,
                distance as i32,
                format!(
                    "{} is a skip-level report of {} ({} levels down)",
                    name_a, name_b, distance
                ),
            )
        } else if manager_a.is_some() && manager_a == manager_b {
            (
                RelationshipType::Peer,
                0,
                format!("{} and {} share the same manager", name_a, name_b),
            )
        } else if manager_a
            .and_then(|m| self.manager_of(m))
            .is_some_and(|boss_of_manager| Some(boss_of_manager) == manager_b)
        {
            let boss_name = manager_a
                .and_then(|m| self.member(m))
                .map(|m| m.display_name())
                .unwrap_or_default();
            (
                RelationshipType::PeerWithBoss,
                2,
                format!("{} is a peer of {}'s manager {}", name_b, name_a, boss_name),
            )
        } else {
            (
                RelationshipType::Unrelated,
                RelationshipResult::UNRELATED_DISTANCE,
                format!(
                    "No reporting relationship between {} and {}",
                    name_a, name_b
                ),
            )
        };

        debug!(
            "Classified {} -> {} as {} (distance {})",
            a, b, relationship_type, distance
        );

        Ok(RelationshipResult {
            relationship_type,
            description,
            distance,
        })
    }

    /// Classify two members looked up by email
    pub fn classify_by_email(
        &self,
        email_a: &str,
        email_b: &str,
    ) -> Result<RelationshipResult, ResolveError> {
        let a = self.require_email(email_a)?.id;
        let b = self.require_email(email_b)?.id;
        self.classify(a, b)
    }
}
