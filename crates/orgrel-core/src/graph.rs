//! In-memory reporting graph for one company
//!
//! Built once per request from the membership store snapshot. Manager chains are
//! walked with a visited set, so arbitrarily deep hierarchies resolve fully and a
//! circular manager reference surfaces as [`ResolveError::CycleDetected`] instead of
//! being truncated.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use thiserror::Error;
use tracing::trace;
use uuid::Uuid;

use crate::member::{normalize_email, OrgMember};

/// Errors raised while resolving members or walking the hierarchy
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("Member not found: {0}")]
    MemberNotFound(Uuid),

    #[error("No member with email: {0}")]
    MemberEmailNotFound(String),

    #[error("Cannot classify a member against itself: {0}")]
    SelfRelationship(Uuid),

    #[error("Circular manager reference reached from member {member}")]
    CycleDetected { member: Uuid },
}

/// One step up a manager chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChainLink {
    pub manager_id: Uuid,
    /// 1 for the immediate manager
    pub distance: u32,
}

/// Ordered managers above a subject, nearest first
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManagerChain {
    pub subject: Uuid,
    pub links: Vec<ChainLink>,
}

impl ManagerChain {
    pub fn immediate_manager(&self) -> Option<Uuid> {
        self.links.first().map(|link| link.manager_id)
    }

    /// Distance from the subject to `manager_id`, if it is above the subject
    pub fn distance_to(&self, manager_id: Uuid) -> Option<u32> {
        self.links
            .iter()
            .find(|link| link.manager_id == manager_id)
            .map(|link| link.distance)
    }

    pub fn contains(&self, manager_id: Uuid) -> bool {
        self.distance_to(manager_id).is_some()
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChainLink> {
        self.links.iter()
    }
}

/// Reporting hierarchy snapshot
#[derive(Debug, Clone, Default)]
pub struct OrgGraph {
    members: HashMap<Uuid, OrgMember>,
    by_email: HashMap<String, Uuid>,
}

impl OrgGraph {
    pub fn new(members: impl IntoIterator<Item = OrgMember>) -> Self {
        let mut graph = Self::default();
        for member in members {
            graph
                .by_email
                .insert(normalize_email(&member.email), member.id);
            graph.members.insert(member.id, member);
        }
        graph
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn member(&self, id: Uuid) -> Option<&OrgMember> {
        self.members.get(&id)
    }

    pub fn member_by_email(&self, email: &str) -> Option<&OrgMember> {
        self.by_email
            .get(&normalize_email(email))
            .and_then(|id| self.members.get(id))
    }

    pub fn require(&self, id: Uuid) -> Result<&OrgMember, ResolveError> {
        self.member(id).ok_or(ResolveError::MemberNotFound(id))
    }

    pub fn require_email(&self, email: &str) -> Result<&OrgMember, ResolveError> {
        self.member_by_email(email)
            .ok_or_else(|| ResolveError::MemberEmailNotFound(normalize_email(email)))
    }

    /// Members sorted by email
    pub fn members(&self) -> Vec<&OrgMember> {
        let mut members: Vec<&OrgMember> = self.members.values().collect();
        members.sort_by(|a, b| a.email.cmp(&b.email));
        members
    }

    /// Immediate manager of `id`, ignoring references to members outside the graph
    pub fn manager_of(&self, id: Uuid) -> Option<Uuid> {
        self.members
            .get(&id)
            .and_then(|member| member.manager_id)
            .filter(|manager_id| self.members.contains_key(manager_id))
    }

    /// Walk manager links upward from `id`
    pub fn manager_chain(&self, id: Uuid) -> Result<ManagerChain, ResolveError> {
        self.require(id)?;

        let mut visited = HashSet::from([id]);
        let mut links = Vec::new();
        let mut current = id;

        while let Some(manager_id) = self.manager_of(current) {
            if !visited.insert(manager_id) {
                trace!("Cycle detected walking chain of {} at {}", id, manager_id);
                return Err(ResolveError::CycleDetected { member: id });
            }
            links.push(ChainLink {
                manager_id,
                distance: links.len() as u32 + 1,
            });
            current = manager_id;
        }

        Ok(ManagerChain { subject: id, links })
    }

    /// Members whose immediate manager is `id`, sorted by email
    pub fn direct_reports(&self, id: Uuid) -> Result<Vec<&OrgMember>, ResolveError> {
        self.require(id)?;

        let mut reports: Vec<&OrgMember> = self
            .members
            .values()
            .filter(|member| member.manager_id == Some(id))
            .collect();
        reports.sort_by(|a, b| a.email.cmp(&b.email));
        Ok(reports)
    }

    /// Every distinct manager cycle in the stored data
    ///
    /// Each cycle is listed once, starting from its member with the lowest email.
    pub fn find_cycles(&self) -> Vec<Vec<Uuid>> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            OnPath,
            Done,
        }

        let mut marks: HashMap<Uuid, Mark> = HashMap::new();
        let mut cycles = Vec::new();

        for start in self.members() {
            if marks.contains_key(&start.id) {
                continue;
            }

            let mut path: Vec<Uuid> = Vec::new();
            let mut current = Some(start.id);

            while let Some(id) = current {
                match marks.get(&id) {
                    Some(Mark::Done) => break,
                    Some(Mark::OnPath) => {
                        if let Some(pos) = path.iter().position(|p| *p == id) {
                            cycles.push(self.rotate_to_lowest_email(&path[pos..]));
                        }
                        break;
                    }
                    None => {
                        marks.insert(id, Mark::OnPath);
                        path.push(id);
                        current = self.manager_of(id);
                    }
                }
            }

            for id in path {
                marks.insert(id, Mark::Done);
            }
        }

        cycles
    }

    fn rotate_to_lowest_email(&self, cycle: &[Uuid]) -> Vec<Uuid> {
        let start = cycle
            .iter()
            .enumerate()
            .min_by_key(|(_, id)| self.members.get(id).map(|m| m.email.as_str()))
            .map(|(pos, _)| pos)
            .unwrap_or(0);

        cycle[start..]
            .iter()
            .chain(cycle[..start].iter())
            .copied()
            .collect()
    }
}
