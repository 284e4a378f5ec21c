//! Explore → cube join resolution
//!
//! Source joins are stated relative to the explore's traversal: the
//! relationship describes the joined view as seen from the view it joins
//! from. Cube joins are declared on the owning cube and state the
//! relationship from the owner's side, so every edge goes through
//! [`target_relationship`].
//!
//! Resolution is atomic per explore: the first malformed rule fails the
//! whole explore and no edges are returned for it.

use lkml2cube_core::{CubeJoin, Explore, IntermediateModel, JoinRule, Relationship, TranslateError};
use crate::join_tree::JoinTree;

/// Which side of a join rule the emitted edge is declared on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraversalRole {
    /// Declared on the view the rule joins from
    Owner,

    /// Declared on the joined view
    Joined,
}

/// Relationship of a target edge, given the source relationship and the
/// side the edge is declared on
pub fn target_relationship(source: Relationship, role: TraversalRole) -> Relationship {
    match role {
        TraversalRole::Owner => source.reverse(),
        TraversalRole::Joined => source,
    }
}

/// A directed join from one cube to another
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinEdge {
    /// Cube that declares the join
    pub owner: String,

    /// Cube being joined
    pub target: String,

    /// Cardinality from the owner's side
    pub relationship: Relationship,

    /// Join predicate, verbatim
    pub sql: String,
}

impl JoinEdge {
    /// Build the edge for a rule, declared on the given side
    pub fn from_rule(rule: &JoinRule, role: TraversalRole) -> Self {
        let (owner, target) = match role {
            TraversalRole::Owner => (&rule.join_from, &rule.joined_view),
            TraversalRole::Joined => (&rule.joined_view, &rule.join_from),
        };

        Self {
            owner: owner.clone(),
            target: target.clone(),
            relationship: target_relationship(rule.relationship, role),
            sql: rule.sql_on.clone(),
        }
    }

    /// The cube join declared on the owner
    pub fn to_cube_join(&self) -> CubeJoin {
        CubeJoin {
            name: self.target.clone(),
            sql: self.sql.clone(),
            relationship: self.relationship,
        }
    }
}

/// Result of resolving one explore
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedExplore {
    /// Explore name
    pub explore: String,

    /// Views reached by the explore, root first, in traversal order
    pub views: Vec<String>,

    /// Join edges in rule order
    pub edges: Vec<JoinEdge>,
}

/// Resolve an explore's join rules into directed cube join edges
pub fn resolve_joins(
    explore: &Explore,
    model: &IntermediateModel,
) -> Result<ResolvedExplore, TranslateError> {
    model.view(&explore.root_view, &format!("explore '{}'", explore.name))?;

    let mut tree = JoinTree::new(&explore.root_view);
    let mut edges = Vec::with_capacity(explore.joins.len());

    for rule in &explore.joins {
        let referenced_by = format!(
            "join '{}' in explore '{}'",
            rule.joined_view, explore.name
        );
        model.view(&rule.joined_view, &referenced_by)?;
        model.view(&rule.join_from, &referenced_by)?;

        if rule.joined_view == rule.join_from {
            return Err(TranslateError::SelfJoin {
                explore: explore.name.clone(),
                view: rule.joined_view.clone(),
            });
        }

        if !tree.contains(&rule.join_from) {
            return Err(TranslateError::JoinOrderError {
                explore: explore.name.clone(),
                view: rule.joined_view.clone(),
                join_from: rule.join_from.clone(),
            });
        }

        if !tree.insert(&rule.joined_view, &rule.join_from) {
            return Err(TranslateError::DuplicateJoin {
                explore: explore.name.clone(),
                left: rule.join_from.clone(),
                right: rule.joined_view.clone(),
            });
        }

        tracing::trace!(
            explore = %explore.name,
            path = ?tree.path_to_root(&rule.joined_view),
            "Joined view"
        );

        edges.push(JoinEdge::from_rule(rule, TraversalRole::Owner));
    }

    tracing::debug!(
        explore = %explore.name,
        views = tree.views().len(),
        edges = edges.len(),
        "Resolved explore"
    );

    Ok(ResolvedExplore {
        explore: explore.name.clone(),
        views: tree.views().into_iter().map(str::to_string).collect(),
        edges,
    })
}
