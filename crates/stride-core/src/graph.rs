//! Dependency graph over a migration set
//!
//! Node per migration id, edge id -> depends(id). The graph is stored as
//! id-indexed forward and reverse adjacency sets; ordered maps keep every
//! traversal deterministic without extra sorting.

use crate::error::{CoreError, CoreResult};
use crate::migration::MigrationSet;
use crate::migration_id::MigrationId;
use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet, BinaryHeap};

/// DFS marking for cycle detection
#[derive(Clone, Copy, PartialEq)]
enum Mark {
    InProgress,
    Done,
}

/// A directed acyclic graph of migration dependencies
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    /// id -> ids it depends on
    depends: BTreeMap<MigrationId, BTreeSet<MigrationId>>,
    /// id -> ids that depend on it
    dependents: BTreeMap<MigrationId, BTreeSet<MigrationId>>,
}

impl DependencyGraph {
    /// Build and validate the graph from a loaded set.
    ///
    /// Rejects dangling dependencies and cycles; duplicate ids cannot occur
    /// because [`MigrationSet`] rejects them at insertion.
    pub fn build(set: &MigrationSet) -> CoreResult<Self> {
        set.validate()?;

        let mut depends: BTreeMap<MigrationId, BTreeSet<MigrationId>> = BTreeMap::new();
        let mut dependents: BTreeMap<MigrationId, BTreeSet<MigrationId>> = BTreeMap::new();

        for migration in set.iter() {
            depends.insert(migration.id.clone(), migration.depends.clone());
            dependents.entry(migration.id.clone()).or_default();
            for dep in &migration.depends {
                dependents
                    .entry(dep.clone())
                    .or_default()
                    .insert(migration.id.clone());
            }
        }

        let graph = Self {
            depends,
            dependents,
        };
        graph.validate()?;
        Ok(graph)
    }

    /// Validate the graph has no cycles.
    pub fn validate(&self) -> CoreResult<()> {
        match self.find_cycle() {
            Some(cycle) => Err(CoreError::CircularDependency {
                cycle: render_cycle(&cycle),
            }),
            None => Ok(()),
        }
    }

    /// Find one dependency cycle, returning every id on it in walk order.
    ///
    /// Depth-first traversal with in-progress/done marking; unmarked nodes
    /// are unvisited. Hitting an in-progress node closes a cycle, and the
    /// ids on the stack from that node onward are exactly its members.
    fn find_cycle(&self) -> Option<Vec<MigrationId>> {
        let mut marks: BTreeMap<&MigrationId, Mark> = BTreeMap::new();
        let mut stack: Vec<&MigrationId> = Vec::new();

        for id in self.depends.keys() {
            if !marks.contains_key(id) {
                if let Some(cycle) = self.dfs_cycle(id, &mut marks, &mut stack) {
                    return Some(cycle);
                }
            }
        }
        None
    }

    fn dfs_cycle<'a>(
        &'a self,
        id: &'a MigrationId,
        marks: &mut BTreeMap<&'a MigrationId, Mark>,
        stack: &mut Vec<&'a MigrationId>,
    ) -> Option<Vec<MigrationId>> {
        marks.insert(id, Mark::InProgress);
        stack.push(id);

        if let Some(deps) = self.depends.get(id) {
            for dep in deps {
                match marks.get(dep).copied() {
                    Some(Mark::Done) => {}
                    Some(Mark::InProgress) => {
                        let start = stack.iter().position(|s| *s == dep).unwrap_or(0);
                        return Some(stack[start..].iter().map(|s| (*s).clone()).collect());
                    }
                    None => {
                        if let Some(cycle) = self.dfs_cycle(dep, marks, stack) {
                            return Some(cycle);
                        }
                    }
                }
            }
        }

        stack.pop();
        marks.insert(id, Mark::Done);
        None
    }

    /// Ids in topological order, dependencies first.
    ///
    /// Kahn's algorithm with the ready set held in a min-heap keyed by id,
    /// so ties among ready nodes break by ascending id and the order is
    /// reproducible across runs.
    pub fn topological_order(&self) -> CoreResult<Vec<MigrationId>> {
        let mut in_degree: BTreeMap<&MigrationId, usize> = self
            .depends
            .iter()
            .map(|(id, deps)| (id, deps.len()))
            .collect();

        let mut ready: BinaryHeap<Reverse<&MigrationId>> = in_degree
            .iter()
            .filter(|(_, degree)| **degree == 0)
            .map(|(id, _)| Reverse(*id))
            .collect();

        let mut order = Vec::with_capacity(self.depends.len());
        while let Some(Reverse(id)) = ready.pop() {
            order.push(id.clone());
            if let Some(dependents) = self.dependents.get(id) {
                for dependent in dependents {
                    if let Some(degree) = in_degree.get_mut(dependent) {
                        *degree -= 1;
                        if *degree == 0 {
                            ready.push(Reverse(dependent));
                        }
                    }
                }
            }
        }

        if order.len() == self.depends.len() {
            Ok(order)
        } else {
            let cycle = self
                .find_cycle()
                .map(|c| render_cycle(&c))
                .unwrap_or_else(|| "<unresolved>".to_string());
            Err(CoreError::CircularDependency { cycle })
        }
    }

    /// Ids with no dependent, in ascending order.
    pub fn heads(&self) -> Vec<MigrationId> {
        self.dependents
            .iter()
            .filter(|(_, dependents)| dependents.is_empty())
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// The single head, used as the default dependency for a new migration.
    ///
    /// Returns `None` for an empty graph and refuses to pick arbitrarily
    /// when more than one head exists.
    pub fn default_head(&self) -> CoreResult<Option<MigrationId>> {
        let mut heads = self.heads();
        match heads.len() {
            0 | 1 => Ok(heads.pop()),
            _ => Err(CoreError::AmbiguousHeads {
                heads: heads
                    .iter()
                    .map(|h| h.to_string())
                    .collect::<Vec<_>>()
                    .join(", "),
            }),
        }
    }

    /// Splice a migration out of the graph.
    ///
    /// Every dependent of `id` is rewritten to depend on `id`'s own
    /// dependencies instead, preserving transitive reachability. Returns the
    /// rewritten `(dependent, new full depends)` pairs so callers can
    /// persist them. Removing an unknown id fails, never a silent no-op.
    pub fn remove(&mut self, id: &str) -> CoreResult<Vec<(MigrationId, BTreeSet<MigrationId>)>> {
        let removed_depends = self
            .depends
            .remove(id)
            .ok_or_else(|| CoreError::MigrationNotFound { id: id.to_string() })?;
        let removed_dependents = self.dependents.remove(id).unwrap_or_default();

        for dep in &removed_depends {
            if let Some(dependents) = self.dependents.get_mut(dep) {
                dependents.remove(id);
            }
        }

        let mut rewritten = Vec::new();
        for dependent in &removed_dependents {
            if let Some(deps) = self.depends.get_mut(dependent) {
                deps.remove(id);
                deps.extend(removed_depends.iter().cloned());
                rewritten.push((dependent.clone(), deps.clone()));
            }
            for dep in &removed_depends {
                if let Some(dependents) = self.dependents.get_mut(dep) {
                    dependents.insert(dependent.clone());
                }
            }
        }

        self.validate()?;
        Ok(rewritten)
    }

    /// Direct dependencies of an id.
    pub fn depends_of(&self, id: &str) -> Vec<MigrationId> {
        self.depends
            .get(id)
            .map(|deps| deps.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Direct dependents of an id.
    pub fn dependents_of(&self, id: &str) -> Vec<MigrationId> {
        self.dependents
            .get(id)
            .map(|deps| deps.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// True when the id is a node in the graph.
    pub fn contains(&self, id: &str) -> bool {
        self.depends.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.depends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.depends.is_empty()
    }
}

/// Render a cycle as `a -> b -> c -> a`.
fn render_cycle(cycle: &[MigrationId]) -> String {
    let mut path: Vec<&str> = cycle.iter().map(|id| id.as_str()).collect();
    if let Some(first) = path.first().copied() {
        path.push(first);
    }
    path.join(" -> ")
}

#[cfg(test)]
#[path = "graph_test.rs"]
mod tests;
