//! Shortest dependency path.

use std::collections::{BTreeMap, BTreeSet};

use modquery_graph::ModuleKey;

use super::QueryEngine;
use super::all_paths::AnnotatedPath;
use crate::error::Result;
use crate::filter::EdgeCause;

impl QueryEngine<'_> {
    /// Find the shortest walk of at most `depth` nodes from any `from` key to
    /// any `to` key, following dependency direction.
    ///
    /// Among walks of equal length the lexicographically smallest key
    /// sequence wins. `None` means no such walk exists.
    pub fn path(
        &self,
        from: &[ModuleKey],
        to: &[ModuleKey],
        depth: usize,
    ) -> Result<Option<AnnotatedPath>> {
        let targets: BTreeSet<&ModuleKey> = to.iter().collect();
        let starts: BTreeSet<&ModuleKey> = from.iter().collect();
        let mut frontier: Vec<&ModuleKey> = starts.into_iter().collect();
        let mut parents: BTreeMap<&ModuleKey, Option<(&ModuleKey, EdgeCause)>> =
            frontier.iter().map(|key| (*key, None)).collect();
        let mut length = 1;

        // Frontiers are generated in lexicographic order of their paths, so
        // the first hit in a layer is the smallest path of that length.
        while length <= depth && !frontier.is_empty() {
            self.interrupt.check("path search")?;
            if let Some(hit) = frontier.iter().find(|key| targets.contains(*key)) {
                let path = walk_back(*hit, &parents);
                tracing::debug!(nodes = path.nodes.len(), "Found shortest path");
                return Ok(Some(path));
            }

            let mut next = Vec::new();
            for key in &frontier {
                for (child, cause) in self.edges(key) {
                    if !parents.contains_key(child) {
                        parents.insert(child, Some((*key, cause)));
                        next.push(child);
                    }
                }
            }
            frontier = next;
            length += 1;
        }

        tracing::debug!(depth, "No path found");
        Ok(None)
    }
}

fn walk_back<'k>(
    target: &'k ModuleKey,
    parents: &BTreeMap<&'k ModuleKey, Option<(&'k ModuleKey, EdgeCause)>>,
) -> AnnotatedPath {
    let mut nodes = vec![target.clone()];
    let mut edges = Vec::new();
    let mut current = target;
    while let Some(Some((parent, cause))) = parents.get(current) {
        nodes.push((*parent).clone());
        edges.push(cause.clone());
        current = *parent;
    }
    nodes.reverse();
    edges.reverse();
    AnnotatedPath { nodes, edges }
}
