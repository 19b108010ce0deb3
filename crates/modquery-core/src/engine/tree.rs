//! Depth-bounded dependency forests.

use std::collections::BTreeSet;

use indexmap::IndexSet;
use modquery_graph::ModuleKey;
use serde::Serialize;

use super::QueryEngine;
use crate::error::Result;
use crate::filter::EdgeCause;

/// One listed occurrence of a module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeEntry {
    pub key: ModuleKey,
    /// Distance from the tree's root; roots are at depth 0.
    pub depth: usize,
    /// The module's subtree is listed at an earlier occurrence.
    pub reference_only: bool,
    /// How the parent reaches this entry; `None` for roots.
    pub cause: Option<EdgeCause>,
}

/// A forest in pre-order: each root followed by its descendants.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Tree {
    pub entries: Vec<TreeEntry>,
}

impl Tree {
    pub fn roots(&self) -> impl Iterator<Item = &TreeEntry> {
        self.entries.iter().filter(|entry| entry.depth == 0)
    }

    /// Entries whose subtree is listed at this position.
    pub fn expanded(&self) -> impl Iterator<Item = &TreeEntry> {
        self.entries.iter().filter(|entry| !entry.reference_only)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl QueryEngine<'_> {
    /// List the dependency tree of each root, `depth` levels deep.
    ///
    /// A module's subtree is expanded at its first occurrence that has room
    /// below the depth limit; later occurrences under the same root are
    /// listed as reference-only entries.
    pub fn tree(&self, roots: &[ModuleKey], depth: usize) -> Result<Tree> {
        let roots: IndexSet<&ModuleKey> = roots.iter().collect();
        let mut entries = Vec::new();

        for root in roots {
            let mut expanded = BTreeSet::new();
            let mut stack: Vec<(&ModuleKey, usize, Option<EdgeCause>)> = vec![(root, 0, None)];

            while let Some((key, level, cause)) = stack.pop() {
                self.interrupt.check("tree traversal")?;
                if level >= depth {
                    continue;
                }
                let reference_only = expanded.contains(key);
                if !reference_only && level + 1 < depth {
                    expanded.insert(key);
                    let children = self.edges(key);
                    stack.extend(
                        children
                            .into_iter()
                            .rev()
                            .map(|(child, cause)| (child, level + 1, Some(cause))),
                    );
                }
                entries.push(TreeEntry {
                    key: key.clone(),
                    depth: level,
                    reference_only,
                    cause,
                });
            }
        }

        tracing::debug!(entries = entries.len(), depth, "Built dependency tree");
        Ok(Tree { entries })
    }
}
