//! Enumeration of annotated simple paths.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use indexmap::IndexSet;
use modquery_graph::ModuleKey;
use serde::Serialize;

use super::QueryEngine;
use super::tree::Tree;
use crate::error::Result;
use crate::filter::EdgeCause;

/// A walk through the graph with the cause of each edge.
///
/// `edges[i]` explains the step from `nodes[i]` to `nodes[i + 1]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnnotatedPath {
    pub nodes: Vec<ModuleKey>,
    pub edges: Vec<EdgeCause>,
}

impl AnnotatedPath {
    pub fn first(&self) -> Option<&ModuleKey> {
        self.nodes.first()
    }

    pub fn last(&self) -> Option<&ModuleKey> {
        self.nodes.last()
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Result of an all-paths enumeration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AllPaths {
    /// Paths in lexicographic order of their node sequences.
    pub paths: Vec<AnnotatedPath>,
    /// Enumeration stopped at the configured ceiling.
    pub truncated: bool,
    /// Dependency subtree of every reached target, in order of first arrival.
    pub target_trees: Tree,
}

impl QueryEngine<'_> {
    /// Enumerate every simple walk from a `from` key to a `to` key.
    ///
    /// A walk ends at the first target it reaches. The enumeration stops
    /// early, flagging `truncated`, once it exceeds the configured limits.
    /// `depth` bounds the subtree listed for each reached target.
    pub fn all_paths(&self, from: &[ModuleKey], to: &[ModuleKey], depth: usize) -> Result<AllPaths> {
        let starts: BTreeSet<&ModuleKey> = from.iter().collect();
        let targets: BTreeSet<&ModuleKey> = to.iter().collect();
        let useful = self.nodes_reaching(&starts, &targets)?;
        tracing::debug!(
            starts = starts.len(),
            targets = targets.len(),
            useful = useful.len(),
            "Enumerating all paths"
        );

        let mut walk = Enumeration {
            engine: self,
            targets: &targets,
            useful: &useful,
            nodes: Vec::new(),
            on_walk: BTreeSet::new(),
            edges: Vec::new(),
            paths: Vec::new(),
            steps: 0,
            truncated: false,
        };
        for start in starts.iter().copied().filter(|key| useful.contains(key)) {
            walk.walk_from(start)?;
            if walk.truncated {
                tracing::warn!(
                    paths = walk.paths.len(),
                    steps = walk.steps,
                    "Path enumeration truncated"
                );
                break;
            }
        }

        let reached: IndexSet<ModuleKey> = walk
            .paths
            .iter()
            .filter_map(|path| path.last().cloned())
            .collect();
        let reached: Vec<ModuleKey> = reached.into_iter().collect();
        let target_trees = self.tree(&reached, depth)?;

        Ok(AllPaths {
            paths: walk.paths,
            truncated: walk.truncated,
            target_trees,
        })
    }

    /// Nodes reachable from `starts` that can themselves reach a target.
    fn nodes_reaching<'k>(
        &'k self,
        starts: &BTreeSet<&'k ModuleKey>,
        targets: &BTreeSet<&'k ModuleKey>,
    ) -> Result<BTreeSet<&'k ModuleKey>> {
        let mut reachable: BTreeSet<&ModuleKey> = starts.clone();
        let mut reverse: BTreeMap<&ModuleKey, Vec<&ModuleKey>> = BTreeMap::new();
        let mut queue: VecDeque<&ModuleKey> = starts.iter().copied().collect();
        while let Some(key) = queue.pop_front() {
            self.interrupt.check("path pruning")?;
            for (child, _) in self.edges(key) {
                reverse.entry(child).or_default().push(key);
                if reachable.insert(child) {
                    queue.push_back(child);
                }
            }
        }

        let mut useful: BTreeSet<&ModuleKey> = targets
            .iter()
            .copied()
            .filter(|key| reachable.contains(key))
            .collect();
        let mut queue: VecDeque<&ModuleKey> = useful.iter().copied().collect();
        while let Some(key) = queue.pop_front() {
            for parent in reverse.get(key).into_iter().flatten().copied() {
                if useful.insert(parent) {
                    queue.push_back(parent);
                }
            }
        }
        Ok(useful)
    }
}

struct Enumeration<'e, 'k> {
    engine: &'e QueryEngine<'k>,
    targets: &'e BTreeSet<&'k ModuleKey>,
    useful: &'e BTreeSet<&'k ModuleKey>,
    nodes: Vec<&'k ModuleKey>,
    on_walk: BTreeSet<&'k ModuleKey>,
    edges: Vec<EdgeCause>,
    paths: Vec<AnnotatedPath>,
    steps: usize,
    truncated: bool,
}

/// Children still to be tried below one node of the current walk.
type Frame<'k> = std::vec::IntoIter<(&'k ModuleKey, EdgeCause)>;

impl<'k> Enumeration<'_, 'k> {
    /// Depth-first enumeration from `start` with an explicit frame stack, so
    /// long chains never grow the call stack.
    fn walk_from(&mut self, start: &'k ModuleKey) -> Result<()> {
        let mut stack: Vec<Frame<'k>> = Vec::new();
        if let Some(frame) = self.enter(start, None)? {
            stack.push(frame);
        }
        while let Some(frame) = stack.last_mut() {
            if self.truncated {
                break;
            }
            match frame.next() {
                Some((child, cause)) => {
                    if self.useful.contains(child) && !self.on_walk.contains(child) {
                        if let Some(frame) = self.enter(child, Some(cause))? {
                            stack.push(frame);
                        }
                    }
                }
                None => {
                    stack.pop();
                    self.leave();
                }
            }
        }
        self.nodes.clear();
        self.on_walk.clear();
        self.edges.clear();
        Ok(())
    }

    /// Extend the walk by `key`. Returns the children to explore, or `None`
    /// when the walk ended here.
    fn enter(
        &mut self,
        key: &'k ModuleKey,
        cause: Option<EdgeCause>,
    ) -> Result<Option<Frame<'k>>> {
        self.steps += 1;
        if self.steps > self.engine.limits.max_steps {
            self.truncated = true;
            return Ok(None);
        }
        self.engine.interrupt.check("path enumeration")?;

        self.nodes.push(key);
        self.on_walk.insert(key);
        self.edges.extend(cause);
        if self.targets.contains(key) {
            self.record();
            self.leave();
            return Ok(None);
        }
        Ok(Some(self.engine.edges(key).into_iter()))
    }

    fn leave(&mut self) {
        if let Some(key) = self.nodes.pop() {
            self.on_walk.remove(key);
        }
        self.edges.truncate(self.nodes.len().saturating_sub(1));
    }

    fn record(&mut self) {
        if self.paths.len() >= self.engine.limits.max_paths {
            self.truncated = true;
            return;
        }
        self.paths.push(AnnotatedPath {
            nodes: self.nodes.iter().map(|key| (*key).clone()).collect(),
            edges: self.edges.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::ExtensionFilter;
    use crate::options::EnumerationLimits;
    use modquery_test_utils::{GraphFixture, ext, key};
    use pretty_assertions::assert_eq;

    fn rendered(result: &AllPaths) -> Vec<String> {
        result
            .paths
            .iter()
            .map(|path| {
                path.nodes
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(" -> ")
            })
            .collect()
    }

    #[test]
    fn test_diamond_has_two_paths() {
        let snapshot = GraphFixture::diamond();
        let result = QueryEngine::new(&snapshot)
            .all_paths(&[ModuleKey::ROOT], &[key("d@1.0")], usize::MAX)
            .unwrap();
        assert_eq!(
            rendered(&result),
            vec![
                "<root> -> a@1.0 -> c@1.0 -> d@1.0",
                "<root> -> b@1.0 -> c@1.0 -> d@1.0",
            ]
        );
        assert!(!result.truncated);
        assert_eq!(result.paths[0].edges, vec![EdgeCause::Direct; 3]);
    }

    #[test]
    fn test_same_start_and_target() {
        let snapshot = GraphFixture::diamond();
        let result = QueryEngine::new(&snapshot)
            .all_paths(&[key("a@1.0")], &[key("a@1.0")], usize::MAX)
            .unwrap();
        assert_eq!(rendered(&result), vec!["a@1.0"]);
        assert!(result.paths[0].edges.is_empty());
    }

    #[test]
    fn test_walks_stop_at_first_target() {
        let snapshot = GraphFixture::diamond();
        let result = QueryEngine::new(&snapshot)
            .all_paths(&[ModuleKey::ROOT], &[key("c@1.0"), key("d@1.0")], usize::MAX)
            .unwrap();
        assert_eq!(
            rendered(&result),
            vec!["<root> -> a@1.0 -> c@1.0", "<root> -> b@1.0 -> c@1.0"]
        );
    }

    #[test]
    fn test_target_trees_follow_depth() {
        let snapshot = GraphFixture::diamond();
        let engine = QueryEngine::new(&snapshot);

        let explain = engine.all_paths(&[ModuleKey::ROOT], &[key("c@1.0")], 1).unwrap();
        assert_eq!(explain.target_trees.len(), 1);
        assert_eq!(explain.target_trees.entries[0].key, key("c@1.0"));

        let full = engine
            .all_paths(&[ModuleKey::ROOT], &[key("c@1.0")], usize::MAX)
            .unwrap();
        let keys: Vec<&ModuleKey> = full.target_trees.entries.iter().map(|e| &e.key).collect();
        assert_eq!(keys, vec![&key("c@1.0"), &key("d@1.0")]);
    }

    #[test]
    fn test_edges_carry_extension_causes() {
        let snapshot = GraphFixture::extensions();
        let result = QueryEngine::new(&snapshot)
            .all_paths(&[ModuleKey::ROOT], &[key("other@1.0")], usize::MAX)
            .unwrap();
        assert_eq!(
            result.paths,
            vec![
                AnnotatedPath {
                    nodes: vec![ModuleKey::ROOT, key("lib@1.0"), key("other@1.0")],
                    edges: vec![
                        EdgeCause::Direct,
                        EdgeCause::Extension(ext("tools@1.0%ext2")),
                    ],
                },
                AnnotatedPath {
                    nodes: vec![ModuleKey::ROOT, key("tools@1.0"), key("other@1.0")],
                    edges: vec![EdgeCause::Direct, EdgeCause::Direct],
                },
            ]
        );

        let filtered = QueryEngine::new(&snapshot)
            .with_filter(ExtensionFilter::finite([ext("tools@1.0%ext1")]))
            .all_paths(&[ModuleKey::ROOT], &[key("other@1.0")], usize::MAX)
            .unwrap();
        assert_eq!(
            rendered(&filtered),
            vec!["<root> -> tools@1.0 -> other@1.0"]
        );
    }

    #[test]
    fn test_unreachable_target_yields_no_paths() {
        let snapshot = GraphFixture::diamond();
        let result = QueryEngine::new(&snapshot)
            .all_paths(&[key("d@1.0")], &[key("a@1.0")], usize::MAX)
            .unwrap();
        assert!(result.paths.is_empty());
        assert!(result.target_trees.is_empty());
        assert!(!result.truncated);
    }

    /// A ladder of `rungs` diamonds has 2^rungs paths from top to bottom.
    fn ladder(rungs: usize) -> modquery_graph::Snapshot {
        let mut fixture = GraphFixture::new().dep("<root>", "n0", "n0@1.0");
        for i in 0..rungs {
            let top = format!("n{i}@1.0");
            let bottom = format!("n{}@1.0", i + 1);
            let left = format!("l{i}@1.0");
            let right = format!("r{i}@1.0");
            fixture = fixture
                .dep(&top, &format!("l{i}"), &left)
                .dep(&top, &format!("r{i}"), &right)
                .dep(&left, &format!("n{}", i + 1), &bottom)
                .dep(&right, &format!("n{}", i + 1), &bottom);
        }
        fixture.build()
    }

    #[test]
    fn test_enumeration_ceiling_truncates() {
        let snapshot = ladder(12);
        let engine = QueryEngine::new(&snapshot).with_limits(EnumerationLimits {
            max_paths: 50,
            max_steps: 100_000,
        });
        let result = engine
            .all_paths(&[ModuleKey::ROOT], &[key("n12@1.0")], usize::MAX)
            .unwrap();
        assert!(result.truncated);
        assert_eq!(result.paths.len(), 50);

        let engine = QueryEngine::new(&snapshot).with_limits(EnumerationLimits {
            max_paths: 100_000,
            max_steps: 200,
        });
        let result = engine
            .all_paths(&[ModuleKey::ROOT], &[key("n12@1.0")], usize::MAX)
            .unwrap();
        assert!(result.truncated);
        assert!(result.paths.len() < 4096);
    }

    #[test]
    fn test_small_ladder_is_complete() {
        let snapshot = ladder(3);
        let result = QueryEngine::new(&snapshot)
            .all_paths(&[ModuleKey::ROOT], &[key("n3@1.0")], usize::MAX)
            .unwrap();
        assert_eq!(result.paths.len(), 8);
        assert!(!result.truncated);
        let mut sorted = result.paths.clone();
        sorted.sort_by(|a, b| a.nodes.cmp(&b.nodes));
        assert_eq!(sorted, result.paths);
    }

    #[test]
    fn test_long_chain_does_not_exhaust_the_stack() {
        let length = 5_000;
        let mut fixture = GraphFixture::new().dep("<root>", "m0", "m0@1.0");
        for i in 1..length {
            let parent = format!("m{}@1.0", i - 1);
            fixture = fixture.dep(&parent, &format!("m{i}"), &format!("m{i}@1.0"));
        }
        let snapshot = fixture.build();
        let last = key(&format!("m{}@1.0", length - 1));

        let result = QueryEngine::new(&snapshot)
            .all_paths(&[ModuleKey::ROOT], &[last.clone()], usize::MAX)
            .unwrap();
        assert!(!result.truncated);
        assert_eq!(result.paths.len(), 1);
        assert_eq!(result.paths[0].len(), length + 1);
        assert_eq!(result.paths[0].edges.len(), length);
        assert_eq!(result.paths[0].last(), Some(&last));
    }

    #[test]
    fn test_long_chain_hits_step_ceiling() {
        let mut fixture = GraphFixture::new().dep("<root>", "m0", "m0@1.0");
        for i in 1..3_000 {
            let parent = format!("m{}@1.0", i - 1);
            fixture = fixture.dep(&parent, &format!("m{i}"), &format!("m{i}@1.0"));
        }
        let snapshot = fixture.build();
        let result = QueryEngine::new(&snapshot)
            .with_limits(EnumerationLimits {
                max_paths: 1_000,
                max_steps: 1_000,
            })
            .all_paths(&[ModuleKey::ROOT], &[key("m2999@1.0")], usize::MAX)
            .unwrap();
        assert!(result.truncated);
        assert!(result.paths.is_empty());
    }
}
