//! Property tests over randomly generated dependency DAGs.

use modquery_core::{EnumerationLimits, ErrorKind, QueryEngine, ResolveOptions, Resolver};
use modquery_graph::{ModuleKey, Snapshot};
use modquery_test_utils::GraphFixture;
use proptest::prelude::*;
use proptest::sample::Index;

/// Node 0 is the root; every other node gets one parent with a smaller
/// index, so the graph is acyclic and fully reachable.
fn node(i: usize) -> String {
    if i == 0 {
        "<root>".to_string()
    } else {
        format!("m{i}@1.0")
    }
}

fn build_dag(n: usize, parents: &[Index], extra: &[(Index, Index)]) -> Snapshot {
    let mut fixture = GraphFixture::new();
    for j in 1..n {
        let parent = parents[j].index(j);
        fixture = fixture.dep(&node(parent), &format!("m{j}"), &node(j));
    }
    for (a, b) in extra {
        let (i, k) = (a.index(n), b.index(n));
        if i != k {
            let (from, to) = (i.min(k), i.max(k));
            if to != 0 {
                fixture = fixture.dep(&node(from), &format!("m{to}"), &node(to));
            }
        }
    }
    fixture.build()
}

fn dag() -> impl Strategy<Value = (usize, Snapshot)> {
    (
        2usize..8,
        proptest::collection::vec(any::<Index>(), 8),
        proptest::collection::vec((any::<Index>(), any::<Index>()), 0..16),
    )
        .prop_map(|(n, parents, extra)| (n, build_dag(n, &parents, &extra)))
}

fn unlimited(snapshot: &Snapshot) -> QueryEngine<'_> {
    QueryEngine::new(snapshot).with_limits(EnumerationLimits {
        max_paths: usize::MAX,
        max_steps: usize::MAX,
    })
}

/// Key sequence from the first root down to entry `index`.
fn ancestry(entries: &[modquery_core::TreeEntry], index: usize) -> Vec<ModuleKey> {
    let mut chain = vec![entries[index].key.clone()];
    let mut depth = entries[index].depth;
    for entry in entries[..index].iter().rev() {
        if depth == 0 {
            break;
        }
        if entry.depth == depth - 1 {
            chain.push(entry.key.clone());
            depth -= 1;
        }
    }
    chain.reverse();
    chain
}

proptest! {
    #[test]
    fn tree_expands_each_module_once_at_smallest_path((n, snapshot) in dag()) {
        let engine = unlimited(&snapshot);
        let tree = engine.tree(&[ModuleKey::ROOT], usize::MAX).unwrap();

        for i in 0..n {
            let key: ModuleKey = node(i).parse().unwrap();
            let occurrences: Vec<usize> = tree
                .entries
                .iter()
                .enumerate()
                .filter(|(_, e)| e.key == key)
                .map(|(idx, _)| idx)
                .collect();
            prop_assert!(!occurrences.is_empty(), "{key} missing from tree");

            let expanded: Vec<usize> = occurrences
                .iter()
                .copied()
                .filter(|&idx| !tree.entries[idx].reference_only)
                .collect();
            prop_assert_eq!(expanded.len(), 1);
            prop_assert_eq!(expanded[0], occurrences[0]);

            let smallest = engine
                .all_paths(&[ModuleKey::ROOT], &[key.clone()], usize::MAX)
                .unwrap()
                .paths
                .into_iter()
                .map(|p| p.nodes)
                .min()
                .unwrap();
            prop_assert_eq!(ancestry(&tree.entries, expanded[0]), smallest);
        }
    }

    #[test]
    fn path_is_shortest_and_smallest((n, snapshot) in dag(), a in any::<Index>(), b in any::<Index>()) {
        let engine = unlimited(&snapshot);
        let from: ModuleKey = node(a.index(n)).parse().unwrap();
        let to: ModuleKey = node(b.index(n)).parse().unwrap();

        let path = engine.path(&[from.clone()], &[to.clone()], usize::MAX).unwrap();
        let all = engine.all_paths(&[from.clone()], &[to.clone()], usize::MAX).unwrap();
        let best = all
            .paths
            .iter()
            .map(|p| (p.nodes.len(), p.nodes.clone()))
            .min()
            .map(|(_, nodes)| nodes);
        prop_assert_eq!(path.map(|p| p.nodes), best);
    }

    #[test]
    fn path_is_not_symmetric((n, snapshot) in dag(), a in any::<Index>(), b in any::<Index>()) {
        let engine = unlimited(&snapshot);
        let x: ModuleKey = node(a.index(n)).parse().unwrap();
        let y: ModuleKey = node(b.index(n)).parse().unwrap();
        prop_assume!(x != y);

        let forward = engine.path(&[x.clone()], &[y.clone()], usize::MAX).unwrap();
        let backward = engine.path(&[y], &[x], usize::MAX).unwrap();
        prop_assert!(forward.is_none() || backward.is_none());
    }

    #[test]
    fn all_paths_to_self_is_single_node((n, snapshot) in dag(), a in any::<Index>(), depth in 0usize..4) {
        let key: ModuleKey = node(a.index(n)).parse().unwrap();
        let result = unlimited(&snapshot).all_paths(&[key.clone()], &[key.clone()], depth).unwrap();
        prop_assert_eq!(result.paths.len(), 1);
        prop_assert_eq!(&result.paths[0].nodes, &vec![key]);
        prop_assert!(result.paths[0].edges.is_empty());
    }

    #[test]
    fn bare_name_matches_qualified_form((_n, snapshot) in dag()) {
        let resolver = Resolver::at_root(&snapshot);
        for (name, key) in snapshot.graph().root().deps() {
            let bare = resolver.resolve_modules(name, ResolveOptions::used_only()).unwrap();
            let qualified = resolver
                .resolve_modules(&key.to_string(), ResolveOptions::used_only())
                .unwrap();
            prop_assert_eq!(bare, qualified);
        }
    }

    #[test]
    fn absent_names_are_not_found((_n, snapshot) in dag(), include_unused in any::<bool>()) {
        let resolver = Resolver::at_root(&snapshot);
        let err = resolver
            .resolve_modules("absent", ResolveOptions::new(include_unused, false))
            .unwrap_err();
        prop_assert_eq!(err.kind(), ErrorKind::ModuleNotFound);
    }
}
