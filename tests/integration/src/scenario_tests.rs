//! End-to-end scenarios run through query dispatch.

use modquery_core::dispatch::{self, QueryOutcome};
use modquery_core::{
    EdgeCause, Error, ErrorKind, Interrupt, QueryOptions, QueryRequest, StaticRepoRules,
};
use modquery_graph::Snapshot;
use modquery_test_utils::{GraphFixture, ext, key};
use pretty_assertions::assert_eq;

fn query(snapshot: &Snapshot, residue: &[&str], options: QueryOptions) -> Result<QueryOutcome, Error> {
    let residue: Vec<String> = residue.iter().map(|s| s.to_string()).collect();
    let request = QueryRequest::from_residue(&residue, options)?;
    dispatch::run(snapshot, &request, &StaticRepoRules::default(), &Interrupt::new())
}

fn keys(outcome: &QueryOutcome) -> Vec<String> {
    match outcome {
        QueryOutcome::Tree(tree) => tree.entries.iter().map(|e| e.key.to_string()).collect(),
        QueryOutcome::Path(Some(path)) => path.nodes.iter().map(ToString::to_string).collect(),
        other => panic!("unexpected outcome {other:?}"),
    }
}

// =============================================================================
// Version selection: <root> -> a@1.0 -> b@2.0, with b@1.0 discarded
// =============================================================================

#[test]
fn test_selection_tree() {
    let snapshot = GraphFixture::basic();
    let outcome = query(&snapshot, &["tree"], QueryOptions::default()).unwrap();
    assert_eq!(keys(&outcome), vec!["<root>", "a@1.0", "b@2.0"]);
}

#[test]
fn test_selection_deps() {
    let snapshot = GraphFixture::basic();
    let outcome = query(&snapshot, &["deps", "a@1.0"], QueryOptions::default()).unwrap();
    assert_eq!(keys(&outcome), vec!["a@1.0", "b@2.0"]);
}

#[test]
fn test_selection_path() {
    let snapshot = GraphFixture::basic();
    let outcome = query(&snapshot, &["path", "b@2.0"], QueryOptions::default()).unwrap();
    assert_eq!(keys(&outcome), vec!["<root>", "a@1.0", "b@2.0"]);
}

#[test]
fn test_bare_name_is_relative_to_base_module() {
    let snapshot = GraphFixture::basic();
    let err = query(&snapshot, &["deps", "b"], QueryOptions::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ModuleNotFound);

    let options = QueryOptions {
        include_unused: true,
        ..QueryOptions::default()
    };
    let err = query(&snapshot, &["deps", "b"], options).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ModuleNotFound);
}

// =============================================================================
// Extension filter
// =============================================================================

#[test]
fn test_filter_prunes_other_extensions_but_not_direct_edges() {
    let snapshot = GraphFixture::extensions();
    let options = QueryOptions {
        extension_filter: Some("tools@1.0%ext1".to_string()),
        ..QueryOptions::default()
    };
    let QueryOutcome::AllPaths(result) =
        query(&snapshot, &["all_paths", "other@1.0"], options.clone()).unwrap()
    else {
        panic!("expected all paths");
    };
    let rendered: Vec<Vec<String>> = result
        .paths
        .iter()
        .map(|p| p.nodes.iter().map(ToString::to_string).collect())
        .collect();
    assert_eq!(rendered, vec![vec!["<root>", "tools@1.0", "other@1.0"]]);

    let outcome = query(&snapshot, &["tree"], options).unwrap();
    assert_eq!(
        keys(&outcome),
        vec!["<root>", "lib@1.0", "gen@1.0", "tools@1.0", "other@1.0"]
    );
}

#[test]
fn test_node_reachable_by_direct_edge_survives_filter() {
    let snapshot = GraphFixture::extensions();
    let options = QueryOptions {
        extension_filter: Some("tools@1.0%ext1".to_string()),
        ..QueryOptions::default()
    };
    let outcome = query(&snapshot, &["path", "other@1.0"], options).unwrap();
    assert_eq!(keys(&outcome), vec!["<root>", "tools@1.0", "other@1.0"]);
}

#[test]
fn test_explain_annotates_extension_edges() {
    let snapshot = GraphFixture::extensions();
    let QueryOutcome::AllPaths(result) =
        query(&snapshot, &["explain", "gen@1.0"], QueryOptions::default()).unwrap()
    else {
        panic!("expected all paths");
    };
    assert_eq!(result.paths.len(), 1);
    assert_eq!(
        result.paths[0].edges,
        vec![EdgeCause::Direct, EdgeCause::Extension(ext("tools@1.0%ext1"))]
    );
    assert_eq!(result.target_trees.len(), 1);
}

#[test]
fn test_unknown_filter_extension() {
    let snapshot = GraphFixture::extensions();
    let options = QueryOptions {
        extension_filter: Some("tools@1.0%ext3".to_string()),
        ..QueryOptions::default()
    };
    let err = query(&snapshot, &["tree"], options).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ExtensionNotFound);
    assert!(err.to_string().starts_with("in --extension-filter"));
}

// =============================================================================
// Extension usages
// =============================================================================

#[test]
fn test_show_extension_for_one_user() {
    let snapshot = GraphFixture::extensions();
    let options = QueryOptions {
        extension_usages: "lib@1.0".to_string(),
        ..QueryOptions::default()
    };
    let QueryOutcome::ShowExtension(reports) =
        query(&snapshot, &["show_extension", "tools@1.0%ext1"], options).unwrap()
    else {
        panic!("expected extension reports");
    };
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].usages.len(), 1);
    assert_eq!(reports[0].usages[0].module, key("lib@1.0"));
    let repos: Vec<&str> = reports[0].usages[0]
        .repos
        .iter()
        .map(|r| r.name.as_str())
        .collect();
    assert_eq!(repos, vec!["lib_extra", "lib_repo"]);
    assert!(!reports[0].generated.contains("root_repo"));
}

#[test]
fn test_show_extension_without_usages_is_empty() {
    let snapshot = GraphFixture::extensions();
    let options = QueryOptions {
        extension_usages: "<root>".to_string(),
        ..QueryOptions::default()
    };
    let QueryOutcome::ShowExtension(reports) =
        query(&snapshot, &["show_extension", "tools%ext2"], options).unwrap()
    else {
        panic!("expected extension reports");
    };
    assert!(reports[0].is_empty());
}

#[test]
fn test_bad_extension_reference_syntax() {
    let snapshot = GraphFixture::extensions();
    let err = query(&snapshot, &["show_extension", "tools@1.0"], QueryOptions::default())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidReferenceSyntax);
    assert!(err.to_string().contains("in extension argument 'tools@1.0'"));
}

// =============================================================================
// JSON round trip of a snapshot built from a fixture file
// =============================================================================

#[test]
fn test_fixture_file_matches_builder() {
    let content = std::fs::read_to_string(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/../../test-fixtures/graphs/diamond.json"
    ))
    .unwrap();
    let (from_file, _) = modquery_graph::SnapshotFile::parse(&content)
        .unwrap()
        .into_snapshot()
        .unwrap();
    let from_builder = GraphFixture::diamond();

    let tree = |snapshot: &Snapshot| keys(&query(snapshot, &["tree"], QueryOptions::default()).unwrap());
    assert_eq!(tree(&from_file), tree(&from_builder));
}
