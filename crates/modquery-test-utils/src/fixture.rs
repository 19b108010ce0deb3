//! [`GraphFixture`] builder for dependency graph scenarios.

use std::collections::{BTreeMap, BTreeSet};

use modquery_graph::{
    ExtensionTag, ExtensionUsage, GraphBuilder, ModuleExtensionId, ModuleKey, ModuleSpec,
    Snapshot,
};

/// Parse a module key, panicking on malformed fixture text.
pub fn key(text: &str) -> ModuleKey {
    text.parse()
        .unwrap_or_else(|e| panic!("bad fixture key '{text}': {e}"))
}

/// Parse an extension id, panicking on malformed fixture text.
pub fn ext(text: &str) -> ModuleExtensionId {
    text.parse()
        .unwrap_or_else(|e| panic!("bad fixture extension '{text}': {e}"))
}

/// Declarative builder for test graphs.
///
/// Modules are created on first mention, so a fixture only lists edges.
///
/// # Example
///
/// ```rust
/// use modquery_test_utils::GraphFixture;
///
/// let snapshot = GraphFixture::new()
///     .dep("<root>", "a", "a@1.0")
///     .dep("a@1.0", "b", "b@2.0")
///     .build();
/// assert_eq!(snapshot.graph().len(), 3);
/// ```
#[derive(Debug, Default)]
pub struct GraphFixture {
    specs: BTreeMap<ModuleKey, ModuleSpec>,
    usages: Vec<(ModuleKey, ModuleExtensionId, ExtensionUsage)>,
}

impl GraphFixture {
    /// Start with just the root module.
    pub fn new() -> Self {
        Self::default().module("<root>")
    }

    fn spec(&mut self, module: &str) -> &mut ModuleSpec {
        let key = key(module);
        self.specs
            .entry(key.clone())
            .or_insert_with(|| ModuleSpec::new(key))
    }

    /// Declare a module without edges.
    pub fn module(mut self, module: &str) -> Self {
        self.spec(module);
        self
    }

    /// `from` depends on `to` under the local name `name`.
    pub fn dep(mut self, from: &str, name: &str, to: &str) -> Self {
        self.spec(to);
        self.spec(from).deps.insert(name.to_string(), key(to));
        self
    }

    /// `from` declared `to` under `name`, but that version lost selection.
    pub fn unused_dep(mut self, from: &str, name: &str, to: &str) -> Self {
        self.spec(to);
        self.spec(from).unused_deps.insert(name.to_string(), key(to));
        self
    }

    /// `from` depends on `to` only because it uses `extension`.
    pub fn ext_dep(mut self, from: &str, name: &str, to: &str, extension: &str) -> Self {
        self = self.dep(from, name, to);
        self.spec(from)
            .extension_deps
            .entry(name.to_string())
            .or_default()
            .insert(ext(extension));
        self
    }

    /// `user` uses `extension`, which generates `repos` for it and of which
    /// it imports `imports`.
    pub fn usage(mut self, user: &str, extension: &str, repos: &[&str], imports: &[&str]) -> Self {
        let id = ext(extension);
        self.spec(user).extensions.insert(
            id.clone(),
            repos.iter().map(|r| r.to_string()).collect::<BTreeSet<_>>(),
        );
        self.usages.push((
            key(user),
            id,
            ExtensionUsage {
                tags: vec![ExtensionTag {
                    class: "install".to_string(),
                    attributes: BTreeMap::new(),
                }],
                imports: imports.iter().map(|r| r.to_string()).collect(),
            },
        ));
        self
    }

    /// Validate and freeze the fixture, panicking if the graph is invalid.
    pub fn build(self) -> Snapshot {
        let mut builder = GraphBuilder::new();
        for spec in self.specs.into_values() {
            builder.add_module(spec);
        }
        for (user, extension, usage) in self.usages {
            builder.add_usage(user, extension, usage);
        }
        builder
            .build()
            .unwrap_or_else(|e| panic!("invalid fixture graph: {e}"))
    }

    /// `<root> -> a@1.0 -> b@2.0`, with `b@1.0` declared by `a@1.0` but
    /// discarded by version selection.
    pub fn basic() -> Snapshot {
        Self::new()
            .dep("<root>", "a", "a@1.0")
            .dep("a@1.0", "b", "b@2.0")
            .unused_dep("a@1.0", "b", "b@1.0")
            .build()
    }

    /// `<root> -> {a@1.0, b@1.0} -> c@1.0 -> d@1.0`.
    pub fn diamond() -> Snapshot {
        Self::new()
            .dep("<root>", "a", "a@1.0")
            .dep("<root>", "b", "b@1.0")
            .dep("a@1.0", "c", "c@1.0")
            .dep("b@1.0", "c", "c@1.0")
            .dep("c@1.0", "d", "d@1.0")
            .build()
    }

    /// Extension-heavy graph:
    ///
    /// - `<root>` declares `tools@1.0` and `lib@1.0`
    /// - `lib@1.0` reaches `gen@1.0` only through `tools@1.0%ext1`
    /// - `lib@1.0` reaches `other@1.0` only through `tools@1.0%ext2`
    /// - `tools@1.0` declares `other@1.0` directly
    pub fn extensions() -> Snapshot {
        Self::new()
            .dep("<root>", "tools", "tools@1.0")
            .dep("<root>", "lib", "lib@1.0")
            .ext_dep("lib@1.0", "gen", "gen@1.0", "tools@1.0%ext1")
            .ext_dep("lib@1.0", "other", "other@1.0", "tools@1.0%ext2")
            .dep("tools@1.0", "other", "other@1.0")
            .usage("<root>", "tools@1.0%ext1", &["root_repo"], &["root_repo"])
            .usage("lib@1.0", "tools@1.0%ext1", &["lib_repo", "lib_extra"], &["lib_repo"])
            .usage("lib@1.0", "tools@1.0%ext2", &["lib_other"], &["lib_other"])
            .build()
    }
}
