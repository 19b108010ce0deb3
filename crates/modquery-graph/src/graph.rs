//! The immutable dependency graph and its builder.
//!
//! Edges point from dependent to dependency: if A depends on B, A's `deps`
//! map holds B. The used-edge relation must be acyclic and rooted at
//! [`ModuleKey::ROOT`]; versions that lost selection stay in the graph,
//! reachable through some module's `unused_deps`.
//!
//! # Example
//!
//! ```
//! use modquery_graph::{GraphBuilder, ModuleKey, ModuleSpec};
//!
//! let a = ModuleKey::new("a", "1.0");
//! let mut root = ModuleSpec::new(ModuleKey::ROOT);
//! root.deps.insert("a".to_string(), a.clone());
//!
//! let mut builder = GraphBuilder::new();
//! builder.add_module(root);
//! builder.add_module(ModuleSpec::new(a.clone()));
//! let snapshot = builder.build().unwrap();
//!
//! assert!(snapshot.graph().get(&a).unwrap().is_used());
//! assert_eq!(snapshot.graph().len(), 2);
//! ```

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use crate::error::{GraphError, Result};
use crate::extension::{ExtensionUsage, ModuleExtensionId, UsageTable};
use crate::key::ModuleKey;
use crate::module::{AugmentedModule, ModuleSpec};
use crate::snapshot::Snapshot;

/// Immutable mapping from module key to graph node.
#[derive(Debug, Clone)]
pub struct DepGraph {
    modules: BTreeMap<ModuleKey, AugmentedModule>,
}

impl DepGraph {
    pub fn get(&self, key: &ModuleKey) -> Option<&AugmentedModule> {
        self.modules.get(key)
    }

    /// Like [`get`](Self::get) but fails with [`GraphError::UnknownModule`].
    pub fn module(&self, key: &ModuleKey) -> Result<&AugmentedModule> {
        self.modules
            .get(key)
            .ok_or_else(|| GraphError::UnknownModule(key.clone()))
    }

    /// The root module node. Always present in a built graph.
    pub fn root(&self) -> &AugmentedModule {
        &self.modules[&ModuleKey::ROOT]
    }

    pub fn contains(&self, key: &ModuleKey) -> bool {
        self.modules.contains_key(key)
    }

    /// All nodes in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&ModuleKey, &AugmentedModule)> {
        self.modules.iter()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

/// Assembles and validates a [`Snapshot`].
#[derive(Debug, Clone, Default)]
pub struct GraphBuilder {
    modules: Vec<ModuleSpec>,
    usages: Vec<(ModuleKey, ModuleExtensionId, ExtensionUsage)>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_module(&mut self, spec: ModuleSpec) -> &mut Self {
        self.modules.push(spec);
        self
    }

    /// Record that `user` uses `extension` as described by `usage`.
    pub fn add_usage(
        &mut self,
        user: ModuleKey,
        extension: ModuleExtensionId,
        usage: ExtensionUsage,
    ) -> &mut Self {
        self.usages.push((user, extension, usage));
        self
    }

    /// Validate the declarations and freeze them into a snapshot.
    ///
    /// # Errors
    ///
    /// - `GraphError::DuplicateModule` if a key is declared twice
    /// - `GraphError::MissingRoot` if there is no root module
    /// - `GraphError::DanglingEdge` if an edge targets an undeclared module
    /// - `GraphError::UnknownExtensionEdge` if an extension-introduced edge
    ///   has no matching used dependency
    /// - `GraphError::DependencyCycle` if used edges form a cycle
    /// - `GraphError::Unreachable` if a module cannot be reached from the root
    /// - `GraphError::UnknownUsageModule` if a usage row names an unknown module
    pub fn build(self) -> Result<Snapshot> {
        let mut modules = BTreeMap::new();
        for spec in self.modules {
            let key = spec.key.clone();
            if modules
                .insert(key.clone(), AugmentedModule::from_spec(spec))
                .is_some()
            {
                return Err(GraphError::DuplicateModule(key));
            }
        }
        if !modules.contains_key(&ModuleKey::ROOT) {
            return Err(GraphError::MissingRoot);
        }

        check_edges(&modules)?;
        link_dependents(&mut modules);
        check_acyclic(&modules)?;
        mark_used(&mut modules);
        check_reachable(&modules)?;

        let mut rows = BTreeMap::new();
        for (user, extension, usage) in self.usages {
            if !modules.contains_key(&user) {
                return Err(GraphError::UnknownUsageModule {
                    module: user,
                    extension,
                });
            }
            rows.insert((user, extension), usage);
        }

        tracing::debug!(
            modules = modules.len(),
            usages = rows.len(),
            "Built dependency graph snapshot"
        );
        Ok(Snapshot::new(DepGraph { modules }, UsageTable::new(rows)))
    }
}

fn check_edges(modules: &BTreeMap<ModuleKey, AugmentedModule>) -> Result<()> {
    for (key, module) in modules {
        for (name, target) in module.deps().iter().chain(module.unused_deps()) {
            if !modules.contains_key(target) {
                return Err(GraphError::DanglingEdge {
                    module: key.clone(),
                    name: name.clone(),
                    target: target.clone(),
                });
            }
        }
        if let Some(name) = module
            .extension_dep_names()
            .find(|name| !module.deps().contains_key(name.as_str()))
        {
            return Err(GraphError::UnknownExtensionEdge {
                module: key.clone(),
                name: name.clone(),
            });
        }
    }
    Ok(())
}

fn link_dependents(modules: &mut BTreeMap<ModuleKey, AugmentedModule>) {
    let edges: Vec<(ModuleKey, ModuleKey)> = modules
        .iter()
        .flat_map(|(key, module)| {
            module
                .deps()
                .values()
                .map(move |target| (key.clone(), target.clone()))
        })
        .collect();
    for (from, to) in edges {
        if let Some(target) = modules.get_mut(&to) {
            target.add_dependent(from);
        }
    }
}

/// Kahn's algorithm over used edges; whatever cannot be ordered sits on a cycle.
fn check_acyclic(modules: &BTreeMap<ModuleKey, AugmentedModule>) -> Result<()> {
    let mut in_degree: BTreeMap<&ModuleKey, usize> =
        modules.keys().map(|key| (key, 0)).collect();
    for module in modules.values() {
        let targets: BTreeSet<&ModuleKey> = module.deps().values().collect();
        for target in targets {
            *in_degree.entry(target).or_insert(0) += 1;
        }
    }

    let mut queue: VecDeque<&ModuleKey> = in_degree
        .iter()
        .filter(|&(_, &degree)| degree == 0)
        .map(|(&key, _)| key)
        .collect();
    let mut ordered = 0;

    while let Some(current) = queue.pop_front() {
        ordered += 1;
        let targets: BTreeSet<&ModuleKey> = modules[current].deps().values().collect();
        for target in targets {
            if let Some(degree) = in_degree.get_mut(target) {
                *degree -= 1;
                if *degree == 0 {
                    queue.push_back(target);
                }
            }
        }
    }

    if ordered == modules.len() {
        return Ok(());
    }
    let participants = in_degree
        .into_iter()
        .filter(|&(_, degree)| degree > 0)
        .map(|(key, _)| key.clone())
        .collect();
    Err(GraphError::DependencyCycle { participants })
}

fn mark_used(modules: &mut BTreeMap<ModuleKey, AugmentedModule>) {
    let used = reachable_from_root(modules, false);
    for key in used {
        if let Some(module) = modules.get_mut(&key) {
            module.mark_used();
        }
    }
}

fn check_reachable(modules: &BTreeMap<ModuleKey, AugmentedModule>) -> Result<()> {
    let reachable = reachable_from_root(modules, true);
    match modules.keys().find(|key| !reachable.contains(*key)) {
        Some(orphan) => Err(GraphError::Unreachable(orphan.clone())),
        None => Ok(()),
    }
}

fn reachable_from_root(
    modules: &BTreeMap<ModuleKey, AugmentedModule>,
    follow_unused: bool,
) -> BTreeSet<ModuleKey> {
    let mut seen = BTreeSet::new();
    let mut queue = VecDeque::from([ModuleKey::ROOT]);
    while let Some(current) = queue.pop_front() {
        if !seen.insert(current.clone()) {
            continue;
        }
        let Some(module) = modules.get(&current) else {
            continue;
        };
        let unused = module.unused_deps().values().filter(|_| follow_unused);
        for target in module.deps().values().chain(unused) {
            if !seen.contains(target) {
                queue.push_back(target.clone());
            }
        }
    }
    seen
}
