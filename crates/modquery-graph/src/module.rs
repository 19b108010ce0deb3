//! Graph nodes.

use std::collections::{BTreeMap, BTreeSet};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::extension::ModuleExtensionId;
use crate::key::ModuleKey;

/// Declaration of one module as handed over by the evaluation phase.
///
/// This is the serialized shape; [`GraphBuilder`](crate::GraphBuilder)
/// turns a set of specs into [`AugmentedModule`]s.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleSpec {
    pub key: ModuleKey,
    /// Local dependency name to the version selected for it.
    #[serde(default)]
    pub deps: IndexMap<String, ModuleKey>,
    /// Local dependency name to the originally declared version, for
    /// dependencies whose declared version lost selection.
    #[serde(default)]
    pub unused_deps: IndexMap<String, ModuleKey>,
    /// Local dependency names introduced by extension usages rather than by
    /// a declaration of their own.
    #[serde(default)]
    pub extension_deps: BTreeMap<String, BTreeSet<ModuleExtensionId>>,
    /// Extensions this module uses, with the repositories each generates for it.
    #[serde(default)]
    pub extensions: BTreeMap<ModuleExtensionId, BTreeSet<String>>,
}

impl ModuleSpec {
    /// A module with no dependencies and no extension usages.
    pub fn new(key: ModuleKey) -> Self {
        Self {
            key,
            deps: IndexMap::new(),
            unused_deps: IndexMap::new(),
            extension_deps: BTreeMap::new(),
            extensions: BTreeMap::new(),
        }
    }
}

/// Where a used dependency edge comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepOrigin<'a> {
    /// The module declared the dependency itself.
    Declared,
    /// The edge exists only because of these extension usages.
    Extensions(&'a BTreeSet<ModuleExtensionId>),
}

/// A used dependency edge of one module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepEdge<'a> {
    /// Local name under which the dependency is visible.
    pub name: &'a str,
    pub target: &'a ModuleKey,
    pub origin: DepOrigin<'a>,
}

/// A node of the dependency graph: one module version and its edges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AugmentedModule {
    key: ModuleKey,
    deps: IndexMap<String, ModuleKey>,
    unused_deps: IndexMap<String, ModuleKey>,
    dependents: BTreeSet<ModuleKey>,
    extension_deps: BTreeMap<String, BTreeSet<ModuleExtensionId>>,
    extensions: BTreeMap<ModuleExtensionId, BTreeSet<String>>,
    used: bool,
}

impl AugmentedModule {
    pub(crate) fn from_spec(spec: ModuleSpec) -> Self {
        Self {
            key: spec.key,
            deps: spec.deps,
            unused_deps: spec.unused_deps,
            dependents: BTreeSet::new(),
            extension_deps: spec.extension_deps,
            extensions: spec.extensions,
            used: false,
        }
    }

    pub(crate) fn add_dependent(&mut self, dependent: ModuleKey) {
        self.dependents.insert(dependent);
    }

    pub(crate) fn mark_used(&mut self) {
        self.used = true;
    }

    pub fn key(&self) -> &ModuleKey {
        &self.key
    }

    /// Used dependencies in declaration order.
    pub fn deps(&self) -> &IndexMap<String, ModuleKey> {
        &self.deps
    }

    /// Dependencies whose declared version lost selection.
    pub fn unused_deps(&self) -> &IndexMap<String, ModuleKey> {
        &self.unused_deps
    }

    /// Modules declaring a used edge to this one.
    pub fn dependents(&self) -> &BTreeSet<ModuleKey> {
        &self.dependents
    }

    /// Extensions used by this module and the repositories each generates.
    pub fn extension_usages(&self) -> &BTreeMap<ModuleExtensionId, BTreeSet<String>> {
        &self.extensions
    }

    /// Whether this version survived selection, i.e. is reachable from the
    /// root through used edges.
    pub fn is_used(&self) -> bool {
        self.used
    }

    /// Origin of the used edge registered under `name`.
    pub fn dep_origin(&self, name: &str) -> DepOrigin<'_> {
        match self.extension_deps.get(name) {
            Some(causes) => DepOrigin::Extensions(causes),
            None => DepOrigin::Declared,
        }
    }

    /// Used edges in declaration order.
    pub fn used_edges(&self) -> impl Iterator<Item = DepEdge<'_>> {
        self.deps.iter().map(|(name, target)| DepEdge {
            name,
            target,
            origin: self.dep_origin(name),
        })
    }

    pub(crate) fn extension_dep_names(&self) -> impl Iterator<Item = &String> {
        self.extension_deps.keys()
    }
}
