//! Query algorithms over a snapshot.
//!
//! [`QueryEngine`] bundles the snapshot with the traversal settings of one
//! invocation (extension filter, enumeration limits, interrupt flag). Each
//! query lives in its own submodule:
//!
//! - [`tree`]: depth-bounded dependency forests (`tree`, `deps`)
//! - [`path`]: shortest path (`path`)
//! - [`all_paths`]: annotated simple paths (`all_paths`, `explain`)
//! - [`extension`]: extension usage reports (`show_extension`)
//! - [`show`]: repository rule lookup (`show`)
//!
//! All traversals follow used edges only, visit children in key order, and
//! drop extension edges the filter rejects.

pub mod all_paths;
pub mod extension;
pub mod path;
pub mod show;
pub mod tree;

use modquery_graph::{ModuleKey, Snapshot};

use crate::filter::{EdgeCause, ExtensionFilter};
use crate::interrupt::Interrupt;
use crate::options::EnumerationLimits;

pub use all_paths::{AllPaths, AnnotatedPath};
pub use extension::{ExtensionReport, RepoImport, UsageReport};
pub use show::{LookupError, RepoRuleLookup, ShownRepo, StaticRepoRules};
pub use tree::{Tree, TreeEntry};

/// Runs queries against one snapshot.
#[derive(Debug, Clone)]
pub struct QueryEngine<'a> {
    snapshot: &'a Snapshot,
    filter: ExtensionFilter,
    limits: EnumerationLimits,
    interrupt: Interrupt,
}

impl<'a> QueryEngine<'a> {
    pub fn new(snapshot: &'a Snapshot) -> Self {
        Self {
            snapshot,
            filter: ExtensionFilter::Complete,
            limits: EnumerationLimits::default(),
            interrupt: Interrupt::new(),
        }
    }

    pub fn with_filter(mut self, filter: ExtensionFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_limits(mut self, limits: EnumerationLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_interrupt(mut self, interrupt: Interrupt) -> Self {
        self.interrupt = interrupt;
        self
    }

    pub fn snapshot(&self) -> &'a Snapshot {
        self.snapshot
    }

    pub fn filter(&self) -> &ExtensionFilter {
        &self.filter
    }

    /// Filtered used edges of `key`, ordered by target and de-duplicated.
    ///
    /// When several edges share a target the direct one wins, otherwise the
    /// smallest extension cause.
    pub(crate) fn edges(&self, key: &ModuleKey) -> Vec<(&'a ModuleKey, EdgeCause)> {
        let Some(module) = self.snapshot.graph().get(key) else {
            return Vec::new();
        };
        let mut edges: Vec<_> = module
            .used_edges()
            .filter_map(|edge| Some((edge.target, self.filter.admit(edge.origin)?)))
            .collect();
        edges.sort();
        edges.dedup_by(|next, kept| next.0 == kept.0);
        edges
    }
}
