//! Module dependency graph snapshot for modquery.
//!
//! This crate holds the read-only data the query engine works on:
//!
//! - **Identities**: [`ModuleKey`] and [`ModuleExtensionId`]
//! - **Graph**: [`AugmentedModule`] nodes in a [`DepGraph`], validated by
//!   [`GraphBuilder`]
//! - **Index**: [`ModulesIndex`], every known version per module name
//! - **Usages**: the [`UsageTable`] of extension usages
//! - **Snapshot**: all of the above frozen together, loadable from the JSON
//!   [`SnapshotFile`] format
//!
//! Nothing here is mutated after [`GraphBuilder::build`] returns.

pub mod error;
pub mod extension;
pub mod graph;
pub mod index;
pub mod key;
pub mod module;
pub mod snapshot;

pub use error::{GraphError, Result};
pub use extension::{ExtensionTag, ExtensionUsage, ModuleExtensionId, UsageTable};
pub use graph::{DepGraph, GraphBuilder};
pub use index::ModulesIndex;
pub use key::{EMPTY_VERSION_TOKEN, ModuleKey, ROOT_TOKEN};
pub use module::{AugmentedModule, DepEdge, DepOrigin, ModuleSpec};
pub use snapshot::{RepoRuleAttributes, Snapshot, SnapshotFile, UsageRecord};
