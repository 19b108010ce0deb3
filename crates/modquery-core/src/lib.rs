//! Query engine over a module dependency graph snapshot.
//!
//! The crate turns user-supplied references into graph identities and runs
//! queries over a [`modquery_graph::Snapshot`]:
//!
//! - [`args`]: the reference grammar (`<root>`, `name`, `name@version`,
//!   `module%extension`)
//! - [`Resolver`]: resolution of references relative to a base module
//! - [`ExtensionFilter`]: which extension-introduced edges traversals follow
//! - [`QueryEngine`]: `tree`, `path`, `all_paths`, `show`, `show_extension`
//! - [`dispatch`]: the one-shot flow from a raw request to a [`QueryOutcome`]
//!
//! # Example
//!
//! ```rust,no_run
//! use std::path::Path;
//!
//! use modquery_core::{Interrupt, QueryOptions, QueryRequest, StaticRepoRules, dispatch};
//!
//! let (snapshot, rules) = dispatch::load_snapshot(Path::new("graph.json"))?;
//! let residue = vec!["path".to_string(), "rules_cc@0.0.9".to_string()];
//! let request = QueryRequest::from_residue(&residue, QueryOptions::default())?;
//! let outcome = dispatch::run(
//!     &snapshot,
//!     &request,
//!     &StaticRepoRules::new(rules),
//!     &Interrupt::new(),
//! )?;
//! println!("{}", serde_json::to_string_pretty(&outcome)?);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod args;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod filter;
pub mod interrupt;
pub mod options;
pub mod resolver;

pub use args::{ExtensionArg, ModuleArg};
pub use dispatch::{QueryOutcome, QueryRequest};
pub use engine::{
    AllPaths, AnnotatedPath, ExtensionReport, LookupError, QueryEngine, RepoImport,
    RepoRuleLookup, ShownRepo, StaticRepoRules, Tree, TreeEntry, UsageReport,
};
pub use error::{Error, ErrorKind, Result};
pub use filter::{EdgeCause, ExtensionFilter};
pub use interrupt::Interrupt;
pub use options::{EnumerationLimits, QueryOptions, QueryType};
pub use resolver::{ResolveOptions, Resolver};
