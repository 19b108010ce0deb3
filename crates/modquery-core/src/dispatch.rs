//! One-shot query execution.
//!
//! [`run`] takes a raw [`QueryRequest`] (query type, positional arguments
//! and unparsed options), resolves every reference against the snapshot,
//! and executes the query. Every resolution failure is reported with the
//! argument or option it came from.

use std::collections::BTreeMap;
use std::path::Path;

use indexmap::IndexSet;
use modquery_graph::{ModuleExtensionId, ModuleKey, RepoRuleAttributes, Snapshot, SnapshotFile};
use serde::Serialize;

use crate::engine::{
    AllPaths, AnnotatedPath, ExtensionReport, QueryEngine, RepoRuleLookup, ShownRepo, Tree,
};
use crate::error::{Error, Result};
use crate::filter::ExtensionFilter;
use crate::interrupt::Interrupt;
use crate::options::{QueryOptions, QueryType};
use crate::resolver::{ResolveOptions, Resolver};

/// A query as typed by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRequest {
    pub query: QueryType,
    /// Positional references; each may itself be a comma-separated list.
    pub args: Vec<String>,
    pub options: QueryOptions,
}

impl QueryRequest {
    pub fn new(query: QueryType, args: Vec<String>, options: QueryOptions) -> Self {
        Self {
            query,
            args,
            options,
        }
    }

    /// Build a request from the positional residue of a command line, whose
    /// first element names the query type.
    pub fn from_residue(residue: &[String], options: QueryOptions) -> Result<Self> {
        let (query, args) = residue.split_first().ok_or_else(|| Error::MissingQueryType {
            valid: QueryType::valid_values(),
        })?;
        Ok(Self::new(query.parse()?, args.to_vec(), options))
    }
}

/// Result of a dispatched query.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "query", content = "result")]
pub enum QueryOutcome {
    Tree(Tree),
    Path(Option<AnnotatedPath>),
    AllPaths(AllPaths),
    Show(Vec<ShownRepo>),
    ShowExtension(Vec<ExtensionReport>),
}

/// Positional arguments after conversion for the query type.
enum Targets {
    None,
    Modules(Vec<ModuleKey>),
    Extensions(Vec<ModuleExtensionId>),
}

impl Targets {
    fn modules(&self) -> &[ModuleKey] {
        match self {
            Self::Modules(keys) => keys,
            Self::None | Self::Extensions(_) => &[],
        }
    }

    fn extensions(&self) -> &[ModuleExtensionId] {
        match self {
            Self::Extensions(ids) => ids,
            Self::None | Self::Modules(_) => &[],
        }
    }
}

/// Load and validate a snapshot file.
pub fn load_snapshot(path: &Path) -> Result<(Snapshot, BTreeMap<String, RepoRuleAttributes>)> {
    let file = SnapshotFile::load(path)?;
    let (snapshot, repo_rules) = file.into_snapshot()?;
    tracing::debug!(
        modules = snapshot.graph().len(),
        usages = snapshot.usages().len(),
        "Loaded snapshot"
    );
    Ok((snapshot, repo_rules))
}

/// Resolve and execute `request`.
pub fn run(
    snapshot: &Snapshot,
    request: &QueryRequest,
    lookup: &dyn RepoRuleLookup,
    interrupt: &Interrupt,
) -> Result<QueryOutcome> {
    interrupt.check("argument resolution")?;
    let options = &request.options;
    let query = request.query;

    let base = resolve_base(snapshot, &options.base_module)?;
    let resolver = Resolver::new(snapshot, &base)?;
    tracing::debug!(%query, base = %base, "Dispatching query");

    let targets = convert_args(&resolver, request)?;
    let from = resolver
        .resolve_modules(&options.from, ResolveOptions::new(options.include_unused, true))
        .map_err(|e| e.in_argument(format!("in --from '{}'", options.from)))?;
    let usage_keys = resolver
        .resolve_modules(
            &options.extension_usages,
            ResolveOptions::new(options.include_unused, false),
        )
        .map_err(|e| {
            e.in_argument(format!("in --extension-usages '{}'", options.extension_usages))
        })?;

    let filter = match (&options.extension_filter, query.is_graph()) {
        (Some(text), true) if !text.trim().is_empty() => resolver
            .resolve_extensions(text)
            .map(ExtensionFilter::finite)
            .map_err(|e| e.in_argument(format!("in --extension-filter '{text}'")))?,
        _ => ExtensionFilter::Complete,
    };
    let depth = query.effective_depth(options.depth);

    interrupt.check("query execution")?;
    let engine = QueryEngine::new(snapshot)
        .with_filter(filter)
        .with_limits(options.limits)
        .with_interrupt(interrupt.clone());

    let outcome = match query {
        QueryType::Tree => QueryOutcome::Tree(engine.tree(&from, depth)?),
        QueryType::Deps => QueryOutcome::Tree(engine.tree(targets.modules(), depth)?),
        QueryType::Path => QueryOutcome::Path(engine.path(&from, targets.modules(), depth)?),
        QueryType::AllPaths | QueryType::Explain => {
            QueryOutcome::AllPaths(engine.all_paths(&from, targets.modules(), depth)?)
        }
        QueryType::Show => QueryOutcome::Show(engine.show(targets.modules(), lookup)?),
        QueryType::ShowExtension => {
            QueryOutcome::ShowExtension(engine.show_extension(targets.extensions(), &usage_keys))
        }
    };
    Ok(outcome)
}

fn resolve_base(snapshot: &Snapshot, text: &str) -> Result<ModuleKey> {
    let keys = Resolver::at_root(snapshot)
        .resolve_modules(text, ResolveOptions::used_only())
        .map_err(|e| e.in_argument(format!("in --base-module '{text}'")))?;
    let context = format!("in --base-module '{text}'");
    match <[ModuleKey; 1]>::try_from(keys) {
        Ok([key]) => Ok(key),
        Err(candidates) if candidates.is_empty() => Err(Error::ModuleNotFound {
            reference: text.to_string(),
            within: "in the dependency graph".to_string(),
        }
        .in_argument(context)),
        Err(candidates) => Err(Error::BaseModuleMultipleVersions { candidates }.in_argument(context)),
    }
}

fn convert_args(resolver: &Resolver<'_>, request: &QueryRequest) -> Result<Targets> {
    let options = &request.options;
    match request.query {
        QueryType::Tree if !request.args.is_empty() => Err(Error::TooManyArguments {
            query: request.query,
        }),
        QueryType::Tree => Ok(Targets::None),
        QueryType::Show => collect_modules(request, |arg| {
            resolver
                .resolve_modules(arg, ResolveOptions::used_only())
                .map_err(|e| e.in_argument(format!("in repo argument '{arg}'")))
        }),
        QueryType::ShowExtension => {
            let ids = request.args.iter().try_fold(IndexSet::new(), |mut acc, arg| {
                let ids = resolver
                    .resolve_extensions(arg)
                    .map_err(|e| e.in_argument(format!("in extension argument '{arg}'")))?;
                acc.extend(ids);
                Ok::<_, Error>(acc)
            })?;
            Ok(Targets::Extensions(ids.into_iter().collect()))
        }
        QueryType::Deps | QueryType::Path | QueryType::AllPaths | QueryType::Explain => {
            collect_modules(request, |arg| {
                resolver
                    .resolve_modules(arg, ResolveOptions::new(options.include_unused, true))
                    .map_err(|e| e.in_argument(format!("in module argument '{arg}'")))
            })
        }
    }
}

fn collect_modules(
    request: &QueryRequest,
    resolve: impl Fn(&str) -> Result<Vec<ModuleKey>>,
) -> Result<Targets> {
    let keys = request.args.iter().try_fold(IndexSet::new(), |mut acc, arg| {
        acc.extend(resolve(arg)?);
        Ok::<_, Error>(acc)
    })?;
    Ok(Targets::Modules(keys.into_iter().collect()))
}
