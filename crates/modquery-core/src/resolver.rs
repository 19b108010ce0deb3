//! Resolution of parsed references against a snapshot.

use indexmap::IndexSet;
use modquery_graph::{AugmentedModule, ModuleExtensionId, ModuleKey, Snapshot};

use crate::args::{ExtensionArg, ModuleArg, parse_extension_list, parse_module_list};
use crate::error::{Error, Result};

/// How unused module versions are treated during resolution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Accept module versions that lost selection.
    pub include_unused: bool,
    /// Log a warning when an unused version is accepted.
    pub warn_unused: bool,
}

impl ResolveOptions {
    pub fn used_only() -> Self {
        Self::default()
    }

    pub fn new(include_unused: bool, warn_unused: bool) -> Self {
        Self {
            include_unused,
            warn_unused,
        }
    }
}

/// Resolves references relative to one base module.
///
/// Bare names are looked up among the base module's own dependency names;
/// version-qualified names are looked up in the whole index.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    snapshot: &'a Snapshot,
    base: &'a AugmentedModule,
}

impl<'a> Resolver<'a> {
    /// A resolver anchored at `base`.
    pub fn new(snapshot: &'a Snapshot, base: &ModuleKey) -> Result<Self> {
        let base = snapshot.graph().module(base)?;
        Ok(Self { snapshot, base })
    }

    /// A resolver anchored at the root module.
    pub fn at_root(snapshot: &'a Snapshot) -> Self {
        Self {
            snapshot,
            base: snapshot.graph().root(),
        }
    }

    pub fn base(&self) -> &ModuleKey {
        self.base.key()
    }

    /// Resolve one module reference to the keys it denotes.
    pub fn resolve_module(&self, arg: &ModuleArg, options: ResolveOptions) -> Result<Vec<ModuleKey>> {
        match arg {
            ModuleArg::Root => Ok(vec![ModuleKey::ROOT]),
            ModuleArg::Qualified(key) => {
                if !self.snapshot.index().contains(key) {
                    return Err(Error::ModuleNotFound {
                        reference: key.to_string(),
                        within: "in the dependency graph".to_string(),
                    });
                }
                self.check_used(key, options)?;
                Ok(vec![key.clone()])
            }
            ModuleArg::Named(name) => {
                let used = self.base.deps().get(name);
                let unused = options
                    .include_unused
                    .then(|| self.base.unused_deps().get(name))
                    .flatten();
                let keys: IndexSet<&ModuleKey> = used.into_iter().chain(unused).collect();
                if keys.is_empty() {
                    return Err(Error::ModuleNotFound {
                        reference: name.clone(),
                        within: format!("among the dependencies of {}", self.base.key()),
                    });
                }
                keys.into_iter()
                    .map(|key| {
                        self.check_used(key, options)?;
                        Ok(key.clone())
                    })
                    .collect()
            }
        }
    }

    /// Resolve a comma-separated module list, unioning the results in
    /// first-seen order.
    pub fn resolve_modules(&self, text: &str, options: ResolveOptions) -> Result<Vec<ModuleKey>> {
        let keys = parse_module_list(text)?
            .iter()
            .try_fold(IndexSet::new(), |mut acc, arg| {
                acc.extend(self.resolve_module(arg, options)?);
                Ok::<_, Error>(acc)
            })?;
        tracing::debug!(input = text, resolved = keys.len(), "Resolved module list");
        Ok(keys.into_iter().collect())
    }

    /// Resolve one extension reference to exactly one extension id.
    pub fn resolve_extension(&self, arg: &ExtensionArg) -> Result<ModuleExtensionId> {
        let modules = self.resolve_module(&arg.module, ResolveOptions::used_only())?;
        let module = match modules.as_slice() {
            [module] => module,
            _ => {
                return Err(Error::AmbiguousReference {
                    reference: arg.module.to_string(),
                    candidates: modules.iter().map(ToString::to_string).collect(),
                });
            }
        };

        let candidates: Vec<&ModuleExtensionId> = self
            .snapshot
            .extension_ids()
            .into_iter()
            .filter(|id| id.module() == module && id.extension_name() == arg.extension_name)
            .filter(|id| match &arg.isolation_key {
                Some(isolation) => id.isolation_key() == Some(isolation.as_str()),
                None => true,
            })
            .collect();

        let chosen = match candidates.as_slice() {
            [] => None,
            [only] => Some(*only),
            several => several.iter().copied().find(|id| id.isolation_key().is_none()),
        };
        match chosen {
            Some(id) => Ok(id.clone()),
            None if candidates.is_empty() => Err(Error::ExtensionNotFound {
                extension: arg.extension_name.clone(),
                module: module.clone(),
            }),
            None => Err(Error::AmbiguousReference {
                reference: arg.to_string(),
                candidates: candidates.iter().map(ToString::to_string).collect(),
            }),
        }
    }

    /// Resolve a comma-separated extension list, de-duplicated in first-seen order.
    pub fn resolve_extensions(&self, text: &str) -> Result<Vec<ModuleExtensionId>> {
        let ids = parse_extension_list(text)?
            .iter()
            .map(|arg| self.resolve_extension(arg))
            .collect::<Result<IndexSet<_>>>()?;
        Ok(ids.into_iter().collect())
    }

    fn check_used(&self, key: &ModuleKey, options: ResolveOptions) -> Result<()> {
        let used = self
            .snapshot
            .graph()
            .get(key)
            .is_some_and(AugmentedModule::is_used);
        if used {
            return Ok(());
        }
        if !options.include_unused {
            return Err(Error::UnusedModuleExcluded { key: key.clone() });
        }
        if options.warn_unused {
            tracing::warn!(
                "Module version {key} is unused as a result of version selection"
            );
        }
        Ok(())
    }
}
