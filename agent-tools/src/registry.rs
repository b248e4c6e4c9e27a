//! Runtime registry for tool providers, indexed by name and category.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{ToolError, ToolResult};
use crate::provider::{Tool, ToolProvider};
use crate::schema::ToolArgs;

/// What happens to a category once its last member leaves.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryPolicy {
    /// Keep the empty category listed.
    #[default]
    RetainEmpty,
    /// Drop the category as soon as it has no members.
    PruneEmpty,
}

/// Configuration for [`ToolRegistry`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    category_policy: CategoryPolicy,
}

impl RegistryConfig {
    /// Creates a configuration with the supplied empty-category policy.
    #[must_use]
    pub const fn new(category_policy: CategoryPolicy) -> Self {
        Self { category_policy }
    }

    /// Returns the empty-category policy.
    #[must_use]
    pub const fn category_policy(self) -> CategoryPolicy {
        self.category_policy
    }

    /// Overrides the empty-category policy.
    #[must_use]
    pub const fn with_category_policy(mut self, category_policy: CategoryPolicy) -> Self {
        self.category_policy = category_policy;
        self
    }
}

/// A registered provider together with its index metadata.
#[derive(Clone)]
pub struct ProviderEntry {
    name: String,
    categories: BTreeSet<String>,
    provider: Arc<dyn ToolProvider>,
    sequence: u64,
}

impl ProviderEntry {
    /// Returns the registry key.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the categories this entry was registered under.
    #[must_use]
    pub fn categories(&self) -> &BTreeSet<String> {
        &self.categories
    }

    /// Returns the provider.
    #[must_use]
    pub fn provider(&self) -> &Arc<dyn ToolProvider> {
        &self.provider
    }

    /// Returns the registration sequence number. Later registrations have
    /// larger numbers.
    #[must_use]
    pub const fn sequence(&self) -> u64 {
        self.sequence
    }
}

impl fmt::Debug for ProviderEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderEntry")
            .field("name", &self.name)
            .field("categories", &self.categories)
            .field("type_name", &self.provider.type_name())
            .field("sequence", &self.sequence)
            .finish()
    }
}

#[derive(Default)]
struct RegistryInner {
    tools: HashMap<String, ProviderEntry>,
    categories: HashMap<String, BTreeSet<String>>,
    next_sequence: u64,
}

impl RegistryInner {
    fn detach(&mut self, category: &str, name: &str, policy: CategoryPolicy) {
        if let Some(members) = self.categories.get_mut(category) {
            members.remove(name);
            if members.is_empty() && policy == CategoryPolicy::PruneEmpty {
                self.categories.remove(category);
                debug!(category, "pruned empty category");
            }
        }
    }
}

fn ordered<'a>(entries: impl Iterator<Item = &'a ProviderEntry>) -> Vec<ProviderEntry> {
    let mut entries: Vec<ProviderEntry> = entries.cloned().collect();
    entries.sort_by_key(ProviderEntry::sequence);
    entries
}

/// Registry that stores tool providers keyed by declared name.
///
/// Every category member is guaranteed to resolve through
/// [`ToolRegistry::lookup`]. Listings are returned in registration order.
#[derive(Default)]
pub struct ToolRegistry {
    config: RegistryConfig,
    inner: RwLock<RegistryInner>,
}

impl fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.read();
        let names: Vec<_> = inner.tools.keys().cloned().collect();
        f.debug_struct("ToolRegistry")
            .field("config", &self.config)
            .field("registered", &names)
            .finish()
    }
}

impl ToolRegistry {
    /// Creates an empty registry with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty registry with the supplied configuration.
    #[must_use]
    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            config,
            inner: RwLock::default(),
        }
    }

    /// Returns the registry configuration.
    #[must_use]
    pub const fn config(&self) -> RegistryConfig {
        self.config
    }

    // Every mutation leaves both maps consistent, so a poisoned lock still
    // guards valid state.
    fn read(&self) -> RwLockReadGuard<'_, RegistryInner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, RegistryInner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers a provider under the name its default instance declares.
    ///
    /// A provider that cannot be built from defaults is keyed by its
    /// [`type_name`](ToolProvider::type_name) instead. Registering a second
    /// provider under an existing key replaces the first, including its
    /// category memberships. Returns the provider unchanged.
    pub fn register<I, S>(
        &self,
        provider: Arc<dyn ToolProvider>,
        categories: I,
    ) -> Arc<dyn ToolProvider>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = resolve_name(provider.as_ref());
        let categories: BTreeSet<String> = categories.into_iter().map(Into::into).collect();
        let policy = self.config.category_policy;

        let mut inner = self.write();
        let sequence = inner.next_sequence;
        inner.next_sequence += 1;

        let entry = ProviderEntry {
            name: name.clone(),
            categories: categories.clone(),
            provider: Arc::clone(&provider),
            sequence,
        };

        if let Some(previous) = inner.tools.insert(name.clone(), entry) {
            for stale in previous.categories.difference(&categories) {
                inner.detach(stale, &name, policy);
            }
            debug!(
                tool = %name,
                previous_type = previous.provider.type_name(),
                "replaced existing tool registration"
            );
        }

        for category in &categories {
            inner
                .categories
                .entry(category.clone())
                .or_default()
                .insert(name.clone());
        }

        info!(tool = %name, ?categories, "tool provider registered");
        provider
    }

    /// Removes the provider registered under `name`, returning `true` if it existed.
    pub fn unregister(&self, name: &str) -> bool {
        let policy = self.config.category_policy;
        let mut inner = self.write();
        let Some(entry) = inner.tools.remove(name) else {
            return false;
        };
        for category in &entry.categories {
            inner.detach(category, name, policy);
        }
        info!(tool = name, "tool provider unregistered");
        true
    }

    /// Returns the provider registered under `name`.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<Arc<dyn ToolProvider>> {
        self.read()
            .tools
            .get(name)
            .map(|entry| Arc::clone(&entry.provider))
    }

    /// Returns the full entry registered under `name`.
    #[must_use]
    pub fn entry(&self, name: &str) -> Option<ProviderEntry> {
        self.read().tools.get(name).cloned()
    }

    /// Returns the categories `name` is a member of; empty for unknown names.
    #[must_use]
    pub fn categories_of(&self, name: &str) -> Vec<String> {
        self.read()
            .tools
            .get(name)
            .map(|entry| entry.categories.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Builds the tool registered under `name` from explicit arguments.
    ///
    /// Unlike discovery, which only uses placeholder arguments, this lets
    /// callers supply real values, including opaque ones.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::UnknownTool`] when nothing is registered under
    /// `name`, or the provider's own error when construction fails.
    pub fn build(&self, name: &str, args: &ToolArgs) -> ToolResult<Box<dyn Tool>> {
        let provider = self.lookup(name).ok_or_else(|| ToolError::UnknownTool {
            name: name.to_owned(),
        })?;
        provider.build(args)
    }

    /// Returns the providers in `category`; empty for unknown categories.
    #[must_use]
    pub fn list_by_category(&self, category: &str) -> Vec<Arc<dyn ToolProvider>> {
        providers(self.entries_in_categories(&[category]))
    }

    /// Returns every registered provider.
    #[must_use]
    pub fn list_all(&self) -> Vec<Arc<dyn ToolProvider>> {
        providers(self.entries())
    }

    /// Returns every category label, sorted.
    #[must_use]
    pub fn list_categories(&self) -> Vec<String> {
        let inner = self.read();
        let mut categories: Vec<String> = inner.categories.keys().cloned().collect();
        categories.sort_unstable();
        categories
    }

    /// Returns the registered names, in registration order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.entries().into_iter().map(|entry| entry.name).collect()
    }

    /// Returns every entry, in registration order.
    #[must_use]
    pub fn entries(&self) -> Vec<ProviderEntry> {
        let inner = self.read();
        ordered(inner.tools.values())
    }

    /// Returns the union of the entries in `categories`, each entry once, in
    /// registration order.
    #[must_use]
    pub fn entries_in_categories<S: AsRef<str>>(&self, categories: &[S]) -> Vec<ProviderEntry> {
        let inner = self.read();
        let names: BTreeSet<&String> = categories
            .iter()
            .filter_map(|category| inner.categories.get(category.as_ref()))
            .flatten()
            .collect();
        ordered(names.into_iter().filter_map(|name| inner.tools.get(name)))
    }

    /// Returns the number of registered providers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read().tools.len()
    }

    /// Returns `true` when nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().tools.is_empty()
    }
}

/// Determines the registry key for `provider`.
///
/// Builds a probe instance from the provider's default arguments and reads its
/// declared name. Falls back to the provider's type name when the probe cannot
/// be built or declares an empty name.
#[must_use]
pub fn resolve_name(provider: &dyn ToolProvider) -> String {
    match provider.try_build_default() {
        Ok(probe) if !probe.name().is_empty() => probe.name().to_owned(),
        Ok(_) => {
            debug!(
                type_name = provider.type_name(),
                "probe declared an empty name; keying by type name"
            );
            provider.type_name().to_owned()
        }
        Err(err) => {
            debug!(
                type_name = provider.type_name(),
                %err,
                "probe construction failed; keying by type name"
            );
            provider.type_name().to_owned()
        }
    }
}

fn providers(entries: Vec<ProviderEntry>) -> Vec<Arc<dyn ToolProvider>> {
    entries.into_iter().map(|entry| entry.provider).collect()
}
