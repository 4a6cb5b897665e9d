#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

//! Plugin hooks for the sidecar build pipeline.
//!
//! Provides a Rollup-compatible plugin interface with async hooks for module
//! resolution and file-watch events, dispatched by a [`PluginContainer`].
//!
//! ## Example
//!
//! ```ignore
//! use sidecar_hooks::{HookResult, Plugin, PluginContext, ResolveIdResult};
//!
//! struct MyPlugin;
//!
//! #[async_trait::async_trait]
//! impl Plugin for MyPlugin {
//!     fn name(&self) -> &str { "my-plugin" }
//!
//!     async fn resolve_id(
//!         &self,
//!         specifier: &str,
//!         _importer: Option<&str>,
//!         _ctx: &PluginContext,
//!     ) -> HookResult<Option<ResolveIdResult>> {
//!         if specifier.ends_with(".txt") {
//!             return Ok(Some(ResolveIdResult::resolved(format!("{specifier}.js"))));
//!         }
//!         Ok(None)
//!     }
//! }
//! ```

use async_trait::async_trait;
use regex::Regex;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::trace;

/// Result type for plugin hooks.
pub type HookResult<T> = Result<T, PluginError>;

/// Error from a plugin.
#[derive(Debug)]
pub struct PluginError {
    /// Plugin name that caused the error.
    pub plugin: String,
    /// Hook that failed.
    pub hook: &'static str,
    /// Error message.
    pub message: String,
}

impl PluginError {
    /// Create a new plugin error.
    #[must_use]
    pub fn new(plugin: impl Into<String>, hook: &'static str, message: impl Into<String>) -> Self {
        Self {
            plugin: plugin.into(),
            hook,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for PluginError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.plugin, self.hook, self.message)
    }
}

impl std::error::Error for PluginError {}

/// Plugin enforcement ordering.
///
/// Controls where a plugin runs relative to others in the pipeline.
/// Mirrors Vite's `enforce` option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum PluginEnforce {
    /// Runs before normal plugins (e.g., alias resolution).
    Pre,
    /// Default ordering (no enforcement).
    #[default]
    Normal,
    /// Runs after normal plugins (e.g., minification).
    Post,
}

/// Result of resolve hook.
#[derive(Debug, Clone)]
pub struct ResolveIdResult {
    /// Resolved module ID (usually a file path).
    pub id: String,
    /// Whether this module is external (don't bundle).
    pub external: bool,
}

impl ResolveIdResult {
    /// Create a resolved module result.
    #[must_use]
    pub fn resolved(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            external: false,
        }
    }

    /// Create an external module result.
    #[must_use]
    pub fn external(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            external: true,
        }
    }
}

/// Kind of file change reported to the `watch_change` hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WatchChangeKind {
    /// File was created.
    Create,
    /// File contents changed.
    Update,
    /// File was removed.
    Delete,
}

impl WatchChangeKind {
    /// Wire name of the change kind.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

/// Pattern filter declared by a plugin for its `resolve_id` hook.
///
/// Lets the driver skip the hook for specifiers no pattern matches,
/// avoiding a dispatch per module. An empty filter matches everything.
#[derive(Debug, Default)]
pub struct ResolveFilter {
    /// Patterns a specifier must match for the hook to run.
    pub id: Vec<Regex>,
}

impl ResolveFilter {
    /// Create a filter from a set of specifier patterns.
    #[must_use]
    pub fn new(id: Vec<Regex>) -> Self {
        Self { id }
    }

    /// Whether a specifier passes the filter.
    #[must_use]
    pub fn matches(&self, specifier: &str) -> bool {
        self.id.is_empty() || self.id.iter().any(|re| re.is_match(specifier))
    }
}

/// Context passed to plugin hooks.
#[derive(Debug, Default)]
pub struct PluginContext {
    /// Working directory.
    pub cwd: PathBuf,
    /// Whether this is a watch/dev build.
    pub watch: bool,
    /// Files plugins asked the host to watch.
    watched: Mutex<FxHashSet<PathBuf>>,
}

impl PluginContext {
    /// Create a new plugin context.
    #[must_use]
    pub fn new(cwd: PathBuf) -> Self {
        Self {
            cwd,
            watch: false,
            watched: Mutex::new(FxHashSet::default()),
        }
    }

    /// Register a file to be watched for changes.
    ///
    /// Duplicate registrations collapse to one entry.
    pub fn add_watch_file(&self, path: impl Into<PathBuf>) {
        self.watched.lock().unwrap().insert(path.into());
    }

    /// Whether a file has been registered for watching.
    #[must_use]
    pub fn is_watched(&self, path: &Path) -> bool {
        self.watched.lock().unwrap().contains(path)
    }

    /// Snapshot of all registered watch files, sorted.
    #[must_use]
    pub fn watched_files(&self) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = self.watched.lock().unwrap().iter().cloned().collect();
        files.sort();
        files
    }
}

/// The main plugin trait.
///
/// Implement this trait to create custom plugins. All hooks have default
/// implementations that do nothing, so you only need to implement the
/// hooks you care about.
#[async_trait]
pub trait Plugin: Send + Sync {
    /// Plugin name for debugging and error messages.
    fn name(&self) -> &str;

    /// Plugin ordering: `Pre`, `Normal` (default), or `Post`.
    ///
    /// `Pre` plugins run before normal plugins (useful for alias resolution).
    /// `Post` plugins run after normal plugins (useful for minification).
    fn enforce(&self) -> PluginEnforce {
        PluginEnforce::Normal
    }

    /// Specifier filter for `resolve_id`.
    ///
    /// Return `Some(filter)` to let the driver skip the hook for specifiers
    /// the filter rejects. Drivers without filter support ignore this, so
    /// `resolve_id` must still decline non-matching specifiers itself.
    fn resolve_filter(&self) -> Option<&ResolveFilter> {
        None
    }

    /// Resolve a module specifier to an ID.
    ///
    /// Return `Some(result)` to handle this resolution, or `None` to let
    /// the next plugin or default resolver handle it.
    async fn resolve_id(
        &self,
        _specifier: &str,
        _importer: Option<&str>,
        _ctx: &PluginContext,
    ) -> HookResult<Option<ResolveIdResult>> {
        Ok(None)
    }

    /// React to a change in a watched file.
    ///
    /// Called during watch builds whenever a file a plugin registered via
    /// [`PluginContext::add_watch_file`] is created, updated, or deleted.
    async fn watch_change(
        &self,
        _path: &str,
        _change: WatchChangeKind,
        _ctx: &PluginContext,
    ) -> HookResult<()> {
        Ok(())
    }
}

/// A container for managing multiple plugins.
///
/// Plugins are sorted by their `enforce()` ordering: `Pre` → `Normal` → `Post`.
/// Within the same enforcement level, insertion order is preserved.
pub struct PluginContainer {
    plugins: Vec<Box<dyn Plugin>>,
    ctx: PluginContext,
    /// Whether `resolve_filter` patterns are honored before dispatch.
    native_filtering: bool,
}

impl PluginContainer {
    /// Create a new plugin container.
    #[must_use]
    pub fn new(cwd: PathBuf) -> Self {
        Self {
            plugins: Vec::new(),
            ctx: PluginContext::new(cwd),
            native_filtering: true,
        }
    }

    /// Add a plugin. Plugins are automatically sorted by enforce order.
    ///
    /// Uses a stable sort, so insertion order is preserved within each level.
    pub fn add(&mut self, plugin: Box<dyn Plugin>) {
        self.plugins.push(plugin);
        self.plugins.sort_by_key(|p| p.enforce());
    }

    /// Add several plugins at once.
    pub fn add_all(&mut self, plugins: impl IntoIterator<Item = Box<dyn Plugin>>) {
        self.plugins.extend(plugins);
        self.plugins.sort_by_key(|p| p.enforce());
    }

    /// Set watch mode.
    pub fn set_watch(&mut self, watch: bool) {
        self.ctx.watch = watch;
    }

    /// Enable or disable native `resolve_filter` handling.
    ///
    /// With filtering disabled every `resolve_id` hook is dispatched
    /// unconditionally, matching drivers that lack filter support.
    pub fn set_native_filtering(&mut self, enabled: bool) {
        self.native_filtering = enabled;
    }

    /// Get the hook context.
    #[must_use]
    pub fn context(&self) -> &PluginContext {
        &self.ctx
    }

    /// Try to resolve a module ID through plugins.
    /// Returns None if no plugin handled the resolution.
    pub async fn resolve_id(
        &self,
        specifier: &str,
        importer: Option<&str>,
    ) -> HookResult<Option<ResolveIdResult>> {
        for plugin in &self.plugins {
            if self.native_filtering {
                if let Some(filter) = plugin.resolve_filter() {
                    if !filter.matches(specifier) {
                        trace!(plugin = plugin.name(), specifier, "filtered out");
                        continue;
                    }
                }
            }
            if let Some(result) = plugin.resolve_id(specifier, importer, &self.ctx).await? {
                return Ok(Some(result));
            }
        }
        Ok(None)
    }

    /// Broadcast a watched-file change to all plugins.
    pub async fn watch_change(&self, path: &str, change: WatchChangeKind) -> HookResult<()> {
        for plugin in &self.plugins {
            plugin.watch_change(path, change, &self.ctx).await?;
        }
        Ok(())
    }
}

impl Default for PluginContainer {
    fn default() -> Self {
        Self::new(std::env::current_dir().unwrap_or_default())
    }
}
