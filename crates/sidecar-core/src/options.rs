//! Per-instance configuration and the plugin factory.

use futures::future::{BoxFuture, FutureExt};
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use sidecar_hooks::Plugin;

use crate::error::Error;
use crate::generate::SidecarPlugin;
use crate::resolve::PathResolver;
use crate::storage::Storage;

/// Suffix appended to a source path to name its generated file.
pub const DEFAULT_GENERATED_SUFFIX: &str = ".d.ts";

/// Error a transform can fail with.
pub type TransformError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Stored transform: source text and resolved source path to generated text.
pub type TransformFn = Arc<
    dyn Fn(String, PathBuf) -> BoxFuture<'static, Result<String, TransformError>> + Send + Sync,
>;

/// One-or-many extension arguments accepted by [`Options::new`].
pub trait IntoExtensions {
    fn into_extensions(self) -> Vec<String>;
}

impl IntoExtensions for &str {
    fn into_extensions(self) -> Vec<String> {
        vec![self.to_string()]
    }
}

impl IntoExtensions for String {
    fn into_extensions(self) -> Vec<String> {
        vec![self]
    }
}

impl IntoExtensions for Vec<String> {
    fn into_extensions(self) -> Vec<String> {
        self
    }
}

impl IntoExtensions for Vec<&str> {
    fn into_extensions(self) -> Vec<String> {
        self.into_iter().map(str::to_string).collect()
    }
}

impl IntoExtensions for &[&str] {
    fn into_extensions(self) -> Vec<String> {
        self.iter().map(|ext| (*ext).to_string()).collect()
    }
}

impl<const N: usize> IntoExtensions for [&str; N] {
    fn into_extensions(self) -> Vec<String> {
        self.iter().map(|ext| (*ext).to_string()).collect()
    }
}

/// Configuration for one generation plugin instance.
///
/// Only the extension set and the transform are required; everything else
/// has a default. Instances built from the same options share nothing.
#[derive(Clone)]
pub struct Options {
    pub(crate) name: Option<String>,
    pub(crate) extensions: Vec<String>,
    pub(crate) transform: TransformFn,
    pub(crate) generated_suffix: Option<String>,
    pub(crate) storage: Option<Arc<dyn Storage>>,
    pub(crate) resolver: Option<Arc<dyn PathResolver>>,
}

impl Options {
    /// Options for the given extension(s) and transform.
    ///
    /// The transform receives the source text and the resolved source path
    /// and returns the generated text.
    pub fn new<E, F, Fut>(extension: E, transform: F) -> Self
    where
        E: IntoExtensions,
        F: Fn(String, PathBuf) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<String, TransformError>> + Send + 'static,
    {
        Self {
            name: None,
            extensions: extension.into_extensions(),
            transform: Arc::new(move |code: String, path: PathBuf| transform(code, path).boxed()),
            generated_suffix: None,
            storage: None,
            resolver: None,
        }
    }

    /// Override the instance name used in logs and error messages.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Override the generated-file suffix (default `.d.ts`).
    #[must_use]
    pub fn generated_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.generated_suffix = Some(suffix.into());
        self
    }

    /// Override storage (default: the host filesystem).
    #[must_use]
    pub fn storage(mut self, storage: Arc<dyn Storage>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Override path resolution (default: platform path semantics).
    #[must_use]
    pub fn resolver(mut self, resolver: Arc<dyn PathResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }
}

/// Build one generation plugin.
pub fn plugin(options: Options) -> Result<Box<dyn Plugin>, Error> {
    Ok(Box::new(SidecarPlugin::new(options)?))
}

/// Build one generation plugin per options value.
pub fn plugins(options: impl IntoIterator<Item = Options>) -> Result<Vec<Box<dyn Plugin>>, Error> {
    options.into_iter().map(plugin).collect()
}
