//! The generation engine.
//!
//! One [`SidecarPlugin`] owns one extension set, one suffix, and one
//! transform. Resolving an import of an owned extension reads the source,
//! runs the transform, writes the output next to the source, and resolves
//! to the generated file. Watch events keep that file in sync afterwards.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, trace};

use sidecar_hooks::{
    HookResult, Plugin, PluginContext, PluginEnforce, PluginError, ResolveFilter, ResolveIdResult,
    WatchChangeKind,
};

use crate::error::Error;
use crate::matcher::ExtensionSet;
use crate::options::{Options, TransformFn, DEFAULT_GENERATED_SUFFIX};
use crate::resolve::{OsResolver, PathResolver};
use crate::storage::{DiskStorage, Storage};

/// Plugin that generates a sidecar file for imports of owned extensions.
///
/// The engine keeps no state between events: every resolution and every
/// update re-reads the source and re-runs the transform, so the generated
/// file always reflects the last content read from storage.
pub struct SidecarPlugin {
    name: String,
    extensions: ExtensionSet,
    filter: ResolveFilter,
    suffix: String,
    transform: TransformFn,
    storage: Arc<dyn Storage>,
    resolver: Arc<dyn PathResolver>,
}

impl SidecarPlugin {
    /// Build an instance, applying defaults for unset options.
    pub fn new(options: Options) -> Result<Self, Error> {
        let extensions = ExtensionSet::new(options.extensions)?;
        let filter = extensions.filter();
        let name = options
            .name
            .unwrap_or_else(|| format!("sidecar({})", extensions.joined()));
        let suffix = options
            .generated_suffix
            .unwrap_or_else(|| DEFAULT_GENERATED_SUFFIX.to_string());
        let storage = options.storage.unwrap_or_else(|| Arc::new(DiskStorage));
        let resolver = options
            .resolver
            .unwrap_or_else(|| Arc::new(OsResolver::new()));

        Ok(Self {
            name,
            extensions,
            filter,
            suffix,
            transform: options.transform,
            storage,
            resolver,
        })
    }

    fn generated_path(&self, source: &str) -> String {
        format!("{source}{}", self.suffix)
    }

    fn hook_error(&self, hook: &'static str, err: &Error) -> PluginError {
        PluginError::new(self.name.as_str(), hook, err.to_string())
    }

    /// Run the transform on source contents and write the generated file.
    ///
    /// Returns the generated file's path. Nothing is written when the
    /// transform fails, so a stale artifact survives a failed regeneration.
    async fn regenerate(&self, source: &str, code: String) -> Result<String, Error> {
        let generated = self.generated_path(source);

        let output = (self.transform)(code, PathBuf::from(source))
            .await
            .map_err(|e| Error::Transform {
                path: source.to_string(),
                source: e,
            })?;

        self.storage
            .write_file(Path::new(&generated), &output)
            .await
            .map_err(|e| Error::Write {
                path: PathBuf::from(&generated),
                source: e,
            })?;

        debug!(plugin = %self.name, source, generated = %generated, "generated sidecar");
        Ok(generated)
    }
}

#[async_trait]
impl Plugin for SidecarPlugin {
    fn name(&self) -> &str {
        &self.name
    }

    fn enforce(&self) -> PluginEnforce {
        PluginEnforce::Pre
    }

    fn resolve_filter(&self) -> Option<&ResolveFilter> {
        Some(&self.filter)
    }

    async fn resolve_id(
        &self,
        specifier: &str,
        importer: Option<&str>,
        ctx: &PluginContext,
    ) -> HookResult<Option<ResolveIdResult>> {
        // Re-check the suffix: the driver may not support native filters.
        if !self.extensions.matches(specifier) {
            return Ok(None);
        }

        let source = match importer {
            Some(importer) => {
                let resolved = self
                    .resolver
                    .resolve(&[Path::new(importer), Path::new(".."), Path::new(specifier)])
                    .await
                    .map_err(|e| {
                        self.hook_error(
                            "resolveId",
                            &Error::Resolve {
                                specifier: specifier.to_string(),
                                source: e,
                            },
                        )
                    })?;
                resolved.to_string_lossy().into_owned()
            }
            None => specifier.to_string(),
        };

        let code = match self.storage.read_file(Path::new(&source)).await {
            Some(code) => code,
            None => {
                trace!(plugin = %self.name, source = %source, "source absent, declining");
                return Ok(None);
            }
        };

        ctx.add_watch_file(&source);

        let generated = self
            .regenerate(&source, code)
            .await
            .map_err(|e| self.hook_error("resolveId", &e))?;

        Ok(Some(ResolveIdResult::resolved(generated)))
    }

    async fn watch_change(
        &self,
        path: &str,
        change: WatchChangeKind,
        _ctx: &PluginContext,
    ) -> HookResult<()> {
        if !self.extensions.matches(path) {
            return Ok(());
        }

        match change {
            // A new source generates lazily on first import.
            WatchChangeKind::Create => Ok(()),
            WatchChangeKind::Update => {
                let code = match self.storage.read_file(Path::new(path)).await {
                    Some(code) => code,
                    None => {
                        trace!(plugin = %self.name, path, "updated source absent, skipping");
                        return Ok(());
                    }
                };
                self.regenerate(path, code)
                    .await
                    .map_err(|e| self.hook_error("watchChange", &e))?;
                Ok(())
            }
            WatchChangeKind::Delete => {
                let generated = self.generated_path(path);
                match self.storage.rm(Path::new(&generated)).await {
                    Ok(()) => {
                        debug!(plugin = %self.name, path, generated = %generated, "removed sidecar");
                        Ok(())
                    }
                    Err(e) => Err(self.hook_error(
                        "watchChange",
                        &Error::Remove {
                            path: PathBuf::from(generated),
                            source: e,
                        },
                    )),
                }
            }
        }
    }
}
