//! Path resolution for import specifiers.
//!
//! Resolution is lexical: segments are joined and `.`/`..` components are
//! collapsed without consulting the filesystem, so a source can be resolved
//! before its generated artifact exists.

use async_trait::async_trait;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Joins path segments into one absolute, normalized path.
///
/// Pluggable so tests and virtual pipelines can resolve deterministically
/// without touching the host filesystem.
#[async_trait]
pub trait PathResolver: Send + Sync {
    /// Resolve segments left to right into an absolute path.
    ///
    /// A later absolute segment restarts resolution from itself. A result
    /// that is still relative is resolved against the working directory.
    async fn resolve(&self, segments: &[&Path]) -> io::Result<PathBuf>;
}

/// Default resolver using platform path semantics.
#[derive(Debug, Default)]
pub struct OsResolver {
    cwd: Option<PathBuf>,
}

impl OsResolver {
    /// Resolver anchored at the process working directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolver anchored at a fixed directory instead of the process cwd.
    #[must_use]
    pub fn rooted(cwd: impl Into<PathBuf>) -> Self {
        Self {
            cwd: Some(cwd.into()),
        }
    }
}

#[async_trait]
impl PathResolver for OsResolver {
    async fn resolve(&self, segments: &[&Path]) -> io::Result<PathBuf> {
        let mut joined = PathBuf::new();
        for segment in segments {
            if segment.is_absolute() {
                joined = segment.to_path_buf();
            } else {
                joined.push(segment);
            }
        }

        if joined.is_relative() {
            let base = match &self.cwd {
                Some(cwd) => cwd.clone(),
                None => std::env::current_dir()?,
            };
            joined = base.join(joined);
        }

        Ok(normalize(&joined))
    }
}

/// Collapse `.` and `..` components lexically.
///
/// `..` at the root stays at the root, matching platform resolvers.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn resolve(segments: &[&str]) -> PathBuf {
        let resolver = OsResolver::rooted("/cwd");
        let segments: Vec<&Path> = segments.iter().map(Path::new).collect();
        resolver.resolve(&segments).await.unwrap()
    }

    #[tokio::test]
    async fn test_importer_relative_resolution() {
        // The importer's file name is dropped by the ".." segment.
        let resolved = resolve(&["/proj/x.js", "..", "./a.widget"]).await;
        assert_eq!(resolved, PathBuf::from("/proj/a.widget"));
    }

    #[tokio::test]
    async fn test_later_absolute_segment_wins() {
        let resolved = resolve(&["/proj/x.js", "/other/y.widget"]).await;
        assert_eq!(resolved, PathBuf::from("/other/y.widget"));
    }

    #[tokio::test]
    async fn test_relative_result_uses_cwd() {
        let resolved = resolve(&["src", "mod.widget"]).await;
        assert_eq!(resolved, PathBuf::from("/cwd/src/mod.widget"));
    }

    #[tokio::test]
    async fn test_parent_traversal() {
        let resolved = resolve(&["/proj/src/x.js", "..", "../shared/a.widget"]).await;
        assert_eq!(resolved, PathBuf::from("/proj/shared/a.widget"));
    }

    #[tokio::test]
    async fn test_parent_clamps_at_root() {
        let resolved = resolve(&["/a.js", "..", "..", "..", "b.widget"]).await;
        assert_eq!(resolved, PathBuf::from("/b.widget"));
    }

    #[tokio::test]
    async fn test_curdir_components_dropped() {
        let resolved = resolve(&["/proj/./src/.", "./a.widget"]).await;
        assert_eq!(resolved, PathBuf::from("/proj/src/a.widget"));
    }
}
