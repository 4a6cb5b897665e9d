//! Extension ownership checks.
//!
//! An instance owns a set of dot-prefixed suffixes like `.graphql`. The set
//! doubles as anchored regex patterns for drivers with native resolve
//! filtering and as a plain suffix check for drivers without it.

use regex::Regex;
use sidecar_hooks::ResolveFilter;

use crate::error::Error;

/// The validated set of extensions one plugin instance owns.
#[derive(Debug, Clone)]
pub struct ExtensionSet {
    extensions: Vec<String>,
    patterns: Vec<Regex>,
}

impl ExtensionSet {
    /// Validate extensions and compile their filter patterns.
    ///
    /// Every entry must start with `.` and name at least one character of
    /// suffix. The set must be non-empty.
    pub fn new(extensions: Vec<String>) -> Result<Self, Error> {
        if extensions.is_empty() {
            return Err(Error::NoExtensions);
        }
        let mut patterns = Vec::with_capacity(extensions.len());
        for ext in &extensions {
            if !ext.starts_with('.') || ext.len() < 2 {
                return Err(Error::InvalidExtension(ext.clone()));
            }
            let anchored = format!("{}$", regex::escape(ext));
            let pattern =
                Regex::new(&anchored).map_err(|_| Error::InvalidExtension(ext.clone()))?;
            patterns.push(pattern);
        }
        Ok(Self {
            extensions,
            patterns,
        })
    }

    /// Whether a path ends with one of the owned extensions.
    ///
    /// Plain suffix check, used even when the driver already applied the
    /// native filter: a driver without filter support dispatches every
    /// specifier, and a wrong match here would serve a wrong artifact.
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        self.extensions.iter().any(|ext| path.ends_with(ext.as_str()))
    }

    /// Anchored patterns for a driver's native resolve filter.
    #[must_use]
    pub fn filter(&self) -> ResolveFilter {
        ResolveFilter::new(self.patterns.clone())
    }

    /// Comma-joined extension list, used for default instance names.
    #[must_use]
    pub fn joined(&self) -> String {
        self.extensions.join(",")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_empty_set() {
        assert!(matches!(ExtensionSet::new(vec![]), Err(Error::NoExtensions)));
    }

    #[test]
    fn test_rejects_missing_dot() {
        let err = ExtensionSet::new(vec!["graphql".to_string()]).unwrap_err();
        assert!(matches!(err, Error::InvalidExtension(ext) if ext == "graphql"));
    }

    #[test]
    fn test_rejects_bare_dot() {
        let err = ExtensionSet::new(vec![".".to_string()]).unwrap_err();
        assert!(matches!(err, Error::InvalidExtension(ext) if ext == "."));
    }

    #[test]
    fn test_suffix_matching() {
        let set = ExtensionSet::new(vec![".widget".to_string(), ".gadget".to_string()]).unwrap();

        assert!(set.matches("a.widget"));
        assert!(set.matches("/proj/deep/b.gadget"));
        assert!(!set.matches("a.widget.bak"));
        assert!(!set.matches("awidget"));
        assert!(!set.matches("a.js"));
    }

    #[test]
    fn test_filter_patterns_are_anchored() {
        let set = ExtensionSet::new(vec![".svc".to_string()]).unwrap();
        let filter = set.filter();

        assert!(filter.matches("api.svc"));
        assert!(!filter.matches("api.svc.map"));
        // The dot is escaped, so it is not a wildcard.
        assert!(!filter.matches("apixsvc"));
    }

    #[test]
    fn test_joined() {
        let set = ExtensionSet::new(vec![".a".to_string(), ".b".to_string()]).unwrap();
        assert_eq!(set.joined(), ".a,.b");
    }
}
