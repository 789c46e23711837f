//! Path matching logic.
//!
//! # Responsibilities
//! - Match literal path prefixes (case-sensitive)
//! - Match file extensions on the final path segment
//! - Combine matchers with OR semantics
//!
//! # Design Decisions
//! - Path matching is case-sensitive
//! - Literal comparisons only; no regex, no path parameters
//! - An empty matcher list never matches

/// Trait for matching request paths against conditions.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Returns true if the path matches this condition.
    fn matches(&self, path: &str) -> bool;
}

/// Matches the request path prefix.
#[derive(Debug, Clone)]
pub struct PathPrefixMatcher {
    prefix: String,
}

impl PathPrefixMatcher {
    /// Create a new path prefix matcher.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Matcher for PathPrefixMatcher {
    fn matches(&self, path: &str) -> bool {
        path.starts_with(&self.prefix)
    }
}

/// Matches paths whose last segment ends in `.<extension>`.
#[derive(Debug, Clone)]
pub struct ExtensionMatcher {
    suffix: String,
}

impl ExtensionMatcher {
    /// Create a matcher for an extension given without the dot, e.g. `"png"`.
    pub fn new(extension: impl AsRef<str>) -> Self {
        Self {
            suffix: format!(".{}", extension.as_ref()),
        }
    }
}

impl Matcher for ExtensionMatcher {
    fn matches(&self, path: &str) -> bool {
        path.ends_with(&self.suffix)
    }
}

/// Combines multiple matchers with OR semantics.
#[derive(Debug, Default)]
pub struct AnyMatcher {
    matchers: Vec<Box<dyn Matcher>>,
}

impl AnyMatcher {
    pub fn new(matchers: Vec<Box<dyn Matcher>>) -> Self {
        Self { matchers }
    }

    /// Build from a list of literal prefixes.
    pub fn prefixes<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            prefixes
                .into_iter()
                .map(|p| Box::new(PathPrefixMatcher::new(p)) as Box<dyn Matcher>)
                .collect(),
        )
    }
}

impl Matcher for AnyMatcher {
    fn matches(&self, path: &str) -> bool {
        self.matchers.iter().any(|m| m.matches(path))
    }
}

/// Static assets (build output, favicon, images) that skip the gatekeeper.
#[derive(Debug)]
pub struct AssetExclusion {
    matcher: AnyMatcher,
}

impl AssetExclusion {
    pub fn new(prefixes: &[String], extensions: &[String]) -> Self {
        let mut matchers: Vec<Box<dyn Matcher>> = Vec::new();
        for prefix in prefixes {
            matchers.push(Box::new(PathPrefixMatcher::new(prefix.clone())));
        }
        for ext in extensions {
            matchers.push(Box::new(ExtensionMatcher::new(ext)));
        }
        Self {
            matcher: AnyMatcher::new(matchers),
        }
    }

    /// Returns true if the path must bypass the gatekeeper entirely.
    pub fn is_excluded(&self, path: &str) -> bool {
        self.matcher.matches(path)
    }
}
