//! Public / protected route classification.
//!
//! A path is public if it starts with any public prefix and protected if it
//! starts with any protected prefix. The two flags are computed independently
//! and list order never affects the result.

use crate::routing::matcher::{AnyMatcher, Matcher};

/// Classification of a single request path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouteClassification {
    pub is_public: bool,
    pub is_protected: bool,
}

/// Immutable prefix-list classifier.
#[derive(Debug)]
pub struct RouteClassifier {
    public: AnyMatcher,
    protected: AnyMatcher,
}

impl RouteClassifier {
    pub fn new(public: Vec<String>, protected: Vec<String>) -> Self {
        Self {
            public: AnyMatcher::prefixes(public),
            protected: AnyMatcher::prefixes(protected),
        }
    }

    pub fn classify(&self, path: &str) -> RouteClassification {
        RouteClassification {
            is_public: self.public.matches(path),
            is_protected: self.protected.matches(path),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RoutesConfig;

    fn default_classifier() -> RouteClassifier {
        let routes = RoutesConfig::default();
        RouteClassifier::new(routes.public, routes.protected)
    }

    #[test]
    fn test_protected_prefix_and_children() {
        let classifier = default_classifier();

        assert!(classifier.classify("/products").is_protected);
        assert!(classifier.classify("/products/123").is_protected);
        assert!(classifier.classify("/dashboard").is_protected);
        assert!(!classifier.classify("/dashboard").is_public);
    }

    #[test]
    fn test_public_routes() {
        let classifier = default_classifier();

        let login = classifier.classify("/login");
        assert!(login.is_public);
        assert!(!login.is_protected);
        assert!(classifier.classify("/api/auth/login").is_public);
        assert!(classifier.classify("/api/health").is_public);
    }

    #[test]
    fn test_unclassified_path() {
        let classifier = default_classifier();

        assert_eq!(classifier.classify("/about"), RouteClassification::default());
        assert_eq!(classifier.classify("/api/products"), RouteClassification::default());
    }

    #[test]
    fn test_flags_are_independent() {
        let classifier = RouteClassifier::new(vec!["/shared".into()], vec!["/shared".into()]);

        let c = classifier.classify("/shared/x");
        assert!(c.is_public);
        assert!(c.is_protected);
    }

    #[test]
    fn test_order_does_not_matter() {
        let a = RouteClassifier::new(vec![], vec!["/orders".into(), "/profile".into()]);
        let b = RouteClassifier::new(vec![], vec!["/profile".into(), "/orders".into()]);

        for path in ["/orders", "/profile/edit", "/other"] {
            assert_eq!(a.classify(path), b.classify(path));
        }
    }

    #[test]
    fn test_monotonic_under_prefix_extension() {
        let classifier = default_classifier();

        for base in ["/login", "/dashboard", "/api/health", "/orders"] {
            let before = classifier.classify(base);
            for suffix in ["", "/", "/x", "?q=1", "-archive"] {
                let after = classifier.classify(&format!("{base}{suffix}"));
                assert!(!before.is_public || after.is_public);
                assert!(!before.is_protected || after.is_protected);
            }
        }
    }
}
