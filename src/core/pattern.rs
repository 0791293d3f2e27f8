//! Path patterns used to select route rules.
//!
//! A pattern is a literal segment prefix with an optional trailing `/**`
//! wildcard marker. Exact patterns match one path; wildcard patterns match
//! the prefix itself plus everything below it, on segment boundaries only
//! (`/api/**` matches `/api` and `/api/v1/users`, never `/apiv2`).

/// A parsed route pattern: a normalized literal prefix plus a wildcard flag.
///
/// Patterns are parsed once when the rule table is built and are immutable
/// afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePattern {
    prefix: String,
    wildcard: bool,
}

impl RoutePattern {
    /// Parse a raw pattern string such as `/blog/**` or `/legacy`.
    ///
    /// The prefix is normalized to a leading slash and no trailing slash
    /// (the root pattern stays `/`). A bare `/**` becomes the catch-all that
    /// matches every path.
    pub fn parse(raw: &str) -> Self {
        let (stem, wildcard) = match raw.strip_suffix("/**") {
            Some(stem) => (stem, true),
            None => (raw, false),
        };

        let mut prefix = String::with_capacity(stem.len() + 1);
        if !stem.starts_with('/') {
            prefix.push('/');
        }
        prefix.push_str(stem);
        while prefix.len() > 1 && prefix.ends_with('/') {
            prefix.pop();
        }

        Self { prefix, wildcard }
    }

    /// The literal prefix of this pattern, without any wildcard marker.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Whether this pattern carries a trailing `/**` marker.
    pub fn is_wildcard(&self) -> bool {
        self.wildcard
    }

    /// Check whether `path` (query-free) is selected by this pattern.
    pub fn matches(&self, path: &str) -> bool {
        if self.wildcard {
            if self.prefix == "/" {
                return path.starts_with('/');
            }
            match path.strip_prefix(self.prefix.as_str()) {
                Some(rest) => rest.is_empty() || rest.starts_with('/'),
                None => false,
            }
        } else {
            path == self.prefix
        }
    }

    /// Ordering key for specificity: deeper prefixes win, and an exact
    /// pattern outranks a wildcard at the same depth.
    pub fn specificity(&self) -> (usize, bool) {
        (self.depth(), !self.wildcard)
    }

    /// Number of non-empty segments in the literal prefix.
    pub fn depth(&self) -> usize {
        self.prefix.split('/').filter(|s| !s.is_empty()).count()
    }
}

impl std::fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.wildcard {
            if self.prefix == "/" {
                write!(f, "/**")
            } else {
                write!(f, "{}/**", self.prefix)
            }
        } else {
            write!(f, "{}", self.prefix)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_pattern_matches_only_itself() {
        let p = RoutePattern::parse("/legacy");
        assert!(p.matches("/legacy"));
        assert!(!p.matches("/legacy/page"));
        assert!(!p.matches("/legacy2"));
        assert!(!p.matches("/"));
    }

    #[test]
    fn test_wildcard_matches_prefix_and_below() {
        let p = RoutePattern::parse("/api/**");
        assert!(p.matches("/api"));
        assert!(p.matches("/api/v1"));
        assert!(p.matches("/api/v1/users"));
        assert!(!p.matches("/apiv2"));
        assert!(!p.matches("/other"));
    }

    #[test]
    fn test_catch_all_matches_everything() {
        let p = RoutePattern::parse("/**");
        assert!(p.matches("/"));
        assert!(p.matches("/anything"));
        assert!(p.matches("/a/b/c"));
        assert_eq!(p.depth(), 0);
    }

    #[test]
    fn test_normalization() {
        assert_eq!(RoutePattern::parse("/blog/").prefix(), "/blog");
        assert_eq!(RoutePattern::parse("blog").prefix(), "/blog");
        assert_eq!(RoutePattern::parse("/").prefix(), "/");
        assert!(RoutePattern::parse("/blog/**").is_wildcard());
        assert!(!RoutePattern::parse("/blog").is_wildcard());
    }

    #[test]
    fn test_specificity_ordering() {
        let root = RoutePattern::parse("/**");
        let shallow = RoutePattern::parse("/a/**");
        let deep = RoutePattern::parse("/a/b/**");
        let exact = RoutePattern::parse("/a/b");

        let mut patterns = vec![exact.clone(), root.clone(), deep.clone(), shallow.clone()];
        patterns.sort_by_key(|p| p.specificity());

        assert_eq!(patterns, vec![root, shallow, deep, exact]);
    }

    #[test]
    fn test_display_round_trip() {
        for raw in ["/", "/**", "/blog", "/blog/**", "/a/b/c/**"] {
            assert_eq!(RoutePattern::parse(raw).to_string(), raw);
        }
    }
}
