//! The immutable pattern table built once from configuration.
//!
//! `RuleTable` owns every registered `(pattern, rule)` pair, pre-sorted by
//! specificity. It is built by the composition root at startup, then shared
//! read-only across all request handlers; after construction nothing mutates
//! it, so unsynchronized concurrent reads are safe.
use std::collections::HashMap;

use crate::{
    config::models::RouteRule,
    core::{merge::merge_rules, pattern::RoutePattern},
};

/// Insertion-time-built index over the static rule table.
#[derive(Debug, Clone, Default)]
pub struct RuleTable {
    /// Sorted least→most specific so `match_all` preserves merge order.
    entries: Vec<(RoutePattern, RouteRule)>,
}

impl RuleTable {
    /// Build the table from the configured pattern→rule map.
    ///
    /// Wildcard rules with a wildcard redirect/proxy target and no explicit
    /// `strip_base` get the pattern's own literal prefix as their strip base,
    /// so `/blog/** → /news/**` rewrites without extra configuration.
    pub fn new(rules: &HashMap<String, RouteRule>) -> Self {
        let mut entries: Vec<(RoutePattern, RouteRule)> = rules
            .iter()
            .map(|(raw, rule)| {
                let pattern = RoutePattern::parse(raw);
                let mut rule = rule.clone();
                if pattern.is_wildcard() {
                    fill_strip_base(&mut rule, pattern.prefix());
                }
                (pattern, rule)
            })
            .collect();

        entries.sort_by(|(a, _), (b, _)| {
            a.specificity()
                .cmp(&b.specificity())
                .then_with(|| a.prefix().cmp(b.prefix()))
        });

        Self { entries }
    }

    /// Every rule whose pattern matches `path` (query-free), ordered from
    /// least to most specific. Yields nothing when no pattern matches.
    pub fn match_all<'a>(&'a self, path: &'a str) -> impl Iterator<Item = &'a RouteRule> {
        self.entries
            .iter()
            .filter(move |(pattern, _)| pattern.matches(path))
            .map(|(_, rule)| rule)
    }

    /// Resolve the effective rule for `path`: match everything, then fold
    /// with most-specific-wins precedence. An unmatched path yields the
    /// empty rule, never an error.
    pub fn resolve(&self, path: &str) -> RouteRule {
        merge_rules(self.match_all(path))
    }

    /// Number of registered patterns.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no pattern is registered at all.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn fill_strip_base(rule: &mut RouteRule, prefix: &str) {
    if let Some(redirect) = &mut rule.redirect {
        if redirect.to.ends_with("/**") && redirect.strip_base.is_none() {
            redirect.strip_base = Some(prefix.to_string());
        }
    }
    if let Some(proxy) = &mut rule.proxy {
        if proxy.to.ends_with("/**") && proxy.strip_base.is_none() {
            proxy.strip_base = Some(prefix.to_string());
        }
    }
}
