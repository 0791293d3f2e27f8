//! Deterministic merging of matched rules into one effective rule.
//!
//! All rules matching a path are folded in least→most specific order; a later
//! rule overrides an earlier one at every nesting level. Mapping-valued
//! fields merge key-by-key, scalars and arrays are replaced wholesale, and a
//! later redirect/proxy directive inherits any optional field it leaves
//! unset. Registration order never participates in precedence.
use serde_json::Value;

use crate::config::models::RouteRule;

/// Fold an ordered sequence of rules (least specific first) into the single
/// effective rule for a path.
///
/// The result is a plain value; callers that share it across a request
/// pipeline wrap it in an `Arc` and must treat it as read-only.
pub fn merge_rules<'a, I>(rules: I) -> RouteRule
where
    I: IntoIterator<Item = &'a RouteRule>,
{
    let mut merged = RouteRule::default();
    for rule in rules {
        overlay(&mut merged, rule);
    }
    merged
}

/// Apply `rule` on top of `base`, with `rule` winning every conflict.
fn overlay(base: &mut RouteRule, rule: &RouteRule) {
    if let Some(headers) = &rule.headers {
        base.headers
            .get_or_insert_with(Default::default)
            .extend(headers.iter().map(|(k, v)| (k.clone(), v.clone())));
    }

    if let Some(redirect) = &rule.redirect {
        match &mut base.redirect {
            Some(merged) => {
                merged.to = redirect.to.clone();
                if redirect.status_code.is_some() {
                    merged.status_code = redirect.status_code;
                }
                if redirect.strip_base.is_some() {
                    merged.strip_base = redirect.strip_base.clone();
                }
            }
            None => base.redirect = Some(redirect.clone()),
        }
    }

    if let Some(proxy) = &rule.proxy {
        match &mut base.proxy {
            Some(merged) => {
                merged.to = proxy.to.clone();
                if proxy.strip_base.is_some() {
                    merged.strip_base = proxy.strip_base.clone();
                }
                if let Some(headers) = &proxy.headers {
                    merged
                        .headers
                        .get_or_insert_with(Default::default)
                        .extend(headers.iter().map(|(k, v)| (k.clone(), v.clone())));
                }
                for (key, value) in &proxy.options {
                    merge_value(merged.options.entry(key.clone()).or_insert(Value::Null), value);
                }
            }
            None => base.proxy = Some(proxy.clone()),
        }
    }

    for (key, value) in &rule.extra {
        merge_value(base.extra.entry(key.clone()).or_insert(Value::Null), value);
    }
}

/// Recursive key-wise merge for opaque JSON directives: objects merge by
/// key, anything else is replaced by the later value.
fn merge_value(base: &mut Value, incoming: &Value) {
    match (base, incoming) {
        (Value::Object(base_map), Value::Object(incoming_map)) => {
            for (key, value) in incoming_map {
                merge_value(base_map.entry(key.clone()).or_insert(Value::Null), value);
            }
        }
        (base, incoming) => *base = incoming.clone(),
    }
}
