//! Pure URL/path helpers used by the rule rewrite logic.
//!
//! These are deterministic string functions with no I/O. Query strings are
//! parsed and re-serialized with `form_urlencoded` rather than concatenated,
//! so percent-encoding and repeated keys survive a rewrite.
use url::form_urlencoded;

/// Split a raw request path into its query-free path and optional query string.
pub fn split_query(path: &str) -> (&str, Option<&str>) {
    match path.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (path, None),
    }
}

/// Remove a leading `base` prefix from `path`, respecting segment boundaries.
///
/// The result always keeps a leading slash (`/blog` stripped of `/blog` is
/// `/`). A `base` of `/` or the empty string is a no-op, and a path that does
/// not actually start with `base` is returned unchanged rather than failing.
/// A query string riding on `path` is preserved.
pub fn strip_base(path: &str, base: &str) -> String {
    let base = base.trim_end_matches('/');
    if base.is_empty() {
        return path.to_string();
    }

    match path.strip_prefix(base) {
        Some("") => "/".to_string(),
        Some(rest) if rest.starts_with('/') => rest.to_string(),
        Some(rest) if rest.starts_with('?') => format!("/{rest}"),
        _ => path.to_string(),
    }
}

/// Join a base path (or URL) with a sub-path, collapsing duplicate slashes
/// at the seam. A `rest` that is only a query string attaches directly.
pub fn join_paths(base: &str, rest: &str) -> String {
    let base = base.trim_end_matches('/');
    let rest = rest.trim_start_matches('/');

    if rest.is_empty() {
        return if base.is_empty() {
            "/".to_string()
        } else {
            base.to_string()
        };
    }
    if rest.starts_with('?') {
        return if base.is_empty() {
            format!("/{rest}")
        } else {
            format!("{base}{rest}")
        };
    }
    format!("{base}/{rest}")
}

/// Re-attach `query` onto `target`, merging with any query `target` already
/// carries. Incoming keys override existing ones; repeated incoming keys all
/// survive. Pairs are parsed and re-serialized, never spliced as raw text.
pub fn append_query(target: &str, query: &str) -> String {
    let (target_path, existing) = split_query(target);

    let incoming: Vec<(String, String)> = form_urlencoded::parse(query.as_bytes())
        .into_owned()
        .collect();

    let mut pairs: Vec<(String, String)> = existing
        .map(|q| {
            form_urlencoded::parse(q.as_bytes())
                .into_owned()
                .filter(|(key, _)| !incoming.iter().any(|(k, _)| k == key))
                .collect()
        })
        .unwrap_or_default();
    pairs.extend(incoming);

    if pairs.is_empty() {
        return target_path.to_string();
    }

    let serialized = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish();
    format!("{target_path}?{serialized}")
}
