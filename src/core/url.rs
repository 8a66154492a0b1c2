//! URL helpers for matching asset references against notified paths.
//!
//! - Comparison: query string and fragment stripped, percent-decoded
//! - Rewrite: only the cache-busting query parameter changes

use std::sync::OnceLock;

use percent_encoding::percent_decode_str;

/// Decoded path portion of a reference URL (no query, no fragment).
///
/// Accepts absolute URLs (`http://host/a.js?v=1`) as well as root-relative
/// and relative references (`/a.js`, `a.js`).
pub fn reference_path(reference: &str) -> String {
    // Use a dummy base URL so relative references parse too
    static BASE: OnceLock<Option<url::Url>> = OnceLock::new();
    let base = BASE.get_or_init(|| url::Url::parse("http://x").ok());

    match base.as_ref().map(|b| b.join(reference.trim())) {
        Some(Ok(parsed)) => decode(parsed.path()),
        // Fallback to simple split if url parsing fails
        _ => decode(strip_query_fragment(reference)),
    }
}

/// Everything before the first `?` or `#`.
pub fn strip_query_fragment(url: &str) -> &str {
    url.split(['?', '#']).next().unwrap_or(url)
}

/// Percent-decode, keeping the input when it is not valid UTF-8.
fn decode(path: &str) -> String {
    percent_decode_str(path)
        .decode_utf8()
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}

/// Whether a reference URL points at `resource_path`.
///
/// Suffix-based so that a server-relative path such as `app/styles/main.css`
/// matches `https://host/base/app/styles/main.css?t=1`.
pub fn matches_resource(reference: &str, resource_path: &str) -> bool {
    let wanted = decode(strip_query_fragment(resource_path));
    if wanted.is_empty() {
        return false;
    }
    reference_path(reference).ends_with(wanted.as_str())
}

/// Rewrite `url` so that `param=stamp` is its only cache-busting parameter.
///
/// Other query parameters and the fragment are kept in order.
pub fn with_cache_bust(url: &str, param: &str, stamp: u64) -> String {
    let (rest, fragment) = match url.split_once('#') {
        Some((rest, fragment)) => (rest, Some(fragment)),
        None => (url, None),
    };
    let (base, query) = match rest.split_once('?') {
        Some((base, query)) => (base, query),
        None => (rest, ""),
    };

    let stamp_pair = format!("{param}={stamp}");
    let mut pairs: Vec<&str> = query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .filter(|pair| pair.split('=').next() != Some(param))
        .collect();
    pairs.push(&stamp_pair);

    let mut out = format!("{base}?{}", pairs.join("&"));
    if let Some(fragment) = fragment {
        out.push('#');
        out.push_str(fragment);
    }
    out
}
