//! Query string decoding.

use std::collections::BTreeMap;

/// Decoded query parameters. A key written without `=` maps to `None`.
pub type QueryMap = BTreeMap<String, Option<String>>;

/// Decode a raw query string (the part after `?`) into a flat map.
///
/// Pairs are split on `&`, then on the first `=`. Values are taken literally:
/// percent-escapes are not decoded. A later duplicate key replaces an earlier
/// one.
///
/// Empty pairs (`a=1&&b=2`, a trailing `&`, or an empty query) are skipped
/// rather than producing an empty key, so `""` never appears as a key and an
/// empty query yields an empty map.
pub fn decode_query(query: Option<&str>) -> QueryMap {
    let mut params = QueryMap::new();
    let Some(q) = query else {
        return params;
    };
    for pair in q.split('&').filter(|s| !s.is_empty()) {
        match pair.split_once('=') {
            Some((key, value)) => {
                params.insert(key.to_string(), Some(value.to_string()));
            }
            None => {
                params.insert(pair.to_string(), None);
            }
        }
    }
    params
}
