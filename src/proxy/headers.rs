//! Header collection helpers.
//!
//! `HeaderMap` already is a case-insensitive ordered multi-map and its
//! `Clone` is deep; these helpers add the copy semantics the proxy needs.

use axum::http::HeaderMap;

/// Copy every header of `from` into `to`, replacing all values `to` had for
/// the same name.
pub fn copy_headers(to: &mut HeaderMap, from: &HeaderMap) {
    for name in from.keys() {
        to.remove(name);
        for value in from.get_all(name) {
            to.append(name.clone(), value.clone());
        }
    }
}

/// An independent copy of `headers`.
pub fn clone_headers(headers: &HeaderMap) -> HeaderMap {
    let mut cloned = HeaderMap::with_capacity(headers.len());
    copy_headers(&mut cloned, headers);
    cloned
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copy_replaces_per_name() {
        let mut to = HeaderMap::new();
        to.insert("content-type", "text/plain".parse().unwrap());
        to.insert("x-filter", "kept".parse().unwrap());

        let mut from = HeaderMap::new();
        from.append("Content-Type", "application/json".parse().unwrap());
        from.append("set-cookie", "a=1".parse().unwrap());
        from.append("Set-Cookie", "b=2".parse().unwrap());

        copy_headers(&mut to, &from);

        assert_eq!(to["content-type"], "application/json");
        assert_eq!(to.get_all("set-cookie").iter().count(), 2);
        assert_eq!(to["x-filter"], "kept");
    }

    #[test]
    fn test_clone_is_independent() {
        let mut original = HeaderMap::new();
        original.append("accept", "a".parse().unwrap());
        original.append("accept", "b".parse().unwrap());

        let mut cloned = clone_headers(&original);
        assert_eq!(cloned, original);

        cloned.append("accept", "c".parse().unwrap());
        cloned.insert("x-new", "1".parse().unwrap());
        assert_eq!(original.get_all("accept").iter().count(), 2);
        assert!(original.get("x-new").is_none());
    }
}
