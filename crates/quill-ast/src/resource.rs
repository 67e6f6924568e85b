//! Namespaced identifiers (`namespace:path`) and registry tag references

/// Marks an identifier as a reference to a registry tag: `#minecraft:logs`
pub const TAG_PREFIX: char = '#';

/// Namespace assumed when an identifier omits one
pub const DEFAULT_NAMESPACE: &str = "minecraft";

/// Expand an identifier to its full `namespace:path` form.
///
/// A leading tag prefix is preserved: `#logs` becomes `#minecraft:logs`.
pub fn lengthen(id: &str) -> String {
    if let Some(rest) = id.strip_prefix(TAG_PREFIX) {
        return format!("{}{}", TAG_PREFIX, lengthen(rest));
    }
    match id.split_once(':') {
        Some(("", path)) => format!("{}:{}", DEFAULT_NAMESPACE, path),
        Some(_) => id.to_string(),
        None => format!("{}:{}", DEFAULT_NAMESPACE, id),
    }
}

/// Drop the default namespace: `minecraft:stone` becomes `stone`
pub fn shorten(id: &str) -> String {
    if let Some(rest) = id.strip_prefix(TAG_PREFIX) {
        return format!("{}{}", TAG_PREFIX, shorten(rest));
    }
    match id.strip_prefix(DEFAULT_NAMESPACE).and_then(|rest| rest.strip_prefix(':')) {
        Some(path) => path.to_string(),
        None => id.to_string(),
    }
}

/// Whether `c` may appear in the namespace part
pub fn is_namespace_char(c: char) -> bool {
    matches!(c, 'a'..='z' | '0'..='9' | '_' | '-' | '.')
}

/// Whether `c` may appear in the path part
pub fn is_path_char(c: char) -> bool {
    is_namespace_char(c) || c == '/'
}
