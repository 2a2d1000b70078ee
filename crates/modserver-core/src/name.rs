//! Module name normalization.
//!
//! Module names travel through URLs and are emitted as script identifiers in
//! registration lines, so path separators are replaced with `$` and every
//! name carries the `module$` prefix. The loader and the server share this
//! one definition of the key form.

/// Prefix carried by every normalized module name.
pub const MODULE_PREFIX: &str = "module$";

/// Script expression under which delivered payloads register their exports.
pub const DEFAULT_REGISTRY_NAMESPACE: &str = "ModuleServer.m";

/// Normalizes a slash-separated module path to its registry key.
///
/// `"app/widgets/button"` becomes `"module$app$widgets$button"`. Names that
/// are already normalized are returned unchanged.
pub fn registry_key(path: &str) -> String {
    if path.starts_with(MODULE_PREFIX) {
        return path.replace('/', "$");
    }
    let mut key = String::with_capacity(MODULE_PREFIX.len() + path.len());
    key.push_str(MODULE_PREFIX);
    key.extend(path.chars().map(|c| if c == '/' { '$' } else { c }));
    key
}
