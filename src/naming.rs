//! Column-name sanitization for the interchange format.
//!
//! Legal names match `[A-Za-z_][A-Za-z0-9_]*`. `sanitize` maps any display name onto
//! that set by dropping every other character, and prefixes `_` when the result
//! would be empty or start with a digit. The mapping is total and idempotent but not
//! injective: `"a b"` and `"ab"` both become `"ab"`.

/// Returns `true` if `name` can be used verbatim as an interchange-format column name.
pub fn is_legal_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first == '_' || first.is_ascii_alphabetic() => {
            chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
        }
        _ => false,
    }
}

/// Maps an arbitrary display name to a legal column name.
pub fn sanitize(name: &str) -> String {
    let kept: String = name
        .chars()
        .filter(|c| *c == '_' || c.is_ascii_alphanumeric())
        .collect();

    match kept.chars().next() {
        Some(first) if !first.is_ascii_digit() => kept,
        _ => format!("_{}", kept),
    }
}
