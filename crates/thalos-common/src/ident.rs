//! ---
//! thalos_section: "01-core-functionality"
//! thalos_subsection: "module"
//! thalos_type: "source"
//! thalos_scope: "code"
//! thalos_description: "Shared primitives and utilities for the core runtime."
//! thalos_version: "v1.0.0"
//! thalos_owner: "core"
//! ---
//! Format rules for storage keys and generated-code identifiers.
//!
//! All rules are ASCII-only so that validation is independent of locale.

/// Storage key: leading letter or underscore, then letters, digits, `_` or `-`.
pub fn is_valid_key(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '-')
}

/// Class name: leading uppercase letter, then letters and digits.
pub fn is_valid_class_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_uppercase() => {}
        _ => return false,
    }
    chars.all(|ch| ch.is_ascii_alphanumeric())
}

/// Function name: leading lowercase letter or underscore, then lowercase
/// letters, digits, or `_`.
pub fn is_valid_function_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_lowercase() || first == '_' => {}
        _ => return false,
    }
    chars.all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '_')
}

/// Generic identifier: leading letter or underscore, then letters, digits, `_`.
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
}
