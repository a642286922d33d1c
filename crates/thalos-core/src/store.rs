//! ---
//! thalos_section: "01-core-functionality"
//! thalos_subsection: "module"
//! thalos_type: "source"
//! thalos_scope: "code"
//! thalos_description: "In-memory key-value store subsystem."
//! thalos_version: "v1.0.0"
//! thalos_owner: "core"
//! ---
use std::collections::BTreeMap;

use thalos_common::ident;
use tracing::debug;

use crate::error::{CoreError, ValidationError};

const KEY_PATTERN: &str = "^[A-Za-z_][A-Za-z0-9_-]*$";

/// String-to-string map with create/update separation.
///
/// Every key is validated before it touches the map, so a stored key always
/// satisfies [`ident::is_valid_key`].
#[derive(Debug, Default, Clone)]
pub struct KeyValueStore {
    entries: BTreeMap<String, String>,
}

impl KeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new entry. Fails if the key is already present.
    pub fn create(&mut self, key: &str, value: impl Into<String>) -> Result<(), CoreError> {
        validate_key(key)?;
        if self.entries.contains_key(key) {
            return Err(CoreError::KeyExists { key: key.to_owned() });
        }
        self.entries.insert(key.to_owned(), value.into());
        debug!(key, "entry created");
        Ok(())
    }

    pub fn read(&self, key: &str) -> Result<&str, CoreError> {
        validate_key(key)?;
        self.entries
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| CoreError::KeyNotFound { key: key.to_owned() })
    }

    /// Replace the value of an existing entry.
    pub fn update(&mut self, key: &str, value: impl Into<String>) -> Result<(), CoreError> {
        validate_key(key)?;
        let slot = self
            .entries
            .get_mut(key)
            .ok_or_else(|| CoreError::KeyNotFound { key: key.to_owned() })?;
        *slot = value.into();
        debug!(key, "entry updated");
        Ok(())
    }

    pub fn delete(&mut self, key: &str) -> Result<(), CoreError> {
        validate_key(key)?;
        if self.entries.remove(key).is_none() {
            return Err(CoreError::KeyNotFound { key: key.to_owned() });
        }
        debug!(key, "entry deleted");
        Ok(())
    }

    /// Malformed keys can never be stored, so they simply report `false`.
    pub fn exists(&self, key: &str) -> bool {
        ident::is_valid_key(key) && self.entries.contains_key(key)
    }

    pub fn count(&self) -> usize {
        self.entries.len()
    }

    /// Keys in ascending order.
    pub fn list_keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    pub fn clear(&mut self) {
        let removed = self.entries.len();
        self.entries.clear();
        debug!(removed, "store cleared");
    }
}

fn validate_key(key: &str) -> Result<(), ValidationError> {
    if key.is_empty() {
        return Err(ValidationError::new("key", "cannot be empty").with_detail("pattern", KEY_PATTERN));
    }
    if !ident::is_valid_key(key) {
        return Err(ValidationError::new(
            "key",
            "must start with a letter or underscore and contain only letters, digits, underscores, or hyphens",
        )
        .with_value(key)
        .with_detail("pattern", KEY_PATTERN));
    }
    Ok(())
}
