//! Resolved secret material for one provider call.
//!
//! The credential store hands back a flat map of field name to secret value
//! (`assemblyAIApiKey`, `azureOpenAIApiVersion`, ...). The dispatcher never
//! looks inside; only the matching adapter reads the fields it needs.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Decrypted secret bundle. `Debug` prints field names only, never values.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResolvedCredential(BTreeMap<String, String>);

impl ResolvedCredential {
    /// An empty bundle (what an absent credential reference resolves to).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Add a field, returning the updated bundle.
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let _ = self.0.insert(name.into(), value.into());
        self
    }

    /// Non-empty value of `name`, if present.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }

    /// Names of the fields carried by this bundle.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the bundle carries no fields.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for ResolvedCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.field_names()).finish()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ResolvedCredential {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_redacts_values() {
        let cred = ResolvedCredential::empty().with_field("assemblyAIApiKey", "super-secret");
        let debug = format!("{cred:?}");
        assert!(debug.contains("assemblyAIApiKey"));
        assert!(!debug.contains("super-secret"));
    }

    #[test]
    fn get_skips_blank_values() {
        let cred: ResolvedCredential = [("localAIApiKey", " "), ("other", "x")].into_iter().collect();
        assert!(cred.get("localAIApiKey").is_none());
        assert_eq!(cred.get("other"), Some("x"));
        assert!(cred.get("missing").is_none());
        assert_eq!(cred.len(), 2);
    }

    #[test]
    fn empty_bundle() {
        let cred = ResolvedCredential::empty();
        assert!(cred.is_empty());
        assert_eq!(cred.field_names().count(), 0);
    }

    #[test]
    fn deserializes_from_flat_object() {
        let cred: ResolvedCredential =
            serde_json::from_str(r#"{"azureOpenAIApiKey":"k","azureOpenAIApiVersion":"2024-06-01"}"#)
                .unwrap();
        assert_eq!(cred.get("azureOpenAIApiVersion"), Some("2024-06-01"));
    }
}
