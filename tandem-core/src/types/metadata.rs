//! Provider-scoped metadata overlays

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Metadata bags scoped to provider namespaces.
///
/// An overlay carries one key/value bag per provider namespace. During
/// normalization, the bag whose namespace matches the active target provider
/// is shallow-merged into the wire representation of the message or part that
/// carries it. Bags for other namespaces are never consumed or dropped; they
/// stay intact on the caller's data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProviderMetadata(HashMap<String, Map<String, Value>>);

impl ProviderMetadata {
    /// Create an empty overlay
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a namespace bag, builder style
    pub fn with(mut self, namespace: impl Into<String>, entries: Map<String, Value>) -> Self {
        self.insert(namespace, entries);
        self
    }

    /// Add a single key/value entry under a namespace, builder style
    pub fn with_entry(
        mut self,
        namespace: impl Into<String>,
        key: impl Into<String>,
        value: Value,
    ) -> Self {
        self.0
            .entry(namespace.into())
            .or_default()
            .insert(key.into(), value);
        self
    }

    /// Insert a namespace bag, replacing any existing bag for that namespace
    pub fn insert(&mut self, namespace: impl Into<String>, entries: Map<String, Value>) {
        self.0.insert(namespace.into(), entries);
    }

    /// The bag for one provider namespace, if present
    pub fn get(&self, namespace: &str) -> Option<&Map<String, Value>> {
        self.0.get(namespace)
    }

    /// Whether the overlay carries no bags at all
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Request-side opaque provider options, keyed by provider namespace.
///
/// Same shape as [`ProviderMetadata`]; the alias marks intent. Options are
/// passed through to the capability untouched.
pub type ProviderOptions = ProviderMetadata;
