//! Tool catalog — maps tool identifiers to the capacity bundle each
//! consumes.
//!
//! The catalog is caller-populated: the arbiter never consults it directly.
//! Callers look up the bundle for a tool and put it on a
//! [`DispatchRequest`](crate::DispatchRequest).

use std::collections::HashMap;

use tracing::debug;
use warden_core::ResourceBundle;

/// Registry mapping tool names to their resource consumption bundles.
#[derive(Debug)]
pub struct ToolCatalog {
    bundles: HashMap<String, ResourceBundle>,
}

impl ToolCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self {
            bundles: HashMap::new(),
        }
    }

    /// Register a tool's bundle. Overwrites any existing entry with the
    /// same name.
    pub fn register(&mut self, tool: impl Into<String>, bundle: ResourceBundle) {
        let tool = tool.into();
        debug!(tool_name = %tool, "tool bundle registered");
        let _ = self.bundles.insert(tool, bundle);
    }

    /// Look up the bundle a tool consumes.
    pub fn bundle_for(&self, tool: &str) -> Option<ResourceBundle> {
        self.bundles.get(tool).copied()
    }

    /// Whether a tool is registered.
    pub fn contains(&self, tool: &str) -> bool {
        self.bundles.contains_key(tool)
    }

    /// All registered tool names, sorted alphabetically.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.bundles.keys().cloned().collect();
        names.sort();
        names
    }

    /// Remove a tool, returning its bundle if it existed.
    pub fn remove(&mut self, tool: &str) -> Option<ResourceBundle> {
        self.bundles.remove(tool)
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.bundles.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.bundles.is_empty()
    }
}

impl Default for ToolCatalog {
    fn default() -> Self {
        Self::new()
    }
}
