//! The document stored in one vault file.
//!
//! Its schema belongs to the application; the store only needs it to
//! be valid JSON.  The one field the store itself writes is `file`,
//! naming the document's own file in a freshly initialised vault.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// An opaque JSON vault document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VaultData(pub Value);

impl VaultData {
    /// The document written for a brand-new vault.
    pub fn empty(file_name: &str) -> Self {
        Self(json!({ "file": file_name }))
    }

    /// The `file` field, when the document carries one.
    pub fn file(&self) -> Option<&str> {
        self.0.get("file").and_then(Value::as_str)
    }

    /// Unwrap the JSON value.
    pub fn into_inner(self) -> Value {
        self.0
    }
}

impl From<Value> for VaultData {
    fn from(value: Value) -> Self {
        Self(value)
    }
}
