// crates/object-contract-core/src/payload.rs
// ============================================================================
// Module: Object Payloads
// Description: Request bodies and identifiers for the objects resource.
// Purpose: Build create/update bodies without guessing a unified schema.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! The resource schema is opaque beyond `id` and `name`. Payloads carry a
//! required `name` plus free-form attributes, either a flat `description` or a
//! nested `data` mapping. Only `name` and `data` are echoed back by servers
//! reliably, so those are the fields asserted on round trips.

use std::fmt;

use serde_json::Map;
use serde_json::Value;

/// Field carrying the server-assigned identifier.
pub const ID_FIELD: &str = "id";
/// Field carrying the client-supplied name.
pub const NAME_FIELD: &str = "name";
/// Field carrying the nested attribute mapping.
pub const DATA_FIELD: &str = "data";
/// Flat descriptive field used by the simple payload variant.
pub const DESCRIPTION_FIELD: &str = "description";

// ============================================================================
// SECTION: Identifiers
// ============================================================================

/// Server-assigned object identifier, held as normalized text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectId(String);

impl ObjectId {
    /// Wraps normalized identifier text.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// SECTION: Payloads
// ============================================================================

/// Body submitted on create or full-replacement update. Never carries `id`.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectPayload {
    /// Client-supplied name.
    name: String,
    /// Remaining top-level attributes.
    attributes: Map<String, Value>,
}

impl ObjectPayload {
    /// Builds the flat `{name, description}` variant.
    #[must_use]
    pub fn described(name: impl Into<String>, description: impl Into<String>) -> Self {
        let mut attributes = Map::new();
        attributes.insert(DESCRIPTION_FIELD.to_string(), Value::String(description.into()));
        Self {
            name: name.into(),
            attributes,
        }
    }

    /// Builds the nested `{name, data: {...}}` variant.
    #[must_use]
    pub fn with_data(name: impl Into<String>, data: Map<String, Value>) -> Self {
        let mut attributes = Map::new();
        attributes.insert(DATA_FIELD.to_string(), Value::Object(data));
        Self {
            name: name.into(),
            attributes,
        }
    }

    /// Renders the JSON request body.
    #[must_use]
    pub fn to_value(&self) -> Value {
        let mut body = self.attributes.clone();
        body.remove(ID_FIELD);
        body.insert(NAME_FIELD.to_string(), Value::String(self.name.clone()));
        Value::Object(body)
    }

    /// Fields a compliant server must echo back unchanged: `name`, plus
    /// `data` when the payload carries it.
    #[must_use]
    pub fn asserted_fields(&self) -> Vec<(&'static str, Value)> {
        let mut fields = vec![(NAME_FIELD, Value::String(self.name.clone()))];
        if let Some(data) = self.attributes.get(DATA_FIELD) {
            fields.push((DATA_FIELD, data.clone()));
        }
        fields
    }
}
