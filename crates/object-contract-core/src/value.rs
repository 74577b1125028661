// crates/object-contract-core/src/value.rs
// ============================================================================
// Module: Decoded Bodies
// Description: Typed access to decoded JSON response bodies.
// Purpose: Replace unchecked field access with named decode failures.
// Dependencies: serde_json, serde_jcs, thiserror
// ============================================================================

//! ## Overview
//! Response bodies are decoded into [`serde_json::Value`], the tagged union of
//! null/bool/number/string/array/object, and only read through accessors that
//! return a [`DecodeError`] naming what was missing. Comparisons go through
//! [`normalize_text`] so that `7` and `"7"` compare equal and nested values
//! compare by their RFC 8785 canonical form.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Map;
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Failure to decode or navigate a response body.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Body text was empty or whitespace.
    #[error("response body is empty")]
    EmptyBody,
    /// Body text is not JSON.
    #[error("response body is not valid json: {0}")]
    InvalidJson(String),
    /// A field lookup was attempted on a non-object body.
    #[error("expected a json object, found {found}")]
    NotAnObject {
        /// JSON kind that was found instead.
        found: &'static str,
    },
    /// The named field is absent.
    #[error("field `{field}` is missing")]
    MissingField {
        /// Field name.
        field: String,
    },
    /// The named field is present but null.
    #[error("field `{field}` is null")]
    NullField {
        /// Field name.
        field: String,
    },
    /// The named field could not be rendered as comparable text.
    #[error("field `{field}` could not be normalized: {message}")]
    Unnormalizable {
        /// Field name.
        field: String,
        /// Canonicalization failure.
        message: String,
    },
}

// ============================================================================
// SECTION: Decoded Body
// ============================================================================

/// A decoded JSON response body.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedBody {
    /// Decoded value.
    value: Value,
}

impl DecodedBody {
    /// Decodes body text.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::EmptyBody`] for blank text and
    /// [`DecodeError::InvalidJson`] when the text does not parse.
    pub fn parse(text: &str) -> Result<Self, DecodeError> {
        if text.trim().is_empty() {
            return Err(DecodeError::EmptyBody);
        }
        serde_json::from_str(text)
            .map(Self::from_value)
            .map_err(|err| DecodeError::InvalidJson(err.to_string()))
    }

    /// Wraps an already decoded value.
    #[must_use]
    pub const fn from_value(value: Value) -> Self {
        Self {
            value,
        }
    }

    /// Returns the underlying value.
    #[must_use]
    pub const fn value(&self) -> &Value {
        &self.value
    }

    /// Returns true when the body carries no content: null, an empty string,
    /// an empty array, or an empty object.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match &self.value {
            Value::Null => true,
            Value::String(text) => text.is_empty(),
            Value::Array(items) => items.is_empty(),
            Value::Object(map) => map.is_empty(),
            Value::Bool(_) | Value::Number(_) => false,
        }
    }

    /// Looks up an optional top-level field.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::NotAnObject`] when the body is not an object.
    pub fn optional_field(&self, name: &str) -> Result<Option<&Value>, DecodeError> {
        Ok(self.fields()?.get(name))
    }

    /// Returns every top-level field.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::NotAnObject`] when the body is not an object.
    pub fn fields(&self) -> Result<&Map<String, Value>, DecodeError> {
        self.value.as_object().ok_or(DecodeError::NotAnObject {
            found: kind_name(&self.value),
        })
    }

    /// Looks up a required top-level field.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError`] when the body is not an object or the field is
    /// absent.
    pub fn field(&self, name: &str) -> Result<&Value, DecodeError> {
        self.optional_field(name)?.ok_or_else(|| DecodeError::MissingField {
            field: name.to_string(),
        })
    }

    /// Reads a required, non-null field normalized to text.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError`] when the field is absent, null, or cannot be
    /// canonicalized.
    pub fn text_field(&self, name: &str) -> Result<String, DecodeError> {
        let value = self.field(name)?;
        if value.is_null() {
            return Err(DecodeError::NullField {
                field: name.to_string(),
            });
        }
        normalize_text(value).map_err(|message| DecodeError::Unnormalizable {
            field: name.to_string(),
            message,
        })
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns the JSON kind label for a value.
#[must_use]
pub const fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Renders a value as comparable text.
///
/// Strings are returned verbatim, scalars as their JSON text, and arrays or
/// objects as RFC 8785 canonical JSON.
///
/// # Errors
///
/// Returns the canonicalization error message for values `serde_jcs` rejects.
pub fn normalize_text(value: &Value) -> Result<String, String> {
    match value {
        Value::String(text) => Ok(text.clone()),
        Value::Null => Ok("null".to_string()),
        Value::Bool(flag) => Ok(flag.to_string()),
        Value::Number(number) => Ok(number.to_string()),
        Value::Array(_) | Value::Object(_) => {
            let bytes = serde_jcs::to_vec(value).map_err(|err| err.to_string())?;
            String::from_utf8(bytes).map_err(|err| err.to_string())
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
