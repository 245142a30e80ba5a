use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// JSON-safe description of a type. Describes a type, never a value of it.
///
/// Serialized with an internal `"type"` tag:
/// ```json
/// { "type": "Generic", "origin": "array", "args": [{ "type": "Basic", "value": "integer" }] }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TypeDescriptor {
  /// No annotation, or an explicit `any`.
  Any,
  /// A scalar type or literal, rendered as written.
  Basic { value: String },
  /// A named type with no structure exposed.
  Class { name: String },
  /// A parameterised type. `args` is omitted when there are none.
  Generic {
    origin: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    args: Vec<TypeDescriptor>,
  },
  /// A base type carrying metadata markers.
  Annotated {
    base_type: Box<TypeDescriptor>,
    metadata: Vec<String>,
  },
  /// A dict-like class with declared fields.
  TypedDict {
    name: String,
    fields: IndexMap<String, TypeDescriptor>,
  },
  /// An exact record class.
  Dataclass {
    name: String,
    fields: IndexMap<String, TypeDescriptor>,
  },
  /// Any other class with declared fields.
  PydanticModel {
    name: String,
    fields: IndexMap<String, TypeDescriptor>,
  },
  /// Fallback for anything else.
  Unknown { value: String },
}

impl TypeDescriptor {
  pub fn basic(value: impl Into<String>) -> Self {
    Self::Basic {
      value: value.into(),
    }
  }

  pub fn class(name: impl Into<String>) -> Self {
    Self::Class { name: name.into() }
  }

  pub fn generic(origin: impl Into<String>, args: Vec<TypeDescriptor>) -> Self {
    Self::Generic {
      origin: origin.into(),
      args,
    }
  }

  pub fn unknown(value: impl Into<String>) -> Self {
    Self::Unknown {
      value: value.into(),
    }
  }
}
