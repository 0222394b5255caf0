//! Source and target type descriptors
//!
//! Types are described by explicit schemas: a stable name used as the
//! registry key, and the ordered list of declared fields.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// A single declared field
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Field name as it appears in templates and serialized records
    pub name: String,
    /// Whether the field may be absent or blank
    #[serde(default)]
    pub nullable: bool,
}

impl FieldSpec {
    /// A required field
    pub fn required(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nullable: false,
        }
    }

    /// A nullable field
    pub fn nullable(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nullable: true,
        }
    }
}

macro_rules! type_descriptor {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name {
            /// Stable identity, used as the registry key
            pub name: String,
            /// Declared fields, in declaration order
            #[serde(default)]
            pub fields: Vec<FieldSpec>,
        }

        impl $name {
            pub fn new(name: impl Into<String>) -> Self {
                Self {
                    name: name.into(),
                    fields: Vec::new(),
                }
            }

            /// Add a required field
            pub fn field(mut self, name: impl Into<String>) -> Self {
                self.fields.push(FieldSpec::required(name));
                self
            }

            /// Add a nullable field
            pub fn nullable_field(mut self, name: impl Into<String>) -> Self {
                self.fields.push(FieldSpec::nullable(name));
                self
            }

            pub fn name(&self) -> &str {
                &self.name
            }

            pub fn get_field(&self, name: &str) -> Option<&FieldSpec> {
                self.fields.iter().find(|f| f.name == name)
            }

            pub fn has_field(&self, name: &str) -> bool {
                self.get_field(name).is_some()
            }

            pub fn field_names(&self) -> impl Iterator<Item = &str> {
                self.fields.iter().map(|f| f.name.as_str())
            }
        }
    };
}

type_descriptor! {
    /// Schema of a DocumentData record, the values consumed by templates
    SourceType
}

type_descriptor! {
    /// Schema of a Document, the fields templates fill
    TargetType
}

impl TargetType {
    /// Fields a template must supply for this document
    pub fn required_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|f| !f.nullable)
    }
}

/// A record type that supplies values to templates
pub trait DocumentData: Serialize {
    fn source_type() -> SourceType;
}

/// A record type whose fields are filled by templates
pub trait Document: DeserializeOwned {
    fn target_type() -> TargetType;
}
