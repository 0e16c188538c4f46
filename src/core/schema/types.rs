use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;

/// Scalar property types understood by the persistence runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarKind {
    String,
    Int,
    Bool,
    Date,
    Float,
    Double,
}

impl ScalarKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScalarKind::String => "string",
            ScalarKind::Int => "int",
            ScalarKind::Bool => "bool",
            ScalarKind::Date => "date",
            ScalarKind::Float => "float",
            ScalarKind::Double => "double",
        }
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Element of a list property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementType {
    Scalar(ScalarKind),
    /// Another schema, by name.
    Object(String),
}

impl ElementType {
    pub fn type_name(&self) -> &str {
        match self {
            ElementType::Scalar(kind) => kind.as_str(),
            ElementType::Object(name) => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyKind {
    Scalar(ScalarKind),
    /// Singular reference to another schema, by name.
    Object(String),
    List(ElementType),
}

/// Resolved type and modifiers of one schema property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyDescriptor {
    pub kind: PropertyKind,
    pub optional: bool,
    pub indexed: bool,
}

impl PropertyDescriptor {
    pub fn new(kind: PropertyKind, optional: bool) -> Self {
        Self {
            kind,
            optional,
            indexed: false,
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self.kind, PropertyKind::List(_))
    }

    /// Value of the `type` attribute: the scalar kind, the referenced schema
    /// name, or `list`.
    pub fn type_name(&self) -> &str {
        match &self.kind {
            PropertyKind::Scalar(kind) => kind.as_str(),
            PropertyKind::Object(name) => name,
            PropertyKind::List(_) => "list",
        }
    }

    /// Value of the `objectType` attribute, set for lists only.
    pub fn object_type(&self) -> Option<&str> {
        match &self.kind {
            PropertyKind::List(element) => Some(element.type_name()),
            _ => None,
        }
    }

    /// A scalar without modifiers, which may render in short form.
    pub fn is_plain_scalar(&self) -> bool {
        matches!(self.kind, PropertyKind::Scalar(_)) && !self.optional && !self.indexed
    }
}

/// The resolved, emittable description of one model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaDefinition {
    pub name: String,
    pub properties: IndexMap<String, PropertyDescriptor>,
    pub primary_key: Option<String>,
    /// Display path of the file the schema was derived from.
    pub source_path: String,
}

/// Outcome of classifying a declared type.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeClass {
    Scalar(ScalarKind),
    /// A schema, by name. The schema is registered (or in progress) by the
    /// time this is returned.
    Reference(String),
    ListOf(Box<TypeClass>),
    Unsupported(SkipReason),
}

/// Why a field was left out of its schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The type name does not resolve to any declaration.
    UnresolvedType { type_text: String },
    /// Resolved, but to nothing the mapper can classify.
    UnsupportedType { type_text: String, kinds: String },
    Intersection { type_text: String },
    /// Enum whose first member is neither string nor number valued.
    NonConstantEnum { enum_name: String },
    MixedEnumValues { enum_name: String },
    NonConstantEnumMember { member: String },
    MixedLiteralUnion { type_text: String },
    /// A union of interfaces written inline; only a type alias gives the
    /// compound schema a name.
    AnonymousInterfaceUnion { type_text: String },
    NestedList { type_text: String },
    /// A union that is neither all literals nor all interfaces.
    HeterogeneousUnion { type_text: String },
    CircularAlias { name: String },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::UnresolvedType { type_text } => {
                write!(f, "cannot resolve type '{}'", type_text)
            }
            SkipReason::UnsupportedType { type_text, kinds } if kinds.is_empty() => {
                write!(f, "don't know how to handle type '{}'", type_text)
            }
            SkipReason::UnsupportedType { type_text, kinds } => {
                write!(
                    f,
                    "don't know how to handle {} '{}'",
                    kinds, type_text
                )
            }
            SkipReason::Intersection { type_text } => {
                write!(f, "intersection types are not supported ('{}')", type_text)
            }
            SkipReason::NonConstantEnum { enum_name } => write!(
                f,
                "enum '{}' must have string or number constant values",
                enum_name
            ),
            SkipReason::MixedEnumValues { enum_name } => write!(
                f,
                "enum '{}' mixes string and number constant values",
                enum_name
            ),
            SkipReason::NonConstantEnumMember { member } => write!(
                f,
                "enum member '{}' has no string or number constant value",
                member
            ),
            SkipReason::MixedLiteralUnion { type_text } => {
                write!(f, "mixing literal kinds is not supported ('{}')", type_text)
            }
            SkipReason::AnonymousInterfaceUnion { type_text } => write!(
                f,
                "union of interfaces must be declared as a type alias ('{}')",
                type_text
            ),
            SkipReason::NestedList { type_text } => {
                write!(f, "nested lists are not supported ('{}')", type_text)
            }
            SkipReason::CircularAlias { name } => {
                write!(f, "type alias '{}' refers to itself", name)
            }
            SkipReason::HeterogeneousUnion { type_text } => write!(
                f,
                "union members must be all literals or all interfaces ('{}')",
                type_text
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_descriptor_type_names() {
        let scalar = PropertyDescriptor::new(PropertyKind::Scalar(ScalarKind::Double), false);
        assert_eq!(scalar.type_name(), "double");
        assert_eq!(scalar.object_type(), None);
        assert!(scalar.is_plain_scalar());

        let list = PropertyDescriptor::new(
            PropertyKind::List(ElementType::Object("Article".into())),
            true,
        );
        assert_eq!(list.type_name(), "list");
        assert_eq!(list.object_type(), Some("Article"));
        assert!(list.is_list());
        assert!(!list.is_plain_scalar());

        let reference = PropertyDescriptor::new(PropertyKind::Object("Phase".into()), false);
        assert_eq!(reference.type_name(), "Phase");
        assert!(!reference.is_plain_scalar());
    }

    #[test]
    fn test_skip_reason_messages() {
        assert_eq!(
            SkipReason::MixedEnumValues {
                enum_name: "Mixed".into()
            }
            .to_string(),
            "enum 'Mixed' mixes string and number constant values"
        );
        assert_eq!(
            SkipReason::UnsupportedType {
                type_text: "() => void".into(),
                kinds: String::new(),
            }
            .to_string(),
            "don't know how to handle type '() => void'"
        );
        assert_eq!(
            SkipReason::UnsupportedType {
                type_text: "Widget".into(),
                kinds: "namespace".into(),
            }
            .to_string(),
            "don't know how to handle namespace 'Widget'"
        );
    }
}
