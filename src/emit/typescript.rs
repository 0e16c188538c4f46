//! TypeScript module rendering.
//!
//! One `ObjectSchema` constant per schema, in registry order, followed by the
//! `Schemas` array used for bulk registration.

use std::{
    fmt::{self, Write},
    sync::LazyLock,
};

use regex::Regex;

use crate::core::schema::{PropertyDescriptor, SchemaDefinition, SchemaRegistry};

const TAB: &str = "  ";

static IDENTIFIER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").expect("identifier pattern is valid"));

pub fn render(registry: &SchemaRegistry, short_scalars: bool) -> Result<String, fmt::Error> {
    let mut out = String::new();
    writeln!(out, "// Auto-generated, do not edit")?;
    writeln!(out, "import {{ ObjectSchema }} from 'realm';")?;
    writeln!(out)?;

    for schema in registry.iter() {
        write_schema(&mut out, schema, short_scalars)?;
    }

    writeln!(out, "export const Schemas = [")?;
    for schema in registry.iter() {
        writeln!(out, "{TAB}{}Schema,", schema.name)?;
    }
    writeln!(out, "];")?;

    Ok(out)
}

fn write_schema(out: &mut String, schema: &SchemaDefinition, short_scalars: bool) -> fmt::Result {
    writeln!(
        out,
        "// schema based on interface from {}",
        schema.source_path
    )?;
    writeln!(out, "export const {}Schema: ObjectSchema = {{", schema.name)?;
    writeln!(out, "{TAB}name: {},", quote(&schema.name))?;
    if let Some(primary_key) = &schema.primary_key {
        writeln!(out, "{TAB}primaryKey: {},", quote(primary_key))?;
    }
    writeln!(out, "{TAB}properties: {{")?;
    for (name, property) in &schema.properties {
        write_property(out, name, property, short_scalars)?;
    }
    writeln!(out, "{TAB}}},")?;
    writeln!(out, "}};")?;
    writeln!(out)
}

fn write_property(
    out: &mut String,
    name: &str,
    property: &PropertyDescriptor,
    short_scalars: bool,
) -> fmt::Result {
    let key = property_key(name);
    if short_scalars && property.is_plain_scalar() {
        return writeln!(out, "{TAB}{TAB}{}: {},", key, quote(property.type_name()));
    }

    writeln!(out, "{TAB}{TAB}{}: {{", key)?;
    writeln!(out, "{TAB}{TAB}{TAB}type: {},", quote(property.type_name()))?;
    if let Some(object_type) = property.object_type() {
        writeln!(out, "{TAB}{TAB}{TAB}objectType: {},", quote(object_type))?;
    }
    if property.optional {
        writeln!(out, "{TAB}{TAB}{TAB}optional: true,")?;
    }
    if property.indexed {
        writeln!(out, "{TAB}{TAB}{TAB}indexed: true,")?;
    }
    writeln!(out, "{TAB}{TAB}}},")
}

/// Object literal key: bare when it is an identifier, quoted otherwise.
fn property_key(name: &str) -> String {
    if IDENTIFIER_RE.is_match(name) {
        name.to_string()
    } else {
        quote(name)
    }
}

fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
}

#[cfg(test)]
mod tests {
    use indexmap::IndexMap;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::core::schema::{ElementType, PropertyKind, ScalarKind};

    fn registry() -> SchemaRegistry {
        let mut tag_properties = IndexMap::new();
        tag_properties.insert(
            "label".to_string(),
            PropertyDescriptor::new(PropertyKind::Scalar(ScalarKind::String), false),
        );

        let mut post_properties = IndexMap::new();
        post_properties.insert(
            "postId".to_string(),
            PropertyDescriptor::new(PropertyKind::Scalar(ScalarKind::Int), false),
        );
        post_properties.insert(
            "display-name".to_string(),
            PropertyDescriptor::new(PropertyKind::Scalar(ScalarKind::String), true),
        );
        post_properties.insert(
            "tags".to_string(),
            PropertyDescriptor::new(PropertyKind::List(ElementType::Object("Tag".into())), false),
        );
        post_properties.insert(
            "slug".to_string(),
            PropertyDescriptor {
                kind: PropertyKind::Scalar(ScalarKind::String),
                optional: false,
                indexed: true,
            },
        );

        let mut registry = SchemaRegistry::default();
        registry.register(SchemaDefinition {
            name: "Tag".into(),
            properties: tag_properties,
            primary_key: None,
            source_path: "src/models.ts".into(),
        });
        registry.register(SchemaDefinition {
            name: "Post".into(),
            properties: post_properties,
            primary_key: Some("postId".into()),
            source_path: "src/models.ts".into(),
        });
        registry
    }

    #[test]
    fn test_render_structured_properties() {
        insta::assert_snapshot!(render(&registry(), false).unwrap(), @r"
        // Auto-generated, do not edit
        import { ObjectSchema } from 'realm';

        // schema based on interface from src/models.ts
        export const TagSchema: ObjectSchema = {
          name: 'Tag',
          properties: {
            label: {
              type: 'string',
            },
          },
        };

        // schema based on interface from src/models.ts
        export const PostSchema: ObjectSchema = {
          name: 'Post',
          primaryKey: 'postId',
          properties: {
            postId: {
              type: 'int',
            },
            'display-name': {
              type: 'string',
              optional: true,
            },
            tags: {
              type: 'list',
              objectType: 'Tag',
            },
            slug: {
              type: 'string',
              indexed: true,
            },
          },
        };

        export const Schemas = [
          TagSchema,
          PostSchema,
        ];
        ");
    }

    #[test]
    fn test_render_short_scalars() {
        let rendered = render(&registry(), true).unwrap();
        assert!(rendered.contains("    label: 'string',\n"));
        assert!(rendered.contains("    postId: 'int',\n"));
        // Modifiers keep the structured form.
        assert!(rendered.contains("    slug: {\n      type: 'string',\n      indexed: true,\n    },\n"));
        assert!(rendered.contains("    tags: {\n      type: 'list',\n"));
    }

    #[test]
    fn test_render_empty_registry() {
        assert_eq!(
            render(&SchemaRegistry::default(), false).unwrap(),
            "// Auto-generated, do not edit\nimport { ObjectSchema } from 'realm';\n\nexport const Schemas = [\n];\n"
        );
    }

    #[test]
    fn test_property_key_quoting() {
        assert_eq!(property_key("$id"), "$id");
        assert_eq!(property_key("first name"), "'first name'");
        assert_eq!(property_key("it's"), r"'it\'s'");
        assert_eq!(property_key("1st"), "'1st'");
    }
}
