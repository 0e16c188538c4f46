use indexmap::IndexMap;
use serde::Serialize;

use crate::core::schema::{PropertyDescriptor, SchemaRegistry};

#[derive(Serialize)]
struct Document<'a> {
    schemas: Vec<JsonSchema<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonSchema<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    primary_key: Option<&'a str>,
    properties: IndexMap<&'a str, JsonProperty<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonProperty<'a> {
    #[serde(rename = "type")]
    type_name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    object_type: Option<&'a str>,
    #[serde(skip_serializing_if = "is_false")]
    optional: bool,
    #[serde(skip_serializing_if = "is_false")]
    indexed: bool,
}

fn is_false(value: &bool) -> bool {
    !value
}

impl<'a> From<&'a PropertyDescriptor> for JsonProperty<'a> {
    fn from(property: &'a PropertyDescriptor) -> Self {
        Self {
            type_name: property.type_name(),
            object_type: property.object_type(),
            optional: property.optional,
            indexed: property.indexed,
        }
    }
}

pub fn render(registry: &SchemaRegistry) -> serde_json::Result<String> {
    let document = Document {
        schemas: registry
            .iter()
            .map(|schema| JsonSchema {
                name: &schema.name,
                primary_key: schema.primary_key.as_deref(),
                properties: schema
                    .properties
                    .iter()
                    .map(|(name, property)| (name.as_str(), property.into()))
                    .collect(),
            })
            .collect(),
    };

    let mut out = serde_json::to_string_pretty(&document)?;
    out.push('\n');
    Ok(out)
}
