use indexmap::IndexMap;

use super::SchemaDefinition;

/// All schemas of one generation run, in registration order.
///
/// A schema is registered once its fields are fully resolved, so schemas a
/// model references come before the model itself.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    schemas: IndexMap<String, SchemaDefinition>,
}

impl SchemaRegistry {
    pub fn contains(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&SchemaDefinition> {
        self.schemas.get(name)
    }

    /// Register `schema` unless its name is taken. Returns whether it was added.
    pub fn register(&mut self, schema: SchemaDefinition) -> bool {
        if self.schemas.contains_key(&schema.name) {
            return false;
        }
        self.schemas.insert(schema.name.clone(), schema);
        true
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SchemaDefinition> {
        self.schemas.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.schemas.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use indexmap::IndexMap;
    use pretty_assertions::assert_eq;

    use super::*;

    fn schema(name: &str, source: &str) -> SchemaDefinition {
        SchemaDefinition {
            name: name.to_string(),
            properties: IndexMap::new(),
            primary_key: None,
            source_path: source.to_string(),
        }
    }

    #[test]
    fn test_register_is_write_once() {
        let mut registry = SchemaRegistry::default();
        assert!(registry.register(schema("Article", "a.ts")));
        assert!(!registry.register(schema("Article", "b.ts")));

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("Article").unwrap().source_path, "a.ts");
    }

    #[test]
    fn test_registration_order_is_kept() {
        let mut registry = SchemaRegistry::default();
        registry.register(schema("Zebra", "z.ts"));
        registry.register(schema("Apple", "a.ts"));
        registry.register(schema("Mango", "m.ts"));

        assert_eq!(
            registry.names().collect::<Vec<_>>(),
            vec!["Zebra", "Apple", "Mango"]
        );
    }
}
