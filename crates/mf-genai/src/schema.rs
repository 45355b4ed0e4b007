//! Typed description of a constrained output shape.
//!
//! Sent as `responseSchema` so the provider must return JSON matching the
//! declared structure; anything that still fails to parse is treated as a
//! malformed response at the call site.

use std::collections::BTreeMap;

use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SchemaType {
    String,
    Integer,
    Number,
    Boolean,
    Array,
    Object,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    #[serde(rename = "type")]
    pub schema_type: SchemaType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, Schema>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
}

impl Schema {
    fn leaf(schema_type: SchemaType) -> Self {
        Self {
            schema_type,
            description: None,
            items: None,
            properties: None,
            required: None,
        }
    }

    pub fn string() -> Self {
        Self::leaf(SchemaType::String)
    }

    pub fn integer() -> Self {
        Self::leaf(SchemaType::Integer)
    }

    pub fn number() -> Self {
        Self::leaf(SchemaType::Number)
    }

    pub fn boolean() -> Self {
        Self::leaf(SchemaType::Boolean)
    }

    pub fn array(items: Schema) -> Self {
        Self {
            items: Some(Box::new(items)),
            ..Self::leaf(SchemaType::Array)
        }
    }

    /// Object schema; every listed property is also marked required, which
    /// is how all the tool schemas here use it.
    pub fn object(properties: impl IntoIterator<Item = (&'static str, Schema)>) -> Self {
        let properties: BTreeMap<String, Schema> = properties
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        let required = properties.keys().cloned().collect();
        Self {
            properties: Some(properties),
            required: Some(required),
            ..Self::leaf(SchemaType::Object)
        }
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_serialization() {
        let json = serde_json::to_value(Schema::string().describe("a title")).unwrap();
        assert_eq!(json["type"], "STRING");
        assert_eq!(json["description"], "a title");
        assert!(json.get("items").is_none());
    }

    #[test]
    fn test_array_of_objects_shape() {
        let schema = Schema::array(Schema::object([
            ("scene", Schema::integer()),
            ("description", Schema::string()),
        ]));
        let json = serde_json::to_value(&schema).unwrap();
        assert_eq!(json["type"], "ARRAY");
        assert_eq!(json["items"]["type"], "OBJECT");
        assert_eq!(json["items"]["properties"]["scene"]["type"], "INTEGER");
        let required = json["items"]["required"].as_array().unwrap();
        assert!(required.iter().any(|v| v == "scene"));
        assert!(required.iter().any(|v| v == "description"));
    }
}
