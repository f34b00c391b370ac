//! Typed tool inputs.
//!
//! A tool declares its arguments as a struct deriving `Deserialize` and
//! `JsonSchema`. The schema sent to the model is generated from that struct
//! with `schemars`, and the model's arguments are checked by deserializing
//! into it with [`parse_input`], so the two can never drift apart.

use schemars::JsonSchema;
use schemars::r#gen::{SchemaGenerator, SchemaSettings};
use schemars::schema::{InstanceType, Schema, SchemaObject, StringValidation};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::ops::Deref;

use crate::error::ToolError;

/// Generate the JSON Schema for `T`, with every subschema inlined.
///
/// `Option` fields are left out of `required` and carry no `null` type, so an
/// explicit `null` from the model still deserializes as absent.
pub fn schema_of<T: JsonSchema>() -> Value {
    let settings = SchemaSettings::draft07().with(|s| {
        s.inline_subschemas = true;
        s.option_add_null_type = false;
        s.meta_schema = None;
    });
    let mut schema = SchemaGenerator::new(settings)
        .into_root_schema_for::<T>()
        .schema;
    if let Some(metadata) = schema.metadata.as_mut() {
        metadata.title = None;
    }
    serde_json::to_value(schema).unwrap_or_default()
}

/// Deserialize a tool's raw arguments into its input type.
pub fn parse_input<T: DeserializeOwned>(tool_name: &str, input: Value) -> Result<T, ToolError> {
    serde_json::from_value(input).map_err(|source| ToolError::InvalidArguments {
        tool_name: tool_name.to_string(),
        source,
    })
}

/// A string argument that must not be empty (`minLength: 1`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub struct NonEmptyString(String);

impl NonEmptyString {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl TryFrom<String> for NonEmptyString {
    type Error = &'static str;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.is_empty() {
            Err("string must contain at least 1 character")
        } else {
            Ok(Self(value))
        }
    }
}

impl Deref for NonEmptyString {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NonEmptyString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl JsonSchema for NonEmptyString {
    fn schema_name() -> String {
        "NonEmptyString".to_owned()
    }

    fn is_referenceable() -> bool {
        false
    }

    fn json_schema(_: &mut SchemaGenerator) -> Schema {
        SchemaObject {
            instance_type: Some(InstanceType::String.into()),
            string: Some(Box::new(StringValidation {
                min_length: Some(1),
                ..Default::default()
            })),
            ..Default::default()
        }
        .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize, JsonSchema)]
    #[serde(rename_all = "lowercase")]
    enum Unit {
        Celsius,
        Fahrenheit,
    }

    /// Convert a temperature.
    #[derive(Debug, Deserialize, JsonSchema)]
    struct ConvertInput {
        /// Reading to convert
        value: f64,
        unit: Unit,
        label: Option<NonEmptyString>,
    }

    #[test]
    fn schema_is_inlined_object() {
        let schema = schema_of::<ConvertInput>();
        assert_eq!(schema["type"], "object");
        assert!(schema.get("title").is_none());
        assert!(schema.get("definitions").is_none());
        assert_eq!(schema["required"], json!(["unit", "value"]));
        assert_eq!(schema["properties"]["unit"]["enum"], json!(["celsius", "fahrenheit"]));
        assert_eq!(schema["properties"]["value"]["description"], "Reading to convert");
        assert_eq!(schema["properties"]["label"]["minLength"], 1);
        assert_eq!(schema["properties"]["label"]["type"], "string");
    }

    #[test]
    fn null_optional_is_absent() {
        let input: ConvertInput =
            parse_input("convert", json!({"value": 21.5, "unit": "celsius", "label": null}))
                .unwrap();
        assert!(input.label.is_none());
        assert!(matches!(input.unit, Unit::Celsius));
    }

    #[test]
    fn violations_are_invalid_arguments() {
        for bad in [
            json!({"unit": "celsius"}),
            json!({"value": 1, "unit": "kelvin"}),
            json!({"value": "hot", "unit": "celsius"}),
            json!({"value": 1, "unit": "celsius", "label": ""}),
            json!("{not json"),
        ] {
            let err = parse_input::<ConvertInput>("convert", bad.clone()).unwrap_err();
            assert!(
                matches!(err, ToolError::InvalidArguments { ref tool_name, .. } if tool_name == "convert"),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn missing_field_is_named() {
        let err = parse_input::<ConvertInput>("convert", json!({"unit": "celsius"})).unwrap_err();
        assert!(err.to_string().contains("value"));
    }
}
