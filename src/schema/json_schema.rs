//! Rendering of contracts as MongoDB `$jsonSchema` validators
//!
//! The output is the `validator` option accepted by `createCollection` and
//! `collMod`, so an operator can apply the same contract to a MongoDB
//! deployment.

use serde_json::{json, Map, Value};

use super::types::{CollectionSchema, FieldRule};

/// Renders the `{"$jsonSchema": {...}}` validator document
pub fn to_json_schema(schema: &CollectionSchema) -> Value {
    let mut properties = Map::new();
    for prop in &schema.properties {
        properties.insert(prop.name.clone(), render_rule(&prop.rule));
    }

    let mut body = Map::new();
    body.insert("bsonType".into(), json!("object"));
    body.insert("required".into(), json!(schema.required));
    body.insert("properties".into(), Value::Object(properties));
    if !schema.allow_undeclared {
        body.insert("additionalProperties".into(), json!(false));
    }

    json!({ "$jsonSchema": Value::Object(body) })
}

fn render_rule(rule: &FieldRule) -> Value {
    let mut out = Map::new();
    out.insert("bsonType".into(), json!(rule.bson_type.type_name()));
    if let Some(pattern) = &rule.pattern {
        out.insert("pattern".into(), json!(pattern));
    }
    if let Some(min_length) = rule.min_length {
        out.insert("minLength".into(), json!(min_length));
    }
    if let Some(values) = &rule.enum_values {
        out.insert("enum".into(), json!(values));
    }
    if let Some(minimum) = rule.minimum {
        out.insert("minimum".into(), json!(minimum));
    }
    Value::Object(out)
}
