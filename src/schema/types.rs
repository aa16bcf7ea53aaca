//! Validation contract definitions
//!
//! A contract mirrors the subset of MongoDB `$jsonSchema` the transport
//! collections rely on:
//! - `bsonType` per property
//! - `required` field list
//! - `pattern` and `minLength` on strings
//! - `enum` on strings
//! - `minimum` on numbers

use serde::{Deserialize, Serialize};

/// BSON types a property may be declared with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BsonType {
    Double,
    String,
    Object,
    Array,
    ObjectId,
    Bool,
    Date,
    Null,
    Int,
    Long,
    Decimal,
}

impl BsonType {
    /// Returns the `bsonType` alias used in `$jsonSchema`
    pub fn type_name(&self) -> &'static str {
        match self {
            BsonType::Double => "double",
            BsonType::String => "string",
            BsonType::Object => "object",
            BsonType::Array => "array",
            BsonType::ObjectId => "objectId",
            BsonType::Bool => "bool",
            BsonType::Date => "date",
            BsonType::Null => "null",
            BsonType::Int => "int",
            BsonType::Long => "long",
            BsonType::Decimal => "decimal",
        }
    }

    /// Whether `minimum` is meaningful for this type
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            BsonType::Double | BsonType::Int | BsonType::Long | BsonType::Decimal
        )
    }
}

/// Constraint set for a single property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldRule {
    pub bson_type: BsonType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(default, rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<i64>,
}

impl FieldRule {
    /// A rule checking only the BSON type
    pub fn of(bson_type: BsonType) -> Self {
        Self {
            bson_type,
            pattern: None,
            min_length: None,
            enum_values: None,
            minimum: None,
        }
    }

    pub fn string() -> Self {
        Self::of(BsonType::String)
    }

    pub fn bool() -> Self {
        Self::of(BsonType::Bool)
    }

    pub fn int() -> Self {
        Self::of(BsonType::Int)
    }

    pub fn date() -> Self {
        Self::of(BsonType::Date)
    }

    pub fn decimal() -> Self {
        Self::of(BsonType::Decimal)
    }

    pub fn object_id() -> Self {
        Self::of(BsonType::ObjectId)
    }

    pub fn array() -> Self {
        Self::of(BsonType::Array)
    }

    /// A string restricted to a closed set of values
    pub fn string_enum<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            enum_values: Some(values.into_iter().map(Into::into).collect()),
            ..Self::string()
        }
    }

    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    pub fn with_min_length(mut self, min_length: usize) -> Self {
        self.min_length = Some(min_length);
        self
    }

    pub fn with_minimum(mut self, minimum: i64) -> Self {
        self.minimum = Some(minimum);
        self
    }
}

/// A named property and its rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    pub rule: FieldRule,
}

/// Validation contract attached to a collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionSchema {
    /// Collection name
    pub collection: String,
    /// Fields that must be present
    pub required: Vec<String>,
    /// Declared properties, in declaration order
    pub properties: Vec<Property>,
    /// Whether fields not listed in `properties` are accepted
    #[serde(default = "default_allow_undeclared")]
    pub allow_undeclared: bool,
}

fn default_allow_undeclared() -> bool {
    true
}

impl CollectionSchema {
    /// Create an empty contract for a collection
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            required: Vec::new(),
            properties: Vec::new(),
            allow_undeclared: true,
        }
    }

    /// Declare a required property
    pub fn required(mut self, name: impl Into<String>, rule: FieldRule) -> Self {
        let name = name.into();
        self.required.push(name.clone());
        self.properties.push(Property { name, rule });
        self
    }

    /// Declare an optional property
    pub fn optional(mut self, name: impl Into<String>, rule: FieldRule) -> Self {
        self.properties.push(Property {
            name: name.into(),
            rule,
        });
        self
    }

    /// Reject fields not listed in `properties`
    pub fn closed(mut self) -> Self {
        self.allow_undeclared = false;
        self
    }

    /// Looks up a declared property rule
    pub fn property(&self, name: &str) -> Option<&FieldRule> {
        self.properties
            .iter()
            .find(|p| p.name == name)
            .map(|p| &p.rule)
    }

    /// Whether a field is in the required list
    pub fn is_required(&self, name: &str) -> bool {
        self.required.iter().any(|r| r == name)
    }

    /// Validates the contract itself (not a document)
    pub fn validate_structure(&self) -> Result<(), String> {
        if self.collection.is_empty() {
            return Err("collection name must not be empty".into());
        }

        for (i, prop) in self.properties.iter().enumerate() {
            if self.properties[..i].iter().any(|p| p.name == prop.name) {
                return Err(format!("property '{}' declared twice", prop.name));
            }
        }

        for name in &self.required {
            if self.property(name).is_none() {
                return Err(format!("required field '{}' has no property rule", name));
            }
        }

        for prop in &self.properties {
            let rule = &prop.rule;
            let is_string = rule.bson_type == BsonType::String;

            if let Some(pattern) = &rule.pattern {
                if !is_string {
                    return Err(format!("'{}': pattern requires a string type", prop.name));
                }
                regex::Regex::new(pattern)
                    .map_err(|e| format!("'{}': invalid pattern: {}", prop.name, e))?;
            }
            if rule.min_length.is_some() && !is_string {
                return Err(format!("'{}': minLength requires a string type", prop.name));
            }
            if let Some(values) = &rule.enum_values {
                if !is_string {
                    return Err(format!("'{}': enum requires a string type", prop.name));
                }
                if values.is_empty() {
                    return Err(format!("'{}': enum must not be empty", prop.name));
                }
            }
            if rule.minimum.is_some() && !rule.bson_type.is_numeric() {
                return Err(format!("'{}': minimum requires a numeric type", prop.name));
            }
        }

        Ok(())
    }
}
