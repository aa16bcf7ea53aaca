//! Document validator
//!
//! Validation semantics follow MongoDB `$jsonSchema`:
//! - The document root is an object
//! - Every required field is present (a `null` value counts as present)
//! - Every present declared property matches its `bsonType` exactly
//! - String constraints: `pattern`, `minLength` (in characters), `enum`
//! - Numeric constraint: `minimum`
//! - Undeclared fields pass unless the contract is closed
//!
//! The first violation found is reported. Check order is deterministic:
//! required fields first, then properties in declaration order.

use std::collections::HashMap;

use regex::Regex;
use serde_json::{Map, Value};

use super::errors::{SchemaError, SchemaResult, ValidationDetails};
use super::types::{BsonType, CollectionSchema, FieldRule};
use super::value;

/// A registered contract with its patterns compiled.
///
/// Validation does not mutate documents.
#[derive(Debug, Clone)]
pub struct SchemaValidator {
    schema: CollectionSchema,
    patterns: HashMap<String, Regex>,
}

impl SchemaValidator {
    /// Compiles a contract.
    ///
    /// # Errors
    ///
    /// Returns `TRANSIT_SCHEMA_MALFORMED` if the contract does not pass
    /// `validate_structure` or a pattern fails to compile.
    pub fn new(schema: CollectionSchema) -> SchemaResult<Self> {
        schema
            .validate_structure()
            .map_err(|reason| SchemaError::malformed(&schema.collection, reason))?;

        let mut patterns = HashMap::new();
        for prop in &schema.properties {
            if let Some(pattern) = &prop.rule.pattern {
                let re = Regex::new(pattern).map_err(|e| {
                    SchemaError::malformed(
                        &schema.collection,
                        format!("'{}': invalid pattern: {}", prop.name, e),
                    )
                })?;
                patterns.insert(prop.name.clone(), re);
            }
        }

        Ok(Self { schema, patterns })
    }

    /// Returns the contract this validator enforces
    pub fn schema(&self) -> &CollectionSchema {
        &self.schema
    }

    /// Validates a document against the contract.
    ///
    /// # Errors
    ///
    /// Returns `TRANSIT_SCHEMA_VALIDATION_FAILED` with details of the first
    /// violation.
    pub fn validate_document(&self, document: &Value) -> SchemaResult<()> {
        let doc_obj = match document {
            Value::Object(obj) if value::classify(document) == Ok(BsonType::Object) => obj,
            other => {
                return Err(self.fail(ValidationDetails::type_mismatch(
                    "$root",
                    "object",
                    value::describe(other),
                )))
            }
        };

        for name in &self.schema.required {
            if !doc_obj.contains_key(name) {
                return Err(self.fail(ValidationDetails::missing_field(name)));
            }
        }

        if !self.schema.allow_undeclared {
            self.check_undeclared(doc_obj)?;
        }

        for prop in &self.schema.properties {
            if let Some(field_value) = doc_obj.get(&prop.name) {
                self.validate_value(&prop.name, field_value, &prop.rule)?;
            }
        }

        Ok(())
    }

    fn check_undeclared(&self, obj: &Map<String, Value>) -> SchemaResult<()> {
        for key in obj.keys() {
            if key != "_id" && self.schema.property(key).is_none() {
                return Err(self.fail(ValidationDetails::extra_field(key)));
            }
        }
        Ok(())
    }

    /// Validates a single value against a property rule.
    fn validate_value(&self, field: &str, field_value: &Value, rule: &FieldRule) -> SchemaResult<()> {
        let actual = value::classify(field_value).map_err(|reason| {
            self.fail(ValidationDetails::type_mismatch(
                field,
                rule.bson_type.type_name(),
                reason,
            ))
        })?;

        if actual != rule.bson_type {
            return Err(self.fail(ValidationDetails::type_mismatch(
                field,
                rule.bson_type.type_name(),
                actual.type_name(),
            )));
        }

        if let Some(s) = field_value.as_str() {
            self.validate_string(field, s, rule)?;
        }

        if let Some(minimum) = rule.minimum {
            // classify succeeded with a numeric type, so the value is numeric
            let n = value::numeric_value(field_value).unwrap_or(f64::NAN);
            if n.is_nan() || n < minimum as f64 {
                return Err(self.fail(ValidationDetails::new(
                    field,
                    format!("number >= {}", minimum),
                    field_value.to_string(),
                )));
            }
        }

        Ok(())
    }

    fn validate_string(&self, field: &str, s: &str, rule: &FieldRule) -> SchemaResult<()> {
        if let Some(min_length) = rule.min_length {
            let len = s.chars().count();
            if len < min_length {
                return Err(self.fail(ValidationDetails::new(
                    field,
                    format!("string of at least {} characters", min_length),
                    format!("{} characters", len),
                )));
            }
        }

        if let Some(re) = self.patterns.get(field) {
            if !re.is_match(s) {
                return Err(self.fail(ValidationDetails::new(
                    field,
                    format!("string matching '{}'", re.as_str()),
                    format!("'{}'", s),
                )));
            }
        }

        if let Some(allowed) = &rule.enum_values {
            if !allowed.iter().any(|v| v == s) {
                return Err(self.fail(ValidationDetails::new(
                    field,
                    format!("one of [{}]", allowed.join(", ")),
                    format!("'{}'", s),
                )));
            }
        }

        Ok(())
    }

    fn fail(&self, details: ValidationDetails) -> SchemaError {
        SchemaError::validation_failed(&self.schema.collection, details)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn passengers() -> SchemaValidator {
        let schema = CollectionSchema::new("passengers")
            .required(
                "email",
                FieldRule::string().with_pattern(r"^[^@]+@[^@]+\.[a-z]{2,}$"),
            )
            .required("password", FieldRule::string().with_min_length(6))
            .optional("isActive", FieldRule::bool())
            .optional("tier", FieldRule::string_enum(["BASIC", "GOLD"]))
            .optional("rides", FieldRule::int().with_minimum(0));
        SchemaValidator::new(schema).unwrap()
    }

    #[test]
    fn test_valid_document_passes() {
        let doc = json!({"email": "a@b.com", "password": "secret"});
        assert!(passengers().validate_document(&doc).is_ok());
    }

    #[test]
    fn test_undeclared_fields_pass_by_default() {
        let doc = json!({"email": "a@b.com", "password": "secret", "nickname": "ab"});
        assert!(passengers().validate_document(&doc).is_ok());
    }

    #[test]
    fn test_closed_contract_rejects_undeclared() {
        let schema = CollectionSchema::new("routes")
            .required("name", FieldRule::string())
            .closed();
        let validator = SchemaValidator::new(schema).unwrap();

        assert!(validator
            .validate_document(&json!({"_id": 1, "name": "Loop"}))
            .is_ok());
        let err = validator
            .validate_document(&json!({"name": "Loop", "color": "red"}))
            .unwrap_err();
        assert_eq!(err.details().unwrap().field, "color");
    }

    #[test]
    fn test_missing_required_field_fails() {
        let err = passengers()
            .validate_document(&json!({"email": "a@b.com"}))
            .unwrap_err();
        assert_eq!(err.code().code(), "TRANSIT_SCHEMA_VALIDATION_FAILED");
        assert_eq!(err.details().unwrap().field, "password");
        assert_eq!(err.details().unwrap().actual, "missing");
    }

    #[test]
    fn test_type_mismatch_fails() {
        let err = passengers()
            .validate_document(&json!({"email": "a@b.com", "password": 123456}))
            .unwrap_err();
        let details = err.details().unwrap();
        assert_eq!(details.field, "password");
        assert_eq!(details.expected, "string");
        assert_eq!(details.actual, "int");
    }

    #[test]
    fn test_null_is_present_but_wrong_type() {
        let err = passengers()
            .validate_document(&json!({"email": "a@b.com", "password": null}))
            .unwrap_err();
        assert_eq!(err.details().unwrap().actual, "null");
    }

    #[test]
    fn test_pattern_enforced() {
        let err = passengers()
            .validate_document(&json!({"email": "not-an-email", "password": "secret"}))
            .unwrap_err();
        assert_eq!(err.details().unwrap().field, "email");
    }

    #[test]
    fn test_min_length_counts_characters() {
        let v = passengers();
        assert!(v
            .validate_document(&json!({"email": "a@b.com", "password": "12345"}))
            .is_err());
        // six characters, more than six bytes
        assert!(v
            .validate_document(&json!({"email": "a@b.com", "password": "éééééé"}))
            .is_ok());
    }

    #[test]
    fn test_enum_enforced() {
        let v = passengers();
        let base = |tier: &str| json!({"email": "a@b.com", "password": "secret", "tier": tier});
        assert!(v.validate_document(&base("GOLD")).is_ok());
        let err = v.validate_document(&base("gold")).unwrap_err();
        assert!(err.details().unwrap().expected.contains("BASIC"));
    }

    #[test]
    fn test_minimum_enforced() {
        let v = passengers();
        let base = |rides: i64| json!({"email": "a@b.com", "password": "secret", "rides": rides});
        assert!(v.validate_document(&base(0)).is_ok());
        assert!(v.validate_document(&base(-1)).is_err());
    }

    #[test]
    fn test_root_must_be_object() {
        let err = passengers().validate_document(&json!([1, 2])).unwrap_err();
        assert_eq!(err.details().unwrap().field, "$root");
    }

    #[test]
    fn test_malformed_wrapper_rejected() {
        let schema = CollectionSchema::new("trips").required("routeId", FieldRule::object_id());
        let v = SchemaValidator::new(schema).unwrap();
        assert!(v
            .validate_document(&json!({"routeId": {"$oid": "65a1f0c2e4b0a1b2c3d4e5f6"}}))
            .is_ok());
        assert!(v
            .validate_document(&json!({"routeId": {"$oid": "short"}}))
            .is_err());
        assert!(v
            .validate_document(&json!({"routeId": "65a1f0c2e4b0a1b2c3d4e5f6"}))
            .is_err());
    }

    #[test]
    fn test_malformed_contract_rejected() {
        let schema = CollectionSchema::new("passengers")
            .required("email", FieldRule::string().with_pattern("[unclosed"));
        let err = SchemaValidator::new(schema).unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_validation_is_deterministic() {
        let v = passengers();
        let doc = json!({"email": "bad", "password": "1"});
        let first = v.validate_document(&doc).unwrap_err();
        for _ in 0..50 {
            let again = v.validate_document(&doc).unwrap_err();
            assert_eq!(again.details(), first.details());
        }
        // required-first ordering: password is present, so the email pattern trips first
        assert_eq!(first.details().unwrap().field, "email");
    }
}
