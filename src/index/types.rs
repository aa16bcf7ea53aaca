//! Index declarations

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Name of the implicit primary key index
pub const ID_INDEX_NAME: &str = "_id_";

/// A single-field ascending index declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexSpec {
    /// Index name (defaults to `<field>_1`)
    pub name: String,
    /// Indexed field
    pub field: String,
    /// Reject documents sharing a key
    #[serde(default)]
    pub unique: bool,
    /// Skip documents lacking the field
    #[serde(default)]
    pub sparse: bool,
}

impl IndexSpec {
    /// Ascending index on a field with the default name
    pub fn ascending(field: impl Into<String>) -> Self {
        let field = field.into();
        Self {
            name: format!("{}_1", field),
            field,
            unique: false,
            sparse: false,
        }
    }

    /// The implicit unique `_id` index
    pub fn primary() -> Self {
        Self {
            name: ID_INDEX_NAME.to_string(),
            field: "_id".to_string(),
            unique: true,
            sparse: false,
        }
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn sparse(mut self) -> Self {
        self.sparse = true;
        self
    }

    /// Whether two declarations describe the same index
    pub fn same_definition(&self, other: &IndexSpec) -> bool {
        self.field == other.field && self.unique == other.unique && self.sparse == other.sparse
    }

    /// Renders the entry used in a MongoDB `createIndexes` command
    pub fn to_mongo_index(&self) -> Value {
        let mut key = Map::new();
        key.insert(self.field.clone(), json!(1));
        let mut index = json!({
            "key": Value::Object(key),
            "name": self.name,
        });
        if self.unique {
            index["unique"] = json!(true);
        }
        if self.sparse {
            index["sparse"] = json!(true);
        }
        index
    }
}
