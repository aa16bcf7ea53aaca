//! BTreeMap-based index structures
//!
//! Indexes use BTreeMap<IndexKey, Vec<DocumentSlot>> for deterministic ordering.
//! Slots are always sorted ascending.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;

use crate::schema::value;

/// Position of a document inside its collection
pub type DocumentSlot = u64;

/// Index key representing a single field value.
///
/// Ordering follows BSON comparison order:
/// Null < numbers < String < ObjectId < Bool < Date.
/// `Int` and `Float` keys compare by numeric value; NaN sorts below every
/// other number.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndexKey {
    /// Null or missing field
    Null,
    /// Integral number
    Int(i64),
    /// Non-integral number (stored as bits for total ordering)
    Float(u64),
    /// String value
    String(String),
    /// ObjectId hex (lowercase)
    ObjectId(String),
    /// Boolean value (false < true)
    Bool(bool),
    /// Date as epoch milliseconds
    Date(i64),
}

impl IndexKey {
    /// Create a key from a number.
    ///
    /// Integral values map to `Int` so `1` and `1.0` collide as in MongoDB.
    pub fn from_number(v: f64) -> Self {
        if v.fract() == 0.0 && v >= i64::MIN as f64 && v <= i64::MAX as f64 {
            return IndexKey::Int(v as i64);
        }
        // one canonical NaN so every NaN shares a key
        let bits = (if v.is_nan() { f64::NAN } else { v }).to_bits();
        let ordered = if (bits >> 63) == 1 {
            !bits
        } else {
            bits ^ (1 << 63)
        };
        IndexKey::Float(ordered)
    }

    /// Create a key from a string
    pub fn from_string(v: impl Into<String>) -> Self {
        IndexKey::String(v.into())
    }

    /// Create a key from a document value.
    ///
    /// Arrays, embedded objects and malformed wrappers are not indexed.
    pub fn from_json(v: &Value) -> Option<Self> {
        match v {
            Value::Null => Some(IndexKey::Null),
            Value::Bool(b) => Some(IndexKey::Bool(*b)),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Some(IndexKey::Int(i)),
                None => n.as_f64().map(IndexKey::from_number),
            },
            Value::String(s) => Some(IndexKey::from_string(s)),
            Value::Array(_) => None,
            Value::Object(_) => {
                if let Some(hex) = value::object_id_hex(v) {
                    Some(IndexKey::ObjectId(hex.to_ascii_lowercase()))
                } else if let Some(ms) = value::date_millis(v) {
                    Some(IndexKey::Date(ms))
                } else {
                    value::numeric_value(v).map(IndexKey::from_number)
                }
            }
        }
    }
}

/// Inverse of the bit mapping in `from_number`
fn float_value(bits: u64) -> f64 {
    let raw = if (bits >> 63) == 1 {
        bits ^ (1 << 63)
    } else {
        !bits
    };
    f64::from_bits(raw)
}

/// Compares an integral key with a non-integral one; never equal
fn cmp_int_float(i: i64, bits: u64) -> Ordering {
    let f = float_value(bits);
    if f.is_nan() {
        return Ordering::Greater;
    }
    if (i as f64) < f {
        Ordering::Less
    } else {
        Ordering::Greater
    }
}

impl IndexKey {
    fn type_rank(&self) -> u8 {
        match self {
            IndexKey::Null => 0,
            IndexKey::Int(_) | IndexKey::Float(_) => 1,
            IndexKey::String(_) => 2,
            IndexKey::ObjectId(_) => 3,
            IndexKey::Bool(_) => 4,
            IndexKey::Date(_) => 5,
        }
    }
}

impl Ord for IndexKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (IndexKey::Int(a), IndexKey::Int(b)) => a.cmp(b),
            (IndexKey::Float(a), IndexKey::Float(b)) => {
                match (float_value(*a).is_nan(), float_value(*b).is_nan()) {
                    (true, true) => Ordering::Equal,
                    (true, false) => Ordering::Less,
                    (false, true) => Ordering::Greater,
                    (false, false) => a.cmp(b),
                }
            }
            (IndexKey::Int(a), IndexKey::Float(b)) => cmp_int_float(*a, *b),
            (IndexKey::Float(a), IndexKey::Int(b)) => cmp_int_float(*b, *a).reverse(),
            (IndexKey::String(a), IndexKey::String(b)) => a.cmp(b),
            (IndexKey::ObjectId(a), IndexKey::ObjectId(b)) => a.cmp(b),
            (IndexKey::Bool(a), IndexKey::Bool(b)) => a.cmp(b),
            (IndexKey::Date(a), IndexKey::Date(b)) => a.cmp(b),
            _ => self.type_rank().cmp(&other.type_rank()),
        }
    }
}

impl PartialOrd for IndexKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for IndexKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexKey::Null => write!(f, "null"),
            IndexKey::Int(i) => write!(f, "{}", i),
            IndexKey::Float(bits) => write!(f, "{}", float_value(*bits)),
            IndexKey::String(s) => write!(f, "{:?}", s),
            IndexKey::ObjectId(hex) => write!(f, "ObjectId('{}')", hex),
            IndexKey::Bool(b) => write!(f, "{}", b),
            IndexKey::Date(ms) => write!(f, "new Date({})", ms),
        }
    }
}

/// A single field index using BTreeMap for deterministic ordering.
#[derive(Debug, Default, Clone)]
pub struct IndexTree {
    tree: BTreeMap<IndexKey, Vec<DocumentSlot>>,
}

impl IndexTree {
    /// Creates a new empty index tree
    pub fn new() -> Self {
        Self {
            tree: BTreeMap::new(),
        }
    }

    /// Insert a slot for a key.
    ///
    /// Maintains sorted ascending order.
    pub fn insert(&mut self, key: IndexKey, slot: DocumentSlot) {
        let slots = self.tree.entry(key).or_default();
        if let Err(pos) = slots.binary_search(&slot) {
            slots.insert(pos, slot);
        }
    }

    /// Whether any document holds this key
    pub fn contains(&self, key: &IndexKey) -> bool {
        self.tree.contains_key(key)
    }

    /// Lookup all slots for an exact key match.
    ///
    /// Returns slots sorted ascending.
    pub fn lookup_eq(&self, key: &IndexKey) -> Vec<DocumentSlot> {
        self.tree.get(key).cloned().unwrap_or_default()
    }

    /// Returns the number of distinct keys
    pub fn key_count(&self) -> usize {
        self.tree.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_key_ordering() {
        let keys = vec![
            IndexKey::Null,
            IndexKey::from_number(-100.0),
            IndexKey::from_number(0.5),
            IndexKey::from_number(100.0),
            IndexKey::from_string("aaa"),
            IndexKey::from_string("zzz"),
            IndexKey::ObjectId("65a1f0c2e4b0a1b2c3d4e5f6".into()),
            IndexKey::Bool(false),
            IndexKey::Bool(true),
            IndexKey::Date(0),
        ];

        for i in 1..keys.len() {
            assert!(keys[i - 1] < keys[i], "{:?} < {:?}", keys[i - 1], keys[i]);
        }
    }

    #[test]
    fn test_numbers_order_by_value() {
        let mut keys = vec![
            IndexKey::from_number(100.0),
            IndexKey::from_number(2.5),
            IndexKey::from_number(-0.5),
            IndexKey::from_number(f64::NAN),
            IndexKey::from_number(-3.0),
            IndexKey::from_number(0.5),
            IndexKey::from_number(2.0),
        ];
        keys.sort();
        let shown: Vec<String> = keys.iter().map(|k| k.to_string()).collect();
        assert_eq!(shown, vec!["NaN", "-3", "-0.5", "0.5", "2", "2.5", "100"]);

        assert!(IndexKey::from_number(100.0) > IndexKey::from_number(0.5));
        assert!(IndexKey::Int(i64::MAX) > IndexKey::from_number(1500.25));
    }

    #[test]
    fn test_integral_numbers_collide() {
        assert_eq!(IndexKey::from_json(&json!(1)), IndexKey::from_json(&json!(1.0)));
        assert_eq!(
            IndexKey::from_json(&json!({"$numberInt": "7"})),
            Some(IndexKey::Int(7))
        );
    }

    #[test]
    fn test_insert_and_lookup() {
        let mut tree = IndexTree::new();
        tree.insert(IndexKey::from_string("alice"), 2);
        tree.insert(IndexKey::from_string("alice"), 1);
        tree.insert(IndexKey::from_string("bob"), 3);
        tree.insert(IndexKey::from_string("bob"), 3);

        assert_eq!(tree.lookup_eq(&IndexKey::from_string("alice")), vec![1, 2]);
        assert_eq!(tree.lookup_eq(&IndexKey::from_string("bob")), vec![3]);
        assert!(tree.contains(&IndexKey::from_string("bob")));
        assert_eq!(tree.key_count(), 2);
        assert_eq!(tree.lookup_eq(&IndexKey::from_string("carol")), Vec::<DocumentSlot>::new());
    }

    #[test]
    fn test_from_json_wrappers() {
        assert_eq!(
            IndexKey::from_json(&json!({"$oid": "65A1F0C2E4B0A1B2C3D4E5F6"})),
            Some(IndexKey::ObjectId("65a1f0c2e4b0a1b2c3d4e5f6".into()))
        );
        assert_eq!(
            IndexKey::from_json(&json!({"$date": "1970-01-01T00:00:02Z"})),
            Some(IndexKey::Date(2000))
        );
        assert_eq!(IndexKey::from_json(&json!([1, 2, 3])), None);
        assert_eq!(IndexKey::from_json(&json!({"a": 1})), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(IndexKey::from_string("a@b.com").to_string(), "\"a@b.com\"");
        assert_eq!(IndexKey::from_number(2.5).to_string(), "2.5");
        assert_eq!(IndexKey::from_number(-2.5).to_string(), "-2.5");
        assert_eq!(IndexKey::Null.to_string(), "null");
    }
}
