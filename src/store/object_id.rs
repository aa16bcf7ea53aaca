//! ObjectId generation for documents inserted without `_id`
//!
//! Layout (12 bytes, rendered as 24 hex chars):
//! - 4 bytes: seconds since the epoch, big endian
//! - 5 bytes: random value fixed per process
//! - 3 bytes: counter starting at a random value

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::OnceLock;

use chrono::Utc;
use serde_json::{json, Value};

fn process_unique() -> &'static [u8; 5] {
    static UNIQUE: OnceLock<[u8; 5]> = OnceLock::new();
    UNIQUE.get_or_init(rand::random)
}

fn next_counter() -> u32 {
    static COUNTER: OnceLock<AtomicU32> = OnceLock::new();
    COUNTER
        .get_or_init(|| AtomicU32::new(rand::random::<u32>() & 0x00ff_ffff))
        .fetch_add(1, Ordering::Relaxed)
        & 0x00ff_ffff
}

/// Generates a new ObjectId hex string
pub fn generate_hex() -> String {
    let mut bytes = [0u8; 12];
    let secs = Utc::now().timestamp() as u32;
    bytes[..4].copy_from_slice(&secs.to_be_bytes());
    bytes[4..9].copy_from_slice(process_unique());
    bytes[9..].copy_from_slice(&next_counter().to_be_bytes()[1..]);

    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Generates a new ObjectId as an Extended JSON value
pub fn generate() -> Value {
    json!({ "$oid": generate_hex() })
}
