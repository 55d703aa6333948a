//! Specialized collection types

pub use slotmap::{new_key_type, Key, SlotMap};

/// Handle-based map using slot map for stable references
pub type HandleMap<K, T> = SlotMap<K, T>;

/// Pack a slot key into the raw 64-bit form used for identity hashes
pub fn key_bits<K: Key>(key: K) -> u64 {
    key.data().as_ffi()
}
