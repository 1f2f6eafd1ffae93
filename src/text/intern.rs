//! Hashing and caches backing the text parser's string/value interning.
//!
//! This is an optimization, not a correctness requirement (spec.md §4.3):
//! collisions in a 64-bit hash space across the handful of distinct tokens
//! in a real savegame are astronomically unlikely, and the caches are
//! cleared at the end of every top-level parse.

use crate::value::Value;
use std::collections::HashMap;
use std::rc::Rc;

/// FNV-1a 64-bit hash over a byte slice.
pub fn hash_bytes(bytes: &[u8]) -> u64 {
    const OFFSET_BASIS: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;

    let mut hash = OFFSET_BASIS;
    for &b in bytes {
        hash ^= b as u64;
        hash = hash.wrapping_mul(PRIME);
    }
    hash
}

/// Caches shared `Rc<str>` instances, keyed by hash of the source bytes.
#[derive(Default)]
pub struct StringCache {
    entries: HashMap<u64, Rc<str>>,
}

impl StringCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a shared string for `bytes`, decoding (Windows-1252) and
    /// inserting on first sight.
    pub fn intern(&mut self, bytes: &[u8]) -> Rc<str> {
        let hash = hash_bytes(bytes);
        if let Some(s) = self.entries.get(&hash) {
            return s.clone();
        }
        let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
        let s: Rc<str> = Rc::from(decoded.into_owned());
        self.entries.insert(hash, s.clone());
        s
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Caches fully-narrowed scalar `Value`s, keyed by hash of the source bytes.
#[derive(Default)]
pub struct ValueCache {
    entries: HashMap<u64, Value>,
}

impl ValueCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, bytes: &[u8]) -> Option<Value> {
        self.entries.get(&hash_bytes(bytes)).cloned()
    }

    pub fn insert(&mut self, bytes: &[u8], value: Value) {
        self.entries.insert(hash_bytes(bytes), value);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
