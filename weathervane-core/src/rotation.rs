//! Cycling through the configured list of lookup keys.

use anyhow::Result;

use crate::model::normalize_key;

/// Cycles a fixed, ordered list of lookup keys with wraparound.
///
/// The index is always in `[0, keys.len())`; an empty key list is rejected
/// at construction.
#[derive(Debug)]
pub struct KeyRotator {
    keys: Vec<String>,
    index: usize,
}

impl KeyRotator {
    pub fn new(keys: &[String]) -> Result<Self> {
        if keys.is_empty() {
            return Err(anyhow::anyhow!("Key rotation requires at least one lookup key"));
        }

        Ok(Self {
            keys: keys.iter().map(|k| normalize_key(k)).collect(),
            index: 0,
        })
    }

    /// The key at the current position, without advancing.
    pub fn current(&self) -> &str {
        &self.keys[self.index]
    }

    /// Advance one position, wrapping from the last key back to the first,
    /// and return the new current key.
    pub fn next(&mut self) -> &str {
        self.index = (self.index + 1) % self.keys.len();
        &self.keys[self.index]
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }
}
