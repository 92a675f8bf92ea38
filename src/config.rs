use serde::Deserialize;

use crate::address::{AddressLayout, ADDRESS_BITS};

/// The cache geometry, usually parsed from a JSON file
///
/// Every field defaults to the reference configuration (64 byte lines, 16384 sets, 8 ways over a
/// 32-bit address), so an empty object or no config file at all gives a runnable simulator
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub line_size: u32,
    pub num_sets: u32,
    pub num_ways: u32,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            line_size: 64,
            num_sets: 16384,
            num_ways: 8,
        }
    }
}

impl CacheConfig {
    /// Checks the geometry before any simulation starts
    ///
    /// Line size and set count must be powers of two so the offset and index are plain bit
    /// fields, the way count must be a power of two no larger than 64 so every pseudo-LRU leaf
    /// sits at the same depth, and the two widths must leave at least one tag bit
    pub fn validate(&self) -> Result<(), String> {
        if !self.line_size.is_power_of_two() {
            return Err(format!("Line size must be a power of two, got {}", self.line_size));
        }
        if !self.num_sets.is_power_of_two() {
            return Err(format!("Number of sets must be a power of two, got {}", self.num_sets));
        }
        if !self.num_ways.is_power_of_two() || self.num_ways > 64 {
            return Err(format!("Number of ways must be a power of two no larger than 64, got {}", self.num_ways));
        }
        if self.offset_bits() + self.index_bits() >= ADDRESS_BITS {
            return Err(format!(
                "{} byte lines and {} sets leave no tag bits in a {ADDRESS_BITS}-bit address",
                self.line_size, self.num_sets
            ));
        }
        Ok(())
    }

    pub fn offset_bits(&self) -> u32 {
        self.line_size.trailing_zeros()
    }

    pub fn index_bits(&self) -> u32 {
        self.num_sets.trailing_zeros()
    }

    /// The address layout this geometry induces. Call [`CacheConfig::validate`] first
    pub fn layout(&self) -> AddressLayout {
        AddressLayout::new(self.offset_bits(), self.index_bits())
    }
}
