// Time signature derivation and measure indexing.
//
// The numerator comes from the count of leading zeros on the untrimmed
// hash; the denominator is always 4. Measure indices are 1-based and are
// derived from the whole quarter-note beats a sink reports elapsed, so a
// note that starts exactly on a measure boundary belongs to the new
// measure.

use crate::classify::trim_hash;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSignature {
    /// Always 2..=5.
    pub numerator: u8,
    /// Always 4.
    pub denominator: u8,
}

impl TimeSignature {
    /// Derive from the untrimmed hash: numerator = (leading zeros % 3) + 2.
    pub fn from_hash(hash: &str) -> Self {
        let leading_zeros = hash.len() - trim_hash(hash).len();
        TimeSignature {
            numerator: (leading_zeros % 3 + 2) as u8,
            denominator: 4,
        }
    }

    /// 1-based measure index for a cursor at `beats_elapsed` whole beats.
    pub fn measure_at(&self, beats_elapsed: u64) -> u32 {
        let numerator = u64::from(self.numerator);
        if beats_elapsed < numerator {
            1
        } else {
            (beats_elapsed / numerator + 1) as u32
        }
    }
}
