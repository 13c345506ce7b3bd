//! Rain-window selection.
//!
//! Picks the 6-hour bucket with the highest rain chance. The first bucket
//! in canonical order wins ties, and the placeholder counts as 0.

use tracing::debug;

use crate::types::{PeakRain, RainBucket, RainChances};

/// Select the bucket with the highest rain chance.
///
/// The running maximum starts at 0 and only a strictly greater value
/// replaces it, so when every bucket is 0 (or unavailable) the result is
/// `00-06` with probability 0.
pub fn select_peak(chances: &RainChances) -> PeakRain {
    let mut peak = PeakRain {
        bucket: RainBucket::T00_06,
        probability: 0,
    };

    for (bucket, chance) in chances.iter() {
        let value = chance.for_comparison();
        if value > peak.probability {
            peak = PeakRain {
                bucket,
                probability: value,
            };
        }
    }

    debug!(bucket = %peak.bucket, probability = peak.probability, "Peak rain window selected");
    peak
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
