//! Support-level ("reversal point") detection over the low channel.
//!
//! A reversal point is an interior session whose low is strictly below both
//! neighbours. Points are clustered greedily by percentage tolerance, most
//! frequent first, and ranked by how many points each cluster absorbed.

use crate::domain::error::SwingscanError;
use crate::domain::ohlcv::OhlcvBar;
use serde::Serialize;
use std::collections::HashMap;

pub const MIN_REVERSAL_BARS: usize = 3;
pub const DEFAULT_TOLERANCE_PCT: f64 = 3.0;
pub const DEFAULT_NUM_REVERSALS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReversalCandidate {
    pub price: f64,
    pub count: usize,
}

/// A fixed-width price bucket that collected repeated reversals.
/// `lower` is floored to a whole number; `upper` keeps any fractional width.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReversalRange {
    pub lower: i64,
    pub upper: f64,
    pub count: usize,
}

impl ReversalRange {
    pub fn label(&self) -> String {
        format!("{}-{}", self.lower, self.upper)
    }
}

/// Local minima of the low channel, identical lows merged, in first-seen order.
pub fn local_minima(bars: &[OhlcvBar]) -> Vec<ReversalCandidate> {
    let mut found: Vec<ReversalCandidate> = Vec::new();
    let mut index: HashMap<u64, usize> = HashMap::new();

    for w in bars.windows(3) {
        let low = w[1].low;
        if low < w[0].low && low < w[2].low {
            match index.get(&low.to_bits()) {
                Some(&i) => found[i].count += 1,
                None => {
                    index.insert(low.to_bits(), found.len());
                    found.push(ReversalCandidate { price: low, count: 1 });
                }
            }
        }
    }
    found
}

/// Single-pass greedy merge. Each candidate joins the first existing cluster
/// within `tolerance_pct` of the candidate's own price; merged clusters are
/// not re-compared with each other afterwards.
pub fn consolidate(
    mut candidates: Vec<ReversalCandidate>,
    tolerance_pct: f64,
) -> Vec<ReversalCandidate> {
    candidates.sort_by(|a, b| b.count.cmp(&a.count));

    let mut clusters: Vec<ReversalCandidate> = Vec::new();
    for cand in candidates {
        let tolerance = tolerance_pct / 100.0 * cand.price;
        match clusters
            .iter_mut()
            .find(|c| (c.price - cand.price).abs() <= tolerance)
        {
            Some(cluster) => {
                let total = cluster.count + cand.count;
                cluster.price = (cluster.price * cluster.count as f64
                    + cand.price * cand.count as f64)
                    / total as f64;
                cluster.count = total;
            }
            None => clusters.push(cand),
        }
    }

    clusters.sort_by(|a, b| b.count.cmp(&a.count));
    clusters
}

pub fn find_reversals(
    bars: &[OhlcvBar],
    tolerance_pct: f64,
    max_results: usize,
) -> Result<Vec<ReversalCandidate>, SwingscanError> {
    if !tolerance_pct.is_finite() || tolerance_pct < 0.0 {
        return Err(SwingscanError::InvalidParameter {
            name: "tolerance_percentage",
            value: tolerance_pct,
            expected: "a non-negative percentage",
        });
    }
    if bars.len() < MIN_REVERSAL_BARS {
        return Ok(Vec::new());
    }

    let mut clusters = consolidate(local_minima(bars), tolerance_pct);
    clusters.truncate(max_results);
    Ok(clusters)
}

/// Buckets levels that reversed more than once into `range_width`-wide price
/// bands, most active band first.
pub fn find_reversal_ranges(
    levels: &[ReversalCandidate],
    range_width: f64,
) -> Result<Vec<ReversalRange>, SwingscanError> {
    if !range_width.is_finite() || range_width < 1.0 {
        return Err(SwingscanError::InvalidParameter {
            name: "range_width",
            value: range_width,
            expected: "at least 1",
        });
    }

    let mut ranges: Vec<ReversalRange> = Vec::new();
    for level in levels.iter().filter(|l| l.count > 1) {
        let lower = ((level.price / range_width).floor() * range_width) as i64;
        let upper = lower as f64 + range_width;
        match ranges.iter_mut().find(|r| r.lower == lower) {
            Some(range) => range.count += level.count,
            None => ranges.push(ReversalRange {
                lower,
                upper,
                count: level.count,
            }),
        }
    }

    ranges.sort_by(|a, b| b.count.cmp(&a.count));
    Ok(ranges)
}
