use crate::scale::BinningFunction;

/// How a set of values spreads across the bins of one scale.
#[derive(Clone, Debug, PartialEq)]
pub struct BinOccupancy {
    pub counts: Vec<usize>,
    pub total: usize,
    pub min: usize,
    pub max: usize,
    pub mean: f64,
    /// Largest bin count divided by the smallest; infinite when a bin is empty.
    pub ratio: f64,
}

/// Count how many of `values` land in each bin of `scale`.
pub fn bin_occupancy(scale: &dyn BinningFunction, values: &[u64]) -> BinOccupancy {
    let mut counts = vec![0usize; scale.bin_count()];
    for value in values {
        let bin = scale.bin(*value as f64);
        if let Some(slot) = counts.get_mut(bin) {
            *slot += 1;
        }
    }
    let total = values.len();
    let min = counts.iter().copied().min().unwrap_or(0);
    let max = counts.iter().copied().max().unwrap_or(0);
    let mean = if counts.is_empty() {
        0.0
    } else {
        total as f64 / counts.len() as f64
    };
    let ratio = if min == 0 {
        f64::INFINITY
    } else {
        max as f64 / min as f64
    };
    BinOccupancy {
        counts,
        total,
        min,
        max,
        mean,
        ratio,
    }
}
