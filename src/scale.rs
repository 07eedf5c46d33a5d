//! Colour scales: functions from a measurement value to a palette bin.
//!
//! Two strategies sit behind one capability, [`BinningFunction`]:
//! - [`EqualPopulationScale`] (quantile) puts roughly the same number of
//!   observations in each bin.
//! - [`EqualWidthScale`] (quantize) splits a fixed value range into equal
//!   intervals.
//!
//! Both are immutable once built. A value sitting exactly on a breakpoint
//! belongs to the lower bin; values outside the built domain clamp to the
//! first or last bin, and `NaN` maps to bin 0.

use std::fmt;
use std::sync::Arc;

use crate::data::{Distributions, Maxima, Measurement, ScaleKind};
use crate::errors::PipelineError;

/// A pure mapping from a number to a bin index in `0..bin_count()`.
pub trait BinningFunction: Send + Sync + fmt::Debug {
    /// Strategy that produced this function.
    fn kind(&self) -> ScaleKind;
    /// Number of bins; every output of `bin` is below this.
    fn bin_count(&self) -> usize;
    /// Bin index for `value`.
    fn bin(&self, value: f64) -> usize;
    /// Upper edges of bins `0..bin_count()-1`, ascending (legend ticks).
    fn breakpoints(&self) -> Vec<f64>;
}

fn check_bins(k: usize) -> Result<(), PipelineError> {
    if k == 0 {
        return Err(PipelineError::Configuration(
            "a scale needs at least one bin".into(),
        ));
    }
    Ok(())
}

/// Quantile scale over an observed distribution.
#[derive(Clone, Debug, PartialEq)]
pub struct EqualPopulationScale {
    breakpoints: Vec<f64>,
    bins: usize,
}

/// Build a quantile scale with `k` bins from `distribution`.
///
/// Breakpoint `i` (for `i` in `1..k`) is the value at fractional rank `i/k` of
/// the sorted distribution, linearly interpolated at position `(n-1)*i/k`.
/// An empty distribution yields a scale that always returns bin 0.
pub fn build_equal_population(
    distribution: &[u64],
    k: usize,
) -> Result<EqualPopulationScale, PipelineError> {
    check_bins(k)?;
    let mut sorted = distribution.to_vec();
    sorted.sort_unstable();
    let n = sorted.len();
    let mut breakpoints = Vec::with_capacity(k.saturating_sub(1));
    if n > 0 {
        for i in 1..k {
            // Integer position math keeps whole-number ranks exact.
            let numerator = (n - 1) as u128 * i as u128;
            let lower = (numerator / k as u128) as usize;
            let remainder = numerator % k as u128;
            let base = sorted[lower] as f64;
            let value = if remainder == 0 {
                base
            } else {
                let next = sorted[lower + 1] as f64;
                base + (next - base) * (remainder as f64 / k as f64)
            };
            breakpoints.push(value);
        }
    }
    Ok(EqualPopulationScale { breakpoints, bins: k })
}

impl BinningFunction for EqualPopulationScale {
    fn kind(&self) -> ScaleKind {
        ScaleKind::EqualPopulation
    }

    fn bin_count(&self) -> usize {
        self.bins
    }

    fn bin(&self, value: f64) -> usize {
        if value.is_nan() {
            return 0;
        }
        self.breakpoints
            .partition_point(|breakpoint| *breakpoint < value)
            .min(self.bins - 1)
    }

    fn breakpoints(&self) -> Vec<f64> {
        self.breakpoints.clone()
    }
}

/// Quantize scale over a fixed `[min, max]` domain.
#[derive(Clone, Debug, PartialEq)]
pub struct EqualWidthScale {
    min: f64,
    max: f64,
    bins: usize,
}

impl EqualWidthScale {
    /// Domain `(min, max)` the scale was built over.
    pub fn domain(&self) -> (f64, f64) {
        (self.min, self.max)
    }
}

/// Build a quantize scale splitting `[domain_min, domain_max]` into `k` bins.
///
/// Intervals are closed on the right: with domain `[0, 30]` and `k = 3`, the
/// values 10, 20 and 30 land in bins 0, 1 and 2. A zero-width domain yields a
/// scale that always returns bin 0.
pub fn build_equal_width(
    domain_max: u64,
    k: usize,
    domain_min: u64,
) -> Result<EqualWidthScale, PipelineError> {
    check_bins(k)?;
    if domain_max < domain_min {
        return Err(PipelineError::Configuration(format!(
            "equal-width domain is inverted: min {domain_min} > max {domain_max}"
        )));
    }
    Ok(EqualWidthScale {
        min: domain_min as f64,
        max: domain_max as f64,
        bins: k,
    })
}

impl BinningFunction for EqualWidthScale {
    fn kind(&self) -> ScaleKind {
        ScaleKind::EqualWidth
    }

    fn bin_count(&self) -> usize {
        self.bins
    }

    fn bin(&self, value: f64) -> usize {
        let span = self.max - self.min;
        if span <= 0.0 || value.is_nan() || value <= self.min {
            return 0;
        }
        if value >= self.max {
            return self.bins - 1;
        }
        let position = (value - self.min) * self.bins as f64 / span;
        let upper = position.ceil() as usize;
        upper.saturating_sub(1).min(self.bins - 1)
    }

    fn breakpoints(&self) -> Vec<f64> {
        let span = self.max - self.min;
        (1..self.bins)
            .map(|i| self.min + span * i as f64 / self.bins as f64)
            .collect()
    }
}

/// The four scales of a snapshot: {equal-population, equal-width} x {A, B}.
#[derive(Clone, Debug)]
pub struct ScaleSet {
    equal_population_a: Arc<dyn BinningFunction>,
    equal_population_b: Arc<dyn BinningFunction>,
    equal_width_a: Arc<dyn BinningFunction>,
    equal_width_b: Arc<dyn BinningFunction>,
}

impl ScaleSet {
    /// Build every scale with `k` bins.
    ///
    /// Equal-population scales use the full distributions; equal-width scales
    /// span `[equal_width_min, maxima]`, widened to the minimum when the
    /// observed maximum is smaller.
    pub fn build(
        distributions: &Distributions,
        maxima: &Maxima,
        k: usize,
        equal_width_min: u64,
    ) -> Result<Self, PipelineError> {
        let width = |measurement: Measurement| -> Result<Arc<dyn BinningFunction>, PipelineError> {
            let max = maxima.get(measurement).max(equal_width_min);
            Ok(Arc::new(build_equal_width(max, k, equal_width_min)?))
        };
        let population =
            |measurement: Measurement| -> Result<Arc<dyn BinningFunction>, PipelineError> {
                Ok(Arc::new(build_equal_population(
                    distributions.get(measurement),
                    k,
                )?))
            };
        Ok(Self {
            equal_population_a: population(Measurement::A)?,
            equal_population_b: population(Measurement::B)?,
            equal_width_a: width(Measurement::A)?,
            equal_width_b: width(Measurement::B)?,
        })
    }

    /// Scale for `kind` over `measurement`.
    pub fn get(&self, kind: ScaleKind, measurement: Measurement) -> &Arc<dyn BinningFunction> {
        match (kind, measurement) {
            (ScaleKind::EqualPopulation, Measurement::A) => &self.equal_population_a,
            (ScaleKind::EqualPopulation, Measurement::B) => &self.equal_population_b,
            (ScaleKind::EqualWidth, Measurement::A) => &self.equal_width_a,
            (ScaleKind::EqualWidth, Measurement::B) => &self.equal_width_b,
        }
    }
}
