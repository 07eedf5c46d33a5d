use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::columns;

pub use crate::types::{DateKey, RegionId, RegionName};

/// One parsed row, every field still text as received.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawRecord {
    /// 1-based line number in the source text (header is line 1).
    pub line: u64,
    /// Observation date, e.g. `2020-03-01`.
    pub date: DateKey,
    /// Region code, e.g. a FIPS code.
    pub region_id: RegionId,
    /// Region display name.
    pub region_name: RegionName,
    /// Enclosing region name; empty when the layout has none.
    pub parent_region: RegionName,
    /// Unparsed measurement A (cumulative cases in the default layout).
    pub measurement_a: String,
    /// Unparsed measurement B (cumulative deaths in the default layout).
    pub measurement_b: String,
}

/// Metric values for one region on one date.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionMetric {
    pub measurement_a: u64,
    pub measurement_b: u64,
    pub region_name: RegionName,
    pub parent_region: RegionName,
}

impl RegionMetric {
    /// Value of the selected measurement.
    pub fn value(&self, measurement: Measurement) -> u64 {
        match measurement {
            Measurement::A => self.measurement_a,
            Measurement::B => self.measurement_b,
        }
    }
}

/// Which of the two measurements to read.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Measurement {
    /// Measurement A (cases).
    A,
    /// Measurement B (deaths).
    B,
}

impl Measurement {
    /// Both measurements, A first.
    pub const ALL: [Measurement; 2] = [Measurement::A, Measurement::B];
}

/// Default-layout column name; `ColumnLayout::measurement_column` gives the
/// name for any other layout.
impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Measurement::A => f.write_str(columns::CASES),
            Measurement::B => f.write_str(columns::DEATHS),
        }
    }
}

/// Binning strategy of a colour scale.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScaleKind {
    /// Quantile binning: each bin holds roughly the same number of observations.
    EqualPopulation,
    /// Quantize binning: the value range is split into equal-width intervals.
    EqualWidth,
}

impl ScaleKind {
    /// Both scale kinds, equal-population first.
    pub const ALL: [ScaleKind; 2] = [ScaleKind::EqualPopulation, ScaleKind::EqualWidth];
}

impl fmt::Display for ScaleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScaleKind::EqualPopulation => f.write_str("equal_population"),
            ScaleKind::EqualWidth => f.write_str("equal_width"),
        }
    }
}

/// Largest observed value per measurement.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Maxima {
    pub measurement_a: u64,
    pub measurement_b: u64,
}

impl Maxima {
    /// Maximum of the selected measurement.
    pub fn get(&self, measurement: Measurement) -> u64 {
        match measurement {
            Measurement::A => self.measurement_a,
            Measurement::B => self.measurement_b,
        }
    }

    /// Raise the running maxima to include one record's values.
    pub fn observe(&mut self, measurement_a: u64, measurement_b: u64) {
        self.measurement_a = self.measurement_a.max(measurement_a);
        self.measurement_b = self.measurement_b.max(measurement_b);
    }
}

/// Every observed value per measurement, in input order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Distributions {
    pub measurement_a: Vec<u64>,
    pub measurement_b: Vec<u64>,
}

impl Distributions {
    /// Values of the selected measurement.
    pub fn get(&self, measurement: Measurement) -> &[u64] {
        match measurement {
            Measurement::A => &self.measurement_a,
            Measurement::B => &self.measurement_b,
        }
    }

    /// Number of observations per measurement.
    pub fn len(&self) -> usize {
        self.measurement_a.len()
    }

    /// Returns `true` when nothing was observed.
    pub fn is_empty(&self) -> bool {
        self.measurement_a.is_empty()
    }
}

/// Region metrics for a single date, keyed by region id in first-seen order.
pub type RegionIndex = IndexMap<RegionId, RegionMetric>;
/// Per-date region metrics, keyed by date in first-seen order.
pub type DateIndex = IndexMap<DateKey, RegionIndex>;
