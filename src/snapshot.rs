//! The immutable result of one ingestion run.

use std::sync::Arc;

use tracing::{debug, enabled, Level};

use crate::aggregate::{ingest, Aggregate};
use crate::config::PipelineConfig;
use crate::dates::short_label;
use crate::data::{DateIndex, Maxima, Measurement, RawRecord, RegionIndex, RegionMetric, ScaleKind};
use crate::errors::PipelineError;
use crate::metrics::bin_occupancy;
use crate::palette::Palette;
use crate::parser::parse_records;
use crate::scale::{BinningFunction, ScaleSet};
use crate::types::ColorHex;

/// Date index, maxima, and colour scales built together from one dataset.
///
/// Nothing mutates a snapshot after construction; share it behind an `Arc`.
#[derive(Clone, Debug)]
pub struct Snapshot {
    index: DateIndex,
    maxima: Maxima,
    scales: ScaleSet,
    palette: Palette,
}

impl Snapshot {
    /// Parse `text` and build a snapshot from its rows.
    pub fn from_text(text: &str, config: &PipelineConfig) -> Result<Self, PipelineError> {
        config.validate()?;
        let records = parse_records(text, &config.layout, config.delimiter)?;
        Self::build(records, config)
    }

    /// Build a snapshot from already-parsed records.
    ///
    /// Either every part (index, maxima, scales) is built or an error is
    /// returned; there is no partial result.
    pub fn from_records<I>(records: I, config: &PipelineConfig) -> Result<Self, PipelineError>
    where
        I: IntoIterator<Item = RawRecord>,
    {
        config.validate()?;
        Self::build(records, config)
    }

    fn build<I>(records: I, config: &PipelineConfig) -> Result<Self, PipelineError>
    where
        I: IntoIterator<Item = RawRecord>,
    {
        let Aggregate {
            index,
            maxima,
            distributions,
        } = ingest(records, &config.layout)?;
        let scales = ScaleSet::build(
            &distributions,
            &maxima,
            config.palette_size,
            config.equal_width_min,
        )?;
        if enabled!(Level::DEBUG) {
            for kind in ScaleKind::ALL {
                for measurement in Measurement::ALL {
                    let occupancy = bin_occupancy(
                        scales.get(kind, measurement).as_ref(),
                        distributions.get(measurement),
                    );
                    debug!(
                        %kind,
                        measurement = config.layout.measurement_column(measurement),
                        counts = ?occupancy.counts,
                        "scale bin occupancy"
                    );
                }
            }
        }
        Ok(Self {
            index,
            maxima,
            scales,
            palette: Palette::default(),
        })
    }

    /// Dates in first-seen order.
    pub fn list_dates(&self) -> impl Iterator<Item = &str> + '_ {
        self.index.keys().map(String::as_str)
    }

    /// Number of distinct dates.
    pub fn date_count(&self) -> usize {
        self.index.len()
    }

    /// Date at `position` in first-seen order (slider position).
    pub fn date_at(&self, position: usize) -> Option<&str> {
        self.index
            .get_index(position)
            .map(|(date, _)| date.as_str())
    }

    /// `MM/DD` label of the date at `position`.
    pub fn date_label(&self, position: usize) -> Option<String> {
        self.date_at(position).map(short_label)
    }

    /// Every region's metric on `date`.
    pub fn regions(&self, date: &str) -> Option<&RegionIndex> {
        self.index.get(date)
    }

    /// Metric for one region on one date.
    pub fn region_metric(&self, date: &str, region_id: &str) -> Option<&RegionMetric> {
        self.index.get(date)?.get(region_id)
    }

    /// Full date index.
    pub fn index(&self) -> &DateIndex {
        &self.index
    }

    /// Largest observed value per measurement.
    pub fn maxima(&self) -> Maxima {
        self.maxima
    }

    /// Binning function for `kind` over `measurement`.
    pub fn scale(&self, kind: ScaleKind, measurement: Measurement) -> &dyn BinningFunction {
        self.scales.get(kind, measurement).as_ref()
    }

    /// Shared handle to the binning function for `kind` over `measurement`.
    pub fn scale_arc(&self, kind: ScaleKind, measurement: Measurement) -> Arc<dyn BinningFunction> {
        Arc::clone(self.scales.get(kind, measurement))
    }

    /// Palette the scales index into.
    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Fill colour for a region on a date; regions without data get colour 0.
    pub fn fill_color(
        &self,
        date: &str,
        region_id: &str,
        kind: ScaleKind,
        measurement: Measurement,
    ) -> ColorHex {
        match self.region_metric(date, region_id) {
            Some(metric) => {
                let bin = self.scale(kind, measurement).bin(metric.value(measurement) as f64);
                self.palette.color(bin)
            }
            None => self.palette.color(0),
        }
    }
}
