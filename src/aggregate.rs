//! Aggregator: one forward pass from raw records to the date index, maxima,
//! and the per-measurement value distributions used by the scales.

use indexmap::IndexMap;
use tracing::debug;

use crate::config::ColumnLayout;
use crate::data::{
    DateIndex, DateKey, Distributions, Maxima, Measurement, RawRecord, RegionIndex, RegionMetric,
};
use crate::errors::PipelineError;

/// Output of a single aggregation pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Aggregate {
    /// Date -> region -> metric, both levels in first-seen order.
    pub index: DateIndex,
    /// Running maxima over every record.
    pub maxima: Maxima,
    /// Every parsed value per measurement, duplicates included.
    pub distributions: Distributions,
}

/// Parse a non-negative integer literal made only of ASCII digits.
///
/// Empty text, signs, decimal points, and values past `u64::MAX` are rejected.
pub fn parse_count(value: &str) -> Option<u64> {
    if value.is_empty() || !value.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    value.parse::<u64>().ok()
}

fn parse_field(record: &RawRecord, field: &str, value: &str) -> Result<u64, PipelineError> {
    parse_count(value).ok_or_else(|| PipelineError::Value {
        line: record.line,
        field: field.to_string(),
        value: value.to_string(),
    })
}

/// Build the date index, maxima, and distributions from `records`.
///
/// Any record with a missing or non-numeric measurement fails the whole call;
/// the error names the offending source column from `layout`.
/// A repeated `(date, region_id)` pair keeps the later record's values at the
/// position where the region was first seen.
pub fn ingest<I>(records: I, layout: &ColumnLayout) -> Result<Aggregate, PipelineError>
where
    I: IntoIterator<Item = RawRecord>,
{
    let mut maxima = Maxima::default();
    let mut distributions = Distributions::default();
    let mut by_date: IndexMap<DateKey, Vec<(String, RegionMetric)>> = IndexMap::new();

    for record in records {
        let measurement_a = parse_field(
            &record,
            layout.measurement_column(Measurement::A),
            &record.measurement_a,
        )?;
        let measurement_b = parse_field(
            &record,
            layout.measurement_column(Measurement::B),
            &record.measurement_b,
        )?;

        distributions.measurement_a.push(measurement_a);
        distributions.measurement_b.push(measurement_b);
        maxima.observe(measurement_a, measurement_b);

        let RawRecord {
            date,
            region_id,
            region_name,
            parent_region,
            ..
        } = record;
        by_date.entry(date).or_default().push((
            region_id,
            RegionMetric {
                measurement_a,
                measurement_b,
                region_name,
                parent_region,
            },
        ));
    }

    // Each date's region map is completed before it joins the outer index.
    let index: DateIndex = by_date
        .into_iter()
        .map(|(date, rows)| {
            let mut regions = RegionIndex::with_capacity(rows.len());
            for (region_id, metric) in rows {
                regions.insert(region_id, metric);
            }
            (date, regions)
        })
        .collect();

    debug!(
        record_count = distributions.len(),
        date_count = index.len(),
        max_measurement_a = maxima.measurement_a,
        max_measurement_b = maxima.measurement_b,
        "aggregated records"
    );
    Ok(Aggregate {
        index,
        maxima,
        distributions,
    })
}
