#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

/// Aggregation of raw records into the date index, maxima, and distributions.
pub mod aggregate;
/// Pipeline configuration types.
pub mod config;
/// Centralized constants used across the parser, scales, and sources.
pub mod constants;
/// Record, metric, and enum types shared by every stage.
pub mod data;
/// Date key parsing and labelling helpers.
pub mod dates;
/// Bin occupancy helpers.
pub mod metrics;
/// Fixed colour palette.
pub mod palette;
/// Delimited-text row parser.
pub mod parser;
/// Equal-population and equal-width binning functions.
pub mod scale;
/// Immutable ingestion result.
pub mod snapshot;
/// Text source trait and in-memory source.
pub mod source;
/// Snapshot lifecycle, background loading, and cancellation.
pub mod store;
/// Input transports used by sources (filesystem today).
pub mod transport;
/// Shared type aliases.
pub mod types;

mod errors;

pub use aggregate::{ingest, Aggregate};
pub use config::{ColumnLayout, PipelineConfig};
pub use data::{
    DateIndex, Distributions, Maxima, Measurement, RawRecord, RegionIndex, RegionMetric,
    ScaleKind,
};
pub use errors::PipelineError;
pub use palette::{Palette, MAP_COLORS};
pub use parser::parse_records;
pub use scale::{
    build_equal_population, build_equal_width, BinningFunction, EqualPopulationScale,
    EqualWidthScale, ScaleSet,
};
pub use snapshot::Snapshot;
pub use source::{InMemoryTextSource, TextSource};
pub use store::{CancellationToken, LoadHandle, LoadStatus, SnapshotStore};
pub use transport::FileTextSource;
pub use types::{ColorHex, ColumnName, DateKey, RegionId, RegionName, SourceId};
