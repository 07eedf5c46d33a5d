use serde::{Deserialize, Serialize};
use std::borrow::Cow;

use crate::constants::columns;
use crate::constants::parser::DEFAULT_DELIMITER;
use crate::constants::scale::{EQUAL_WIDTH_DOMAIN_MIN, PALETTE_SIZE};
use crate::data::Measurement;
use crate::errors::PipelineError;

/// Maps header column names onto `RawRecord` fields.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnLayout {
    /// Observation date column.
    pub date: Cow<'static, str>,
    /// Region code column (unique per region).
    pub region_id: Cow<'static, str>,
    /// Region display-name column.
    pub region_name: Cow<'static, str>,
    /// Enclosing region column; `None` leaves `parent_region` empty.
    pub parent_region: Option<Cow<'static, str>>,
    /// Column parsed into measurement A.
    pub measurement_a: Cow<'static, str>,
    /// Column parsed into measurement B.
    pub measurement_b: Cow<'static, str>,
}

impl ColumnLayout {
    /// State-level dataset: `date,state,fips,cases,deaths`.
    pub fn states() -> Self {
        Self {
            date: columns::DATE.into(),
            region_id: columns::FIPS.into(),
            region_name: columns::STATE.into(),
            parent_region: None,
            measurement_a: columns::CASES.into(),
            measurement_b: columns::DEATHS.into(),
        }
    }

    /// County-level dataset: `date,county,state,fips,cases,deaths`.
    ///
    /// The county is the region; its state is the parent region.
    pub fn counties() -> Self {
        Self {
            region_name: columns::COUNTY.into(),
            parent_region: Some(columns::STATE.into()),
            ..Self::states()
        }
    }

    /// Source column holding `measurement`.
    pub fn measurement_column(&self, measurement: Measurement) -> &str {
        match measurement {
            Measurement::A => &self.measurement_a,
            Measurement::B => &self.measurement_b,
        }
    }

    /// Every column name this layout reads, in field order.
    pub fn required_columns(&self) -> Vec<&str> {
        let mut out = vec![&*self.date, &*self.region_id, &*self.region_name];
        if let Some(parent) = self.parent_region.as_deref() {
            out.push(parent);
        }
        out.push(&*self.measurement_a);
        out.push(&*self.measurement_b);
        out
    }
}

impl Default for ColumnLayout {
    fn default() -> Self {
        Self::states()
    }
}

/// Top-level ingestion pipeline configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Number of bins produced by every scale; must be at least 1.
    pub palette_size: usize,
    /// Header-to-field mapping used by the row parser.
    pub layout: ColumnLayout,
    /// Field delimiter byte.
    pub delimiter: u8,
    /// Lower edge of the equal-width domain (upper edge is the observed maximum).
    pub equal_width_min: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            palette_size: PALETTE_SIZE,
            layout: ColumnLayout::default(),
            delimiter: DEFAULT_DELIMITER,
            equal_width_min: EQUAL_WIDTH_DOMAIN_MIN,
        }
    }
}

impl PipelineConfig {
    /// Replace the column layout.
    pub fn with_layout(mut self, layout: ColumnLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Replace the bin count.
    pub fn with_palette_size(mut self, palette_size: usize) -> Self {
        self.palette_size = palette_size;
        self
    }

    /// Replace the field delimiter.
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Replace the lower edge of the equal-width domain.
    pub fn with_equal_width_min(mut self, equal_width_min: u64) -> Self {
        self.equal_width_min = equal_width_min;
        self
    }

    /// Reject configurations no ingestion run could succeed with.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.palette_size == 0 {
            return Err(PipelineError::Configuration(
                "palette_size must be at least 1".into(),
            ));
        }
        let required = self.layout.required_columns();
        if required.iter().any(|name| name.trim().is_empty()) {
            return Err(PipelineError::Configuration(
                "column layout contains an empty column name".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counties_layout_reads_state_as_parent() {
        let layout = ColumnLayout::counties();
        assert_eq!(
            layout.required_columns(),
            vec!["date", "fips", "county", "state", "cases", "deaths"]
        );
        assert_eq!(
            ColumnLayout::states().required_columns(),
            vec!["date", "fips", "state", "cases", "deaths"]
        );
    }

    #[test]
    fn measurement_columns_follow_layout() {
        let mut layout = ColumnLayout::states();
        assert_eq!(layout.measurement_column(Measurement::A), "cases");
        assert_eq!(layout.measurement_column(Measurement::B), "deaths");
        layout.measurement_b = "hospitalized".into();
        assert_eq!(layout.measurement_column(Measurement::B), "hospitalized");
    }

    #[test]
    fn validate_rejects_zero_bins() {
        let config = PipelineConfig::default().with_palette_size(0);
        assert!(matches!(
            config.validate(),
            Err(PipelineError::Configuration(_))
        ));
        assert!(PipelineConfig::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_blank_column_names() {
        let mut layout = ColumnLayout::states();
        layout.measurement_b = "  ".into();
        let config = PipelineConfig::default().with_layout(layout);
        assert!(config.validate().is_err());
    }
}
