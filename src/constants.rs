/// Constants used by colour scales and the palette.
pub mod scale {
    /// Number of palette colours, and therefore bins, used by the default pipeline.
    pub const PALETTE_SIZE: usize = 11;
    /// Lower edge of the equal-width domain used by the default pipeline.
    pub const EQUAL_WIDTH_DOMAIN_MIN: u64 = 0;
}

/// Column names for the published cumulative datasets.
pub mod columns {
    /// Observation date (`YYYY-MM-DD`).
    pub const DATE: &str = "date";
    /// State name column.
    pub const STATE: &str = "state";
    /// County name column (county-level dataset only).
    pub const COUNTY: &str = "county";
    /// FIPS region code column.
    pub const FIPS: &str = "fips";
    /// Cumulative case count column.
    pub const CASES: &str = "cases";
    /// Cumulative death count column.
    pub const DEATHS: &str = "deaths";
}

/// Constants used by the row parser.
pub mod parser {
    /// Default field delimiter.
    pub const DEFAULT_DELIMITER: u8 = b',';
    /// Line number of the header row; data rows start right after it.
    pub const HEADER_LINE: u64 = 1;
}

/// Constants used by text sources.
pub mod source {
    /// Source id reported by in-memory text sources unless overridden.
    pub const IN_MEMORY_SOURCE_ID: &str = "memory";
}
