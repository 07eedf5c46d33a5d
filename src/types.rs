/// Date key as it appears in the source rows.
/// Example: `2020-03-01`
pub type DateKey = String;
/// Short region code, unique per region.
/// Examples: `06` (California FIPS), `53033` (King County FIPS)
pub type RegionId = String;
/// Human-readable region name.
/// Examples: `California`, `King`
pub type RegionName = String;
/// Identifier for the text source that produced a dataset.
/// Examples: `us-states.csv`, `memory`
pub type SourceId = String;
/// Column name in the delimited header row.
/// Examples: `date`, `fips`, `cases`
pub type ColumnName = String;
/// Hex colour string used by the palette.
/// Example: `#1769AA`
pub type ColorHex = &'static str;
