//! Row parser: delimited text with a header row into `RawRecord`s.

use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::debug;

use crate::config::ColumnLayout;
use crate::constants::parser::HEADER_LINE;
use crate::data::RawRecord;
use crate::errors::PipelineError;

/// Header positions of every column the layout reads.
struct ColumnPositions {
    date: usize,
    region_id: usize,
    region_name: usize,
    parent_region: Option<usize>,
    measurement_a: usize,
    measurement_b: usize,
}

impl ColumnPositions {
    fn resolve(headers: &StringRecord, layout: &ColumnLayout) -> Result<Self, PipelineError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|header| header == name)
                .ok_or_else(|| PipelineError::Parse {
                    line: Some(HEADER_LINE),
                    details: format!("header is missing column '{name}'"),
                })
        };
        Ok(Self {
            date: find(&layout.date)?,
            region_id: find(&layout.region_id)?,
            region_name: find(&layout.region_name)?,
            parent_region: layout.parent_region.as_deref().map(find).transpose()?,
            measurement_a: find(&layout.measurement_a)?,
            measurement_b: find(&layout.measurement_b)?,
        })
    }

    fn build(&self, record: &StringRecord, line: u64) -> RawRecord {
        let field = |idx: usize| record.get(idx).unwrap_or_default().to_string();
        RawRecord {
            line,
            date: field(self.date),
            region_id: field(self.region_id),
            region_name: field(self.region_name),
            parent_region: self.parent_region.map(field).unwrap_or_default(),
            measurement_a: field(self.measurement_a),
            measurement_b: field(self.measurement_b),
        }
    }
}

/// Decode `text` into records using `layout` to locate columns.
///
/// The header row is required and must name every column in the layout; extra
/// columns are ignored. Rows whose field count differs from the header fail
/// the whole parse. Fields are trimmed; numeric fields are left unparsed.
pub fn parse_records(
    text: &str,
    layout: &ColumnLayout,
    delimiter: u8,
) -> Result<Vec<RawRecord>, PipelineError> {
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(false)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let headers = reader.headers()?.clone();
    if headers.is_empty() {
        return Err(PipelineError::Parse {
            line: None,
            details: "input has no header row".into(),
        });
    }
    let positions = ColumnPositions::resolve(&headers, layout)?;

    let mut records = Vec::new();
    for (offset, row) in reader.records().enumerate() {
        let row = row?;
        let line = row
            .position()
            .map(|position| position.line())
            .unwrap_or(HEADER_LINE + offset as u64 + 1);
        records.push(positions.build(&row, line));
    }
    debug!(
        record_count = records.len(),
        columns = headers.len(),
        "parsed delimited rows"
    );
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    const STATES: &str = "date,state,fips,cases,deaths\n\
        2020-03-01,Washington,53,18,1\n\
        2020-03-01,California,06,12,0\n";

    #[test]
    fn parses_states_layout() {
        let records = parse_records(STATES, &ColumnLayout::states(), b',').unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(
            records[0],
            RawRecord {
                line: 2,
                date: "2020-03-01".into(),
                region_id: "53".into(),
                region_name: "Washington".into(),
                parent_region: String::new(),
                measurement_a: "18".into(),
                measurement_b: "1".into(),
            }
        );
        assert_eq!(records[1].line, 3);
        assert_eq!(records[1].region_id, "06");
    }

    #[test]
    fn parses_counties_layout_with_quoted_fields() {
        let text = "date,county,state,fips,cases,deaths\n\
            2020-03-02,\"Snohomish, North\",Washington,53061, 7 ,0\n";
        let records = parse_records(text, &ColumnLayout::counties(), b',').unwrap();
        assert_eq!(records[0].region_name, "Snohomish, North");
        assert_eq!(records[0].parent_region, "Washington");
        assert_eq!(records[0].measurement_a, "7");
    }

    #[test]
    fn header_order_does_not_matter() {
        let text = "fips;deaths;cases;state;date\n06;0;12;California;2020-03-01\n";
        let records = parse_records(text, &ColumnLayout::states(), b';').unwrap();
        assert_eq!(records[0].measurement_a, "12");
        assert_eq!(records[0].measurement_b, "0");
        assert_eq!(records[0].date, "2020-03-01");
    }

    #[test]
    fn missing_column_is_a_parse_error() {
        let text = "date,state,cases,deaths\n2020-03-01,Washington,1,0\n";
        let err = parse_records(text, &ColumnLayout::states(), b',').unwrap_err();
        match err {
            PipelineError::Parse { line, details } => {
                assert_eq!(line, Some(1));
                assert!(details.contains("fips"), "{details}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn ragged_row_is_a_parse_error() {
        let text = "date,state,fips,cases,deaths\n2020-03-01,Washington,53,18\n";
        let err = parse_records(text, &ColumnLayout::states(), b',').unwrap_err();
        assert!(matches!(err, PipelineError::Parse { .. }), "{err:?}");
    }

    #[test]
    fn empty_text_is_a_parse_error() {
        let err = parse_records("", &ColumnLayout::states(), b',').unwrap_err();
        assert!(matches!(err, PipelineError::Parse { line: None, .. }));
    }

    #[test]
    fn header_only_yields_no_records() {
        let records =
            parse_records("date,state,fips,cases,deaths\n", &ColumnLayout::states(), b',')
                .unwrap();
        assert!(records.is_empty());
    }
}
