use std::collections::{HashMap, HashSet};

use choropleth_data::{
    build_equal_population, build_equal_width, ingest, BinningFunction, ColumnLayout, Measurement,
    PipelineConfig, PipelineError, RawRecord, ScaleKind, Snapshot,
};

fn record(line: u64, date: &str, region: &str, a: u64, b: u64) -> RawRecord {
    RawRecord {
        line,
        date: date.to_string(),
        region_id: region.to_string(),
        region_name: format!("{region} name"),
        parent_region: String::new(),
        measurement_a: a.to_string(),
        measurement_b: b.to_string(),
    }
}

/// Cumulative rows for three regions over five days, interleaved out of date order.
fn cumulative_rows() -> Vec<RawRecord> {
    let dates = [
        "2020-03-03",
        "2020-03-01",
        "2020-03-02",
        "2020-03-05",
        "2020-03-04",
    ];
    let mut rows = Vec::new();
    let mut line = 2;
    for (day, date) in dates.iter().enumerate() {
        for (offset, region) in ["06", "36", "53"].iter().enumerate() {
            if day == 1 && *region == "36" {
                // Region 36 has no report on the second date.
                continue;
            }
            let cases = (day as u64 + 1) * 10 + offset as u64 * 3;
            let deaths = day as u64 + offset as u64;
            rows.push(record(line, date, region, cases, deaths));
            line += 1;
        }
    }
    rows
}

#[test]
fn index_covers_every_date_and_region_seen() {
    let rows = cumulative_rows();
    let aggregate = ingest(rows.clone(), &ColumnLayout::default()).unwrap();

    let expected_dates: HashSet<&str> = rows.iter().map(|row| row.date.as_str()).collect();
    let actual_dates: HashSet<&str> = aggregate.index.keys().map(String::as_str).collect();
    assert_eq!(actual_dates, expected_dates);

    let mut expected_regions: HashMap<&str, HashSet<&str>> = HashMap::new();
    for row in &rows {
        expected_regions
            .entry(row.date.as_str())
            .or_default()
            .insert(row.region_id.as_str());
    }
    for (date, regions) in &aggregate.index {
        let actual: HashSet<&str> = regions.keys().map(String::as_str).collect();
        assert_eq!(actual, expected_regions[date.as_str()], "date {date}");
    }
    assert!(!aggregate.index["2020-03-01"].contains_key("36"));
}

#[test]
fn dates_keep_input_order() {
    let snapshot = Snapshot::from_records(cumulative_rows(), &PipelineConfig::default()).unwrap();
    let dates: Vec<&str> = snapshot.list_dates().collect();
    assert_eq!(
        dates,
        vec![
            "2020-03-03",
            "2020-03-01",
            "2020-03-02",
            "2020-03-05",
            "2020-03-04"
        ]
    );
}

#[test]
fn maxima_match_true_maximum() {
    let rows = cumulative_rows();
    let aggregate = ingest(rows.clone(), &ColumnLayout::default()).unwrap();
    let max_a = rows
        .iter()
        .map(|row| row.measurement_a.parse::<u64>().unwrap())
        .max()
        .unwrap();
    let max_b = rows
        .iter()
        .map(|row| row.measurement_b.parse::<u64>().unwrap())
        .max()
        .unwrap();
    assert_eq!(aggregate.maxima.get(Measurement::A), max_a);
    assert_eq!(aggregate.maxima.get(Measurement::B), max_b);

    let empty = ingest(Vec::new(), &ColumnLayout::default()).unwrap();
    assert_eq!(empty.maxima.get(Measurement::A), 0);
    assert_eq!(empty.maxima.get(Measurement::B), 0);
}

#[test]
fn equal_width_maps_domain_edges_to_edge_bins() {
    for k in 1..=15 {
        for (min, max) in [(0u64, 0u64), (0, 7), (3, 3), (2, 1_234), (0, 41_000_000)] {
            let scale = build_equal_width(max, k, min).unwrap();
            assert_eq!(scale.bin(min as f64), 0, "k={k} [{min}, {max}]");
            let expected_top = if max == min { 0 } else { k - 1 };
            assert_eq!(scale.bin(max as f64), expected_top, "k={k} [{min}, {max}]");
        }
    }
}

#[test]
fn equal_population_bins_hold_balanced_counts() {
    let values: Vec<u64> = (0..97u64).map(|v| v * v + 1).collect();
    for k in [1usize, 2, 3, 5, 7, 11, 13] {
        let scale = build_equal_population(&values, k).unwrap();
        let occupancy = choropleth_data::metrics::bin_occupancy(&scale, &values);
        let target = values.len() as f64 / k as f64;
        for count in &occupancy.counts {
            assert!(
                (*count as f64 - target).abs() <= 1.0,
                "k={k} counts={:?}",
                occupancy.counts
            );
        }
        assert_eq!(occupancy.total, values.len());
    }
}

#[test]
fn repeated_ingestion_is_identical() {
    let config = PipelineConfig::default();
    let first = Snapshot::from_records(cumulative_rows(), &config).unwrap();
    let second = Snapshot::from_records(cumulative_rows(), &config).unwrap();
    assert_eq!(first.index(), second.index());
    assert_eq!(
        first.index().keys().collect::<Vec<_>>(),
        second.index().keys().collect::<Vec<_>>()
    );
    assert_eq!(first.maxima(), second.maxima());
    for kind in ScaleKind::ALL {
        for measurement in Measurement::ALL {
            assert_eq!(
                first.scale(kind, measurement).breakpoints(),
                second.scale(kind, measurement).breakpoints()
            );
        }
    }
}

#[test]
fn later_duplicate_row_wins() {
    let rows = vec![
        record(2, "2020-03-01", "53", 18, 1),
        record(3, "2020-03-01", "06", 12, 0),
        record(4, "2020-03-01", "53", 25, 3),
    ];
    let snapshot = Snapshot::from_records(rows, &PipelineConfig::default()).unwrap();
    let metric = snapshot.region_metric("2020-03-01", "53").unwrap();
    assert_eq!(metric.measurement_a, 25);
    assert_eq!(metric.measurement_b, 3);
    assert_eq!(snapshot.regions("2020-03-01").unwrap().len(), 2);
}

#[test]
fn non_numeric_value_fails_the_whole_run() {
    let mut rows = cumulative_rows();
    rows[4].measurement_a = "N/A".to_string();
    let bad_line = rows[4].line;
    let err = Snapshot::from_records(rows, &PipelineConfig::default()).unwrap_err();
    assert_eq!(
        err,
        PipelineError::Value {
            line: bad_line,
            field: "cases".to_string(),
            value: "N/A".to_string(),
        }
    );
}

#[test]
fn value_error_names_the_csv_column() {
    let text = "date,state,fips,cases,deaths\n\
        2020-03-01,Washington,53,18,1\n\
        2020-03-02,Washington,53,27,unknown\n";
    let err = Snapshot::from_text(text, &PipelineConfig::default()).unwrap_err();
    assert_eq!(
        err,
        PipelineError::Value {
            line: 3,
            field: "deaths".to_string(),
            value: "unknown".to_string(),
        }
    );
    assert_eq!(Measurement::A.to_string(), "cases");
    assert_eq!(Measurement::B.to_string(), "deaths");
}

#[test]
fn three_regions_three_bins_scenario() {
    let text = "date,state,fips,cases,deaths\n\
        2020-03-01,Region A,A,10,0\n\
        2020-03-01,Region B,B,20,0\n\
        2020-03-01,Region C,C,30,0\n";
    let config = PipelineConfig::default().with_palette_size(3);
    let snapshot = Snapshot::from_text(text, &config).unwrap();
    assert_eq!(snapshot.maxima().measurement_a, 30);

    let width = snapshot.scale(ScaleKind::EqualWidth, Measurement::A);
    assert_eq!(width.bin(10.0), 0);
    assert_eq!(width.bin(20.0), 1);
    assert_eq!(width.bin(30.0), 2);

    let population = snapshot.scale(ScaleKind::EqualPopulation, Measurement::A);
    let bins: Vec<usize> = ["A", "B", "C"]
        .iter()
        .map(|region| {
            let metric = snapshot.region_metric("2020-03-01", region).unwrap();
            population.bin(metric.measurement_a as f64)
        })
        .collect();
    assert_eq!(bins, vec![0, 1, 2]);

    // Measurement B is all zeros: a degenerate equal-width domain.
    let deaths = snapshot.scale(ScaleKind::EqualWidth, Measurement::B);
    assert_eq!(deaths.bin(0.0), 0);
}

#[test]
fn counties_layout_fills_parent_region() {
    let text = "date,county,state,fips,cases,deaths\n\
        2020-03-01,King,Washington,53033,14,1\n\
        2020-03-01,Snohomish,Washington,53061,4,0\n";
    let config = PipelineConfig::default().with_layout(ColumnLayout::counties());
    let snapshot = Snapshot::from_text(text, &config).unwrap();
    let king = snapshot.region_metric("2020-03-01", "53033").unwrap();
    assert_eq!(king.region_name, "King");
    assert_eq!(king.parent_region, "Washington");

    let json = serde_json::to_value(king).unwrap();
    assert_eq!(json["measurement_a"], 14);
    assert_eq!(json["parent_region"], "Washington");
}

#[test]
fn configured_equal_width_floor_shifts_domain() {
    let text = "date,state,fips,cases,deaths\n\
        2020-03-01,Region A,A,100,0\n\
        2020-03-01,Region B,B,200,0\n";
    let config = PipelineConfig::default()
        .with_palette_size(2)
        .with_equal_width_min(100);
    let snapshot = Snapshot::from_text(text, &config).unwrap();
    let width = snapshot.scale(ScaleKind::EqualWidth, Measurement::A);
    assert_eq!(width.breakpoints(), vec![150.0]);
    assert_eq!(width.bin(150.0), 0);
    assert_eq!(width.bin(151.0), 1);
}
