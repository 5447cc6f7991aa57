use speed_report::loader::SAMPLE_CSV;
use speed_report::selection::SelectionState;
use speed_report::types::GeoSource;
use speed_report::{analyze, load_csv, output, reports, AnalysisConfig, ParseOptions, ReportError};
use std::io::Write;

fn sample_file() -> tempfile::NamedTempFile {
    let mut f = tempfile::NamedTempFile::new().unwrap();
    f.write_all(SAMPLE_CSV.as_bytes()).unwrap();
    f
}

#[test]
fn file_load_matches_text_parse() {
    let f = sample_file();
    let (from_file, report) = load_csv(f.path(), &ParseOptions::default()).unwrap();
    let (from_text, _) = speed_report::parse_csv_text(SAMPLE_CSV, &ParseOptions::default()).unwrap();
    assert_eq!(from_file, from_text);
    assert_eq!(report.kept_rows, 8);
}

#[test]
fn missing_file_is_not_an_empty_dataset() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_csv(dir.path().join("absent.csv"), &ParseOptions::default()).unwrap_err();
    assert!(matches!(err, ReportError::Io { .. }));
    assert!(err.to_string().contains("absent.csv"));
}

#[test]
fn sample_analysis_end_to_end() {
    let f = sample_file();
    let (ds, _) = load_csv(f.path(), &ParseOptions::default()).unwrap();
    let a = analyze(&ds, &AnalysisConfig::default());

    assert_eq!(a.years, (2017..=2024).collect::<Vec<_>>());
    assert_eq!(a.top_countries[0].country, "China");
    assert_eq!(a.top_countries.last().unwrap().country, "Afghanistan");
    assert_eq!(a.year_stats[&2017].count, 7);
    assert_eq!(a.year_stats[&2024].count, 8);
    assert_eq!(a.points.len(), 8);
    assert!(a.points.iter().all(|p| p.source == GeoSource::Known));

    let na = &a.region_sums["Northern Africa"];
    assert!((na[&2023] - (11.3 + 13.4)).abs() < 1e-9);
    let last = a.global_series.last().unwrap();
    assert_eq!(last.year, 2024);
    assert!((last.value - a.year_stats[&2024].sum).abs() < 1e-9);
}

#[test]
fn explicit_year_pair_drives_leaderboard() {
    let (ds, _) = speed_report::parse_csv_text(SAMPLE_CSV, &ParseOptions::default()).unwrap();
    let cfg = AnalysisConfig {
        top_n: 3,
        improvement_years: Some((2022, 2023)),
    };
    let a = analyze(&ds, &cfg);
    assert_eq!(a.improvement.len(), 3);
    assert_eq!(a.improvement[0].country, "Albania");
    assert!((a.improvement[0].inc - 12.80).abs() < 1e-9);
    assert_eq!(a.top_countries.len(), 3);
}

#[test]
fn analysis_json_uses_contract_names() {
    let (ds, _) = speed_report::parse_csv_text(SAMPLE_CSV, &ParseOptions::default()).unwrap();
    let a = analyze(&ds, &AnalysisConfig::default());
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("analysis.json");
    output::write_json(&path, &a).unwrap();

    let v: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    for key in [
        "years", "yearStats", "topCountries", "improvement", "regionSums", "globalSeries",
        "points", "countries",
    ] {
        assert!(v.get(key).is_some(), "missing {key}");
    }
    let afg = &v["countries"][0];
    assert_eq!(afg["firstYear"], 2019);
    assert!(afg["values"]["2017"].is_null());
    assert_eq!(v["points"][0]["source"], "known");
}

#[test]
fn exported_reports_are_readable_csv() {
    let (ds, _) = speed_report::parse_csv_text(SAMPLE_CSV, &ParseOptions::default()).unwrap();
    let a = analyze(&ds, &AnalysisConfig::default());
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stats.csv");
    output::write_csv(&path, &reports::year_stat_rows(&a)).unwrap();

    let mut rdr = csv::Reader::from_path(&path).unwrap();
    let headers = rdr.headers().unwrap().clone();
    assert_eq!(headers.iter().collect::<Vec<_>>(), vec!["Year", "Count", "Sum", "Mean", "Min", "Max"]);
    assert_eq!(rdr.records().count(), 8);
}

#[test]
fn selection_survives_reanalysis() {
    let (ds, _) = speed_report::parse_csv_text(SAMPLE_CSV, &ParseOptions::default()).unwrap();
    let first = analyze(&ds, &AnalysisConfig::default());
    let mut sel = SelectionState::default();
    sel.apply_query("egypt, canada", &first);

    let again = analyze(&ds, &AnalysisConfig::default());
    assert_eq!(first, again);
    let picked: Vec<_> = again
        .countries
        .iter()
        .filter(|c| sel.is_selected(&c.country))
        .map(|c| c.country.as_str())
        .collect();
    assert_eq!(picked, vec!["Canada", "Egypt"]);
}
