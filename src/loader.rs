use crate::config::ParseOptions;
use crate::error::{ReportError, Result};
use crate::types::{Dataset, RawRecord, Schema, YearColumn};
use crate::util::{normalize_field, parse_year_header};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::path::Path;
use tracing::{debug, info, warn};

/// Eight-country dataset in the dashboard schema, usable without a file.
pub const SAMPLE_CSV: &str = "\
country,major_area,region,year2017,year2018,year2019,year2020,year2021,year2022,year2023,year2024
Afghanistan,Asia,Southern Asia,null,null,6.49,8.2,9.23,1.9,2.84,3.63
Albania,Europe,Southern Europe,11.48,14.71,28.61,37.11,41.47,33.67,46.47,62.71
Algeria,Africa,Northern Africa,3.98,3.52,4.06,3.92,9.95,10.84,11.3,14.26
Australia,Oceania,Australia and New Zealand,45.1,52.3,63.1,71.2,75.3,80.4,90.1,105.7
Brazil,Americas,South America,12.2,15.8,21.3,25.9,28.1,30.2,32.5,55.1
Canada,Americas,Northern America,30.1,40.5,50.2,62.3,70.1,72.0,75.9,88.0
China,Asia,Eastern Asia,70.2,75.1,80.5,85.7,90.2,92.5,95.3,120.4
Egypt,Africa,Northern Africa,7.5,8.2,9.1,10.0,11.5,12.2,13.4,14.6
";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub total_rows: usize,
    pub kept_rows: usize,
    pub short_rows: usize,
    pub missing_country: usize,
    pub parse_errors: usize,
}

/// Read a CSV file from disk and parse it.
pub fn load_csv(path: impl AsRef<Path>, opts: &ParseOptions) -> Result<(Dataset, LoadReport)> {
    let path = path.as_ref();
    info!(path = %path.display(), "Loading CSV");
    let text = std::fs::read_to_string(path).map_err(|e| ReportError::io(path, e))?;
    parse_csv_text(&text, opts)
}

/// Parse CSV text: header first, every field trimmed, rows with fewer than
/// the required number of fields dropped.
pub fn parse_csv_text(text: &str, opts: &ParseOptions) -> Result<(Dataset, LoadReport)> {
    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let headers = rdr.headers()?.clone();
    if headers.is_empty() || headers.iter().all(str::is_empty) {
        debug!("CSV text has no header; returning empty dataset");
        return Ok((Dataset::default(), LoadReport::default()));
    }
    let schema = build_schema(&headers)?;
    let min_fields = opts.min_fields.unwrap_or(schema.width);

    let mut report = LoadReport::default();
    let mut records = Vec::new();
    for result in rdr.records() {
        report.total_rows += 1;
        let row = match result {
            Ok(r) => r,
            Err(e) => {
                debug!(error = %e, "Skipping unreadable row");
                report.parse_errors += 1;
                continue;
            }
        };
        if row.len() < min_fields {
            report.short_rows += 1;
            continue;
        }
        match to_record(&schema, &row) {
            Some(rec) => records.push(rec),
            None => report.missing_country += 1,
        }
    }
    report.kept_rows = records.len();

    info!(
        total = report.total_rows,
        kept = report.kept_rows,
        years = schema.year_columns.len(),
        "Parsed CSV"
    );
    Ok((Dataset { schema, records }, report))
}

fn build_schema(headers: &StringRecord) -> Result<Schema> {
    let find = |name: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(name));
    let country = find("country").ok_or_else(|| ReportError::MissingColumn("country".into()))?;
    let major_area = find("major_area");
    let region = find("region");

    let mut year_columns: Vec<YearColumn> = headers
        .iter()
        .enumerate()
        .filter_map(|(index, name)| {
            parse_year_header(name).map(|year| YearColumn {
                name: name.to_string(),
                year,
                index,
            })
        })
        .collect();
    // stable sort, so the leftmost column of a repeated year comes first
    year_columns.sort_by_key(|c| c.year);
    let before = year_columns.len();
    year_columns.dedup_by_key(|c| c.year);
    if year_columns.len() < before {
        warn!(
            dropped = before - year_columns.len(),
            "Repeated year columns in header; keeping the first of each"
        );
    }
    if year_columns.is_empty() {
        warn!("No year columns found in header");
    }

    Ok(Schema {
        width: headers.len(),
        country,
        major_area,
        region,
        year_columns,
    })
}

fn to_record(schema: &Schema, row: &StringRecord) -> Option<RawRecord> {
    let field = |idx: usize| row.get(idx).and_then(normalize_field);
    let country = field(schema.country)?;
    Some(RawRecord {
        country,
        major_area: schema.major_area.and_then(field),
        region: schema.region.and_then(field),
        values: schema.year_columns.iter().map(|c| field(c.index)).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_parses_into_eight_records() {
        let (ds, report) = parse_csv_text(SAMPLE_CSV, &ParseOptions::default()).unwrap();
        assert_eq!(ds.records.len(), 8);
        assert_eq!(report.kept_rows, 8);
        assert_eq!(ds.schema.years(), (2017..=2024).collect::<Vec<_>>());
        let afg = &ds.records[0];
        assert_eq!(afg.country, "Afghanistan");
        assert_eq!(afg.region.as_deref(), Some("Southern Asia"));
        assert_eq!(afg.values[0], None);
        assert_eq!(afg.values[2].as_deref(), Some("6.49"));
    }

    #[test]
    fn short_rows_are_dropped_silently() {
        let text = "country,major_area,region,year2023,year2024\n\
                    Albania,Europe,Southern Europe,33.67,46.47\n\
                    Broken,Europe\n";
        let (ds, report) = parse_csv_text(text, &ParseOptions::default()).unwrap();
        assert_eq!(ds.records.len(), 1);
        assert_eq!(report.short_rows, 1);
        assert_eq!(report.total_rows, 2);
    }

    #[test]
    fn min_fields_can_be_relaxed() {
        let text = "country,major_area,region,year2023,year2024\nAlbania,Europe,Southern Europe,33.67\n";
        let opts = ParseOptions { min_fields: Some(4) };
        let (ds, _) = parse_csv_text(text, &opts).unwrap();
        assert_eq!(ds.records.len(), 1);
        assert_eq!(ds.records[0].values, vec![Some("33.67".to_string()), None]);
    }

    #[test]
    fn general_schema_with_spaced_years_is_sorted() {
        let text = "country,major_area,region,year 2019,year 2017,year 2018\nChile,Americas,,3,1,2\n";
        let (ds, _) = parse_csv_text(text, &ParseOptions::default()).unwrap();
        assert_eq!(ds.schema.years(), vec![2017, 2018, 2019]);
        let rec = &ds.records[0];
        assert_eq!(rec.region, None);
        assert_eq!(
            rec.values,
            vec![Some("1".to_string()), Some("2".to_string()), Some("3".to_string())]
        );
    }

    #[test]
    fn repeated_year_keeps_first_column() {
        let text = "country,major_area,region,year2024,year 2024,year2023\nA,X,,1,2,0.5\n";
        let (ds, _) = parse_csv_text(text, &ParseOptions::default()).unwrap();
        assert_eq!(ds.schema.years(), vec![2023, 2024]);
        assert_eq!(ds.schema.year_columns[1].name, "year2024");
        assert_eq!(
            ds.records[0].values,
            vec![Some("0.5".to_string()), Some("1".to_string())]
        );
        let a = crate::analyze(&ds, &crate::AnalysisConfig::default());
        assert_eq!(a.global_series.len(), 2);
        assert_eq!(a.region_sums["X"][&2024], 1.0);
        assert_eq!(a.year_stats[&2024].sum, 1.0);
    }

    #[test]
    fn quoted_country_with_comma_is_one_field() {
        let text = "country,major_area,region,year2024\n\"Korea, Republic of\",Asia,Eastern Asia,40.2\n";
        let (ds, report) = parse_csv_text(text, &ParseOptions::default()).unwrap();
        assert_eq!(report.kept_rows, 1);
        assert_eq!(report.short_rows, 0);
        let rec = &ds.records[0];
        assert_eq!(rec.country, "Korea, Republic of");
        assert_eq!(rec.major_area.as_deref(), Some("Asia"));
        assert_eq!(rec.values, vec![Some("40.2".to_string())]);
    }

    #[test]
    fn fields_are_trimmed_and_null_is_missing() {
        let text = "country,major_area,region,year2023\n  Peru , NULL ,  , null \n";
        let (ds, _) = parse_csv_text(text, &ParseOptions::default()).unwrap();
        let rec = &ds.records[0];
        assert_eq!(rec.country, "Peru");
        assert_eq!(rec.major_area, None);
        assert_eq!(rec.region, None);
        assert_eq!(rec.values, vec![None]);
    }

    #[test]
    fn rows_without_country_are_counted() {
        let text = "country,major_area,region,year2023\nnull,Asia,,1\n";
        let (ds, report) = parse_csv_text(text, &ParseOptions::default()).unwrap();
        assert!(ds.is_empty());
        assert_eq!(report.missing_country, 1);
    }

    #[test]
    fn empty_text_is_an_empty_dataset() {
        let (ds, report) = parse_csv_text("", &ParseOptions::default()).unwrap();
        assert!(ds.is_empty());
        assert_eq!(report, LoadReport::default());
    }

    #[test]
    fn header_without_country_is_an_error() {
        let err = parse_csv_text("name,year2024\nX,1\n", &ParseOptions::default()).unwrap_err();
        assert!(matches!(err, ReportError::MissingColumn(ref c) if c == "country"));
    }

    #[test]
    fn missing_file_is_reported() {
        let err = load_csv("/definitely/not/here.csv", &ParseOptions::default()).unwrap_err();
        assert!(matches!(err, ReportError::Io { .. }));
    }
}
