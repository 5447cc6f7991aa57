use serde::Serialize;
use std::collections::BTreeMap;
use tabled::Tabled;

/// A year column discovered in the header, e.g. `year2017` or `year 2017`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YearColumn {
    pub name: String,
    pub year: i32,
    pub index: usize,
}

/// Column layout of a loaded CSV. Year columns are sorted by year.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    pub width: usize,
    pub country: usize,
    pub major_area: Option<usize>,
    pub region: Option<usize>,
    pub year_columns: Vec<YearColumn>,
}

impl Schema {
    pub fn years(&self) -> Vec<i32> {
        self.year_columns.iter().map(|c| c.year).collect()
    }
}

/// One parsed row. `values` holds one raw entry per schema year column, in
/// schema order; `None` is the missing sentinel (empty field or `null`).
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    pub country: String,
    pub major_area: Option<String>,
    pub region: Option<String>,
    pub values: Vec<Option<String>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub schema: Schema,
    pub records: Vec<RawRecord>,
}

impl Dataset {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryAggregate {
    pub country: String,
    pub region: Option<String>,
    #[serde(rename = "major_area")]
    pub major_area: Option<String>,
    pub values: BTreeMap<i32, Option<f64>>,
    pub first_year: Option<i32>,
    pub first: Option<f64>,
    pub latest_year: Option<i32>,
    pub latest: Option<f64>,
    pub growth_pct: Option<f64>,
}

impl CountryAggregate {
    pub fn value(&self, year: i32) -> Option<f64> {
        self.values.get(&year).copied().flatten()
    }

    /// Region label used for grouping: region, then major area, then `Unknown`.
    pub fn region_label(&self) -> &str {
        self.region
            .as_deref()
            .or(self.major_area.as_deref())
            .unwrap_or(UNKNOWN_REGION)
    }
}

pub const UNKNOWN_REGION: &str = "Unknown";

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct YearStat {
    pub count: usize,
    pub sum: f64,
    pub mean: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedCountry {
    pub country: String,
    pub latest: f64,
    pub latest_year: i32,
    pub growth_pct: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Improvement {
    pub country: String,
    pub inc: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub year: i32,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GeoSource {
    Known,
    Synthetic,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeoPoint {
    pub country: String,
    pub lat: f64,
    pub lng: f64,
    pub value: f64,
    pub source: GeoSource,
}

/// Everything the presentation layer reads. Produced fresh by `analyze`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    pub years: Vec<i32>,
    pub year_stats: BTreeMap<i32, YearStat>,
    pub top_countries: Vec<RankedCountry>,
    pub improvement_years: Option<(i32, i32)>,
    pub improvement: Vec<Improvement>,
    pub region_sums: BTreeMap<String, BTreeMap<i32, f64>>,
    pub global_series: Vec<SeriesPoint>,
    pub points: Vec<GeoPoint>,
    pub countries: Vec<CountryAggregate>,
}

impl Analysis {
    pub fn country(&self, name: &str) -> Option<&CountryAggregate> {
        self.countries.iter().find(|c| c.country == name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Kpis {
    pub average: f64,
    pub improved: usize,
    pub mean_growth: f64,
    pub impact_score: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Outliers {
    pub mean: f64,
    pub std: f64,
    pub high: Vec<String>,
    pub low: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct SummaryStats {
    pub generated_at: String,
    pub total_countries: usize,
    pub total_regions: usize,
    pub first_year: Option<i32>,
    pub last_year: Option<i32>,
    pub improvement_years: Option<(i32, i32)>,
    pub kpis: Kpis,
    pub outliers: Outliers,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct TopCountryRow {
    #[serde(rename = "Rank")]
    #[tabled(rename = "Rank")]
    pub rank: usize,
    #[serde(rename = "Country")]
    #[tabled(rename = "Country")]
    pub country: String,
    #[serde(rename = "Latest")]
    #[tabled(rename = "Latest")]
    pub latest: String,
    #[serde(rename = "LatestYear")]
    #[tabled(rename = "LatestYear")]
    pub latest_year: i32,
    #[serde(rename = "GrowthPct")]
    #[tabled(rename = "GrowthPct")]
    pub growth_pct: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct ImprovementRow {
    #[serde(rename = "Rank")]
    #[tabled(rename = "Rank")]
    pub rank: usize,
    #[serde(rename = "Country")]
    #[tabled(rename = "Country")]
    pub country: String,
    #[serde(rename = "Increase")]
    #[tabled(rename = "Increase")]
    pub inc: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct YearStatRow {
    #[serde(rename = "Year")]
    #[tabled(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Count")]
    #[tabled(rename = "Count")]
    pub count: usize,
    #[serde(rename = "Sum")]
    #[tabled(rename = "Sum")]
    pub sum: String,
    #[serde(rename = "Mean")]
    #[tabled(rename = "Mean")]
    pub mean: String,
    #[serde(rename = "Min")]
    #[tabled(rename = "Min")]
    pub min: String,
    #[serde(rename = "Max")]
    #[tabled(rename = "Max")]
    pub max: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct RegionSumRow {
    #[serde(rename = "Region")]
    #[tabled(rename = "Region")]
    pub region: String,
    #[serde(rename = "Year")]
    #[tabled(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Total")]
    #[tabled(rename = "Total")]
    pub total: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct ComparisonRow {
    #[serde(rename = "Country")]
    #[tabled(rename = "Country")]
    pub country: String,
    #[serde(rename = "Value")]
    #[tabled(rename = "Value")]
    pub value: String,
}
