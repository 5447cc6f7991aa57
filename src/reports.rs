//! Flat, display-ready tables built from an `Analysis`.
use crate::dashboard::{compute_kpis, find_outliers};
use crate::types::{
    Analysis, ComparisonRow, ImprovementRow, RegionSumRow, SummaryStats, TopCountryRow,
    YearStatRow,
};
use crate::util::{format_number, format_opt};
use chrono::Utc;

pub fn top_country_rows(a: &Analysis) -> Vec<TopCountryRow> {
    a.top_countries
        .iter()
        .enumerate()
        .map(|(idx, r)| TopCountryRow {
            rank: idx + 1,
            country: r.country.clone(),
            latest: format_number(r.latest, 2),
            latest_year: r.latest_year,
            growth_pct: format_opt(r.growth_pct, 2),
        })
        .collect()
}

pub fn improvement_rows(a: &Analysis) -> Vec<ImprovementRow> {
    a.improvement
        .iter()
        .enumerate()
        .map(|(idx, r)| ImprovementRow {
            rank: idx + 1,
            country: r.country.clone(),
            inc: format_number(r.inc, 2),
        })
        .collect()
}

pub fn year_stat_rows(a: &Analysis) -> Vec<YearStatRow> {
    a.year_stats
        .iter()
        .map(|(year, s)| YearStatRow {
            year: *year,
            count: s.count,
            sum: format_number(s.sum, 2),
            mean: format_opt(s.mean, 2),
            min: format_opt(s.min, 2),
            max: format_opt(s.max, 2),
        })
        .collect()
}

/// One row per (region, year), regions alphabetical, years ascending.
pub fn region_sum_rows(a: &Analysis) -> Vec<RegionSumRow> {
    a.region_sums
        .iter()
        .flat_map(|(region, by_year)| {
            by_year.iter().map(move |(year, total)| RegionSumRow {
                region: region.clone(),
                year: *year,
                total: format_number(*total, 2),
            })
        })
        .collect()
}

pub fn comparison_rows(values: &[(String, f64)]) -> Vec<ComparisonRow> {
    values
        .iter()
        .map(|(country, v)| ComparisonRow {
            country: country.clone(),
            value: format_number(*v, 2),
        })
        .collect()
}

pub fn generate_summary(a: &Analysis) -> SummaryStats {
    SummaryStats {
        generated_at: Utc::now().to_rfc3339(),
        total_countries: a.countries.len(),
        total_regions: a.region_sums.len(),
        first_year: a.years.first().copied(),
        last_year: a.years.last().copied(),
        improvement_years: a.improvement_years,
        kpis: compute_kpis(a),
        outliers: find_outliers(a),
    }
}
