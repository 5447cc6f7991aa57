use crate::config::AnalysisConfig;
use crate::geo::locate;
use crate::types::{
    Analysis, CountryAggregate, Dataset, GeoPoint, Improvement, RankedCountry, RawRecord,
    SeriesPoint, YearStat,
};
use crate::util::parse_f64_safe;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tracing::debug;

/// Run every aggregation stage over a dataset. Pure: the dataset is not
/// touched and an empty dataset gives `Analysis::default()`.
pub fn analyze(data: &Dataset, cfg: &AnalysisConfig) -> Analysis {
    if data.is_empty() {
        return Analysis::default();
    }
    let years = data.schema.years();
    let countries: Vec<CountryAggregate> = data
        .records
        .iter()
        .map(|r| aggregate_country(r, &years))
        .collect();

    let year_stats = year_stats(&countries, &years);
    let top_countries = top_by_latest(&countries, cfg.top_n);
    let improvement_years = cfg.year_pair(&years);
    let improvement = match improvement_years {
        Some((from, to)) => improvement_leaderboard(&countries, from, to, cfg.top_n),
        None => Vec::new(),
    };
    let region_sums = region_sums(&countries, &years);
    let global_series = global_series(&region_sums, &years);
    let points = geo_points(&countries);

    debug!(
        countries = countries.len(),
        years = years.len(),
        regions = region_sums.len(),
        "Analysis complete"
    );

    Analysis {
        years,
        year_stats,
        top_countries,
        improvement_years,
        improvement,
        region_sums,
        global_series,
        points,
        countries,
    }
}

/// First/latest present values and growth for one row. `years` lines up
/// with `record.values`.
pub fn aggregate_country(record: &RawRecord, years: &[i32]) -> CountryAggregate {
    let values: BTreeMap<i32, Option<f64>> = years
        .iter()
        .zip(&record.values)
        .map(|(y, raw)| (*y, parse_f64_safe(raw.as_deref())))
        .collect();

    let present = || values.iter().filter_map(|(&y, &v)| v.map(|v| (y, v)));
    let first = present().next();
    let latest = present().next_back();
    let growth_pct = match (first, latest) {
        (Some((_, f)), Some((_, l))) => growth_pct(f, l),
        _ => None,
    };

    CountryAggregate {
        country: record.country.clone(),
        region: record.region.clone(),
        major_area: record.major_area.clone(),
        first_year: first.map(|(y, _)| y),
        first: first.map(|(_, v)| v),
        latest_year: latest.map(|(y, _)| y),
        latest: latest.map(|(_, v)| v),
        growth_pct,
        values,
    }
}

/// Percentage change; undefined when the base is zero.
pub fn growth_pct(first: f64, latest: f64) -> Option<f64> {
    if first == 0.0 {
        return None;
    }
    Some((latest - first) / first.abs() * 100.0)
}

/// Count/sum/mean/min/max over present values. Missing values are left out
/// of both numerator and denominator.
pub fn year_stats(countries: &[CountryAggregate], years: &[i32]) -> BTreeMap<i32, YearStat> {
    years
        .iter()
        .map(|&y| {
            let vals: Vec<f64> = countries.iter().filter_map(|c| c.value(y)).collect();
            let count = vals.len();
            let stat = if count == 0 {
                YearStat::default()
            } else {
                let sum: f64 = vals.iter().sum();
                let min = vals.iter().copied().fold(f64::INFINITY, f64::min);
                let max = vals.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                // rounding in sum / count can step just outside [min, max]
                let mean = (sum / count as f64).clamp(min, max);
                YearStat {
                    count,
                    sum,
                    mean: Some(mean),
                    min: Some(min),
                    max: Some(max),
                }
            };
            (y, stat)
        })
        .collect()
}

/// Countries with a latest value, highest first. Ties keep input order.
pub fn top_by_latest(countries: &[CountryAggregate], n: usize) -> Vec<RankedCountry> {
    let mut ranked: Vec<RankedCountry> = countries
        .iter()
        .filter_map(|c| {
            Some(RankedCountry {
                country: c.country.clone(),
                latest: c.latest?,
                latest_year: c.latest_year?,
                growth_pct: c.growth_pct,
            })
        })
        .collect();
    ranked.sort_by(|a, b| b.latest.partial_cmp(&a.latest).unwrap_or(Ordering::Equal));
    ranked.truncate(n);
    ranked
}

/// `value(to) - value(from)` per country, missing counted as zero, largest
/// increase first.
pub fn improvement_leaderboard(
    countries: &[CountryAggregate],
    from: i32,
    to: i32,
    n: usize,
) -> Vec<Improvement> {
    let mut rows: Vec<Improvement> = countries
        .iter()
        .map(|c| Improvement {
            country: c.country.clone(),
            inc: c.value(to).unwrap_or(0.0) - c.value(from).unwrap_or(0.0),
        })
        .collect();
    rows.sort_by(|a, b| b.inc.partial_cmp(&a.inc).unwrap_or(Ordering::Equal));
    rows.truncate(n);
    rows
}

/// Per-region yearly totals. Missing values contribute zero, so every
/// region has an entry for every year.
pub fn region_sums(
    countries: &[CountryAggregate],
    years: &[i32],
) -> BTreeMap<String, BTreeMap<i32, f64>> {
    let mut sums: BTreeMap<String, BTreeMap<i32, f64>> = BTreeMap::new();
    for c in countries {
        let e = sums.entry(c.region_label().to_string()).or_default();
        for &y in years {
            *e.entry(y).or_insert(0.0) += c.value(y).unwrap_or(0.0);
        }
    }
    sums
}

pub fn global_series(
    region_sums: &BTreeMap<String, BTreeMap<i32, f64>>,
    years: &[i32],
) -> Vec<SeriesPoint> {
    years
        .iter()
        .map(|&year| SeriesPoint {
            year,
            value: region_sums
                .values()
                .map(|rs| rs.get(&year).copied().unwrap_or(0.0))
                .sum(),
        })
        .collect()
}

/// One point per country with a latest value.
pub fn geo_points(countries: &[CountryAggregate]) -> Vec<GeoPoint> {
    countries
        .iter()
        .filter_map(|c| {
            let value = c.latest?;
            let (at, source) = locate(&c.country);
            Some(GeoPoint {
                country: c.country.clone(),
                lat: at.lat,
                lng: at.lng,
                value,
                source,
            })
        })
        .collect()
}
