//! Headline numbers and filters the dashboard shows next to the charts.
//!
//! These read the year pair the improvement leaderboard uses and count
//! missing values as zero, the same way the leaderboard does.
use crate::selection::SelectionState;
use crate::types::{Analysis, CountryAggregate, Kpis, Outliers};
use crate::util::{average, std_dev};

fn pair_values(a: &Analysis) -> Option<Vec<(f64, f64)>> {
    let (from, to) = a.improvement_years?;
    Some(
        a.countries
            .iter()
            .map(|c| (c.value(from).unwrap_or(0.0), c.value(to).unwrap_or(0.0)))
            .collect(),
    )
}

/// Average `to` value, improved count, mean growth and impact score.
pub fn compute_kpis(a: &Analysis) -> Kpis {
    let Some(pairs) = pair_values(a) else {
        return Kpis::default();
    };
    if pairs.is_empty() {
        return Kpis::default();
    }
    let latest: Vec<f64> = pairs.iter().map(|(_, to)| *to).collect();
    let deltas: Vec<f64> = pairs.iter().map(|(from, to)| to - from).collect();
    let avg = average(&latest);
    let mean_growth = average(&deltas);
    let base = if avg == 0.0 { 1.0 } else { avg };
    Kpis {
        average: avg,
        improved: deltas.iter().filter(|d| **d > 0.0).count(),
        mean_growth,
        impact_score: (mean_growth / base * 100.0).max(0.0),
    }
}

/// Countries more than two standard deviations from the mean `to` value.
pub fn find_outliers(a: &Analysis) -> Outliers {
    let Some(pairs) = pair_values(a) else {
        return Outliers::default();
    };
    let vals: Vec<f64> = pairs.iter().map(|(_, to)| *to).collect();
    let mean = average(&vals);
    let std = std_dev(&vals);
    Outliers {
        mean,
        std,
        high: names_where(&a.countries, &vals, |v| v > mean + 2.0 * std),
        low: names_where(&a.countries, &vals, |v| v < mean - 2.0 * std),
    }
}

fn names_where(countries: &[CountryAggregate], vals: &[f64], keep: impl Fn(f64) -> bool) -> Vec<String> {
    countries
        .iter()
        .zip(vals)
        .filter(|(_, v)| keep(**v))
        .map(|(c, _)| c.country.clone())
        .collect()
}

/// `all` keeps everything; otherwise major areas containing `needle`,
/// ignoring case.
pub fn filter_by_area<'a>(a: &'a Analysis, needle: &str) -> Vec<&'a CountryAggregate> {
    let needle = needle.trim().to_lowercase();
    if needle.is_empty() || needle == "all" {
        return a.countries.iter().collect();
    }
    a.countries
        .iter()
        .filter(|c| {
            c.major_area
                .as_deref()
                .is_some_and(|m| m.to_lowercase().contains(&needle))
        })
        .collect()
}

/// Values for the selected countries, in analysis order. `Some(year)` reads
/// that year; `None` averages the improvement pair. Missing is zero.
pub fn compare_selected(
    a: &Analysis,
    selection: &SelectionState,
    year: Option<i32>,
) -> Vec<(String, f64)> {
    a.countries
        .iter()
        .filter(|c| selection.is_selected(&c.country))
        .map(|c| {
            let v = match (year, a.improvement_years) {
                (Some(y), _) => c.value(y).unwrap_or(0.0),
                (None, Some((from, to))) => {
                    (c.value(from).unwrap_or(0.0) + c.value(to).unwrap_or(0.0)) / 2.0
                }
                (None, None) => c.latest.unwrap_or(0.0),
            };
            (c.country.clone(), v)
        })
        .collect()
}
