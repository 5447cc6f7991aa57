/// Options for the CSV row parser.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Minimum number of fields a row needs to be kept. `None` means the
    /// header width.
    pub min_fields: Option<usize>,
}

/// Options for `analyze`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisConfig {
    /// Upper bound on the top-countries and improvement lists.
    pub top_n: usize,
    /// `(from, to)` years diffed by the improvement leaderboard. `None`
    /// picks the last two year columns of the schema.
    pub improvement_years: Option<(i32, i32)>,
}

pub const DEFAULT_TOP_N: usize = 50;

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            top_n: DEFAULT_TOP_N,
            improvement_years: None,
        }
    }
}

impl AnalysisConfig {
    /// Resolve the year pair against the years actually present.
    pub fn year_pair(&self, years: &[i32]) -> Option<(i32, i32)> {
        if let Some(pair) = self.improvement_years {
            return Some(pair);
        }
        match years {
            [.., from, to] => Some((*from, *to)),
            _ => None,
        }
    }
}
