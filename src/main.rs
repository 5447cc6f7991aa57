// Entry point and interactive menu.
//
// - Option [1] loads the CSV file and recomputes the analysis.
// - Option [2] does the same with the built-in sample dataset.
// - Option [3] prints report previews and exports CSV/JSON files.
// - Option [4] edits the country selection and compares it.
// - Option [5] plays the global series year by year until Enter.
// - Option [6] lists the countries of one continent.
use clap::Parser;
use speed_report::config::DEFAULT_TOP_N;
use speed_report::dashboard::{compare_selected, filter_by_area};
use speed_report::loader::SAMPLE_CSV;
use speed_report::playback::TimelinePlayer;
use speed_report::selection::SelectionState;
use speed_report::{
    analyze, load_csv, output, parse_csv_text, reports, util, Analysis, AnalysisConfig, Dataset,
    LoadReport, ParseOptions,
};
use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "speed_report")]
#[command(version = "0.1.0")]
#[command(about = "Per-country internet speed statistics from a CSV file", long_about = None)]
struct Cli {
    /// CSV file loaded by menu option [1]
    #[arg(short, long, default_value = "internet_speeds.csv")]
    file: PathBuf,

    /// Length of the top-countries and improvement lists
    #[arg(long, default_value_t = DEFAULT_TOP_N)]
    top: usize,

    /// First year of the improvement pair (defaults to the second-to-last year)
    #[arg(long, requires = "to_year")]
    from_year: Option<i32>,

    /// Second year of the improvement pair (defaults to the last year)
    #[arg(long, requires = "from_year")]
    to_year: Option<i32>,

    /// Minimum fields per row (defaults to the header width)
    #[arg(long)]
    min_fields: Option<usize>,

    /// Timeline step in milliseconds
    #[arg(long, default_value_t = 800)]
    interval_ms: u64,

    /// Directory for exported reports
    #[arg(short, long, default_value = ".")]
    out_dir: PathBuf,
}

/// What the menu loop works on. The analysis is rebuilt on every load.
struct Session {
    parse: ParseOptions,
    config: AnalysisConfig,
    analysis: Option<Analysis>,
    selection: SelectionState,
}

impl Session {
    fn install(&mut self, data: &Dataset, report: &LoadReport) {
        println!(
            "Processing dataset... ({} rows read, {} kept, {} year columns)",
            util::format_int(report.total_rows),
            util::format_int(report.kept_rows),
            data.schema.year_columns.len()
        );
        let skipped = report.short_rows + report.missing_country + report.parse_errors;
        if skipped > 0 {
            println!("Note: {} rows skipped.", util::format_int(skipped));
        }
        println!();
        self.analysis = Some(analyze(data, &self.config));
    }
}

/// Print `label` and read one trimmed line. `None` once stdin is closed.
fn prompt(label: &str) -> Option<String> {
    print!("{}", label);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    match io::stdin().read_line(&mut buf) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(buf.trim().to_string()),
    }
}

fn handle_load(session: &mut Session, path: &Path) {
    match load_csv(path, &session.parse) {
        Ok((data, report)) => session.install(&data, &report),
        Err(e) => eprintln!("Failed to load file: {}\n", e),
    }
}

fn handle_sample(session: &mut Session) {
    match parse_csv_text(SAMPLE_CSV, &session.parse) {
        Ok((data, report)) => session.install(&data, &report),
        Err(e) => eprintln!("Failed to parse sample: {}\n", e),
    }
}

fn export<T: serde::Serialize>(out_dir: &Path, file: &str, rows: &[T]) {
    let path = out_dir.join(file);
    match output::write_csv(&path, rows) {
        Ok(()) => println!("(Full table exported to {})\n", path.display()),
        Err(e) => eprintln!("Write error: {}", e),
    }
}

fn handle_generate_reports(session: &Session, out_dir: &Path) {
    let Some(a) = &session.analysis else {
        println!("Error: No data loaded. Please load a CSV file first (option 1 or 2).\n");
        return;
    };

    println!("Generating reports...\n");

    println!("Report 1: Top Countries by Latest Speed\n");
    let r1 = reports::top_country_rows(a);
    output::preview_table_rows(&r1, 5);
    export(out_dir, "report1_top_countries.csv", &r1);

    match a.improvement_years {
        Some((from, to)) => println!("Report 2: Most Improved ({} → {})\n", from, to),
        None => println!("Report 2: Most Improved (needs two year columns)\n"),
    }
    let r2 = reports::improvement_rows(a);
    output::preview_table_rows(&r2, 5);
    export(out_dir, "report2_improvement.csv", &r2);

    println!("Report 3: Yearly Statistics\n");
    let r3 = reports::year_stat_rows(a);
    output::preview_table_rows(&r3, r3.len());
    export(out_dir, "report3_year_stats.csv", &r3);

    println!("Report 4: Regional Totals\n");
    let r4 = reports::region_sum_rows(a);
    output::preview_table_rows(&r4, 4);
    export(out_dir, "report4_region_sums.csv", &r4);

    let analysis_path = out_dir.join("analysis.json");
    if let Err(e) = output::write_json(&analysis_path, a) {
        eprintln!("Write error: {}", e);
    }

    let summary = reports::generate_summary(a);
    if let Err(e) = output::write_json(out_dir.join("summary.json"), &summary) {
        eprintln!("Write error: {}", e);
    }
    println!("Summary Stats (summary.json):");
    println!(
        "{{\"avg_speed\": {}, \"improved\": {}, \"impact_score\": {}}}",
        util::format_number(summary.kpis.average, 2),
        summary.kpis.improved,
        util::format_number(summary.kpis.impact_score, 1)
    );
    println!(
        "High outliers: {}",
        if summary.outliers.high.is_empty() { "None".to_string() } else { summary.outliers.high.join(", ") }
    );
    println!(
        "Low outliers: {}\n",
        if summary.outliers.low.is_empty() { "None".to_string() } else { summary.outliers.low.join(", ") }
    );
}

fn handle_select(session: &mut Session) {
    let Some(a) = &session.analysis else {
        println!("Error: No data loaded. Please load a CSV file first (option 1 or 2).\n");
        return;
    };
    println!("Current selection:\n{}\n", session.selection.numbered_list());
    let query = prompt("Countries (comma-separated, blank to clear): ").unwrap_or_default();
    if query.is_empty() {
        session.selection.clear();
        println!("Selection cleared.\n");
        return;
    }
    let n = session.selection.apply_query(&query, a);
    println!("Selected {} of {} countries.\n", n, a.countries.len());

    let year = a.years.last().copied();
    let rows = reports::comparison_rows(&compare_selected(a, &session.selection, year));
    output::preview_table_rows(&rows, rows.len());
}

fn handle_play(session: &Session, interval: Duration) {
    let Some(a) = &session.analysis else {
        println!("Error: No data loaded. Please load a CSV file first (option 1 or 2).\n");
        return;
    };
    let series: BTreeMap<i32, f64> = a.global_series.iter().map(|p| (p.year, p.value)).collect();
    let mut player = TimelinePlayer::new(a.years.clone(), interval);
    player.toggle(move |year| {
        let total = series.get(&year).copied().unwrap_or(0.0);
        println!("  {}  global total {}", year, util::format_number(total, 2));
    });
    prompt("Playing... press Enter to stop.\n");
    player.stop();
    println!();
}

fn handle_area_filter(session: &Session) {
    let Some(a) = &session.analysis else {
        println!("Error: No data loaded. Please load a CSV file first (option 1 or 2).\n");
        return;
    };
    let needle = prompt("Continent (or `all`): ").unwrap_or_default();
    let matches = filter_by_area(a, &needle);
    let rows: Vec<(String, f64)> = matches
        .iter()
        .map(|c| (c.country.clone(), c.latest.unwrap_or(0.0)))
        .collect();
    println!("{} countries match.\n", rows.len());
    output::preview_table_rows(&reports::comparison_rows(&rows), rows.len());
}

fn main() {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let mut session = Session {
        parse: ParseOptions {
            min_fields: cli.min_fields,
        },
        config: AnalysisConfig {
            top_n: cli.top,
            improvement_years: cli.from_year.zip(cli.to_year),
        },
        analysis: None,
        selection: SelectionState::default(),
    };
    let interval = Duration::from_millis(cli.interval_ms);

    loop {
        println!("Internet Speed Report:");
        println!("[1] Load the file ({})", cli.file.display());
        println!("[2] Load the sample dataset");
        println!("[3] Generate Reports");
        println!("[4] Select Countries");
        println!("[5] Play Timeline");
        println!("[6] Filter by Continent");
        println!("[0] Exit\n");
        let Some(choice) = prompt("Enter choice: ") else {
            break;
        };
        match choice.as_str() {
            "1" => handle_load(&mut session, &cli.file),
            "2" => handle_sample(&mut session),
            "3" => handle_generate_reports(&session, &cli.out_dir),
            "4" => handle_select(&mut session),
            "5" => handle_play(&session, interval),
            "6" => handle_area_filter(&session),
            "0" => {
                println!("Exiting the program.");
                break;
            }
            _ => println!("Invalid choice. Please enter 0-6.\n"),
        }
    }
}
