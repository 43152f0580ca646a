// Entry point and high-level CLI flow.
//
// Each subcommand is one view over the joined fact table:
// - the table is loaded once through a `TableCache` owned by `App`,
// - the selection narrows it (department → province → period),
// - the view prints a Markdown preview and exports the full result.
// Load failures stop the program; a failing view only skips that view.
mod cli;

use clap::Parser;
use cli::{Args, Command, DistrictScope, Scope};
use residuos_report::aggregate::{aggregate_by_district, aggregate_by_province, GroupTotal};
use residuos_report::composition::composition;
use residuos_report::config::SourceConfig;
use residuos_report::delta::{compute_delta, DeltaReport, TOP_MOVERS};
use residuos_report::filter::{departments, districts, filter_by_department, periods, provinces};
use residuos_report::geo::heat_points;
use residuos_report::output::{preview_table, write_csv, write_json};
use residuos_report::reports::{composition_rows, delta_rows, ranking_rows, run_bundle};
use residuos_report::util::{format_int, format_number};
use residuos_report::{Dataset, FactTable, Measure, ReportError, Result, Selection, TableCache};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

struct App {
    cache: TableCache,
    waste: SourceConfig,
    location: SourceConfig,
    out_dir: PathBuf,
    preview_rows: usize,
}

impl App {
    fn dataset(&self) -> Result<Arc<Dataset>> {
        let data = self.cache.get_or_load(&self.waste, &self.location)?;
        let report = &data.report;
        println!(
            "Processing dataset... ({} waste rows, {} locations, {} joined)",
            format_int(report.waste_rows),
            format_int(report.location_rows),
            format_int(report.joined_rows)
        );
        println!("Sources: {}", data.provenance());
        if !report.unmatched_districts.is_empty() {
            println!(
                "Note: {} districts have no location and were left out.",
                format_int(report.unmatched_districts.len())
            );
        }
        if report.coercion_failures > 0 {
            println!(
                "Note: {} cells could not be read as numbers and count as missing.",
                format_int(report.coercion_failures)
            );
        }
        println!();
        Ok(data)
    }

    fn out_path(&self, file: &str) -> PathBuf {
        self.out_dir.join(file)
    }

    fn export<T: serde::Serialize>(&self, file: &str, rows: &[T]) -> Result<PathBuf> {
        let path = self.out_path(file);
        write_csv(&path, rows)?;
        Ok(path)
    }
}

fn handle_measures() {
    println!("Waste fractions:");
    for m in Measure::all() {
        println!("  {}", m);
    }
    println!();
}

fn handle_options(app: &App, scope: &Scope) -> Result<()> {
    let data = app.dataset()?;
    let scoped = scope.selection().apply(&data.table);
    // Each list comes from the table narrowed by the levels above it.
    let by_dep = match &scope.department {
        Some(dep) => filter_by_department(&data.table, dep),
        None => data.table.clone(),
    };
    println!("Departments: {}", departments(&data.table).join(", "));
    println!("Provinces:   {}", provinces(&by_dep).join(", "));
    println!("Districts:   {}", districts(&scoped).join(", "));
    let years: Vec<String> = periods(&scoped).iter().map(i32::to_string).collect();
    println!("Periods:     {}\n", years.join(", "));
    Ok(())
}

fn ranking_view(
    app: &App,
    table: &FactTable,
    selection: &Selection,
    measure: &str,
    title: &str,
    aggregate: fn(&FactTable, &str) -> Result<Vec<GroupTotal>>,
    file: &str,
) -> Result<Vec<GroupTotal>> {
    let totals = aggregate(&selection.apply(table), measure)?;
    show_ranking(app, &totals, selection, measure, title, file)?;
    Ok(totals)
}

/// Preview an already computed ranking, then export it.
fn show_ranking(
    app: &App,
    totals: &[GroupTotal],
    selection: &Selection,
    measure: &str,
    title: &str,
    file: &str,
) -> Result<()> {
    let rows = ranking_rows(totals);
    preview_table(
        &format!("{} ({})", title, measure),
        Some(&selection.describe()),
        &rows,
        app.preview_rows,
    );
    let path = app.export(file, &rows)?;
    println!("(Full table exported to {})\n", path.display());
    Ok(())
}

fn print_delta(app: &App, report: &DeltaReport) -> Result<()> {
    let increase = delta_rows(&report.top_increase);
    let decrease = delta_rows(&report.top_decrease);
    let note = format!("{} vs {}", report.period_a, report.period_b);
    preview_table(
        &format!("Top {} districts that increased most", TOP_MOVERS),
        Some(&note),
        &increase,
        TOP_MOVERS,
    );
    preview_table(
        &format!("Top {} districts that decreased most", TOP_MOVERS),
        Some(&note),
        &decrease,
        TOP_MOVERS,
    );
    let up = app.export("delta_top_increase.csv", &increase)?;
    let down = app.export("delta_top_decrease.csv", &decrease)?;
    println!("(Exported to {} and {})\n", up.display(), down.display());
    Ok(())
}

fn handle_delta(
    app: &App,
    selection: &Selection,
    measure: &str,
    from: i32,
    to: i32,
) -> Result<()> {
    let data = app.dataset()?;
    match compute_delta(&selection.apply(&data.table), measure, from, to) {
        Ok(report) => print_delta(app, &report),
        Err(ReportError::PeriodUnavailable { available, .. }) => {
            // The view is simply omitted for this selection.
            println!(
                "Delta {} vs {} is not available for {} (periods in scope: {:?}).\n",
                from,
                to,
                selection.describe(),
                available
            );
            Ok(())
        }
        Err(e) => Err(e),
    }
}

fn handle_composition(
    app: &App,
    district: &str,
    period: i32,
    department: Option<&str>,
) -> Result<()> {
    let data = app.dataset()?;
    let table = match department {
        Some(dep) => filter_by_department(&data.table, dep),
        None => data.table.clone(),
    };
    let parts = composition(&table, district, period);
    let rows = composition_rows(&parts);
    let total: f64 = parts.iter().map(|p| p.quantity).sum();
    preview_table(
        &format!("Composition of {} in {}", district, period),
        Some(&format!("{} tonnes in total", format_number(total, 2))),
        &rows,
        rows.len(),
    );
    let path = app.export("composition.csv", &rows)?;
    println!("(Full table exported to {})\n", path.display());
    Ok(())
}

fn handle_heat(app: &App, scope: &Scope, measure: &str) -> Result<()> {
    let data = app.dataset()?;
    let points = heat_points(&scope.selection().apply(&data.table), measure)?;
    let path = app.export("heat_points.csv", &points)?;
    println!(
        "{} points exported to {}\n",
        format_int(points.len()),
        path.display()
    );
    Ok(())
}

/// Runs every view for one selection. A view that fails, or whose export
/// fails, is reported and listed in the summary; the others still run.
fn handle_report(
    app: &App,
    scope: &DistrictScope,
    measure: &str,
    from: i32,
    to: i32,
) -> Result<()> {
    let data = app.dataset()?;
    let selection = scope.selection();
    let mut bundle = run_bundle(&data.table, &selection, measure, from, to)?;
    let measure = bundle.summary.measure.clone();
    let mut export_failed = Vec::new();

    if let Some(ranking) = &bundle.ranking {
        if let Err(e) = show_ranking(
            app,
            ranking,
            &selection,
            &measure,
            "District ranking",
            "report_district_ranking.csv",
        ) {
            warn!(error = %e, "district ranking export failed");
            export_failed.push("district_ranking_export");
        }
    }
    if let Some(rollup) = &bundle.rollup {
        if let Err(e) = show_ranking(
            app,
            rollup,
            &selection,
            &measure,
            "Provincial rollup",
            "report_province_rollup.csv",
        ) {
            warn!(error = %e, "provincial rollup export failed");
            export_failed.push("province_rollup_export");
        }
    }
    match &bundle.delta {
        Some(report) => {
            if let Err(e) = print_delta(app, report) {
                warn!(error = %e, "delta export failed");
                export_failed.push("delta_export");
            }
        }
        None => println!(
            "Delta {} vs {} omitted: not available for {}.\n",
            from,
            to,
            selection.describe()
        ),
    }
    bundle
        .summary
        .views_failed
        .extend(export_failed.into_iter().map(String::from));

    let summary = &bundle.summary;
    let path = app.out_path("summary.json");
    write_json(&path, summary)?;
    println!("Summary Stats ({}):", path.display());
    println!(
        "{{\"total_tonnes\": {}, \"net_delta\": {}}}\n",
        format_number(summary.total_tonnes, 2),
        summary
            .net_delta
            .map(|d| format_number(d, 2))
            .unwrap_or_else(|| "n/a".to_string())
    );
    Ok(())
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn source_configs(args: &Args) -> Result<(SourceConfig, SourceConfig)> {
    let waste = SourceConfig::waste(&args.waste)
        .with_encoding_label(&args.waste_encoding)
        .ok_or_else(|| {
            ReportError::load(
                "waste",
                &args.waste,
                format!("unknown encoding '{}'", args.waste_encoding),
            )
        })?;
    Ok((waste, SourceConfig::location(&args.locations)))
}

fn run(args: Args) -> Result<()> {
    let (waste, location) = source_configs(&args)?;
    if !args.out_dir.exists() {
        std::fs::create_dir_all(&args.out_dir)
            .map_err(|e| ReportError::output(&args.out_dir, e))?;
    }
    let app = App {
        cache: TableCache::new(),
        waste,
        location,
        out_dir: args.out_dir.clone(),
        preview_rows: args.preview_rows,
    };
    info!(
        waste = %app.waste.path.display(),
        locations = %app.location.path.display(),
        "starting"
    );

    match &args.command {
        Command::Measures => {
            handle_measures();
            Ok(())
        }
        Command::Options { scope } => handle_options(&app, scope),
        Command::Districts { scope, measure } => {
            let data = app.dataset()?;
            ranking_view(
                &app,
                &data.table,
                &scope.selection(),
                measure,
                "District ranking",
                aggregate_by_district,
                "district_ranking.csv",
            )
            .map(|_| ())
        }
        Command::Provinces { scope, measure } => {
            let data = app.dataset()?;
            ranking_view(
                &app,
                &data.table,
                &scope.selection(),
                measure,
                "Provincial rollup",
                aggregate_by_province,
                "province_rollup.csv",
            )
            .map(|_| ())
        }
        Command::Delta {
            department,
            province,
            measure,
            from,
            to,
        } => {
            let selection = Selection {
                department: Some(department.clone()),
                province: province.clone(),
                period: None,
            };
            handle_delta(&app, &selection, measure, *from, *to)
        }
        Command::Composition {
            district,
            period,
            department,
        } => handle_composition(&app, district, *period, department.as_deref()),
        Command::Heat { scope, measure } => handle_heat(&app, scope, measure),
        Command::Report {
            scope,
            measure,
            from,
            to,
        } => handle_report(&app, scope, measure, *from, *to),
    }
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        if matches!(e, ReportError::InvalidMeasure { .. }) {
            eprintln!("Run the `measures` command to list valid fractions.");
        }
        process::exit(if e.is_fatal() { 1 } else { 2 });
    }
}
