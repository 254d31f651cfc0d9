use std::collections::HashSet;
use std::error::Error;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use itertools::Itertools;
use num_format::{Locale, ToFormattedString};
use serde::Serialize;
use simple_logger::SimpleLogger;
use tinytemplate::TinyTemplate;

use airtrips::{
    AirportIndex, AirportStore, Analysis, Category, CsvStore, EmissionsModel, ImportMode,
    ImportOptions, ImportReport, Importer,
};

static TEMPLATE_NAME: &'static str = "analysis";

static ANALYSIS_TEMPLATE: &'static str = "CSV Analysis:
  Total rows: {total}
  With IATA code: {with_iata} ({with_iata_percentage}%)
  With scheduled service: {with_scheduled}
  Malformed rows: {malformed}

  Airport types:
{{ for category in categories }}    {category.name}: {category.total} total, {category.with_iata} with IATA codes ({category.percentage}%)
{{ endfor }}
  Top 15 countries:
{{ for country in countries }}    {country.name}: {country.total}
{{ endfor }}";

const ABOUT: &'static str = r#"Maintains the reference table of world airports used to compute trip emissions.
Commands that change the table (import, clean, quickstart) must not run concurrently.
"#;

#[derive(Parser, Debug)]
#[command(author, version, about = ABOUT)]
struct Cli {
    /// The file holding the airport table
    #[arg(long, global = true, default_value = "database/airports.csv")]
    store: PathBuf,
    /// Log debug messages
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

/// Which rows of the dataset are imported
#[derive(clap::Args, Debug)]
struct Policy {
    /// Number of airports per atomic write
    #[arg(long, default_value_t = 500)]
    batch_size: usize,
    /// Skip airports without scheduled service
    #[arg(long)]
    require_scheduled: bool,
    /// Import airports without a valid IATA code
    #[arg(long)]
    allow_missing_iata: bool,
    /// A category to skip (e.g. `heliport`); repeatable. Defaults to heliport, seaplane_base and closed
    #[arg(long)]
    exclude: Vec<String>,
    /// Skip no category
    #[arg(long, conflicts_with = "exclude")]
    include_all: bool,
}

impl From<Policy> for ImportOptions {
    fn from(policy: Policy) -> Self {
        let excluded_categories = if policy.include_all {
            HashSet::new()
        } else if policy.exclude.is_empty() {
            ImportOptions::default_exclusions()
        } else {
            policy
                .exclude
                .iter()
                .map(|x| Category::from(x.as_str()))
                .collect()
        };
        Self {
            require_scheduled_service: policy.require_scheduled,
            excluded_categories,
            require_iata: !policy.allow_missing_iata,
            batch_size: policy.batch_size,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replaces the table by the airports in an OurAirports `airports.csv`
    Import {
        file: PathBuf,
        /// Update and add airports instead of replacing the table
        #[arg(long)]
        upsert: bool,
        #[command(flatten)]
        policy: Policy,
    },
    /// Reports counts by category and country of a dataset, without importing it
    Analyze { file: PathBuf },
    /// Shows the header and first rows of a CSV file
    Inspect { file: PathBuf },
    /// Removes duplicated IATA codes and airports at (0, 0)
    Clean,
    /// Writes the table in the dataset's column format (to stdout when no file is given)
    Export { file: Option<PathBuf> },
    /// Prints the number of airports in the table
    Count,
    /// Searches airports by code, city, name or country
    Search { query: String },
    /// Prints the airport with a code
    Get { code: String },
    /// Computes the distance and emissions of a trip
    Trip {
        origin: String,
        destination: String,
        /// kg of CO2 per km flown; finite and non-negative
        #[arg(long, default_value = "0.115", value_parser = parse_model)]
        kg_co2_per_km: EmissionsModel,
    },
    /// Replaces the table by a small set of major international airports
    Quickstart,
    /// Downloads the OurAirports dataset, unless already downloaded
    Download {
        #[arg(long, default_value = "database/ourairports.csv")]
        path: PathBuf,
        #[arg(long, default_value = airtrips::download::AIRPORTS_URL)]
        url: String,
    },
}

#[derive(Serialize)]
struct Named {
    name: String,
    total: String,
    with_iata: String,
    percentage: String,
}

#[derive(Serialize)]
struct AnalysisContext {
    total: String,
    with_iata: String,
    with_iata_percentage: String,
    with_scheduled: String,
    malformed: String,
    categories: Vec<Named>,
    countries: Vec<Named>,
}

fn parse_model(value: &str) -> Result<EmissionsModel, String> {
    let factor = value.parse::<f64>().map_err(|e| e.to_string())?;
    EmissionsModel::new(factor).ok_or_else(|| format!("{value} is not a finite, non-negative factor"))
}

fn percentage(part: usize, total: usize) -> String {
    if total == 0 {
        return "0.0".to_string();
    }
    format!("{:.1}", part as f64 / total as f64 * 100.0)
}

fn render_analysis(analysis: &Analysis) -> Result<String, Box<dyn Error>> {
    let fmt = |x: usize| x.to_formatted_string(&Locale::en);
    let context = AnalysisContext {
        total: fmt(analysis.total),
        with_iata: fmt(analysis.with_iata),
        with_iata_percentage: percentage(analysis.with_iata, analysis.total),
        with_scheduled: fmt(analysis.with_scheduled),
        malformed: fmt(analysis.malformed),
        categories: analysis
            .categories_by_count()
            .into_iter()
            .map(|(name, count)| Named {
                name: name.to_string(),
                total: fmt(count.total),
                with_iata: fmt(count.with_iata),
                percentage: percentage(count.total, analysis.total),
            })
            .collect(),
        countries: analysis
            .top_countries(15)
            .into_iter()
            .map(|(name, total)| Named {
                name: name.to_string(),
                total: fmt(total),
                with_iata: String::new(),
                percentage: String::new(),
            })
            .collect(),
    };

    let mut tt = TinyTemplate::new();
    tt.set_default_formatter(&tinytemplate::format_unescaped);
    tt.add_template(TEMPLATE_NAME, ANALYSIS_TEMPLATE)?;
    Ok(tt.render(TEMPLATE_NAME, &context)?)
}

fn print_report(report: &ImportReport) {
    println!("Rows read: {}", report.seen.to_formatted_string(&Locale::en));
    println!("Airports imported: {}", report.written.to_formatted_string(&Locale::en));
    println!("Duplicates skipped: {}", report.duplicates);
    for (reason, count) in &report.rejected {
        println!("Rejected ({reason}): {}", count.to_formatted_string(&Locale::en));
    }
    for failure in &report.failed {
        println!(
            "Batch {} (rows {}-{}) failed: {}",
            failure.batch, failure.first_row, failure.last_row, failure.error
        );
    }
}

/// Prints the number of airports in the table and the countries with most airports
fn print_summary(store: &impl AirportStore) {
    println!("Total in database: {}", store.count());
    println!("Top 10 countries:");
    store
        .airports()
        .map(|airport| airport.country.as_str())
        .counts()
        .into_iter()
        .sorted_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)))
        .take(10)
        .for_each(|(country, count)| println!("  {country}: {count} airports"));
}

fn import(
    store: &mut CsvStore,
    file: &Path,
    options: ImportOptions,
    mode: ImportMode,
) -> Result<(), Box<dyn Error>> {
    log::info!("Importing {} ({mode:?})", file.display());
    let reader = std::fs::File::open(file)?;
    let report = Importer::new(store, options).import_csv(reader, mode)?;
    print_report(&report);
    print_summary(store);
    if !report.is_complete() {
        return Err(format!("{} batches were not imported", report.failed.len()).into());
    }
    Ok(())
}

fn print_json(value: &impl Serialize) -> Result<(), Box<dyn Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    SimpleLogger::new()
        .with_level(if cli.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .init()?;

    match cli.command {
        Command::Import {
            file,
            upsert,
            policy,
        } => {
            let mut store = CsvStore::open(&cli.store)?;
            let mode = if upsert {
                ImportMode::Upsert
            } else {
                ImportMode::Replace
            };
            import(&mut store, &file, policy.into(), mode)?;
        }
        Command::Analyze { file } => {
            let analysis = airtrips::analyze(std::fs::File::open(&file)?)?;
            print!("{}", render_analysis(&analysis)?);
        }
        Command::Inspect { file } => {
            let (headers, rows) = airtrips::csv::head(std::fs::File::open(&file)?, 3)?;
            println!("Headers: {}", headers.join(", "));
            for (i, row) in rows.iter().enumerate() {
                println!("Row {}: {}", i + 1, row.join(", "));
            }
        }
        Command::Clean => {
            let mut store = CsvStore::open(&cli.store)?;
            let report = airtrips::clean(&mut store)?;
            println!(
                "Removed {} duplicates and {} airports with invalid coordinates",
                report.duplicates_removed, report.placeholders_removed
            );
        }
        Command::Export { file } => {
            let store = CsvStore::open(&cli.store)?;
            let written = match &file {
                Some(path) => airtrips::export(&store, std::fs::File::create(path)?)?,
                None => airtrips::export(&store, std::io::stdout().lock())?,
            };
            log::info!("Exported {written} airports");
        }
        Command::Count => {
            let store = CsvStore::open(&cli.store)?;
            println!("Total airports in database: {}", store.count());
        }
        Command::Search { query } => {
            let store = CsvStore::open(&cli.store)?;
            print_json(&AirportIndex::new(&store).search(&query))?;
        }
        Command::Get { code } => {
            let store = CsvStore::open(&cli.store)?;
            match AirportIndex::new(&store).get(&code) {
                Some(airport) => print_json(&airport)?,
                None => println!("{code}: not found"),
            }
        }
        Command::Trip {
            origin,
            destination,
            kg_co2_per_km,
        } => {
            let store = CsvStore::open(&cli.store)?;
            let planner = airtrips::TripPlanner::new(&store, kg_co2_per_km);
            print_json(&planner.compute_trip(&origin, &destination)?)?;
        }
        Command::Quickstart => {
            let mut store = CsvStore::open(&cli.store)?;
            let report = Importer::new(&mut store, ImportOptions::default()).quickstart()?;
            print_report(&report);
        }
        Command::Download { path, url } => {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            let downloaded = runtime.block_on(airtrips::download::dataset_cached(&url, &path))?;
            if downloaded {
                println!("Downloaded {url} to {}", path.display());
            } else {
                println!("{} already exists", path.display());
            }
        }
    }
    Ok(())
}
