//! Flood Warning Service - CLI
//!
//! Builds the Environment Agency station list, applies the latest river
//! levels and prints one report per command, or serves the same reports
//! over HTTP.
//!
//! Usage:
//!   floodwatch [--config PATH] [--refresh] <command> [args]
//!
//!   stations               station count and a sample
//!   nearest                10 closest and 10 furthest from the origin
//!   within [RADIUS_KM]     stations within a radius of the origin
//!   rivers                 rivers with a station, and three sample rivers
//!   top-rivers [N]         rivers with the most stations
//!   inconsistent           stations with unusable typical ranges
//!   levels                 latest level for a sample of stations
//!   over [TOL]             relative level above TOL
//!   highest [N]            N highest relative levels
//!   history [NAME] [DAYS]  reading history and fitted trend
//!   serve [PORT]           read-only JSON endpoint
//!
//! Environment:
//!   FLOODWATCH_CONFIG - config file path (default floodwatch.toml)
//!   RUST_LOG          - log filter, overrides the configured level

use std::path::PathBuf;
use std::process;

use chrono::Duration;

use floodwatch_service::analysis::{groupings, polyfit, ranking};
use floodwatch_service::config::{self, Config, ConfigError};
use floodwatch_service::endpoint::{self, EndpointError};
use floodwatch_service::geo;
use floodwatch_service::ingest::ea::{self, EaClient};
use floodwatch_service::logging::{self, DataSource};
use floodwatch_service::model::{self, FetchError, Reading, Station};
use floodwatch_service::stations;

const USAGE: &str = "Usage: floodwatch [--config PATH] [--refresh] \
    <stations|nearest|within|rivers|top-rivers|inconsistent|\
    levels|over|highest|history|serve> [args]";

/// Stations sampled by `rivers`.
const SAMPLE_RIVERS: [&str; 3] = ["River Aire", "River Cam", "River Thames"];

/// Stations fetched by `history` when no name is given.
const HISTORY_TOP_N: usize = 5;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Endpoint(#[from] EndpointError),
}

struct Cli {
    config_path: Option<PathBuf>,
    refresh: bool,
    command: String,
    args: Vec<String>,
}

fn parse_args(args: &[String]) -> Result<Cli, CliError> {
    let mut config_path = None;
    let mut refresh = false;
    let mut positional = Vec::new();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                let path = args
                    .get(i + 1)
                    .ok_or_else(|| CliError::Usage("--config requires a path".to_string()))?;
                config_path = Some(PathBuf::from(path));
                i += 2;
            }
            "--refresh" => {
                refresh = true;
                i += 1;
            }
            other => {
                positional.push(other.to_string());
                i += 1;
            }
        }
    }

    if positional.is_empty() {
        return Err(CliError::Usage(USAGE.to_string()));
    }
    let command = positional.remove(0);

    Ok(Cli {
        config_path,
        refresh,
        command,
        args: positional,
    })
}

/// Parses the positional argument at `index`, or returns `default`.
fn arg_or<T: std::str::FromStr>(args: &[String], index: usize, default: T) -> Result<T, CliError> {
    match args.get(index) {
        None => Ok(default),
        Some(raw) => raw
            .parse()
            .map_err(|_| CliError::Usage(format!("invalid argument: {}", raw))),
    }
}

fn main() {
    let args: Vec<String> = std::env::args().collect();

    let cli = match parse_args(&args) {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    };

    let path = cli.config_path.clone().unwrap_or_else(config::default_path);
    let config = match config::load_config(&path) {
        Ok(config) => config,
        Err(e) => {
            logging::init_logger(log::LevelFilter::Info);
            log::error!(target: DataSource::Config.target(), "{}", e);
            process::exit(1);
        }
    };

    let level = config
        .log_level
        .as_deref()
        .map(logging::parse_level)
        .unwrap_or(log::LevelFilter::Info);
    logging::init_logger(level);

    if let Err(e) = run(&cli, config) {
        log::error!(target: DataSource::System.target(), "{}", e);
        if matches!(e, CliError::Usage(_)) {
            eprintln!("{}", USAGE);
        }
        process::exit(1);
    }
}

fn run(cli: &Cli, mut config: Config) -> Result<(), CliError> {
    if cli.refresh {
        config.cache.use_station_cache = false;
    }
    let client = EaClient::new(&config.source)?;
    let args = &cli.args;

    match cli.command.as_str() {
        "stations" => report_stations(&load_stations(&client, &config)?),
        "nearest" => report_nearest(&load_stations(&client, &config)?, &config),
        "within" => {
            let radius = arg_or(args, 0, config.report.radius_km)?;
            report_within(&load_stations(&client, &config)?, &config, radius);
        }
        "rivers" => report_rivers(&load_stations(&client, &config)?),
        "top-rivers" => {
            let n = arg_or(args, 0, config.report.river_count)?;
            report_top_rivers(&load_stations(&client, &config)?, n);
        }
        "inconsistent" => report_inconsistent(&load_stations(&client, &config)?),
        "levels" => report_levels(&load_with_levels(&client, &config)?),
        "over" => {
            let tol = arg_or(args, 0, config.report.threshold)?;
            report_over(&load_with_levels(&client, &config)?, tol);
        }
        "highest" => {
            let n = arg_or(args, 0, config.report.high_risk_count)?;
            report_highest(&load_with_levels(&client, &config)?, n);
        }
        "history" => report_history(&client, &config, args)?,
        "serve" => {
            let port = arg_or(args, 0, config.endpoint.port)?;
            let snapshot = load_with_levels(&client, &config)?;
            endpoint::start_endpoint_server(port, snapshot, config.report.clone())?;
        }
        other => return Err(CliError::Usage(format!("unknown command: {}", other))),
    }

    Ok(())
}

fn load_stations(client: &EaClient, config: &Config) -> Result<Vec<Station>, FetchError> {
    stations::build_station_list(client, &config.cache)
}

fn load_with_levels(client: &EaClient, config: &Config) -> Result<Vec<Station>, FetchError> {
    let mut list = load_stations(client, config)?;
    stations::update_water_levels(&mut list, client, &config.cache)?;
    Ok(list)
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

fn report_stations(list: &[Station]) {
    println!("Number of stations: {}", list.len());
    for station in list.iter().take(3) {
        println!("{}", station);
    }
}

fn print_distances(entries: &[(&str, Option<&str>, f64)]) {
    for (name, town, distance) in entries {
        println!(
            "  {:<40} {:<25} {:>8.2} km",
            name,
            town.unwrap_or("-"),
            distance
        );
    }
}

fn report_nearest(list: &[Station], config: &Config) {
    let by_distance = geo::stations_by_distance(list, config.report.origin());

    println!("Closest 10 stations:");
    print_distances(&by_distance[..by_distance.len().min(10)]);
    println!("Furthest 10 stations:");
    print_distances(&by_distance[by_distance.len().saturating_sub(10)..]);
}

fn report_within(list: &[Station], config: &Config, radius: f64) {
    let mut names: Vec<&str> = geo::stations_within_radius(list, config.report.origin(), radius)
        .into_iter()
        .map(|s| s.name())
        .collect();
    names.sort();
    println!("{} stations within {} km: {:?}", names.len(), radius, names);
}

fn report_rivers(list: &[Station]) {
    let rivers = groupings::rivers_with_station(list);
    let named: Vec<&str> = rivers.iter().flatten().copied().collect();
    println!(
        "{} rivers have at least one monitoring station",
        rivers.len()
    );
    println!("First 10: {:?}", &named[..named.len().min(10)]);

    let by_river = groupings::stations_by_river(list);
    for river in SAMPLE_RIVERS {
        let mut names: Vec<&str> = by_river
            .get(&Some(river))
            .map(|stations| stations.iter().map(|s| s.name()).collect())
            .unwrap_or_default();
        names.sort();
        println!("Stations on {}: {:?}", river, names);
    }
}

fn report_top_rivers(list: &[Station], n: usize) {
    for (river, count) in groupings::rivers_by_station_count(list, n) {
        println!("  {:<40} {}", river.unwrap_or("(unknown river)"), count);
    }
}

fn report_inconsistent(list: &[Station]) {
    let names = model::inconsistent_typical_range_stations(list);
    println!(
        "{} stations with inconsistent typical range data:",
        names.len()
    );
    println!("{:?}", names);
}

fn report_levels(list: &[Station]) {
    for station in list.iter().filter(|s| s.latest_level.is_some()).take(10) {
        let relative = station
            .relative_water_level()
            .map(|r| format!("{:.3}", r))
            .unwrap_or_else(|| "n/a".to_string());
        println!(
            "  {:<40} level {:>7.3} m  relative {}",
            station.name(),
            station.latest_level.unwrap_or_default(),
            relative
        );
    }
}

fn report_over(list: &[Station], tol: f64) {
    println!("Stations with relative level over {}:", tol);
    for (station, level) in ranking::stations_over_threshold(list, tol) {
        println!("  {:<40} {:.3}", station.name(), level);
    }
}

fn report_highest(list: &[Station], n: usize) {
    println!("{} stations with the highest relative level:", n);
    for station in ranking::top_n_by_relative_level(list, n) {
        let level = station.relative_water_level().unwrap_or_default();
        println!("  {:<40} {:.3}", station.name(), level);
    }
}

/// `history NAME [DAYS]` for one station, or `history` for the highest
/// risk stations fetched in parallel. NAME falls back to the closest match.
fn report_history(client: &EaClient, config: &Config, args: &[String]) -> Result<(), CliError> {
    let list = load_with_levels(client, config)?;

    let targets: Vec<&Station> = match args.first() {
        Some(name) => {
            let station = stations::find_station_fuzzy(&list, name)
                .ok_or_else(|| CliError::Usage(format!("no station named '{}'", name)))?;
            if station.name() != name {
                log::info!(
                    target: DataSource::System.target(),
                    "'{}' matched station '{}'",
                    name,
                    station.name()
                );
            }
            vec![station]
        }
        None => ranking::top_n_by_relative_level(&list, HISTORY_TOP_N),
    };
    let days = arg_or(args, 1, config.report.history_days)?;
    let window = Duration::try_days(days)
        .filter(|_| days > 0)
        .ok_or_else(|| CliError::Usage(format!("invalid history window: {} days", days)))?;

    let measure_ids: Vec<String> = targets.iter().map(|s| s.measure_id().to_string()).collect();
    let workers = config.source.history_workers;
    let histories = ea::fetch_histories(client, &measure_ids, window, workers);

    let failed = histories.iter().filter(|(_, r)| r.is_err()).count();
    logging::log_batch_summary(DataSource::Ea, "history fetch", histories.len(), failed);

    for (station, result) in stations::match_by_measure(&targets, histories) {
        match result {
            Some(Ok(readings)) => print_history(station, &readings, config.report.fit_degree),
            Some(Err(e)) => logging::log_fetch_failure(station.name(), "history fetch", &e),
            None => log::warn!(
                target: DataSource::Ea.target(),
                "no history result for {} ({})",
                station.name(),
                station.measure_id()
            ),
        }
    }

    Ok(())
}

fn print_history(station: &Station, readings: &[Reading], degree: usize) {
    println!("{} ({} readings)", station.name(), readings.len());
    if let (Some(first), Some(last)) = (readings.first(), readings.last()) {
        for reading in [first, last] {
            let time = reading.time.format("%Y-%m-%d %H:%M");
            println!("  {}  {:.3} m", time, reading.level);
        }
    }
    if let Some(range) = station.typical_range() {
        println!("  typical range {:.3} - {:.3} m", range.low, range.high);
    }

    match polyfit::fit_history(readings, degree) {
        Some((poly, _)) => {
            println!("  trend now      {:.3} m", poly.eval(0.0));
            println!("  trend +1 day   {:.3} m", poly.eval(1.0));
        }
        None => println!("  not enough readings for a degree {} fit", degree),
    }
}
