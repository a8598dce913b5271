use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn};
use std::path::PathBuf;
use std::time::Instant;

use dronepath::api::RestClient;
use dronepath::config::FileConfig;
use dronepath::domain::{OrderStatus, find_restaurant_for};
use dronepath::geometry::Coordinate;
use dronepath::output::OutputWriter;
use dronepath::planner::{MoveRecord, plan_delivery, waypoints};
use dronepath::validation::validate_order;

/// Plan drone delivery flights for one day of orders
///
/// Fetches orders, restaurants, no-fly zones and the central area from the
/// REST service, validates each order, plans a round trip from the depot to
/// the restaurant for every valid one, and writes deliveries, flight path and
/// GeoJSON files.
///
/// Examples:
///   dronepath https://ilp-rest.example.org 2023-09-01
///   dronepath https://ilp-rest.example.org 2023-09-01 -o results --verbose
#[derive(Parser, Debug)]
#[command(name = "dronepath")]
#[command(version, about, long_about = None)]
struct Args {
    /// Base URL of the REST service
    api_url: String,

    /// Date to fetch orders for (YYYY-MM-DD)
    date: NaiveDate,

    /// Path to config file (optional, auto-searches dronepath.toml if not provided)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory for result files (defaults to resultfiles)
    #[arg(short = 'o', long)]
    output_dir: Option<PathBuf>,

    /// Maximum nodes expanded per path search
    #[arg(long)]
    max_iterations: Option<usize>,

    /// Enable verbose logging
    #[arg(short = 'v', long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let total_start = Instant::now();

    let (config_path, file_config) = match args.config {
        Some(ref path) => (Some(path.clone()), FileConfig::from_path(path)?),
        None => match FileConfig::load() {
            Some((path, config)) => (Some(path), config),
            None => (None, FileConfig::default()),
        },
    };

    let verbose = args.verbose || file_config.verbose;
    init_logging(verbose);

    if let Some(path) = config_path {
        info!("Loaded config from {}", path.display());
    }

    let output_dir = args
        .output_dir
        .clone()
        .unwrap_or_else(|| file_config.output_dir.clone());
    let mut search_config = file_config.search.clone();
    if let Some(max_iterations) = args.max_iterations {
        search_config.max_iterations = max_iterations;
    }
    let depot = file_config
        .depot
        .validated()
        .context("Invalid depot coordinate in config")?;

    if verbose {
        println!("Configuration:");
        println!("  API: {}", args.api_url);
        println!("  Date: {}", args.date);
        println!("  Depot: ({}, {})", depot.lng, depot.lat);
        println!("  Max search iterations: {}", search_config.max_iterations);
        println!("  Output: {}", output_dir.display());
        println!();
    }

    let client = RestClient::new(&args.api_url, &file_config.rest)?;

    let spinner = create_spinner("Fetching data from REST service...");
    let start = Instant::now();
    let mut orders = client.fetch_orders(args.date)?;
    let restaurants = client.fetch_restaurants()?;
    let no_fly_zones = client.fetch_no_fly_zones()?;
    let central_area = client.fetch_central_area()?;
    spinner.finish_with_message(format!(
        "Fetched {} orders, {} restaurants, {} no-fly zones [{:.1}s]",
        orders.len(),
        restaurants.len(),
        no_fly_zones.len(),
        start.elapsed().as_secs_f32()
    ));

    for region in no_fly_zones.iter().chain(std::iter::once(&central_area)) {
        region
            .validate()
            .with_context(|| format!("Region {:?} from REST service is invalid", region.name))?;
    }

    let spinner = create_spinner("Planning flights...");
    let start = Instant::now();
    let mut flight_moves: Vec<MoveRecord> = Vec::new();
    let mut flight_points: Vec<Coordinate> = Vec::new();
    let mut delivered = 0;

    for order in orders.iter_mut() {
        let code = validate_order(order, &restaurants);
        if !order.is_valid_but_not_delivered() {
            debug!("Order {} is invalid: {:?}", order.order_no, code);
            continue;
        }

        let Some(restaurant) = find_restaurant_for(order, &restaurants) else {
            warn!("No restaurant found for order {}, skipping", order.order_no);
            continue;
        };

        spinner.set_message(format!("Planning flight for order {}...", order.order_no));
        match plan_delivery(
            &order.order_no,
            depot,
            restaurant.location,
            &no_fly_zones,
            &central_area,
            &search_config,
        ) {
            Ok(moves) => {
                order.order_status = OrderStatus::Delivered;
                flight_points.extend(waypoints(depot, &moves));
                flight_moves.extend(moves);
                delivered += 1;
            }
            Err(e) if e.is_no_path() => {
                warn!(
                    "No path found for order {} to {} ({}), skipping",
                    order.order_no, restaurant.name, e
                );
            }
            Err(e) => {
                warn!(
                    "Failed to plan flight for order {}: {}, skipping",
                    order.order_no, e
                );
            }
        }
    }

    spinner.finish_with_message(format!(
        "Delivered {} of {} orders in {} moves [{:.1}s]",
        delivered,
        orders.len(),
        flight_moves.len(),
        start.elapsed().as_secs_f32()
    ));

    let spinner = create_spinner("Writing result files...");
    let writer = OutputWriter::new(&output_dir, args.date)?;
    let deliveries_path = writer.write_deliveries(&orders)?;
    let flightpath_path = writer.write_flightpath(&flight_moves)?;
    let geojson_path = writer.write_geojson(&flight_points)?;
    spinner.finish_with_message("Wrote result files");

    println!();
    println!(
        "Done! Total time: {:.1}s",
        total_start.elapsed().as_secs_f32()
    );
    println!();
    println!("Output:");
    println!("  {}", deliveries_path.display());
    println!("  {}", flightpath_path.display());
    println!("  {}", geojson_path.display());

    Ok(())
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(80));
    pb
}
