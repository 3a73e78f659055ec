use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use std::path::{Path, PathBuf};
use tabled::{settings::Style, Table, Tabled};

use routepace::export::text::format_duration;
use routepace::{
    build_route, export_result, init_logging, optimize, summarize, AppConfig, ExportFormat,
    ImportManager, OptimizationResult, RiderEnvironmentParams, RoutePaceError,
};

/// RoutePace - Power Pacing Planner CLI
///
/// Splits a GPS track into segments and plans a target power for each one
/// from terrain, wind and the rider's W′ reserve.
#[derive(Parser)]
#[command(name = "routepace")]
#[command(author = "RoutePace Contributors")]
#[command(version = "0.1.0")]
#[command(about = "Power Pacing Planner CLI", long_about = None)]
struct Cli {
    /// Sets a custom config file
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Increase verbosity of output
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Per-run overrides of the configured rider and weather values
#[derive(clap::Args, Debug, Default)]
struct RiderOverrides {
    /// Functional Threshold Power (watts)
    #[arg(long)]
    ftp: Option<f64>,

    /// Rider plus bike mass (kg)
    #[arg(long)]
    mass: Option<f64>,

    /// Drag area (m²)
    #[arg(long)]
    cda: Option<f64>,

    /// Rolling resistance coefficient
    #[arg(long)]
    crr: Option<f64>,

    /// Anaerobic work capacity (joules)
    #[arg(long = "w-prime")]
    w_prime: Option<f64>,

    /// Wind speed (m/s)
    #[arg(long = "wind-speed")]
    wind_speed: Option<f64>,

    /// Direction the wind blows from (degrees)
    #[arg(long = "wind-direction")]
    wind_direction: Option<f64>,

    /// Target intensity as a percentage of FTP
    #[arg(short, long)]
    intensity: Option<f64>,
}

impl RiderOverrides {
    fn apply(&self, mut params: RiderEnvironmentParams) -> RiderEnvironmentParams {
        if let Some(ftp) = self.ftp {
            params.ftp = ftp;
        }
        if let Some(mass) = self.mass {
            params.total_mass = mass;
        }
        if let Some(cda) = self.cda {
            params.cda = cda;
        }
        if let Some(crr) = self.crr {
            params.crr = crr;
        }
        if let Some(w_prime) = self.w_prime {
            params.w_prime = w_prime;
        }
        if let Some(wind_speed) = self.wind_speed {
            params.wind_speed = wind_speed;
        }
        if let Some(wind_direction) = self.wind_direction {
            params.wind_direction = wind_direction;
        }
        if let Some(intensity) = self.intensity {
            params.target_intensity = intensity;
        }
        params
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Plan segment-by-segment target power for a track
    Plan {
        /// Input track file (GPX, CSV)
        #[arg(short, long)]
        file: PathBuf,

        #[command(flatten)]
        rider: RiderOverrides,

        /// Target segment length in meters
        #[arg(short = 's', long = "segment-length")]
        segment_length: Option<f64>,

        /// Write the plan to this file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Export format (csv, json, text); guessed from the output extension if omitted
        #[arg(short = 'F', long)]
        format: Option<String>,

        /// Number of segments to show in the terminal
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Show the segmented shape of a track without planning power
    Route {
        /// Input track file (GPX, CSV)
        #[arg(short, long)]
        file: PathBuf,

        /// Target segment length in meters
        #[arg(short = 's', long = "segment-length")]
        segment_length: Option<f64>,
    },

    /// Configure application settings
    Config {
        /// Write a default configuration file
        #[arg(long)]
        init: bool,

        /// Print the effective configuration
        #[arg(long)]
        show: bool,
    },
}

#[derive(Tabled)]
struct SegmentRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "km")]
    distance: String,
    #[tabled(rename = "grade %")]
    gradient: String,
    #[tabled(rename = "wind m/s")]
    headwind: String,
    #[tabled(rename = "target W")]
    target: String,
    #[tabled(rename = "plan W")]
    power: String,
    #[tabled(rename = "W' bal J")]
    w_balance: String,
    #[tabled(rename = "km/h")]
    speed: String,
    #[tabled(rename = "elapsed")]
    elapsed: String,
}

fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        match err.downcast_ref::<RoutePaceError>() {
            Some(pace_error) => {
                tracing::error!(error = %pace_error, severity = ?pace_error.severity(), "Command failed");
                eprintln!("{} {}", "Error:".red().bold(), pace_error.user_message());
            }
            None => eprintln!("{} {:#}", "Error:".red().bold(), err),
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    // --init has to run before loading, since the file may not exist yet
    if let Commands::Config { init: true, .. } = cli.command {
        let path = cli
            .config
            .clone()
            .unwrap_or_else(AppConfig::default_config_path);

        if AppConfig::init_file(&path)? {
            println!("{}", format!("✓ Configuration written to {}", path.display()).green());
        } else {
            println!(
                "{}",
                format!("Configuration already exists at {}", path.display()).yellow()
            );
        }
    }

    let config = AppConfig::load(cli.config.as_deref())?;

    let mut log_config = config.logging.clone();
    log_config.level = log_config.level.raised_by(cli.verbose);
    init_logging(&log_config).context("Failed to initialize logging")?;

    if cli.verbose > 0 {
        eprintln!("{}", format!("Log level: {:?}", log_config.level).dimmed());
    }

    match cli.command {
        Commands::Plan {
            file,
            rider,
            segment_length,
            output,
            format,
            limit,
        } => {
            let params = rider.apply(config.rider_params());
            let segment_length = segment_length.unwrap_or(config.route.segment_length);

            println!("{}", "Planning pacing...".green().bold());
            println!("  File: {:?}", file);

            let points = ImportManager::new().import_file(&file)?;
            let segments = build_route(&points, segment_length)?;
            let result = optimize(&segments, &params)?;

            print_plan(&result, &params, limit);

            if let Some(output) = output {
                let format = resolve_format(format.as_deref(), &output)?;
                export_result(&result, format, &output)?;
                println!("{}", format!("✓ Plan written to {}", output.display()).green());
            }
        }

        Commands::Route {
            file,
            segment_length,
        } => {
            let segment_length = segment_length.unwrap_or(config.route.segment_length);

            println!("{}", "Segmenting route...".cyan().bold());
            let points = ImportManager::new().import_file(&file)?;
            let segments = build_route(&points, segment_length)?;
            let summary = summarize(&segments);

            println!("  Track points: {}", points.len());
            println!("  Segments: {}", summary.segment_count);
            println!("  Distance: {:.2} km", summary.total_distance_m / 1000.0);
            println!("  Ascent: {:.0} m", summary.total_ascent_m);
            println!("  Descent: {:.0} m", summary.total_descent_m);
            println!(
                "  Gradient range: {:.1}% to {:.1}%",
                summary.min_gradient * 100.0,
                summary.max_gradient * 100.0
            );
        }

        Commands::Config { init, show } => {
            if show || !init {
                let rendered = toml::to_string_pretty(&config)
                    .context("Failed to serialize configuration")?;
                println!("{}", rendered);
            }
        }
    }

    Ok(())
}

fn resolve_format(requested: Option<&str>, output: &Path) -> Result<ExportFormat> {
    match requested {
        Some(name) => Ok(name.parse()?),
        None => Ok(ExportFormat::from_path(output).unwrap_or(ExportFormat::Json)),
    }
}

fn print_plan(result: &OptimizationResult, params: &RiderEnvironmentParams, limit: usize) {
    let metrics = &result.metrics;

    println!();
    println!(
        "{}",
        format!(
            "FTP {:.0} W at {:.0}% (base {:.0} W), W′ {:.0} J",
            params.ftp,
            params.target_intensity,
            params.base_power(),
            params.w_prime
        )
        .bold()
    );

    let rows: Vec<SegmentRow> = result
        .segments
        .iter()
        .take(limit)
        .enumerate()
        .map(|(index, planned)| SegmentRow {
            index: index + 1,
            distance: format!("{:.2}", planned.segment.cumulative_distance / 1000.0),
            gradient: format!("{:.1}", planned.segment.gradient_percent()),
            headwind: format!("{:.1}", planned.headwind),
            target: format!("{:.0}", planned.target_power),
            power: if planned.overridden {
                format!("{:.0} *", planned.optimized_power)
            } else {
                format!("{:.0}", planned.optimized_power)
            },
            w_balance: format!("{:.0}", planned.w_balance),
            speed: format!("{:.1}", planned.speed * 3.6),
            elapsed: format_duration(planned.elapsed_time),
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{}", table);

    if result.segments.len() > limit {
        println!(
            "{}",
            format!("  ... {} more segments", result.segments.len() - limit).dimmed()
        );
    }

    println!();
    println!("  Distance: {:.2} km", metrics.total_distance_km);
    println!("  Time: {}", format_duration(metrics.total_time));
    println!("  Avg speed: {:.1} km/h", metrics.avg_speed);
    println!(
        "  Power: avg {:.0} W, NP {:.0} W, IF {:.2}, VI {:.2}",
        metrics.avg_power,
        metrics.normalized_power,
        metrics.intensity_factor,
        metrics.variability_index
    );
    println!(
        "  TSS: {:.0}, work {:.0} kJ",
        metrics.training_stress_score, metrics.total_work_kj
    );

    let reserve = format!(
        "  Lowest W′: {:.0} J ({:.0}%)",
        metrics.min_w_balance, metrics.w_prime_percent
    );
    if metrics.w_prime_percent < 25.0 {
        println!("{}", reserve.red());
    } else {
        println!("{}", reserve.green());
    }

    if metrics.overridden_segments > 0 {
        println!(
            "{}",
            format!(
                "  {} segment(s) held at base power (*) to protect W′",
                metrics.overridden_segments
            )
            .yellow()
        );
    }
}
