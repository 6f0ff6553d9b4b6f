//! tripsplit CLI - Split position reports into trips at stop points
//!
//! Usage:
//!   tripsplit-cli segment <input.csv> [--output <file>] [--derive-speed]
//!   tripsplit-cli kinematics <input.csv> [--output <file>]
//!
//! Input is a CSV table with a header row. Column names default to
//! `id,lon,lat,timestamp,speed` and can be overridden with flags. `segment`
//! writes every input column of the trip rows plus `trip_id` and `stop`.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tripsplit::{
    kinematics::{annotate_kinematics, SpeedUnit},
    trip_table, AtomicProgressTracker, ColumnNames, PointTable, SegmentationConfig,
    SegmentationResult,
};

#[derive(Parser)]
#[command(name = "tripsplit-cli")]
#[command(about = "Stop-point based trip segmentation for position reports", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose debug output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect stop points and write the segmented trips
    Segment {
        /// CSV file with position reports
        input: PathBuf,

        /// Output CSV file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// JSON file with segmentation thresholds
        #[arg(long)]
        config: Option<PathBuf>,

        /// Speed at or below which a point is a stop candidate
        #[arg(long)]
        speed_threshold: Option<f64>,

        /// Neighbourhood radius in kilometers
        #[arg(long)]
        distance_threshold: Option<f64>,

        /// Minimum time in seconds to confirm a stop
        #[arg(long)]
        time_threshold: Option<f64>,

        /// Emit the slow stretch after the last stop as a trip
        #[arg(long)]
        keep_slow_remainder: bool,

        /// Recompute the speed column from consecutive positions
        /// (always done when the input has no speed column)
        #[arg(long)]
        derive_speed: bool,

        /// Unit of the derived speed
        #[arg(long, value_enum, default_value = "kmh")]
        speed_unit: UnitArg,

        #[command(flatten)]
        columns: ColumnArgs,
    },

    /// Append dis_diff, time_diff, speed and bearing columns
    Kinematics {
        /// CSV file with position reports
        input: PathBuf,

        /// Output CSV file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Unit of the derived speed
        #[arg(long, value_enum, default_value = "kmh")]
        speed_unit: UnitArg,

        #[command(flatten)]
        columns: ColumnArgs,
    },
}

#[derive(Args)]
struct ColumnArgs {
    /// Column grouping rows into trajectories (e.g. MMSI)
    #[arg(long, default_value = "id")]
    identifier: String,

    #[arg(long, default_value = "lon")]
    lon_column: String,

    #[arg(long, default_value = "lat")]
    lat_column: String,

    #[arg(long, default_value = "timestamp")]
    timestamp_column: String,

    #[arg(long, default_value = "speed")]
    speed_column: String,
}

impl From<ColumnArgs> for ColumnNames {
    fn from(args: ColumnArgs) -> Self {
        ColumnNames {
            lon: args.lon_column,
            lat: args.lat_column,
            timestamp: args.timestamp_column,
            speed: args.speed_column,
            identifier: args.identifier,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum UnitArg {
    Kms,
    Kmh,
    Knots,
}

impl From<UnitArg> for SpeedUnit {
    fn from(unit: UnitArg) -> Self {
        match unit {
            UnitArg::Kms => SpeedUnit::KilometersPerSecond,
            UnitArg::Kmh => SpeedUnit::KilometersPerHour,
            UnitArg::Knots => SpeedUnit::Knots,
        }
    }
}

fn main() {
    // Initialize logging
    let default_filter = if std::env::args().any(|a| a == "-v" || a == "--verbose") {
        "debug"
    } else {
        "info"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format(|buf, record| writeln!(buf, "[{:5}] {}", record.level(), record.args()))
        .init();

    let cli = Cli::parse();

    let outcome = match cli.command {
        Commands::Segment {
            input,
            output,
            config,
            speed_threshold,
            distance_threshold,
            time_threshold,
            keep_slow_remainder,
            derive_speed,
            speed_unit,
            columns,
        } => load_config(config.as_deref()).and_then(|mut seg_config| {
            if let Some(v) = speed_threshold {
                seg_config.speed_threshold = v;
            }
            if let Some(v) = distance_threshold {
                seg_config.distance_threshold = v;
            }
            if let Some(v) = time_threshold {
                seg_config.time_threshold = v;
            }
            seg_config.keep_slow_remainder |= keep_slow_remainder;

            run_segment(
                &input,
                output.as_deref(),
                &seg_config,
                &ColumnNames::from(columns),
                derive_speed,
                speed_unit.into(),
                cli.verbose,
            )
        }),
        Commands::Kinematics {
            input,
            output,
            speed_unit,
            columns,
        } => run_kinematics(
            &input,
            output.as_deref(),
            &ColumnNames::from(columns),
            speed_unit.into(),
        ),
    };

    if let Err(e) = outcome {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Load thresholds from a JSON file, or use the defaults
fn load_config(path: Option<&Path>) -> Result<SegmentationConfig, String> {
    let Some(path) = path else {
        return Ok(SegmentationConfig::default());
    };
    let content = fs::read_to_string(path).map_err(|e| format!("{}: {}", path.display(), e))?;
    serde_json::from_str(&content).map_err(|e| format!("{}: {}", path.display(), e))
}

fn open_output(output: Option<&Path>) -> Result<Box<dyn Write>, String> {
    match output {
        Some(path) => {
            let file = File::create(path).map_err(|e| format!("{}: {}", path.display(), e))?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(io::stdout().lock())),
    }
}

/// Run stop detection and write the source rows of every trip
fn run_segment(
    input: &Path,
    output: Option<&Path>,
    config: &SegmentationConfig,
    columns: &ColumnNames,
    derive_speed: bool,
    speed_unit: SpeedUnit,
    verbose: bool,
) -> Result<(), String> {
    eprintln!("\n{}", "=".repeat(60));
    eprintln!("Loading positions from: {}", input.display());
    eprintln!("{}", "=".repeat(60));

    let mut table = PointTable::from_csv_path(input).map_err(|e| e.to_string())?;
    eprintln!("  Loaded {} rows", table.len());

    if derive_speed || !table.has_column(&columns.speed) {
        annotate_kinematics(&mut table, columns, speed_unit).map_err(|e| e.to_string())?;
        eprintln!("  Derived '{}' column from consecutive positions", columns.speed);
    }

    let records = table.to_records(columns).map_err(|e| e.to_string())?;

    eprintln!(
        "\nThresholds: speed <= {}, distance <= {} km, time >= {} s",
        config.speed_threshold, config.distance_threshold, config.time_threshold
    );

    let progress = std::sync::Arc::new(AtomicProgressTracker::new());
    let result =
        run_with_progress(&records, config, progress.clone()).map_err(|e| e.to_string())?;

    if verbose {
        if let Some(phase) = progress.phase() {
            eprintln!(
                "  Finished phase '{}' ({}/{} trajectories)",
                phase.as_str(),
                progress.completed(),
                progress.total()
            );
        }
        for trip in &result.trips {
            eprintln!(
                "  Trip {} ({}): indices {:?}..={:?}, {} points{}",
                trip.trip_id,
                trip.object_id,
                trip.start_index(),
                trip.end_index(),
                trip.len(),
                if trip.stop_point().is_some() { ", ends at stop" } else { "" }
            );
        }
    }

    let rows = trip_table(&table, columns, &result).map_err(|e| e.to_string())?;
    rows.write_csv(open_output(output)?)
        .map_err(|e| e.to_string())?;
    print_summary(&result);
    Ok(())
}

#[cfg(feature = "parallel")]
fn run_with_progress(
    records: &[tripsplit::PositionRecord],
    config: &SegmentationConfig,
    progress: std::sync::Arc<AtomicProgressTracker>,
) -> tripsplit::Result<SegmentationResult> {
    tripsplit::segment_records_parallel(records, config, progress)
}

#[cfg(not(feature = "parallel"))]
fn run_with_progress(
    records: &[tripsplit::PositionRecord],
    config: &SegmentationConfig,
    progress: std::sync::Arc<AtomicProgressTracker>,
) -> tripsplit::Result<SegmentationResult> {
    tripsplit::segment_records_with_progress(records, config, progress)
}

fn print_summary(result: &SegmentationResult) {
    let stats = &result.stats;
    eprintln!("\n{}", "=".repeat(60));
    eprintln!("SUMMARY");
    eprintln!("{}", "=".repeat(60));
    eprintln!("  Trajectories:        {}", stats.trajectories);
    eprintln!("  With stop points:    {}", stats.trajectories_with_stops);
    eprintln!("  Stop points:         {}", stats.stop_points);
    eprintln!("  Trips:               {}", stats.trips);
    eprintln!("  Rows written:        {}", stats.rows);
}

/// Append row-pairwise kinematics to the table and write it back out
fn run_kinematics(
    input: &Path,
    output: Option<&Path>,
    columns: &ColumnNames,
    unit: SpeedUnit,
) -> Result<(), String> {
    let mut table = PointTable::from_csv_path(input).map_err(|e| e.to_string())?;
    annotate_kinematics(&mut table, columns, unit).map_err(|e| e.to_string())?;
    table
        .write_csv(open_output(output)?)
        .map_err(|e| e.to_string())?;
    eprintln!("Wrote {} rows with kinematics", table.len());
    Ok(())
}
