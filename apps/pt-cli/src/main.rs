mod error;

use clap::{Parser, Subcommand};
use error::{CliError, CliResult};
use pt_components::{CombustionEngine, ManualDrivetrain, SampleBank};
use pt_core::mph_to_kph;
use pt_project::Configuration;
use pt_sim::{
    DrivetrainModel, EngineModel, LoadInertia, SessionOptions, SessionRecord, StepperOptions,
    SubstepClock, Vehicle, VehicleBody, run_session,
};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

type Car = Vehicle<CombustionEngine, ManualDrivetrain, SampleBank>;

/// Minimum time between automatic upshifts (seconds).
const SHIFT_HOLDOFF_S: f64 = 0.5;

#[derive(Parser)]
#[command(name = "pt-cli")]
#[command(about = "Powertrain CLI - headless engine and drivetrain simulation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a vehicle configuration file
    Validate {
        /// Path to the configuration YAML/JSON file
        config_path: PathBuf,
    },
    /// Print the load inertia the engine feels in every gear
    Inertia {
        /// Path to the configuration YAML/JSON file
        config_path: PathBuf,
    },
    /// Drive the vehicle with a fixed throttle and automatic upshifts
    Run(RunArgs),
}

#[derive(clap::Args)]
struct RunArgs {
    /// Path to the configuration YAML/JSON file
    config_path: PathBuf,
    /// Frame duration in seconds
    #[arg(long, default_value_t = 1.0 / 60.0)]
    dt: f64,
    /// Session length in seconds
    #[arg(long, default_value_t = 10.0)]
    t_end: f64,
    /// Throttle position in [0, 1]
    #[arg(long, default_value_t = 0.6)]
    throttle: f64,
    /// Engine speed that triggers an upshift
    #[arg(long, default_value_t = 5500.0)]
    shift_rpm: f64,
    /// Gear to start in (0 = neutral)
    #[arg(long, default_value_t = 1)]
    start_gear: u32,
    /// Sub-steps per frame
    #[arg(long, default_value_t = pt_sim::SUB_STEPS)]
    sub_steps: usize,
    /// Advance engine time by sub-step instead of by frame
    #[arg(long)]
    substep_clock: bool,
    /// Gain on the load inertia fed back into the engine
    #[arg(long, default_value_t = 0.0)]
    load_inertia_gain: f64,
    /// Print the dashboard every N frames
    #[arg(long, default_value_t = 30)]
    print_every: usize,
    /// Skip loading engine sounds
    #[arg(long)]
    no_audio: bool,
    /// Log wall-clock frame timing
    #[arg(long)]
    timing: bool,
    /// Write every frame to a CSV file
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { config_path } => cmd_validate(&config_path),
        Commands::Inertia { config_path } => cmd_inertia(&config_path),
        Commands::Run(args) => cmd_run(args).await,
    }
}

fn cmd_validate(config_path: &Path) -> CliResult<()> {
    println!("Validating configuration: {}", config_path.display());
    let config = pt_project::load(config_path)?;
    println!(
        "✓ {} is valid ({} gears, {} samples)",
        config.name,
        config.drivetrain.gear_ratios.len(),
        config.sounds.samples.len()
    );
    Ok(())
}

fn cmd_inertia(config_path: &Path) -> CliResult<()> {
    let config = pt_project::load(config_path)?;
    let body = VehicleBody::from_def(&config.vehicle_or_default())?;
    let mut drivetrain = ManualDrivetrain::new(&config.drivetrain)?;

    println!(
        "Load inertia for {} (mass {} kg, wheel radius {} m)",
        config.name,
        body.mass(),
        body.wheel_radius()
    );
    println!(
        "{:>4} {:>8} {:>8} {:>12} {:>12} {:>12} {:>12}",
        "gear", "ratio", "total", "vehicle", "wheels", "driveline", "total kg·m²"
    );

    for gear in 0..=drivetrain.gear_count() as u32 {
        drivetrain.set_gear(gear)?;
        let load = LoadInertia::of(&body, &drivetrain);
        println!(
            "{:>4} {:>8.3} {:>8.3} {:>12.5} {:>12.5} {:>12.5} {:>12.5}",
            gear,
            drivetrain.gear_ratio(),
            drivetrain.total_gear_ratio(),
            load.vehicle,
            load.wheels,
            load.driveline,
            load.total()
        );
    }
    Ok(())
}

async fn cmd_run(args: RunArgs) -> CliResult<()> {
    if !(0.0..=1.0).contains(&args.throttle) {
        return Err(CliError::InvalidArg(format!(
            "throttle must be within [0, 1], got {}",
            args.throttle
        )));
    }
    if args.timing {
        pt_core::timing::enable_timing();
    }

    let config = pt_project::load(&args.config_path)?;
    let mut vehicle = build_vehicle(&config, &args)?;

    start_vehicle(&mut vehicle, &config, !args.no_audio).await?;

    vehicle.drivetrain_mut().set_gear(args.start_gear)?;
    if args.print_every > 0 {
        let every = args.print_every;
        let mut frame = 0usize;
        vehicle.set_dashboard(Some(Box::new(move |rpm: f64, mph: f64, gear: u32| {
            if frame % every == 0 {
                println!("{rpm:>7.0} rpm  {mph:>6.1} mph  gear {gear}");
            }
            frame += 1;
        })));
    }

    let opts = SessionOptions {
        dt: args.dt,
        t_end: args.t_end,
        ..SessionOptions::default()
    };
    println!(
        "Running {} for {} s at throttle {:.2} (dt = {} s)",
        config.name, args.t_end, args.throttle, args.dt
    );

    let timer = pt_core::timing::Timer::start("session");
    let throttle = args.throttle;
    let shift_rpm = args.shift_rpm;
    let mut last_shift = f64::NEG_INFINITY;
    let record = run_session(&mut vehicle, &opts, |v, t| {
        v.engine_mut().set_throttle(throttle);
        let gear = v.drivetrain().gear();
        if gear > 0 && v.engine().rpm() > shift_rpm && t - last_shift >= SHIFT_HOLDOFF_S {
            let next = v.drivetrain_mut().shift_up();
            if next != gear {
                last_shift = t;
                tracing::info!(t, from = gear, to = next, "upshift");
            }
        }
    })?;
    timer.stop_and_log();

    vehicle.release_audio();
    print_summary(&record);

    if let Some(path) = &args.output {
        write_csv(path, &record)?;
        println!("✓ Wrote {} frames to {}", record.len(), path.display());
    }
    Ok(())
}

fn build_vehicle(config: &Configuration, args: &RunArgs) -> CliResult<Car> {
    let body = VehicleBody::from_def(&config.vehicle_or_default())?;
    let options = StepperOptions {
        sub_steps: args.sub_steps,
        clock: if args.substep_clock {
            SubstepClock::SubstepStride
        } else {
            SubstepClock::FrameStride
        },
        load_inertia_gain: args.load_inertia_gain,
    };
    let vehicle = Vehicle::new(
        CombustionEngine::new(&config.engine)?,
        ManualDrivetrain::new(&config.drivetrain)?,
        body,
        options,
    )?;
    Ok(vehicle)
}

/// Configure engine and drivetrain from `config`, loading sounds unless
/// `with_audio` is false. A failed sound load leaves the physics running.
async fn start_vehicle(vehicle: &mut Car, config: &Configuration, with_audio: bool) -> CliResult<()> {
    if !with_audio {
        vehicle.configure(config)?;
        return Ok(());
    }
    match vehicle.init(config).await {
        Ok(()) => Ok(()),
        // Audio is only installed once both collaborators configured
        Err(e) if vehicle.audio().is_some() => {
            tracing::warn!(error = %e, "audio unavailable, running silently");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

fn print_summary(record: &SessionRecord) {
    let Some(last) = record.last() else {
        println!("No frames recorded");
        return;
    };
    println!("\n=== Session summary ===");
    println!("Frames recorded: {}", record.len());
    println!("Peak engine speed: {:.0} rpm", record.peak_rpm());
    println!(
        "Peak road speed: {:.1} mph ({:.1} km/h)",
        record.peak_speed_mph(),
        mph_to_kph(record.peak_speed_mph())
    );
    println!(
        "Final: {:.0} rpm, {:.1} mph, gear {}",
        last.rpm, last.speed_mph, last.gear
    );
}

fn write_csv(path: &Path, record: &SessionRecord) -> CliResult<()> {
    let mut csv = String::from("time_s,rpm,speed_mph,gear\n");
    for (t, frame) in record.t.iter().zip(&record.frames) {
        csv.push_str(&format!(
            "{},{},{},{}\n",
            t, frame.rpm, frame.speed_mph, frame.gear
        ));
    }
    std::fs::write(path, csv)?;
    Ok(())
}
