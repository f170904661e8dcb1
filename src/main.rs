use unisim::{bench_gravity, bench_tick};
use unisim::{BodySnapshot, EnergyReport, Scenario, ScenarioConfig, SystemEvent};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::info;
use serde::Serialize;

use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "unisim", about = "Run physical universe-simulation scenarios")]
struct Args {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load a scenario, advance it and print the final state
    Run {
        /// Scenario file; bare names are looked up in ./scenarios
        #[arg(short, default_value = "sun_earth_moon.yaml")]
        file_name: String,

        /// Override the number of steps from the scenario
        #[arg(long)]
        steps: Option<usize>,

        /// Override the step size (seconds)
        #[arg(long)]
        dt: Option<f64>,

        /// How many recent events to include
        #[arg(long, default_value_t = 20)]
        events: usize,

        #[arg(long, value_enum, default_value_t = Format::Json)]
        format: Format,
    },
    /// Time the O(n^2) gravity / collision passes and full ticks
    Bench {
        /// Body counts to measure
        #[arg(long, value_delimiter = ',', default_values_t = vec![100, 200, 400, 800, 1600])]
        n: Vec<usize>,

        /// Ticks averaged per body count
        #[arg(long, default_value_t = 5)]
        steps: usize,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Format {
    Json,
    Yaml,
}

#[derive(Serialize)]
struct Report {
    system: String,
    age: f64,
    ticks: usize,
    propagation: String,
    energy: EnergyReport,
    center_of_mass: [f64; 3],
    bodies: BTreeMap<String, BodySnapshot>,
    events: Vec<SystemEvent>,
}

// resolve here to keep main clean
fn resolve_scenario_path(file_name: &str) -> PathBuf {
    let direct = PathBuf::from(file_name);
    if direct.exists() {
        return direct;
    }
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenarios").join(file_name)
}

fn run(file_name: &str, steps: Option<usize>, dt: Option<f64>, events: usize, format: Format) -> Result<()> {
    let path = resolve_scenario_path(file_name);
    let cfg = ScenarioConfig::from_path(&path)
        .with_context(|| format!("failed to load scenario {}", path.display()))?;

    let mut scenario = Scenario::build_scenario(cfg).context("failed to build scenario")?;
    if let Some(steps) = steps {
        scenario.run.steps = steps;
    }
    if dt.is_some() {
        scenario.run.delta_time = dt;
    }

    let ticks = scenario.run();
    info!("advanced {} ticks, system age {:.3} s", ticks, scenario.system.age());

    let system = &scenario.system;
    let com = system.center_of_mass();
    let report = Report {
        system: system.name().to_string(),
        age: system.age(),
        ticks,
        propagation: system.propagation_mode().to_string(),
        energy: system.total_energy(),
        center_of_mass: [com.x, com.y, com.z],
        bodies: system.snapshot_state(),
        events: system.recent_events(Some(events)),
    };

    let text = match format {
        Format::Json => serde_json::to_string_pretty(&report)?,
        Format::Yaml => serde_yaml::to_string(&report)?,
    };
    println!("{text}");
    Ok(())
}

fn bench(ns: &[usize], steps: usize) {
    println!("N,gravity_ms,collisions_ms");
    for s in bench_gravity(ns) {
        println!("{},{:.6},{:.6}", s.n, s.gravity_ms, s.collisions_ms);
    }
    println!();
    println!("N,steps,tick_ms");
    for s in bench_tick(ns, steps) {
        println!("{},{},{:.6}", s.n, s.steps, s.tick_ms);
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = match args.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match args.command {
        Command::Run {
            file_name,
            steps,
            dt,
            events,
            format,
        } => run(&file_name, steps, dt, events, format)?,
        Command::Bench { n, steps } => bench(&n, steps),
    }

    Ok(())
}
