use verlet_engine::scene::Emitter;
use verlet_engine::{ScenarioConfig, Solver};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

mod visual;

#[derive(Parser, Debug)]
struct Args {
    /// Scenario file, looked up under scenarios/
    #[arg(short, long, default_value = "default.yaml")]
    file_name: String,

    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Subcommand, Debug)]
enum Mode {
    /// Open a window and pour bodies in (the default)
    Visual,
    /// Run a fixed number of ticks without a window and print a summary
    Headless {
        #[arg(long, default_value_t = 600)]
        ticks: u32,
    },
}

fn load_scenario(file_name: &str) -> Result<ScenarioConfig> {
    let config_path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("scenarios")
        .join(file_name);
    let file = File::open(&config_path)
        .with_context(|| format!("cannot open scenario {}", config_path.display()))?;
    let scenario = ScenarioConfig::from_reader(BufReader::new(file))
        .with_context(|| format!("cannot load scenario {}", config_path.display()))?;
    Ok(scenario)
}

fn run_headless(scenario: &ScenarioConfig, ticks: u32) -> Result<()> {
    let mut solver = Solver::from_config(&scenario.simulation)?;
    let mut emitter = Emitter::new(scenario.emitter.clone())?;

    let rate = (1.0 / solver.tick_dt()).round().max(1.0) as u32;
    for tick in 1..=ticks {
        emitter.step(&mut solver)?;
        if tick % rate == 0 {
            log::info!(
                "t={:.2}s bodies={} contacts={}",
                solver.time(),
                solver.objects_count(),
                solver.last_contact_count()
            );
        }
    }

    println!("Ticks: {}", ticks);
    println!("Simulated time: {:.3}s", solver.time());
    println!("Bodies: {}", solver.objects_count());
    println!("Deepest overlap: {:.4}", solver.max_overlap());
    println!("Worst boundary violation: {:.4}", solver.max_boundary_violation());
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let scenario = load_scenario(&args.file_name)?;
    log::info!("loaded scenario {}", args.file_name);

    match args.mode.unwrap_or(Mode::Visual) {
        Mode::Visual => {
            visual::run_visual(scenario).map_err(|e| anyhow::anyhow!("visual run failed: {}", e))
        }
        Mode::Headless { ticks } => run_headless(&scenario, ticks),
    }
}
