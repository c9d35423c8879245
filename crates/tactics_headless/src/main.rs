//! Headless tactics runner.
//!
//! Plays scenarios without graphics and prints JSON reports on stdout.
//! Logs go to stderr.
//!
//! # Usage
//!
//! ```bash
//! # Play a scenario with the autopilot
//! cargo run -p tactics_headless -- run --scenario data/scenarios/mage_vs_dragon.ron
//!
//! # Override the seed and write the report to a file
//! cargo run -p tactics_headless -- run --scenario data/scenarios/gauntlet.ron --seed 7 --output report.json
//!
//! # Show a path on a scenario map
//! cargo run -p tactics_headless -- path --scenario data/scenarios/gauntlet.ron --from 0,0 --to 9,4
//!
//! # Same path with isometric screen positions for 128px tiles
//! cargo run -p tactics_headless -- path --scenario data/scenarios/gauntlet.ron --from 0,0 --to 9,4 --tile-width 128
//!
//! # Save a scenario map as a named layout
//! cargo run -p tactics_headless -- layout save --scenario data/scenarios/gauntlet.ron --name gauntlet
//! ```

use std::error::Error;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use tactics_core::grid::GridPos;
use tactics_core::iso::IsoProjection;
use tactics_core::layout::LayoutStore;
use tactics_core::pathfinding::{find_path_with, Heuristic};
use tactics_headless::{load_profiles, AutoBattleRunner, DirectoryLayoutStore, RunnerConfig, Scenario};

type CliResult = Result<(), Box<dyn Error>>;

#[derive(Parser)]
#[command(name = "tactics_headless")]
#[command(about = "Headless tactics runner for scenario testing and CI")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Profile file (defaults to the built-in roster)
    #[arg(long, global = true)]
    profiles: Option<PathBuf>,

    /// Directory holding named layouts
    #[arg(long, global = true, default_value = "data/layouts")]
    layouts: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a scenario with the autopilot and print the report
    Run {
        /// Scenario file to load
        #[arg(short, long)]
        scenario: PathBuf,

        /// Override the scenario's combat seed
        #[arg(long)]
        seed: Option<u64>,

        /// Simulation time per step in milliseconds
        #[arg(long, default_value = "250")]
        step_ms: u64,

        /// Give up after this many minutes of simulation time
        #[arg(long, default_value = "30")]
        max_minutes: u64,

        /// Write the report here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List the loaded class and species profiles
    Profiles,

    /// Find a path on a scenario map
    Path {
        /// Scenario file providing the map
        #[arg(short, long)]
        scenario: PathBuf,

        /// Start tile as `x,y`
        #[arg(long, value_parser = parse_pos, allow_hyphen_values = true)]
        from: GridPos,

        /// Goal tile as `x,y`
        #[arg(long, value_parser = parse_pos, allow_hyphen_values = true)]
        to: GridPos,

        /// Distance estimate for the search
        #[arg(long, value_enum, default_value = "manhattan")]
        heuristic: HeuristicArg,

        /// Also print isometric screen positions for this tile width
        #[arg(long)]
        tile_width: Option<f32>,
    },

    /// Manage stored layouts
    Layout {
        #[command(subcommand)]
        action: LayoutAction,
    },
}

#[derive(Subcommand)]
enum LayoutAction {
    /// Save a scenario's map under a name
    Save {
        /// Scenario file providing the map
        #[arg(short, long)]
        scenario: PathBuf,

        /// Layout name
        #[arg(short, long)]
        name: String,
    },
    /// List stored layouts
    List,
    /// Delete a stored layout
    Delete {
        /// Layout name
        name: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum HeuristicArg {
    Manhattan,
    Chebyshev,
}

impl From<HeuristicArg> for Heuristic {
    fn from(arg: HeuristicArg) -> Self {
        match arg {
            HeuristicArg::Manhattan => Self::Manhattan,
            HeuristicArg::Chebyshev => Self::Chebyshev,
        }
    }
}

fn parse_pos(value: &str) -> Result<GridPos, String> {
    let (x, y) = value
        .split_once(',')
        .ok_or_else(|| format!("expected x,y but got '{value}'"))?;
    let x = x.trim().parse().map_err(|e| format!("bad x '{x}': {e}"))?;
    let y = y.trim().parse().map_err(|e| format!("bad y '{y}': {e}"))?;
    Ok(GridPos::new(x, y))
}

fn main() {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries the JSON output.
    let default_filter = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .with(filter)
        .init();

    let profiles = cli.profiles.as_deref();
    let mut store = DirectoryLayoutStore::new(cli.layouts);

    let result = match cli.command {
        Commands::Run {
            scenario,
            seed,
            step_ms,
            max_minutes,
            output,
        } => cmd_run(
            &scenario,
            profiles,
            &store,
            seed,
            RunnerConfig {
                step_ms,
                max_time_ms: max_minutes * 60 * 1000,
            },
            output.as_deref(),
        ),
        Commands::Profiles => cmd_profiles(profiles),
        Commands::Path {
            scenario,
            from,
            to,
            heuristic,
            tile_width,
        } => cmd_path(&scenario, &store, from, to, heuristic.into(), tile_width),
        Commands::Layout { action } => cmd_layout(action, &mut store),
    };

    if let Err(e) = result {
        tracing::error!(error = %e, "Command failed");
        eprintln!("FATAL: {e}");
        std::process::exit(1);
    }
}

/// Play a scenario and print the report.
fn cmd_run(
    scenario_path: &Path,
    profiles: Option<&Path>,
    store: &DirectoryLayoutStore,
    seed: Option<u64>,
    config: RunnerConfig,
    output: Option<&Path>,
) -> CliResult {
    let mut scenario = Scenario::load(scenario_path)?;
    if let Some(seed) = seed {
        scenario.combat.rng_seed = seed;
    }
    let profiles = load_profiles(profiles)?;
    let world = scenario.build_world(&profiles, store)?;

    tracing::info!(
        scenario = %scenario.name,
        seed = scenario.combat.rng_seed,
        step_ms = config.step_ms,
        "Run configuration"
    );

    let report = AutoBattleRunner::new(&scenario.name, world, scenario.combat, config).run();

    tracing::info!(
        survived = report.survived,
        victories = report.victories(),
        experience = report.total_experience(),
        elapsed_ms = report.elapsed_ms,
        "Run complete"
    );

    let json = serde_json::to_string_pretty(&report)?;
    match output {
        Some(path) => {
            std::fs::write(path, json)?;
            tracing::info!(path = %path.display(), "Report written");
        }
        None => println!("{json}"),
    }
    Ok(())
}

/// Print the loaded profiles.
fn cmd_profiles(profiles: Option<&Path>) -> CliResult {
    let profiles = load_profiles(profiles)?;
    println!(
        "{:<10} {:<8} {:>4} {:>3} {:>3}  spells",
        "id", "role", "hp", "ap", "mp"
    );
    for profile in &profiles.profiles {
        let spells: Vec<&str> = profile.spells.iter().map(|s| s.name.as_str()).collect();
        println!(
            "{:<10} {:<8} {:>4} {:>3} {:>3}  {}",
            profile.id,
            format!("{:?}", profile.role),
            profile.max_health,
            profile.max_ap,
            profile.max_mp,
            spells.join(", ")
        );
    }
    Ok(())
}

/// Print a path as JSON.
fn cmd_path(
    scenario_path: &Path,
    store: &DirectoryLayoutStore,
    from: GridPos,
    to: GridPos,
    heuristic: Heuristic,
    tile_width: Option<f32>,
) -> CliResult {
    let scenario = Scenario::load(scenario_path)?;
    let grid = scenario.build_grid(store)?;
    let path = find_path_with(&grid, from, to, heuristic);
    match &path {
        Some(path) => tracing::info!(steps = path.len().saturating_sub(1), "Path found"),
        None => tracing::warn!(?from, ?to, "No path"),
    }
    match (tile_width, &path) {
        (Some(width), Some(path)) => {
            let iso = IsoProjection::new(width, 0.0, 0.0);
            let screen: Vec<(GridPos, (f32, f32))> = path
                .iter()
                .map(|&tile| (tile, iso.to_screen(tile.x as f32, tile.y as f32)))
                .collect();
            println!("{}", serde_json::to_string(&screen)?);
        }
        _ => println!("{}", serde_json::to_string(&path)?),
    }
    Ok(())
}

/// Save, list or delete stored layouts.
fn cmd_layout(action: LayoutAction, store: &mut DirectoryLayoutStore) -> CliResult {
    match action {
        LayoutAction::Save { scenario, name } => {
            let scenario = Scenario::load(scenario)?;
            let grid = scenario.build_grid(&*store)?;
            grid.save_layout(store, &name)?;
            tracing::info!(name = %name, root = %store.root().display(), "Layout saved");
        }
        LayoutAction::List => {
            for name in store.names()? {
                println!("{name}");
            }
        }
        LayoutAction::Delete { name } => {
            if !store.delete(&name)? {
                tracing::warn!(name = %name, "No such layout");
            }
        }
    }
    Ok(())
}
