#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that drives the alien invasion simulation.

mod config;

use std::{fs::File, io::BufReader, path::PathBuf};

use alien_invasion_core::Event;
use alien_invasion_system_invasion::{Config, Invasion};
use alien_invasion_system_mapgen as mapgen;
use alien_invasion_world::{map_file, query, World};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, info, trace, warn};
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::FileConfig;

const SEPARATOR: &str = "-----------------------------------------------------------------";

#[derive(Debug, Parser)]
#[command(name = "alien-invasion")]
#[command(about = "Simulates an alien invasion of a map of cities", version)]
struct Cli {
    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Invade the cities described by a map file
    Run {
        /// Map file, one `City dir=Neighbor ...` declaration per line
        map: PathBuf,

        /// Number of aliens to drop into the world
        #[arg(value_parser = clap::value_parser!(u32).range(1..))]
        aliens: u32,

        /// Seed for the random source; a fresh seed is drawn when absent
        #[arg(long)]
        seed: Option<u64>,

        /// Successful moves after which an alien stops counting as progress
        #[arg(long)]
        move_limit: Option<u32>,

        /// TOML file providing `seed` and `move_limit`
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Print a random map with approximately the requested number of cities
    Generate {
        /// Number of cities to generate
        cities: u32,

        /// Seed for the random source; a fresh seed is drawn when absent
        #[arg(long)]
        seed: Option<u64>,
    },
}

/// Entry point for the alien invasion command-line interface.
fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Run {
            map,
            aliens,
            seed,
            move_limit,
            config,
        } => run_invasion(map, aliens, seed, move_limit, config),
        Commands::Generate { cities, seed } => generate_map(cities, seed),
    }
}

fn run_invasion(
    map: PathBuf,
    aliens: u32,
    seed: Option<u64>,
    move_limit: Option<u32>,
    config: Option<PathBuf>,
) -> Result<()> {
    let file_config = match config {
        Some(path) => FileConfig::load(&path)?,
        None => FileConfig::default(),
    };
    let settings = file_config.resolve(seed, move_limit, rand::random);
    let invasion_config = Config::new(aliens, settings.seed).with_move_limit(settings.move_limit);
    info!(
        seed = invasion_config.rng_seed(),
        move_limit = invasion_config.move_limit(),
        aliens = invasion_config.population(),
        "starting invasion"
    );

    let file = File::open(&map)
        .with_context(|| format!("failed to open map file {}", map.display()))?;
    let loaded = map_file::load(BufReader::new(file))
        .with_context(|| format!("failed to load map file {}", map.display()))?;
    if !loaded.diagnostics.is_empty() {
        warn!(
            diagnostics = loaded.diagnostics.len(),
            "map loaded with skipped directives"
        );
    }

    let mut world = loaded.world;
    let mut invasion = Invasion::new(&world, invasion_config)?;
    for event in invasion.landings() {
        report(&world, event);
    }

    let mut events = Vec::new();
    loop {
        events.clear();
        let more = invasion.step(&mut world, &mut events);
        for event in &events {
            report(&world, event);
        }
        if !more {
            break;
        }
    }
    info!(
        rounds = invasion.round(),
        survivors = invasion.population(),
        move_limit = invasion.move_limit(),
        "invasion over"
    );

    if query::is_fully_destroyed(&world) {
        println!(
            "\nUnfortunately, the world was totally destroyed by the aliens :(\n\nSee you in the heavens!"
        );
    } else {
        println!("\nSome cities survived the alien attack, let's celebrate!");
        println!("\nWorld map after the end of alien invasion:");
        println!("{SEPARATOR}");
        print!("{}", map_file::render(&world));
        println!("{SEPARATOR}");
    }

    Ok(())
}

fn generate_map(cities: u32, seed: Option<u64>) -> Result<()> {
    let config = mapgen::Config::new(cities, seed.unwrap_or_else(rand::random));
    info!(seed = config.rng_seed(), cities = config.cities(), "generating map");

    let declarations = mapgen::generate(config)?;
    print!("{}", mapgen::to_map_text(&declarations));
    Ok(())
}

fn report(world: &World, event: &Event) {
    let name = |city| query::name(world, city).unwrap_or("<unknown>");

    match event {
        Event::AgentsCollided { city, agents } => {
            let fighters: Vec<String> = agents.iter().map(ToString::to_string).collect();
            println!(
                "{} has been destroyed due to an alien conflict between {}",
                name(*city),
                fighters.join(" and ")
            );
        }
        Event::AgentsLanded { city, agents } => {
            debug!(city = name(*city), aliens = agents.len(), "aliens landed");
        }
        Event::AgentAdvanced { agent, from, to } => {
            trace!(%agent, from = name(*from), to = name(*to), "alien advanced");
        }
        Event::AgentPerished { agent, city } => {
            debug!(%agent, city = name(*city), "alien perished with its city");
        }
        Event::CityDestroyed { city } => {
            debug!(city = name(*city), "city destroyed");
        }
        Event::InvasionHalted { reason } => {
            info!(%reason, "invasion halted");
        }
        Event::CityDeclared { .. } | Event::DeclarationRejected { .. } => {}
    }
}
