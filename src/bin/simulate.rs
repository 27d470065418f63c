//! Headless campaign runner.
//!
//! Generates a galaxy, runs a number of turns with scripted factions, and
//! prints a summary.
//!
//! Usage:
//!   cargo run --release --bin simulate -- [OPTIONS]
//!
//! Options:
//!   --turns N       Number of turns to advance (default: 20)
//!   --planets N     Planets to generate, overrides the config (default: 20)
//!   --factions N    Number of scripted factions (default: 2)
//!   --seed N        Random seed, 0 for entropy (default: 0)
//!   --config FILE   JSON campaign configuration
//!   --save FILE     Write the final campaign state to FILE
//!   --quiet         Suppress the summary

use std::env;
use std::path::PathBuf;
use std::process;
use std::time::Instant;

use tracing_subscriber::EnvFilter;

use galaxy_campaign::economy::{AutoDistributionConfig, DistributionMode};
use galaxy_campaign::galaxy::PlanetId;
use galaxy_campaign::{Campaign, CampaignConfig, JsonFileStore};

struct Options {
    turns: u32,
    planets: Option<usize>,
    factions: usize,
    seed: u64,
    config: Option<PathBuf>,
    save: Option<PathBuf>,
    quiet: bool,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            turns: 20,
            planets: None,
            factions: 2,
            seed: 0,
            config: None,
            save: None,
            quiet: false,
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let options = match parse_args(env::args().skip(1).collect()) {
        Ok(Some(options)) => options,
        Ok(None) => {
            print_usage();
            return;
        }
        Err(message) => {
            eprintln!("{}", message);
            print_usage();
            process::exit(1);
        }
    };

    let mut config = match &options.config {
        Some(path) => match CampaignConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("{}", e);
                process::exit(1);
            }
        },
        None => CampaignConfig::default(),
    };
    if let Some(planets) = options.planets {
        config.galaxy.planet_count = planets;
    }

    let mut campaign = if options.seed == 0 {
        Campaign::new(config)
    } else {
        Campaign::with_seed(config, options.seed)
    };

    let start = Instant::now();
    campaign.generate_galaxy();

    let factions: Vec<String> = (0..options.factions).map(|i| format!("faction-{}", i + 1)).collect();
    let homeworlds: Vec<PlanetId> = campaign.galaxy().planets.keys().copied().collect();
    for (i, faction) in factions.iter().enumerate() {
        campaign.ledger_mut().register(faction.clone());
        if let Some(&home) = homeworlds.get(i * homeworlds.len() / factions.len().max(1)) {
            campaign.set_planet_owner(home, Some(faction.clone()));
            campaign.spawn_ship(faction.clone(), home, format!("{} Flagship", faction));
        }
    }
    campaign.set_distribution(AutoDistributionConfig {
        enabled: true,
        mode: DistributionMode::NeedBased,
        ..AutoDistributionConfig::default()
    });
    campaign.generate_order();

    let mut completed = 0;
    let mut expired = 0;
    for _ in 0..options.turns {
        step_fleets(&mut campaign);
        let report = campaign.advance_turn();
        completed += usize::from(report.completed_order.is_some());
        expired += usize::from(report.expired_order.is_some());
        if campaign.orders().current().is_none() {
            campaign.generate_order();
        }
    }
    let elapsed = start.elapsed();

    if let Some(path) = &options.save {
        let mut store = JsonFileStore::new(path);
        if !campaign.save(&mut store) {
            eprintln!("Failed to save campaign to {}", path.display());
            process::exit(1);
        }
    }

    if !options.quiet {
        print_summary(&campaign, &factions, completed, expired, elapsed.as_secs_f64());
    }
}

/// Moves every ship to its first valid target and claims unowned arrivals.
fn step_fleets(campaign: &mut Campaign) {
    let ships: Vec<_> = campaign.fleet().iter().map(|s| (s.id, s.owner.clone())).collect();
    for (ship, owner) in ships {
        let Some(&target) = campaign.valid_move_targets(ship).first() else {
            continue;
        };
        if campaign.move_ship(ship, target).is_err() {
            continue;
        }
        let unowned = campaign.galaxy().planet(target).is_some_and(|p| p.owner.is_none());
        if unowned {
            campaign.set_planet_owner(target, Some(owner));
        }
    }
}

fn print_summary(campaign: &Campaign, factions: &[String], completed: usize, expired: usize, secs: f64) {
    println!("Campaign {} after {} turns ({:.3}s)", campaign.id(), campaign.turn(), secs);
    println!(
        "  galaxy: {} planets, {} sectors",
        campaign.galaxy().len(),
        campaign.galaxy().sectors.len()
    );
    println!("  orders: {} completed, {} expired", completed, expired);
    for faction in factions {
        let planets = campaign.galaxy().owned_by(faction).count();
        let pool = campaign
            .ledger()
            .pool(faction)
            .map(|p| {
                p.iter()
                    .map(|(r, a)| format!("{}={}", r, a))
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .unwrap_or_default();
        println!("  {}: {} planets, {}", faction, planets, pool);
    }
}

fn parse_args(args: Vec<String>) -> Result<Option<Options>, String> {
    let mut options = Options::default();
    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--turns" => options.turns = parse_value(&arg, iter.next())?,
            "--planets" => options.planets = Some(parse_value(&arg, iter.next())?),
            "--factions" => options.factions = parse_value(&arg, iter.next())?,
            "--seed" => options.seed = parse_value(&arg, iter.next())?,
            "--config" => options.config = Some(PathBuf::from(require(&arg, iter.next())?)),
            "--save" => options.save = Some(PathBuf::from(require(&arg, iter.next())?)),
            "--quiet" => options.quiet = true,
            "--help" | "-h" => return Ok(None),
            other => return Err(format!("Unknown argument: {}", other)),
        }
    }
    Ok(Some(options))
}

fn require(flag: &str, value: Option<String>) -> Result<String, String> {
    value.ok_or_else(|| format!("missing value for {}", flag))
}

fn parse_value<T: std::str::FromStr>(flag: &str, value: Option<String>) -> Result<T, String> {
    let raw = require(flag, value)?;
    raw.parse().map_err(|_| format!("invalid {} value: {}", flag, raw))
}

fn print_usage() {
    eprintln!("Usage: simulate [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --turns N       Number of turns to advance (default: 20)");
    eprintln!("  --planets N     Planets to generate (default: from config)");
    eprintln!("  --factions N    Number of scripted factions (default: 2)");
    eprintln!("  --seed N        Random seed, 0 for entropy (default: 0)");
    eprintln!("  --config FILE   JSON campaign configuration");
    eprintln!("  --save FILE     Write the final campaign state to FILE");
    eprintln!("  --quiet         Suppress the summary");
}
