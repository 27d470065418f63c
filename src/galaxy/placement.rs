//! Planet placement for freshly generated galaxies.
//!
//! Planets are scattered along logarithmic spiral arms inside the galactic
//! disc. A planet that lands too close to one already placed is nudged by a
//! small random offset so no two planets share a position.

use std::collections::BTreeMap;
use std::f64::consts::TAU;

use rand::Rng;

use super::planet::{Planet, PlanetId, Position, ResourceId};
use crate::config::GalaxyConfig;

/// Resource ids used when no resource catalog is configured.
pub const PLACEHOLDER_RESOURCES: [&str; 4] = ["ore", "energy", "food", "crystal"];

/// How many times a crowded planet is nudged before it is accepted as is.
const MAX_NUDGES: usize = 16;

const NAME_PREFIXES: [&str; 12] = [
    "Ar", "Bel", "Cor", "Dra", "Eri", "Fen", "Gal", "Hel", "Ix", "Kep", "Lyr", "Mal",
];
const NAME_SUFFIXES: [&str; 10] = [
    "ion", "ara", "os", "eth", "una", "ax", "is", "oth", "ea", "yn",
];

/// Places `config.planet_count` planets with generated names, yields and stats.
///
/// Ids are assigned sequentially from 0. The first planet starts discovered.
pub fn generate_planets(
    config: &GalaxyConfig,
    resources: &[ResourceId],
    rng: &mut impl Rng,
) -> Vec<Planet> {
    let mut planets: Vec<Planet> = Vec::with_capacity(config.planet_count);

    for i in 0..config.planet_count {
        let mut position = spiral_position(config, rng);
        let mut nudges = 0;
        while nudges < MAX_NUDGES && crowded(&position, &planets, config.min_separation) {
            position = nudge(position, config.nudge, rng);
            nudges += 1;
        }

        let id = PlanetId(i as u32);
        let mut planet = Planet::new(id, planet_name(i, rng), position);
        planet.yields = random_yields(resources, rng);
        planet.defense = rng.gen_range(1..=10);
        planet.strategic_value = rng.gen_range(1..=10);
        planet.discovered = i == 0;
        planets.push(planet);
    }

    planets
}

/// Picks a point near one of the spiral arms.
fn spiral_position(config: &GalaxyConfig, rng: &mut impl Rng) -> Position {
    let arm = rng.gen_range(0..config.arm_count.max(1));
    let arm_offset = TAU * f64::from(arm) / f64::from(config.arm_count.max(1));

    // sqrt spreads planets evenly over the disc area instead of bunching at the core.
    let t: f64 = rng.gen::<f64>().sqrt();
    let distance = t * config.radius;
    let winding = t * TAU * 0.75;
    let scatter = rng.gen_range(-0.35..=0.35);
    let angle = arm_offset + winding + scatter;

    let height = if config.thickness > 0.0 {
        rng.gen_range(-config.thickness..=config.thickness) * (1.0 - t * 0.5)
    } else {
        0.0
    };

    Position::new(distance * angle.cos(), height, distance * angle.sin())
}

fn crowded(position: &Position, placed: &[Planet], min_separation: f64) -> bool {
    placed
        .iter()
        .any(|p| p.position.distance(position) < min_separation)
}

fn nudge(position: Position, magnitude: f64, rng: &mut impl Rng) -> Position {
    if magnitude <= 0.0 {
        return position;
    }
    Position::new(
        position.x + rng.gen_range(-magnitude..=magnitude),
        position.y + rng.gen_range(-magnitude..=magnitude) * 0.25,
        position.z + rng.gen_range(-magnitude..=magnitude),
    )
}

fn planet_name(index: usize, rng: &mut impl Rng) -> String {
    let prefix = NAME_PREFIXES[rng.gen_range(0..NAME_PREFIXES.len())];
    let suffix = NAME_SUFFIXES[rng.gen_range(0..NAME_SUFFIXES.len())];
    format!("{}{} {}", prefix, suffix, roman(index % 7 + 1))
}

fn roman(n: usize) -> &'static str {
    match n {
        1 => "I",
        2 => "II",
        3 => "III",
        4 => "IV",
        5 => "V",
        6 => "VI",
        _ => "VII",
    }
}

/// One to three distinct resources, each yielding 1–5 per turn.
fn random_yields(resources: &[ResourceId], rng: &mut impl Rng) -> BTreeMap<ResourceId, u32> {
    let mut yields = BTreeMap::new();
    if resources.is_empty() {
        return yields;
    }
    let count = rng.gen_range(1..=3usize.min(resources.len()));
    while yields.len() < count {
        let resource = &resources[rng.gen_range(0..resources.len())];
        yields
            .entry(resource.clone())
            .or_insert_with(|| rng.gen_range(1..=5));
    }
    yields
}

/// Owned copy of the placeholder resource set.
pub fn placeholder_resources() -> Vec<ResourceId> {
    PLACEHOLDER_RESOURCES.iter().map(|r| r.to_string()).collect()
}
