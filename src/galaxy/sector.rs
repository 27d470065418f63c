//! Angular sector partitioning.
//!
//! Sectors are equal angular slices of the galactic plane (the x/z axes).
//! Every planet belongs to exactly one sector.

use std::collections::BTreeSet;
use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};

use super::graph::PlanetMap;
use super::planet::PlanetId;

pub const MIN_SECTORS: usize = 3;
pub const MAX_SECTORS: usize = 8;

const SECTOR_NAMES: [&str; MAX_SECTORS] = [
    "Aurora Reach",
    "Borealis Expanse",
    "Cygnus Verge",
    "Draco Marches",
    "Eridan Deep",
    "Fornax Rim",
    "Gemini Drift",
    "Hydra Frontier",
];

/// A named angular slice of the galaxy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Sector {
    pub id: String,
    pub name: String,
    /// Angle of the slice midpoint, in radians from the +x axis.
    pub center_angle: f64,
    pub planet_ids: BTreeSet<PlanetId>,
}

impl Sector {
    pub fn contains(&self, planet: PlanetId) -> bool {
        self.planet_ids.contains(&planet)
    }
}

/// Number of sectors for a galaxy of `planet_count` planets.
pub fn sector_count(planet_count: usize) -> usize {
    if planet_count == 0 {
        return 0;
    }
    let root = (planet_count as f64).sqrt().ceil() as usize;
    root.clamp(MIN_SECTORS, MAX_SECTORS)
}

/// Partitions the planets into angular sectors. No planets, no sectors.
pub fn partition(planets: &PlanetMap) -> Vec<Sector> {
    let count = sector_count(planets.len());
    if count == 0 {
        return Vec::new();
    }
    let slice = TAU / count as f64;

    let mut sectors: Vec<Sector> = (0..count)
        .map(|i| Sector {
            id: format!("sector-{}", i),
            name: SECTOR_NAMES[i].to_string(),
            center_angle: slice * (i as f64 + 0.5),
            planet_ids: BTreeSet::new(),
        })
        .collect();

    for planet in planets.values() {
        let angle = planet.position.horizontal_angle();
        // Rounding at the upper edge must not produce an out-of-range index.
        let index = ((angle / slice) as usize).min(count - 1);
        sectors[index].planet_ids.insert(planet.id);
    }

    sectors
}

/// The sector containing `planet`, if any.
pub fn sector_of(sectors: &[Sector], planet: PlanetId) -> Option<&Sector> {
    sectors.iter().find(|s| s.contains(planet))
}

/// True when the sectors cover exactly the planet set with no overlap.
pub fn is_partition(sectors: &[Sector], planets: &PlanetMap) -> bool {
    let mut seen = BTreeSet::new();
    for sector in sectors {
        for &id in &sector.planet_ids {
            if !planets.contains_key(&id) || !seen.insert(id) {
                return false;
            }
        }
    }
    seen.len() == planets.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::galaxy::planet::{Planet, Position};

    fn ring(n: u32) -> PlanetMap {
        (0..n)
            .map(|i| {
                let a = TAU * f64::from(i) / f64::from(n);
                let id = PlanetId(i);
                (id, Planet::new(id, "p", Position::new(a.cos() * 50.0, 1.0, a.sin() * 50.0)))
            })
            .collect()
    }

    #[test]
    fn sector_count_is_clamped() {
        assert_eq!(sector_count(0), 0);
        assert_eq!(sector_count(1), 3);
        assert_eq!(sector_count(9), 3);
        assert_eq!(sector_count(10), 4);
        assert_eq!(sector_count(30), 6);
        assert_eq!(sector_count(1000), 8);
    }

    #[test]
    fn empty_galaxy_has_no_sectors() {
        assert!(partition(&PlanetMap::new()).is_empty());
    }

    #[test]
    fn every_planet_assigned_exactly_once() {
        let planets = ring(25);
        let sectors = partition(&planets);
        assert_eq!(sectors.len(), 5);
        assert!(is_partition(&sectors, &planets));
    }

    #[test]
    fn assignment_follows_angle() {
        let mut planets = PlanetMap::new();
        planets.insert(PlanetId(0), Planet::new(PlanetId(0), "east", Position::new(10.0, 0.0, 0.1)));
        planets.insert(PlanetId(1), Planet::new(PlanetId(1), "west", Position::new(-10.0, 0.0, 0.1)));
        planets.insert(PlanetId(2), Planet::new(PlanetId(2), "south", Position::new(0.1, 0.0, -10.0)));
        let sectors = partition(&planets);
        assert_eq!(sectors.len(), 3);
        assert!(sectors[0].contains(PlanetId(0)));
        assert!(sectors[1].contains(PlanetId(1)));
        assert!(sectors[2].contains(PlanetId(2)));
        assert_eq!(sector_of(&sectors, PlanetId(1)).map(|s| s.name.as_str()), Some("Borealis Expanse"));
    }

    #[test]
    fn center_angles_are_slice_midpoints() {
        let sectors = partition(&ring(16));
        assert_eq!(sectors.len(), 4);
        assert!((sectors[0].center_angle - TAU / 8.0).abs() < 1e-9);
        assert!((sectors[3].center_angle - 7.0 * TAU / 8.0).abs() < 1e-9);
    }
}
