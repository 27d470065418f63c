//! Galaxy representation.
//!
//! Contains planets and their connectivity graph, angular sectors, ships,
//! and the route events that overlay the graph.

pub mod event;
pub mod graph;
pub mod placement;
pub mod planet;
pub mod sector;
pub mod ship;

use rand::Rng;
use serde::{Deserialize, Serialize};

pub use event::{EventBoard, EventEffect, EventKind, GalaxyEvent, RouteEvents};
pub use graph::{ConnectionChange, GraphReport, PlanetMap};
pub use planet::{FactionId, Planet, PlanetId, Position, ResourceId};
pub use sector::Sector;
pub use ship::{Fleet, Ship, ShipId};

use crate::config::GalaxyConfig;

/// Descriptor of the object at the galactic core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GalaxyCenter {
    pub name: String,
    pub position: Position,
    pub kind: String,
}

impl Default for GalaxyCenter {
    fn default() -> Self {
        GalaxyCenter {
            name: "Galactic Core".to_string(),
            position: Position::default(),
            kind: "supermassive black hole".to_string(),
        }
    }
}

/// Planets, their graph, and the sector partition.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Galaxy {
    pub planets: PlanetMap,
    pub sectors: Vec<Sector>,
    pub center: GalaxyCenter,
}

impl Galaxy {
    /// Builds a galaxy from existing planets: wires the graph and partitions
    /// sectors.
    pub fn from_planets(planets: Vec<Planet>, config: &GalaxyConfig) -> (Self, GraphReport) {
        let mut planets: PlanetMap = planets.into_iter().map(|p| (p.id, p)).collect();
        let report = graph::generate(&mut planets, config);
        let sectors = sector::partition(&planets);
        let galaxy = Galaxy {
            planets,
            sectors,
            center: GalaxyCenter::default(),
        };
        (galaxy, report)
    }

    /// Places a fresh set of planets and builds the galaxy around them.
    pub fn generate(
        config: &GalaxyConfig,
        resources: &[ResourceId],
        rng: &mut impl Rng,
    ) -> (Self, GraphReport) {
        let planets = placement::generate_planets(config, resources, rng);
        Self::from_planets(planets, config)
    }

    pub fn planet(&self, id: PlanetId) -> Option<&Planet> {
        self.planets.get(&id)
    }

    pub fn planet_mut(&mut self, id: PlanetId) -> Option<&mut Planet> {
        self.planets.get_mut(&id)
    }

    pub fn len(&self) -> usize {
        self.planets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.planets.is_empty()
    }

    /// Recomputes the sector partition from current positions.
    pub fn repartition(&mut self) {
        self.sectors = sector::partition(&self.planets);
    }

    pub fn sector_of(&self, planet: PlanetId) -> Option<&Sector> {
        sector::sector_of(&self.sectors, planet)
    }

    /// Planets owned by `faction`.
    pub fn owned_by<'a>(&'a self, faction: &'a str) -> impl Iterator<Item = &'a Planet> + 'a {
        self.planets.values().filter(move |p| p.is_owned_by(faction))
    }

    /// If one faction owns every planet of the sector containing `planet`,
    /// returns that faction.
    pub fn sector_controller(&self, planet: PlanetId) -> Option<&FactionId> {
        let sector = self.sector_of(planet)?;
        let mut owner: Option<&FactionId> = None;
        for id in &sector.planet_ids {
            let current = self.planets.get(id)?.owner.as_ref()?;
            match owner {
                None => owner = Some(current),
                Some(o) if o == current => {}
                Some(_) => return None,
            }
        }
        owner
    }
}
