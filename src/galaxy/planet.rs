//! Planet entity and identifiers.
//!
//! A planet carries its 3D position, owning faction, adjacency set, per-turn
//! resource yields, and the two numeric stats read by stratagems and
//! distribution scoring.

use std::collections::{BTreeMap, BTreeSet};
use std::f64::consts::TAU;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a faction. Factions are open-ended, so this is a plain string.
pub type FactionId = String;

/// Identifier of a resource (e.g. `ore`).
pub type ResourceId = String;

/// Identifier of a planet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlanetId(pub u32);

impl fmt::Display for PlanetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "planet-{}", self.0)
    }
}

/// A point in galaxy space. `x` and `z` span the galactic plane; `y` is height.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Position { x, y, z }
    }

    /// Euclidean distance to another position.
    pub fn distance(&self, other: &Position) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Angle of the horizontal projection, `atan2(z, x)` normalised into [0, 2π).
    pub fn horizontal_angle(&self) -> f64 {
        let angle = self.z.atan2(self.x);
        let normalized = if angle < 0.0 { angle + TAU } else { angle };
        // -0.0 and tiny negatives can round up to exactly TAU.
        if normalized >= TAU {
            0.0
        } else {
            normalized
        }
    }
}

/// A planet in the galaxy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Planet {
    #[serde(default)]
    pub id: PlanetId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub position: Position,
    #[serde(default)]
    pub owner: Option<FactionId>,
    #[serde(default)]
    connections: BTreeSet<PlanetId>,
    /// Resources produced for the owner every turn.
    #[serde(default)]
    pub yields: BTreeMap<ResourceId, u32>,
    /// Garrison strength; raised by reinforcement, lowered by bombardment.
    #[serde(default)]
    pub defense: u32,
    /// Weight used by strategic-value distribution.
    #[serde(default)]
    pub strategic_value: u32,
    #[serde(default)]
    pub discovered: bool,
}

impl Planet {
    /// Creates an unowned, unconnected planet with no yields.
    pub fn new(id: PlanetId, name: impl Into<String>, position: Position) -> Self {
        Planet {
            id,
            name: name.into(),
            position,
            owner: None,
            connections: BTreeSet::new(),
            yields: BTreeMap::new(),
            defense: 0,
            strategic_value: 0,
            discovered: false,
        }
    }

    /// Records a connection to `other`. Returns false for self-connections or
    /// if the connection already exists. Symmetry is the graph's job.
    pub fn add_connection(&mut self, other: PlanetId) -> bool {
        if other == self.id {
            return false;
        }
        self.connections.insert(other)
    }

    /// Removes a connection. Returns true if it was present.
    pub fn remove_connection(&mut self, other: PlanetId) -> bool {
        self.connections.remove(&other)
    }

    pub fn has_connection(&self, other: PlanetId) -> bool {
        self.connections.contains(&other)
    }

    pub fn connections(&self) -> &BTreeSet<PlanetId> {
        &self.connections
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Sets the owner, returning the previous one.
    pub fn set_owner(&mut self, owner: Option<FactionId>) -> Option<FactionId> {
        std::mem::replace(&mut self.owner, owner)
    }

    pub fn is_owned_by(&self, faction: &str) -> bool {
        self.owner.as_deref() == Some(faction)
    }

    /// Drops every connection. Used when the graph is rebuilt.
    pub(crate) fn clear_connections(&mut self) {
        self.connections.clear();
    }
}
