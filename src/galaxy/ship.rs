//! Ships and the fleet registry.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::planet::{FactionId, PlanetId};

/// Identifier of a ship.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShipId(pub u32);

impl fmt::Display for ShipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ship-{}", self.0)
    }
}

/// A ship stationed at a planet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Ship {
    pub id: ShipId,
    pub owner: FactionId,
    pub planet_id: PlanetId,
    pub name: String,
}

/// All ships in the campaign, keyed by id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fleet {
    ships: BTreeMap<ShipId, Ship>,
    next_id: u32,
}

impl Fleet {
    pub fn new() -> Self {
        Fleet::default()
    }

    /// Rebuilds a fleet from saved ships. The next id continues after the
    /// highest one present.
    pub fn from_ships(ships: impl IntoIterator<Item = Ship>) -> Self {
        let ships: BTreeMap<ShipId, Ship> = ships.into_iter().map(|s| (s.id, s)).collect();
        let next_id = ships.keys().last().map_or(0, |id| id.0 + 1);
        Fleet { ships, next_id }
    }

    /// Registers a new ship and returns its id.
    pub fn spawn(&mut self, owner: impl Into<FactionId>, planet_id: PlanetId, name: impl Into<String>) -> ShipId {
        let id = ShipId(self.next_id);
        self.next_id += 1;
        self.ships.insert(
            id,
            Ship {
                id,
                owner: owner.into(),
                planet_id,
                name: name.into(),
            },
        );
        id
    }

    pub fn get(&self, id: ShipId) -> Option<&Ship> {
        self.ships.get(&id)
    }

    pub fn get_mut(&mut self, id: ShipId) -> Option<&mut Ship> {
        self.ships.get_mut(&id)
    }

    pub fn remove(&mut self, id: ShipId) -> Option<Ship> {
        self.ships.remove(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Ship> {
        self.ships.values()
    }

    /// Ships currently at `planet`.
    pub fn at_planet(&self, planet: PlanetId) -> impl Iterator<Item = &Ship> {
        self.ships.values().filter(move |s| s.planet_id == planet)
    }

    pub fn len(&self) -> usize {
        self.ships.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ships.is_empty()
    }

    /// Drops ships for which `keep` returns false. Returns how many were removed.
    pub fn retain(&mut self, mut keep: impl FnMut(&Ship) -> bool) -> usize {
        let before = self.ships.len();
        self.ships.retain(|_, s| keep(s));
        before - self.ships.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawn_assigns_sequential_ids() {
        let mut fleet = Fleet::new();
        let a = fleet.spawn("red", PlanetId(0), "Valiant");
        let b = fleet.spawn("blue", PlanetId(1), "Resolute");
        assert_eq!(a, ShipId(0));
        assert_eq!(b, ShipId(1));
        assert_eq!(fleet.get(b).map(|s| s.owner.as_str()), Some("blue"));
        assert_eq!(fleet.at_planet(PlanetId(0)).count(), 1);
    }

    #[test]
    fn from_ships_continues_ids() {
        let fleet = Fleet::from_ships(vec![Ship {
            id: ShipId(7),
            owner: "red".to_string(),
            planet_id: PlanetId(0),
            name: "Old".to_string(),
        }]);
        let mut fleet = fleet;
        assert_eq!(fleet.spawn("red", PlanetId(0), "New"), ShipId(8));
        assert_eq!(fleet.len(), 2);
    }
}
