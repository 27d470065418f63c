//! Planet connectivity graph.
//!
//! Builds undirected adjacency between planets from their 3D positions, then
//! repairs the result so every planet is reachable from every other. Every
//! mutation goes through [`add_connection`] / [`remove_connection`], which
//! mirror the change on both endpoints, so the graph stays symmetric.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use rayon::prelude::*;

use super::planet::{Planet, PlanetId};
use crate::config::GalaxyConfig;

/// Planets keyed by id. Iteration order is id order.
pub type PlanetMap = BTreeMap<PlanetId, Planet>;

/// Outcome of [`toggle_connection`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionChange {
    Added,
    Removed,
}

/// Summary of a graph build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GraphReport {
    /// Undirected edges after all repairs.
    pub edges: usize,
    /// Planets that had no edge after the neighbour pass.
    pub isolated_repaired: usize,
    /// Links added by the connectivity repair.
    pub components_repaired: usize,
}

/// Rebuilds all connections from planet positions.
///
/// Existing connections are discarded. Each planet links to at most
/// `config.max_neighbors` of its nearest neighbours closer than
/// `config.connection_threshold`; isolated planets and disconnected
/// components are then repaired.
pub fn generate(planets: &mut PlanetMap, config: &GalaxyConfig) -> GraphReport {
    for planet in planets.values_mut() {
        planet.clear_connections();
    }

    let positions: Vec<(PlanetId, super::planet::Position)> =
        planets.values().map(|p| (p.id, p.position)).collect();

    let candidates: Vec<(PlanetId, Vec<PlanetId>)> = positions
        .par_iter()
        .map(|&(id, pos)| {
            let nearest = sorted_by_distance(id, &pos, &positions)
                .into_iter()
                .take_while(|&(_, d)| d < config.connection_threshold)
                .take(config.max_neighbors)
                .map(|(other, _)| other)
                .collect();
            (id, nearest)
        })
        .collect();

    for (id, nearest) in candidates {
        for other in nearest {
            add_connection(planets, id, other);
        }
    }

    let isolated_repaired = repair_isolated(planets);
    let components_repaired = repair_connectivity(planets);

    GraphReport {
        edges: edge_count(planets),
        isolated_repaired,
        components_repaired,
    }
}

/// Connects every planet with no edges to its single nearest neighbour.
/// Returns the number of planets repaired.
pub fn repair_isolated(planets: &mut PlanetMap) -> usize {
    let isolated: Vec<PlanetId> = planets
        .values()
        .filter(|p| p.connection_count() == 0)
        .map(|p| p.id)
        .collect();

    let mut repaired = 0;
    for id in isolated {
        // An earlier repair may already have linked this planet.
        if planets.get(&id).map_or(true, |p| p.connection_count() > 0) {
            continue;
        }
        if let Some(nearest) = nearest_neighbor(planets, id, |_| true) {
            if add_connection(planets, id, nearest) {
                repaired += 1;
            }
        }
    }
    repaired
}

/// Makes the graph connected. Returns the number of links added.
///
/// Runs a BFS from the lowest planet id and links every unreached planet to
/// its nearest neighbour among all planets. Unreached clusters whose nearest
/// neighbours all lie inside the cluster are then bridged to the reached set
/// by the shortest available link until the BFS covers every planet.
pub fn repair_connectivity(planets: &mut PlanetMap) -> usize {
    let Some(&start) = planets.keys().next() else {
        return 0;
    };

    let mut added = 0;
    let reached = reachable_from(planets, start);
    let unreached: Vec<PlanetId> = planets
        .keys()
        .filter(|id| !reached.contains(id))
        .copied()
        .collect();
    for id in unreached {
        if let Some(nearest) = nearest_neighbor(planets, id, |_| true) {
            if add_connection(planets, id, nearest) {
                added += 1;
            }
        }
    }

    loop {
        let reached = reachable_from(planets, start);
        if reached.len() == planets.len() {
            break;
        }
        let mut best: Option<(PlanetId, PlanetId, f64)> = None;
        for planet in planets.values().filter(|p| !reached.contains(&p.id)) {
            if let Some(other) = nearest_neighbor(planets, planet.id, |o| reached.contains(&o)) {
                let d = planet.position.distance(&planets[&other].position);
                if best.map_or(true, |(_, _, bd)| d < bd) {
                    best = Some((planet.id, other, d));
                }
            }
        }
        match best {
            Some((a, b, _)) => {
                add_connection(planets, a, b);
                added += 1;
            }
            None => break,
        }
    }

    added
}

/// Adds a mirrored connection. Returns false for self-loops, missing planets,
/// or an already existing connection.
pub fn add_connection(planets: &mut PlanetMap, a: PlanetId, b: PlanetId) -> bool {
    if a == b || !planets.contains_key(&a) || !planets.contains_key(&b) {
        return false;
    }
    let mut changed = false;
    if let Some(p) = planets.get_mut(&a) {
        changed |= p.add_connection(b);
    }
    if let Some(p) = planets.get_mut(&b) {
        changed |= p.add_connection(a);
    }
    changed
}

/// Removes a mirrored connection. Returns false if either planet is missing,
/// the ids are identical, or no connection existed.
pub fn remove_connection(planets: &mut PlanetMap, a: PlanetId, b: PlanetId) -> bool {
    if a == b || !planets.contains_key(&a) || !planets.contains_key(&b) {
        return false;
    }
    let mut changed = false;
    if let Some(p) = planets.get_mut(&a) {
        changed |= p.remove_connection(b);
    }
    if let Some(p) = planets.get_mut(&b) {
        changed |= p.remove_connection(a);
    }
    changed
}

/// Adds the connection if absent, removes it if present.
///
/// Returns `None` without touching the graph when `a == b` or either planet
/// does not exist.
pub fn toggle_connection(
    planets: &mut PlanetMap,
    a: PlanetId,
    b: PlanetId,
) -> Option<ConnectionChange> {
    if a == b || !planets.contains_key(&b) {
        return None;
    }
    let connected = planets.get(&a)?.has_connection(b);
    if connected {
        remove_connection(planets, a, b);
        Some(ConnectionChange::Removed)
    } else {
        add_connection(planets, a, b);
        Some(ConnectionChange::Added)
    }
}

/// Returns true if the two planets share an edge.
pub fn is_adjacent(planets: &PlanetMap, a: PlanetId, b: PlanetId) -> bool {
    planets.get(&a).is_some_and(|p| p.has_connection(b))
}

/// All planets reachable from `start` (including itself) by BFS.
pub fn reachable_from(planets: &PlanetMap, start: PlanetId) -> BTreeSet<PlanetId> {
    let mut seen = BTreeSet::new();
    if !planets.contains_key(&start) {
        return seen;
    }
    let mut queue = VecDeque::from([start]);
    seen.insert(start);
    while let Some(id) = queue.pop_front() {
        if let Some(planet) = planets.get(&id) {
            for &next in planet.connections() {
                if planets.contains_key(&next) && seen.insert(next) {
                    queue.push_back(next);
                }
            }
        }
    }
    seen
}

/// True when every planet can reach every other. An empty galaxy is connected.
pub fn is_connected(planets: &PlanetMap) -> bool {
    match planets.keys().next() {
        Some(&start) => reachable_from(planets, start).len() == planets.len(),
        None => true,
    }
}

/// Number of undirected edges.
pub fn edge_count(planets: &PlanetMap) -> usize {
    planets
        .values()
        .map(|p| p.connections().iter().filter(|&&o| o > p.id).count())
        .sum()
}

/// Checks the symmetry and no-self-loop invariants. Returns the first
/// offending pair, if any.
pub fn find_asymmetry(planets: &PlanetMap) -> Option<(PlanetId, PlanetId)> {
    for planet in planets.values() {
        for &other in planet.connections() {
            if other == planet.id || !is_adjacent(planets, other, planet.id) {
                return Some((planet.id, other));
            }
        }
    }
    None
}

/// Drops connections that point at missing planets or at the planet itself
/// and re-mirrors the rest. Used when restoring saved state.
pub fn normalize(planets: &mut PlanetMap) -> usize {
    let ids: BTreeSet<PlanetId> = planets.keys().copied().collect();
    let mut dropped = 0;
    let mut pairs = Vec::new();
    for planet in planets.values_mut() {
        let invalid: Vec<PlanetId> = planet
            .connections()
            .iter()
            .filter(|o| **o == planet.id || !ids.contains(o))
            .copied()
            .collect();
        for other in invalid {
            planet.remove_connection(other);
            dropped += 1;
        }
        pairs.extend(planet.connections().iter().map(|&o| (planet.id, o)));
    }
    for (a, b) in pairs {
        add_connection(planets, a, b);
    }
    dropped
}

/// Nearest other planet to `id` satisfying `filter`, ties broken by lower id.
fn nearest_neighbor(
    planets: &PlanetMap,
    id: PlanetId,
    filter: impl Fn(PlanetId) -> bool,
) -> Option<PlanetId> {
    let origin = planets.get(&id)?.position;
    planets
        .values()
        .filter(|p| p.id != id && filter(p.id))
        .map(|p| (p.id, p.position.distance(&origin)))
        .min_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)))
        .map(|(other, _)| other)
}

/// Every other planet with its distance, nearest first.
fn sorted_by_distance(
    id: PlanetId,
    origin: &super::planet::Position,
    positions: &[(PlanetId, super::planet::Position)],
) -> Vec<(PlanetId, f64)> {
    let mut out: Vec<(PlanetId, f64)> = positions
        .iter()
        .filter(|(other, _)| *other != id)
        .map(|(other, pos)| (*other, origin.distance(pos)))
        .collect();
    out.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
    out
}
