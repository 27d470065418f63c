//! Fleet movement legality over the connectivity graph.
//!
//! A ship may move along a graph edge or through an active wormhole, unless a
//! blocking event covers the route.

use std::collections::BTreeSet;

use crate::galaxy::{graph, EventEffect, Fleet, Galaxy, PlanetId, RouteEvents, ShipId};

/// Why a move was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
    #[error("ship {0} not found")]
    ShipNotFound(ShipId),

    #[error("current planet {0} not found")]
    CurrentPlanetNotFound(PlanetId),

    #[error("target planet {0} not found")]
    TargetPlanetNotFound(PlanetId),

    #[error("{from} is not connected to {to}")]
    NotConnected { from: PlanetId, to: PlanetId },

    #[error("route from {from} to {to} is blocked")]
    RouteBlocked { from: PlanetId, to: PlanetId },
}

/// Checks whether `ship` may move to `target` without moving it. Returns the
/// ship's current planet on success.
pub fn check_move(
    fleet: &Fleet,
    galaxy: &Galaxy,
    events: &impl RouteEvents,
    ship: ShipId,
    target: PlanetId,
) -> Result<PlanetId, MoveError> {
    let current = fleet.get(ship).ok_or(MoveError::ShipNotFound(ship))?.planet_id;
    if galaxy.planet(current).is_none() {
        return Err(MoveError::CurrentPlanetNotFound(current));
    }
    if galaxy.planet(target).is_none() {
        return Err(MoveError::TargetPlanetNotFound(target));
    }
    let linked = graph::is_adjacent(&galaxy.planets, current, target)
        || events.has_wormhole(current, target);
    if !linked {
        return Err(MoveError::NotConnected { from: current, to: target });
    }
    if events.is_route_blocked(current, target) {
        return Err(MoveError::RouteBlocked { from: current, to: target });
    }
    Ok(current)
}

/// Moves `ship` to `target` if the route is open. Returns a message naming
/// the destination.
pub fn move_ship(
    fleet: &mut Fleet,
    galaxy: &Galaxy,
    events: &impl RouteEvents,
    ship: ShipId,
    target: PlanetId,
) -> Result<String, MoveError> {
    let from = check_move(fleet, galaxy, events, ship, target)?;
    let Some(moving) = fleet.get_mut(ship) else {
        return Err(MoveError::ShipNotFound(ship));
    };
    moving.planet_id = target;
    let destination = galaxy
        .planet(target)
        .map_or_else(|| target.to_string(), |p| p.name.clone());
    tracing::debug!(
        target: "galaxy_campaign::fleet",
        ship = %ship,
        from = %from,
        to = %target,
        "ship.moved"
    );
    Ok(format!("{} moved to {}", moving.name, destination))
}

/// Every planet `ship` could move to right now, sorted and deduplicated.
/// Unknown ships have no targets.
pub fn valid_move_targets(
    fleet: &Fleet,
    galaxy: &Galaxy,
    events: &impl RouteEvents,
    ship: ShipId,
) -> Vec<PlanetId> {
    let Some(current) = fleet.get(ship).map(|s| s.planet_id) else {
        return Vec::new();
    };
    let Some(planet) = galaxy.planet(current) else {
        return Vec::new();
    };

    let mut targets: BTreeSet<PlanetId> = planet.connections().iter().copied().collect();
    for event in events.by_effect(EventEffect::Wormhole) {
        match event.target_planet_id {
            Some(other) if event.planet_id == current => {
                targets.insert(other);
            }
            Some(other) if other == current => {
                targets.insert(event.planet_id);
            }
            _ => {}
        }
    }

    targets
        .into_iter()
        .filter(|&t| t != current && galaxy.planet(t).is_some())
        .filter(|&t| !events.is_route_blocked(current, t))
        .collect()
}
