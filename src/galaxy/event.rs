//! Time-limited galaxy events that open or close routes.
//!
//! Wormholes link two planets regardless of the connectivity graph; warp
//! storms and blockades close routes. [`RouteEvents`] is the contract the
//! navigator and turn pipeline consume; [`EventBoard`] is the in-memory
//! implementation.

use serde::{Deserialize, Serialize};

use super::planet::PlanetId;

/// What an event does to routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventEffect {
    Wormhole,
    BlockRoute,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Wormhole,
    #[default]
    WarpStorm,
    Blockade,
}

impl EventKind {
    pub const fn effect(self) -> EventEffect {
        match self {
            EventKind::Wormhole => EventEffect::Wormhole,
            EventKind::WarpStorm | EventKind::Blockade => EventEffect::BlockRoute,
        }
    }
}

/// An active event anchored at a planet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GalaxyEvent {
    pub id: u32,
    pub kind: EventKind,
    pub planet_id: PlanetId,
    /// Other end of a wormhole, or the single route a storm closes. A
    /// blocking event without a target closes every route at its planet.
    pub target_planet_id: Option<PlanetId>,
    pub remaining_turns: u32,
    pub description: String,
}

impl GalaxyEvent {
    pub fn effect(&self) -> EventEffect {
        self.kind.effect()
    }

    /// True if this event touches the route between `a` and `b`.
    fn covers(&self, a: PlanetId, b: PlanetId) -> bool {
        match self.target_planet_id {
            Some(t) => (self.planet_id == a && t == b) || (self.planet_id == b && t == a),
            None => self.planet_id == a || self.planet_id == b,
        }
    }

    fn touches(&self, planet: PlanetId) -> bool {
        self.planet_id == planet || self.target_planet_id == Some(planet)
    }
}

/// Route-event collaborator consumed by the navigator and the turn pipeline.
pub trait RouteEvents {
    /// Ages every event by one turn and returns the ones that expired.
    fn advance_turn(&mut self) -> Vec<GalaxyEvent>;
    /// True if an active wormhole links `a` and `b` in either direction.
    fn has_wormhole(&self, a: PlanetId, b: PlanetId) -> bool;
    /// True if an active blocking event covers the route `a`–`b`.
    fn is_route_blocked(&self, a: PlanetId, b: PlanetId) -> bool;
    fn by_effect(&self, effect: EventEffect) -> Vec<&GalaxyEvent>;
    fn at_planet(&self, planet: PlanetId) -> Vec<&GalaxyEvent>;
}

/// In-memory event store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventBoard {
    events: Vec<GalaxyEvent>,
    next_id: u32,
}

impl EventBoard {
    pub fn new() -> Self {
        EventBoard::default()
    }

    /// Restores saved events; new ids continue after the highest one.
    pub fn from_events(events: Vec<GalaxyEvent>) -> Self {
        let next_id = events.iter().map(|e| e.id + 1).max().unwrap_or(0);
        EventBoard { events, next_id }
    }

    /// Adds an event lasting `duration` turns and returns its id. Events with
    /// zero duration are never active and are not stored.
    pub fn add(
        &mut self,
        kind: EventKind,
        planet_id: PlanetId,
        target_planet_id: Option<PlanetId>,
        duration: u32,
        description: impl Into<String>,
    ) -> Option<u32> {
        if duration == 0 {
            return None;
        }
        let id = self.next_id;
        self.next_id += 1;
        self.events.push(GalaxyEvent {
            id,
            kind,
            planet_id,
            target_planet_id,
            remaining_turns: duration,
            description: description.into(),
        });
        Some(id)
    }

    pub fn remove(&mut self, id: u32) -> Option<GalaxyEvent> {
        let idx = self.events.iter().position(|e| e.id == id)?;
        Some(self.events.remove(idx))
    }

    /// Removes every event anchored at or targeting `planet`.
    pub fn remove_at_planet(&mut self, planet: PlanetId) -> usize {
        let before = self.events.len();
        self.events.retain(|e| !e.touches(planet));
        before - self.events.len()
    }

    pub fn events(&self) -> &[GalaxyEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl RouteEvents for EventBoard {
    fn advance_turn(&mut self) -> Vec<GalaxyEvent> {
        for event in &mut self.events {
            event.remaining_turns = event.remaining_turns.saturating_sub(1);
        }
        let (expired, active): (Vec<_>, Vec<_>) = std::mem::take(&mut self.events)
            .into_iter()
            .partition(|e| e.remaining_turns == 0);
        self.events = active;
        expired
    }

    fn has_wormhole(&self, a: PlanetId, b: PlanetId) -> bool {
        self.events.iter().any(|e| {
            e.effect() == EventEffect::Wormhole
                && e.target_planet_id.is_some()
                && e.covers(a, b)
        })
    }

    fn is_route_blocked(&self, a: PlanetId, b: PlanetId) -> bool {
        self.events
            .iter()
            .any(|e| e.effect() == EventEffect::BlockRoute && e.covers(a, b))
    }

    fn by_effect(&self, effect: EventEffect) -> Vec<&GalaxyEvent> {
        self.events.iter().filter(|e| e.effect() == effect).collect()
    }

    fn at_planet(&self, planet: PlanetId) -> Vec<&GalaxyEvent> {
        self.events.iter().filter(|e| e.touches(planet)).collect()
    }
}
