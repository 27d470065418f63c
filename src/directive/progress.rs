//! Order kinds and the liberation-progress counters they read.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The type tag of a galactic order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderKind {
    #[default]
    ConquerPlanets,
    LiberateSector,
    GatherResources,
    HoldTerritory,
    ExplorePlanets,
    EstablishRelations,
}

pub const ALL_ORDER_KINDS: [OrderKind; 6] = [
    OrderKind::ConquerPlanets,
    OrderKind::LiberateSector,
    OrderKind::GatherResources,
    OrderKind::HoldTerritory,
    OrderKind::ExplorePlanets,
    OrderKind::EstablishRelations,
];

impl OrderKind {
    pub const fn tag(self) -> &'static str {
        match self {
            OrderKind::ConquerPlanets => "CONQUER_PLANETS",
            OrderKind::LiberateSector => "LIBERATE_SECTOR",
            OrderKind::GatherResources => "GATHER_RESOURCES",
            OrderKind::HoldTerritory => "HOLD_TERRITORY",
            OrderKind::ExplorePlanets => "EXPLORE_PLANETS",
            OrderKind::EstablishRelations => "ESTABLISH_RELATIONS",
        }
    }

    /// The counter that measures progress on this kind of order.
    pub const fn progress_kind(self) -> ProgressKind {
        match self {
            OrderKind::ConquerPlanets => ProgressKind::PlanetsConquered,
            OrderKind::LiberateSector => ProgressKind::SectorsLiberated,
            OrderKind::GatherResources => ProgressKind::ResourcesGathered,
            OrderKind::HoldTerritory => ProgressKind::TurnsHeld,
            OrderKind::ExplorePlanets => ProgressKind::PlanetsDiscovered,
            OrderKind::EstablishRelations => ProgressKind::RelationsEstablished,
        }
    }
}

impl fmt::Display for OrderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for OrderKind {
    type Err = UnknownOrderKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ALL_ORDER_KINDS
            .iter()
            .copied()
            .find(|k| k.tag() == s)
            .ok_or_else(|| UnknownOrderKind(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown order type '{0}'")]
pub struct UnknownOrderKind(pub String);

/// A liberation-progress counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProgressKind {
    PlanetsConquered,
    SectorsLiberated,
    ResourcesGathered,
    TurnsHeld,
    PlanetsDiscovered,
    RelationsEstablished,
}

/// Accumulated counters feeding order completion. Reset whenever the current
/// order changes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LiberationProgress {
    pub planets_conquered: u64,
    pub sectors_liberated: u64,
    pub resources_gathered: u64,
    pub turns_held: u64,
    pub planets_discovered: u64,
    pub relations_established: u64,
}

impl LiberationProgress {
    fn slot(&mut self, kind: ProgressKind) -> &mut u64 {
        match kind {
            ProgressKind::PlanetsConquered => &mut self.planets_conquered,
            ProgressKind::SectorsLiberated => &mut self.sectors_liberated,
            ProgressKind::ResourcesGathered => &mut self.resources_gathered,
            ProgressKind::TurnsHeld => &mut self.turns_held,
            ProgressKind::PlanetsDiscovered => &mut self.planets_discovered,
            ProgressKind::RelationsEstablished => &mut self.relations_established,
        }
    }

    pub fn get(&self, kind: ProgressKind) -> u64 {
        match kind {
            ProgressKind::PlanetsConquered => self.planets_conquered,
            ProgressKind::SectorsLiberated => self.sectors_liberated,
            ProgressKind::ResourcesGathered => self.resources_gathered,
            ProgressKind::TurnsHeld => self.turns_held,
            ProgressKind::PlanetsDiscovered => self.planets_discovered,
            ProgressKind::RelationsEstablished => self.relations_established,
        }
    }

    pub fn add(&mut self, kind: ProgressKind, amount: u64) {
        let slot = self.slot(kind);
        *slot = slot.saturating_add(amount);
    }

    pub fn is_empty(&self) -> bool {
        *self == LiberationProgress::default()
    }

    pub fn reset(&mut self) {
        *self = LiberationProgress::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_parse_back() {
        for kind in ALL_ORDER_KINDS {
            assert_eq!(kind.tag().parse::<OrderKind>(), Ok(kind));
        }
        assert_eq!(
            "UNKNOWN".parse::<OrderKind>(),
            Err(UnknownOrderKind("UNKNOWN".to_string()))
        );
    }

    #[test]
    fn serde_uses_tags() {
        let json = serde_json::to_string(&OrderKind::HoldTerritory).unwrap();
        assert_eq!(json, format!("\"{}\"", OrderKind::HoldTerritory.tag()));
    }

    #[test]
    fn counters_are_independent() {
        let mut progress = LiberationProgress::default();
        assert!(progress.is_empty());
        progress.add(ProgressKind::PlanetsConquered, 2);
        progress.add(ProgressKind::TurnsHeld, 1);
        progress.add(ProgressKind::PlanetsConquered, 1);
        assert_eq!(progress.get(ProgressKind::PlanetsConquered), 3);
        assert_eq!(progress.get(ProgressKind::TurnsHeld), 1);
        assert_eq!(progress.get(ProgressKind::SectorsLiberated), 0);
        progress.reset();
        assert!(progress.is_empty());
    }

    #[test]
    fn every_kind_has_a_distinct_counter() {
        let mut progress = LiberationProgress::default();
        for (i, kind) in ALL_ORDER_KINDS.iter().enumerate() {
            progress.add(kind.progress_kind(), i as u64 + 1);
        }
        for (i, kind) in ALL_ORDER_KINDS.iter().enumerate() {
            assert_eq!(progress.get(kind.progress_kind()), i as u64 + 1);
        }
    }
}
