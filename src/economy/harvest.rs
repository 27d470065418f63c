//! Per-turn harvesting of owned-planet yields.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::ledger::ResourceLedger;
use crate::galaxy::{FactionId, Galaxy, ResourceId};

/// Faction-wide upgrades that alter harvest yields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Modifier {
    /// Multiplies every yield by 1.5 (rounded down).
    TradeHub,
    /// Adds 1 to every yield, after the trade hub bonus.
    MiningUpgrade,
}

/// Modifiers owned by each faction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlanetModifiers {
    by_faction: BTreeMap<FactionId, BTreeSet<Modifier>>,
}

impl PlanetModifiers {
    pub fn new() -> Self {
        PlanetModifiers::default()
    }

    pub fn grant(&mut self, faction: impl Into<FactionId>, modifier: Modifier) -> bool {
        self.by_faction.entry(faction.into()).or_default().insert(modifier)
    }

    pub fn revoke(&mut self, faction: &str, modifier: Modifier) -> bool {
        self.by_faction
            .get_mut(faction)
            .is_some_and(|set| set.remove(&modifier))
    }

    pub fn has(&self, faction: &str, modifier: Modifier) -> bool {
        self.by_faction
            .get(faction)
            .is_some_and(|set| set.contains(&modifier))
    }

    /// Applies the faction's modifiers to a base yield in fixed order:
    /// trade hub first, then mining upgrade.
    pub fn apply(&self, faction: &str, base: u32) -> u64 {
        let mut amount = u64::from(base);
        if self.has(faction, Modifier::TradeHub) {
            amount = amount * 3 / 2;
        }
        if self.has(faction, Modifier::MiningUpgrade) {
            amount += 1;
        }
        amount
    }
}

/// What a harvest produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HarvestReport {
    /// Faction → resource → amount gained this turn.
    pub gained: BTreeMap<FactionId, BTreeMap<ResourceId, u64>>,
    /// Sum of everything gained.
    pub total: u64,
}

/// Adds every owned planet's modified yields to its owner's pool.
pub fn harvest(
    galaxy: &Galaxy,
    modifiers: &PlanetModifiers,
    ledger: &mut ResourceLedger,
) -> HarvestReport {
    let mut report = HarvestReport::default();

    for planet in galaxy.planets.values() {
        let Some(owner) = planet.owner.as_deref() else {
            continue;
        };
        for (resource, &base) in &planet.yields {
            let amount = modifiers.apply(owner, base);
            ledger.add(owner, resource, amount);
            *report
                .gained
                .entry(owner.to_string())
                .or_default()
                .entry(resource.clone())
                .or_insert(0) += amount;
            report.total += amount;
        }
    }

    report
}
