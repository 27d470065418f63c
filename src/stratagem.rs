//! Stratagems: faction-purchasable one-shot tactical actions.
//!
//! Each stratagem has a resource cost and a per-faction cooldown. Effects are
//! a fixed table keyed by [`StratagemId`].

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::economy::{Pool, ResourceLedger};
use crate::galaxy::{FactionId, Galaxy, PlanetId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StratagemId {
    OrbitalBombardment,
    Reinforcement,
    SupplyDrop,
}

pub const ALL_STRATAGEMS: [StratagemId; 3] = [
    StratagemId::OrbitalBombardment,
    StratagemId::Reinforcement,
    StratagemId::SupplyDrop,
];

/// Defense lost to an orbital bombardment.
const BOMBARDMENT_DAMAGE: u32 = 4;
/// Defense gained from a reinforcement.
const REINFORCEMENT_BONUS: u32 = 3;
/// Added to every resource in the pool by a supply drop.
const SUPPLY_DROP_AMOUNT: u64 = 2;

impl StratagemId {
    pub const fn tag(self) -> &'static str {
        match self {
            StratagemId::OrbitalBombardment => "orbital_bombardment",
            StratagemId::Reinforcement => "reinforcement",
            StratagemId::SupplyDrop => "supply_drop",
        }
    }

    pub const fn display_name(self) -> &'static str {
        match self {
            StratagemId::OrbitalBombardment => "Orbital Bombardment",
            StratagemId::Reinforcement => "Reinforcement",
            StratagemId::SupplyDrop => "Supply Drop",
        }
    }
}

impl fmt::Display for StratagemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for StratagemId {
    type Err = StratagemError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ALL_STRATAGEMS
            .iter()
            .copied()
            .find(|id| id.tag() == s)
            .ok_or_else(|| StratagemError::Unknown(s.to_string()))
    }
}

/// Why a stratagem could not be used.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StratagemError {
    #[error("unknown stratagem '{0}'")]
    Unknown(String),

    #[error("{id} is on cooldown for {remaining} more turn(s)")]
    OnCooldown { id: StratagemId, remaining: u32 },

    #[error("insufficient {resource}: need {needed}, have {available}")]
    Insufficient {
        resource: String,
        needed: u64,
        available: u64,
    },

    #[error("{0} requires a target planet")]
    TargetRequired(StratagemId),

    #[error("target planet {0} not found")]
    TargetNotFound(PlanetId),
}

/// Catalog entry for one stratagem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StratagemDefinition {
    pub cost: Pool,
    /// Turns before the faction may use it again.
    pub cooldown: u32,
    pub requires_target: bool,
}

/// The stratagems on offer. Ids missing from the catalog are unknown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StratagemCatalog(BTreeMap<StratagemId, StratagemDefinition>);

impl StratagemCatalog {
    pub fn empty() -> Self {
        StratagemCatalog(BTreeMap::new())
    }

    pub fn insert(&mut self, id: StratagemId, definition: StratagemDefinition) {
        self.0.insert(id, definition);
    }

    pub fn get(&self, id: StratagemId) -> Option<&StratagemDefinition> {
        self.0.get(&id)
    }
}

impl Default for StratagemCatalog {
    fn default() -> Self {
        let cost = |entries: &[(&str, u64)]| -> Pool {
            entries.iter().map(|(r, a)| (r.to_string(), *a)).collect()
        };
        let mut catalog = StratagemCatalog::empty();
        catalog.insert(
            StratagemId::OrbitalBombardment,
            StratagemDefinition {
                cost: cost(&[("energy", 5), ("ore", 2)]),
                cooldown: 3,
                requires_target: true,
            },
        );
        catalog.insert(
            StratagemId::Reinforcement,
            StratagemDefinition {
                cost: cost(&[("food", 3), ("ore", 3)]),
                cooldown: 2,
                requires_target: true,
            },
        );
        catalog.insert(
            StratagemId::SupplyDrop,
            StratagemDefinition {
                cost: cost(&[("energy", 2)]),
                cooldown: 4,
                requires_target: false,
            },
        );
        catalog
    }
}

/// Remaining cooldown turns per (faction, stratagem).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CooldownTable(BTreeMap<FactionId, BTreeMap<StratagemId, u32>>);

impl CooldownTable {
    pub fn new() -> Self {
        CooldownTable::default()
    }

    pub fn remaining(&self, faction: &str, id: StratagemId) -> u32 {
        self.0
            .get(faction)
            .and_then(|m| m.get(&id))
            .copied()
            .unwrap_or(0)
    }

    /// Overwrites the entry.
    pub fn set(&mut self, faction: &str, id: StratagemId, turns: u32) {
        self.0.entry(faction.to_string()).or_default().insert(id, turns);
    }

    /// Decrements every entry by one, floored at zero.
    pub fn advance_turn(&mut self) {
        for entries in self.0.values_mut() {
            for turns in entries.values_mut() {
                *turns = turns.saturating_sub(1);
            }
        }
    }
}

/// Catalog plus cooldown state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stratagems {
    pub catalog: StratagemCatalog,
    pub cooldowns: CooldownTable,
}

impl Stratagems {
    pub fn new(catalog: StratagemCatalog, cooldowns: CooldownTable) -> Self {
        Stratagems { catalog, cooldowns }
    }

    /// Checks the id is known, off cooldown, and affordable.
    pub fn can_use(
        &self,
        ledger: &ResourceLedger,
        faction: &str,
        id: StratagemId,
    ) -> Result<&StratagemDefinition, StratagemError> {
        let definition = self
            .catalog
            .get(id)
            .ok_or_else(|| StratagemError::Unknown(id.tag().to_string()))?;
        let remaining = self.cooldowns.remaining(faction, id);
        if remaining > 0 {
            return Err(StratagemError::OnCooldown { id, remaining });
        }
        if let Some((resource, needed, available)) = ledger.shortfall(faction, &definition.cost) {
            return Err(StratagemError::Insufficient {
                resource: resource.clone(),
                needed,
                available,
            });
        }
        Ok(definition)
    }

    /// Validates, pays the cost, applies the effect, and starts the cooldown.
    /// Nothing changes on failure.
    pub fn use_stratagem(
        &mut self,
        ledger: &mut ResourceLedger,
        galaxy: &mut Galaxy,
        faction: &str,
        id: StratagemId,
        target: Option<PlanetId>,
    ) -> Result<String, StratagemError> {
        let definition = self.can_use(ledger, faction, id)?.clone();
        if definition.requires_target {
            let planet = target.ok_or(StratagemError::TargetRequired(id))?;
            if galaxy.planet(planet).is_none() {
                return Err(StratagemError::TargetNotFound(planet));
            }
        }

        ledger.deduct(faction, &definition.cost);
        let message = apply_effect(id, ledger, galaxy, faction, target);
        self.cooldowns.set(faction, id, definition.cooldown);

        tracing::info!(
            target: "galaxy_campaign::stratagems",
            faction,
            stratagem = id.tag(),
            target_planet = ?target,
            cooldown = definition.cooldown,
            "stratagem.used"
        );
        Ok(message)
    }

    pub fn advance_turn(&mut self) {
        self.cooldowns.advance_turn();
    }
}

/// The effect table.
fn apply_effect(
    id: StratagemId,
    ledger: &mut ResourceLedger,
    galaxy: &mut Galaxy,
    faction: &str,
    target: Option<PlanetId>,
) -> String {
    match id {
        StratagemId::OrbitalBombardment => {
            adjust_defense(galaxy, target, id, |d| d.saturating_sub(BOMBARDMENT_DAMAGE))
        }
        StratagemId::Reinforcement => {
            adjust_defense(galaxy, target, id, |d| d.saturating_add(REINFORCEMENT_BONUS))
        }
        StratagemId::SupplyDrop => {
            if let Some(entries) = ledger.resources_mut(faction) {
                for amount in entries {
                    *amount = amount.saturating_add(SUPPLY_DROP_AMOUNT);
                }
            }
            format!("{} delivered to {}", id, faction)
        }
    }
}

fn adjust_defense(
    galaxy: &mut Galaxy,
    target: Option<PlanetId>,
    id: StratagemId,
    change: impl Fn(u32) -> u32,
) -> String {
    let planet = match target {
        Some(t) => galaxy.planet_mut(t),
        None => None,
    };
    match planet {
        Some(planet) => {
            let before = planet.defense;
            planet.defense = change(before);
            format!(
                "{} hit {} (defense {} -> {})",
                id, planet.name, before, planet.defense
            )
        }
        None => format!("{} had no target", id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::galaxy::{Planet, Position};

    fn setup() -> (Stratagems, ResourceLedger, Galaxy) {
        let mut ledger = ResourceLedger::new();
        ledger.add("red", "energy", 20);
        ledger.add("red", "ore", 20);
        ledger.add("red", "food", 20);
        let mut galaxy = Galaxy::default();
        let mut planet = Planet::new(PlanetId(0), "Vega I", Position::default());
        planet.defense = 6;
        galaxy.planets.insert(planet.id, planet);
        (Stratagems::default(), ledger, galaxy)
    }

    #[test]
    fn bombardment_reduces_defense_floored() {
        let (mut s, mut ledger, mut galaxy) = setup();
        let msg = s
            .use_stratagem(&mut ledger, &mut galaxy, "red", StratagemId::OrbitalBombardment, Some(PlanetId(0)))
            .unwrap();
        assert!(msg.contains("6 -> 2"), "{}", msg);
        assert_eq!(ledger.amount("red", "energy"), 15);
        assert_eq!(ledger.amount("red", "ore"), 18);
        s.cooldowns.set("red", StratagemId::OrbitalBombardment, 0);
        s.use_stratagem(&mut ledger, &mut galaxy, "red", StratagemId::OrbitalBombardment, Some(PlanetId(0)))
            .unwrap();
        assert_eq!(galaxy.planet(PlanetId(0)).unwrap().defense, 0);
    }

    #[test]
    fn reinforcement_raises_defense() {
        let (mut s, mut ledger, mut galaxy) = setup();
        s.use_stratagem(&mut ledger, &mut galaxy, "red", StratagemId::Reinforcement, Some(PlanetId(0)))
            .unwrap();
        assert_eq!(galaxy.planet(PlanetId(0)).unwrap().defense, 9);
    }

    #[test]
    fn supply_drop_tops_up_every_known_resource() {
        let (mut s, mut ledger, mut galaxy) = setup();
        s.use_stratagem(&mut ledger, &mut galaxy, "red", StratagemId::SupplyDrop, None)
            .unwrap();
        assert_eq!(ledger.amount("red", "energy"), 20);
        assert_eq!(ledger.amount("red", "ore"), 22);
        assert_eq!(ledger.amount("red", "food"), 22);
        assert_eq!(ledger.amount("red", "crystal"), 0);
    }

    #[test]
    fn cooldown_blocks_without_side_effects() {
        let (mut s, mut ledger, mut galaxy) = setup();
        s.cooldowns.set("red", StratagemId::Reinforcement, 2);
        let before = ledger.clone();
        let err = s
            .use_stratagem(&mut ledger, &mut galaxy, "red", StratagemId::Reinforcement, Some(PlanetId(0)))
            .unwrap_err();
        assert_eq!(err, StratagemError::OnCooldown { id: StratagemId::Reinforcement, remaining: 2 });
        assert!(err.to_string().contains("cooldown for 2"));
        assert_eq!(ledger, before);
        assert_eq!(galaxy.planet(PlanetId(0)).unwrap().defense, 6);
    }

    #[test]
    fn cooldown_set_then_decremented() {
        let (mut s, mut ledger, mut galaxy) = setup();
        s.use_stratagem(&mut ledger, &mut galaxy, "red", StratagemId::SupplyDrop, None)
            .unwrap();
        assert_eq!(s.cooldowns.remaining("red", StratagemId::SupplyDrop), 4);
        s.advance_turn();
        assert_eq!(s.cooldowns.remaining("red", StratagemId::SupplyDrop), 3);
        for _ in 0..10 {
            s.advance_turn();
        }
        assert_eq!(s.cooldowns.remaining("red", StratagemId::SupplyDrop), 0);
    }

    #[test]
    fn insufficient_resources_reported() {
        let (s, _, _) = setup();
        let poor = ResourceLedger::new();
        let err = s.can_use(&poor, "blue", StratagemId::SupplyDrop).unwrap_err();
        assert_eq!(
            err,
            StratagemError::Insufficient { resource: "energy".to_string(), needed: 2, available: 0 }
        );
    }

    #[test]
    fn target_checks() {
        let (mut s, mut ledger, mut galaxy) = setup();
        let before = ledger.clone();
        assert_eq!(
            s.use_stratagem(&mut ledger, &mut galaxy, "red", StratagemId::OrbitalBombardment, None),
            Err(StratagemError::TargetRequired(StratagemId::OrbitalBombardment))
        );
        assert_eq!(
            s.use_stratagem(&mut ledger, &mut galaxy, "red", StratagemId::OrbitalBombardment, Some(PlanetId(9))),
            Err(StratagemError::TargetNotFound(PlanetId(9)))
        );
        assert_eq!(ledger, before);
        assert_eq!(s.cooldowns.remaining("red", StratagemId::OrbitalBombardment), 0);
    }

    #[test]
    fn missing_catalog_entry_is_unknown() {
        let s = Stratagems::new(StratagemCatalog::empty(), CooldownTable::new());
        let err = s.can_use(&ResourceLedger::new(), "red", StratagemId::SupplyDrop).unwrap_err();
        assert_eq!(err, StratagemError::Unknown("supply_drop".to_string()));
        assert_eq!("napalm".parse::<StratagemId>(), Err(StratagemError::Unknown("napalm".to_string())));
    }
}
