//! Auto-distribution of the shared resource pool across factions.
//!
//! Runs once per turn after harvesting. A custom mode replaces all built-in
//! behaviour; otherwise the manual allocation is applied and, unless the mode
//! is `MANUAL`, every faction's entry is overwritten with its share of the
//! summed totals.

use std::collections::BTreeMap;
use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::ledger::{Allocation, ResourceLedger};
use crate::galaxy::{FactionId, Galaxy};

/// How the shared pool is split.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DistributionMode {
    #[default]
    Equal,
    StrategicValue,
    TerritoryBased,
    Random,
    NeedBased,
    Manual,
    /// Name of a user-defined mode.
    Custom(String),
}

impl DistributionMode {
    pub fn name(&self) -> &str {
        match self {
            DistributionMode::Equal => "EQUAL",
            DistributionMode::StrategicValue => "STRATEGIC_VALUE",
            DistributionMode::TerritoryBased => "TERRITORY_BASED",
            DistributionMode::Random => "RANDOM",
            DistributionMode::NeedBased => "NEED_BASED",
            DistributionMode::Manual => "MANUAL",
            DistributionMode::Custom(name) => name,
        }
    }
}

impl From<String> for DistributionMode {
    fn from(s: String) -> Self {
        match s.as_str() {
            "EQUAL" => DistributionMode::Equal,
            "STRATEGIC_VALUE" => DistributionMode::StrategicValue,
            "TERRITORY_BASED" => DistributionMode::TerritoryBased,
            "RANDOM" => DistributionMode::Random,
            "NEED_BASED" => DistributionMode::NeedBased,
            "MANUAL" => DistributionMode::Manual,
            _ => DistributionMode::Custom(s),
        }
    }
}

impl From<&str> for DistributionMode {
    fn from(s: &str) -> Self {
        DistributionMode::from(s.to_string())
    }
}

impl From<DistributionMode> for String {
    fn from(mode: DistributionMode) -> Self {
        mode.name().to_string()
    }
}

impl fmt::Display for DistributionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Auto-distribution settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AutoDistributionConfig {
    pub enabled: bool,
    pub mode: DistributionMode,
    /// Faction → resource → signed delta, applied every distribution.
    pub manual_allocation: BTreeMap<FactionId, Allocation>,
}

/// A named, user-defined allocation applied additively.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomDistributionMode {
    pub name: String,
    pub allocation: BTreeMap<FactionId, Allocation>,
}

/// Registry of custom modes, unique by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomModes(Vec<CustomDistributionMode>);

impl CustomModes {
    pub fn new() -> Self {
        CustomModes::default()
    }

    /// Adds a mode, replacing any mode with the same name. Returns the
    /// replaced mode.
    pub fn upsert(&mut self, mode: CustomDistributionMode) -> Option<CustomDistributionMode> {
        match self.0.iter_mut().find(|m| m.name == mode.name) {
            Some(existing) => Some(std::mem::replace(existing, mode)),
            None => {
                self.0.push(mode);
                None
            }
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<CustomDistributionMode> {
        let idx = self.0.iter().position(|m| m.name == name)?;
        Some(self.0.remove(idx))
    }

    pub fn get(&self, name: &str) -> Option<&CustomDistributionMode> {
        self.0.iter().find(|m| m.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CustomDistributionMode> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// What a distribution pass did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DistributionOutcome {
    Disabled,
    /// A custom mode's allocation was applied and nothing else ran.
    Custom(String),
    /// Only the manual allocation was applied.
    ManualOnly,
    /// Manual allocation, then every entry overwritten by the built-in mode.
    Redistributed(DistributionMode),
    /// The mode names neither a built-in nor a registered custom mode; only
    /// the manual allocation was applied.
    UnknownMode(String),
}

/// Per-faction weighting for a proportional split.
enum Shares {
    Equal,
    Weighted(Vec<u64>),
    Random,
}

/// Runs one distribution pass over `ledger`.
pub fn distribute(
    config: &AutoDistributionConfig,
    custom_modes: &CustomModes,
    galaxy: &Galaxy,
    ledger: &mut ResourceLedger,
    rng: &mut impl Rng,
) -> DistributionOutcome {
    if !config.enabled {
        return DistributionOutcome::Disabled;
    }

    if let Some(custom) = custom_modes.get(config.mode.name()) {
        for (faction, allocation) in &custom.allocation {
            ledger.apply_allocation(faction, allocation);
        }
        return DistributionOutcome::Custom(custom.name.clone());
    }

    for (faction, allocation) in &config.manual_allocation {
        ledger.apply_allocation(faction, allocation);
    }

    let shares = match &config.mode {
        DistributionMode::Manual => return DistributionOutcome::ManualOnly,
        DistributionMode::Custom(name) => return DistributionOutcome::UnknownMode(name.clone()),
        DistributionMode::Equal => Shares::Equal,
        DistributionMode::Random => Shares::Random,
        DistributionMode::StrategicValue => weighted_or_equal(owned_sums(galaxy, ledger, |p| {
            u64::from(p.strategic_value)
        })),
        DistributionMode::TerritoryBased => {
            weighted_or_equal(owned_sums(galaxy, ledger, |_| 1))
        }
        DistributionMode::NeedBased => Shares::Weighted(need_weights(&owned_sums(galaxy, ledger, |_| 1))),
    };

    redistribute(&shares, ledger, rng);
    DistributionOutcome::Redistributed(config.mode.clone())
}

/// For each ledger faction (in ledger order), the sum of `score` over its
/// owned planets.
fn owned_sums(
    galaxy: &Galaxy,
    ledger: &ResourceLedger,
    score: impl Fn(&crate::galaxy::Planet) -> u64,
) -> Vec<u64> {
    ledger
        .factions()
        .map(|f| galaxy.owned_by(f).map(&score).sum())
        .collect()
}

fn weighted_or_equal(weights: Vec<u64>) -> Shares {
    if weights.iter().sum::<u64>() == 0 {
        Shares::Equal
    } else {
        Shares::Weighted(weights)
    }
}

/// `max - count + 1` per faction: fewer planets, larger weight.
fn need_weights(counts: &[u64]) -> Vec<u64> {
    let max = counts.iter().copied().max().unwrap_or(0);
    counts.iter().map(|&c| max - c + 1).collect()
}

/// Overwrites every (faction, resource) entry with its share of that
/// resource's total.
fn redistribute(shares: &Shares, ledger: &mut ResourceLedger, rng: &mut impl Rng) {
    let factions: Vec<FactionId> = ledger.factions().cloned().collect();
    let n = factions.len() as u64;
    if n == 0 {
        return;
    }
    let weight_sum: u64 = match shares {
        Shares::Weighted(w) => w.iter().sum(),
        _ => 0,
    };

    for resource in ledger.resource_ids() {
        let total = ledger.total_of(&resource);
        for (i, faction) in factions.iter().enumerate() {
            let amount = match shares {
                Shares::Equal => total / n,
                Shares::Weighted(weights) => proportional(total, weights[i], weight_sum),
                Shares::Random => {
                    let spread = (rng.gen::<f64>() * total as f64 * 0.5).floor() as u64;
                    spread + total / (n * 2)
                }
            };
            ledger.set(faction, &resource, amount);
        }
    }
}

/// `floor(total * weight / sum)` without intermediate overflow.
fn proportional(total: u64, weight: u64, sum: u64) -> u64 {
    if sum == 0 {
        return 0;
    }
    (u128::from(total) * u128::from(weight) / u128::from(sum)) as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::galaxy::{Planet, PlanetId, Position};
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn enabled(mode: DistributionMode) -> AutoDistributionConfig {
        AutoDistributionConfig { enabled: true, mode, ..AutoDistributionConfig::default() }
    }

    fn ledger(entries: &[(&str, &str, u64)]) -> ResourceLedger {
        let mut l = ResourceLedger::new();
        for (f, r, a) in entries {
            l.add(f, r, *a);
        }
        l
    }

    /// `owned[i]` planets for faction `factions[i]`, each with `value` strategic value.
    fn galaxy(owned: &[(&str, u32, u32)]) -> Galaxy {
        let mut g = Galaxy::default();
        let mut next = 0;
        for (faction, count, value) in owned {
            for _ in 0..*count {
                let mut p = Planet::new(PlanetId(next), "p", Position::default());
                p.owner = Some(faction.to_string());
                p.strategic_value = *value;
                g.planets.insert(p.id, p);
                next += 1;
            }
        }
        g
    }

    fn rng() -> SmallRng {
        SmallRng::seed_from_u64(42)
    }

    #[test]
    fn disabled_does_nothing() {
        let mut l = ledger(&[("A", "ore", 10), ("B", "ore", 0)]);
        let before = l.clone();
        let config = AutoDistributionConfig { enabled: false, ..enabled(DistributionMode::Equal) };
        let out = distribute(&config, &CustomModes::new(), &Galaxy::default(), &mut l, &mut rng());
        assert_eq!(out, DistributionOutcome::Disabled);
        assert_eq!(l, before);
    }

    #[test]
    fn equal_splits_floor() {
        let mut l = ledger(&[("A", "ore", 10), ("B", "ore", 0), ("C", "ore", 1)]);
        distribute(&enabled(DistributionMode::Equal), &CustomModes::new(), &Galaxy::default(), &mut l, &mut rng());
        for f in ["A", "B", "C"] {
            assert_eq!(l.amount(f, "ore"), 3);
        }
    }

    #[test]
    fn strategic_value_is_proportional() {
        let g = galaxy(&[("A", 1, 3), ("B", 1, 1)]);
        let mut l = ledger(&[("A", "ore", 0), ("B", "ore", 100)]);
        distribute(&enabled(DistributionMode::StrategicValue), &CustomModes::new(), &g, &mut l, &mut rng());
        assert_eq!(l.amount("A", "ore"), 75);
        assert_eq!(l.amount("B", "ore"), 25);
    }

    #[test]
    fn strategic_value_without_planets_falls_back_to_equal() {
        let mut l = ledger(&[("A", "ore", 9), ("B", "ore", 0)]);
        distribute(&enabled(DistributionMode::StrategicValue), &CustomModes::new(), &Galaxy::default(), &mut l, &mut rng());
        assert_eq!(l.amount("A", "ore"), 4);
        assert_eq!(l.amount("B", "ore"), 4);
    }

    #[test]
    fn territory_uses_planet_counts() {
        let g = galaxy(&[("A", 3, 1), ("B", 1, 1)]);
        let mut l = ledger(&[("A", "ore", 10), ("B", "ore", 10)]);
        distribute(&enabled(DistributionMode::TerritoryBased), &CustomModes::new(), &g, &mut l, &mut rng());
        assert_eq!(l.amount("A", "ore"), 15);
        assert_eq!(l.amount("B", "ore"), 5);
    }

    #[test]
    fn need_based_favours_smaller_factions() {
        // counts 3 and 1 → weights 1 and 3.
        let g = galaxy(&[("A", 3, 1), ("B", 1, 1)]);
        let mut l = ledger(&[("A", "ore", 20), ("B", "ore", 0)]);
        distribute(&enabled(DistributionMode::NeedBased), &CustomModes::new(), &g, &mut l, &mut rng());
        assert_eq!(l.amount("A", "ore"), 5);
        assert_eq!(l.amount("B", "ore"), 15);
    }

    #[test]
    fn random_stays_within_bounds() {
        let mut l = ledger(&[("A", "ore", 40), ("B", "ore", 0)]);
        distribute(&enabled(DistributionMode::Random), &CustomModes::new(), &Galaxy::default(), &mut l, &mut rng());
        for f in ["A", "B"] {
            let v = l.amount(f, "ore");
            // floor(total / 4) + [0, total / 2)
            assert!((10..30).contains(&v), "{} got {}", f, v);
        }
    }

    #[test]
    fn manual_allocation_applies_before_overwrite() {
        let mut config = enabled(DistributionMode::Equal);
        config.manual_allocation.insert("A".to_string(), [("ore".to_string(), 4)].into());
        let mut l = ledger(&[("A", "ore", 10), ("B", "ore", 0)]);
        distribute(&config, &CustomModes::new(), &Galaxy::default(), &mut l, &mut rng());
        assert_eq!(l.amount("A", "ore"), 7);
        assert_eq!(l.amount("B", "ore"), 7);
    }

    #[test]
    fn manual_mode_only_applies_allocation() {
        let mut config = enabled(DistributionMode::Manual);
        config.manual_allocation.insert("B".to_string(), [("ore".to_string(), -3), ("food".to_string(), 2)].into());
        let mut l = ledger(&[("A", "ore", 10), ("B", "ore", 1)]);
        let out = distribute(&config, &CustomModes::new(), &Galaxy::default(), &mut l, &mut rng());
        assert_eq!(out, DistributionOutcome::ManualOnly);
        assert_eq!(l.amount("A", "ore"), 10);
        assert_eq!(l.amount("B", "ore"), 0);
        assert_eq!(l.amount("B", "food"), 2);
    }

    #[test]
    fn custom_mode_replaces_everything() {
        let mut modes = CustomModes::new();
        modes.upsert(CustomDistributionMode {
            name: "tithe".to_string(),
            allocation: [
                ("A".to_string(), [("ore".to_string(), -2)].into()),
                ("B".to_string(), [("ore".to_string(), 2)].into()),
            ]
            .into(),
        });
        let mut config = enabled(DistributionMode::from("tithe"));
        config.manual_allocation.insert("A".to_string(), [("ore".to_string(), 100)].into());
        let mut l = ledger(&[("A", "ore", 10), ("B", "ore", 0)]);
        let out = distribute(&config, &modes, &Galaxy::default(), &mut l, &mut rng());
        assert_eq!(out, DistributionOutcome::Custom("tithe".to_string()));
        assert_eq!(l.amount("A", "ore"), 8);
        assert_eq!(l.amount("B", "ore"), 2);
    }

    #[test]
    fn unknown_custom_mode_applies_manual_only() {
        let mut config = enabled(DistributionMode::from("missing"));
        config.manual_allocation.insert("A".to_string(), [("ore".to_string(), 1)].into());
        let mut l = ledger(&[("A", "ore", 10), ("B", "ore", 0)]);
        let out = distribute(&config, &CustomModes::new(), &Galaxy::default(), &mut l, &mut rng());
        assert_eq!(out, DistributionOutcome::UnknownMode("missing".to_string()));
        assert_eq!(l.amount("A", "ore"), 11);
    }

    #[test]
    fn mode_names_round_trip_through_serde() {
        let json = serde_json::to_string(&DistributionMode::NeedBased).unwrap();
        assert_eq!(json, r#""NEED_BASED""#);
        let custom: DistributionMode = serde_json::from_str(r#""tithe""#).unwrap();
        assert_eq!(custom, DistributionMode::Custom("tithe".to_string()));
    }

    #[test]
    fn upsert_replaces_by_name() {
        let mut modes = CustomModes::new();
        let mode = |n: i64| CustomDistributionMode {
            name: "x".to_string(),
            allocation: [("A".to_string(), [("ore".to_string(), n)].into())].into(),
        };
        assert!(modes.upsert(mode(1)).is_none());
        assert!(modes.upsert(mode(2)).is_some());
        assert_eq!(modes.len(), 1);
        assert!(modes.remove("x").is_some());
        assert!(modes.is_empty());
    }
}
