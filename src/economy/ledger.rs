//! Per-faction resource pools.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::galaxy::{FactionId, ResourceId};

/// Resource amounts for one faction.
pub type Pool = BTreeMap<ResourceId, u64>;

/// A signed change to apply to a faction's pool. Negative entries are costs.
pub type Allocation = BTreeMap<ResourceId, i64>;

/// Faction id → resource id → amount. Amounts never go below zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceLedger {
    pools: BTreeMap<FactionId, Pool>,
}

impl ResourceLedger {
    pub fn new() -> Self {
        ResourceLedger::default()
    }

    /// Ensures the faction has a (possibly empty) pool.
    pub fn register(&mut self, faction: impl Into<FactionId>) {
        self.pools.entry(faction.into()).or_default();
    }

    pub fn pool(&self, faction: &str) -> Option<&Pool> {
        self.pools.get(faction)
    }

    pub fn amount(&self, faction: &str, resource: &str) -> u64 {
        self.pools
            .get(faction)
            .and_then(|p| p.get(resource))
            .copied()
            .unwrap_or(0)
    }

    /// Overwrites one entry, creating the faction if needed.
    pub fn set(&mut self, faction: &str, resource: &str, amount: u64) {
        self.pools
            .entry(faction.to_string())
            .or_default()
            .insert(resource.to_string(), amount);
    }

    /// Adds to one entry, creating the faction and resource if needed.
    pub fn add(&mut self, faction: &str, resource: &str, amount: u64) {
        let entry = self
            .pools
            .entry(faction.to_string())
            .or_default()
            .entry(resource.to_string())
            .or_insert(0);
        *entry = entry.saturating_add(amount);
    }

    /// Applies a signed delta, flooring the result at zero.
    pub fn apply_delta(&mut self, faction: &str, resource: &str, delta: i64) {
        let entry = self
            .pools
            .entry(faction.to_string())
            .or_default()
            .entry(resource.to_string())
            .or_insert(0);
        *entry = if delta >= 0 {
            entry.saturating_add(delta.unsigned_abs())
        } else {
            entry.saturating_sub(delta.unsigned_abs())
        };
    }

    /// Applies every entry of `allocation` to the faction's pool.
    pub fn apply_allocation(&mut self, faction: &str, allocation: &Allocation) {
        for (resource, &delta) in allocation {
            self.apply_delta(faction, resource, delta);
        }
    }

    /// The first resource in `cost` the faction cannot cover, as
    /// `(resource, needed, available)`.
    pub fn shortfall<'a>(&self, faction: &str, cost: &'a Pool) -> Option<(&'a ResourceId, u64, u64)> {
        cost.iter().find_map(|(resource, &needed)| {
            let available = self.amount(faction, resource);
            (available < needed).then_some((resource, needed, available))
        })
    }

    pub fn can_afford(&self, faction: &str, cost: &Pool) -> bool {
        self.shortfall(faction, cost).is_none()
    }

    /// Subtracts `cost`. Returns false and changes nothing if unaffordable.
    pub fn deduct(&mut self, faction: &str, cost: &Pool) -> bool {
        if !self.can_afford(faction, cost) {
            return false;
        }
        for (resource, &amount) in cost {
            self.apply_delta(faction, resource, -(amount.min(i64::MAX as u64) as i64));
        }
        true
    }

    /// Sum of `resource` over every faction.
    pub fn total_of(&self, resource: &str) -> u64 {
        self.pools
            .values()
            .filter_map(|p| p.get(resource))
            .fold(0u64, |acc, &v| acc.saturating_add(v))
    }

    /// Union of resource ids held by any faction.
    pub fn resource_ids(&self) -> BTreeSet<ResourceId> {
        self.pools.values().flat_map(|p| p.keys().cloned()).collect()
    }

    pub fn factions(&self) -> impl Iterator<Item = &FactionId> {
        self.pools.keys()
    }

    pub fn faction_count(&self) -> usize {
        self.pools.len()
    }

    /// Mutable access to every resource entry of one faction.
    pub fn resources_mut(&mut self, faction: &str) -> Option<impl Iterator<Item = &mut u64>> {
        self.pools.get_mut(faction).map(|p| p.values_mut())
    }
}
