//! Campaign state and the turn pipeline.
//!
//! [`Campaign`] owns every piece of campaign state and is the single entry
//! point callers drive. Turns advance through a fixed pipeline:
//!
//! 1. route events age and expire
//! 2. owned planets are harvested
//! 3. auto-distribution runs over the harvested totals
//! 4. order progress is recorded and evaluated
//! 5. the order expiry moves one day closer
//! 6. stratagem cooldowns tick down
//!
//! Progress is evaluated before expiry so an order completed this turn is
//! never also force-expired.

use std::collections::{BTreeMap, BTreeSet};

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::clock::Clock;
use crate::config::CampaignConfig;
use crate::directive::{
    CompletedOrder, GalacticOrder, GalacticOrders, OrderContext, OrderKind, ProgressKind,
};
use crate::economy::{
    self, AutoDistributionConfig, CustomDistributionMode, CustomModes, DistributionOutcome,
    HarvestReport, PlanetModifiers, ResourceLedger,
};
use crate::galaxy::{
    graph, placement, sector, ConnectionChange, EventBoard, EventKind, FactionId, Fleet, Galaxy, GalaxyEvent,
    GraphReport, PlanetId, PlanetMap, ResourceId, RouteEvents, ShipId,
};
use crate::navigation::{self, MoveError};
use crate::persist::{CampaignRecord, CampaignStore, OrderRecord, SCHEMA_VERSION};
use crate::stratagem::{StratagemCatalog, StratagemError, StratagemId, Stratagems};

/// What one call to [`Campaign::advance_turn`] did.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnReport {
    /// The turn number after advancing.
    pub turn: u32,
    pub expired_events: Vec<GalaxyEvent>,
    pub harvested: HarvestReport,
    pub distribution: DistributionOutcome,
    /// An order that reached its target this turn.
    pub completed_order: Option<CompletedOrder>,
    /// An order that ran out of time this turn.
    pub expired_order: Option<CompletedOrder>,
    /// Orders completed since the previous turn by captures or exploration.
    pub completed_between_turns: Vec<CompletedOrder>,
}

/// A running campaign.
pub struct Campaign {
    id: String,
    name: String,
    turn: u32,
    galaxy: Galaxy,
    fleet: Fleet,
    events: EventBoard,
    ledger: ResourceLedger,
    modifiers: PlanetModifiers,
    distribution: AutoDistributionConfig,
    custom_modes: CustomModes,
    orders: GalacticOrders,
    stratagems: Stratagems,
    /// Completions triggered outside the turn pipeline, not yet reported.
    unreported: Vec<CompletedOrder>,
    custom_text: BTreeMap<String, String>,
    created_at: i64,
    last_modified: i64,
    config: CampaignConfig,
    clock: Clock,
    rng: SmallRng,
}

impl Campaign {
    /// Creates an empty campaign seeded from entropy.
    pub fn new(config: CampaignConfig) -> Self {
        Self::with_rng(config, SmallRng::from_entropy())
    }

    /// Creates an empty campaign whose randomness is fully determined by
    /// `seed`.
    pub fn with_seed(config: CampaignConfig, seed: u64) -> Self {
        Self::with_rng(config, SmallRng::seed_from_u64(seed))
    }

    fn with_rng(config: CampaignConfig, mut rng: SmallRng) -> Self {
        let clock = Clock::default();
        let now = clock.now_ms();
        Campaign {
            id: format!("campaign-{:08x}", rng.gen::<u32>()),
            name: "New Campaign".to_string(),
            turn: 0,
            galaxy: Galaxy::default(),
            fleet: Fleet::new(),
            events: EventBoard::new(),
            ledger: ResourceLedger::new(),
            modifiers: PlanetModifiers::new(),
            distribution: AutoDistributionConfig::default(),
            custom_modes: CustomModes::new(),
            orders: GalacticOrders::new(),
            stratagems: Stratagems::default(),
            unreported: Vec::new(),
            custom_text: BTreeMap::new(),
            created_at: now,
            last_modified: now,
            config,
            clock,
            rng,
        }
    }

    /// Replaces the time source.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self.created_at = clock.now_ms();
        self.last_modified = self.created_at;
        self
    }

    /// Replaces the stratagem catalog, keeping cooldowns.
    pub fn with_catalog(mut self, catalog: StratagemCatalog) -> Self {
        self.stratagems.catalog = catalog;
        self
    }

    /// Re-seeds the random source.
    pub fn reseed(&mut self, seed: u64) {
        self.rng = SmallRng::seed_from_u64(seed);
    }

    // --- accessors ---

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn galaxy(&self) -> &Galaxy {
        &self.galaxy
    }

    pub fn fleet(&self) -> &Fleet {
        &self.fleet
    }

    pub fn events(&self) -> &EventBoard {
        &self.events
    }

    pub fn ledger(&self) -> &ResourceLedger {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut ResourceLedger {
        &mut self.ledger
    }

    pub fn modifiers(&self) -> &PlanetModifiers {
        &self.modifiers
    }

    pub fn modifiers_mut(&mut self) -> &mut PlanetModifiers {
        &mut self.modifiers
    }

    pub fn orders(&self) -> &GalacticOrders {
        &self.orders
    }

    pub fn stratagems(&self) -> &Stratagems {
        &self.stratagems
    }

    pub fn distribution(&self) -> &AutoDistributionConfig {
        &self.distribution
    }

    pub fn custom_modes(&self) -> &CustomModes {
        &self.custom_modes
    }

    pub fn custom_text(&self) -> &BTreeMap<String, String> {
        &self.custom_text
    }

    pub fn set_custom_text(&mut self, key: impl Into<String>, text: impl Into<String>) {
        self.custom_text.insert(key.into(), text.into());
    }

    pub fn config(&self) -> &CampaignConfig {
        &self.config
    }

    pub fn created_at(&self) -> i64 {
        self.created_at
    }

    pub fn last_modified(&self) -> i64 {
        self.last_modified
    }

    // --- turn pipeline ---

    /// Advances the campaign by one turn.
    pub fn advance_turn(&mut self) -> TurnReport {
        self.turn += 1;
        let completed_between_turns = std::mem::take(&mut self.unreported);

        let expired_events = self.events.advance_turn();
        let harvested = economy::harvest(&self.galaxy, &self.modifiers, &mut self.ledger);
        let distribution = economy::distribute(
            &self.distribution,
            &self.custom_modes,
            &self.galaxy,
            &mut self.ledger,
            &mut self.rng,
        );

        self.orders.record(ProgressKind::ResourcesGathered, harvested.total);
        if self.galaxy.planets.values().any(|p| p.owner.is_some()) {
            self.orders.record(ProgressKind::TurnsHeld, 1);
        }
        let completed_order = self.orders.update_progress();
        if let Some(done) = &completed_order {
            self.credit_reward(done);
        }

        let expired_order = self.orders.advance_expiration(self.clock.now_ms());
        if let Some(done) = &expired_order {
            self.credit_reward(done);
        }

        self.stratagems.advance_turn();

        tracing::info!(
            target: "galaxy_campaign::turn",
            turn = self.turn,
            expired_events = expired_events.len(),
            harvested = harvested.total,
            order_completed = completed_order.is_some(),
            order_expired = expired_order.is_some(),
            "turn.advanced"
        );

        TurnReport {
            turn: self.turn,
            expired_events,
            harvested,
            distribution,
            completed_order,
            expired_order,
            completed_between_turns,
        }
    }

    /// Pays an order's reward to every faction with a pool.
    fn credit_reward(&mut self, done: &CompletedOrder) {
        let factions: Vec<FactionId> = self.ledger.factions().cloned().collect();
        for faction in &factions {
            for (resource, &amount) in &done.reward.resources {
                self.ledger.add(faction, resource, amount);
            }
        }
    }

    fn settle(&mut self, completed: Option<CompletedOrder>) -> Option<CompletedOrder> {
        if let Some(done) = &completed {
            self.credit_reward(done);
        }
        completed
    }

    /// Settles a completion caused by another action and queues it for the
    /// next [`TurnReport`].
    fn settle_side_effect(&mut self, completed: Option<CompletedOrder>) {
        if let Some(done) = self.settle(completed) {
            tracing::info!(
                target: "galaxy_campaign::orders",
                id = %done.order.id,
                kind = %done.order.kind,
                "order.completed_by_action"
            );
            self.unreported.push(done);
        }
    }

    /// Orders completed by captures or exploration since the last turn.
    pub fn pending_completions(&self) -> &[CompletedOrder] {
        &self.unreported
    }

    // --- galaxy ---

    /// Replaces the galaxy with a freshly generated one. Ships and events
    /// refer to the old planet set and are cleared.
    pub fn generate_galaxy(&mut self) -> GraphReport {
        let resources = self.resource_ids();
        let (galaxy, report) = Galaxy::generate(&self.config.galaxy, &resources, &mut self.rng);
        self.galaxy = galaxy;
        self.fleet = Fleet::new();
        self.events = EventBoard::new();
        tracing::info!(
            target: "galaxy_campaign::galaxy",
            planets = self.galaxy.len(),
            edges = report.edges,
            sectors = self.galaxy.sectors.len(),
            isolated_repaired = report.isolated_repaired,
            components_repaired = report.components_repaired,
            "galaxy.generated"
        );
        report
    }

    pub fn toggle_connection(&mut self, a: PlanetId, b: PlanetId) -> Option<ConnectionChange> {
        graph::toggle_connection(&mut self.galaxy.planets, a, b)
    }

    pub fn add_connection(&mut self, a: PlanetId, b: PlanetId) -> bool {
        graph::add_connection(&mut self.galaxy.planets, a, b)
    }

    pub fn remove_connection(&mut self, a: PlanetId, b: PlanetId) -> bool {
        graph::remove_connection(&mut self.galaxy.planets, a, b)
    }

    /// Changes a planet's owner. Capturing a planet counts towards conquest
    /// orders, and completing control of its sector counts as a liberation.
    /// Returns false if the planet does not exist.
    pub fn set_planet_owner(&mut self, planet: PlanetId, owner: Option<FactionId>) -> bool {
        let controller_before = self.galaxy.sector_controller(planet).cloned();
        let Some(entry) = self.galaxy.planet_mut(planet) else {
            return false;
        };
        let previous = entry.set_owner(owner.clone());

        if let Some(new_owner) = owner {
            if previous.as_ref() != Some(&new_owner) {
                self.orders.record(ProgressKind::PlanetsConquered, 1);
                let controller_after = self.galaxy.sector_controller(planet);
                if controller_after == Some(&new_owner) && controller_before.as_ref() != Some(&new_owner) {
                    self.orders.record(ProgressKind::SectorsLiberated, 1);
                }
                let completed = self.orders.update_progress();
                self.settle_side_effect(completed);
            }
        }
        true
    }

    // --- fleet ---

    /// Registers a ship at `planet`. Returns `None` if the planet does not
    /// exist.
    pub fn spawn_ship(
        &mut self,
        owner: impl Into<FactionId>,
        planet: PlanetId,
        name: impl Into<String>,
    ) -> Option<ShipId> {
        self.galaxy.planet(planet)?;
        Some(self.fleet.spawn(owner, planet, name))
    }

    /// Moves a ship along an open route. Arriving at an undiscovered planet
    /// discovers it.
    pub fn move_ship(&mut self, ship: ShipId, target: PlanetId) -> Result<String, MoveError> {
        let message = navigation::move_ship(&mut self.fleet, &self.galaxy, &self.events, ship, target)?;
        let newly_discovered = match self.galaxy.planet_mut(target) {
            Some(planet) if !planet.discovered => {
                planet.discovered = true;
                true
            }
            _ => false,
        };
        if newly_discovered {
            let completed = self.orders.track_progress(OrderKind::ExplorePlanets, 1);
            self.settle_side_effect(completed);
        }
        Ok(message)
    }

    pub fn valid_move_targets(&self, ship: ShipId) -> Vec<PlanetId> {
        navigation::valid_move_targets(&self.fleet, &self.galaxy, &self.events, ship)
    }

    // --- events ---

    /// Adds a route event. Returns `None` if a planet it names does not exist
    /// or the duration is zero.
    pub fn add_event(
        &mut self,
        kind: EventKind,
        planet: PlanetId,
        target: Option<PlanetId>,
        duration: u32,
        description: impl Into<String>,
    ) -> Option<u32> {
        self.galaxy.planet(planet)?;
        if let Some(t) = target {
            self.galaxy.planet(t)?;
        }
        self.events.add(kind, planet, target, duration, description)
    }

    pub fn remove_event(&mut self, id: u32) -> Option<GalaxyEvent> {
        self.events.remove(id)
    }

    pub fn events_at(&self, planet: PlanetId) -> Vec<&GalaxyEvent> {
        self.events.at_planet(planet)
    }

    // --- stratagems ---

    /// Uses the stratagem named `id` on behalf of `faction`.
    pub fn use_stratagem(
        &mut self,
        faction: &str,
        id: &str,
        target: Option<PlanetId>,
    ) -> Result<String, StratagemError> {
        let id: StratagemId = id.parse()?;
        self.stratagems
            .use_stratagem(&mut self.ledger, &mut self.galaxy, faction, id, target)
    }

    /// Whether `faction` could use `id` right now.
    pub fn can_use_stratagem(&self, faction: &str, id: &str) -> Result<(), StratagemError> {
        let id: StratagemId = id.parse()?;
        self.stratagems.can_use(&self.ledger, faction, id).map(|_| ())
    }

    // --- orders ---

    /// The configured resource ids, or the placeholder set plus whatever the
    /// ledger already holds when none are configured.
    fn resource_ids(&self) -> Vec<ResourceId> {
        if !self.config.resources.is_empty() {
            return self.config.resources.clone();
        }
        let mut ids: BTreeSet<ResourceId> = placement::placeholder_resources().into_iter().collect();
        ids.extend(self.ledger.resource_ids());
        ids.into_iter().collect()
    }

    /// Issues a random order, replacing any current one.
    pub fn generate_order(&mut self) -> &GalacticOrder {
        let sectors: Vec<String> = self.galaxy.sectors.iter().map(|s| s.name.clone()).collect();
        let resources = self.resource_ids();
        let ctx = OrderContext {
            sectors: &sectors,
            resources: &resources,
            lifetime_days: self.config.orders.lifetime_days,
            now_ms: self.clock.now_ms(),
        };
        self.orders.generate(ctx, &mut self.rng)
    }

    /// Issues an order of the type named by `tag`. Unknown tags return
    /// `None` and leave the current order alone.
    pub fn generate_specific_order(&mut self, tag: &str) -> Option<&GalacticOrder> {
        let sectors: Vec<String> = self.galaxy.sectors.iter().map(|s| s.name.clone()).collect();
        let resources = self.resource_ids();
        let ctx = OrderContext {
            sectors: &sectors,
            resources: &resources,
            lifetime_days: self.config.orders.lifetime_days,
            now_ms: self.clock.now_ms(),
        };
        self.orders.generate_specific(tag, ctx, &mut self.rng)
    }

    /// Adds progress for `kind` and pays out if the current order completes.
    pub fn track_progress(&mut self, kind: OrderKind, amount: u64) -> Option<CompletedOrder> {
        let completed = self.orders.track_progress(kind, amount);
        self.settle(completed)
    }

    /// Records a diplomatic relation being established.
    pub fn record_relation(&mut self) -> Option<CompletedOrder> {
        self.track_progress(OrderKind::EstablishRelations, 1)
    }

    /// Completes the current order regardless of progress and pays out.
    pub fn complete_order(&mut self) -> Option<CompletedOrder> {
        let completed = self.orders.complete();
        self.settle(completed)
    }

    pub fn cancel_order(&mut self) -> Option<GalacticOrder> {
        self.orders.cancel()
    }

    pub fn delete_order(&mut self) -> Option<GalacticOrder> {
        self.orders.delete()
    }

    // --- distribution ---

    pub fn set_distribution(&mut self, config: AutoDistributionConfig) {
        self.distribution = config;
    }

    pub fn upsert_custom_mode(&mut self, mode: CustomDistributionMode) -> Option<CustomDistributionMode> {
        self.custom_modes.upsert(mode)
    }

    pub fn remove_custom_mode(&mut self, name: &str) -> Option<CustomDistributionMode> {
        self.custom_modes.remove(name)
    }

    // --- persistence ---

    /// Snapshots the campaign into a save record.
    pub fn to_record(&self) -> CampaignRecord {
        CampaignRecord {
            version: SCHEMA_VERSION,
            id: self.id.clone(),
            name: self.name.clone(),
            turn: self.turn,
            planets: self.galaxy.planets.values().cloned().collect(),
            events: self.events.events().to_vec(),
            galaxy_center: self.galaxy.center.clone(),
            ships: self.fleet.iter().cloned().collect(),
            sectors: self.galaxy.sectors.clone(),
            player_resources: self.ledger.clone(),
            planet_modifiers: self.modifiers.clone(),
            galactic_order: OrderRecord {
                current: self.orders.current().cloned(),
                completed_history: self.orders.history().to_vec(),
                liberation_progress: *self.orders.progress(),
            },
            stratagem_cooldowns: self.stratagems.cooldowns.clone(),
            auto_distribution: self.distribution.clone(),
            custom_distribution_modes: self.custom_modes.clone(),
            custom_text: self.custom_text.clone(),
            created_at: self.created_at,
            last_modified: self.last_modified,
        }
    }

    /// Rebuilds a campaign from a save record, repairing anything that
    /// breaks the graph, fleet, or sector invariants.
    ///
    /// The stratagem catalog is not part of the record: the rebuilt campaign
    /// uses the default catalog with the saved cooldowns. Chain
    /// [`with_catalog`](Self::with_catalog) to restore a custom one.
    pub fn from_record(record: CampaignRecord, config: CampaignConfig) -> Self {
        let mut planets: PlanetMap = record.planets.into_iter().map(|p| (p.id, p)).collect();
        let dropped_links = graph::normalize(&mut planets);

        let mut fleet = Fleet::from_ships(record.ships);
        let dropped_ships = fleet.retain(|s| planets.contains_key(&s.planet_id));

        let events: Vec<GalaxyEvent> = record
            .events
            .into_iter()
            .filter(|e| {
                e.remaining_turns > 0
                    && planets.contains_key(&e.planet_id)
                    && e.target_planet_id.map_or(true, |t| planets.contains_key(&t))
            })
            .collect();

        let mut galaxy = Galaxy {
            planets,
            sectors: record.sectors,
            center: record.galaxy_center,
        };
        let repartitioned = !sector::is_partition(&galaxy.sectors, &galaxy.planets);
        if repartitioned {
            galaxy.repartition();
        }

        if dropped_links > 0 || dropped_ships > 0 || repartitioned {
            tracing::warn!(
                target: "galaxy_campaign::persist",
                dropped_links,
                dropped_ships,
                repartitioned,
                "load.repaired"
            );
        }

        let OrderRecord { current, completed_history, liberation_progress } = record.galactic_order;

        Campaign {
            id: record.id,
            name: record.name,
            turn: record.turn,
            galaxy,
            fleet,
            events: EventBoard::from_events(events),
            ledger: record.player_resources,
            modifiers: record.planet_modifiers,
            distribution: record.auto_distribution,
            custom_modes: record.custom_distribution_modes,
            orders: GalacticOrders::restore(current, completed_history, liberation_progress),
            stratagems: Stratagems::new(StratagemCatalog::default(), record.stratagem_cooldowns),
            unreported: Vec::new(),
            custom_text: record.custom_text,
            created_at: record.created_at,
            last_modified: record.last_modified,
            config,
            clock: Clock::default(),
            rng: SmallRng::from_entropy(),
        }
    }

    /// Saves through `store`. Failures are logged and reported as `false`.
    pub fn save(&mut self, store: &mut impl CampaignStore) -> bool {
        self.last_modified = self.clock.now_ms();
        match store.save(&self.to_record()) {
            Ok(()) => {
                tracing::info!(
                    target: "galaxy_campaign::persist",
                    id = %self.id,
                    turn = self.turn,
                    "campaign.saved"
                );
                true
            }
            Err(e) => {
                tracing::warn!(
                    target: "galaxy_campaign::persist",
                    id = %self.id,
                    error = %e,
                    "campaign.save_failed"
                );
                false
            }
        }
    }

    /// Loads a campaign from `store`. Returns `None` if nothing was saved or
    /// the save could not be read; read failures are logged. As with
    /// [`from_record`](Self::from_record), the catalog starts as the default.
    pub fn load(store: &impl CampaignStore, config: CampaignConfig) -> Option<Self> {
        match store.load() {
            Ok(Some(record)) => {
                let campaign = Self::from_record(record, config);
                tracing::info!(
                    target: "galaxy_campaign::persist",
                    id = %campaign.id,
                    turn = campaign.turn,
                    "campaign.loaded"
                );
                Some(campaign)
            }
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(
                    target: "galaxy_campaign::persist",
                    error = %e,
                    "campaign.load_failed"
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::MS_PER_DAY;
    use crate::config::GalaxyConfig;
    use crate::economy::DistributionMode;
    use crate::persist::MemoryStore;

    const NOW: i64 = 1_700_000_000_000;

    fn campaign(planets: usize, seed: u64) -> Campaign {
        let config = CampaignConfig {
            galaxy: GalaxyConfig { planet_count: planets, ..GalaxyConfig::default() },
            ..CampaignConfig::default()
        };
        let mut c = Campaign::with_seed(config, seed).with_clock(Clock::Fixed(NOW));
        c.generate_galaxy();
        c
    }

    fn clear_yields(c: &mut Campaign) {
        for planet in c.galaxy.planets.values_mut() {
            planet.yields.clear();
        }
    }

    #[test]
    fn advance_turn_increments_and_ticks_cooldowns() {
        let mut c = campaign(8, 1);
        c.ledger_mut().set("red", "energy", 10);
        c.use_stratagem("red", "supply_drop", None).unwrap();
        let cooldown = c.stratagems().cooldowns.remaining("red", StratagemId::SupplyDrop);
        assert!(cooldown > 0);
        let report = c.advance_turn();
        assert_eq!(report.turn, 1);
        assert_eq!(c.turn(), 1);
        assert_eq!(
            c.stratagems().cooldowns.remaining("red", StratagemId::SupplyDrop),
            cooldown - 1
        );
    }

    #[test]
    fn distribution_sees_harvest() {
        let mut c = campaign(6, 2);
        clear_yields(&mut c);
        let planet = *c.galaxy.planets.keys().next().unwrap();
        c.galaxy.planet_mut(planet).unwrap().yields.insert("ore".to_string(), 4);
        c.set_planet_owner(planet, Some("red".to_string()));
        c.ledger_mut().set("red", "ore", 0);
        c.ledger_mut().set("blue", "ore", 0);
        c.set_distribution(AutoDistributionConfig {
            enabled: true,
            mode: DistributionMode::Equal,
            ..AutoDistributionConfig::default()
        });
        let report = c.advance_turn();
        assert_eq!(report.harvested.total, 4);
        assert_eq!(c.ledger().amount("red", "ore"), 2);
        assert_eq!(c.ledger().amount("blue", "ore"), 2);
    }

    #[test]
    fn order_completed_this_turn_is_not_also_expired() {
        let mut c = campaign(6, 3);
        c.ledger_mut().set("red", "ore", 0);
        c.generate_specific_order("HOLD_TERRITORY").unwrap();
        let target = c.orders().current().unwrap().target;
        let planet = *c.galaxy.planets.keys().next().unwrap();
        c.set_planet_owner(planet, Some("red".to_string()));

        let mut completed = None;
        for _ in 0..target {
            let report = c.advance_turn();
            assert!(report.expired_order.is_none());
            if report.completed_order.is_some() {
                completed = report.completed_order;
            }
        }
        let done = completed.unwrap();
        assert!(!done.expired);
        assert_eq!(c.orders().history().len(), 1);
    }

    #[test]
    fn order_expires_after_lifetime_and_pays_out() {
        let mut c = campaign(6, 4);
        c.ledger_mut().set("red", "ore", 0);
        c.generate_specific_order("ESTABLISH_RELATIONS").unwrap();
        let expires_at = c.orders().current().unwrap().expires_at;
        assert_eq!(expires_at, NOW + 7 * MS_PER_DAY);
        let reward = c.orders().current().unwrap().reward.clone();

        let mut expired = None;
        for _ in 0..7 {
            expired = c.advance_turn().expired_order;
        }
        let done = expired.unwrap();
        assert!(done.expired);
        for (resource, amount) in &reward.resources {
            assert!(c.ledger().amount("red", resource) >= *amount);
        }
    }

    #[test]
    fn capturing_a_planet_counts_as_conquest() {
        let mut c = campaign(6, 5);
        c.generate_specific_order("CONQUER_PLANETS").unwrap();
        let planet = *c.galaxy.planets.keys().next().unwrap();
        assert!(c.set_planet_owner(planet, Some("red".to_string())));
        assert_eq!(c.orders().progress().planets_conquered, 1);
        // Re-asserting the same owner is not a capture.
        c.set_planet_owner(planet, Some("red".to_string()));
        assert_eq!(c.orders().progress().planets_conquered, 1);
        assert!(!c.set_planet_owner(PlanetId(999), Some("red".to_string())));
    }

    #[test]
    fn owning_a_whole_sector_counts_as_liberation() {
        let mut c = campaign(9, 6);
        c.generate_specific_order("LIBERATE_SECTOR").unwrap();
        let sector = c.galaxy.sectors.iter().find(|s| !s.planet_ids.is_empty()).cloned().unwrap();
        for id in &sector.planet_ids {
            c.set_planet_owner(*id, Some("red".to_string()));
        }
        assert!(c.orders().current().is_none());
        assert_eq!(c.orders().history().len(), 1);
        assert_eq!(c.orders().history()[0].kind, OrderKind::LiberateSector);

        assert_eq!(c.pending_completions().len(), 1);
        let report = c.advance_turn();
        assert_eq!(report.completed_between_turns.len(), 1);
        assert_eq!(report.completed_between_turns[0].order.kind, OrderKind::LiberateSector);
        assert!(c.pending_completions().is_empty());
        assert!(c.advance_turn().completed_between_turns.is_empty());
    }

    #[test]
    fn catalog_is_reapplied_after_load() {
        let mut catalog = StratagemCatalog::default();
        catalog.insert(
            StratagemId::SupplyDrop,
            crate::stratagem::StratagemDefinition {
                cost: BTreeMap::new(),
                cooldown: 9,
                requires_target: false,
            },
        );
        let mut c = campaign(5, 13).with_catalog(catalog.clone());
        c.ledger_mut().set("red", "ore", 1);
        c.use_stratagem("red", "supply_drop", None).unwrap();

        let mut store = MemoryStore::new();
        assert!(c.save(&mut store));
        let loaded = Campaign::load(&store, CampaignConfig::default()).unwrap();
        assert_eq!(loaded.stratagems().catalog, StratagemCatalog::default());

        let loaded = loaded.with_catalog(catalog);
        assert_eq!(loaded.stratagems(), c.stratagems());
        assert_eq!(loaded.stratagems().cooldowns.remaining("red", StratagemId::SupplyDrop), 9);
    }

    #[test]
    fn moving_onto_undiscovered_planet_discovers_it() {
        let mut c = campaign(8, 7);
        let start = *c.galaxy.planets.keys().next().unwrap();
        let ship = c.spawn_ship("red", start, "Scout").unwrap();
        let next = *c.galaxy.planet(start).unwrap().connections().iter().next().unwrap();
        c.galaxy.planet_mut(next).unwrap().discovered = false;
        c.generate_specific_order("EXPLORE_PLANETS").unwrap();

        let message = c.move_ship(ship, next).unwrap();
        assert!(message.starts_with("Scout moved to "));
        assert!(c.galaxy.planet(next).unwrap().discovered);
        assert_eq!(c.orders().progress().planets_discovered, 1);
        assert!(c.valid_move_targets(ship).contains(&start));
    }

    #[test]
    fn spawning_on_unknown_planet_fails() {
        let mut c = campaign(4, 8);
        assert!(c.spawn_ship("red", PlanetId(500), "Ghost").is_none());
        assert!(c.fleet().is_empty());
    }

    #[test]
    fn unknown_stratagem_is_reported() {
        let mut c = campaign(4, 9);
        let err = c.use_stratagem("red", "death_star", None).unwrap_err();
        assert_eq!(err, StratagemError::Unknown("death_star".to_string()));
    }

    #[test]
    fn events_on_unknown_planets_are_rejected() {
        let mut c = campaign(4, 10);
        let planet = *c.galaxy.planets.keys().next().unwrap();
        assert!(c.add_event(EventKind::WarpStorm, PlanetId(77), None, 3, "storm").is_none());
        assert!(c.add_event(EventKind::Wormhole, planet, Some(PlanetId(77)), 3, "hole").is_none());
        let id = c.add_event(EventKind::WarpStorm, planet, None, 1, "storm").unwrap();
        assert_eq!(c.events_at(planet).len(), 1);
        let report = c.advance_turn();
        assert_eq!(report.expired_events.iter().map(|e| e.id).collect::<Vec<_>>(), vec![id]);
        assert!(c.events().is_empty());
    }

    #[test]
    fn save_and_load_preserve_state() {
        let mut c = campaign(10, 11);
        c.set_name("Test Run");
        c.ledger_mut().set("red", "ore", 12);
        c.set_custom_text("intro", "Hold the line.");
        let start = *c.galaxy.planets.keys().next().unwrap();
        c.spawn_ship("red", start, "Vanguard");
        c.generate_order();
        c.advance_turn();

        let mut store = MemoryStore::new();
        assert!(c.save(&mut store));
        let loaded = Campaign::load(&store, c.config().clone()).unwrap();
        assert_eq!(loaded.id(), c.id());
        assert_eq!(loaded.turn(), 1);
        assert_eq!(loaded.ledger(), c.ledger());
        assert_eq!(loaded.fleet().len(), 1);
        assert_eq!(loaded.orders(), c.orders());
        assert_eq!(loaded.stratagems(), c.stratagems());
        assert_eq!(loaded.last_modified(), NOW);
        for (id, planet) in &c.galaxy().planets {
            let restored = loaded.galaxy().planet(*id).unwrap();
            assert_eq!(restored.connections(), planet.connections());
            assert_eq!(restored.yields, planet.yields);
        }
        assert_eq!(loaded.name(), "Test Run");
        assert_eq!(loaded.custom_text().get("intro").map(String::as_str), Some("Hold the line."));
    }

    #[test]
    fn load_repairs_broken_records() {
        let mut c = campaign(6, 12);
        let ids: Vec<PlanetId> = c.galaxy.planets.keys().copied().collect();
        c.spawn_ship("red", ids[0], "Lost");
        let mut record = c.to_record();
        record.ships[0].planet_id = PlanetId(404);
        record.sectors.clear();
        record.events.push(GalaxyEvent {
            planet_id: ids[0],
            remaining_turns: 0,
            ..GalaxyEvent::default()
        });

        let loaded = Campaign::from_record(record, CampaignConfig::default());
        assert!(loaded.fleet().is_empty());
        assert!(loaded.events().is_empty());
        assert!(sector::is_partition(&loaded.galaxy().sectors, &loaded.galaxy().planets));
        assert_eq!(graph::find_asymmetry(&loaded.galaxy().planets), None);
    }

    #[test]
    fn load_from_empty_store_is_none() {
        let store = MemoryStore::new();
        assert!(Campaign::load(&store, CampaignConfig::default()).is_none());
        let mut broken = MemoryStore::new();
        broken.set_raw("not json");
        assert!(Campaign::load(&broken, CampaignConfig::default()).is_none());
    }
}
