//! The galactic order state machine.
//!
//! ```text
//! NONE --generate--> ACTIVE --progress >= target--> COMPLETED --> NONE
//!                       \--expiry reached (reward kept)--/
//! ```
//!
//! At most one order is active. Completion (normal or by expiry) moves the
//! order into the append-only history and clears the progress counters.
//! Cancelling discards the order without history or reward.

use std::collections::BTreeMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::progress::{LiberationProgress, OrderKind, ProgressKind};
use super::template::{pick_template, sample_params, OrderTemplate};
use crate::clock::MS_PER_DAY;
use crate::galaxy::ResourceId;

/// What completing an order pays out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderReward {
    pub resources: BTreeMap<ResourceId, u64>,
}

/// A galactic order record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GalacticOrder {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: OrderKind,
    pub description: String,
    pub target: u64,
    pub progress: u64,
    /// Unix milliseconds. Pulled one day closer every turn.
    pub expires_at: i64,
    pub completed: bool,
    pub reward: OrderReward,
}

/// An order leaving the active slot through completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedOrder {
    pub order: GalacticOrder,
    pub reward: OrderReward,
    /// True if the order ran out of time rather than reaching its target.
    pub expired: bool,
}

/// Inputs orders are generated from.
#[derive(Debug, Clone, Copy)]
pub struct OrderContext<'a> {
    pub sectors: &'a [String],
    pub resources: &'a [ResourceId],
    pub lifetime_days: u32,
    pub now_ms: i64,
}

/// The current order, its progress counters, and the completed history.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GalacticOrders {
    current: Option<GalacticOrder>,
    history: Vec<GalacticOrder>,
    progress: LiberationProgress,
}

impl GalacticOrders {
    pub fn new() -> Self {
        GalacticOrders::default()
    }

    /// Restores saved state. A completed order in the active slot goes to
    /// history instead.
    pub fn restore(
        current: Option<GalacticOrder>,
        mut history: Vec<GalacticOrder>,
        progress: LiberationProgress,
    ) -> Self {
        let current = match current {
            Some(order) if order.completed => {
                history.push(order);
                None
            }
            other => other,
        };
        let progress = if current.is_some() { progress } else { LiberationProgress::default() };
        GalacticOrders { current, history, progress }
    }

    pub fn current(&self) -> Option<&GalacticOrder> {
        self.current.as_ref()
    }

    pub fn history(&self) -> &[GalacticOrder] {
        &self.history
    }

    pub fn progress(&self) -> &LiberationProgress {
        &self.progress
    }

    /// Issues a new order from a weighted draw over the catalog, replacing
    /// any current order.
    pub fn generate(&mut self, ctx: OrderContext<'_>, rng: &mut impl Rng) -> &GalacticOrder {
        let template = pick_template(rng);
        self.issue(template, ctx, rng)
    }

    /// Issues an order of the type named by `tag`. Unknown tags create
    /// nothing and leave the current order untouched.
    pub fn generate_specific(
        &mut self,
        tag: &str,
        ctx: OrderContext<'_>,
        rng: &mut impl Rng,
    ) -> Option<&GalacticOrder> {
        let kind: OrderKind = tag.parse().ok()?;
        Some(self.generate_kind(kind, ctx, rng))
    }

    pub fn generate_kind(
        &mut self,
        kind: OrderKind,
        ctx: OrderContext<'_>,
        rng: &mut impl Rng,
    ) -> &GalacticOrder {
        self.issue(OrderTemplate::for_kind(kind), ctx, rng)
    }

    fn issue(
        &mut self,
        template: &OrderTemplate,
        ctx: OrderContext<'_>,
        rng: &mut impl Rng,
    ) -> &GalacticOrder {
        let params = sample_params(ctx.sectors, ctx.resources, rng);
        let order = GalacticOrder {
            id: format!("order-{:08x}", rng.gen::<u32>()),
            kind: template.kind,
            description: template.describe(&params),
            target: template.target_value(&params),
            progress: 0,
            expires_at: ctx.now_ms + i64::from(ctx.lifetime_days) * MS_PER_DAY,
            completed: false,
            reward: OrderReward {
                resources: template.reward(&params),
            },
        };
        tracing::info!(
            target: "galaxy_campaign::orders",
            id = %order.id,
            kind = %order.kind,
            target_value = order.target,
            "order.generated"
        );
        self.progress.reset();
        self.current.insert(order)
    }

    /// Adds to a counter without evaluating completion.
    pub fn record(&mut self, kind: ProgressKind, amount: u64) {
        self.progress.add(kind, amount);
    }

    /// Adds `amount` to the counter for `kind` and re-evaluates completion.
    pub fn track_progress(&mut self, kind: OrderKind, amount: u64) -> Option<CompletedOrder> {
        self.progress.add(kind.progress_kind(), amount);
        self.update_progress()
    }

    /// Copies the relevant counter into the current order and completes it
    /// once progress reaches the target.
    pub fn update_progress(&mut self) -> Option<CompletedOrder> {
        let order = self.current.as_mut()?;
        order.progress = self.progress.get(order.kind.progress_kind());
        if order.progress >= order.target {
            self.finish(false)
        } else {
            None
        }
    }

    /// Pulls the expiry one day closer. If it has reached `now_ms`, the order
    /// is force-completed and its reward still granted.
    pub fn advance_expiration(&mut self, now_ms: i64) -> Option<CompletedOrder> {
        let order = self.current.as_mut()?;
        order.expires_at -= MS_PER_DAY;
        if order.expires_at <= now_ms {
            tracing::info!(
                target: "galaxy_campaign::orders",
                id = %order.id,
                progress = order.progress,
                target_value = order.target,
                "order.expired"
            );
            self.finish(true)
        } else {
            None
        }
    }

    /// Completes the current order regardless of progress.
    pub fn complete(&mut self) -> Option<CompletedOrder> {
        self.finish(false)
    }

    /// Discards the current order and progress. No history, no reward.
    pub fn cancel(&mut self) -> Option<GalacticOrder> {
        self.progress.reset();
        self.current.take()
    }

    /// Same as [`cancel`](Self::cancel).
    pub fn delete(&mut self) -> Option<GalacticOrder> {
        self.cancel()
    }

    fn finish(&mut self, expired: bool) -> Option<CompletedOrder> {
        let mut order = self.current.take()?;
        order.completed = true;
        self.history.push(order.clone());
        self.progress.reset();
        tracing::info!(
            target: "galaxy_campaign::orders",
            id = %order.id,
            expired,
            "order.completed"
        );
        let reward = order.reward.clone();
        Some(CompletedOrder { order, reward, expired })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    const NOW: i64 = 1_700_000_000_000;

    fn ctx() -> OrderContext<'static> {
        OrderContext {
            sectors: &[],
            resources: &[],
            lifetime_days: 7,
            now_ms: NOW,
        }
    }

    fn rng() -> SmallRng {
        SmallRng::seed_from_u64(3)
    }

    #[test]
    fn generate_creates_fresh_active_order() {
        let mut orders = GalacticOrders::new();
        let mut rng = rng();
        let order = orders.generate(ctx(), &mut rng).clone();
        assert_eq!(order.progress, 0);
        assert!(!order.completed);
        assert_eq!(order.expires_at, NOW + 7 * MS_PER_DAY);
        assert!(orders.current().is_some());
    }

    #[test]
    fn generate_specific_unknown_leaves_current() {
        let mut orders = GalacticOrders::new();
        let mut rng = rng();
        let existing = orders.generate_kind(OrderKind::HoldTerritory, ctx(), &mut rng).clone();
        assert!(orders.generate_specific("UNKNOWN", ctx(), &mut rng).is_none());
        assert_eq!(orders.current(), Some(&existing));
    }

    #[test]
    fn generate_replaces_and_resets_progress() {
        let mut orders = GalacticOrders::new();
        let mut rng = rng();
        orders.generate_kind(OrderKind::ConquerPlanets, ctx(), &mut rng);
        orders.record(ProgressKind::PlanetsConquered, 1);
        let next = orders.generate_specific("EXPLORE_PLANETS", ctx(), &mut rng).cloned();
        assert_eq!(next.map(|o| o.kind), Some(OrderKind::ExplorePlanets));
        assert!(orders.progress().is_empty());
        assert!(orders.history().is_empty());
    }

    #[test]
    fn reaching_target_completes_once() {
        let mut orders = GalacticOrders::new();
        let mut rng = rng();
        let target = orders.generate_kind(OrderKind::ConquerPlanets, ctx(), &mut rng).target;
        for _ in 0..target - 1 {
            assert!(orders.track_progress(OrderKind::ConquerPlanets, 1).is_none());
        }
        assert_eq!(orders.current().map(|o| o.progress), Some(target - 1));
        let done = orders.track_progress(OrderKind::ConquerPlanets, 1).unwrap();
        assert!(done.order.completed);
        assert!(!done.expired);
        assert_eq!(done.reward, done.order.reward);
        assert!(orders.current().is_none());
        assert_eq!(orders.history().len(), 1);
        assert!(orders.progress().is_empty());
        assert!(orders.track_progress(OrderKind::ConquerPlanets, 10).is_none());
        assert_eq!(orders.history().len(), 1);
    }

    #[test]
    fn unrelated_progress_does_not_complete() {
        let mut orders = GalacticOrders::new();
        let mut rng = rng();
        orders.generate_kind(OrderKind::ExplorePlanets, ctx(), &mut rng);
        assert!(orders.track_progress(OrderKind::ConquerPlanets, 100).is_none());
        assert_eq!(orders.current().map(|o| o.progress), Some(0));
    }

    #[test]
    fn expiry_force_completes_with_reward() {
        let mut orders = GalacticOrders::new();
        let mut rng = rng();
        orders.generate_kind(OrderKind::EstablishRelations, ctx(), &mut rng);
        for _ in 0..6 {
            assert!(orders.advance_expiration(NOW).is_none());
        }
        let done = orders.advance_expiration(NOW).unwrap();
        assert!(done.expired);
        assert!(!done.reward.resources.is_empty());
        assert_eq!(orders.history().len(), 1);
        assert!(orders.advance_expiration(NOW).is_none());
    }

    #[test]
    fn cancel_discards_without_history() {
        let mut orders = GalacticOrders::new();
        let mut rng = rng();
        orders.generate(ctx(), &mut rng);
        orders.record(ProgressKind::TurnsHeld, 2);
        assert!(orders.cancel().is_some());
        assert!(orders.current().is_none());
        assert!(orders.history().is_empty());
        assert!(orders.progress().is_empty());
        assert!(orders.delete().is_none());
    }

    #[test]
    fn complete_without_order_is_none() {
        let mut orders = GalacticOrders::new();
        assert!(orders.complete().is_none());
        assert!(orders.update_progress().is_none());
    }

    #[test]
    fn restore_moves_completed_current_to_history() {
        let mut orders = GalacticOrders::new();
        let mut rng = rng();
        let mut order = orders.generate(ctx(), &mut rng).clone();
        order.completed = true;
        let progress = LiberationProgress { turns_held: 3, ..LiberationProgress::default() };
        let restored = GalacticOrders::restore(Some(order), Vec::new(), progress);
        assert!(restored.current().is_none());
        assert_eq!(restored.history().len(), 1);
        assert!(restored.progress().is_empty());
    }

    #[test]
    fn order_serializes_type_tag() {
        let mut orders = GalacticOrders::new();
        let mut rng = rng();
        let order = orders.generate_kind(OrderKind::GatherResources, ctx(), &mut rng).clone();
        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(json["type"], "GATHER_RESOURCES");
        assert!(json.get("expiresAt").is_some());
    }
}
