//! Galactic order templates and parameter sampling.

use std::collections::BTreeMap;

use rand::Rng;

use super::progress::OrderKind;
use crate::galaxy::placement::PLACEHOLDER_RESOURCES;
use crate::galaxy::ResourceId;

/// Which sampled parameter becomes an order's numeric target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetParam {
    Target,
    Amount,
    Duration,
    /// Always 1 (e.g. a single sector).
    One,
}

/// A catalog entry orders are generated from.
#[derive(Debug, Clone, Copy)]
pub struct OrderTemplate {
    pub kind: OrderKind,
    /// Relative draw weight.
    pub weight: u32,
    /// Description with `{duration}`, `{amount}`, `{sector}`, `{resource}`
    /// and `{target}` placeholders.
    pub description: &'static str,
    pub target: TargetParam,
    /// Reward is `amount * reward_scale` of the sampled resource.
    pub reward_scale: u64,
}

pub static ORDER_TEMPLATES: [OrderTemplate; 6] = [
    OrderTemplate {
        kind: OrderKind::ConquerPlanets,
        weight: 25,
        description: "Conquer {target} planets within {duration} turns",
        target: TargetParam::Target,
        reward_scale: 2,
    },
    OrderTemplate {
        kind: OrderKind::LiberateSector,
        weight: 15,
        description: "Liberate the {sector} by seizing every world in it",
        target: TargetParam::One,
        reward_scale: 3,
    },
    OrderTemplate {
        kind: OrderKind::GatherResources,
        weight: 25,
        description: "Harvest {amount} resources from controlled worlds to earn {resource}",
        target: TargetParam::Amount,
        reward_scale: 1,
    },
    OrderTemplate {
        kind: OrderKind::HoldTerritory,
        weight: 15,
        description: "Hold the line in the {sector} for {duration} turns",
        target: TargetParam::Duration,
        reward_scale: 2,
    },
    OrderTemplate {
        kind: OrderKind::ExplorePlanets,
        weight: 12,
        description: "Chart {target} uncharted planets",
        target: TargetParam::Target,
        reward_scale: 2,
    },
    OrderTemplate {
        kind: OrderKind::EstablishRelations,
        weight: 8,
        description: "Establish diplomatic relations with {target} factions",
        target: TargetParam::Target,
        reward_scale: 2,
    },
];

/// Independently sampled order parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderParams {
    pub duration: u64,
    pub amount: u64,
    pub sector: String,
    pub resource: ResourceId,
    pub target: u64,
}

impl OrderTemplate {
    pub fn for_kind(kind: OrderKind) -> &'static OrderTemplate {
        ORDER_TEMPLATES
            .iter()
            .find(|t| t.kind == kind)
            .unwrap_or(&ORDER_TEMPLATES[0])
    }

    pub fn target_value(&self, params: &OrderParams) -> u64 {
        match self.target {
            TargetParam::Target => params.target,
            TargetParam::Amount => params.amount,
            TargetParam::Duration => params.duration,
            TargetParam::One => 1,
        }
    }

    pub fn reward(&self, params: &OrderParams) -> BTreeMap<ResourceId, u64> {
        BTreeMap::from([(params.resource.clone(), params.amount * self.reward_scale)])
    }

    /// Fills every placeholder in the description.
    pub fn describe(&self, params: &OrderParams) -> String {
        self.description
            .replace("{duration}", &params.duration.to_string())
            .replace("{amount}", &params.amount.to_string())
            .replace("{sector}", &params.sector)
            .replace("{resource}", &params.resource)
            .replace("{target}", &params.target.to_string())
    }
}

/// Weighted draw over the catalog: a cursor drawn from [0, total weight) is
/// decremented by each template's weight in order until it is no longer
/// positive.
pub fn pick_template(rng: &mut impl Rng) -> &'static OrderTemplate {
    let total: u32 = ORDER_TEMPLATES.iter().map(|t| t.weight).sum();
    let mut cursor = rng.gen_range(0.0..f64::from(total));
    for template in &ORDER_TEMPLATES {
        cursor -= f64::from(template.weight);
        if cursor <= 0.0 {
            return template;
        }
    }
    &ORDER_TEMPLATES[ORDER_TEMPLATES.len() - 1]
}

/// Samples parameters: duration 3–7, amount 5–14, target 2–6, a random
/// sector name, and a random resource (placeholders if none are known).
pub fn sample_params(sectors: &[String], resources: &[ResourceId], rng: &mut impl Rng) -> OrderParams {
    let duration = rng.gen_range(3..=7);
    let amount = rng.gen_range(5..=14);
    let sector = if sectors.is_empty() {
        "Unknown Sector".to_string()
    } else {
        sectors[rng.gen_range(0..sectors.len())].clone()
    };
    let resource = if resources.is_empty() {
        PLACEHOLDER_RESOURCES[rng.gen_range(0..PLACEHOLDER_RESOURCES.len())].to_string()
    } else {
        resources[rng.gen_range(0..resources.len())].clone()
    };
    let target = rng.gen_range(2..=6);
    OrderParams {
        duration,
        amount,
        sector,
        resource,
        target,
    }
}
