//! Galactic orders: the single rotating macro-objective.
//!
//! Orders are drawn from a weighted template catalog, tracked against
//! liberation-progress counters, and resolved by completion or expiry.

pub mod machine;
pub mod progress;
pub mod template;

pub use machine::{CompletedOrder, GalacticOrder, GalacticOrders, OrderContext, OrderReward};
pub use progress::{LiberationProgress, OrderKind, ProgressKind, UnknownOrderKind, ALL_ORDER_KINDS};
pub use template::{OrderParams, OrderTemplate, TargetParam, ORDER_TEMPLATES};
