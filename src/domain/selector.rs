//! Ranking of observations and the buy orders derived from them.

use crate::domain::contract::{Contract, Order, OrderAction};
use crate::domain::observation::Observation;

/// How many of the most-declined symbols get an order.
pub const TOP_N: usize = 10;

/// Shares bought per selected symbol.
pub const ORDER_QUANTITY: f64 = 10.0;

/// Ascending by percent change, most declined first. The sort is stable, so
/// equal changes keep their arrival order.
pub fn rank(observations: &[Observation]) -> Vec<Observation> {
    let mut ranked = observations.to_vec();
    ranked.sort_by(|a, b| a.percent_change.total_cmp(&b.percent_change));
    ranked
}

/// The `n` most-declined observations, or all of them when fewer exist.
pub fn select_most_declined(observations: &[Observation], n: usize) -> Vec<Observation> {
    let mut ranked = rank(observations);
    ranked.truncate(n);
    ranked
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderIntent {
    pub contract: Contract,
    pub order: Order,
}

pub fn build_order_intents(selected: &[Observation], quantity: f64) -> Vec<OrderIntent> {
    selected
        .iter()
        .map(|obs| OrderIntent {
            contract: Contract::stock(&obs.symbol),
            order: Order::market(OrderAction::Buy, quantity),
        })
        .collect()
}
