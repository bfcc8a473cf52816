//! Events pushed by the gateway, one method per event kind.
//!
//! Adapters call these from their own delivery threads, so implementations
//! must be `Send + Sync` and use interior mutability. Market-data ticks have
//! empty default bodies; a consumer that only ranks historical bars does not
//! need to care about them.

use crate::domain::bar::Bar;
use crate::domain::contract::{OrderId, RequestId};

/// Exchange-for-physical tick payload.
#[derive(Debug, Clone, PartialEq)]
pub struct EfpTick {
    pub basis_points: f64,
    pub formatted_basis_points: String,
    pub implied_future: f64,
    pub hold_days: i32,
    pub future_expiry: String,
    pub dividend_impact: f64,
    pub dividends_to_expiry: f64,
}

pub trait GatewayEvents: Send + Sync {
    /// Session is ready for orders; `order_id` is the first usable id.
    fn next_valid_id(&self, order_id: OrderId);

    /// `id` is the request id the error relates to, or -1.
    fn error(&self, id: i32, code: i32, message: &str);

    /// Notice or rejection for a submitted order. Order ids and request ids
    /// are separate counters and may collide, so this never resolves a
    /// pending request.
    fn order_error(&self, order_id: OrderId, code: i32, message: &str);

    fn tick_price(&self, _req_id: RequestId, _field: &str, _price: f64) {}

    fn tick_size(&self, _req_id: RequestId, _field: &str, _size: f64) {}

    fn tick_string(&self, _req_id: RequestId, _field: &str, _value: &str) {}

    fn tick_generic(&self, _req_id: RequestId, _field: &str, _value: f64) {}

    fn tick_efp(&self, _req_id: RequestId, _field: &str, _efp: &EfpTick) {}

    fn historical_data(&self, req_id: RequestId, bar: &Bar);

    /// All bars for `req_id` have been delivered.
    fn historical_data_end(&self, _req_id: RequestId) {}

    fn order_status(&self, _order_id: OrderId, _status: &str, _filled: f64, _remaining: f64) {}

    fn connection_closed(&self) {}
}
