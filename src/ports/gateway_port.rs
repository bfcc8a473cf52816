//! Outbound requests to the trading gateway.

use crate::domain::contract::{Contract, HistoricalDataRequest, Order, OrderId, RequestId};
use crate::domain::error::TraderError;
use crate::ports::gateway_events::GatewayEvents;
use std::sync::Arc;

/// Port for a brokerage gateway connection.
///
/// Request methods return once the request has been handed to the gateway;
/// the data arrives later through the [`GatewayEvents`] registered at
/// connect time.
pub trait GatewayPort: Send + Sync {
    fn connect(
        &self,
        host: &str,
        port: u16,
        client_id: i32,
        events: Arc<dyn GatewayEvents>,
    ) -> Result<(), TraderError>;

    fn disconnect(&self);

    fn request_market_data(&self, req_id: RequestId, contract: &Contract)
        -> Result<(), TraderError>;

    fn request_historical_data(
        &self,
        req_id: RequestId,
        contract: &Contract,
        request: &HistoricalDataRequest,
    ) -> Result<(), TraderError>;

    fn place_order(
        &self,
        order_id: OrderId,
        contract: &Contract,
        order: &Order,
    ) -> Result<(), TraderError>;
}
