//! Interactive Brokers gateway adapter built on the `ibapi` client.
//!
//! `ibapi` hands back blocking calls and subscriptions rather than callbacks.
//! Market-data and historical requests each get a worker thread that drains
//! its result into the registered [`GatewayEvents`]. Orders go through a
//! single worker so they reach the gateway in id order.

use crate::domain::bar::Bar;
use crate::domain::contract::{
    Contract, HistoricalDataRequest, Order, OrderAction, OrderId, RequestId,
};
use crate::domain::error::TraderError;
use crate::ports::gateway_events::{EfpTick, GatewayEvents};
use crate::ports::gateway_port::GatewayPort;
use chrono::NaiveDate;
use ibapi::Client;
use ibapi::contracts::Contract as IbContract;
use ibapi::market_data::historical::{self, BarSize, ToDuration, WhatToShow};
use ibapi::market_data::realtime::TickTypes;
use ibapi::orders::{self, Action, PlaceOrder, order_builder};
use log::{debug, info, warn};
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::Duration;

const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// `ibapi` errors carry no numeric code once stringified.
const ADAPTER_ERROR_CODE: i32 = -1;

struct OrderRequest {
    order_id: OrderId,
    contract: IbContract,
    order: orders::Order,
    reply: Sender<Result<(), String>>,
}

#[derive(Clone)]
struct Connection {
    client: Arc<Client>,
    events: Arc<dyn GatewayEvents>,
    shutdown: Arc<AtomicBool>,
    orders: Sender<OrderRequest>,
}

#[derive(Default)]
pub struct IbkrGateway {
    connection: Mutex<Option<Connection>>,
}

impl IbkrGateway {
    pub fn new() -> Self {
        Self::default()
    }

    fn current(&self) -> Result<Connection, TraderError> {
        self.connection.lock().clone().ok_or(TraderError::NotConnected)
    }
}

impl GatewayPort for IbkrGateway {
    fn connect(
        &self,
        host: &str,
        port: u16,
        client_id: i32,
        events: Arc<dyn GatewayEvents>,
    ) -> Result<(), TraderError> {
        let address = format!("{}:{}", host, port);
        let client = Client::connect(&address, client_id)
            .map(Arc::new)
            .map_err(|e| TraderError::gateway(format!("connect to {} failed: {}", address, e)))?;
        info!("connected to {}", address);

        let shutdown = Arc::new(AtomicBool::new(false));
        let (orders, order_rx) = mpsc::channel();
        {
            let client = Arc::clone(&client);
            let events = Arc::clone(&events);
            let shutdown = Arc::clone(&shutdown);
            thread::Builder::new()
                .name("ib-orders".into())
                .spawn(move || order_worker(client, events, shutdown, order_rx))?;
        }

        let next_id = client.next_order_id();
        *self.connection.lock() = Some(Connection {
            client,
            events: Arc::clone(&events),
            shutdown,
            orders,
        });
        events.next_valid_id(next_id);
        Ok(())
    }

    /// Stops every worker and drops this handle's share of the client.
    ///
    /// The socket itself closes when the last worker lets go of its
    /// `Arc<Client>`. Market-data workers notice within one poll interval and
    /// the order worker as soon as its channel closes. A historical worker
    /// still blocked on a reply holds the client until the gateway answers or
    /// the request times out, then discards the reply.
    fn disconnect(&self) {
        let Some(conn) = self.connection.lock().take() else {
            return;
        };
        conn.shutdown.store(true, Ordering::Relaxed);
        debug!(
            "disconnecting from gateway; {} other client handles still held by workers",
            Arc::strong_count(&conn.client) - 1
        );
        drop(conn);
    }

    fn request_market_data(
        &self,
        req_id: RequestId,
        contract: &Contract,
    ) -> Result<(), TraderError> {
        let conn = self.current()?;
        let ib_contract = to_ib_contract(contract);
        thread::Builder::new()
            .name(format!("ib-mkt-{}", req_id))
            .spawn(move || {
                let subscription = match conn.client.market_data(&ib_contract, &[], false, false)
                {
                    Ok(subscription) => subscription,
                    Err(e) => {
                        conn.events.error(req_id, ADAPTER_ERROR_CODE, &e.to_string());
                        return;
                    }
                };
                while !conn.shutdown.load(Ordering::Relaxed) {
                    if let Some(tick) = subscription.next_timeout(POLL_INTERVAL) {
                        dispatch_tick(conn.events.as_ref(), req_id, tick);
                    }
                }
                subscription.cancel();
            })?;
        Ok(())
    }

    fn request_historical_data(
        &self,
        req_id: RequestId,
        contract: &Contract,
        request: &HistoricalDataRequest,
    ) -> Result<(), TraderError> {
        let conn = self.current()?;
        let ib_contract = to_ib_contract(contract);
        let duration: historical::Duration = request.duration_days.days();
        let use_rth = request.use_rth;
        thread::Builder::new()
            .name(format!("ib-hist-{}", req_id))
            .spawn(move || {
                match conn.client.historical_data(
                    &ib_contract,
                    None,
                    duration,
                    BarSize::Day,
                    WhatToShow::Trades,
                    use_rth,
                ) {
                    _ if conn.shutdown.load(Ordering::Relaxed) => {
                        debug!("dropping historical reply {} after disconnect", req_id);
                    }
                    Ok(data) => {
                        for ib_bar in &data.bars {
                            match to_bar(ib_bar) {
                                Some(bar) => conn.events.historical_data(req_id, &bar),
                                None => warn!("unrepresentable bar date for request {}", req_id),
                            }
                        }
                        conn.events.historical_data_end(req_id);
                    }
                    Err(e) => conn.events.error(req_id, ADAPTER_ERROR_CODE, &e.to_string()),
                }
            })?;
        Ok(())
    }

    fn place_order(
        &self,
        order_id: OrderId,
        contract: &Contract,
        order: &Order,
    ) -> Result<(), TraderError> {
        let conn = self.current()?;
        let action = match order.action {
            OrderAction::Buy => Action::Buy,
        };
        let (reply, reply_rx) = mpsc::channel();
        conn.orders
            .send(OrderRequest {
                order_id,
                contract: to_ib_contract(contract),
                order: order_builder::market_order(action, order.total_quantity),
                reply,
            })
            .map_err(|_| TraderError::NotConnected)?;
        reply_rx
            .recv()
            .map_err(|_| TraderError::NotConnected)?
            .map_err(TraderError::gateway)
    }
}

fn order_worker(
    client: Arc<Client>,
    events: Arc<dyn GatewayEvents>,
    shutdown: Arc<AtomicBool>,
    requests: Receiver<OrderRequest>,
) {
    let mut live = Vec::new();
    loop {
        match requests.recv_timeout(POLL_INTERVAL) {
            Ok(req) => match client.place_order(req.order_id, &req.contract, &req.order) {
                Ok(subscription) => {
                    let _ = req.reply.send(Ok(()));
                    live.push((req.order_id, subscription));
                }
                Err(e) => {
                    let _ = req.reply.send(Err(e.to_string()));
                }
            },
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }

        for (order_id, subscription) in &live {
            while let Some(event) = subscription.try_next() {
                match event {
                    PlaceOrder::OrderStatus(status) => events.order_status(
                        *order_id,
                        &status.status,
                        status.filled,
                        status.remaining,
                    ),
                    PlaceOrder::Message(notice) => {
                        events.order_error(*order_id, notice.code, &notice.message)
                    }
                    _ => {}
                }
            }
        }

        if shutdown.load(Ordering::Relaxed) {
            break;
        }
    }
}

fn dispatch_tick(events: &dyn GatewayEvents, req_id: RequestId, tick: TickTypes) {
    match tick {
        TickTypes::Price(t) => events.tick_price(req_id, &format!("{:?}", t.tick_type), t.price),
        TickTypes::Size(t) => {
            events.tick_size(req_id, &format!("{:?}", t.tick_type), t.size)
        }
        TickTypes::Generic(t) => {
            events.tick_generic(req_id, &format!("{:?}", t.tick_type), t.value)
        }
        TickTypes::String(t) => {
            events.tick_string(req_id, &format!("{:?}", t.tick_type), &t.value)
        }
        TickTypes::EFP(t) => events.tick_efp(
            req_id,
            &format!("{:?}", t.tick_type),
            &EfpTick {
                basis_points: t.basis_points,
                formatted_basis_points: t.formatted_basis_points.clone(),
                implied_future: t.implied_futures_price,
                hold_days: t.hold_days as i32,
                future_expiry: t.future_last_trade_date.clone(),
                dividend_impact: t.dividend_impact,
                dividends_to_expiry: t.dividends_to_last_trade_date,
            },
        ),
        TickTypes::Notice(notice) => events.error(req_id, notice.code, &notice.message),
        _ => {}
    }
}

fn to_ib_contract(contract: &Contract) -> IbContract {
    let mut ib = IbContract::stock(&contract.symbol);
    ib.exchange = contract.exchange.clone();
    ib.currency = contract.currency.clone();
    ib
}

fn to_bar(bar: &ibapi::market_data::historical::Bar) -> Option<Bar> {
    let date = bar.date.date();
    let date = NaiveDate::from_ymd_opt(
        date.year(),
        u32::from(u8::from(date.month())),
        u32::from(date.day()),
    )?;
    Some(Bar {
        date,
        open: bar.open,
        high: bar.high,
        low: bar.low,
        close: bar.close,
        volume: bar.volume,
    })
}
