//! One-shot trading session: connect, request data, wait, rank, buy,
//! disconnect.
//!
//! [`TradingSession`] is the event sink handed to the gateway. Historical
//! bars land in its [`ChangeTracker`]; every error, whether pushed by the
//! gateway or returned by a request, goes through [`GatewayEvents::error`]
//! and is logged, never escalated.

use crate::domain::bar::Bar;
use crate::domain::completion::{CompletionTracker, WaitOutcome};
use crate::domain::contract::{Contract, HistoricalDataRequest, Order, OrderId, RequestId};
use crate::domain::error::TraderError;
use crate::domain::observation::{ChangeTracker, Observation, RecordOutcome};
use crate::domain::order_id::OrderIdSequence;
use crate::domain::requests::{RequestKind, RequestRegistry};
use crate::domain::selector::{
    ORDER_QUANTITY, OrderIntent, TOP_N, build_order_intents, select_most_declined,
};
use crate::domain::universe::Universe;
use crate::ports::gateway_events::{EfpTick, GatewayEvents};
use crate::ports::gateway_port::GatewayPort;
use crate::ports::report_port::ReportPort;
use log::{debug, error, info, trace, warn};
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::Duration;

/// Code attached to errors raised on this side of the connection.
pub const LOCAL_ERROR_CODE: i32 = -1;

/// Id used when an error is not tied to a request or order.
pub const NO_ID: i32 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitMode {
    /// Wait until every historical request has ended or failed, bounded by
    /// the settle timeout.
    Completion,
    /// Sleep for the full settle timeout.
    FixedDelay,
}

impl FromStr for WaitMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "completion" => Ok(WaitMode::Completion),
            "fixed" | "fixed_delay" => Ok(WaitMode::FixedDelay),
            other => Err(format!(
                "unknown wait mode '{}', expected 'completion' or 'fixed'",
                other
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub host: String,
    pub port: u16,
    pub client_id: i32,
    pub ready_timeout: Duration,
    pub request_pacing: Duration,
    pub settle_timeout: Duration,
    pub wait_mode: WaitMode,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 4002,
            client_id: 0,
            ready_timeout: Duration::from_secs(10),
            request_pacing: Duration::from_millis(100),
            settle_timeout: Duration::from_secs(60),
            wait_mode: WaitMode::Completion,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedOrder {
    pub order_id: OrderId,
    pub intent: OrderIntent,
}

/// What the selector picked and which of those orders reached the gateway.
#[derive(Debug, Clone, PartialEq)]
pub struct Execution {
    pub selected: Vec<Observation>,
    pub orders: Vec<PlacedOrder>,
}

#[derive(Debug, Clone)]
pub struct SessionReport {
    /// Whether the gateway supplied an order id before requests started.
    pub ready: bool,
    pub observations: usize,
    pub selected: Vec<Observation>,
    pub orders: Vec<PlacedOrder>,
    /// Symbols whose historical request neither ended nor failed in time.
    pub missing: Vec<String>,
    pub ticks_received: u64,
    pub errors_reported: u64,
}

#[derive(Debug)]
pub struct TradingSession {
    tracker: ChangeTracker,
    order_ids: OrderIdSequence,
    requests: RequestRegistry,
    completion: CompletionTracker,
    history: HistoricalDataRequest,
    ticks_received: AtomicU64,
    errors_reported: AtomicU64,
}

impl TradingSession {
    pub fn new() -> Self {
        Self {
            tracker: ChangeTracker::new(),
            order_ids: OrderIdSequence::new(),
            requests: RequestRegistry::new(),
            completion: CompletionTracker::new(),
            history: HistoricalDataRequest::one_day(),
            ticks_received: AtomicU64::new(0),
            errors_reported: AtomicU64::new(0),
        }
    }

    pub fn tracker(&self) -> &ChangeTracker {
        &self.tracker
    }

    pub fn order_ids(&self) -> &OrderIdSequence {
        &self.order_ids
    }

    pub fn ticks_received(&self) -> u64 {
        self.ticks_received.load(Ordering::Relaxed)
    }

    pub fn errors_reported(&self) -> u64 {
        self.errors_reported.load(Ordering::Relaxed)
    }

    /// Route a locally raised error through the gateway error handler.
    pub fn report_error(&self, id: i32, err: &TraderError) {
        self.error(id, LOCAL_ERROR_CODE, &err.to_string());
    }

    pub fn request_market_data(
        &self,
        gateway: &dyn GatewayPort,
        symbols: &[String],
        pacing: Duration,
    ) {
        for symbol in symbols {
            let contract = Contract::stock(symbol);
            let req_id = self.requests.register(symbol, RequestKind::MarketData);
            debug!("reqMktData {} ({})", req_id, contract);
            if let Err(e) = gateway.request_market_data(req_id, &contract) {
                self.report_error(req_id, &e);
            }
            pace(pacing);
        }
    }

    pub fn request_historical_data(
        &self,
        gateway: &dyn GatewayPort,
        symbols: &[String],
        pacing: Duration,
    ) {
        for symbol in symbols {
            let contract = Contract::stock(symbol);
            let req_id = self.requests.register(symbol, RequestKind::HistoricalData);
            self.completion.expect(req_id);
            debug!(
                "reqHistoricalData {} ({}, {}, {}, {})",
                req_id,
                contract,
                self.history.duration(),
                self.history.bar_size,
                self.history.what_to_show
            );
            if let Err(e) = gateway.request_historical_data(req_id, &contract, &self.history) {
                self.report_error(req_id, &e);
            }
            pace(pacing);
        }
    }

    /// Submit `order` under the next order id. The id is consumed even when
    /// the gateway rejects the submission.
    pub fn place_order(
        &self,
        gateway: &dyn GatewayPort,
        contract: &Contract,
        order: &Order,
    ) -> Result<OrderId, TraderError> {
        let order_id = self.order_ids.allocate()?;
        info!(
            "placing order {}: {} {} {} {}",
            order_id, order.action, order.total_quantity, contract.symbol, order.order_type
        );
        gateway.place_order(order_id, contract, order)?;
        Ok(order_id)
    }

    /// The most-declined symbols recorded so far. The tracker lock is only
    /// held while copying.
    pub fn find_top_decreasing(&self) -> Vec<Observation> {
        select_most_declined(&self.tracker.snapshot(), TOP_N)
    }

    pub fn execute(&self, gateway: &dyn GatewayPort, report: &dyn ReportPort) -> Execution {
        let selected = self.find_top_decreasing();
        if selected.len() < TOP_N {
            warn!(
                "only {} observations available, selecting all of them",
                selected.len()
            );
        }
        if let Err(e) = report.write_selection(&selected) {
            self.report_error(NO_ID, &e);
        }

        let mut placed = Vec::with_capacity(selected.len());
        for intent in build_order_intents(&selected, ORDER_QUANTITY) {
            match self.place_order(gateway, &intent.contract, &intent.order) {
                Ok(order_id) => placed.push(PlacedOrder { order_id, intent }),
                Err(e) => self.report_error(NO_ID, &e),
            }
        }
        Execution {
            selected,
            orders: placed,
        }
    }

    fn wait_for_data(&self, settings: &SessionSettings) -> Vec<RequestId> {
        match settings.wait_mode {
            WaitMode::Completion => {
                info!(
                    "waiting up to {:?} for {} historical requests",
                    settings.settle_timeout,
                    self.completion.outstanding_count()
                );
                match self.completion.wait_all(settings.settle_timeout) {
                    WaitOutcome::Complete => Vec::new(),
                    WaitOutcome::TimedOut { outstanding } => outstanding,
                }
            }
            WaitMode::FixedDelay => {
                info!("waiting {:?} for data to arrive", settings.settle_timeout);
                thread::sleep(settings.settle_timeout);
                match self.completion.wait_all(Duration::ZERO) {
                    WaitOutcome::Complete => Vec::new(),
                    WaitOutcome::TimedOut { outstanding } => outstanding,
                }
            }
        }
    }

    fn symbols_for(&self, req_ids: &[RequestId]) -> Vec<String> {
        req_ids
            .iter()
            .filter_map(|&id| self.requests.symbol_for(id, RequestKind::HistoricalData))
            .collect()
    }
}

impl Default for TradingSession {
    fn default() -> Self {
        Self::new()
    }
}

impl GatewayEvents for TradingSession {
    fn next_valid_id(&self, order_id: OrderId) {
        info!("next valid order id: {}", order_id);
        self.order_ids.seed(order_id);
    }

    fn error(&self, id: i32, code: i32, message: &str) {
        self.errors_reported.fetch_add(1, Ordering::Relaxed);
        error!("Error: {} (code: {}, id: {})", message, code, id);
        if self.completion.complete(id) {
            if let Some(symbol) = self.requests.symbol_for(id, RequestKind::HistoricalData) {
                warn!("no historical data for {}; it will not be ranked", symbol);
            }
        }
    }

    fn order_error(&self, order_id: OrderId, code: i32, message: &str) {
        self.errors_reported.fetch_add(1, Ordering::Relaxed);
        error!("Order error: {} (code: {}, order: {})", message, code, order_id);
    }

    fn tick_price(&self, req_id: RequestId, field: &str, price: f64) {
        self.ticks_received.fetch_add(1, Ordering::Relaxed);
        trace!("tick {} {} price {}", req_id, field, price);
    }

    fn tick_size(&self, req_id: RequestId, field: &str, size: f64) {
        self.ticks_received.fetch_add(1, Ordering::Relaxed);
        trace!("tick {} {} size {}", req_id, field, size);
    }

    fn tick_string(&self, req_id: RequestId, field: &str, value: &str) {
        self.ticks_received.fetch_add(1, Ordering::Relaxed);
        trace!("tick {} {} string {}", req_id, field, value);
    }

    fn tick_generic(&self, req_id: RequestId, field: &str, value: f64) {
        self.ticks_received.fetch_add(1, Ordering::Relaxed);
        trace!("tick {} {} generic {}", req_id, field, value);
    }

    fn tick_efp(&self, req_id: RequestId, field: &str, efp: &EfpTick) {
        self.ticks_received.fetch_add(1, Ordering::Relaxed);
        trace!(
            "tick {} {} efp {} ({})",
            req_id, field, efp.basis_points, efp.formatted_basis_points
        );
    }

    fn historical_data(&self, req_id: RequestId, bar: &Bar) {
        let Some(symbol) = self.requests.symbol_for(req_id, RequestKind::HistoricalData) else {
            warn!("historical bar for unknown request {}", req_id);
            return;
        };
        let change = bar.percent_change();
        match self.tracker.record(&symbol, change) {
            RecordOutcome::Inserted => {
                debug!("{} {}: open {} close {} ({:.2}%)", symbol, bar.date, bar.open, bar.close, change)
            }
            RecordOutcome::Duplicate => {
                warn!("ignoring extra bar for {} dated {}", symbol, bar.date)
            }
            RecordOutcome::NotFinite => {
                warn!("ignoring bar for {} with open {}", symbol, bar.open)
            }
        }
    }

    fn historical_data_end(&self, req_id: RequestId) {
        if self.completion.complete(req_id) {
            debug!("historical request {} complete", req_id);
        }
    }

    fn order_status(&self, order_id: OrderId, status: &str, filled: f64, remaining: f64) {
        info!(
            "order {} {}: filled {} remaining {}",
            order_id, status, filled, remaining
        );
    }

    fn connection_closed(&self) {
        warn!("gateway connection closed");
    }
}

fn pace(pacing: Duration) {
    if !pacing.is_zero() {
        thread::sleep(pacing);
    }
}

pub fn run_session(
    gateway: &dyn GatewayPort,
    universe: &Universe,
    settings: &SessionSettings,
    report: &dyn ReportPort,
) -> SessionReport {
    let session = Arc::new(TradingSession::new());
    let events: Arc<dyn GatewayEvents> = session.clone();

    info!(
        "connecting to {}:{} as client {}",
        settings.host, settings.port, settings.client_id
    );
    if let Err(e) = gateway.connect(&settings.host, settings.port, settings.client_id, events) {
        session.report_error(NO_ID, &e);
    }

    let ready = session.order_ids().wait_ready(settings.ready_timeout);
    if !ready {
        warn!(
            "no order id from gateway within {:?}; continuing",
            settings.ready_timeout
        );
    }

    info!("requesting data for {} symbols", universe.count());
    thread::scope(|s| {
        s.spawn(|| {
            session.request_market_data(gateway, &universe.symbols, settings.request_pacing)
        });
        s.spawn(|| {
            session.request_historical_data(gateway, &universe.symbols, settings.request_pacing)
        });
    });

    let outstanding = session.wait_for_data(settings);
    let missing = session.symbols_for(&outstanding);
    if !missing.is_empty() {
        warn!(
            "{} historical requests unanswered, ranking a partial set",
            missing.len()
        );
    }

    let observations = session.tracker().len();
    let Execution { selected, orders } = session.execute(gateway, report);

    gateway.disconnect();

    info!(
        "session finished: {} observations, {} orders placed, {} errors",
        observations,
        orders.len(),
        session.errors_reported()
    );

    SessionReport {
        ready,
        observations,
        selected,
        orders,
        missing,
        ticks_received: session.ticks_received(),
        errors_reported: session.errors_reported(),
    }
}
