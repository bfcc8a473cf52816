#![allow(dead_code)]

use chrono::NaiveDate;
use dipbuyer::domain::bar::Bar;
use dipbuyer::domain::contract::{Contract, HistoricalDataRequest, Order, OrderId, RequestId};
use dipbuyer::domain::error::TraderError;
use dipbuyer::domain::observation::Observation;
use dipbuyer::domain::session::{SessionSettings, WaitMode};
use dipbuyer::domain::universe::Universe;
use dipbuyer::ports::gateway_events::GatewayEvents;
use dipbuyer::ports::gateway_port::GatewayPort;
use dipbuyer::ports::report_port::ReportPort;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// What the scripted gateway does when history for a symbol is requested.
#[derive(Debug, Clone)]
pub enum History {
    Bars(Vec<Bar>),
    Error { code: i32, message: String },
    /// Request is accepted but nothing ever comes back.
    Silent,
    /// The request call itself fails.
    Reject(String),
}

/// Gateway double that answers synchronously on the requesting thread.
pub struct ScriptedGateway {
    pub next_valid_id: Option<OrderId>,
    pub connect_error: Option<String>,
    pub history: HashMap<String, History>,
    pub order_reject: HashMap<String, String>,
    /// Bar delivered (for a symbol's historical request) while an order is
    /// being placed.
    pub late_bar_on_order: Option<(String, Bar)>,
    pub ticks_per_subscription: usize,

    events: Mutex<Option<Arc<dyn GatewayEvents>>>,
    historical_ids: Mutex<HashMap<String, RequestId>>,
    pub market_data_requests: Mutex<Vec<(RequestId, Contract)>>,
    pub historical_requests: Mutex<Vec<(RequestId, Contract, HistoricalDataRequest)>>,
    pub placed: Mutex<Vec<(OrderId, Contract, Order)>>,
    pub connects: Mutex<Vec<(String, u16, i32)>>,
    pub disconnects: Mutex<usize>,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self {
            next_valid_id: Some(1),
            connect_error: None,
            history: HashMap::new(),
            order_reject: HashMap::new(),
            late_bar_on_order: None,
            ticks_per_subscription: 0,
            events: Mutex::new(None),
            historical_ids: Mutex::new(HashMap::new()),
            market_data_requests: Mutex::new(Vec::new()),
            historical_requests: Mutex::new(Vec::new()),
            placed: Mutex::new(Vec::new()),
            connects: Mutex::new(Vec::new()),
            disconnects: Mutex::new(0),
        }
    }

    pub fn with_next_valid_id(mut self, id: Option<OrderId>) -> Self {
        self.next_valid_id = id;
        self
    }

    pub fn with_connect_error(mut self, reason: &str) -> Self {
        self.connect_error = Some(reason.to_string());
        self
    }

    pub fn with_history(mut self, symbol: &str, history: History) -> Self {
        self.history.insert(symbol.to_string(), history);
        self
    }

    pub fn with_change(self, symbol: &str, open: f64, close: f64) -> Self {
        self.with_history(symbol, History::Bars(vec![make_bar(open, close)]))
    }

    pub fn with_order_reject(mut self, symbol: &str, reason: &str) -> Self {
        self.order_reject.insert(symbol.to_string(), reason.to_string());
        self
    }

    pub fn with_late_bar_on_order(mut self, symbol: &str, bar: Bar) -> Self {
        self.late_bar_on_order = Some((symbol.to_string(), bar));
        self
    }

    pub fn with_ticks(mut self, per_subscription: usize) -> Self {
        self.ticks_per_subscription = per_subscription;
        self
    }

    fn events(&self) -> Option<Arc<dyn GatewayEvents>> {
        self.events.lock().unwrap().clone()
    }

    pub fn placed_orders(&self) -> Vec<(OrderId, Contract, Order)> {
        self.placed.lock().unwrap().clone()
    }

    pub fn placed_symbols(&self) -> Vec<String> {
        self.placed_orders()
            .into_iter()
            .map(|(_, c, _)| c.symbol)
            .collect()
    }

    pub fn disconnect_count(&self) -> usize {
        *self.disconnects.lock().unwrap()
    }
}

impl GatewayPort for ScriptedGateway {
    fn connect(
        &self,
        host: &str,
        port: u16,
        client_id: i32,
        events: Arc<dyn GatewayEvents>,
    ) -> Result<(), TraderError> {
        self.connects
            .lock()
            .unwrap()
            .push((host.to_string(), port, client_id));
        if let Some(reason) = &self.connect_error {
            return Err(TraderError::gateway(reason.clone()));
        }
        *self.events.lock().unwrap() = Some(Arc::clone(&events));
        if let Some(id) = self.next_valid_id {
            events.next_valid_id(id);
        }
        Ok(())
    }

    fn disconnect(&self) {
        *self.disconnects.lock().unwrap() += 1;
        *self.events.lock().unwrap() = None;
    }

    fn request_market_data(
        &self,
        req_id: RequestId,
        contract: &Contract,
    ) -> Result<(), TraderError> {
        let events = self.events().ok_or(TraderError::NotConnected)?;
        self.market_data_requests
            .lock()
            .unwrap()
            .push((req_id, contract.clone()));
        for i in 0..self.ticks_per_subscription {
            events.tick_price(req_id, "LAST", 100.0 + i as f64);
        }
        Ok(())
    }

    fn request_historical_data(
        &self,
        req_id: RequestId,
        contract: &Contract,
        request: &HistoricalDataRequest,
    ) -> Result<(), TraderError> {
        let events = self.events().ok_or(TraderError::NotConnected)?;
        self.historical_requests
            .lock()
            .unwrap()
            .push((req_id, contract.clone(), request.clone()));
        self.historical_ids
            .lock()
            .unwrap()
            .insert(contract.symbol.clone(), req_id);

        match self.history.get(&contract.symbol) {
            Some(History::Bars(bars)) => {
                for bar in bars {
                    events.historical_data(req_id, bar);
                }
                events.historical_data_end(req_id);
            }
            Some(History::Error { code, message }) => events.error(req_id, *code, message),
            Some(History::Silent) => {}
            Some(History::Reject(reason)) => return Err(TraderError::gateway(reason.clone())),
            None => events.historical_data_end(req_id),
        }
        Ok(())
    }

    fn place_order(
        &self,
        order_id: OrderId,
        contract: &Contract,
        order: &Order,
    ) -> Result<(), TraderError> {
        let events = self.events().ok_or(TraderError::NotConnected)?;
        if let Some((symbol, bar)) = &self.late_bar_on_order {
            let req_id = self.historical_ids.lock().unwrap().get(symbol).copied();
            if let Some(req_id) = req_id {
                events.historical_data(req_id, bar);
            }
        }
        if let Some(reason) = self.order_reject.get(&contract.symbol) {
            return Err(TraderError::gateway(reason.clone()));
        }
        self.placed
            .lock()
            .unwrap()
            .push((order_id, contract.clone(), order.clone()));
        events.order_status(order_id, "Submitted", 0.0, order.total_quantity);
        Ok(())
    }
}

/// Report double that remembers what it was given.
#[derive(Default)]
pub struct RecordingReport {
    pub written: Mutex<Vec<Vec<Observation>>>,
}

impl RecordingReport {
    pub fn last(&self) -> Vec<Observation> {
        self.written.lock().unwrap().last().cloned().unwrap_or_default()
    }
}

impl ReportPort for RecordingReport {
    fn write_selection(&self, selected: &[Observation]) -> Result<(), TraderError> {
        self.written.lock().unwrap().push(selected.to_vec());
        Ok(())
    }
}

pub fn make_bar(open: f64, close: f64) -> Bar {
    Bar {
        date: NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
        open,
        high: open.max(close) + 0.5,
        low: open.min(close) - 0.5,
        close,
        volume: 10_000.0,
    }
}

/// `AAA`, `BBB`, ... `OOO` for n up to 26.
pub fn letter_symbols(n: usize) -> Vec<String> {
    (0..n)
        .map(|i| {
            let c = (b'A' + i as u8) as char;
            format!("{c}{c}{c}")
        })
        .collect()
}

pub fn universe(symbols: &[String]) -> Universe {
    Universe::new(symbols.to_vec()).unwrap()
}

/// Settings with no pacing and short waits.
pub fn fast_settings() -> SessionSettings {
    SessionSettings {
        host: "127.0.0.1".into(),
        port: 4002,
        client_id: 0,
        ready_timeout: Duration::from_millis(50),
        request_pacing: Duration::ZERO,
        settle_timeout: Duration::from_millis(200),
        wait_mode: WaitMode::Completion,
    }
}
