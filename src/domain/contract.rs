//! Contract, order and request descriptors sent to the gateway.

use std::fmt;

/// Gateway-scoped order identifier.
pub type OrderId = i32;

/// Tag attached to every market-data and historical-data request.
pub type RequestId = i32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecurityType {
    Stock,
}

impl fmt::Display for SecurityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SecurityType::Stock => write!(f, "STK"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contract {
    pub symbol: String,
    pub security_type: SecurityType,
    pub exchange: String,
    pub currency: String,
}

impl Contract {
    /// SMART-routed, USD-denominated common stock.
    pub fn stock(symbol: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            security_type: SecurityType::Stock,
            exchange: "SMART".to_string(),
            currency: "USD".to_string(),
        }
    }
}

impl fmt::Display for Contract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.symbol, self.security_type, self.exchange, self.currency
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderAction {
    Buy,
}

impl fmt::Display for OrderAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderAction::Buy => write!(f, "BUY"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderType {
    Market,
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderType::Market => write!(f, "MKT"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub action: OrderAction,
    pub order_type: OrderType,
    pub total_quantity: f64,
}

impl Order {
    pub fn market(action: OrderAction, total_quantity: f64) -> Self {
        Self {
            action,
            order_type: OrderType::Market,
            total_quantity,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarSize {
    Day,
}

impl fmt::Display for BarSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BarSize::Day => write!(f, "1 day"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WhatToShow {
    Trades,
}

impl fmt::Display for WhatToShow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WhatToShow::Trades => write!(f, "TRADES"),
        }
    }
}

/// Parameters of a historical bar request. The end of the window is always
/// "now" (an empty end time on the wire).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoricalDataRequest {
    pub duration_days: i32,
    pub bar_size: BarSize,
    pub what_to_show: WhatToShow,
    pub use_rth: bool,
    pub format_date: i32,
    pub keep_up_to_date: bool,
}

impl HistoricalDataRequest {
    /// One daily TRADES bar, regular trading hours only.
    pub fn one_day() -> Self {
        Self {
            duration_days: 1,
            bar_size: BarSize::Day,
            what_to_show: WhatToShow::Trades,
            use_rth: true,
            format_date: 1,
            keep_up_to_date: false,
        }
    }

    /// Duration string in gateway notation, e.g. `1 D`.
    pub fn duration(&self) -> String {
        format!("{} D", self.duration_days)
    }
}

impl Default for HistoricalDataRequest {
    fn default() -> Self {
        Self::one_day()
    }
}
