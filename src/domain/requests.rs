//! Request id allocation and the mapping back from callbacks to symbols.

use crate::domain::contract::RequestId;
use parking_lot::Mutex;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    MarketData,
    HistoricalData,
}

#[derive(Debug)]
struct RequestEntry {
    symbol: String,
    kind: RequestKind,
}

#[derive(Debug)]
struct Inner {
    next_id: RequestId,
    entries: HashMap<RequestId, RequestEntry>,
}

/// One id space shared by market-data and historical-data requests, so a
/// callback id is never ambiguous.
#[derive(Debug)]
pub struct RequestRegistry {
    inner: Mutex<Inner>,
}

impl RequestRegistry {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                next_id: 1,
                entries: HashMap::new(),
            }),
        }
    }

    pub fn register(&self, symbol: &str, kind: RequestKind) -> RequestId {
        let mut inner = self.inner.lock();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.entries.insert(
            id,
            RequestEntry {
                symbol: symbol.to_string(),
                kind,
            },
        );
        id
    }

    pub fn symbol_for(&self, req_id: RequestId, kind: RequestKind) -> Option<String> {
        self.inner
            .lock()
            .entries
            .get(&req_id)
            .filter(|e| e.kind == kind)
            .map(|e| e.symbol.clone())
    }
}

impl Default for RequestRegistry {
    fn default() -> Self {
        Self::new()
    }
}
