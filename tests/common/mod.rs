#![allow(dead_code)]

use chrono::NaiveDate;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier, Mutex, mpsc};
use tickercast::domain::error::{FetchError, TickercastError};
pub use tickercast::domain::ohlcv::RawRow;
use tickercast::ports::price_store_port::PriceStorePort;
use tickercast::ports::quote_port::QuotePort;

/// In-memory store; rows are kept exactly as replaced.
#[derive(Default)]
pub struct MockPriceStore {
    pub rows: Mutex<Vec<RawRow>>,
    pub load_error: Mutex<Option<String>>,
}

impl MockPriceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(rows: Vec<RawRow>) -> Self {
        Self {
            rows: Mutex::new(rows),
            load_error: Mutex::new(None),
        }
    }

    pub fn fail_loads(&self, reason: &str) {
        *self.load_error.lock().unwrap() = Some(reason.to_string());
    }

    pub fn row_count(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

impl PriceStorePort for MockPriceStore {
    fn ensure_exists(&self) -> Result<(), TickercastError> {
        Ok(())
    }

    fn load_rows(&self) -> Result<Vec<RawRow>, TickercastError> {
        if let Some(reason) = self.load_error.lock().unwrap().clone() {
            return Err(TickercastError::store(reason));
        }
        Ok(self.rows.lock().unwrap().clone())
    }

    fn replace(&self, rows: &[RawRow]) -> Result<(), TickercastError> {
        *self.rows.lock().unwrap() = rows.to_vec();
        Ok(())
    }
}

/// Quote source answering with fixed rows or a fixed HTTP status.
///
/// A gated port parks every fetch until the test sends on the release channel.
pub struct MockQuotePort {
    pub response: Mutex<Result<Vec<RawRow>, u16>>,
    pub calls: AtomicUsize,
    gate: Option<(Arc<Barrier>, Mutex<mpsc::Receiver<()>>)>,
}

impl MockQuotePort {
    pub fn ok(rows: Vec<RawRow>) -> Self {
        Self {
            response: Mutex::new(Ok(rows)),
            calls: AtomicUsize::new(0),
            gate: None,
        }
    }

    pub fn status(code: u16) -> Self {
        Self {
            response: Mutex::new(Err(code)),
            calls: AtomicUsize::new(0),
            gate: None,
        }
    }

    /// Returns the port, a barrier the fetch meets on entry, and its release.
    pub fn gated(rows: Vec<RawRow>) -> (Self, Arc<Barrier>, mpsc::Sender<()>) {
        let entered = Arc::new(Barrier::new(2));
        let (tx, rx) = mpsc::channel();
        let port = Self {
            gate: Some((Arc::clone(&entered), Mutex::new(rx))),
            ..Self::ok(rows)
        };
        (port, entered, tx)
    }

    pub fn set_rows(&self, rows: Vec<RawRow>) {
        *self.response.lock().unwrap() = Ok(rows);
    }

    pub fn set_status(&self, code: u16) {
        *self.response.lock().unwrap() = Err(code);
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl QuotePort for MockQuotePort {
    fn fetch_daily(&self, _symbol: &str) -> Result<Vec<RawRow>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some((entered, release)) = &self.gate {
            entered.wait();
            let _ = release.lock().unwrap().recv();
        }
        self.response.lock().unwrap().clone().map_err(FetchError::Status)
    }
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

/// `count` consecutive calendar days from `start`, close = base + step * i.
pub fn generate_rows(start: &str, count: usize, base: f64, step: f64) -> Vec<RawRow> {
    let start = date(start);
    (0..count)
        .map(|i| {
            let d = start + chrono::Duration::days(i as i64);
            let close = base + step * i as f64;
            RawRow::new(
                d.format("%Y-%m-%d").to_string(),
                format!("{:.2}", close - 0.5),
                format!("{:.2}", close + 1.0),
                format!("{:.2}", close - 1.0),
                format!("{:.2}", close),
                "100000",
            )
        })
        .collect()
}
