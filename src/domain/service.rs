//! Owner of the analysis state: startup load, refresh, and consistent snapshots.
//!
//! Readers take an `Arc` snapshot of the whole state, so a query always sees a
//! series together with the model fitted on it. Refreshes are single-flight:
//! a second refresh while one is running is rejected with
//! [`TickercastError::RefreshInProgress`]. Every failed load or refresh leaves
//! the previous state in place.

use std::sync::{Arc, Mutex, PoisonError, RwLock, TryLockError};

use tracing::{error, info, warn};

use crate::domain::analysis::AnalysisState;
use crate::domain::error::TickercastError;
use crate::domain::series::prepare;
use crate::ports::price_store_port::PriceStorePort;
use crate::ports::quote_port::QuotePort;

/// Summary of a completed refresh.
#[derive(Debug, Clone, PartialEq)]
pub struct RefreshReport {
    pub fetched: usize,
    pub prepared: usize,
    pub model_fitted: bool,
}

pub struct AnalysisService {
    store: Arc<dyn PriceStorePort + Send + Sync>,
    quotes: Arc<dyn QuotePort + Send + Sync>,
    symbol: String,
    state: RwLock<Arc<AnalysisState>>,
    refresh_guard: Mutex<()>,
}

impl AnalysisService {
    pub fn new(
        store: Arc<dyn PriceStorePort + Send + Sync>,
        quotes: Arc<dyn QuotePort + Send + Sync>,
        symbol: impl Into<String>,
    ) -> Self {
        Self {
            store,
            quotes,
            symbol: symbol.into(),
            state: RwLock::new(Arc::new(AnalysisState::Uninitialized)),
            refresh_guard: Mutex::new(()),
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// The current state. Cheap; the returned value never changes underneath.
    pub fn snapshot(&self) -> Arc<AnalysisState> {
        match self.state.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    /// Create the store if needed, then load and fit from it.
    pub fn start(&self) -> Result<(), TickercastError> {
        self.store.ensure_exists()?;
        self.load()
    }

    /// Rebuild series and model from the store and swap them in together.
    ///
    /// Waits for an in-flight refresh to finish first. On a store error the
    /// previous state is kept.
    pub fn load(&self) -> Result<(), TickercastError> {
        let _guard = self
            .refresh_guard
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let next = self.build_state().inspect_err(|e| {
            error!(error = %e, "load failed, keeping previous state");
        })?;
        self.swap(next);
        Ok(())
    }

    /// Fetch, rewrite the store, reload, and refit.
    ///
    /// Rejected outright if another refresh holds the guard.
    pub fn refresh(&self) -> Result<RefreshReport, TickercastError> {
        let _guard = match self.refresh_guard.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
            Err(TryLockError::WouldBlock) => {
                warn!("refresh rejected, another refresh is running");
                return Err(TickercastError::RefreshInProgress);
            }
        };

        info!(symbol = %self.symbol, "refreshing");
        let rows = self.quotes.fetch_daily(&self.symbol).map_err(|e| {
            error!(error = %e, "fetch failed, keeping previous state");
            TickercastError::from(e)
        })?;
        let fetched = rows.len();

        self.store.replace(&rows).inspect_err(|e| {
            error!(error = %e, "store rewrite failed, keeping previous state");
        })?;
        info!(rows = fetched, "data saved");

        let next = self.build_state().inspect_err(|e| {
            error!(error = %e, "reload failed, keeping previous state");
        })?;
        let report = RefreshReport {
            fetched,
            prepared: next.series().map_or(0, |s| s.len()),
            model_fitted: next.is_ready(),
        };
        self.swap(next);

        info!(
            fetched = report.fetched,
            prepared = report.prepared,
            model_fitted = report.model_fitted,
            "refresh complete"
        );
        Ok(report)
    }

    fn build_state(&self) -> Result<AnalysisState, TickercastError> {
        let rows = self.store.load_rows()?;
        let preparation = prepare(&rows);
        Ok(AnalysisState::from_series(preparation.series))
    }

    fn swap(&self, next: AnalysisState) {
        let next = Arc::new(next);
        match self.state.write() {
            Ok(mut guard) => *guard = next,
            Err(poisoned) => *poisoned.into_inner() = next,
        }
    }
}
