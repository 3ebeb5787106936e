//! Injected exchange rates.

use std::sync::Arc;

use tokio::sync::watch;

use cashcached_types::{ExchangeError, ExchangeRateTable, RateSource};

/// Shared, replaceable rate table.
///
/// Clones share the same table, so pushing new rates through one handle is
/// seen by every store and formatter holding another.
#[derive(Clone)]
pub struct RatesHandle {
    sender: Arc<watch::Sender<Arc<ExchangeRateTable>>>,
}

impl RatesHandle {
    pub fn new(table: ExchangeRateTable) -> Self {
        let (sender, _receiver) = watch::channel(Arc::new(table));
        Self {
            sender: Arc::new(sender),
        }
    }

    /// The table in effect right now.
    pub fn current(&self) -> Arc<ExchangeRateTable> {
        self.sender.borrow().clone()
    }

    pub fn replace(&self, table: ExchangeRateTable) {
        tracing::info!(currencies = table.len(), "exchange rates replaced");
        self.sender.send_replace(Arc::new(table));
    }

    /// Pulls a fresh table from `source`. The current table is kept on error.
    pub async fn refresh_from(&self, source: &dyn RateSource) -> Result<(), ExchangeError> {
        match source.fetch_table().await {
            Ok(table) => {
                self.replace(table);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "exchange rate refresh failed, keeping current table");
                Err(e)
            }
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<ExchangeRateTable>> {
        self.sender.subscribe()
    }
}

impl Default for RatesHandle {
    fn default() -> Self {
        Self::new(ExchangeRateTable::default())
    }
}

/// A [`RateSource`] that always returns the same table.
#[derive(Debug, Clone, Default)]
pub struct StaticRates {
    table: ExchangeRateTable,
}

impl StaticRates {
    pub fn new(table: ExchangeRateTable) -> Self {
        Self { table }
    }
}

#[async_trait::async_trait]
impl RateSource for StaticRates {
    async fn fetch_table(&self) -> Result<ExchangeRateTable, ExchangeError> {
        Ok(self.table.clone())
    }
}
