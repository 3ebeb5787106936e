//! Exchange rate source port.
//!
//! Implementations can be a fixed table, a configuration file, an HTTP
//! feed, etc.

use exchange_rates::{ExchangeError, ExchangeRateTable};

/// Port trait for exchange rate providers.
#[async_trait::async_trait]
pub trait RateSource: Send + Sync {
    /// Fetches a complete rate table (units per USD).
    async fn fetch_table(&self) -> Result<ExchangeRateTable, ExchangeError>;
}
