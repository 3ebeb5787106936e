//! # CashCached Wallet
//!
//! Client-side wallet state and the services around it.
//!
//! ## Layout
//!
//! - `store` - Wallet state store (balance loading, add/withdraw)
//! - `events` - Broadcast bus for UI notifications
//! - `format` - Token and currency formatting
//! - `rates` - Injected, replaceable exchange rate table
//! - `reports` - Admin CSV report export
//!
//! The store and exporter are generic over the ports in `cashcached-types`,
//! so the HTTP client can be swapped for a mock in tests.

pub mod events;
pub mod format;
pub mod rates;
pub mod reports;
pub mod store;

#[cfg(test)]
mod store_tests;

pub use events::EventBus;
pub use format::{format_money, format_tokens};
pub use rates::{RatesHandle, StaticRates};
pub use reports::{ExportError, ReportExporter};
pub use store::WalletStore;
