//! Port traits (interfaces for adapters).
//!
//! The wallet store and report exporter depend on these traits, not on
//! the HTTP client.

mod exchange;
mod reports;
mod wallet;

pub use exchange::RateSource;
pub use reports::ReportApi;
pub use wallet::WalletApi;
