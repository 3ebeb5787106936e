//! # CashCached Types
//!
//! Domain types and port traits for the CashCached wallet client.
//! This crate has no IO dependencies - only data structures, payload
//! validation rules, and trait definitions.
//!
//! ## Layout
//!
//! - `domain/` - Customer, session, wallet state, events, reports
//! - `ports/` - Trait definitions that adapters must implement
//! - `dto/` - Request bodies and the balance payload schema
//! - `error/` - API and wallet error types

pub mod domain;
pub mod dto;
pub mod error;
pub mod ports;

// Re-export commonly used types
pub use domain::{
    CustomerId, ExportedReport, ReportFilters, ReportKind, Toast, ToastLevel, UiEvent, UserSession,
    WalletRefresh, WalletState,
};
pub use dto::*;
pub use error::{ApiError, WalletError};
pub use exchange_rates::{CurrencyCode, ExchangeError, ExchangeRateTable};
pub use ports::{RateSource, ReportApi, WalletApi};
