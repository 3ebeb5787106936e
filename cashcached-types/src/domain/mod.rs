//! Domain models for the wallet client.

pub mod customer;
pub mod event;
pub mod report;
pub mod wallet;

pub use customer::{CustomerId, UserSession};
pub use event::{Toast, ToastLevel, UiEvent, WalletRefresh};
pub use report::{ExportedReport, ReportFilters, ReportKind};
pub use wallet::WalletState;
