//! Observable wallet state.

use serde::Serialize;

/// Snapshot of the wallet as held by the client.
///
/// `balance` is always in the base currency.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletState {
    pub balance: f64,
    pub is_loading: bool,
    /// Message of the most recent failed balance read, cleared on success.
    pub last_error: Option<String>,
}
