//! Events broadcast to UI consumers.

use serde::{Deserialize, Serialize};

use exchange_rates::CurrencyCode;

use super::customer::CustomerId;

/// Detail of a wallet refresh notification.
///
/// `balance` is the balance the publisher held when the mutation started;
/// subscribers that need the reloaded value read the wallet state store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletRefresh {
    pub customer_id: CustomerId,
    pub balance: f64,
    pub currency: CurrencyCode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastLevel {
    Success,
    Error,
}

/// A short user-facing notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toast {
    pub level: ToastLevel,
    pub message: String,
}

impl Toast {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: ToastLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: ToastLevel::Error,
            message: message.into(),
        }
    }
}

/// Everything published on the UI event bus.
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    RefreshWallet(WalletRefresh),
    Toast(Toast),
}

impl UiEvent {
    pub const REFRESH_WALLET: &'static str = "cashcached:refresh-wallet";
    pub const TOAST: &'static str = "cashcached:toast";

    /// Canonical event name.
    pub fn name(&self) -> &'static str {
        match self {
            UiEvent::RefreshWallet(_) => Self::REFRESH_WALLET,
            UiEvent::Toast(_) => Self::TOAST,
        }
    }

    /// Serialized event detail.
    pub fn detail(&self) -> serde_json::Value {
        let detail = match self {
            UiEvent::RefreshWallet(refresh) => serde_json::to_value(refresh),
            UiEvent::Toast(toast) => serde_json::to_value(toast),
        };
        detail.unwrap_or(serde_json::Value::Null)
    }
}
