//! Customer identity and session.

use serde::{Deserialize, Serialize};

use exchange_rates::CurrencyCode;

use crate::error::WalletError;

/// Backend identifier of a customer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerId(String);

impl CustomerId {
    /// Creates a CustomerId, rejecting blank values.
    pub fn new(id: impl Into<String>) -> Result<Self, WalletError> {
        let id = id.into().trim().to_string();
        if id.is_empty() {
            return Err(WalletError::Validation("Customer id cannot be empty".into()));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CustomerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for CustomerId {
    type Err = WalletError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// The authenticated user as seen by the wallet.
///
/// Owned by the authentication layer; the wallet only reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSession {
    pub customer_id: CustomerId,
    pub preferred_currency: CurrencyCode,
}

impl UserSession {
    pub fn new(customer_id: CustomerId, preferred_currency: CurrencyCode) -> Self {
        Self {
            customer_id,
            preferred_currency,
        }
    }
}
