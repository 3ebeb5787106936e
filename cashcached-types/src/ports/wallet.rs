//! Wallet backend port.

use crate::domain::CustomerId;
use crate::dto::WalletMutationRequest;
use crate::error::ApiError;

/// Backend operations behind the wallet store.
///
/// `get_balance` returns the validated amount in the base currency.
#[async_trait::async_trait]
pub trait WalletApi: Send + Sync + 'static {
    /// `GET /api/financials/wallet/balance/{customerId}`
    async fn get_balance(&self, customer_id: &CustomerId) -> Result<f64, ApiError>;

    /// `POST /api/financials/wallet/add`
    async fn add(&self, req: &WalletMutationRequest) -> Result<(), ApiError>;

    /// `POST /api/financials/wallet/withdraw`
    async fn withdraw(&self, req: &WalletMutationRequest) -> Result<(), ApiError>;
}
