//! Wallet State Store
//!
//! Holds the signed-in customer's balance and keeps it in step with the
//! backend. The balance is only ever written from a server response, never
//! adjusted locally.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use tokio::sync::watch;

use cashcached_types::{
    CurrencyCode, CustomerId, UiEvent, UserSession, WalletApi, WalletError, WalletMutationRequest,
    WalletRefresh, WalletState,
};

use crate::events::EventBus;
use crate::format::format_money;
use crate::rates::RatesHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mutation {
    Add,
    Withdraw,
}

impl Mutation {
    fn label(&self) -> &'static str {
        match self {
            Mutation::Add => "add",
            Mutation::Withdraw => "withdraw",
        }
    }
}

/// Wallet state store.
///
/// Generic over `A: WalletApi` so the HTTP client can be replaced in tests.
/// Consumers read state through [`WalletStore::state`] or
/// [`WalletStore::subscribe`]; the only writers are the methods below.
pub struct WalletStore<A: WalletApi> {
    api: A,
    base_currency: CurrencyCode,
    rates: RatesHandle,
    events: EventBus,
    session: watch::Sender<Option<UserSession>>,
    state: watch::Sender<WalletState>,
    /// Generation of the most recently issued balance load.
    load_generation: AtomicU64,
    loads_in_flight: AtomicUsize,
}

/// Decrements the in-flight counter when a load ends, including when the
/// load future is dropped part-way.
struct LoadingGuard<'a> {
    state: &'a watch::Sender<WalletState>,
    in_flight: &'a AtomicUsize,
}

impl<'a> LoadingGuard<'a> {
    fn begin(state: &'a watch::Sender<WalletState>, in_flight: &'a AtomicUsize) -> Self {
        state.send_modify(|s| {
            in_flight.fetch_add(1, Ordering::SeqCst);
            s.is_loading = true;
        });
        Self { state, in_flight }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        let in_flight = self.in_flight;
        self.state.send_modify(|s| {
            let remaining = in_flight.fetch_sub(1, Ordering::SeqCst) - 1;
            s.is_loading = remaining > 0;
        });
    }
}

impl<A: WalletApi> WalletStore<A> {
    /// Creates a store with KWD as the base currency and no session.
    pub fn new(api: A, rates: RatesHandle, events: EventBus) -> Self {
        let (session, _) = watch::channel(None);
        let (state, _) = watch::channel(WalletState::default());
        Self {
            api,
            base_currency: CurrencyCode::KWD,
            rates,
            events,
            session,
            state,
            load_generation: AtomicU64::new(0),
            loads_in_flight: AtomicUsize::new(0),
        }
    }

    /// Overrides the currency balances are stored in.
    pub fn with_base_currency(mut self, currency: CurrencyCode) -> Self {
        self.base_currency = currency;
        self
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn base_currency(&self) -> &CurrencyCode {
        &self.base_currency
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn rates(&self) -> &RatesHandle {
        &self.rates
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Session
    // ─────────────────────────────────────────────────────────────────────────

    pub fn session(&self) -> Option<UserSession> {
        self.session.borrow().clone()
    }

    fn customer_id(&self) -> Option<CustomerId> {
        self.session.borrow().as_ref().map(|s| s.customer_id.clone())
    }

    /// Display currency of the session, or the base currency when signed out.
    pub fn preferred_currency(&self) -> CurrencyCode {
        self.session
            .borrow()
            .as_ref()
            .map(|s| s.preferred_currency.clone())
            .unwrap_or_else(|| self.base_currency.clone())
    }

    /// Swaps the session without triggering a load.
    #[cfg(test)]
    pub(crate) fn replace_session(&self, session: Option<UserSession>) {
        self.session.send_replace(session);
    }

    /// Replaces the session and reloads the balance for it.
    pub async fn set_session(&self, session: Option<UserSession>) -> f64 {
        self.session.send_replace(session);
        self.load_balance().await
    }

    /// Changes the display currency. Reloads the balance when it changed.
    pub async fn set_preferred_currency(&self, currency: CurrencyCode) -> bool {
        let changed = self.session.send_if_modified(|session| match session {
            Some(s) if s.preferred_currency != currency => {
                s.preferred_currency = currency;
                true
            }
            _ => false,
        });
        if changed {
            self.load_balance().await;
        }
        changed
    }

    // ─────────────────────────────────────────────────────────────────────────
    // State
    // ─────────────────────────────────────────────────────────────────────────

    pub fn state(&self) -> WalletState {
        self.state.borrow().clone()
    }

    /// Current balance in the base currency.
    pub fn balance(&self) -> f64 {
        self.state.borrow().balance
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading
    }

    pub fn subscribe(&self) -> watch::Receiver<WalletState> {
        self.state.subscribe()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Balance Loading
    // ─────────────────────────────────────────────────────────────────────────

    /// Loads the balance from the backend and returns the balance now held.
    ///
    /// Never fails: without a session the balance is reset to zero without
    /// a request, and any backend failure is logged, recorded in
    /// `last_error`, and resolves to zero. When loads overlap, only the most
    /// recently issued one writes the balance.
    pub async fn load_balance(&self) -> f64 {
        let Some(customer_id) = self.customer_id() else {
            self.load_generation.fetch_add(1, Ordering::SeqCst);
            self.state.send_modify(|s| {
                s.balance = 0.0;
                s.last_error = None;
            });
            return 0.0;
        };

        let generation = self.load_generation.fetch_add(1, Ordering::SeqCst) + 1;
        let _loading = LoadingGuard::begin(&self.state, &self.loads_in_flight);

        let (balance, error) = match self.api.get_balance(&customer_id).await {
            Ok(balance) => {
                tracing::debug!(customer_id = %customer_id, balance, "wallet balance loaded");
                (balance, None)
            }
            Err(e) => {
                tracing::warn!(customer_id = %customer_id, error = %e, "failed to load wallet balance");
                (0.0, Some(e.to_string()))
            }
        };

        let mut held = balance;
        self.state.send_modify(|s| {
            if self.load_generation.load(Ordering::SeqCst) == generation {
                s.balance = balance;
                s.last_error = error;
            } else {
                tracing::debug!(customer_id = %customer_id, "discarding stale balance response");
            }
            held = s.balance;
        });
        held
    }

    /// Alias of [`WalletStore::load_balance`].
    pub async fn refresh_balance(&self) -> f64 {
        self.load_balance().await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────────────────

    /// Credits `amount` (base currency) to the wallet.
    ///
    /// `Ok(false)` when signed out or when the backend rejects the request.
    pub async fn add_money(&self, amount: f64) -> Result<bool, WalletError> {
        self.mutate(Mutation::Add, amount).await
    }

    /// Debits `amount` (base currency) from the wallet.
    ///
    /// Fails with `InsufficientBalance` before any request when `amount`
    /// exceeds the balance held locally. The server still has the final say.
    pub async fn withdraw_money(&self, amount: f64) -> Result<bool, WalletError> {
        self.mutate(Mutation::Withdraw, amount).await
    }

    async fn mutate(&self, kind: Mutation, amount: f64) -> Result<bool, WalletError> {
        let Some(customer_id) = self.customer_id() else {
            tracing::debug!(op = kind.label(), "wallet mutation skipped, no session");
            return Ok(false);
        };

        if !amount.is_finite() || amount <= 0.0 {
            return Err(WalletError::InvalidAmount(amount));
        }

        let snapshot = self.balance();
        if kind == Mutation::Withdraw && amount > snapshot {
            return Err(WalletError::InsufficientBalance {
                available: snapshot,
                requested: amount,
            });
        }

        let req = WalletMutationRequest {
            customer_id: customer_id.clone(),
            amount,
            currency: self.base_currency.clone(),
        };
        let result = match kind {
            Mutation::Add => self.api.add(&req).await,
            Mutation::Withdraw => self.api.withdraw(&req).await,
        };

        if let Err(e) = result {
            tracing::warn!(
                op = kind.label(),
                customer_id = %customer_id,
                amount,
                error = %e,
                "wallet mutation failed"
            );
            return Ok(false);
        }

        tracing::info!(op = kind.label(), customer_id = %customer_id, amount, "wallet mutation applied");

        self.load_balance().await;
        self.events.publish(UiEvent::RefreshWallet(WalletRefresh {
            customer_id,
            balance: snapshot,
            currency: self.base_currency.clone(),
        }));

        Ok(true)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Formatting
    // ─────────────────────────────────────────────────────────────────────────

    /// Formats a base-currency `amount` in `display` currency.
    pub fn format_converted_tokens(&self, amount: f64, display: &CurrencyCode) -> String {
        if *display == self.base_currency {
            return format_money(amount, display);
        }
        let converted = self.rates.current().convert(amount, &self.base_currency, display);
        format_money(converted, display)
    }

    /// The current balance in the session's preferred currency.
    pub fn display_balance(&self) -> String {
        self.format_converted_tokens(self.balance(), &self.preferred_currency())
    }
}
