//! WalletStore unit tests.

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use tokio::sync::broadcast::error::TryRecvError;
    use tokio::sync::oneshot;

    use cashcached_types::{
        ApiError, CurrencyCode, CustomerId, ExchangeRateTable, UiEvent, UserSession, WalletApi,
        WalletError, WalletMutationRequest, WalletRefresh,
    };

    use crate::{EventBus, RatesHandle, WalletStore};

    /// Scripted wallet backend that counts every call.
    #[derive(Default)]
    pub struct MockApi {
        balance_calls: AtomicUsize,
        add_calls: AtomicUsize,
        withdraw_calls: AtomicUsize,
        script: Mutex<Script>,
    }

    #[derive(Default)]
    struct Script {
        balances: VecDeque<Result<f64, ApiError>>,
        gates: VecDeque<oneshot::Receiver<()>>,
        fail_mutations: bool,
        requests: Vec<WalletMutationRequest>,
    }

    impl MockApi {
        pub fn new() -> Self {
            Self::default()
        }

        /// Queues balance responses, served in call order. Once empty,
        /// every load answers 0.
        pub fn with_balances(self, balances: impl IntoIterator<Item = Result<f64, ApiError>>) -> Self {
            self.script.lock().unwrap().balances.extend(balances);
            self
        }

        pub fn failing_mutations(self) -> Self {
            self.script.lock().unwrap().fail_mutations = true;
            self
        }

        /// Makes the next balance call wait until the returned sender fires.
        pub fn gate_next_load(&self) -> oneshot::Sender<()> {
            let (tx, rx) = oneshot::channel();
            self.script.lock().unwrap().gates.push_back(rx);
            tx
        }

        pub fn balance_calls(&self) -> usize {
            self.balance_calls.load(Ordering::SeqCst)
        }

        pub fn add_calls(&self) -> usize {
            self.add_calls.load(Ordering::SeqCst)
        }

        pub fn withdraw_calls(&self) -> usize {
            self.withdraw_calls.load(Ordering::SeqCst)
        }

        pub fn requests(&self) -> Vec<WalletMutationRequest> {
            self.script.lock().unwrap().requests.clone()
        }

        fn record(&self, req: &WalletMutationRequest) -> Result<(), ApiError> {
            let mut script = self.script.lock().unwrap();
            script.requests.push(req.clone());
            if script.fail_mutations {
                Err(ApiError::Api {
                    status: 503,
                    message: "ledger unavailable".into(),
                })
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl WalletApi for MockApi {
        async fn get_balance(&self, _customer_id: &CustomerId) -> Result<f64, ApiError> {
            self.balance_calls.fetch_add(1, Ordering::SeqCst);
            let (response, gate) = {
                let mut script = self.script.lock().unwrap();
                (
                    script.balances.pop_front().unwrap_or(Ok(0.0)),
                    script.gates.pop_front(),
                )
            };
            if let Some(gate) = gate {
                let _ = gate.await;
            }
            response
        }

        async fn add(&self, req: &WalletMutationRequest) -> Result<(), ApiError> {
            self.add_calls.fetch_add(1, Ordering::SeqCst);
            self.record(req)
        }

        async fn withdraw(&self, req: &WalletMutationRequest) -> Result<(), ApiError> {
            self.withdraw_calls.fetch_add(1, Ordering::SeqCst);
            self.record(req)
        }
    }

    fn session(preferred: CurrencyCode) -> UserSession {
        UserSession::new(CustomerId::new("cust-1").unwrap(), preferred)
    }

    fn store(api: MockApi) -> WalletStore<MockApi> {
        WalletStore::new(api, RatesHandle::default(), EventBus::default())
    }

    /// A store signed in with `initial` as its loaded balance.
    async fn signed_in(api: MockApi, initial: f64) -> WalletStore<MockApi> {
        api.script.lock().unwrap().balances.push_front(Ok(initial));
        let store = store(api);
        store.set_session(Some(session(CurrencyCode::KWD))).await;
        store
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Balance loading
    // ─────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_load_without_session_is_zero_and_offline() {
        let store = store(MockApi::new().with_balances([Ok(55.0)]));

        let balance = store.load_balance().await;

        assert_eq!(balance, 0.0);
        assert_eq!(store.balance(), 0.0);
        assert!(!store.is_loading());
        assert_eq!(store.api().balance_calls(), 0);
    }

    #[tokio::test]
    async fn test_set_session_loads_balance() {
        let store = signed_in(MockApi::new(), 120.5).await;

        let state = store.state();
        assert_eq!(state.balance, 120.5);
        assert!(!state.is_loading);
        assert_eq!(state.last_error, None);
        assert_eq!(store.api().balance_calls(), 1);
    }

    #[tokio::test]
    async fn test_failed_load_resolves_to_zero() {
        let api = MockApi::new().with_balances([
            Ok(80.0),
            Err(ApiError::Transport("connection refused".into())),
        ]);
        let store = store(api);
        store.set_session(Some(session(CurrencyCode::KWD))).await;
        assert_eq!(store.balance(), 80.0);

        let balance = store.refresh_balance().await;

        assert_eq!(balance, 0.0);
        let state = store.state();
        assert_eq!(state.balance, 0.0);
        assert!(!state.is_loading);
        assert!(state.last_error.unwrap().contains("connection refused"));
    }

    #[tokio::test]
    async fn test_malformed_payload_resolves_to_zero() {
        let api = MockApi::new().with_balances([Err(ApiError::MalformedBalance(
            "/balance is not numeric".into(),
        ))]);
        let store = store(api);

        let balance = store.set_session(Some(session(CurrencyCode::KWD))).await;

        assert_eq!(balance, 0.0);
        assert!(store.state().last_error.is_some());
    }

    #[tokio::test]
    async fn test_successful_load_clears_last_error() {
        let api = MockApi::new().with_balances([Err(ApiError::Transport("down".into())), Ok(3.0)]);
        let store = store(api);
        store.set_session(Some(session(CurrencyCode::KWD))).await;
        assert!(store.state().last_error.is_some());

        store.load_balance().await;

        assert_eq!(store.state().last_error, None);
        assert_eq!(store.balance(), 3.0);
    }

    #[tokio::test]
    async fn test_sign_out_resets_balance() {
        let store = signed_in(MockApi::new(), 40.0).await;

        let balance = store.set_session(None).await;

        assert_eq!(balance, 0.0);
        assert_eq!(store.api().balance_calls(), 1);
    }

    #[tokio::test]
    async fn test_loading_flag_while_in_flight() {
        let api = MockApi::new().with_balances([Ok(9.0)]);
        let release = api.gate_next_load();
        let store = store(api);
        store.replace_session(Some(session(CurrencyCode::KWD)));

        let load = store.load_balance();
        let observe = async {
            tokio::task::yield_now().await;
            let during = store.is_loading();
            release.send(()).unwrap();
            during
        };
        let (balance, during) = tokio::join!(load, observe);

        assert!(during);
        assert_eq!(balance, 9.0);
        assert!(!store.is_loading());
    }

    #[tokio::test]
    async fn test_stale_load_does_not_overwrite_newer_one() {
        let api = MockApi::new().with_balances([Ok(10.0), Ok(20.0)]);
        let release_first = api.gate_next_load();
        let store = store(api);
        store.replace_session(Some(session(CurrencyCode::KWD)));

        let first = store.load_balance();
        let second = async {
            tokio::task::yield_now().await;
            let balance = store.load_balance().await;
            release_first.send(()).unwrap();
            balance
        };
        let (first, second) = tokio::join!(first, second);

        assert_eq!(second, 20.0);
        assert_eq!(first, 20.0);
        assert_eq!(store.balance(), 20.0);
        assert!(!store.is_loading());
    }

    #[tokio::test]
    async fn test_preferred_currency_change_reloads() {
        let store = signed_in(MockApi::new().with_balances([Ok(5.0)]), 5.0).await;

        assert!(store.set_preferred_currency(CurrencyCode::USD).await);
        assert!(!store.set_preferred_currency(CurrencyCode::USD).await);

        assert_eq!(store.api().balance_calls(), 2);
        assert_eq!(store.preferred_currency(), CurrencyCode::USD);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_add_money_reloads_once_and_broadcasts_once() {
        let store = signed_in(MockApi::new().with_balances([Ok(150.0)]), 100.0).await;
        let mut events = store.events().subscribe();
        let loads_before = store.api().balance_calls();

        let ok = store.add_money(50.0).await.unwrap();

        assert!(ok);
        assert_eq!(store.api().add_calls(), 1);
        assert_eq!(store.api().balance_calls() - loads_before, 1);
        assert_eq!(store.balance(), 150.0);
        assert_eq!(
            events.try_recv().unwrap(),
            UiEvent::RefreshWallet(WalletRefresh {
                customer_id: CustomerId::new("cust-1").unwrap(),
                balance: 100.0,
                currency: CurrencyCode::KWD,
            })
        );
        assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test]
    async fn test_add_money_applied_even_when_reload_fails() {
        let api = MockApi::new().with_balances([Err(ApiError::Transport("connection reset".into()))]);
        let store = signed_in(api, 100.0).await;

        let ok = store.add_money(25.0).await.unwrap();

        assert!(ok);
        assert_eq!(store.api().add_calls(), 1);
        assert_eq!(store.balance(), 0.0);
        assert!(store.state().last_error.is_some());
    }

    #[tokio::test]
    async fn test_mutation_request_uses_base_currency() {
        let store = signed_in(MockApi::new(), 10.0).await;
        store.set_preferred_currency(CurrencyCode::USD).await;

        store.add_money(2.5).await.unwrap();

        let requests = store.api().requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].amount, 2.5);
        assert_eq!(requests[0].currency, CurrencyCode::KWD);
    }

    #[tokio::test]
    async fn test_add_money_without_session_is_noop() {
        let store = store(MockApi::new());
        let mut events = store.events().subscribe();

        let ok = store.add_money(50.0).await.unwrap();

        assert!(!ok);
        assert_eq!(store.api().add_calls(), 0);
        assert_eq!(store.api().balance_calls(), 0);
        assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test]
    async fn test_backend_failure_reports_false_without_reload() {
        let store = signed_in(MockApi::new().failing_mutations(), 100.0).await;
        let mut events = store.events().subscribe();

        let ok = store.add_money(10.0).await.unwrap();

        assert!(!ok);
        assert_eq!(store.api().balance_calls(), 1);
        assert_eq!(store.balance(), 100.0);
        assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test]
    async fn test_withdraw_more_than_balance_fails_before_io() {
        let store = signed_in(MockApi::new(), 30.0).await;

        let result = store.withdraw_money(30.01).await;

        assert_eq!(
            result,
            Err(WalletError::InsufficientBalance {
                available: 30.0,
                requested: 30.01
            })
        );
        assert_eq!(store.api().withdraw_calls(), 0);
        assert_eq!(store.api().balance_calls(), 1);
    }

    #[tokio::test]
    async fn test_withdraw_full_balance_succeeds() {
        let store = signed_in(MockApi::new().with_balances([Ok(0.0)]), 30.0).await;

        let ok = store.withdraw_money(30.0).await.unwrap();

        assert!(ok);
        assert_eq!(store.api().withdraw_calls(), 1);
        assert_eq!(store.balance(), 0.0);
    }

    #[tokio::test]
    async fn test_invalid_amounts_rejected() {
        let store = signed_in(MockApi::new(), 30.0).await;

        for amount in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                store.add_money(amount).await,
                Err(WalletError::InvalidAmount(_))
            ));
        }
        assert_eq!(store.api().add_calls(), 0);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Formatting
    // ─────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_balance_displayed_in_preferred_currency() {
        let store = store(MockApi::new().with_balances([Ok(100.0)]));
        store.set_session(Some(session(CurrencyCode::USD))).await;

        assert_eq!(store.format_converted_tokens(100.0, &CurrencyCode::USD), "$322.58");
        assert_eq!(store.display_balance(), "$322.58");
        assert_eq!(store.balance(), 100.0);
    }

    #[tokio::test]
    async fn test_base_currency_formats_directly() {
        let store = signed_in(MockApi::new(), 1234.5).await;

        assert_eq!(store.display_balance(), "KD 1,234.500");
    }

    #[test]
    fn test_signed_out_display_uses_base_currency() {
        let store = store(MockApi::new());
        assert_eq!(store.preferred_currency(), CurrencyCode::KWD);
        assert_eq!(store.display_balance(), "KD 0.000");
    }

    #[test]
    fn test_formatting_follows_live_rates() {
        let rates = RatesHandle::default();
        let store = WalletStore::new(MockApi::new(), rates.clone(), EventBus::default());

        rates.replace(
            ExchangeRateTable::default()
                .with_rate(CurrencyCode::KWD, 0.5)
                .unwrap(),
        );

        assert_eq!(store.format_converted_tokens(10.0, &CurrencyCode::USD), "$20.00");
    }
}
