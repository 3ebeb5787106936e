//! CashCached CLI
//!
//! Command-line front end for the wallet and admin report exports.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cashcached_client::CashCachedClient;
use cashcached_types::{CustomerId, ReportFilters, ReportKind, ToastLevel, UiEvent, UserSession};
use cashcached_wallet::{EventBus, RatesHandle, ReportExporter, WalletStore, format_money};
use exchange_rates::{CurrencyCode, ExchangeRateTable};

#[derive(Parser)]
#[command(name = "cashcached")]
#[command(author, version, about = "CashCached wallet CLI", long_about = None)]
struct Cli {
    /// Base URL of the CashCached API
    #[arg(long, env = "CASHCACHED_API_URL", default_value = "http://localhost:8080")]
    api_url: String,

    /// Bearer token for authentication
    #[arg(long, env = "CASHCACHED_API_TOKEN")]
    token: Option<String>,

    /// Customer the wallet belongs to
    #[arg(long, env = "CASHCACHED_CUSTOMER_ID")]
    customer_id: Option<String>,

    /// Currency balances are shown in
    #[arg(long, env = "CASHCACHED_PREFERRED_CURRENCY", default_value = "KWD")]
    currency: CurrencyCode,

    /// Currency the backend keeps balances in
    #[arg(long, env = "CASHCACHED_BASE_CURRENCY", default_value = "KWD")]
    base_currency: CurrencyCode,

    /// Rate overrides, e.g. "KWD=0.3,EUR=0.9" (units per USD)
    #[arg(long, env = "CASHCACHED_EXCHANGE_RATES")]
    rates: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the wallet balance
    Balance,
    /// Add money to the wallet (base currency)
    Add { amount: f64 },
    /// Withdraw money from the wallet (base currency)
    Withdraw { amount: f64 },
    /// Convert an amount between currencies
    Convert {
        amount: f64,
        from: CurrencyCode,
        to: CurrencyCode,
    },
    /// Print the exchange rate table
    Rates,
    /// Export an admin CSV report
    Report {
        /// product, customer or accounts
        kind: ReportKind,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        from: Option<NaiveDate>,
        #[arg(long)]
        to: Option<NaiveDate>,
        /// Extra query parameter, repeatable
        #[arg(long = "filter", value_parser = parse_filter)]
        filters: Vec<(String, String)>,
        /// Directory the CSV is saved to
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
}

fn parse_filter(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got {:?}", s))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty filter key in {:?}", s));
    }
    Ok((key.to_string(), value.trim().to_string()))
}

fn build_rates(overrides: Option<&str>) -> Result<ExchangeRateTable> {
    let table = ExchangeRateTable::default();
    match overrides {
        Some(overrides) => table
            .apply_overrides(overrides)
            .context("Invalid CASHCACHED_EXCHANGE_RATES"),
        None => Ok(table),
    }
}

/// What a wallet command reports once the store has settled.
#[derive(Debug, PartialEq)]
enum WalletOutcome {
    /// The backend refused the add or withdraw.
    Rejected,
    /// The add or withdraw went through. A failed follow-up reload does not
    /// undo it.
    Applied { refresh_error: Option<String> },
    Balance,
    BalanceUnavailable(String),
}

impl WalletOutcome {
    fn from_run(applied: Option<bool>, last_error: Option<String>) -> Self {
        match (applied, last_error) {
            (Some(false), _) => WalletOutcome::Rejected,
            (Some(true), refresh_error) => WalletOutcome::Applied { refresh_error },
            (None, None) => WalletOutcome::Balance,
            (None, Some(error)) => WalletOutcome::BalanceUnavailable(error),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,cashcached_cli=info,cashcached_wallet=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    tracing::debug!(api_url = %cli.api_url, "using API");

    let table = build_rates(cli.rates.as_deref())?;

    let mut client = CashCachedClient::new(&cli.api_url);
    if let Some(token) = cli.token {
        client = client.with_token(token);
    }

    let events = EventBus::default();

    match cli.command {
        Commands::Convert { amount, from, to } => {
            let converted = table.convert(amount, &from, &to);
            println!("{} = {}", format_money(amount, &from), format_money(converted, &to));
        }

        Commands::Rates => {
            let rates: serde_json::Map<String, serde_json::Value> = table
                .iter()
                .map(|(code, rate)| (code.to_string(), serde_json::json!(rate)))
                .collect();
            println!("{}", serde_json::to_string_pretty(&rates)?);
        }

        Commands::Report {
            kind,
            status,
            search,
            from,
            to,
            filters,
            out,
        } => {
            let filters = filters
                .into_iter()
                .fold(ReportFilters::new(), |f, (k, v)| f.with(k, v))
                .status(status.as_deref())
                .search(search.as_deref())
                .date_range(from, to);

            let mut toasts = events.subscribe();
            let exporter = ReportExporter::new(client, events);
            let result = exporter.export(kind, &filters, &out).await;

            while let Ok(UiEvent::Toast(toast)) = toasts.try_recv() {
                match toast.level {
                    ToastLevel::Success => println!("✓ {}", toast.message),
                    ToastLevel::Error => eprintln!("✗ {}", toast.message),
                }
            }
            if result.is_err() {
                std::process::exit(1);
            }
        }

        wallet_command => {
            let customer_id = cli
                .customer_id
                .context("--customer-id or CASHCACHED_CUSTOMER_ID is required")?;
            let customer_id = CustomerId::new(customer_id)?;

            let store = WalletStore::new(client, RatesHandle::new(table), events)
                .with_base_currency(cli.base_currency);
            store
                .set_session(Some(UserSession::new(customer_id, cli.currency)))
                .await;

            let applied = match wallet_command {
                Commands::Add { amount } => Some(store.add_money(amount).await?),
                Commands::Withdraw { amount } => Some(store.withdraw_money(amount).await?),
                _ => None,
            };

            match WalletOutcome::from_run(applied, store.state().last_error) {
                WalletOutcome::Rejected => {
                    eprintln!("✗ Wallet update failed");
                    std::process::exit(1);
                }
                WalletOutcome::Applied { refresh_error: None } => {
                    println!("✓ Wallet updated");
                    println!("{}", store.display_balance());
                }
                WalletOutcome::Applied {
                    refresh_error: Some(error),
                } => {
                    println!("✓ Wallet updated");
                    eprintln!("! Balance could not be refreshed: {}", error);
                }
                WalletOutcome::Balance => println!("{}", store.display_balance()),
                WalletOutcome::BalanceUnavailable(error) => {
                    eprintln!("✗ Could not load balance: {}", error);
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}
