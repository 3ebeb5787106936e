//! # CashCached Deploy
//!
//! Deploys the CashCached contract:
//! - Load configuration from environment (the owner address is required)
//! - Read the compiled artifact
//! - Send the creation transaction and wait for the receipt

mod config;
mod deploy;
mod error;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use deploy::{Artifact, RpcClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,cashcached_deploy=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = config::Config::from_env()?;

    tracing::info!("Deploying CashCached with owner {}", config.owner);
    tracing::info!("Using RPC endpoint: {}", config.rpc_url);

    let artifact = Artifact::load(&config.artifact_path)?;
    let rpc = RpcClient::new(config.rpc_url.clone());

    let deployment = deploy::deploy(&rpc, &config, &artifact).await?;

    println!("{}", serde_json::to_string_pretty(&deployment)?);
    Ok(())
}
