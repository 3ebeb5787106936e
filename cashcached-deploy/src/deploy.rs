//! Contract deployment over JSON-RPC.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use serde_json::{Value, json};

use crate::config::{Address, Config};
use crate::error::DeployError;

// ─────────────────────────────────────────────────────────────────────────────
// Artifact
// ─────────────────────────────────────────────────────────────────────────────

/// Compiled contract creation code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    bytecode: Vec<u8>,
}

impl Artifact {
    /// Reads a build artifact. Accepts `"bytecode": "0x.."` and
    /// `"bytecode": { "object": "0x.." }`.
    pub fn load(path: &Path) -> Result<Self, DeployError> {
        let raw = std::fs::read_to_string(path).map_err(|source| DeployError::ArtifactIo {
            path: path.to_path_buf(),
            source,
        })?;
        let json: Value = serde_json::from_str(&raw)
            .map_err(|e| DeployError::InvalidArtifact(e.to_string()))?;
        Self::from_json(&json)
    }

    pub fn from_json(json: &Value) -> Result<Self, DeployError> {
        let code = match json.get("bytecode") {
            Some(Value::String(s)) => s.as_str(),
            Some(Value::Object(obj)) => obj
                .get("object")
                .and_then(Value::as_str)
                .ok_or_else(|| DeployError::InvalidArtifact("bytecode.object missing".into()))?,
            _ => return Err(DeployError::InvalidArtifact("bytecode missing".into())),
        };
        let code = code.trim();
        let digits = code.strip_prefix("0x").unwrap_or(code);
        let bytecode = hex::decode(digits)
            .map_err(|e| DeployError::InvalidArtifact(format!("bytecode is not hex: {}", e)))?;
        if bytecode.is_empty() {
            return Err(DeployError::InvalidArtifact("bytecode is empty".into()));
        }
        Ok(Self { bytecode })
    }

    /// Creation data: bytecode followed by the ABI-encoded owner argument.
    pub fn deploy_data(&self, owner: &Address) -> String {
        let mut data = self.bytecode.clone();
        data.extend_from_slice(&encode_address_arg(owner));
        format!("0x{}", hex::encode(data))
    }
}

/// ABI encoding of an `address` argument: left-padded to 32 bytes.
pub fn encode_address_arg(address: &Address) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[12..].copy_from_slice(address.as_bytes());
    word
}

// ─────────────────────────────────────────────────────────────────────────────
// JSON-RPC
// ─────────────────────────────────────────────────────────────────────────────

pub struct RpcClient {
    url: String,
    http: reqwest::Client,
    next_id: AtomicU64,
}

impl RpcClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            http: reqwest::Client::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Calls `method` and returns its `result`, which may be `null`.
    pub async fn call(&self, method: &str, params: Value) -> Result<Value, DeployError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({ "jsonrpc": "2.0", "id": id, "method": method, "params": params });
        tracing::debug!(method, id, "rpc call");

        let resp = self.http.post(&self.url).json(&body).send().await?;
        // Nodes may pair a JSON-RPC error with a non-2xx status.
        let status_err = resp.error_for_status_ref().err();
        let text = resp.text().await?;

        let mut resp: Value = match (serde_json::from_str::<Value>(&text), status_err) {
            (Ok(v), _) if v.get("error").is_some() => v,
            (_, Some(e)) => return Err(DeployError::Http(e)),
            (Ok(v), None) => v,
            (Err(_), None) => return Err(DeployError::UnexpectedResponse(text)),
        };

        if let Some(err) = resp.get("error") {
            return Err(DeployError::Rpc {
                code: err.get("code").and_then(Value::as_i64).unwrap_or_default(),
                message: err
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown error")
                    .to_string(),
            });
        }
        match resp.get_mut("result") {
            Some(result) => Ok(result.take()),
            None => Err(DeployError::UnexpectedResponse(resp.to_string())),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Deployment
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Deployment {
    pub transaction_hash: String,
    pub contract_address: String,
    pub owner: String,
}

/// Sends the creation transaction and waits for its receipt.
pub async fn deploy(
    rpc: &RpcClient,
    config: &Config,
    artifact: &Artifact,
) -> Result<Deployment, DeployError> {
    let tx = json!({
        "from": config.deployer.to_string(),
        "data": artifact.deploy_data(&config.owner),
    });
    let tx_hash = rpc
        .call("eth_sendTransaction", json!([tx]))
        .await?
        .as_str()
        .map(String::from)
        .ok_or_else(|| DeployError::UnexpectedResponse("transaction hash is not a string".into()))?;
    tracing::info!(%tx_hash, owner = %config.owner, "deployment transaction sent");

    for attempt in 1..=config.receipt_poll_attempts {
        let receipt = rpc
            .call("eth_getTransactionReceipt", json!([tx_hash]))
            .await?;
        if receipt.is_null() {
            tracing::debug!(attempt, "receipt not available yet");
            if attempt < config.receipt_poll_attempts {
                tokio::time::sleep(config.receipt_poll_interval).await;
            }
            continue;
        }

        if receipt.get("status").and_then(Value::as_str) == Some("0x0") {
            return Err(DeployError::Reverted(tx_hash));
        }
        let contract_address = receipt
            .get("contractAddress")
            .and_then(Value::as_str)
            .ok_or_else(|| DeployError::UnexpectedResponse(format!("receipt without contractAddress: {}", receipt)))?
            .to_string();

        tracing::info!(%contract_address, "contract deployed");
        return Ok(Deployment {
            transaction_hash: tx_hash,
            contract_address,
            owner: config.owner.to_string(),
        });
    }

    Err(DeployError::ReceiptTimeout {
        tx_hash,
        attempts: config.receipt_poll_attempts,
    })
}
