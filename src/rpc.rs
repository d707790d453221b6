use gloo_net::http::Request;
use gloo_timers::future::TimeoutFuture;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{Result, StakingError};
use crate::evm::address::{decode_hex, encode_hex};
use crate::evm::{Address, TxHash};

#[derive(Serialize)]
struct RpcRequest<T> {
    jsonrpc: &'static str,
    id: u32,
    method: &'static str,
    params: T,
}

#[derive(Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcError>,
}

#[derive(Deserialize)]
struct RpcError {
    message: String,
}

#[derive(Serialize)]
struct CallObject {
    to: String,
    data: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LogFilter {
    address: String,
    topics: Vec<String>,
    from_block: String,
    to_block: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub topics: Vec<String>,
    pub data: String,
    pub block_number: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    pub transaction_hash: TxHash,
    pub block_number: Option<String>,
    pub status: Option<String>,
}

impl TransactionReceipt {
    /// Pre-Byzantium receipts carry no status; treat them as successful.
    pub fn succeeded(&self) -> bool {
        self.status
            .as_deref()
            .map(|s| parse_quantity(s).map(|v| v == 1).unwrap_or(false))
            .unwrap_or(true)
    }
}

/// JSON-RPC over HTTP against one node.
#[derive(Clone, Debug, PartialEq)]
pub struct RpcClient {
    url: String,
}

impl RpcClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    async fn request<P: Serialize, R: DeserializeOwned>(
        &self,
        method: &'static str,
        params: P,
    ) -> Result<Option<R>> {
        let req = RpcRequest {
            jsonrpc: "2.0",
            id: 1,
            method,
            params,
        };

        let resp = Request::post(&self.url)
            .json(&req)
            .map_err(|e| StakingError::Rpc(e.to_string()))?
            .send()
            .await
            .map_err(|e| StakingError::Rpc(format!("{} failed: {}", method, e)))?;

        if !resp.ok() {
            return Err(StakingError::Rpc(format!("{} returned HTTP {}", method, resp.status())));
        }

        let body: RpcResponse<R> = resp
            .json()
            .await
            .map_err(|e| StakingError::Rpc(format!("{} response: {}", method, e)))?;
        if let Some(err) = body.error {
            return Err(StakingError::Rpc(err.message));
        }
        Ok(body.result)
    }

    /// `eth_call` against the latest block; returns the raw return data.
    pub async fn call(&self, to: &Address, data: &[u8]) -> Result<Vec<u8>> {
        let call = CallObject {
            to: to.to_string(),
            data: encode_hex(data),
        };
        let result: Option<String> = self.request("eth_call", (call, "latest")).await?;
        let result = result.ok_or_else(|| StakingError::Rpc("eth_call returned no data".to_string()))?;
        decode_hex(&result).map_err(StakingError::Decode)
    }

    pub async fn block_number(&self) -> Result<u64> {
        let result: Option<String> = self.request("eth_blockNumber", Vec::<()>::new()).await?;
        let result = result.ok_or_else(|| StakingError::Rpc("eth_blockNumber returned nothing".to_string()))?;
        parse_quantity(&result)
    }

    pub async fn get_logs(
        &self,
        address: &Address,
        topic0: &str,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<LogEntry>> {
        let filter = LogFilter {
            address: address.to_string(),
            topics: vec![topic0.to_string()],
            from_block: format!("0x{:x}", from_block),
            to_block: format!("0x{:x}", to_block),
        };
        let logs: Option<Vec<LogEntry>> = self.request("eth_getLogs", [filter]).await?;
        Ok(logs.unwrap_or_default())
    }

    pub async fn transaction_receipt(&self, hash: &TxHash) -> Result<Option<TransactionReceipt>> {
        self.request("eth_getTransactionReceipt", [hash.as_str()]).await
    }

    /// Polls until the transaction is mined. No deadline: the wallet and
    /// node own timeouts.
    pub async fn wait_for_receipt(&self, hash: &TxHash, poll_ms: u32) -> Result<TransactionReceipt> {
        loop {
            match self.transaction_receipt(hash).await {
                Ok(Some(receipt)) => {
                    if receipt.succeeded() {
                        log::info!("Transaction {} confirmed in block {:?}", hash, receipt.block_number);
                        return Ok(receipt);
                    }
                    log::warn!("Transaction {} reverted", hash);
                    return Err(StakingError::Reverted(hash.clone()));
                }
                Ok(None) => {}
                Err(e) => log::warn!("Receipt lookup for {} failed: {}", hash, e),
            }
            TimeoutFuture::new(poll_ms).await;
        }
    }
}

/// `0x`-prefixed JSON-RPC quantity → `u64`.
pub fn parse_quantity(value: &str) -> Result<u64> {
    let digits = value
        .strip_prefix("0x")
        .ok_or_else(|| StakingError::Decode(format!("quantity without 0x: {}", value)))?;
    if digits.is_empty() {
        return Err(StakingError::Decode("empty quantity".to_string()));
    }
    u64::from_str_radix(digits, 16).map_err(|e| StakingError::Decode(format!("quantity {}: {}", value, e)))
}
