// JSON-RPC transport layer implementation
// This file implements the read-only JSON-RPC client used for
// batched contract calls against EVM nodes
//
// Numan Thabit 2025 Nov

use crate::errors::RouteError;
use crate::metrics::{REQ_ERRORS, REQ_LATENCY};
use alloy_primitives::Address;
use reqwest::Client;
use serde_json::json;
use url::Url;

#[derive(Debug, Clone)]
pub struct EvmRpc {
    http: Client,
    url: Url,
}

impl EvmRpc {
    pub fn new(url: Url) -> Self {
        Self {
            http: Client::new(),
            url,
        }
    }

    /// `eth_call` against the latest block, returning the raw ABI blob.
    pub async fn eth_call(&self, to: Address, data: &[u8]) -> Result<Vec<u8>, RouteError> {
        let _timer = REQ_LATENCY
            .with_label_values(&["rpc", "eth_call"])
            .start_timer();

        let payload = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "eth_call",
            "params": [
                {
                    "to": format!("{to:#x}"),
                    "data": format!("0x{}", hex::encode(data)),
                },
                "latest"
            ]
        });
        let resp = self
            .http
            .post(self.url.clone())
            .json(&payload)
            .send()
            .await
            .map_err(|e| RouteError::Rpc(format!("eth_call send: {e}")))?;
        if !resp.status().is_success() {
            REQ_ERRORS.with_label_values(&["rpc", "eth_call"]).inc();
            return Err(RouteError::Rpc(format!("http {}", resp.status())));
        }
        let body: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| RouteError::Rpc(format!("json parse: {e}")))?;
        if let Some(err) = body.get("error") {
            REQ_ERRORS.with_label_values(&["rpc", "eth_call"]).inc();
            return Err(RouteError::Rpc(err.to_string()));
        }
        let result = body["result"]
            .as_str()
            .ok_or_else(|| RouteError::Rpc("missing result field".to_string()))?;
        hex::decode(result.strip_prefix("0x").unwrap_or(result))
            .map_err(|e| RouteError::Rpc(format!("decode result: {e}")))
    }
}
