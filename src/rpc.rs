//! JSON-RPC Client
//!
//! Thin wrapper around a jsonrpsee HTTP client for the handful of `eth_*`
//! methods the commands use. Owns transport, parameter encoding, and
//! receipt polling. The decode and search cores never see this type
//! directly, only the `SlotReader` / `GasProbe` seams built on it.

use std::time::Duration;

use alloy_primitives::{Address, Bytes, B256, U128, U256, U64};
use alloy_rpc_types_eth::{TransactionReceipt, TransactionRequest};
use jsonrpsee::core::client::ClientT;
use jsonrpsee::core::ClientError;
use jsonrpsee::http_client::{HttpClient, HttpClientBuilder};
use jsonrpsee::rpc_params;
use thiserror::Error;

/// Per-request timeout on the HTTP transport.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Pause between receipt polls.
pub const RECEIPT_POLL_INTERVAL: Duration = Duration::from_millis(1000);

/// Receipt polls before giving up: two minutes at the default interval,
/// a ten-block budget on a mainnet-paced chain.
pub const RECEIPT_POLL_ATTEMPTS: usize = 120;

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug, Error)]
pub enum RpcError {
    /// The server answered with a JSON-RPC error object.
    #[error("RPC call failed (code {code}): {message}")]
    Call {
        code: i32,
        message: String,
        data: Option<String>,
    },
    /// Connection, timeout, or serialization failure.
    #[error("RPC transport error: {0}")]
    Transport(String),
    /// The transaction never showed up in a block.
    #[error("transaction {hash} not confirmed after {attempts} receipt polls")]
    ReceiptTimeout { hash: B256, attempts: usize },
}

impl From<ClientError> for RpcError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Call(object) => RpcError::Call {
                code: object.code(),
                message: object.message().to_string(),
                data: object.data().map(|raw| raw.to_string()),
            },
            other => RpcError::Transport(other.to_string()),
        }
    }
}

// =============================================================================
// Gas-failure classification
// =============================================================================

/// Phrases nodes put in call errors caused by an insufficient gas limit.
/// geth, erigon, anvil and hardhat say "out of gas" / "intrinsic gas too
/// low"; besu says "intrinsic gas exceeds gas limit"; nethermind reports
/// "gas limit below intrinsic gas".
const GAS_EXHAUSTION_PHRASES: &[&str] = &[
    "out of gas",
    "gas too low",
    "gas required exceeds allowance",
    "gas limit reached",
    "intrinsic gas",
];

/// True when a call failure blames the gas limit rather than the call
/// itself. Anything unmatched (reverts, bad params, transport noise) must
/// be treated as a failed probe, not as "needs more gas".
pub fn is_gas_exhaustion_error(message: &str) -> bool {
    let lowered = message.to_ascii_lowercase();
    GAS_EXHAUSTION_PHRASES.iter().any(|phrase| lowered.contains(phrase))
}

// =============================================================================
// Client
// =============================================================================

/// HTTP JSON-RPC client for an Ethereum-compatible node.
#[derive(Debug)]
pub struct RpcClient {
    http: HttpClient,
}

impl RpcClient {
    /// Connect to a node endpoint. The URL is only validated here; the
    /// first request finds out whether anything is listening.
    pub fn connect(url: &str) -> Result<Self, RpcError> {
        let http = HttpClientBuilder::default()
            .request_timeout(REQUEST_TIMEOUT)
            .build(url)?;
        Ok(Self { http })
    }

    /// eth_chainId
    pub async fn chain_id(&self) -> Result<u64, RpcError> {
        let id: U64 = self.http.request("eth_chainId", rpc_params![]).await?;
        Ok(id.to::<u64>())
    }

    /// eth_getBalance at the latest block, in wei.
    pub async fn get_balance(&self, address: Address) -> Result<U256, RpcError> {
        Ok(self.http.request("eth_getBalance", rpc_params![address, "latest"]).await?)
    }

    /// eth_getStorageAt at the latest block.
    pub async fn get_storage_at(&self, address: Address, slot: U256) -> Result<B256, RpcError> {
        Ok(self
            .http
            .request("eth_getStorageAt", rpc_params![address, slot, "latest"])
            .await?)
    }

    /// eth_getTransactionCount at the pending block, for the next nonce.
    pub async fn transaction_count(&self, address: Address) -> Result<u64, RpcError> {
        let nonce: U64 = self
            .http
            .request("eth_getTransactionCount", rpc_params![address, "pending"])
            .await?;
        Ok(nonce.to::<u64>())
    }

    /// eth_gasPrice
    pub async fn gas_price(&self) -> Result<u128, RpcError> {
        let price: U128 = self.http.request("eth_gasPrice", rpc_params![]).await?;
        Ok(price.to::<u128>())
    }

    /// eth_estimateGas for a call descriptor.
    pub async fn estimate_gas(&self, request: &TransactionRequest) -> Result<u64, RpcError> {
        let estimate: U64 = self.http.request("eth_estimateGas", rpc_params![request]).await?;
        Ok(estimate.to::<u64>())
    }

    /// eth_call at the latest block. The return data is not interpreted.
    pub async fn call(&self, request: &TransactionRequest) -> Result<Bytes, RpcError> {
        Ok(self.http.request("eth_call", rpc_params![request, "latest"]).await?)
    }

    /// eth_sendRawTransaction
    pub async fn send_raw_transaction(&self, raw: Bytes) -> Result<B256, RpcError> {
        Ok(self.http.request("eth_sendRawTransaction", rpc_params![raw]).await?)
    }

    /// eth_getTransactionReceipt; None while the transaction is pending.
    pub async fn transaction_receipt(
        &self,
        hash: B256,
    ) -> Result<Option<TransactionReceipt>, RpcError> {
        Ok(self.http.request("eth_getTransactionReceipt", rpc_params![hash]).await?)
    }

    /// Poll for the receipt until it lands or the attempt budget runs out.
    pub async fn wait_for_receipt(&self, hash: B256) -> Result<TransactionReceipt, RpcError> {
        for _ in 0..RECEIPT_POLL_ATTEMPTS {
            if let Some(receipt) = self.transaction_receipt(hash).await? {
                return Ok(receipt);
            }
            tokio::time::sleep(RECEIPT_POLL_INTERVAL).await;
        }
        Err(RpcError::ReceiptTimeout { hash, attempts: RECEIPT_POLL_ATTEMPTS })
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use jsonrpsee::types::ErrorObject;

    #[test]
    fn test_gas_exhaustion_phrases_match() {
        // geth / erigon / anvil / hardhat
        assert!(is_gas_exhaustion_error("err: out of gas"));
        assert!(is_gas_exhaustion_error("intrinsic gas too low"));
        assert!(is_gas_exhaustion_error("gas required exceeds allowance (100000)"));
        // besu
        assert!(is_gas_exhaustion_error("Intrinsic gas exceeds gas limit"));
        // nethermind
        assert!(is_gas_exhaustion_error("gas limit below intrinsic gas"));
    }

    #[test]
    fn test_non_gas_failures_do_not_match() {
        assert!(!is_gas_exhaustion_error("execution reverted: not the owner"));
        assert!(!is_gas_exhaustion_error("invalid opcode: INVALID"));
        assert!(!is_gas_exhaustion_error("nonce too low"));
        assert!(!is_gas_exhaustion_error("insufficient funds for transfer"));
        assert!(!is_gas_exhaustion_error(""));
    }

    #[test]
    fn test_classification_is_case_insensitive() {
        assert!(is_gas_exhaustion_error("OUT OF GAS"));
        assert!(is_gas_exhaustion_error("Gas Too Low"));
    }

    #[test]
    fn test_call_errors_keep_code_and_message() {
        let client_err = ClientError::Call(ErrorObject::owned(-32000, "out of gas", None::<()>));

        match RpcError::from(client_err) {
            RpcError::Call { code, message, data } => {
                assert_eq!(code, -32000);
                assert_eq!(message, "out of gas");
                assert!(data.is_none());
            }
            other => panic!("Expected Call, got {:?}", other),
        }
    }

    #[test]
    fn test_non_call_errors_become_transport() {
        let client_err = ClientError::RequestTimeout;

        match RpcError::from(client_err) {
            RpcError::Transport(message) => assert!(message.contains("timeout")),
            other => panic!("Expected Transport, got {:?}", other),
        }
    }

    #[test]
    fn test_receipt_timeout_names_the_transaction() {
        let hash = B256::repeat_byte(0xab);
        let err = RpcError::ReceiptTimeout { hash, attempts: RECEIPT_POLL_ATTEMPTS };

        let text = err.to_string();
        assert!(text.contains("0xabab"));
        assert!(text.contains("120"));
    }
}
