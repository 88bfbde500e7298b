//! Transaction Signing
//!
//! Single-key wallet for the submission command. It builds nothing on its
//! own: the caller assembles a legacy transaction from fetched chain state
//! (chain id, nonce, gas price), the wallet signs the EIP-155 hash and
//! hands back raw bytes ready for `eth_sendRawTransaction`.

use alloy_consensus::{SignableTransaction, TxEnvelope, TxLegacy};
use alloy_eips::eip2718::Encodable2718;
use alloy_primitives::{Address, Bytes};
use alloy_signer::Signer;
use alloy_signer_local::PrivateKeySigner;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WalletError {
    #[error("Invalid private key")]
    InvalidPrivateKey,
    #[error("Signing failed: {0}")]
    SigningFailed(String),
}

/// Wallet deriving its account from one configured private key.
#[derive(Debug)]
pub struct Wallet {
    signer: PrivateKeySigner,
}

impl Wallet {
    /// Parse a hex private key, with or without the 0x prefix.
    pub fn from_hex(private_key_hex: &str) -> Result<Self, WalletError> {
        let signer = private_key_hex
            .parse::<PrivateKeySigner>()
            .map_err(|_| WalletError::InvalidPrivateKey)?;
        Ok(Self { signer })
    }

    /// The account address derived from the key.
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Sign a legacy transaction and return its raw wire encoding.
    pub async fn sign_transaction(&self, tx: TxLegacy) -> Result<Bytes, WalletError> {
        let signature = self
            .signer
            .sign_hash(&tx.signature_hash())
            .await
            .map_err(|e| WalletError::SigningFailed(e.to_string()))?;
        let envelope: TxEnvelope = tx.into_signed(signature).into();
        Ok(envelope.encoded_2718().into())
    }
}

// =============================================================================
// Tests
// =============================================================================
