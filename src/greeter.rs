//! Greeter Contract Interface
//!
//! Storage layout and call encoding for the standard Greeter contract:
//!
//!   contract Greeter {
//!       string greeting;                      // slot 0
//!       function greet() view returns (string);
//!       function setGreeting(string memory);
//!   }
//!
//! Everything here is offline byte work. The commands combine these helpers
//! with the RPC client to read the greeting straight out of storage and to
//! build `setGreeting` calls for simulation and submission.

use alloy_primitives::{keccak256, Address, Bytes, TxKind, U256};
use alloy_rpc_types_eth::{TransactionInput, TransactionRequest};

// =============================================================================
// Storage Slot Constants (must match the Solidity storage layout)
// =============================================================================

/// slot 0: greeting (string)
pub const GREETING_SLOT: U256 = U256::from_limbs([0, 0, 0, 0]);

// =============================================================================
// ABI Function Selectors
// =============================================================================

/// Compute the Solidity function selector (first 4 bytes of keccak256(signature)).
pub fn function_selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    let mut selector = [0u8; 4];
    selector.copy_from_slice(&hash[..4]);
    selector
}

/// Pre-computed ABI function selectors for the Greeter contract.
pub mod selectors {
    use super::function_selector;

    /// setGreeting(string) → 0xa4136862
    pub fn set_greeting() -> [u8; 4] {
        function_selector("setGreeting(string)")
    }

    /// greet() → 0xcfae3217
    pub fn greet() -> [u8; 4] {
        function_selector("greet()")
    }
}

// =============================================================================
// Call Encoding
// =============================================================================

/// ABI-encode a `setGreeting(string)` call.
///
/// Layout: selector ++ head offset (0x20) ++ byte length ++ content
/// right-padded with zeros to a 32-byte boundary.
pub fn encode_set_greeting(greeting: &str) -> Bytes {
    let content = greeting.as_bytes();
    let padded = content.len().div_ceil(32) * 32;

    let mut data = Vec::with_capacity(4 + 64 + padded);
    data.extend_from_slice(&selectors::set_greeting());
    data.extend_from_slice(&U256::from(32).to_be_bytes::<32>());
    data.extend_from_slice(&U256::from(content.len()).to_be_bytes::<32>());
    data.extend_from_slice(content);
    data.resize(4 + 64 + padded, 0);
    data.into()
}

/// Build the call descriptor for a `setGreeting` transaction.
///
/// Used as-is for `eth_estimateGas` and, with the gas field overridden,
/// for `eth_call` probes during the minimal-gas search.
pub fn set_greeting_request(from: Address, contract: Address, greeting: &str) -> TransactionRequest {
    TransactionRequest {
        from: Some(from),
        to: Some(TxKind::Call(contract)),
        input: TransactionInput::new(encode_set_greeting(greeting)),
        ..Default::default()
    }
}

// =============================================================================
// Tests
// =============================================================================
