//! Solidity String Storage Decoder
//!
//! Reconstructs a `string` state variable from raw storage words, following
//! the layout Solidity uses:
//!
//!   short (<= 31 bytes): content left-aligned in the declared slot,
//!     length * 2 in the least-significant byte (even marker)
//!   long (>= 32 bytes): declared slot holds length * 2 + 1 (odd marker),
//!     content fills keccak256(slot), keccak256(slot) + 1, ...
//!
//! The decoder never guesses: a marker no Solidity compiler can emit is
//! rejected instead of being turned into garbage bytes, and content that is
//! not valid UTF-8 stays available as raw bytes.

use alloy_primitives::{Address, Keccak256, B256, U256};
use async_trait::async_trait;
use thiserror::Error;

use crate::rpc::{RpcClient, RpcError};

/// Longest string that fits in the declared slot itself.
pub const SHORT_STRING_MAX: usize = 31;

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug, Error)]
pub enum DecodeError {
    /// Even marker whose half exceeds the single-slot capacity.
    #[error("short-string marker {0:#04x} encodes {1} bytes, more than one slot can pack")]
    ShortTooLong(u8, usize),
    /// Odd marker whose decoded length belongs to the short form.
    #[error("long-string marker encodes only {0} bytes; lengths below 32 use the short form")]
    LongTooShort(usize),
    /// Decoded length exceeds what this process can address.
    #[error("string length {0} exceeds addressable memory")]
    LengthOverflow(U256),
    /// A continuation slot could not be read.
    #[error("storage read failed: {0}")]
    Fetch(#[from] RpcError),
}

// =============================================================================
// Length marker
// =============================================================================

/// Interpretation of the first storage word's length marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringHeader {
    /// Content packed into the first word itself.
    Short { len: usize },
    /// Content spilled into the hashed slot run; `slots` words hold it.
    Long { len: usize, slots: usize },
}

/// Parse the length marker in the least-significant byte of the first word.
///
/// Even marker: short form, length = marker / 2.
/// Odd marker: long form, length = (word - 1) / 2 over the full 256 bits.
pub fn parse_header(first_word: B256) -> Result<StringHeader, DecodeError> {
    let marker = first_word[31];

    if marker % 2 == 0 {
        let len = (marker / 2) as usize;
        if len > SHORT_STRING_MAX {
            return Err(DecodeError::ShortTooLong(marker, len));
        }
        return Ok(StringHeader::Short { len });
    }

    let raw = U256::from_be_bytes(first_word.0);
    let len_word = (raw - U256::from(1)) / U256::from(2);
    let len = usize::try_from(len_word).map_err(|_| DecodeError::LengthOverflow(len_word))?;
    if len <= SHORT_STRING_MAX {
        return Err(DecodeError::LongTooShort(len));
    }
    Ok(StringHeader::Long { len, slots: len.div_ceil(32) })
}

/// Compute the base slot of a long string's content.
///
/// For `string greeting` at slot 0:
///   base = keccak256(abi.encode(0))
///   bytes [0, 32) live at base, bytes [32, 64) at base + 1, etc.
pub fn data_base_slot(slot: U256) -> U256 {
    let mut hasher = Keccak256::new();
    hasher.update(B256::from(slot.to_be_bytes::<32>()).as_slice());
    U256::from_be_bytes(hasher.finalize().0)
}

// =============================================================================
// SlotReader trait (abstracts storage access for testing)
// =============================================================================

/// Trait for fetching additional storage words by slot index.
///
/// In production: one `eth_getStorageAt` per word (ContractStorageReader).
/// In tests: an in-memory map.
#[async_trait]
pub trait SlotReader {
    async fn read_slot(&self, slot: U256) -> Result<B256, RpcError>;
}

/// Reads the storage of one deployed contract over JSON-RPC.
pub struct ContractStorageReader<'a> {
    client: &'a RpcClient,
    address: Address,
}

impl<'a> ContractStorageReader<'a> {
    pub fn new(client: &'a RpcClient, address: Address) -> Self {
        Self { client, address }
    }
}

#[async_trait]
impl SlotReader for ContractStorageReader<'_> {
    async fn read_slot(&self, slot: U256) -> Result<B256, RpcError> {
        self.client.get_storage_at(self.address, slot).await
    }
}

// =============================================================================
// Decoding
// =============================================================================

/// Progress events emitted while reconstructing a long string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchEvent {
    /// A continuation slot is about to be read. `index` counts from zero.
    Read { index: usize, slot: U256 },
    /// A continuation slot arrived.
    Word { index: usize, word: B256 },
}

/// A decoded string value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedString {
    /// Exact content bytes, truncated to the encoded length.
    pub bytes: Vec<u8>,
    /// Storage words holding the content: 1 for short strings,
    /// ceil(len / 32) continuation words for long ones.
    pub slots_used: usize,
}

impl DecodedString {
    /// Content as text when it is valid UTF-8. Callers fall back to raw
    /// bytes on `None`; the content is never rewritten to make it printable.
    pub fn as_text(&self) -> Option<&str> {
        std::str::from_utf8(&self.bytes).ok()
    }
}

/// Decode the string declared at `slot`, given its first storage word.
///
/// Short strings complete without touching the reader. Long strings fetch
/// exactly ceil(len / 32) words starting at `data_base_slot(slot)`, in
/// increasing slot order, then truncate the concatenation to the encoded
/// length. Every step is reported through `on_event`.
pub async fn decode(
    first_word: B256,
    slot: U256,
    reader: &impl SlotReader,
    mut on_event: impl FnMut(FetchEvent),
) -> Result<DecodedString, DecodeError> {
    match parse_header(first_word)? {
        StringHeader::Short { len } => Ok(DecodedString {
            bytes: first_word[..len].to_vec(),
            slots_used: 1,
        }),
        StringHeader::Long { len, slots } => {
            let base = data_base_slot(slot);
            let mut bytes = Vec::with_capacity(slots * 32);
            for index in 0..slots {
                let current = base + U256::from(index);
                on_event(FetchEvent::Read { index, slot: current });
                let word = reader.read_slot(current).await?;
                on_event(FetchEvent::Word { index, word });
                bytes.extend_from_slice(word.as_slice());
            }
            bytes.truncate(len);
            Ok(DecodedString { bytes, slots_used: slots })
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
