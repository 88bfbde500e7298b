//! Colored console output for the Greeter tools.
//!
//! Replaces raw `println!` calls with structured, colored output.
//! Color scheme: blue+bold section markers, cyan values, green success,
//! yellow warnings, dimmed secondary text.

use alloy_primitives::utils::format_ether;
use alloy_primitives::{Address, B256, U256};
use colored::Colorize;

// ── Helpers ────────────────────────────────────────────────────────

/// Format a wei amount as a trimmed ETH decimal string.
///
/// - Whole ether → `"1"`
/// - Fractions keep only significant digits → `"1.5"`
/// - One wei → `"0.000000000000000001"`
pub fn format_eth(wei: U256) -> String {
    format_ether(wei).trim_end_matches('0').trim_end_matches('.').to_string()
}

// ── Account & Balance ──────────────────────────────────────────────

/// Print the account whose balance is being read.
pub fn print_account(address: Address) {
    println!("Account: {}", format!("{address}").cyan());
}

/// Print the account balance in wei, with an approximate ETH rendering.
pub fn print_balance(wei: U256) {
    println!(
        "Balance: {} wei {}",
        wei.to_string().cyan(),
        format!("(~{} ETH)", format_eth(wei)).dimmed()
    );
}

// ── Gas Search ─────────────────────────────────────────────────────

/// Print the eth_estimateGas upper bound.
pub fn print_gas_estimate(upper: u64) {
    println!("Initial gas estimate: {}", upper.to_string().cyan());
}

/// Print the heuristic lower bound before it is probed.
pub fn print_lower_bound(bound: u64) {
    println!("Testing lower bound: {}", bound.to_string().cyan());
}

/// Print the current bracket, once per narrowing iteration.
pub fn print_search_bracket(low: u64, high: u64) {
    println!(
        "Binary search between {} and {}",
        low.to_string().cyan(),
        high.to_string().cyan()
    );
}

/// Print the search result.
pub fn print_minimal_gas(gas: u64) {
    println!(
        "Minimum gas limit for successful transaction: {}",
        gas.to_string().green().bold()
    );
}

// ── Storage Decoding ───────────────────────────────────────────────

/// Print the raw first word of the string slot.
pub fn print_raw_storage(word: B256) {
    println!("Raw storage value: {}", format!("{word}").cyan());
}

/// Print the length marker byte, hex and decimal.
pub fn print_length_marker(marker: u8) {
    println!(
        "Length marker: {} = {} (decimal)",
        format!("0x{marker:02x}").cyan(),
        marker.to_string().cyan()
    );
}

/// Print the short-string header summary. Short strings always sit in
/// the single declared slot.
pub fn print_short_string(len: usize) {
    println!("{}", "Short string".blue().bold());
    println!("Length: {} bytes, Slots used: {}", len.to_string().cyan(), "1".cyan());
}

/// Print the long-string header summary.
pub fn print_long_string(len: usize, slots: usize) {
    println!("{}", "Long string".blue().bold());
    println!(
        "Length: {} bytes, Slots used: {}",
        len.to_string().cyan(),
        slots.to_string().cyan()
    );
}

/// Print where the long-string content run begins.
pub fn print_data_start(slot: U256) {
    println!(
        "Data starts at slot: {}",
        format!("{}", B256::from(slot.to_be_bytes::<32>())).cyan()
    );
}

/// Print a continuation-slot read before it happens.
pub fn print_slot_read(index: usize, slot: U256) {
    println!(
        "Reading slot {}: {}",
        index.to_string().dimmed(),
        format!("{slot:#x}").cyan()
    );
}

/// Print a continuation slot's raw word.
pub fn print_slot_word(index: usize, word: B256) {
    println!(
        "Slot {} data: {}",
        index.to_string().dimmed(),
        format!("{word}").cyan()
    );
}

/// Print the decoded content on its own line.
pub fn print_content(text: &str) {
    println!("{}", "Content:".blue().bold());
    println!("{text}");
}

/// Print content that is not valid UTF-8 as raw hex bytes.
pub fn print_content_raw(bytes: &[u8]) {
    println!("{}", "Content (raw bytes, not valid UTF-8):".blue().bold());
    println!("0x{}", hex::encode(bytes));
}

// ── Transaction Submission ─────────────────────────────────────────

/// Print the submitted transaction hash.
pub fn print_tx_hash(hash: B256) {
    println!("Transaction hash: {}", format!("{hash}").cyan());
}

/// Print the mined receipt summary.
pub fn print_receipt(block_number: u64, success: bool) {
    let status = if success {
        "success".green().bold()
    } else {
        "reverted".yellow().bold()
    };
    println!(
        "Transaction confirmed in block {} with status {}",
        block_number.to_string().cyan(),
        status
    );
}

// ── Tests ───────────────────────────────────────────────────────────
