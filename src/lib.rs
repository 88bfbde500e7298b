//! # Greeter Tools - Ethereum Greeter Contract Toolkit
//!
//! A command-line toolkit for working with a deployed Greeter contract over raw
//! JSON-RPC: checking balances, binary-searching the minimal viable gas limit,
//! decoding the greeting straight out of contract storage, and submitting
//! signed `setGreeting` transactions.

pub mod cli;
pub mod config;
pub mod gas;
pub mod greeter;
pub mod output;
pub mod rpc;
pub mod storage;
pub mod wallet;
