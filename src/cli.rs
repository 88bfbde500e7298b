use alloy_primitives::Address;
use clap::{Parser, Subcommand};

/// CLI arguments for the Greeter tools
#[derive(Parser, Debug)]
#[command(name = "greeter", about = "Greeter contract tools over Ethereum JSON-RPC")]
pub struct Cli {
    /// JSON-RPC endpoint of the target node.
    /// Can also be set via RPC_URL environment variable.
    #[arg(long, env = "RPC_URL", global = true)]
    pub rpc_url: Option<String>,

    /// Signing private key (hex, with or without 0x prefix).
    /// Can also be set via PRIVATE_KEY environment variable.
    #[arg(long, env = "PRIVATE_KEY", global = true)]
    pub private_key: Option<String>,

    /// Address of the deployed Greeter contract.
    /// Can also be set via CONTRACT_ADDRESS environment variable.
    #[arg(long, env = "CONTRACT_ADDRESS", global = true)]
    pub contract_address: Option<Address>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the wei balance of the signing account
    Balance,

    /// Binary-search the minimal gas limit at which setGreeting succeeds
    ExactGas {
        /// Greeting text used for the simulated call
        greeting: String,
    },

    /// Read slot 0 and decode the greeting string by hand
    GetStorage,

    /// Submit a setGreeting transaction and wait for its receipt
    SetGreeting {
        /// New greeting text to store
        greeting: String,

        /// Gas limit override; estimated via eth_estimateGas when omitted
        #[arg(long)]
        gas_limit: Option<u64>,
    },
}
