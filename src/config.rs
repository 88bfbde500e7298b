//! Runtime Configuration
//!
//! Settings arrive through CLI flags or environment variables (including a
//! `.env` file loaded at startup) and are carried in an explicit `Config`
//! value from then on. Nothing below the command layer reads the process
//! environment. Each command asks for exactly the settings it needs; a
//! missing one is a fatal startup error naming both the flag and the
//! variable.

use alloy_primitives::Address;
use thiserror::Error;

use crate::cli::Cli;

/// Load variables from a `.env` file in the working directory, if present.
/// Must run before CLI parsing so clap sees the loaded values.
pub fn load_env() {
    dotenv::dotenv().ok();
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing {name}: pass --{flag} or set the {name} environment variable")]
    Missing { name: &'static str, flag: &'static str },
}

/// Connection and signing settings shared by the commands.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub rpc_url: Option<String>,
    pub private_key: Option<String>,
    pub contract_address: Option<Address>,
}

impl Config {
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            rpc_url: cli.rpc_url.clone(),
            private_key: cli.private_key.clone(),
            contract_address: cli.contract_address,
        }
    }

    /// The node endpoint; every command needs one.
    pub fn require_rpc_url(&self) -> Result<&str, ConfigError> {
        self.rpc_url
            .as_deref()
            .ok_or(ConfigError::Missing { name: "RPC_URL", flag: "rpc-url" })
    }

    /// The signing key, for commands that derive or use an account.
    pub fn require_private_key(&self) -> Result<&str, ConfigError> {
        self.private_key
            .as_deref()
            .ok_or(ConfigError::Missing { name: "PRIVATE_KEY", flag: "private-key" })
    }

    /// The deployed Greeter address, for commands that touch the contract.
    pub fn require_contract_address(&self) -> Result<Address, ConfigError> {
        self.contract_address
            .ok_or(ConfigError::Missing { name: "CONTRACT_ADDRESS", flag: "contract-address" })
    }
}

// =============================================================================
// Tests
// =============================================================================
