use greeter_tools::cli::{Cli, Command};
use greeter_tools::config::{self, Config};
use greeter_tools::gas::{self, EthCallProbe, SearchEvent};
use greeter_tools::greeter;
use greeter_tools::output;
use greeter_tools::rpc::RpcClient;
use greeter_tools::storage::{self, ContractStorageReader, FetchEvent, StringHeader};
use greeter_tools::wallet::Wallet;

use alloy_consensus::TxLegacy;
use alloy_primitives::{TxKind, U256};
use clap::Parser;

/// Main entry point for the Greeter tools
#[tokio::main]
async fn main() -> eyre::Result<()> {
    // .env must be loaded before clap resolves environment fallbacks
    config::load_env();

    let cli = Cli::parse();
    let config = Config::from_cli(&cli);

    match cli.command {
        Command::Balance => balance(&config).await,
        Command::ExactGas { greeting } => exact_gas(&config, &greeting).await,
        Command::GetStorage => get_storage(&config).await,
        Command::SetGreeting { greeting, gas_limit } => {
            set_greeting(&config, &greeting, gas_limit).await
        }
    }
}

/// Print the signing account and its current balance.
async fn balance(config: &Config) -> eyre::Result<()> {
    let wallet = Wallet::from_hex(config.require_private_key()?)?;
    let client = RpcClient::connect(config.require_rpc_url()?)?;

    let wei = client.get_balance(wallet.address()).await?;

    output::print_account(wallet.address());
    output::print_balance(wei);

    Ok(())
}

/// Find the smallest gas limit at which `setGreeting` still succeeds.
async fn exact_gas(config: &Config, greeting: &str) -> eyre::Result<()> {
    let wallet = Wallet::from_hex(config.require_private_key()?)?;
    let contract = config.require_contract_address()?;
    let client = RpcClient::connect(config.require_rpc_url()?)?;

    let request = greeter::set_greeting_request(wallet.address(), contract, greeting);
    let upper_bound = client.estimate_gas(&request).await?;
    output::print_gas_estimate(upper_bound);

    let probe = EthCallProbe::new(&client, request);
    let minimal = gas::find_minimal_gas(upper_bound, &probe, |event| match event {
        SearchEvent::LowerBoundProbe { bound } => output::print_lower_bound(bound),
        SearchEvent::Bracket { low, high } => output::print_search_bracket(low, high),
    })
    .await?;

    output::print_minimal_gas(minimal);

    Ok(())
}

/// Read the greeting straight out of contract storage and decode it.
async fn get_storage(config: &Config) -> eyre::Result<()> {
    let contract = config.require_contract_address()?;
    let client = RpcClient::connect(config.require_rpc_url()?)?;

    let first_word = client
        .get_storage_at(contract, greeter::GREETING_SLOT)
        .await?;
    output::print_raw_storage(first_word);
    output::print_length_marker(first_word[31]);

    match storage::parse_header(first_word)? {
        StringHeader::Short { len } => output::print_short_string(len),
        StringHeader::Long { len, slots } => {
            output::print_long_string(len, slots);
            output::print_data_start(storage::data_base_slot(greeter::GREETING_SLOT));
        }
    }

    let reader = ContractStorageReader::new(&client, contract);
    let decoded = storage::decode(first_word, greeter::GREETING_SLOT, &reader, |event| {
        match event {
            FetchEvent::Read { index, slot } => output::print_slot_read(index, slot),
            FetchEvent::Word { index, word } => output::print_slot_word(index, word),
        }
    })
    .await?;

    match decoded.as_text() {
        Some(text) => output::print_content(text),
        None => output::print_content_raw(&decoded.bytes),
    }

    Ok(())
}

/// Sign a `setGreeting` transaction, submit it, and wait for the receipt.
async fn set_greeting(
    config: &Config,
    greeting: &str,
    gas_limit: Option<u64>,
) -> eyre::Result<()> {
    let wallet = Wallet::from_hex(config.require_private_key()?)?;
    let contract = config.require_contract_address()?;
    let client = RpcClient::connect(config.require_rpc_url()?)?;

    // Estimate unless the caller pinned a limit on the command line
    let gas_limit = match gas_limit {
        Some(limit) => limit,
        None => {
            let request = greeter::set_greeting_request(wallet.address(), contract, greeting);
            client.estimate_gas(&request).await?
        }
    };

    let tx = TxLegacy {
        chain_id: Some(client.chain_id().await?),
        nonce: client.transaction_count(wallet.address()).await?,
        gas_price: client.gas_price().await?,
        gas_limit,
        to: TxKind::Call(contract),
        value: U256::ZERO,
        input: greeter::encode_set_greeting(greeting),
    };

    let raw = wallet.sign_transaction(tx).await?;
    let hash = client.send_raw_transaction(raw).await?;
    output::print_tx_hash(hash);

    let receipt = client.wait_for_receipt(hash).await?;
    output::print_receipt(receipt.block_number.unwrap_or_default(), receipt.status());

    Ok(())
}
