use anyhow::{bail, Context};
use chainex_core::logging::{init_logging, LogFormat};
use chainex_core::*;
use clap::{Parser, Subcommand};
use std::process;

#[derive(Parser)]
#[command(name = "chainex-cli")]
#[command(about = "Chainex transaction tool - sign, pack and inspect ledger transactions")]
#[command(version)]
struct Cli {
    /// Default log level when RUST_LOG is not set
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Log format: pretty or json
    #[arg(long, global = true, default_value = "pretty")]
    log_format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign a JSON transaction and print the packed transaction as hex
    Pack {
        /// Path to the transaction in JSON form
        #[arg(short, long)]
        transaction: String,

        /// Private key in hex (repeat for multiple signers)
        #[arg(short, long = "key", required = true)]
        keys: Vec<String>,

        /// Chain id in hex
        #[arg(short, long)]
        chain_id: String,

        /// Context-free data blob in hex (repeatable)
        #[arg(long = "cfd")]
        context_free_data: Vec<String>,

        /// Compression: none or zlib
        #[arg(long, default_value = "none")]
        compression: String,
    },

    /// Decode a packed transaction, recover its signers and print a summary
    Inspect {
        /// Packed transaction in hex
        #[arg(short, long)]
        packed: String,

        /// Chain id in hex
        #[arg(short, long)]
        chain_id: String,

        /// Accept several signatures from the same key
        #[arg(long)]
        allow_duplicate_keys: bool,

        /// Path to a JSON core configuration
        #[arg(long)]
        config: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_logging(&cli.log_level, LogFormat::from_str_lossy(&cli.log_format)) {
        eprintln!("Warning: logging disabled: {}", e);
    }

    let result = match cli.command {
        Commands::Pack {
            transaction,
            keys,
            chain_id,
            context_free_data,
            compression,
        } => handle_pack(transaction, keys, chain_id, context_free_data, compression),
        Commands::Inspect {
            packed,
            chain_id,
            allow_duplicate_keys,
            config,
        } => handle_inspect(packed, chain_id, allow_duplicate_keys, config),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn handle_pack(
    transaction_path: String,
    keys: Vec<String>,
    chain_id: String,
    context_free_data: Vec<String>,
    compression: String,
) -> anyhow::Result<()> {
    let json = std::fs::read_to_string(&transaction_path)
        .with_context(|| format!("Failed to read {}", transaction_path))?;
    let transaction: Transaction = serde_json::from_str(&json).context("Invalid transaction JSON")?;
    let chain_id: ChainId = chain_id.parse()?;
    let compression: Compression = compression.parse()?;
    let context_free_data = context_free_data
        .iter()
        .map(|blob| hex::decode(blob).context("Invalid context-free data hex"))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let mut signed = SignedTransaction::new(transaction, Vec::new(), context_free_data);
    for key in &keys {
        let key = PrivateKey::from_hex(key)?;
        signed.sign(&key, &chain_id)?;
    }

    let packed = PackedTransaction::from_signed(&signed, compression)?;
    println!("Transaction ID: {}", signed.id()?);
    println!("Packed: {}", hex::encode(packed.to_bytes()?));

    Ok(())
}

fn handle_inspect(
    packed_hex: String,
    chain_id: String,
    allow_duplicate_keys: bool,
    config_path: Option<String>,
) -> anyhow::Result<()> {
    let config = match config_path {
        Some(path) => CoreConfig::from_json_file(path)?,
        None => CoreConfig::default(),
    };
    let chain_id: ChainId = chain_id.parse()?;
    let bytes = hex::decode(packed_hex.trim()).context("Invalid packed transaction hex")?;
    if bytes.is_empty() {
        bail!("Packed transaction is empty");
    }

    let core = Core::with_config(chain_id, &config);
    let validated = core.validate_bytes(&bytes, allow_duplicate_keys)?;

    println!("Transaction ID: {}", validated.id);
    println!("Packed Digest: {}", validated.packed_digest);
    println!("Billable Size: {}", validated.billable_size);
    match validated.sender() {
        Ok(sender) => println!("Sender: {}", sender),
        Err(e) => println!("Sender: <{}>", e),
    }
    println!("Fee: {}", core.transaction_fee(&validated.transaction)?);
    println!("Actions: {}", validated.transaction.transaction.actions.len());
    println!("Signing Keys:");
    for key in &validated.signing_keys {
        println!("  {}", key);
    }

    Ok(())
}
