//! Replay Binary - Event Stream to Materialized Ledger
//!
//! Reads the vault's event stream (JSONL, one event per line, in chain
//! causal order), folds every event into the ledger, then exports the
//! derived state and writes a JSON snapshot.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --release -- --backend sqlite
//! ```
//!
//! ## Environment Variables
//!
//! - VAULT_ADDRESS - vault contract address (required)
//! - EVENTS_PATH - path to the event stream JSONL (default: streams/events.jsonl)
//! - VAULTFLOW_DB_PATH - SQLite database path (default: data/vaultflow.db) - used when --backend sqlite
//! - EXPORT_OUTPUT_PATH - output directory for JSONL export (default: streams/ledger)
//! - SNAPSHOT_PATH - ledger snapshot path (default: data/ledger.json)
//! - RPC_URL - Ethereum JSON-RPC endpoint for token metadata (optional)
//! - RUST_LOG - Logging level (optional, default: info)

use std::env;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use vaultflow::config::Config;
use vaultflow::export::{BackendType, LedgerWriter};
use vaultflow::ledger_core::Ledger;
use vaultflow::metadata::{MetadataSource, RpcMetadataSource, UnknownMetadata};
use vaultflow::persistence;
use vaultflow::VaultEvent;

fn parse_backend_from_args() -> BackendType {
    let args: Vec<String> = env::args().collect();
    if let Some(idx) = args.iter().position(|x| x == "--backend") {
        if let Some(backend) = args.get(idx + 1).and_then(|s| BackendType::from_arg(s)) {
            return backend;
        }
    }
    BackendType::Jsonl
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    dotenv::dotenv().ok();

    let config = Config::from_env();
    let backend = parse_backend_from_args();
    let output_path: PathBuf = match backend {
        BackendType::Sqlite => config.db_path.clone().into(),
        BackendType::Jsonl => env::var("EXPORT_OUTPUT_PATH")
            .unwrap_or_else(|_| "streams/ledger".to_string())
            .into(),
    };

    log::info!("Starting vaultflow ledger replay");
    log::info!("   Vault: {}", config.vault_address);
    log::info!("   Events: {}", config.events_path);
    log::info!("   Output: {}", output_path.display());
    log::info!("   Snapshot: {}", config.snapshot_path);

    let metadata: Box<dyn MetadataSource> = match &config.rpc_url {
        Some(url) => {
            log::info!("   Metadata: JSON-RPC via {}", url);
            Box::new(RpcMetadataSource::new(url.clone())?)
        }
        None => {
            log::info!("   Metadata: offline fallback (RPC_URL not set)");
            Box::new(UnknownMetadata)
        }
    };

    let mut ledger = Ledger::with_metadata(config.vault_address.clone(), metadata);

    let file = File::open(&config.events_path)?;
    let reader = BufReader::new(file);

    let mut folded: u64 = 0;
    let mut malformed: u64 = 0;
    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match VaultEvent::from_jsonl(&line) {
            Ok(event) => {
                ledger.apply(&event);
                folded += 1;
            }
            Err(e) => {
                // Unaddressable events have no recovery path; surface and
                // count them, the fold never sees them.
                log::error!("malformed event at line {}: {}", line_no + 1, e);
                malformed += 1;
            }
        }
        if folded % 10_000 == 0 && folded > 0 {
            log::info!("   folded {} events...", folded);
        }
    }

    log::info!(
        "Replay complete: {} events folded, {} malformed lines skipped",
        folded,
        malformed
    );
    log::info!(
        "   {} transactions, {} derived assets, {} users, {} warnings",
        ledger.state.transactions.len(),
        ledger.state.derived_assets.len(),
        ledger.state.users.len(),
        ledger.state.warnings.len()
    );

    let mut writer = LedgerWriter::new(backend, output_path)?;
    log::info!("Exporting via {} backend", writer.backend_type());

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(writer.export_state(&ledger.state))?;

    persistence::save_snapshot(&ledger.state, &config.snapshot_path)?;
    log::info!("Snapshot written to {}", config.snapshot_path);

    Ok(())
}
