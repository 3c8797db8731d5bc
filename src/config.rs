use std::env;

/// The burn/mint counterparty address.
pub const ZERO_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

/// Configuration loaded from environment variables
pub struct Config {
    pub vault_address: String,
    pub events_path: String,
    pub db_path: String,
    pub snapshot_path: String,
    pub rpc_url: Option<String>,
    pub rust_log: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// `VAULT_ADDRESS` is required: folds ignore events whose emitter is not
    /// the configured vault contract. `RPC_URL` is optional; without it token
    /// metadata falls back to "unknown"/0.
    pub fn from_env() -> Self {
        let vault_address = env::var("VAULT_ADDRESS")
            .expect("VAULT_ADDRESS must be set in .env file")
            .to_lowercase();

        let events_path = env::var("EVENTS_PATH")
            .unwrap_or_else(|_| "streams/events.jsonl".to_string());

        let db_path = env::var("VAULTFLOW_DB_PATH")
            .unwrap_or_else(|_| "data/vaultflow.db".to_string());

        let snapshot_path = env::var("SNAPSHOT_PATH")
            .unwrap_or_else(|_| "data/ledger.json".to_string());

        let rpc_url = env::var("RPC_URL").ok();

        let rust_log = env::var("RUST_LOG").ok();

        Self {
            vault_address,
            events_path,
            db_path,
            snapshot_path,
            rpc_url,
            rust_log,
        }
    }
}

/// Normalize an address to its canonical lowercase hex form.
pub fn normalize_address(address: &str) -> String {
    address.to_ascii_lowercase()
}

/// True if the address is the zero address (mint/burn counterparty).
pub fn is_zero_address(address: &str) -> bool {
    address.eq_ignore_ascii_case(ZERO_ADDRESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_address_detection() {
        assert!(is_zero_address(ZERO_ADDRESS));
        assert!(!is_zero_address("0x0000000000000000000000000000000000000001"));
    }

    #[test]
    fn test_normalize_address() {
        assert_eq!(
            normalize_address("0xAbC1F487D79B8f9048e61e8718F9baae4e945ECb"),
            "0xabc1f487d79b8f9048e61e8718f9baae4e945ecb"
        );
    }
}
