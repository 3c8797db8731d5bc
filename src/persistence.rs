use {
    crate::ledger_core::LedgerState,
    std::{fs, path::Path},
};

/// Save the materialized ledger to a JSON snapshot file
pub fn save_snapshot(state: &LedgerState, file_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(parent) = Path::new(file_path).parent() {
        fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(state)?;
    fs::write(file_path, json)?;

    log::debug!(
        "Saved snapshot with {} transactions and {} warnings to {}",
        state.transactions.len(),
        state.warnings.len(),
        file_path
    );
    Ok(())
}

/// Load a ledger snapshot from a JSON file
pub fn load_snapshot(file_path: &str) -> Result<LedgerState, Box<dyn std::error::Error>> {
    if !Path::new(file_path).exists() {
        log::info!("No existing snapshot file found: {}", file_path);
        return Ok(LedgerState::default());
    }

    let json = fs::read_to_string(file_path)?;
    let state: LedgerState = serde_json::from_str(&json)?;

    log::info!(
        "Loaded snapshot with {} transactions from {}",
        state.transactions.len(),
        file_path
    );
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigInt;
    use tempfile::tempdir;

    #[test]
    fn test_snapshot_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ledger.json");
        let path = path.to_str().unwrap();

        let mut state = LedgerState::default();
        state.derived_asset_mut("1234").supply = BigInt::from(-3);
        state.user_mut("0xalice").transfers.push("0xabc-0".to_string());

        save_snapshot(&state, path).unwrap();
        let loaded = load_snapshot(path).unwrap();

        assert_eq!(loaded.derived_assets["1234"].supply, BigInt::from(-3));
        assert_eq!(loaded.users["0xalice"].transfers, vec!["0xabc-0"]);
    }

    #[test]
    fn test_missing_snapshot_yields_empty_state() {
        let state = load_snapshot("does/not/exist.json").unwrap();
        assert!(state.transactions.is_empty());
    }
}
