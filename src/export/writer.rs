//! Unified writer interface for the derived ledger
//!
//! Routes writes to either the JSONL or SQLite backend and exports a full
//! ledger state in deterministic (id-sorted) order.

use super::jsonl_writer::JsonlLedgerWriter;
use super::sqlite_writer::SqliteLedgerWriter;
use super::writer_backend::{
    AssetSupplyRow, BalanceRow, ContractRow, ExportError, LedgerWriterBackend,
};
use crate::ledger_core::LedgerState;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendType {
    Jsonl,
    Sqlite,
}

impl BackendType {
    pub fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "jsonl" => Some(BackendType::Jsonl),
            "sqlite" => Some(BackendType::Sqlite),
            _ => None,
        }
    }
}

/// Unified writer that routes to either JSONL or SQLite backend
pub enum LedgerWriter {
    Jsonl(JsonlLedgerWriter),
    Sqlite(SqliteLedgerWriter),
}

impl LedgerWriter {
    /// Create a writer for the selected backend. For JSONL the path is a
    /// directory; for SQLite it is the database file.
    pub fn new(backend: BackendType, path: PathBuf) -> Result<Self, ExportError> {
        match backend {
            BackendType::Jsonl => Ok(LedgerWriter::Jsonl(JsonlLedgerWriter::new(path)?)),
            BackendType::Sqlite => Ok(LedgerWriter::Sqlite(SqliteLedgerWriter::new(path)?)),
        }
    }

    fn backend_mut(&mut self) -> &mut dyn LedgerWriterBackend {
        match self {
            LedgerWriter::Jsonl(w) => w,
            LedgerWriter::Sqlite(w) => w,
        }
    }

    pub fn backend_type(&self) -> &'static str {
        match self {
            LedgerWriter::Jsonl(w) => w.backend_type(),
            LedgerWriter::Sqlite(w) => w.backend_type(),
        }
    }

    /// Export the full materialized ledger: every warning, derived-asset
    /// supply, external-contract holding, and user balance.
    pub async fn export_state(&mut self, state: &LedgerState) -> Result<(), ExportError> {
        let backend = self.backend_mut();

        let mut warnings: Vec<_> = state.warnings.values().collect();
        warnings.sort_by(|a, b| a.id.cmp(&b.id));
        for warning in warnings {
            backend.write_warning(warning).await?;
        }

        let mut assets: Vec<_> = state.derived_assets.values().collect();
        assets.sort_by(|a, b| a.id.cmp(&b.id));
        for asset in assets {
            backend.write_asset(&AssetSupplyRow::from(asset)).await?;
        }

        let mut contracts: Vec<_> = state.erc20_contracts.values().collect();
        contracts.sort_by(|a, b| a.address.cmp(&b.address));
        for contract in contracts {
            backend.write_contract(&ContractRow::from(contract)).await?;
        }

        let mut balances: Vec<_> = state.balances.values().collect();
        balances.sort_by(|a, b| a.id.cmp(&b.id));
        for balance in balances {
            backend.write_balance(&BalanceRow::from(balance)).await?;
        }

        backend.flush().await?;

        log::info!(
            "Exported {} warnings, {} assets, {} contracts, {} balances",
            state.warnings.len(),
            state.derived_assets.len(),
            state.erc20_contracts.len(),
            state.balances.len()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigInt;
    use tempfile::tempdir;

    #[test]
    fn test_backend_type_parsing() {
        assert_eq!(BackendType::from_arg("jsonl"), Some(BackendType::Jsonl));
        assert_eq!(BackendType::from_arg("sqlite"), Some(BackendType::Sqlite));
        assert_eq!(BackendType::from_arg("csv"), None);
    }

    #[tokio::test]
    async fn test_export_state_to_sqlite() {
        let dir = tempdir().unwrap();
        let mut state = LedgerState::default();
        state.derived_asset_mut("1234").supply = BigInt::from(9);
        state.balance_mut("0xalice", "1234").balance = BigInt::from(9);

        let db_path = dir.path().join("ledger.db");
        let mut writer = LedgerWriter::new(BackendType::Sqlite, db_path.clone()).unwrap();
        writer.export_state(&state).await.unwrap();
        drop(writer);

        let conn = rusqlite::Connection::open(&db_path).unwrap();
        let supply: String = conn
            .query_row(
                "SELECT supply FROM derived_assets WHERE id = '1234'",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(supply, "9");

        let balance: String = conn
            .query_row(
                "SELECT balance FROM user_balances WHERE id = '0xalice-1234'",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(balance, "9");
    }
}
