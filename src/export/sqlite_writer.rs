//! SQLite backend for the derived ledger
//!
//! Warnings are append-only (`INSERT OR IGNORE` on the deterministic id);
//! aggregate rows are upserted so re-exporting after more folds updates them
//! in place.

use super::writer_backend::{
    AssetSupplyRow, BalanceRow, ContractRow, ExportError, LedgerWriterBackend,
};
use crate::ledger_core::entities::Warning;
use async_trait::async_trait;
use rusqlite::{params, Connection};
use std::path::Path;

pub struct SqliteLedgerWriter {
    conn: Connection,
}

impl SqliteLedgerWriter {
    pub fn new(db_path: impl AsRef<Path>) -> Result<Self, ExportError> {
        if let Some(parent) = db_path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(db_path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS warnings (
                id TEXT PRIMARY KEY,
                kind TEXT NOT NULL,
                description TEXT NOT NULL,
                event TEXT NOT NULL,
                timestamp INTEGER NOT NULL
            )",
            [],
        )?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS derived_assets (
                id TEXT PRIMARY KEY,
                source_contract TEXT,
                source_class TEXT,
                contract_nonce TEXT,
                supply TEXT NOT NULL,
                updated_at INTEGER NOT NULL
            )",
            [],
        )?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS erc20_contracts (
                address TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                symbol TEXT NOT NULL,
                decimals INTEGER NOT NULL,
                wrapped_amount TEXT NOT NULL,
                cumulative_fees TEXT NOT NULL,
                recognized INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            )",
            [],
        )?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS user_balances (
                id TEXT PRIMARY KEY,
                user TEXT NOT NULL,
                asset_id TEXT NOT NULL,
                balance TEXT NOT NULL,
                updated_at INTEGER NOT NULL
            )",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_balances_user ON user_balances(user)",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_warnings_kind ON warnings(kind, timestamp)",
            [],
        )?;

        log::info!("SQLite ledger database initialized with WAL mode");

        Ok(Self { conn })
    }
}

#[async_trait]
impl LedgerWriterBackend for SqliteLedgerWriter {
    async fn write_warning(&mut self, warning: &Warning) -> Result<(), ExportError> {
        self.conn.execute(
            "INSERT OR IGNORE INTO warnings (id, kind, description, event, timestamp)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                warning.id,
                warning.kind.as_str(),
                warning.description,
                warning.event,
                warning.timestamp as i64,
            ],
        )?;
        Ok(())
    }

    async fn write_asset(&mut self, row: &AssetSupplyRow) -> Result<(), ExportError> {
        let now = chrono::Utc::now().timestamp();
        self.conn.execute(
            "INSERT INTO derived_assets
                (id, source_contract, source_class, contract_nonce, supply, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(id) DO UPDATE SET
                source_contract = excluded.source_contract,
                source_class = excluded.source_class,
                contract_nonce = excluded.contract_nonce,
                supply = excluded.supply,
                updated_at = excluded.updated_at",
            params![
                row.id,
                row.source_contract,
                row.source_class,
                row.contract_nonce,
                row.supply,
                now,
            ],
        )?;
        Ok(())
    }

    async fn write_contract(&mut self, row: &ContractRow) -> Result<(), ExportError> {
        let now = chrono::Utc::now().timestamp();
        self.conn.execute(
            "INSERT INTO erc20_contracts
                (address, name, symbol, decimals, wrapped_amount, cumulative_fees, recognized, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT(address) DO UPDATE SET
                name = excluded.name,
                symbol = excluded.symbol,
                decimals = excluded.decimals,
                wrapped_amount = excluded.wrapped_amount,
                cumulative_fees = excluded.cumulative_fees,
                recognized = excluded.recognized,
                updated_at = excluded.updated_at",
            params![
                row.address,
                row.name,
                row.symbol,
                row.decimals,
                row.wrapped_amount,
                row.cumulative_fees,
                row.recognized as i64,
                now,
            ],
        )?;
        Ok(())
    }

    async fn write_balance(&mut self, row: &BalanceRow) -> Result<(), ExportError> {
        let now = chrono::Utc::now().timestamp();
        self.conn.execute(
            "INSERT INTO user_balances (id, user, asset_id, balance, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(id) DO UPDATE SET
                balance = excluded.balance,
                updated_at = excluded.updated_at",
            params![row.id, row.user, row.asset_id, row.balance, now],
        )?;
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), ExportError> {
        // rusqlite writes are synchronous; nothing buffered to flush.
        Ok(())
    }

    fn backend_type(&self) -> &'static str {
        "SQLite"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger_core::entities::WarningKind;
    use tempfile::tempdir;

    fn test_warning(id: &str, description: &str) -> Warning {
        Warning {
            id: id.to_string(),
            kind: WarningKind::Supply,
            description: description.to_string(),
            event: "ERC-721 Wrap".to_string(),
            timestamp: 1666000000,
        }
    }

    #[tokio::test]
    async fn test_warning_writes_are_idempotent() {
        let dir = tempdir().unwrap();
        let mut writer = SqliteLedgerWriter::new(dir.path().join("test.db")).unwrap();

        writer
            .write_warning(&test_warning("erc721-wrap-count-0xabc-I-0", "first"))
            .await
            .unwrap();
        writer
            .write_warning(&test_warning("erc721-wrap-count-0xabc-I-0", "second"))
            .await
            .unwrap();

        let count: i64 = writer
            .conn
            .query_row("SELECT COUNT(*) FROM warnings", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);

        let description: String = writer
            .conn
            .query_row("SELECT description FROM warnings", [], |row| row.get(0))
            .unwrap();
        assert_eq!(description, "first");
    }

    #[tokio::test]
    async fn test_asset_rows_upsert() {
        let dir = tempdir().unwrap();
        let mut writer = SqliteLedgerWriter::new(dir.path().join("test.db")).unwrap();

        let mut row = AssetSupplyRow {
            id: "1234".to_string(),
            source_contract: Some("0xtoken".to_string()),
            source_class: Some("ERC-20".to_string()),
            contract_nonce: None,
            supply: "9".to_string(),
        };
        writer.write_asset(&row).await.unwrap();

        row.supply = "1".to_string();
        writer.write_asset(&row).await.unwrap();

        let (count, supply): (i64, String) = writer
            .conn
            .query_row("SELECT COUNT(*), supply FROM derived_assets", [], |r| {
                Ok((r.get(0)?, r.get(1)?))
            })
            .unwrap();
        assert_eq!(count, 1);
        assert_eq!(supply, "1");
    }
}
