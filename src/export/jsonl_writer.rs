//! JSONL backend - appends ledger rows to per-kind JSONL files

use super::writer_backend::{
    AssetSupplyRow, BalanceRow, ContractRow, ExportError, LedgerWriterBackend,
};
use crate::ledger_core::entities::Warning;
use async_trait::async_trait;
use serde::Serialize;
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

pub struct JsonlLedgerWriter {
    warnings: BufWriter<std::fs::File>,
    assets: BufWriter<std::fs::File>,
    contracts: BufWriter<std::fs::File>,
    balances: BufWriter<std::fs::File>,
}

impl JsonlLedgerWriter {
    pub fn new(base_path: PathBuf) -> std::io::Result<Self> {
        std::fs::create_dir_all(&base_path)?;

        let open = |name: &str| -> std::io::Result<BufWriter<std::fs::File>> {
            let file_path = base_path.join(format!("{}.jsonl", name));
            let file = OpenOptions::new().create(true).append(true).open(&file_path)?;
            log::info!("Writing {} rows to: {}", name, file_path.display());
            Ok(BufWriter::new(file))
        };

        Ok(Self {
            warnings: open("warnings")?,
            assets: open("assets")?,
            contracts: open("contracts")?,
            balances: open("balances")?,
        })
    }

    fn write_line<T: Serialize>(
        writer: &mut BufWriter<std::fs::File>,
        value: &T,
    ) -> Result<(), ExportError> {
        let json = serde_json::to_string(value)?;
        writeln!(writer, "{}", json)?;
        Ok(())
    }

    fn flush_all(&mut self) -> std::io::Result<()> {
        self.warnings.flush()?;
        self.assets.flush()?;
        self.contracts.flush()?;
        self.balances.flush()?;
        Ok(())
    }
}

impl Drop for JsonlLedgerWriter {
    fn drop(&mut self) {
        let _ = self.flush_all();
    }
}

#[async_trait]
impl LedgerWriterBackend for JsonlLedgerWriter {
    async fn write_warning(&mut self, warning: &Warning) -> Result<(), ExportError> {
        Self::write_line(&mut self.warnings, warning)
    }

    async fn write_asset(&mut self, row: &AssetSupplyRow) -> Result<(), ExportError> {
        Self::write_line(&mut self.assets, row)
    }

    async fn write_contract(&mut self, row: &ContractRow) -> Result<(), ExportError> {
        Self::write_line(&mut self.contracts, row)
    }

    async fn write_balance(&mut self, row: &BalanceRow) -> Result<(), ExportError> {
        Self::write_line(&mut self.balances, row)
    }

    async fn flush(&mut self) -> Result<(), ExportError> {
        self.flush_all()?;
        Ok(())
    }

    fn backend_type(&self) -> &'static str {
        "JSONL"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger_core::entities::WarningKind;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_jsonl_writer_appends_lines() {
        let dir = tempdir().unwrap();
        let mut writer = JsonlLedgerWriter::new(dir.path().to_path_buf()).unwrap();

        let warning = Warning {
            id: "derived-asset-negative-supply-0xabc-B-0".to_string(),
            kind: WarningKind::NegativeSupply,
            description: "supply went negative".to_string(),
            event: "Transfer Single".to_string(),
            timestamp: 1666000000,
        };
        writer.write_warning(&warning).await.unwrap();
        writer
            .write_balance(&BalanceRow {
                id: "0xalice-1234".to_string(),
                user: "0xalice".to_string(),
                asset_id: "1234".to_string(),
                balance: "-3".to_string(),
            })
            .await
            .unwrap();
        writer.flush().await.unwrap();

        let warnings = std::fs::read_to_string(dir.path().join("warnings.jsonl")).unwrap();
        assert_eq!(warnings.lines().count(), 1);
        assert!(warnings.contains("negative-supply"));

        let balances = std::fs::read_to_string(dir.path().join("balances.jsonl")).unwrap();
        assert!(balances.contains("\"balance\":\"-3\""));
    }
}
