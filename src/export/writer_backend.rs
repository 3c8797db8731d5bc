//! Writer backend trait for the derived ledger
//!
//! Defines the interface for publishing the materialized ledger (warnings
//! plus aggregate rows) to different backends.

use crate::ledger_core::entities::{DerivedAsset, Erc20Contract, UserBalance, Warning};
use async_trait::async_trait;
use serde::Serialize;

#[derive(Debug)]
pub enum ExportError {
    Io(std::io::Error),
    Serialization(serde_json::Error),
    Database(String),
}

impl From<std::io::Error> for ExportError {
    fn from(err: std::io::Error) -> Self {
        ExportError::Io(err)
    }
}

impl From<serde_json::Error> for ExportError {
    fn from(err: serde_json::Error) -> Self {
        ExportError::Serialization(err)
    }
}

impl From<rusqlite::Error> for ExportError {
    fn from(err: rusqlite::Error) -> Self {
        ExportError::Database(err.to_string())
    }
}

impl std::fmt::Display for ExportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportError::Io(e) => write!(f, "IO error: {}", e),
            ExportError::Serialization(e) => write!(f, "Serialization error: {}", e),
            ExportError::Database(e) => write!(f, "Database error: {}", e),
        }
    }
}

impl std::error::Error for ExportError {}

/// Flattened supply row for one derived asset.
#[derive(Debug, Serialize)]
pub struct AssetSupplyRow {
    pub id: String,
    pub source_contract: Option<String>,
    pub source_class: Option<String>,
    pub contract_nonce: Option<String>,
    pub supply: String,
}

impl From<&DerivedAsset> for AssetSupplyRow {
    fn from(asset: &DerivedAsset) -> Self {
        Self {
            id: asset.id.clone(),
            source_contract: asset.source_contract.clone(),
            source_class: asset.source_class.map(|c| c.as_str().to_string()),
            contract_nonce: asset.contract_nonce.as_ref().map(|n| n.to_string()),
            supply: asset.supply.to_string(),
        }
    }
}

/// Flattened holdings row for one external fungible contract.
#[derive(Debug, Serialize)]
pub struct ContractRow {
    pub address: String,
    pub name: String,
    pub symbol: String,
    pub decimals: u32,
    pub wrapped_amount: String,
    pub cumulative_fees: String,
    pub recognized: bool,
}

impl From<&Erc20Contract> for ContractRow {
    fn from(contract: &Erc20Contract) -> Self {
        Self {
            address: contract.address.clone(),
            name: contract.name.clone(),
            symbol: contract.symbol.clone(),
            decimals: contract.decimals,
            wrapped_amount: contract.wrapped_amount.to_string(),
            cumulative_fees: contract.cumulative_fees.to_string(),
            recognized: contract.recognized,
        }
    }
}

/// Flattened balance row for one (user, asset) pair.
#[derive(Debug, Serialize)]
pub struct BalanceRow {
    pub id: String,
    pub user: String,
    pub asset_id: String,
    pub balance: String,
}

impl From<&UserBalance> for BalanceRow {
    fn from(balance: &UserBalance) -> Self {
        Self {
            id: balance.id.clone(),
            user: balance.user.clone(),
            asset_id: balance.asset_id.clone(),
            balance: balance.balance.to_string(),
        }
    }
}

/// Backend trait for publishing the derived ledger
#[async_trait]
pub trait LedgerWriterBackend: Send {
    /// Publish a warning; warnings are append-only and idempotent on id.
    async fn write_warning(&mut self, warning: &Warning) -> Result<(), ExportError>;

    /// Publish (upsert) one derived-asset supply row.
    async fn write_asset(&mut self, row: &AssetSupplyRow) -> Result<(), ExportError>;

    /// Publish (upsert) one external-contract holdings row.
    async fn write_contract(&mut self, row: &ContractRow) -> Result<(), ExportError>;

    /// Publish (upsert) one user-balance row.
    async fn write_balance(&mut self, row: &BalanceRow) -> Result<(), ExportError>;

    /// Flush pending writes to storage
    async fn flush(&mut self) -> Result<(), ExportError>;

    /// Get backend type for logging
    fn backend_type(&self) -> &'static str;
}
