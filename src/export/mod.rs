//! Export backends for the derived ledger
//!
//! Publishes the materialized ledger to downstream consumers: warnings are
//! append-only and idempotent on their deterministic ids, aggregate rows are
//! upserted. Two backends, selectable at the binary seam: line-delimited
//! JSON files and SQLite.

pub mod jsonl_writer;
pub mod sqlite_writer;
pub mod writer;
pub mod writer_backend;

pub use jsonl_writer::JsonlLedgerWriter;
pub use sqlite_writer::SqliteLedgerWriter;
pub use writer::{BackendType, LedgerWriter};
pub use writer_backend::{
    AssetSupplyRow, BalanceRow, ContractRow, ExportError, LedgerWriterBackend,
};
