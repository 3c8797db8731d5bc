//! vaultflow - materialized ledger derivation for a multi-asset custody vault
//!
//! Consumes the ordered event stream emitted by an on-chain custody vault
//! (wraps, unwraps, mints, burns, transfers, compute interactions, fee
//! changes, token registrations) and folds it into an off-chain ledger:
//! per-asset supply, per-user balances, per-external-contract holdings, and
//! an append-only catalogue of structural anomaly warnings.
//!
//! Anomalies never abort a fold. The ledger mirrors on-chain reality even
//! when that reality is inconsistent; warnings are the error signal.


pub mod bigint;
pub mod config;
pub mod events;
pub mod export;
pub mod ledger_core;
pub mod metadata;
pub mod persistence;

pub use events::VaultEvent;
pub use ledger_core::Ledger;
