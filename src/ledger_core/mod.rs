//! Ledger Core - Event-Sourced Derivation Engine
//!
//! Folds the vault's ordered event stream into the materialized ledger and
//! evaluates domain invariants after every fold step.
//!
//! # Architecture
//!
//! ```text
//! JSONL event stream → VaultEvent (events module)
//!     ↓
//! Ledger::apply (fold, one procedure per event kind)
//!     ↓
//! LedgerState (get-or-create aggregate store, id allocation)
//!     ↓
//! checks + recognition (pure invariant evaluation)
//!     ↓
//! Warning catalogue (append-only, deterministic ids)
//! ```
//!
//! Folding is strictly single-threaded: each event is folded to completion,
//! in stream order, before the next is considered. Anomalies record warnings
//! and never abort or roll back a fold.

pub mod checks;
pub mod entities;
pub mod fold;
pub mod ids;
pub mod recognition;
pub mod store;

pub use entities::{
    AssetClass, AssetRegistry, Burn, DerivedAsset, Erc1155Token, Erc20Contract, Erc721Token,
    FeeChange, FeeState, ForwarderRecord, Interaction, InteractionDetail, Mint, NftContract,
    Primitive, RegisteredAsset, User, UserBalance, UserTransfer, VaultTransaction, Warning,
    WarningKind, TIMESTAMP_UNSET,
};
pub use recognition::{RecognitionOutcome, RecognitionTrigger};
pub use store::{Ledger, LedgerState};
