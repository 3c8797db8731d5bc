//! Ledger aggregate types
//!
//! Every aggregate is created lazily on first reference with numeric fields
//! zeroed and list fields empty, and lives for the lifetime of the ledger.
//! Transactions and users reference child records by identifier only; the
//! records themselves are owned by the ledger's top-level maps.

use crate::metadata::TokenMetadata;
use num_bigint::BigInt;
use serde::{Deserialize, Serialize};

/// Sentinel for "no event seen yet"; earliest-seen timestamps only ever
/// decrease from here.
pub const TIMESTAMP_UNSET: u64 = u64::MAX;

/// Source class of a derived asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssetClass {
    #[serde(rename = "ERC-20")]
    Erc20,
    #[serde(rename = "ERC-721")]
    Erc721,
    #[serde(rename = "ERC-1155")]
    Erc1155,
    #[serde(rename = "primitive-issued")]
    Primitive,
}

impl AssetClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetClass::Erc20 => "ERC-20",
            AssetClass::Erc721 => "ERC-721",
            AssetClass::Erc1155 => "ERC-1155",
            AssetClass::Primitive => "primitive-issued",
        }
    }
}

/// One vault transaction, grouping the interactions, mints, and burns that
/// happened inside it. The id lists are append-only and ordered by arrival;
/// child identifiers are derived from the list length at fold time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultTransaction {
    pub id: String,
    pub user: String,
    pub timestamp: u64,
    pub block: u64,
    pub interactions: Vec<String>,
    pub mints: Vec<String>,
    pub burns: Vec<String>,
}

impl VaultTransaction {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            user: String::new(),
            timestamp: 0,
            block: 0,
            interactions: Vec::new(),
            mints: Vec::new(),
            burns: Vec::new(),
        }
    }
}

/// A wrap, unwrap, or compute step inside a vault transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interaction {
    pub id: String,
    pub user: String,
    /// External contract or primitive the interaction touched.
    pub external_contract: String,
    pub timestamp: u64,
    pub block: u64,
    pub detail: InteractionDetail,
}

/// Kind-specific payload of an interaction. Derived-asset ids are stored in
/// their decimal string form, matching the ledger's map keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum InteractionDetail {
    #[serde(rename_all = "camelCase")]
    Erc20Wrap {
        asset_id: String,
        #[serde(with = "crate::bigint")]
        transferred_amount: BigInt,
        #[serde(with = "crate::bigint")]
        wrapped_amount: BigInt,
        #[serde(with = "crate::bigint")]
        dust: BigInt,
    },
    #[serde(rename_all = "camelCase")]
    Erc20Unwrap {
        asset_id: String,
        #[serde(with = "crate::bigint")]
        transferred_amount: BigInt,
        #[serde(with = "crate::bigint")]
        unwrapped_amount: BigInt,
        #[serde(with = "crate::bigint")]
        fee_charged: BigInt,
    },
    #[serde(rename_all = "camelCase")]
    Erc721Wrap { asset_id: String },
    #[serde(rename_all = "camelCase")]
    Erc721Unwrap { asset_id: String },
    #[serde(rename_all = "camelCase")]
    Erc1155Wrap {
        asset_id: String,
        #[serde(with = "crate::bigint")]
        wrapped_amount: BigInt,
    },
    #[serde(rename_all = "camelCase")]
    Erc1155Unwrap {
        asset_id: String,
        #[serde(with = "crate::bigint")]
        unwrapped_amount: BigInt,
        #[serde(with = "crate::bigint")]
        fee_charged: BigInt,
    },
    #[serde(rename_all = "camelCase")]
    ComputeInput {
        input_asset: String,
        #[serde(with = "crate::bigint")]
        input_amount: BigInt,
        output_asset: String,
        #[serde(with = "crate::bigint")]
        output_amount: BigInt,
    },
    #[serde(rename_all = "camelCase")]
    ComputeOutput {
        input_asset: String,
        #[serde(with = "crate::bigint")]
        input_amount: BigInt,
        output_asset: String,
        #[serde(with = "crate::bigint")]
        output_amount: BigInt,
    },
}

/// External fungible contract with assets under vault custody.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Erc20Contract {
    pub address: String,
    pub name: String,
    pub symbol: String,
    pub decimals: u32,
    /// Signed running custody balance: wraps add, unwraps subtract. Negative
    /// values are stored as computed and flagged, never clamped.
    #[serde(with = "crate::bigint")]
    pub wrapped_amount: BigInt,
    #[serde(with = "crate::bigint")]
    pub cumulative_fees: BigInt,
    pub recognized: bool,
}

impl Erc20Contract {
    pub fn new(address: impl Into<String>, metadata: TokenMetadata) -> Self {
        Self {
            address: address.into(),
            name: metadata.name,
            symbol: metadata.symbol,
            decimals: metadata.decimals,
            wrapped_amount: BigInt::default(),
            cumulative_fees: BigInt::default(),
            recognized: false,
        }
    }
}

/// External non-fungible contract (ERC-721 or ERC-1155); tracks which
/// derived-asset ids have ever been custodied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NftContract {
    pub address: String,
    pub token_ids: Vec<String>,
    pub recognized: bool,
}

impl NftContract {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            token_ids: Vec::new(),
            recognized: false,
        }
    }

    /// Record a custodied derived asset, once.
    pub fn add_token_id(&mut self, asset_id: &str) {
        if !self.token_ids.iter().any(|id| id == asset_id) {
            self.token_ids.push(asset_id.to_string());
        }
    }
}

/// Per-id custody counter for a wrapped ERC-721 token; 0 or 1 in steady
/// state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Erc721Token {
    pub id: String,
    #[serde(with = "crate::bigint")]
    pub wrapped_supply: BigInt,
}

impl Erc721Token {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            wrapped_supply: BigInt::default(),
        }
    }
}

/// Per-id custody counter for a wrapped ERC-1155 token; moves by arbitrary
/// non-negative amounts per event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Erc1155Token {
    pub id: String,
    #[serde(with = "crate::bigint")]
    pub wrapped_supply: BigInt,
    #[serde(with = "crate::bigint")]
    pub cumulative_fees: BigInt,
}

impl Erc1155Token {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            wrapped_supply: BigInt::default(),
            cumulative_fees: BigInt::default(),
        }
    }
}

/// The vault's internal fungible unit representing custody of an external
/// asset or a primitive-registered asset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DerivedAsset {
    pub id: String,
    pub source_contract: Option<String>,
    pub source_class: Option<AssetClass>,
    #[serde(with = "crate::bigint::option")]
    pub contract_nonce: Option<BigInt>,
    /// Signed sum of all mint/burn deltas ever applied.
    #[serde(with = "crate::bigint")]
    pub supply: BigInt,
}

impl DerivedAsset {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source_contract: None,
            source_class: None,
            contract_nonce: None,
            supply: BigInt::default(),
        }
    }
}

/// Primitive-issued asset; its supply is re-derived from compute-interaction
/// deltas, independent of the derived asset's mint/burn bookkeeping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisteredAsset {
    pub id: String,
    pub issuer: String,
    pub created_timestamp: u64,
    #[serde(with = "crate::bigint")]
    pub supply: BigInt,
}

impl RegisteredAsset {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            issuer: String::new(),
            created_timestamp: 0,
            supply: BigInt::default(),
        }
    }
}

/// Per-address activity record. Child records are referenced by id only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub address: String,
    pub created_timestamp: u64,
    pub erc20_wraps: Vec<String>,
    pub erc20_unwraps: Vec<String>,
    pub erc721_wraps: Vec<String>,
    pub erc721_unwraps: Vec<String>,
    pub erc1155_wraps: Vec<String>,
    pub erc1155_unwraps: Vec<String>,
    pub compute_inputs: Vec<String>,
    pub compute_outputs: Vec<String>,
    pub transfers: Vec<String>,
    pub balances: Vec<String>,
}

impl User {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            created_timestamp: TIMESTAMP_UNSET,
            erc20_wraps: Vec::new(),
            erc20_unwraps: Vec::new(),
            erc721_wraps: Vec::new(),
            erc721_unwraps: Vec::new(),
            erc1155_wraps: Vec::new(),
            erc1155_unwraps: Vec::new(),
            compute_inputs: Vec::new(),
            compute_outputs: Vec::new(),
            transfers: Vec::new(),
            balances: Vec::new(),
        }
    }

    /// Lower the earliest-seen timestamp; it never increases once set.
    pub fn observe_timestamp(&mut self, timestamp: u64) {
        if timestamp < self.created_timestamp {
            self.created_timestamp = timestamp;
        }
    }

    /// Reference a balance record, once.
    pub fn add_balance_ref(&mut self, balance_id: &str) {
        if !self.balances.iter().any(|id| id == balance_id) {
            self.balances.push(balance_id.to_string());
        }
    }
}

/// Signed running balance for one (user, derived asset) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserBalance {
    pub id: String,
    pub user: String,
    pub asset_id: String,
    #[serde(with = "crate::bigint")]
    pub balance: BigInt,
}

impl UserBalance {
    pub fn new(id: impl Into<String>, user: impl Into<String>, asset_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            user: user.into(),
            asset_id: asset_id.into(),
            balance: BigInt::default(),
        }
    }
}

/// Compute/registration actor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Primitive {
    pub address: String,
    pub recognized: bool,
    /// Users seen interacting, in arrival order (duplicates preserved).
    pub users: Vec<String>,
    pub registered_assets: Vec<String>,
    pub created_timestamp: u64,
}

impl Primitive {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            recognized: false,
            users: Vec::new(),
            registered_assets: Vec::new(),
            created_timestamp: TIMESTAMP_UNSET,
        }
    }

    pub fn observe_timestamp(&mut self, timestamp: u64) {
        if timestamp < self.created_timestamp {
            self.created_timestamp = timestamp;
        }
    }
}

/// One token-registration batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetRegistry {
    pub id: String,
    pub creator: String,
    pub tokens: Vec<String>,
    pub timestamp: u64,
    pub block: u64,
}

impl AssetRegistry {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            creator: String::new(),
            tokens: Vec::new(),
            timestamp: 0,
            block: 0,
        }
    }
}

/// Supply entering circulation: a transfer whose `from` is the zero address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mint {
    pub id: String,
    pub to: String,
    pub from: String,
    pub asset_id: String,
    #[serde(with = "crate::bigint")]
    pub amount: BigInt,
}

/// Supply leaving circulation: a transfer whose `to` is the zero address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Burn {
    pub id: String,
    pub to: String,
    pub from: String,
    pub asset_id: String,
    #[serde(with = "crate::bigint")]
    pub amount: BigInt,
}

/// Peer-to-peer transfer of a derived asset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserTransfer {
    pub id: String,
    pub from: String,
    pub to: String,
    pub asset_id: String,
    #[serde(with = "crate::bigint")]
    pub amount: BigInt,
    pub timestamp: u64,
    pub block: u64,
}

/// Forwarder identity attached to a vault transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForwarderRecord {
    pub id: String,
    pub forwarder: String,
    pub transaction: String,
}

/// One fee-change event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeeChange {
    pub id: String,
    #[serde(with = "crate::bigint")]
    pub fee_amount: BigInt,
    pub owner: String,
    pub timestamp: u64,
    pub block: u64,
}

/// Rolling fee singleton: the current fee-change id plus the append-only
/// history of every change (the current id included).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeeState {
    pub current: Option<String>,
    pub previous: Vec<String>,
}

/// Category tag of a detected anomaly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WarningKind {
    Supply,
    NegativeSupply,
    UnrecognizedContract,
    Misalignment,
}

impl WarningKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            WarningKind::Supply => "supply",
            WarningKind::NegativeSupply => "negative-supply",
            WarningKind::UnrecognizedContract => "unrecognized-contract",
            WarningKind::Misalignment => "misalignment",
        }
    }
}

/// Immutable record of an invariant violation. The id is deterministic from
/// (check kind, triggering record), so re-evaluating the same record never
/// duplicates the warning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warning {
    pub id: String,
    pub kind: WarningKind,
    pub description: String,
    /// Human label of the event kind that triggered the check.
    pub event: String,
    pub timestamp: u64,
}
