//! Aggregate store
//!
//! [`LedgerState`] owns every derived record, keyed by the identifier scheme
//! in [`super::ids`]. All accessors are get-or-create: a miss constructs the
//! record with numeric fields zeroed and list fields empty, so a subsequent
//! read in the same fold observes it. Writes are independent and in fixed
//! order per fold; a later invariant failure never rolls an earlier write
//! back.
//!
//! Folding is single-threaded, so the length-read-then-append identifier
//! allocation in `next_*_id` is never raced.

use crate::ledger_core::entities::*;
use crate::ledger_core::ids;
use crate::metadata::{MetadataSource, UnknownMetadata};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The materialized ledger: every aggregate map plus the fee singleton and
/// the warning catalogue.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct LedgerState {
    pub transactions: HashMap<String, VaultTransaction>,
    pub interactions: HashMap<String, Interaction>,
    pub users: HashMap<String, User>,
    pub erc20_contracts: HashMap<String, Erc20Contract>,
    pub erc721_contracts: HashMap<String, NftContract>,
    pub erc1155_contracts: HashMap<String, NftContract>,
    pub erc721_tokens: HashMap<String, Erc721Token>,
    pub erc1155_tokens: HashMap<String, Erc1155Token>,
    pub derived_assets: HashMap<String, DerivedAsset>,
    pub registered_assets: HashMap<String, RegisteredAsset>,
    pub primitives: HashMap<String, Primitive>,
    pub registries: HashMap<String, AssetRegistry>,
    pub mints: HashMap<String, Mint>,
    pub burns: HashMap<String, Burn>,
    pub user_transfers: HashMap<String, UserTransfer>,
    pub balances: HashMap<String, UserBalance>,
    pub forwarder_records: HashMap<String, ForwarderRecord>,
    pub fee_changes: HashMap<String, FeeChange>,
    pub fee_state: FeeState,
    pub warnings: HashMap<String, Warning>,
}

impl LedgerState {
    pub fn transaction_mut(&mut self, tx_hash: &str) -> &mut VaultTransaction {
        self.transactions
            .entry(tx_hash.to_string())
            .or_insert_with(|| VaultTransaction::new(tx_hash))
    }

    pub fn user_mut(&mut self, address: &str) -> &mut User {
        self.users
            .entry(address.to_string())
            .or_insert_with(|| User::new(address))
    }

    pub fn erc721_contract_mut(&mut self, address: &str) -> &mut NftContract {
        self.erc721_contracts
            .entry(address.to_string())
            .or_insert_with(|| NftContract::new(address))
    }

    pub fn erc1155_contract_mut(&mut self, address: &str) -> &mut NftContract {
        self.erc1155_contracts
            .entry(address.to_string())
            .or_insert_with(|| NftContract::new(address))
    }

    pub fn erc721_token_mut(&mut self, asset_id: &str) -> &mut Erc721Token {
        self.erc721_tokens
            .entry(asset_id.to_string())
            .or_insert_with(|| Erc721Token::new(asset_id))
    }

    pub fn erc1155_token_mut(&mut self, asset_id: &str) -> &mut Erc1155Token {
        self.erc1155_tokens
            .entry(asset_id.to_string())
            .or_insert_with(|| Erc1155Token::new(asset_id))
    }

    pub fn derived_asset_mut(&mut self, asset_id: &str) -> &mut DerivedAsset {
        self.derived_assets
            .entry(asset_id.to_string())
            .or_insert_with(|| DerivedAsset::new(asset_id))
    }

    pub fn registered_asset_mut(&mut self, asset_id: &str) -> &mut RegisteredAsset {
        self.registered_assets
            .entry(asset_id.to_string())
            .or_insert_with(|| RegisteredAsset::new(asset_id))
    }

    pub fn primitive_mut(&mut self, address: &str) -> &mut Primitive {
        self.primitives
            .entry(address.to_string())
            .or_insert_with(|| Primitive::new(address))
    }

    pub fn balance_mut(&mut self, user: &str, asset_id: &str) -> &mut UserBalance {
        let id = ids::balance_id(user, asset_id);
        self.balances
            .entry(id.clone())
            .or_insert_with(|| UserBalance::new(id, user, asset_id))
    }

    /// Allocate the next interaction id for a transaction and append it to
    /// the interaction list in the same step.
    pub fn next_interaction_id(&mut self, tx_hash: &str) -> String {
        let tx = self.transaction_mut(tx_hash);
        let id = ids::interaction_id(tx_hash, tx.interactions.len());
        tx.interactions.push(id.clone());
        id
    }

    /// Allocate the next mint id for a transaction.
    pub fn next_mint_id(&mut self, tx_hash: &str) -> String {
        let tx = self.transaction_mut(tx_hash);
        let id = ids::mint_id(tx_hash, tx.mints.len());
        tx.mints.push(id.clone());
        id
    }

    /// Allocate the next burn id for a transaction.
    pub fn next_burn_id(&mut self, tx_hash: &str) -> String {
        let tx = self.transaction_mut(tx_hash);
        let id = ids::burn_id(tx_hash, tx.burns.len());
        tx.burns.push(id.clone());
        id
    }

    /// Record a warning unless one with the same id already exists, and
    /// mirror it as a log line. Warnings are append-only and never mutated.
    pub fn record_warning(&mut self, warning: Warning) {
        if self.warnings.contains_key(&warning.id) {
            return;
        }
        log::warn!("[{}] {}", warning.event, warning.description);
        self.warnings.insert(warning.id.clone(), warning);
    }
}

/// The fold engine: ledger state plus the collaborators the folds need.
pub struct Ledger {
    /// Only events emitted by this contract are folded (forwarder events
    /// excepted; they come from the forwarder itself).
    pub vault_address: String,
    pub state: LedgerState,
    metadata: Box<dyn MetadataSource>,
}

impl Ledger {
    /// Ledger with offline metadata (name/symbol "unknown", decimals 0).
    pub fn new(vault_address: impl Into<String>) -> Self {
        Self::with_metadata(vault_address, Box::new(UnknownMetadata))
    }

    pub fn with_metadata(
        vault_address: impl Into<String>,
        metadata: Box<dyn MetadataSource>,
    ) -> Self {
        Self {
            vault_address: vault_address.into().to_lowercase(),
            state: LedgerState::default(),
            metadata,
        }
    }

    pub fn is_vault(&self, address: &str) -> bool {
        address.eq_ignore_ascii_case(&self.vault_address)
    }

    /// Get-or-create an ERC-20 contract record; the first materialization
    /// performs the metadata side-lookup.
    pub fn erc20_contract_mut(&mut self, address: &str) -> &mut Erc20Contract {
        let Ledger {
            state, metadata, ..
        } = self;
        state
            .erc20_contracts
            .entry(address.to_string())
            .or_insert_with(|| Erc20Contract::new(address, metadata.lookup(address)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigInt;

    #[test]
    fn test_get_or_create_defaults() {
        let mut state = LedgerState::default();
        let user = state.user_mut("0xalice");
        assert_eq!(user.created_timestamp, TIMESTAMP_UNSET);
        assert!(user.erc20_wraps.is_empty());

        let asset = state.derived_asset_mut("1234");
        assert_eq!(asset.supply, BigInt::from(0));
        assert!(asset.source_class.is_none());
    }

    #[test]
    fn test_same_key_returns_same_record() {
        let mut state = LedgerState::default();
        state.user_mut("0xalice").erc20_wraps.push("a".to_string());
        assert_eq!(state.user_mut("0xalice").erc20_wraps.len(), 1);
        assert_eq!(state.users.len(), 1);
    }

    #[test]
    fn test_child_id_allocation_tracks_list_length() {
        let mut state = LedgerState::default();
        assert_eq!(state.next_interaction_id("0xabc"), "0xabc-I-0");
        assert_eq!(state.next_interaction_id("0xabc"), "0xabc-I-1");
        assert_eq!(state.next_mint_id("0xabc"), "0xabc-M-0");
        assert_eq!(state.next_burn_id("0xabc"), "0xabc-B-0");
        assert_eq!(state.next_burn_id("0xabc"), "0xabc-B-1");

        let tx = &state.transactions["0xabc"];
        assert_eq!(tx.interactions, vec!["0xabc-I-0", "0xabc-I-1"]);
        assert_eq!(tx.burns, vec!["0xabc-B-0", "0xabc-B-1"]);
    }

    #[test]
    fn test_record_warning_is_idempotent() {
        let mut state = LedgerState::default();
        let warning = Warning {
            id: "erc721-wrap-count-0xabc-I-0".to_string(),
            kind: WarningKind::Supply,
            description: "first".to_string(),
            event: "ERC-721 Wrap".to_string(),
            timestamp: 1,
        };
        state.record_warning(warning.clone());

        let mut replay = warning.clone();
        replay.description = "second".to_string();
        state.record_warning(replay);

        assert_eq!(state.warnings.len(), 1);
        assert_eq!(
            state.warnings["erc721-wrap-count-0xabc-I-0"].description,
            "first"
        );
    }

    #[test]
    fn test_erc20_contract_created_with_fallback_metadata() {
        let mut ledger = Ledger::new("0xvault");
        let contract = ledger.erc20_contract_mut("0xtoken");
        assert_eq!(contract.name, "unknown");
        assert_eq!(contract.symbol, "unknown");
        assert_eq!(contract.decimals, 0);
        assert!(!contract.recognized);
    }

    #[test]
    fn test_vault_address_matching_ignores_case() {
        let ledger = Ledger::new("0xC95DAf083b754210458e62EaD997453F74F47072");
        assert!(ledger.is_vault("0xc95daf083b754210458e62ead997453f74f47072"));
        assert!(!ledger.is_vault("0x0000000000000000000000000000000000000001"));
    }
}
