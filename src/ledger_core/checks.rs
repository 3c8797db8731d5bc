//! Invariant checks
//!
//! Each check is a pure predicate over one aggregate plus the context needed
//! to build a warning: the triggering record's id (which makes the warning id
//! deterministic) and the event timestamp. Checks run immediately after the
//! mutation they guard and never block or undo it; a failed check yields a
//! [`Warning`] for the caller to record.

use crate::bigint::{is_negative, is_zero};
use crate::ledger_core::entities::{
    DerivedAsset, Erc1155Token, Erc20Contract, Erc721Token, RegisteredAsset, VaultTransaction,
    Warning, WarningKind,
};
use num_bigint::BigInt;

/// What kind of actor an unrecognized-release warning is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseSubject {
    Erc20,
    Erc721,
    Erc1155,
    Primitive,
}

impl ReleaseSubject {
    fn id_prefix(&self) -> &'static str {
        match self {
            ReleaseSubject::Erc20 => "erc20-recognition",
            ReleaseSubject::Erc721 => "erc721-recognition",
            ReleaseSubject::Erc1155 => "erc1155-recognition",
            ReleaseSubject::Primitive => "primitive-recognition",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            ReleaseSubject::Erc20 => "ERC-20",
            ReleaseSubject::Erc721 => "ERC-721",
            ReleaseSubject::Erc1155 => "ERC-1155",
            ReleaseSubject::Primitive => "Primitive",
        }
    }
}

/// ERC-721 custody counter must be exactly 0 before a wrap.
pub fn check_erc721_wrap_count(
    token: &Erc721Token,
    interaction_id: &str,
    timestamp: u64,
) -> Option<Warning> {
    if is_zero(&token.wrapped_supply) {
        return None;
    }
    Some(Warning {
        id: format!("erc721-wrap-count-{}", interaction_id),
        kind: WarningKind::Supply,
        description: format!(
            "ERC-721 token {} custody count is not 0 when being wrapped; the count is {}",
            token.id, token.wrapped_supply
        ),
        event: "ERC-721 Wrap".to_string(),
        timestamp,
    })
}

/// ERC-721 custody counter must be exactly 1 before an unwrap.
pub fn check_erc721_unwrap_count(
    token: &Erc721Token,
    interaction_id: &str,
    timestamp: u64,
) -> Option<Warning> {
    if token.wrapped_supply == BigInt::from(1) {
        return None;
    }
    Some(Warning {
        id: format!("erc721-unwrap-count-{}", interaction_id),
        kind: WarningKind::Supply,
        description: format!(
            "ERC-721 token {} custody count is not 1 when being unwrapped; the count is {}",
            token.id, token.wrapped_supply
        ),
        event: "ERC-721 Unwrap".to_string(),
        timestamp,
    })
}

/// An ERC-1155 unwrap against a counter that is already 0 releases custody
/// that was never established.
pub fn check_erc1155_unwrap_count(
    token: &Erc1155Token,
    interaction_id: &str,
    timestamp: u64,
) -> Option<Warning> {
    if !is_zero(&token.wrapped_supply) {
        return None;
    }
    Some(Warning {
        id: format!("erc1155-unwrap-count-{}", interaction_id),
        kind: WarningKind::Supply,
        description: format!(
            "ERC-1155 token {} custody count is 0 when being unwrapped",
            token.id
        ),
        event: "ERC-1155 Unwrap".to_string(),
        timestamp,
    })
}

/// A fungible contract's running wrapped amount went negative.
pub fn check_erc20_negative_wrapped_amount(
    contract: &Erc20Contract,
    interaction_id: &str,
    timestamp: u64,
) -> Option<Warning> {
    if !is_negative(&contract.wrapped_amount) {
        return None;
    }
    Some(Warning {
        id: format!("erc20-negative-wrapped-amount-{}", interaction_id),
        kind: WarningKind::NegativeSupply,
        description: format!(
            "the interaction produced a negative wrapped amount of {} for the ERC-20 contract {}",
            contract.wrapped_amount, contract.address
        ),
        event: "ERC-20 Unwrap".to_string(),
        timestamp,
    })
}

/// An ERC-721 custody counter went negative.
pub fn check_erc721_negative_supply(
    token: &Erc721Token,
    interaction_id: &str,
    timestamp: u64,
) -> Option<Warning> {
    if !is_negative(&token.wrapped_supply) {
        return None;
    }
    Some(Warning {
        id: format!("erc721-negative-supply-{}", interaction_id),
        kind: WarningKind::NegativeSupply,
        description: format!(
            "the interaction produced a negative custody count for the ERC-721 token {}",
            token.id
        ),
        event: "ERC-721 Unwrap".to_string(),
        timestamp,
    })
}

/// An ERC-1155 custody counter went negative.
pub fn check_erc1155_negative_supply(
    token: &Erc1155Token,
    interaction_id: &str,
    timestamp: u64,
) -> Option<Warning> {
    if !is_negative(&token.wrapped_supply) {
        return None;
    }
    Some(Warning {
        id: format!("erc1155-negative-supply-{}", interaction_id),
        kind: WarningKind::NegativeSupply,
        description: format!(
            "the interaction produced a negative custody count for the ERC-1155 token {}",
            token.id
        ),
        event: "ERC-1155 Unwrap".to_string(),
        timestamp,
    })
}

/// A registered asset's independently tracked supply went negative.
pub fn check_registered_asset_supply(
    asset: &RegisteredAsset,
    interaction_id: &str,
    event_label: &str,
    timestamp: u64,
) -> Option<Warning> {
    if !is_negative(&asset.supply) {
        return None;
    }
    Some(Warning {
        id: format!("registered-asset-negative-supply-{}", interaction_id),
        kind: WarningKind::NegativeSupply,
        description: format!(
            "the interaction produced a negative supply of {} for the registered asset {}",
            asset.supply, asset.id
        ),
        event: event_label.to_string(),
        timestamp,
    })
}

/// A derived asset's mint/burn supply went negative.
pub fn check_derived_asset_supply(
    asset: &DerivedAsset,
    record_id: &str,
    event_label: &str,
    timestamp: u64,
) -> Option<Warning> {
    if !is_negative(&asset.supply) {
        return None;
    }
    Some(Warning {
        id: format!("derived-asset-negative-supply-{}", record_id),
        kind: WarningKind::NegativeSupply,
        description: format!(
            "the transfer produced a negative supply of {} for the derived asset {}",
            asset.supply, asset.id
        ),
        event: event_label.to_string(),
        timestamp,
    })
}

/// A custody release arrived for a contract or primitive that was never
/// recognized.
pub fn unrecognized_release_warning(
    subject: ReleaseSubject,
    address: &str,
    interaction_id: &str,
    timestamp: u64,
) -> Warning {
    Warning {
        id: format!("{}-{}", subject.id_prefix(), interaction_id),
        kind: WarningKind::UnrecognizedContract,
        description: format!(
            "the interaction is unwrapping the {} contract {} before it has been recognized",
            subject.label(),
            address
        ),
        event: format!("{} Unwrap", subject.label()),
        timestamp,
    }
}

/// The transfer event's reported operator must be the transaction's acting
/// user.
pub fn check_operator_alignment(
    tx: &VaultTransaction,
    operator: &str,
    event_label: &str,
    log_index: u64,
) -> Option<Warning> {
    if tx.user == operator {
        return None;
    }
    Some(Warning {
        id: format!("operator-user-misalignment-{}-{}", tx.id, log_index),
        kind: WarningKind::Misalignment,
        description: format!(
            "the operator {} and the user {} are not the same in the transfer event",
            operator, tx.user
        ),
        event: event_label.to_string(),
        timestamp: tx.timestamp,
    })
}

/// The forwarder event's reported forwarder must be the transaction's acting
/// user.
pub fn check_forwarder_alignment(
    tx: &VaultTransaction,
    forwarder: &str,
    log_index: u64,
) -> Option<Warning> {
    if tx.user == forwarder {
        return None;
    }
    Some(Warning {
        id: format!("forwarder-user-misalignment-{}-{}", tx.id, log_index),
        kind: WarningKind::Misalignment,
        description: format!(
            "the forwarder {} and the user {} are not the same in the forwarded transaction",
            forwarder, tx.user
        ),
        event: "Forwarder Interaction".to_string(),
        timestamp: tx.timestamp,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::TokenMetadata;

    fn erc721_token(count: i64) -> Erc721Token {
        let mut token = Erc721Token::new("1234");
        token.wrapped_supply = BigInt::from(count);
        token
    }

    fn erc1155_token(count: i64) -> Erc1155Token {
        let mut token = Erc1155Token::new("1234");
        token.wrapped_supply = BigInt::from(count);
        token
    }

    #[test]
    fn test_erc721_wrap_count_passes_at_zero() {
        assert!(check_erc721_wrap_count(&erc721_token(0), "0xabc-I-0", 10).is_none());
    }

    #[test]
    fn test_erc721_wrap_count_quotes_actual_value() {
        let warning = check_erc721_wrap_count(&erc721_token(2), "0xabc-I-0", 10).unwrap();
        assert_eq!(warning.id, "erc721-wrap-count-0xabc-I-0");
        assert_eq!(warning.kind, WarningKind::Supply);
        assert!(warning.description.contains("the count is 2"));
    }

    #[test]
    fn test_erc721_unwrap_count_passes_at_one() {
        assert!(check_erc721_unwrap_count(&erc721_token(1), "0xabc-I-0", 10).is_none());
        assert!(check_erc721_unwrap_count(&erc721_token(0), "0xabc-I-0", 10).is_some());
    }

    #[test]
    fn test_erc1155_unwrap_count_fires_only_at_zero() {
        assert!(check_erc1155_unwrap_count(&erc1155_token(0), "0xabc-I-0", 10).is_some());
        assert!(check_erc1155_unwrap_count(&erc1155_token(5), "0xabc-I-0", 10).is_none());
    }

    #[test]
    fn test_negative_wrapped_amount() {
        let mut contract = Erc20Contract::new("0xtoken", TokenMetadata::unknown());
        contract.wrapped_amount = BigInt::from(-8);
        let warning =
            check_erc20_negative_wrapped_amount(&contract, "0xabc-I-0", 10).unwrap();
        assert_eq!(warning.kind, WarningKind::NegativeSupply);
        assert!(warning.description.contains("-8"));

        contract.wrapped_amount = BigInt::from(0);
        assert!(check_erc20_negative_wrapped_amount(&contract, "0xabc-I-0", 10).is_none());
    }

    #[test]
    fn test_derived_asset_supply_check_references_record() {
        let mut asset = DerivedAsset::new("1234");
        asset.supply = BigInt::from(-3);
        let warning =
            check_derived_asset_supply(&asset, "0xabc-B-0", "Transfer Single", 10).unwrap();
        assert_eq!(warning.id, "derived-asset-negative-supply-0xabc-B-0");
        assert_eq!(warning.event, "Transfer Single");
    }

    #[test]
    fn test_registered_asset_supply_check() {
        let mut asset = RegisteredAsset::new("77");
        asset.supply = BigInt::from(-5);
        let warning =
            check_registered_asset_supply(&asset, "0xabc-I-0", "Compute Input Amount", 10)
                .unwrap();
        assert_eq!(warning.event, "Compute Input Amount");
        assert!(warning.description.contains("-5"));
    }

    #[test]
    fn test_operator_alignment() {
        let mut tx = VaultTransaction::new("0xabc");
        tx.user = "0xalice".to_string();
        tx.timestamp = 42;

        assert!(check_operator_alignment(&tx, "0xalice", "Transfer Single", 0).is_none());

        let warning = check_operator_alignment(&tx, "0xmallory", "Transfer Single", 3).unwrap();
        assert_eq!(warning.id, "operator-user-misalignment-0xabc-3");
        assert_eq!(warning.kind, WarningKind::Misalignment);
        assert_eq!(warning.timestamp, 42);
    }

    #[test]
    fn test_forwarder_alignment() {
        let mut tx = VaultTransaction::new("0xabc");
        tx.user = "0xalice".to_string();
        assert!(check_forwarder_alignment(&tx, "0xalice", 0).is_none());
        let warning = check_forwarder_alignment(&tx, "0xrelay", 1).unwrap();
        assert_eq!(warning.id, "forwarder-user-misalignment-0xabc-1");
    }

    #[test]
    fn test_unrecognized_release_warning_ids_per_subject() {
        let w20 = unrecognized_release_warning(ReleaseSubject::Erc20, "0xtoken", "0xabc-I-0", 9);
        let w721 = unrecognized_release_warning(ReleaseSubject::Erc721, "0xtoken", "0xabc-I-0", 9);
        assert_eq!(w20.id, "erc20-recognition-0xabc-I-0");
        assert_eq!(w721.id, "erc721-recognition-0xabc-I-0");
        assert_eq!(w20.kind, WarningKind::UnrecognizedContract);
        assert_eq!(w20.event, "ERC-20 Unwrap");
    }
}
