//! Vault event stream model
//!
//! One payload struct per event kind emitted by the custody vault, plus the
//! per-log metadata every event carries. Events arrive as JSONL, one event
//! per line, already in chain causal order (block, then transaction, then log
//! index). The field names and types here are the input contract; downstream
//! consumers of the derived ledger depend on them staying stable.
//!
//! Quantity fields are decimal-string encoded big integers (see
//! [`crate::bigint`]); addresses are hex strings, normalized to lowercase at
//! fold time.

use num_bigint::BigInt;
use serde::{Deserialize, Serialize};

/// Per-log envelope shared by every event kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventMeta {
    /// Contract that emitted the log.
    pub emitter: String,
    pub tx_hash: String,
    pub log_index: u64,
    pub block: u64,
    pub timestamp: u64,
}

/// One event from the vault's log stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultEvent {
    #[serde(flatten)]
    pub meta: EventMeta,
    #[serde(flatten)]
    pub payload: EventPayload,
}

impl VaultEvent {
    /// Parse an event from a JSONL line.
    pub fn from_jsonl(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum EventPayload {
    VaultTransaction(VaultTransactionEvent),
    ChangeUnwrapFee(ChangeUnwrapFeeEvent),
    Erc20Wrap(Erc20WrapEvent),
    Erc20Unwrap(Erc20UnwrapEvent),
    Erc721Wrap(Erc721WrapEvent),
    Erc721Unwrap(Erc721UnwrapEvent),
    Erc1155Wrap(Erc1155WrapEvent),
    Erc1155Unwrap(Erc1155UnwrapEvent),
    ComputeInputAmount(ComputeAmountEvent),
    ComputeOutputAmount(ComputeAmountEvent),
    TokensRegistered(TokensRegisteredEvent),
    TransferSingle(TransferSingleEvent),
    TransferBatch(TransferBatchEvent),
    ForwardedTransaction(ForwardedTransactionEvent),
}

/// Top-level marker carrying the transaction's acting user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultTransactionEvent {
    pub user: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeUnwrapFeeEvent {
    pub sender: String,
    #[serde(with = "crate::bigint")]
    pub new_fee: BigInt,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Erc20WrapEvent {
    /// External ERC-20 contract being wrapped.
    pub token: String,
    #[serde(with = "crate::bigint")]
    pub transferred_amount: BigInt,
    /// Amount credited to custody: transferred minus dust.
    #[serde(with = "crate::bigint")]
    pub wrapped_amount: BigInt,
    #[serde(with = "crate::bigint")]
    pub dust: BigInt,
    pub user: String,
    /// Derived-asset id assigned by the vault.
    #[serde(with = "crate::bigint")]
    pub asset_id: BigInt,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Erc20UnwrapEvent {
    pub token: String,
    #[serde(with = "crate::bigint")]
    pub transferred_amount: BigInt,
    #[serde(with = "crate::bigint")]
    pub unwrapped_amount: BigInt,
    #[serde(with = "crate::bigint")]
    pub fee_charged: BigInt,
    pub user: String,
    #[serde(with = "crate::bigint")]
    pub asset_id: BigInt,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Erc721WrapEvent {
    pub token: String,
    /// Token id inside the external ERC-721 contract.
    #[serde(with = "crate::bigint")]
    pub token_id: BigInt,
    pub user: String,
    #[serde(with = "crate::bigint")]
    pub asset_id: BigInt,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Erc721UnwrapEvent {
    pub token: String,
    #[serde(with = "crate::bigint")]
    pub token_id: BigInt,
    pub user: String,
    #[serde(with = "crate::bigint")]
    pub asset_id: BigInt,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Erc1155WrapEvent {
    pub token: String,
    #[serde(with = "crate::bigint")]
    pub token_id: BigInt,
    #[serde(with = "crate::bigint")]
    pub amount: BigInt,
    pub user: String,
    #[serde(with = "crate::bigint")]
    pub asset_id: BigInt,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Erc1155UnwrapEvent {
    pub token: String,
    #[serde(with = "crate::bigint")]
    pub token_id: BigInt,
    #[serde(with = "crate::bigint")]
    pub amount: BigInt,
    #[serde(with = "crate::bigint")]
    pub fee_charged: BigInt,
    pub user: String,
    #[serde(with = "crate::bigint")]
    pub asset_id: BigInt,
}

/// Shared shape of the two compute legs; the event kind tag distinguishes
/// which amount was the caller-specified one.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputeAmountEvent {
    pub primitive: String,
    #[serde(with = "crate::bigint")]
    pub input_asset: BigInt,
    #[serde(with = "crate::bigint")]
    pub input_amount: BigInt,
    #[serde(with = "crate::bigint")]
    pub output_asset: BigInt,
    #[serde(with = "crate::bigint")]
    pub output_amount: BigInt,
    pub user: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokensRegisteredEvent {
    pub creator: String,
    #[serde(with = "crate::bigint::vec")]
    pub tokens: Vec<BigInt>,
    #[serde(with = "crate::bigint::vec")]
    pub nonces: Vec<BigInt>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferSingleEvent {
    pub operator: String,
    pub from: String,
    pub to: String,
    #[serde(with = "crate::bigint")]
    pub asset_id: BigInt,
    #[serde(with = "crate::bigint")]
    pub amount: BigInt,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferBatchEvent {
    pub operator: String,
    pub from: String,
    pub to: String,
    #[serde(with = "crate::bigint::vec")]
    pub asset_ids: Vec<BigInt>,
    #[serde(with = "crate::bigint::vec")]
    pub amounts: Vec<BigInt>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForwardedTransactionEvent {
    pub forwarder: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_erc20_wrap_jsonl() {
        let line = r#"{"emitter":"0xc95daf083b754210458e62ead997453f74f47072","txHash":"0xaaa1","logIndex":3,"block":1500,"timestamp":1666000000,"kind":"erc20Wrap","token":"0xcccccca5c5756ed6f4fea3dc8e61c917aaa29685","transferredAmount":"10","wrappedAmount":"9","dust":"1","user":"0xabc1f487d79b8f9048e61e8718f9baae4e945ecb","assetId":"1234"}"#;

        let event = VaultEvent::from_jsonl(line).unwrap();
        assert_eq!(event.meta.tx_hash, "0xaaa1");
        assert_eq!(event.meta.log_index, 3);
        match event.payload {
            EventPayload::Erc20Wrap(wrap) => {
                assert_eq!(wrap.wrapped_amount, BigInt::from(9));
                assert_eq!(wrap.dust, BigInt::from(1));
                assert_eq!(wrap.asset_id, BigInt::from(1234));
            }
            other => panic!("unexpected payload: {:?}", other),
        }
    }

    #[test]
    fn test_parse_transfer_batch_jsonl() {
        let line = r#"{"emitter":"0xc95daf083b754210458e62ead997453f74f47072","txHash":"0xbbb2","logIndex":0,"block":1501,"timestamp":1666000012,"kind":"transferBatch","operator":"0xabc1f487d79b8f9048e61e8718f9baae4e945ecb","from":"0x0000000000000000000000000000000000000000","to":"0xabc1f487d79b8f9048e61e8718f9baae4e945ecb","assetIds":["1234","5678"],"amounts":["9","9"]}"#;

        let event = VaultEvent::from_jsonl(line).unwrap();
        match event.payload {
            EventPayload::TransferBatch(batch) => {
                assert_eq!(batch.asset_ids.len(), 2);
                assert_eq!(batch.amounts, vec![BigInt::from(9), BigInt::from(9)]);
            }
            other => panic!("unexpected payload: {:?}", other),
        }
    }

    #[test]
    fn test_parse_uint256_scale_amount() {
        let line = r#"{"emitter":"0xc95daf083b754210458e62ead997453f74f47072","txHash":"0xccc3","logIndex":1,"block":1502,"timestamp":1666000020,"kind":"changeUnwrapFee","sender":"0xabc1f487d79b8f9048e61e8718f9baae4e945ecb","newFee":"115792089237316195423570985008687907853269984665640564039457584007913129639935"}"#;

        let event = VaultEvent::from_jsonl(line).unwrap();
        match event.payload {
            EventPayload::ChangeUnwrapFee(fee) => {
                assert_eq!(
                    fee.new_fee.to_string(),
                    "115792089237316195423570985008687907853269984665640564039457584007913129639935"
                );
            }
            other => panic!("unexpected payload: {:?}", other),
        }
    }

    #[test]
    fn test_malformed_jsonl() {
        let line = r#"{"kind": "erc20Wrap""#;
        assert!(VaultEvent::from_jsonl(line).is_err());
    }

    #[test]
    fn test_unknown_kind_rejected() {
        let line = r#"{"emitter":"0x1","txHash":"0x2","logIndex":0,"block":1,"timestamp":1,"kind":"somethingElse"}"#;
        assert!(VaultEvent::from_jsonl(line).is_err());
    }
}
