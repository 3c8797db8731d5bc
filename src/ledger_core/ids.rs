//! Identifier allocation
//!
//! Every derived record gets a stable identifier built from its position in
//! the stream. Child records nested under a transaction (`-I-`, `-M-`, `-B-`
//! suffixed) take the parent list's length at fold time as their sequence
//! number; the caller must read the length and append the new id in the same
//! fold step, so that allocation order equals fold order and no two folds
//! ever see a stale length. Flat per-log records key on the log index
//! instead.

/// Id for the `n`-th interaction of a transaction.
pub fn interaction_id(tx_hash: &str, n: usize) -> String {
    format!("{}-I-{}", tx_hash, n)
}

/// Id for the `n`-th mint of a transaction.
pub fn mint_id(tx_hash: &str, n: usize) -> String {
    format!("{}-M-{}", tx_hash, n)
}

/// Id for the `n`-th burn of a transaction.
pub fn burn_id(tx_hash: &str, n: usize) -> String {
    format!("{}-B-{}", tx_hash, n)
}

/// Id for a single peer-to-peer transfer, keyed by log position.
pub fn transfer_id(tx_hash: &str, log_index: u64) -> String {
    format!("{}-{}", tx_hash, log_index)
}

/// Id for the `i`-th entry of a batch transfer at one log position.
pub fn batch_transfer_id(tx_hash: &str, log_index: u64, i: usize) -> String {
    format!("{}-{}-{}", tx_hash, log_index, i)
}

/// Id for a token-registration batch.
pub fn registry_id(tx_hash: &str, log_index: u64) -> String {
    format!("{}-{}", tx_hash, log_index)
}

/// Id for a forwarder attachment record.
pub fn forwarder_record_id(tx_id: &str, log_index: u64) -> String {
    format!("{}-{}", tx_id, log_index)
}

/// Id for one (user, derived asset) balance record.
pub fn balance_id(user: &str, asset_id: &str) -> String {
    format!("{}-{}", user, asset_id)
}

/// Id for a fee-change record.
pub fn fee_change_id(tx_hash: &str, sender: &str) -> String {
    format!("{}-{}", tx_hash, sender)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_ids_carry_role_tag_and_sequence() {
        assert_eq!(interaction_id("0xabc", 0), "0xabc-I-0");
        assert_eq!(mint_id("0xabc", 2), "0xabc-M-2");
        assert_eq!(burn_id("0xabc", 7), "0xabc-B-7");
    }

    #[test]
    fn test_role_tags_never_collide_across_kinds() {
        let tx = "0xabc";
        assert_ne!(interaction_id(tx, 1), mint_id(tx, 1));
        assert_ne!(mint_id(tx, 1), burn_id(tx, 1));
    }

    #[test]
    fn test_flat_ids_key_on_log_position() {
        assert_eq!(transfer_id("0xabc", 4), "0xabc-4");
        assert_eq!(batch_transfer_id("0xabc", 4, 1), "0xabc-4-1");
    }

    #[test]
    fn test_same_pre_state_yields_same_id() {
        assert_eq!(interaction_id("0xabc", 3), interaction_id("0xabc", 3));
    }

    #[test]
    fn test_balance_and_fee_ids() {
        assert_eq!(balance_id("0xuser", "1234"), "0xuser-1234");
        assert_eq!(fee_change_id("0xabc", "0xowner"), "0xabc-0xowner");
    }
}
