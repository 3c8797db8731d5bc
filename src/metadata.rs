//! Token metadata side-lookup
//!
//! Resolves name/symbol/decimals for an external ERC-20 contract the first
//! time the ledger materializes it. This is the only blocking side call in
//! the system; it lives behind [`MetadataSource`] so the fold path stays
//! testable offline.
//!
//! ## Fallback chain
//!
//! 1. `eth_call` the standard string-typed `name()` / `symbol()` accessors.
//! 2. If the returned data does not decode as an ABI string, reinterpret it
//!    as a `bytes32` value (older contracts expose that shape). An all-zero
//!    `bytes32` is a sentinel for "absent", not an empty string.
//! 3. If both fail, name and symbol default to the literal `"unknown"` and
//!    decimals to `0`.

use serde_json::json;
use std::time::Duration;

const NAME_SELECTOR: &str = "0x06fdde03";
const SYMBOL_SELECTOR: &str = "0x95d89b41";
const DECIMALS_SELECTOR: &str = "0x313ce567";

/// Resolved metadata for an external fungible contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenMetadata {
    pub name: String,
    pub symbol: String,
    pub decimals: u32,
}

impl TokenMetadata {
    /// The documented fallback values.
    pub fn unknown() -> Self {
        Self {
            name: "unknown".to_string(),
            symbol: "unknown".to_string(),
            decimals: 0,
        }
    }
}

/// Side-channel lookup of token metadata by contract address.
pub trait MetadataSource: Send {
    fn lookup(&self, address: &str) -> TokenMetadata;
}

/// Offline source: always returns the fallback values. Used in tests and
/// when no RPC endpoint is configured.
pub struct UnknownMetadata;

impl MetadataSource for UnknownMetadata {
    fn lookup(&self, _address: &str) -> TokenMetadata {
        TokenMetadata::unknown()
    }
}

/// JSON-RPC backed source issuing `eth_call`s against an Ethereum node.
pub struct RpcMetadataSource {
    client: reqwest::blocking::Client,
    rpc_url: String,
}

impl RpcMetadataSource {
    pub fn new(rpc_url: impl Into<String>) -> Result<Self, Box<dyn std::error::Error>> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            rpc_url: rpc_url.into(),
        })
    }

    /// Raw `eth_call`, returning the hex-encoded return data on success.
    fn eth_call(&self, to: &str, selector: &str) -> Option<String> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "eth_call",
            "params": [{"to": to, "data": selector}, "latest"],
        });

        let response: serde_json::Value = self
            .client
            .post(&self.rpc_url)
            .json(&body)
            .send()
            .ok()?
            .json()
            .ok()?;

        response
            .get("result")
            .and_then(|r| r.as_str())
            .map(str::to_string)
    }

    fn fetch_string(&self, address: &str, selector: &str) -> String {
        match self.eth_call(address, selector) {
            Some(data) => decode_abi_string(&data)
                .or_else(|| decode_bytes32_string(&data))
                .unwrap_or_else(|| "unknown".to_string()),
            None => "unknown".to_string(),
        }
    }
}

impl MetadataSource for RpcMetadataSource {
    fn lookup(&self, address: &str) -> TokenMetadata {
        let name = self.fetch_string(address, NAME_SELECTOR);
        let symbol = self.fetch_string(address, SYMBOL_SELECTOR);
        let decimals = self
            .eth_call(address, DECIMALS_SELECTOR)
            .and_then(|data| decode_uint(&data))
            .unwrap_or(0);

        log::debug!(
            "metadata for {}: name={} symbol={} decimals={}",
            address,
            name,
            symbol,
            decimals
        );

        TokenMetadata {
            name,
            symbol,
            decimals,
        }
    }
}

fn strip_hex(data: &str) -> Option<Vec<u8>> {
    let raw = data.strip_prefix("0x").unwrap_or(data);
    hex::decode(raw).ok()
}

/// Decode ABI-encoded `string` return data: 32-byte offset, 32-byte length,
/// then the UTF-8 bytes.
pub fn decode_abi_string(data: &str) -> Option<String> {
    let bytes = strip_hex(data)?;
    if bytes.len() < 64 {
        return None;
    }

    let offset = decode_word(&bytes[..32])?;
    let len_start = offset.checked_add(32)?;
    if bytes.len() < len_start {
        return None;
    }
    let len = decode_word(&bytes[offset..len_start])?;
    let end = len_start.checked_add(len)?;
    if bytes.len() < end {
        return None;
    }

    let text = String::from_utf8(bytes[len_start..end].to_vec()).ok()?;
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Decode `bytes32` return data as a right-padded UTF-8 string. The all-zero
/// value means "absent".
pub fn decode_bytes32_string(data: &str) -> Option<String> {
    let bytes = strip_hex(data)?;
    if bytes.len() != 32 {
        return None;
    }
    if bytes.iter().all(|b| *b == 0) {
        return None;
    }

    let end = bytes.iter().position(|b| *b == 0).unwrap_or(32);
    let text = String::from_utf8(bytes[..end].to_vec()).ok()?;
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Decode a `uint8`/`uint256` return word into a small integer.
pub fn decode_uint(data: &str) -> Option<u32> {
    let bytes = strip_hex(data)?;
    if bytes.len() != 32 {
        return None;
    }
    let value = decode_word(&bytes)?;
    u32::try_from(value).ok()
}

fn decode_word(word: &[u8]) -> Option<usize> {
    if word.len() < 32 {
        return None;
    }
    // Values beyond usize are malformed for our purposes.
    if word[..24].iter().any(|b| *b != 0) {
        return None;
    }
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&word[24..32]);
    Some(u64::from_be_bytes(buf) as usize)
}
