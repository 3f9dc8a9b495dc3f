//! Extractor functions applied to the `result` field of JSON-RPC responses.

use base64::{prelude::BASE64_STANDARD, Engine};
use hash::{Hash, HASH_BYTES};
use json::{JsonValueTrait, LazyValue};
use protocol::state::Counter;
use pubkey::Pubkey;

/// Where a submitted transaction currently stands on the cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureStatus {
    /// The cluster has not confirmed the transaction yet.
    Pending,
    Confirmed,
    /// The transaction executed and failed; resubmitting the same request
    /// would fail the same way.
    Failed,
}

pub fn blockhash_extractor(value: LazyValue) -> Option<Hash> {
    let value = value.get("value")?;

    let blockhash = value.get("blockhash")?;
    let blockhash = blockhash.as_str()?;
    let mut buffer = [0u8; HASH_BYTES];
    bs58::decode(blockhash).onto(&mut buffer).ok()?;
    Some(Hash::new_from_array(buffer))
}

pub fn send_response_extractor(value: LazyValue) -> Option<bool> {
    Some(value.as_str().is_some())
}

pub fn signature_status_extractor(value: LazyValue) -> Option<SignatureStatus> {
    let value = value.get("value")?;
    let mut statuses = value.into_array_iter()?;
    let status = statuses.next()?;
    if status.is_null() {
        return Some(SignatureStatus::Pending);
    }
    let failed = status.get("err").map(|e| !e.is_null()).unwrap_or(false);
    if failed {
        return Some(SignatureStatus::Failed);
    }
    let level = status.get("confirmationStatus");
    match level.as_str() {
        Some("confirmed" | "finalized") => Some(SignatureStatus::Confirmed),
        _ => Some(SignatureStatus::Pending),
    }
}

pub fn counter_extractor(value: LazyValue) -> Option<u64> {
    let data = account_data(value.get("value")?)?;
    Counter::try_from_bytes(&data).ok().map(|c| c.count)
}

pub fn owner_extractor(value: LazyValue) -> Option<Pubkey> {
    let value = value.get("value")?;
    let owner = value.get("owner");
    let owner = owner.as_str()?;
    owner.parse().ok()
}

pub fn balance_extractor(value: LazyValue) -> Option<u64> {
    value.get("value").as_u64()
}

fn account_data(value: LazyValue) -> Option<Vec<u8>> {
    let mut iter = value.get("data").and_then(LazyValue::into_array_iter)?;
    let data = iter.next();
    let data = data.as_str()?;
    match iter.next().as_str()? {
        "base58" => bs58::decode(data).into_vec().ok(),
        "base64" => BASE64_STANDARD.decode(data).ok(),
        "base64+zstd" => {
            let decoded = BASE64_STANDARD.decode(data).ok()?;
            zstd::decode_all(decoded.as_slice()).ok()
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(body: &str) -> LazyValue {
        json::get(body.as_bytes(), ["result"]).expect("fixture should have a result")
    }

    #[test]
    fn blockhash_is_parsed_from_base58() {
        let hash = bs58::encode([7u8; HASH_BYTES]).into_string();
        let body = format!(
            r#"{{"jsonrpc":"2.0","result":{{"context":{{"slot":1}},"value":{{"blockhash":"{hash}","lastValidBlockHeight":100}}}},"id":1}}"#
        );
        let extracted = blockhash_extractor(result(&body)).unwrap();
        assert_eq!(extracted, Hash::new_from_array([7; HASH_BYTES]));
    }

    #[test]
    fn send_response_requires_a_signature_string() {
        let body = r#"{"jsonrpc":"2.0","result":"5j7s6NiJS3JAkvgkoc18WVAsiSaci2pxB2A6ueCJP4tprA2TFg9wSyTLeYouxPBJEMzJinENTkpA52YStRW5Dia7","id":1}"#;
        assert_eq!(send_response_extractor(result(body)), Some(true));
        let body = r#"{"jsonrpc":"2.0","result":{"unexpected":true},"id":1}"#;
        assert_eq!(send_response_extractor(result(body)), Some(false));
    }

    #[test]
    fn missing_status_entry_counts_as_pending() {
        let body = r#"{"jsonrpc":"2.0","result":{"context":{"slot":82},"value":[null]},"id":1}"#;
        assert_eq!(
            signature_status_extractor(result(body)),
            Some(SignatureStatus::Pending)
        );
    }

    #[test]
    fn processed_status_is_not_yet_confirmed() {
        let body = r#"{"jsonrpc":"2.0","result":{"context":{"slot":82},"value":[{"slot":72,"confirmations":0,"err":null,"confirmationStatus":"processed"}]},"id":1}"#;
        assert_eq!(
            signature_status_extractor(result(body)),
            Some(SignatureStatus::Pending)
        );
    }

    #[test]
    fn confirmed_and_failed_statuses_are_detected() {
        let body = r#"{"jsonrpc":"2.0","result":{"context":{"slot":82},"value":[{"slot":72,"confirmations":10,"err":null,"confirmationStatus":"confirmed"}]},"id":1}"#;
        assert_eq!(
            signature_status_extractor(result(body)),
            Some(SignatureStatus::Confirmed)
        );
        let body = r#"{"jsonrpc":"2.0","result":{"context":{"slot":82},"value":[{"slot":72,"confirmations":10,"err":{"InstructionError":[0,"InvalidInstructionData"]},"confirmationStatus":"confirmed"}]},"id":1}"#;
        assert_eq!(
            signature_status_extractor(result(body)),
            Some(SignatureStatus::Failed)
        );
    }

    #[test]
    fn counter_is_decoded_from_every_supported_encoding() {
        let raw = 5u64.to_le_bytes();
        let cases = [
            (bs58::encode(raw).into_string(), "base58"),
            (BASE64_STANDARD.encode(raw), "base64"),
            (
                BASE64_STANDARD.encode(zstd::encode_all(raw.as_slice(), 0).unwrap()),
                "base64+zstd",
            ),
        ];
        for (data, encoding) in cases {
            let body = format!(
                r#"{{"jsonrpc":"2.0","result":{{"context":{{"slot":1}},"value":{{"data":["{data}","{encoding}"],"executable":false,"lamports":1000000,"owner":"11111111111111111111111111111111","rentEpoch":0}}}},"id":1}}"#
            );
            assert_eq!(counter_extractor(result(&body)), Some(5), "{encoding}");
        }
    }

    #[test]
    fn absent_account_yields_no_counter() {
        let body = r#"{"jsonrpc":"2.0","result":{"context":{"slot":1},"value":null},"id":1}"#;
        assert_eq!(counter_extractor(result(body)), None);
        assert_eq!(owner_extractor(result(body)), None);
    }

    #[test]
    fn owner_and_balance_are_extracted() {
        let owner = Pubkey::new_from_array([9; 32]);
        let body = format!(
            r#"{{"jsonrpc":"2.0","result":{{"context":{{"slot":1}},"value":{{"data":["","base64"],"executable":false,"lamports":1000000,"owner":"{owner}","rentEpoch":0}}}},"id":1}}"#
        );
        assert_eq!(owner_extractor(result(&body)), Some(owner));

        let body = r#"{"jsonrpc":"2.0","result":{"context":{"slot":1},"value":12190},"id":1}"#;
        assert_eq!(balance_extractor(result(body)), Some(12190));
    }
}
