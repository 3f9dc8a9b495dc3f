//! Raw JSON-RPC payload builders. The shapes mirror the Solana RPC spec; no
//! serialization framework is involved since every request is a small fixed
//! template.

use app_core::types::AccountEncoding;

use base64::{prelude::BASE64_STANDARD, Engine};
use pubkey::Pubkey;
use signature::Signature;
use transaction::Transaction;

pub fn airdrop(pubkey: &Pubkey, lamports: u64) -> String {
    format!(
        r#"{{"jsonrpc":"2.0","id":1,"method":"requestAirdrop","params":["{}",{}]}}"#,
        pubkey, lamports
    )
}

pub fn balance(pubkey: &Pubkey) -> String {
    format!(
        r#"{{"jsonrpc":"2.0","id":1,"method":"getBalance","params":["{}",{{"commitment":"confirmed"}}]}}"#,
        pubkey
    )
}

pub fn blockhash() -> String {
    r#"{"jsonrpc":"2.0","id":1,"method":"getLatestBlockhash","params":[{"commitment":"processed"}]}"#.into()
}

pub fn account_info(pubkey: &Pubkey, encoding: AccountEncoding) -> String {
    format!(
        r#"{{"jsonrpc":"2.0","id":1,"method":"getAccountInfo","params":["{}",{{"encoding":"{}","commitment":"confirmed"}}]}}"#,
        pubkey,
        encoding.as_str()
    )
}

pub fn signature_statuses(signature: &Signature) -> String {
    format!(
        r#"{{"jsonrpc":"2.0","id":1,"method":"getSignatureStatuses","params":[["{}"]]}}"#,
        signature
    )
}

pub fn transaction(transaction: &Transaction, check: bool) -> String {
    let serialized = bincode::serialize(transaction).expect("transaction should serialize");
    let encoded = BASE64_STANDARD.encode(serialized);
    format!(
        r#"{{"jsonrpc":"2.0","id":1,"method":"sendTransaction","params":["{}",{{"skipPreflight":{},"encoding":"base64","preflightCommitment":"confirmed"}}]}}"#,
        encoded, !check
    )
}
