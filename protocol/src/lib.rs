//! Client-side wire contract of the ephemeral counter program.
//!
//! The program itself is deployed separately; this crate only knows how to
//! speak to it: the opcode table, the payload layout, the positional account
//! lists of every operation, and the derivation of the addresses involved.

use pubkey::Pubkey;

pub const DELEGATION_PROGRAM_ID: Pubkey = sdk::id();

/// Seed prefix of the counter record PDA.
pub const COUNTER_SEED: &[u8] = b"counter_acc";

pub mod instruction;
pub mod requests;
pub mod state;
pub mod utils;
