use pubkey::Pubkey;
use sdk::pda::{
    delegate_buffer_pda_from_delegated_account_and_owner_program,
    delegation_metadata_pda_from_delegated_account, delegation_record_pda_from_delegated_account,
};

use crate::COUNTER_SEED;

/// Derives the counter record address of `owner` under the given program.
pub fn derive_counter_pda(owner: &Pubkey, program_id: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[COUNTER_SEED, owner.as_ref()], program_id)
}

/// Delegation program accounts anchoring a delegated record on the base
/// layer. All three are derived from the delegated record's address.
pub struct DelegationAccounts {
    pub buffer: Pubkey,
    pub record: Pubkey,
    pub metadata: Pubkey,
}

impl DelegationAccounts {
    pub fn new(delegated: &Pubkey, owner_program: &Pubkey) -> Self {
        Self {
            buffer: delegate_buffer_pda_from_delegated_account_and_owner_program(
                delegated,
                owner_program,
            ),
            record: delegation_record_pda_from_delegated_account(delegated),
            metadata: delegation_metadata_pda_from_delegated_account(delegated),
        }
    }
}
