use instruction::{AccountMeta, Instruction as SolanaInstruction};
use pubkey::Pubkey;
use sdk::consts::{MAGIC_CONTEXT_ID, MAGIC_PROGRAM_ID};
use solana_system_interface::program as system_program;

use crate::instruction::CounterInstruction;
use crate::utils::{derive_counter_pda, DelegationAccounts};
use crate::DELEGATION_PROGRAM_ID;

/// # Request Builder
///
/// Assembles one submittable request per operation: the program address, the
/// ordered account list, and the encoded instruction bytes. The program
/// resolves accounts positionally, so the order and flags used here are part
/// of the wire contract. Every request is built fresh and never reused: a
/// resubmission after a transient failure requires a rebuild.
#[derive(Clone, Copy)]
pub struct CounterProgram {
    program_id: Pubkey,
}

impl CounterProgram {
    pub fn new(program_id: Pubkey) -> Self {
        Self { program_id }
    }

    pub fn id(&self) -> Pubkey {
        self.program_id
    }

    /// Address of the counter record owned by `payer`.
    pub fn counter_pda(&self, payer: &Pubkey) -> Pubkey {
        derive_counter_pda(payer, &self.program_id).0
    }

    pub fn initialize(&self, payer: &Pubkey) -> SolanaInstruction {
        self.wrap(CounterInstruction::InitializeCounter, self.counter_metas(payer))
    }

    pub fn increase(&self, payer: &Pubkey, amount: u64) -> SolanaInstruction {
        let ix = CounterInstruction::IncreaseCounter { amount };
        self.wrap(ix, self.counter_metas(payer))
    }

    pub fn delegate(&self, payer: &Pubkey) -> SolanaInstruction {
        let pda = self.counter_pda(payer);
        let delegation = DelegationAccounts::new(&pda, &self.program_id);
        let metas = vec![
            AccountMeta::new(*payer, true),
            AccountMeta::new(pda, false),
            AccountMeta::new_readonly(self.program_id, false),
            AccountMeta::new(delegation.buffer, false),
            AccountMeta::new(delegation.record, false),
            AccountMeta::new(delegation.metadata, false),
            AccountMeta::new_readonly(DELEGATION_PROGRAM_ID, false),
            AccountMeta::new_readonly(system_program::ID, false),
        ];
        self.wrap(CounterInstruction::Delegate, metas)
    }

    pub fn commit(&self, payer: &Pubkey) -> SolanaInstruction {
        self.wrap(CounterInstruction::Commit, self.magic_metas(payer))
    }

    pub fn commit_and_undelegate(&self, payer: &Pubkey) -> SolanaInstruction {
        self.wrap(CounterInstruction::CommitAndUndelegate, self.magic_metas(payer))
    }

    /// Layout shared by InitializeCounter and IncreaseCounter.
    fn counter_metas(&self, payer: &Pubkey) -> Vec<AccountMeta> {
        vec![
            AccountMeta::new(*payer, true),
            AccountMeta::new(self.counter_pda(payer), false),
            AccountMeta::new_readonly(system_program::ID, false),
        ]
    }

    /// Layout shared by Commit and CommitAndUndelegate.
    fn magic_metas(&self, payer: &Pubkey) -> Vec<AccountMeta> {
        vec![
            AccountMeta::new(*payer, true),
            AccountMeta::new(self.counter_pda(payer), false),
            AccountMeta::new_readonly(MAGIC_PROGRAM_ID, false),
            AccountMeta::new(MAGIC_CONTEXT_ID, false),
        ]
    }

    fn wrap(&self, ix: CounterInstruction, metas: Vec<AccountMeta>) -> SolanaInstruction {
        SolanaInstruction::new_with_bytes(self.program_id, &ix.data(), metas)
    }
}
