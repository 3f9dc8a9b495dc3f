use instruction::AccountMeta;
use pubkey::Pubkey;
use sdk::consts::{MAGIC_CONTEXT_ID, MAGIC_PROGRAM_ID};
use solana_system_interface::program as system_program;
use turnstile_protocol::instruction::{
    opcode, CounterInstruction, EncodingError, IncreaseCounterPayload, OPCODE_LEN,
};
use turnstile_protocol::requests::CounterProgram;
use turnstile_protocol::state::Counter;
use turnstile_protocol::utils::{derive_counter_pda, DelegationAccounts};
use turnstile_protocol::DELEGATION_PROGRAM_ID;

const PROGRAM_ID: Pubkey = Pubkey::new_from_array([3; 32]);
const PAYER: Pubkey = Pubkey::new_from_array([7; 32]);

#[test]
fn opcodes_match_the_program_table() {
    let table = [
        (CounterInstruction::InitializeCounter, [0, 0, 0, 0, 0, 0, 0, 0]),
        (
            CounterInstruction::IncreaseCounter { amount: 1 },
            [1, 0, 0, 0, 0, 0, 0, 0],
        ),
        (CounterInstruction::Delegate, [2, 0, 0, 0, 0, 0, 0, 0]),
        (
            CounterInstruction::CommitAndUndelegate,
            [3, 0, 0, 0, 0, 0, 0, 0],
        ),
        (CounterInstruction::Commit, [4, 0, 0, 0, 0, 0, 0, 0]),
        (
            CounterInstruction::Undelegate { pda_seeds: vec![] },
            [196, 28, 41, 206, 48, 37, 51, 167],
        ),
    ];
    for (ix, expected) in table {
        assert_eq!(ix.opcode(), expected, "{ix:?}");
    }
}

#[test]
fn payload_round_trips_across_the_valid_range() {
    for amount in [0, 1, u64::MAX] {
        let payload = IncreaseCounterPayload { amount };
        let encoded = payload.encode();
        assert_eq!(encoded, amount.to_le_bytes());
        assert_eq!(IncreaseCounterPayload::decode(&encoded).unwrap(), payload);
    }
}

#[test]
fn increase_data_is_opcode_then_little_endian_amount() {
    let data = CounterInstruction::IncreaseCounter { amount: 1 }.data();
    assert_eq!(data.len(), OPCODE_LEN + 8);
    assert_eq!(&data[..OPCODE_LEN], opcode::INCREASE_COUNTER);
    assert_eq!(&data[OPCODE_LEN..], 1u64.to_le_bytes());
}

#[test]
fn payloadless_operations_encode_as_bare_opcodes() {
    let operations = [
        CounterInstruction::InitializeCounter,
        CounterInstruction::Delegate,
        CounterInstruction::Commit,
        CounterInstruction::CommitAndUndelegate,
    ];
    for ix in operations {
        assert_eq!(ix.data(), ix.opcode(), "{ix:?}");
    }
}

#[test]
fn encoding_has_no_hidden_state() {
    let ix = CounterInstruction::IncreaseCounter { amount: 42 };
    assert_eq!(ix.data(), ix.data());
    assert_eq!(ix.opcode(), ix.opcode());
}

#[test]
fn distinct_requests_never_collide() {
    let encoded = [
        CounterInstruction::InitializeCounter.data(),
        CounterInstruction::IncreaseCounter { amount: 0 }.data(),
        CounterInstruction::IncreaseCounter { amount: 1 }.data(),
        CounterInstruction::Delegate.data(),
        CounterInstruction::Commit.data(),
        CounterInstruction::CommitAndUndelegate.data(),
    ];
    for (i, a) in encoded.iter().enumerate() {
        for b in encoded.iter().skip(i + 1) {
            assert_ne!(a, b);
        }
    }
}

#[test]
fn decode_round_trips_every_operation() {
    let operations = [
        CounterInstruction::InitializeCounter,
        CounterInstruction::IncreaseCounter { amount: u64::MAX },
        CounterInstruction::Delegate,
        CounterInstruction::CommitAndUndelegate,
        CounterInstruction::Commit,
        CounterInstruction::Undelegate {
            pda_seeds: vec![b"counter_acc".to_vec(), PAYER.to_bytes().to_vec()],
        },
    ];
    for ix in operations {
        assert_eq!(CounterInstruction::decode(&ix.data()).unwrap(), ix);
    }
}

#[test]
fn decode_rejects_malformed_input() {
    assert!(matches!(
        CounterInstruction::decode(&[1, 0, 0]),
        Err(EncodingError::TooShort(3))
    ));
    assert!(matches!(
        CounterInstruction::decode(&[9, 9, 9, 9, 9, 9, 9, 9]),
        Err(EncodingError::UnknownOpcode(_))
    ));
    // opcode alone is not a valid IncreaseCounter: the payload is mandatory
    assert!(matches!(
        CounterInstruction::decode(&opcode::INCREASE_COUNTER),
        Err(EncodingError::Payload(_))
    ));
}

#[test]
fn counter_requests_use_the_three_account_layout() {
    let program = CounterProgram::new(PROGRAM_ID);
    let pda = program.counter_pda(&PAYER);
    let expected = vec![
        AccountMeta::new(PAYER, true),
        AccountMeta::new(pda, false),
        AccountMeta::new_readonly(system_program::ID, false),
    ];

    let init = program.initialize(&PAYER);
    assert_eq!(init.program_id, PROGRAM_ID);
    assert_eq!(init.accounts, expected);
    assert_eq!(init.data, opcode::INITIALIZE_COUNTER);

    let increase = program.increase(&PAYER, 1);
    assert_eq!(increase.accounts, expected);
    assert_eq!(&increase.data[..OPCODE_LEN], opcode::INCREASE_COUNTER);
}

#[test]
fn delegate_request_matches_the_positional_contract() {
    let program = CounterProgram::new(PROGRAM_ID);
    let pda = program.counter_pda(&PAYER);
    let delegation = DelegationAccounts::new(&pda, &PROGRAM_ID);

    let request = program.delegate(&PAYER);
    assert_eq!(request.data, opcode::DELEGATE);
    assert_eq!(
        request.accounts,
        vec![
            AccountMeta::new(PAYER, true),
            AccountMeta::new(pda, false),
            AccountMeta::new_readonly(PROGRAM_ID, false),
            AccountMeta::new(delegation.buffer, false),
            AccountMeta::new(delegation.record, false),
            AccountMeta::new(delegation.metadata, false),
            AccountMeta::new_readonly(DELEGATION_PROGRAM_ID, false),
            AccountMeta::new_readonly(system_program::ID, false),
        ]
    );
}

#[test]
fn commit_requests_target_the_magic_program() {
    let program = CounterProgram::new(PROGRAM_ID);
    let pda = program.counter_pda(&PAYER);
    let expected = vec![
        AccountMeta::new(PAYER, true),
        AccountMeta::new(pda, false),
        AccountMeta::new_readonly(MAGIC_PROGRAM_ID, false),
        AccountMeta::new(MAGIC_CONTEXT_ID, false),
    ];

    let commit = program.commit(&PAYER);
    assert_eq!(commit.accounts, expected);
    assert_eq!(commit.data, opcode::COMMIT);

    let undelegate = program.commit_and_undelegate(&PAYER);
    assert_eq!(undelegate.accounts, expected);
    assert_eq!(undelegate.data, opcode::COMMIT_AND_UNDELEGATE);
}

#[test]
fn counter_pda_depends_on_owner_and_program() {
    let (pda, _) = derive_counter_pda(&PAYER, &PROGRAM_ID);
    assert_eq!(derive_counter_pda(&PAYER, &PROGRAM_ID).0, pda);

    let other_owner = Pubkey::new_from_array([8; 32]);
    assert_ne!(derive_counter_pda(&other_owner, &PROGRAM_ID).0, pda);
    let other_program = Pubkey::new_from_array([9; 32]);
    assert_ne!(derive_counter_pda(&PAYER, &other_program).0, pda);
}

#[test]
fn counter_state_decodes_from_account_data() {
    let counter = Counter { count: 3 };
    let mut data = borsh::to_vec(&counter).unwrap();
    assert_eq!(data.len(), Counter::SIZE);
    assert_eq!(Counter::try_from_bytes(&data).unwrap(), counter);

    // trailing bytes are tolerated, truncated records are not
    data.extend_from_slice(&[0; 4]);
    assert_eq!(Counter::try_from_bytes(&data).unwrap(), counter);
    assert!(Counter::try_from_bytes(&data[..4]).is_err());
}
