use borsh::{BorshDeserialize, BorshSerialize};
use thiserror::Error;

/// Length of the opcode prefix of every instruction.
pub const OPCODE_LEN: usize = 8;

/// # Opcode Table
///
/// Fixed discriminators of the deployed counter program, taken verbatim from
/// its instruction decoder. These bytes are the wire identity of each
/// operation and must never be reassigned.
pub mod opcode {
    use super::OPCODE_LEN;

    pub const INITIALIZE_COUNTER: [u8; OPCODE_LEN] = [0, 0, 0, 0, 0, 0, 0, 0];
    pub const INCREASE_COUNTER: [u8; OPCODE_LEN] = [1, 0, 0, 0, 0, 0, 0, 0];
    pub const DELEGATE: [u8; OPCODE_LEN] = [2, 0, 0, 0, 0, 0, 0, 0];
    pub const COMMIT_AND_UNDELEGATE: [u8; OPCODE_LEN] = [3, 0, 0, 0, 0, 0, 0, 0];
    pub const COMMIT: [u8; OPCODE_LEN] = [4, 0, 0, 0, 0, 0, 0, 0];
    pub const UNDELEGATE: [u8; OPCODE_LEN] = [196, 28, 41, 206, 48, 37, 51, 167];
}

/// # Instructions
///
/// The closed set of operations understood by the counter program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CounterInstruction {
    /// Creates the counter record on the base layer and sets it to 0.
    InitializeCounter,
    /// Adds `amount` to the counter, on whichever layer currently owns the
    /// record.
    IncreaseCounter { amount: u64 },
    /// Hands the counter record over to the ephemeral rollup.
    Delegate,
    /// Publishes the rollup's state of the record to the base layer and
    /// returns ownership to it.
    CommitAndUndelegate,
    /// Publishes the rollup's state of the record to the base layer while
    /// keeping the delegation in place.
    Commit,
    /// Issued by the delegation program via CPI while undelegating; never
    /// submitted by this client directly.
    Undelegate { pda_seeds: Vec<Vec<u8>> },
}

/// Payload of [`CounterInstruction::IncreaseCounter`]: a single fixed-width
/// little-endian field, borsh encoded.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct IncreaseCounterPayload {
    pub amount: u64,
}

impl IncreaseCounterPayload {
    pub fn encode(&self) -> Vec<u8> {
        borsh::to_vec(self).expect("payload should serialize")
    }

    pub fn decode(input: &[u8]) -> Result<Self, EncodingError> {
        Self::try_from_slice(input).map_err(Into::into)
    }
}

impl CounterInstruction {
    /// Returns the fixed opcode bytes of this operation.
    pub fn opcode(&self) -> [u8; OPCODE_LEN] {
        match self {
            Self::InitializeCounter => opcode::INITIALIZE_COUNTER,
            Self::IncreaseCounter { .. } => opcode::INCREASE_COUNTER,
            Self::Delegate => opcode::DELEGATE,
            Self::CommitAndUndelegate => opcode::COMMIT_AND_UNDELEGATE,
            Self::Commit => opcode::COMMIT,
            Self::Undelegate { .. } => opcode::UNDELEGATE,
        }
    }

    /// Serializes the instruction into the exact byte sequence the program
    /// deserializes: opcode first, borsh payload right after it, with no
    /// separator and no length prefix.
    pub fn data(&self) -> Vec<u8> {
        let mut data = self.opcode().to_vec();
        match self {
            Self::IncreaseCounter { amount } => {
                data.extend(IncreaseCounterPayload { amount: *amount }.encode());
            }
            Self::Undelegate { pda_seeds } => {
                data.extend(borsh::to_vec(pda_seeds).expect("seeds should serialize"));
            }
            _ => (),
        }
        data
    }

    /// Byte-exact inverse of [`Self::data`], mirroring the on-chain decoder.
    pub fn decode(input: &[u8]) -> Result<Self, EncodingError> {
        if input.len() < OPCODE_LEN {
            return Err(EncodingError::TooShort(input.len()));
        }
        let (discriminator, rest) = input.split_at(OPCODE_LEN);

        Ok(match discriminator {
            d if d == opcode::INITIALIZE_COUNTER => Self::InitializeCounter,
            d if d == opcode::INCREASE_COUNTER => {
                let payload = IncreaseCounterPayload::decode(rest)?;
                Self::IncreaseCounter {
                    amount: payload.amount,
                }
            }
            d if d == opcode::DELEGATE => Self::Delegate,
            d if d == opcode::COMMIT_AND_UNDELEGATE => Self::CommitAndUndelegate,
            d if d == opcode::COMMIT => Self::Commit,
            d if d == opcode::UNDELEGATE => {
                let pda_seeds = Vec::<Vec<u8>>::try_from_slice(rest)?;
                Self::Undelegate { pda_seeds }
            }
            unknown => {
                let mut bytes = [0; OPCODE_LEN];
                bytes.copy_from_slice(unknown);
                return Err(EncodingError::UnknownOpcode(bytes));
            }
        })
    }
}

/// Failures of the instruction codec. All of them are programming errors on
/// the encoding side, never a runtime condition to retry.
#[derive(Debug, Error)]
pub enum EncodingError {
    #[error("instruction data too short: {0} bytes")]
    TooShort(usize),
    #[error("unknown instruction opcode: {0:?}")]
    UnknownOpcode([u8; OPCODE_LEN]),
    #[error("malformed instruction payload: {0}")]
    Payload(#[from] borsh::io::Error),
}
