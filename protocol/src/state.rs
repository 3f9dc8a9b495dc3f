use borsh::{BorshDeserialize, BorshSerialize};

/// On-chain state of a counter record.
#[derive(BorshSerialize, BorshDeserialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Counter {
    pub count: u64,
}

impl Counter {
    /// Serialized size of the record.
    pub const SIZE: usize = 8;

    /// Decodes a record from raw account data, tolerating trailing bytes.
    pub fn try_from_bytes(data: &[u8]) -> borsh::io::Result<Self> {
        let data = data.get(..Self::SIZE).ok_or_else(|| {
            borsh::io::Error::new(
                borsh::io::ErrorKind::UnexpectedEof,
                "counter record shorter than 8 bytes",
            )
        })?;
        Self::try_from_slice(data)
    }
}
