//! Signing identity of the harness: a single keypair persisted as a JSON
//! byte array, created on first use. Constructed once in `main` and passed
//! down explicitly; nothing in the harness reaches for it globally.

use std::fmt;
use std::path::Path;
use std::{fs, io};

use keypair::Keypair;
use signer::Signer;

/// Size of a serialized ed25519 keypair.
const KEYPAIR_LEN: usize = 64;

#[derive(Debug)]
pub enum IdentityError {
    Io(io::Error),
    /// The file is not a JSON array of bytes.
    Malformed(json::Error),
    /// The array has the wrong number of bytes.
    WrongLength(usize),
    /// The bytes do not form a consistent ed25519 keypair.
    InvalidKey,
}

impl fmt::Display for IdentityError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "failed to access keypair file: {err}"),
            Self::Malformed(err) => write!(f, "keypair file is not a JSON byte array: {err}"),
            Self::WrongLength(len) => {
                write!(f, "keypair file holds {len} bytes, expected {KEYPAIR_LEN}")
            }
            Self::InvalidKey => write!(f, "keypair bytes do not form a valid ed25519 key"),
        }
    }
}

impl std::error::Error for IdentityError {}

impl From<io::Error> for IdentityError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

/// Loads the signing identity from `path`, generating and persisting a fresh
/// keypair on first use.
pub fn load_or_create(path: &Path) -> Result<Keypair, IdentityError> {
    if path.exists() {
        let keypair = load(path)?;
        tracing::info!(pubkey = %keypair.pubkey(), "loaded identity");
        return Ok(keypair);
    }
    let keypair = Keypair::new();
    let bytes = keypair.to_bytes().to_vec();
    let encoded = json::to_string(&bytes).expect("byte array should serialize");
    fs::write(path, encoded)?;
    tracing::info!(
        pubkey = %keypair.pubkey(),
        path = %path.display(),
        "generated new identity"
    );
    Ok(keypair)
}

fn load(path: &Path) -> Result<Keypair, IdentityError> {
    let raw = fs::read_to_string(path)?;
    let bytes: Vec<u8> = json::from_str(&raw).map_err(IdentityError::Malformed)?;
    if bytes.len() != KEYPAIR_LEN {
        return Err(IdentityError::WrongLength(bytes.len()));
    }
    Keypair::from_bytes(&bytes).map_err(|_| IdentityError::InvalidKey)
}
