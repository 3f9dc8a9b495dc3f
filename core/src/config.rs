use std::path::PathBuf;

use pubkey::Pubkey;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr};

use crate::types::{AccountEncoding, ConnectionType, HarnessResult, Url};

#[derive(Deserialize, Serialize, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    pub connection: ConnectionSettings,
    pub program: ProgramSettings,
    pub identity: IdentitySettings,
    pub confirmation: ConfirmationSettings,
    pub funding: FundingSettings,
    pub data: DataSettings,
}

impl Config {
    pub fn from_path(path: PathBuf) -> HarnessResult<Self> {
        let config = std::fs::read_to_string(path)?;
        toml::from_str(&config).map_err(Into::into)
    }
}

#[derive(Deserialize, Serialize, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct ConnectionSettings {
    #[serde(skip_serializing)]
    pub chain_url: Url,
    #[serde(skip_serializing)]
    pub ephem_url: Url,
    pub http_connection_type: ConnectionType,
}

#[serde_as]
#[derive(Deserialize, Serialize, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct ProgramSettings {
    /// Address of the deployed counter program.
    #[serde_as(as = "DisplayFromStr")]
    pub id: Pubkey,
}

#[derive(Deserialize, Serialize, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct IdentitySettings {
    /// Path to the payer keypair file, created on first use if missing.
    pub keypair_path: PathBuf,
}

#[derive(Deserialize, Serialize, Clone, Copy)]
#[serde(rename_all = "kebab-case")]
pub struct ConfirmationSettings {
    pub preflight_check: bool,
    pub timeout_secs: u64,
    pub poll_interval_ms: u64,
}

#[derive(Deserialize, Serialize, Clone, Copy)]
#[serde(rename_all = "kebab-case")]
pub struct FundingSettings {
    /// Airdrop this many lamports when the payer balance drops below the minimum.
    pub airdrop_lamports: u64,
    pub min_balance_lamports: u64,
}

#[derive(Deserialize, Serialize, Clone, Copy)]
#[serde(rename_all = "kebab-case")]
pub struct DataSettings {
    pub account_encoding: AccountEncoding,
}
