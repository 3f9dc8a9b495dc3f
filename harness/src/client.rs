use app_core::config::{Config, ConfirmationSettings};
use app_core::types::{AccountEncoding, ConnectionType, DynError, HarnessResult, Url};
use std::fmt;
use std::time::{Duration, Instant};

use hyper::Request;
use instruction::Instruction as SolanaInstruction;
use json::LazyValue;
use keypair::Keypair;
use pubkey::Pubkey;
use signature::Signature;
use signer::Signer;
use transaction::Transaction;

use crate::{
    blockhash::BlockhashProvider,
    extractor::{
        balance_extractor, counter_extractor, owner_extractor, send_response_extractor,
        signature_status_extractor, SignatureStatus,
    },
    http::{Connection, ParsedResponse, RpcError},
    payload,
};

/// # Layer Client
///
/// One JSON-RPC client per execution layer (base chain or ephemeral rollup).
/// Submission is an explicit two-phase operation: [`LayerClient::submit`]
/// signs a request into a fresh transaction and delivers it, returning a
/// [`Pending`] handle; [`LayerClient::confirm`] suspends until the cluster
/// confirms or rejects it, bounded by the configured timeout. A failed
/// request is never retried or patched up here: the caller has to rebuild it.
pub struct LayerClient {
    name: &'static str,
    connection: Connection,
    blockhash: BlockhashProvider,
    confirmation: ConfirmationSettings,
    encoding: AccountEncoding,
}

/// An in-flight submission, consumed exactly once by [`LayerClient::confirm`].
pub struct Pending {
    pub signature: Signature,
    response: ParsedResponse<fn(LazyValue) -> Option<bool>>,
}

/// Failures of the submission layer, per source.
#[derive(Debug)]
pub enum SubmitError {
    /// Network or RPC transport failure, opaque to this layer and
    /// propagated as-is.
    Transport(DynError),
    /// The cluster rejected the request (a structurally wrong request, e.g.
    /// bad opcode or account layout, ends up here). Retrying would resend
    /// the same wrong bytes, so it is surfaced instead.
    Rejected(Signature, String),
    /// The cluster neither confirmed nor rejected the transaction in time.
    Unconfirmed(Signature, Duration),
}

impl fmt::Display for SubmitError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Transport(err) => write!(f, "transport failure: {err}"),
            Self::Rejected(signature, reason) => {
                write!(f, "transaction {signature} was rejected: {reason}")
            }
            Self::Unconfirmed(signature, timeout) => {
                write!(f, "transaction {signature} was not confirmed within {timeout:?}")
            }
        }
    }
}

impl std::error::Error for SubmitError {}

impl LayerClient {
    pub async fn new(
        name: &'static str,
        url: &Url,
        ty: ConnectionType,
        config: &Config,
    ) -> HarnessResult<Self> {
        let connection = Connection::new(url, ty).await?;
        Ok(Self {
            name,
            connection,
            blockhash: BlockhashProvider::new(),
            confirmation: config.confirmation,
            encoding: config.data.account_encoding,
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// # Submit Request
    ///
    /// Signs the request into a fresh transaction (fresh blockhash included)
    /// and delivers it to this layer's endpoint.
    pub async fn submit(
        &mut self,
        request: SolanaInstruction,
        signer: &Keypair,
    ) -> Result<Pending, SubmitError> {
        let hash = self
            .blockhash
            .hash(&mut self.connection)
            .await
            .map_err(SubmitError::Transport)?;
        let tx = Transaction::new_signed_with_payer(
            &[request],
            Some(&signer.pubkey()),
            &[signer],
            hash,
        );
        let signature = tx.signatures[0];
        let request = Request::new(payload::transaction(&tx, self.confirmation.preflight_check));
        let extractor: fn(LazyValue) -> Option<bool> = send_response_extractor;
        let response = self.connection.send(request, extractor);
        Ok(Pending {
            signature,
            response,
        })
    }

    /// # Await Confirmation
    ///
    /// Resolves the delivery response, then polls the signature status until
    /// the cluster confirms or rejects the transaction, or the configured
    /// timeout elapses.
    pub async fn confirm(&mut self, pending: Pending) -> Result<Signature, SubmitError> {
        let Pending {
            signature,
            response,
        } = pending;
        match response.resolve().await {
            Ok(Some(true)) => (),
            Ok(_) => {
                let reason = "node did not acknowledge the transaction".to_string();
                return Err(SubmitError::Rejected(signature, reason));
            }
            Err(err) => return Err(classify(signature, err)),
        }

        let timeout = Duration::from_secs(self.confirmation.timeout_secs);
        let poll = Duration::from_millis(self.confirmation.poll_interval_ms);
        let deadline = Instant::now() + timeout;
        loop {
            let request = Request::new(payload::signature_statuses(&signature));
            let status = self
                .connection
                .send(request, signature_status_extractor)
                .resolve()
                .await
                .map_err(|err| classify(signature, err))?;
            match status {
                Some(SignatureStatus::Confirmed) => return Ok(signature),
                Some(SignatureStatus::Failed) => {
                    let reason = "execution failed on chain".to_string();
                    return Err(SubmitError::Rejected(signature, reason));
                }
                Some(SignatureStatus::Pending) | None => (),
            }
            if Instant::now() >= deadline {
                return Err(SubmitError::Unconfirmed(signature, timeout));
            }
            tokio::time::sleep(poll).await;
        }
    }

    /// Runs both submission phases back to back.
    pub async fn execute(
        &mut self,
        request: SolanaInstruction,
        signer: &Keypair,
    ) -> Result<Signature, SubmitError> {
        let pending = self.submit(request, signer).await?;
        self.confirm(pending).await
    }

    /// Current counter value of the record, if it exists on this layer.
    pub async fn counter(&mut self, record: &Pubkey) -> HarnessResult<Option<u64>> {
        let request = Request::new(payload::account_info(record, self.encoding));
        self.connection.send(request, counter_extractor).resolve().await
    }

    /// Current owner of the account on this layer.
    pub async fn owner(&mut self, account: &Pubkey) -> HarnessResult<Option<Pubkey>> {
        let request = Request::new(payload::account_info(account, self.encoding));
        self.connection.send(request, owner_extractor).resolve().await
    }

    pub async fn balance(&mut self, account: &Pubkey) -> HarnessResult<u64> {
        let request = Request::new(payload::balance(account));
        let balance = self
            .connection
            .send(request, balance_extractor)
            .resolve()
            .await?;
        Ok(balance.unwrap_or_default())
    }

    pub async fn airdrop(&mut self, account: &Pubkey, lamports: u64) -> HarnessResult<()> {
        let request = Request::new(payload::airdrop(account, lamports));
        let extractor: fn(LazyValue) -> Option<bool> = send_response_extractor;
        self.connection.send(request, extractor).resolve().await?;
        Ok(())
    }
}

/// Rejections reported by the node keep their reason; everything else is an
/// opaque transport failure.
fn classify(signature: Signature, err: DynError) -> SubmitError {
    match err.downcast::<RpcError>() {
        Ok(rejection) => SubmitError::Rejected(signature, rejection.0),
        Err(err) => SubmitError::Transport(err),
    }
}
