use app_core::types::HarnessResult;
use std::time::{Duration, Instant};

use hash::Hash;
use hyper::Request;

use crate::{extractor::blockhash_extractor, http::Connection, payload};

/// Blockhash refresh interval (23 seconds).
/// Blockhashes expire at ~60s; 23s leaves a wide validity margin between
/// signing and submission.
const BLOCKHASH_REFRESH: Duration = Duration::from_secs(23);

/// # Blockhash Provider
///
/// Fetches and caches the latest blockhash of one endpoint. The cached value
/// is reused while it is fresh and re-requested once it crosses the refresh
/// interval, so every signed transaction carries a hash with plenty of
/// lifetime left.
pub struct BlockhashProvider {
    cached: Option<(Hash, Instant)>,
}

impl BlockhashProvider {
    pub fn new() -> Self {
        Self { cached: None }
    }

    /// Returns a blockhash that is safe to sign with, refreshing the cache
    /// over `connection` when needed.
    pub async fn hash(&mut self, connection: &mut Connection) -> HarnessResult<Hash> {
        if let Some((hash, fetched)) = self.cached {
            if fetched.elapsed() < BLOCKHASH_REFRESH {
                return Ok(hash);
            }
        }
        let request = Request::new(payload::blockhash());
        let hash = connection
            .send(request, blockhash_extractor)
            .resolve()
            .await
            .inspect_err(|err| tracing::error!(%err, "error fetching blockhash"))?
            .ok_or("blockhash was not found in response for getLatestBlockhash")?;
        self.cached.replace((hash, Instant::now()));
        Ok(hash)
    }
}
