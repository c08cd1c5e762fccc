//! Parallel batch encoding over one shared lookup snapshot.
//!
//! Encoders hold no mutable state, so a batch is a plain parallel map. The
//! snapshot is only read; hot reload swaps in a new snapshot between batches.

use rayon::prelude::*;

use crate::material::MaterialLookup;
use crate::request::{EncodeRequest, EncodeResponse};

/// Errors that can occur while setting up a batch run.
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("failed to build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Batch encoding settings.
#[derive(Debug, Clone, Default)]
pub struct BatchConfig {
    /// Worker threads; 0 uses rayon's global pool.
    pub threads: usize,
}

/// Encodes every request in parallel. Output order matches input order.
pub fn encode_all<L>(
    lookup: &L,
    requests: &[EncodeRequest],
    config: &BatchConfig,
) -> Result<Vec<EncodeResponse>, BatchError>
where
    L: MaterialLookup + Sync + ?Sized,
{
    let run = || -> Vec<EncodeResponse> {
        requests
            .par_iter()
            .map(|req| req.encode(lookup))
            .collect()
    };

    let responses = if config.threads == 0 {
        run()
    } else {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.threads)
            .build()?;
        pool.install(run)
    };

    tracing::debug!(
        requests = requests.len(),
        threads = config.threads,
        "batch encoded"
    );
    Ok(responses)
}

/// Encodes every request on the calling thread.
pub fn encode_sequential<L>(lookup: &L, requests: &[EncodeRequest]) -> Vec<EncodeResponse>
where
    L: MaterialLookup + ?Sized,
{
    requests.iter().map(|req| req.encode(lookup)).collect()
}
