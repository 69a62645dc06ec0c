//! Bounded, concurrent identity resolution

use std::collections::HashSet;

use futures::future::join_all;
use richchat_domain::constants::MAX_RESOLVE_BATCH_SIZE;
use richchat_domain::Identity;
use tracing::{debug, warn};

use super::ports::IdentityResolver;

/// Resolve `user_ids` in chunks of at most `batch_size` (clamped to 1..=50).
///
/// All chunks are issued concurrently. A failing chunk is logged and
/// contributes nothing; its ids stay unresolved. Results are merged in no
/// particular order, and identities the resolver returns for ids that were
/// not requested are discarded.
pub async fn resolve_in_batches(
    resolver: &dyn IdentityResolver,
    user_ids: &[String],
    batch_size: usize,
) -> Vec<Identity> {
    if user_ids.is_empty() {
        return Vec::new();
    }

    let batch_size = batch_size.clamp(1, MAX_RESOLVE_BATCH_SIZE);
    let batches: Vec<&[String]> = user_ids.chunks(batch_size).collect();
    debug!(ids = user_ids.len(), batches = batches.len(), "Resolving identities");

    let results = join_all(batches.iter().map(|batch| resolver.resolve_identities(batch))).await;

    let requested: HashSet<&str> = user_ids.iter().map(String::as_str).collect();
    let mut identities = Vec::new();
    for (index, result) in results.into_iter().enumerate() {
        match result {
            Ok(batch) => identities.extend(
                batch.into_iter().filter(|identity| requested.contains(identity.app_user_id.as_str())),
            ),
            Err(err) => {
                warn!(batch = index, size = batches[index].len(), error = %err, "Identity batch failed");
            }
        }
    }
    identities
}
