use thiserror::Error;

use crate::models::{ExclusionSet, FeatureVector, ItemId};
use crate::services::catalog::Catalog;
use crate::services::similarity::cosine_similarity;

/// Every catalog item is already excluded
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("No unseen items remain in the catalog")]
pub struct NoCandidatesError;

/// Result of a greedy batch selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    pub items: Vec<ItemId>,
    /// True when the catalog ran out before `k` items were chosen
    pub exhausted: bool,
}

/// Picks the unseen item most similar to the user vector and marks it excluded
///
/// Full scan over the catalog, O(N x D). Equal scores resolve to the lowest item id so
/// the choice does not depend on file order.
pub fn select_next(
    user_vector: &FeatureVector,
    exclusion: &mut ExclusionSet,
    catalog: &Catalog,
) -> Result<ItemId, NoCandidatesError> {
    let mut best: Option<(ItemId, f64)> = None;

    for (id, vector) in catalog.entries() {
        if exclusion.contains(id) {
            continue;
        }

        let score = cosine_similarity(user_vector, vector);
        let better = match best {
            None => true,
            Some((best_id, best_score)) => score > best_score || (score == best_score && id < best_id),
        };
        if better {
            best = Some((id, score));
        }
    }

    let (id, score) = best.ok_or(NoCandidatesError)?;
    exclusion.insert(id);

    tracing::debug!(item_id = %id, score, excluded = exclusion.len(), "Selected next item");

    Ok(id)
}

/// Greedily selects up to `k` distinct items, each call seeing the previous exclusions
///
/// Stops early without padding when the catalog is exhausted.
pub fn select_batch(
    user_vector: &FeatureVector,
    exclusion: &mut ExclusionSet,
    catalog: &Catalog,
    k: usize,
) -> Batch {
    let mut items = Vec::with_capacity(k);

    for _ in 0..k {
        match select_next(user_vector, exclusion, catalog) {
            Ok(id) => items.push(id),
            Err(NoCandidatesError) => {
                return Batch {
                    items,
                    exhausted: true,
                }
            }
        }
    }

    Batch {
        items,
        exhausted: false,
    }
}
