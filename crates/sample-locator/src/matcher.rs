//! Candidate correspondence generation.

use sample_locator_core::{CandidateMatch, Descriptor, Neighbor};

/// k-nearest-neighbour search between two descriptor sets.
///
/// Implementations return one [`CandidateMatch`] per query descriptor that
/// has at least one candidate, with candidates sorted by ascending distance.
pub trait KnnMatcher: Send + Sync {
    fn knn_match(&self, query: &[Descriptor], train: &[Descriptor], k: usize)
        -> Vec<CandidateMatch>;
}

impl<M: KnnMatcher + ?Sized> KnnMatcher for Box<M> {
    fn knn_match(
        &self,
        query: &[Descriptor],
        train: &[Descriptor],
        k: usize,
    ) -> Vec<CandidateMatch> {
        (**self).knn_match(query, train, k)
    }
}

/// Exhaustive Euclidean matcher: every query against every train descriptor.
/// Ties keep the lower train index first.
#[derive(Clone, Copy, Debug, Default)]
pub struct BruteForceMatcher;

impl BruteForceMatcher {
    pub fn new() -> Self {
        Self
    }
}

impl KnnMatcher for BruteForceMatcher {
    fn knn_match(
        &self,
        query: &[Descriptor],
        train: &[Descriptor],
        k: usize,
    ) -> Vec<CandidateMatch> {
        if k == 0 || train.is_empty() {
            return Vec::new();
        }
        query
            .iter()
            .enumerate()
            .filter_map(|(query_idx, q)| {
                let candidates = nearest_k(q, train, k);
                (!candidates.is_empty()).then(|| CandidateMatch::new(query_idx, candidates))
            })
            .collect()
    }
}

fn nearest_k(query: &Descriptor, train: &[Descriptor], k: usize) -> Vec<Neighbor> {
    // Squared distances while searching, converted once at the end.
    let mut best: Vec<Neighbor> = Vec::with_capacity(k + 1);
    for (train_idx, t) in train.iter().enumerate() {
        let d2 = query.distance_l2_squared(t);
        if !d2.is_finite() {
            continue;
        }
        if best.len() == k && d2 >= best[k - 1].distance {
            continue;
        }
        let pos = best.partition_point(|n| n.distance <= d2);
        best.insert(
            pos,
            Neighbor {
                train_idx,
                distance: d2,
            },
        );
        best.truncate(k);
    }
    for n in &mut best {
        n.distance = n.distance.sqrt();
    }
    best
}
