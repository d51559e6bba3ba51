use serde::{Deserialize, Serialize};

/// One nearest-neighbour candidate for a query descriptor.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Neighbor {
    /// Index into the train (target) feature set.
    pub train_idx: usize,
    /// Descriptor distance, never negative.
    pub distance: f32,
}

/// The k closest train descriptors for one query descriptor.
///
/// `candidates` is sorted by ascending distance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CandidateMatch {
    /// Index into the query (sample) feature set.
    pub query_idx: usize,
    pub candidates: Vec<Neighbor>,
}

impl CandidateMatch {
    pub fn new(query_idx: usize, candidates: Vec<Neighbor>) -> Self {
        Self {
            query_idx,
            candidates,
        }
    }

    /// Closest candidate, if any.
    #[inline]
    pub fn best(&self) -> Option<&Neighbor> {
        self.candidates.first()
    }

    /// Second-closest candidate, if any.
    #[inline]
    pub fn second_best(&self) -> Option<&Neighbor> {
        self.candidates.get(1)
    }
}

/// An accepted sample-to-target correspondence.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub query_idx: usize,
    pub train_idx: usize,
    pub distance: f32,
}
