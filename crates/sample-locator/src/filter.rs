//! Nearest-neighbour distance-ratio filtering of k-NN candidates.

use sample_locator_core::{CandidateMatch, Match};

/// Keep the closest candidate of every k-NN list whose best distance is
/// strictly below `ratio` times the second-best distance.
///
/// Lists with fewer than two candidates cannot be disambiguated and are
/// dropped. Output order follows input order.
pub fn ratio_test(matches: &[CandidateMatch], ratio: f32) -> Vec<Match> {
    matches
        .iter()
        .filter_map(|m| {
            let best = m.best()?;
            let second = m.second_best()?;
            (best.distance < ratio * second.distance).then_some(Match {
                query_idx: m.query_idx,
                train_idx: best.train_idx,
                distance: best.distance,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sample_locator_core::Neighbor;

    fn cand(query_idx: usize, distances: &[f32]) -> CandidateMatch {
        CandidateMatch::new(
            query_idx,
            distances
                .iter()
                .enumerate()
                .map(|(i, &distance)| Neighbor {
                    train_idx: 10 * query_idx + i,
                    distance,
                })
                .collect(),
        )
    }

    #[test]
    fn distinct_best_is_accepted() {
        let out = ratio_test(&[cand(0, &[5.0, 10.0])], 0.75);
        assert_eq!(
            out,
            vec![Match {
                query_idx: 0,
                train_idx: 0,
                distance: 5.0
            }]
        );
    }

    #[test]
    fn close_second_is_still_accepted_below_ratio() {
        // 5 < 0.75 * 7 = 5.25
        assert_eq!(ratio_test(&[cand(0, &[5.0, 7.0])], 0.75).len(), 1);
    }

    #[test]
    fn ambiguous_best_is_rejected() {
        assert!(ratio_test(&[cand(0, &[6.0, 7.0])], 0.75).is_empty());
    }

    #[test]
    fn exact_boundary_is_rejected() {
        // 0.75 * 4 == 3 exactly in f32.
        assert!(ratio_test(&[cand(0, &[3.0, 4.0])], 0.75).is_empty());
    }

    #[test]
    fn single_or_empty_candidate_lists_are_dropped() {
        let out = ratio_test(&[cand(0, &[1.0]), cand(1, &[]), cand(2, &[1.0, 9.0])], 0.75);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].query_idx, 2);
        assert_eq!(out[0].train_idx, 20);
    }

    #[test]
    fn order_is_stable() {
        let input: Vec<_> = (0..6).map(|i| cand(i, &[1.0, 10.0])).collect();
        let out = ratio_test(&input, 0.75);
        let ids: Vec<_> = out.iter().map(|m| m.query_idx).collect();
        assert_eq!(ids, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert!(ratio_test(&[], 0.75).is_empty());
    }
}
