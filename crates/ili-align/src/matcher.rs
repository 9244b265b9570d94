//! Corrosion anomaly correspondence.
//!
//! Builds a joint distance/clock cost between every source and reference
//! corrosion feature, then solves a minimum-cost one-to-one assignment over
//! the full matrix. Pairs further apart than the distance gate are forbidden
//! via a sentinel cost chosen so the solver can never prefer a forbidden
//! pair while a fully feasible assignment exists.

use log::{info, warn};
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use ili_align_core::{clock_gap, Survey};

use crate::aligner::AlignedSurvey;
use crate::assignment::solve_assignment;

/// Cost-model settings for anomaly matching.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct MatcherParams {
    /// Pairs further apart than this (feet, in the reference frame) are
    /// forbidden outright.
    pub distance_gate_ft: f64,
    /// Weight of the circular clock gap relative to the distance gap.
    pub clock_weight: f64,
    /// Assigned pairs with a cost at or above this are discarded.
    pub accept_threshold: f64,
}

impl Default for MatcherParams {
    fn default() -> Self {
        Self {
            distance_gate_ft: 10.0,
            clock_weight: 2.0,
            accept_threshold: 50.0,
        }
    }
}

impl MatcherParams {
    /// Largest cost a non-forbidden pair can reach: the distance gate plus
    /// the weighted half-dial clock gap.
    fn max_feasible_cost(&self) -> f64 {
        self.distance_gate_ft + self.clock_weight * 6.0
    }

    /// Sentinel for forbidden pairs.
    ///
    /// Any assignment containing one forbidden pair costs at least the
    /// sentinel, while an assignment of `k <= size` feasible pairs costs at
    /// most `max_feasible_cost * size`; the sentinel therefore dominates
    /// every feasible completion. It also clears `accept_threshold`, so a
    /// forbidden pair that gets assigned anyway (because no feasible partner
    /// exists) is discarded afterwards.
    fn forbidden_cost(&self, size: usize) -> f64 {
        self.max_feasible_cost() * size as f64 + self.accept_threshold
    }
}

/// A committed correspondence between one source corrosion record and one
/// reference corrosion record. Indices point into the full record lists of
/// the respective surveys.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnomalyMatch {
    pub source_index: usize,
    pub reference_index: usize,
}

/// Match corrosion anomalies of an aligned source survey against the
/// reference survey.
///
/// The result is deterministic for fixed inputs; assignment costs are
/// intermediate only and not retained.
pub fn match_anomalies(
    source: &AlignedSurvey,
    reference: &Survey,
    params: &MatcherParams,
) -> Vec<AnomalyMatch> {
    let src_idx = source.survey.corrosion_indices();
    let ref_idx = reference.corrosion_indices();

    if src_idx.is_empty() || ref_idx.is_empty() {
        warn!(
            "no corrosion anomalies to match ({} in {}, {} in {})",
            src_idx.len(),
            source.year(),
            ref_idx.len(),
            reference.year
        );
        return Vec::new();
    }

    let src_hours: Vec<f64> = src_idx
        .iter()
        .map(|&i| source.survey.records[i].clock.hour())
        .collect();
    let ref_hours: Vec<f64> = ref_idx
        .iter()
        .map(|&j| reference.records[j].clock.hour())
        .collect();

    let size = src_idx.len().min(ref_idx.len());
    let forbidden = params.forbidden_cost(size);
    let costs = DMatrix::from_fn(src_idx.len(), ref_idx.len(), |r, c| {
        let distance_gap =
            (source.aligned_distance[src_idx[r]] - reference.records[ref_idx[c]].distance).abs();
        pair_cost(distance_gap, clock_gap(src_hours[r], ref_hours[c]), params)
            .unwrap_or(forbidden)
    });

    let assigned = solve_assignment(&costs);
    let matches: Vec<AnomalyMatch> = assigned
        .into_iter()
        .filter(|&(r, c)| costs[(r, c)] < params.accept_threshold)
        .map(|(r, c)| AnomalyMatch {
            source_index: src_idx[r],
            reference_index: ref_idx[c],
        })
        .collect();

    info!(
        "matched {}/{} corrosion anomalies from {} against {} in {}",
        matches.len(),
        src_idx.len(),
        source.year(),
        ref_idx.len(),
        reference.year
    );

    matches
}

/// Joint cost of pairing two corrosion records, or `None` when the pair is
/// outside the distance gate.
fn pair_cost(distance_gap: f64, clock_gap: f64, params: &MatcherParams) -> Option<f64> {
    if distance_gap < params.distance_gate_ft {
        Some(distance_gap + params.clock_weight * clock_gap)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ili_align_core::{ClockReading, SurveyRecord};

    fn loss(distance: f64, clock_hour: f64) -> SurveyRecord {
        SurveyRecord {
            distance,
            clock: ClockReading::NumericHour(clock_hour),
            feature_type: "Metal Loss".to_string(),
            depth: Some(20.0),
            length: None,
            width: None,
            survey_year: 0,
        }
    }

    fn weld(distance: f64) -> SurveyRecord {
        SurveyRecord {
            feature_type: "Girth Weld".to_string(),
            depth: None,
            ..loss(distance, 0.0)
        }
    }

    /// Wrap a survey as "already aligned" with identity distances.
    fn identity_aligned(survey: Survey) -> AlignedSurvey {
        let aligned_distance = survey.records.iter().map(|r| r.distance).collect();
        AlignedSurvey {
            survey,
            aligned_distance,
            anchors: Vec::new(),
        }
    }

    #[test]
    fn close_pair_costs_the_joint_gap_and_is_accepted() {
        let params = MatcherParams::default();
        let cost = pair_cost(0.3, clock_gap(6.0, 6.1), &params).expect("feasible");
        assert_relative_eq!(cost, 0.5, epsilon = 1e-9);
        assert!(cost < params.accept_threshold);

        let source = identity_aligned(Survey::new(2015, vec![loss(52.0, 6.0)]));
        let reference = Survey::new(2022, vec![loss(52.3, 6.1)]);
        let matches = match_anomalies(&source, &reference, &params);
        assert_eq!(
            matches,
            vec![AnomalyMatch {
                source_index: 0,
                reference_index: 0
            }]
        );
    }

    #[test]
    fn clock_gap_is_circular_in_the_cost() {
        let params = MatcherParams::default();
        // 11 o'clock vs 1 o'clock is 2 hours across midnight, not 10.
        let cost = pair_cost(0.0, clock_gap(11.0, 1.0), &params).expect("feasible");
        assert_relative_eq!(cost, 4.0);
    }

    #[test]
    fn pairs_beyond_the_distance_gate_are_forbidden() {
        let params = MatcherParams::default();
        assert!(pair_cost(10.0, 0.0, &params).is_none());
        assert!(pair_cost(25.0, 0.0, &params).is_none());

        // A forced forbidden assignment (only one pair possible) must be
        // rejected by the threshold, not returned.
        let source = identity_aligned(Survey::new(2015, vec![loss(0.0, 6.0)]));
        let reference = Survey::new(2022, vec![loss(100.0, 6.0)]);
        assert!(match_anomalies(&source, &reference, &params).is_empty());
    }

    #[test]
    fn assignment_is_globally_optimal_not_greedy() {
        // Source anomalies at 0 and 1 ft; reference at 1 and 2 ft. Greedy
        // would pair (0 -> 1ft) leaving (1 -> 2ft): total 2. The optimum
        // pairs by order for a total of 2 as well, but with distinct clocks
        // the cross pairing becomes clearly worse.
        let source = identity_aligned(Survey::new(
            2015,
            vec![loss(50.0, 3.0), loss(51.0, 9.0)],
        ));
        let reference = Survey::new(2022, vec![loss(50.2, 3.0), loss(51.1, 9.0)]);
        let matches = match_anomalies(&source, &reference, &MatcherParams::default());
        assert_eq!(
            matches,
            vec![
                AnomalyMatch {
                    source_index: 0,
                    reference_index: 0
                },
                AnomalyMatch {
                    source_index: 1,
                    reference_index: 1
                },
            ]
        );
    }

    #[test]
    fn empty_corrosion_sets_yield_no_matches() {
        let source = identity_aligned(Survey::new(2015, vec![weld(10.0)]));
        let reference = Survey::new(2022, vec![loss(10.0, 3.0)]);
        assert!(match_anomalies(&source, &reference, &MatcherParams::default()).is_empty());
    }

    #[test]
    fn matches_are_one_to_one() {
        // Two source anomalies near one reference anomaly: only one match.
        let source = identity_aligned(Survey::new(
            2015,
            vec![loss(50.0, 6.0), loss(50.5, 6.0)],
        ));
        let reference = Survey::new(2022, vec![loss(50.2, 6.0)]);
        let matches = match_anomalies(&source, &reference, &MatcherParams::default());
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].reference_index, 0);
    }

    #[test]
    fn indices_refer_to_full_record_lists() {
        // Corrosion rows interleaved with welds: match indices must point at
        // the original row positions, not the filtered positions.
        let source = identity_aligned(Survey::new(
            2015,
            vec![weld(0.0), loss(50.0, 6.0), weld(100.0)],
        ));
        let reference = Survey::new(2022, vec![weld(1.0), weld(49.0), loss(50.1, 6.0)]);
        let matches = match_anomalies(&source, &reference, &MatcherParams::default());
        assert_eq!(
            matches,
            vec![AnomalyMatch {
                source_index: 1,
                reference_index: 2
            }]
        );
    }

    #[test]
    fn forbidden_sentinel_dominates_feasible_assignments() {
        let params = MatcherParams::default();
        for size in [1usize, 10, 200] {
            assert!(params.forbidden_cost(size) > params.max_feasible_cost() * size as f64);
            assert!(params.forbidden_cost(size) >= params.accept_threshold);
        }
    }
}
