//! Landmark-based distance calibration.
//!
//! Every inspection run accumulates its own odometry drift, so raw distances
//! from two runs are not directly comparable. Girth welds are permanent and
//! identifiable in every run, which makes them usable as anchors: pair each
//! reference weld with the nearest unclaimed source weld, then fit a
//! piecewise-linear map from source odometry to reference odometry and
//! evaluate it at every source record.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use ili_align_core::{Survey, SurveyRecord};

use crate::interp::{InterpolantError, PiecewiseLinear};

/// Landmark pairing settings.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct AlignerParams {
    /// Maximum |distance| gap, in feet, for a reference weld to claim a
    /// source weld. Welds further apart than this are assumed to be
    /// different joints.
    pub window_ft: f64,
}

impl Default for AlignerParams {
    fn default() -> Self {
        Self { window_ft: 20.0 }
    }
}

/// Errors that invalidate a year's alignment.
#[derive(thiserror::Error, Debug)]
pub enum AlignmentError {
    /// Fewer than two landmark pairs were committed; a one-point (or empty)
    /// mapping is undefined and must not silently propagate.
    #[error("insufficient girth-weld anchors: {found} committed, need at least 2")]
    InsufficientAnchors { found: usize },
    /// Two committed anchors share a source distance, giving a zero-length
    /// segment with an undefined slope.
    #[error("degenerate girth-weld anchors at source distance {distance} ft")]
    DegenerateAnchors { distance: f64 },
}

/// A committed landmark correspondence between one source weld and one
/// reference weld.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnchorPair {
    /// Record index into the source survey.
    pub source_index: usize,
    /// Record index into the reference survey.
    pub reference_index: usize,
    pub source_distance: f64,
    pub reference_distance: f64,
}

/// A source survey carried into the reference distance frame.
///
/// `aligned_distance` is parallel to `survey.records`: entry `i` is record
/// `i`'s raw distance mapped through the landmark calibration.
#[derive(Clone, Debug)]
pub struct AlignedSurvey {
    pub survey: Survey,
    pub aligned_distance: Vec<f64>,
    pub anchors: Vec<AnchorPair>,
}

impl AlignedSurvey {
    pub fn year(&self) -> i32 {
        self.survey.year
    }
}

/// Calibrate `source`'s distance axis onto `reference`'s axis.
///
/// Returns a new [`AlignedSurvey`]; neither input is mutated. Fails when
/// fewer than two landmark pairs commit inside the window, or when committed
/// anchors are degenerate.
pub fn align_survey(
    source: &Survey,
    reference: &Survey,
    params: &AlignerParams,
) -> Result<AlignedSurvey, AlignmentError> {
    let anchors = pair_landmarks(source, reference, params.window_ft);
    info!(
        "aligning {} to {}: {} girth-weld anchor pairs committed",
        source.year,
        reference.year,
        anchors.len()
    );

    let points: Vec<(f64, f64)> = anchors
        .iter()
        .map(|a| (a.source_distance, a.reference_distance))
        .collect();
    let map = PiecewiseLinear::new(points).map_err(|e| match e {
        InterpolantError::NotEnoughPoints { found } => {
            AlignmentError::InsufficientAnchors { found }
        }
        InterpolantError::DuplicateX { x } => AlignmentError::DegenerateAnchors { distance: x },
    })?;

    let aligned_distance: Vec<f64> = source.records.iter().map(|r| map.eval(r.distance)).collect();

    Ok(AlignedSurvey {
        survey: source.clone(),
        aligned_distance,
        anchors,
    })
}

/// Greedily pair reference landmarks with the nearest unclaimed source
/// landmark.
///
/// Both landmark sets are sorted by distance first: upstream tables do not
/// guarantee distance order, and the greedy sweep is only well-defined on
/// sorted input. The claimed pool is local to this call, so repeated calls
/// with the same input commit the same pairs.
fn pair_landmarks(source: &Survey, reference: &Survey, window_ft: f64) -> Vec<AnchorPair> {
    let mut src: Vec<(usize, f64)> = landmark_distances(&source.records);
    let mut refs: Vec<(usize, f64)> = landmark_distances(&reference.records);
    src.sort_by(|a, b| a.1.total_cmp(&b.1));
    refs.sort_by(|a, b| a.1.total_cmp(&b.1));

    if src.is_empty() || refs.is_empty() {
        warn!(
            "no girth welds to pair ({} in source, {} in reference)",
            src.len(),
            refs.len()
        );
        return Vec::new();
    }

    let mut claimed = vec![false; src.len()];
    let mut anchors = Vec::new();

    for &(ref_index, ref_distance) in &refs {
        let mut nearest: Option<(usize, f64)> = None;
        for (pool_idx, &(_, src_distance)) in src.iter().enumerate() {
            if claimed[pool_idx] {
                continue;
            }
            let gap = (src_distance - ref_distance).abs();
            // Strict improvement keeps ties deterministic: the lowest
            // source distance wins.
            if nearest.is_none_or(|(_, best)| gap < best) {
                nearest = Some((pool_idx, gap));
            }
        }
        let Some((pool_idx, gap)) = nearest else {
            break; // pool exhausted
        };
        if gap < window_ft {
            let (source_index, source_distance) = src[pool_idx];
            claimed[pool_idx] = true;
            anchors.push(AnchorPair {
                source_index,
                reference_index: ref_index,
                source_distance,
                reference_distance: ref_distance,
            });
        } else {
            debug!(
                "reference weld at {ref_distance:.1} ft unmatched (nearest gap {gap:.1} ft)"
            );
        }
    }

    anchors
}

fn landmark_distances(records: &[SurveyRecord]) -> Vec<(usize, f64)> {
    records
        .iter()
        .enumerate()
        .filter(|(_, r)| r.is_landmark())
        .map(|(i, r)| (i, r.distance))
        .collect()
}
