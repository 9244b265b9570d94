//! Survey tables and feature records.

use serde::{Deserialize, Serialize};

use crate::clock::ClockReading;

/// One detected physical item on the pipeline, as reported by a single
/// inspection run.
///
/// `distance` is survey-local odometry in feet and drifts between runs; it is
/// only comparable across surveys after landmark alignment. `depth` is a wall
/// loss percentage and is meaningful only for corrosion-type rows.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SurveyRecord {
    pub distance: f64,
    #[serde(default)]
    pub clock: ClockReading,
    pub feature_type: String,
    #[serde(default)]
    pub depth: Option<f64>,
    #[serde(default)]
    pub length: Option<f64>,
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub survey_year: i32,
}

impl SurveyRecord {
    /// True for girth-weld landmark rows, the fixed physical reference points
    /// used for distance calibration.
    pub fn is_landmark(&self) -> bool {
        let t = self.feature_type.to_ascii_lowercase();
        t.contains("weld") || t.contains("gw")
    }

    /// True for metal-loss rows, the defect class tracked for growth.
    pub fn is_corrosion(&self) -> bool {
        let t = self.feature_type.to_ascii_lowercase();
        t.contains("loss") || t.contains("corrosion") || t.contains("pitting")
    }
}

/// An ordered collection of records from one inspection year.
///
/// Records are kept in file order and are *not* guaranteed sorted by
/// distance; consumers that need distance order must sort explicitly.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Survey {
    pub year: i32,
    pub records: Vec<SurveyRecord>,
}

impl Survey {
    pub fn new(year: i32, records: Vec<SurveyRecord>) -> Self {
        Self { year, records }
    }

    /// Indices of girth-weld landmark records, in file order.
    pub fn landmark_indices(&self) -> Vec<usize> {
        self.records
            .iter()
            .enumerate()
            .filter(|(_, r)| r.is_landmark())
            .map(|(i, _)| i)
            .collect()
    }

    /// Indices of corrosion records, in file order.
    pub fn corrosion_indices(&self) -> Vec<usize> {
        self.records
            .iter()
            .enumerate()
            .filter(|(_, r)| r.is_corrosion())
            .map(|(i, _)| i)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
