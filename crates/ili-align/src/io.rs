//! Boundary IO: standardized survey tables (CSV) and the pipeline
//! configuration (JSON).
//!
//! All exchange with upstream ingestion and downstream forecasting/reporting
//! stages happens through whole-table files; nothing outside this crate
//! calls into the alignment internals.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use ili_align_core::{ClockReading, Survey, SurveyRecord};

use crate::aligner::{AlignedSurvey, AlignerParams};
use crate::matcher::MatcherParams;

#[derive(thiserror::Error, Debug)]
pub enum TableIoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Load a standardized per-year survey table.
///
/// Expected columns: `distance,clock,feature_type,depth,length,width,
/// survey_year`. The survey's year tag is taken from the first record.
pub fn load_survey_csv(path: impl AsRef<Path>) -> Result<Survey, TableIoError> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut records = Vec::new();
    for row in reader.deserialize::<SurveyRecord>() {
        records.push(row?);
    }
    let year = records.first().map(|r: &SurveyRecord| r.survey_year).unwrap_or(0);
    Ok(Survey::new(year, records))
}

// csv's serde support cannot flatten nested structs, so aligned rows are
// spelled out field by field.
#[derive(Serialize, Deserialize)]
struct AlignedRow {
    distance: f64,
    #[serde(default)]
    clock: ClockReading,
    feature_type: String,
    #[serde(default)]
    depth: Option<f64>,
    #[serde(default)]
    length: Option<f64>,
    #[serde(default)]
    width: Option<f64>,
    #[serde(default)]
    survey_year: i32,
    aligned_distance: f64,
}

/// Write an aligned survey: the input schema plus `aligned_distance`.
pub fn write_aligned_csv(
    path: impl AsRef<Path>,
    aligned: &AlignedSurvey,
) -> Result<(), TableIoError> {
    let mut writer = csv::Writer::from_path(path)?;
    for (record, &aligned_distance) in aligned.survey.records.iter().zip(&aligned.aligned_distance)
    {
        writer.serialize(AlignedRow {
            distance: record.distance,
            clock: record.clock,
            feature_type: record.feature_type.clone(),
            depth: record.depth,
            length: record.length,
            width: record.width,
            survey_year: record.survey_year,
            aligned_distance,
        })?;
    }
    writer.flush()?;
    Ok(())
}

/// Load a previously written aligned survey table.
pub fn load_aligned_csv(path: impl AsRef<Path>) -> Result<AlignedSurvey, TableIoError> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut records = Vec::new();
    let mut aligned_distance = Vec::new();
    for row in reader.deserialize::<AlignedRow>() {
        let row = row?;
        aligned_distance.push(row.aligned_distance);
        records.push(SurveyRecord {
            distance: row.distance,
            clock: row.clock,
            feature_type: row.feature_type,
            depth: row.depth,
            length: row.length,
            width: row.width,
            survey_year: row.survey_year,
        });
    }
    let year = records.first().map(|r| r.survey_year).unwrap_or(0);
    Ok(AlignedSurvey {
        survey: Survey::new(year, records),
        aligned_distance,
        anchors: Vec::new(),
    })
}

/// One configured survey year and its standardized table.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SurveySource {
    pub year: i32,
    pub path: PathBuf,
}

/// Configuration for a full consolidation run.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// All survey years, including the reference.
    pub surveys: Vec<SurveySource>,
    /// The year every other survey is aligned and matched against.
    pub reference_year: i32,
    /// Where to write the consolidated table. The table is re-written after
    /// every successful year join so earlier columns survive later failures.
    #[serde(default)]
    pub output_path: Option<PathBuf>,
    #[serde(default)]
    pub aligner: AlignerParams,
    #[serde(default)]
    pub matcher: MatcherParams,
}

impl PipelineConfig {
    /// Load a JSON config from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, TableIoError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), TableIoError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Resolve the consolidated output path.
    pub fn output_path(&self) -> PathBuf {
        self.output_path
            .clone()
            .unwrap_or_else(|| PathBuf::from("consolidated.csv"))
    }
}
