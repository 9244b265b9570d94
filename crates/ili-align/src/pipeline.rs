//! Full consolidation run: load, align, match, join.
//!
//! The pipeline is a linear sequence with per-year degradation: a year whose
//! table fails to load or whose alignment fails is logged and skipped, and
//! every other year still contributes its depth column. The consolidated
//! table is re-written after each successful join so earlier columns survive
//! a later failure.

use log::{error, info, warn};

use ili_align_core::Survey;

use crate::aligner::align_survey;
use crate::io::{load_survey_csv, PipelineConfig, TableIoError};
use crate::matcher::match_anomalies;
use crate::table::ConsolidatedTable;

#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error("reference year {year} not found in configured surveys")]
    MissingReferenceYear { year: i32 },
    #[error("no cross-year matches for baseline year {year}; nothing to consolidate")]
    NoBaselineMatches { year: i32 },
    #[error(transparent)]
    Io(#[from] TableIoError),
}

/// Outcome of one non-reference year's contribution.
#[derive(Clone, Debug)]
pub struct YearOutcome {
    pub year: i32,
    /// Committed girth-weld anchor pairs, when alignment ran.
    pub anchors: usize,
    /// Accepted anomaly matches against the reference.
    pub matches: usize,
    /// Why this year contributed nothing, when it failed.
    pub failure: Option<String>,
}

/// Result of a full consolidation run.
#[derive(Clone, Debug)]
pub struct PipelineResult {
    pub table: ConsolidatedTable,
    pub outcomes: Vec<YearOutcome>,
}

/// Run the full pipeline described by `config`.
///
/// Fatal errors are limited to: a missing/unreadable reference table, a
/// reference year absent from the configuration, a failed write of the
/// consolidated table, and a first processed year with zero matches (there
/// is no baseline join target without it). Everything else degrades to a
/// missing column.
pub fn run(config: &PipelineConfig) -> Result<PipelineResult, PipelineError> {
    let reference_source = config
        .surveys
        .iter()
        .find(|s| s.year == config.reference_year)
        .ok_or(PipelineError::MissingReferenceYear {
            year: config.reference_year,
        })?;
    let reference = load_reference(config, &reference_source.path)?;

    let years: Vec<i32> = config.surveys.iter().map(|s| s.year).collect();
    let mut table = ConsolidatedTable::from_reference(&reference, years);
    info!(
        "consolidating {} reference corrosion features from {}",
        table.rows.len(),
        reference.year
    );

    let mut outcomes = Vec::new();
    let mut joined_any = false;

    for source in config.surveys.iter().filter(|s| s.year != config.reference_year) {
        let mut outcome = YearOutcome {
            year: source.year,
            anchors: 0,
            matches: 0,
            failure: None,
        };

        match process_year(config, source.year, &source.path, &reference, &mut table) {
            Ok((anchors, matches)) => {
                outcome.anchors = anchors;
                outcome.matches = matches;
                if !joined_any && matches == 0 {
                    // The first processed year establishes the baseline for
                    // growth estimation; with no matches there is nothing
                    // to consolidate against.
                    return Err(PipelineError::NoBaselineMatches { year: source.year });
                }
                joined_any = true;

                if let Some(path) = &config.output_path {
                    table.write_csv(path)?;
                    info!("wrote consolidated table to {}", path.display());
                }
            }
            Err(failure) => {
                error!("year {} skipped: {failure}", source.year);
                outcome.failure = Some(failure);
            }
        }
        outcomes.push(outcome);
    }

    Ok(PipelineResult { table, outcomes })
}

fn load_reference(config: &PipelineConfig, path: &std::path::Path) -> Result<Survey, PipelineError> {
    let mut reference = load_survey_csv(path)?;
    if reference.year != config.reference_year && !reference.is_empty() {
        warn!(
            "reference table {} is tagged {} but configured as {}",
            path.display(),
            reference.year,
            config.reference_year
        );
    }
    reference.year = config.reference_year;
    Ok(reference)
}

/// Align and match one non-reference year, joining its depths into the
/// table. Returns `(anchor count, match count)`; any failure is reported as
/// a message so the caller can degrade instead of aborting.
fn process_year(
    config: &PipelineConfig,
    year: i32,
    path: &std::path::Path,
    reference: &Survey,
    table: &mut ConsolidatedTable,
) -> Result<(usize, usize), String> {
    let mut survey = load_survey_csv(path).map_err(|e| format!("load failed: {e}"))?;
    if survey.year != year && !survey.is_empty() {
        warn!(
            "survey table {} is tagged {} but configured as {}",
            path.display(),
            survey.year,
            year
        );
    }
    survey.year = year;

    let aligned =
        align_survey(&survey, reference, &config.aligner).map_err(|e| e.to_string())?;
    let matches = match_anomalies(&aligned, reference, &config.matcher);
    table.fill_year(year, &matches, &aligned);

    Ok((aligned.anchors.len(), matches.len()))
}
