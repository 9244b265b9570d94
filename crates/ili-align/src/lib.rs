//! Landmark-based distance alignment and anomaly matching across in-line
//! inspection (ILI) runs.
//!
//! Each inspection run reports features at its own drifted odometry. This
//! crate calibrates a source run's distance axis onto a reference run's axis
//! using girth-weld landmarks ([`align_survey`]), finds an optimal one-to-one
//! correspondence between the two runs' corrosion features under a joint
//! distance/clock cost ([`match_anomalies`]), and consolidates matched depth
//! readings into one table per reference defect ([`pipeline::run`]).

mod aligner;
mod assignment;
mod interp;
mod io;
mod matcher;
pub mod pipeline;
mod table;

pub use aligner::{align_survey, AlignedSurvey, AlignerParams, AlignmentError, AnchorPair};
pub use assignment::solve_assignment;
pub use interp::{InterpolantError, PiecewiseLinear};
pub use io::{
    load_aligned_csv, load_survey_csv, write_aligned_csv, PipelineConfig, SurveySource,
    TableIoError,
};
pub use matcher::{match_anomalies, AnomalyMatch, MatcherParams};
pub use pipeline::{PipelineError, PipelineResult, YearOutcome};
pub use table::{ConsolidatedRow, ConsolidatedTable};
