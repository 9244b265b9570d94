use std::path::{Path, PathBuf};

use ili_align::pipeline;
use ili_align::{
    align_survey, load_survey_csv, match_anomalies, AlignerParams, MatcherParams, PipelineConfig,
    PipelineError, SurveySource,
};

fn write_table(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    let header = "distance,clock,feature_type,depth,length,width,survey_year\n";
    std::fs::write(&path, format!("{header}{body}")).expect("write table");
    path
}

/// Reference run: three girth welds and three corrosion sites.
fn reference_2022(dir: &Path) -> PathBuf {
    write_table(
        dir,
        "ili_2022.csv",
        "12.0,,Girth Weld,,,,2022\n\
         53.3,6.1,Metal Loss,40.0,1.5,0.9,2022\n\
         208.0,,Girth Weld,,,,2022\n\
         300.0,3,Internal Corrosion,25.0,1.0,0.5,2022\n\
         410.5,9,Metal Loss,55.0,2.0,1.1,2022\n\
         415.0,,Girth Weld,,,,2022\n",
    )
}

/// Source run with ~2% odometry drift relative to the 2022 reference. Its
/// corrosion sites at raw 52 and 299 land near the first two reference
/// sites once aligned; nothing matches the third.
fn survey_2015(dir: &Path) -> PathBuf {
    write_table(
        dir,
        "ili_2015.csv",
        "10.0,,GW,,,,2015\n\
         52.0,06:00:00,Metal Loss,30.0,1.4,0.8,2015\n\
         210.0,,GW,,,,2015\n\
         299.0,3,Pitting,20.0,0.9,0.4,2015\n\
         410.0,,GW,,,,2015\n",
    )
}

/// A run with a single weld: alignment cannot commit two anchors.
fn survey_2007_unalignable(dir: &Path) -> PathBuf {
    write_table(
        dir,
        "ili_2007.csv",
        "100.0,,Girth Weld,,,,2007\n\
         150.0,3,Metal Loss,10.0,,,2007\n",
    )
}

#[test]
fn aligns_and_matches_across_drifted_runs() {
    let dir = tempfile::tempdir().expect("tempdir");
    let reference = load_survey_csv(reference_2022(dir.path())).expect("reference");
    let source = load_survey_csv(survey_2015(dir.path())).expect("source");

    let aligned = align_survey(&source, &reference, &AlignerParams::default()).expect("align");
    assert_eq!(aligned.anchors.len(), 3);
    // The middle weld lands exactly on its reference counterpart.
    assert!((aligned.aligned_distance[2] - 208.0).abs() < 1e-9);

    let matches = match_anomalies(&aligned, &reference, &MatcherParams::default());
    assert_eq!(matches.len(), 2);
    // Raw 52 ft maps to ~53.16 ft, next to the reference site at 53.3 ft.
    assert!(matches
        .iter()
        .any(|m| m.source_index == 1 && m.reference_index == 1));
    assert!(matches
        .iter()
        .any(|m| m.source_index == 3 && m.reference_index == 3));
}

#[test]
fn pipeline_consolidates_depths_and_degrades_failed_years() {
    let dir = tempfile::tempdir().expect("tempdir");
    let output = dir.path().join("consolidated.csv");
    let config = PipelineConfig {
        surveys: vec![
            SurveySource {
                year: 2015,
                path: survey_2015(dir.path()),
            },
            SurveySource {
                year: 2007,
                path: survey_2007_unalignable(dir.path()),
            },
            SurveySource {
                year: 2022,
                path: reference_2022(dir.path()),
            },
        ],
        reference_year: 2022,
        output_path: Some(output.clone()),
        aligner: AlignerParams::default(),
        matcher: MatcherParams::default(),
    };

    let result = pipeline::run(&config).expect("run");

    // One row per reference corrosion feature.
    assert_eq!(result.table.rows.len(), 3);
    assert_eq!(result.table.years, vec![2015, 2007, 2022]);

    // 2015 matched two sites, 2007 failed alignment and contributed nothing.
    assert_eq!(result.table.filled_count(2022), 3);
    assert_eq!(result.table.filled_count(2015), 2);
    assert_eq!(result.table.filled_count(2007), 0);

    let depths_2015: Vec<Option<f64>> = result
        .table
        .rows
        .iter()
        .map(|r| r.depths[0])
        .collect();
    assert_eq!(depths_2015, vec![Some(30.0), Some(20.0), None]);

    let outcome_2015 = &result.outcomes[0];
    assert_eq!(outcome_2015.year, 2015);
    assert_eq!(outcome_2015.anchors, 3);
    assert_eq!(outcome_2015.matches, 2);
    assert!(outcome_2015.failure.is_none());

    let outcome_2007 = &result.outcomes[1];
    assert_eq!(outcome_2007.year, 2007);
    assert!(outcome_2007.failure.is_some());

    // The 2015 join was persisted before 2007 failed.
    let text = std::fs::read_to_string(&output).expect("read output");
    let header = text.lines().next().expect("header");
    assert_eq!(header, "distance,clock,depth_2015,depth_2007,depth_2022");
    assert!(text.lines().nth(1).expect("row").starts_with("53.3,6.1,30,"));
}

#[test]
fn pipeline_aborts_when_the_baseline_year_has_no_matches() {
    let dir = tempfile::tempdir().expect("tempdir");
    // Welds align, but the only corrosion site is hundreds of feet from any
    // reference site, so the distance gate forbids every pairing.
    let lonely = write_table(
        dir.path(),
        "ili_2015_lonely.csv",
        "10.0,,Girth Weld,,,,2015\n\
         140.0,3,Metal Loss,10.0,,,2015\n\
         210.0,,Girth Weld,,,,2015\n\
         410.0,,Girth Weld,,,,2015\n",
    );
    let config = PipelineConfig {
        surveys: vec![
            SurveySource {
                year: 2015,
                path: lonely,
            },
            SurveySource {
                year: 2022,
                path: reference_2022(dir.path()),
            },
        ],
        reference_year: 2022,
        output_path: None,
        aligner: AlignerParams::default(),
        matcher: MatcherParams::default(),
    };

    let err = pipeline::run(&config).unwrap_err();
    assert!(matches!(
        err,
        PipelineError::NoBaselineMatches { year: 2015 }
    ));
}

#[test]
fn pipeline_requires_the_reference_year_to_be_configured() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = PipelineConfig {
        surveys: vec![SurveySource {
            year: 2015,
            path: survey_2015(dir.path()),
        }],
        reference_year: 2022,
        output_path: None,
        aligner: AlignerParams::default(),
        matcher: MatcherParams::default(),
    };

    let err = pipeline::run(&config).unwrap_err();
    assert!(matches!(
        err,
        PipelineError::MissingReferenceYear { year: 2022 }
    ));
}

#[test]
fn identical_inputs_produce_identical_tables() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = PipelineConfig {
        surveys: vec![
            SurveySource {
                year: 2015,
                path: survey_2015(dir.path()),
            },
            SurveySource {
                year: 2022,
                path: reference_2022(dir.path()),
            },
        ],
        reference_year: 2022,
        output_path: None,
        aligner: AlignerParams::default(),
        matcher: MatcherParams::default(),
    };

    let first = pipeline::run(&config).expect("first run");
    let second = pipeline::run(&config).expect("second run");
    assert_eq!(first.table, second.table);
}
