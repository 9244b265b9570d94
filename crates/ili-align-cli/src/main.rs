//! `ili-align` command line tool.

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use log::LevelFilter;

use ili_align::{
    align_survey, load_aligned_csv, load_survey_csv, match_anomalies, pipeline, AlignerParams,
    AlignmentError, MatcherParams, PipelineConfig, PipelineError, TableIoError,
};

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error(transparent)]
    Io(#[from] TableIoError),
    #[error(transparent)]
    Alignment(#[from] AlignmentError),
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
    #[error("csv output failed: {0}")]
    CsvOut(#[from] csv::Error),
    #[error("output failed: {0}")]
    Stdout(#[from] std::io::Error),
}

#[derive(Parser)]
#[command(name = "ili-align", about = "Align and match in-line inspection runs", version)]
struct Cli {
    /// Increase log verbosity (-v: debug, -vv: trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the full consolidation pipeline from a JSON config.
    Run {
        /// Pipeline configuration (years, table paths, parameters).
        #[arg(long)]
        config: PathBuf,
        /// Override the configured consolidated-table output path.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Align one survey's distance axis onto a reference survey's axis.
    Align {
        /// Standardized source survey table (CSV).
        #[arg(long)]
        source: PathBuf,
        /// Standardized reference survey table (CSV).
        #[arg(long)]
        reference: PathBuf,
        /// Girth-weld pairing window, feet.
        #[arg(long, default_value_t = 20.0)]
        window: f64,
        /// Where to write the aligned table.
        #[arg(long)]
        output: PathBuf,
    },
    /// Match corrosion anomalies of an aligned survey against a reference.
    MatchAnomalies {
        /// Aligned source table, as written by `align`.
        #[arg(long)]
        source: PathBuf,
        /// Standardized reference survey table (CSV).
        #[arg(long)]
        reference: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    let _ = ili_align_core::init_with_level(level);

    if let Err(err) = run(cli) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Run { config, output } => {
            let mut config = PipelineConfig::load_json(config)?;
            if let Some(output) = output {
                config.output_path = Some(output);
            }
            let result = pipeline::run(&config)?;
            result.table.write_csv(config.output_path())?;

            for outcome in &result.outcomes {
                match &outcome.failure {
                    Some(reason) => println!("{}: skipped ({reason})", outcome.year),
                    None => println!(
                        "{}: {} anchors, {}/{} sites matched",
                        outcome.year,
                        outcome.anchors,
                        outcome.matches,
                        result.table.rows.len()
                    ),
                }
            }
            println!(
                "consolidated {} corrosion sites -> {}",
                result.table.rows.len(),
                config.output_path().display()
            );
            Ok(())
        }
        Command::Align {
            source,
            reference,
            window,
            output,
        } => {
            let source = load_survey_csv(source)?;
            let reference = load_survey_csv(reference)?;
            let params = AlignerParams { window_ft: window };
            let aligned = align_survey(&source, &reference, &params)?;
            ili_align::write_aligned_csv(&output, &aligned)?;
            println!(
                "aligned {} records on {} anchors -> {}",
                aligned.survey.len(),
                aligned.anchors.len(),
                output.display()
            );
            Ok(())
        }
        Command::MatchAnomalies { source, reference } => {
            let source = load_aligned_csv(source)?;
            let reference = load_survey_csv(reference)?;
            let matches = match_anomalies(&source, &reference, &MatcherParams::default());

            let mut writer = csv::Writer::from_writer(std::io::stdout());
            writer.write_record(["source_index", "reference_index"])?;
            for m in &matches {
                writer.write_record([m.source_index.to_string(), m.reference_index.to_string()])?;
            }
            writer.flush()?;
            Ok(())
        }
    }
}
