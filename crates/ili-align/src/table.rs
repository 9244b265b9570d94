//! Consolidated per-defect depth table.

use std::path::Path;

use ili_align_core::{ClockReading, Survey};

use crate::aligner::AlignedSurvey;
use crate::io::TableIoError;
use crate::matcher::AnomalyMatch;

/// One reference corrosion feature with its depth reading from every survey
/// year that matched it.
#[derive(Clone, Debug, PartialEq)]
pub struct ConsolidatedRow {
    /// Record index into the reference survey.
    pub reference_index: usize,
    /// Reference-frame distance, feet.
    pub distance: f64,
    pub clock: ClockReading,
    /// Depth per year, parallel to [`ConsolidatedTable::years`]. `None`
    /// where no match exists for that year.
    pub depths: Vec<Option<f64>>,
}

/// The cross-year depth table, one row per reference corrosion feature and
/// one depth column per survey year.
#[derive(Clone, Debug, PartialEq)]
pub struct ConsolidatedTable {
    /// Column order of the per-year depth values.
    pub years: Vec<i32>,
    pub rows: Vec<ConsolidatedRow>,
}

impl ConsolidatedTable {
    /// Seed the table from the reference survey: one row per corrosion
    /// feature, with the reference year's own depth column already filled.
    pub fn from_reference(reference: &Survey, years: Vec<i32>) -> Self {
        let ref_col = years.iter().position(|&y| y == reference.year);
        let rows = reference
            .corrosion_indices()
            .into_iter()
            .map(|i| {
                let record = &reference.records[i];
                let mut depths = vec![None; years.len()];
                if let Some(col) = ref_col {
                    depths[col] = record.depth;
                }
                ConsolidatedRow {
                    reference_index: i,
                    distance: record.distance,
                    clock: record.clock,
                    depths,
                }
            })
            .collect();
        Self { years, rows }
    }

    /// Join one year's matched depth readings into its column.
    ///
    /// Rows without a match for this year are left unset. Unknown years are
    /// ignored rather than panicking, so a misconfigured join degrades to a
    /// missing column.
    pub fn fill_year(&mut self, year: i32, matches: &[AnomalyMatch], source: &AlignedSurvey) {
        let Some(col) = self.years.iter().position(|&y| y == year) else {
            return;
        };
        for m in matches {
            let depth = source.survey.records[m.source_index].depth;
            if let Some(row) = self
                .rows
                .iter_mut()
                .find(|r| r.reference_index == m.reference_index)
            {
                row.depths[col] = depth;
            }
        }
    }

    /// Number of filled cells in a year's depth column.
    pub fn filled_count(&self, year: i32) -> usize {
        let Some(col) = self.years.iter().position(|&y| y == year) else {
            return 0;
        };
        self.rows.iter().filter(|r| r.depths[col].is_some()).count()
    }

    /// Write the table as CSV: `distance,clock,depth_<year>,...`.
    pub fn write_csv(&self, path: impl AsRef<Path>) -> Result<(), TableIoError> {
        let mut writer = csv::Writer::from_path(path)?;
        let mut header = vec!["distance".to_string(), "clock".to_string()];
        header.extend(self.years.iter().map(|y| format!("depth_{y}")));
        writer.write_record(&header)?;
        for row in &self.rows {
            let mut record = vec![row.distance.to_string(), row.clock.to_string()];
            record.extend(
                row.depths
                    .iter()
                    .map(|d| d.map(|v| v.to_string()).unwrap_or_default()),
            );
            writer.write_record(&record)?;
        }
        writer.flush()?;
        Ok(())
    }
}
