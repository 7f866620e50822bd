use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::Result;
use crate::filter::FilterStats;
use crate::worker::PartitionOutcome;

/// What the orchestrator collects for each dispatched partition.
#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    Finished(PartitionOutcome),
    /// The worker died while processing the partition.
    Crashed(String),
}

/// Running counts over completed partitions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchTally {
    pub processed: usize,
    pub skipped: usize,
    /// Every failure, critical ones included.
    pub failed: usize,
    pub critical: usize,
    /// Sum over processed partitions only.
    pub totals: FilterStats,
}

impl BatchTally {
    pub fn record(&mut self, completion: &Completion) {
        match completion {
            Completion::Finished(PartitionOutcome::Success(stats)) => {
                self.processed += 1;
                self.totals.absorb(stats);
            }
            Completion::Finished(PartitionOutcome::Skipped) => self.skipped += 1,
            Completion::Finished(PartitionOutcome::Error(_)) => self.failed += 1,
            Completion::Crashed(_) => {
                self.failed += 1;
                self.critical += 1;
            }
        }
    }

    pub fn completed(&self) -> usize {
        self.processed + self.skipped + self.failed
    }
}

/// Final report of a batch run.
#[derive(Debug, Clone)]
pub struct BatchSummary {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub elapsed: Duration,
    pub partitions: usize,
    pub tally: BatchTally,
    pub output_root: PathBuf,
}

impl BatchSummary {
    pub fn succeeded(&self) -> bool {
        self.tally.failed == 0
    }

    /// Process exit code: 0 unless a partition failed. Skips never fail.
    pub fn exit_code(&self) -> u8 {
        if self.succeeded() {
            0
        } else {
            1
        }
    }
}

/// Exit code of a whole run. A fatal startup error fails like any partition
/// failure does.
pub fn run_exit_code(run: &Result<BatchSummary>) -> u8 {
    match run {
        Ok(summary) => summary.exit_code(),
        Err(_) => 1,
    }
}

fn pct(part: usize, whole: usize) -> f64 {
    part as f64 / whole as f64 * 100.0
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "=".repeat(80);
        let secs = self.elapsed.as_secs_f64();
        let t = &self.tally;

        writeln!(f, "{rule}")?;
        writeln!(f, "BATCH SUMMARY  run {}", self.run_id)?;
        writeln!(f, "{rule}")?;
        writeln!(
            f,
            "Started {}, took {:.2} min ({:.1} s)",
            self.started_at.format("%Y-%m-%d %H:%M:%S UTC"),
            secs / 60.0,
            secs
        )?;
        if self.partitions > 0 {
            writeln!(
                f,
                "  average {:.1} s/partition",
                secs / self.partitions as f64
            )?;
        }

        writeln!(f)?;
        writeln!(f, "Partitions:")?;
        writeln!(f, "  total:     {}", self.partitions)?;
        writeln!(f, "  processed: {}", t.processed)?;
        writeln!(f, "  skipped:   {} (already present)", t.skipped)?;
        writeln!(f, "  failed:    {}", t.failed)?;
        if t.critical > 0 {
            writeln!(f, "    of which critical: {}", t.critical)?;
        }

        let n = t.totals.initial;
        if n > 0 {
            writeln!(f)?;
            writeln!(f, "Trips (processed partitions):")?;
            writeln!(f, "  n_inicial: {n}")?;
            writeln!(f, "  n_final:   {}", t.totals.retained)?;
            writeln!(f, "  retained:  {:.2}%", t.totals.retained_pct())?;
            writeln!(f)?;
            writeln!(f, "Removed:")?;
            writeln!(
                f,
                "  by time:     {} ({:.2}%)",
                t.totals.removed_by_time,
                pct(t.totals.removed_by_time, n)
            )?;
            writeln!(
                f,
                "  by stops:    {} ({:.2}%)",
                t.totals.removed_by_stops,
                pct(t.totals.removed_by_stops, n)
            )?;
            writeln!(
                f,
                "  by distance: {} ({:.2}%)",
                t.totals.removed_by_distance,
                pct(t.totals.removed_by_distance, n)
            )?;
        }

        writeln!(f)?;
        writeln!(
            f,
            "Output: {}/iso_year=YYYY/iso_week=WW/data-0.parquet",
            self.output_root.display()
        )?;
        writeln!(f, "{rule}")?;
        if self.succeeded() {
            write!(f, "COMPLETED SUCCESSFULLY")
        } else {
            write!(f, "COMPLETED WITH ERRORS")
        }
    }
}
