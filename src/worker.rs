use std::backtrace::{Backtrace, BacktraceStatus};
use std::path::Path;

use anyhow::Context;
use tracing::{debug, info_span};

use crate::filter::{self, FilterStats};
use crate::partition::Partition;
use crate::storage::{OutputCompression, StorageFactory};

/// What a worker reports back for one partition.
#[derive(Debug, Clone, PartialEq)]
pub enum PartitionOutcome {
    Success(FilterStats),
    /// Output already present and reprocessing not forced.
    Skipped,
    /// Error chain and stack trace of whatever failed; the batch carries on.
    Error(String),
}

/// Cleans single partitions. Holds no storage handle of its own: one is
/// acquired from the factory for every partition.
pub struct PartitionWorker<'a> {
    factory: &'a dyn StorageFactory,
    output_root: &'a Path,
    force_reprocess: bool,
    compression: OutputCompression,
}

impl<'a> PartitionWorker<'a> {
    pub fn new(
        factory: &'a dyn StorageFactory,
        output_root: &'a Path,
        force_reprocess: bool,
        compression: OutputCompression,
    ) -> Self {
        Self {
            factory,
            output_root,
            force_reprocess,
            compression,
        }
    }

    pub fn process(&self, partition: &Partition) -> PartitionOutcome {
        let _span = info_span!("partition", %partition).entered();
        match self.try_process(partition) {
            Ok(outcome) => outcome,
            Err(err) => PartitionOutcome::Error(diagnostic(&err)),
        }
    }

    fn try_process(&self, partition: &Partition) -> anyhow::Result<PartitionOutcome> {
        let storage = self
            .factory
            .connect()
            .context("could not acquire storage handle")?;

        let output = partition.output_path(self.output_root);
        if !self.force_reprocess && storage.exists(&output)? {
            debug!(output = %output.display(), "already processed");
            return Ok(PartitionOutcome::Skipped);
        }

        debug!(input = %partition.path.display(), "reading");
        let raw = storage
            .read_parquet(&partition.path)
            .with_context(|| format!("failed to read {}", partition.path.display()))?;
        debug!(rows = raw.height(), "read");

        // `raw` moves into the filter and is gone once it returns.
        let (mut cleaned, stats) = filter::apply_filters(raw)
            .with_context(|| format!("failed to filter {partition}"))?;
        debug!(
            retained = stats.retained,
            pct = %format!("{:.1}", stats.retained_pct()),
            "filtered"
        );

        storage
            .write_parquet(&output, &mut cleaned, self.compression)
            .with_context(|| format!("failed to write {}", output.display()))?;
        drop(cleaned);
        debug!(output = %output.display(), "saved");

        Ok(PartitionOutcome::Success(stats))
    }
}

/// Cause chain plus a stack trace, whatever `RUST_BACKTRACE` says.
fn diagnostic(err: &anyhow::Error) -> String {
    if err.backtrace().status() == BacktraceStatus::Captured {
        // anyhow's Debug output already ends with the captured trace
        format!("{err:?}")
    } else {
        format!("{err:?}\n\nStack backtrace:\n{}", Backtrace::force_capture())
    }
}
