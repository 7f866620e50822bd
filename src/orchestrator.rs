/// Batch run over every week partition of the input dataset.
///
/// Discovery and the initial storage check run on the calling thread and are
/// fatal when they fail. Partitions then go through a fixed pool of worker
/// threads; a failing or crashing partition never stops its siblings.
use std::any::Any;
use std::collections::{BTreeMap, BTreeSet};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use chrono::Utc;
use crossbeam_channel::unbounded;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, info, info_span, warn};
use uuid::Uuid;

use crate::config::BatchConfig;
use crate::error::{LakeError, Result};
use crate::partition::{parse_hive_segment, Partition};
use crate::schema::layout;
use crate::storage::{Storage, StorageFactory};
use crate::summary::{BatchSummary, BatchTally, Completion};
use crate::worker::{PartitionOutcome, PartitionWorker};

pub struct BatchOrchestrator {
    config: BatchConfig,
    factory: Arc<dyn StorageFactory>,
}

impl BatchOrchestrator {
    pub fn new(config: BatchConfig, factory: Arc<dyn StorageFactory>) -> Self {
        Self { config, factory }
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Every `(year, week)` under the input root that has a data file,
    /// sorted by year then week. Two directories naming the same week are an
    /// error.
    pub fn discover(&self, storage: &dyn Storage) -> Result<Vec<Partition>> {
        let root = &self.config.input_root;
        let listing = |dir: &std::path::Path| {
            storage.list_dirs(dir).map_err(|e| {
                LakeError::Discovery(format!("cannot list {}: {e}", dir.display()))
            })
        };

        let mut partitions = Vec::new();
        for year_dir in listing(root)? {
            let Some(year) = parse_hive_segment::<i32>(&year_dir, layout::YEAR_KEY)? else {
                continue;
            };
            for week_dir in listing(&year_dir)? {
                let Some(week) = parse_hive_segment::<u32>(&week_dir, layout::WEEK_KEY)? else {
                    continue;
                };
                let data = week_dir.join(layout::DATA_FILE);
                let present = storage.exists(&data).map_err(|e| {
                    LakeError::Discovery(format!("cannot check {}: {e}", data.display()))
                })?;
                if present {
                    partitions.push(Partition {
                        year,
                        week,
                        path: data,
                    });
                } else {
                    debug!(dir = %week_dir.display(), "no data file, ignoring");
                }
            }
        }

        partitions.sort_by_key(Partition::key);
        // `iso_week=7` and `iso_week=07` would both write the same output file
        if let Some(pair) = partitions.windows(2).find(|w| w[0].key() == w[1].key()) {
            return Err(LakeError::Discovery(format!(
                "partition {} found twice: {} and {}",
                pair[0],
                pair[0].path.display(),
                pair[1].path.display()
            )));
        }
        Ok(partitions)
    }

    /// Run the whole batch. `Err` only for the fatal startup failures
    /// (configuration, storage acquisition, discovery); partition failures
    /// are counted in the summary instead.
    pub fn run(&self) -> Result<BatchSummary> {
        self.config.validate()?;

        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let clock = Instant::now();
        let _span = info_span!("batch", run = %run_id).entered();

        info!(
            workers = self.config.workers,
            force_reprocess = self.config.force_reprocess,
            input = %self.config.input_root.display(),
            output = %self.config.output_root.display(),
            "starting batch"
        );
        if self.config.workers == 1 {
            info!("running one worker (sequential) to bound memory; raise `workers` if large partitions fit side by side");
        }

        let storage = self.factory.connect()?;
        info!("storage ready");
        let partitions = self.discover(storage.as_ref())?;
        drop(storage);

        let years: BTreeSet<i32> = partitions.iter().map(|p| p.year).collect();
        info!(count = partitions.len(), years = ?years, "discovered partitions");

        let total = partitions.len();
        let tally = if partitions.is_empty() {
            warn!("no partitions found to process");
            BatchTally::default()
        } else {
            self.dispatch(partitions)
        };

        Ok(BatchSummary {
            run_id,
            started_at,
            elapsed: clock.elapsed(),
            partitions: total,
            tally,
            output_root: self.config.output_root.clone(),
        })
    }

    /// Feed partitions to the worker pool and tally results in completion order.
    fn dispatch(&self, partitions: Vec<Partition>) -> BatchTally {
        let mut tally = BatchTally::default();
        let mut pending: BTreeMap<(i32, u32), Partition> =
            partitions.iter().map(|p| (p.key(), p.clone())).collect();
        let progress = progress_bar(partitions.len(), self.config.verbose);

        let (job_tx, job_rx) = unbounded::<Partition>();
        let (result_tx, result_rx) = unbounded::<(Partition, Completion)>();
        for partition in partitions {
            // job_rx is alive in this scope, so the send cannot fail
            let _ = job_tx.send(partition);
        }
        drop(job_tx);

        let factory: &dyn StorageFactory = self.factory.as_ref();
        let output_root = self.config.output_root.as_path();
        let force_reprocess = self.config.force_reprocess;
        let compression = self.config.compression;

        thread::scope(|scope| {
            for id in 0..self.config.workers {
                let job_rx = job_rx.clone();
                let result_tx = result_tx.clone();
                let spawned = thread::Builder::new()
                    .name(format!("partition-worker-{id}"))
                    .spawn_scoped(scope, move || {
                        let worker =
                            PartitionWorker::new(factory, output_root, force_reprocess, compression);
                        for partition in job_rx {
                            let completion =
                                match panic::catch_unwind(AssertUnwindSafe(|| worker.process(&partition))) {
                                    Ok(outcome) => Completion::Finished(outcome),
                                    Err(payload) => Completion::Crashed(panic_message(payload.as_ref())),
                                };
                            if result_tx.send((partition, completion)).is_err() {
                                break;
                            }
                        }
                    });
                if let Err(err) = spawned {
                    error!(worker = id, %err, "could not start worker thread");
                }
            }
            drop(result_tx);
            drop(job_rx);

            for (partition, completion) in result_rx {
                pending.remove(&partition.key());
                progress.suspend(|| report(&partition, &completion));
                tally.record(&completion);
                progress.inc(1);
            }
        });

        for partition in pending.into_values() {
            let completion =
                Completion::Crashed("worker pool stopped before reporting this partition".into());
            progress.suspend(|| report(&partition, &completion));
            tally.record(&completion);
            progress.inc(1);
        }

        progress.finish_and_clear();
        tally
    }
}

/// Bar over dispatched partitions. Hidden in verbose mode, where every
/// partition step is logged instead.
fn progress_bar(total: usize, verbose: bool) -> ProgressBar {
    if verbose {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(total as u64);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{msg} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} partitions ({eta})")
    {
        bar.set_style(style.progress_chars("#>-"));
    }
    bar.set_message("Processing");
    bar
}

fn report(partition: &Partition, completion: &Completion) {
    match completion {
        Completion::Finished(PartitionOutcome::Success(stats)) => info!(
            %partition,
            initial = stats.initial,
            retained = stats.retained,
            pct = %format!("{:.1}", stats.retained_pct()),
            "processed"
        ),
        Completion::Finished(PartitionOutcome::Skipped) => {
            debug!(%partition, "already processed, skipped")
        }
        Completion::Finished(PartitionOutcome::Error(message)) => {
            error!(%partition, "partition failed:\n{message}")
        }
        Completion::Crashed(message) => {
            error!(%partition, "critical error: {message}");
            warn!("a crashed worker usually means it ran out of memory; reduce `workers`");
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("worker panicked: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("worker panicked: {s}")
    } else {
        "worker panicked".to_string()
    }
}
