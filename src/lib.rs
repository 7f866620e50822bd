//! Quality pipeline for a week-partitioned transit trip lake.
//!
//! Reads `iso_year=<Y>/iso_week=<W>/data-0.parquet` partitions of enriched
//! trips, drops trips with invalid times, unresolved stops or unusable
//! distances, and writes the cleaned partitions under a second root. Runs are
//! resumable: a partition whose output exists is skipped.

pub mod config;
pub mod credentials;
pub mod error;
pub mod filter;
pub mod logging;
pub mod orchestrator;
pub mod partition;
pub mod schema;
pub mod storage;
pub mod summary;
pub mod worker;

pub use config::{BatchConfig, CredentialsConfig};
pub use error::{LakeError, Result};
pub use filter::{apply_filters, FilterStats};
pub use orchestrator::BatchOrchestrator;
pub use partition::Partition;
pub use storage::{LocalStorage, LocalStorageFactory, OutputCompression, Storage, StorageFactory};
pub use summary::{run_exit_code, BatchSummary, BatchTally, Completion};
pub use worker::{PartitionOutcome, PartitionWorker};
