pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::DistributionConfig;

pub use adapters::{FfmpegEncoder, InMemoryJobQueue, LocalWorkspace};
pub use core::dispatch::{job_element, DistributionService, JobBarrier, JOB_TYPE};
pub use core::distribution::DistributionEngine;
pub use domain::job::{Job, JobId, JobStatus, Operation};
pub use domain::model::{Element, ElementType, Package};
pub use utils::error::{HlsError, Result};
