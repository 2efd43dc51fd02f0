use crate::core::distribution::DistributionEngine;
use crate::core::{AssetStore, Element, Encoder, JobProcessor, JobQueue, Package};
use crate::domain::job::{Job, JobId, JobStatus, Operation};
use crate::utils::error::{HlsError, Result};
use std::time::{Duration, Instant};

pub const JOB_TYPE: &str = "distribution.hls";

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(300);

/// 解碼後的工作請求
#[derive(Debug, Clone, PartialEq)]
pub enum JobRequest {
    Distribute {
        package: Package,
        element_id: String,
        check_availability: bool,
    },
    Retract {
        package: Package,
        element_id: String,
    },
}

impl JobRequest {
    pub fn operation(&self) -> Operation {
        match self {
            JobRequest::Distribute { .. } => Operation::Distribute,
            JobRequest::Retract { .. } => Operation::Retract,
        }
    }

    /// `[package, elementId, "true"|"false"]` 或 `[package, elementId]`
    pub fn encode(&self) -> Result<Vec<String>> {
        match self {
            JobRequest::Distribute {
                package,
                element_id,
                check_availability,
            } => Ok(vec![
                package.to_json()?,
                element_id.clone(),
                check_availability.to_string(),
            ]),
            JobRequest::Retract {
                package,
                element_id,
            } => Ok(vec![package.to_json()?, element_id.clone()]),
        }
    }

    pub fn decode(operation: &str, arguments: &[String]) -> Result<Self> {
        let operation: Operation = operation.parse()?;
        let expected = match operation {
            Operation::Distribute => 3,
            Operation::Retract => 2,
        };
        if arguments.len() < expected {
            return Err(HlsError::validation(format!(
                "The argument list for operation '{}' does not meet expectations: expected {} arguments, got {}",
                operation,
                expected,
                arguments.len()
            )));
        }

        let package = Package::from_json(&arguments[0])?;
        let element_id = arguments[1].clone();

        match operation {
            Operation::Distribute => {
                let check_availability = parse_flag(&arguments[2]).ok_or_else(|| {
                    HlsError::validation(format!(
                        "Invalid availability flag '{}' for operation '{}'",
                        arguments[2], operation
                    ))
                })?;
                Ok(JobRequest::Distribute {
                    package,
                    element_id,
                    check_availability,
                })
            }
            Operation::Retract => Ok(JobRequest::Retract {
                package,
                element_id,
            }),
        }
    }
}

/// `true`/`false`，不分大小寫
fn parse_flag(value: &str) -> Option<bool> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("true") {
        Some(true)
    } else if value.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

impl<W: AssetStore, E: Encoder> JobProcessor for DistributionEngine<W, E> {
    fn process(&self, operation: &str, arguments: &[String]) -> Result<Option<String>> {
        let request = JobRequest::decode(operation, arguments)?;

        let element = match &request {
            JobRequest::Distribute {
                package,
                element_id,
                check_availability,
            } => self.distribute_element(package, element_id, *check_availability)?,
            JobRequest::Retract {
                package,
                element_id,
            } => self.retract_element(package, element_id)?,
        };

        element
            .map(|e| serde_json::to_string(&e))
            .transpose()
            .map_err(HlsError::from)
    }
}

/// 對外的發佈服務：把操作轉成佇列中的工作
pub struct DistributionService<Q: JobQueue> {
    queue: Q,
}

impl<Q: JobQueue> DistributionService<Q> {
    pub fn new(queue: Q) -> Self {
        Self { queue }
    }

    pub fn queue(&self) -> &Q {
        &self.queue
    }

    pub async fn distribute(
        &self,
        package: &Package,
        element_id: &str,
        check_availability: bool,
    ) -> Result<Job> {
        self.submit(JobRequest::Distribute {
            package: package.clone(),
            element_id: element_id.to_string(),
            check_availability,
        })
        .await
    }

    pub async fn retract(&self, package: &Package, element_id: &str) -> Result<Job> {
        self.submit(JobRequest::Retract {
            package: package.clone(),
            element_id: element_id.to_string(),
        })
        .await
    }

    async fn submit(&self, request: JobRequest) -> Result<Job> {
        let (package, element_id) = match &request {
            JobRequest::Distribute {
                package,
                element_id,
                ..
            }
            | JobRequest::Retract {
                package,
                element_id,
            } => (package, element_id),
        };
        if package.id.trim().is_empty() {
            return Err(HlsError::validation("Mediapackage must be specified"));
        }
        if element_id.trim().is_empty() {
            return Err(HlsError::validation("Element ID must be specified"));
        }

        let arguments = request.encode()?;
        let job = self
            .queue
            .create_job(JOB_TYPE, request.operation().as_str(), arguments)
            .await
            .map_err(|e| e.into_distribution("Unable to create a job"))?;

        tracing::debug!("Created {} job {} for {}", job.operation, job.id, element_id);
        Ok(job)
    }
}

/// Decodes a succeeded job's payload back into the element it produced.
pub fn job_element(job: &Job) -> Result<Option<Element>> {
    match job.payload.as_deref() {
        Some(payload) if !payload.is_empty() => Ok(Some(serde_json::from_str(payload)?)),
        _ => Ok(None),
    }
}

#[derive(Debug, Clone)]
pub struct BarrierResult {
    pub jobs: Vec<Job>,
}

impl BarrierResult {
    pub fn is_success(&self) -> bool {
        self.jobs.iter().all(|j| j.status == JobStatus::Succeeded)
    }
}

/// 輪詢佇列直到所有工作結束；未設定逾時則一直等到工作結束為止
pub struct JobBarrier<'a, Q: JobQueue> {
    queue: &'a Q,
    job_ids: Vec<JobId>,
    poll_interval: Duration,
    timeout: Option<Duration>,
}

impl<'a, Q: JobQueue> JobBarrier<'a, Q> {
    pub fn new(queue: &'a Q, job_ids: Vec<JobId>) -> Self {
        Self {
            queue,
            job_ids,
            poll_interval: DEFAULT_POLL_INTERVAL,
            timeout: None,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub async fn wait_for_jobs(&self) -> Result<BarrierResult> {
        let started = Instant::now();

        loop {
            let mut jobs = Vec::with_capacity(self.job_ids.len());
            for id in &self.job_ids {
                jobs.push(self.queue.job(*id).await?);
            }

            if jobs.iter().all(|j| j.status.is_terminal()) {
                return Ok(BarrierResult { jobs });
            }

            if let Some(timeout) = self.timeout.filter(|t| started.elapsed() >= *t) {
                let pending: Vec<String> = jobs
                    .iter()
                    .filter(|j| !j.status.is_terminal())
                    .map(|j| j.id.to_string())
                    .collect();
                return Err(HlsError::JobError {
                    message: format!(
                        "Timed out after {:?} waiting for jobs {}",
                        timeout,
                        pending.join(", ")
                    ),
                });
            }

            tokio::time::sleep(self.poll_interval).await;
        }
    }
}
