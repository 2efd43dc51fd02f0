use crate::core::{JobProcessor, JobQueue};
use crate::domain::job::{Job, JobId};
use crate::utils::error::{HlsError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// 記憶體內的工作佇列，每個工作在獨立的 blocking task 上執行
///
/// Finished jobs stay in the map until `evict_finished` is called.
#[derive(Clone)]
pub struct InMemoryJobQueue {
    processor: Arc<dyn JobProcessor>,
    jobs: Arc<Mutex<HashMap<JobId, Job>>>,
}

impl InMemoryJobQueue {
    pub fn new(processor: Arc<dyn JobProcessor>) -> Self {
        Self {
            processor,
            jobs: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub async fn len(&self) -> usize {
        self.jobs.lock().await.len()
    }

    /// 移除已結束的工作，回傳移除數量
    pub async fn evict_finished(&self) -> usize {
        let mut jobs = self.jobs.lock().await;
        let before = jobs.len();
        jobs.retain(|_, job| !job.status.is_terminal());
        before - jobs.len()
    }

    async fn update<F: FnOnce(&mut Job)>(jobs: &Mutex<HashMap<JobId, Job>>, id: JobId, f: F) {
        if let Some(job) = jobs.lock().await.get_mut(&id) {
            f(job);
        }
    }

    async fn run(
        processor: Arc<dyn JobProcessor>,
        jobs: Arc<Mutex<HashMap<JobId, Job>>>,
        id: JobId,
        operation: String,
        arguments: Vec<String>,
    ) {
        Self::update(&jobs, id, Job::start).await;
        tracing::debug!("Running {} job {}", operation, id);

        let op = operation.clone();
        let outcome =
            tokio::task::spawn_blocking(move || processor.process(&op, &arguments)).await;

        match outcome {
            Ok(Ok(payload)) => {
                tracing::info!("✅ {} job {} succeeded", operation, id);
                Self::update(&jobs, id, |job| job.succeed(payload)).await;
            }
            Ok(Err(e)) => {
                tracing::error!("❌ {} job {} failed: {}", operation, id, e);
                Self::update(&jobs, id, |job| job.fail(e.to_string())).await;
            }
            Err(join_error) => {
                tracing::error!("❌ {} job {} panicked: {}", operation, id, join_error);
                Self::update(&jobs, id, |job| {
                    job.fail(format!("Job execution aborted: {}", join_error))
                })
                .await;
            }
        }
    }
}

#[async_trait]
impl JobQueue for InMemoryJobQueue {
    async fn create_job(
        &self,
        job_type: &str,
        operation: &str,
        arguments: Vec<String>,
    ) -> Result<Job> {
        let job = Job::new(job_type, operation, arguments.clone());
        self.jobs.lock().await.insert(job.id, job.clone());

        tokio::spawn(Self::run(
            Arc::clone(&self.processor),
            Arc::clone(&self.jobs),
            job.id,
            operation.to_string(),
            arguments,
        ));

        Ok(job)
    }

    async fn job(&self, id: JobId) -> Result<Job> {
        self.jobs
            .lock()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| HlsError::JobError {
                message: format!("Job {} is unknown", id),
            })
    }
}
