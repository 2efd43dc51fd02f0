use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::utils::error::HlsError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(Uuid);

impl JobId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 本服務可處理的操作，名稱即為佇列中的操作標籤
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    Distribute,
    Retract,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Distribute => "Distribute",
            Operation::Retract => "Retract",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = HlsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Distribute" => Ok(Operation::Distribute),
            "Retract" => Ok(Operation::Retract),
            other => Err(HlsError::UnknownOperation {
                operation: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Queued,
    Running,
    Succeeded,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Succeeded | JobStatus::Failed)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub job_type: String,
    pub operation: String,
    pub arguments: Vec<String>,
    pub status: JobStatus,
    pub payload: Option<String>,
    pub failure: Option<String>,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Job {
    pub fn new(job_type: &str, operation: &str, arguments: Vec<String>) -> Self {
        Self {
            id: JobId::generate(),
            job_type: job_type.to_string(),
            operation: operation.to_string(),
            arguments,
            status: JobStatus::Queued,
            payload: None,
            failure: None,
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
        }
    }

    pub fn start(&mut self) {
        self.status = JobStatus::Running;
        self.started_at = Some(Utc::now());
    }

    pub fn succeed(&mut self, payload: Option<String>) {
        self.status = JobStatus::Succeeded;
        self.payload = payload;
        self.completed_at = Some(Utc::now());
    }

    pub fn fail(&mut self, detail: String) {
        self.status = JobStatus::Failed;
        self.failure = Some(detail);
        self.completed_at = Some(Utc::now());
    }
}
