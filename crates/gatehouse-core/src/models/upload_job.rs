use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Lifecycle status of an upload job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Uploading,
    Processing,
    Completed,
    Error,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Uploading => "uploading",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Error => "error",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Error)
    }

    /// Status only moves forward; any live job may fall into `Error`.
    pub fn can_transition_to(&self, next: JobStatus) -> bool {
        match (self, next) {
            (s, _) if s.is_terminal() => false,
            (_, JobStatus::Error) => true,
            (JobStatus::Uploading, JobStatus::Processing) => true,
            (JobStatus::Processing, JobStatus::Completed) => true,
            _ => false,
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "uploading" => Ok(JobStatus::Uploading),
            "processing" => Ok(JobStatus::Processing),
            "completed" => Ok(JobStatus::Completed),
            "error" => Ok(JobStatus::Error),
            other => Err(format!("unknown job status: {}", other)),
        }
    }
}

/// Pipeline stage of an upload job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStage {
    AwaitingUpload,
    Ingesting,
    Done,
}

impl JobStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStage::AwaitingUpload => "awaiting_upload",
            JobStage::Ingesting => "ingesting",
            JobStage::Done => "done",
        }
    }
}

impl fmt::Display for JobStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobStage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "awaiting_upload" => Ok(JobStage::AwaitingUpload),
            "ingesting" => Ok(JobStage::Ingesting),
            "done" => Ok(JobStage::Done),
            other => Err(format!("unknown job stage: {}", other)),
        }
    }
}

/// Persisted upload job. `id` is assigned by the store and never changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadJob {
    pub id: Uuid,
    pub user_id: Uuid,
    pub status: JobStatus,
    pub stage: JobStage,
    pub bucket: String,
    pub storage_key: String,
    pub original_filename: Option<String>,
    pub original_content_type: Option<String>,
    pub original_size_bytes: Option<i64>,
    pub last_error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields written when a job is created.
#[derive(Debug, Clone)]
pub struct NewUploadJob {
    pub user_id: Uuid,
    pub bucket: String,
    pub storage_key: String,
}

/// Fields written once the final storage key is known.
#[derive(Debug, Clone)]
pub struct UploadJobMetadata {
    pub storage_key: String,
    pub original_filename: String,
    pub original_content_type: String,
    pub original_size_bytes: i64,
}
