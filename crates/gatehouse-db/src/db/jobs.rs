use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gatehouse_core::models::{JobStage, JobStatus, NewUploadJob, UploadJob, UploadJobMetadata};
use gatehouse_core::AppError;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

/// Keyed-row store for upload jobs.
///
/// Every mutation is scoped by both job id and owner so one user can never
/// touch another user's job.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Insert a job in `uploading`/`awaiting_upload` and return the store-assigned id.
    async fn create(&self, job: NewUploadJob) -> Result<Uuid, AppError>;

    /// Replace the placeholder key and record the upload metadata.
    async fn update_metadata(
        &self,
        job_id: Uuid,
        user_id: Uuid,
        metadata: &UploadJobMetadata,
    ) -> Result<(), AppError>;

    /// Move a live job to `error`, recording the reason.
    async fn mark_error(&self, job_id: Uuid, user_id: Uuid, reason: &str) -> Result<(), AppError>;

    async fn get(&self, job_id: Uuid, user_id: Uuid) -> Result<Option<UploadJob>, AppError>;
}

/// PostgreSQL-backed [`JobStore`]
#[derive(Clone)]
pub struct PgJobStore {
    pool: PgPool,
}

impl PgJobStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn map_row(row: PgRow) -> Result<UploadJob, AppError> {
        let status: String = row.try_get("status")?;
        let stage: String = row.try_get("stage")?;
        let created_at: DateTime<Utc> = row.try_get("created_at")?;
        let updated_at: DateTime<Utc> = row.try_get("updated_at")?;

        Ok(UploadJob {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            status: status.parse::<JobStatus>().map_err(AppError::Internal)?,
            stage: stage.parse::<JobStage>().map_err(AppError::Internal)?,
            bucket: row.try_get("bucket")?,
            storage_key: row.try_get("r2_key")?,
            original_filename: row.try_get("original_filename")?,
            original_content_type: row.try_get("original_content_type")?,
            original_size_bytes: row.try_get("original_size_bytes")?,
            last_error: row.try_get("last_error")?,
            created_at,
            updated_at,
        })
    }
}

#[async_trait]
impl JobStore for PgJobStore {
    #[tracing::instrument(skip(self, job), fields(user_id = %job.user_id))]
    async fn create(&self, job: NewUploadJob) -> Result<Uuid, AppError> {
        let row = sqlx::query(
            r#"
            INSERT INTO media_jobs (user_id, status, stage, bucket, r2_key)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(job.user_id)
        .bind(JobStatus::Uploading.as_str())
        .bind(JobStage::AwaitingUpload.as_str())
        .bind(&job.bucket)
        .bind(&job.storage_key)
        .fetch_one(&self.pool)
        .await?;

        let id: Uuid = row.try_get("id")?;
        tracing::debug!(job_id = %id, "Created upload job");
        Ok(id)
    }

    #[tracing::instrument(skip(self, metadata), fields(key = %metadata.storage_key))]
    async fn update_metadata(
        &self,
        job_id: Uuid,
        user_id: Uuid,
        metadata: &UploadJobMetadata,
    ) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE media_jobs
            SET r2_key = $3,
                original_filename = $4,
                original_content_type = $5,
                original_size_bytes = $6,
                updated_at = NOW()
            WHERE id = $1 AND user_id = $2 AND status = 'uploading'
            "#,
        )
        .bind(job_id)
        .bind(user_id)
        .bind(&metadata.storage_key)
        .bind(&metadata.original_filename)
        .bind(&metadata.original_content_type)
        .bind(metadata.original_size_bytes)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::Internal(format!(
                "Upload job {} not found in uploading state",
                job_id
            )));
        }

        Ok(())
    }

    #[tracing::instrument(skip(self, reason))]
    async fn mark_error(&self, job_id: Uuid, user_id: Uuid, reason: &str) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE media_jobs
            SET status = 'error', last_error = $3, stage_error = $3, updated_at = NOW()
            WHERE id = $1 AND user_id = $2 AND status NOT IN ('completed', 'error')
            "#,
        )
        .bind(job_id)
        .bind(user_id)
        .bind(reason)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get(&self, job_id: Uuid, user_id: Uuid) -> Result<Option<UploadJob>, AppError> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, status, stage, bucket, r2_key, original_filename,
                   original_content_type, original_size_bytes, last_error,
                   created_at, updated_at
            FROM media_jobs
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(job_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::map_row).transpose()
    }
}
