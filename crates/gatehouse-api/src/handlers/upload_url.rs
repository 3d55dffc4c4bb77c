use crate::auth::AuthUser;
use crate::error::{HttpAppError, ValidatedJson};
use crate::state::AppState;
use axum::{extract::State, response::IntoResponse, Json};
use chrono::{Duration, Utc};
use gatehouse_core::constants::PLACEHOLDER_STORAGE_KEY;
use gatehouse_core::models::{NewUploadJob, UploadJobMetadata, UploadUrlRequest, UploadUrlResponse};
use gatehouse_core::AppError;
use gatehouse_storage::{extension, job_storage_key, sanitize_filename};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

/// Best-effort move of a half-prepared job to `error`. Failure here is only logged.
async fn abandon_job(state: &AppState, job_id: Uuid, user_id: Uuid, reason: &str) {
    if let Err(e) = state.jobs.mark_error(job_id, user_id, reason).await {
        tracing::error!(
            job_id = %job_id,
            error = %e,
            "Failed to mark upload job as error"
        );
    }
}

/// Admit an upload: create a job and hand out a presigned PUT URL for it
///
/// The job is created first so its store-assigned id can namespace the storage key.
/// Every call creates a new job.
#[tracing::instrument(
    skip(state, auth, request),
    fields(
        user_id = %auth.user.id,
        content_type = %request.content_type,
        bytes = %request.bytes,
        operation = "get_signed_upload_url"
    )
)]
pub async fn get_signed_upload_url(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<UploadUrlRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    request.validate()?;

    let max_bytes = state.uploads.max_bytes;
    let bytes = request.checked_size(max_bytes)?;
    let size_bytes = i64::try_from(bytes)
        .map_err(|_| AppError::PayloadTooLarge(format!("Max size is {} bytes", max_bytes)))?;

    let user_id = auth.user.id;
    let job_id = state
        .jobs
        .create(NewUploadJob {
            user_id,
            bucket: state.objects.bucket().to_string(),
            storage_key: PLACEHOLDER_STORAGE_KEY.to_string(),
        })
        .await?;

    let safe_name = sanitize_filename(&request.filename);
    let ext = extension(&safe_name, &request.content_type);
    let key = job_storage_key(user_id, job_id, &ext);

    let metadata = UploadJobMetadata {
        storage_key: key.clone(),
        original_filename: safe_name,
        original_content_type: request.content_type.clone(),
        original_size_bytes: size_bytes,
    };

    if let Err(e) = state.jobs.update_metadata(job_id, user_id, &metadata).await {
        abandon_job(
            &state,
            job_id,
            user_id,
            &format!("Failed to record storage key: {}", e),
        )
        .await;
        return Err(e.into());
    }

    let ttl = state.uploads.url_ttl;
    let expires_at = Utc::now() + Duration::seconds(ttl.as_secs() as i64);

    let upload_url = match state
        .objects
        .presign_put(&key, &request.content_type, ttl)
        .await
    {
        Ok(url) => url,
        Err(e) => {
            abandon_job(
                &state,
                job_id,
                user_id,
                &format!("Failed to presign upload URL: {}", e),
            )
            .await;
            return Err(e.into());
        }
    };

    tracing::info!(job_id = %job_id, key = %key, "Issued presigned upload URL");

    Ok(Json(UploadUrlResponse {
        success: true,
        job_id,
        key,
        upload_url,
        expires_at,
    }))
}
