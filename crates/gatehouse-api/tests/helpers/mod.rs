//! Shared fixtures for HTTP-level tests.
//!
//! The real router and guards run against in-memory stand-ins for the job store, the
//! object store and the identity provider.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::routing::{get, post};
use axum::Router;
use axum_extra::extract::cookie::CookieJar;
use axum_test::{TestRequest, TestServer};
use chrono::Utc;
use gatehouse::auth::{AccountRegistry, IdentityError, IdentityProvider};
use gatehouse::{build_router, AppState, UploadConfig};
use gatehouse_core::models::{
    JobStage, JobStatus, NewUploadJob, Session, UploadJob, UploadJobMetadata, User,
};
use gatehouse_core::AppError;
use gatehouse_db::JobStore;
use gatehouse_infra::{SecurityHeadersConfig, TrustPolicy};
use gatehouse_storage::{ObjectStore, StorageError, StorageResult};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;

pub const ORIGIN: &str = "https://app.test";
pub const HOST: &str = "app.test";
pub const SESSION_COOKIE: &str = "sb-access-token";
pub const CSRF: &str = "0123456789abcdef0123456789abcdef";
pub const BUCKET: &str = "media-uploads";

#[derive(Default)]
pub struct FakeJobStore {
    jobs: Mutex<HashMap<Uuid, UploadJob>>,
    pub fail_create: AtomicBool,
    pub fail_update: AtomicBool,
}

impl FakeJobStore {
    pub fn all(&self) -> Vec<UploadJob> {
        self.jobs.lock().unwrap().values().cloned().collect()
    }

    pub fn count(&self) -> usize {
        self.jobs.lock().unwrap().len()
    }
}

#[async_trait]
impl JobStore for FakeJobStore {
    async fn create(&self, job: NewUploadJob) -> Result<Uuid, AppError> {
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(AppError::Internal("insert into media_jobs failed".into()));
        }
        let id = Uuid::new_v4();
        let now = Utc::now();
        self.jobs.lock().unwrap().insert(
            id,
            UploadJob {
                id,
                user_id: job.user_id,
                status: JobStatus::Uploading,
                stage: JobStage::AwaitingUpload,
                bucket: job.bucket,
                storage_key: job.storage_key,
                original_filename: None,
                original_content_type: None,
                original_size_bytes: None,
                last_error: None,
                created_at: now,
                updated_at: now,
            },
        );
        Ok(id)
    }

    async fn update_metadata(
        &self,
        job_id: Uuid,
        user_id: Uuid,
        metadata: &UploadJobMetadata,
    ) -> Result<(), AppError> {
        if self.fail_update.load(Ordering::SeqCst) {
            return Err(AppError::Internal("connection reset during update".into()));
        }
        let mut jobs = self.jobs.lock().unwrap();
        let job = jobs
            .get_mut(&job_id)
            .filter(|j| j.user_id == user_id && j.status == JobStatus::Uploading)
            .ok_or_else(|| AppError::Internal("job not found in uploading state".into()))?;
        job.storage_key = metadata.storage_key.clone();
        job.original_filename = Some(metadata.original_filename.clone());
        job.original_content_type = Some(metadata.original_content_type.clone());
        job.original_size_bytes = Some(metadata.original_size_bytes);
        job.updated_at = Utc::now();
        Ok(())
    }

    async fn mark_error(&self, job_id: Uuid, user_id: Uuid, reason: &str) -> Result<(), AppError> {
        let mut jobs = self.jobs.lock().unwrap();
        if let Some(job) = jobs.get_mut(&job_id).filter(|j| j.user_id == user_id) {
            if job.status.can_transition_to(JobStatus::Error) {
                job.status = JobStatus::Error;
                job.last_error = Some(reason.to_string());
            }
        }
        Ok(())
    }

    async fn get(&self, job_id: Uuid, user_id: Uuid) -> Result<Option<UploadJob>, AppError> {
        Ok(self
            .jobs
            .lock()
            .unwrap()
            .get(&job_id)
            .filter(|j| j.user_id == user_id)
            .cloned())
    }
}

#[derive(Default)]
pub struct FakeObjectStore {
    pub fail_presign: AtomicBool,
}

#[async_trait]
impl ObjectStore for FakeObjectStore {
    fn bucket(&self) -> &str {
        BUCKET
    }

    async fn presign_put(
        &self,
        key: &str,
        _content_type: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        if self.fail_presign.load(Ordering::SeqCst) {
            return Err(StorageError::SigningFailed(
                "SignatureDoesNotMatch: credentials rejected".into(),
            ));
        }
        Ok(format!(
            "https://storage.test/{}/{}?X-Amz-Expires={}",
            BUCKET,
            key,
            expires_in.as_secs()
        ))
    }
}

/// Session cookies look like `good:<uuid>` (confirmed by the provider) or
/// `forged:<uuid>` (readable but rejected on validation).
pub struct FakeIdentity;

#[async_trait]
impl IdentityProvider for FakeIdentity {
    async fn read_session(&self, cookies: &CookieJar) -> Option<Session> {
        let value = cookies.get(SESSION_COOKIE)?.value().to_string();
        let (_, id) = value.split_once(':')?;
        Some(Session {
            user_id: Uuid::parse_str(id).ok()?,
            access_token: value,
            expires_at: None,
        })
    }

    async fn validate_session(&self, session: &Session) -> Result<User, IdentityError> {
        if session.access_token.starts_with("good:") {
            Ok(User {
                id: session.user_id,
                email: Some("user@app.test".into()),
            })
        } else {
            Err(IdentityError::Rejected("invalid JWT".into()))
        }
    }
}

pub enum SignupOutcome {
    Created,
    Rejected(String),
    Unreachable,
}

pub struct FakeAccounts {
    pub outcome: Mutex<SignupOutcome>,
    pub created: Mutex<Vec<String>>,
}

#[async_trait]
impl AccountRegistry for FakeAccounts {
    async fn create_user(&self, email: &str, _password: &str) -> Result<(), IdentityError> {
        match &*self.outcome.lock().unwrap() {
            SignupOutcome::Created => {
                self.created.lock().unwrap().push(email.to_string());
                Ok(())
            }
            SignupOutcome::Rejected(msg) => Err(IdentityError::Rejected(msg.clone())),
            SignupOutcome::Unreachable => {
                Err(IdentityError::Transport("connection refused".into()))
            }
        }
    }
}

pub struct TestApp {
    pub server: TestServer,
    pub jobs: Arc<FakeJobStore>,
    pub objects: Arc<FakeObjectStore>,
    pub accounts: Arc<FakeAccounts>,
}

async fn page() -> &'static str {
    "page"
}

fn pages() -> Router {
    Router::new()
        .route("/", get(page))
        .route("/about", get(page))
        .route("/explore", get(page))
        .route("/account", get(page))
        .route("/private/settings", get(page))
        .route("/auth/login", get(page))
        .route("/auth/join", get(page))
        .route("/auth/callback", post(page))
}

pub fn setup_test_app() -> TestApp {
    let jobs = Arc::new(FakeJobStore::default());
    let objects = Arc::new(FakeObjectStore::default());
    let accounts = Arc::new(FakeAccounts {
        outcome: Mutex::new(SignupOutcome::Created),
        created: Mutex::new(Vec::new()),
    });

    let state = Arc::new(AppState {
        jobs: jobs.clone(),
        objects: objects.clone(),
        identity: Arc::new(FakeIdentity),
        accounts: accounts.clone(),
        trust: Arc::new(TrustPolicy::new(
            vec![ORIGIN.to_string()],
            vec![HOST.to_string(), "localhost".to_string()],
            vec!["/auth/callback".to_string()],
            false,
        )),
        security_headers: Arc::new(SecurityHeadersConfig::new(false)),
        uploads: UploadConfig {
            max_bytes: 2 * 1024 * 1024 * 1024,
            url_ttl: Duration::from_secs(600),
        },
    });

    let server =
        TestServer::new(build_router(state, pages())).expect("Failed to create test server");

    TestApp {
        server,
        jobs,
        objects,
        accounts,
    }
}

pub fn signed_in_cookie(user_id: Uuid) -> String {
    format!("{}=good:{}; csrf={}", SESSION_COOKIE, user_id, CSRF)
}

pub fn anonymous_cookie() -> String {
    format!("csrf={}", CSRF)
}

/// Attach what a same-origin browser sends on a state-changing request.
pub fn same_origin(request: TestRequest, cookie: String) -> TestRequest {
    request
        .add_header("host", HOST)
        .add_header("origin", ORIGIN)
        .add_header("cookie", cookie)
        .add_header("x-csrf-token", CSRF)
}
