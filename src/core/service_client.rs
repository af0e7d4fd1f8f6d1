// src/core/service_client.rs
//! reqwest implementation of the job-portal REST contract

use anyhow::Context;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::core::config_manager::ServiceConfig;
use crate::core::remote::{AuthClient, RemoteCollectionClient};
use crate::core::session_store::{Credential, Session};
use crate::error::{Result, SyncError};
use crate::types::response::{
    ApplyRequest, ChangePasswordRequest, PasswordGrantRequest, RecommendationRecord, ResumePatch,
    SaveJobRecord, StatusUpdateRequest,
};
use crate::types::{
    Application, ApplicationId, ApplicationStatus, Company, CompanyId, Job, JobDetail, JobId,
    Page, ProfileUpdate, Recommendation, Registration, Resume, ResumeId, SaveToggle, SavedJob,
    TokenResponse, User,
};
use crate::utils;

const TOKEN_ENDPOINT: &str = "/o/token/";
const USERS_ENDPOINT: &str = "/users/";
const CURRENT_USER_ENDPOINT: &str = "/users/current-user/";
const CHANGE_PASSWORD_ENDPOINT: &str = "/users/change-password/";
const SAVED_JOBS_ENDPOINT: &str = "/users/saved-jobs/";
const MY_APPLICATIONS_ENDPOINT: &str = "/applications/my-applications/";
const JOBS_ENDPOINT: &str = "/jobs/";
const COMPANIES_ENDPOINT: &str = "/companies/";
const RECOMMENDATIONS_ENDPOINT: &str = "/recommendations/";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

fn job_path(job_id: JobId, action: &str) -> String {
    format!("{}{}/{}", JOBS_ENDPOINT, job_id, action)
}

fn application_path(application_id: ApplicationId, action: &str) -> String {
    format!("/applications/{}/{}", application_id, action)
}

fn resumes_path(user_id: i64) -> String {
    format!("/users/{}/resumes/", user_id)
}

fn resume_path(resume_id: ResumeId) -> String {
    format!("/resumes/{}/", resume_id)
}

pub struct HttpApiClient {
    client: reqwest::Client,
    base_url: String,
    client_id: String,
    client_secret: String,
}

impl HttpApiClient {
    /// Create new API client
    pub fn new(base_url: &str, timeout_seconds: u64) -> anyhow::Result<Self> {
        let timeout = if timeout_seconds == 0 {
            DEFAULT_TIMEOUT_SECS
        } else {
            timeout_seconds
        };

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            client_id: String::new(),
            client_secret: String::new(),
        })
    }

    pub fn from_config(config: &ServiceConfig) -> anyhow::Result<Self> {
        Ok(Self::new(&config.api_url, config.timeout_seconds)?
            .with_oauth_client(&config.client_id, &config.client_secret))
    }

    pub fn with_oauth_client(mut self, client_id: &str, client_secret: &str) -> Self {
        self.client_id = client_id.to_string();
        self.client_secret = client_secret.to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    fn authorized(&self, request: RequestBuilder, credential: &Credential) -> RequestBuilder {
        request.bearer_auth(credential.bearer())
    }

    /// Send a request, mapping transport failures and non-2xx replies to `SyncError`
    async fn send_checked(&self, request: RequestBuilder, what: &str) -> Result<Response> {
        let response = request.send().await.map_err(|e| {
            warn!("{} request failed: {}", what, e);
            SyncError::from(e)
        })?;

        let status = response.status();
        debug!("{} response status: {}", what, status);

        if status.is_success() {
            Ok(response)
        } else {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            warn!("{} returned {}: {}", what, status, error_text);
            Err(SyncError::from_status(status, &error_text))
        }
    }

    async fn send_json<R>(&self, request: RequestBuilder, what: &str) -> Result<R>
    where
        R: DeserializeOwned,
    {
        self.send_checked(request, what)
            .await?
            .json::<R>()
            .await
            .map_err(|e| SyncError::InvalidResponse(format!("{}: {}", what, e)))
    }

    /// Public job list, one page at a time
    pub async fn list_jobs(&self, page: u32, query: Option<&str>) -> Result<Page<Job>> {
        let mut params: Vec<(&str, String)> = vec![("page", page.max(1).to_string())];
        if let Some(q) = query.filter(|q| !q.trim().is_empty()) {
            params.push(("q", q.trim().to_string()));
        }

        let request = self.client.get(self.url(JOBS_ENDPOINT)).query(&params);
        self.send_json(request, "list jobs").await
    }

    pub async fn job_detail(
        &self,
        credential: Option<&Credential>,
        job_id: JobId,
    ) -> Result<JobDetail> {
        let mut request = self
            .client
            .get(self.url(&format!("{}{}/", JOBS_ENDPOINT, job_id)));
        if let Some(credential) = credential {
            request = self.authorized(request, credential);
        }
        self.send_json(request, "job detail").await
    }

    pub async fn list_companies(&self) -> Result<Vec<Company>> {
        let request = self.client.get(self.url(COMPANIES_ENDPOINT));
        self.send_json(request, "list companies").await
    }

    pub async fn company_jobs(&self, company_id: CompanyId) -> Result<Vec<Job>> {
        let request = self
            .client
            .get(self.url(&format!("{}{}/jobs/", COMPANIES_ENDPOINT, company_id)));
        self.send_json(request, "company jobs").await
    }

    /// Create an account. The caller logs in separately afterwards.
    pub async fn register(&self, registration: &Registration) -> Result<User> {
        if registration.username.trim().is_empty() || registration.password.is_empty() {
            return Err(SyncError::Validation(
                "username and password are required".to_string(),
            ));
        }

        let form = Form::new()
            .text("username", registration.username.clone())
            .text("password", registration.password.clone())
            .text("first_name", registration.first_name.clone())
            .text("last_name", registration.last_name.clone())
            .text("email", registration.email.clone());

        info!("Registering account {}", registration.username);
        let request = self.client.post(self.url(USERS_ENDPOINT)).multipart(form);
        self.send_json(request, "register").await
    }

    pub async fn change_password(
        &self,
        session: &Session,
        old_password: &str,
        new_password: &str,
    ) -> Result<()> {
        let payload = ChangePasswordRequest {
            old_password,
            new_password,
            confirm_new_password: new_password,
        };
        let request = self.authorized(
            self.client
                .post(self.url(CHANGE_PASSWORD_ENDPOINT))
                .json(&payload),
            &session.credential,
        );
        self.send_checked(request, "change password").await?;
        info!("Password changed for {}", session.identity());
        Ok(())
    }

    pub async fn list_resumes(&self, session: &Session) -> Result<Vec<Resume>> {
        let request = self.authorized(
            self.client.get(self.url(&resumes_path(session.user_id()))),
            &session.credential,
        );
        self.send_json(request, "list resumes").await
    }

    /// Upload a pdf/docx resume as multipart form data
    pub async fn upload_resume(
        &self,
        session: &Session,
        file_path: &Path,
        title: &str,
        is_default: bool,
    ) -> Result<Resume> {
        let file_name = file_path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                SyncError::Validation(format!("Invalid file name: {}", file_path.display()))
            })?
            .to_string();
        let content_type = utils::resume_content_type(&file_name)
            .map_err(|e| SyncError::Validation(e.to_string()))?;

        let file_content = tokio::fs::read(file_path).await.map_err(|e| {
            SyncError::Validation(format!("Failed to read file {}: {}", file_path.display(), e))
        })?;

        let part = Part::bytes(file_content)
            .file_name(file_name)
            .mime_str(content_type)
            .map_err(|e| SyncError::Validation(format!("Failed to create multipart: {}", e)))?;

        let form = Form::new()
            .text("title", title.to_string())
            .text("is_default", is_default.to_string())
            .part("file", part);

        info!("Uploading resume '{}' for {}", title, session.identity());

        let request = self.authorized(
            self.client
                .post(self.url(&resumes_path(session.user_id())))
                .multipart(form),
            &session.credential,
        );
        self.send_json(request, "upload resume").await
    }

    async fn patch_resume(
        &self,
        session: &Session,
        resume_id: ResumeId,
        patch: &ResumePatch<'_>,
    ) -> Result<Resume> {
        let request = self.authorized(
            self.client.patch(self.url(&resume_path(resume_id))).json(patch),
            &session.credential,
        );
        self.send_json(request, "update resume").await
    }

    pub async fn rename_resume(
        &self,
        session: &Session,
        resume_id: ResumeId,
        title: &str,
    ) -> Result<Resume> {
        if title.trim().is_empty() {
            return Err(SyncError::Validation("Resume title is required".to_string()));
        }
        let patch = ResumePatch {
            title: Some(title.trim()),
            ..Default::default()
        };
        self.patch_resume(session, resume_id, &patch).await
    }

    pub async fn set_default_resume(&self, session: &Session, resume_id: ResumeId) -> Result<Resume> {
        let patch = ResumePatch {
            is_default: Some(true),
            ..Default::default()
        };
        self.patch_resume(session, resume_id, &patch).await
    }

    pub async fn delete_resume(&self, session: &Session, resume_id: ResumeId) -> Result<()> {
        let request = self.authorized(
            self.client.delete(self.url(&resume_path(resume_id))),
            &session.credential,
        );
        self.send_checked(request, "delete resume").await?;
        info!("Deleted resume {}", resume_id);
        Ok(())
    }
}

#[async_trait]
impl AuthClient for HttpApiClient {
    async fn authenticate(&self, username: &str, password: &str) -> Result<TokenResponse> {
        let payload = PasswordGrantRequest {
            username,
            password,
            client_id: &self.client_id,
            client_secret: &self.client_secret,
            grant_type: "password",
        };

        info!("Requesting token for {}", username);
        let request = self.client.post(self.url(TOKEN_ENDPOINT)).form(&payload);
        self.send_json(request, "token").await
    }

    async fn current_user(&self, credential: &Credential) -> Result<User> {
        let request = self.authorized(
            self.client.get(self.url(CURRENT_USER_ENDPOINT)),
            credential,
        );
        self.send_json(request, "current user").await
    }

    async fn update_current_user(
        &self,
        credential: &Credential,
        update: &ProfileUpdate,
    ) -> Result<User> {
        let form = update
            .form_fields()
            .into_iter()
            .fold(Form::new(), |form, (name, value)| form.text(name, value));

        let request = self.authorized(
            self.client.patch(self.url(CURRENT_USER_ENDPOINT)).multipart(form),
            credential,
        );
        self.send_json(request, "update current user").await
    }
}

#[async_trait]
impl RemoteCollectionClient for HttpApiClient {
    async fn list_saved_jobs(&self, session: &Session) -> Result<Vec<SavedJob>> {
        let request = self.authorized(
            self.client.get(self.url(SAVED_JOBS_ENDPOINT)),
            &session.credential,
        );
        let records: Vec<SaveJobRecord> = self.send_json(request, "list saved jobs").await?;
        Ok(records.into_iter().map(SavedJob::from).collect())
    }

    async fn list_my_applications(&self, session: &Session) -> Result<Vec<Application>> {
        let request = self.authorized(
            self.client.get(self.url(MY_APPLICATIONS_ENDPOINT)),
            &session.credential,
        );
        self.send_json(request, "list applications").await
    }

    async fn toggle_save_job(&self, session: &Session, job_id: JobId) -> Result<SaveToggle> {
        let request = self.authorized(
            self.client.post(self.url(&job_path(job_id, "save-job/"))),
            &session.credential,
        );
        let detail: JobDetail = self.send_json(request, "toggle save").await?;

        let is_saved = detail.is_saved.ok_or_else(|| {
            SyncError::InvalidResponse(format!("Job {} reply carries no is_saved flag", job_id))
        })?;

        Ok(SaveToggle {
            job: detail.job,
            is_saved,
        })
    }

    async fn apply_to_job(
        &self,
        session: &Session,
        job_id: JobId,
        resume_id: ResumeId,
    ) -> Result<Application> {
        let request = self.authorized(
            self.client
                .post(self.url(&job_path(job_id, "applications/")))
                .json(&ApplyRequest { resume: resume_id }),
            &session.credential,
        );
        self.send_json(request, "apply").await
    }

    async fn withdraw_application(
        &self,
        session: &Session,
        application_id: ApplicationId,
    ) -> Result<Application> {
        let request = self.authorized(
            self.client
                .post(self.url(&application_path(application_id, "withdraw/"))),
            &session.credential,
        );
        self.send_json(request, "withdraw").await
    }

    async fn update_application_status(
        &self,
        session: &Session,
        application_id: ApplicationId,
        status: ApplicationStatus,
    ) -> Result<Application> {
        let request = self.authorized(
            self.client
                .patch(self.url(&application_path(application_id, "update-status/")))
                .json(&StatusUpdateRequest {
                    status: status.as_str(),
                }),
            &session.credential,
        );
        self.send_json(request, "update status").await
    }

    async fn review_application(
        &self,
        session: &Session,
        application_id: ApplicationId,
    ) -> Result<Application> {
        let request = self.authorized(
            self.client
                .post(self.url(&application_path(application_id, "review/"))),
            &session.credential,
        );
        self.send_json(request, "review").await
    }

    async fn list_recommendations(&self, session: &Session) -> Result<Vec<Recommendation>> {
        let request = self.authorized(
            self.client.get(self.url(RECOMMENDATIONS_ENDPOINT)),
            &session.credential,
        );
        let records: Vec<RecommendationRecord> =
            self.send_json(request, "recommendations").await?;
        Ok(records.into_iter().map(Recommendation::from).collect())
    }
}
