//! Scripted in-process stand-in for the REST backend

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

use jobportal_client::core::{
    AuthClient, Credential, CredentialStore, MemoryCredentialStore, RemoteCollectionClient,
    Session,
};
use jobportal_client::types::{
    Application, ApplicationId, ApplicationStatus, Job, JobDetail, JobFitReport, JobId, Profile,
    ProfileUpdate, Recommendation, ResumeId, SaveToggle, SavedJob, TokenResponse, User, UserRole,
};
use jobportal_client::{Result, SyncError};

/// Holds a fetch open until the test releases it.
#[derive(Clone, Default)]
pub struct Gate {
    pub entered: Arc<Notify>,
    pub release: Arc<Notify>,
}

pub struct FakePortal {
    pub saved_jobs: Mutex<Result<Vec<SavedJob>>>,
    pub applications: Mutex<Result<Vec<Application>>>,
    pub toggles: Mutex<VecDeque<Result<SaveToggle>>>,
    pub writes: Mutex<VecDeque<Result<Application>>>,
    pub recommendations: Mutex<VecDeque<Result<Vec<Recommendation>>>>,
    pub profile_updates: Mutex<VecDeque<Result<User>>>,
    pub token: Mutex<Result<TokenResponse>>,
    pub user: Mutex<Result<User>>,
    pub saved_jobs_gate: Mutex<Option<Gate>>,
    pub recommendations_gate: Mutex<Option<Gate>>,
    pub calls: Mutex<Vec<String>>,
}

impl Default for FakePortal {
    fn default() -> Self {
        Self {
            saved_jobs: Mutex::new(Ok(Vec::new())),
            applications: Mutex::new(Ok(Vec::new())),
            toggles: Mutex::new(VecDeque::new()),
            writes: Mutex::new(VecDeque::new()),
            recommendations: Mutex::new(VecDeque::new()),
            profile_updates: Mutex::new(VecDeque::new()),
            token: Mutex::new(Err(SyncError::Auth("no token scripted".to_string()))),
            user: Mutex::new(Err(SyncError::Auth("no user scripted".to_string()))),
            saved_jobs_gate: Mutex::new(None),
            recommendations_gate: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
        }
    }
}

impl FakePortal {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_saved_jobs(&self, result: Result<Vec<SavedJob>>) {
        *self.saved_jobs.lock().unwrap() = result;
    }

    pub fn set_applications(&self, result: Result<Vec<Application>>) {
        *self.applications.lock().unwrap() = result;
    }

    pub fn push_toggle(&self, result: Result<SaveToggle>) {
        self.toggles.lock().unwrap().push_back(result);
    }

    pub fn push_write(&self, result: Result<Application>) {
        self.writes.lock().unwrap().push_back(result);
    }

    pub fn push_recommendations(&self, result: Result<Vec<Recommendation>>) {
        self.recommendations.lock().unwrap().push_back(result);
    }

    pub fn push_profile_update(&self, result: Result<User>) {
        self.profile_updates.lock().unwrap().push_back(result);
    }

    pub fn set_token(&self, result: Result<TokenResponse>) {
        *self.token.lock().unwrap() = result;
    }

    pub fn set_user(&self, result: Result<User>) {
        *self.user.lock().unwrap() = result;
    }

    /// The next `list_saved_jobs` call waits on the returned gate.
    pub fn gate_next_saved_jobs(&self) -> Gate {
        let gate = Gate::default();
        *self.saved_jobs_gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    pub fn gate_next_recommendations(&self) -> Gate {
        let gate = Gate::default();
        *self.recommendations_gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, name: &str) -> usize {
        self.calls().iter().filter(|c| c.as_str() == name).count()
    }

    fn record(&self, name: &str) {
        self.calls.lock().unwrap().push(name.to_string());
    }

    fn next<T>(queue: &Mutex<VecDeque<Result<T>>>, what: &str) -> Result<T> {
        queue
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(SyncError::InvalidResponse(format!("unscripted {}", what))))
    }
}

#[async_trait]
impl AuthClient for FakePortal {
    async fn authenticate(&self, _username: &str, _password: &str) -> Result<TokenResponse> {
        self.record("authenticate");
        self.token.lock().unwrap().clone()
    }

    async fn current_user(&self, _credential: &Credential) -> Result<User> {
        self.record("current_user");
        self.user.lock().unwrap().clone()
    }

    async fn update_current_user(
        &self,
        _credential: &Credential,
        _update: &ProfileUpdate,
    ) -> Result<User> {
        self.record("update_current_user");
        Self::next(&self.profile_updates, "profile update")
    }
}

#[async_trait]
impl RemoteCollectionClient for FakePortal {
    async fn list_saved_jobs(&self, _session: &Session) -> Result<Vec<SavedJob>> {
        self.record("list_saved_jobs");
        // Snapshot is taken at call start, like a server answering immediately
        // but a slow network delivering late.
        let snapshot = self.saved_jobs.lock().unwrap().clone();
        let gate = self.saved_jobs_gate.lock().unwrap().take();
        if let Some(gate) = gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }
        snapshot
    }

    async fn list_my_applications(&self, _session: &Session) -> Result<Vec<Application>> {
        self.record("list_my_applications");
        self.applications.lock().unwrap().clone()
    }

    async fn toggle_save_job(&self, _session: &Session, _job_id: JobId) -> Result<SaveToggle> {
        self.record("toggle_save_job");
        Self::next(&self.toggles, "toggle")
    }

    async fn apply_to_job(
        &self,
        _session: &Session,
        _job_id: JobId,
        _resume_id: ResumeId,
    ) -> Result<Application> {
        self.record("apply_to_job");
        Self::next(&self.writes, "apply")
    }

    async fn withdraw_application(
        &self,
        _session: &Session,
        _application_id: ApplicationId,
    ) -> Result<Application> {
        self.record("withdraw_application");
        Self::next(&self.writes, "withdraw")
    }

    async fn update_application_status(
        &self,
        _session: &Session,
        _application_id: ApplicationId,
        _status: ApplicationStatus,
    ) -> Result<Application> {
        self.record("update_application_status");
        Self::next(&self.writes, "status update")
    }

    async fn review_application(
        &self,
        _session: &Session,
        _application_id: ApplicationId,
    ) -> Result<Application> {
        self.record("review_application");
        Self::next(&self.writes, "review")
    }

    async fn list_recommendations(&self, _session: &Session) -> Result<Vec<Recommendation>> {
        self.record("list_recommendations");
        let result = Self::next(&self.recommendations, "recommendations");
        let gate = self.recommendations_gate.lock().unwrap().take();
        if let Some(gate) = gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }
        result
    }
}

/// Credential store whose `clear` always fails.
#[derive(Default)]
pub struct StickyCredentialStore {
    inner: MemoryCredentialStore,
}

#[async_trait]
impl CredentialStore for StickyCredentialStore {
    async fn get(&self) -> Result<Option<Credential>> {
        self.inner.get().await
    }

    async fn set(&self, credential: &Credential) -> Result<()> {
        self.inner.set(credential).await
    }

    async fn clear(&self) -> Result<()> {
        Err(SyncError::Storage("database is locked".to_string()))
    }
}

// ===== Fixtures =====

pub fn user(id: i64, username: &str, role: UserRole) -> User {
    User {
        id,
        username: username.to_string(),
        first_name: String::new(),
        last_name: String::new(),
        email: Some(format!("{}@example.com", username)),
        avatar: None,
        profile: Some(Profile {
            phone_number: None,
            address: None,
            user_type: role,
        }),
    }
}

pub fn session(username: &str, role: UserRole) -> Session {
    Session::new(user(1, username, role), Credential::new(format!("token-{}", username)))
}

pub fn job(id: JobId, title: &str) -> Job {
    Job {
        id,
        company_id: 1,
        title: title.to_string(),
        salary: Some(1000),
        job_type: None,
        created_date: None,
    }
}

pub fn saved(id: JobId, title: &str) -> SavedJob {
    SavedJob::new(job(id, title))
}

pub fn application(id: ApplicationId, status: ApplicationStatus) -> Application {
    Application {
        id,
        resume: Some(5),
        status,
        created_date: None,
        candidate: Some(1),
        job: Some(100 + id),
    }
}

pub fn token(access_token: &str) -> TokenResponse {
    TokenResponse {
        access_token: access_token.to_string(),
        token_type: Some("Bearer".to_string()),
        expires_in: Some(36000),
        refresh_token: None,
        scope: None,
    }
}

pub fn recommendation(id: JobId, title: &str, score: f64) -> Recommendation {
    Recommendation {
        job: JobDetail {
            job: job(id, title),
            description: None,
            location: Some("Hanoi".to_string()),
            company: None,
            is_saved: None,
        },
        analysis: Some(JobFitReport {
            score: Some(score),
            summary: Some(format!("{} fits", title)),
            matched_skills: vec!["rust".to_string()],
            missing_skills: vec![],
        }),
    }
}
