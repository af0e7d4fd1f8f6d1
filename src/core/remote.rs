// src/core/remote.rs
//! Interfaces the cache consumes from the REST backend

use async_trait::async_trait;

use crate::core::session_store::{Credential, Session};
use crate::error::Result;
use crate::types::{
    Application, ApplicationId, ApplicationStatus, JobId, ProfileUpdate, Recommendation,
    ResumeId, SaveToggle, SavedJob, TokenResponse, User,
};

#[async_trait]
pub trait AuthClient: Send + Sync {
    /// Password grant, returns the bearer token
    async fn authenticate(&self, username: &str, password: &str) -> Result<TokenResponse>;

    async fn current_user(&self, credential: &Credential) -> Result<User>;

    /// Partial edit of the current user, returns the updated user
    async fn update_current_user(
        &self,
        credential: &Credential,
        update: &ProfileUpdate,
    ) -> Result<User>;
}

/// Every call returns the server's authoritative representation.
#[async_trait]
pub trait RemoteCollectionClient: Send + Sync {
    async fn list_saved_jobs(&self, session: &Session) -> Result<Vec<SavedJob>>;

    async fn list_my_applications(&self, session: &Session) -> Result<Vec<Application>>;

    /// The server decides between save and unsave and reports the outcome.
    async fn toggle_save_job(&self, session: &Session, job_id: JobId) -> Result<SaveToggle>;

    async fn apply_to_job(
        &self,
        session: &Session,
        job_id: JobId,
        resume_id: ResumeId,
    ) -> Result<Application>;

    async fn withdraw_application(
        &self,
        session: &Session,
        application_id: ApplicationId,
    ) -> Result<Application>;

    async fn update_application_status(
        &self,
        session: &Session,
        application_id: ApplicationId,
        status: ApplicationStatus,
    ) -> Result<Application>;

    async fn review_application(
        &self,
        session: &Session,
        application_id: ApplicationId,
    ) -> Result<Application>;

    /// Jobs suggested for the session's candidate, each with its fit analysis
    async fn list_recommendations(&self, session: &Session) -> Result<Vec<Recommendation>>;
}
