// src/core/sync_coordinator.rs
//! Keeps the local stores consistent with the server across session
//! transitions and confirmed writes.

use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::core::client_state::ClientState;
use crate::core::collection_store::{CollectionStore, Entity};
use crate::core::credential_store::CredentialStore;
use crate::core::job_fit::{JobFitAction, JobFitState};
use crate::core::remote::{AuthClient, RemoteCollectionClient};
use crate::core::session_store::{Credential, Session};
use crate::error::{Result, SyncError};
use crate::types::{
    Application, ApplicationId, ApplicationStatus, JobId, ProfileUpdate, Recommendation, ResumeId,
    SavedJob,
};

/// Commit a fetched snapshot, or fall back to empty on failure.
fn commit_snapshot<E: Entity>(store: &mut CollectionStore<E>, fetched: Result<Vec<E>>) -> Result<()> {
    match fetched {
        Ok(entities) => {
            store.replace_all(entities);
            Ok(())
        }
        Err(err) => {
            store.replace_all(Vec::new());
            Err(err)
        }
    }
}

pub struct SyncCoordinator {
    remote: Arc<dyn RemoteCollectionClient>,
    auth: Arc<dyn AuthClient>,
    credentials: Arc<dyn CredentialStore>,
    state: RwLock<ClientState>,
}

impl SyncCoordinator {
    pub fn new(
        remote: Arc<dyn RemoteCollectionClient>,
        auth: Arc<dyn AuthClient>,
        credentials: Arc<dyn CredentialStore>,
    ) -> Self {
        Self {
            remote,
            auth,
            credentials,
            state: RwLock::new(ClientState::new()),
        }
    }

    // ===== Read access =====

    pub async fn session(&self) -> Option<Session> {
        self.state.read().await.session.current().cloned()
    }

    pub async fn generation(&self) -> u64 {
        self.state.read().await.session.generation()
    }

    pub async fn saved_jobs(&self) -> Vec<SavedJob> {
        self.state.read().await.saved_jobs.snapshot()
    }

    pub async fn is_job_saved(&self, job_id: JobId) -> bool {
        self.state.read().await.saved_jobs.contains(&job_id)
    }

    pub async fn applications(&self) -> Vec<Application> {
        self.state.read().await.applications.snapshot()
    }

    pub async fn job_fit(&self) -> JobFitState {
        self.state.read().await.job_fit.clone()
    }

    // ===== Session transitions =====

    /// Password login: token, persisted credential, current user, then `login`.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<Session> {
        let token = self.auth.authenticate(username, password).await?;
        let credential = Credential::new(token.access_token);
        self.credentials.set(&credential).await?;

        let user = match self.auth.current_user(&credential).await {
            Ok(user) => user,
            Err(err) => {
                warn!("Token issued for {} but current user lookup failed: {}", username, err);
                if let Err(clear_err) = self.credentials.clear().await {
                    warn!("Failed to clear stored credential: {}", clear_err);
                }
                return Err(err);
            }
        };

        let session = Session::new(user, credential);
        self.login(session.clone()).await?;
        Ok(session)
    }

    /// Re-derive the session from the stored credential, if any.
    pub async fn restore_session(&self) -> Result<Option<Session>> {
        let Some(credential) = self.credentials.get().await? else {
            debug!("No stored credential, staying anonymous");
            return Ok(None);
        };

        match self.auth.current_user(&credential).await {
            Ok(user) => {
                let session = Session::new(user, credential);
                self.login(session.clone()).await?;
                Ok(Some(session))
            }
            Err(err) if err.is_auth() => {
                warn!("Stored credential rejected: {}", err);
                self.credentials.clear().await?;
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    /// Install `session` and replace every collection with the server's snapshot.
    ///
    /// The session stays installed even when a fetch fails; the failed
    /// collection is left empty and the first failure is returned.
    pub async fn login(&self, session: Session) -> Result<()> {
        let generation = self.state.write().await.login(session.clone());
        info!(
            "Session started for {} ({}), generation {}",
            session.identity(),
            session.role(),
            generation
        );

        self.refresh_all(&session, generation).await
    }

    /// Edit the current user, then log in again with the server's copy so
    /// role changes rescope and refresh every collection.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<Session> {
        let (session, generation) = self.current_session().await?;
        if update.is_empty() {
            return Ok(session);
        }

        let result = self.auth.update_current_user(&session.credential, update).await;
        let user = self.settle(generation, result).await?;

        let updated = Session::new(user, session.credential);
        let next_generation = {
            let mut state = self.state.write().await;
            if !state.session.is_current(generation) {
                debug!("Discarding profile update for {}, session changed", updated.identity());
                return Ok(updated);
            }
            state.login(updated.clone())
        };

        info!(
            "Profile updated for {} ({}), generation {}",
            updated.identity(),
            updated.role(),
            next_generation
        );
        self.refresh_all(&updated, next_generation).await?;
        Ok(updated)
    }

    /// Clear the session and every collection. No network call is made.
    pub async fn logout(&self) -> Result<()> {
        let generation = self.state.write().await.logout();
        info!("Session cleared, generation {}", generation);
        self.credentials.clear().await
    }

    /// Forced logout after an auth failure observed under `generation`.
    async fn expire_session(&self, generation: u64) {
        {
            let mut state = self.state.write().await;
            if !state.session.is_current(generation) {
                debug!("Auth failure from generation {} ignored, session moved on", generation);
                return;
            }
            state.logout();
        }

        warn!("Credential rejected by server, session expired");
        if let Err(err) = self.credentials.clear().await {
            warn!("Failed to clear stored credential: {}", err);
        }
    }

    async fn settle<T>(&self, generation: u64, result: Result<T>) -> Result<T> {
        if let Err(err) = &result {
            if err.is_auth() {
                self.expire_session(generation).await;
            }
        }
        result
    }

    async fn current_session(&self) -> Result<(Session, u64)> {
        let state = self.state.read().await;
        match state.session.current() {
            Some(session) => Ok((session.clone(), state.session.generation())),
            None => Err(SyncError::not_logged_in()),
        }
    }

    // ===== Snapshots =====

    async fn refresh_all(&self, session: &Session, generation: u64) -> Result<()> {
        let tracks_applications = session.role().tracks_applications();

        let (saved, applications) = tokio::join!(
            self.remote.list_saved_jobs(session),
            async {
                if tracks_applications {
                    Some(self.remote.list_my_applications(session).await)
                } else {
                    None
                }
            }
        );

        let saved_outcome = self.commit_saved_jobs(generation, saved).await;
        let applications_outcome = match applications {
            Some(fetched) => self.commit_applications(generation, fetched).await,
            None => Ok(()),
        };

        let outcome = saved_outcome.and(applications_outcome);
        self.settle(generation, outcome).await
    }

    async fn commit_saved_jobs(&self, generation: u64, fetched: Result<Vec<SavedJob>>) -> Result<()> {
        let mut state = self.state.write().await;
        if !state.session.is_current(generation) {
            debug!("Discarding saved-jobs snapshot from generation {}", generation);
            return Ok(());
        }

        match &fetched {
            Ok(jobs) => debug!("Saved jobs snapshot: {} entries", jobs.len()),
            Err(err) => warn!("Failed to load saved jobs: {}", err),
        }
        commit_snapshot(&mut state.saved_jobs, fetched)
    }

    async fn commit_applications(
        &self,
        generation: u64,
        fetched: Result<Vec<Application>>,
    ) -> Result<()> {
        let mut state = self.state.write().await;
        if !state.session.is_current(generation) {
            debug!("Discarding applications snapshot from generation {}", generation);
            return Ok(());
        }

        match &fetched {
            Ok(apps) => debug!("Applications snapshot: {} entries", apps.len()),
            Err(err) => warn!("Failed to load applications: {}", err),
        }
        commit_snapshot(&mut state.applications, fetched)
    }

    /// Explicit re-fetch of the saved-jobs collection.
    pub async fn refresh_saved_jobs(&self) -> Result<()> {
        let (session, generation) = self.current_session().await?;
        let fetched = self.remote.list_saved_jobs(&session).await;
        let outcome = self.commit_saved_jobs(generation, fetched).await;
        self.settle(generation, outcome).await
    }

    /// Explicit re-fetch of the applications collection. No-op for non-candidates.
    pub async fn refresh_applications(&self) -> Result<()> {
        let (session, generation) = self.current_session().await?;
        if !session.role().tracks_applications() {
            return Ok(());
        }
        let fetched = self.remote.list_my_applications(&session).await;
        let outcome = self.commit_applications(generation, fetched).await;
        self.settle(generation, outcome).await
    }

    // ===== Confirmed writes =====

    /// Toggle the saved flag of a job. Returns the server's verdict.
    pub async fn toggle_save_job(&self, job_id: JobId) -> Result<bool> {
        let (session, generation) = self.current_session().await?;
        let result = self.remote.toggle_save_job(&session, job_id).await;
        let toggle = self.settle(generation, result).await?;

        let mut state = self.state.write().await;
        if !state.session.is_current(generation) {
            debug!("Discarding save toggle for job {}, session changed", job_id);
            return Ok(toggle.is_saved);
        }

        let is_saved = toggle.is_saved;
        if is_saved {
            state.saved_jobs.add(SavedJob::new(toggle.job));
        } else {
            state.saved_jobs.remove(&toggle.job.id);
        }
        info!("Job {} saved: {}", job_id, is_saved);
        Ok(is_saved)
    }

    pub async fn apply_to_job(&self, job_id: JobId, resume_id: ResumeId) -> Result<Application> {
        let (session, generation) = self.current_session().await?;
        let result = self.remote.apply_to_job(&session, job_id, resume_id).await;
        let application = self.settle(generation, result).await?;

        let mut state = self.state.write().await;
        if state.session.is_current(generation) {
            state.applications.add(application.clone());
            info!("Applied to job {} (application {})", job_id, application.id);
        }
        Ok(application)
    }

    pub async fn withdraw_application(&self, application_id: ApplicationId) -> Result<Application> {
        let (session, generation) = self.current_session().await?;
        let result = self.remote.withdraw_application(&session, application_id).await;
        let application = self.settle(generation, result).await?;
        self.commit_application_update(generation, &application).await;
        Ok(application)
    }

    /// Employer-side status change. Updates the local entry if one exists.
    pub async fn update_application_status(
        &self,
        application_id: ApplicationId,
        status: ApplicationStatus,
    ) -> Result<Application> {
        let (session, generation) = self.current_session().await?;
        let result = self
            .remote
            .update_application_status(&session, application_id, status)
            .await;
        let application = self.settle(generation, result).await?;
        self.commit_application_update(generation, &application).await;
        Ok(application)
    }

    /// Mark a pending application as reviewed.
    pub async fn review_application(&self, application_id: ApplicationId) -> Result<Application> {
        let (session, generation) = self.current_session().await?;
        let result = self.remote.review_application(&session, application_id).await;
        let application = self.settle(generation, result).await?;
        self.commit_application_update(generation, &application).await;
        Ok(application)
    }

    async fn commit_application_update(&self, generation: u64, application: &Application) {
        let mut state = self.state.write().await;
        if !state.session.is_current(generation) {
            debug!("Discarding update of application {}, session changed", application.id);
            return;
        }
        state.applications.update(application.clone());
        info!("Application {} is now {}", application.id, application.status);
    }

    // ===== Recommendations =====

    /// Load the recommendation feed, tracking progress in `job_fit()`.
    pub async fn load_recommendations(&self) -> Result<Vec<Recommendation>> {
        // Session lookup and the start marker happen under one lock.
        let (session, generation) = {
            let mut state = self.state.write().await;
            let session = state
                .session
                .current()
                .cloned()
                .ok_or_else(SyncError::not_logged_in)?;
            state.job_fit.apply(JobFitAction::CheckStart);
            (session, state.session.generation())
        };

        let result = self.remote.list_recommendations(&session).await;
        {
            let mut state = self.state.write().await;
            if state.session.is_current(generation) {
                let action = match &result {
                    Ok(recommendations) => JobFitAction::CheckSuccess(recommendations.clone()),
                    Err(err) => JobFitAction::CheckError(err.clone()),
                };
                state.job_fit.apply(action);
            }
        }

        self.settle(generation, result).await
    }

    pub async fn clear_job_fit(&self) {
        self.state.write().await.job_fit.apply(JobFitAction::Clear);
    }
}
