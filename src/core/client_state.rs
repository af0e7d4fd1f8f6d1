// src/core/client_state.rs
use crate::core::collection_store::CollectionStore;
use crate::core::job_fit::{JobFitAction, JobFitState};
use crate::core::session_store::{Session, SessionStore};
use crate::types::{Application, SavedJob};

/// The session and every store that depends on it.
///
/// Kept behind one lock so a session transition and the matching resets are
/// observed together.
#[derive(Debug, Default)]
pub struct ClientState {
    pub session: SessionStore,
    pub saved_jobs: CollectionStore<SavedJob>,
    pub applications: CollectionStore<Application>,
    pub job_fit: JobFitState,
}

impl ClientState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Switch to `session` and empty the dependent stores. Returns the new generation.
    pub fn login(&mut self, session: Session) -> u64 {
        let generation = self.session.login(session);
        self.reset_dependents();
        generation
    }

    pub fn logout(&mut self) -> u64 {
        let generation = self.session.logout();
        self.reset_dependents();
        generation
    }

    fn reset_dependents(&mut self) {
        self.saved_jobs.replace_all(Vec::new());
        self.applications.replace_all(Vec::new());
        self.job_fit.apply(JobFitAction::Clear);
    }
}
