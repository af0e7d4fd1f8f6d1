// src/core/job_fit.rs
//! State of the last recommendations load

use crate::error::SyncError;
use crate::types::Recommendation;

#[derive(Debug, Clone, PartialEq)]
pub enum JobFitAction {
    CheckStart,
    CheckSuccess(Vec<Recommendation>),
    CheckError(SyncError),
    Clear,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobFitState {
    pub loading: bool,
    pub error: Option<SyncError>,
    pub data: Option<Vec<Recommendation>>,
}

impl JobFitState {
    pub fn apply(&mut self, action: JobFitAction) {
        match action {
            JobFitAction::CheckStart => {
                self.loading = true;
                self.error = None;
                self.data = None;
            }
            JobFitAction::CheckSuccess(recommendations) => {
                self.loading = false;
                self.data = Some(recommendations);
            }
            // data is left as it was
            JobFitAction::CheckError(err) => {
                self.loading = false;
                self.error = Some(err);
            }
            JobFitAction::Clear => *self = Self::default(),
        }
    }
}
