// src/types/portal_data.rs
//! Job-portal entities as exchanged with the REST backend

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::core::collection_store::Entity;

pub type UserId = i64;
pub type JobId = i64;
pub type CompanyId = i64;
pub type ResumeId = i64;
pub type ApplicationId = i64;

// ===== Users =====

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    Guest,
    Candidate,
    Employer,
}

impl UserRole {
    /// Only candidates own an applications collection
    pub fn tracks_applications(&self) -> bool {
        matches!(self, UserRole::Candidate)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Guest => "guest",
            UserRole::Candidate => "candidate",
            UserRole::Employer => "employer",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub user_type: UserRole,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub email: Option<String>,
    pub avatar: Option<String>,
    pub profile: Option<Profile>,
}

impl User {
    /// Users without a profile are treated as guests
    pub fn role(&self) -> UserRole {
        self.profile
            .as_ref()
            .map(|p| p.user_type)
            .unwrap_or_default()
    }

    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name);
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_string()
        }
    }
}

/// Sign-up fields sent to `/users/`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Registration {
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

/// Partial edit of the current user. `None` fields are not sent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub user_type: Option<UserRole>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Multipart field names understood by the current-user endpoint
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = Vec::new();
        if let Some(v) = &self.first_name {
            fields.push(("first_name", v.clone()));
        }
        if let Some(v) = &self.last_name {
            fields.push(("last_name", v.clone()));
        }
        if let Some(v) = &self.phone_number {
            fields.push(("profile.phone_number", v.clone()));
        }
        if let Some(v) = &self.address {
            fields.push(("profile.address", v.clone()));
        }
        if let Some(role) = self.user_type {
            fields.push(("profile.user_type", role.as_str().to_string()));
        }
        fields
    }
}

// ===== Jobs =====

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobType {
    FullTime,
    PartTime,
    Remote,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub company_id: CompanyId,
    pub title: String,
    pub salary: Option<i64>,
    pub job_type: Option<JobType>,
    pub created_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    pub id: CompanyId,
    pub user_id: Option<UserId>,
    pub name: String,
    pub logo: Option<String>,
    pub created_date: Option<DateTime<Utc>>,
}

/// Full job representation, including the caller's saved flag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobDetail {
    #[serde(flatten)]
    pub job: Job,
    pub description: Option<String>,
    pub location: Option<String>,
    pub company: Option<Company>,
    /// `None` for anonymous callers
    pub is_saved: Option<bool>,
}

/// A job saved by the current user. Keyed by the job id, not the save record id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedJob {
    pub job: Job,
    pub saved_at: Option<DateTime<Utc>>,
}

impl SavedJob {
    pub fn new(job: Job) -> Self {
        Self {
            job,
            saved_at: None,
        }
    }
}

impl Entity for SavedJob {
    type Id = JobId;

    fn id(&self) -> JobId {
        self.job.id
    }
}

/// Server verdict after a save toggle
#[derive(Debug, Clone, PartialEq)]
pub struct SaveToggle {
    pub job: Job,
    pub is_saved: bool,
}

// ===== Applications =====

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Pending,
    Reviewed,
    Rejected,
    Accepted,
    Withdrawn,
}

impl ApplicationStatus {
    pub fn is_withdrawable(&self) -> bool {
        matches!(self, ApplicationStatus::Pending | ApplicationStatus::Reviewed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Reviewed => "reviewed",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Accepted => "accepted",
            ApplicationStatus::Withdrawn => "withdrawn",
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(ApplicationStatus::Pending),
            "reviewed" => Ok(ApplicationStatus::Reviewed),
            "rejected" => Ok(ApplicationStatus::Rejected),
            "accepted" => Ok(ApplicationStatus::Accepted),
            "withdrawn" => Ok(ApplicationStatus::Withdrawn),
            other => Err(format!("Unknown application status: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    pub id: ApplicationId,
    pub resume: Option<ResumeId>,
    pub status: ApplicationStatus,
    pub created_date: Option<DateTime<Utc>>,
    pub candidate: Option<UserId>,
    pub job: Option<JobId>,
}

impl Entity for Application {
    type Id = ApplicationId;

    fn id(&self) -> ApplicationId {
        self.id
    }
}

// ===== Resumes =====

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resume {
    pub id: ResumeId,
    pub candidate_id: Option<UserId>,
    pub title: String,
    pub file: Option<String>,
    pub created_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_default: bool,
}

// ===== Job fit =====

/// Fit analysis attached to a recommended job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobFitReport {
    #[serde(rename = "fit_score")]
    pub score: Option<f64>,
    pub summary: Option<String>,
    #[serde(rename = "matching_skills", default)]
    pub matched_skills: Vec<String>,
    #[serde(default)]
    pub missing_skills: Vec<String>,
}

/// A job suggested for the current candidate. `analysis` is `None` when the
/// server sent no usable fit analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct Recommendation {
    pub job: JobDetail,
    pub analysis: Option<JobFitReport>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_role_from_profile() {
        let raw = r#"{
            "id": 7,
            "username": "alice",
            "first_name": "Alice",
            "last_name": "Nguyen",
            "email": "alice@example.com",
            "avatar": null,
            "profile": {"phone_number": "0900", "address": "HCM", "user_type": "candidate"}
        }"#;
        let user: User = serde_json::from_str(raw).unwrap();
        assert_eq!(user.role(), UserRole::Candidate);
        assert_eq!(user.display_name(), "Alice Nguyen");
    }

    #[test]
    fn test_user_without_profile_is_guest() {
        let raw = r#"{"id": 1, "username": "bob", "email": null, "avatar": null, "profile": null}"#;
        let user: User = serde_json::from_str(raw).unwrap();
        assert_eq!(user.role(), UserRole::Guest);
        assert_eq!(user.display_name(), "bob");
    }

    #[test]
    fn test_profile_update_sends_only_given_fields() {
        let update = ProfileUpdate {
            address: Some("Hue".to_string()),
            user_type: Some(UserRole::Employer),
            ..Default::default()
        };
        assert_eq!(
            update.form_fields(),
            vec![
                ("profile.address", "Hue".to_string()),
                ("profile.user_type", "employer".to_string()),
            ]
        );
        assert!(ProfileUpdate::default().is_empty());
        assert!(!update.is_empty());
    }

    #[test]
    fn test_job_detail_flattens_job_fields() {
        let raw = r#"{
            "id": 12,
            "company_id": 3,
            "title": "Rust Engineer",
            "salary": 3000,
            "job_type": "full_time",
            "created_date": null,
            "description": "<p>Systems work</p>",
            "location": "Hanoi",
            "company": null,
            "is_saved": true
        }"#;
        let detail: JobDetail = serde_json::from_str(raw).unwrap();
        assert_eq!(detail.job.id, 12);
        assert_eq!(detail.job.job_type, Some(JobType::FullTime));
        assert_eq!(detail.is_saved, Some(true));
    }

    #[test]
    fn test_fit_report_reads_wire_names() {
        let raw = r#"{
            "fit_score": 78,
            "matching_skills": ["Python", "Django"],
            "missing_skills": ["Kubernetes"],
            "summary": "Solid backend profile"
        }"#;
        let report: JobFitReport = serde_json::from_str(raw).unwrap();
        assert_eq!(report.score, Some(78.0));
        assert_eq!(report.matched_skills, vec!["Python", "Django"]);
        assert_eq!(report.missing_skills, vec!["Kubernetes"]);
        assert_eq!(report.summary.as_deref(), Some("Solid backend profile"));
    }

    #[test]
    fn test_application_status_parsing() {
        assert_eq!(
            "Withdrawn".parse::<ApplicationStatus>().unwrap(),
            ApplicationStatus::Withdrawn
        );
        assert!("archived".parse::<ApplicationStatus>().is_err());
        assert!(ApplicationStatus::Reviewed.is_withdrawable());
        assert!(!ApplicationStatus::Accepted.is_withdrawable());
    }
}
