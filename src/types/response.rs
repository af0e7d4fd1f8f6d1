use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::types::portal_data::{Job, JobDetail, JobFitReport, Recommendation, SavedJob};

// ===== Service Response Types =====

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: Option<String>,
    pub expires_in: Option<u64>,
    pub refresh_token: Option<String>,
    pub scope: Option<String>,
}

/// Save record as listed by `/users/saved-jobs/`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveJobRecord {
    pub id: i64,
    pub job: Job,
    pub created_date: Option<DateTime<Utc>>,
}

impl From<SaveJobRecord> for SavedJob {
    fn from(record: SaveJobRecord) -> Self {
        Self {
            job: record.job,
            saved_at: record.created_date,
        }
    }
}

/// Item of the `/recommendations/` feed.
///
/// `fit_analysis` is a serialized chat message: a list of `[key, value]`
/// pairs whose `content` entry holds the report as fenced JSON.
#[derive(Debug, Clone, Deserialize)]
pub struct RecommendationRecord {
    pub job: JobDetail,
    #[serde(default)]
    pub fit_analysis: Value,
}

impl From<RecommendationRecord> for Recommendation {
    fn from(record: RecommendationRecord) -> Self {
        let analysis = parse_fit_analysis(&record.fit_analysis);
        if analysis.is_none() {
            debug!("No usable fit analysis for job {}", record.job.job.id);
        }
        Self {
            job: record.job,
            analysis,
        }
    }
}

pub fn parse_fit_analysis(fit_analysis: &Value) -> Option<JobFitReport> {
    let content = fit_analysis.as_array()?.iter().find_map(|pair| {
        let pair = pair.as_array()?;
        match (pair.first()?.as_str()?, pair.get(1)?) {
            ("content", Value::String(content)) => Some(content.as_str()),
            _ => None,
        }
    })?;

    let raw = content.replace("```json", "").replace("```", "");
    serde_json::from_str(raw.trim()).ok()
}

/// Paginated list envelope used by the `page` query parameter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub count: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ApplyRequest {
    pub resume: i64,
}

#[derive(Debug, Serialize)]
pub(crate) struct StatusUpdateRequest<'a> {
    pub status: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct ChangePasswordRequest<'a> {
    pub old_password: &'a str,
    pub new_password: &'a str,
    pub confirm_new_password: &'a str,
}

/// Partial resume update, absent fields are left untouched
#[derive(Debug, Default, Serialize)]
pub(crate) struct ResumePatch<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_default: Option<bool>,
}

#[derive(Debug, Serialize)]
pub(crate) struct PasswordGrantRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
    pub client_id: &'a str,
    pub client_secret: &'a str,
    pub grant_type: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed_item(content: &str) -> String {
        serde_json::json!({
            "job": {
                "id": 21,
                "company_id": 4,
                "title": "Django Developer",
                "salary": 2500,
                "job_type": "full_time",
                "created_date": null,
                "description": "<p>APIs</p>",
                "location": "Da Nang"
            },
            "fit_analysis": [
                ["content", content],
                ["additional_kwargs", {"refusal": null}],
                ["type", "ai"]
            ]
        })
        .to_string()
    }

    #[test]
    fn test_recommendation_parses_fenced_analysis() {
        let content = "```json\n{\"fit_score\": 85, \"matching_skills\": [\"Python\"], \"missing_skills\": [\"AWS\"], \"summary\": \"Good match\"}\n```";
        let record: RecommendationRecord = serde_json::from_str(&feed_item(content)).unwrap();
        let recommendation = Recommendation::from(record);

        assert_eq!(recommendation.job.job.id, 21);
        assert_eq!(recommendation.job.location.as_deref(), Some("Da Nang"));
        assert_eq!(
            recommendation.analysis,
            Some(JobFitReport {
                score: Some(85.0),
                summary: Some("Good match".to_string()),
                matched_skills: vec!["Python".to_string()],
                missing_skills: vec!["AWS".to_string()],
            })
        );
    }

    #[test]
    fn test_unparseable_analysis_is_dropped() {
        let record: RecommendationRecord =
            serde_json::from_str(&feed_item("I could not analyse this resume.")).unwrap();
        assert_eq!(Recommendation::from(record).analysis, None);

        assert_eq!(parse_fit_analysis(&Value::Null), None);
        assert_eq!(parse_fit_analysis(&serde_json::json!([["type", "ai"]])), None);
    }
}
