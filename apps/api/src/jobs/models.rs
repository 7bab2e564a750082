use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// A job posting row.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct JobRow {
    pub job_id: i32,
    pub title: String,
    pub company: String,
    pub location: String,
    pub experience: String,
    pub job_overview: String,
    pub key_responsibilities: String,
    /// Comma-separated skill list, as entered by the recruiter.
    pub must_have_skills: String,
    pub good_to_have_skills: Option<String>,
    pub job_type: String,
    pub recruiter_name: String,
    pub posted_date: DateTime<Utc>,
}

/// Job row plus its application count, for listings.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct JobSummaryRow {
    pub job_id: i32,
    pub title: String,
    pub company: String,
    pub location: String,
    pub experience: String,
    pub job_overview: String,
    pub key_responsibilities: String,
    pub must_have_skills: String,
    pub good_to_have_skills: Option<String>,
    pub job_type: String,
    pub recruiter_name: String,
    pub posted_date: DateTime<Utc>,
    pub applications_count: i64,
}

/// A job application row. `parsed_resume` is filled in later by the
/// deferred intake task.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ApplicationRow {
    pub id: Uuid,
    pub job_id: i32,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub email: String,
    pub experience_years: i32,
    pub experience_months: i32,
    pub current_city: String,
    pub resume_path: String,
    pub parsed_resume: Option<serde_json::Value>,
    pub applied_at: DateTime<Utc>,
}
