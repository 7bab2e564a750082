//! Axum route handlers for jobs and applications.

use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::intake::{file_extension, spawn_parse_task, store_resume, ALLOWED_EXTENSIONS};
use crate::interview::handlers::{create_session, StartInterviewResponse};
use crate::interview::models::{
    ExperienceRequired, JobDescriptionData, ResumeData, SkillsData,
};
use crate::jobs::models::{ApplicationRow, JobRow, JobSummaryRow};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateJobRequest {
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
}

#[derive(Debug, Serialize)]
pub struct JobListResponse {
    pub jobs: Vec<JobSummaryRow>,
}

#[derive(Debug, Serialize)]
pub struct ApplyResponse {
    pub id: Uuid,
    pub job_id: i32,
    pub resume_path: String,
    pub message: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/jobs
pub async fn handle_create_job(
    State(state): State<AppState>,
    Json(request): Json<CreateJobRequest>,
) -> Result<Json<JobRow>, AppError> {
    for (field, value) in [
        ("title", &request.title),
        ("company", &request.company),
        ("must_have_skills", &request.must_have_skills),
    ] {
        if value.trim().is_empty() {
            return Err(AppError::Validation(format!("{field} cannot be empty")));
        }
    }

    let job = sqlx::query_as::<_, JobRow>(
        "INSERT INTO jobs (title, company, location, experience, job_overview, \
         key_responsibilities, must_have_skills, good_to_have_skills, job_type, recruiter_name) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING *",
    )
    .bind(&request.title)
    .bind(&request.company)
    .bind(&request.location)
    .bind(&request.experience)
    .bind(&request.job_overview)
    .bind(&request.key_responsibilities)
    .bind(&request.must_have_skills)
    .bind(&request.good_to_have_skills)
    .bind(&request.job_type)
    .bind(&request.recruiter_name)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(job))
}

/// GET /api/v1/jobs
///
/// All postings, newest first, with application counts.
pub async fn handle_list_jobs(
    State(state): State<AppState>,
) -> Result<Json<JobListResponse>, AppError> {
    let jobs = sqlx::query_as::<_, JobSummaryRow>(
        "SELECT j.*, COUNT(a.id) AS applications_count \
         FROM jobs j LEFT JOIN job_applications a ON a.job_id = j.job_id \
         GROUP BY j.job_id ORDER BY j.posted_date DESC",
    )
    .fetch_all(&state.db)
    .await?;

    Ok(Json(JobListResponse { jobs }))
}

/// POST /api/v1/jobs/:job_id/apply  (multipart)
///
/// Applicant fields plus a `resume` file part. The file is stored on disk
/// and handed to the deferred intake task; the response does not wait for
/// parsing.
pub async fn handle_apply(
    State(state): State<AppState>,
    Path(job_id): Path<i32>,
    mut multipart: Multipart,
) -> Result<Json<ApplyResponse>, AppError> {
    let job = sqlx::query_as::<_, JobRow>("SELECT * FROM jobs WHERE job_id = $1")
        .bind(job_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {job_id} not found")))?;

    let mut first_name = None;
    let mut middle_name = None;
    let mut last_name = None;
    let mut email = None;
    let mut experience_years: Option<i32> = None;
    let mut experience_months: Option<i32> = None;
    let mut current_city = None;
    let mut resume: Option<(String, bytes::Bytes)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("invalid multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "first_name" => first_name = Some(read_text(field).await?),
            "middle_name" => {
                middle_name = Some(read_text(field).await?).filter(|v| !v.is_empty())
            }
            "last_name" => last_name = Some(read_text(field).await?),
            "email" => email = Some(read_text(field).await?),
            "experience_years" => experience_years = Some(read_int(field).await?),
            "experience_months" => experience_months = Some(read_int(field).await?),
            "current_city" => current_city = Some(read_text(field).await?),
            "resume" => {
                let filename = field
                    .file_name()
                    .ok_or_else(|| {
                        AppError::Validation("resume part must be a file".to_string())
                    })?
                    .to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("failed to read resume: {e}")))?;
                resume = Some((filename, data));
            }
            _ => {} // unknown parts are ignored
        }
    }

    let first_name = required(first_name, "first_name")?;
    let last_name = required(last_name, "last_name")?;
    let email = required(email, "email")?;
    let current_city = required(current_city, "current_city")?;
    let experience_years =
        experience_years.ok_or_else(|| AppError::Validation("experience_years is required".to_string()))?;
    let experience_months = experience_months
        .ok_or_else(|| AppError::Validation("experience_months is required".to_string()))?;
    let (filename, data) =
        resume.ok_or_else(|| AppError::Validation("resume file is required".to_string()))?;

    let ext = file_extension(&filename)
        .filter(|e| ALLOWED_EXTENSIONS.contains(&e.as_str()))
        .ok_or_else(|| {
            AppError::Validation(
                "File type not allowed. Please upload PDF or TXT files".to_string(),
            )
        })?;

    let resume_path = store_resume(&state.config.upload_dir, &email, &ext, &data).await?;

    let application_id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO job_applications (id, job_id, first_name, middle_name, last_name, email, \
         experience_years, experience_months, current_city, resume_path) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
    )
    .bind(application_id)
    .bind(job.job_id)
    .bind(&first_name)
    .bind(&middle_name)
    .bind(&last_name)
    .bind(&email)
    .bind(experience_years)
    .bind(experience_months)
    .bind(&current_city)
    .bind(&resume_path)
    .execute(&state.db)
    .await?;

    spawn_parse_task(
        state.db.clone(),
        state.llm.clone(),
        application_id,
        data,
        filename,
    );

    Ok(Json(ApplyResponse {
        id: application_id,
        job_id: job.job_id,
        resume_path,
        message: "Application submitted successfully".to_string(),
    }))
}

/// GET /api/v1/applications/:id
pub async fn handle_get_application(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApplicationRow>, AppError> {
    let application =
        sqlx::query_as::<_, ApplicationRow>("SELECT * FROM job_applications WHERE id = $1")
            .bind(id)
            .fetch_optional(&state.db)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Application {id} not found")))?;

    Ok(Json(application))
}

/// POST /api/v1/applications/:id/interview
///
/// Starts an interview session from a stored application: the parsed résumé
/// plus the job posting it was made against. 409 until the deferred parse
/// task has filled in `parsed_resume`.
pub async fn handle_start_interview_from_application(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<StartInterviewResponse>, AppError> {
    let application =
        sqlx::query_as::<_, ApplicationRow>("SELECT * FROM job_applications WHERE id = $1")
            .bind(id)
            .fetch_optional(&state.db)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Application {id} not found")))?;

    let parsed = application.parsed_resume.ok_or_else(|| {
        AppError::InvalidState("Resume has not been parsed yet; try again shortly".to_string())
    })?;
    let resume_data: ResumeData = serde_json::from_value(parsed)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("stored resume is malformed: {e}")))?;

    let job = sqlx::query_as::<_, JobRow>("SELECT * FROM jobs WHERE job_id = $1")
        .bind(application.job_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {} not found", application.job_id)))?;

    let jd_data = job_description_from_row(&job);
    let response = create_session(&state, resume_data, jd_data).await;
    Ok(Json(response))
}

/// Assembles the interview-facing JD value object from a job row.
fn job_description_from_row(job: &JobRow) -> JobDescriptionData {
    JobDescriptionData {
        company: job.company.clone(),
        skills: SkillsData {
            must_have: split_skills(&job.must_have_skills),
            nice_to_have: job
                .good_to_have_skills
                .as_deref()
                .map(split_skills)
                .unwrap_or_default(),
        },
        experience_required: ExperienceRequired {
            min_years: parse_min_years(&job.experience),
            max_years: None,
        },
        responsibilities: split_responsibilities(&job.key_responsibilities),
    }
}

fn split_skills(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Non-empty lines of the responsibilities text.
fn split_responsibilities(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

/// First number in a free-text experience requirement ("3-5 years" → 3).
fn parse_min_years(raw: &str) -> u32 {
    let digits: String = raw
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().unwrap_or(0)
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String, AppError> {
    field
        .text()
        .await
        .map(|t| t.trim().to_string())
        .map_err(|e| AppError::Validation(format!("invalid field value: {e}")))
}

async fn read_int(field: axum::extract::multipart::Field<'_>) -> Result<i32, AppError> {
    let name = field.name().unwrap_or_default().to_string();
    read_text(field)
        .await?
        .parse()
        .map_err(|_| AppError::Validation(format!("{name} must be a number")))
}

fn required(value: Option<String>, field: &str) -> Result<String, AppError> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(AppError::Validation(format!("{field} is required"))),
    }
}
