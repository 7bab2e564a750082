//! Résumé intake — text extraction and best-effort deferred parsing.
//!
//! Applications are accepted immediately; structuring the résumé into
//! `ResumeData` happens in a detached task that updates the application row
//! when (and if) it succeeds. Every failure in that task is logged and
//! swallowed; an application never fails because of parsing.

use anyhow::{Context, Result};
use bytes::Bytes;
use chrono::Utc;
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::interview::models::ResumeData;
use crate::llm_client::{CallParams, LlmClient, LlmError};

/// File types accepted for résumé upload.
pub const ALLOWED_EXTENSIONS: &[&str] = &[".pdf", ".txt"];

/// Parsing wants the most deterministic output the model will give.
const PARSE_PARAMS: CallParams = CallParams {
    max_tokens: 1024,
    temperature: 0.2,
};

/// Résumé structuring prompt. Replace `{resume_text}` before sending.
const RESUME_PARSE_PROMPT_TEMPLATE: &str = r#"Extract structured candidate data from the resume below.

Return a JSON object with this EXACT schema (no extra fields):
{
  "candidate_first_name": "Ada",
  "candidate_last_name": "Lovelace",
  "primary_skills": ["Python", "SQL"],
  "secondary_skills": ["Docker"],
  "domain_expertise": ["fintech"]
}

Rules:
- primary_skills: technologies the candidate has used professionally, most prominent first
- secondary_skills: technologies mentioned in passing or used briefly
- domain_expertise: industries or problem domains, not technologies
- Respond with valid JSON only. No markdown fences, no explanations.

RESUME:
{resume_text}"#;

/// Returns the lowercase extension (with dot) of an uploaded filename.
pub fn file_extension(filename: &str) -> Option<String> {
    let idx = filename.rfind('.')?;
    Some(filename[idx..].to_lowercase())
}

/// Extracts plain text from an uploaded résumé.
pub fn extract_text(data: &[u8], filename: &str) -> Result<String, AppError> {
    let ext = file_extension(filename)
        .ok_or_else(|| AppError::Validation("resume file has no extension".to_string()))?;

    match ext.as_str() {
        ".pdf" => pdf_extract::extract_text_from_mem(data)
            .map(|t| t.trim().to_string())
            .map_err(|e| AppError::Validation(format!("failed to read PDF: {e}"))),
        ".txt" => Ok(String::from_utf8_lossy(data).trim().to_string()),
        other => Err(AppError::Validation(format!(
            "File type {other} not allowed. Please upload PDF or TXT files"
        ))),
    }
}

/// Reduces a caller-supplied string to characters safe in a filename.
/// The email arrives from an unauthenticated multipart field, so path
/// separators and anything else exotic must not reach the filesystem.
fn sanitize_filename_component(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '-' | '_'))
        .collect();
    if cleaned.is_empty() {
        "resume".to_string()
    } else {
        cleaned
    }
}

/// Writes an uploaded résumé to the upload directory and returns its path.
/// Stored name is `{email}_{timestamp}{ext}` with the email sanitized so the
/// file cannot land outside the upload directory.
pub async fn store_resume(
    upload_dir: &str,
    email: &str,
    ext: &str,
    data: &[u8],
) -> Result<String> {
    let email = sanitize_filename_component(email);
    let stored_name = format!("{email}_{}{ext}", Utc::now().format("%Y%m%d_%H%M%S"));
    let path = std::path::Path::new(upload_dir).join(stored_name);

    tokio::fs::create_dir_all(upload_dir)
        .await
        .with_context(|| format!("failed to create upload dir {upload_dir}"))?;
    tokio::fs::write(&path, data)
        .await
        .with_context(|| format!("failed to write resume to {}", path.display()))?;

    Ok(path.to_string_lossy().into_owned())
}

/// Structures résumé text into `ResumeData` via the LLM.
pub async fn parse_resume(llm: &LlmClient, resume_text: &str) -> Result<ResumeData, LlmError> {
    let prompt = RESUME_PARSE_PROMPT_TEMPLATE.replace("{resume_text}", resume_text);
    llm.complete_json::<ResumeData>(&prompt, PARSE_PARAMS).await
}

/// Spawns the deferred parse task for a freshly inserted application.
/// Without an LLM client the task is skipped outright.
pub fn spawn_parse_task(
    db: PgPool,
    llm: Option<LlmClient>,
    application_id: Uuid,
    data: Bytes,
    filename: String,
) {
    let Some(llm) = llm else {
        warn!("No LLM configured; skipping resume parsing for application {application_id}");
        return;
    };

    tokio::spawn(async move {
        let text = match extract_text(&data, &filename) {
            Ok(t) if !t.is_empty() => t,
            Ok(_) => {
                warn!("Resume for application {application_id} contained no text");
                return;
            }
            Err(e) => {
                warn!("Resume text extraction failed for application {application_id}: {e}");
                return;
            }
        };

        let resume = match parse_resume(&llm, &text).await {
            Ok(r) => r,
            Err(e) => {
                warn!("Resume parsing failed for application {application_id}: {e}");
                return;
            }
        };

        let parsed = match serde_json::to_value(&resume) {
            Ok(v) => v,
            Err(e) => {
                warn!("Resume serialization failed for application {application_id}: {e}");
                return;
            }
        };

        let result = sqlx::query("UPDATE job_applications SET parsed_resume = $1 WHERE id = $2")
            .bind(&parsed)
            .bind(application_id)
            .execute(&db)
            .await;

        match result {
            Ok(_) => info!("Parsed resume stored for application {application_id}"),
            Err(e) => warn!("Failed to store parsed resume for {application_id}: {e}"),
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_extension_lowercases() {
        assert_eq!(file_extension("Resume.PDF"), Some(".pdf".to_string()));
        assert_eq!(file_extension("cv.txt"), Some(".txt".to_string()));
        assert_eq!(file_extension("noext"), None);
    }

    #[test]
    fn test_extract_text_txt() {
        let text = extract_text(b"  Ada Lovelace\nPython, SQL  ", "cv.txt").unwrap();
        assert_eq!(text, "Ada Lovelace\nPython, SQL");
    }

    #[test]
    fn test_extract_text_rejects_unknown_type() {
        let err = extract_text(b"binary", "cv.docx").unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_parse_prompt_has_no_stray_placeholder() {
        let prompt = RESUME_PARSE_PROMPT_TEMPLATE.replace("{resume_text}", "text here");
        assert!(prompt.contains("text here"));
        assert!(!prompt.contains("{resume_text}"));
    }

    #[test]
    fn test_allowed_extensions_cover_extractors() {
        for ext in ALLOWED_EXTENSIONS {
            assert!(matches!(*ext, ".pdf" | ".txt"));
        }
    }

    #[test]
    fn test_sanitize_filename_component_strips_path_characters() {
        assert_eq!(
            sanitize_filename_component("ada@example.com"),
            "ada@example.com"
        );
        assert_eq!(sanitize_filename_component("../escaped"), "..escaped");
        assert_eq!(sanitize_filename_component("a/b\\c"), "abc");
        assert_eq!(sanitize_filename_component("///"), "resume");
    }

    #[tokio::test]
    async fn test_store_resume_confines_traversal_email_to_upload_dir() {
        let dir = tempfile::tempdir().unwrap();
        let upload_dir = dir.path().to_string_lossy().into_owned();

        let path = store_resume(&upload_dir, "../escaped", ".txt", b"owned")
            .await
            .unwrap();

        assert!(
            path.starts_with(&upload_dir),
            "resume written outside upload dir: {path}"
        );
        assert_eq!(
            std::path::Path::new(&path).parent(),
            Some(dir.path()),
            "resume not a direct child of the upload dir: {path}"
        );
        assert_eq!(tokio::fs::read(&path).await.unwrap(), b"owned");
    }

    #[tokio::test]
    async fn test_store_resume_writes_file_under_upload_dir() {
        let dir = tempfile::tempdir().unwrap();
        let upload_dir = dir.path().to_string_lossy().into_owned();

        let path = store_resume(&upload_dir, "ada@example.com", ".txt", b"resume body")
            .await
            .unwrap();

        assert!(path.starts_with(&upload_dir));
        assert!(path.ends_with(".txt"));
        assert!(path.contains("ada@example.com_"));
        assert_eq!(tokio::fs::read(&path).await.unwrap(), b"resume body");
    }
}
