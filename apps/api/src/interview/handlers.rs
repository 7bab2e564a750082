//! Axum route handlers for the interview session API.

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::errors::AppError;
use crate::interview::models::{
    InterviewSession, JobDescriptionData, QuestionAnswer, ResumeData, SessionStatus,
};
use crate::interview::scoring::Assessment;
use crate::interview::session::{plan_next, NextStep, CLOSING_MESSAGE};
use crate::interview::source::QuestionSource;
use crate::state::AppState;

/// Asked when the question source comes back empty-handed; a session always
/// starts with at least one question.
const DEFAULT_OPENING: &str =
    "Tell me about your background and what interests you about this role.";

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct StartInterviewRequest {
    pub resume_data: ResumeData,
    pub jd_data: JobDescriptionData,
}

#[derive(Debug, Serialize)]
pub struct StartInterviewResponse {
    pub session_id: Uuid,
    pub first_question: String,
    pub total_initial_questions: usize,
}

#[derive(Debug, Deserialize)]
pub struct AnswerQuestionRequest {
    pub answer: String,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct AnswerQuestionResponse {
    pub next_question: String,
    pub is_interview_complete: bool,
    pub question_number: usize,
    pub session_status: SessionStatus,
}

#[derive(Debug, Serialize)]
pub struct SessionDetailResponse {
    pub session_id: Uuid,
    pub status: SessionStatus,
    pub total_questions: usize,
    pub created_at: DateTime<Utc>,
    pub candidate_name: String,
    pub company: String,
    pub question_responses: Vec<QuestionAnswer>,
}

#[derive(Debug, Serialize)]
pub struct SessionSummary {
    pub session_id: Uuid,
    pub candidate_name: String,
    pub company: String,
    pub status: SessionStatus,
    pub questions_count: usize,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct SessionListResponse {
    pub sessions: Vec<SessionSummary>,
}

// ────────────────────────────────────────────────────────────────────────────
// Core operations (handler-independent, tested without HTTP)
// ────────────────────────────────────────────────────────────────────────────

/// Creates a session from a résumé/JD pair and stores it.
pub async fn create_session(
    state: &AppState,
    resume_data: ResumeData,
    jd_data: JobDescriptionData,
) -> StartInterviewResponse {
    let mut initial = state
        .questions
        .initial_questions(&resume_data, &jd_data)
        .await;
    if initial.is_empty() {
        initial.push(DEFAULT_OPENING.to_string());
    }

    let session = InterviewSession::new(resume_data, jd_data, initial);
    let response = StartInterviewResponse {
        session_id: session.session_id,
        first_question: session.questions[0].clone(),
        total_initial_questions: session.questions.len(),
    };
    state.sessions.insert(session).await;
    response
}

/// Records an answer and advances the state machine.
///
/// The pure decision comes from `plan_next`; only the `GenerateFollowup`
/// branch touches the question source, and a `None` (or any internally
/// swallowed provider failure) from it completes the interview instead of
/// erroring. Rejects sessions that are not active without mutating them.
pub async fn submit_answer(
    source: &dyn QuestionSource,
    session: &mut InterviewSession,
    answer: String,
) -> Result<AnswerQuestionResponse, AppError> {
    if session.status != SessionStatus::Active {
        return Err(AppError::InvalidState(format!(
            "Interview session is {}, not active",
            session.status.as_str()
        )));
    }

    let current_question = session.current_question().to_string();
    session.record_answer(answer.clone());

    let next_question = match plan_next(
        session.question_responses.len(),
        session.current_question_index,
        session.questions.len(),
    ) {
        NextStep::Complete => {
            session.status = SessionStatus::Completed;
            CLOSING_MESSAGE.to_string()
        }
        NextStep::AskPregenerated => {
            session.current_question_index += 1;
            session.current_question().to_string()
        }
        NextStep::GenerateFollowup => {
            match source
                .followup_question(session, &current_question, &answer)
                .await
            {
                Some(followup) => {
                    session.push_followup(followup.clone());
                    followup
                }
                None => {
                    session.status = SessionStatus::Completed;
                    CLOSING_MESSAGE.to_string()
                }
            }
        }
    };

    Ok(AnswerQuestionResponse {
        next_question,
        is_interview_complete: session.status == SessionStatus::Completed,
        question_number: session.question_responses.len(),
        session_status: session.status,
    })
}

/// Manual override: force a session to `ended`. Idempotent; a second call
/// sees `ended` and performs no further mutation.
pub fn end_session(session: &mut InterviewSession) {
    if session.status != SessionStatus::Ended {
        session.status = SessionStatus::Ended;
    }
}

/// Scores the transcript recorded so far. Works on any session status but
/// requires at least one recorded answer; does not mutate the session.
pub async fn score_session(
    source: &dyn QuestionSource,
    session: &InterviewSession,
) -> Result<Assessment, AppError> {
    if session.question_responses.is_empty() {
        return Err(AppError::Validation(
            "No answers recorded yet; submit at least one answer before scoring".to_string(),
        ));
    }
    Ok(source.assess(session).await)
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/interviews
///
/// Starts a session: generates initial questions from the résumé/JD pair and
/// returns the first question.
pub async fn handle_start_interview(
    State(state): State<AppState>,
    Json(request): Json<StartInterviewRequest>,
) -> Result<Json<StartInterviewResponse>, AppError> {
    let response = create_session(&state, request.resume_data, request.jd_data).await;
    Ok(Json(response))
}

/// POST /api/v1/interviews/:session_id/answer
///
/// Records the answer against the current question and returns the next one
/// (or the closing message when the interview completes). Empty answers are
/// recorded as given; the brevity heuristics ask for elaboration.
pub async fn handle_answer_question(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<AnswerQuestionRequest>,
) -> Result<Json<AnswerQuestionResponse>, AppError> {
    let handle = state
        .sessions
        .get(session_id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Interview session {session_id} not found")))?;

    // Hold the session lock across the whole operation, including the
    // follow-up LLM call, so concurrent submits cannot interleave.
    let mut session = handle.lock().await;
    let response = submit_answer(state.questions.as_ref(), &mut session, request.answer).await?;
    Ok(Json(response))
}

/// GET /api/v1/interviews/:session_id
///
/// Full session history.
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<SessionDetailResponse>, AppError> {
    let handle = state
        .sessions
        .get(session_id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Interview session {session_id} not found")))?;
    let session = handle.lock().await;

    Ok(Json(SessionDetailResponse {
        session_id: session.session_id,
        status: session.status,
        total_questions: session.question_responses.len(),
        created_at: session.created_at,
        candidate_name: session.resume_data.candidate_name(),
        company: session.jd_data.company.clone(),
        question_responses: session.question_responses.clone(),
    }))
}

/// GET /api/v1/interviews
///
/// Summary of every live session.
pub async fn handle_list_sessions(
    State(state): State<AppState>,
) -> Result<Json<SessionListResponse>, AppError> {
    let handles = state.sessions.list().await;
    let mut sessions = Vec::with_capacity(handles.len());
    for handle in handles {
        let session = handle.lock().await;
        sessions.push(SessionSummary {
            session_id: session.session_id,
            candidate_name: session.resume_data.candidate_name(),
            company: session.jd_data.company.clone(),
            status: session.status,
            questions_count: session.question_responses.len(),
            created_at: session.created_at,
        });
    }
    Ok(Json(SessionListResponse { sessions }))
}

/// POST /api/v1/interviews/:session_id/score
///
/// Assessment report for the transcript recorded so far: skills match,
/// communication, overall fit, recommendation, and improvement areas.
pub async fn handle_score_interview(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<Assessment>, AppError> {
    let handle = state
        .sessions
        .get(session_id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Interview session {session_id} not found")))?;

    let session = handle.lock().await;
    let assessment = score_session(state.questions.as_ref(), &session).await?;
    Ok(Json(assessment))
}

/// POST /api/v1/interviews/:session_id/end
///
/// Manual end. Safe to call twice.
pub async fn handle_end_interview(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let handle = state
        .sessions
        .get(session_id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Interview session {session_id} not found")))?;

    let mut session = handle.lock().await;
    end_session(&mut session);

    Ok(Json(json!({
        "message": "Interview ended successfully",
        "session_id": session_id,
        "status": session.status,
    })))
}

/// GET /api/v1/model
///
/// Diagnostics for the active question source. Informational only.
pub async fn handle_model_info(State(state): State<AppState>) -> Json<Value> {
    Json(serde_json::to_value(state.questions.model_info()).unwrap_or_else(|_| json!({})))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interview::models::fixtures;
    use crate::interview::session::QUESTION_CAP;
    use crate::interview::source::RuleBasedQuestionSource;

    const LONG_ANSWER: &str = "Over the past three years I have designed, shipped, and \
        operated several customer facing services, owning capacity planning and incident \
        response for each of them across two regions.";

    fn active_session(questions: Vec<&str>) -> InterviewSession {
        InterviewSession::new(
            fixtures::resume(),
            fixtures::jd(),
            questions.into_iter().map(str::to_string).collect(),
        )
    }

    #[tokio::test]
    async fn test_submit_answer_advances_to_pregenerated_question() {
        let source = RuleBasedQuestionSource;
        let mut session = active_session(vec!["Q1?", "Q2?"]);

        let response = submit_answer(&source, &mut session, "an answer".to_string())
            .await
            .unwrap();

        assert_eq!(response.next_question, "Q2?");
        assert!(!response.is_interview_complete);
        assert_eq!(response.question_number, 1);
        assert_eq!(response.session_status, SessionStatus::Active);
        assert_eq!(session.current_question(), "Q2?");
    }

    #[tokio::test]
    async fn test_submit_answer_generates_followup_when_pregenerated_spent() {
        let source = RuleBasedQuestionSource;
        let mut session = active_session(vec!["Q1?"]);

        // Short answer: rule-based source always asks for elaboration.
        let response = submit_answer(&source, &mut session, "yes".to_string())
            .await
            .unwrap();

        assert!(!response.is_interview_complete);
        assert_eq!(
            response.next_question,
            "Can you provide more details or give a specific example?"
        );
        assert_eq!(session.questions.len(), 2);
        assert_eq!(session.current_question(), response.next_question.as_str());
    }

    #[tokio::test]
    async fn test_empty_answer_recorded_and_asks_for_elaboration() {
        let source = RuleBasedQuestionSource;
        let mut session = active_session(vec!["Q1?"]);

        let response = submit_answer(&source, &mut session, String::new())
            .await
            .unwrap();

        assert_eq!(session.question_responses.len(), 1);
        assert_eq!(session.question_responses[0].answer, "");
        assert_eq!(
            response.next_question,
            "Can you provide more details or give a specific example?"
        );
        assert!(!response.is_interview_complete);
    }

    #[tokio::test]
    async fn test_fifth_answer_always_completes() {
        let source = RuleBasedQuestionSource;
        // Plenty of pre-generated questions left; the cap still wins.
        let mut session = active_session(vec!["Q1?", "Q2?", "Q3?", "Q4?", "Q5?", "Q6?", "Q7?"]);

        let mut last = None;
        for _ in 0..QUESTION_CAP {
            last = Some(
                submit_answer(&source, &mut session, LONG_ANSWER.to_string())
                    .await
                    .unwrap(),
            );
        }

        let last = last.unwrap();
        assert!(last.is_interview_complete);
        assert_eq!(last.session_status, SessionStatus::Completed);
        assert_eq!(last.next_question, CLOSING_MESSAGE);
        assert_eq!(session.question_responses.len(), QUESTION_CAP);
    }

    #[tokio::test]
    async fn test_source_termination_completes_gracefully() {
        let source = RuleBasedQuestionSource;
        let mut jd = fixtures::jd();
        jd.skills.must_have = vec!["Python".to_string()];
        let mut session = InterviewSession::new(
            fixtures::resume(),
            jd,
            vec!["Tell me about Python?".to_string()],
        );

        // Long answer covering the only required skill: no heuristic fires,
        // no uncovered skill remains, so the source returns None.
        let answer = format!("{LONG_ANSWER} Most of that work was Python end to end.");
        let response = submit_answer(&source, &mut session, answer).await.unwrap();

        assert!(response.is_interview_complete);
        assert_eq!(response.next_question, CLOSING_MESSAGE);
        assert_eq!(session.status, SessionStatus::Completed);
    }

    #[tokio::test]
    async fn test_submit_answer_rejected_on_completed_session_without_mutation() {
        let source = RuleBasedQuestionSource;
        let mut session = active_session(vec!["Q1?"]);
        session.status = SessionStatus::Completed;

        let result = submit_answer(&source, &mut session, "late answer".to_string()).await;

        assert!(matches!(result, Err(AppError::InvalidState(_))));
        assert!(session.question_responses.is_empty());
    }

    #[tokio::test]
    async fn test_submit_answer_rejected_on_ended_session() {
        let source = RuleBasedQuestionSource;
        let mut session = active_session(vec!["Q1?"]);
        session.status = SessionStatus::Ended;

        let result = submit_answer(&source, &mut session, "late answer".to_string()).await;
        assert!(matches!(result, Err(AppError::InvalidState(_))));
    }

    #[tokio::test]
    async fn test_score_session_requires_a_recorded_answer() {
        let source = RuleBasedQuestionSource;
        let session = active_session(vec!["Q1?"]);

        let result = score_session(&source, &session).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_score_session_returns_assessment_without_mutation() {
        let source = RuleBasedQuestionSource;
        let mut session = active_session(vec!["Tell me about Python?"]);
        session.record_answer(
            "I have built Python services with PostgreSQL backends for years".to_string(),
        );
        session.status = SessionStatus::Completed;
        let snapshot = session.question_responses.len();

        let assessment = score_session(&source, &session).await.unwrap();

        assert!((0.0..=1.0).contains(&assessment.job_fit_score));
        assert!(assessment.technical_skills_match > 0.0);
        assert!(!assessment.recommendation.is_empty());
        assert_eq!(session.question_responses.len(), snapshot);
        assert_eq!(session.status, SessionStatus::Completed);
    }

    #[test]
    fn test_end_session_is_idempotent() {
        let mut session = active_session(vec!["Q1?"]);
        end_session(&mut session);
        assert_eq!(session.status, SessionStatus::Ended);

        let snapshot = session.question_responses.len();
        end_session(&mut session);
        assert_eq!(session.status, SessionStatus::Ended);
        assert_eq!(session.question_responses.len(), snapshot);
    }

    #[test]
    fn test_end_session_overrides_completed() {
        let mut session = active_session(vec!["Q1?"]);
        session.status = SessionStatus::Completed;
        end_session(&mut session);
        assert_eq!(session.status, SessionStatus::Ended);
    }
}
