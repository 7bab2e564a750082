//! Value objects and the session aggregate for the interview core.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Candidate identity and skills, parsed from a résumé.
/// Immutable once a session has been created from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResumeData {
    pub candidate_first_name: String,
    pub candidate_last_name: String,
    pub primary_skills: Vec<String>,
    pub secondary_skills: Vec<String>,
    pub domain_expertise: Vec<String>,
}

impl ResumeData {
    pub fn candidate_name(&self) -> String {
        format!("{} {}", self.candidate_first_name, self.candidate_last_name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillsData {
    pub must_have: Vec<String>,
    #[serde(default)]
    pub nice_to_have: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperienceRequired {
    pub min_years: u32,
    #[serde(default)]
    pub max_years: Option<u32>,
}

/// The job side of a session. Immutable per session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobDescriptionData {
    pub company: String,
    pub skills: SkillsData,
    pub experience_required: ExperienceRequired,
    pub responsibilities: Vec<String>,
}

/// One asked question with the candidate's raw answer.
/// Created exactly once per exchange and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionAnswer {
    pub question: String,
    pub answer: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Active,
    Completed,
    Ended,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Active => "active",
            SessionStatus::Completed => "completed",
            SessionStatus::Ended => "ended",
        }
    }
}

/// The aggregate root for one interview run.
///
/// Invariants while `status == Active`:
/// - `0 <= current_question_index < questions.len()`
/// - `question_responses.len() <= questions.len()`
/// - `questions` is append-only
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewSession {
    pub session_id: Uuid,
    pub resume_data: ResumeData,
    pub jd_data: JobDescriptionData,
    pub questions: Vec<String>,
    pub current_question_index: usize,
    pub question_responses: Vec<QuestionAnswer>,
    pub status: SessionStatus,
    pub created_at: DateTime<Utc>,
}

impl InterviewSession {
    /// Creates an active session positioned at the first question.
    /// `initial_questions` must be non-empty; the question source guarantees
    /// at least one question.
    pub fn new(
        resume_data: ResumeData,
        jd_data: JobDescriptionData,
        initial_questions: Vec<String>,
    ) -> Self {
        debug_assert!(!initial_questions.is_empty());
        Self {
            session_id: Uuid::new_v4(),
            resume_data,
            jd_data,
            questions: initial_questions,
            current_question_index: 0,
            question_responses: Vec::new(),
            status: SessionStatus::Active,
            created_at: Utc::now(),
        }
    }

    pub fn current_question(&self) -> &str {
        &self.questions[self.current_question_index]
    }

    /// Appends the answer against the currently asked question.
    pub fn record_answer(&mut self, answer: String) {
        let question = self.current_question().to_string();
        self.question_responses.push(QuestionAnswer {
            question,
            answer,
            timestamp: Utc::now(),
        });
    }

    /// Appends a follow-up question and moves the cursor onto it.
    pub fn push_followup(&mut self, question: String) {
        self.questions.push(question);
        self.current_question_index = self.questions.len() - 1;
    }
}
