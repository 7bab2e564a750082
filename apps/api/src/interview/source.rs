//! Question source — pluggable, trait-based generator of interview questions.
//!
//! Two backends: `LlmQuestionSource` (Claude via `llm_client`) and
//! `RuleBasedQuestionSource` (deterministic, no network). The concrete
//! backend is selected once at startup and carried in `AppState` as
//! `Arc<dyn QuestionSource>`.
//!
//! Neither backend fails outward. Provider errors during initial generation
//! substitute a fixed question template; during follow-up generation they
//! map to "no further question", which the state machine treats as graceful
//! completion.

use async_trait::async_trait;
use serde::Serialize;
use tracing::warn;

use crate::interview::models::{InterviewSession, JobDescriptionData, ResumeData};
use crate::interview::parser::{extract_followup, extract_questions};
use crate::interview::prompts::{analyze_skills, build_followup_prompt, build_initial_prompt};
use crate::interview::scoring::{build_assessment_prompt, rule_based_assessment, Assessment};
use crate::llm_client::{CallParams, LlmClient, MODEL};

/// Sampling for the initial batch: cooler and roomier.
const INITIAL_PARAMS: CallParams = CallParams {
    max_tokens: 800,
    temperature: 0.7,
};

/// Sampling for a single follow-up: warmer, short reply expected.
const FOLLOWUP_PARAMS: CallParams = CallParams {
    max_tokens: 300,
    temperature: 0.8,
};

/// Sampling for transcript assessment: cool, structured JSON expected.
const ASSESS_PARAMS: CallParams = CallParams {
    max_tokens: 1024,
    temperature: 0.3,
};

/// Follow-up heuristics stop producing once this many answers are recorded.
const RULE_FOLLOWUP_LIMIT: usize = 5;

/// Diagnostics about the active question source. Informational only; has no
/// effect on session behavior.
#[derive(Debug, Clone, Serialize)]
pub struct ModelInfo {
    pub model_name: String,
    pub status: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub capabilities: Vec<String>,
}

#[async_trait]
pub trait QuestionSource: Send + Sync {
    /// Returns 1–4 opening questions for a résumé/JD pair. Never fails.
    async fn initial_questions(&self, resume: &ResumeData, jd: &JobDescriptionData)
        -> Vec<String>;

    /// Returns the next follow-up question, or `None` to end the interview.
    async fn followup_question(
        &self,
        session: &InterviewSession,
        current_question: &str,
        answer: &str,
    ) -> Option<String>;

    /// Scores the recorded transcript. Never fails; provider errors fall
    /// back to the deterministic assessment.
    async fn assess(&self, session: &InterviewSession) -> Assessment;

    fn model_info(&self) -> ModelInfo;
}

// ────────────────────────────────────────────────────────────────────────────
// LLM-backed source
// ────────────────────────────────────────────────────────────────────────────

pub struct LlmQuestionSource {
    llm: LlmClient,
}

impl LlmQuestionSource {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl QuestionSource for LlmQuestionSource {
    async fn initial_questions(
        &self,
        resume: &ResumeData,
        jd: &JobDescriptionData,
    ) -> Vec<String> {
        let prompt = build_initial_prompt(resume, jd);

        let mut questions = match self.llm.complete(&prompt, INITIAL_PARAMS).await {
            Ok(text) => extract_questions(&text),
            Err(e) => {
                warn!("Initial question generation failed, using template: {e}");
                return template_questions(jd);
            }
        };

        // Top up from the template if the model produced too few.
        if questions.len() < 3 {
            questions.extend(template_questions(jd));
        }
        questions.truncate(4);
        questions
    }

    async fn followup_question(
        &self,
        session: &InterviewSession,
        current_question: &str,
        answer: &str,
    ) -> Option<String> {
        let prompt = build_followup_prompt(session, current_question, answer);

        match self.llm.complete(&prompt, FOLLOWUP_PARAMS).await {
            Ok(text) => extract_followup(&text),
            Err(e) => {
                warn!("Follow-up generation failed, ending interview: {e}");
                None
            }
        }
    }

    async fn assess(&self, session: &InterviewSession) -> Assessment {
        let prompt = build_assessment_prompt(session);

        match self.llm.complete_json::<Assessment>(&prompt, ASSESS_PARAMS).await {
            Ok(assessment) => assessment,
            Err(e) => {
                warn!("Transcript assessment failed, using rule-based scoring: {e}");
                rule_based_assessment(session)
            }
        }
    }

    fn model_info(&self) -> ModelInfo {
        ModelInfo {
            model_name: MODEL.to_string(),
            status: "connected".to_string(),
            kind: "anthropic_claude".to_string(),
            capabilities: vec![
                "initial_questions".to_string(),
                "followup_questions".to_string(),
                "transcript_assessment".to_string(),
            ],
        }
    }
}

/// Fixed question template used when the model call or parsing fails.
/// Parameterized by the job's first required skill and company name.
fn template_questions(jd: &JobDescriptionData) -> Vec<String> {
    let first_skill = jd
        .skills
        .must_have
        .first()
        .map(String::as_str)
        .unwrap_or("the required technologies");

    vec![
        format!(
            "Can you tell me about your experience with {first_skill} \
             and how you've used it in your projects?"
        ),
        format!("How do you typically approach learning new technologies like {first_skill}?"),
        "Can you describe a challenging technical problem you've solved recently \
         and walk me through your solution?"
            .to_string(),
        format!(
            "What interests you most about this role at {}, and how do you see \
             yourself contributing to the team?",
            jd.company
        ),
    ]
}

// ────────────────────────────────────────────────────────────────────────────
// Rule-based fallback source
// ────────────────────────────────────────────────────────────────────────────

/// Deterministic question source. No network calls; used when no API key is
/// configured.
pub struct RuleBasedQuestionSource;

const LEARNING_KEYWORDS: &[&str] = &["learn", "study", "research"];
const DIFFICULTY_KEYWORDS: &[&str] = &["problem", "challenge", "issue", "difficult"];

#[async_trait]
impl QuestionSource for RuleBasedQuestionSource {
    async fn initial_questions(
        &self,
        resume: &ResumeData,
        jd: &JobDescriptionData,
    ) -> Vec<String> {
        let analysis = analyze_skills(resume, jd);
        let mut questions = Vec::with_capacity(4);

        // 1. A skill the candidate has, or their domain background.
        if let Some(skill) = analysis.matching.first() {
            questions.push(format!(
                "I see you have experience with {skill}. Can you tell me about a \
                 specific project where you used it effectively?"
            ));
        } else {
            let domain = resume
                .domain_expertise
                .first()
                .map(String::as_str)
                .unwrap_or("your field");
            questions.push(format!(
                "Can you tell me about your background in {domain} and how it \
                 relates to this role?"
            ));
        }

        // 2. A required skill they lack, or staying current.
        if let Some(skill) = analysis.missing.first() {
            questions.push(format!(
                "This role requires {skill}, which wasn't in your background. \
                 How do you typically approach learning new technologies?"
            ));
        } else {
            questions.push(
                "How do you stay updated with the latest technologies in your field?".to_string(),
            );
        }

        // 3. Problem solving.
        questions.push(
            "Can you describe a challenging technical problem you've encountered \
             recently and walk me through how you solved it?"
                .to_string(),
        );

        // 4. Role specific.
        if let Some(responsibility) = jd.responsibilities.first() {
            let snippet: String = responsibility.chars().take(100).collect();
            questions.push(format!(
                "One of the key responsibilities is '{snippet}'. How would you \
                 approach it?"
            ));
        } else {
            questions.push(format!(
                "What interests you most about working at {} in this role?",
                jd.company
            ));
        }

        questions
    }

    async fn followup_question(
        &self,
        session: &InterviewSession,
        current_question: &str,
        answer: &str,
    ) -> Option<String> {
        let answer_lower = answer.to_lowercase();
        let word_count = answer.split_whitespace().count();

        // Brevity probe wins over everything else.
        if word_count < 15 {
            return Some("Can you provide more details or give a specific example?".to_string());
        }

        if answer_lower.contains("project") && !current_question.to_lowercase().contains("role") {
            return Some(
                "What was your specific role in that project and what challenges did you face?"
                    .to_string(),
            );
        }

        if LEARNING_KEYWORDS.iter().any(|kw| answer_lower.contains(kw)) {
            return Some(
                "How long did it take you to become proficient, and what resources \
                 did you find most helpful?"
                    .to_string(),
            );
        }

        if DIFFICULTY_KEYWORDS
            .iter()
            .any(|kw| answer_lower.contains(kw))
        {
            return Some(
                "What would you do differently if you faced a similar situation again?"
                    .to_string(),
            );
        }

        if session.question_responses.len() >= RULE_FOLLOWUP_LIMIT {
            return None;
        }

        // Pick the first required skill not yet touched by any prior
        // question or answer.
        let uncovered = session.jd_data.skills.must_have.iter().find(|skill| {
            let needle = skill.to_lowercase();
            !session.question_responses.iter().any(|qa| {
                qa.question.to_lowercase().contains(&needle)
                    || qa.answer.to_lowercase().contains(&needle)
            })
        });

        uncovered.map(|skill| format!("Tell me about your experience or thoughts on {skill}?"))
    }

    async fn assess(&self, session: &InterviewSession) -> Assessment {
        rule_based_assessment(session)
    }

    fn model_info(&self) -> ModelInfo {
        ModelInfo {
            model_name: "fallback".to_string(),
            status: "active".to_string(),
            kind: "rule_based".to_string(),
            capabilities: vec![
                "basic_questions".to_string(),
                "simple_followups".to_string(),
                "rule_based_assessment".to_string(),
            ],
        }
    }
}
