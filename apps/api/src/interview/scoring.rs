//! Post-interview assessment — scores the recorded transcript against the
//! job requirements.
//!
//! The LLM path asks for the full report in one call; the deterministic
//! fallback computes it from skill coverage and answer length, so scoring
//! works (and degrades) the same way question generation does.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::interview::models::InterviewSession;

/// Assessment of a completed (or in-progress) interview transcript.
/// Fractional scores are on a 0–1 scale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assessment {
    pub technical_skills_match: f32,
    pub relevant_experience: String,
    pub communication_score: f32,
    pub strengths: Vec<String>,
    pub areas_of_improvement: Vec<String>,
    pub job_fit_score: f32,
    pub recommendation: String,
    #[serde(default)]
    pub detailed_feedback: serde_json::Value,
}

/// Assessment prompt. Placeholders are filled by `build_assessment_prompt`;
/// the braces in the schema block are literal.
const ASSESSMENT_PROMPT_TEMPLATE: &str = r#"You are a strict but fair technical interviewer and grader. Score only what is in the answers. Do not invent facts. Be concise.

CANDIDATE: {candidate_name}
PRIMARY SKILLS: {primary_skills}

JOB REQUIREMENTS:
Company: {company}
Required Skills: {required_skills}
Experience: {min_years}+ years

INTERVIEW TRANSCRIPT:
{transcript}

Rubric:
- technical_skills_match: fraction (0-1) of required skills convincingly demonstrated in the answers
- communication_score: clarity and structure of the answers (0-1)
- job_fit_score: overall fit, calibrated to the required experience level (0-1)
- recommendation: one of "strong_hire", "hire", "borderline", "no_hire"
- areas_of_improvement: at most 3 short bullets

Return strict JSON:
{
  "technical_skills_match": number,
  "relevant_experience": "string",
  "communication_score": number,
  "strengths": ["string"],
  "areas_of_improvement": ["string"],
  "job_fit_score": number,
  "recommendation": "string",
  "detailed_feedback": {}
}"#;

/// Renders the assessment prompt for a session's recorded transcript.
pub fn build_assessment_prompt(session: &InterviewSession) -> String {
    let transcript = session
        .question_responses
        .iter()
        .enumerate()
        .map(|(i, qa)| format!("Q{}: {}\nA{}: {}", i + 1, qa.question, i + 1, qa.answer))
        .collect::<Vec<_>>()
        .join("\n\n");

    ASSESSMENT_PROMPT_TEMPLATE
        .replace("{candidate_name}", &session.resume_data.candidate_name())
        .replace(
            "{primary_skills}",
            &session.resume_data.primary_skills.join(", "),
        )
        .replace("{company}", &session.jd_data.company)
        .replace(
            "{required_skills}",
            &session.jd_data.skills.must_have.join(", "),
        )
        .replace(
            "{min_years}",
            &session.jd_data.experience_required.min_years.to_string(),
        )
        .replace("{transcript}", &transcript)
}

/// Deterministic assessment from the transcript alone. Skill match is the
/// fraction of required skills mentioned in any answer; communication comes
/// from average answer length; fit weights the two 60/40.
pub fn rule_based_assessment(session: &InterviewSession) -> Assessment {
    let answers: Vec<&str> = session
        .question_responses
        .iter()
        .map(|qa| qa.answer.as_str())
        .collect();
    let total_words: usize = answers.iter().map(|a| a.split_whitespace().count()).sum();
    let avg_words = if answers.is_empty() {
        0
    } else {
        total_words / answers.len()
    };

    let mut covered = Vec::new();
    let mut missing = Vec::new();
    for skill in &session.jd_data.skills.must_have {
        let needle = skill.trim().to_lowercase();
        if needle.is_empty() {
            continue;
        }
        if answers.iter().any(|a| a.to_lowercase().contains(&needle)) {
            covered.push(skill.clone());
        } else {
            missing.push(skill.clone());
        }
    }

    let required = covered.len() + missing.len();
    let technical_skills_match = if required == 0 {
        0.5
    } else {
        covered.len() as f32 / required as f32
    };

    let communication_score = match avg_words {
        0..=4 => 0.2,
        5..=14 => 0.4,
        15..=29 => 0.6,
        30..=59 => 0.8,
        _ => 0.9,
    };

    let job_fit_score = technical_skills_match * 0.6 + communication_score * 0.4;

    let recommendation = if job_fit_score >= 0.75 {
        "hire"
    } else if job_fit_score >= 0.5 {
        "borderline"
    } else {
        "no_hire"
    };

    let strengths: Vec<String> = covered
        .iter()
        .map(|s| format!("Spoke to the required skill {s} in their answers"))
        .collect();

    let mut areas_of_improvement: Vec<String> = missing
        .iter()
        .take(3)
        .map(|s| format!("Give concrete examples of work with {s}"))
        .collect();
    if avg_words < 15 {
        areas_of_improvement
            .push("Expand answers with specific examples and outcomes".to_string());
    }

    let relevant_experience = format!(
        "Addressed {} of {} required skills across {} answers",
        covered.len(),
        required,
        answers.len()
    );

    Assessment {
        technical_skills_match,
        relevant_experience,
        communication_score,
        strengths,
        areas_of_improvement,
        job_fit_score,
        recommendation: recommendation.to_string(),
        detailed_feedback: json!({
            "answers_scored": answers.len(),
            "average_answer_words": avg_words,
            "skills_covered": covered,
            "skills_missing": missing,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interview::models::fixtures;

    fn session_with_answers(answers: &[&str]) -> InterviewSession {
        let mut session = InterviewSession::new(
            fixtures::resume(),
            fixtures::jd(),
            vec!["Opening question?".to_string()],
        );
        for answer in answers {
            session.record_answer(answer.to_string());
        }
        session
    }

    #[test]
    fn test_rule_based_assessment_counts_covered_skills() {
        let session = session_with_answers(&[
            "I have run Python services on Kubernetes for several years, \
             owning the deploys and rollbacks across two clusters.",
        ]);

        let assessment = rule_based_assessment(&session);
        assert!((assessment.technical_skills_match - 2.0 / 3.0).abs() < 0.01);
        assert_eq!(assessment.strengths.len(), 2);
        assert!(assessment
            .areas_of_improvement
            .iter()
            .any(|tip| tip.contains("PostgreSQL")));
    }

    #[test]
    fn test_rule_based_assessment_short_answers_flag_brevity() {
        let session = session_with_answers(&["yes", "no"]);

        let assessment = rule_based_assessment(&session);
        assert!(assessment.communication_score <= 0.2);
        assert_eq!(assessment.recommendation, "no_hire");
        assert!(assessment
            .areas_of_improvement
            .iter()
            .any(|tip| tip.contains("Expand answers")));
    }

    #[test]
    fn test_rule_based_assessment_full_coverage_recommends_hire() {
        let session = session_with_answers(&[
            "I built Python data pipelines feeding PostgreSQL and deployed every \
             service onto Kubernetes, owning schema migrations, capacity planning, \
             and the incident response rotation for the whole platform over three \
             years of continuous production operation.",
        ]);

        let assessment = rule_based_assessment(&session);
        assert!((assessment.technical_skills_match - 1.0).abs() < f32::EPSILON);
        assert!(assessment.job_fit_score >= 0.75);
        assert_eq!(assessment.recommendation, "hire");
        assert!(assessment.areas_of_improvement.is_empty());
    }

    #[test]
    fn test_rule_based_assessment_scores_bounded() {
        for answers in [&[][..], &["short"][..], &["a b c d e f g h i j k l m n o p"][..]] {
            let assessment = rule_based_assessment(&session_with_answers(answers));
            for score in [
                assessment.technical_skills_match,
                assessment.communication_score,
                assessment.job_fit_score,
            ] {
                assert!((0.0..=1.0).contains(&score));
            }
        }
    }

    #[test]
    fn test_assessment_prompt_embeds_transcript_and_requirements() {
        let session = session_with_answers(&["I mostly worked on billing systems."]);
        let prompt = build_assessment_prompt(&session);

        assert!(prompt.contains("Ada Lovelace"));
        assert!(prompt.contains("Acme Corp"));
        assert!(prompt.contains("Python, Kubernetes, PostgreSQL"));
        assert!(prompt.contains("Q1: Opening question?"));
        assert!(prompt.contains("A1: I mostly worked on billing systems."));
        assert!(!prompt.contains("{transcript}"));
    }

    #[test]
    fn test_assessment_deserializes_without_detailed_feedback() {
        let json = r#"{
            "technical_skills_match": 0.7,
            "relevant_experience": "solid backend background",
            "communication_score": 0.8,
            "strengths": ["clear explanations"],
            "areas_of_improvement": ["more depth on Kubernetes"],
            "job_fit_score": 0.72,
            "recommendation": "borderline"
        }"#;
        let assessment: Assessment = serde_json::from_str(json).unwrap();
        assert_eq!(assessment.recommendation, "borderline");
        assert!(assessment.detailed_feedback.is_null());
    }
}
