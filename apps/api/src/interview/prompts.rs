//! Prompt construction for the interview question source.
//!
//! Pure functions: résumé/JD pair (plus accumulated conversation context) in,
//! prompt text out. No I/O, no LLM types.

use crate::interview::models::{InterviewSession, JobDescriptionData, ResumeData};

/// Literal the model writes instead of a question to end the interview.
pub const END_SENTINEL: &str = "END_INTERVIEW";

/// Initial-questions prompt. Placeholders are filled by `build_initial_prompt`.
const INITIAL_PROMPT_TEMPLATE: &str = r#"You are an experienced technical interviewer. Generate exactly 3 relevant interview questions.

CANDIDATE PROFILE:
Name: {candidate_name}
Primary Skills: {primary_skills}
Domain Experience: {domain_expertise}

JOB REQUIREMENTS:
Company: {company}
Required Skills: {required_skills}
Experience: {min_years}+ years
Key Responsibility: {key_responsibility}

ANALYSIS:
Matching Skills: {matching_skills}
Skills to Assess: {missing_skills}

Generate 3 questions that:
1. Start with skills the candidate HAS (if any match)
2. Assess learning ability for new required skills
3. Test problem-solving and experience level

Format each question on a new line starting with "Q:"
Example:
Q: Tell me about your experience with [matching skill] and how you've applied it in projects.
Q: This role requires [new skill]. How would you approach learning this technology?
Q: Describe a challenging technical problem you solved and your approach.

Generate the questions now:"#;

/// Follow-up prompt. Placeholders are filled by `build_followup_prompt`.
const FOLLOWUP_PROMPT_TEMPLATE: &str = r#"You are conducting a technical interview. Based on the candidate's answer, decide if you need a follow-up question.

JOB REQUIREMENTS: {top_skills}

CONVERSATION SO FAR:
{context}

CURRENT QUESTION: {current_question}

CANDIDATE'S ANSWER: {answer}

INSTRUCTIONS:
- If the answer is too brief or vague, ask for more details or examples
- If the answer shows good knowledge, probe deeper into technical details
- If the answer reveals gaps, ask about related fundamentals
- If you've asked enough questions (5+), say "END_INTERVIEW"
- Keep questions relevant to the job requirements

Decision: Generate ONE follow-up question OR write "END_INTERVIEW"

Follow-up question:"#;

/// Candidate skills vs required skills, compared case-insensitively with
/// whitespace trimmed. Order follows first appearance in the inputs.
#[derive(Debug, Clone, PartialEq)]
pub struct SkillAnalysis {
    pub matching: Vec<String>,
    pub missing: Vec<String>,
}

pub fn analyze_skills(resume: &ResumeData, jd: &JobDescriptionData) -> SkillAnalysis {
    let candidate: Vec<String> = resume
        .primary_skills
        .iter()
        .chain(resume.secondary_skills.iter())
        .map(|s| s.trim().to_lowercase())
        .collect();

    let mut matching = Vec::new();
    let mut missing = Vec::new();
    for skill in &jd.skills.must_have {
        let normalized = skill.trim().to_lowercase();
        if normalized.is_empty() || matching.contains(&normalized) || missing.contains(&normalized)
        {
            continue;
        }
        if candidate.contains(&normalized) {
            matching.push(normalized);
        } else {
            missing.push(normalized);
        }
    }

    SkillAnalysis { matching, missing }
}

/// Renders the initial-questions prompt for a résumé/JD pair.
pub fn build_initial_prompt(resume: &ResumeData, jd: &JobDescriptionData) -> String {
    let analysis = analyze_skills(resume, jd);

    let matching = if analysis.matching.is_empty() {
        "None directly".to_string()
    } else {
        analysis.matching.join(", ")
    };
    let missing = if analysis.missing.is_empty() {
        "General technical ability".to_string()
    } else {
        analysis.missing[..analysis.missing.len().min(3)].join(", ")
    };
    let key_responsibility = jd
        .responsibilities
        .first()
        .map(String::as_str)
        .unwrap_or("Technical development");

    INITIAL_PROMPT_TEMPLATE
        .replace("{candidate_name}", &resume.candidate_name())
        .replace("{primary_skills}", &resume.primary_skills.join(", "))
        .replace("{domain_expertise}", &resume.domain_expertise.join(", "))
        .replace("{company}", &jd.company)
        .replace("{required_skills}", &jd.skills.must_have.join(", "))
        .replace("{min_years}", &jd.experience_required.min_years.to_string())
        .replace("{key_responsibility}", key_responsibility)
        .replace("{matching_skills}", &matching)
        .replace("{missing_skills}", &missing)
}

/// Renders the follow-up prompt: top 3 required skills, a condensed
/// transcript of the last exchanges, the current question and the answer.
pub fn build_followup_prompt(
    session: &InterviewSession,
    current_question: &str,
    answer: &str,
) -> String {
    let top_skills = session.jd_data.skills.must_have
        [..session.jd_data.skills.must_have.len().min(3)]
        .join(", ");

    FOLLOWUP_PROMPT_TEMPLATE
        .replace("{top_skills}", &top_skills)
        .replace("{context}", &conversation_context(session))
        .replace("{current_question}", current_question)
        .replace("{answer}", answer)
}

/// Condensed transcript of the last two exchanges, answers truncated to
/// 200 characters so long answers don't crowd out the instructions.
fn conversation_context(session: &InterviewSession) -> String {
    if session.question_responses.is_empty() {
        return "This is the first question.".to_string();
    }

    let recent = if session.question_responses.len() >= 2 {
        &session.question_responses[session.question_responses.len() - 2..]
    } else {
        &session.question_responses[..]
    };

    let mut parts = Vec::with_capacity(recent.len() * 2);
    for (i, qa) in recent.iter().enumerate() {
        parts.push(format!("Q{}: {}", i + 1, qa.question));
        parts.push(format!("A{}: {}...", i + 1, truncate_chars(&qa.answer, 200)));
    }
    parts.join("\n")
}

fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
