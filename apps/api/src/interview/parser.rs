//! Response parser — turns unstructured model output into question lists.
//!
//! Everything here is case-insensitive substring/prefix matching, not
//! language understanding. A reply that front-loads filler before the first
//! question-like line can drop valid questions; that is an accepted
//! limitation of the heuristic.

use crate::interview::prompts::END_SENTINEL;

/// At most this many questions are ever returned from one model reply.
const MAX_QUESTIONS: usize = 4;

/// A line qualifies as a question if it starts with one of these.
const LINE_OPENERS: &[&str] = &[
    "what", "how", "can you", "tell me", "describe", "explain", "why",
];

/// Keywords that mark a sentence as question-like in the fallback pass.
const SENTENCE_KEYWORDS: &[&str] = &["what", "how", "can you", "tell me", "describe"];

/// Keywords accepted in a follow-up that lacks a trailing `?`.
const FOLLOWUP_KEYWORDS: &[&str] = &["what", "how", "can", "tell", "describe", "explain"];

/// Prefixes the model tends to put in front of a follow-up question.
const FOLLOWUP_PREFIXES: &[&str] = &[
    "Follow-up question:",
    "Question:",
    "Next question:",
    "I would ask:",
    "My follow-up would be:",
];

/// Extracts up to 4 well-formed questions from free-form model output,
/// preserving encounter order.
///
/// First pass: line by line, stripping a leading `Q:` marker and keeping
/// lines that contain `?`, open with an interrogative, or mention
/// "experience" / "would you". If nothing qualifies, a second pass splits on
/// sentence terminators and keeps sentences longer than four words that
/// contain an interrogative keyword. A trailing `?` is appended if missing.
pub fn extract_questions(raw: &str) -> Vec<String> {
    let mut questions = Vec::new();

    for line in raw.lines() {
        let mut line = line.trim();
        if let Some(rest) = line.strip_prefix("Q:") {
            line = rest.trim();
        }
        if line.is_empty() {
            continue;
        }

        let lower = line.to_lowercase();
        let looks_like_question = line.contains('?')
            || LINE_OPENERS.iter().any(|opener| lower.starts_with(opener))
            || lower.contains("experience")
            || lower.contains("would you");

        if looks_like_question {
            questions.push(ensure_question_mark(line));
            if questions.len() == MAX_QUESTIONS {
                return questions;
            }
        }
    }

    if questions.is_empty() {
        for sentence in raw.split(['.', '!']) {
            let sentence = sentence.trim();
            if sentence.is_empty() {
                continue;
            }
            let lower = sentence.to_lowercase();
            let has_keyword = SENTENCE_KEYWORDS.iter().any(|kw| lower.contains(kw));
            if has_keyword && word_count(sentence) > 4 {
                questions.push(ensure_question_mark(sentence));
                if questions.len() == MAX_QUESTIONS {
                    break;
                }
            }
        }
    }

    questions
}

/// Extracts a single follow-up question, or `None` when the model signalled
/// termination (the sentinel, case-insensitive) or produced nothing usable.
pub fn extract_followup(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.to_uppercase().contains(END_SENTINEL) {
        return None;
    }

    let mut cleaned = raw;
    for prefix in FOLLOWUP_PREFIXES {
        if let Some(rest) = strip_prefix_ci(cleaned, prefix) {
            cleaned = rest.trim_start();
        }
    }

    // Only the first sentence; '?' is not a terminator so a question
    // survives intact.
    let question = cleaned.split(['.', '!']).next()?.trim();

    if word_count(question) <= 4 {
        return None;
    }
    let lower = question.to_lowercase();
    let acceptable =
        question.ends_with('?') || FOLLOWUP_KEYWORDS.iter().any(|kw| lower.contains(kw));
    if !acceptable {
        return None;
    }

    Some(ensure_question_mark(question))
}

fn ensure_question_mark(text: &str) -> String {
    if text.ends_with('?') {
        text.to_string()
    } else {
        format!("{text}?")
    }
}

fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

fn strip_prefix_ci<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let head = text.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &text[prefix.len()..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_questions_q_prefixed_lines() {
        let raw = "Q: What is your experience with Python?\nQ: How do you debug production issues?";
        assert_eq!(
            extract_questions(raw),
            vec![
                "What is your experience with Python?".to_string(),
                "How do you debug production issues?".to_string(),
            ]
        );
    }

    #[test]
    fn test_extract_questions_appends_missing_question_mark() {
        let raw = "Q: Tell me about your largest deployment";
        assert_eq!(
            extract_questions(raw),
            vec!["Tell me about your largest deployment?".to_string()]
        );
    }

    #[test]
    fn test_extract_questions_caps_at_four() {
        let raw = "Q: What is A?\nQ: What is B?\nQ: What is C?\nQ: What is D?\nQ: What is E?";
        assert_eq!(extract_questions(raw).len(), 4);
    }

    #[test]
    fn test_extract_questions_preserves_order() {
        let raw = "Q: What is first?\nSome filler text.\nQ: What is second?";
        let questions = extract_questions(raw);
        assert_eq!(questions[0], "What is first?");
        assert_eq!(questions[1], "What is second?");
    }

    #[test]
    fn test_extract_questions_experience_phrase_without_question_mark() {
        // No "Q:" line and no "?", but mentions "experience" and is longer
        // than four words.
        let raw = "I would ask about your REST API design experience";
        let questions = extract_questions(raw);
        assert!(!questions.is_empty());
        assert!(questions.iter().all(|q| q.ends_with('?')));
    }

    #[test]
    fn test_extract_questions_sentence_fallback() {
        let raw = "The candidate seems solid. Perhaps probing how they scaled the ingestion \
                   pipeline would be worthwhile! Nothing else stands out.";
        let questions = extract_questions(raw);
        assert_eq!(questions.len(), 1);
        assert!(questions[0].ends_with('?'));
        assert!(questions[0].contains("how they scaled"));
    }

    #[test]
    fn test_extract_questions_empty_input() {
        assert!(extract_questions("").is_empty());
        assert!(extract_questions("Nope").is_empty());
    }

    #[test]
    fn test_extract_followup_sentinel_any_case() {
        assert_eq!(extract_followup("END_INTERVIEW"), None);
        assert_eq!(extract_followup("end_interview"), None);
        assert_eq!(
            extract_followup("I think we are done here. End_Interview"),
            None
        );
    }

    #[test]
    fn test_extract_followup_strips_prefix() {
        let raw = "Follow-up question: What metrics did you track for that service?";
        assert_eq!(
            extract_followup(raw),
            Some("What metrics did you track for that service?".to_string())
        );
    }

    #[test]
    fn test_extract_followup_prefix_case_insensitive() {
        let raw = "QUESTION: How did you roll back the failed migration?";
        assert_eq!(
            extract_followup(raw),
            Some("How did you roll back the failed migration?".to_string())
        );
    }

    #[test]
    fn test_extract_followup_takes_first_sentence_only() {
        let raw = "Can you describe the failure mode in more depth. It matters for the role.";
        assert_eq!(
            extract_followup(raw),
            Some("Can you describe the failure mode in more depth?".to_string())
        );
    }

    #[test]
    fn test_extract_followup_rejects_short_text() {
        assert_eq!(extract_followup("Why though?"), None);
        assert_eq!(extract_followup("Sounds good to me"), None);
    }

    #[test]
    fn test_extract_followup_accepts_keyword_without_question_mark() {
        let raw = "Tell me more about the caching layer you built";
        assert_eq!(
            extract_followup(raw),
            Some("Tell me more about the caching layer you built?".to_string())
        );
    }
}
