//! Pure transition logic for the interview-session state machine.
//!
//! The decision of what happens after an answer is recorded is computed here
//! from counters alone, so it is unit-testable without a question source.
//! The effectful part (actually generating a follow-up) lives in the handler.

/// Recording the fifth answer always completes the interview, regardless of
/// remaining pre-generated questions.
pub const QUESTION_CAP: usize = 5;

/// Closing message emitted on completion.
pub const CLOSING_MESSAGE: &str =
    "Thank you for your time and detailed responses! The interview is now complete.";

/// What the state machine should do after an answer has been recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextStep {
    /// The question cap was reached; transition to `completed`.
    Complete,
    /// An unused pre-generated question remains; advance the cursor.
    AskPregenerated,
    /// All pre-generated questions are spent; ask the question source for a
    /// follow-up (which may itself decide to terminate).
    GenerateFollowup,
}

/// Computes the next step from the session's counters.
///
/// `answers_recorded` includes the answer that was just recorded;
/// `current_index` and `question_count` describe the `questions` sequence
/// before any follow-up is appended.
pub fn plan_next(answers_recorded: usize, current_index: usize, question_count: usize) -> NextStep {
    if answers_recorded >= QUESTION_CAP {
        NextStep::Complete
    } else if current_index + 1 < question_count {
        NextStep::AskPregenerated
    } else {
        NextStep::GenerateFollowup
    }
}
