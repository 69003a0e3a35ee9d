//! Prompt assembly.
//!
//! Pure functions of (role context, ordered history) -> chat messages, so
//! the orchestrator never depends on a specific model's text format and a
//! provider can be swapped without touching the state machine.

use super::{ChatMessage, InterviewContext};
use crate::conversation::{Turn, TurnRole};
use crate::session::Difficulty;

fn difficulty_label(difficulty: Difficulty) -> &'static str {
    match difficulty {
        Difficulty::Junior => "junior",
        Difficulty::Mid => "mid-level",
        Difficulty::Senior => "senior",
    }
}

/// Messages requesting the opening question of a fresh interview.
pub fn opening_messages(context: &InterviewContext) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(format!(
            "You are an expert AI interviewer conducting a professional {} interview \
             for a {} {} position. Start with a welcoming sentence, then ask your \
             first open-ended question.",
            context.interview_type,
            difficulty_label(context.difficulty),
            context.job_role,
        )),
        ChatMessage::user("Start the interview now."),
    ]
}

/// Messages requesting a follow-up question over the full history.
pub fn next_question_messages(history: &[Turn], context: &InterviewContext) -> Vec<ChatMessage> {
    let mut messages = vec![ChatMessage::system(format!(
        "You are an expert AI interviewer for a {} {} position. Based on the \
         candidate's last answer, ask one relevant follow-up question.",
        difficulty_label(context.difficulty),
        context.job_role,
    ))];
    messages.extend(history.iter().map(turn_to_message));
    messages
}

/// Messages requesting structured JSON feedback over the transcript.
pub fn feedback_messages(history: &[Turn]) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(
            "You are a hiring manager. Provide feedback for the interview transcript \
             ONLY in this JSON format: {\"summary\": \"string\", \"score\": number, \
             \"strengths\": [\"string\"], \"improvements\": [\"string\"]}",
        ),
        ChatMessage::user(format!(
            "Analyze this transcript and provide your evaluation in the required \
             JSON format. The score must be an integer from 0 to 100.\n\nTRANSCRIPT:\n{}",
            render_transcript(history),
        )),
    ]
}

/// Renders history as a plain-text transcript for evaluation prompts.
pub fn render_transcript(history: &[Turn]) -> String {
    history
        .iter()
        .filter(|turn| turn.role != TurnRole::System)
        .map(|turn| {
            let speaker = match turn.role {
                TurnRole::User => "Candidate",
                _ => "Interviewer",
            };
            format!("{}: {}", speaker, turn.content)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn turn_to_message(turn: &Turn) -> ChatMessage {
    let role = match turn.role {
        TurnRole::User => "user",
        TurnRole::Assistant => "assistant",
        TurnRole::System => "system",
    };
    ChatMessage {
        role: role.to_string(),
        content: turn.content.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> InterviewContext {
        InterviewContext {
            job_role: "Backend Engineer".to_string(),
            interview_type: "Technical Deep Dive".to_string(),
            difficulty: Difficulty::Senior,
            candidate_label: None,
        }
    }

    #[test]
    fn test_opening_messages_mention_role_and_type() {
        let messages = opening_messages(&context());
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, "system");
        assert!(messages[0].content.contains("Technical Deep Dive"));
        assert!(messages[0].content.contains("senior Backend Engineer"));
        assert_eq!(messages[1].role, "user");
    }

    #[test]
    fn test_next_question_messages_preserve_history_order() {
        let history = vec![
            Turn::new("s-1", TurnRole::Assistant, "Tell me about yourself."),
            Turn::new("s-1", TurnRole::User, "I build storage engines."),
        ];
        let messages = next_question_messages(&history, &context());
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[1].role, "assistant");
        assert_eq!(messages[2].role, "user");
        assert_eq!(messages[2].content, "I build storage engines.");
    }

    #[test]
    fn test_transcript_skips_system_turns() {
        let history = vec![
            Turn::new("s-1", TurnRole::System, "orchestration note"),
            Turn::new("s-1", TurnRole::Assistant, "First question?"),
            Turn::new("s-1", TurnRole::User, "An answer."),
        ];
        let transcript = render_transcript(&history);
        assert_eq!(
            transcript,
            "Interviewer: First question?\nCandidate: An answer."
        );
    }
}
