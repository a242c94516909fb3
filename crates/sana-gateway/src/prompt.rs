use sana_model::request::CompletionRequest;
use sana_store::{Role, TurnRecord};

/// How many trailing turns of a conversation travel to the model. Older
/// turns are dropped outright, never summarized, to keep request size
/// bounded.
pub(crate) const HISTORY_CONTEXT_TURNS: usize = 6;

pub(crate) const SYSTEM_INSTRUCTION: &str = "\
You are a helpful health assistant that provides general, educational health guidance.

IMPORTANT GUIDELINES:
- You do NOT provide medical diagnoses
- You provide educational information about possible causes of symptoms
- You always recommend consulting a healthcare professional for proper diagnosis
- You never name specific medications or dosages
- Keep responses concise, friendly, and supportive
- Focus on general wellness advice

When analyzing symptoms, respond with:
1. Brief acknowledgment of the symptom
2. 2-3 possible common causes (general education only)
3. Self-care advice
4. Always end with a reminder to consult a doctor if symptoms persist or worsen

Keep your response under 150 words.";

/// Build the model request for one exchange: the fixed system instruction
/// plus the most recent `limit` turns of the conversation (which already
/// include the utterance being answered).
pub(crate) fn build_request(turns: &[TurnRecord], limit: usize) -> CompletionRequest {
    let start = turns.len().saturating_sub(limit);

    let mut req = sana_model::completion();
    req.system(SYSTEM_INSTRUCTION);
    for turn in &turns[start..] {
        match turn.role {
            Role::User => req.user(turn.content.as_str()),
            Role::Assistant => req.assistant(turn.content.as_str()),
        };
    }
    req.build()
}

#[cfg(test)]
mod tests {
    use sana_model::request::Message;
    use sana_store::{Role, TurnRecord};

    use super::{HISTORY_CONTEXT_TURNS, SYSTEM_INSTRUCTION, build_request};

    fn turn(seq: i64, role: Role, content: &str) -> TurnRecord {
        TurnRecord {
            seq,
            session_id: "s1".to_string(),
            role,
            content: content.to_string(),
            created_at_ms: seq,
        }
    }

    #[test]
    fn request_starts_with_system_instruction_and_keeps_turn_order() {
        let turns = vec![
            turn(1, Role::User, "I have a sore throat"),
            turn(2, Role::Assistant, "How long has it lasted?"),
            turn(3, Role::User, "two days"),
        ];

        let req = build_request(&turns, HISTORY_CONTEXT_TURNS);
        assert_eq!(req.messages.len(), 4);
        assert!(matches!(&req.messages[0], Message::System { text } if text == SYSTEM_INSTRUCTION));
        assert!(matches!(&req.messages[1], Message::User { text } if text == "I have a sore throat"));
        assert!(matches!(&req.messages[2], Message::Assistant { .. }));
        assert!(matches!(&req.messages[3], Message::User { text } if text == "two days"));
    }

    #[test]
    fn history_beyond_the_bound_drops_oldest_turns() {
        let turns: Vec<TurnRecord> = (0..10)
            .map(|i| {
                let role = if i % 2 == 0 { Role::User } else { Role::Assistant };
                turn(i, role, &format!("turn {i}"))
            })
            .collect();

        let req = build_request(&turns, HISTORY_CONTEXT_TURNS);
        // system + the final 6 turns
        assert_eq!(req.messages.len(), 1 + HISTORY_CONTEXT_TURNS);
        assert_eq!(req.messages[1].text(), "turn 4");
        assert_eq!(
            req.messages.last().map(Message::text),
            Some("turn 9"),
            "the newest turn must survive the cut"
        );
    }
}
