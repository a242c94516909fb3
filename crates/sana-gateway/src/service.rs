use std::sync::{Arc, Mutex, MutexGuard};

use sana_model::TextModel;
use sana_store::{AppendTurnInput, Role, SessionSummary, Store, TurnRecord};
use serde::Serialize;

use crate::error::{Error, Result};
use crate::prompt;

const SESSION_LIST_LIMIT: usize = 20;

const ADVICE: &str =
    "Remember to stay hydrated and rest. Consult a doctor if symptoms persist.";

const SYMPTOM_KEYWORDS: &[&str] = &[
    "headache", "fever", "cough", "pain", "tired", "nausea", "dizzy",
];

/// One completed exchange as returned to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct ExchangeReply {
    pub response: String,
    pub symptom: Option<String>,
    pub advice: String,
    pub session_id: String,
}

/// The backend entry point for conversational turn exchanges: mediates
/// between the caller, the conversation store, and the generative model.
pub struct ChatService {
    store: Arc<Mutex<Store>>,
    model: TextModel,
    history_context_turns: usize,
}

impl ChatService {
    pub fn new(store: Arc<Mutex<Store>>, model: TextModel) -> Self {
        Self {
            store,
            model,
            history_context_turns: prompt::HISTORY_CONTEXT_TURNS,
        }
    }

    /// Override how many trailing turns are sent to the model.
    pub fn with_history_context(mut self, turns: usize) -> Self {
        self.history_context_turns = turns;
        self
    }

    /// Run one turn exchange for an authenticated caller.
    ///
    /// The user turn is persisted before the model is invoked, so an
    /// utterance is never lost to a model failure. A failed model call
    /// leaves the conversation user-turn-terminated and surfaces
    /// [`Error::ModelUnavailable`]; it is never retried here.
    pub async fn exchange(
        &self,
        user_id: &str,
        session_id: &str,
        text: &str,
    ) -> Result<ExchangeReply> {
        let text = text.trim();
        if text.is_empty() {
            return Err(Error::Validation("message must not be empty".to_string()));
        }

        let context = {
            let mut store = self.lock_store();
            let mut conversations = store.conversations();
            conversations.append_turn(AppendTurnInput {
                session_id: session_id.to_string(),
                user_id: user_id.to_string(),
                role: Role::User,
                content: text.to_string(),
            })?;
            conversations.turns(session_id, user_id)?
        };

        let request = prompt::build_request(&context, self.history_context_turns);

        let completion = match self.model.complete(request).await {
            Ok(completion) => completion,
            Err(err) => {
                tracing::warn!(session_id, error = %err, "model call failed");
                return Err(Error::ModelUnavailable(err.to_string()));
            }
        };

        {
            let mut store = self.lock_store();
            store.conversations().append_turn(AppendTurnInput {
                session_id: session_id.to_string(),
                user_id: user_id.to_string(),
                role: Role::Assistant,
                content: completion.text.clone(),
            })?;
        }

        tracing::info!(session_id, "exchange completed");

        Ok(ExchangeReply {
            response: completion.text,
            symptom: detect_symptom(text),
            advice: ADVICE.to_string(),
            session_id: session_id.to_string(),
        })
    }

    /// The full ordered turn list for one of the caller's sessions.
    pub fn list_turns(&self, user_id: &str, session_id: &str) -> Result<Vec<TurnRecord>> {
        let mut store = self.lock_store();
        let turns = store.conversations().turns(session_id, user_id)?;
        Ok(turns)
    }

    /// Newest-first summaries of the caller's sessions.
    pub fn list_sessions(&self, user_id: &str) -> Result<Vec<SessionSummary>> {
        let mut store = self.lock_store();
        let summaries = store
            .conversations()
            .summaries(user_id, SESSION_LIST_LIMIT)?;
        Ok(summaries)
    }

    fn lock_store(&self) -> MutexGuard<'_, Store> {
        self.store
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Best-effort keyword spotting over the raw utterance. Educational
/// labeling only; nothing downstream branches on it.
fn detect_symptom(text: &str) -> Option<String> {
    let lower = text.to_lowercase();
    SYMPTOM_KEYWORDS
        .iter()
        .find(|keyword| lower.contains(*keyword))
        .map(|keyword| capitalize(keyword))
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use sana_model::request::CompletionRequest;
    use sana_model::response::Completion;
    use sana_model::{TextModel, TextModelBackend};
    use sana_store::{Role, Store};

    use super::{ChatService, detect_symptom};
    use crate::error::Error;

    enum Script {
        Reply(&'static str),
        Fail,
    }

    /// Scripted stand-in for the generative model; records the last
    /// request so tests can assert on the context that was sent.
    struct FakeModel {
        script: Script,
        last_request: Arc<Mutex<Option<CompletionRequest>>>,
    }

    #[async_trait]
    impl TextModelBackend for FakeModel {
        fn model_id(&self) -> &str {
            "fake-model"
        }

        fn provider(&self) -> &str {
            "fake"
        }

        async fn complete(&self, request: CompletionRequest) -> Result<Completion, sana_model::Error> {
            *self.last_request.lock().expect("request lock") = Some(request);
            match self.script {
                Script::Reply(text) => Ok(Completion {
                    text: text.to_string(),
                    usage: None,
                }),
                Script::Fail => Err(sana_model::Error::Other("simulated timeout".to_string())),
            }
        }
    }

    fn service(script: Script) -> (ChatService, Arc<Mutex<Option<CompletionRequest>>>) {
        let last_request = Arc::new(Mutex::new(None));
        let model = TextModel::new(FakeModel {
            script,
            last_request: Arc::clone(&last_request),
        });
        let store = Arc::new(Mutex::new(Store::open_in_memory().expect("open store")));
        (ChatService::new(store, model), last_request)
    }

    #[tokio::test]
    async fn successful_exchange_persists_user_then_assistant_turn() {
        let (service, _) = service(Script::Reply("That sounds uncomfortable; rest up."));

        let reply = service
            .exchange("alice", "s1", "I have a sore throat and mild fever")
            .await
            .expect("exchange");
        assert_eq!(reply.response, "That sounds uncomfortable; rest up.");
        assert_eq!(reply.session_id, "s1");
        assert_eq!(reply.symptom.as_deref(), Some("Fever"));

        let turns = service.list_turns("alice", "s1").expect("turns");
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].role, Role::User);
        assert_eq!(turns[0].content, "I have a sore throat and mild fever");
        assert_eq!(turns[1].role, Role::Assistant);
    }

    #[tokio::test]
    async fn empty_utterance_is_rejected_before_any_write() {
        let (service, last_request) = service(Script::Reply("unused"));

        let err = service
            .exchange("alice", "s1", "   ")
            .await
            .expect_err("blank message must be rejected");
        assert!(matches!(err, Error::Validation(_)));
        assert!(
            last_request.lock().expect("request lock").is_none(),
            "the model must not be called"
        );

        let err = service
            .list_turns("alice", "s1")
            .expect_err("no record may exist after a rejected send");
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn user_turn_survives_model_failure() {
        let (service, _) = service(Script::Fail);

        let err = service
            .exchange("alice", "s1", "I feel dizzy")
            .await
            .expect_err("model failure must surface");
        assert!(matches!(err, Error::ModelUnavailable(_)));

        let turns = service.list_turns("alice", "s1").expect("turns");
        assert_eq!(turns.len(), 1, "only the user turn is persisted");
        assert_eq!(turns[0].role, Role::User);
        assert_eq!(turns[0].content, "I feel dizzy");
    }

    #[tokio::test]
    async fn session_stays_usable_after_a_failed_exchange() {
        let (failing, _) = service(Script::Fail);
        failing
            .exchange("alice", "s1", "first try")
            .await
            .expect_err("scripted failure");

        // A later exchange on the same session id appends past the
        // user-turn-terminated tail.
        let store = Arc::clone(&failing.store);
        let model = TextModel::new(FakeModel {
            script: Script::Reply("better now"),
            last_request: Arc::new(Mutex::new(None)),
        });
        let recovered = ChatService::new(store, model);

        recovered
            .exchange("alice", "s1", "second try")
            .await
            .expect("exchange after failure");

        let turns = recovered.list_turns("alice", "s1").expect("turns");
        let contents: Vec<&str> = turns.iter().map(|t| t.content.as_str()).collect();
        assert_eq!(contents, ["first try", "second try", "better now"]);
    }

    #[tokio::test]
    async fn model_context_is_bounded_to_the_newest_turns() {
        let (service, last_request) = service(Script::Reply("ok"));
        let service = service.with_history_context(4);

        for i in 0..5 {
            service
                .exchange("alice", "s1", &format!("message {i}"))
                .await
                .expect("exchange");
        }

        let request = last_request
            .lock()
            .expect("request lock")
            .take()
            .expect("model was called");
        // system instruction + at most 4 history turns
        assert_eq!(request.messages.len(), 5);
        assert_eq!(
            request.messages.last().map(|m| m.text().to_string()),
            Some("message 4".to_string()),
            "the new utterance must always be included"
        );
    }

    #[tokio::test]
    async fn foreign_sessions_are_forbidden_regardless_of_reply() {
        let (service, _) = service(Script::Reply("hello"));

        service
            .exchange("alice", "s1", "mine")
            .await
            .expect("exchange");

        let err = service
            .list_turns("bob", "s1")
            .expect_err("foreign history reads must fail");
        assert!(matches!(err, Error::Forbidden));

        let err = service
            .exchange("bob", "s1", "hijack")
            .await
            .expect_err("foreign appends must fail");
        assert!(matches!(err, Error::Forbidden));
    }

    #[tokio::test]
    async fn session_listing_is_per_user_and_newest_first() {
        let (service, _) = service(Script::Reply("noted"));

        service.exchange("alice", "a", "older").await.expect("exchange");
        service.exchange("alice", "b", "newer").await.expect("exchange");
        service.exchange("bob", "c", "other user").await.expect("exchange");

        let sessions = service.list_sessions("alice").expect("sessions");
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].session_id, "b");
        assert_eq!(sessions[1].session_id, "a");
        assert_eq!(sessions[0].turn_count, 2);
    }

    #[test]
    fn symptom_keywords_are_spotted_case_insensitively() {
        assert_eq!(detect_symptom("Bad HEADACHE since noon").as_deref(), Some("Headache"));
        assert_eq!(detect_symptom("my knee hurts").as_deref(), None);
        assert_eq!(detect_symptom("nausea and chills").as_deref(), Some("Nausea"));
    }
}
