use std::sync::{Arc, Mutex, MutexGuard};

use tokio::task::JoinHandle;

use crate::api::ExchangeApi;
use crate::error::Result;
use crate::session::allocate_session_id;

/// Greeting shown when a conversation view opens. Local only — it is never
/// sent to the gateway and never counts as history.
pub const WELCOME_TEXT: &str = "Hi! I'm your health assistant. Tell me about any \
symptoms you're experiencing and I'll share general wellness guidance.";

/// Shown in place of a reply when an exchange fails. Local only; the
/// persisted conversation stays user-turn-terminated until the next
/// successful exchange.
pub const FALLBACK_TEXT: &str = "I'm having trouble responding right now. \
Please try again in a moment.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone)]
pub struct DisplayTurn {
    pub role: Role,
    pub content: String,
}

struct ViewState {
    turns: Vec<DisplayTurn>,
    awaiting_reply: bool,
}

/// The conversation view-model: a single monotonically-growing message list
/// with optimistic sends.
///
/// State lives behind `Arc<Mutex<_>>` so an in-flight exchange finishes (or
/// fails) against the shared state even if the owning view has been torn
/// down — the completed update lands in state nothing reads anymore, which
/// is harmless.
pub struct Conversation {
    api: Arc<dyn ExchangeApi>,
    session_id: String,
    state: Arc<Mutex<ViewState>>,
}

impl Conversation {
    /// Open a fresh conversation: allocates a session id and seeds the
    /// welcome turn.
    pub fn new(api: Arc<dyn ExchangeApi>) -> Self {
        Self {
            api,
            session_id: allocate_session_id(),
            state: Arc::new(Mutex::new(ViewState {
                turns: vec![DisplayTurn {
                    role: Role::Assistant,
                    content: WELCOME_TEXT.to_string(),
                }],
                awaiting_reply: false,
            })),
        }
    }

    /// Reopen an existing session, rebuilding the list from persisted turns.
    /// Anything that was local-only in a previous view (welcome, fallback
    /// turns) is gone by construction.
    pub async fn resume(api: Arc<dyn ExchangeApi>, session_id: impl Into<String>) -> Result<Self> {
        let session_id = session_id.into();
        let history = api.history(&session_id).await?;

        let turns = history
            .into_iter()
            .map(|turn| DisplayTurn {
                role: if turn.role == "user" {
                    Role::User
                } else {
                    Role::Assistant
                },
                content: turn.content,
            })
            .collect();

        Ok(Self {
            api,
            session_id,
            state: Arc::new(Mutex::new(ViewState {
                turns,
                awaiting_reply: false,
            })),
        })
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Snapshot of the current message list, in display order.
    pub fn turns(&self) -> Vec<DisplayTurn> {
        lock(&self.state).turns.clone()
    }

    /// Whether an exchange is in flight (drives the "thinking" indicator).
    pub fn is_awaiting_reply(&self) -> bool {
        lock(&self.state).awaiting_reply
    }

    /// Send one user turn.
    ///
    /// The user turn is appended synchronously — the sender sees their own
    /// message before any network traffic happens. The exchange itself runs
    /// in a spawned task; its completion appends either the assistant reply
    /// or the fallback turn, and clears the awaiting flag on every path.
    ///
    /// Returns `None` without side effects when `text` trims to empty.
    pub fn send_user_turn(&self, text: &str) -> Option<JoinHandle<()>> {
        let text = text.trim().to_string();
        if text.is_empty() {
            return None;
        }

        {
            let mut state = lock(&self.state);
            state.turns.push(DisplayTurn {
                role: Role::User,
                content: text.clone(),
            });
            state.awaiting_reply = true;
        }

        let api = Arc::clone(&self.api);
        let state = Arc::clone(&self.state);
        let session_id = self.session_id.clone();

        Some(tokio::spawn(async move {
            let content = match api.exchange(&session_id, &text).await {
                Ok(reply) => reply.response,
                Err(err) => {
                    tracing::warn!(session_id, error = %err, "exchange failed, showing fallback");
                    FALLBACK_TEXT.to_string()
                }
            };

            let mut state = lock(&state);
            state.turns.push(DisplayTurn {
                role: Role::Assistant,
                content,
            });
            state.awaiting_reply = false;
        }))
    }
}

fn lock(state: &Mutex<ViewState>) -> MutexGuard<'_, ViewState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
