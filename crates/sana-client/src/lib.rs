pub mod api;
pub mod conversation;
pub mod error;
pub mod session;

pub use api::{ExchangeApi, ExchangeReply, HttpApi, SessionEntry, TurnSnapshot};
pub use conversation::{Conversation, DisplayTurn, Role};
pub use error::{Error, Result};
pub use session::allocate_session_id;
