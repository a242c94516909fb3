use std::time::{SystemTime, UNIX_EPOCH};

use rusqlite::types::Type;
use rusqlite::{OptionalExtension, Row, Transaction, params};
use serde::{Deserialize, Serialize};

use crate::database::Database;
use crate::error::{Error, Result};

const PREVIEW_MAX_CHARS: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }

    fn parse(raw: &str) -> Result<Self> {
        match raw {
            "user" => Ok(Role::User),
            "assistant" => Ok(Role::Assistant),
            other => Err(Error::UnknownRole(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationRecord {
    pub session_id: String,
    pub user_id: String,
    pub created_at_ms: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnRecord {
    pub seq: i64,
    pub session_id: String,
    pub role: Role,
    pub content: String,
    pub created_at_ms: i64,
}

/// Listing entry for one conversation: enough to render a history screen
/// without loading every turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: String,
    pub created_at_ms: i64,
    pub turn_count: i64,
    pub last_turn: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AppendTurnInput {
    pub session_id: String,
    pub user_id: String,
    pub role: Role,
    pub content: String,
}

pub struct Conversations<'db> {
    pub(crate) db: &'db mut Database,
}

impl Conversations<'_> {
    /// Append one turn to a conversation, creating the conversation record
    /// (bound to `user_id`) if this is its first turn.
    ///
    /// Turns are append-only; timestamps are clamped so they never decrease
    /// within a conversation even if the wall clock steps backwards.
    pub fn append_turn(&mut self, input: AppendTurnInput) -> Result<TurnRecord> {
        let now = now_ms();
        let tx = self.db.conn.transaction()?;

        let existing = conversation_by_id(&tx, &input.session_id)?;
        match existing {
            Some(record) => ensure_owner(&record, &input.user_id)?,
            None => {
                tx.execute(
                    "INSERT INTO conversations (id, user_id, created_at_ms)
                     VALUES (?1, ?2, ?3)",
                    params![input.session_id, input.user_id, now],
                )?;
            }
        }

        let last_ts: Option<i64> = tx
            .query_row(
                "SELECT created_at_ms FROM turns
                 WHERE conversation_id = ?1
                 ORDER BY seq DESC
                 LIMIT 1",
                params![input.session_id],
                |row| row.get(0),
            )
            .optional()?;
        let created_at_ms = last_ts.map_or(now, |ts| ts.max(now));

        tx.execute(
            "INSERT INTO turns (conversation_id, role, content, created_at_ms)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                input.session_id,
                input.role.as_str(),
                input.content,
                created_at_ms
            ],
        )?;
        let seq = tx.last_insert_rowid();

        tx.commit()?;

        tracing::debug!(
            session_id = %input.session_id,
            role = input.role.as_str(),
            seq,
            "appended turn"
        );

        Ok(TurnRecord {
            seq,
            session_id: input.session_id,
            role: input.role,
            content: input.content,
            created_at_ms,
        })
    }

    pub fn get(&self, session_id: &str) -> Result<Option<ConversationRecord>> {
        self.db
            .conn
            .query_row(
                "SELECT id, user_id, created_at_ms
                 FROM conversations
                 WHERE id = ?1",
                params![session_id],
                row_to_conversation,
            )
            .optional()
            .map_err(Error::from)
    }

    /// The full ordered turn list for a conversation owned by `user_id`.
    pub fn turns(&self, session_id: &str, user_id: &str) -> Result<Vec<TurnRecord>> {
        let record = self
            .get(session_id)?
            .ok_or_else(|| Error::SessionNotFound(session_id.to_string()))?;
        ensure_owner(&record, user_id)?;

        let mut stmt = self.db.conn.prepare(
            "SELECT seq, conversation_id, role, content, created_at_ms
             FROM turns
             WHERE conversation_id = ?1
             ORDER BY seq ASC",
        )?;
        let iter = stmt.query_map(params![session_id], row_to_turn)?;
        collect_rows(iter)
    }

    /// Newest-first conversation summaries for one user.
    pub fn summaries(&self, user_id: &str, limit: usize) -> Result<Vec<SessionSummary>> {
        let mut stmt = self.db.conn.prepare(
            "SELECT
                c.id,
                c.created_at_ms,
                (SELECT COUNT(*) FROM turns t WHERE t.conversation_id = c.id),
                (SELECT t.content FROM turns t
                 WHERE t.conversation_id = c.id
                 ORDER BY t.seq DESC
                 LIMIT 1)
             FROM conversations c
             WHERE c.user_id = ?1
             ORDER BY c.created_at_ms DESC, c.rowid DESC
             LIMIT ?2",
        )?;

        let iter = stmt.query_map(params![user_id, limit as i64], |row| {
            let last_turn: Option<String> = row.get(3)?;
            Ok(SessionSummary {
                session_id: row.get(0)?,
                created_at_ms: row.get(1)?,
                turn_count: row.get(2)?,
                last_turn: last_turn.map(|content| truncate_with_ellipsis(&content, PREVIEW_MAX_CHARS)),
            })
        })?;
        collect_rows(iter)
    }
}

fn conversation_by_id(
    tx: &Transaction<'_>,
    session_id: &str,
) -> Result<Option<ConversationRecord>> {
    tx.query_row(
        "SELECT id, user_id, created_at_ms
         FROM conversations
         WHERE id = ?1",
        params![session_id],
        row_to_conversation,
    )
    .optional()
    .map_err(Error::from)
}

fn ensure_owner(record: &ConversationRecord, user_id: &str) -> Result<()> {
    if record.user_id == user_id {
        Ok(())
    } else {
        Err(Error::OwnerMismatch {
            session_id: record.session_id.clone(),
            user_id: user_id.to_string(),
        })
    }
}

fn row_to_conversation(row: &Row<'_>) -> rusqlite::Result<ConversationRecord> {
    Ok(ConversationRecord {
        session_id: row.get(0)?,
        user_id: row.get(1)?,
        created_at_ms: row.get(2)?,
    })
}

fn row_to_turn(row: &Row<'_>) -> rusqlite::Result<TurnRecord> {
    let role: String = row.get(2)?;
    let role = Role::parse(&role)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(e)))?;
    Ok(TurnRecord {
        seq: row.get(0)?,
        session_id: row.get(1)?,
        role,
        content: row.get(3)?,
        created_at_ms: row.get(4)?,
    })
}

fn collect_rows<T, F>(iter: rusqlite::MappedRows<'_, F>) -> Result<Vec<T>>
where
    F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
{
    let mut rows = Vec::new();
    for row in iter {
        rows.push(row?);
    }
    Ok(rows)
}

fn truncate_with_ellipsis(input: &str, max_chars: usize) -> String {
    if input.chars().count() <= max_chars {
        return input.to_string();
    }

    let mut truncated = input.chars().take(max_chars).collect::<String>();
    truncated.push('…');
    truncated
}

fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}
