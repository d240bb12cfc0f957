//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings with a fixed microsecond
//! precision so that lexicographic order equals chronological order. UUIDs
//! are stored as hyphenated lowercase strings.

use chrono::{DateTime, SecondsFormat, Utc};
use faqchat_core::exchange::ChatExchange;
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Raw row types ────────────────────────────────────────────────────────────

/// A `chat_exchanges` row as read straight from SQLite.
pub struct RawExchange {
  pub exchange_id: String,
  pub user_id:     String,
  pub question:    String,
  pub answer:      String,
  pub intent:      String,
  pub created_at:  String,
}

impl RawExchange {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      exchange_id: row.get(0)?,
      user_id:     row.get(1)?,
      question:    row.get(2)?,
      answer:      row.get(3)?,
      intent:      row.get(4)?,
      created_at:  row.get(5)?,
    })
  }

  pub fn into_exchange(self) -> Result<ChatExchange> {
    Ok(ChatExchange {
      exchange_id: decode_uuid(&self.exchange_id)?,
      user_id:     self.user_id,
      question:    self.question,
      answer:      self.answer,
      intent:      self.intent,
      created_at:  decode_dt(&self.created_at)?,
    })
  }
}
