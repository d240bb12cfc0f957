//! [`SqliteStore`] — the SQLite implementation of [`ChatStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use faqchat_core::{
  exchange::{ChatExchange, NewExchange},
  faq::FaqEntry,
  preference::UserPreference,
  store::ChatStore,
};

use crate::{
  encode::{encode_dt, encode_uuid, RawExchange},
  schema::SCHEMA,
  Result,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A faqchat store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Seeding ───────────────────────────────────────────────────────────────
  //
  // The service itself never writes FAQs or preferences; these exist for
  // administrative seeding and tests.

  /// Insert a FAQ entry and return it with its assigned `faq_id`.
  pub async fn add_faq(
    &self,
    question: impl Into<String>,
    answer: impl Into<String>,
  ) -> Result<FaqEntry> {
    let question = question.into();
    let answer   = answer.into();
    let (q, a)   = (question.clone(), answer.clone());

    let faq_id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO faq_questions (question, answer) VALUES (?1, ?2)",
          rusqlite::params![q, a],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(FaqEntry { faq_id, question, answer })
  }

  /// Insert or overwrite the preference stored under `(user_id, key)`.
  pub async fn set_preference(
    &self,
    user_id: impl Into<String>,
    key: impl Into<String>,
    answer: impl Into<String>,
  ) -> Result<UserPreference> {
    let pref = UserPreference {
      user_id:  user_id.into(),
      question: key.into(),
      answer:   answer.into(),
    };
    let (u, q, a) = (pref.user_id.clone(), pref.question.clone(), pref.answer.clone());

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO user_profile_preferences (user_id, question, answer)
           VALUES (?1, ?2, ?3)
           ON CONFLICT (user_id, question) DO UPDATE SET answer = excluded.answer",
          rusqlite::params![u, q, a],
        )?;
        Ok(())
      })
      .await?;

    Ok(pref)
  }

  /// Total number of exchanges recorded for `user_id`.
  pub async fn exchange_count(&self, user_id: &str) -> Result<usize> {
    let user_id = user_id.to_owned();
    let count: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT COUNT(*) FROM chat_exchanges WHERE user_id = ?1",
          rusqlite::params![user_id],
          |r| r.get(0),
        )?)
      })
      .await?;
    Ok(count as usize)
  }
}

// ─── ChatStore impl ──────────────────────────────────────────────────────────

impl ChatStore for SqliteStore {
  type Error = crate::Error;

  // ── Exchanges ─────────────────────────────────────────────────────────────

  async fn recent_exchanges(&self, user_id: &str, limit: usize) -> Result<Vec<ChatExchange>> {
    let user_id   = user_id.to_owned();
    let limit_val = i64::try_from(limit).unwrap_or(i64::MAX);

    let raws: Vec<RawExchange> = self
      .conn
      .call(move |conn| {
        // rowid breaks ties between exchanges recorded in the same microsecond.
        let mut stmt = conn.prepare(
          "SELECT exchange_id, user_id, question, answer, intent, created_at
           FROM chat_exchanges
           WHERE user_id = ?1
           ORDER BY created_at DESC, rowid DESC
           LIMIT ?2",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![user_id, limit_val], RawExchange::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawExchange::into_exchange).collect()
  }

  async fn record_exchange(&self, input: NewExchange) -> Result<ChatExchange> {
    let exchange = ChatExchange {
      exchange_id: Uuid::new_v4(),
      user_id:     input.user_id,
      question:    input.question,
      answer:      input.answer,
      intent:      input.intent,
      created_at:  Utc::now(),
    };

    let id_str   = encode_uuid(exchange.exchange_id);
    let user_id  = exchange.user_id.clone();
    let question = exchange.question.clone();
    let answer   = exchange.answer.clone();
    let intent   = exchange.intent.clone();
    let at_str   = encode_dt(exchange.created_at);

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT INTO chat_exchanges (
             exchange_id, user_id, question, answer, intent, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![id_str, user_id, question, answer, intent, at_str],
        )?;
        tx.commit()?;
        Ok(())
      })
      .await?;

    tracing::debug!(exchange_id = %exchange.exchange_id, "recorded exchange");
    Ok(exchange)
  }

  // ── Preferences ───────────────────────────────────────────────────────────

  async fn preference(&self, user_id: &str, key: &str) -> Result<Option<UserPreference>> {
    let user_id = user_id.to_owned();
    let key     = key.to_owned();

    Ok(
      self
        .conn
        .call(move |conn| {
          Ok(conn
            .query_row(
              "SELECT user_id, question, answer
               FROM user_profile_preferences
               WHERE user_id = ?1 AND question = ?2",
              rusqlite::params![user_id, key],
              |row| {
                Ok(UserPreference {
                  user_id:  row.get(0)?,
                  question: row.get(1)?,
                  answer:   row.get(2)?,
                })
              },
            )
            .optional()?)
        })
        .await?,
    )
  }

  // ── FAQ ───────────────────────────────────────────────────────────────────

  async fn list_faqs(&self) -> Result<Vec<FaqEntry>> {
    Ok(
      self
        .conn
        .call(|conn| {
          let mut stmt = conn.prepare(
            "SELECT faq_id, question, answer FROM faq_questions ORDER BY faq_id",
          )?;
          let rows = stmt
            .query_map([], |row| {
              Ok(FaqEntry {
                faq_id:   row.get(0)?,
                question: row.get(1)?,
                answer:   row.get(2)?,
              })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
          Ok(rows)
        })
        .await?,
    )
  }
}
