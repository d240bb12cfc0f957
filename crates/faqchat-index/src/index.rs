//! [`SqliteVectorIndex`] — the SQLite implementation of [`SimilaritySearch`].

use std::{cmp::Ordering, path::Path};

use rusqlite::OptionalExtension as _;

use faqchat_core::{
  faq::{FaqEntry, FaqMatch},
  provider::SimilaritySearch,
};

use crate::{
  embed::Embedder,
  schema::{FINGERPRINT_KEY, SCHEMA},
  vector::{cosine_similarity, decode_blob, encode_blob},
  Error, Result,
};

/// A stored vector row, before decoding.
struct RawVector {
  faq_id:    i64,
  question:  String,
  answer:    String,
  dimension: i64,
  embedding: Vec<u8>,
}

/// A FAQ vector index persisted in its own SQLite file.
///
/// Queries embed the text once and score it against every stored vector;
/// FAQ tables are small enough that an exhaustive scan is cheaper than
/// maintaining an ANN structure.
///
/// Cloning is cheap when `E` is — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteVectorIndex<E> {
  conn:     tokio_rusqlite::Connection,
  embedder: E,
}

impl<E: Embedder> SqliteVectorIndex<E> {
  /// Open (or create) an index at `path`.
  pub async fn open(path: impl AsRef<Path>, embedder: E) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let index = Self { conn, embedder };
    index.init_schema().await?;
    Ok(index)
  }

  /// Open an in-memory index — useful for testing.
  pub async fn open_in_memory(embedder: E) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let index = Self { conn, embedder };
    index.init_schema().await?;
    Ok(index)
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

  async fn load_vectors(&self) -> Result<Vec<RawVector>> {
    Ok(
      self
        .conn
        .call(|conn| {
          let mut stmt = conn.prepare(
            "SELECT faq_id, question, answer, dimension, embedding
             FROM faq_vectors ORDER BY faq_id",
          )?;
          let rows = stmt
            .query_map([], |row| {
              Ok(RawVector {
                faq_id:    row.get(0)?,
                question:  row.get(1)?,
                answer:    row.get(2)?,
                dimension: row.get(3)?,
                embedding: row.get(4)?,
              })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
          Ok(rows)
        })
        .await?,
    )
  }
}

// ─── SimilaritySearch impl ───────────────────────────────────────────────────

impl<E: Embedder> SimilaritySearch for SqliteVectorIndex<E> {
  type Error = Error;

  async fn count(&self) -> Result<usize> {
    let n: i64 = self
      .conn
      .call(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM faq_vectors", [], |r| r.get(0))?))
      .await?;
    Ok(n as usize)
  }

  async fn query(&self, text: &str, k: usize) -> Result<Vec<FaqMatch>> {
    if k == 0 {
      return Ok(Vec::new());
    }

    let raws = self.load_vectors().await?;
    if raws.is_empty() {
      return Ok(Vec::new());
    }

    let probe = self.embedder.embed(text).await?;

    let mut matches = Vec::with_capacity(raws.len());
    for raw in raws {
      let vector = decode_blob(&raw.embedding, raw.dimension)?;
      let Some(score) = cosine_similarity(&probe, &vector) else {
        tracing::warn!(
          faq_id = raw.faq_id,
          stored = vector.len(),
          probe = probe.len(),
          "skipping incomparable vector"
        );
        continue;
      };
      matches.push(FaqMatch {
        faq_id: raw.faq_id,
        question: raw.question,
        answer: raw.answer,
        score,
      });
    }

    // Best first; equal scores fall back to the lower faq_id.
    matches.sort_by(|a, b| {
      b.score
        .partial_cmp(&a.score)
        .unwrap_or(Ordering::Equal)
        .then(a.faq_id.cmp(&b.faq_id))
    });
    matches.truncate(k);
    Ok(matches)
  }

  async fn bulk_insert(&self, entries: &[FaqEntry]) -> Result<()> {
    if entries.is_empty() {
      return Ok(());
    }

    let texts: Vec<String> = entries.iter().map(|e| e.question.clone()).collect();
    let vectors = self.embedder.embed_batch(&texts).await?;
    if vectors.len() != entries.len() {
      return Err(Error::Embedding(format!(
        "embedded {} of {} entries",
        vectors.len(),
        entries.len()
      )));
    }

    let rows: Vec<(i64, String, String, i64, Vec<u8>)> = entries
      .iter()
      .zip(&vectors)
      .map(|(e, v)| {
        (e.faq_id, e.question.clone(), e.answer.clone(), v.len() as i64, encode_blob(v))
      })
      .collect();
    let inserted = rows.len();

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        {
          let mut stmt = tx.prepare(
            "INSERT OR REPLACE INTO faq_vectors
               (faq_id, question, answer, dimension, embedding)
             VALUES (?1, ?2, ?3, ?4, ?5)",
          )?;
          for (faq_id, question, answer, dimension, blob) in &rows {
            stmt.execute(rusqlite::params![faq_id, question, answer, dimension, blob])?;
          }
        }
        tx.commit()?;
        Ok(())
      })
      .await?;

    tracing::info!(inserted, "indexed FAQ entries");
    Ok(())
  }

  async fn clear(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM faq_vectors", [])?;
        tx.execute("DELETE FROM index_meta WHERE key = ?1", [FINGERPRINT_KEY])?;
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn fingerprint(&self) -> Result<Option<String>> {
    Ok(
      self
        .conn
        .call(|conn| {
          Ok(conn
            .query_row(
              "SELECT value FROM index_meta WHERE key = ?1",
              [FINGERPRINT_KEY],
              |r| r.get(0),
            )
            .optional()?)
        })
        .await?,
    )
  }

  async fn set_fingerprint(&self, fingerprint: &str) -> Result<()> {
    let value = fingerprint.to_owned();
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO index_meta (key, value) VALUES (?1, ?2)
           ON CONFLICT (key) DO UPDATE SET value = excluded.value",
          rusqlite::params![FINGERPRINT_KEY, value],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}
