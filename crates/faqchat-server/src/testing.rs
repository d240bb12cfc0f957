//! In-memory doubles for the collaborator traits.

use std::sync::{
  Mutex,
  atomic::{AtomicUsize, Ordering},
};

use chrono::{Duration, Utc};
use faqchat_core::{
  exchange::{ChatExchange, NewExchange},
  faq::{FaqEntry, FaqMatch},
  preference::UserPreference,
  prompt::Prompt,
  provider::{SimilaritySearch, TextGeneration},
  store::ChatStore,
};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
#[error("{0}")]
pub struct StubError(pub String);

// ─── Store ───────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct MemoryStore {
  exchanges:    Mutex<Vec<ChatExchange>>,
  preferences:  Mutex<Vec<UserPreference>>,
  faqs:         Vec<FaqEntry>,
  fail_writes:  bool,
  faq_requests: AtomicUsize,
}

impl MemoryStore {
  pub fn with_faqs(n: usize) -> Self {
    let faqs = (1..=n as i64)
      .map(|id| FaqEntry {
        faq_id:   id,
        question: format!("question {id}"),
        answer:   format!("answer {id}"),
      })
      .collect();
    Self { faqs, ..Self::default() }
  }

  pub fn failing_writes() -> Self { Self { fail_writes: true, ..Self::default() } }

  /// Record `n` exchanges `q1/a1 … qn/an`, one minute apart, oldest first.
  pub fn seed_exchanges(&self, user_id: &str, n: usize) {
    let start = Utc::now() - Duration::hours(1);
    let mut exchanges = self.exchanges.lock().unwrap();
    for i in 1..=n {
      exchanges.push(ChatExchange {
        exchange_id: Uuid::new_v4(),
        user_id:     user_id.to_owned(),
        question:    format!("q{i}"),
        answer:      format!("a{i}"),
        intent:      String::new(),
        created_at:  start + Duration::minutes(i as i64),
      });
    }
  }

  pub fn set_preference(&self, user_id: &str, key: &str, answer: &str) {
    self.preferences.lock().unwrap().push(UserPreference {
      user_id:  user_id.to_owned(),
      question: key.to_owned(),
      answer:   answer.to_owned(),
    });
  }

  /// Every exchange for `user_id`, in insertion order.
  pub fn exchanges_for(&self, user_id: &str) -> Vec<ChatExchange> {
    self
      .exchanges
      .lock()
      .unwrap()
      .iter()
      .filter(|e| e.user_id == user_id)
      .cloned()
      .collect()
  }

  pub fn faq_requests(&self) -> usize { self.faq_requests.load(Ordering::SeqCst) }
}

impl ChatStore for MemoryStore {
  type Error = StubError;

  async fn recent_exchanges(
    &self,
    user_id: &str,
    limit: usize,
  ) -> Result<Vec<ChatExchange>, StubError> {
    Ok(self.exchanges_for(user_id).into_iter().rev().take(limit).collect())
  }

  async fn record_exchange(&self, input: NewExchange) -> Result<ChatExchange, StubError> {
    if self.fail_writes {
      return Err(StubError("disk full".into()));
    }
    let exchange = ChatExchange {
      exchange_id: Uuid::new_v4(),
      user_id:     input.user_id,
      question:    input.question,
      answer:      input.answer,
      intent:      input.intent,
      created_at:  Utc::now(),
    };
    self.exchanges.lock().unwrap().push(exchange.clone());
    Ok(exchange)
  }

  async fn preference(
    &self,
    user_id: &str,
    key: &str,
  ) -> Result<Option<UserPreference>, StubError> {
    Ok(
      self
        .preferences
        .lock()
        .unwrap()
        .iter()
        .find(|p| p.user_id == user_id && p.question == key)
        .cloned(),
    )
  }

  async fn list_faqs(&self) -> Result<Vec<FaqEntry>, StubError> {
    self.faq_requests.fetch_add(1, Ordering::SeqCst);
    Ok(self.faqs.clone())
  }
}

// ─── Index ───────────────────────────────────────────────────────────────────

#[derive(Default, Clone, Copy, PartialEq, Eq)]
enum Behaviour {
  #[default]
  Answer,
  Fail,
  Hang,
}

#[derive(Default)]
pub struct StubIndex {
  behaviour:   Behaviour,
  matches:     Vec<FaqMatch>,
  count:       Mutex<usize>,
  fingerprint: Mutex<Option<String>>,
  bulk_calls:  Mutex<Vec<Vec<i64>>>,
  clear_calls: AtomicUsize,
  queried_k:   Mutex<Option<usize>>,
}

impl StubIndex {
  pub fn with_matches(matches: Vec<FaqMatch>) -> Self { Self { matches, ..Self::default() } }

  pub fn failing() -> Self { Self { behaviour: Behaviour::Fail, ..Self::default() } }

  pub fn hanging() -> Self { Self { behaviour: Behaviour::Hang, ..Self::default() } }

  /// An index that already reports `count` entries.
  pub fn populated(count: usize, fingerprint: Option<&str>) -> Self {
    Self {
      count: Mutex::new(count),
      fingerprint: Mutex::new(fingerprint.map(str::to_owned)),
      ..Self::default()
    }
  }

  /// The `faq_id`s passed to each `bulk_insert` call.
  pub fn bulk_calls(&self) -> Vec<Vec<i64>> { self.bulk_calls.lock().unwrap().clone() }

  pub fn clear_calls(&self) -> usize { self.clear_calls.load(Ordering::SeqCst) }

  pub fn queried_k(&self) -> Option<usize> { *self.queried_k.lock().unwrap() }

  pub fn stored_fingerprint(&self) -> Option<String> { self.fingerprint.lock().unwrap().clone() }
}

impl SimilaritySearch for StubIndex {
  type Error = StubError;

  async fn count(&self) -> Result<usize, StubError> { Ok(*self.count.lock().unwrap()) }

  async fn query(&self, _text: &str, k: usize) -> Result<Vec<FaqMatch>, StubError> {
    *self.queried_k.lock().unwrap() = Some(k);
    match self.behaviour {
      Behaviour::Answer => Ok(self.matches.iter().take(k).cloned().collect()),
      Behaviour::Fail => Err(StubError("index unavailable".into())),
      Behaviour::Hang => std::future::pending().await,
    }
  }

  async fn bulk_insert(&self, entries: &[FaqEntry]) -> Result<(), StubError> {
    self
      .bulk_calls
      .lock()
      .unwrap()
      .push(entries.iter().map(|e| e.faq_id).collect());
    *self.count.lock().unwrap() += entries.len();
    Ok(())
  }

  async fn clear(&self) -> Result<(), StubError> {
    self.clear_calls.fetch_add(1, Ordering::SeqCst);
    *self.count.lock().unwrap() = 0;
    *self.fingerprint.lock().unwrap() = None;
    Ok(())
  }

  async fn fingerprint(&self) -> Result<Option<String>, StubError> {
    Ok(self.fingerprint.lock().unwrap().clone())
  }

  async fn set_fingerprint(&self, fingerprint: &str) -> Result<(), StubError> {
    *self.fingerprint.lock().unwrap() = Some(fingerprint.to_owned());
    Ok(())
  }
}

// ─── Generator ───────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct StubGenerator {
  behaviour: Behaviour,
  reply:     String,
  prompts:   Mutex<Vec<Prompt>>,
}

impl StubGenerator {
  pub fn answering(reply: &str) -> Self { Self { reply: reply.to_owned(), ..Self::default() } }

  pub fn failing() -> Self { Self { behaviour: Behaviour::Fail, ..Self::default() } }

  pub fn hanging() -> Self { Self { behaviour: Behaviour::Hang, ..Self::default() } }

  pub fn last_prompt(&self) -> Option<Prompt> { self.prompts.lock().unwrap().last().cloned() }
}

impl TextGeneration for StubGenerator {
  type Error = StubError;

  async fn generate(&self, prompt: &Prompt) -> Result<String, StubError> {
    self.prompts.lock().unwrap().push(prompt.clone());
    match self.behaviour {
      Behaviour::Answer => Ok(self.reply.clone()),
      Behaviour::Fail => Err(StubError("model overloaded".into())),
      Behaviour::Hang => std::future::pending().await,
    }
  }
}
