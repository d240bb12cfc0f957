//! Embedding blob codec and similarity scoring.

use crate::{Error, Result};

pub fn encode_blob(vector: &[f32]) -> Vec<u8> {
  let mut bytes = Vec::with_capacity(std::mem::size_of_val(vector));
  for &value in vector {
    bytes.extend_from_slice(&value.to_le_bytes());
  }
  bytes
}

/// Decode a stored blob. `dimension` is the raw column value, so negative or
/// oversized values are rejected rather than cast.
pub fn decode_blob(blob: &[u8], dimension: i64) -> Result<Vec<f32>> {
  let expected = usize::try_from(dimension)
    .ok()
    .and_then(|d| d.checked_mul(std::mem::size_of::<f32>()))
    .ok_or_else(|| Error::InvalidVector(format!("bad dimension {dimension}")))?;
  if blob.len() != expected {
    return Err(Error::InvalidVector(format!(
      "expected {expected} bytes, got {}",
      blob.len()
    )));
  }
  Ok(
    blob
      .chunks_exact(4)
      .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
      .collect(),
  )
}

/// Cosine similarity, or `None` when the vectors are incomparable (length
/// mismatch, empty, or zero norm).
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Option<f32> {
  if a.len() != b.len() || a.is_empty() {
    return None;
  }

  let mut dot = 0.0f64;
  let mut norm_a = 0.0f64;
  let mut norm_b = 0.0f64;
  for (&x, &y) in a.iter().zip(b) {
    let (x, y) = (f64::from(x), f64::from(y));
    dot += x * y;
    norm_a += x * x;
    norm_b += y * y;
  }
  let denom = norm_a.sqrt() * norm_b.sqrt();
  if denom <= f64::EPSILON {
    return None;
  }
  Some((dot / denom) as f32)
}
