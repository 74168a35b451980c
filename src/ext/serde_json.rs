// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Typed lookups into serde_json::Value fixtures keyed by shas, tags or numeric ids
// role: extension/serde_json
// outputs: JsonFetch trait and JsonFetched wrapper for typed extraction with defaults
// invariants: No panics; a missing key or a shape mismatch yields None (or T::default)
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use serde::de::DeserializeOwned;

/// A located fixture value, converted in a second step.
pub struct JsonFetched<'a> {
  inner: Option<&'a serde_json::Value>,
}

impl<'a> JsonFetched<'a> {
  pub fn to<T>(&self) -> Option<T>
  where
    T: DeserializeOwned,
  {
    self.inner.and_then(|v| T::deserialize(v).ok())
  }

  /// `T::default()` when absent or of the wrong shape.
  pub fn to_or_default<T>(&self) -> T
  where
    T: DeserializeOwned + Default,
  {
    self.to::<T>().unwrap_or_default()
  }
}

pub trait JsonFetch {
  /// The value itself, for array and object fixtures read whole.
  fn fetch(&self) -> JsonFetched<'_>;

  /// Single-level lookup; keys are taken literally (shas, "heads/x", "v1.2.0").
  fn fetch_key(&self, key: &str) -> JsonFetched<'_>;

  /// Lookup in an object keyed by decimal ids, e.g. `{"42": {...}}`.
  fn fetch_id(&self, id: u64) -> JsonFetched<'_> {
    self.fetch_key(&id.to_string())
  }
}

impl JsonFetch for serde_json::Value {
  fn fetch(&self) -> JsonFetched<'_> {
    JsonFetched { inner: Some(self) }
  }

  fn fetch_key(&self, key: &str) -> JsonFetched<'_> {
    JsonFetched { inner: self.as_object().and_then(|o| o.get(key)) }
  }
}
