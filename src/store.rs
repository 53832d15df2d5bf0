//! Session Store
//!
//! Key-value persistence for session state. Values are JSON documents stored under
//! session-scoped keys.

use std::sync::{Mutex, PoisonError};

use rustc_hash::FxHashMap;
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;

/// Errors raised by a session store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Value could not be encoded or decoded
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// The backing store failed
    #[error("session store unavailable: {0}")]
    Backend(String),
}

/// Synchronous key-value store holding serialized session state.
pub trait SessionStore: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the backend cannot be read.
    fn load(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Write `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the backend cannot be written.
    fn save(&self, key: &str, value: String) -> Result<(), StoreError>;

    /// Delete the value under `key`. Missing keys are not an error.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the backend cannot be written.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// In-process store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<FxHashMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether nothing is stored
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SessionStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        let values = self.values.lock().unwrap_or_else(PoisonError::into_inner);

        Ok(values.get(key).cloned())
    }

    fn save(&self, key: &str, value: String) -> Result<(), StoreError> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);

        values.insert(key.to_string(), value);

        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);

        values.remove(key);

        Ok(())
    }
}

impl<S: SessionStore + ?Sized> SessionStore for &S {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).load(key)
    }

    fn save(&self, key: &str, value: String) -> Result<(), StoreError> {
        (**self).save(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key)
    }
}

/// Key holding the serialized cart lines.
pub fn cart_key(session_id: &str) -> String {
    format!("{session_id}:cart")
}

/// Key holding the student verification flag.
pub fn student_verified_key(session_id: &str) -> String {
    format!("{session_id}:student_verified")
}

/// Key holding the loyalty point balance left after checkout.
pub fn points_balance_key(session_id: &str) -> String {
    format!("{session_id}:points_balance")
}

/// Serialize `value` as JSON and store it under `key`.
///
/// # Errors
///
/// Returns a [`StoreError`] if encoding or writing fails.
pub fn save_json<S, T>(store: &S, key: &str, value: &T) -> Result<(), StoreError>
where
    S: SessionStore + ?Sized,
    T: Serialize + ?Sized,
{
    let encoded = serde_json::to_string(value)?;

    store.save(key, encoded)
}

/// Load and decode the JSON value under `key`.
///
/// # Errors
///
/// Returns a [`StoreError`] if reading or decoding fails.
pub fn load_json<S, T>(store: &S, key: &str) -> Result<Option<T>, StoreError>
where
    S: SessionStore + ?Sized,
    T: DeserializeOwned,
{
    store
        .load(key)?
        .map(|raw| serde_json::from_str(&raw))
        .transpose()
        .map_err(StoreError::from)
}
