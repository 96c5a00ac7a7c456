//! QuestStore - sealed persistence for small records
//!
//! Stores one serde value per file, encrypted and authenticated with a key
//! derived from an operator-supplied secret. A blob that was edited, truncated
//! or written under a different secret never decodes: `load` reports it as
//! absent and the caller starts over.
//!
//! # Layout
//!
//! ```text
//! state.bin
//! ├── magic   "QST1"        4 bytes
//! ├── nonce                12 bytes
//! └── ciphertext + tag     n + 16 bytes
//! ```
//!
//! # Example
//!
//! ```ignore
//! use queststore::{Secret, SealedStore};
//!
//! let secret = Secret::from_env_file("~/.config/bashquest/env")?;
//! let store = SealedStore::new(&secret);
//! store.save(&record, &path)?;
//! let back: Option<Record> = store.load(&path);
//! ```

mod secret;
mod store;

pub use secret::{Secret, SecretError};
pub use store::{MAGIC, SealedStore, StoreError};

/// Name of the env-file entry holding the secret
pub const SECRET_KEY_VAR: &str = "SECRET_KEY";
