//! Sealed blob store

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use chacha20poly1305::aead::{Aead, AeadCore, KeyInit, OsRng, Payload};
use chacha20poly1305::{ChaCha20Poly1305, Key, Nonce};
use serde::Serialize;
use serde::de::DeserializeOwned;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::{debug, warn};

use crate::Secret;

/// Leading bytes of every blob; also bound in as associated data
pub const MAGIC: &[u8; 4] = b"QST1";

const NONCE_LEN: usize = 12;
const KEY_CONTEXT: &[u8] = b"queststore.v1.record-key";

/// Errors that can occur while writing a blob
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to serialize record: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to encrypt record")]
    Encrypt,

    #[error("Failed to write {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Reason a blob was rejected (only ever logged)
#[derive(Debug, Error)]
enum OpenError {
    #[error("blob too short ({0} bytes)")]
    Truncated(usize),

    #[error("unknown blob header")]
    BadMagic,

    #[error("authentication failed")]
    Unauthentic,

    #[error("schema mismatch: {0}")]
    Schema(#[from] serde_json::Error),
}

/// Encrypting store keyed by a [`Secret`]
#[derive(Clone)]
pub struct SealedStore {
    cipher: ChaCha20Poly1305,
}

impl fmt::Debug for SealedStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SealedStore").finish_non_exhaustive()
    }
}

impl SealedStore {
    pub fn new(secret: &Secret) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(KEY_CONTEXT);
        hasher.update(secret.as_bytes());
        let key = hasher.finalize();
        Self {
            cipher: ChaCha20Poly1305::new(Key::from_slice(&key)),
        }
    }

    /// Serialize, seal and atomically write `value` to `path`
    pub fn save<T: Serialize>(&self, value: &T, path: &Path) -> Result<(), StoreError> {
        debug!(?path, "SealedStore::save: called");
        let plain = serde_json::to_vec(value)?;
        let blob = self.seal(&plain)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| StoreError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let tmp = path.with_extension("tmp");
        fs::write(&tmp, &blob)
            .and_then(|_| fs::rename(&tmp, path))
            .map_err(|source| StoreError::Write {
                path: path.to_path_buf(),
                source,
            })?;

        debug!(?path, bytes = blob.len(), "SealedStore::save: written");
        Ok(())
    }

    /// Read and open a blob; any failure reads as "nothing stored"
    pub fn load<T: DeserializeOwned>(&self, path: &Path) -> Option<T> {
        debug!(?path, "SealedStore::load: called");
        let blob = match fs::read(path) {
            Ok(blob) => blob,
            Err(e) => {
                debug!(?path, error = %e, "SealedStore::load: no readable blob");
                return None;
            }
        };

        match self.open(&blob) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(?path, error = %e, "Discarding unreadable state blob");
                None
            }
        }
    }

    pub fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    /// Delete a blob; a missing file is not an error
    pub fn remove(&self, path: &Path) {
        debug!(?path, "SealedStore::remove: called");
        if let Err(e) = fs::remove_file(path)
            && e.kind() != std::io::ErrorKind::NotFound
        {
            warn!(?path, error = %e, "Failed to remove state blob");
        }
    }

    fn seal(&self, plain: &[u8]) -> Result<Vec<u8>, StoreError> {
        let nonce = ChaCha20Poly1305::generate_nonce(&mut OsRng);
        let ciphertext = self
            .cipher
            .encrypt(&nonce, Payload { msg: plain, aad: MAGIC })
            .map_err(|_| StoreError::Encrypt)?;

        let mut blob = Vec::with_capacity(MAGIC.len() + NONCE_LEN + ciphertext.len());
        blob.extend_from_slice(MAGIC);
        blob.extend_from_slice(&nonce);
        blob.extend_from_slice(&ciphertext);
        Ok(blob)
    }

    fn open<T: DeserializeOwned>(&self, blob: &[u8]) -> Result<T, OpenError> {
        if blob.len() < MAGIC.len() + NONCE_LEN {
            return Err(OpenError::Truncated(blob.len()));
        }
        let (magic, rest) = blob.split_at(MAGIC.len());
        if magic != MAGIC {
            return Err(OpenError::BadMagic);
        }
        let (nonce, ciphertext) = rest.split_at(NONCE_LEN);

        let plain = self
            .cipher
            .decrypt(Nonce::from_slice(nonce), Payload { msg: ciphertext, aad: MAGIC })
            .map_err(|_| OpenError::Unauthentic)?;

        Ok(serde_json::from_slice(&plain)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde::Deserialize;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Sample {
        index: usize,
        name: String,
        extra: BTreeMap<String, Vec<u8>>,
    }

    fn sample() -> Sample {
        let mut extra = BTreeMap::new();
        extra.insert("flag_hash".to_string(), vec![1, 2, 3, 250]);
        Sample {
            index: 3,
            name: "workspace".to_string(),
            extra,
        }
    }

    fn store() -> SealedStore {
        SealedStore::new(&Secret::new("test-secret"))
    }

    #[test]
    fn test_save_and_load() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("state.bin");

        store().save(&sample(), &path).unwrap();
        let back: Option<Sample> = store().load(&path);

        assert_eq!(back, Some(sample()));
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn test_blob_is_not_plaintext() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("state.bin");

        store().save(&sample(), &path).unwrap();
        let raw = fs::read(&path).unwrap();

        assert!(raw.starts_with(MAGIC));
        let text = String::from_utf8_lossy(&raw);
        assert!(!text.contains("workspace"));
        assert!(!text.contains("flag_hash"));
    }

    #[test]
    fn test_missing_file_is_none() {
        let temp = TempDir::new().unwrap();
        let back: Option<Sample> = store().load(&temp.path().join("absent.bin"));
        assert!(back.is_none());
    }

    #[test]
    fn test_wrong_secret_is_none() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("state.bin");
        store().save(&sample(), &path).unwrap();

        let other = SealedStore::new(&Secret::new("another-secret"));
        let back: Option<Sample> = other.load(&path);
        assert!(back.is_none());
    }

    #[test]
    fn test_truncated_blob_is_none() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("state.bin");
        fs::write(&path, b"QST1abc").unwrap();

        let back: Option<Sample> = store().load(&path);
        assert!(back.is_none());
    }

    #[test]
    fn test_schema_mismatch_is_none() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("state.bin");
        store().save(&vec!["not", "a", "sample"], &path).unwrap();

        let back: Option<Sample> = store().load(&path);
        assert!(back.is_none());
    }

    #[test]
    fn test_remove_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("state.bin");
        store().save(&sample(), &path).unwrap();
        assert!(store().exists(&path));

        store().remove(&path);
        store().remove(&path);
        assert!(!store().exists(&path));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_flipped_byte_never_loads(seed in any::<usize>(), mask in 1u8..=255) {
            let temp = TempDir::new().unwrap();
            let path = temp.path().join("state.bin");
            store().save(&sample(), &path).unwrap();

            let mut raw = fs::read(&path).unwrap();
            let at = seed % raw.len();
            raw[at] ^= mask;
            fs::write(&path, &raw).unwrap();

            let back: Option<Sample> = store().load(&path);
            prop_assert!(back.is_none());
        }

        #[test]
        fn prop_round_trip(
            index in 0usize..1000,
            name in "[a-z/]{0,40}",
            extra in proptest::collection::btree_map("[a-z_]{1,12}", proptest::collection::vec(any::<u8>(), 0..48), 0..8),
        ) {
            let temp = TempDir::new().unwrap();
            let path = temp.path().join("state.bin");
            let value = Sample { index, name, extra };

            store().save(&value, &path).unwrap();
            let back: Option<Sample> = store().load(&path);
            prop_assert_eq!(back, Some(value));
        }
    }
}
