//! Answer digests
//!
//! Flag challenges keep only a digest of the expected answer in the record.
//! The digest binds the answer to the operator secret, the challenge index and
//! the workspace path, so a digest copied from another challenge or another
//! workspace never verifies.

use queststore::Secret;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::record::Record;

/// Conventional record key for a sealed answer
pub const FLAG_HASH: &str = "flag_hash";

const DOMAIN: &[u8] = b"bashquest.flag.v1";

/// Computes and checks answer digests
#[derive(Clone)]
pub struct FlagSeal {
    secret: Secret,
}

impl std::fmt::Debug for FlagSeal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlagSeal").finish_non_exhaustive()
    }
}

impl FlagSeal {
    pub fn new(secret: &Secret) -> Self {
        Self { secret: secret.clone() }
    }

    /// Digest of `answer` in the context of `record`
    pub fn digest(&self, record: &Record, answer: &str) -> [u8; 32] {
        let secret = self.secret.as_bytes();
        let workspace = record.workspace.to_string_lossy();
        let index = u32::try_from(record.challenge_index).unwrap_or(u32::MAX);

        let mut hasher = Sha256::new();
        hasher.update(DOMAIN);
        hasher.update((secret.len() as u64).to_le_bytes());
        hasher.update(secret);
        hasher.update(index.to_le_bytes());
        hasher.update((workspace.len() as u64).to_le_bytes());
        hasher.update(workspace.as_bytes());
        hasher.update(answer.as_bytes());
        hasher.finalize().into()
    }

    /// Store the digest of `answer` under `key`
    pub fn seal(&self, record: &mut Record, key: &str, answer: &str) {
        debug!(%key, "FlagSeal::seal: called");
        let digest = self.digest(record, answer);
        record.set_bytes(key, digest.to_vec());
    }

    /// Check `answer` against the digest stored under `key`
    pub fn verify(&self, record: &Record, key: &str, answer: &str) -> bool {
        match record.bytes(key) {
            Some(stored) => stored == self.digest(record, answer).as_slice(),
            None => {
                debug!(%key, "FlagSeal::verify: no digest stored");
                false
            }
        }
    }
}
