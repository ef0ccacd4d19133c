use async_trait::async_trait;
use sha2::{Digest, Sha256};

use crate::Result;

/// Stores request text somewhere and returns the id clients send instead.
///
/// Ids must be stable: the same text always yields the same id.
#[async_trait]
pub trait Persister: Send + Sync {
    async fn persist(&self, text: &str) -> Result<String>;
}

/// Persists nothing; the id is the SHA-256 of the text.
#[derive(Debug, Default, Clone, Copy)]
pub struct DigestPersister;

#[async_trait]
impl Persister for DigestPersister {
    async fn persist(&self, text: &str) -> Result<String> {
        Ok(format!("{:x}", Sha256::digest(text.as_bytes())))
    }
}
