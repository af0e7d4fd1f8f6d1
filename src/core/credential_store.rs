// src/core/credential_store.rs
use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::core::session_store::Credential;
use crate::error::Result;

/// Persists the bearer credential across process restarts.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn get(&self) -> Result<Option<Credential>>;

    async fn set(&self, credential: &Credential) -> Result<()>;

    async fn clear(&self) -> Result<()>;
}

/// Process-local store, forgets everything on exit
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    slot: Mutex<Option<Credential>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credential(credential: Credential) -> Self {
        Self {
            slot: Mutex::new(Some(credential)),
        }
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn get(&self) -> Result<Option<Credential>> {
        Ok(self.slot.lock().await.clone())
    }

    async fn set(&self, credential: &Credential) -> Result<()> {
        *self.slot.lock().await = Some(credential.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        *self.slot.lock().await = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_set_get_clear() {
        let store = MemoryCredentialStore::new();
        assert_eq!(store.get().await.unwrap(), None);

        store.set(&Credential::new("abc")).await.unwrap();
        assert_eq!(store.get().await.unwrap(), Some(Credential::new("abc")));

        store.clear().await.unwrap();
        assert_eq!(store.get().await.unwrap(), None);
    }
}
