//! JSON file-backed credential store.
//!
//! Only the auth state is persisted: the token pair and the identity it belongs to.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;
use transit_auth::{CredentialError, CredentialStore, Credentials, Identity};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PersistedSession {
    credentials: Credentials,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    identity: Option<Identity>,
}

pub struct FileCredentialStore {
    path: PathBuf,
    state: RwLock<Option<PersistedSession>>,
    /// Serializes file writes.
    write_lock: Mutex<()>,
}

impl FileCredentialStore {
    /// Open the store at `path`, restoring whatever was saved there.
    ///
    /// A missing file is an empty store; a restored pair is not validated.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, CredentialError> {
        let path = path.into();
        let state = match tokio::fs::read(&path).await {
            Ok(bytes) => Some(serde_json::from_slice::<PersistedSession>(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => return Err(e.into()),
        };

        debug!(path = %path.display(), restored = state.is_some(), "Opened credential store");
        Ok(Self {
            path,
            state: RwLock::new(state),
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `bytes` to disk, or remove the file when `None`.
    ///
    /// Callers hold `write_lock` and only update `state` once this succeeded.
    async fn persist(&self, bytes: Option<&[u8]>) -> Result<(), CredentialError> {
        let Some(bytes) = bytes else {
            return match tokio::fs::remove_file(&self.path).await {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(e.into()),
            };
        };

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        // Write-then-rename so a crash never leaves a torn file behind.
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| CredentialError::Persistence(format!("{}: {e}", self.path.display())))
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn get(&self) -> Option<Credentials> {
        self.state.read().as_ref().map(|s| s.credentials.clone())
    }

    async fn identity(&self) -> Option<Identity> {
        self.state.read().as_ref().and_then(|s| s.identity.clone())
    }

    async fn set(
        &self,
        credentials: Credentials,
        identity: Option<Identity>,
    ) -> Result<(), CredentialError> {
        credentials.validate()?;
        let session = PersistedSession {
            credentials,
            identity,
        };

        let _guard = self.write_lock.lock().await;
        let bytes = serde_json::to_vec_pretty(&session)?;
        self.persist(Some(&bytes)).await?;
        *self.state.write() = Some(session);
        Ok(())
    }

    async fn clear(&self) -> Result<(), CredentialError> {
        let _guard = self.write_lock.lock().await;
        self.persist(None).await?;
        self.state.write().take();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> Identity {
        Identity {
            id: 1,
            username: "emilys".to_string(),
            first_name: "Emily".to_string(),
            last_name: "Johnson".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn missing_file_is_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::open(dir.path().join("credentials.json"))
            .await
            .unwrap();
        assert!(store.get().await.is_none());
        assert!(store.identity().await.is_none());
    }

    #[tokio::test]
    async fn credentials_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("credentials.json");

        let store = FileCredentialStore::open(&path).await.unwrap();
        store
            .set(Credentials::new("A1", "R1").unwrap(), Some(identity()))
            .await
            .unwrap();

        let reopened = FileCredentialStore::open(&path).await.unwrap();
        assert_eq!(reopened.get().await, Some(Credentials::new("A1", "R1").unwrap()));
        assert_eq!(reopened.identity().await, Some(identity()));
    }

    #[tokio::test]
    async fn file_uses_wire_field_names() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        let store = FileCredentialStore::open(&path).await.unwrap();
        store
            .set(Credentials::new("A1", "R1").unwrap(), None)
            .await
            .unwrap();

        let saved: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(saved["credentials"]["accessToken"], "A1");
        assert_eq!(saved["credentials"]["refreshToken"], "R1");
        assert!(saved.get("identity").is_none());
    }

    #[tokio::test]
    async fn clear_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        let store = FileCredentialStore::open(&path).await.unwrap();
        store
            .set(Credentials::new("A1", "R1").unwrap(), Some(identity()))
            .await
            .unwrap();

        store.clear().await.unwrap();
        assert!(!path.exists());
        assert!(store.get().await.is_none());

        // Clearing twice is fine.
        store.clear().await.unwrap();
    }

    #[tokio::test]
    async fn failed_write_keeps_previous_pair() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        let store = FileCredentialStore::open(&path).await.unwrap();
        store
            .set(Credentials::new("A1", "R1").unwrap(), Some(identity()))
            .await
            .unwrap();

        // A directory in place of the temp file makes the write fail.
        std::fs::create_dir(dir.path().join("credentials.json.tmp")).unwrap();

        let result = store
            .set(Credentials::new("A2", "R2").unwrap(), Some(identity()))
            .await;
        assert!(result.is_err());
        assert_eq!(store.get().await, Some(Credentials::new("A1", "R1").unwrap()));

        let reopened = FileCredentialStore::open(&path).await.unwrap();
        assert_eq!(reopened.get().await, store.get().await);
    }

    #[tokio::test]
    async fn failed_first_write_leaves_store_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        let store = FileCredentialStore::open(&path).await.unwrap();
        std::fs::create_dir(dir.path().join("credentials.json.tmp")).unwrap();

        assert!(
            store
                .set(Credentials::new("A1", "R1").unwrap(), None)
                .await
                .is_err()
        );
        assert!(store.get().await.is_none());
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn concurrent_writes_match_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        let store = std::sync::Arc::new(FileCredentialStore::open(&path).await.unwrap());

        let mut tasks = Vec::new();
        for i in 0..8 {
            let store = store.clone();
            tasks.push(tokio::spawn(async move {
                let pair = Credentials::new(format!("A{i}"), format!("R{i}")).unwrap();
                store.set(pair, None).await.unwrap();
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        let reopened = FileCredentialStore::open(&path).await.unwrap();
        assert_eq!(reopened.get().await, store.get().await);
    }

    #[tokio::test]
    async fn partial_pair_is_rejected_and_not_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        let store = FileCredentialStore::open(&path).await.unwrap();

        let partial = Credentials {
            access_token: "A1".to_string(),
            refresh_token: String::new(),
        };
        assert!(store.set(partial, None).await.is_err());
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn restored_partial_pair_is_kept_as_is() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        std::fs::write(
            &path,
            r#"{"credentials":{"accessToken":"A1","refreshToken":""}}"#,
        )
        .unwrap();

        let store = FileCredentialStore::open(&path).await.unwrap();
        let credentials = store.get().await.unwrap();
        assert!(credentials.has_access_token());
        assert!(!credentials.has_refresh_token());
    }

    #[tokio::test]
    async fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        std::fs::write(&path, "not json").unwrap();

        assert!(matches!(
            FileCredentialStore::open(&path).await,
            Err(CredentialError::JsonError(_))
        ));
    }
}
