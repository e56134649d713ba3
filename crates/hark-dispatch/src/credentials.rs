//! Credential resolution.
//!
//! [`CredentialResolver`] maps an opaque credential id to decrypted secret
//! fields. [`FileCredentialStore`] is the local implementation: a JSON file
//! (`~/.hark/credentials.json` by default) written with 0o600 permissions.
//!
//! ```json
//! {
//!   "version": 1,
//!   "credentials": {
//!     "cred-1": { "name": "team AssemblyAI", "data": { "assemblyAIApiKey": "..." } }
//!   }
//! }
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use hark_core::{CredentialId, ResolvedCredential, RunContext};
use hark_settings::CredentialSettings;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::CredentialError;

/// Store format version this build reads and writes.
pub const STORE_VERSION: u32 = 1;

/// Resolves credential references for one dispatch.
#[async_trait]
pub trait CredentialResolver: Send + Sync {
    /// Fetch the secret fields stored under `id`.
    async fn resolve(
        &self,
        id: &CredentialId,
        ctx: &RunContext,
    ) -> Result<ResolvedCredential, CredentialError>;
}

/// On-disk credential file.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CredentialFile {
    /// Format version.
    pub version: u32,
    /// Stored credentials keyed by id.
    #[serde(default)]
    pub credentials: BTreeMap<String, StoredCredential>,
}

/// One stored credential.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StoredCredential {
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Secret fields.
    #[serde(default)]
    pub data: ResolvedCredential,
}

/// Credential store backed by a JSON file.
///
/// The file is re-read on every resolve so edits apply to the next dispatch
/// without a restart.
#[derive(Clone, Debug)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    /// Store at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the configured location.
    pub fn from_settings(settings: &CredentialSettings) -> Self {
        Self::new(settings.path.clone())
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the whole file. A missing file is an empty store.
    pub async fn load(&self) -> Result<CredentialFile, CredentialError> {
        let data = match tokio::fs::read_to_string(&self.path).await {
            Ok(d) => d,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "credential file not found, store is empty");
                return Ok(CredentialFile {
                    version: STORE_VERSION,
                    credentials: BTreeMap::new(),
                });
            }
            Err(e) => return Err(e.into()),
        };

        let file: CredentialFile = serde_json::from_str(&data)?;
        if file.version != STORE_VERSION {
            return Err(CredentialError::UnsupportedVersion(file.version));
        }
        Ok(file)
    }

    /// Insert or replace a credential, then rewrite the file.
    ///
    /// Creates parent directories if needed. Sets file permissions to 0o600.
    pub async fn save_credential(
        &self,
        id: &CredentialId,
        name: impl Into<String>,
        data: ResolvedCredential,
    ) -> Result<(), CredentialError> {
        let mut file = self.load().await?;
        let _ = file.credentials.insert(
            id.to_string(),
            StoredCredential {
                name: name.into(),
                data,
            },
        );

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string_pretty(&file)?;
        tokio::fs::write(&self.path, json).await?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            tokio::fs::set_permissions(&self.path, perms).await?;
        }

        Ok(())
    }
}

#[async_trait]
impl CredentialResolver for FileCredentialStore {
    async fn resolve(
        &self,
        id: &CredentialId,
        ctx: &RunContext,
    ) -> Result<ResolvedCredential, CredentialError> {
        let mut file = self.load().await?;
        let stored = file
            .credentials
            .remove(id.as_str())
            .ok_or_else(|| CredentialError::NotFound(id.clone()))?;
        debug!(
            credential_id = %id,
            flow_id = %ctx.flow_id,
            fields = ?stored.data,
            "credential resolved"
        );
        Ok(stored.data)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use hark_core::{ChatId, FlowId};

    fn ctx() -> RunContext {
        RunContext::new(FlowId::from("flow-1"), ChatId::from("chat-1"))
    }

    #[tokio::test]
    async fn save_then_resolve() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path().join("nested/credentials.json"));
        let id = CredentialId::from("cred-1");
        store
            .save_credential(
                &id,
                "team key",
                ResolvedCredential::empty().with_field("assemblyAIApiKey", "k"),
            )
            .await
            .unwrap();

        let cred = store.resolve(&id, &ctx()).await.unwrap();
        assert_eq!(cred.get("assemblyAIApiKey"), Some("k"));
        assert_eq!(cred.len(), 1);
    }

    #[tokio::test]
    async fn save_keeps_other_entries() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path().join("credentials.json"));
        let a = CredentialId::from("a");
        let b = CredentialId::from("b");
        store
            .save_credential(&a, "A", ResolvedCredential::empty().with_field("localAIApiKey", "1"))
            .await
            .unwrap();
        store
            .save_credential(&b, "B", ResolvedCredential::empty().with_field("localAIApiKey", "2"))
            .await
            .unwrap();

        let file = store.load().await.unwrap();
        assert_eq!(file.credentials.len(), 2);
        assert_eq!(file.credentials["a"].name, "A");
        assert_eq!(
            store.resolve(&a, &ctx()).await.unwrap().get("localAIApiKey"),
            Some("1")
        );
    }

    #[tokio::test]
    async fn unknown_id_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path().join("credentials.json"));
        let err = store
            .resolve(&CredentialId::from("ghost"), &ctx())
            .await
            .unwrap_err();
        assert_matches!(err, CredentialError::NotFound(id) if id.as_str() == "ghost");
    }

    #[tokio::test]
    async fn unsupported_version_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        std::fs::write(&path, r#"{"version": 2, "credentials": {}}"#).unwrap();
        let store = FileCredentialStore::new(&path);
        assert_matches!(
            store.resolve(&CredentialId::from("x"), &ctx()).await,
            Err(CredentialError::UnsupportedVersion(2))
        );
    }

    #[tokio::test]
    async fn corrupt_file_is_json_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        std::fs::write(&path, "{{{").unwrap();
        let store = FileCredentialStore::new(&path);
        assert_matches!(
            store.resolve(&CredentialId::from("x"), &ctx()).await,
            Err(CredentialError::Json(_))
        );
    }

    #[tokio::test]
    async fn edits_are_picked_up_without_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        let id = CredentialId::from("cred-1");
        std::fs::write(
            &path,
            r#"{"version":1,"credentials":{"cred-1":{"name":"n","data":{"localAIApiKey":"old"}}}}"#,
        )
        .unwrap();
        let store = FileCredentialStore::new(&path);
        assert_eq!(
            store.resolve(&id, &ctx()).await.unwrap().get("localAIApiKey"),
            Some("old")
        );

        std::fs::write(
            &path,
            r#"{"version":1,"credentials":{"cred-1":{"name":"n","data":{"localAIApiKey":"new"}}}}"#,
        )
        .unwrap();
        assert_eq!(
            store.resolve(&id, &ctx()).await.unwrap().get("localAIApiKey"),
            Some("new")
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn saved_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path().join("credentials.json"));
        store
            .save_credential(&CredentialId::from("c"), "c", ResolvedCredential::empty())
            .await
            .unwrap();
        let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn stored_credential_debug_hides_secrets() {
        let stored = StoredCredential {
            name: "n".into(),
            data: ResolvedCredential::empty().with_field("localAIApiKey", "hunter2"),
        };
        assert!(!format!("{stored:?}").contains("hunter2"));
    }
}
