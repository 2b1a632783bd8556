//! Embedded store for style and user records
//!
//! Records live as postcard-encoded documents in a fjall keyspace: the style
//! collection under a single key, users keyed by username. The surface is
//! plain find/insert/update/delete, no transactions. fjall calls are blocking,
//! so they run on the blocking pool.

use anyhow::{Result, anyhow};
use fjall::Keyspace;
use serde::{Serialize, de::DeserializeOwned};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task;
use uuid::Uuid;

use crate::models::{Style, User};

const STYLES_KEY: &str = "styles";
const USER_PREFIX: &str = "user/";

/// Handle to the record store. Cheap to clone; handed to request handlers
/// instead of living behind a process-wide singleton.
#[derive(Clone)]
pub struct Store {
    records: Keyspace,
    // Serializes read-modify-write of the style collection document.
    styles_lock: Arc<Mutex<()>>,
}

fn get_from_store(store: Keyspace, key: Vec<u8>) -> Result<Option<Vec<u8>>> {
    Ok(store.get(key)?.map(|v| v.to_vec()))
}

impl Store {
    /// Open (or create) the store at the given directory.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let db = fjall::Database::builder(&path).open()?;
        let records = db.keyspace("records", fjall::KeyspaceCreateOptions::default)?;
        Ok(Store {
            records,
            styles_lock: Arc::new(Mutex::new(())),
        })
    }

    async fn get_doc<T: DeserializeOwned + Send + 'static>(&self, key: &str) -> Result<Option<T>> {
        let store = self.records.clone();
        let key_bytes = key.as_bytes().to_vec();

        let maybe_bytes: Option<Vec<u8>> =
            task::spawn_blocking(move || get_from_store(store, key_bytes)).await??;

        match maybe_bytes {
            Some(bytes) => Ok(Some(postcard::from_bytes(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn put_doc<T: Serialize + Send + 'static>(&self, key: &str, value: T) -> Result<()> {
        let store = self.records.clone();
        let key = key.as_bytes().to_vec();
        let bytes = postcard::to_stdvec(&value)?;

        task::spawn_blocking(move || store.insert(key, bytes)).await??;
        Ok(())
    }

    async fn remove_doc(&self, key: &str) -> Result<()> {
        let store = self.records.clone();
        let key = key.as_bytes().to_vec();
        task::spawn_blocking(move || store.remove(key)).await??;
        Ok(())
    }

    /// All styles, in insertion order.
    #[tracing::instrument(name = "list_styles", level = "debug", skip(self))]
    pub async fn list_styles(&self) -> Result<Vec<Style>> {
        Ok(self.get_doc(STYLES_KEY).await?.unwrap_or_default())
    }

    /// Find one style by its identifier.
    pub async fn get_style(&self, id: Uuid) -> Result<Option<Style>> {
        let styles = self.list_styles().await?;
        Ok(styles.into_iter().find(|style| style.id == id))
    }

    /// Insert a new style and return it.
    #[tracing::instrument(name = "add_style", level = "debug", skip(self))]
    pub async fn add_style(&self, name: &str) -> Result<Style> {
        let _guard = self.styles_lock.lock().await;
        let mut styles = self.list_styles().await?;
        let style = Style::new(name);
        styles.push(style.clone());
        self.put_doc(STYLES_KEY, styles).await?;
        tracing::debug!("New style added: {}", style.name);
        Ok(style)
    }

    /// Rename an existing style. Returns false when the id is unknown.
    #[tracing::instrument(name = "update_style", level = "debug", skip(self))]
    pub async fn update_style(&self, id: Uuid, name: &str) -> Result<bool> {
        let _guard = self.styles_lock.lock().await;
        let mut styles = self.list_styles().await?;
        let Some(style) = styles.iter_mut().find(|style| style.id == id) else {
            return Ok(false);
        };
        style.name = name.to_string();
        self.put_doc(STYLES_KEY, styles).await?;
        tracing::debug!("Style edited");
        Ok(true)
    }

    /// Delete a style by id. Returns false when the id is unknown.
    #[tracing::instrument(name = "delete_style", level = "debug", skip(self))]
    pub async fn delete_style(&self, id: Uuid) -> Result<bool> {
        let _guard = self.styles_lock.lock().await;
        let mut styles = self.list_styles().await?;
        let before = styles.len();
        styles.retain(|style| style.id != id);
        if styles.len() == before {
            return Ok(false);
        }
        self.put_doc(STYLES_KEY, styles).await?;
        tracing::debug!("Style deleted: {id}");
        Ok(true)
    }

    /// Look up a user account by username.
    pub async fn find_user(&self, username: &str) -> Result<Option<User>> {
        if username.is_empty() {
            return Err(anyhow!("Username cannot be empty"));
        }
        self.get_doc(&format!("{USER_PREFIX}{username}")).await
    }

    /// Insert or replace a user account.
    pub async fn upsert_user(&self, user: User) -> Result<()> {
        if user.username.is_empty() {
            return Err(anyhow!("Username cannot be empty"));
        }
        let key = format!("{USER_PREFIX}{}", user.username);
        self.put_doc(&key, user).await
    }

    /// Remove a user account.
    pub async fn remove_user(&self, username: &str) -> Result<()> {
        self.remove_doc(&format!("{USER_PREFIX}{username}")).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use tempfile::TempDir;

    fn open_temp_store() -> (TempDir, Store) {
        let dir = TempDir::new().expect("temp dir");
        let store = Store::open(dir.path().join("records")).expect("open store");
        (dir, store)
    }

    #[tokio::test]
    async fn test_style_lifecycle() {
        let (_dir, store) = open_temp_store();

        assert!(store.list_styles().await.unwrap().is_empty());

        let casual = store.add_style("casual").await.unwrap();
        let formal = store.add_style("formal").await.unwrap();

        let styles = store.list_styles().await.unwrap();
        assert_eq!(styles.len(), 2);
        assert_eq!(styles[0].name, "casual");
        assert_eq!(styles[1].name, "formal");

        assert!(store.update_style(casual.id, "streetwear").await.unwrap());
        let updated = store.get_style(casual.id).await.unwrap().unwrap();
        assert_eq!(updated.name, "streetwear");

        assert!(store.delete_style(formal.id).await.unwrap());
        assert!(store.get_style(formal.id).await.unwrap().is_none());
        assert_eq!(store.list_styles().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_style_id() {
        let (_dir, store) = open_temp_store();
        let unknown = Uuid::new_v4();

        assert!(store.get_style(unknown).await.unwrap().is_none());
        assert!(!store.update_style(unknown, "anything").await.unwrap());
        assert!(!store.delete_style(unknown).await.unwrap());
    }

    #[tokio::test]
    async fn test_user_roundtrip() {
        let (_dir, store) = open_temp_store();

        assert!(store.find_user("admin").await.unwrap().is_none());

        store
            .upsert_user(User {
                username: "admin".to_string(),
                password_hash: "not-a-real-hash".to_string(),
                role: Role::Admin,
            })
            .await
            .unwrap();

        let user = store.find_user("admin").await.unwrap().unwrap();
        assert_eq!(user.username, "admin");
        assert_eq!(user.role, Role::Admin);

        store.remove_user("admin").await.unwrap();
        assert!(store.find_user("admin").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_empty_username_is_rejected() {
        let (_dir, store) = open_temp_store();
        assert!(store.find_user("").await.is_err());
    }
}
