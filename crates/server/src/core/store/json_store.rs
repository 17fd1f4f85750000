//! JSON document collections
//!
//! Each document is stored as `<dir>/<id>.json` using atomic writes
//! (write to `.tmp`, then rename). The whole collection is cached in memory
//! in storage order: creation time, then id.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// A record that can live in a [`JsonCollection`]
pub trait Document: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Directory name of the collection under the data root
    const COLLECTION: &'static str;

    fn id(&self) -> &str;
    fn created_at(&self) -> DateTime<Utc>;
}

pub struct JsonCollection<D> {
    dir: PathBuf,
    docs: RwLock<Vec<D>>,
}

impl<D: Document> JsonCollection<D> {
    /// Open (or create) the collection directory and load every document
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("Failed to create collection dir {:?}", dir))?;

        let docs = Self::load_existing(&dir).await?;
        info!(
            "[Store] Collection '{}' loaded with {} documents",
            D::COLLECTION,
            docs.len()
        );

        Ok(Self {
            dir,
            docs: RwLock::new(docs),
        })
    }

    fn doc_path(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", id))
    }

    async fn load_existing(dir: &Path) -> Result<Vec<D>> {
        let mut entries = fs::read_dir(dir).await?;
        let mut docs = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }
            match Self::load_doc(&path).await {
                Ok(doc) => docs.push(doc),
                Err(e) => warn!("Failed to load document from {:?}: {:#}", path, e),
            }
        }

        docs.sort_by(|a: &D, b: &D| {
            a.created_at()
                .cmp(&b.created_at())
                .then_with(|| a.id().cmp(b.id()))
        });
        Ok(docs)
    }

    async fn load_doc(path: &Path) -> Result<D> {
        let content = fs::read_to_string(path).await?;
        serde_json::from_str(&content).with_context(|| format!("Failed to parse {:?}", path))
    }

    async fn write_doc(&self, doc: &D) -> Result<()> {
        let path = self.doc_path(doc.id());
        let temp_path = path.with_extension("tmp");

        let json = serde_json::to_string_pretty(doc)?;
        fs::write(&temp_path, json)
            .await
            .with_context(|| format!("Failed to write {:?}", temp_path))?;
        fs::rename(&temp_path, &path)
            .await
            .with_context(|| format!("Failed to move {:?} into place", path))?;

        Ok(())
    }

    /// Every document in storage order
    pub async fn all(&self) -> Vec<D> {
        self.docs.read().await.clone()
    }

    /// Documents matching `predicate`, in storage order
    pub async fn find<F>(&self, predicate: F) -> Vec<D>
    where
        F: Fn(&D) -> bool,
    {
        self.docs
            .read()
            .await
            .iter()
            .filter(|doc| predicate(doc))
            .cloned()
            .collect()
    }

    pub async fn get(&self, id: &str) -> Option<D> {
        self.docs.read().await.iter().find(|d| d.id() == id).cloned()
    }

    pub async fn insert(&self, doc: D) -> Result<D> {
        let mut docs = self.docs.write().await;
        if docs.iter().any(|d| d.id() == doc.id()) {
            anyhow::bail!("Document {} already exists in {}", doc.id(), D::COLLECTION);
        }

        self.write_doc(&doc).await?;
        docs.push(doc.clone());
        debug!("[Store] Inserted {} into {}", doc.id(), D::COLLECTION);

        Ok(doc)
    }

    /// Read-modify-write a document under the collection lock.
    ///
    /// `apply` works on a copy; if it fails, nothing is written and the
    /// stored document is unchanged. Returns `Ok(None)` if the id is unknown.
    pub async fn update<F, E>(&self, id: &str, apply: F) -> std::result::Result<Option<D>, E>
    where
        F: FnOnce(&mut D) -> std::result::Result<(), E>,
        E: From<anyhow::Error>,
    {
        let mut docs = self.docs.write().await;
        let Some(slot) = docs.iter_mut().find(|d| d.id() == id) else {
            return Ok(None);
        };

        let mut updated = slot.clone();
        apply(&mut updated)?;

        self.write_doc(&updated).await?;
        *slot = updated.clone();
        Ok(Some(updated))
    }

    /// Remove a document, returning it if it existed
    pub async fn remove(&self, id: &str) -> Result<Option<D>> {
        let mut docs = self.docs.write().await;
        let Some(index) = docs.iter().position(|d| d.id() == id) else {
            return Ok(None);
        };

        match fs::remove_file(self.doc_path(id)).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("Document file for {} was already gone", id);
            }
            Err(e) => return Err(e).with_context(|| format!("Failed to delete {}", id)),
        }

        Ok(Some(docs.remove(index)))
    }
}
