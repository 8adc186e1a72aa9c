use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::sync::RwLock;

use crate::models::Document;

pub struct DocumentStorage {
    path: PathBuf,
    documents: RwLock<Vec<Document>>,
}

impl DocumentStorage {
    /// Loads the document collection from the given JSON file, starting empty
    /// if the file does not exist yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let documents = if Path::new(&path).exists() {
            let data = fs::read_to_string(&path)
                .context("Failed to read documents file")?;
            serde_json::from_str(&data)
                .context("Failed to parse documents file")?
        } else {
            Vec::new()
        };

        Ok(Self {
            path,
            documents: RwLock::new(documents),
        })
    }

    pub async fn add_document(&self, document: Document) -> Result<Document> {
        let mut documents = self.documents.write().await;
        documents.push(document.clone());
        self.save_to_disk(&documents)?;
        Ok(document)
    }

    /// Full scan of the collection, newest upload first. Each call re-reads
    /// the current store state.
    pub async fn list_all(&self) -> Result<Vec<Document>> {
        let documents = self.documents.read().await;

        let mut all: Vec<Document> = documents.clone();
        all.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at));
        Ok(all)
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Option<Document>> {
        let documents = self.documents.read().await;
        Ok(documents.iter().find(|d| d.id == id).cloned())
    }

    fn save_to_disk(&self, documents: &[Document]) -> Result<()> {
        let json = serde_json::to_string_pretty(documents)
            .context("Failed to serialize documents")?;
        fs::write(&self.path, json)
            .context("Failed to write to documents file")?;
        Ok(())
    }
}
