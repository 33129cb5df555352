//! JSON document storage.
//!
//! Every document is a single file under the data directory and is always
//! read and written as a whole. Each document owns an async mutex: the
//! load-mutate-save cycle of [`Store::update`] runs entirely under it, so two
//! writers of the same document are serialized instead of overwriting each
//! other.

use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use serde::{Serialize, de::DeserializeOwned};
use tokio::{fs, sync::Mutex};
use uuid::Uuid;

use crate::ResultEngine;

/// The documents the engine persists.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Document {
    Users,
    Expenses,
    Budgets,
}

impl Document {
    pub fn file_name(self) -> &'static str {
        match self {
            Self::Users => "users.json",
            Self::Expenses => "expenses.json",
            Self::Budgets => "budgets.json",
        }
    }
}

#[derive(Debug)]
pub struct Store {
    root: PathBuf,
    users: Mutex<()>,
    expenses: Mutex<()>,
    budgets: Mutex<()>,
}

impl Store {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            users: Mutex::new(()),
            expenses: Mutex::new(()),
            budgets: Mutex::new(()),
        }
    }

    /// Directory holding the documents.
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path(&self, document: Document) -> PathBuf {
        self.root.join(document.file_name())
    }

    fn lock(&self, document: Document) -> &Mutex<()> {
        match document {
            Document::Users => &self.users,
            Document::Expenses => &self.expenses,
            Document::Budgets => &self.budgets,
        }
    }

    /// Returns `true` if the document has been written at least once.
    pub async fn exists(&self, document: Document) -> ResultEngine<bool> {
        Ok(fs::try_exists(self.path(document)).await?)
    }

    /// Loads a document without taking its lock. A missing file is an empty
    /// document.
    pub async fn load<T>(&self, document: Document) -> ResultEngine<T>
    where
        T: DeserializeOwned + Default,
    {
        let path = self.path(document);
        let content = match fs::read(&path).await {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(T::default()),
            Err(err) => {
                tracing::error!("failed to read {}: {err}", path.display());
                return Err(err.into());
            }
        };

        serde_json::from_slice(&content).map_err(|err| {
            tracing::error!("failed to parse {}: {err}", path.display());
            err.into()
        })
    }

    /// Saves a document without taking its lock.
    ///
    /// The content is written to a temporary sibling first and then renamed
    /// over the target, so a failed write never leaves a truncated document.
    pub async fn save<T>(&self, document: Document, data: &T) -> ResultEngine<()>
    where
        T: Serialize,
    {
        let payload = serde_json::to_vec_pretty(data)?;
        let path = self.path(document);
        let tmp = self
            .root
            .join(format!("{}.{}.tmp", document.file_name(), Uuid::new_v4()));

        let result: std::io::Result<()> = async {
            fs::create_dir_all(&self.root).await?;
            fs::write(&tmp, &payload).await?;
            fs::rename(&tmp, &path).await
        }
        .await;

        if let Err(err) = result {
            tracing::error!("failed to write {}: {err}", path.display());
            let _ = fs::remove_file(&tmp).await;
            return Err(err.into());
        }

        tracing::debug!("saved {}", path.display());
        Ok(())
    }

    /// Loads a document under its lock.
    pub async fn read<T>(&self, document: Document) -> ResultEngine<T>
    where
        T: DeserializeOwned + Default,
    {
        let _guard = self.lock(document).lock().await;
        self.load(document).await
    }

    /// Runs a full load-mutate-save cycle under the document lock.
    ///
    /// The document is saved only when `mutate` succeeds; on error nothing is
    /// written and the error is returned as is.
    pub async fn update<T, R, F>(&self, document: Document, mutate: F) -> ResultEngine<R>
    where
        T: DeserializeOwned + Serialize + Default,
        F: FnOnce(&mut T) -> ResultEngine<R>,
    {
        let _guard = self.lock(document).lock().await;
        let mut data: T = self.load(document).await?;
        let result = mutate(&mut data)?;
        self.save(document, &data).await?;
        Ok(result)
    }
}
