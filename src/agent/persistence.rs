//! Persistence hook and a file-backed history store.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::recovery::RecoveryData;
use crate::error::Result;
use crate::types::{LlmConfig, Message};
use crate::util::normalize_name;

/// Snapshot handed to the persistence hook after every memory mutation of
/// consequence (initial prompt, model response, tool results).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PersistenceParams {
    pub agent: String,
    pub messages: Vec<Message>,
    pub step: usize,
    /// The run input, `null` when the run had none.
    pub input: serde_json::Value,
    pub context: serde_json::Value,
    pub llm_config: LlmConfig,
}

/// Caller-supplied persistence callback. Failures are logged, never fatal.
pub type PersistenceHook = Arc<dyn Fn(PersistenceParams) -> BoxFuture<'static, Result<()>> + Send + Sync>;

/// Build a hook from an async closure.
pub fn persistence_hook<F, Fut>(f: F) -> PersistenceHook
where
    F: Fn(PersistenceParams) -> Fut + Send + Sync + 'static,
    Fut: std::future::Future<Output = Result<()>> + Send + 'static,
{
    Arc::new(move |params| Box::pin(f(params)))
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredSnapshot {
    saved_at: DateTime<Utc>,
    #[serde(flatten)]
    params: PersistenceParams,
}

/// Writes the latest snapshot of each agent to `{dir}/{agent}.json`.
#[derive(Debug, Clone)]
pub struct FileHistoryStore {
    dir: PathBuf,
}

impl FileHistoryStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, agent: &str) -> PathBuf {
        self.dir.join(format!("{}.json", normalize_name(agent)))
    }

    pub async fn save(&self, params: PersistenceParams) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.path_for(&params.agent);
        let snapshot = StoredSnapshot {
            saved_at: Utc::now(),
            params,
        };
        let json = serde_json::to_vec_pretty(&snapshot)?;
        tokio::fs::write(&path, json).await?;
        debug!(path = %path.display(), step = snapshot.params.step, "Saved history snapshot");
        Ok(())
    }

    /// Load the latest snapshot for `agent`, if one was saved.
    pub async fn load(&self, agent: &str) -> Result<Option<RecoveryData>> {
        let path = self.path_for(agent);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let snapshot: StoredSnapshot = serde_json::from_slice(&bytes)?;
        Ok(Some(RecoveryData::from(snapshot.params)))
    }

    /// A persistence hook writing into this store.
    pub fn hook(&self) -> PersistenceHook {
        let store = self.clone();
        persistence_hook(move |params| {
            let store = store.clone();
            async move { store.save(params).await }
        })
    }
}
