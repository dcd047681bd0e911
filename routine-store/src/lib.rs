use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{info, warn};

use routine_engine::model::CollectionKey;

pub use crate::http::router;

mod http;

/// One written version of a collection. Never mutated, only replaced.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
  pub version: u64,
  pub data: Arc<Value>,
}

/// Key-value store holding each collection as an opaque JSON document.
/// Last writer wins.
pub struct Store {
  data_dir: Option<PathBuf>,
  collections: RwLock<HashMap<CollectionKey, Snapshot>>,
}

impl Store {
  pub fn in_memory() -> Self {
    Self {
      data_dir: None,
      collections: RwLock::new(HashMap::new()),
    }
  }

  /// Opens a store persisted as `<KEY>.json` files below `data_dir`.
  pub async fn open(data_dir: impl Into<PathBuf>) -> anyhow::Result<Self> {
    let data_dir = data_dir.into();
    tokio::fs::create_dir_all(&data_dir)
      .await
      .with_context(|| format!("unable to create data directory {}", data_dir.display()))?;

    let mut collections = HashMap::new();

    for key in CollectionKey::ALL {
      let path = file_path(&data_dir, key);

      let raw = match tokio::fs::read(&path).await {
        Ok(raw) => raw,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => continue,
        Err(err) => return Err(err).with_context(|| format!("unable to read {}", path.display())),
      };

      let data = serde_json::from_slice(&raw)
        .with_context(|| format!("invalid json in {}", path.display()))?;
      info!("Loaded {} from {}", key, path.display());

      collections.insert(
        key,
        Snapshot {
          version: 1,
          data: Arc::new(data),
        },
      );
    }

    Ok(Self {
      data_dir: Some(data_dir),
      collections: RwLock::new(collections),
    })
  }

  /// Current snapshot of every key that was ever written.
  pub async fn read_all(&self) -> HashMap<CollectionKey, Snapshot> {
    self.collections.read().await.clone()
  }

  pub async fn get(&self, key: CollectionKey) -> Option<Snapshot> {
    self.collections.read().await.get(&key).cloned()
  }

  /// Replaces the collection under `key`, returning the new version.
  pub async fn write(&self, key: CollectionKey, data: Value) -> anyhow::Result<u64> {
    let mut collections = self.collections.write().await;

    if let Some(data_dir) = &self.data_dir {
      persist(data_dir, key, &data).await?;
    }

    let version = collections.get(&key).map_or(0, |snapshot| snapshot.version) + 1;
    collections.insert(
      key,
      Snapshot {
        version,
        data: Arc::new(data),
      },
    );

    info!("Replaced {} (version {})", key, version);
    Ok(version)
  }

  /// Writes `data` only if `key` was never written.
  pub async fn seed(&self, key: CollectionKey, data: Value) -> anyhow::Result<bool> {
    if self.get(key).await.is_some() {
      return Ok(false);
    }

    self.write(key, data).await?;
    Ok(true)
  }
}

fn file_path(data_dir: &Path, key: CollectionKey) -> PathBuf {
  data_dir.join(format!("{key}.json"))
}

async fn persist(data_dir: &Path, key: CollectionKey, data: &Value) -> anyhow::Result<()> {
  let path = file_path(data_dir, key);
  let tmp = path.with_extension("json.tmp");

  let raw = serde_json::to_vec(data)?;
  tokio::fs::write(&tmp, raw)
    .await
    .with_context(|| format!("unable to write {}", tmp.display()))?;

  if let Err(err) = tokio::fs::rename(&tmp, &path).await {
    warn!("Unable to move {} into place: {}", tmp.display(), err);
    if let Err(cleanup) = tokio::fs::remove_file(&tmp).await {
      warn!("Unable to remove {}: {}", tmp.display(), cleanup);
    }
    return Err(err).with_context(|| format!("unable to replace {}", path.display()));
  }

  Ok(())
}
