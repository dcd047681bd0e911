use serde::Serialize;
use time::OffsetDateTime;
use tokio::sync::{RwLock, RwLockReadGuard};
use tracing::{info, warn};

use routine_engine::model::{CollectionKey, Dataset};

use crate::store::StoreClient;

/// Last-known-good copy of the store.
pub struct Replica {
  client: StoreClient,
  data: RwLock<Option<Data>>,
}

pub struct Data {
  pub last_checked: OffsetDateTime,
  pub last_modified: OffsetDateTime,
  pub dataset: Dataset,
}

impl Replica {
  pub fn new(client: StoreClient) -> Self {
    Self {
      client,
      data: RwLock::new(None),
    }
  }

  pub async fn data(&self) -> RwLockReadGuard<'_, Option<Data>> {
    self.data.read().await
  }

  /// Fetches the store. `Ok(true)` when any collection changed. On error the
  /// previous copy stays untouched.
  pub async fn update(&self) -> anyhow::Result<bool> {
    let dataset = match self.client.read_all().await {
      Ok(dataset) => dataset,
      Err(err) => {
        warn!("Keeping last known routine, fetch failed: {:#}", err);
        return Err(err);
      }
    };

    let now = OffsetDateTime::now_utc();
    let mut data = self.data.write().await;

    if let Some(data) = data.as_mut() {
      if data.dataset.same_collections(&dataset) {
        data.last_checked = now;
        return Ok(false);
      }
    }

    info!(
      "Fetched routine with {} teachers, {} subjects and {} slots",
      dataset.teachers.len(),
      dataset.subjects.len(),
      dataset.schedule.len()
    );

    *data = Some(Data {
      last_checked: now,
      last_modified: now,
      dataset,
    });

    Ok(true)
  }

  /// Writes a collection and refreshes the copy.
  pub async fn write<T: Serialize>(&self, key: CollectionKey, data: &T) -> anyhow::Result<()> {
    self.client.write_collection(key, data).await?;
    self.update().await?;
    Ok(())
  }
}
