use std::time::Duration;

use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Url};
use serde::Serialize;

use routine_engine::model::{CollectionKey, Dataset};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Serialize)]
struct UpdateData<'a, T: Serialize> {
  key: CollectionKey,
  data: &'a T,
}

/// Client for the key-value store behind `/api/data` and `/api/update`.
pub struct StoreClient {
  client: Client,
  base: Url,
  token: Option<String>,
}

impl StoreClient {
  pub fn new(base: Url, token: Option<String>) -> anyhow::Result<Self> {
    Ok(Self {
      client: Client::builder().timeout(REQUEST_TIMEOUT).build()?,
      base,
      token,
    })
  }

  pub async fn read_all(&self) -> anyhow::Result<Dataset> {
    let dataset = self
      .client
      .get(self.base.join("api/data")?)
      .send()
      .await?
      .error_for_status()?
      .json::<Dataset>()
      .await?;

    Ok(dataset)
  }

  /// Overwrites the whole collection under `key`.
  pub async fn write_collection<T: Serialize>(
    &self,
    key: CollectionKey,
    data: &T,
  ) -> anyhow::Result<()> {
    let token = match &self.token {
      Some(token) => token,
      None => anyhow::bail!("writing {key} requires an admin token"),
    };

    self
      .client
      .post(self.base.join("api/update")?)
      .header(AUTHORIZATION, format!("Bearer {token}"))
      .json(&UpdateData { key, data })
      .send()
      .await?
      .error_for_status()?;

    Ok(())
  }
}
