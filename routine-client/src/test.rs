use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use reqwest::Url;
use serde_json::json;
use time::macros::datetime;
use tokio::net::TcpListener;

use routine_engine::model::{CollectionKey, Dataset};
use routine_engine::seed::{SCHEDULE, SUBJECTS, TEACHERS};
use routine_engine::{resolve, Filters};
use routine_store::{router, Store};

use crate::replica::Replica;
use crate::store::StoreClient;

const TOKEN: &str = "admin123";

async fn serve() -> anyhow::Result<Url> {
  let listener = TcpListener::bind("127.0.0.1:0").await?;
  let addr = listener.local_addr()?;
  let app = router(Arc::new(Store::in_memory()), TOKEN);

  tokio::spawn(async move { axum::serve(listener, app).await });

  Ok(Url::parse(&format!("http://{addr}/"))?)
}

#[tokio::test]
async fn round_trips_collections() -> anyhow::Result<()> {
  let base = serve().await?;
  let client = StoreClient::new(base, Some(TOKEN.to_string()))?;

  let empty = client.read_all().await?;
  assert!(empty.schedule.is_empty());
  assert_eq!(empty.semesters[0].id, "sem_default");

  client.write_collection(CollectionKey::Teachers, &*TEACHERS).await?;
  client.write_collection(CollectionKey::Subjects, &*SUBJECTS).await?;
  client.write_collection(CollectionKey::Schedule, &*SCHEDULE).await?;

  let dataset = client.read_all().await?;
  assert_eq!(dataset.teachers, *TEACHERS);
  assert_eq!(dataset.schedule, *SCHEDULE);

  Ok(())
}

#[tokio::test]
async fn malformed_records_do_not_hide_the_routine() -> anyhow::Result<()> {
  let base = serve().await?;
  let client = StoreClient::new(base, Some(TOKEN.to_string()))?;

  let mut subjects = serde_json::to_value(&*SUBJECTS)?;
  if let Some(subjects) = subjects.as_array_mut() {
    subjects.push(json!({
      "id": "s9",
      "title": "Calculus",
      "code": "MAT 101",
      "category": "Math",
    }));
    subjects.push(json!({ "id": "s10", "category": "CSE" }));
  }

  client.write_collection(CollectionKey::Teachers, &*TEACHERS).await?;
  client.write_collection(CollectionKey::Subjects, &subjects).await?;
  client.write_collection(CollectionKey::Schedule, &*SCHEDULE).await?;

  let dataset = client.read_all().await?;
  assert_eq!(dataset.subjects.len(), SUBJECTS.len() + 1);
  assert_eq!(dataset.subjects[..SUBJECTS.len()], SUBJECTS[..]);

  let saturday = datetime!(2026-02-21 09:00 UTC);
  let filters = Filters::default();
  let resolution = resolve(
    &dataset.schedule,
    &dataset.teachers,
    &dataset.subjects,
    saturday,
    &filters,
  );
  let expected = resolve(&SCHEDULE, &TEACHERS, &SUBJECTS, saturday, &filters);

  assert!(!resolution.entries.is_empty());
  assert_eq!(resolution.entries.len(), expected.entries.len());
  assert_eq!(resolution.dropped, expected.dropped);

  Ok(())
}

#[tokio::test]
async fn writes_need_a_valid_token() -> anyhow::Result<()> {
  let base = serve().await?;

  let anonymous = StoreClient::new(base.clone(), None)?;
  assert!(anonymous
    .write_collection(CollectionKey::Schedule, &*SCHEDULE)
    .await
    .is_err());

  let wrong = StoreClient::new(base, Some("guess".to_string()))?;
  assert!(wrong
    .write_collection(CollectionKey::Schedule, &*SCHEDULE)
    .await
    .is_err());

  assert!(wrong.read_all().await?.schedule.is_empty());
  Ok(())
}

#[tokio::test]
async fn replica_tracks_changes() -> anyhow::Result<()> {
  let base = serve().await?;
  let replica = Replica::new(StoreClient::new(base, Some(TOKEN.to_string()))?);

  assert!(replica.data().await.is_none());
  assert!(replica.update().await?);
  assert!(!replica.update().await?);

  replica.write(CollectionKey::Teachers, &*TEACHERS).await?;
  assert_eq!(
    replica.data().await.as_ref().map(|data| data.dataset.teachers.len()),
    Some(TEACHERS.len())
  );
  assert!(!replica.update().await?);

  Ok(())
}

#[tokio::test]
async fn replica_keeps_last_known_good() -> anyhow::Result<()> {
  let healthy = Arc::new(AtomicBool::new(true));
  let app = Router::new()
    .route("/api/data", get(flaky_data))
    .with_state(healthy.clone());

  let listener = TcpListener::bind("127.0.0.1:0").await?;
  let base = Url::parse(&format!("http://{}/", listener.local_addr()?))?;
  tokio::spawn(async move { axum::serve(listener, app).await });

  let replica = Replica::new(StoreClient::new(base, None)?);
  assert!(replica.update().await?);
  let before = replica.data().await.as_ref().unwrap().dataset.clone();

  healthy.store(false, Ordering::SeqCst);
  assert!(replica.update().await.is_err());

  let data = replica.data().await;
  assert_eq!(data.as_ref().unwrap().dataset, before);
  assert_eq!(data.as_ref().unwrap().dataset.schedule, *SCHEDULE);

  Ok(())
}

async fn flaky_data(State(healthy): State<Arc<AtomicBool>>) -> Result<Json<Dataset>, StatusCode> {
  if !healthy.load(Ordering::SeqCst) {
    return Err(StatusCode::INTERNAL_SERVER_ERROR);
  }

  Ok(Json(Dataset {
    teachers: TEACHERS.clone(),
    subjects: SUBJECTS.clone(),
    schedule: SCHEDULE.clone(),
    ..Dataset::default()
  }))
}
