use std::sync::Arc;

use axum::extract::State;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use time::OffsetDateTime;
use tower_http::cors::{Any, CorsLayer};
use tower_http::sensitive_headers::SetSensitiveRequestHeadersLayer;
use tower_http::trace::TraceLayer;
use tower_http::validate_request::ValidateRequestHeaderLayer;
use tracing::error;

use routine_engine::model::CollectionKey;

use crate::Store;

/// `GET /api/data` is public, `POST /api/update` needs `Authorization: Bearer <token>`.
pub fn router(store: Arc<Store>, token: &str) -> Router {
  let cors = CorsLayer::new()
    .allow_origin(Any)
    .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
    .allow_headers([CONTENT_TYPE, AUTHORIZATION]);

  Router::new()
    .route("/api/data", get(data))
    .route(
      "/api/update",
      post(update).route_layer(ValidateRequestHeaderLayer::bearer(token)),
    )
    .fallback(not_found)
    .layer(TraceLayer::new_for_http())
    .layer(SetSensitiveRequestHeadersLayer::new([AUTHORIZATION]))
    .layer(cors)
    .with_state(store)
}

async fn data(State(store): State<Arc<Store>>) -> Json<Value> {
  let collections = store.read_all().await;
  let collection = |key: CollectionKey| match collections.get(&key) {
    Some(snapshot) => Value::clone(&snapshot.data),
    None => key.fallback(),
  };

  Json(json!({
    "teachers": collection(CollectionKey::Teachers),
    "subjects": collection(CollectionKey::Subjects),
    "schedule": collection(CollectionKey::Schedule),
    "semesters": collection(CollectionKey::Semesters),
    "lastUpdated": epoch_millis(),
  }))
}

/// Takes `{"key": <collection>, "data": <document>}`. Anything without a
/// known key is a bad request, a missing `data` stores `null`.
async fn update(State(store): State<Arc<Store>>, Json(mut request): Json<Value>) -> Response {
  let Some(key) = request
    .get("key")
    .and_then(Value::as_str)
    .and_then(|key| key.parse::<CollectionKey>().ok())
  else {
    return (StatusCode::BAD_REQUEST, "Invalid Key").into_response();
  };
  let data = request
    .get_mut("data")
    .map(Value::take)
    .unwrap_or(Value::Null);

  match store.write(key, data).await {
    Ok(_) => Json(json!({ "success": true })).into_response(),
    Err(err) => {
      error!("Unable to write {}: {:#}", key, err);
      (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": err.to_string() })),
      )
        .into_response()
    }
  }
}

async fn not_found() -> (StatusCode, &'static str) {
  (StatusCode::NOT_FOUND, "Not Found")
}

fn epoch_millis() -> i64 {
  (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}

#[cfg(test)]
mod test {
  use axum::body::Body;
  use axum::http::header::{ACCESS_CONTROL_ALLOW_ORIGIN, ORIGIN};
  use axum::http::Request;
  use http_body_util::BodyExt;
  use tower::ServiceExt;

  use super::*;

  const TOKEN: &str = "admin123";

  fn app() -> (Arc<Store>, Router) {
    let store = Arc::new(Store::in_memory());
    (store.clone(), router(store, TOKEN))
  }

  fn update_request(authorization: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
      .method(Method::POST)
      .uri("/api/update")
      .header(ORIGIN, "https://routine.example")
      .header(CONTENT_TYPE, "application/json");

    if let Some(authorization) = authorization {
      builder = builder.header(AUTHORIZATION, authorization);
    }

    builder.body(Body::from(body.to_string())).unwrap()
  }

  async fn body(response: Response) -> Vec<u8> {
    response
      .into_body()
      .collect()
      .await
      .unwrap()
      .to_bytes()
      .to_vec()
  }

  #[tokio::test]
  async fn serves_defaults_before_any_write() {
    let (_, app) = app();

    let response = app
      .oneshot(
        Request::builder()
          .uri("/api/data")
          .header(ORIGIN, "https://routine.example")
          .body(Body::empty())
          .unwrap(),
      )
      .await
      .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], "*");

    let data: Value = serde_json::from_slice(&body(response).await).unwrap();
    assert_eq!(data["teachers"], json!([]));
    assert_eq!(data["schedule"], json!([]));
    assert_eq!(data["semesters"][0]["id"], "sem_default");
    assert!(data["lastUpdated"].as_i64().unwrap() > 0);
  }

  #[tokio::test]
  async fn update_requires_bearer_token() {
    let (store, app) = app();
    let payload = json!({ "key": "SCHEDULE", "data": [] });

    let missing = app.clone().oneshot(update_request(None, payload.clone())).await.unwrap();
    assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(missing.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], "*");

    let wrong = app
      .oneshot(update_request(Some("Bearer nope"), payload))
      .await
      .unwrap();
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);

    assert!(store.get(CollectionKey::Schedule).await.is_none());
  }

  #[tokio::test]
  async fn update_replaces_collection() {
    let (store, app) = app();
    let teachers = json!([{ "id": "t1", "name": "Ms. Anika Tasnim Islam" }]);

    let response = app
      .clone()
      .oneshot(update_request(
        Some("Bearer admin123"),
        json!({ "key": "TEACHERS", "data": teachers }),
      ))
      .await
      .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
      serde_json::from_slice::<Value>(&body(response).await).unwrap(),
      json!({ "success": true })
    );
    assert_eq!(*store.get(CollectionKey::Teachers).await.unwrap().data, teachers);

    let response = app
      .oneshot(Request::builder().uri("/api/data").body(Body::empty()).unwrap())
      .await
      .unwrap();
    let data: Value = serde_json::from_slice(&body(response).await).unwrap();
    assert_eq!(data["teachers"], teachers);
  }

  #[tokio::test]
  async fn rejects_unknown_keys() {
    let (store, app) = app();

    for payload in [
      json!({ "key": "HOLIDAYS", "data": [] }),
      json!({ "key": "schedule", "data": [] }),
      json!({ "data": [] }),
      json!({ "key": 7, "data": [] }),
      json!({ "key": null, "data": [] }),
      json!(["SCHEDULE", []]),
    ] {
      let response = app
        .clone()
        .oneshot(update_request(Some("Bearer admin123"), payload))
        .await
        .unwrap();

      assert_eq!(response.status(), StatusCode::BAD_REQUEST);
      assert_eq!(body(response).await, b"Invalid Key");
    }

    assert!(store.read_all().await.is_empty());
  }

  #[tokio::test]
  async fn missing_data_stores_null() {
    let (store, app) = app();

    let response = app
      .oneshot(update_request(Some("Bearer admin123"), json!({ "key": "SUBJECTS" })))
      .await
      .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(*store.get(CollectionKey::Subjects).await.unwrap().data, Value::Null);
  }

  #[tokio::test]
  async fn unknown_paths_and_methods() {
    let (_, app) = app();

    let response = app
      .clone()
      .oneshot(
        Request::builder()
          .uri("/api/nothing")
          .header(ORIGIN, "https://routine.example")
          .body(Body::empty())
          .unwrap(),
      )
      .await
      .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(response.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    assert_eq!(body(response).await, b"Not Found");

    let response = app
      .oneshot(Request::builder().uri("/api/update").body(Body::empty()).unwrap())
      .await
      .unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
  }

  #[tokio::test]
  async fn answers_preflight() {
    let (_, app) = app();

    let response = app
      .oneshot(
        Request::builder()
          .method(Method::OPTIONS)
          .uri("/api/update")
          .header(ORIGIN, "https://routine.example")
          .header("access-control-request-method", "POST")
          .body(Body::empty())
          .unwrap(),
      )
      .await
      .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
  }
}
