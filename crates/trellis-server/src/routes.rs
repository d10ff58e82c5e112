//! HTTP boundary for the CRUD pipeline.
//!
//! Each resource type is served under its registry key:
//!
//! - `GET    /api/{resource}`        read, query string as the filter map
//! - `POST   /api/{resource}`        create
//! - `GET    /api/{resource}/{id}`   read one
//! - `PUT    /api/{resource}/{id}`   update
//! - `DELETE /api/{resource}/{id}`   delete
//!
//! The boundary opens the transaction, hands the dispatcher a request
//! context, and maps the error class to a status. Success payloads land
//! under `response`; failures under `alerts`.

use crate::state::AppState;
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use trellis_api::{ApiError, ErrorKind, RequestContext, ResourceFactory, dispatch};

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/api/{resource}", get(read_all).post(create))
        .route(
            "/api/{resource}/{id}",
            get(read_one).put(update).delete(delete),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> Json<Value> {
    Json(json!({ "ok": true, "service": "trellis-server" }))
}

async fn read_all(
    State(state): State<Arc<AppState>>,
    Path(resource): Path<String>,
    Query(filters): Query<HashMap<String, String>>,
) -> Response {
    respond(run_read(&state, &resource, filters).await)
}

async fn read_one(
    State(state): State<Arc<AppState>>,
    Path((resource, id)): Path<(String, i64)>,
) -> Response {
    let filters = HashMap::from([("id".to_string(), id.to_string())]);
    respond(run_read(&state, &resource, filters).await)
}

async fn create(
    State(state): State<Arc<AppState>>,
    Path(resource): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    respond(run_create(&state, &resource, body).await)
}

async fn update(
    State(state): State<Arc<AppState>>,
    Path((resource, id)): Path<(String, i64)>,
    Json(body): Json<Value>,
) -> Response {
    respond(run_update(&state, &resource, id, body).await)
}

async fn delete(
    State(state): State<Arc<AppState>>,
    Path((resource, id)): Path<(String, i64)>,
) -> Response {
    respond(run_delete(&state, &resource, id).await)
}

async fn run_read(
    state: &AppState,
    resource: &str,
    filters: HashMap<String, String>,
) -> Result<Value, ApiError> {
    let factory = resolve(state, resource)?;
    let prototype = factory.empty();
    let ctx = open_context(state).await?;
    let rows = dispatch::read(prototype.as_ref(), ctx, &filters).await?;
    Ok(json!({ "response": rows }))
}

async fn run_create(state: &AppState, resource: &str, body: Value) -> Result<Value, ApiError> {
    let factory = resolve(state, resource)?;
    let mut entity = factory.from_json(body)?;
    let ctx = open_context(state).await?;
    let payload = dispatch::create(entity.as_mut(), ctx).await?;
    Ok(json!({ "response": payload }))
}

async fn run_update(
    state: &AppState,
    resource: &str,
    id: i64,
    mut body: Value,
) -> Result<Value, ApiError> {
    let factory = resolve(state, resource)?;
    // The path is authoritative for the identity.
    if let Some(obj) = body.as_object_mut() {
        obj.insert("id".to_string(), json!(id));
    }
    let mut entity = factory.from_json(body)?;
    let ctx = open_context(state).await?;
    let payload = dispatch::update(entity.as_mut(), ctx).await?;
    Ok(json!({ "response": payload }))
}

async fn run_delete(state: &AppState, resource: &str, id: i64) -> Result<Value, ApiError> {
    let factory = resolve(state, resource)?;
    let entity = factory.from_json(json!({ "id": id }))?;
    let ctx = open_context(state).await?;
    dispatch::delete(entity.as_ref(), ctx).await?;
    Ok(json!({ "alerts": [{ "level": "success", "text": format!("{} was deleted.", resource) }] }))
}

fn resolve<'a>(state: &'a AppState, resource: &str) -> Result<&'a dyn ResourceFactory, ApiError> {
    state
        .registry
        .get(resource)
        .ok_or_else(|| ApiError::not_found(resource.to_string()))
}

async fn open_context(state: &AppState) -> Result<RequestContext, ApiError> {
    let tx = state.store.begin().await?;
    Ok(RequestContext::new(tx))
}

fn respond(result: Result<Value, ApiError>) -> Response {
    match result {
        Ok(payload) => (StatusCode::OK, Json(payload)).into_response(),
        Err(err) => {
            let status = status_for(&err);
            if status.is_server_error() {
                tracing::error!("request failed: {}", err);
            }
            let body = json!({ "alerts": [{ "level": "error", "text": err.to_string() }] });
            (status, Json(body)).into_response()
        }
    }
}

fn status_for(err: &ApiError) -> StatusCode {
    match err.kind() {
        ErrorKind::Validation | ErrorKind::Programming => StatusCode::BAD_REQUEST,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Persistence => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;
    use trellis_api::testing::MockStore;

    fn app(store: &MockStore) -> Router {
        let state = AppState::with_store(AppConfig::default(), Arc::new(store.clone()));
        router(Arc::new(state))
    }

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[test]
    fn error_classes_map_to_statuses() {
        let mut errs = trellis_validate::ValidationErrors::new();
        errs.push("name", "cannot be blank");
        assert_eq!(
            status_for(&ApiError::Validation(errs)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&ApiError::not_found("cachegroup")),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_for(&ApiError::programming("delete requires an id")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&ApiError::Persistence(trellis_api::StoreError::Backend(
                "down".into()
            ))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn unknown_resource_key_is_not_found() {
        let store = MockStore::new();
        let response = app(&store)
            .oneshot(
                Request::builder()
                    .uri("/api/widgets")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn read_returns_rows_under_response() {
        let store = MockStore::new();
        store.expect_rows(vec![json!({ "id": 1, "name": "cachegroup1" })]);

        let response = app(&store)
            .oneshot(
                Request::builder()
                    .uri("/api/cachegroups?id=1")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["response"].as_array().map(|a| a.len()), Some(1));
    }

    #[tokio::test]
    async fn invalid_create_reports_sorted_alerts() {
        let store = MockStore::new();
        // Type referential check passes; the field rules fail.
        store.expect_rows(vec![json!({ "name": "EDGE_LOC" })]);

        let body = json!({
            "name": "not!a!valid!cachegroup",
            "shortName": "not!a!valid!shortname",
            "latitude": -190.0,
            "longitude": -190.0,
            "typeId": 6
        });
        let response = app(&store)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/cachegroups")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(
            body["alerts"][0]["text"],
            json!(
                "'latitude' Must be a floating point number within the range +-90, \
                 'longitude' Must be a floating point number within the range +-180, \
                 'name' invalid characters found - Use alphanumeric . or - or _ ., \
                 'shortName' invalid characters found - Use alphanumeric . or - or _ ."
            )
        );
        assert!(store.journal().rolled_back);
    }

    #[tokio::test]
    async fn delete_of_missing_row_is_404() {
        let store = MockStore::new();
        store.expect_exec(0);

        let response = app(&store)
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/api/cachegroups/99")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(store.journal().rolled_back);
    }
}
