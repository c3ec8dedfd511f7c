//! # REST API HTTP Server
//!
//! Axum routes for the six store operations.
//!
//! | Route               | HTTP   | Operation       |
//! |---------------------|--------|-----------------|
//! | `/findAll/:index`   | GET    | find-by-index   |
//! | `/removeAll/:index` | DELETE | delete-by-index |
//! | `/items/:uid`       | GET    | find-one        |
//! | `/items/:uid`       | PUT    | upsert-one      |
//! | `/items/:uid`       | DELETE | delete-one      |
//! | `/bulk`             | POST   | bulk-patch      |

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};

use crate::store::DocumentStore;

use super::errors::RestError;
use super::handler::RestService;
use super::index::IndexRequest;
use super::response::BulkResponse;

/// REST API server state
pub struct RestServer<S: DocumentStore> {
    service: Arc<RestService<S>>,
}

impl<S: DocumentStore> RestServer<S> {
    pub fn new(service: RestService<S>) -> Self {
        Self {
            service: Arc::new(service),
        }
    }

    /// Build the Axum router
    pub fn router(self) -> Router {
        Router::new()
            .route("/findAll/:index", get(find_all_handler::<S>))
            .route("/removeAll/:index", delete(remove_all_handler::<S>))
            .route(
                "/items/:uid",
                get(find_handler::<S>)
                    .put(update_handler::<S>)
                    .delete(remove_handler::<S>),
            )
            .route("/bulk", post(bulk_handler::<S>))
            .with_state(self.service)
    }
}

/// Shared state type
type ServiceState<S> = Arc<RestService<S>>;

/// Find records by index
async fn find_all_handler<S: DocumentStore>(
    State(service): State<ServiceState<S>>,
    Path(index): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Json<Vec<S::Record>>, RestError> {
    let request = IndexRequest::new(index, query);
    let records = service.find_by_index(&request).await?;
    Ok(Json(records))
}

/// Remove records by index
async fn remove_all_handler<S: DocumentStore>(
    State(service): State<ServiceState<S>>,
    Path(index): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<StatusCode, RestError> {
    let request = IndexRequest::new(index, query);
    service.delete_by_index(&request).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Find an individual record
async fn find_handler<S: DocumentStore>(
    State(service): State<ServiceState<S>>,
    Path(uid): Path<String>,
) -> Result<Json<S::Record>, RestError> {
    let record = service.find_one(&uid).await?;
    Ok(Json(record))
}

/// Insert or replace an individual record; the body carries its own key
async fn update_handler<S: DocumentStore>(
    State(service): State<ServiceState<S>>,
    Path(_uid): Path<String>,
    body: Bytes,
) -> Result<StatusCode, RestError> {
    service.upsert_one(&body).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Remove an individual record
async fn remove_handler<S: DocumentStore>(
    State(service): State<ServiceState<S>>,
    Path(uid): Path<String>,
) -> Result<StatusCode, RestError> {
    service.delete_one(&uid).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Execute a bulk update
async fn bulk_handler<S: DocumentStore>(
    State(service): State<ServiceState<S>>,
    body: Bytes,
) -> Result<Json<BulkResponse>, RestError> {
    let response = service.bulk_patch(&body).await?;
    Ok(Json(response))
}
