//! # HTTP Server
//!
//! Axum router exposing every mounted resource:
//!
//! | Route | Operation |
//! |---|---|
//! | `GET /{resource}` | list (query in `q`) |
//! | `POST /{resource}` | create |
//! | `GET /{resource}/{id}` | read |
//! | `PUT /{resource}/{id}` | partial update |
//! | `DELETE /{resource}/{id}` | delete |

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::Value;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use super::config::HttpConfig;
use super::errors::{HttpError, HttpResult};
use super::response::DeleteResponse;
use crate::document::Document;
use crate::query::parse_params;
use crate::resource::{
    DocumentStore, InMemoryStore, Resource, ResourceError, ResourceRegistry,
};

/// Shared state type
type ServerState<S> = Arc<ResourceRegistry<S>>;

/// HTTP front for a resource registry
pub struct ResourceServer<S: DocumentStore = InMemoryStore> {
    registry: ServerState<S>,
}

impl<S: DocumentStore + 'static> ResourceServer<S> {
    pub fn new(registry: ResourceRegistry<S>) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    pub fn registry(&self) -> &ResourceRegistry<S> {
        &self.registry
    }

    /// Build the Axum router
    pub fn router(self) -> Router {
        Router::new()
            .route(
                "/{resource}",
                get(list_handler::<S>)
                    .post(create_handler::<S>)
                    .put(update_without_id_handler::<S>)
                    .delete(delete_without_id_handler::<S>),
            )
            .route(
                "/{resource}/{id}",
                get(read_handler::<S>)
                    .put(update_handler::<S>)
                    .delete(delete_handler::<S>),
            )
            .layer(TraceLayer::new_for_http())
            .with_state(self.registry)
    }

    /// Binds the listener and serves until Ctrl+C
    pub async fn serve(self, config: &HttpConfig) -> std::io::Result<()> {
        let listener = TcpListener::bind(config.socket_addr()).await?;
        let addr = listener.local_addr()?;
        let names: Vec<String> = self.registry.names().map(str::to_string).collect();
        info!(%addr, resources = ?names, "HTTP server listening");

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl+C, shutting down"),
        Err(e) => {
            warn!(error = %e, "Could not listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    }
}

fn lookup<S: DocumentStore>(
    registry: &ResourceRegistry<S>,
    name: &str,
) -> HttpResult<Arc<Resource<S>>> {
    registry
        .get(name)
        .ok_or_else(|| HttpError::UnknownResource(name.to_string()))
}

fn json_body(body: Result<Json<Value>, JsonRejection>) -> HttpResult<Value> {
    body.map(|Json(value)| value)
        .map_err(|rejection| HttpError::InvalidBody(rejection.body_text()))
}

/// List documents handler
async fn list_handler<S: DocumentStore + 'static>(
    State(registry): State<ServerState<S>>,
    Path(name): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> HttpResult<Json<Vec<Document>>> {
    let resource = lookup(&registry, &name)?;
    let spec = parse_params(resource.schema(), &params).map_err(ResourceError::from)?;
    Ok(Json(resource.list(&spec)?))
}

/// Create document handler
async fn create_handler<S: DocumentStore + 'static>(
    State(registry): State<ServerState<S>>,
    Path(name): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> HttpResult<(StatusCode, Json<Document>)> {
    let resource = lookup(&registry, &name)?;
    let input = json_body(body)?;
    Ok((StatusCode::CREATED, Json(resource.create(&input)?)))
}

/// Read document handler; an absent id answers 204
async fn read_handler<S: DocumentStore + 'static>(
    State(registry): State<ServerState<S>>,
    Path((name, id)): Path<(String, String)>,
) -> HttpResult<Response> {
    let resource = lookup(&registry, &name)?;
    Ok(match resource.read(&id)? {
        Some(document) => Json(document).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    })
}

/// Update document handler
async fn update_handler<S: DocumentStore + 'static>(
    State(registry): State<ServerState<S>>,
    Path((name, id)): Path<(String, String)>,
    body: Result<Json<Value>, JsonRejection>,
) -> HttpResult<Json<Document>> {
    let resource = lookup(&registry, &name)?;
    let partial = json_body(body)?;
    Ok(Json(resource.update(Some(&id), &partial)?))
}

async fn update_without_id_handler<S: DocumentStore + 'static>(
    State(registry): State<ServerState<S>>,
    Path(name): Path<String>,
) -> HttpResult<Json<Document>> {
    let resource = lookup(&registry, &name)?;
    Ok(Json(resource.update(None, &Value::Null)?))
}

/// Delete document handler
async fn delete_handler<S: DocumentStore + 'static>(
    State(registry): State<ServerState<S>>,
    Path((name, id)): Path<(String, String)>,
) -> HttpResult<Json<DeleteResponse>> {
    let resource = lookup(&registry, &name)?;
    resource.delete(Some(&id))?;
    Ok(Json(DeleteResponse::new()))
}

async fn delete_without_id_handler<S: DocumentStore + 'static>(
    State(registry): State<ServerState<S>>,
    Path(name): Path<String>,
) -> HttpResult<Json<DeleteResponse>> {
    let resource = lookup(&registry, &name)?;
    resource.delete(None)?;
    Ok(Json(DeleteResponse::new()))
}
