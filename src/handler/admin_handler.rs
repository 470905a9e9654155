use axum::{extract::{Json, Path, Query, State}, response::IntoResponse};
use std::sync::Arc;

use crate::dto::admin_dto::{DeleteConfirmation, DeleteQuery};
use crate::dto::request_dto::{RoleQuery, StatusQuery};
use crate::service::admin_service::AdminService;
use crate::util::error::HandlerError;

pub async fn list_users_handler(
    State(service): State<Arc<dyn AdminService>>,
) -> Result<impl IntoResponse, HandlerError> {
    Ok(Json(service.list_users().await?))
}

pub async fn update_user_role_handler(
    State(service): State<Arc<dyn AdminService>>,
    Path(id): Path<String>,
    Query(query): Query<RoleQuery>,
) -> Result<impl IntoResponse, HandlerError> {
    Ok(Json(service.update_user_role(&id, &query.role).await?))
}

pub async fn delete_user_handler(
    State(service): State<Arc<dyn AdminService>>,
    Path(id): Path<String>,
    Query(query): Query<DeleteQuery>,
) -> Result<impl IntoResponse, HandlerError> {
    let confirmation = DeleteConfirmation::from(query);
    Ok(Json(service.delete_user(&id, confirmation).await?))
}

pub async fn list_requests_handler(
    State(service): State<Arc<dyn AdminService>>,
) -> Result<impl IntoResponse, HandlerError> {
    Ok(Json(service.list_requests().await?))
}

pub async fn update_request_status_handler(
    State(service): State<Arc<dyn AdminService>>,
    Path(id): Path<String>,
    Query(query): Query<StatusQuery>,
) -> Result<impl IntoResponse, HandlerError> {
    Ok(Json(service.update_request_status(&id, &query.status).await?))
}

pub async fn dashboard_handler(
    State(service): State<Arc<dyn AdminService>>,
) -> Result<impl IntoResponse, HandlerError> {
    Ok(Json(service.dashboard_stats().await?))
}

pub async fn snapshot_handler(
    State(service): State<Arc<dyn AdminService>>,
) -> Result<impl IntoResponse, HandlerError> {
    Ok(Json(service.snapshot().await?))
}
