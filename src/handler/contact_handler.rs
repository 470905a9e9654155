use axum::{extract::{Json, State}, response::IntoResponse};
use std::sync::Arc;

use crate::dto::contact_dto::ContactMessage;
use crate::service::contact_service::ContactService;
use crate::util::error::HandlerError;

pub async fn contact_handler(
    State(service): State<Arc<dyn ContactService>>,
    Json(payload): Json<ContactMessage>,
) -> Result<impl IntoResponse, HandlerError> {
    Ok(Json(service.send(payload).await?))
}
