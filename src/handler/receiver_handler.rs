use axum::{
    extract::{Extension, Json, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use std::sync::Arc;
use validator::Validate;

use crate::dto::request_dto::{BloodRequestForm, CreateBloodRequest, DonorQuery, UpdateBloodRequest};
use crate::service::receiver_service::ReceiverService;
use crate::util::error::{HandlerError, HandlerErrorKind};
use crate::util::session::Session;

fn require_session(session: &Session) -> Result<(), HandlerError> {
    match session {
        Session::Authenticated(_) => Ok(()),
        Session::Unauthenticated => Err(HandlerError {
            error: HandlerErrorKind::Unauthorized,
            message: "Please login first.".to_string(),
            details: None,
        }),
    }
}

fn parse_form(payload: CreateBloodRequest) -> Result<BloodRequestForm, HandlerError> {
    payload.validate().map_err(HandlerError::validation)?;
    Ok(BloodRequestForm::try_from(payload)?)
}

pub async fn quote_handler(
    State(service): State<Arc<dyn ReceiverService>>,
    Extension(session): Extension<Session>,
    Json(payload): Json<CreateBloodRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let form = parse_form(payload)?;
    Ok(Json(service.quote(&session, &form).await?))
}

pub async fn submit_request_handler(
    State(service): State<Arc<dyn ReceiverService>>,
    Extension(session): Extension<Session>,
    Json(payload): Json<CreateBloodRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let form = parse_form(payload)?;
    let res = service.submit(&session, form).await?;
    Ok((StatusCode::CREATED, Json(res)))
}

/// Receivers see their own requests; admins may look up anyone's.
pub async fn requests_by_email_handler(
    State(service): State<Arc<dyn ReceiverService>>,
    Extension(session): Extension<Session>,
    Path(email): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    require_session(&session)?;
    let own = session.email().is_some_and(|e| e.eq_ignore_ascii_case(email.trim()));
    if !own && !session.is_admin() {
        return Err(HandlerError {
            error: HandlerErrorKind::Forbidden,
            message: "You can only view your own requests".to_string(),
            details: None,
        });
    }
    Ok(Json(service.requests_for(&email).await?))
}

pub async fn update_request_handler(
    State(service): State<Arc<dyn ReceiverService>>,
    Extension(session): Extension<Session>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateBloodRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    require_session(&session)?;
    payload.validate().map_err(HandlerError::validation)?;
    Ok(Json(service.update_request(&session, &id, payload).await?))
}

pub async fn delete_request_handler(
    State(service): State<Arc<dyn ReceiverService>>,
    Extension(session): Extension<Session>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    require_session(&session)?;
    service.delete_request(&session, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn donors_handler(
    State(service): State<Arc<dyn ReceiverService>>,
    Extension(session): Extension<Session>,
    Query(query): Query<DonorQuery>,
) -> Result<impl IntoResponse, HandlerError> {
    require_session(&session)?;
    Ok(Json(service.donors_by_blood_group(&query.blood_group).await?))
}
